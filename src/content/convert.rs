//! The HTML to Markdown conversion boundary
//!
//! Conversion itself is delegated to `htmd`, configured for ATX headings,
//! dash bullets and fenced code blocks. Callout boxes survive as blockquotes
//! with an inferred type label instead of being stripped. A small pre-pass
//! copies `data-lang` attributes into `language-*` classes so fence info
//! strings are populated for templates that only annotate the `pre` tag.

use htmd::options::{BulletListMarker, CodeBlockStyle, HeadingStyle, Options};
use htmd::{Element, HtmlToMarkdown};
use once_cell::sync::Lazy;
use regex::Regex;

static DATA_LANG_PRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<pre([^>]*?)\sdata-lang="([^"]+)"([^>]*)>\s*<code([^>]*)>"#)
        .expect("valid regex")
});

static EXTRA_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static PERMALINK_ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[\s\u{200B}]*\]\(#[^)]+\)\s*").expect("valid regex"));
static TRAILING_PAGER_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)\[([^\]]+)\]\(/[^)]*\)\[([^\]]+)\]\(/[^)]*\)\s*$").expect("valid regex")
});
static KEYBOARD_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{2318}\u{2303}\u{2325}\u{21E7}]+[A-Za-z]\s*").expect("valid regex"));
static DEEP_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{3,}").expect("valid regex"));
static CALLOUT_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(warning|danger|caution|error|info|tip|note|hint)").expect("valid regex")
});

static CONVERTER: Lazy<HtmlToMarkdown> = Lazy::new(|| {
    HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "iframe", "noscript", "button", "svg"])
        .options(Options {
            heading_style: HeadingStyle::Atx,
            bullet_list_marker: BulletListMarker::Dash,
            code_block_style: CodeBlockStyle::Fenced,
            ..Default::default()
        })
        .add_handler(vec!["div"], div_handler)
        .build()
});

fn attr_value<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element
        .attrs
        .iter()
        .find(|a| &a.name.local[..] == name)
        .map(|a| &a.value[..])
}

/// Divs pass through unchanged unless they are callout boxes, which become
/// blockquotes labelled with the type inferred from their class names
fn div_handler(element: Element) -> Option<String> {
    let classes = attr_value(&element, "class").unwrap_or("");
    if !classes.to_lowercase().contains("callout") {
        return Some(element.content.to_string());
    }

    let label = CALLOUT_TYPE.find(&classes.to_lowercase()).map(|m| {
        let mut chars = m.as_str().chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    });

    let mut quoted = String::from("\n\n");
    if let Some(label) = label {
        quoted.push_str(&format!("> **{}**\n", label));
    }
    for line in element.content.trim().lines() {
        quoted.push_str("> ");
        quoted.push_str(line);
        quoted.push('\n');
    }
    quoted.push('\n');
    Some(quoted)
}

/// Converts a cleaned HTML fragment to post-processed Markdown
///
/// Conversion errors degrade to an empty string; the caller treats empty
/// content as a failed page.
pub fn to_markdown(html: &str) -> String {
    let prepared = DATA_LANG_PRE.replace_all(html, |caps: &regex::Captures| {
        if caps[4].contains("language-") {
            caps[0].to_string()
        } else {
            format!(
                r#"<pre{}{}><code{} class="language-{}">"#,
                &caps[1], &caps[3], &caps[4], &caps[2]
            )
        }
    });
    match CONVERTER.convert(&prepared) {
        Ok(md) => post_process(&md),
        Err(_) => String::new(),
    }
}

/// Scrubs conversion artifacts out of the generated Markdown
fn post_process(md: &str) -> String {
    let md = EXTRA_NEWLINES.replace_all(md, "\n\n");
    let md = PERMALINK_ANCHOR.replace_all(&md, "");
    let md = TRAILING_PAGER_PAIR.replace_all(&md, "");
    let md = KEYBOARD_HINT.replace_all(&md, "");
    md.trim().to_string()
}

/// Flattens headings deeper than level 2 up to level 2
///
/// Only applied when a crawl degrades to a single page and that page's own
/// heading structure becomes the document outline.
pub fn flatten_headings(md: &str) -> String {
    DEEP_HEADING.replace_all(md, "##").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_conversion_uses_atx_and_dashes() {
        let md = to_markdown("<h1>Title</h1><ul><li>one</li><li>two</li></ul>");
        assert!(md.contains("# Title"));
        // List markers are dashes; the marker padding width is htmd's choice
        assert!(
            md.lines().any(|l| l.starts_with('-') && l.ends_with("one")),
            "got: {md}"
        );
    }

    #[test]
    fn test_fenced_code_with_language_class() {
        let md = to_markdown(r#"<pre><code class="language-rust">fn main() {}</code></pre>"#);
        assert!(md.contains("```rust"), "got: {md}");
    }

    #[test]
    fn test_data_lang_promoted_to_language_class() {
        let md = to_markdown(r#"<pre data-lang="python"><code>x = 1</code></pre>"#);
        assert!(md.contains("```python"), "got: {md}");
    }

    #[test]
    fn test_callout_becomes_labelled_blockquote() {
        let md = to_markdown(r#"<div class="Callout_callout warning">Mind the gap</div>"#);
        assert!(md.contains("> **Warning**"), "got: {md}");
        assert!(md.contains("> Mind the gap"), "got: {md}");
    }

    #[test]
    fn test_plain_div_passes_through() {
        let md = to_markdown("<div><p>hello</p></div>");
        assert!(md.contains("hello"));
        assert!(!md.contains('>'));
    }

    #[test]
    fn test_permalink_anchors_stripped() {
        assert_eq!(post_process("Heading [\u{200B}](#heading) text"), "Heading text");
        assert_eq!(post_process("Heading [ ](#heading)text"), "Heading text");
    }

    #[test]
    fn test_excess_newlines_collapsed() {
        assert_eq!(post_process("a\n\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_trailing_pager_pair_stripped() {
        let md = "Body text\n\n[Previous page](/a)[Next page](/b)";
        assert_eq!(post_process(md), "Body text");
    }

    #[test]
    fn test_keyboard_hints_stripped() {
        assert_eq!(post_process("Press \u{2318}K to search"), "Press to search");
    }

    #[test]
    fn test_flatten_headings() {
        let md = "# one\n## two\n### three\n#### four";
        assert_eq!(flatten_headings(md), "# one\n## two\n## three\n## four");
    }
}
