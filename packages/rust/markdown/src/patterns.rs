//! Line classification for the managed region.
//!
//! Recognition is deliberately looser than rendering: any anchor or markdown
//! link pointing at `./<name>/` counts as a folder link, whatever its styling.

use std::sync::LazyLock;

use regex::Regex;

/// Shape of a single line in the managed region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    /// Nothing but whitespace.
    Blank,
    /// A link to a top-level folder.
    Link(&'a str),
    /// A `### heading` line (may open a section if a `---` line follows).
    Heading(&'a str),
    /// A `---` separator.
    Separator,
    /// Anything else.
    Other,
}

/// Classify one line (without its line terminator).
pub(crate) fn classify(line: &str) -> LineKind<'_> {
    static HTML_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r#"(?i)^\s*<a\s[^>]*?href\s*=\s*["']\./([^/"']+)/?["'][^>]*>.*?</a>\s*(?:<\s*/?\s*br\s*/?\s*>\s*)*$"#,
        )
        .expect("valid regex")
    });
    static MD_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*(?:[-*+]\s+)?\[[^\]]*\]\(\./([^/)\s]+)/?\)\s*$").expect("valid regex")
    });
    static HEADING_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^###[ \t]+(.+?)[ \t]*$").expect("valid regex"));
    static SEPARATOR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[ \t]*-{3,}[ \t]*$").expect("valid regex"));

    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if let Some(caps) = HTML_LINK_RE.captures(line).or_else(|| MD_LINK_RE.captures(line)) {
        if let Some(name) = caps.get(1) {
            return LineKind::Link(name.as_str());
        }
    }
    if let Some(caps) = HEADING_RE.captures(line) {
        if let Some(text) = caps.get(1) {
            return LineKind::Heading(text.as_str());
        }
    }
    if SEPARATOR_RE.is_match(line) {
        return LineKind::Separator;
    }
    LineKind::Other
}
