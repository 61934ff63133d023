//! README document model: parse the managed region into typed blocks and
//! render it back.
//!
//! A README is split into three parts:
//! - `head`: everything up to and including the marker, kept verbatim
//! - `blocks`: the managed region, parsed into links, sections and stray text
//! - `tail`: the end marker and everything after it, kept verbatim (only when
//!   an end marker is configured)
//!
//! Rendering a parsed document and parsing the result yields the same blocks,
//! so a README regenerated with no folder changes stays byte-identical.

mod patterns;

use tracing::{debug, warn};

use foldertoc_shared::{FolderLink, ReadmeSection};

use crate::patterns::LineKind;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One parsed element of the managed region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A link to a top-level folder.
    Link(FolderLink),
    /// A `### heading` / `---` / body section.
    Section(ReadmeSection),
    /// A non-blank line that matched neither shape.
    Text(String),
}

/// Literal strings delimiting the managed region.
#[derive(Debug, Clone, Copy)]
pub struct Markers<'a> {
    pub start: &'a str,
    pub end: Option<&'a str>,
}

/// A README split around its managed region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadmeDocument {
    /// Text up to and including the start marker.
    pub head: String,
    /// Parsed managed region.
    pub blocks: Vec<Block>,
    /// End marker and everything after it, if an end marker is in use.
    pub tail: Option<String>,
}

// ---------------------------------------------------------------------------
// Marker search
// ---------------------------------------------------------------------------

/// Byte offset just past the first occurrence of `marker`, or `None`.
pub fn find_marker(text: &str, marker: &str) -> Option<usize> {
    if marker.is_empty() {
        return None;
    }
    text.find(marker).map(|idx| idx + marker.len())
}

/// Byte offset of the first line of `text` that starts with `marker`
/// (ignoring leading whitespace), pointing at the marker itself.
fn find_marker_line(text: &str, marker: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with(marker) {
            return Some(offset + line.len() - trimmed.len());
        }
        offset += line.len();
    }
    None
}

/// Whether any line of `text` starts with `marker`. Such text inside the
/// managed region would be taken for the end of the region.
pub fn has_marker_line(text: &str, marker: &str) -> bool {
    !marker.is_empty() && find_marker_line(text, marker).is_some()
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl ReadmeDocument {
    /// Split `text` around its markers and parse the managed region.
    ///
    /// Returns `None` when the start marker is absent. A configured end
    /// marker that is missing is not an error: the whole rest of the text is
    /// managed and the end marker is re-emitted on render.
    pub fn parse(text: &str, markers: Markers<'_>) -> Option<Self> {
        let region_start = find_marker(text, markers.start)?;

        if text.matches(markers.start).count() > 1 {
            warn!(
                marker = markers.start,
                "marker appears more than once; using the first occurrence"
            );
        }

        let rest = &text[region_start..];
        let (region, tail) = match markers.end {
            Some(end) => match find_marker_line(rest, end) {
                Some(idx) => (&rest[..idx], Some(rest[idx..].to_string())),
                None => {
                    warn!(
                        end_marker = end,
                        "end marker not found; managing everything after the marker"
                    );
                    (rest, Some(format!("{end}\n")))
                }
            },
            None => (rest, None),
        };

        let blocks = parse_region(region);
        debug!(blocks = blocks.len(), "parsed managed region");

        Some(Self {
            head: text[..region_start].to_string(),
            blocks,
            tail,
        })
    }

    /// Render the document back to text.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.head.len() + self.blocks.len() * 96);
        out.push_str(&self.head);
        out.push('\n');
        for block in &self.blocks {
            out.push_str(&render_block(block));
            out.push('\n');
        }
        if let Some(tail) = &self.tail {
            out.push_str(tail);
        }
        out
    }
}

/// Parse the managed region line by line.
///
/// Outside a section: links become [`Block::Link`], blank lines are skipped
/// and anything else becomes [`Block::Text`]. A heading line directly
/// followed by a separator line opens a section whose body runs until the
/// next heading/separator pair or the end of the region.
fn parse_region(region: &str) -> Vec<Block> {
    let lines: Vec<&str> = region.lines().collect();
    let mut blocks = Vec::new();
    let mut open: Option<(String, Vec<&str>)> = None;
    let mut i = 0;

    while i < lines.len() {
        let kind = patterns::classify(lines[i]);

        if let LineKind::Heading(heading) = kind {
            if lines.get(i + 1).map(|l| patterns::classify(l)) == Some(LineKind::Separator) {
                if let Some((h, body)) = open.take() {
                    blocks.push(close_section(h, &body));
                }
                open = Some((heading.to_string(), Vec::new()));
                i += 2;
                continue;
            }
        }

        match (&mut open, kind) {
            (Some((_, body)), _) => body.push(lines[i]),
            (None, LineKind::Blank) => {}
            (None, LineKind::Link(name)) => blocks.push(Block::Link(FolderLink::new(name))),
            (None, _) => blocks.push(Block::Text(lines[i].to_string())),
        }
        i += 1;
    }

    if let Some((h, body)) = open.take() {
        blocks.push(close_section(h, &body));
    }
    blocks
}

/// The sections `section` reads back as after a render/parse round trip.
///
/// Usually just the section itself; a body containing a `### x` line
/// directly followed by a `---` line comes back split at that heading.
pub fn split_section(section: &ReadmeSection) -> Vec<ReadmeSection> {
    parse_region(&render_section(section))
        .into_iter()
        .filter_map(|block| match block {
            Block::Section(s) => Some(s),
            _ => None,
        })
        .collect()
}

fn close_section(heading: String, body: &[&str]) -> Block {
    Block::Section(ReadmeSection::new(heading, body.join("\n").trim()))
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render a folder link in the canonical anchor style.
pub fn render_link(link: &FolderLink) -> String {
    format!(
        r#"<a href="./{0}/" style="font-weight: bold; margin-bottom:200px;">❉ {0}</a></br>"#,
        link.dir_name
    )
}

/// Render a section as heading, separator, body.
pub fn render_section(section: &ReadmeSection) -> String {
    format!("### {}\n---\n{}", section.heading, section.body)
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Link(link) => render_link(link),
        Block::Section(section) => render_section(section),
        Block::Text(text) => text.clone(),
    }
}

/// Whether a folder name survives a render/parse round trip unchanged.
///
/// Names with quotes, angle brackets, slashes or surrounding whitespace would
/// not be recognized again as the same link or heading.
pub fn is_renderable_name(name: &str) -> bool {
    !name.is_empty()
        && name.trim() == name
        && !name
            .chars()
            .any(|c| matches!(c, '"' | '\'' | '<' | '>' | '/') || c.is_control())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "<!-- foldertoc -->";

    fn markers() -> Markers<'static> {
        Markers {
            start: MARKER,
            end: None,
        }
    }

    fn link(name: &str) -> Block {
        Block::Link(FolderLink::new(name))
    }

    fn section(heading: &str, body: &str) -> Block {
        Block::Section(ReadmeSection::new(heading, body))
    }

    #[test]
    fn find_marker_distinguishes_absent_from_offset_zero() {
        assert_eq!(find_marker("<!-- foldertoc -->rest", MARKER), Some(MARKER.len()));
        assert_eq!(find_marker("no marker here", MARKER), None);
        assert_eq!(find_marker("anything", ""), None);
    }

    #[test]
    fn parse_without_marker_is_none() {
        assert!(ReadmeDocument::parse("# Notes\n", markers()).is_none());
    }

    #[test]
    fn empty_region_renders_head_plus_newline() {
        let text = format!("# Notes\n\n{MARKER}");
        let doc = ReadmeDocument::parse(&text, markers()).unwrap();
        assert!(doc.blocks.is_empty());
        assert_eq!(doc.render(), format!("{text}\n"));
    }

    #[test]
    fn parses_links_then_sections() {
        let text = format!(
            "# Notes\n{MARKER}\n{}\n{}\n### alpha\n---\nHello\n\nWorld\n### beta\n---\nBye\n",
            render_link(&FolderLink::new("alpha")),
            render_link(&FolderLink::new("beta")),
        );
        let doc = ReadmeDocument::parse(&text, markers()).unwrap();
        assert_eq!(
            doc.blocks,
            vec![
                link("alpha"),
                link("beta"),
                section("alpha", "Hello\n\nWorld"),
                section("beta", "Bye"),
            ]
        );
        assert_eq!(doc.head, format!("# Notes\n{MARKER}"));
    }

    #[test]
    fn heading_without_separator_stays_in_body() {
        let text = format!("{MARKER}\n### alpha\n---\nintro\n### Usage\nrun it\n");
        let doc = ReadmeDocument::parse(&text, markers()).unwrap();
        assert_eq!(doc.blocks, vec![section("alpha", "intro\n### Usage\nrun it")]);
    }

    #[test]
    fn stray_lines_become_text_blocks() {
        let text = format!("{MARKER} trailing\nsome prose\n\n<a href=\"./x/\">x</a>\n");
        let doc = ReadmeDocument::parse(&text, markers()).unwrap();
        assert_eq!(
            doc.blocks,
            vec![
                Block::Text(" trailing".into()),
                Block::Text("some prose".into()),
                link("x"),
            ]
        );
    }

    #[test]
    fn empty_section_body_round_trips() {
        let doc = ReadmeDocument {
            head: MARKER.into(),
            blocks: vec![section("empty", ""), section("next", "text")],
            tail: None,
        };
        let rendered = doc.render();
        let reparsed = ReadmeDocument::parse(&rendered, markers()).unwrap();
        assert_eq!(reparsed, doc);
        assert_eq!(reparsed.render(), rendered);
    }

    #[test]
    fn render_then_parse_is_stable() {
        let doc = ReadmeDocument {
            head: format!("# JS notes\n\nIntro.\n\n{MARKER}"),
            blocks: vec![
                link("boxing"),
                link("jsbridge"),
                section("boxing", "Primitive wrappers.\n\n- one\n- two"),
                section("jsbridge", "Native bridge notes."),
            ],
            tail: None,
        };
        let once = doc.render();
        let twice = ReadmeDocument::parse(&once, markers()).unwrap().render();
        assert_eq!(once, twice);
    }

    #[test]
    fn end_marker_preserves_tail() {
        let m = Markers {
            start: MARKER,
            end: Some("<!-- /foldertoc -->"),
        };
        let text = format!("{MARKER}\nold line\n<!-- /foldertoc -->\n\n## License\nMIT\n");
        let doc = ReadmeDocument::parse(&text, m).unwrap();
        assert_eq!(doc.blocks, vec![Block::Text("old line".into())]);
        assert_eq!(doc.tail.as_deref(), Some("<!-- /foldertoc -->\n\n## License\nMIT\n"));
    }

    #[test]
    fn missing_end_marker_is_reemitted() {
        let m = Markers {
            start: MARKER,
            end: Some("<!-- /foldertoc -->"),
        };
        let doc = ReadmeDocument::parse(&format!("{MARKER}\n"), m).unwrap();
        let rendered = doc.render();
        assert_eq!(rendered, format!("{MARKER}\n<!-- /foldertoc -->\n"));

        let again = ReadmeDocument::parse(&rendered, m).unwrap().render();
        assert_eq!(again, rendered);
    }

    #[test]
    fn end_marker_inside_a_line_is_not_the_end() {
        let m = Markers {
            start: MARKER,
            end: Some("<!-- /foldertoc -->"),
        };
        let text = format!(
            "{MARKER}\n### alpha\n---\nsee <!-- /foldertoc --> here\n<!-- /foldertoc -->\nfooter\n"
        );
        let doc = ReadmeDocument::parse(&text, m).unwrap();
        assert_eq!(
            doc.blocks,
            vec![section("alpha", "see <!-- /foldertoc --> here")]
        );
        assert_eq!(doc.tail.as_deref(), Some("<!-- /foldertoc -->\nfooter\n"));
        assert_eq!(doc.render(), text);
    }

    #[test]
    fn marker_lines() {
        assert!(has_marker_line("a\n  <!-- end --> x\n", "<!-- end -->"));
        assert!(!has_marker_line("a <!-- end --> x\n", "<!-- end -->"));
        assert!(!has_marker_line("anything", ""));
    }

    #[test]
    fn split_section_follows_the_parser() {
        let plain = ReadmeSection::new("alpha", "Intro\n### Usage\nrun it");
        assert_eq!(split_section(&plain), vec![plain.clone()]);

        let empty = ReadmeSection::new("alpha", "");
        assert_eq!(split_section(&empty), vec![empty.clone()]);

        let nested = ReadmeSection::new("alpha", "Intro\n### Setup\n---\nnpm i");
        assert_eq!(
            split_section(&nested),
            vec![
                ReadmeSection::new("alpha", "Intro"),
                ReadmeSection::new("Setup", "npm i"),
            ]
        );
    }

    #[test]
    fn canonical_link_format() {
        assert_eq!(
            render_link(&FolderLink::new("jsbridge")),
            r#"<a href="./jsbridge/" style="font-weight: bold; margin-bottom:200px;">❉ jsbridge</a></br>"#
        );
        assert_eq!(
            render_section(&ReadmeSection::new("jsbridge", "Hello")),
            "### jsbridge\n---\nHello"
        );
    }

    #[test]
    fn renderable_names() {
        assert!(is_renderable_name("jsbridge"));
        assert!(is_renderable_name("class tags"));
        assert!(is_renderable_name("装箱"));
        assert!(!is_renderable_name(" padded"));
        assert!(!is_renderable_name("quote\"d"));
        assert!(is_renderable_name("notes (old)"));
        assert!(!is_renderable_name("a<b"));
        assert!(!is_renderable_name(""));
    }
}
