//! Document parsing: a markdown document with embedded deck blocks.
//!
//! A fenced ` ```slides ` block is a deck; its YAML header names the slide
//! files. Everything outside deck blocks is prose. Parsing degrades rather
//! than fails: a bad deck block becomes an inline notice, a missing slide
//! file is logged and skipped, and only a deck with zero loadable slides is
//! rejected as a whole.

pub mod blocks;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use rayon::prelude::*;
use regex::Regex;
use serde::Deserialize;

use crate::deck::controls::ControlsVariant;

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    List { ordered: bool, items: Vec<String> },
    CodeBlock { language: Option<String>, code: String },
    BlockQuote { text: String },
    /// Placeholder for an embedded diagram; `slot` indexes the owning deck's
    /// diagram table.
    Diagram { slot: usize },
}

#[derive(Debug, Clone)]
pub struct SlideMarkup {
    pub title: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone)]
pub struct DeckMarkup {
    pub title: String,
    pub controls: ControlsVariant,
    pub slides: Vec<SlideMarkup>,
    /// Diagram source texts, indexed by `Block::Diagram::slot`.
    pub diagram_sources: Vec<String>,
    /// Slide files that actually loaded, for the reload watcher.
    pub source_files: Vec<PathBuf>,
}

#[derive(Debug)]
pub enum MarkupSegment {
    Prose(String),
    Deck(DeckMarkup),
    Invalid { message: String },
}

#[derive(Debug, Default)]
pub struct PageMarkup {
    pub segments: Vec<MarkupSegment>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeckBlockError {
    #[error("invalid deck header: {0}")]
    Header(#[from] serde_yaml::Error),
    #[error("deck header is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("unknown controls variant `{0}` (expected full, minimal, or none)")]
    UnknownControls(String),
    #[error("no slides could be loaded")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct DeckHeader {
    title: Option<String>,
    nav: Option<Vec<String>>,
    #[serde(default)]
    controls: Option<String>,
    /// Older documents carry a url_stub; accepted, unused.
    #[serde(default, rename = "url_stub")]
    _url_stub: Option<String>,
}

fn deck_block_regex() -> &'static Regex {
    static DECK_BLOCK: OnceLock<Regex> = OnceLock::new();
    DECK_BLOCK.get_or_init(|| {
        Regex::new(r"(?ms)^```slides[ \t]*\n(.*?)^```[ \t]*$").expect("deck block pattern")
    })
}

/// Parse a whole document into prose and deck segments, in document order.
pub fn parse_document(content: &str, base_dir: &Path) -> PageMarkup {
    let content = content.replace("\r\n", "\n");
    let mut segments = Vec::new();
    let mut cursor = 0;

    for captures in deck_block_regex().captures_iter(&content) {
        let whole = captures.get(0).expect("match always has group 0");
        let prose = &content[cursor..whole.start()];
        if !prose.trim().is_empty() {
            segments.push(MarkupSegment::Prose(prose.trim().to_string()));
        }
        cursor = whole.end();

        let header = captures.get(1).map_or("", |m| m.as_str());
        match parse_deck_block(header, base_dir) {
            Ok(deck) => segments.push(MarkupSegment::Deck(deck)),
            Err(error) => {
                tracing::warn!(%error, "skipping malformed deck block");
                segments.push(MarkupSegment::Invalid {
                    message: error.to_string(),
                });
            }
        }
    }

    let tail = &content[cursor..];
    if !tail.trim().is_empty() {
        segments.push(MarkupSegment::Prose(tail.trim().to_string()));
    }

    PageMarkup { segments }
}

fn parse_deck_block(header: &str, base_dir: &Path) -> Result<DeckMarkup, DeckBlockError> {
    let header: DeckHeader = serde_yaml::from_str(header)?;
    let title = header.title.ok_or(DeckBlockError::MissingField("title"))?;
    let nav = header.nav.ok_or(DeckBlockError::MissingField("nav"))?;
    let controls = match header.controls {
        None => ControlsVariant::Full,
        Some(name) => ControlsVariant::from_name(&name)
            .ok_or_else(|| DeckBlockError::UnknownControls(name.clone()))?,
    };

    let source_files: Vec<PathBuf> = nav
        .iter()
        .filter_map(|entry| {
            let path = resolve_slide_path(entry, base_dir);
            if path.is_none() {
                tracing::warn!(slide = %entry, "slide file not found, skipping");
            }
            path
        })
        .collect();

    let loaded: Vec<(String, Vec<Block>, Vec<String>)> = source_files
        .par_iter()
        .filter_map(|path| match std::fs::read_to_string(path) {
            Ok(content) => {
                let (parsed, diagrams) = blocks::parse(&content);
                Some((slide_title(&parsed), parsed, diagrams))
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to read slide file");
                None
            }
        })
        .collect();

    // Diagram slots are deck-wide; renumber each slide's local slots.
    let mut slides = Vec::new();
    let mut diagram_sources = Vec::new();
    for (title, slide_blocks, local_sources) in loaded {
        let offset = diagram_sources.len();
        let slide_blocks = slide_blocks
            .into_iter()
            .map(|block| match block {
                Block::Diagram { slot } => Block::Diagram { slot: slot + offset },
                other => other,
            })
            .collect();
        diagram_sources.extend(local_sources);
        slides.push(SlideMarkup {
            title,
            blocks: slide_blocks,
        });
    }

    if slides.is_empty() {
        return Err(DeckBlockError::Empty);
    }

    Ok(DeckMarkup {
        title,
        controls,
        slides,
        diagram_sources,
        source_files,
    })
}

/// Resolve a nav entry against the document directory, then against its
/// `slides/` subdirectory.
fn resolve_slide_path(entry: &str, base_dir: &Path) -> Option<PathBuf> {
    let candidates = [base_dir.join(entry), base_dir.join("slides").join(entry)];
    candidates.into_iter().find(|path| path.is_file())
}

/// A slide's display title: its first top-level heading.
fn slide_title(slide_blocks: &[Block]) -> String {
    slide_blocks
        .iter()
        .find_map(|block| match block {
            Block::Heading { level: 1, text } => Some(text.clone()),
            _ => None,
        })
        .unwrap_or_else(|| "Untitled Slide".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    /// A fresh scratch directory per test.
    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "docdeck-parser-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, content).expect("write slide");
    }

    fn deck_block(body: &str) -> String {
        format!("```slides\n{body}\n```")
    }

    #[test]
    fn document_without_decks_is_one_prose_segment() {
        let page = parse_document("# Notes\n\nJust text.", Path::new("."));
        assert_eq!(page.segments.len(), 1);
        assert!(matches!(&page.segments[0], MarkupSegment::Prose(p) if p.contains("Just text")));
    }

    #[test]
    fn decks_and_prose_interleave_in_document_order() {
        let dir = scratch_dir();
        write(&dir, "a.md", "# Alpha\n\nbody");
        write(&dir, "b.md", "# Beta\n\nbody");

        let doc = format!(
            "Intro prose.\n\n{}\n\nBetween decks.\n\n{}\n\nOutro.",
            deck_block("title: First\nnav:\n  - a.md"),
            deck_block("title: Second\nnav:\n  - b.md"),
        );
        let page = parse_document(&doc, &dir);

        let kinds: Vec<&str> = page
            .segments
            .iter()
            .map(|s| match s {
                MarkupSegment::Prose(_) => "prose",
                MarkupSegment::Deck(_) => "deck",
                MarkupSegment::Invalid { .. } => "invalid",
            })
            .collect();
        assert_eq!(kinds, ["prose", "deck", "prose", "deck", "prose"]);
    }

    #[test]
    fn malformed_yaml_degrades_to_notice() {
        let doc = deck_block("title: [unclosed");
        let page = parse_document(&doc, Path::new("."));
        assert!(matches!(&page.segments[0], MarkupSegment::Invalid { .. }));
    }

    #[test]
    fn missing_required_fields_degrade_to_notice() {
        let page = parse_document(&deck_block("title: No Nav Here"), Path::new("."));
        match &page.segments[0] {
            MarkupSegment::Invalid { message } => assert!(message.contains("nav")),
            other => panic!("expected invalid segment, got {other:?}"),
        }
    }

    #[test]
    fn unknown_controls_variant_degrades_to_notice() {
        let dir = scratch_dir();
        write(&dir, "a.md", "# A");
        let doc = deck_block("title: T\ncontrols: fancy\nnav:\n  - a.md");
        let page = parse_document(&doc, &dir);
        assert!(matches!(&page.segments[0], MarkupSegment::Invalid { .. }));
    }

    #[test]
    fn missing_slide_file_is_skipped_not_fatal() {
        let dir = scratch_dir();
        write(&dir, "real.md", "# Real\n\nbody");
        let doc = deck_block("title: T\nnav:\n  - ghost.md\n  - real.md");
        let page = parse_document(&doc, &dir);

        match &page.segments[0] {
            MarkupSegment::Deck(deck) => {
                assert_eq!(deck.slides.len(), 1);
                assert_eq!(deck.slides[0].title, "Real");
            }
            other => panic!("expected deck, got {other:?}"),
        }
    }

    #[test]
    fn deck_with_no_loadable_slides_degrades_to_notice() {
        let doc = deck_block("title: T\nnav:\n  - ghost.md");
        let page = parse_document(&doc, Path::new("/nonexistent-base"));
        assert!(matches!(&page.segments[0], MarkupSegment::Invalid { .. }));
    }

    #[test]
    fn nav_entries_fall_back_to_the_slides_subdirectory() {
        let dir = scratch_dir();
        write(&dir, "slides/tucked.md", "# Tucked Away");
        let doc = deck_block("title: T\nnav:\n  - tucked.md");
        let page = parse_document(&doc, &dir);

        match &page.segments[0] {
            MarkupSegment::Deck(deck) => assert_eq!(deck.slides[0].title, "Tucked Away"),
            other => panic!("expected deck, got {other:?}"),
        }
    }

    #[test]
    fn slide_without_heading_gets_the_default_title() {
        let dir = scratch_dir();
        write(&dir, "plain.md", "just a paragraph");
        let doc = deck_block("title: T\nnav:\n  - plain.md");
        let page = parse_document(&doc, &dir);

        match &page.segments[0] {
            MarkupSegment::Deck(deck) => assert_eq!(deck.slides[0].title, "Untitled Slide"),
            other => panic!("expected deck, got {other:?}"),
        }
    }

    #[test]
    fn legacy_url_stub_is_accepted() {
        let dir = scratch_dir();
        write(&dir, "a.md", "# A");
        let doc = deck_block("title: T\nurl_stub: old\nnav:\n  - a.md");
        let page = parse_document(&doc, &dir);
        assert!(matches!(&page.segments[0], MarkupSegment::Deck(_)));
    }

    #[test]
    fn diagram_slots_are_deck_wide_and_ordered() {
        let dir = scratch_dir();
        write(&dir, "one.md", "# One\n\n```mermaid\ngraph\na -> b\n```");
        write(
            &dir,
            "two.md",
            "# Two\n\n```graph\nc -> d\n```\n\ntext\n\n```mermaid\ne -> f\n```",
        );
        let doc = deck_block("title: T\nnav:\n  - one.md\n  - two.md");
        let page = parse_document(&doc, &dir);

        let deck = match &page.segments[0] {
            MarkupSegment::Deck(deck) => deck,
            other => panic!("expected deck, got {other:?}"),
        };
        assert_eq!(deck.diagram_sources.len(), 3);
        assert!(deck.diagram_sources[0].contains("a -> b"));
        assert!(deck.diagram_sources[2].contains("e -> f"));

        let slots: Vec<usize> = deck
            .slides
            .iter()
            .flat_map(|s| &s.blocks)
            .filter_map(|b| match b {
                Block::Diagram { slot } => Some(*slot),
                _ => None,
            })
            .collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }
}
