//! Boundary-detection strategies, in the order the engine tries them.
//!
//! Strategies 1 and 3 and the line-lookahead union only recognise markers at the
//! start of a line (behind an optional list ordinal, bullet or header hashes);
//! emphasis headings are recognised anywhere. Text before the
//! first marker is returned as a [`CandidateKind::Preamble`] candidate.

use std::sync::LazyLock;

use regex::Regex;

use super::{Candidate, CandidateKind, SegmentationStrategy};

/// Longest emphasized run (in chars) still treated as a heading.
const MAX_EMPHASIS_TITLE_CHARS: usize = 120;

// Markers may sit behind a list ordinal, a bullet or header hashes
// ("1. **Title**", "- **Title**", "### Project 1: Title"). Emphasis is `**` or
// bold-italic `***`.

static NUMBERED_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?mi)^[ \t]*(?:#+[ \t]*|\d+[.)][ \t]*|[-+*][ \t]+)?(?:\*{2,3}[ \t]*)?(?:portfolio[ \t]+)?project[ \t]+\d+[ \t]*:",
    )
    .expect("valid numbered label regex")
});

/// A bold span anywhere; when only a line prefix precedes it, the match starts
/// at the line start so the prefix stays with its own segment.
static EMPHASIS_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^[ \t]*(?:#+[ \t]*|\d+[.)][ \t]*|[-+*][ \t]+)?)?\*{2,3}([^*\n]+)\*{2,3}")
        .expect("valid emphasis span regex")
});

static HEADER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#+[ \t]+\S").expect("valid header line regex"));

/// Any of the three marker shapes at the start of a line.
static ANY_LINE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?mi)^[ \t]*(?:(?:#+[ \t]*|\d+[.)][ \t]*|[-+*][ \t]+)?(?:(?:\*{2,3}[ \t]*)?(?:portfolio[ \t]+)?project[ \t]+\d+[ \t]*:|\*{2,3}[^*\n]+\*{2,3})|#+[ \t]+\S)",
    )
    .expect("valid line marker regex")
});

static LEADING_EMPHASIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#+[ \t]*|\d+[.)][ \t]*|[-+*][ \t]+)?\*{2,3}([^*\n]+)\*{2,3}(.*)$")
        .expect("valid leading emphasis regex")
});

/// One or more blank (whitespace-only) lines.
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n(?:[ \t]*\r?\n)+").expect("valid paragraph break regex"));

/// Splits a line opening with `**span**` (optionally behind a list ordinal,
/// bullet or header hashes) into the span text and the rest of the line, both
/// trimmed.
pub fn leading_emphasis(line: &str) -> Option<(&str, &str)> {
    let caps = LEADING_EMPHASIS.captures(line)?;
    let span = caps.get(1)?.as_str().trim();
    let tail = caps.get(2).map_or("", |m| m.as_str().trim());
    Some((span, tail))
}

fn starts_with_marker(text: &str) -> bool {
    ANY_LINE_MARKER.find(text).is_some_and(|m| m.start() == 0)
}

/// Cuts `text` at every start offset: an optional preamble, then one marked
/// candidate per start running up to the next one.
fn split_at<'a>(text: &'a str, starts: &[usize]) -> Vec<Candidate<'a>> {
    let Some(&first) = starts.first() else {
        return Vec::new();
    };

    let mut candidates = Vec::with_capacity(starts.len() + 1);
    candidates.extend(Candidate::new(text, 0, first, CandidateKind::Preamble));

    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        candidates.extend(Candidate::new(text, start, end, CandidateKind::Marked));
    }

    candidates
}

fn match_starts(pattern: &Regex, text: &str) -> Vec<usize> {
    pattern.find_iter(text).map(|m| m.start()).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// 1. "Project <n>:" / "Portfolio Project <n>:"
// ────────────────────────────────────────────────────────────────────────────

pub struct NumberedMarker;

impl SegmentationStrategy for NumberedMarker {
    fn name(&self) -> &'static str {
        "numbered_marker"
    }

    fn split<'a>(&self, text: &'a str) -> Vec<Candidate<'a>> {
        split_at(text, &match_starts(&NUMBERED_LABEL, text))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 2. **Emphasized heading**
// ────────────────────────────────────────────────────────────────────────────

pub struct EmphasisHeading;

impl SegmentationStrategy for EmphasisHeading {
    fn name(&self) -> &'static str {
        "emphasis_heading"
    }

    fn split<'a>(&self, text: &'a str) -> Vec<Candidate<'a>> {
        let starts: Vec<usize> = EMPHASIS_SPAN
            .captures_iter(text)
            .filter_map(|caps| {
                let span = caps.get(1)?.as_str().trim();
                if span.is_empty() || span.chars().count() > MAX_EMPHASIS_TITLE_CHARS {
                    return None;
                }
                Some(caps.get(0)?.start())
            })
            .collect();
        split_at(text, &starts)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 3. # Markdown header
// ────────────────────────────────────────────────────────────────────────────

pub struct HeaderMarker;

impl SegmentationStrategy for HeaderMarker {
    fn name(&self) -> &'static str {
        "header_marker"
    }

    fn split<'a>(&self, text: &'a str) -> Vec<Candidate<'a>> {
        split_at(text, &match_starts(&HEADER_LINE, text))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 4. Line breaks followed by any marker shape
// ────────────────────────────────────────────────────────────────────────────

/// Splits at every line that opens with any of the three marker shapes. Picks
/// up mixed-convention text where no single shape occurs twice.
pub struct LineBreakLookahead;

impl SegmentationStrategy for LineBreakLookahead {
    fn name(&self) -> &'static str {
        "line_break_lookahead"
    }

    fn split<'a>(&self, text: &'a str) -> Vec<Candidate<'a>> {
        split_at(text, &match_starts(&ANY_LINE_MARKER, text))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 5. Blank-line paragraphs grouped under marked paragraphs
// ────────────────────────────────────────────────────────────────────────────

/// Walks blank-line separated paragraphs, opening a new segment at each one
/// that begins with a marker. Unmarked paragraphs join the open segment; an
/// unmarked first paragraph opens segment 0 with a synthesized title.
pub struct ParagraphGrouping;

impl ParagraphGrouping {
    /// Start offsets of non-blank paragraphs, each with its marked flag.
    fn paragraphs(text: &str) -> Vec<(usize, bool)> {
        let mut bounds = Vec::new();
        let mut cursor = 0;
        for brk in PARAGRAPH_BREAK.find_iter(text) {
            bounds.push((cursor, brk.start()));
            cursor = brk.end();
        }
        bounds.push((cursor, text.len()));

        bounds
            .into_iter()
            .filter_map(|(start, end)| {
                let raw = &text[start..end];
                let body = raw.trim_start();
                if body.trim_end().is_empty() {
                    return None;
                }
                Some((start + (raw.len() - body.len()), starts_with_marker(body)))
            })
            .collect()
    }
}

impl SegmentationStrategy for ParagraphGrouping {
    fn name(&self) -> &'static str {
        "paragraph_grouping"
    }

    fn split<'a>(&self, text: &'a str) -> Vec<Candidate<'a>> {
        let mut groups: Vec<(usize, CandidateKind)> = Vec::new();
        for (start, marked) in Self::paragraphs(text) {
            if marked {
                groups.push((start, CandidateKind::Marked));
            } else if groups.is_empty() {
                groups.push((start, CandidateKind::Unmarked));
            }
        }

        groups
            .iter()
            .enumerate()
            .filter_map(|(i, &(start, kind))| {
                let end = groups.get(i + 1).map_or(text.len(), |&(next, _)| next);
                Candidate::new(text, start, end, kind)
            })
            .collect()
    }
}
