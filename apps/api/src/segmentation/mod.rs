//! Suggestion segmentation — recovers discrete project records from the free-text
//! block of portfolio suggestions returned by the analysis service.
//!
//! The upstream generator does not follow one format. Strategies are tried in a
//! fixed priority order and the first one yielding two or more segments wins;
//! otherwise the whole input becomes a single segment. Every accepted segment
//! goes through the shared title normalization in [`title`].
//!
//! The engine is a pure function of its input: no I/O, no shared mutable state.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod strategies;
pub mod title;

pub use title::normalize_title;

use strategies::{
    EmphasisHeading, HeaderMarker, LineBreakLookahead, NumberedMarker, ParagraphGrouping,
};

/// A strategy is accepted once it yields this many counted candidates.
const MIN_ACCEPTED_SEGMENTS: usize = 2;

static DEFAULT_ENGINE: LazyLock<SegmentationEngine> = LazyLock::new(SegmentationEngine::default);

/// One recovered portfolio project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSegment {
    /// Position in the result, `0..n`. Keys UI actions such as copy.
    pub id: usize,
    pub title: String,
    /// Markdown body, without the title line.
    pub content: String,
    /// Verbatim excerpt of the input this segment came from, title line included.
    pub full_text: String,
    /// Byte offset of `full_text` within the input.
    pub offset: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Candidates (strategy output)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// Excerpt begins with a boundary marker; its first line seeds the title.
    Marked,
    /// Segment opened without a marker; the title is synthesized.
    Unmarked,
    /// Text before the first marker. Kept as a segment, but not counted when
    /// deciding whether a strategy succeeded.
    Preamble,
}

/// A slice of the input proposed as one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub offset: usize,
    pub excerpt: &'a str,
    pub kind: CandidateKind,
}

impl<'a> Candidate<'a> {
    /// Builds a candidate over `text[start..end]` with surrounding whitespace
    /// trimmed. Returns `None` when the range is blank.
    pub fn new(text: &'a str, start: usize, end: usize, kind: CandidateKind) -> Option<Self> {
        let raw = &text[start..end];
        let excerpt = raw.trim();
        if excerpt.is_empty() {
            return None;
        }
        Some(Self {
            offset: start + (raw.len() - raw.trim_start().len()),
            excerpt,
            kind,
        })
    }

    fn is_counted(&self) -> bool {
        self.kind != CandidateKind::Preamble
    }

    /// Splits the excerpt into a raw title seed and a body.
    ///
    /// For marked excerpts the first line is the seed, except when that line
    /// opens with an emphasis span followed by more text: then the span is the
    /// seed and the rest of the line moves into the body. A span holding only a
    /// label (`**Project 1:** Alpha`) keeps the whole line as the seed.
    fn head_and_body(&self) -> (&'a str, String) {
        if self.kind != CandidateKind::Marked {
            return ("", self.excerpt.to_string());
        }

        let (first, rest) = self.excerpt.split_once('\n').unwrap_or((self.excerpt, ""));
        let first = first.trim();

        if let Some((span, tail)) = strategies::leading_emphasis(first) {
            if !tail.is_empty() && title::has_own_title(span) {
                let body = if rest.trim().is_empty() {
                    tail.to_string()
                } else {
                    format!("{tail}\n{rest}")
                };
                return (span, body);
            }
        }

        (first, rest.to_string())
    }

    fn into_segment(self, id: usize) -> ProjectSegment {
        let (seed, body) = self.head_and_body();
        let (title, content) = normalize_title(id, seed, &body);
        ProjectSegment {
            id,
            title,
            content,
            full_text: self.excerpt.to_string(),
            offset: self.offset,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Strategy trait + engine
// ────────────────────────────────────────────────────────────────────────────

/// One boundary-detection rule. Returns candidates in input order; an empty or
/// single-candidate result means "no decision".
pub trait SegmentationStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn split<'a>(&self, text: &'a str) -> Vec<Candidate<'a>>;
}

/// Ordered, first-success cascade of segmentation strategies.
pub struct SegmentationEngine {
    strategies: Vec<Box<dyn SegmentationStrategy>>,
}

impl Default for SegmentationEngine {
    /// Most specific markers first: an earlier strategy must not be overridden
    /// by a later one matching incidental formatting inside a project body.
    fn default() -> Self {
        Self::with_strategies(vec![
            Box::new(NumberedMarker),
            Box::new(EmphasisHeading),
            Box::new(HeaderMarker),
            Box::new(LineBreakLookahead),
            Box::new(ParagraphGrouping),
        ])
    }
}

impl SegmentationEngine {
    pub fn with_strategies(strategies: Vec<Box<dyn SegmentationStrategy>>) -> Self {
        Self { strategies }
    }

    /// Segments `text` into ordered project records. Never fails: blank input
    /// yields an empty result, unstructured input a single segment.
    pub fn segment(&self, text: &str) -> Vec<ProjectSegment> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let accepted = self.strategies.iter().find_map(|strategy| {
            let candidates = strategy.split(text);
            let counted = candidates.iter().filter(|c| c.is_counted()).count();
            (counted >= MIN_ACCEPTED_SEGMENTS).then(|| (strategy.name(), candidates))
        });

        let (strategy, candidates) = accepted.unwrap_or_else(|| {
            let whole = Candidate::new(text, 0, text.len(), CandidateKind::Unmarked);
            ("whole_text", whole.into_iter().collect())
        });

        debug!(
            strategy,
            segments = candidates.len(),
            input_len = text.len(),
            "Segmented suggestions"
        );

        candidates
            .into_iter()
            .enumerate()
            .map(|(id, candidate)| candidate.into_segment(id))
            .collect()
    }
}

/// Segments `text` with the default strategy order.
pub fn segment(text: &str) -> Vec<ProjectSegment> {
    DEFAULT_ENGINE.segment(text)
}
