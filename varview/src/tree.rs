//! Parsed variational document, as emitted by the preprocessor parser.
//!
//! The parser reports a document as a region of segments. Text segments carry
//! plain lines; choice segments carry one `#ifdef`/`#ifndef` block with its two
//! branches, each itself a region:
//!
//! ```json
//! { "type": "region", "segments": [
//!     { "type": "choice", "name": "DEC", "kind": "positive",
//!       "thenbranch": { "type": "region", "segments": [...],
//!                       "span": { "start": [1, 0], "end": [3, 0] } },
//!       "elsebranch": { "type": "region", "segments": [] },
//!       "span": { "start": [1, 0], "end": [4, 6] } } ] }
//! ```
//!
//! Spans are also accepted in the `[[row, column], [row, column]]` form.

use crate::{coords::Position, forest::BranchCondition};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

#[derive(Debug, Snafu)]
pub enum TreeError {
    #[snafu(display("Failed to parse document tree"))]
    Json { source: serde_json::Error },
}

/// Parse the parser's JSON output.
pub fn parse_tree(json: &str) -> Result<Region, TreeError> {
    serde_json::from_str(json).context(JsonSnafu)
}

/// A text range in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SpanRepr")]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SpanRepr {
    Object { start: Position, end: Position },
    Pair(Position, Position),
}

impl From<SpanRepr> for Span {
    fn from(repr: SpanRepr) -> Self {
        match repr {
            SpanRepr::Object { start, end } | SpanRepr::Pair(start, end) => Span { start, end },
        }
    }
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// A sequence of segments, optionally located.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub segments: Vec<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Region {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Every choice in the region and its branches, depth first, parents first.
    pub fn choices(&self) -> Vec<&Choice> {
        fn walk<'a>(region: &'a Region, out: &mut Vec<&'a Choice>) {
            for segment in &region.segments {
                if let Segment::Choice(choice) = segment {
                    out.push(choice);
                    walk(&choice.thenbranch, out);
                    walk(&choice.elsebranch, out);
                }
            }
        }

        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Segment {
    Text(Text),
    Choice(Choice),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

/// `positive` for `#ifdef`, `contrapositive` for `#ifndef`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceKind {
    Positive,
    Contrapositive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub name: String,
    pub kind: ChoiceKind,
    pub thenbranch: Region,
    pub elsebranch: Region,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Choice {
    /// Branch condition rendered by the then branch.
    pub fn then_condition(&self) -> BranchCondition {
        match self.kind {
            ChoiceKind::Positive => BranchCondition::Defbranch,
            ChoiceKind::Contrapositive => BranchCondition::Ndefbranch,
        }
    }

    pub fn else_condition(&self) -> BranchCondition {
        self.then_condition().opposite()
    }
}
