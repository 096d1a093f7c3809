//! Block partitioning: code blocks, tables and prose.

use super::classify::{Classifier, HeaderKind};
use super::types::{Run, RunKind};

/// Whether the scan is currently inside a fenced code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    /// Outside any code block.
    Outside,
    /// Between an opening fence and its closing fence.
    InsideCodeBlock,
}

impl BlockState {
    /// State after seeing a fence delimiter.
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::Outside => Self::InsideCodeBlock,
            Self::InsideCodeBlock => Self::Outside,
        }
    }
}

/// How one step of the scan classified the lines it consumed.
struct Step {
    kind: RunKind,
    /// The step starts at a header and must open a new run.
    opens_run: bool,
    /// Lines consumed: 2 for a Setext header and its underline, else 1.
    width: usize,
}

/// Split a document's lines into runs.
///
/// Runs cover `lines` exactly once, in order. A run ends when the kind of
/// the next line differs, or when a header appears outside code and table
/// context. Every line between an opening and a closing fence, fences
/// included, is code; an unclosed fence runs to the end of the document.
#[must_use]
pub fn partition<S: AsRef<str>>(classifier: &Classifier, lines: &[S]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut current: Option<Run> = None;
    let mut state = BlockState::Outside;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].as_ref();
        let next = lines.get(i + 1).map(AsRef::as_ref);

        let step = if classifier.is_code_fence_delimiter(line) {
            state = state.toggle();
            Step {
                kind: RunKind::Code,
                opens_run: false,
                width: 1,
            }
        } else if state == BlockState::InsideCodeBlock {
            Step {
                kind: RunKind::Code,
                opens_run: false,
                width: 1,
            }
        } else if classifier.is_table_row(line) {
            Step {
                kind: RunKind::Table,
                opens_run: false,
                width: 1,
            }
        } else {
            match classifier.header_kind(line, next) {
                Some(HeaderKind::Setext) => Step {
                    kind: RunKind::Prose,
                    opens_run: true,
                    width: 2,
                },
                Some(HeaderKind::Atx) => Step {
                    kind: RunKind::Prose,
                    opens_run: true,
                    width: 1,
                },
                None => Step {
                    kind: RunKind::Prose,
                    opens_run: false,
                    width: 1,
                },
            }
        };

        let end = (i + step.width).min(lines.len());
        match current.as_mut() {
            Some(run) if run.kind == step.kind && !step.opens_run => run.lines.end = end,
            _ => {
                if let Some(run) = current.take() {
                    runs.push(run);
                }
                current = Some(Run::new(step.kind, i..end));
            }
        }
        i = end;
    }

    if let Some(run) = current {
        runs.push(run);
    }

    runs
}
