//! Header splitting and header-only section merging for prose.

use std::ops::Range;

use super::classify::{Classifier, HeaderKind};

/// Split a prose run into sections, each starting at a header.
///
/// Lookahead for Setext headers stays inside the run. A Setext underline is
/// kept with its title and not examined again.
#[must_use]
pub fn split_by_headers<S: AsRef<str>>(
    classifier: &Classifier,
    lines: &[S],
    run: Range<usize>,
) -> Vec<Range<usize>> {
    let mut sections = Vec::new();
    let mut current: Option<Range<usize>> = None;
    let mut i = run.start;

    while i < run.end {
        let line = lines[i].as_ref();
        let next = if i + 1 < run.end {
            Some(lines[i + 1].as_ref())
        } else {
            None
        };

        let end = match classifier.header_kind(line, next) {
            Some(kind) => {
                if let Some(section) = current.take() {
                    sections.push(section);
                }
                let width = if kind == HeaderKind::Setext { 2 } else { 1 };
                let end = i + width;
                tracing::trace!(line = i, header = %line, "Found header");
                current = Some(i..end);
                end
            }
            None => {
                let end = i + 1;
                match current.as_mut() {
                    Some(section) => section.end = end,
                    None => current = Some(i..end),
                }
                end
            }
        };
        i = end;
    }

    if let Some(section) = current {
        sections.push(section);
    }

    sections
}

/// Buffer state of the merger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeState {
    /// No header-only sections pending.
    Empty,
    /// Consecutive header-only sections waiting to be emitted together.
    Accumulating(Range<usize>),
}

/// Merge runs of consecutive header-only sections into single sections.
///
/// A section is header-only when it is exactly one line and that line is a
/// header on its own. Pending header-only sections are emitted as one merged
/// section *before* the next ordinary section, which stays a separate entry.
/// Sections must be contiguous and in document order.
#[must_use]
pub fn merge_header_only<S: AsRef<str>>(
    classifier: &Classifier,
    lines: &[S],
    sections: Vec<Range<usize>>,
) -> Vec<Range<usize>> {
    let mut merged = Vec::with_capacity(sections.len());
    let mut state = MergeState::Empty;

    for section in sections {
        if is_header_only(classifier, lines, &section) {
            state = match state {
                MergeState::Empty => MergeState::Accumulating(section),
                MergeState::Accumulating(pending) => {
                    debug_assert_eq!(pending.end, section.start, "sections must be contiguous");
                    MergeState::Accumulating(pending.start..section.end)
                }
            };
        } else {
            let previous = std::mem::replace(&mut state, MergeState::Empty);
            if let MergeState::Accumulating(pending) = previous {
                merged.push(pending);
            }
            merged.push(section);
        }
    }

    if let MergeState::Accumulating(pending) = state {
        merged.push(pending);
    }

    merged
}

/// Whether a section is a single header line.
#[must_use]
pub fn is_header_only<S: AsRef<str>>(
    classifier: &Classifier,
    lines: &[S],
    section: &Range<usize>,
) -> bool {
    section.len() == 1 && classifier.is_header(lines[section.start].as_ref(), None)
}
