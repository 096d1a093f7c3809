//! Token-bounded segmentation of prose sections.

use std::ops::Range;

use super::types::Segment;
use crate::error::Result;
use crate::token::TokenCounter;

/// Accumulation state of the segmenter.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SegmentState {
    Empty,
    Accumulating { start: usize, tokens: usize },
}

/// Split `section` into segments whose summed per-line token lengths stay
/// within `budget`.
///
/// Lines are never broken. A line that alone exceeds the budget becomes a
/// segment of its own. Token lengths are summed per line rather than
/// recounted over the joined text. Counter failures are returned unchanged.
pub fn segment<S, T>(
    counter: &T,
    lines: &[S],
    section: Range<usize>,
    budget: usize,
) -> Result<Vec<Segment>>
where
    S: AsRef<str>,
    T: TokenCounter + ?Sized,
{
    let mut segments = Vec::new();
    let mut state = SegmentState::Empty;

    for i in section.clone() {
        let line_tokens = counter.token_length(lines[i].as_ref())?;

        state = match state {
            SegmentState::Empty => SegmentState::Accumulating {
                start: i,
                tokens: line_tokens,
            },
            SegmentState::Accumulating { start, tokens } if tokens + line_tokens > budget => {
                segments.push(Segment {
                    lines: start..i,
                    tokens,
                });
                SegmentState::Accumulating {
                    start: i,
                    tokens: line_tokens,
                }
            }
            SegmentState::Accumulating { start, tokens } => SegmentState::Accumulating {
                start,
                tokens: tokens + line_tokens,
            },
        };
    }

    if let SegmentState::Accumulating { start, tokens } = state {
        segments.push(Segment {
            lines: start..section.end,
            tokens,
        });
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChunkerError;
    use crate::token::WordTokenCounter;
    use pretty_assertions::assert_eq;

    /// One token per whitespace-separated word.
    struct Words;

    impl TokenCounter for Words {
        fn token_length(&self, text: &str) -> Result<usize> {
            Ok(text.split_whitespace().count())
        }
    }

    struct Failing;

    impl TokenCounter for Failing {
        fn token_length(&self, _text: &str) -> Result<usize> {
            Err(ChunkerError::Dependency("model unavailable".to_string()))
        }
    }

    #[test]
    fn test_fits_in_one_segment() {
        let lines = ["a b", "c d", "e"];
        let segments = segment(&Words, &lines, 0..3, 10).unwrap();
        assert_eq!(
            segments,
            vec![Segment {
                lines: 0..3,
                tokens: 5
            }]
        );
    }

    #[test]
    fn test_splits_when_budget_exceeded() {
        let lines = ["a b c", "d e f", "g h i", "j"];
        let segments = segment(&Words, &lines, 0..4, 6).unwrap();
        assert_eq!(
            segments,
            vec![
                Segment {
                    lines: 0..2,
                    tokens: 6
                },
                Segment {
                    lines: 2..4,
                    tokens: 4
                },
            ]
        );
    }

    #[test]
    fn test_oversized_line_stands_alone() {
        let lines = ["a", "b c d e f g h", "i"];
        let segments = segment(&Words, &lines, 0..3, 3).unwrap();
        let ranges: Vec<_> = segments.iter().map(|s| s.lines.clone()).collect();
        assert_eq!(ranges, vec![0..1, 1..2, 2..3]);
        assert_eq!(segments[1].tokens, 7);
    }

    #[test]
    fn test_oversized_first_line() {
        let lines = ["a b c d", "e"];
        let segments = segment(&Words, &lines, 0..2, 2).unwrap();
        let ranges: Vec<_> = segments.iter().map(|s| s.lines.clone()).collect();
        assert_eq!(ranges, vec![0..1, 1..2]);
    }

    #[test]
    fn test_blank_lines_cost_nothing() {
        let lines = ["a b", "", "", "c"];
        let segments = segment(&Words, &lines, 0..4, 3).unwrap();
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn test_respects_section_offset() {
        let lines = ["skip me", "a b", "c d"];
        let segments = segment(&Words, &lines, 1..3, 2).unwrap();
        let ranges: Vec<_> = segments.iter().map(|s| s.lines.clone()).collect();
        assert_eq!(ranges, vec![1..2, 2..3]);
    }

    #[test]
    fn test_empty_section() {
        let lines = ["a"];
        assert!(segment(&Words, &lines, 0..0, 5).unwrap().is_empty());
    }

    #[test]
    fn test_counter_failure_propagates() {
        let lines = ["a"];
        let err = segment(&Failing, &lines, 0..1, 5).unwrap_err();
        assert!(matches!(err, ChunkerError::Dependency(_)));
    }

    #[test]
    fn test_with_word_token_counter() {
        let lines = ["Hello, world!", "Second line."];
        let segments = segment(&WordTokenCounter, &lines, 0..2, 4).unwrap();
        // "Hello , world !" = 4 tokens, "Second line ." = 3 tokens
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].tokens, 4);
        assert_eq!(segments[1].tokens, 3);
    }
}
