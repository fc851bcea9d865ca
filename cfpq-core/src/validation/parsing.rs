//! Line parsers for CNF grammar files and labeled edge lists
//!
//! Both formats are whitespace separated, one record per line. Blank lines
//! are ignored, as is everything from the first token starting with `#`; a
//! `#` inside a token (`rdf-syntax-ns#type`) is part of it. Line numbers in
//! errors are 1-based.

use crate::{CoreError, Result};

/// One parsed grammar line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarLine<'a> {
    /// `A a`
    Simple { lhs: &'a str, rhs: &'a str },
    /// `S A B`
    Complex {
        lhs: &'a str,
        rhs1: &'a str,
        rhs2: &'a str,
    },
}

/// One parsed edge: `from label to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeLine<'a> {
    pub from: usize,
    pub label: &'a str,
    pub to: usize,
}

fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace()
        .take_while(|token| !token.starts_with('#'))
}

/// Parse one line of a CNF grammar
///
/// Returns `Ok(None)` for blank and comment-only lines.
pub fn parse_grammar_line(line: &str, line_no: usize) -> Result<Option<GrammarLine<'_>>> {
    let mut tokens = tokens(line);
    let first = match tokens.next() {
        Some(token) => token,
        None => return Ok(None),
    };

    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(rhs), None, None) => Ok(Some(GrammarLine::Simple { lhs: first, rhs })),
        (Some(rhs1), Some(rhs2), None) => Ok(Some(GrammarLine::Complex {
            lhs: first,
            rhs1,
            rhs2,
        })),
        _ => Err(CoreError::Parse {
            line: line_no,
            reason: "grammar rule must have 2 or 3 tokens",
        }),
    }
}

/// Parse one line of an edge list
///
/// Returns `Ok(None)` for blank and comment-only lines.
pub fn parse_edge_line(line: &str, line_no: usize) -> Result<Option<EdgeLine<'_>>> {
    let mut tokens = tokens(line);
    let from = match tokens.next() {
        Some(token) => token,
        None => return Ok(None),
    };

    let (label, to) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(label), Some(to), None) => (label, to),
        _ => {
            return Err(CoreError::Parse {
                line: line_no,
                reason: "edge must have exactly 3 tokens: from label to",
            })
        }
    };

    Ok(Some(EdgeLine {
        from: parse_node(from, line_no)?,
        label,
        to: parse_node(to, line_no)?,
    }))
}

/// Parse a node index, rejecting signs and overflow
fn parse_node(s: &str, line_no: usize) -> Result<usize> {
    let mut result: usize = 0;

    for byte in s.bytes() {
        if !byte.is_ascii_digit() {
            return Err(CoreError::Parse {
                line: line_no,
                reason: "node id must be a non-negative integer",
            });
        }

        let digit = (byte - b'0') as usize;
        result = result
            .checked_mul(10)
            .and_then(|r| r.checked_add(digit))
            .ok_or(CoreError::Parse {
                line: line_no,
                reason: "node id overflows",
            })?;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grammar_line() {
        assert_eq!(
            parse_grammar_line("A a", 1),
            Ok(Some(GrammarLine::Simple { lhs: "A", rhs: "a" }))
        );
        assert_eq!(
            parse_grammar_line("  S  A\tB ", 1),
            Ok(Some(GrammarLine::Complex {
                lhs: "S",
                rhs1: "A",
                rhs2: "B"
            }))
        );
        assert_eq!(parse_grammar_line("   # only a comment", 1), Ok(None));
        assert_eq!(parse_grammar_line("", 1), Ok(None));
        assert!(parse_grammar_line("S A B C", 7).is_err());
    }

    #[test]
    fn test_parse_edge_line() {
        assert_eq!(
            parse_edge_line("0 subClassOf 12", 1),
            Ok(Some(EdgeLine {
                from: 0,
                label: "subClassOf",
                to: 12
            }))
        );
        assert_eq!(parse_edge_line("# header", 1), Ok(None));
        assert_eq!(
            parse_edge_line("3 knows 4 # trailing note", 1),
            Ok(Some(EdgeLine {
                from: 3,
                label: "knows",
                to: 4
            }))
        );
    }

    #[test]
    fn test_hash_inside_token_is_kept() {
        assert_eq!(
            parse_edge_line("0 http://www.w3.org/1999/02/22-rdf-syntax-ns#type 1", 1),
            Ok(Some(EdgeLine {
                from: 0,
                label: "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
                to: 1
            }))
        );
        assert_eq!(
            parse_grammar_line("T rdf-syntax-ns#type", 1),
            Ok(Some(GrammarLine::Simple {
                lhs: "T",
                rhs: "rdf-syntax-ns#type"
            }))
        );
        assert_eq!(
            parse_grammar_line("S A B #comment", 1),
            Ok(Some(GrammarLine::Complex {
                lhs: "S",
                rhs1: "A",
                rhs2: "B"
            }))
        );
    }

    #[test]
    fn test_parse_edge_line_errors() {
        assert!(matches!(
            parse_edge_line("0 a", 4),
            Err(CoreError::Parse { line: 4, .. })
        ));
        assert!(matches!(
            parse_edge_line("-1 a 2", 5),
            Err(CoreError::Parse { line: 5, .. })
        ));
        assert!(parse_edge_line("99999999999999999999999 a 1", 6).is_err());
    }
}
