//! Bounds validation for grammar ids and node indices
//!
//! Every check here runs before a closure starts, so an out-of-range id is
//! reported as a configuration error instead of surfacing mid-iteration.

use crate::{CoreError, Grammar, Result};

/// Validate that every rule operand is inside its symbol table
///
/// Simple rules are checked first, then complex rules, each in declaration
/// order; the first offending rule is reported.
pub fn validate_grammar(grammar: &Grammar) -> Result<()> {
    let nonterminal_count = grammar.nonterminals().len();
    let terminal_count = grammar.terminals().len();

    for (rule, simple) in grammar.simple_rules().iter().enumerate() {
        check_nonterminal(rule, simple.lhs.index(), nonterminal_count)?;
        if simple.rhs.index() >= terminal_count {
            return Err(CoreError::TerminalOutOfRange {
                rule,
                id: simple.rhs.index(),
                count: terminal_count,
            });
        }
    }

    for (rule, complex) in grammar.complex_rules().iter().enumerate() {
        check_nonterminal(rule, complex.lhs.index(), nonterminal_count)?;
        check_nonterminal(rule, complex.rhs1.index(), nonterminal_count)?;
        check_nonterminal(rule, complex.rhs2.index(), nonterminal_count)?;
    }

    Ok(())
}

fn check_nonterminal(rule: usize, id: usize, count: usize) -> Result<()> {
    if id >= count {
        return Err(CoreError::NonterminalOutOfRange { rule, id, count });
    }
    Ok(())
}

/// Validate that a matrix dimension fits the `u32` index space
pub const fn validate_dimension(dimension: usize) -> Result<()> {
    if dimension > u32::MAX as usize {
        return Err(CoreError::DimensionTooLarge { dimension });
    }
    Ok(())
}

/// Validate that a node index lies in `[0, dimension)`
pub const fn validate_node(node: usize, dimension: usize) -> Result<()> {
    if node >= dimension {
        return Err(CoreError::NodeOutOfRange { node, dimension });
    }
    Ok(())
}
