//! Grammar validation and input parsing utilities
//!
//! This module contains pure functions with no I/O dependencies.

pub mod bounds;
pub mod parsing;

pub use bounds::{validate_grammar, validate_node, validate_dimension};
pub use parsing::{parse_edge_line, parse_grammar_line, EdgeLine, GrammarLine};
