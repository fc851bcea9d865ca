#![no_std]

//! CFPQ Core - grammar model and matrix contracts for context-free path queries
//!
//! This crate provides the data model (typed symbol ids, normalized rules,
//! symbol tables), the Boolean matrix contract the closure engine is
//! written against, and pure validation and parsing helpers. It performs
//! no I/O and spawns no threads.

extern crate alloc;

pub mod error;
pub mod grammar;
pub mod traits;
pub mod validation;

pub use error::*;
pub use grammar::{
    ComplexRule, Grammar, GrammarBuilder, NonterminalId, SimpleRule, SymbolTable, TerminalId,
};
pub use traits::{BoolMatrix, MultiplyOptions};
pub use validation::{parse_edge_line, parse_grammar_line, validate_grammar};
