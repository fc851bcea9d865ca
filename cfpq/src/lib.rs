//! CFPQ - context-free path queries over labeled graphs
//!
//! Given a grammar in Chomsky normal form over edge labels, this crate
//! computes for every nonterminal `N` the set of node pairs `(u, v)` such
//! that some path from `u` to `v` spells a word derived by `N`. The
//! closure is a fixpoint over sparse Boolean matrices under the OR/AND
//! semiring.
//!
//! ## Architecture
//!
//! - **cfpq-core**: grammar model, matrix contract, validation (no I/O)
//! - **cfpq**: matrix implementations, graphs, the fixpoint engine, loaders
//!
//! ## Quick Start
//!
//! ```rust
//! use cfpq::{compute_closure, GrammarBuilder, LabeledGraph};
//!
//! fn example() -> cfpq::Result<()> {
//!     let grammar = GrammarBuilder::new()
//!         .complex_rule("S", "A", "B")
//!         .simple_rule("A", "a")
//!         .simple_rule("B", "b")
//!         .build();
//!     let graph: LabeledGraph = LabeledGraph::from_edges(3, [(0, "a", 1), (1, "b", 2)])?;
//!
//!     let response = compute_closure(&graph, &grammar)?;
//!     let s = grammar.nonterminal_id("S").expect("declared above");
//!     assert!(response.reachable(s, 0, 2));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

// Re-export core abstractions
pub use cfpq_core::{
    BoolMatrix, ComplexRule, CoreError, ErrorCategory, Grammar, GrammarBuilder,
    MultiplyOptions, NonterminalId, SimpleRule, SymbolTable, TerminalId,
};

pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod loader;
pub mod matrix;
pub mod response;

pub use config::ClosureConfig;
pub use engine::{compute_closure, compute_closure_with, ClosureEngine, ClosureState, PassReport};
pub use error::{Error, Result};
pub use graph::LabeledGraph;
pub use loader::{load_grammar, load_graph};
pub use matrix::{DenseBoolMatrix, SparseBoolMatrix};
pub use response::Response;
