//! Balanced-bracket reachability over two cycles of coprime length
//!
//! Run with: cargo run --example dyck_query

use cfpq::{compute_closure, BoolMatrix, GrammarBuilder, LabeledGraph};
use std::time::Instant;

fn main() -> cfpq::Result<()> {
    // S -> a S b | a b
    let grammar = GrammarBuilder::new()
        .complex_rule("S", "A", "B")
        .complex_rule("S", "A", "S1")
        .complex_rule("S1", "S", "B")
        .simple_rule("A", "a")
        .simple_rule("B", "b")
        .build();

    // a-cycle 0 -> 1 -> 0 and b-cycle 0 -> 2 -> 3 -> 0
    let graph: LabeledGraph = LabeledGraph::from_edges(
        4,
        [
            (0, "a", 1),
            (1, "a", 0),
            (0, "b", 2),
            (2, "b", 3),
            (3, "b", 0),
        ],
    )?;

    let start = Instant::now();
    let response = compute_closure(&graph, &grammar)?;
    let duration = start.elapsed();

    println!("=== Dyck query over two cycles ===");
    for (id, name) in grammar.nonterminals().iter() {
        println!("  {name}: {} pairs", response.matrices()[id].cardinality());
    }
    println!("Iterations: {}", response.iteration_count());

    if let Some(s) = grammar.nonterminal_id("S") {
        println!("S pairs:");
        for (from, to) in response.matrices()[s.index()].pairs() {
            println!("  {from} -> {to}");
        }
    }

    println!("Closure computed in {duration:.2?}");
    Ok(())
}
