use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cfpq::{
    compute_closure_with, load_grammar, load_graph, BoolMatrix, ClosureConfig, DenseBoolMatrix,
    Grammar, LabeledGraph, SparseBoolMatrix,
};

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(
    about = "CFPQ - compute context-free path query closures over labeled graphs"
)]
struct Cli {
    /// Edge list file, one `from label to` triple per line
    graph: PathBuf,

    /// Grammar file in CNF, one `A a` or `S A B` rule per line
    grammar: PathBuf,

    /// Worker threads (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Multiply on the calling thread only
    #[arg(long)]
    sequential: bool,

    /// Use dense bitset matrices instead of sparse rows
    #[arg(long)]
    dense: bool,

    /// Nonterminal whose reachable pairs are printed with --pairs
    #[arg(long, requires = "pairs")]
    start: Option<String>,

    /// Print every reachable pair of the start nonterminal
    #[arg(long)]
    pairs: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let grammar = load_grammar(&cli.grammar)?;

    if cli.dense {
        run::<DenseBoolMatrix>(&cli, &grammar)
    } else {
        run::<SparseBoolMatrix>(&cli, &grammar)
    }
}

fn run<M: BoolMatrix>(cli: &Cli, grammar: &Grammar) -> Result<(), Box<dyn std::error::Error>> {
    let graph: LabeledGraph<M> = load_graph(&cli.graph)?;

    let mut config = if cli.sequential {
        ClosureConfig::sequential()
    } else {
        ClosureConfig::default().with_parallel_row_threshold(
            ClosureConfig::optimal_parallel_threshold(graph.node_count(), graph.edge_count()),
        )
    };
    if let Some(threads) = cli.threads {
        config = config.with_threads(threads);
    }

    let start_time = Instant::now();
    let response = compute_closure_with(&graph, grammar, &config)?;
    let elapsed = start_time.elapsed();

    for (id, name) in grammar.nonterminals().iter() {
        println!("{name}: {}", response.matrices()[id].cardinality());
    }
    println!("Iterations: {}", response.iteration_count());

    if cli.pairs {
        let start = match &cli.start {
            Some(name) => name.as_str(),
            None => grammar
                .start_symbol()
                .and_then(|id| grammar.nonterminals().name(id.index()))
                .ok_or("grammar has no nonterminals")?,
        };
        for (from, to) in response.matrix_by_name(grammar, start)?.pairs() {
            println!("{from} {to}");
        }
    }

    println!("Total time: {:.6} s", elapsed.as_secs_f64());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_requires_pairs() {
        let err = Cli::try_parse_from(["cfpq", "g.txt", "q.txt", "--start", "S"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from(["cfpq", "g.txt", "q.txt", "--start", "S", "--pairs"]).unwrap();
        assert_eq!(cli.start.as_deref(), Some("S"));
        assert!(cli.pairs);
    }
}
