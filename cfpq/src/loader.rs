//! File loading for grammars and edge lists

use std::fs;
use std::path::Path;

use cfpq_core::{BoolMatrix, Grammar};
use tracing::debug;

use crate::{Error, LabeledGraph, Result};

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a CNF grammar file
pub fn load_grammar<P: AsRef<Path>>(path: P) -> Result<Grammar> {
    let path = path.as_ref();
    let grammar = Grammar::parse(&read_text(path)?)?;
    debug!(
        path = %path.display(),
        nonterminals = grammar.nonterminal_count(),
        terminals = grammar.terminals().len(),
        "loaded grammar"
    );
    Ok(grammar)
}

/// Read a `from label to` edge list file
///
/// The node space is sized from the largest id in the file.
pub fn load_graph<M: BoolMatrix, P: AsRef<Path>>(path: P) -> Result<LabeledGraph<M>> {
    let path = path.as_ref();
    let graph = LabeledGraph::from_edge_list(&read_text(path)?, None)?;
    debug!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        labels = graph.label_count(),
        "loaded graph"
    );
    Ok(graph)
}
