//! Labeled directed graphs as one Boolean adjacency matrix per label

use cfpq_core::validation::{parse_edge_line, validate_dimension, validate_node};
use cfpq_core::{BoolMatrix, CoreError, SymbolTable};

use crate::{Result, SparseBoolMatrix};

/// Directed graph over nodes `[0, node_count)` with string edge labels
///
/// Labels are kept in first-seen order; `label_matrices[i]` holds exactly
/// the edges labeled `labels.name(i)`. Repeated edges collapse.
#[derive(Debug, Clone)]
pub struct LabeledGraph<M: BoolMatrix = SparseBoolMatrix> {
    node_count: usize,
    labels: SymbolTable,
    label_matrices: Vec<M>,
}

impl<M: BoolMatrix> LabeledGraph<M> {
    /// Create a graph with no edges
    pub fn empty(node_count: usize) -> Result<Self> {
        validate_dimension(node_count)?;
        Ok(Self {
            node_count,
            labels: SymbolTable::new(),
            label_matrices: Vec::new(),
        })
    }

    /// Build a graph from `(from, label, to)` triples
    pub fn from_edges<I, S>(node_count: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, S, usize)>,
        S: AsRef<str>,
    {
        let mut graph = Self::empty(node_count)?;
        for (from, label, to) in edges {
            graph.add_edge(from, label.as_ref(), to)?;
        }
        Ok(graph)
    }

    /// Parse an edge list (`from label to` per line)
    ///
    /// Without an explicit `node_count` the node space is sized to the
    /// largest id seen plus one.
    pub fn from_edge_list(text: &str, node_count: Option<usize>) -> Result<Self> {
        let mut edges = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            if let Some(edge) = parse_edge_line(line, line_no + 1)? {
                edges.push(edge);
            }
        }

        let node_count = match node_count {
            Some(count) => count,
            None => {
                let largest = edges.iter().map(|edge| edge.from.max(edge.to)).max();
                match largest {
                    Some(id) => {
                        let count = id
                            .checked_add(1)
                            .ok_or(CoreError::DimensionTooLarge { dimension: id })?;
                        validate_dimension(count)?;
                        count
                    }
                    None => 0,
                }
            }
        };

        Self::from_edges(
            node_count,
            edges.iter().map(|edge| (edge.from, edge.label, edge.to)),
        )
    }

    /// Add one labeled edge, returning `true` if it is new
    pub fn add_edge(&mut self, from: usize, label: &str, to: usize) -> Result<bool> {
        validate_node(from, self.node_count)?;
        validate_node(to, self.node_count)?;

        let id = self.labels.intern(label);
        if id == self.label_matrices.len() {
            self.label_matrices.push(M::try_new(self.node_count)?);
        }
        Ok(self.label_matrices[id].insert(from, to)?)
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of distinct labeled edges
    pub fn edge_count(&self) -> usize {
        self.label_matrices.iter().map(BoolMatrix::cardinality).sum()
    }

    /// Number of distinct labels
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Adjacency matrix of one label
    pub fn label_matrix(&self, label: &str) -> Option<&M> {
        self.labels
            .index_of(label)
            .map(|id| &self.label_matrices[id])
    }

    /// `(label, matrix)` pairs in first-seen label order
    pub fn labels(&self) -> impl Iterator<Item = (&str, &M)> + '_ {
        self.labels
            .iter()
            .map(move |(id, name)| (name, &self.label_matrices[id]))
    }

    /// All edges as `(from, label, to)`, grouped by label
    pub fn edges(&self) -> impl Iterator<Item = (usize, &str, usize)> + '_ {
        self.labels().flat_map(|(label, matrix)| {
            matrix
                .pairs()
                .into_iter()
                .map(move |(from, to)| (from, label, to))
        })
    }
}
