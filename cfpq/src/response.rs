//! Closure output: one matrix per nonterminal plus the pass count

use cfpq_core::{BoolMatrix, CoreError, Grammar, NonterminalId};

use crate::{Result, SparseBoolMatrix};

/// Converged closure result
///
/// `matrices[n]` holds every node pair `(u, v)` connected by a path whose
/// label word derives nonterminal `n`. The response is read-only once it
/// is handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<M: BoolMatrix = SparseBoolMatrix> {
    matrices: Vec<M>,
    iteration_count: usize,
}

impl<M: BoolMatrix> Response<M> {
    pub(crate) fn new(matrices: Vec<M>, iteration_count: usize) -> Self {
        Self {
            matrices,
            iteration_count,
        }
    }

    /// Number of full passes over the complex rules, including the final
    /// pass that detected convergence
    pub fn iteration_count(&self) -> usize {
        self.iteration_count
    }

    pub fn nonterminal_count(&self) -> usize {
        self.matrices.len()
    }

    /// Matrix of one nonterminal
    pub fn matrix(&self, nonterminal: NonterminalId) -> Option<&M> {
        self.matrices.get(nonterminal.index())
    }

    /// Matrix of a nonterminal looked up by name
    pub fn matrix_by_name(&self, grammar: &Grammar, name: &str) -> Result<&M> {
        grammar
            .nonterminal_id(name)
            .and_then(|id| self.matrix(id))
            .ok_or_else(|| CoreError::UnknownNonterminal.into())
    }

    /// All matrices, indexed by nonterminal id
    pub fn matrices(&self) -> &[M] {
        &self.matrices
    }

    /// Whether a path from `from` to `to` derives `nonterminal`
    pub fn reachable(&self, nonterminal: NonterminalId, from: usize, to: usize) -> bool {
        self.matrix(nonterminal)
            .is_some_and(|matrix| matrix.contains(from, to))
    }

    /// Sum of cardinalities over all nonterminals
    pub fn total_cardinality(&self) -> usize {
        self.matrices.iter().map(BoolMatrix::cardinality).sum()
    }

    pub fn into_matrices(self) -> Vec<M> {
        self.matrices
    }
}
