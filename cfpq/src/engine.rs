//! Grammar-driven fixpoint closure over Boolean matrices
//!
//! The engine moves through `Uninitialized -> Seeding -> Iterating ->
//! Converged`. Seeding fills one matrix per nonterminal from the label
//! matrices matched by simple rules. Each pass then applies every complex
//! rule `lhs -> rhs1 rhs2` in declaration order as
//! `matrices[lhs] |= matrices[rhs1] · matrices[rhs2]`, reading matrices
//! already updated earlier in the same pass. A pass that grows no matrix
//! ends the closure; that final pass is counted.
//!
//! Matrices only grow and are bounded by `N²` pairs each, so the loop
//! always terminates.

use std::mem;

use cfpq_core::{BoolMatrix, ComplexRule, CoreError, Grammar, MultiplyOptions};
use rayon::ThreadPool;
use tracing::{debug, info, info_span, trace};

use crate::{ClosureConfig, LabeledGraph, Response, Result};

/// Lifecycle of a closure computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureState {
    /// Grammar validated, no matrices allocated
    Uninitialized,
    /// Nonterminal matrices are being filled from label matrices
    Seeding,
    /// Passes over complex rules are running
    Iterating,
    /// A full pass changed nothing; the result is final
    Converged,
}

/// Outcome of one pass over the complex rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    /// 1-based pass number
    pub pass: usize,
    /// Rules whose lhs matrix grew during this pass
    pub rules_changed: usize,
    /// Entries added across all matrices during this pass
    pub entries_added: usize,
    /// Sum of cardinalities after this pass
    pub total_cardinality: usize,
    /// Whether this pass detected the fixpoint
    pub converged: bool,
}

/// Stepwise closure driver
///
/// Most callers want [`compute_closure`]. Driving [`step`](Self::step) by
/// hand lets a caller stop between passes, e.g. to enforce a deadline.
pub struct ClosureEngine<'g, M: BoolMatrix = crate::SparseBoolMatrix> {
    grammar: &'g Grammar,
    options: MultiplyOptions,
    pool: Option<ThreadPool>,
    state: ClosureState,
    matrices: Vec<M>,
    iteration_count: usize,
}

impl<'g, M: BoolMatrix> ClosureEngine<'g, M> {
    /// Validate `grammar` and prepare an engine
    ///
    /// Out-of-range rule ids are reported here, before any matrix is
    /// allocated.
    pub fn new(grammar: &'g Grammar, config: &ClosureConfig) -> Result<Self> {
        grammar.validate()?;

        let pool = match config.threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("cfpq-worker-{i}"))
                    .build()?,
            ),
            None => None,
        };

        Ok(Self {
            grammar,
            options: config.multiply_options(),
            pool,
            state: ClosureState::Uninitialized,
            matrices: Vec::new(),
            iteration_count: 0,
        })
    }

    pub fn state(&self) -> ClosureState {
        self.state
    }

    /// Passes completed so far
    pub fn iteration_count(&self) -> usize {
        self.iteration_count
    }

    /// Working matrices, indexed by nonterminal id
    pub fn matrices(&self) -> &[M] {
        &self.matrices
    }

    /// Reset all nonterminal matrices and fill them from `graph`
    ///
    /// For every label that names a terminal, the label matrix is OR-ed
    /// into the matrix of each simple rule deriving that terminal. Labels
    /// unknown to the grammar are skipped.
    pub fn seed(&mut self, graph: &LabeledGraph<M>) -> Result<()> {
        self.state = ClosureState::Seeding;
        self.iteration_count = 0;

        let count = self.grammar.nonterminal_count();
        let mut matrices = Vec::new();
        matrices
            .try_reserve_exact(count)
            .map_err(|_| CoreError::ResourceExhausted {
                what: "nonterminal matrices",
            })?;
        for _ in 0..count {
            matrices.push(M::try_new(graph.node_count())?);
        }

        for (label, label_matrix) in graph.labels() {
            let Some(terminal) = self.grammar.terminal_id(label) else {
                debug!(label, "label is not a grammar terminal, skipping");
                continue;
            };
            for rule in self.grammar.rules_for_terminal(terminal) {
                matrices[rule.lhs.index()].union_with(label_matrix)?;
            }
        }

        self.matrices = matrices;
        self.state = ClosureState::Iterating;
        debug!(
            nonterminals = count,
            seeded = self.total_cardinality(),
            "seeding finished"
        );
        Ok(())
    }

    /// Run one full pass over the complex rules
    pub fn step(&mut self) -> Result<PassReport> {
        match self.state {
            ClosureState::Uninitialized | ClosureState::Seeding => {
                return Err(CoreError::NotSeeded.into())
            }
            ClosureState::Converged => return Err(CoreError::ConvergenceAlreadyReached.into()),
            ClosureState::Iterating => {}
        }

        let pool = self.pool.take();
        let outcome = match &pool {
            Some(pool) => pool.install(|| self.run_pass()),
            None => self.run_pass(),
        };
        self.pool = pool;
        outcome
    }

    fn run_pass(&mut self) -> Result<PassReport> {
        self.iteration_count += 1;
        let pass = self.iteration_count;
        let _span = info_span!("pass", pass).entered();

        let mut rules_changed = 0;
        let mut entries_added = 0;
        for (index, rule) in self.grammar.complex_rules().iter().enumerate() {
            let before = self.matrices[rule.lhs.index()].cardinality();
            apply_complex_rule(&mut self.matrices, rule, &self.options)?;
            let after = self.matrices[rule.lhs.index()].cardinality();

            if after != before {
                rules_changed += 1;
                entries_added += after - before;
            }
            trace!(rule = index, before, after, "applied complex rule");
        }

        let converged = rules_changed == 0;
        if converged {
            self.state = ClosureState::Converged;
        }

        let report = PassReport {
            pass,
            rules_changed,
            entries_added,
            total_cardinality: self.total_cardinality(),
            converged,
        };
        debug!(
            rules_changed,
            entries_added,
            total = report.total_cardinality,
            "pass finished"
        );
        Ok(report)
    }

    /// Step until a pass changes nothing
    pub fn run(&mut self) -> Result<()> {
        while self.state != ClosureState::Converged {
            self.step()?;
        }
        Ok(())
    }

    /// Hand the converged matrices over as a [`Response`]
    pub fn finish(self) -> Result<Response<M>> {
        if self.state != ClosureState::Converged {
            return Err(CoreError::NotConverged.into());
        }
        Ok(Response::new(self.matrices, self.iteration_count))
    }

    fn total_cardinality(&self) -> usize {
        self.matrices.iter().map(BoolMatrix::cardinality).sum()
    }
}

/// Apply `lhs |= rhs1 · rhs2` in place
///
/// The lhs matrix is moved out of the slice while it is written. When it
/// is also an operand (`S -> S S`), the operand reads a duplicate taken
/// before the write, so the product is computed from the pre-update value.
fn apply_complex_rule<M: BoolMatrix>(
    matrices: &mut [M],
    rule: &ComplexRule,
    options: &MultiplyOptions,
) -> Result<usize> {
    let lhs = rule.lhs.index();
    let mut dst = mem::take(&mut matrices[lhs]);

    let outcome = if rule.is_self_referential() {
        match dst.try_duplicate() {
            Ok(snapshot) => {
                let a = operand(matrices, rule.rhs1.index(), lhs, &snapshot);
                let b = operand(matrices, rule.rhs2.index(), lhs, &snapshot);
                dst.multiply_accumulate_or_with(a, b, options)
            }
            Err(err) => Err(err),
        }
    } else {
        dst.multiply_accumulate_or_with(
            &matrices[rule.rhs1.index()],
            &matrices[rule.rhs2.index()],
            options,
        )
    };

    matrices[lhs] = dst;
    Ok(outcome?)
}

fn operand<'a, M>(matrices: &'a [M], index: usize, lhs: usize, snapshot: &'a M) -> &'a M {
    if index == lhs {
        snapshot
    } else {
        &matrices[index]
    }
}

/// Compute the closure of `graph` under `grammar` with default settings
pub fn compute_closure<M: BoolMatrix>(
    graph: &LabeledGraph<M>,
    grammar: &Grammar,
) -> Result<Response<M>> {
    compute_closure_with(graph, grammar, &ClosureConfig::default())
}

/// Compute the closure of `graph` under `grammar`
pub fn compute_closure_with<M: BoolMatrix>(
    graph: &LabeledGraph<M>,
    grammar: &Grammar,
    config: &ClosureConfig,
) -> Result<Response<M>> {
    let _span = info_span!(
        "compute_closure",
        nodes = graph.node_count(),
        labels = graph.label_count()
    )
    .entered();
    info!(
        nonterminals = grammar.nonterminal_count(),
        simple_rules = grammar.simple_rules().len(),
        complex_rules = grammar.complex_rules().len(),
        "starting closure"
    );

    let mut engine = ClosureEngine::new(grammar, config)?;
    engine.seed(graph)?;
    engine.run()?;
    let response = engine.finish()?;

    info!(
        iterations = response.iteration_count(),
        total = response.total_cardinality(),
        "closure converged"
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DenseBoolMatrix, SparseBoolMatrix};
    use cfpq_core::{GrammarBuilder, NonterminalId, SimpleRule, SymbolTable, TerminalId};

    fn ab_grammar() -> Grammar {
        GrammarBuilder::new()
            .complex_rule("S", "A", "B")
            .simple_rule("A", "a")
            .simple_rule("B", "b")
            .build()
    }

    /// S -> a S b | a b, in CNF
    fn dyck_grammar() -> Grammar {
        GrammarBuilder::new()
            .complex_rule("S", "A", "B")
            .complex_rule("S", "A", "S1")
            .complex_rule("S1", "S", "B")
            .simple_rule("A", "a")
            .simple_rule("B", "b")
            .build()
    }

    fn id(grammar: &Grammar, name: &str) -> NonterminalId {
        grammar.nonterminal_id(name).unwrap()
    }

    #[test]
    fn test_seeding_single_edge() {
        let grammar = GrammarBuilder::new().simple_rule("S", "a").build();
        let graph: LabeledGraph = LabeledGraph::from_edges(2, [(0, "a", 1)]).unwrap();

        let response = compute_closure(&graph, &grammar).unwrap();
        assert_eq!(response.matrix(id(&grammar, "S")).unwrap().pairs(), vec![(0, 1)]);
        assert_eq!(response.iteration_count(), 1);
    }

    #[test]
    fn test_binary_composition() {
        let grammar = ab_grammar();
        let graph: LabeledGraph = LabeledGraph::from_edges(3, [(0, "a", 1), (1, "b", 2)]).unwrap();

        let response = compute_closure(&graph, &grammar).unwrap();
        let pairs = |name| response.matrix(id(&grammar, name)).unwrap().pairs();
        assert_eq!(pairs("S"), vec![(0, 2)]);
        assert_eq!(pairs("A"), vec![(0, 1)]);
        assert_eq!(pairs("B"), vec![(1, 2)]);
        assert_eq!(response.iteration_count(), 2);
    }

    #[test]
    fn test_unknown_label_is_ignored() {
        let grammar = ab_grammar();
        let graph: LabeledGraph =
            LabeledGraph::from_edges(3, [(0, "a", 1), (1, "z", 2), (2, "b", 0)]).unwrap();

        let response = compute_closure(&graph, &grammar).unwrap();
        assert_eq!(response.total_cardinality(), 2);
        assert!(response.matrices().iter().all(|m| !m.contains(1, 2)));
    }

    #[test]
    fn test_empty_graph() {
        let grammar = dyck_grammar();
        for graph in [
            LabeledGraph::<SparseBoolMatrix>::empty(0).unwrap(),
            LabeledGraph::<SparseBoolMatrix>::empty(5).unwrap(),
        ] {
            let response = compute_closure(&graph, &grammar).unwrap();
            assert_eq!(response.nonterminal_count(), grammar.nonterminal_count());
            assert_eq!(response.total_cardinality(), 0);
            assert_eq!(response.iteration_count(), 1);
        }
    }

    #[test]
    fn test_simple_rules_union_into_one_nonterminal() {
        let grammar = GrammarBuilder::new()
            .simple_rule("A", "a")
            .simple_rule("A", "b")
            .build();
        let graph: LabeledGraph = LabeledGraph::from_edges(3, [(0, "a", 1), (1, "b", 2)]).unwrap();

        let response = compute_closure(&graph, &grammar).unwrap();
        assert_eq!(response.matrices()[0].pairs(), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_dyck_on_cycle() {
        // a-cycle of length 2 and b-cycle of length 3 sharing node 0
        let graph: LabeledGraph = LabeledGraph::from_edges(
            4,
            [(0, "a", 1), (1, "a", 0), (0, "b", 2), (2, "b", 3), (3, "b", 0)],
        )
        .unwrap();
        let grammar = dyck_grammar();
        let sparse = compute_closure(&graph, &grammar).unwrap();

        let dense_graph: LabeledGraph<DenseBoolMatrix> =
            LabeledGraph::from_edges(4, graph.edges()).unwrap();
        let dense = compute_closure(&dense_graph, &grammar).unwrap();

        for (s, d) in sparse.matrices().iter().zip(dense.matrices()) {
            assert_eq!(s.pairs(), d.pairs());
        }
        assert_eq!(sparse.iteration_count(), dense.iteration_count());
        assert!(sparse.reachable(id(&grammar, "S"), 0, 0));
    }

    #[test]
    fn test_self_referential_rule() {
        // S -> S S, S -> a over a path: transitive closure of the a-edges
        let grammar = GrammarBuilder::new()
            .complex_rule("S", "S", "S")
            .simple_rule("S", "a")
            .build();
        let graph: LabeledGraph =
            LabeledGraph::from_edges(4, [(0, "a", 1), (1, "a", 2), (2, "a", 3)]).unwrap();

        let response = compute_closure(&graph, &grammar).unwrap();
        assert_eq!(
            response.matrices()[0].pairs(),
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );
    }

    #[test]
    fn test_state_machine() {
        let grammar = ab_grammar();
        let graph: LabeledGraph = LabeledGraph::from_edges(3, [(0, "a", 1), (1, "b", 2)]).unwrap();
        let mut engine: ClosureEngine<'_, SparseBoolMatrix> =
            ClosureEngine::new(&grammar, &ClosureConfig::sequential()).unwrap();

        assert_eq!(engine.state(), ClosureState::Uninitialized);
        assert!(engine.step().is_err());

        engine.seed(&graph).unwrap();
        assert_eq!(engine.state(), ClosureState::Iterating);

        let first = engine.step().unwrap();
        assert_eq!(first.pass, 1);
        assert_eq!(first.rules_changed, 1);
        assert_eq!(first.entries_added, 1);
        assert!(!first.converged);

        let second = engine.step().unwrap();
        assert!(second.converged);
        assert_eq!(second.total_cardinality, 3);
        assert_eq!(engine.state(), ClosureState::Converged);
        assert!(matches!(
            engine.step(),
            Err(crate::Error::Core(CoreError::ConvergenceAlreadyReached))
        ));

        let response = engine.finish().unwrap();
        assert_eq!(response.iteration_count(), 2);
    }

    #[test]
    fn test_finish_before_convergence() {
        let grammar = ab_grammar();
        let engine: ClosureEngine<'_, SparseBoolMatrix> =
            ClosureEngine::new(&grammar, &ClosureConfig::default()).unwrap();
        assert!(matches!(
            engine.finish(),
            Err(crate::Error::Core(CoreError::NotConverged))
        ));
    }

    #[test]
    fn test_configuration_error_before_start() {
        let grammar = Grammar::from_parts(
            SymbolTable::from_names(["S"]),
            SymbolTable::from_names(["a"]),
            vec![SimpleRule::new(NonterminalId(0), TerminalId(5))],
            vec![],
        );
        let graph: LabeledGraph = LabeledGraph::from_edges(2, [(0, "a", 1)]).unwrap();

        let err = compute_closure(&graph, &grammar).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_dedicated_pool() {
        let grammar = dyck_grammar();
        let graph: LabeledGraph = LabeledGraph::from_edges(
            3,
            [(0, "a", 1), (1, "a", 2), (2, "b", 0), (0, "b", 2)],
        )
        .unwrap();
        let config = ClosureConfig::default()
            .with_threads(2)
            .with_parallel_row_threshold(1)
            .with_min_rows_per_task(1);

        let parallel = compute_closure_with(&graph, &grammar, &config).unwrap();
        let sequential =
            compute_closure_with(&graph, &grammar, &ClosureConfig::sequential()).unwrap();
        assert_eq!(parallel, sequential);
    }

    /// Sparse matrix whose products always run out of memory
    #[derive(Debug, Clone, Default, PartialEq)]
    struct ExhaustedMatrix(SparseBoolMatrix);

    impl BoolMatrix for ExhaustedMatrix {
        fn try_new(dimension: usize) -> cfpq_core::Result<Self> {
            SparseBoolMatrix::try_new(dimension).map(Self)
        }

        fn try_duplicate(&self) -> cfpq_core::Result<Self> {
            self.0.try_duplicate().map(Self)
        }

        fn dimension(&self) -> usize {
            self.0.dimension()
        }

        fn cardinality(&self) -> usize {
            self.0.cardinality()
        }

        fn contains(&self, row: usize, col: usize) -> bool {
            self.0.contains(row, col)
        }

        fn insert(&mut self, row: usize, col: usize) -> cfpq_core::Result<bool> {
            self.0.insert(row, col)
        }

        fn union_with(&mut self, other: &Self) -> cfpq_core::Result<usize> {
            self.0.union_with(&other.0)
        }

        fn multiply_accumulate_or(&mut self, _a: &Self, _b: &Self) -> cfpq_core::Result<usize> {
            Err(CoreError::ResourceExhausted { what: "product rows" })
        }

        fn pairs(&self) -> Vec<(usize, usize)> {
            self.0.pairs()
        }
    }

    #[test]
    fn test_allocation_failure_aborts_query() {
        let grammar = ab_grammar();
        let graph: LabeledGraph<ExhaustedMatrix> =
            LabeledGraph::from_edges(3, [(0, "a", 1), (1, "b", 2)]).unwrap();

        let err = compute_closure(&graph, &grammar).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Core(CoreError::ResourceExhausted { .. })
        ));
        assert!(!err.is_configuration());

        let mut engine = ClosureEngine::new(&grammar, &ClosureConfig::sequential()).unwrap();
        engine.seed(&graph).unwrap();
        assert!(engine.step().is_err());
        // The lhs matrix is restored after the failed rule.
        let s = id(&grammar, "S").index();
        assert_eq!(engine.matrices()[s].dimension(), 3);
        assert_eq!(engine.iteration_count(), 1);
        assert!(matches!(
            engine.finish(),
            Err(crate::Error::Core(CoreError::NotConverged))
        ));
    }
}
