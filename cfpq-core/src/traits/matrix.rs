//! Boolean matrix contract over the OR/AND semiring
//!
//! Any implementation satisfying this trait can drive a closure: dense
//! bitsets for small graphs, sorted sparse rows for large sparse graphs.

use crate::Result;

/// Square Boolean matrix over a fixed node index space
///
/// A matrix is conceptually a set of `(row, col)` pairs. During a closure
/// pairs are only ever added. Storage is released on `Drop`.
pub trait BoolMatrix: Clone + Default + Send + Sync {
    /// Allocate an empty `dimension x dimension` matrix
    ///
    /// Fails only when storage cannot be obtained or the dimension does not
    /// fit the implementation's index type.
    fn try_new(dimension: usize) -> Result<Self>;

    /// Produce an independent copy with identical pairs
    ///
    /// Unlike `clone`, allocation failure is reported instead of aborting.
    fn try_duplicate(&self) -> Result<Self>;

    /// Side length of the matrix
    fn dimension(&self) -> usize;

    /// Number of set entries
    ///
    /// Implementations keep this count up to date so the call is O(1).
    fn cardinality(&self) -> usize;

    /// Whether `(row, col)` is set; out-of-range positions are unset
    fn contains(&self, row: usize, col: usize) -> bool;

    /// Set `(row, col)`, returning `true` if it was not set before
    fn insert(&mut self, row: usize, col: usize) -> Result<bool>;

    /// Entrywise OR of `other` into `self`, returning the number of new entries
    fn union_with(&mut self, other: &Self) -> Result<usize>;

    /// Compute `self |= a · b` over the Boolean semiring
    ///
    /// Entry `(i, k)` of the product is set iff some `j` has both `a(i, j)`
    /// and `b(j, k)` set. Returns the number of entries newly set in
    /// `self`. All three matrices must share one dimension.
    fn multiply_accumulate_or(&mut self, a: &Self, b: &Self) -> Result<usize>;

    /// [`multiply_accumulate_or`](Self::multiply_accumulate_or) with explicit tuning
    fn multiply_accumulate_or_with(
        &mut self,
        a: &Self,
        b: &Self,
        options: &MultiplyOptions,
    ) -> Result<usize> {
        let _ = options;
        self.multiply_accumulate_or(a, b)
    }

    /// All set entries in row-major order
    fn pairs(&self) -> alloc::vec::Vec<(usize, usize)>;

    /// Whether no entry is set
    fn is_empty(&self) -> bool {
        self.cardinality() == 0
    }
}

/// Tuning knobs for [`BoolMatrix::multiply_accumulate_or_with`]
///
/// Implementations without internal parallelism ignore these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiplyOptions {
    /// Allow row-parallel evaluation of the product
    pub parallel: bool,
    /// Matrices with fewer rows than this are multiplied sequentially
    pub parallel_row_threshold: usize,
    /// Lower bound on rows handed to one parallel task
    pub min_rows_per_task: usize,
}

impl MultiplyOptions {
    /// Options that never split work across threads
    pub const fn sequential() -> Self {
        Self {
            parallel: false,
            parallel_row_threshold: usize::MAX,
            min_rows_per_task: 1,
        }
    }

    /// Whether a product over `rows` rows should run in parallel
    pub fn use_parallel(&self, rows: usize) -> bool {
        self.parallel && rows >= self.parallel_row_threshold
    }
}

impl Default for MultiplyOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_row_threshold: 1024,
            min_rows_per_task: 64,
        }
    }
}
