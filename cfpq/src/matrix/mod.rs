//! Sparse Boolean matrices stored as sorted rows
//!
//! [`SparseBoolMatrix`] keeps one sorted `Vec<u32>` of column indices per
//! row together with a running count of set entries, so cardinality is
//! O(1) and row access during multiplication is a slice borrow.

pub mod dense;
mod kernel;

pub use dense::DenseBoolMatrix;

use cfpq_core::validation::{validate_dimension, validate_node};
use cfpq_core::{BoolMatrix, CoreError, MultiplyOptions, Result};

/// Square sparse Boolean matrix with sorted row storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseBoolMatrix {
    dimension: usize,
    rows: Vec<Vec<u32>>,
    nnz: usize,
}

impl SparseBoolMatrix {
    /// Build a matrix from `(row, col)` pairs; duplicates collapse
    pub fn from_pairs<I>(dimension: usize, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut matrix = Self::try_new(dimension)?;
        for (row, col) in pairs {
            matrix.insert(row, col)?;
        }
        Ok(matrix)
    }

    /// Sorted column indices set in `row`; empty when out of range
    pub fn row(&self, row: usize) -> &[u32] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of rows holding at least one entry
    pub fn nonempty_rows(&self) -> usize {
        self.rows.iter().filter(|row| !row.is_empty()).count()
    }

    fn check_same_dimension(&self, other: &Self) -> Result<()> {
        if self.dimension != other.dimension {
            return Err(CoreError::DimensionMismatch {
                expected: self.dimension,
                found: other.dimension,
            });
        }
        Ok(())
    }

    /// Merge sorted `additions` (disjoint from the row) into `row`
    fn merge_into_row(&mut self, row: usize, additions: &[u32]) -> Result<()> {
        let target = &mut self.rows[row];
        merge_disjoint(target, additions)?;
        self.nnz += additions.len();
        Ok(())
    }
}

/// In-place merge of two sorted, disjoint index lists
///
/// Walks both lists from the back so no temporary buffer is needed.
fn merge_disjoint(target: &mut Vec<u32>, additions: &[u32]) -> Result<()> {
    if additions.is_empty() {
        return Ok(());
    }
    target
        .try_reserve(additions.len())
        .map_err(|_| CoreError::ResourceExhausted {
            what: "matrix row growth",
        })?;

    let old_len = target.len();
    target.resize(old_len + additions.len(), 0);

    let mut write = target.len();
    let mut left = old_len;
    let mut right = additions.len();
    while right > 0 {
        write -= 1;
        if left > 0 && target[left - 1] > additions[right - 1] {
            target[write] = target[left - 1];
            left -= 1;
        } else {
            target[write] = additions[right - 1];
            right -= 1;
        }
    }
    Ok(())
}

/// Entries of sorted `other` that are missing from sorted `existing`
fn missing_from(existing: &[u32], other: &[u32]) -> Vec<u32> {
    let mut missing = Vec::new();
    let mut i = 0;
    for &col in other {
        while i < existing.len() && existing[i] < col {
            i += 1;
        }
        if i >= existing.len() || existing[i] != col {
            missing.push(col);
        }
    }
    missing
}

impl BoolMatrix for SparseBoolMatrix {
    fn try_new(dimension: usize) -> Result<Self> {
        validate_dimension(dimension)?;
        let mut rows = Vec::new();
        rows.try_reserve_exact(dimension)
            .map_err(|_| CoreError::ResourceExhausted { what: "matrix rows" })?;
        rows.resize_with(dimension, Vec::new);
        Ok(Self {
            dimension,
            rows,
            nnz: 0,
        })
    }

    fn try_duplicate(&self) -> Result<Self> {
        let mut rows = Vec::new();
        rows.try_reserve_exact(self.dimension)
            .map_err(|_| CoreError::ResourceExhausted {
                what: "matrix duplicate",
            })?;
        for row in &self.rows {
            let mut copy = Vec::new();
            copy.try_reserve_exact(row.len())
                .map_err(|_| CoreError::ResourceExhausted {
                    what: "matrix duplicate",
                })?;
            copy.extend_from_slice(row);
            rows.push(copy);
        }
        Ok(Self {
            dimension: self.dimension,
            rows,
            nnz: self.nnz,
        })
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn cardinality(&self) -> usize {
        self.nnz
    }

    fn contains(&self, row: usize, col: usize) -> bool {
        if col >= self.dimension {
            return false;
        }
        self.row(row).binary_search(&(col as u32)).is_ok()
    }

    fn insert(&mut self, row: usize, col: usize) -> Result<bool> {
        validate_node(row, self.dimension)?;
        validate_node(col, self.dimension)?;

        let target = &mut self.rows[row];
        match target.binary_search(&(col as u32)) {
            Ok(_) => Ok(false),
            Err(pos) => {
                target
                    .try_reserve(1)
                    .map_err(|_| CoreError::ResourceExhausted {
                        what: "matrix row growth",
                    })?;
                target.insert(pos, col as u32);
                self.nnz += 1;
                Ok(true)
            }
        }
    }

    fn union_with(&mut self, other: &Self) -> Result<usize> {
        self.check_same_dimension(other)?;
        let before = self.nnz;
        for (row, other_row) in other.rows.iter().enumerate() {
            if other_row.is_empty() {
                continue;
            }
            let missing = missing_from(&self.rows[row], other_row);
            self.merge_into_row(row, &missing)?;
        }
        Ok(self.nnz - before)
    }

    fn multiply_accumulate_or(&mut self, a: &Self, b: &Self) -> Result<usize> {
        self.multiply_accumulate_or_with(a, b, &MultiplyOptions::default())
    }

    fn multiply_accumulate_or_with(
        &mut self,
        a: &Self,
        b: &Self,
        options: &MultiplyOptions,
    ) -> Result<usize> {
        self.check_same_dimension(a)?;
        self.check_same_dimension(b)?;
        if a.nnz == 0 || b.nnz == 0 {
            return Ok(0);
        }

        let additions = if options.use_parallel(self.dimension) {
            kernel::product_additions_parallel(self, a, b, options.min_rows_per_task)?
        } else {
            kernel::product_additions(self, a, b, 0..self.dimension)?
        };

        let before = self.nnz;
        for (row, columns) in additions {
            self.merge_into_row(row, &columns)?;
        }
        Ok(self.nnz - before)
    }

    fn pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::with_capacity(self.nnz);
        for (row, cols) in self.rows.iter().enumerate() {
            pairs.extend(cols.iter().map(|&col| (row, col as usize)));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(dimension: usize, pairs: &[(usize, usize)]) -> SparseBoolMatrix {
        SparseBoolMatrix::from_pairs(dimension, pairs.iter().copied()).unwrap()
    }

    #[test]
    fn test_insert_and_cardinality() {
        let mut m = SparseBoolMatrix::try_new(4).unwrap();
        assert!(m.is_empty());
        assert!(m.insert(1, 3).unwrap());
        assert!(m.insert(1, 0).unwrap());
        assert!(!m.insert(1, 3).unwrap());
        assert_eq!(m.cardinality(), 2);
        assert_eq!(m.row(1), &[0, 3]);
        assert!(m.contains(1, 3));
        assert!(!m.contains(3, 1));
        assert!(!m.contains(9, 9));
        assert!(matches!(
            m.insert(4, 0),
            Err(CoreError::NodeOutOfRange { node: 4, .. })
        ));
    }

    #[test]
    fn test_duplicate_is_independent() {
        let source = matrix(3, &[(0, 1), (2, 2)]);
        let mut copy = source.try_duplicate().unwrap();
        assert_eq!(copy, source);

        copy.insert(1, 1).unwrap();
        assert_eq!(source.cardinality(), 2);
        assert_eq!(copy.cardinality(), 3);
    }

    #[test]
    fn test_union_with() {
        let mut left = matrix(4, &[(0, 1), (0, 3), (2, 2)]);
        let right = matrix(4, &[(0, 0), (0, 1), (0, 2), (3, 3)]);
        assert_eq!(left.union_with(&right).unwrap(), 3);
        assert_eq!(left.row(0), &[0, 1, 2, 3]);
        assert_eq!(left.cardinality(), 6);
        assert_eq!(left.union_with(&right).unwrap(), 0);
    }

    #[test]
    fn test_multiply_accumulate_or() {
        // 0 -a-> 1 -b-> 2, 0 -a-> 3 -b-> 2
        let a = matrix(4, &[(0, 1), (0, 3)]);
        let b = matrix(4, &[(1, 2), (3, 2)]);
        let mut dst = matrix(4, &[(3, 3)]);

        assert_eq!(dst.multiply_accumulate_or(&a, &b).unwrap(), 1);
        assert_eq!(dst.pairs(), vec![(0, 2), (3, 3)]);
        // Second application adds nothing.
        assert_eq!(dst.multiply_accumulate_or(&a, &b).unwrap(), 0);
    }

    #[test]
    fn test_multiply_keeps_existing_entries() {
        let a = matrix(3, &[(0, 1)]);
        let b = matrix(3, &[(1, 2)]);
        let mut dst = matrix(3, &[(0, 2), (0, 0)]);
        assert_eq!(dst.multiply_accumulate_or(&a, &b).unwrap(), 0);
        assert_eq!(dst.cardinality(), 2);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let n = 300;
        let a = SparseBoolMatrix::from_pairs(n, (0..n).map(|i| (i, (i * 7 + 1) % n))).unwrap();
        let b = SparseBoolMatrix::from_pairs(
            n,
            (0..n).flat_map(|i| [(i, (i * 3) % n), (i, (i + 5) % n)]),
        )
        .unwrap();

        let mut sequential = SparseBoolMatrix::try_new(n).unwrap();
        sequential
            .multiply_accumulate_or_with(&a, &b, &MultiplyOptions::sequential())
            .unwrap();

        let parallel_options = MultiplyOptions {
            parallel: true,
            parallel_row_threshold: 1,
            min_rows_per_task: 7,
        };
        let mut parallel = SparseBoolMatrix::try_new(n).unwrap();
        parallel
            .multiply_accumulate_or_with(&a, &b, &parallel_options)
            .unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(sequential.cardinality(), 2 * n);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = matrix(2, &[]);
        let mut dst = matrix(3, &[]);
        assert_eq!(
            dst.union_with(&a),
            Err(CoreError::DimensionMismatch {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn test_merge_disjoint() {
        let mut target = vec![1, 4, 9];
        merge_disjoint(&mut target, &[0, 5, 10]).unwrap();
        assert_eq!(target, vec![0, 1, 4, 5, 9, 10]);
    }
}
