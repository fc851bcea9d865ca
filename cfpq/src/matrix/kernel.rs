//! Row-wise Boolean Gustavson multiply
//!
//! For every row `i` of `a`, the columns `k` reachable through some `j` in
//! `a.row(i)` are collected by walking `b.row(j)`. A generation-stamped
//! marker array stands in for a dense accumulator: bumping the stamp
//! clears it in O(1). Columns already present in the destination row are
//! pre-marked, so only genuinely new entries are reported.

use std::ops::Range;

use cfpq_core::{CoreError, Result};
use rayon::prelude::*;

use super::SparseBoolMatrix;

/// New columns for one destination row, sorted ascending
pub(super) type RowAdditions = (usize, Vec<u32>);

struct RowAccumulator {
    stamps: Vec<u32>,
    stamp: u32,
    touched: Vec<u32>,
}

/// Grow `vec` by `additional` slots or report exhaustion of `what`
fn reserve<T>(vec: &mut Vec<T>, additional: usize, what: &'static str) -> Result<()> {
    vec.try_reserve(additional)
        .map_err(|_| CoreError::ResourceExhausted { what })
}

impl RowAccumulator {
    /// Both buffers are sized for a full row up front; `touched` never
    /// holds more than `dimension` columns, so pushes never reallocate.
    fn new(dimension: usize) -> Result<Self> {
        let mut stamps = Vec::new();
        reserve(&mut stamps, dimension, "multiply accumulator")?;
        stamps.resize(dimension, 0);

        let mut touched = Vec::new();
        reserve(&mut touched, dimension, "multiply accumulator")?;

        Ok(Self {
            stamps,
            stamp: 0,
            touched,
        })
    }

    fn next_stamp(&mut self) {
        self.stamp = self.stamp.wrapping_add(1);
        if self.stamp == 0 {
            self.stamps.fill(0);
            self.stamp = 1;
        }
    }

    /// Columns of `(a · b)[row]` missing from `existing`
    fn additions(
        &mut self,
        existing: &[u32],
        a_row: &[u32],
        b: &SparseBoolMatrix,
    ) -> Result<Option<Vec<u32>>> {
        self.next_stamp();
        let stamp = self.stamp;

        for &col in existing {
            self.stamps[col as usize] = stamp;
        }

        self.touched.clear();
        for &mid in a_row {
            for &col in b.row(mid as usize) {
                let slot = &mut self.stamps[col as usize];
                if *slot != stamp {
                    *slot = stamp;
                    self.touched.push(col);
                }
            }
        }

        if self.touched.is_empty() {
            return Ok(None);
        }
        let mut columns = Vec::new();
        reserve(&mut columns, self.touched.len(), "product row")?;
        columns.extend_from_slice(&self.touched);
        columns.sort_unstable();
        Ok(Some(columns))
    }
}

/// Sequential product over a range of rows
pub(super) fn product_additions(
    dst: &SparseBoolMatrix,
    a: &SparseBoolMatrix,
    b: &SparseBoolMatrix,
    rows: Range<usize>,
) -> Result<Vec<RowAdditions>> {
    let mut accumulator = RowAccumulator::new(dst.dimension)?;
    let mut additions = Vec::new();

    for row in rows {
        let a_row = a.row(row);
        let existing = dst.row(row);
        // Empty left row or saturated destination row cannot change.
        if a_row.is_empty() || existing.len() == dst.dimension {
            continue;
        }
        if let Some(columns) = accumulator.additions(existing, a_row, b)? {
            reserve(&mut additions, 1, "product rows")?;
            additions.push((row, columns));
        }
    }

    Ok(additions)
}

/// Row-block parallel product
///
/// Rows are split into contiguous blocks, one accumulator per block. Block
/// size follows the thread count with a floor of `min_rows_per_task`. The
/// first block that fails to allocate fails the whole product.
pub(super) fn product_additions_parallel(
    dst: &SparseBoolMatrix,
    a: &SparseBoolMatrix,
    b: &SparseBoolMatrix,
    min_rows_per_task: usize,
) -> Result<Vec<RowAdditions>> {
    let dimension = dst.dimension;
    let num_threads = rayon::current_num_threads();

    // A few blocks per thread leaves room for work stealing on skewed rows.
    let block_size = dimension
        .div_ceil(num_threads * 4)
        .max(min_rows_per_task)
        .max(1);

    let blocks: Vec<Range<usize>> = (0..dimension)
        .step_by(block_size)
        .map(|start| start..(start + block_size).min(dimension))
        .collect();

    blocks
        .into_par_iter()
        .map(|rows| product_additions(dst, a, b, rows))
        .try_reduce(Vec::new, |mut acc, mut block| {
            reserve(&mut acc, block.len(), "product rows")?;
            acc.append(&mut block);
            Ok(acc)
        })
}
