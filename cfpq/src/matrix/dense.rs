//! Dense bitset Boolean matrix for small graphs

use cfpq_core::validation::{validate_dimension, validate_node};
use cfpq_core::{BoolMatrix, CoreError, Result};

const WORD_BITS: usize = 64;

/// Square Boolean matrix stored as one bitset per row
///
/// Memory is `dimension² / 8` bytes regardless of content, so this is only
/// a good fit for small node spaces. Multiplication ORs whole rows of `b`
/// word by word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DenseBoolMatrix {
    dimension: usize,
    words_per_row: usize,
    bits: Vec<u64>,
    nnz: usize,
}

impl DenseBoolMatrix {
    fn row_words(&self, row: usize) -> &[u64] {
        let start = row * self.words_per_row;
        &self.bits[start..start + self.words_per_row]
    }

    fn locate(&self, row: usize, col: usize) -> (usize, u64) {
        (
            row * self.words_per_row + col / WORD_BITS,
            1u64 << (col % WORD_BITS),
        )
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

    fn allocate_words(len: usize, what: &'static str) -> Result<Vec<u64>> {
        let mut bits = Vec::new();
        bits.try_reserve_exact(len)
            .map_err(|_| CoreError::ResourceExhausted { what })?;
        bits.resize(len, 0);
        Ok(bits)
    }
}

/// Iterate set bit positions of a row, in ascending order
fn set_bits(words: &[u64]) -> impl Iterator<Item = usize> + '_ {
    words.iter().enumerate().flat_map(|(w, &word)| {
        let mut remaining = word;
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            let bit = remaining.trailing_zeros() as usize;
            remaining &= remaining - 1;
            Some(w * WORD_BITS + bit)
        })
    })
}

impl BoolMatrix for DenseBoolMatrix {
    fn try_new(dimension: usize) -> Result<Self> {
        validate_dimension(dimension)?;
        let words_per_row = dimension.div_ceil(WORD_BITS);
        let len = words_per_row
            .checked_mul(dimension)
            .ok_or(CoreError::ResourceExhausted {
                what: "dense matrix size",
            })?;
        Ok(Self {
            dimension,
            words_per_row,
            bits: Self::allocate_words(len, "dense matrix")?,
            nnz: 0,
        })
    }

    fn try_duplicate(&self) -> Result<Self> {
        let mut bits = Vec::new();
        bits.try_reserve_exact(self.bits.len())
            .map_err(|_| CoreError::ResourceExhausted {
                what: "dense matrix duplicate",
            })?;
        bits.extend_from_slice(&self.bits);
        Ok(Self {
            dimension: self.dimension,
            words_per_row: self.words_per_row,
            bits,
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
        if row >= self.dimension || col >= self.dimension {
            return false;
        }
        let (word, mask) = self.locate(row, col);
        self.bits[word] & mask != 0
    }

    fn insert(&mut self, row: usize, col: usize) -> Result<bool> {
        validate_node(row, self.dimension)?;
        validate_node(col, self.dimension)?;
        let (word, mask) = self.locate(row, col);
        if self.bits[word] & mask != 0 {
            return Ok(false);
        }
        self.bits[word] |= mask;
        self.nnz += 1;
        Ok(true)
    }

    fn union_with(&mut self, other: &Self) -> Result<usize> {
        self.check_same_dimension(other)?;
        let mut added = 0;
        for (word, &incoming) in self.bits.iter_mut().zip(&other.bits) {
            let fresh = incoming & !*word;
            added += fresh.count_ones() as usize;
            *word |= fresh;
        }
        self.nnz += added;
        Ok(added)
    }

    fn multiply_accumulate_or(&mut self, a: &Self, b: &Self) -> Result<usize> {
        self.check_same_dimension(a)?;
        self.check_same_dimension(b)?;

        let mut scratch = Self::allocate_words(self.words_per_row, "dense scratch row")?;
        let mut added = 0;
        for row in 0..self.dimension {
            scratch.fill(0);
            let mut any = false;
            for mid in set_bits(a.row_words(row)) {
                for (acc, &word) in scratch.iter_mut().zip(b.row_words(mid)) {
                    *acc |= word;
                }
                any = true;
            }
            if !any {
                continue;
            }

            let start = row * self.words_per_row;
            for (word, &product) in self.bits[start..start + self.words_per_row]
                .iter_mut()
                .zip(&scratch)
            {
                let fresh = product & !*word;
                added += fresh.count_ones() as usize;
                *word |= fresh;
            }
        }
        self.nnz += added;
        Ok(added)
    }

    fn pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::with_capacity(self.nnz);
        for row in 0..self.dimension {
            pairs.extend(set_bits(self.row_words(row)).map(|col| (row, col)));
        }
        pairs
    }
}
