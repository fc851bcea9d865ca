//! Abstract interfaces for CFPQ matrix engines
//!
//! This module defines the matrix contract the closure engine is written
//! against. Traits are pure interfaces; concrete storage lives in the
//! `cfpq` crate.

pub mod matrix;

pub use matrix::{BoolMatrix, MultiplyOptions};
