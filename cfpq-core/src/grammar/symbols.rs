//! Bidirectional symbol table mapping names to dense ids

use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;

/// Insertion-ordered table of symbol names with O(1) lookup in both directions
///
/// Ids are assigned densely in first-seen order starting at zero and are
/// never reused. A table is used once for terminals and once for
/// nonterminals; the two id spaces are disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from names in order, collapsing duplicates
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for name in names {
            table.intern(name.as_ref());
        }
        table
    }

    /// Get the id of `name`, assigning the next free id if it is new
    pub fn intern(&mut self, name: &str) -> usize {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(String::from(name));
        self.index.insert(String::from(name), id);
        id
    }

    /// Look up the id of `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Look up the id of `name`, returning [`len`](Self::len) when absent
    ///
    /// The returned value equals the table size exactly when the name is
    /// unknown, so callers can compare against the count instead of
    /// matching on an `Option`.
    pub fn place_index(&self, name: &str) -> usize {
        self.index_of(name).unwrap_or(self.names.len())
    }

    /// Get the name stored under `id`
    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Number of symbols in the table
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table holds no symbols
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over `(id, name)` in id order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.names.iter().enumerate().map(|(id, name)| (id, name.as_str()))
    }
}
