//! Normalized grammar rules and the typed ids they refer to

/// Dense id of a terminal symbol (an edge label)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerminalId(pub usize);

/// Dense id of a nonterminal symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NonterminalId(pub usize);

impl TerminalId {
    /// Get the raw index
    pub const fn index(self) -> usize {
        self.0
    }
}

impl NonterminalId {
    /// Get the raw index
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Production `lhs -> rhs` where `rhs` is a terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleRule {
    pub lhs: NonterminalId,
    pub rhs: TerminalId,
}

impl SimpleRule {
    /// Create a new simple rule
    pub const fn new(lhs: NonterminalId, rhs: TerminalId) -> Self {
        Self { lhs, rhs }
    }
}

/// Production `lhs -> rhs1 rhs2` over nonterminals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComplexRule {
    pub lhs: NonterminalId,
    pub rhs1: NonterminalId,
    pub rhs2: NonterminalId,
}

impl ComplexRule {
    /// Create a new complex rule
    pub const fn new(lhs: NonterminalId, rhs1: NonterminalId, rhs2: NonterminalId) -> Self {
        Self { lhs, rhs1, rhs2 }
    }

    /// Whether the lhs matrix is also one of the operands
    pub fn is_self_referential(&self) -> bool {
        self.lhs == self.rhs1 || self.lhs == self.rhs2
    }
}
