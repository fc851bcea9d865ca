//! Grammar model in Chomsky normal form
//!
//! A [`Grammar`] holds two ordered rule lists and the symbol tables that
//! give meaning to the ids inside them. Rule order is significant: the
//! closure applies complex rules in declaration order.

pub mod rules;
pub mod symbols;

pub use rules::{ComplexRule, NonterminalId, SimpleRule, TerminalId};
pub use symbols::SymbolTable;

use alloc::vec::Vec;

use crate::validation::{parse_grammar_line, validate_grammar, GrammarLine};
use crate::Result;

/// Normalized grammar: simple rules, complex rules and symbol tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    nonterminals: SymbolTable,
    terminals: SymbolTable,
    simple_rules: Vec<SimpleRule>,
    complex_rules: Vec<ComplexRule>,
}

impl Grammar {
    /// Assemble a grammar from raw parts
    ///
    /// Rule operands are not checked here; call [`validate`](Self::validate)
    /// before using the grammar.
    pub fn from_parts(
        nonterminals: SymbolTable,
        terminals: SymbolTable,
        simple_rules: Vec<SimpleRule>,
        complex_rules: Vec<ComplexRule>,
    ) -> Self {
        Self {
            nonterminals,
            terminals,
            simple_rules,
            complex_rules,
        }
    }

    /// Parse the line-oriented CNF text format
    ///
    /// Each non-blank line is either `A a` (simple rule) or `S A B`
    /// (complex rule). Text after `#` is ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let mut builder = GrammarBuilder::new();
        for (line_no, line) in text.lines().enumerate() {
            match parse_grammar_line(line, line_no + 1)? {
                Some(GrammarLine::Simple { lhs, rhs }) => {
                    builder.simple_rule(lhs, rhs);
                }
                Some(GrammarLine::Complex { lhs, rhs1, rhs2 }) => {
                    builder.complex_rule(lhs, rhs1, rhs2);
                }
                None => {}
            }
        }
        Ok(builder.build())
    }

    /// Check that every rule operand is inside its symbol table
    pub fn validate(&self) -> Result<()> {
        validate_grammar(self)
    }

    pub fn nonterminals(&self) -> &SymbolTable {
        &self.nonterminals
    }

    pub fn terminals(&self) -> &SymbolTable {
        &self.terminals
    }

    pub fn simple_rules(&self) -> &[SimpleRule] {
        &self.simple_rules
    }

    pub fn complex_rules(&self) -> &[ComplexRule] {
        &self.complex_rules
    }

    /// Number of nonterminals (the length of a closure response)
    pub fn nonterminal_count(&self) -> usize {
        self.nonterminals.len()
    }

    /// Look up a terminal id by label
    pub fn terminal_id(&self, label: &str) -> Option<TerminalId> {
        self.terminals.index_of(label).map(TerminalId)
    }

    /// Look up a nonterminal id by name
    pub fn nonterminal_id(&self, name: &str) -> Option<NonterminalId> {
        self.nonterminals.index_of(name).map(NonterminalId)
    }

    /// Nonterminal with id 0, which is the lhs of the first rule read
    pub fn start_symbol(&self) -> Option<NonterminalId> {
        if self.nonterminals.is_empty() {
            None
        } else {
            Some(NonterminalId(0))
        }
    }

    /// Simple rules whose rhs is `terminal`
    pub fn rules_for_terminal(
        &self,
        terminal: TerminalId,
    ) -> impl Iterator<Item = &SimpleRule> + '_ {
        self.simple_rules
            .iter()
            .filter(move |rule| rule.rhs == terminal)
    }
}

/// Incremental grammar construction by symbol name
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    grammar: Grammar,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `lhs -> rhs` with `rhs` a terminal
    pub fn simple_rule(&mut self, lhs: &str, rhs: &str) -> &mut Self {
        let lhs = NonterminalId(self.grammar.nonterminals.intern(lhs));
        let rhs = TerminalId(self.grammar.terminals.intern(rhs));
        self.grammar.simple_rules.push(SimpleRule::new(lhs, rhs));
        self
    }

    /// Add `lhs -> rhs1 rhs2`
    pub fn complex_rule(&mut self, lhs: &str, rhs1: &str, rhs2: &str) -> &mut Self {
        let lhs = NonterminalId(self.grammar.nonterminals.intern(lhs));
        let rhs1 = NonterminalId(self.grammar.nonterminals.intern(rhs1));
        let rhs2 = NonterminalId(self.grammar.nonterminals.intern(rhs2));
        self.grammar
            .complex_rules
            .push(ComplexRule::new(lhs, rhs1, rhs2));
        self
    }

    /// Declare a nonterminal that may not appear in any rule yet
    pub fn nonterminal(&mut self, name: &str) -> NonterminalId {
        NonterminalId(self.grammar.nonterminals.intern(name))
    }

    pub fn build(&mut self) -> Grammar {
        core::mem::take(&mut self.grammar)
    }
}
