//! Error types for CFPQ operations

/// Broad classification of [`CoreError`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The grammar or graph refers to ids outside their declared bounds
    Configuration,
    /// Storage for a matrix could not be obtained
    Resource,
    /// Malformed textual input
    Input,
    /// An operation was called in the wrong engine state
    State,
}

/// Errors that can occur while building or running a closure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A rule references a nonterminal id outside the nonterminal table
    NonterminalOutOfRange {
        /// Position of the offending rule in its rule list
        rule: usize,
        id: usize,
        count: usize,
    },
    /// A simple rule references a terminal id outside the terminal table
    TerminalOutOfRange {
        rule: usize,
        id: usize,
        count: usize,
    },
    /// Allocation failed while creating or duplicating a matrix
    ResourceExhausted {
        what: &'static str,
    },
    /// Dimension does not fit the `u32` index space
    DimensionTooLarge {
        dimension: usize,
    },
    /// Edge endpoint outside the node index space
    NodeOutOfRange {
        node: usize,
        dimension: usize,
    },
    /// Two matrices of different dimension were combined
    DimensionMismatch {
        expected: usize,
        found: usize,
    },
    /// Malformed grammar or edge-list line (1-based line number)
    Parse {
        line: usize,
        reason: &'static str,
    },
    /// No nonterminal with the requested name
    UnknownNonterminal,
    /// The graph has not been seeded yet
    NotSeeded,
    /// The closure is converged; no further passes are allowed
    ConvergenceAlreadyReached,
    /// The closure has not converged yet
    NotConverged,
}

impl CoreError {
    /// Get the category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::NonterminalOutOfRange { .. }
            | CoreError::TerminalOutOfRange { .. }
            | CoreError::NodeOutOfRange { .. }
            | CoreError::DimensionMismatch { .. } => ErrorCategory::Configuration,
            CoreError::ResourceExhausted { .. } | CoreError::DimensionTooLarge { .. } => {
                ErrorCategory::Resource
            }
            CoreError::Parse { .. } | CoreError::UnknownNonterminal => ErrorCategory::Input,
            CoreError::NotSeeded
            | CoreError::ConvergenceAlreadyReached
            | CoreError::NotConverged => ErrorCategory::State,
        }
    }

    /// Whether this error is a grammar/graph configuration error
    pub fn is_configuration(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }
}

impl core::fmt::Display for CoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CoreError::NonterminalOutOfRange { rule, id, count } => write!(
                f,
                "Rule {rule} references nonterminal {id} but only {count} are declared"
            ),
            CoreError::TerminalOutOfRange { rule, id, count } => write!(
                f,
                "Rule {rule} references terminal {id} but only {count} are declared"
            ),
            CoreError::ResourceExhausted { what } => write!(f, "Allocation failed: {what}"),
            CoreError::DimensionTooLarge { dimension } => {
                write!(f, "Matrix dimension {dimension} exceeds the u32 index space")
            }
            CoreError::NodeOutOfRange { node, dimension } => {
                write!(f, "Node {node} is outside the node space of size {dimension}")
            }
            CoreError::DimensionMismatch { expected, found } => {
                write!(f, "Matrix dimension mismatch: expected {expected}, found {found}")
            }
            CoreError::Parse { line, reason } => write!(f, "Line {line}: {reason}"),
            CoreError::UnknownNonterminal => write!(f, "Unknown nonterminal"),
            CoreError::NotSeeded => write!(f, "Closure has not been seeded"),
            CoreError::ConvergenceAlreadyReached => write!(f, "Closure already converged"),
            CoreError::NotConverged => write!(f, "Closure has not converged"),
        }
    }
}

impl core::error::Error for CoreError {}

/// Result type for CFPQ core operations
pub type Result<T> = core::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_categories() {
        let err = CoreError::NonterminalOutOfRange {
            rule: 0,
            id: 4,
            count: 2,
        };
        assert!(err.is_configuration());
        assert_eq!(
            CoreError::ResourceExhausted { what: "rows" }.category(),
            ErrorCategory::Resource
        );
        assert_eq!(CoreError::NotSeeded.category(), ErrorCategory::State);
    }

    #[test]
    fn test_display() {
        let err = CoreError::Parse {
            line: 3,
            reason: "expected 2 or 3 tokens",
        };
        assert_eq!(err.to_string(), "Line 3: expected 2 or 3 tokens");
    }
}
