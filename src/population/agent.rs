//! Agent type labels.

use serde::{Deserialize, Serialize};

/// Which of the two correlated information sources an agent privileges.
///
/// This is the single canonical encoding of type; the evaluator and the
/// assortativity diagnostics both consume it through [`AgentType::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentType {
    /// Attends to the first source
    A,
    /// Attends to the second source
    B,
}

impl AgentType {
    /// Both variants in index order.
    pub const ALL: [AgentType; 2] = [AgentType::A, AgentType::B];

    /// Column index used by per-type tables.
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    /// Two-hot weight vector over the sources.
    pub fn weights(self) -> [f64; 2] {
        match self {
            Self::A => [1.0, 0.0],
            Self::B => [0.0, 1.0],
        }
    }

    /// Short name for logs and tables.
    pub fn name(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Count agents of each type, indexed by [`AgentType::index`].
pub fn count_by_type<'a>(types: impl IntoIterator<Item = &'a AgentType>) -> [usize; 2] {
    let mut counts = [0usize; 2];
    for t in types {
        counts[t.index()] += 1;
    }
    counts
}
