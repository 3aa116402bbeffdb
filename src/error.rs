//! Cascade model error types.
//!
//! # Error Classification
//!
//! Errors fall into two groups:
//!
//! - **Precondition violations**: the caller handed the model a configuration
//!   or state it cannot work with (odd population for a balanced split, odd
//!   mean degree for an undirected generator, a complete graph that must grow
//!   another tie, an incorrect active agent with no active neighbour). These
//!   fail fast and are reproducible under a fixed seed.
//! - **Numerical breakdowns**: a diagnostic has no defined value for the
//!   input (no edges, a single type, a constant trait) or an iteration failed
//!   to converge.
//!
//! Rounds in which nothing can happen (no active agents, a correct agent was
//! selected) are not errors; see [`crate::adaptation::AdaptationOutcome`].

use thiserror::Error;

/// Cascade model errors.
#[derive(Error, Debug)]
pub enum CascadeError {
    /// Balanced type assignment needs an even population.
    #[error("Cannot split {0} agents into two equal type groups")]
    OddPopulation(usize),

    /// Mean degree is incompatible with the requested topology.
    #[error("Invalid degree: {0}")]
    InvalidDegree(String),

    /// Source correlation outside `[-1, 1]`.
    #[error("Invalid correlation {0}: must lie in [-1, 1]")]
    InvalidCorrelation(f64),

    /// Generic out-of-range parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A topology generator could not produce a simple graph.
    #[error("Topology generation failed: {0}")]
    TopologyGeneration(String),

    /// Isolated node repair found no edge that could be removed safely.
    #[error("Cannot attach isolated node {0}: no redundant edge to remove")]
    NoRedundantEdge(usize),

    /// Every agent is already tied to every other agent.
    #[error("Cannot form a new tie: network is complete")]
    GraphComplete,

    /// An incorrect active agent has no active neighbour to drop.
    #[error("Agent {0} is incorrect and active but has no active neighbour")]
    NoActiveNeighbor(usize),

    /// Array lengths disagree with the population size.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Diagnostic requires at least one edge.
    #[error("Network has no edges")]
    EmptyNetwork,

    /// Categorical assortativity is undefined when `Q_max` is zero.
    #[error("Assortativity undefined: only one type carries edges")]
    DegenerateTypes,

    /// Continuous assortativity is undefined for a constant trait.
    #[error("Assortativity undefined: trait has zero variance")]
    DegenerateTrait,

    /// Personalized PageRank did not reach tolerance.
    #[error("Personalized PageRank for node {node} did not converge in {iterations} iterations")]
    PageRankDiverged {
        /// Seed node.
        node: usize,
        /// Iterations performed.
        iterations: usize,
    },

    /// A cascade exceeded the monotone bound; indicates a broken invariant.
    #[error("Cascade did not reach a fixpoint within {0} iterations")]
    CascadeDiverged(usize),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for cascade model operations
pub type Result<T> = std::result::Result<T, CascadeError>;

impl From<toml::de::Error> for CascadeError {
    fn from(err: toml::de::Error) -> Self {
        CascadeError::Config(err.to_string())
    }
}
