use thiserror::Error;

use crate::ParallelPolicy;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum AddChildError {
    #[error("Attempted to add too many nodes to {kind}")]
    TooManyNodes { kind: &'static str },
}

pub type AddChildResult = Result<(), AddChildError>;

/// A malformed node graph, detected while the graph is being constructed.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum BuildError {
    #[error("{kind} requires a finite, non-negative duration, got {seconds}")]
    InvalidDuration { kind: &'static str, seconds: f32 },
    #[error("Parallel policy {policy:?} cannot be satisfied by {children} children")]
    InvalidPolicy {
        policy: ParallelPolicy,
        children: usize,
    },
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error("max_delta_time must be positive and finite, got {0}")]
    InvalidMaxDeltaTime(f32),
}
