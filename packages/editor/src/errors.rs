//! Error types for the editor
//!
//! Every failure is recoverable: the tree handed to an operation is never
//! modified, so callers treat any error as "nothing happened".

use formwright_model::{NodeId, PathResolutionError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Path resolution failed: {0}")]
    Path(#[from] PathResolutionError),

    #[error("Not allowed: {0}")]
    Constraint(#[from] ConstraintViolation),

    #[error("Skipped: {0}")]
    NoOp(NoOpReason),

    #[error("Index {index} out of range for container of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
}

impl EditError {
    /// True for a redundant request that was skipped rather than refused
    pub fn is_noop(&self) -> bool {
        matches!(self, EditError::NoOp(_))
    }

    /// The violated rule, if a constraint refused the edit
    pub fn rule(&self) -> Option<Rule> {
        match self {
            EditError::Constraint(violation) => Some(violation.rule),
            _ => None,
        }
    }
}

/// A structurally valid request forbidden by the domain rules
///
/// `reason` is written for a warning toast.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ConstraintViolation {
    pub rule: Rule,
    pub reason: String,
}

impl ConstraintViolation {
    pub fn new(rule: Rule, reason: impl Into<String>) -> Self {
        Self {
            rule,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Ids must be unique across the tree
    UniqueId,
    /// A title may only sit at root index 0
    TitlePosition,
    /// At most one title
    TitleSingleton,
    /// Configured container nesting restrictions
    Containment,
    /// A node cannot move into its own subtree
    Cycle,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    #[error("node is already at that position")]
    SamePosition,

    #[error("drop point is the node's own trailing edge")]
    AdjacentBoundary,
}
