//! Error types for the tree model

use crate::node::NodeKind;
use crate::path::{ContainerName, Segment};
use crate::resolver::Shape;
use thiserror::Error;

/// A path that does not correspond to any location in the tree
///
/// Every variant carries the index of the failing segment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathResolutionError {
    #[error("segment {segment}: index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        segment: usize,
        index: usize,
        len: usize,
    },

    #[error("segment {segment}: {kind} nodes have no `{container}` container")]
    WrongContainer {
        segment: usize,
        kind: NodeKind,
        container: ContainerName,
    },

    #[error("segment {segment}: expected {expected} step at {at}, found `{found}`")]
    UnexpectedSegment {
        segment: usize,
        at: Shape,
        expected: &'static str,
        found: Segment,
    },

    #[error("path ended at {found} after {segment} segments, expected {expected}")]
    Exhausted {
        segment: usize,
        expected: Shape,
        found: Shape,
    },
}

impl PathResolutionError {
    /// Index of the segment where resolution stopped
    pub fn segment(&self) -> usize {
        match self {
            PathResolutionError::IndexOutOfBounds { segment, .. }
            | PathResolutionError::WrongContainer { segment, .. }
            | PathResolutionError::UnexpectedSegment { segment, .. }
            | PathResolutionError::Exhausted { segment, .. } => *segment,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsePathError {
    #[error("empty path")]
    Empty,

    #[error("unknown path segment `{token}` at position {position}")]
    UnknownSegment { position: usize, token: String },
}
