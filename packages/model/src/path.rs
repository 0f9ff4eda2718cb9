//! # Paths
//!
//! Positional addresses into the tree.
//!
//! A path is an ordered list of container names and indices, e.g.
//! `elements.1.columns.0.elements.2` addresses the third node of the first
//! column of the column set at root index 1.
//!
//! - A **node path** ends in an index.
//! - A **container path** ends in `elements` and names an insertion target.
//!
//! Paths are positional, not stable identifiers: any structural edit may
//! shift them. [`Path::rebase`] re-derives a held path through a recorded
//! [`StructuralStep`].

use crate::error::ParsePathError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of a child container field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerName {
    Elements,
    Columns,
}

impl ContainerName {
    pub fn as_str(self) -> &'static str {
        match self {
            ContainerName::Elements => "elements",
            ContainerName::Columns => "columns",
        }
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    Index(usize),
    Field(ContainerName),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(i) => write!(f, "{}", i),
            Segment::Field(name) => write!(f, "{}", name),
        }
    }
}

/// Ordered address of a node or container
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    segments: Vec<Segment>,
}

/// A structural change that may shift previously held paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "path", rename_all = "snake_case")]
pub enum StructuralStep {
    /// The node (or column) at this path was spliced out
    Removed(Path),
    /// A node (or column) was spliced in at this path
    Inserted(Path),
}

impl Path {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// The root container: `elements`
    pub fn root() -> Self {
        Self::new(vec![Segment::Field(ContainerName::Elements)])
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn with(&self, tail: &[Segment]) -> Path {
        let mut segments = self.segments.clone();
        segments.extend_from_slice(tail);
        Path { segments }
    }

    /// Node at `index` of this container path
    pub fn child(&self, index: usize) -> Path {
        self.with(&[Segment::Index(index)])
    }

    /// Flat container of the node at this path
    pub fn elements(&self) -> Path {
        self.with(&[Segment::Field(ContainerName::Elements)])
    }

    /// Slot list of the column set at this path
    pub fn columns(&self) -> Path {
        self.with(&[Segment::Field(ContainerName::Columns)])
    }

    /// Element list of column `index` of the column set at this path
    pub fn column(&self, index: usize) -> Path {
        self.with(&[
            Segment::Field(ContainerName::Columns),
            Segment::Index(index),
            Segment::Field(ContainerName::Elements),
        ])
    }

    pub fn last_index(&self) -> Option<usize> {
        match self.segments.last() {
            Some(Segment::Index(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn is_node_path(&self) -> bool {
        self.last_index().is_some()
    }

    /// Split a node path into its container path and index
    pub fn split_last_index(&self) -> Option<(Path, usize)> {
        let index = self.last_index()?;
        let container = Path::new(self.segments[..self.segments.len() - 1].to_vec());
        Some((container, index))
    }

    pub fn is_root_container(&self) -> bool {
        *self == Path::root()
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Re-derive this path after `step`
    ///
    /// Returns `None` when this path addressed the removed node or something
    /// inside it.
    pub fn rebase(&self, step: &StructuralStep) -> Option<Path> {
        match step {
            StructuralStep::Removed(removed) => {
                if self.starts_with(removed) {
                    return None;
                }
                let Some((container, index)) = removed.split_last_index() else {
                    return Some(self.clone());
                };
                Some(self.shift_within(&container, |j| if j > index { j - 1 } else { j }))
            }
            StructuralStep::Inserted(inserted) => {
                let Some((container, index)) = inserted.split_last_index() else {
                    return Some(self.clone());
                };
                Some(self.shift_within(&container, |j| if j >= index { j + 1 } else { j }))
            }
        }
    }

    /// Rebase through several steps in order
    pub fn rebase_all(&self, steps: &[StructuralStep]) -> Option<Path> {
        steps
            .iter()
            .try_fold(self.clone(), |path, step| path.rebase(step))
    }

    /// Swap the `from` prefix of this path for `to`
    ///
    /// Used to follow a moved subtree: anything addressed under the old
    /// location is addressed under the new one.
    pub fn reparent(&self, from: &Path, to: &Path) -> Option<Path> {
        if !self.starts_with(from) {
            return None;
        }
        Some(to.with(&self.segments[from.len()..]))
    }

    fn shift_within(&self, container: &Path, shift: impl Fn(usize) -> usize) -> Path {
        let mut rebased = self.clone();
        if self.starts_with(container) {
            if let Some(Segment::Index(j)) = rebased.segments.get_mut(container.len()) {
                *j = shift(*j);
            }
        }
        rebased
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = ParsePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParsePathError::Empty);
        }

        s.split('.')
            .enumerate()
            .map(|(position, token)| match token {
                "elements" => Ok(Segment::Field(ContainerName::Elements)),
                "columns" => Ok(Segment::Field(ContainerName::Columns)),
                _ => token
                    .parse::<usize>()
                    .map(Segment::Index)
                    .map_err(|_| ParsePathError::UnknownSegment {
                        position,
                        token: token.to_string(),
                    }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Path::new)
    }
}
