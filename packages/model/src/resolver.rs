//! # Path Resolver
//!
//! The only code that walks the tree by position.
//!
//! Resolution consumes a [`Path`] one segment at a time, tracking the shape
//! of the current location:
//!
//! ```text
//! Tree ──elements──▶ List ──i──▶ Node ──elements──▶ List        (form)
//!                                 └───columns──▶ Columns ──i──▶ Column ──elements──▶ List
//! ```
//!
//! Each step branches on the current node's variant, so a container name
//! that does not apply to a node kind is reported as
//! [`PathResolutionError::WrongContainer`] instead of indexing blindly.
//! Resolution never panics; every failure names the segment it stopped at.

use crate::error::PathResolutionError;
use crate::node::{Column, Node, NodeKind, Tree};
use crate::path::{ContainerName, Path, Segment};
use std::fmt;
use tracing::trace;

/// Shape of a location reached while resolving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Tree,
    List,
    Node(NodeKind),
    /// A node of any kind; only used as an expectation
    AnyNode,
    Columns,
    Column,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Tree => f.write_str("tree root"),
            Shape::List => f.write_str("node list"),
            Shape::Node(kind) => write!(f, "{} node", kind),
            Shape::AnyNode => f.write_str("node"),
            Shape::Columns => f.write_str("column list"),
            Shape::Column => f.write_str("column"),
        }
    }
}

/// A resolved node list
#[derive(Debug, Clone, Copy)]
pub struct Container<'a> {
    pub nodes: &'a [Node],
    /// Kind of the node owning the list; `None` for the root
    pub owner: Option<NodeKind>,
}

/// A resolved node list, mutable
#[derive(Debug)]
pub struct ContainerMut<'a> {
    pub nodes: &'a mut Vec<Node>,
    pub owner: Option<NodeKind>,
}

#[derive(Clone, Copy)]
enum Cursor<'a> {
    Tree(&'a Tree),
    List(&'a [Node], Option<NodeKind>),
    Node(&'a Node),
    Columns(&'a [Column]),
    Column(&'a Column),
}

enum CursorMut<'a> {
    Tree(&'a mut Tree),
    List(&'a mut Vec<Node>, Option<NodeKind>),
    Node(&'a mut Node),
    Columns(&'a mut Vec<Column>),
    Column(&'a mut Column),
}

impl Cursor<'_> {
    fn shape(&self) -> Shape {
        match self {
            Cursor::Tree(_) => Shape::Tree,
            Cursor::List(..) => Shape::List,
            Cursor::Node(node) => Shape::Node(node.kind()),
            Cursor::Columns(_) => Shape::Columns,
            Cursor::Column(_) => Shape::Column,
        }
    }
}

impl CursorMut<'_> {
    fn shape(&self) -> Shape {
        match self {
            CursorMut::Tree(_) => Shape::Tree,
            CursorMut::List(..) => Shape::List,
            CursorMut::Node(node) => Shape::Node(node.kind()),
            CursorMut::Columns(_) => Shape::Columns,
            CursorMut::Column(_) => Shape::Column,
        }
    }
}

/// What each shape accepts next, for error messages
fn expected_after(shape: Shape) -> &'static str {
    match shape {
        Shape::Tree | Shape::Column => "`elements`",
        Shape::List | Shape::Columns => "an index",
        Shape::Node(NodeKind::Form) => "`elements`",
        Shape::Node(NodeKind::ColumnSet) => "`columns`",
        Shape::Node(_) => "nothing (leaf node)",
        Shape::AnyNode => "a container name",
    }
}

fn unexpected(at: usize, shape: Shape, found: Segment) -> PathResolutionError {
    PathResolutionError::UnexpectedSegment {
        segment: at,
        at: shape,
        expected: expected_after(shape),
        found,
    }
}

fn step(cursor: Cursor<'_>, segment: Segment, at: usize) -> Result<Cursor<'_>, PathResolutionError> {
    let shape = cursor.shape();
    match cursor {
        Cursor::Tree(tree) => match segment {
            Segment::Field(ContainerName::Elements) => Ok(Cursor::List(&tree.elements, None)),
            found => Err(unexpected(at, shape, found)),
        },
        Cursor::List(nodes, _) => match segment {
            Segment::Index(index) => nodes.get(index).map(Cursor::Node).ok_or(
                PathResolutionError::IndexOutOfBounds {
                    segment: at,
                    index,
                    len: nodes.len(),
                },
            ),
            found => Err(unexpected(at, shape, found)),
        },
        Cursor::Node(node) => match segment {
            Segment::Field(name) => match node {
                Node::Form { elements, .. } if name == ContainerName::Elements => {
                    Ok(Cursor::List(elements, Some(NodeKind::Form)))
                }
                Node::ColumnSet { columns, .. } if name == ContainerName::Columns => {
                    Ok(Cursor::Columns(columns))
                }
                _ => Err(PathResolutionError::WrongContainer {
                    segment: at,
                    kind: node.kind(),
                    container: name,
                }),
            },
            found => Err(unexpected(at, shape, found)),
        },
        Cursor::Columns(columns) => match segment {
            Segment::Index(index) => columns.get(index).map(Cursor::Column).ok_or(
                PathResolutionError::IndexOutOfBounds {
                    segment: at,
                    index,
                    len: columns.len(),
                },
            ),
            found => Err(unexpected(at, shape, found)),
        },
        Cursor::Column(column) => match segment {
            Segment::Field(ContainerName::Elements) => {
                Ok(Cursor::List(&column.elements, Some(NodeKind::ColumnSet)))
            }
            found => Err(unexpected(at, shape, found)),
        },
    }
}

fn step_mut(
    cursor: CursorMut<'_>,
    segment: Segment,
    at: usize,
) -> Result<CursorMut<'_>, PathResolutionError> {
    let shape = cursor.shape();
    match cursor {
        CursorMut::Tree(tree) => match segment {
            Segment::Field(ContainerName::Elements) => {
                Ok(CursorMut::List(&mut tree.elements, None))
            }
            found => Err(unexpected(at, shape, found)),
        },
        CursorMut::List(nodes, _) => match segment {
            Segment::Index(index) => {
                let len = nodes.len();
                nodes
                    .get_mut(index)
                    .map(CursorMut::Node)
                    .ok_or(PathResolutionError::IndexOutOfBounds {
                        segment: at,
                        index,
                        len,
                    })
            }
            found => Err(unexpected(at, shape, found)),
        },
        CursorMut::Node(node) => {
            let kind = node.kind();
            match segment {
                Segment::Field(name) => match node {
                    Node::Form { elements, .. } if name == ContainerName::Elements => {
                        Ok(CursorMut::List(elements, Some(NodeKind::Form)))
                    }
                    Node::ColumnSet { columns, .. } if name == ContainerName::Columns => {
                        Ok(CursorMut::Columns(columns))
                    }
                    _ => Err(PathResolutionError::WrongContainer {
                        segment: at,
                        kind,
                        container: name,
                    }),
                },
                found => Err(unexpected(at, shape, found)),
            }
        }
        CursorMut::Columns(columns) => match segment {
            Segment::Index(index) => {
                let len = columns.len();
                columns
                    .get_mut(index)
                    .map(CursorMut::Column)
                    .ok_or(PathResolutionError::IndexOutOfBounds {
                        segment: at,
                        index,
                        len,
                    })
            }
            found => Err(unexpected(at, shape, found)),
        },
        CursorMut::Column(column) => match segment {
            Segment::Field(ContainerName::Elements) => {
                Ok(CursorMut::List(&mut column.elements, Some(NodeKind::ColumnSet)))
            }
            found => Err(unexpected(at, shape, found)),
        },
    }
}

fn walk<'a>(
    tree: &'a Tree,
    path: &Path,
    mut lineage: Option<&mut Vec<&'a Node>>,
) -> Result<Cursor<'a>, PathResolutionError> {
    let mut cursor = Cursor::Tree(tree);
    for (at, segment) in path.segments().iter().enumerate() {
        cursor = step(cursor, *segment, at).map_err(|e| {
            trace!(%path, error = %e, "path resolution failed");
            e
        })?;
        if let (Cursor::Node(node), Some(nodes)) = (cursor, lineage.as_deref_mut()) {
            nodes.push(node);
        }
    }
    Ok(cursor)
}

fn walk_mut<'a>(tree: &'a mut Tree, path: &Path) -> Result<CursorMut<'a>, PathResolutionError> {
    path.segments()
        .iter()
        .enumerate()
        .try_fold(CursorMut::Tree(tree), |cursor, (at, segment)| {
            step_mut(cursor, *segment, at)
        })
        .map_err(|e| {
            trace!(%path, error = %e, "path resolution failed");
            e
        })
}

fn exhausted(path: &Path, expected: Shape, found: Shape) -> PathResolutionError {
    PathResolutionError::Exhausted {
        segment: path.len(),
        expected,
        found,
    }
}

/// Resolve a node path to the node it addresses
pub fn resolve_node<'a>(tree: &'a Tree, path: &Path) -> Result<&'a Node, PathResolutionError> {
    match walk(tree, path, None)? {
        Cursor::Node(node) => Ok(node),
        other => Err(exhausted(path, Shape::AnyNode, other.shape())),
    }
}

/// Resolve a node path for in-place payload edits
pub fn resolve_node_mut<'a>(
    tree: &'a mut Tree,
    path: &Path,
) -> Result<&'a mut Node, PathResolutionError> {
    match walk_mut(tree, path)? {
        CursorMut::Node(node) => Ok(node),
        other => {
            let found = other.shape();
            Err(exhausted(path, Shape::AnyNode, found))
        }
    }
}

/// Resolve a container path (ending in `elements`) to its node list
pub fn resolve_container<'a>(
    tree: &'a Tree,
    path: &Path,
) -> Result<Container<'a>, PathResolutionError> {
    match walk(tree, path, None)? {
        Cursor::List(nodes, owner) => Ok(Container { nodes, owner }),
        other => Err(exhausted(path, Shape::List, other.shape())),
    }
}

pub fn resolve_container_mut<'a>(
    tree: &'a mut Tree,
    path: &Path,
) -> Result<ContainerMut<'a>, PathResolutionError> {
    match walk_mut(tree, path)? {
        CursorMut::List(nodes, owner) => Ok(ContainerMut { nodes, owner }),
        other => {
            let found = other.shape();
            Err(exhausted(path, Shape::List, found))
        }
    }
}

/// Resolve a slot list path (a column set path followed by `columns`)
pub fn resolve_columns<'a>(tree: &'a Tree, path: &Path) -> Result<&'a [Column], PathResolutionError> {
    match walk(tree, path, None)? {
        Cursor::Columns(columns) => Ok(columns),
        other => Err(exhausted(path, Shape::Columns, other.shape())),
    }
}

pub fn resolve_columns_mut<'a>(
    tree: &'a mut Tree,
    path: &Path,
) -> Result<&'a mut Vec<Column>, PathResolutionError> {
    match walk_mut(tree, path)? {
        CursorMut::Columns(columns) => Ok(columns),
        other => {
            let found = other.shape();
            Err(exhausted(path, Shape::Columns, found))
        }
    }
}

/// Every node passed through while resolving `path`, outermost first
///
/// For a node path the last entry is the addressed node itself; for a
/// container path the last entry is the container's owner.
pub fn resolve_lineage<'a>(tree: &'a Tree, path: &Path) -> Result<Vec<&'a Node>, PathResolutionError> {
    let mut nodes = Vec::new();
    walk(tree, path, Some(&mut nodes))?;
    Ok(nodes)
}
