//! # Structural Mutations
//!
//! Insert, remove and move operations on the component tree.
//!
//! ## Design Principles
//!
//! 1. **Fail closed**: operations borrow the caller's tree and return a new
//!    one; on any error the caller still holds the untouched original
//! 2. **Validated**: every insert or move is approved by the
//!    [`Validator`](crate::validator::Validator) before anything is spliced
//! 3. **Path-repairing**: each result records the structural steps it took,
//!    so callers can rebase paths they held before the edit
//!
//! ## Mutation Semantics
//!
//! ### MoveWithin
//! - Single splice-out/splice-in pass over one list
//! - Raw target index `t` from source `s` lands at `t` if `t <= s`,
//!   otherwise `t - 1` (removal shifts later siblings down)
//!
//! ### MoveAcross
//! - Removal happens first; the destination path is rebased through the
//!   removal and resolved again before insertion
//!
//! ### RemoveColumn
//! - Removing the last column of a column set removes the column set too
//! - Removing the last node of any container never removes the container

use crate::config::{EditorConfig, IndexPolicy};
use crate::errors::{ConstraintViolation, EditError, Rule};
use crate::validator::{Proposal, Validator};
use formwright_model::{
    resolve_columns, resolve_columns_mut, resolve_container, resolve_container_mut, resolve_node,
    Column, IdGenerator, Node, NodeKind, Path, PathResolutionError, Shape, StructuralStep, Tree,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Structural operations, as requested by the renderer or the drag controller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Insert an existing subtree
    Insert {
        container: Path,
        index: usize,
        node: Node,
    },

    /// Insert a palette default of `kind` with a fresh id
    InsertNew {
        container: Path,
        index: usize,
        kind: NodeKind,
    },

    /// Remove a node and its subtree
    Remove { path: Path },

    /// Reorder within the node's own container; `index` is the raw target
    MoveWithin { source: Path, index: usize },

    /// Move into a different container
    MoveAcross {
        source: Path,
        container: Path,
        index: usize,
    },

    /// Deep copy with fresh ids, placed right after the original
    Duplicate { path: Path },

    /// Add an empty column to the column set at `column_set`
    AddColumn { column_set: Path, index: usize },

    /// Remove a column and everything in it
    RemoveColumn { column_set: Path, index: usize },
}

impl Mutation {
    /// Apply mutation to `tree`, returning the edited copy
    pub fn apply(
        &self,
        tree: &Tree,
        config: &EditorConfig,
        ids: &mut IdGenerator,
    ) -> Result<Applied, EditError> {
        match self {
            Mutation::Insert {
                container,
                index,
                node,
            } => insert(tree, container, *index, node.clone(), config),

            Mutation::InsertNew {
                container,
                index,
                kind,
            } => {
                let node = Node::with_defaults(*kind, ids.new_id());
                insert(tree, container, *index, node, config)
            }

            Mutation::Remove { path } => remove(tree, path),

            Mutation::MoveWithin { source, index } => move_within(tree, source, *index, config),

            Mutation::MoveAcross {
                source,
                container,
                index,
            } => move_across(tree, source, container, *index, config),

            Mutation::Duplicate { path } => duplicate(tree, path, ids, config),

            Mutation::AddColumn { column_set, index } => {
                add_column(tree, column_set, *index, config)
            }

            Mutation::RemoveColumn { column_set, index } => remove_column(tree, column_set, *index),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Insert { .. } => "insert",
            Mutation::InsertNew { .. } => "insert_new",
            Mutation::Remove { .. } => "remove",
            Mutation::MoveWithin { .. } => "move_within",
            Mutation::MoveAcross { .. } => "move_across",
            Mutation::Duplicate { .. } => "duplicate",
            Mutation::AddColumn { .. } => "add_column",
            Mutation::RemoveColumn { .. } => "remove_column",
        }
    }
}

/// Result of a successful structural edit
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// The edited tree; the new source of truth
    pub tree: Tree,

    /// Where the inserted, moved or copied node now lives
    pub path: Option<Path>,

    /// Subtrees that left the tree
    pub discarded: Vec<Node>,

    /// A title node was among the discarded subtrees
    pub title_removed: bool,

    /// A column set removed because its last column went
    pub pruned: Option<Path>,

    /// Splices performed, in order
    pub steps: Vec<StructuralStep>,

    /// Old and new location of a moved subtree
    relocated: Option<(Path, Path)>,
}

impl Applied {
    fn new(tree: Tree) -> Self {
        Self {
            tree,
            path: None,
            discarded: Vec::new(),
            title_removed: false,
            pruned: None,
            steps: Vec::new(),
            relocated: None,
        }
    }

    fn discard(&mut self, node: Node) {
        self.title_removed |= node.contains_kind(NodeKind::Title);
        self.discarded.push(node);
    }

    /// Re-derive a path held before this edit
    ///
    /// Paths into a moved subtree follow the move. Returns `None` when the
    /// addressed node is gone.
    pub fn rebase(&self, held: &Path) -> Option<Path> {
        if let Some((from, to)) = &self.relocated {
            if let Some(path) = held.reparent(from, to) {
                return Some(path);
            }
        }
        held.rebase_all(&self.steps)
    }
}

/// Internal landing index of a same-list move from `source` to raw `target`
pub fn adjusted_index(source: usize, target: usize) -> usize {
    if target <= source {
        target
    } else {
        target - 1
    }
}

fn place(index: usize, len: usize, policy: IndexPolicy) -> Result<usize, EditError> {
    match policy {
        IndexPolicy::Clamp => Ok(index.min(len)),
        IndexPolicy::Reject if index <= len => Ok(index),
        IndexPolicy::Reject => Err(EditError::IndexOutOfRange { index, len }),
    }
}

/// Resolve a node path and split it into container path and index
fn locate(tree: &Tree, path: &Path) -> Result<(Path, usize), EditError> {
    resolve_node(tree, path)?;
    path.split_last_index().ok_or_else(|| {
        EditError::Path(PathResolutionError::Exhausted {
            segment: path.len(),
            expected: Shape::AnyNode,
            found: Shape::List,
        })
    })
}

/// Splice `node` into the list at `container`, index clamped per policy
#[instrument(level = "debug", skip_all, fields(container = %container, index, node = node.id()))]
pub fn insert(
    tree: &Tree,
    container: &Path,
    index: usize,
    node: Node,
    config: &EditorConfig,
) -> Result<Applied, EditError> {
    let len = resolve_container(tree, container)?.nodes.len();
    let index = place(index, len, config.index_policy)?;

    Validator::new(config).check(
        tree,
        &Proposal::Insert {
            node: &node,
            container,
            index,
        },
    )?;

    let mut next = tree.clone();
    resolve_container_mut(&mut next, container)?
        .nodes
        .insert(index, node);

    let path = container.child(index);
    debug!(%path, "inserted");

    let mut applied = Applied::new(next);
    applied.steps.push(StructuralStep::Inserted(path.clone()));
    applied.path = Some(path);
    Ok(applied)
}

/// Splice out the node at `source` with its whole subtree
#[instrument(level = "debug", skip_all, fields(source = %source))]
pub fn remove(tree: &Tree, source: &Path) -> Result<Applied, EditError> {
    let (container, index) = locate(tree, source)?;

    let mut next = tree.clone();
    let removed = resolve_container_mut(&mut next, &container)?
        .nodes
        .remove(index);
    debug!(node = removed.id(), "removed");

    let mut applied = Applied::new(next);
    applied.discard(removed);
    applied.steps.push(StructuralStep::Removed(source.clone()));
    Ok(applied)
}

/// Reorder the node at `source` within its own list
///
/// `target` is the raw insertion index in the list as it was before the
/// edit (`len` appends).
#[instrument(level = "debug", skip_all, fields(source = %source, target))]
pub fn move_within(
    tree: &Tree,
    source: &Path,
    target: usize,
    config: &EditorConfig,
) -> Result<Applied, EditError> {
    let (container, from) = locate(tree, source)?;
    let len = resolve_container(tree, &container)?.nodes.len();
    let target = place(target, len, config.index_policy)?;
    let to = adjusted_index(from, target);

    Validator::new(config).check(
        tree,
        &Proposal::Move {
            source,
            container: &container,
            index: to,
        },
    )?;

    let mut next = tree.clone();
    let nodes = resolve_container_mut(&mut next, &container)?.nodes;
    if from < to {
        nodes[from..=to].rotate_left(1);
    } else {
        nodes[to..=from].rotate_right(1);
    }

    let path = container.child(to);
    debug!(%path, from, to, "moved within container");

    let mut applied = Applied::new(next);
    applied.steps.push(StructuralStep::Removed(source.clone()));
    applied.steps.push(StructuralStep::Inserted(path.clone()));
    applied.relocated = Some((source.clone(), path.clone()));
    applied.path = Some(path);
    Ok(applied)
}

/// Move the node at `source` into a different list
///
/// `destination` and `index` are given relative to the tree before the
/// edit. A destination equal to the source's own list is handled as
/// [`move_within`].
#[instrument(level = "debug", skip_all, fields(source = %source, destination = %destination))]
pub fn move_across(
    tree: &Tree,
    source: &Path,
    destination: &Path,
    index: usize,
    config: &EditorConfig,
) -> Result<Applied, EditError> {
    let (source_container, from) = locate(tree, source)?;
    if source_container == *destination {
        return move_within(tree, source, index, config);
    }

    let len = resolve_container(tree, destination)?.nodes.len();
    let index = place(index, len, config.index_policy)?;

    Validator::new(config).check(
        tree,
        &Proposal::Move {
            source,
            container: destination,
            index,
        },
    )?;

    let mut next = tree.clone();
    let node = resolve_container_mut(&mut next, &source_container)?
        .nodes
        .remove(from);

    let removal = StructuralStep::Removed(source.clone());
    let destination = destination.rebase(&removal).ok_or_else(|| {
        ConstraintViolation::new(Rule::Cycle, "a component cannot be moved inside itself")
    })?;

    let target = resolve_container_mut(&mut next, &destination)?;
    let index = index.min(target.nodes.len());
    target.nodes.insert(index, node);

    let path = destination.child(index);
    debug!(%path, "moved across containers");

    let mut applied = Applied::new(next);
    applied.steps.push(removal);
    applied.steps.push(StructuralStep::Inserted(path.clone()));
    applied.relocated = Some((source.clone(), path.clone()));
    applied.path = Some(path);
    Ok(applied)
}

/// Insert a deep copy of the node at `source` right after it
#[instrument(level = "debug", skip_all, fields(source = %source))]
pub fn duplicate(
    tree: &Tree,
    source: &Path,
    ids: &mut IdGenerator,
    config: &EditorConfig,
) -> Result<Applied, EditError> {
    let (container, index) = locate(tree, source)?;
    let copy = resolve_node(tree, source)?.duplicate(ids);
    insert(tree, &container, index + 1, copy, config)
}

/// Add an empty column at `index` of the column set at `column_set`
#[instrument(level = "debug", skip_all, fields(column_set = %column_set, index))]
pub fn add_column(
    tree: &Tree,
    column_set: &Path,
    index: usize,
    config: &EditorConfig,
) -> Result<Applied, EditError> {
    let slots = column_set.columns();
    let len = resolve_columns(tree, &slots)?.len();
    let index = place(index, len, config.index_policy)?;

    let mut next = tree.clone();
    resolve_columns_mut(&mut next, &slots)?.insert(index, Column::default());
    debug!(index, "column added");

    let mut applied = Applied::new(next);
    applied.steps.push(StructuralStep::Inserted(slots.child(index)));
    applied.path = Some(column_set.column(index));
    Ok(applied)
}

/// Remove column `index` and its contents
///
/// When that empties the column set, the column set itself is removed and
/// reported in [`Applied::pruned`].
#[instrument(level = "debug", skip_all, fields(column_set = %column_set, index))]
pub fn remove_column(tree: &Tree, column_set: &Path, index: usize) -> Result<Applied, EditError> {
    let slots = column_set.columns();
    let len = resolve_columns(tree, &slots)?.len();
    if index >= len {
        return Err(PathResolutionError::IndexOutOfBounds {
            segment: slots.len(),
            index,
            len,
        }
        .into());
    }

    let mut next = tree.clone();
    let columns = resolve_columns_mut(&mut next, &slots)?;
    let column = columns.remove(index);
    let emptied = columns.is_empty();

    let mut applied_steps = vec![StructuralStep::Removed(slots.child(index))];
    let mut discarded = column.elements;
    let mut pruned = None;

    if emptied {
        let (container, position) = locate(&next, column_set)?;
        let set = resolve_container_mut(&mut next, &container)?
            .nodes
            .remove(position);
        debug!(node = set.id(), "last column removed, pruning column set");
        discarded.push(set);
        applied_steps.push(StructuralStep::Removed(column_set.clone()));
        pruned = Some(column_set.clone());
    }

    let mut applied = Applied::new(next);
    for node in discarded {
        applied.discard(node);
    }
    applied.steps = applied_steps;
    applied.pruned = pruned;
    Ok(applied)
}
