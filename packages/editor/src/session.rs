//! # Edit Session Management
//!
//! Tracks editing state for one builder canvas.
//!
//! An EditSession owns the tree and everything derived from it: the id
//! generator, the selection, the side table and an in-flight drag. Every
//! structural edit goes through [`EditSession::apply`] or
//! [`EditSession::finish_drag`]; failures leave all of it untouched.

use crate::config::EditorConfig;
use crate::drag::{DragController, DragError, DropOutcome};
use crate::errors::EditError;
use crate::mutations::{Applied, Mutation};
use crate::post_effects::PostEffectEngine;
use crate::side_table::SideTable;
use formwright_model::{
    find_path, resolve_node, resolve_node_mut, IdGenerator, Node, NodeId, Path,
    PathResolutionError, Tree,
};
use std::time::Instant;
use tracing::debug;

/// The selected node, by position and by id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub path: Path,
    pub id: NodeId,
}

/// What an edit did to the selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionUpdate {
    /// Nothing selected, or the selected path still addresses the node
    Unchanged,
    /// The selected node now lives here
    Moved(Path),
    /// The selected node left the tree
    Cleared,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// Session version after the edit
    pub version: u64,
    /// Where the inserted or moved node now lives
    pub path: Option<Path>,
    pub selection: SelectionUpdate,
    pub title_removed: bool,
}

/// Drop outcome after it was committed to the session
#[derive(Debug, Clone, PartialEq)]
pub enum DropCommit {
    Cancelled,
    Applied {
        mutation: Mutation,
        result: MutationResult,
    },
    Rejected {
        mutation: Option<Mutation>,
        error: EditError,
    },
}

/// Single edit session
#[derive(Debug)]
pub struct EditSession {
    /// Unique session identifier, also the id generator seed
    pub id: String,

    tree: Tree,
    ids: IdGenerator,
    config: EditorConfig,
    side_table: SideTable,
    effects: PostEffectEngine,
    selection: Option<Selection>,
    drag: DragController,
    version: u64,
}

impl EditSession {
    /// Create new edit session over `tree`
    ///
    /// Fresh ids continue after the highest id already issued under this
    /// session's seed.
    pub fn new(id: impl Into<String>, tree: Tree, config: EditorConfig) -> Self {
        let id = id.into();
        let mut side_table = SideTable::new();
        if let Some(title) = tree.title() {
            side_table.set_header(title);
        }

        Self {
            ids: IdGenerator::resume(id.clone(), &tree),
            drag: DragController::new(config.clone()),
            id,
            tree,
            config,
            side_table,
            effects: PostEffectEngine::new(),
            selection: None,
            version: 0,
        }
    }

    #[must_use]
    pub fn with_effects(mut self, effects: PostEffectEngine) -> Self {
        self.effects = effects;
        self
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn side_table(&self) -> &SideTable {
        &self.side_table
    }

    pub fn side_table_mut(&mut self) -> &mut SideTable {
        &mut self.side_table
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn drag(&mut self) -> &mut DragController {
        &mut self.drag
    }

    /// Apply a structural edit
    ///
    /// On error nothing changes, including the version.
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditError> {
        let applied = mutation.apply(&self.tree, &self.config, &mut self.ids)?;
        debug!(op = mutation.name(), "mutation applied");
        Ok(self.commit(applied))
    }

    /// Release the pointer and commit whatever the drag produced
    pub fn finish_drag(&mut self, now: Instant) -> Result<DropCommit, DragError> {
        let outcome = self.drag.drop(&self.tree, &mut self.ids, now)?;
        Ok(match outcome {
            DropOutcome::Cancelled => DropCommit::Cancelled,
            DropOutcome::Rejected { mutation, error } => DropCommit::Rejected { mutation, error },
            DropOutcome::Applied { mutation, applied } => {
                let result = self.commit(applied);
                self.drag.notify_structure_changed(now);
                DropCommit::Applied { mutation, result }
            }
        })
    }

    pub fn select(&mut self, path: &Path) -> Result<&Selection, PathResolutionError> {
        let id = resolve_node(&self.tree, path)?.id().to_string();
        Ok(self.selection.insert(Selection {
            path: path.clone(),
            id,
        }))
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn node(&self, path: &Path) -> Result<&Node, PathResolutionError> {
        resolve_node(&self.tree, path)
    }

    /// Payload access for property editors
    ///
    /// Only payload fields may be changed through this; structural edits
    /// must go through [`apply`](Self::apply).
    pub fn node_mut(&mut self, path: &Path) -> Result<&mut Node, PathResolutionError> {
        resolve_node_mut(&mut self.tree, path)
    }

    fn commit(&mut self, applied: Applied) -> MutationResult {
        self.effects.apply(&applied, &mut self.side_table);
        let selection = self.repair_selection(&applied);

        self.tree = applied.tree;
        self.version += 1;

        MutationResult {
            version: self.version,
            path: applied.path,
            selection,
            title_removed: applied.title_removed,
        }
    }

    fn repair_selection(&mut self, applied: &Applied) -> SelectionUpdate {
        let Some(selection) = &self.selection else {
            return SelectionUpdate::Unchanged;
        };

        let addresses_selected = |path: &Path| {
            resolve_node(&applied.tree, path).is_ok_and(|node| node.id() == selection.id)
        };
        let repaired = applied
            .rebase(&selection.path)
            .filter(|path| addresses_selected(path))
            .or_else(|| find_path(&applied.tree, &selection.id));

        match repaired {
            Some(path) if path == selection.path => SelectionUpdate::Unchanged,
            Some(path) => {
                debug!(from = %selection.path, to = %path, "selection moved");
                let id = selection.id.clone();
                self.selection = Some(Selection {
                    path: path.clone(),
                    id,
                });
                SelectionUpdate::Moved(path)
            }
            None => {
                debug!(id = %selection.id, "selected node removed");
                self.selection = None;
                SelectionUpdate::Cleared
            }
        }
    }
}
