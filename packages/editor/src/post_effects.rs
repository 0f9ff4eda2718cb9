//! # Post-Effect System
//!
//! Structural edits can leave caller-owned state stale. Post-effects read
//! the report of an applied edit and repair the [`SideTable`].
//!
//! ## Design
//!
//! When an edit is applied, the engine reports what left the tree. For
//! example:
//! - Removing the title → the card header is cleared
//! - Removing a subtree → bindings and drafts of every node in it go
//! - Inserting a title → the header is mirrored from it
//!
//! Post-effects are:
//! - **Deterministic**: same report, same side-table changes
//! - **Order-independent**: effects touch disjoint concerns
//! - **Outside the tree**: they never issue further structural edits

use crate::mutations::Applied;
use crate::side_table::SideTable;
use tracing::debug;

/// Repair step run after every successful structural edit
pub trait PostEffect: std::fmt::Debug {
    fn apply(&self, applied: &Applied, side: &mut SideTable);
}

/// Clear the card header when the title node was removed
#[derive(Debug)]
pub struct ClearHeaderOnTitleRemoval;

impl PostEffect for ClearHeaderOnTitleRemoval {
    fn apply(&self, applied: &Applied, side: &mut SideTable) {
        if applied.title_removed && side.header().is_some() {
            debug!("title removed, clearing header");
            side.clear_header();
        }
    }
}

/// Forget side-table entries keyed by any id that left the tree
#[derive(Debug)]
pub struct ForgetDiscardedNodes;

impl PostEffect for ForgetDiscardedNodes {
    fn apply(&self, applied: &Applied, side: &mut SideTable) {
        for node in &applied.discarded {
            let ids = node.subtree_ids();
            side.forget_all(ids.iter().map(String::as_str));
        }
    }
}

/// Mirror the header from a title that has no header yet
#[derive(Debug)]
pub struct SyncHeaderFromTitle;

impl PostEffect for SyncHeaderFromTitle {
    fn apply(&self, applied: &Applied, side: &mut SideTable) {
        let Some(title) = applied.tree.title() else {
            return;
        };
        if side.header().map(|h| h.title_id.as_str()) != Some(title.id()) {
            side.set_header(title);
        }
    }
}

/// Runs every registered effect in order
#[derive(Debug)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    /// Create engine with default effects
    pub fn new() -> Self {
        Self {
            effects: vec![
                Box::new(ClearHeaderOnTitleRemoval),
                Box::new(ForgetDiscardedNodes),
                Box::new(SyncHeaderFromTitle),
            ],
        }
    }

    pub fn empty() -> Self {
        Self {
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: impl PostEffect + 'static) -> Self {
        self.effects.push(Box::new(effect));
        self
    }

    pub fn apply(&self, applied: &Applied, side: &mut SideTable) {
        for effect in &self.effects {
            effect.apply(applied, side);
        }
    }
}

impl Default for PostEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}
