//! # Formwright Editor
//!
//! Structural editing engine for the form builder canvas.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ drag: pointer events → one Mutation per drop│
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ mutations: insert / remove / move           │
//! │  - Validate against the domain rules        │
//! │  - Return a new tree, never edit in place   │
//! │  - Report steps for path repair             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ post_effects: repair the caller side table  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Tree is source of truth**: selection and side-table entries are
//!    re-derived from it after every edit
//! 2. **Fail closed**: any error means nothing happened
//! 3. **One resolver**: every positional lookup goes through
//!    `formwright_model::resolver`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use formwright_editor::{EditSession, EditorConfig, Mutation};
//! use formwright_model::{NodeKind, Path, Tree};
//!
//! let mut session = EditSession::new("card", Tree::new(), EditorConfig::default());
//!
//! session.apply(Mutation::InsertNew {
//!     container: Path::root(),
//!     index: 0,
//!     kind: NodeKind::Title,
//! })?;
//!
//! let result = session.apply(Mutation::InsertNew {
//!     container: Path::root(),
//!     index: 99,
//!     kind: NodeKind::Form,
//! })?;
//! assert_eq!(result.path, Some("elements.1".parse()?));
//! ```

mod config;
mod drag;
mod errors;
pub mod mutations;
mod post_effects;
mod session;
mod side_table;
mod validator;

pub use config::{ContainmentRule, EditorConfig, IndexPolicy};
pub use drag::{
    Bounds, DragController, DragError, DragItem, DragState, DropOutcome, DropTarget, InsertSide,
    Placement,
};
pub use errors::{ConstraintViolation, EditError, NoOpReason, Rule};
pub use mutations::{adjusted_index, Applied, Mutation};
pub use post_effects::{
    ClearHeaderOnTitleRemoval, ForgetDiscardedNodes, PostEffect, PostEffectEngine,
    SyncHeaderFromTitle,
};
pub use session::{DropCommit, EditSession, MutationResult, Selection, SelectionUpdate};
pub use side_table::{HeaderState, SideTable};
pub use validator::{Proposal, Validator};

// Re-export the model for convenience
pub use formwright_model as model;
