//! # Drag Reorder Controller
//!
//! Turns pointer events from the drag source provider into one structural
//! edit per drop.
//!
//! ```text
//!          begin              hover + tick
//!   Idle ─────────▶ Dragging ─────────────▶ Hovering ──┐
//!    ▲                 │  ▲                    │       │ hover + tick
//!    │                 │  └──── leave ─────────┘◀──────┘
//!    └── drop/cancel ──┴──────────────────────────────────
//! ```
//!
//! Time is always passed in. A hover event only schedules a recompute due
//! `hover_debounce` later; [`DragController::tick`] evaluates it, and a newer
//! hover replaces an older pending one. After a structural change the
//! controller ignores geometry for `settle_delay`.

use crate::config::EditorConfig;
use crate::errors::{EditError, NoOpReason};
use crate::mutations::{Applied, Mutation};
use formwright_model::{find_path, resolve_node, IdGenerator, NodeId, NodeKind, Path, Tree};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragItem {
    /// A new component from the palette
    Palette(NodeKind),

    /// A node already in the tree, with the path it had when the drag began
    Existing { id: NodeId, path: Path },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertSide {
    Before,
    After,
}

/// Vertical extent of a rendered node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    /// Upper half is `Before`; the midpoint and below is `After`
    pub fn side_of(&self, y: f32) -> InsertSide {
        if y < self.top + self.height / 2.0 {
            InsertSide::Before
        } else {
            InsertSide::After
        }
    }
}

/// What the pointer is over
#[derive(Debug, Clone, PartialEq)]
pub enum DropTarget {
    /// A rendered node
    Node { path: Path, bounds: Bounds },

    /// An empty area of a container; drops append
    Container { path: Path, len: usize },
}

/// A computed drop position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Hovered node or container
    pub target: Path,
    /// Container that receives the drop
    pub container: Path,
    /// Raw insertion index in `container`
    pub index: usize,
    pub side: InsertSide,
}

impl Placement {
    fn from_target(target: &DropTarget, pointer_y: f32) -> Option<Self> {
        match target {
            DropTarget::Node { path, bounds } => {
                let (container, own) = path.split_last_index()?;
                let side = bounds.side_of(pointer_y);
                let index = match side {
                    InsertSide::Before => own,
                    InsertSide::After => own + 1,
                };
                Some(Self {
                    target: path.clone(),
                    container,
                    index,
                    side,
                })
            }
            DropTarget::Container { path, len } => Some(Self {
                target: path.clone(),
                container: path.clone(),
                index: *len,
                side: InsertSide::After,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { item: DragItem },
    Hovering { item: DragItem, placement: Placement },
}

#[derive(Debug, Clone, PartialEq)]
struct PendingHover {
    target: DropTarget,
    pointer_y: f32,
    due: Instant,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragError {
    #[error("a drag session is already active")]
    SessionActive,

    #[error("no drag session is active")]
    NotDragging,
}

/// Result of releasing the pointer
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Released with no drop position; nothing happened
    Cancelled,

    /// The edit went through; `applied.tree` is the new tree
    Applied { mutation: Mutation, applied: Applied },

    /// Refused, skipped or unresolvable; the tree is unchanged
    Rejected {
        mutation: Option<Mutation>,
        error: EditError,
    },
}

#[derive(Debug, Clone)]
pub struct DragController {
    config: EditorConfig,
    state: DragState,
    pending: Option<PendingHover>,
    settle_until: Option<Instant>,
}

impl DragController {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            state: DragState::Idle,
            pending: None,
            settle_until: None,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != DragState::Idle
    }

    pub fn placement(&self) -> Option<&Placement> {
        match &self.state {
            DragState::Hovering { placement, .. } => Some(placement),
            _ => None,
        }
    }

    pub fn has_pending_hover(&self) -> bool {
        self.pending.is_some()
    }

    pub fn begin(&mut self, item: DragItem) -> Result<(), DragError> {
        if self.is_active() {
            return Err(DragError::SessionActive);
        }
        debug!(?item, "drag started");
        self.state = DragState::Dragging { item };
        Ok(())
    }

    /// Record a pointer-over event; evaluated by a later [`tick`](Self::tick)
    pub fn hover(&mut self, target: DropTarget, pointer_y: f32, now: Instant) -> Result<(), DragError> {
        if !self.is_active() {
            return Err(DragError::NotDragging);
        }
        trace!(?target, pointer_y, "hover scheduled");
        self.pending = Some(PendingHover {
            target,
            pointer_y,
            due: now + self.config.hover_debounce(),
        });
        Ok(())
    }

    /// Pointer left every candidate target
    pub fn leave(&mut self) {
        self.pending = None;
        if let DragState::Hovering { item, .. } = &self.state {
            self.state = DragState::Dragging { item: item.clone() };
        }
    }

    /// Evaluate a due hover; returns the placement only when it changed
    pub fn tick(&mut self, now: Instant) -> Option<Placement> {
        if self.settling(now) {
            return None;
        }
        match &self.pending {
            Some(pending) if pending.due <= now => {}
            _ => return None,
        }
        let pending = self.pending.take()?;
        self.settle(pending)
    }

    /// A structural change just happened; geometry is stale for a while
    pub fn notify_structure_changed(&mut self, now: Instant) {
        self.pending = None;
        self.settle_until = Some(now + self.config.settle_delay());
        self.leave();
    }

    /// Abandon the drag without editing anything
    pub fn cancel(&mut self) {
        if self.is_active() {
            debug!("drag cancelled");
        }
        self.pending = None;
        self.state = DragState::Idle;
    }

    /// Release the pointer: flush any pending hover, then edit the tree once
    ///
    /// While the layout is still settling a pending hover is dropped rather
    /// than flushed, so only a placement settled earlier can be used.
    /// The controller is idle afterwards whatever the outcome. `tree` is
    /// never modified; on success the new tree is in the outcome.
    pub fn drop(
        &mut self,
        tree: &Tree,
        ids: &mut IdGenerator,
        now: Instant,
    ) -> Result<DropOutcome, DragError> {
        if !self.is_active() {
            return Err(DragError::NotDragging);
        }
        if let Some(pending) = self.pending.take() {
            if self.settling(now) {
                trace!("layout still settling; pending hover discarded");
            } else {
                self.settle(pending);
            }
        }
        if !self.settling(now) {
            self.settle_until = None;
        }

        let (item, placement) = match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Hovering { item, placement } => (item, placement),
            _ => {
                debug!("released outside any target");
                return Ok(DropOutcome::Cancelled);
            }
        };

        let mutation = match self.mutation_for(tree, item, &placement) {
            Ok(mutation) => mutation,
            Err((mutation, error)) => {
                debug!(%error, "drop skipped");
                return Ok(DropOutcome::Rejected { mutation, error });
            }
        };

        Ok(match mutation.apply(tree, &self.config, ids) {
            Ok(applied) => {
                debug!(op = mutation.name(), "drop applied");
                DropOutcome::Applied { mutation, applied }
            }
            Err(error) => {
                if !error.is_noop() {
                    warn!(op = mutation.name(), %error, "drop refused");
                }
                DropOutcome::Rejected {
                    mutation: Some(mutation),
                    error,
                }
            }
        })
    }

    fn settling(&self, now: Instant) -> bool {
        self.settle_until.is_some_and(|until| now < until)
    }

    fn settle(&mut self, pending: PendingHover) -> Option<Placement> {
        let Some(placement) = Placement::from_target(&pending.target, pending.pointer_y) else {
            trace!(target = ?pending.target, "target is not a node or container");
            return None;
        };

        let item = match &self.state {
            DragState::Hovering {
                placement: current,
                ..
            } if *current == placement => {
                trace!("placement unchanged");
                return None;
            }
            DragState::Hovering { item, .. } | DragState::Dragging { item } => item.clone(),
            DragState::Idle => return None,
        };

        trace!(container = %placement.container, index = placement.index, "placement changed");
        self.state = DragState::Hovering {
            item,
            placement: placement.clone(),
        };
        Some(placement)
    }

    /// Map the dragged item and placement onto a single engine operation
    fn mutation_for(
        &self,
        tree: &Tree,
        item: DragItem,
        placement: &Placement,
    ) -> Result<Mutation, (Option<Mutation>, EditError)> {
        let container = placement.container.clone();

        let (id, held) = match item {
            DragItem::Palette(kind) => {
                let index = redirect_below_title(tree, &container, placement.index, kind);
                return Ok(Mutation::InsertNew {
                    container,
                    index,
                    kind,
                });
            }
            DragItem::Existing { id, path } => (id, path),
        };

        let source = match resolve_node(tree, &held) {
            Ok(node) if node.id() == id => held,
            _ => match find_path(tree, &id) {
                Some(path) => path,
                None => return Err((None, EditError::NodeNotFound(id))),
            },
        };
        let kind = match resolve_node(tree, &source) {
            Ok(node) => node.kind(),
            Err(e) => return Err((None, EditError::Path(e))),
        };
        let index = redirect_below_title(tree, &container, placement.index, kind);

        match source.split_last_index() {
            Some((own, from)) if own == container => {
                let mutation = Mutation::MoveWithin { source, index };
                if index == from {
                    Err((Some(mutation), EditError::NoOp(NoOpReason::SamePosition)))
                } else if index == from + 1 {
                    Err((Some(mutation), EditError::NoOp(NoOpReason::AdjacentBoundary)))
                } else {
                    Ok(mutation)
                }
            }
            _ => Ok(Mutation::MoveAcross {
                source,
                container,
                index,
            }),
        }
    }
}

/// Drops of non-title nodes above the title land just below it
fn redirect_below_title(tree: &Tree, container: &Path, index: usize, kind: NodeKind) -> usize {
    if kind != NodeKind::Title && index == 0 && container.is_root_container() && tree.title().is_some() {
        trace!("redirecting drop below the title");
        1
    } else {
        index
    }
}
