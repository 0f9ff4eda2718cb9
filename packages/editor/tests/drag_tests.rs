//! Drag sessions driven through an edit session with simulated time

use formwright_editor::{
    Bounds, DragError, DragItem, DragState, DropCommit, DropTarget, EditError, EditSession,
    EditorConfig, NoOpReason, Rule,
};
use formwright_model::{Column, Node, NodeKind, Path, Tree};
use std::time::{Duration, Instant};

fn p(s: &str) -> Path {
    s.parse().unwrap()
}

fn text(id: &str) -> Node {
    Node::with_defaults(NodeKind::Text, id.into())
}

/// Rows of height 20 stacked from y = 0
fn row(path: &str, index: usize) -> DropTarget {
    DropTarget::Node {
        path: p(path),
        bounds: Bounds::new(index as f32 * 20.0, 20.0),
    }
}

fn ms(start: Instant, n: u64) -> Instant {
    start + Duration::from_millis(n)
}

fn root_ids(session: &EditSession) -> Vec<String> {
    session
        .tree()
        .elements
        .iter()
        .map(|n| n.id().to_string())
        .collect()
}

#[test]
fn test_full_drag_reorder() {
    let start = Instant::now();
    let tree = Tree::from_elements(vec![text("a"), text("b"), text("c")]);
    let mut session = EditSession::new("card", tree, EditorConfig::default());

    session
        .drag()
        .begin(DragItem::Existing {
            id: "a".into(),
            path: p("elements.0"),
        })
        .unwrap();

    // pointer sweeps down over b, c; only the last position survives
    session.drag().hover(row("elements.1", 1), 25.0, ms(start, 0)).unwrap();
    session.drag().hover(row("elements.2", 2), 45.0, ms(start, 10)).unwrap();
    assert!(session.drag().tick(ms(start, 20)).is_none());
    let placement = session.drag().tick(ms(start, 60)).unwrap();
    assert_eq!(placement.index, 2);

    let commit = session.finish_drag(ms(start, 70)).unwrap();

    let DropCommit::Applied { result, .. } = commit else {
        panic!("expected the drop to apply, got {:?}", commit);
    };
    assert_eq!(result.path, Some(p("elements.1")));
    assert_eq!(root_ids(&session), vec!["b", "a", "c"]);
    assert_eq!(*session.drag().state(), DragState::Idle);
}

#[test]
fn test_drop_settles_geometry() {
    let start = Instant::now();
    let tree = Tree::from_elements(vec![text("a"), text("b")]);
    let config = EditorConfig::default().with_hover_debounce(0).with_settle_delay(100);
    let mut session = EditSession::new("card", tree, config);

    session.drag().begin(DragItem::Palette(NodeKind::Divider)).unwrap();
    session.drag().hover(row("elements.1", 1), 35.0, start).unwrap();
    session.finish_drag(start).unwrap();
    assert_eq!(session.tree().elements.len(), 3);

    // next drag right away: geometry is held back until the layout settles
    session.drag().begin(DragItem::Palette(NodeKind::Image)).unwrap();
    session.drag().hover(row("elements.0", 0), 1.0, ms(start, 10)).unwrap();
    assert!(session.drag().tick(ms(start, 50)).is_none());
    assert!(session.drag().has_pending_hover());
    assert!(session.drag().tick(ms(start, 100)).is_some());
}

#[test]
fn test_release_during_settle_does_not_use_stale_geometry() {
    let start = Instant::now();
    let tree = Tree::from_elements(vec![text("a"), text("b")]);
    let config = EditorConfig::default().with_hover_debounce(0).with_settle_delay(100);
    let mut session = EditSession::new("card", tree, config);

    session.drag().begin(DragItem::Palette(NodeKind::Divider)).unwrap();
    session.drag().hover(row("elements.1", 1), 35.0, start).unwrap();
    session.finish_drag(start).unwrap();

    session.drag().begin(DragItem::Palette(NodeKind::Image)).unwrap();
    session.drag().hover(row("elements.0", 0), 1.0, ms(start, 10)).unwrap();
    assert!(session.drag().tick(ms(start, 60)).is_none());

    assert_eq!(session.finish_drag(ms(start, 60)).unwrap(), DropCommit::Cancelled);
    assert_eq!(session.tree().elements.len(), 3);
    assert_eq!(session.version(), 1);
}

#[test]
fn test_drop_on_own_position_is_skipped() {
    let start = Instant::now();
    let tree = Tree::from_elements(vec![text("a"), text("b"), text("c")]);
    let mut session = EditSession::new("card", tree, EditorConfig::default());

    session
        .drag()
        .begin(DragItem::Existing {
            id: "b".into(),
            path: p("elements.1"),
        })
        .unwrap();
    // upper half of b itself
    session.drag().hover(row("elements.1", 1), 22.0, start).unwrap();
    let same = session.finish_drag(start).unwrap();

    session
        .drag()
        .begin(DragItem::Existing {
            id: "b".into(),
            path: p("elements.1"),
        })
        .unwrap();
    // upper half of c: right after b
    session.drag().hover(row("elements.2", 2), 42.0, start).unwrap();
    let adjacent = session.finish_drag(start).unwrap();

    assert!(matches!(
        same,
        DropCommit::Rejected {
            error: EditError::NoOp(NoOpReason::SamePosition),
            ..
        }
    ));
    assert!(matches!(
        adjacent,
        DropCommit::Rejected {
            error: EditError::NoOp(NoOpReason::AdjacentBoundary),
            ..
        }
    ));
    assert_eq!(session.version(), 0);
}

#[test]
fn test_drop_into_own_subtree_rejected() {
    let start = Instant::now();
    let tree = Tree::from_elements(vec![Node::ColumnSet {
        id: "cs".into(),
        columns: vec![Column::new(vec![text("x")]), Column::default()],
    }]);
    let mut session = EditSession::new("card", tree.clone(), EditorConfig::default());

    session
        .drag()
        .begin(DragItem::Existing {
            id: "cs".into(),
            path: p("elements.0"),
        })
        .unwrap();
    session
        .drag()
        .hover(row("elements.0.columns.0.elements.0", 1), 21.0, start)
        .unwrap();
    let commit = session.finish_drag(start).unwrap();

    let DropCommit::Rejected { error, .. } = commit else {
        panic!("expected a rejection, got {:?}", commit);
    };
    assert_eq!(error.rule(), Some(Rule::Cycle));
    assert_eq!(*session.tree(), tree);
}

#[test]
fn test_title_cannot_be_displaced_by_drag() {
    let start = Instant::now();
    let tree = Tree::from_elements(vec![
        Node::with_defaults(NodeKind::Title, "t".into()),
        text("a"),
        text("b"),
    ]);
    let mut session = EditSession::new("card", tree, EditorConfig::default());

    session
        .drag()
        .begin(DragItem::Existing {
            id: "b".into(),
            path: p("elements.2"),
        })
        .unwrap();
    // upper half of the title: index 0, redirected to 1
    session.drag().hover(row("elements.0", 0), 2.0, start).unwrap();
    session.finish_drag(start).unwrap();

    assert_eq!(root_ids(&session), vec!["t", "b", "a"]);
}

#[test]
fn test_leave_then_release_cancels() {
    let start = Instant::now();
    let tree = Tree::from_elements(vec![text("a"), text("b")]);
    let mut session = EditSession::new("card", tree, EditorConfig::default().with_hover_debounce(0));

    session.drag().begin(DragItem::Palette(NodeKind::Text)).unwrap();
    session.drag().hover(row("elements.0", 0), 2.0, start).unwrap();
    assert!(session.drag().tick(start).is_some());
    session.drag().leave();

    assert_eq!(session.finish_drag(start).unwrap(), DropCommit::Cancelled);
    assert_eq!(session.tree().elements.len(), 2);
}

#[test]
fn test_events_outside_a_session() {
    let mut session = EditSession::new("card", Tree::new(), EditorConfig::default());

    assert_eq!(
        session.drag().hover(row("elements.0", 0), 0.0, Instant::now()),
        Err(DragError::NotDragging)
    );
    assert_eq!(session.finish_drag(Instant::now()), Err(DragError::NotDragging));

    session.drag().begin(DragItem::Palette(NodeKind::Text)).unwrap();
    session.drag().cancel();
    assert!(!session.drag().is_active());
}

#[test]
fn test_palette_drop_into_empty_column() {
    let start = Instant::now();
    let tree = Tree::from_elements(vec![Node::with_defaults(NodeKind::ColumnSet, "cs".into())]);
    let mut session = EditSession::new("card", tree, EditorConfig::default());

    session.drag().begin(DragItem::Palette(NodeKind::Input)).unwrap();
    session
        .drag()
        .hover(
            DropTarget::Container {
                path: p("elements.0.columns.1.elements"),
                len: 0,
            },
            0.0,
            start,
        )
        .unwrap();
    let commit = session.finish_drag(start).unwrap();

    let DropCommit::Applied { result, .. } = commit else {
        panic!("expected the drop to apply, got {:?}", commit);
    };
    let path = result.path.unwrap();
    assert_eq!(path, p("elements.0.columns.1.elements.0"));
    assert_eq!(session.node(&path).unwrap().id(), "card-1");
}
