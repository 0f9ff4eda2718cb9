//! Property tests for path resolution and rebasing

use formwright_model::{
    enumerate, find_path, resolve_container_mut, resolve_node, Column, IdGenerator, Node, NodeKind,
    Path, StructuralStep, Tree,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Sketch {
    Leaf(NodeKind),
    Form(Vec<Sketch>),
    Columns(Vec<Vec<Sketch>>),
}

fn sketch() -> impl Strategy<Value = Sketch> {
    let leaf = prop_oneof![
        Just(NodeKind::Text),
        Just(NodeKind::Input),
        Just(NodeKind::Button),
        Just(NodeKind::Image),
        Just(NodeKind::Divider),
    ]
    .prop_map(Sketch::Leaf);

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Sketch::Form),
            prop::collection::vec(prop::collection::vec(inner, 0..3), 1..3)
                .prop_map(Sketch::Columns),
        ]
    })
}

fn build(sketch: &Sketch, ids: &mut IdGenerator) -> Node {
    match sketch {
        Sketch::Leaf(kind) => Node::with_defaults(*kind, ids.new_id()),
        Sketch::Form(children) => Node::Form {
            id: ids.new_id(),
            name: "form".to_string(),
            elements: children.iter().map(|c| build(c, ids)).collect(),
        },
        Sketch::Columns(columns) => Node::ColumnSet {
            id: ids.new_id(),
            columns: columns
                .iter()
                .map(|col| Column::new(col.iter().map(|c| build(c, ids)).collect()))
                .collect(),
        },
    }
}

fn tree() -> impl Strategy<Value = Tree> {
    prop::collection::vec(sketch(), 0..6).prop_map(|sketches| {
        let mut ids = IdGenerator::new("n");
        Tree::from_elements(sketches.iter().map(|s| build(s, &mut ids)).collect())
    })
}

proptest! {
    /// Resolving an enumerated path yields the enumerated node.
    #[test]
    fn resolution_round_trip(tree in tree()) {
        for (path, node) in enumerate(&tree) {
            prop_assert_eq!(resolve_node(&tree, &path).unwrap(), node);
        }
    }

    /// Every enumerated node can be found again by id.
    #[test]
    fn find_path_agrees_with_enumeration(tree in tree()) {
        for (path, node) in enumerate(&tree) {
            prop_assert_eq!(find_path(&tree, node.id()), Some(path));
        }
    }

    /// Enumeration visits every node exactly once.
    #[test]
    fn enumeration_counts_every_node(tree in tree()) {
        prop_assert_eq!(enumerate(&tree).len(), tree.node_count());
    }

    /// After splicing a node out, every surviving path rebases onto the same node.
    #[test]
    fn rebase_after_removal_tracks_survivors(tree in tree(), pick in any::<prop::sample::Index>()) {
        let listed: Vec<(Path, String)> = enumerate(&tree)
            .into_iter()
            .map(|(path, node)| (path, node.id().to_string()))
            .collect();
        prop_assume!(!listed.is_empty());

        let (removed_path, _) = &listed[pick.index(listed.len())];
        let (container, index) = removed_path.split_last_index().unwrap();

        let mut edited = tree.clone();
        let removed = resolve_container_mut(&mut edited, &container).unwrap().nodes.remove(index);
        let gone = removed.subtree_ids();
        let step = StructuralStep::Removed(removed_path.clone());

        for (path, id) in &listed {
            match path.rebase(&step) {
                Some(rebased) => {
                    prop_assert_eq!(resolve_node(&edited, &rebased).unwrap().id(), id.as_str());
                }
                None => prop_assert!(gone.contains(id)),
            }
        }
    }

    /// After splicing a node in, every existing path rebases onto the same node.
    #[test]
    fn rebase_after_insertion_tracks_survivors(tree in tree(), pick in any::<prop::sample::Index>()) {
        let listed: Vec<(Path, String)> = enumerate(&tree)
            .into_iter()
            .map(|(path, node)| (path, node.id().to_string()))
            .collect();

        // Insert before an existing node, or at the end of the root.
        let target = if listed.is_empty() {
            Path::root().child(0)
        } else {
            listed[pick.index(listed.len())].0.clone()
        };
        let (container, index) = target.split_last_index().unwrap();

        let mut edited = tree.clone();
        resolve_container_mut(&mut edited, &container)
            .unwrap()
            .nodes
            .insert(index, Node::with_defaults(NodeKind::Divider, "fresh".into()));
        let step = StructuralStep::Inserted(target.clone());

        prop_assert_eq!(resolve_node(&edited, &target).unwrap().id(), "fresh");
        for (path, id) in &listed {
            let rebased = path.rebase(&step).unwrap();
            prop_assert_eq!(resolve_node(&edited, &rebased).unwrap().id(), id.as_str());
        }
    }
}

#[test]
fn test_paths_parse_from_renderer_strings() -> anyhow::Result<()> {
    let tree = Tree::from_elements(vec![Node::ColumnSet {
        id: "cols".into(),
        columns: vec![Column::new(vec![Node::with_defaults(
            NodeKind::Button,
            "ok".into(),
        )])],
    }]);

    let path: Path = "elements.0.columns.0.elements.0".parse()?;
    assert_eq!(resolve_node(&tree, &path)?.id(), "ok");

    let from_json: Path = serde_json::from_str(r#"["elements", 0, "columns", 0, "elements", 0]"#)?;
    assert_eq!(from_json, path);
    Ok(())
}
