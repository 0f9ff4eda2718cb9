//! # Traversal
//!
//! Depth-first walks over the tree that report the path of every node they
//! visit. [`enumerate`], [`find_path`] and [`duplicate_ids`] are built on the
//! [`Visitor`] trait; anything positional still goes through the resolver.

use crate::node::{Column, Node, NodeId, Tree};
use crate::path::Path;

/// Visitor pattern for traversing the tree immutably, depth-first
///
/// Every `visit_*` method receives the path of what it visits. The default
/// implementations walk the whole tree; override one to act on a node and
/// call the matching `walk_*` function to keep descending.
pub trait Visitor<'a>: Sized {
    fn visit_tree(&mut self, tree: &'a Tree) {
        walk_tree(self, tree);
    }

    /// `path` is the node path of `node`
    fn visit_node(&mut self, path: &Path, node: &'a Node) {
        walk_node(self, path, node);
    }

    /// `path` is the element-list path of `column`
    fn visit_column(&mut self, path: &Path, column: &'a Column) {
        walk_column(self, path, column);
    }
}

pub fn walk_tree<'a, V: Visitor<'a>>(visitor: &mut V, tree: &'a Tree) {
    walk_list(visitor, &Path::root(), &tree.elements);
}

pub fn walk_node<'a, V: Visitor<'a>>(visitor: &mut V, path: &Path, node: &'a Node) {
    match node {
        Node::Form { elements, .. } => walk_list(visitor, &path.elements(), elements),
        Node::ColumnSet { columns, .. } => {
            for (i, column) in columns.iter().enumerate() {
                visitor.visit_column(&path.column(i), column);
            }
        }
        Node::Title { .. }
        | Node::Text { .. }
        | Node::Input { .. }
        | Node::Button { .. }
        | Node::Image { .. }
        | Node::Divider { .. } => {
            // Leaf node, no children to walk
        }
    }
}

pub fn walk_column<'a, V: Visitor<'a>>(visitor: &mut V, path: &Path, column: &'a Column) {
    walk_list(visitor, path, &column.elements);
}

fn walk_list<'a, V: Visitor<'a>>(visitor: &mut V, container: &Path, nodes: &'a [Node]) {
    for (i, node) in nodes.iter().enumerate() {
        visitor.visit_node(&container.child(i), node);
    }
}

struct Enumerate<'a> {
    found: Vec<(Path, &'a Node)>,
}

impl<'a> Visitor<'a> for Enumerate<'a> {
    fn visit_node(&mut self, path: &Path, node: &'a Node) {
        self.found.push((path.clone(), node));
        walk_node(self, path, node);
    }
}

/// Every node with its path, in depth-first pre-order
pub fn enumerate(tree: &Tree) -> Vec<(Path, &Node)> {
    let mut visitor = Enumerate { found: Vec::new() };
    visitor.visit_tree(tree);
    visitor.found
}

struct FindById<'i> {
    id: &'i str,
    found: Option<Path>,
}

impl<'a> Visitor<'a> for FindById<'_> {
    fn visit_node(&mut self, path: &Path, node: &'a Node) {
        if self.found.is_some() {
            return;
        }
        if node.id() == self.id {
            self.found = Some(path.clone());
            return;
        }
        walk_node(self, path, node);
    }
}

/// Re-derive the current path of the node with `id`
pub fn find_path(tree: &Tree, id: &str) -> Option<Path> {
    let mut visitor = FindById { id, found: None };
    visitor.visit_tree(tree);
    visitor.found
}

struct Duplicates {
    seen: std::collections::HashSet<NodeId>,
    duplicates: Vec<NodeId>,
}

impl<'a> Visitor<'a> for Duplicates {
    fn visit_node(&mut self, path: &Path, node: &'a Node) {
        if !self.seen.insert(node.id().to_string()) {
            self.duplicates.push(node.id().to_string());
        }
        walk_node(self, path, node);
    }
}

/// Ids that occur more than once in the tree
pub fn duplicate_ids(tree: &Tree) -> Vec<NodeId> {
    let mut visitor = Duplicates {
        seen: Default::default(),
        duplicates: Vec::new(),
    };
    visitor.visit_tree(tree);
    visitor.duplicates
}
