//! # Constraint Validator
//!
//! Consulted before every structural edit. Rules run in a fixed order and
//! the first failure wins:
//!
//! 0. **Unique ids**: an inserted subtree may not reuse an id in the tree
//! 1. **Title**: a title only ever sits at root index 0, and there is at
//!    most one; nothing else may be placed at root index 0 above it
//! 2. **Cycle**: a node cannot move into its own subtree
//! 3. **Containment**: configured `(outer, inner)` nesting restrictions,
//!    checked against every ancestor of the destination and inside the
//!    incoming subtree itself
//! 4. **No-op**: a move that lands where it started is skipped
//!
//! Proposals carry the *final* index of the node in the destination list,
//! after any index adjustment the engine applies.

use crate::config::EditorConfig;
use crate::errors::{ConstraintViolation, EditError, NoOpReason, Rule};
use formwright_model::{resolve_lineage, resolve_node, Node, NodeKind, Path, Tree};
use std::collections::HashSet;
use tracing::warn;

/// A structural edit awaiting approval
#[derive(Debug, Clone, Copy)]
pub enum Proposal<'a> {
    /// Splice a new subtree into `container` at `index`
    Insert {
        node: &'a Node,
        container: &'a Path,
        index: usize,
    },

    /// Relocate the node at `source` so it ends up at `index` of `container`
    Move {
        source: &'a Path,
        container: &'a Path,
        index: usize,
    },
}

impl<'a> Proposal<'a> {
    fn container(&self) -> &'a Path {
        match *self {
            Proposal::Insert { container, .. } | Proposal::Move { container, .. } => container,
        }
    }

    fn index(&self) -> usize {
        match *self {
            Proposal::Insert { index, .. } | Proposal::Move { index, .. } => index,
        }
    }
}

pub struct Validator<'c> {
    config: &'c EditorConfig,
}

impl<'c> Validator<'c> {
    pub fn new(config: &'c EditorConfig) -> Self {
        Self { config }
    }

    /// Approve or refuse `proposal` against the current `tree`
    pub fn check(&self, tree: &Tree, proposal: &Proposal<'_>) -> Result<(), EditError> {
        let node = match proposal {
            Proposal::Insert { node, .. } => *node,
            Proposal::Move { source, .. } => resolve_node(tree, source)?,
        };

        let result = self
            .check_unique_ids(tree, proposal, node)
            .and_then(|_| self.check_title(tree, proposal, node))
            .and_then(|_| self.check_cycle(proposal))
            .and_then(|_| self.check_containment(tree, proposal, node));

        if let Err(violation) = result {
            warn!(
                rule = ?violation.rule,
                node = node.id(),
                container = %proposal.container(),
                index = proposal.index(),
                "edit refused: {}",
                violation.reason
            );
            return Err(violation.into());
        }

        self.check_noop(proposal)
    }

    fn check_unique_ids(
        &self,
        tree: &Tree,
        proposal: &Proposal<'_>,
        node: &Node,
    ) -> Result<(), ConstraintViolation> {
        if !matches!(proposal, Proposal::Insert { .. }) {
            return Ok(());
        }

        let existing: HashSet<_> = tree.ids().into_iter().collect();
        let mut incoming = HashSet::new();
        for id in node.subtree_ids() {
            if existing.contains(&id) || !incoming.insert(id.clone()) {
                return Err(ConstraintViolation::new(
                    Rule::UniqueId,
                    format!("id `{}` is already in use", id),
                ));
            }
        }
        Ok(())
    }

    fn check_title(
        &self,
        tree: &Tree,
        proposal: &Proposal<'_>,
        node: &Node,
    ) -> Result<(), ConstraintViolation> {
        let at_root_top = proposal.container().is_root_container() && proposal.index() == 0;

        if node.kind() == NodeKind::Title {
            if let Proposal::Insert { .. } = proposal {
                if tree.title_count() > 0 {
                    return Err(ConstraintViolation::new(
                        Rule::TitleSingleton,
                        "the card already has a title",
                    ));
                }
            }
            if !at_root_top {
                return Err(ConstraintViolation::new(
                    Rule::TitlePosition,
                    "the title must stay at the top of the card",
                ));
            }
            return Ok(());
        }

        if node.contains_kind(NodeKind::Title) {
            return Err(ConstraintViolation::new(
                Rule::TitlePosition,
                "a title cannot be nested inside another component",
            ));
        }

        if at_root_top && tree.title().is_some() {
            return Err(ConstraintViolation::new(
                Rule::TitlePosition,
                "nothing can be placed above the title",
            ));
        }

        Ok(())
    }

    fn check_containment(
        &self,
        tree: &Tree,
        proposal: &Proposal<'_>,
        node: &Node,
    ) -> Result<(), ConstraintViolation> {
        let ancestors = resolve_lineage(tree, proposal.container())
            .map_err(|e| ConstraintViolation::new(Rule::Containment, e.to_string()))?;

        for ancestor in ancestors {
            if let Some(inner) = self.forbidden_below(ancestor.kind(), node) {
                return Err(ConstraintViolation::new(
                    Rule::Containment,
                    format!("a {} cannot be placed inside a {}", inner, ancestor.kind()),
                ));
            }
        }

        self.check_nested(node)
    }

    /// The incoming subtree must already satisfy every rule on its own
    fn check_nested(&self, node: &Node) -> Result<(), ConstraintViolation> {
        for child in node.children() {
            if let Some(inner) = self.forbidden_below(node.kind(), child) {
                return Err(ConstraintViolation::new(
                    Rule::Containment,
                    format!("a {} cannot be placed inside a {}", inner, node.kind()),
                ));
            }
            self.check_nested(child)?;
        }
        Ok(())
    }

    /// First inner kind barred below `outer` that occurs in `subtree`
    fn forbidden_below(&self, outer: NodeKind, subtree: &Node) -> Option<NodeKind> {
        self.config
            .containment
            .iter()
            .map(|rule| rule.inner)
            .find(|&inner| self.config.forbids(outer, inner) && subtree.contains_kind(inner))
    }

    fn check_cycle(&self, proposal: &Proposal<'_>) -> Result<(), ConstraintViolation> {
        match proposal {
            Proposal::Move {
                source, container, ..
            } if container.starts_with(source) => Err(ConstraintViolation::new(
                Rule::Cycle,
                "a component cannot be moved inside itself",
            )),
            _ => Ok(()),
        }
    }

    fn check_noop(&self, proposal: &Proposal<'_>) -> Result<(), EditError> {
        if let Proposal::Move {
            source,
            container,
            index,
        } = proposal
        {
            if let Some((from_container, from)) = source.split_last_index() {
                if from_container == **container && from == *index {
                    return Err(EditError::NoOp(NoOpReason::SamePosition));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwright_model::Column;

    fn p(s: &str) -> Path {
        s.parse().unwrap()
    }

    fn node(kind: NodeKind, id: &str) -> Node {
        Node::with_defaults(kind, id.into())
    }

    fn titled() -> Tree {
        Tree::from_elements(vec![
            node(NodeKind::Title, "t"),
            node(NodeKind::Text, "a"),
            Node::Form {
                id: "f".into(),
                name: "f".into(),
                elements: vec![node(NodeKind::Input, "i")],
            },
        ])
    }

    fn rule_of(result: Result<(), EditError>) -> Option<Rule> {
        result.err().and_then(|e| e.rule())
    }

    #[test]
    fn test_insert_duplicate_id_refused() {
        let config = EditorConfig::default();
        let tree = titled();
        let dup = node(NodeKind::Text, "a");
        let root = Path::root();

        let result = Validator::new(&config).check(
            &tree,
            &Proposal::Insert {
                node: &dup,
                container: &root,
                index: 1,
            },
        );
        assert_eq!(rule_of(result), Some(Rule::UniqueId));
    }

    #[test]
    fn test_second_title_refused() {
        let config = EditorConfig::default();
        let tree = titled();
        let title = node(NodeKind::Title, "t2");
        let root = Path::root();

        let result = Validator::new(&config).check(
            &tree,
            &Proposal::Insert {
                node: &title,
                container: &root,
                index: 0,
            },
        );
        assert_eq!(rule_of(result), Some(Rule::TitleSingleton));
    }

    #[test]
    fn test_title_only_at_root_top() {
        let config = EditorConfig::default();
        let tree = Tree::from_elements(vec![node(NodeKind::Text, "a")]);
        let title = node(NodeKind::Title, "t");
        let root = Path::root();
        let validator = Validator::new(&config);

        assert!(validator
            .check(&tree, &Proposal::Insert { node: &title, container: &root, index: 0 })
            .is_ok());
        assert_eq!(
            rule_of(validator.check(&tree, &Proposal::Insert { node: &title, container: &root, index: 1 })),
            Some(Rule::TitlePosition)
        );
    }

    #[test]
    fn test_nothing_above_title() {
        let config = EditorConfig::default();
        let tree = titled();
        let source = p("elements.1");
        let root = Path::root();

        let result = Validator::new(&config).check(
            &tree,
            &Proposal::Move {
                source: &source,
                container: &root,
                index: 0,
            },
        );
        assert_eq!(rule_of(result), Some(Rule::TitlePosition));
    }

    #[test]
    fn test_form_inside_form_refused_transitively() {
        let config = EditorConfig::default();
        let tree = titled();
        let nested = Node::ColumnSet {
            id: "cs".into(),
            columns: vec![Column::new(vec![Node::Form {
                id: "inner".into(),
                name: "inner".into(),
                elements: vec![],
            }])],
        };
        let form_elements = p("elements.2.elements");

        let result = Validator::new(&config).check(
            &tree,
            &Proposal::Insert {
                node: &nested,
                container: &form_elements,
                index: 0,
            },
        );
        assert_eq!(rule_of(result), Some(Rule::Containment));
    }

    #[test]
    fn test_incoming_subtree_checked_on_its_own() {
        let config = EditorConfig::default();
        let tree = Tree::new();
        let nested = Node::Form {
            id: "outer".into(),
            name: "outer".into(),
            elements: vec![node(NodeKind::Text, "a"), node(NodeKind::Form, "inner")],
        };
        let root = Path::root();

        let result = Validator::new(&config).check(
            &tree,
            &Proposal::Insert {
                node: &nested,
                container: &root,
                index: 0,
            },
        );
        assert_eq!(rule_of(result), Some(Rule::Containment));
    }

    #[test]
    fn test_move_into_own_subtree_refused() {
        let config = EditorConfig::default();
        let tree = titled();
        let source = p("elements.2");
        let inside = p("elements.2.elements");

        let result = Validator::new(&config).check(
            &tree,
            &Proposal::Move {
                source: &source,
                container: &inside,
                index: 0,
            },
        );
        assert_eq!(rule_of(result), Some(Rule::Cycle));
    }

    #[test]
    fn test_same_position_is_noop() {
        let config = EditorConfig::default();
        let tree = titled();
        let source = p("elements.1");
        let root = Path::root();

        let result = Validator::new(&config).check(
            &tree,
            &Proposal::Move {
                source: &source,
                container: &root,
                index: 1,
            },
        );
        assert_eq!(result, Err(EditError::NoOp(NoOpReason::SamePosition)));
    }

    #[test]
    fn test_unresolvable_source_is_path_error() {
        let config = EditorConfig::default();
        let tree = titled();
        let source = p("elements.9");
        let root = Path::root();

        let result = Validator::new(&config).check(
            &tree,
            &Proposal::Move {
                source: &source,
                container: &root,
                index: 1,
            },
        );
        assert!(matches!(result, Err(EditError::Path(_))));
    }
}
