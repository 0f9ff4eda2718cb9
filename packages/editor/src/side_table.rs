//! Editing state kept outside the tree
//!
//! Property editors own a [`SideTable`] and hand it to the post-effect
//! engine after every structural edit, so entries for nodes that left the
//! tree are dropped.

use formwright_model::{Node, NodeId};
use std::collections::HashMap;

/// Card header derived from the title node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderState {
    pub title_id: NodeId,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideTable {
    header: Option<HeaderState>,

    /// Variable name bound to an input's value
    bindings: HashMap<NodeId, String>,

    /// Unsaved text typed into a property editor
    drafts: HashMap<NodeId, String>,
}

impl SideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self) -> Option<&HeaderState> {
        self.header.as_ref()
    }

    /// Mirror the header from a title node; other kinds are ignored
    pub fn set_header(&mut self, title: &Node) {
        if let Node::Title { id, content } = title {
            self.header = Some(HeaderState {
                title_id: id.clone(),
                text: content.clone(),
            });
        }
    }

    pub fn clear_header(&mut self) {
        self.header = None;
    }

    pub fn bind(&mut self, id: impl Into<NodeId>, variable: impl Into<String>) {
        self.bindings.insert(id.into(), variable.into());
    }

    pub fn binding(&self, id: &str) -> Option<&str> {
        self.bindings.get(id).map(String::as_str)
    }

    pub fn set_draft(&mut self, id: impl Into<NodeId>, text: impl Into<String>) {
        self.drafts.insert(id.into(), text.into());
    }

    pub fn draft(&self, id: &str) -> Option<&str> {
        self.drafts.get(id).map(String::as_str)
    }

    /// Drop every entry keyed by one of `ids`
    pub fn forget_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.bindings.remove(id);
            self.drafts.remove(id);
            if self.header.as_ref().is_some_and(|h| h.title_id == id) {
                self.header = None;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.bindings.is_empty() && self.drafts.is_empty()
    }
}
