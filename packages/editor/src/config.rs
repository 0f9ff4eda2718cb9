//! Editor configuration
//!
//! Loaded from JSON with every field optional:
//!
//! ```json
//! {
//!   "hover_debounce_ms": 50,
//!   "settle_delay_ms": 120,
//!   "index_policy": "clamp",
//!   "containment": [{ "outer": "form", "inner": "form" }]
//! }
//! ```

use formwright_model::NodeKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to do with a destination index past the end of its container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexPolicy {
    /// Clamp to `[0, len]`
    #[default]
    Clamp,
    /// Fail with `EditError::IndexOutOfRange`
    Reject,
}

/// `inner` nodes may not appear anywhere below an `outer` node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainmentRule {
    pub outer: NodeKind,
    pub inner: NodeKind,
}

impl ContainmentRule {
    pub fn new(outer: NodeKind, inner: NodeKind) -> Self {
        Self { outer, inner }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Hover events closer together than this are coalesced
    pub hover_debounce_ms: u64,
    /// Geometry is not re-read for this long after a structural change
    pub settle_delay_ms: u64,
    pub index_policy: IndexPolicy,
    pub containment: Vec<ContainmentRule>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hover_debounce_ms: 50,
            settle_delay_ms: 120,
            index_policy: IndexPolicy::Clamp,
            containment: vec![ContainmentRule::new(NodeKind::Form, NodeKind::Form)],
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with_hover_debounce(mut self, ms: u64) -> Self {
        self.hover_debounce_ms = ms;
        self
    }

    #[must_use]
    pub fn with_settle_delay(mut self, ms: u64) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn with_index_policy(mut self, policy: IndexPolicy) -> Self {
        self.index_policy = policy;
        self
    }

    #[must_use]
    pub fn with_containment(mut self, rule: ContainmentRule) -> Self {
        if !self.containment.contains(&rule) {
            self.containment.push(rule);
        }
        self
    }

    pub fn hover_debounce(&self) -> Duration {
        Duration::from_millis(self.hover_debounce_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// True if `inner` may not be nested anywhere below `outer`
    pub fn forbids(&self, outer: NodeKind, inner: NodeKind) -> bool {
        self.containment
            .iter()
            .any(|rule| rule.outer == outer && rule.inner == inner)
    }
}
