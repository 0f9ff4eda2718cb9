use crate::node::{NodeId, Tree};

/// Sequential id generator for tree nodes
///
/// Ids have the form `<seed>-<n>`. The counter only moves forward, so an id
/// is never handed out twice by the same generator.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Continue after the highest counter already used for `seed` in `tree`
    pub fn resume(seed: impl Into<String>, tree: &Tree) -> Self {
        let seed = seed.into();
        let prefix = format!("{}-", seed);

        let count = tree
            .ids()
            .iter()
            .filter_map(|id| id.strip_prefix(&prefix))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
            .unwrap_or(0);

        Self { seed, count }
    }

    /// Generate next sequential id
    pub fn new_id(&mut self) -> NodeId {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Number of ids issued so far (including those found by `resume`)
    pub fn issued(&self) -> u64 {
        self.count
    }
}
