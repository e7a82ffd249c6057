use std::collections::HashSet;

/// Settled lineage results valid for a single module scan.
///
/// A module may be reinstalled with different binaries between scans, so a
/// cache must never outlive the `discover` call that created it. Only
/// outcomes that do not depend on the resolving module are stored here.
#[derive(Debug, Clone)]
pub struct ScanCache {
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl ScanCache {
    /// Creates a cache seeded with the root of the test lineage.
    pub fn new(lineage_root: impl Into<String>) -> Self {
        let mut positive = HashSet::new();
        positive.insert(lineage_root.into());
        Self {
            positive,
            negative: HashSet::new(),
        }
    }

    pub fn is_positive(&self, type_name: &str) -> bool {
        self.positive.contains(type_name)
    }

    pub fn is_negative(&self, type_name: &str) -> bool {
        self.negative.contains(type_name)
    }

    pub fn mark_positive(&mut self, type_name: &str) {
        self.negative.remove(type_name);
        self.positive.insert(type_name.to_string());
    }

    pub fn mark_negative(&mut self, type_name: &str) {
        if !self.positive.contains(type_name) {
            self.negative.insert(type_name.to_string());
        }
    }

    pub fn positive_count(&self) -> usize {
        self.positive.len()
    }

    pub fn negative_count(&self) -> usize {
        self.negative.len()
    }
}
