use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::Error;
use crate::store::TargetStore;
use crate::target::Target;

/// Hash-map store for the current build's own symbols. Nothing is persisted.
#[derive(Debug, Default)]
pub struct MemoryTargetStore {
    /// Targets keyed by id.
    targets: FxHashMap<String, Arc<Target>>,
}

impl MemoryTargetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        return Self::default();
    }
}

impl TargetStore for MemoryTargetStore {
    fn add(&mut self, target: Target) -> Result<(), Error> {
        self.targets.insert(target.id().to_string(), Arc::new(target));
        return Ok(());
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.targets.clear();
        return Ok(());
    }

    fn contains(&self, id: &str) -> bool {
        return self.targets.contains_key(id);
    }

    fn count(&self) -> usize {
        return self.targets.len();
    }

    fn get(&self, id: &str) -> Option<Arc<Target>> {
        return self.targets.get(id).cloned();
    }
}
