//! Federated lookup over several target stores.

use std::sync::Arc;

use crate::store::{MemoryTargetStore, TargetStore};
use crate::target::Target;

/// Which store in a collection answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOrigin {
    /// A linked cross-project database, by position in precedence order.
    Linked(usize),
    /// The current build's own store.
    Local,
    /// The prebuilt system database.
    System,
}

impl std::fmt::Display for StoreOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return match self {
            Self::Linked(position) => write!(f, "linked[{position}]"),
            Self::Local => f.write_str("local"),
            Self::System => f.write_str("system"),
        };
    }
}

/// Stores queried in fixed precedence: local, then system, then linked
/// databases in the order they were added. The first hit wins.
///
/// A collection never reports a combined count; see [`TargetCollection::counts`].
pub struct TargetCollection {
    /// Additional databases for cross-project linking.
    linked: Vec<Box<dyn TargetStore>>,
    /// The current build's symbols.
    local: Box<dyn TargetStore>,
    /// The prebuilt system database.
    system: Option<Box<dyn TargetStore>>,
}

impl TargetCollection {
    /// Whether any store holds `id`.
    pub fn contains(&self, id: &str) -> bool {
        return self.stores().any(|(_, store)| return store.contains(id));
    }

    /// Per-store target counts, in precedence order.
    pub fn counts(&self) -> Vec<(StoreOrigin, usize)> {
        return self.stores().map(|(origin, store)| return (origin, store.count())).collect();
    }

    /// Resolve `id` to a target.
    pub fn get(&self, id: &str) -> Option<Arc<Target>> {
        return self.locate(id).map(|(_, target)| return target);
    }

    /// Append a linked database at the lowest precedence.
    pub fn link(&mut self, store: Box<dyn TargetStore>) {
        self.linked.push(store);
    }

    /// Mutable access to the current build's store, for population.
    pub fn local_mut(&mut self) -> &mut dyn TargetStore {
        return &mut *self.local;
    }

    /// Resolve `id` and report which store answered.
    pub fn locate(&self, id: &str) -> Option<(StoreOrigin, Arc<Target>)> {
        let found = self
            .stores()
            .find_map(|(origin, store)| return store.get(id).map(|target| return (origin, target)));
        match &found {
            Some((origin, _)) => tracing::trace!(id, %origin, "resolved target"),
            None => tracing::trace!(id, "target not in any store"),
        }
        return found;
    }

    /// Create a collection whose local store is an in-memory store.
    pub fn new() -> Self {
        return Self::with_local(Box::new(MemoryTargetStore::new()));
    }

    /// Set the system database, replacing any previous one.
    pub fn set_system(&mut self, store: Box<dyn TargetStore>) {
        self.system = Some(store);
    }

    /// All stores with their origins, in precedence order.
    fn stores(&self) -> impl Iterator<Item = (StoreOrigin, &(dyn TargetStore + 'static))> {
        let local = std::iter::once((StoreOrigin::Local, &*self.local));
        let system = self.system.iter().map(|store| return (StoreOrigin::System, &**store));
        let linked = self
            .linked
            .iter()
            .enumerate()
            .map(|(position, store)| return (StoreOrigin::Linked(position), &**store));
        return local.chain(system).chain(linked);
    }

    /// Create a collection around a caller-supplied local store.
    pub fn with_local(local: Box<dyn TargetStore>) -> Self {
        return Self {
            linked: Vec::new(),
            local,
            system: None,
        };
    }
}

impl Default for TargetCollection {
    fn default() -> Self {
        return Self::new();
    }
}
