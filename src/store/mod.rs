//! Keyed containers of targets.

mod cache;
mod engine;
mod memory;
mod persistent;

use std::sync::Arc;

pub use cache::{CachedTargetStore, FifoCache};
pub use engine::{BlockEngine, DatabasePaths};
pub use memory::MemoryTargetStore;
pub use persistent::{FORMAT_VERSION, PersistentTargetStore};

use crate::error::Error;
use crate::target::Target;

/// A keyed container of targets. A store never holds two targets with the same id.
///
/// Lookups never fail: a record that cannot be read is logged and reported as a miss.
pub trait TargetStore {
    /// Insert or replace the target stored under its id. Replacing an existing
    /// id leaves the count unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be encoded or written.
    fn add(&mut self, target: Target) -> Result<(), Error>;

    /// Remove every target.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be truncated.
    fn clear(&mut self) -> Result<(), Error>;

    /// Whether a target with this id is stored.
    fn contains(&self, id: &str) -> bool;

    /// Number of distinct ids stored.
    fn count(&self) -> usize;

    /// The target stored under `id`, if any.
    fn get(&self, id: &str) -> Option<Arc<Target>>;
}
