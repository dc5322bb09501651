//! Persistent indexed target store over the two-file block engine.
//!
//! Two lifecycles share one type. A system database (`open_system`) is
//! committed on close so the next build can reopen it; a scratch database
//! (`create_scratch`) deletes its files on close. Either way disposal runs
//! exactly once, from `close` or from `Drop`, and never fails the caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempPath;

use crate::codec;
use crate::error::Error;
use crate::store::TargetStore;
use crate::store::engine::{BlockEngine, DatabasePaths};
use crate::target::Target;

/// Metadata key holding the number of stored targets.
const DATA_COUNT_KEY: &str = "$DataCount$";

/// Metadata key holding the format version that wrote the database.
const DATA_VERSION_KEY: &str = "$DataVersion$";

/// Format version written into `$DataVersion$` and into system database file names.
pub const FORMAT_VERSION: &str = "1";

/// What happens to the backing files when the store is disposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposal {
    /// Write metadata and commit.
    Persist,
    /// Delete both files.
    Purge,
}

/// A target store persisted in a pair of files.
pub struct PersistentTargetStore {
    /// Number of distinct target ids, excluding metadata.
    count: usize,
    /// Whether anything was written since opening.
    dirty: bool,
    /// Disposal policy fixed at construction.
    disposal: Disposal,
    /// The open engine; `None` once disposed.
    engine: Option<BlockEngine>,
    /// Whether the files were created by this instance rather than reopened.
    newly_created: bool,
    /// The backing files.
    paths: DatabasePaths,
    /// Keeps a scratch database's unique name reserved until it is purged.
    reservation: Option<TempPath>,
}

impl PersistentTargetStore {
    /// Dispose the store now. Equivalent to dropping it.
    pub fn close(mut self) {
        self.dispose();
    }

    /// Write the metadata record and commit everything added so far.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidOperation` if the store was already disposed,
    /// or engine errors if the metadata or commit fails.
    pub fn commit(&mut self) -> Result<(), Error> {
        let count = self.count.to_string();
        let engine = self.engine_mut()?;
        engine.set(DATA_COUNT_KEY, count.as_bytes())?;
        engine.set(DATA_VERSION_KEY, FORMAT_VERSION.as_bytes())?;
        engine.commit()?;
        tracing::debug!(index = %self.paths.index.display(), count = self.count, "committed target database");
        return Ok(());
    }

    /// Create a scratch database with a unique temporary name under `dir`.
    /// Its files are deleted when the store is disposed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the name cannot be reserved or the files cannot be created.
    pub fn create_scratch(dir: &Path) -> Result<Self, Error> {
        let reservation = tempfile::Builder::new()
            .prefix("docxref-scratch-")
            .tempfile_in(dir)?
            .into_temp_path();
        let paths = DatabasePaths::from_stem(&reservation);
        let mut store = Self::open_with(paths, Disposal::Purge)?;
        store.reservation = Some(reservation);
        return Ok(store);
    }

    /// Run the disposal policy once. Failures are logged, never returned.
    fn dispose(&mut self) {
        if self.engine.is_none() {
            return;
        }
        if self.disposal == Disposal::Persist && (self.newly_created || self.dirty) {
            if let Err(e) = self.commit() {
                tracing::warn!(index = %self.paths.index.display(), error = %e, "commit on close failed");
            }
        }
        if let Some(engine) = self.engine.take() {
            if let Err(e) = engine.close() {
                tracing::warn!(index = %self.paths.index.display(), error = %e, "close failed");
            }
        }
        if self.disposal == Disposal::Purge {
            if let Err(e) = self.paths.remove() {
                tracing::warn!(index = %self.paths.index.display(), error = %e, "scratch database not removed");
            }
            drop(self.reservation.take());
            tracing::debug!(index = %self.paths.index.display(), "purged scratch database");
        }
    }

    /// The open engine, or an invalid-operation error after disposal.
    fn engine(&self) -> Result<&BlockEngine, Error> {
        return self.engine.as_ref().ok_or_else(disposed);
    }

    /// Mutable access to the open engine.
    fn engine_mut(&mut self) -> Result<&mut BlockEngine, Error> {
        return self.engine.as_mut().ok_or_else(disposed);
    }

    /// Whether this instance created the files rather than reopening them.
    pub const fn is_newly_created(&self) -> bool {
        return self.newly_created;
    }

    /// Open the system database at `stem`, reopening it if both files exist.
    /// It is committed when disposed.
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatibleDatabase` if the files were written by another
    /// format version, or engine errors if the files cannot be opened.
    pub fn open_system(stem: &Path) -> Result<Self, Error> {
        return Self::open_with(DatabasePaths::from_stem(stem), Disposal::Persist);
    }

    /// Open or initialize the files and recover the count from metadata.
    fn open_with(paths: DatabasePaths, disposal: Disposal) -> Result<Self, Error> {
        let existed = paths.exist();
        if !existed {
            // A lone index or data file is a leftover from an interrupted build.
            paths.remove()?;
        }
        let engine = BlockEngine::open(&paths)?;
        let count = if existed { recover_count(&engine, &paths)? } else { 0 };
        if existed {
            tracing::debug!(index = %paths.index.display(), count, "reopened target database");
        } else {
            tracing::debug!(index = %paths.index.display(), "created target database");
        }

        return Ok(Self {
            count,
            dirty: false,
            disposal,
            engine: Some(engine),
            newly_created: !existed,
            paths,
            reservation: None,
        });
    }

    /// The backing file pair.
    pub const fn paths(&self) -> &DatabasePaths {
        return &self.paths;
    }

    /// Version-stamped stem of the system database named `name` under `dir`.
    pub fn system_stem(dir: &Path, name: &str) -> PathBuf {
        return dir.join(format!("{name}_v{FORMAT_VERSION}"));
    }
}

impl Drop for PersistentTargetStore {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl TargetStore for PersistentTargetStore {
    fn add(&mut self, target: Target) -> Result<(), Error> {
        let id = target.id();
        if is_reserved(id) {
            return Err(Error::InvalidOperation {
                reason: format!("`{id}` collides with a reserved metadata key"),
            });
        }
        let text = codec::write_target(&target)?;
        let is_new = !self.engine()?.contains(id)?;
        self.engine_mut()?.set(id, text.as_bytes())?;
        if is_new {
            self.count = self.count.saturating_add(1);
        }
        self.dirty = true;
        return Ok(());
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.engine_mut()?.clear()?;
        self.count = 0;
        self.dirty = true;
        return Ok(());
    }

    fn contains(&self, id: &str) -> bool {
        if is_reserved(id) {
            return false;
        }
        return match self.engine().and_then(|engine| return engine.contains(id)) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(id, error = %e, "target lookup failed");
                false
            },
        };
    }

    fn count(&self) -> usize {
        return self.count;
    }

    fn get(&self, id: &str) -> Option<Arc<Target>> {
        if is_reserved(id) {
            return None;
        }
        let bytes = match self.engine().and_then(|engine| return engine.get(id)) {
            Ok(bytes) => bytes?,
            Err(e) => {
                tracing::warn!(id, error = %e, "target lookup failed");
                return None;
            },
        };
        let decoded = String::from_utf8(bytes)
            .map_err(|e| return Error::Decode { context: "target", reason: e.to_string() })
            .and_then(|text| return codec::read_target(&text));
        return match decoded {
            Ok(target) => Some(Arc::new(target)),
            Err(e) => {
                tracing::warn!(id, error = %e, "malformed target record");
                None
            },
        };
    }
}

/// Error for operations on a disposed store.
fn disposed() -> Error {
    return Error::InvalidOperation {
        reason: "target database used after it was closed".to_string(),
    };
}

/// Whether `id` is one of the metadata keys.
fn is_reserved(id: &str) -> bool {
    return id == DATA_COUNT_KEY || id == DATA_VERSION_KEY;
}

/// Read the metadata record of a reopened database.
///
/// # Errors
///
/// Returns `Error::IncompatibleDatabase` on a version mismatch, or engine errors.
fn recover_count(engine: &BlockEngine, paths: &DatabasePaths) -> Result<usize, Error> {
    if let Some(version) = engine.get(DATA_VERSION_KEY)? {
        let found = String::from_utf8_lossy(&version).into_owned();
        if found != FORMAT_VERSION {
            return Err(Error::IncompatibleDatabase {
                expected: FORMAT_VERSION.to_string(),
                found,
                path: paths.index.clone(),
            });
        }
    }

    let recorded = engine
        .get(DATA_COUNT_KEY)?
        .and_then(|bytes| return String::from_utf8(bytes).ok())
        .and_then(|text| return text.parse::<usize>().ok());
    if let Some(count) = recorded {
        return Ok(count);
    }

    // No metadata: the database was never closed cleanly. Count the rows instead.
    tracing::warn!(index = %paths.index.display(), "missing $DataCount$, recounting");
    let mut count = engine.len()?;
    for key in [DATA_COUNT_KEY, DATA_VERSION_KEY] {
        if engine.contains(key)? {
            count = count.saturating_sub(1);
        }
    }
    return Ok(count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::NamespaceTarget;

    fn namespace(id: &str, name: &str) -> Target {
        Target::Namespace(NamespaceTarget { id: id.to_string(), name: name.to_string() })
    }

    #[test]
    fn adding_same_id_twice_counts_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PersistentTargetStore::open_system(&dir.path().join("system_v1")).unwrap();
        store.add(namespace("N:A", "A")).unwrap();
        store.add(namespace("N:A", "A2")).unwrap();

        assert_eq!(store.count(), 1);
        assert!(store.contains("N:A"));
        assert_eq!(store.get("N:A").unwrap().name(), "A2");
    }

    #[test]
    fn reopening_recovers_committed_count() {
        let dir = tempfile::tempdir().unwrap();
        let stem = PersistentTargetStore::system_stem(dir.path(), "system");

        let mut store = PersistentTargetStore::open_system(&stem).unwrap();
        assert!(store.is_newly_created());
        for i in 0..3 {
            store.add(namespace(&format!("N:Ns{i}"), "Ns")).unwrap();
        }
        store.close();

        let reopened = PersistentTargetStore::open_system(&stem).unwrap();
        assert!(!reopened.is_newly_created());
        assert_eq!(reopened.count(), 3);
        assert_eq!(reopened.get("N:Ns2").unwrap().id(), "N:Ns2");
    }

    #[test]
    fn scratch_store_deletes_its_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PersistentTargetStore::create_scratch(dir.path()).unwrap();
        store.add(namespace("N:A", "A")).unwrap();
        let paths = store.paths().clone();
        assert!(paths.exist());

        drop(store);
        assert!(!paths.index.exists());
        assert!(!paths.data.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn metadata_keys_are_not_targets() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("meta_v1");
        let mut store = PersistentTargetStore::open_system(&stem).unwrap();
        store.commit().unwrap();

        assert!(!store.contains(DATA_COUNT_KEY));
        assert!(store.get(DATA_VERSION_KEY).is_none());
        assert!(matches!(
            store.add(namespace(DATA_COUNT_KEY, "x")),
            Err(Error::InvalidOperation { .. })
        ));
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("old_v0");
        let paths = DatabasePaths::from_stem(&stem);
        let mut engine = BlockEngine::open(&paths).unwrap();
        engine.set(DATA_VERSION_KEY, b"0").unwrap();
        engine.commit().unwrap();
        engine.close().unwrap();

        let result = PersistentTargetStore::open_system(&stem);
        assert!(matches!(result, Err(Error::IncompatibleDatabase { .. })));
    }

    #[test]
    fn malformed_record_reads_as_miss() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("bad_v1");
        let paths = DatabasePaths::from_stem(&stem);
        let mut engine = BlockEngine::open(&paths).unwrap();
        engine.set("T:Broken", b"{\"target\":\"type\"").unwrap();
        engine.commit().unwrap();
        engine.close().unwrap();

        let store = PersistentTargetStore::open_system(&stem).unwrap();
        assert!(store.contains("T:Broken"));
        assert!(store.get("T:Broken").is_none());
    }
}
