//! Import of raw target data files: one encoded target per line.

use std::io::{BufRead as _, BufReader};
use std::path::Path;

use crate::codec;
use crate::error::Error;
use crate::store::TargetStore;

/// Outcome of one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Lines decoded and added.
    pub loaded: usize,
    /// Non-blank lines that could not be decoded.
    pub skipped: usize,
}

/// Decode every line of `path` and add the targets to `store`.
///
/// Blank lines are ignored. A line that does not decode is skipped with a
/// warning naming its line number; the rest of the file still loads.
///
/// # Errors
///
/// Returns `Error::DataFileNotFound` if `path` does not exist, `Error::Io` if
/// it cannot be read, or the store's error if an add fails.
pub fn load_targets(path: &Path, store: &mut dyn TargetStore) -> Result<LoadSummary, Error> {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::DataFileNotFound { path: path.to_path_buf() });
        },
        Err(e) => return Err(Error::Io(e)),
    };

    let mut summary = LoadSummary::default();
    for (number, line) in (1_usize..).zip(BufReader::new(file).lines()) {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        match codec::read_target(text) {
            Ok(target) => {
                store.add(target)?;
                summary.loaded = summary.loaded.saturating_add(1);
            },
            Err(e) => {
                tracing::warn!(file = %path.display(), line = number, error = %e, "skipping undecodable target");
                summary.skipped = summary.skipped.saturating_add(1);
            },
        }
    }

    tracing::info!(file = %path.display(), loaded = summary.loaded, skipped = summary.skipped, "loaded targets");
    return Ok(summary);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTargetStore;

    const WIDGET: &str = r#"{"target":"type","id":"T:Ns.Widget","name":"Widget","namespace":{"id":"N:Ns"}}"#;
    const NAMESPACE: &str = r#"{"target":"namespace","id":"N:Ns","name":"Ns"}"#;

    #[test]
    fn loads_every_decodable_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("targets.jsonl");
        std::fs::write(&path, format!("{NAMESPACE}\n\n{WIDGET}\n")).unwrap();

        let mut store = MemoryTargetStore::new();
        let summary = load_targets(&path, &mut store).unwrap();

        assert_eq!(summary, LoadSummary { loaded: 2, skipped: 0 });
        assert!(store.contains("T:Ns.Widget"));
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn undecodable_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("targets.jsonl");
        std::fs::write(&path, format!("{WIDGET}\n{{\"target\":\"type\",\"id\":\n{NAMESPACE}\n")).unwrap();

        let mut store = MemoryTargetStore::new();
        let summary = load_targets(&path, &mut store).unwrap();

        assert_eq!(summary, LoadSummary { loaded: 2, skipped: 1 });
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MemoryTargetStore::new();
        let result = load_targets(&dir.path().join("absent.jsonl"), &mut store);
        assert!(matches!(result, Err(Error::DataFileNotFound { .. })));
    }
}
