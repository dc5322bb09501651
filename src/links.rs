//! External documentation links: a persistent id-to-endpoint table in front of
//! the live online resolver, so repeated builds are served from disk.

use std::path::Path;

use crate::error::Error;
use crate::online::{self, OnlineResolver};
use crate::store::{BlockEngine, DatabasePaths, FORMAT_VERSION};

/// Persistent `id → endpoint fragment` table.
pub struct UrlTable {
    /// Set after a write-back, cleared by commit.
    dirty: bool,
    /// Open engine; `None` once closed.
    engine: Option<BlockEngine>,
    /// Number of stored endpoints.
    len: usize,
    /// Backing files.
    paths: DatabasePaths,
}

impl UrlTable {
    /// Commit pending write-backs and close the files.
    ///
    /// # Errors
    ///
    /// Returns engine errors if the commit or close fails.
    pub fn close(mut self) -> Result<(), Error> {
        return self.finish();
    }

    /// Commit pending write-backs.
    ///
    /// # Errors
    ///
    /// Returns engine errors if the commit fails.
    pub fn commit(&mut self) -> Result<(), Error> {
        if let Some(engine) = self.engine.as_mut()
            && self.dirty
        {
            engine.commit()?;
            self.dirty = false;
            tracing::debug!(index = %self.paths.index.display(), entries = self.len, "committed url table");
        }
        return Ok(());
    }

    /// Commit and release the engine. Safe to call twice.
    fn finish(&mut self) -> Result<(), Error> {
        self.commit()?;
        return match self.engine.take() {
            Some(engine) => engine.close(),
            None => Ok(()),
        };
    }

    /// The endpoint stored for `id`. Read failures are logged and reported as a miss.
    pub fn get(&self, id: &str) -> Option<String> {
        let engine = self.engine.as_ref()?;
        return match engine.get(id) {
            Ok(bytes) => bytes.and_then(|bytes| return String::from_utf8(bytes).ok()),
            Err(e) => {
                tracing::warn!(id, error = %e, "url table lookup failed");
                None
            },
        };
    }

    /// Insert or replace the endpoint for `id`.
    ///
    /// # Errors
    ///
    /// Returns engine errors if the write fails, or `Error::InvalidOperation` after close.
    pub fn insert(&mut self, id: &str, endpoint: &str) -> Result<(), Error> {
        let engine = self.engine.as_mut().ok_or_else(|| {
            return Error::InvalidOperation {
                reason: "url table used after it was closed".to_string(),
            };
        })?;
        let is_new = !engine.contains(id)?;
        engine.set(id, endpoint.as_bytes())?;
        if is_new {
            self.len = self.len.saturating_add(1);
        }
        self.dirty = true;
        return Ok(());
    }

    /// Whether the table holds no endpoints.
    pub const fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    /// Number of stored endpoints.
    pub const fn len(&self) -> usize {
        return self.len;
    }

    /// Open (or create) `urls_v{N}` under `dir`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` or `Error::Index` if the files cannot be opened.
    pub fn open(dir: &Path) -> Result<Self, Error> {
        let paths = DatabasePaths::from_stem(&dir.join(format!("urls_v{FORMAT_VERSION}")));
        let engine = BlockEngine::open(&paths)?;
        let len = engine.len()?;
        tracing::debug!(index = %paths.index.display(), entries = len, "opened url table");
        return Ok(Self {
            dirty: false,
            engine: Some(engine),
            len,
            paths,
        });
    }
}

impl Drop for UrlTable {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            tracing::warn!(index = %self.paths.index.display(), error = %e, "url table not committed");
        }
    }
}

/// Where an external link came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSource {
    /// The persistent table.
    Disk,
    /// The live online resolver.
    Online,
}

/// Resolves ids to external URLs: disk table first, then the live resolver,
/// writing live answers back into the table.
pub struct ExternalLinks {
    /// URL template base used for disk hits when no live resolver exists.
    base_url: String,
    /// Locale used for disk hits when no live resolver exists.
    locale: String,
    /// Live resolver, when configured.
    online: Option<OnlineResolver>,
    /// Persistent table, when an output directory is configured.
    table: Option<UrlTable>,
}

impl ExternalLinks {
    /// Commit the table and release it.
    ///
    /// # Errors
    ///
    /// Returns engine errors if the table cannot be committed.
    pub fn close(mut self) -> Result<(), Error> {
        return match self.table.take() {
            Some(table) => table.close(),
            None => Ok(()),
        };
    }

    /// Compose a controller. Either half may be absent.
    pub fn new(table: Option<UrlTable>, online: Option<OnlineResolver>, base_url: &str, locale: &str) -> Self {
        return Self {
            base_url: base_url.to_string(),
            locale: locale.to_string(),
            online,
            table,
        };
    }

    /// The live resolver, if any.
    pub const fn online(&self) -> Option<&OnlineResolver> {
        return self.online.as_ref();
    }

    /// The full URL for `id`, and where it came from.
    pub fn resolve(&mut self, id: &str) -> Option<(String, LinkSource)> {
        if let Some(table) = self.table.as_ref().filter(|table| return !table.is_empty())
            && let Some(endpoint) = table.get(id)
        {
            let url = match &self.online {
                Some(online) => online.build_url(&endpoint),
                None => online::build_url(&self.base_url, &self.locale, &endpoint),
            };
            return Some((url, LinkSource::Disk));
        }

        let online = self.online.as_mut()?;
        let endpoint = online.endpoint(id)?;
        let url = online.build_url(&endpoint);
        if let Some(table) = self.table.as_mut()
            && let Err(e) = table.insert(id, &endpoint)
        {
            tracing::warn!(id, error = %e, "url write-back failed");
        }
        return Some((url, LinkSource::Online));
    }

    /// The persistent table, if any.
    pub const fn table(&self) -> Option<&UrlTable> {
        return self.table.as_ref();
    }
}
