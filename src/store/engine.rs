//! Two-file ordered key-value engine: a SQLite B-tree index over an append-only block file.
//!
//! Nothing written through `set` is durable until `commit`. All writes between
//! commits run inside one index transaction, which keeps bulk population fast.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{Read as _, Seek as _, SeekFrom, Write as _};
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension as _, params};

use crate::error::Error;

/// Index schema. One row per key, pointing at the value's block.
const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS blocks (
    key TEXT PRIMARY KEY,
    offset INTEGER NOT NULL,
    length INTEGER NOT NULL
) WITHOUT ROWID;";

/// Engine handle over one index file and one block file.
pub struct BlockEngine {
    /// Append-only value blocks. Reads seek, so lookups through `&self` borrow it mutably.
    blocks: RefCell<File>,
    /// SQLite connection over the index file, always inside an open transaction.
    index: Connection,
}

impl BlockEngine {
    /// Flush the block file and commit the index transaction.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the block file cannot be synced,
    /// or `Error::Index` if the transaction cannot be committed.
    pub fn commit(&mut self) -> Result<(), Error> {
        self.blocks.get_mut().sync_data()?;
        self.index.execute_batch("COMMIT; BEGIN;")?;
        return Ok(());
    }

    /// Remove every key and truncate the block file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Index` or `Error::Io` if either file cannot be truncated.
    pub fn clear(&mut self) -> Result<(), Error> {
        self.index.execute("DELETE FROM blocks", [])?;
        self.blocks.get_mut().set_len(0)?;
        return Ok(());
    }

    /// Close both files, discarding anything not yet committed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Index` if SQLite refuses to close the connection.
    pub fn close(self) -> Result<(), Error> {
        drop(self.blocks);
        return self.index.close().map_err(|(_, e)| return Error::Index(e));
    }

    /// Whether a value is stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Index` if the index cannot be queried.
    pub fn contains(&self, key: &str) -> Result<bool, Error> {
        let found = self
            .index
            .prepare_cached("SELECT 1 FROM blocks WHERE key = ?1")?
            .query_row([key], |_| return Ok(()))
            .optional()?;
        return Ok(found.is_some());
    }

    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Index` if the index cannot be queried,
    /// or `Error::Io` if the block is out of range of the block file.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let location = self
            .index
            .prepare_cached("SELECT offset, length FROM blocks WHERE key = ?1")?
            .query_row([key], |row| return Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))
            .optional()?;
        let Some((offset, length)) = location else {
            return Ok(None);
        };

        let offset = u64::try_from(offset).map_err(|_err| return corrupt_block(key))?;
        let length = usize::try_from(length).map_err(|_err| return corrupt_block(key))?;
        let mut blocks = self.blocks.borrow_mut();
        blocks.seek(SeekFrom::Start(offset))?;
        let mut value = vec![0_u8; length];
        blocks.read_exact(&mut value)?;
        return Ok(Some(value));
    }

    /// All keys, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Index` if the index cannot be queried.
    pub fn keys(&self) -> Result<Vec<String>, Error> {
        let mut statement = self.index.prepare_cached("SELECT key FROM blocks ORDER BY key")?;
        let keys = statement
            .query_map([], |row| return row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(keys);
    }

    /// Number of stored keys.
    ///
    /// # Errors
    ///
    /// Returns `Error::Index` if the index cannot be queried.
    pub fn len(&self) -> Result<usize, Error> {
        let count: i64 = self.index.query_row("SELECT COUNT(*) FROM blocks", [], |row| return row.get(0))?;
        return Ok(usize::try_from(count).unwrap_or(0));
    }

    /// Whether no keys are stored.
    ///
    /// # Errors
    ///
    /// Returns `Error::Index` if the index cannot be queried.
    pub fn is_empty(&self) -> Result<bool, Error> {
        return Ok(self.len()? == 0);
    }

    /// Open (or create) the engine files at `paths` and begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the block file cannot be opened,
    /// or `Error::Index` if the index cannot be opened or initialized.
    pub fn open(paths: &DatabasePaths) -> Result<Self, Error> {
        let blocks = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&paths.data)?;
        let index = Connection::open(&paths.index)?;
        index.execute_batch(SCHEMA)?;
        index.execute_batch("BEGIN;")?;
        tracing::trace!(index = %paths.index.display(), "opened block engine");
        return Ok(Self {
            blocks: RefCell::new(blocks),
            index,
        });
    }

    /// Store `value` under `key`, replacing any previous value. The old block
    /// stays in the block file, unreferenced.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the block cannot be appended,
    /// or `Error::Index` if the index row cannot be written.
    pub fn set(&mut self, key: &str, value: &[u8]) -> Result<(), Error> {
        let blocks = self.blocks.get_mut();
        let offset = blocks.seek(SeekFrom::End(0))?;
        blocks.write_all(value)?;

        let offset = i64::try_from(offset).map_err(|_err| return corrupt_block(key))?;
        let length = i64::try_from(value.len()).map_err(|_err| return corrupt_block(key))?;
        self.index
            .prepare_cached("INSERT OR REPLACE INTO blocks (key, offset, length) VALUES (?1, ?2, ?3)")?
            .execute(params![key, offset, length])?;
        return Ok(());
    }
}

/// Error for a block whose location does not fit the platform.
fn corrupt_block(key: &str) -> Error {
    return Error::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("block for `{key}` is out of range"),
    ));
}

/// The pair of files backing one database instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabasePaths {
    /// Data/block file.
    pub data: PathBuf,
    /// Index/tree file.
    pub index: PathBuf,
}

impl DatabasePaths {
    /// Whether both files exist.
    pub fn exist(&self) -> bool {
        return self.index.is_file() && self.data.is_file();
    }

    /// Derive both file names from a stem: `<stem>.index` and `<stem>.data`.
    pub fn from_stem(stem: &Path) -> Self {
        return Self {
            data: with_suffix(stem, ".data"),
            index: with_suffix(stem, ".index"),
        };
    }

    /// Delete both files and any journal SQLite left behind. Missing files are not an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if an existing file cannot be removed.
    pub fn remove(&self) -> Result<(), Error> {
        let journal = with_suffix(&self.index, "-journal");
        for path in [&self.index, &self.data, &journal] {
            match std::fs::remove_file(path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(Error::Io(e)),
                Err(_) | Ok(()) => {},
            }
        }
        return Ok(());
    }
}

/// Append a literal suffix to a path without treating dots in the stem as an extension.
fn with_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(suffix);
    return PathBuf::from(name);
}
