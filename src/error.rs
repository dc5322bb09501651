/// Crate-level error types for docxref diagnostics.
use std::path::PathBuf;

/// All errors in docxref carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, identifier, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-level error type re-exported by the library")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A raw target data file does not exist on disk.
    #[error("data file not found: {}", path.display())]
    DataFileNotFound {
        /// Path to the missing data file.
        path: PathBuf,
    },

    /// Encoded target or reference text could not be decoded.
    #[error("cannot decode {context}: {reason}")]
    Decode {
        /// What was being decoded (e.g. "target", "type reference").
        context: &'static str,
        /// Description of the decode failure.
        reason: String,
    },

    /// A persisted database was written by an incompatible format version.
    #[error("incompatible database {} (format {found}, expected {expected})", path.display())]
    IncompatibleDatabase {
        /// Format version this build understands.
        expected: String,
        /// Format version recorded in the database metadata.
        found: String,
        /// Index file of the database.
        path: PathBuf,
    },

    /// The index file of a persistent store failed.
    #[error("index: {0}")]
    Index(
        /// The wrapped SQLite error.
        #[from]
        rusqlite::Error,
    ),

    /// A reference or target reached a dispatch point it can never be valid at.
    #[error("invalid operation: {reason}")]
    InvalidOperation {
        /// Description of the violated invariant.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// The markup sink rejected a write.
    #[error("markup: {reason}")]
    Markup {
        /// Description of the sink failure.
        reason: String,
    },

    /// A configuration key required by the current command is absent.
    #[error("missing configuration `{key}` in {}", path.display())]
    MissingConfiguration {
        /// Name of the missing key.
        key: &'static str,
        /// Config file that was consulted.
        path: PathBuf,
    },

    /// The online resolver could not be constructed.
    #[error("online resolver setup failed: {reason}")]
    OnlineSetup {
        /// Description of the setup failure.
        reason: String,
    },

    /// No store in the collection holds the requested identifier.
    #[error("target not found: `{id}`")]
    TargetNotFound {
        /// Identifier that was looked up.
        id: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// A configured syntax profile class is not known.
    #[error("unknown syntax profile: `{name}`")]
    UnknownProfile {
        /// Profile class that was requested.
        name: String,
    },
}
