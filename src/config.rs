use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::render::SyntaxProfile;
use crate::render::syntax;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = ".docxref.toml";

/// Default number of targets cached in front of each persistent store.
const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Project configuration loaded from `.docxref.toml`.
/// Relative paths in the file are resolved against the directory holding it.
#[derive(Debug, Clone)]
pub struct Config {
    /// FIFO cache size in front of each persistent store.
    pub cache_capacity: usize,
    /// Linked database stems, in precedence order.
    pub databases: Vec<PathBuf>,
    /// Online resolver settings.
    pub online: OnlineConfig,
    /// Directory holding the system database and URL table.
    pub output: Option<PathBuf>,
    /// Config file consulted, for diagnostics. It may not exist.
    pub path: PathBuf,
    /// Syntax profiles the renderer emits, in output order.
    pub profiles: Vec<SyntaxProfile>,
    /// Hold the current build's targets in a scratch database instead of memory.
    pub scratch_local: bool,
}

/// Online resolver settings from the `[online]` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnlineConfig {
    /// URL template base.
    pub base_url: String,
    /// Initial locale.
    pub locale: String,
    /// Content-service lookup endpoint; `None` turns online resolution off.
    pub service_url: Option<String>,
    /// HTTP timeout for one lookup, in seconds.
    pub timeout_secs: u64,
}

impl Default for OnlineConfig {
    fn default() -> Self {
        return Self {
            base_url: "https://learn.microsoft.com".to_string(),
            locale: "en-us".to_string(),
            service_url: None,
            timeout_secs: 10,
        };
    }
}

/// Raw TOML structure for `.docxref.toml`.
#[derive(serde::Deserialize)]
struct DocxrefTomlConfig {
    /// See [`Config::cache_capacity`].
    #[serde(default)]
    cache_capacity: Option<usize>,
    /// See [`Config::databases`].
    #[serde(default)]
    databases: Vec<PathBuf>,
    /// See [`OnlineConfig`].
    #[serde(default)]
    online: Option<OnlineTomlConfig>,
    /// See [`Config::output`].
    #[serde(default)]
    output: Option<PathBuf>,
    /// Profile classes; absent means all.
    #[serde(default)]
    profiles: Option<Vec<String>>,
    /// See [`Config::scratch_local`].
    #[serde(default)]
    scratch_local: bool,
}

/// Raw `[online]` table.
#[derive(serde::Deserialize)]
struct OnlineTomlConfig {
    /// See [`OnlineConfig::base_url`].
    base_url: Option<String>,
    /// See [`OnlineConfig::locale`].
    locale: Option<String>,
    /// See [`OnlineConfig::service_url`].
    service_url: Option<String>,
    /// See [`OnlineConfig::timeout_secs`].
    timeout_secs: Option<u64>,
}

impl Config {
    /// Defaults used when no config file exists.
    fn defaults(path: PathBuf) -> Self {
        return Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            databases: Vec::new(),
            online: OnlineConfig::default(),
            output: None,
            path,
            profiles: syntax::ALL.to_vec(),
            scratch_local: false,
        };
    }

    /// Load config from `.docxref.toml` in the given root directory.
    /// Returns defaults (with no output directory) if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config file the
    /// user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// `Error::TomlDe` if the TOML is malformed,
    /// or `Error::UnknownProfile` if a profile class is not known.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::defaults(path));
            },
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: DocxrefTomlConfig = toml::from_str(&content)?;
        let profiles = match raw.profiles {
            Some(classes) if !classes.is_empty() => classes
                .iter()
                .map(|class| return SyntaxProfile::by_class(class))
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) | None => syntax::ALL.to_vec(),
        };
        let defaults = OnlineConfig::default();
        let online = match raw.online {
            Some(table) => OnlineConfig {
                base_url: table.base_url.unwrap_or(defaults.base_url),
                locale: table.locale.unwrap_or(defaults.locale),
                service_url: table.service_url,
                timeout_secs: table.timeout_secs.unwrap_or(defaults.timeout_secs),
            },
            None => defaults,
        };

        return Ok(Self {
            cache_capacity: raw.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY),
            databases: raw.databases.iter().map(|stem| return root.join(stem)).collect(),
            online,
            output: raw.output.map(|output| return root.join(output)),
            path,
            profiles,
            scratch_local: raw.scratch_local,
        });
    }

    /// The output directory, required by commands that persist anything.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingConfiguration` if `output` is not set.
    pub fn output_dir(&self) -> Result<&Path, Error> {
        return self.output.as_deref().ok_or_else(|| {
            return Error::MissingConfiguration {
                key: "output",
                path: self.path.clone(),
            };
        });
    }
}
