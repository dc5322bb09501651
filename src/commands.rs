//! Core CLI commands for docxref: import, lookup, render, link, info.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::codec;
use crate::collection::TargetCollection;
use crate::config::Config;
use crate::error::Error;
use crate::identifier;
use crate::links::{ExternalLinks, UrlTable};
use crate::loader;
use crate::online::{HttpContentService, OnlineResolver};
use crate::render::{DisplayOptions, ProfileText, Renderer, SyntaxProfile, XmlMarkup};
use crate::store::{CachedTargetStore, DatabasePaths, MemoryTargetStore, PersistentTargetStore, TargetStore};

/// Name of the system database under the output directory.
pub const SYSTEM_DATABASE: &str = "system";

/// Exit code for an id with no target or no link.
const NOT_FOUND: u8 = 1;

/// How `render` prints its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderFormat {
    /// Plain text as seen by one profile; `None` means the first configured profile.
    Profile(Option<String>),
    /// The full markup with every configured profile.
    Xml,
}

/// Assemble the collection a build resolves against: the local store
/// (optionally seeded from a data file), the system database under `output`,
/// then every linked database that exists.
///
/// # Errors
///
/// Returns configuration, store, or load errors.
pub fn build_collection(config: &Config, local_file: Option<&Path>) -> Result<TargetCollection, Error> {
    let mut collection = if config.scratch_local {
        let dir = match config.output.as_deref() {
            Some(output) => {
                std::fs::create_dir_all(output)?;
                output.to_path_buf()
            },
            None => std::env::temp_dir(),
        };
        let scratch = PersistentTargetStore::create_scratch(&dir)?;
        TargetCollection::with_local(Box::new(CachedTargetStore::new(scratch, config.cache_capacity)))
    } else {
        TargetCollection::with_local(Box::new(MemoryTargetStore::new()))
    };

    if let Some(path) = local_file {
        loader::load_targets(path, collection.local_mut())?;
    }

    if let Some(output) = config.output.as_deref() {
        let stem = PersistentTargetStore::system_stem(output, SYSTEM_DATABASE);
        if let Some(store) = open_existing(&stem, config.cache_capacity)? {
            collection.set_system(store);
        }
    }

    for stem in &config.databases {
        match open_existing(stem, config.cache_capacity)? {
            Some(store) => collection.link(store),
            None => tracing::warn!(stem = %stem.display(), "linked database not found, skipping"),
        }
    }

    return Ok(collection);
}

/// Load a data file into the system database, creating it on first use.
///
/// # Errors
///
/// Returns `Error::MissingConfiguration` without an `output` directory, or
/// load and store errors.
pub fn import(data_file: &Path) -> Result<(), Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let output = config.output_dir()?;
    std::fs::create_dir_all(output)?;

    let stem = PersistentTargetStore::system_stem(output, SYSTEM_DATABASE);
    let mut store = PersistentTargetStore::open_system(&stem)?;
    let summary = loader::load_targets(data_file, &mut store)?;
    store.commit()?;

    let total = store.count();
    eprintln!(
        "Imported {} targets ({} skipped) into {}; {total} total",
        summary.loaded,
        summary.skipped,
        store.paths().index.display(),
    );
    store.close();
    return Ok(());
}

/// Output a comprehensive reference document for docxref.
pub fn info(json: bool) {
    return crate::info::run(json);
}

/// Print the external URL for `id`: from the URL table when it holds the id,
/// otherwise from the live resolver (writing the answer back).
///
/// # Errors
///
/// Returns setup or store errors; an id with no link is exit code 1.
pub fn link(id: &str) -> Result<ExitCode, Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;

    let table = match config.output.as_deref() {
        Some(output) => {
            std::fs::create_dir_all(output)?;
            Some(UrlTable::open(output)?)
        },
        None => None,
    };
    let online = match config.online.service_url.as_deref() {
        Some(service_url) => {
            let service = HttpContentService::new(service_url, Duration::from_secs(config.online.timeout_secs))?;
            Some(OnlineResolver::new(Box::new(service), &config.online.base_url, &config.online.locale))
        },
        None => None,
    };

    let mut links = ExternalLinks::new(table, online, &config.online.base_url, &config.online.locale);
    let resolved = links.resolve(id);
    links.close()?;

    let Some((url, source)) = resolved else {
        eprintln!("no link for `{id}`");
        return Ok(ExitCode::from(NOT_FOUND));
    };
    println!("{url}");
    tracing::debug!(id, ?source, "link resolved");
    return Ok(ExitCode::SUCCESS);
}

/// Resolve `id` and print its encoded target plus the store that answered.
///
/// # Errors
///
/// Returns configuration or store errors; a missing id is exit code 1.
pub fn lookup(id: &str, local_file: Option<&Path>) -> Result<ExitCode, Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let collection = build_collection(&config, local_file)?;

    let Some((origin, target)) = collection.locate(id) else {
        let e = Error::TargetNotFound { id: id.to_string() };
        eprintln!("{e}");
        return Ok(ExitCode::from(NOT_FOUND));
    };
    println!("{}", codec::write_target(&target)?);
    eprintln!("{} `{}` from the {origin} store", target.target_type(), target.id());
    return Ok(ExitCode::SUCCESS);
}

/// Open the persistent database at `stem` behind a cache, if its files exist.
///
/// # Errors
///
/// Returns `Error::IncompatibleDatabase` or engine errors if opening fails.
fn open_existing(stem: &Path, capacity: usize) -> Result<Option<Box<dyn TargetStore>>, Error> {
    if !DatabasePaths::from_stem(stem).exist() {
        return Ok(None);
    }
    let store = PersistentTargetStore::open_system(stem)?;
    return Ok(Some(Box::new(CachedTargetStore::new(store, capacity))));
}

/// Build a reference from `id`, render it, and print the profile text or markup.
///
/// # Errors
///
/// Returns configuration, store, or rendering errors.
pub fn render(id: &str, local_file: Option<&Path>, options: DisplayOptions, format: RenderFormat) -> Result<(), Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let collection = build_collection(&config, local_file)?;
    let reference = identifier::create_reference(id);

    let text = match format {
        RenderFormat::Xml => {
            let renderer = Renderer::new(&collection, config.profiles.clone());
            let mut sink = XmlMarkup::new();
            renderer.write_reference(&reference, options, &mut sink)?;
            sink.into_string()?
        },
        RenderFormat::Profile(class) => {
            let profile = select_profile(&config, class.as_deref())?;
            let renderer = Renderer::new(&collection, vec![profile]);
            let mut sink = ProfileText::new(profile.class);
            renderer.write_reference(&reference, options, &mut sink)?;
            sink.into_string()
        },
    };
    println!("{text}");
    return Ok(());
}

/// The profile named by `class`, or the first configured one.
///
/// # Errors
///
/// Returns `Error::UnknownProfile` for an unknown class.
fn select_profile(config: &Config, class: Option<&str>) -> Result<SyntaxProfile, Error> {
    return match class {
        Some(class) => SyntaxProfile::by_class(class),
        None => config
            .profiles
            .first()
            .copied()
            .ok_or_else(|| return Error::UnknownProfile { name: String::new() }),
    };
}

