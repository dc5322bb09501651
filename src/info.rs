use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::commands::SYSTEM_DATABASE;
use crate::config::{CONFIG_FILE, Config};
use crate::store::{DatabasePaths, PersistentTargetStore, TargetStore as _};

/// Output the comprehensive docxref reference document.
pub fn run(json: bool) {
    let root = PathBuf::from(".");
    let state = gather_state(&root);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

struct CurrentState {
    config_error: Option<String>,
    config_found: bool,
    databases: Vec<DatabaseState>,
    online: Option<String>,
    output: Option<PathBuf>,
    profiles: Vec<&'static str>,
}

#[derive(Serialize)]
struct DatabaseState {
    /// Targets held, or `None` when the files are missing or unreadable.
    count: Option<usize>,
    origin: String,
    stem: String,
}

fn gather_state(root: &Path) -> CurrentState {
    let config_found = root.join(CONFIG_FILE).exists();
    let config = match Config::load(root) {
        Ok(config) => config,
        Err(e) => {
            return CurrentState {
                config_error: Some(e.to_string()),
                config_found,
                databases: Vec::new(),
                online: None,
                output: None,
                profiles: Vec::new(),
            };
        },
    };

    let mut databases = Vec::new();
    if let Some(output) = config.output.as_deref() {
        let stem = PersistentTargetStore::system_stem(output, SYSTEM_DATABASE);
        databases.push(database_state("system".to_string(), &stem));
    }
    for (position, stem) in config.databases.iter().enumerate() {
        databases.push(database_state(format!("linked[{position}]"), stem));
    }

    return CurrentState {
        config_error: None,
        config_found,
        databases,
        online: config.online.service_url.clone(),
        output: config.output.clone(),
        profiles: config.profiles.iter().map(|profile| return profile.class).collect(),
    };
}

/// Count a database without creating it when it is absent.
fn database_state(origin: String, stem: &Path) -> DatabaseState {
    let count = if DatabasePaths::from_stem(stem).exist() {
        PersistentTargetStore::open_system(stem).ok().map(|store| return store.count())
    } else {
        None
    };
    return DatabaseState { count, origin, stem: stem.display().to_string() };
}

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

fn print_markdown_header(version: &str) {
    print!(
        "\
# docxref {version}

Cross-reference resolution and multi-syntax signature rendering for generated
API documentation.

## Identifiers

    N:System.Collections                       namespace
    T:System.Collections.Generic.List`1        type
    T:Ns.List{{System.String}}                   specialized type
    M:Ns.Widget.Spin(System.Int32)             method
    P:Ns.Widget.Item(System.Int32)             property or indexer
    E:Ns.Widget.Changed                        event
    F:Ns.Widget.count                          field

## Workflow

    docxref import <data-file>           Load targets into the system database
    docxref lookup <id>                  Print the stored target and its store
    docxref render <id> [-c] [-t] [-p]   Render the signature for one profile
    docxref render <id> --xml            Render every profile as markup
    docxref link <id>                    Print the external documentation URL

## Configuration (.docxref.toml)

    output = \"build/docxref\"              # system database and URL table
    databases = [\"../lib/build/docxref/system_v1\"]
    cache_capacity = 4096
    profiles = [\"cs\", \"vb\", \"cpp\", \"fs\"]
    scratch_local = false

    [online]
    service_url = \"https://example.org/lookup\"
    base_url = \"https://learn.microsoft.com\"
    locale = \"en-us\"
    timeout_secs = 10

## Current State

"
    );
}

fn print_markdown_state(state: &CurrentState) {
    match (&state.config_error, state.config_found) {
        (Some(e), _) => println!("Config:     {CONFIG_FILE} (invalid: {e})"),
        (None, true) => println!("Config:     {CONFIG_FILE} (found)"),
        (None, false) => println!("Config:     {CONFIG_FILE} (not found)"),
    }

    match &state.output {
        Some(output) => println!("Output:     {}", output.display()),
        None => println!("Output:     (not set)"),
    }

    if state.databases.is_empty() {
        println!("Databases:  (none)");
    }
    for database in &state.databases {
        match database.count {
            Some(n) => println!("Database:   {} {} ({n} targets)", database.origin, database.stem),
            None => println!("Database:   {} {} (not found)", database.origin, database.stem),
        }
    }

    println!("Profiles:   {}", state.profiles.join(", "));
    match &state.online {
        Some(url) => println!("Online:     {url}"),
        None => println!("Online:     (off)"),
    }
}

fn print_markdown_exit_codes() {
    print!(
        "\
## Exit Codes

| Code | Meaning |
|------|---------|
| 0    | Success |
| 1    | Id not found / no link |
| 3    | Runtime error |
"
    );
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoJson<'s> {
    current_state: StateJson<'s>,
    exit_codes: Vec<ExitCodeInfo>,
    version: String,
}

#[derive(Serialize)]
struct ExitCodeInfo {
    code: u8,
    meaning: String,
}

#[derive(Serialize)]
struct StateJson<'s> {
    config_error: Option<&'s str>,
    config_found: bool,
    databases: &'s [DatabaseState],
    online: Option<&'s str>,
    output: Option<String>,
    profiles: &'s [&'static str],
}

fn print_json(state: &CurrentState) {
    let info = InfoJson {
        current_state: StateJson {
            config_error: state.config_error.as_deref(),
            config_found: state.config_found,
            databases: &state.databases,
            online: state.online.as_deref(),
            output: state.output.as_ref().map(|output| return output.display().to_string()),
            profiles: &state.profiles,
        },
        exit_codes: vec![
            ExitCodeInfo { code: 0, meaning: "Success".to_string() },
            ExitCodeInfo { code: 1, meaning: "Id not found / no link".to_string() },
            ExitCodeInfo { code: 3, meaning: "Runtime error".to_string() },
        ],
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}
