use std::path::Path;

use crate::config::CONFIG_FILE;
use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where the user can
/// act on it, how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::DataFileNotFound { path } => render_data_file_not_found(path),
        Error::IncompatibleDatabase { expected, found, path } => render_incompatible_database(path, found, expected),
        Error::MissingConfiguration { key, path } => render_missing_configuration(key, path),
        Error::TargetNotFound { id } => render_target_not_found(id),
        Error::UnknownProfile { name } => render_unknown_profile(name),
        _ => render_generic(e),
    };
}

fn render_data_file_not_found(path: &Path) -> String {
    return format!("\
# Error: Data File Not Found

`{}` does not exist.

## Fix

Pass a file with one encoded target per line:

    docxref import path/to/targets.jsonl
", path.display());
}

fn render_generic(e: &Error) -> String {
    return match e {
        Error::Decode { context, reason } => format!("\
# Error: Undecodable {context}

{reason}
"),
        Error::Index(e) => format!("\
# Error: Index

{e}
"),
        Error::InvalidOperation { reason } => format!("\
# Error: Invalid Operation

{reason}
"),
        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::Markup { reason } => format!("\
# Error: Markup

{reason}
"),
        Error::OnlineSetup { reason } => format!("\
# Error: Online Resolver Setup

{reason}

## Fix

Check `[online]` in `{CONFIG_FILE}`, or remove `service_url` to build offline.
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}

## Fix

Correct `{CONFIG_FILE}`; a malformed file is never replaced by defaults.
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    };
}

fn render_incompatible_database(path: &Path, found: &str, expected: &str) -> String {
    return format!("\
# Error: Incompatible Database

`{}` was written by format version {found}; this build reads version {expected}.

## Fix

Delete the database files and import the data again:

    docxref import path/to/targets.jsonl
", path.display());
}

fn render_missing_configuration(key: &str, path: &Path) -> String {
    return format!("\
# Error: Missing Configuration

This command needs `{key}`, which `{}` does not set.

## Fix

Add it to `{CONFIG_FILE}`:

    {key} = \"build/docxref\"
", path.display());
}

fn render_target_not_found(id: &str) -> String {
    return format!("\
# Error: Target Not Found

No store holds `{id}`.

## Fix

Import the data file that declares it, or link the database of the project
that does:

    databases = [\"../other/build/docxref/system_v1\"]
");
}

fn render_unknown_profile(name: &str) -> String {
    return format!("\
# Error: Unknown Syntax Profile

`{name}` is not a known profile.

## Supported profiles

- `cs` (C#)
- `vb` (Visual Basic)
- `cpp` (C++/CLI)
- `fs` (F#)
");
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_configuration_names_key_and_file() {
        let md = render_error(&Error::MissingConfiguration { key: "output", path: PathBuf::from(".docxref.toml") });
        assert!(md.starts_with("# Error: Missing Configuration"));
        assert!(md.contains("`output`"));
        assert!(md.contains("## Fix"));
    }

    #[test]
    fn generic_variants_get_a_heading() {
        let md = render_error(&Error::Markup { reason: "element `span` left open".to_string() });
        assert!(md.starts_with("# Error: Markup"));
        assert!(md.contains("left open"));
    }

    #[test]
    fn unknown_profile_lists_supported_ones() {
        let md = render_error(&Error::UnknownProfile { name: "cobol".to_string() });
        assert!(md.contains("`cobol`"));
        assert!(md.contains("`fs`"));
    }
}
