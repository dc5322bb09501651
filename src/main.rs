use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use docxref::commands::{self, RenderFormat};
use docxref::diagnostics;
use docxref::error::Error;
use docxref::render::DisplayOptions;
use tracing::level_filters::LevelFilter;

/// Exit code for a runtime error.
const RUNTIME_ERROR: u8 = 3;

#[derive(Parser)]
#[command(name = "docxref", version, about = "Cross-reference resolution and signature rendering for API docs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Log more detail (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a data file of encoded targets into the system database
    Import {
        /// File with one encoded target per line
        data_file: PathBuf,
    },
    /// Print reference documentation (syntax, config, current state)
    Info {
        /// Output as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// Print the external documentation URL for an id
    Link {
        /// Documentation id, e.g. T:System.String
        id: String,
    },
    /// Print the stored target for an id and the store that holds it
    Lookup {
        /// Documentation id, e.g. M:Ns.Widget.Spin(System.Int32)
        id: String,
        /// Data file loaded into the local store first
        #[arg(long)]
        local: Option<PathBuf>,
    },
    /// Render the signature of an id
    Render(RenderArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Prefix with the containing namespace or type
    #[arg(short = 'c', long)]
    container: bool,
    /// Documentation id to render
    id: String,
    /// Data file loaded into the local store first
    #[arg(long)]
    local: Option<PathBuf>,
    /// Render parameter lists
    #[arg(short = 'p', long)]
    parameters: bool,
    /// Plain text as seen by one profile (cs, vb, cpp, fs)
    #[arg(long, conflicts_with = "xml")]
    profile: Option<String>,
    /// Render template lists
    #[arg(short = 't', long)]
    templates: bool,
    /// Emit the markup with every configured profile
    #[arg(long)]
    xml: bool,
}

impl RenderArgs {
    /// Display options from the flags; none given means the default set.
    fn options(&self) -> DisplayOptions {
        let options = [
            (self.container, DisplayOptions::SHOW_CONTAINER),
            (self.templates, DisplayOptions::SHOW_TEMPLATES),
            (self.parameters, DisplayOptions::SHOW_PARAMETERS),
        ]
        .into_iter()
        .filter(|&(set, _)| return set)
        .fold(DisplayOptions::NONE, |options, (_, option)| return options | option);
        if options == DisplayOptions::NONE {
            return DisplayOptions::DEFAULT;
        }
        return options;
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Import { data_file } => commands::import(&data_file).map(|()| return ExitCode::SUCCESS),
        Commands::Info { json } => {
            commands::info(json);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Link { id } => commands::link(&id),
        Commands::Lookup { id, local } => commands::lookup(&id, local.as_deref()),
        Commands::Render(args) => {
            let format = if args.xml { RenderFormat::Xml } else { RenderFormat::Profile(args.profile.clone()) };
            commands::render(&args.id, args.local.as_deref(), args.options(), format).map(|()| return ExitCode::SUCCESS)
        },
    };

    return result.unwrap_or_else(|e: Error| {
        diagnostics::print_error(&e);
        return ExitCode::from(RUNTIME_ERROR);
    });
}

/// Install the stderr log subscriber. Warnings show by default.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
