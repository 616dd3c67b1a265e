use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{Outcome, Session};
use nikkari_maintenance::{SettingsStore, DEFAULT_SETTINGS_PATH, SETTINGS_PATH_ENV};
use output::CommandResponse;
use shell::{MessageLevel, Shell, TerminalShell};
use std::env;
use std::path::PathBuf;

mod commands;
mod output;
mod render;
mod shell;

#[derive(Parser)]
#[command(name = "nikkari")]
#[command(about = "Bittinikkari project upkeep: backups, license headers, whitespace", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (overrides NIKKARI_CONFIG; default: config/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Answer yes to confirmation questions
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    /// Print a JSON response instead of text (implies --quiet)
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project file and make it the current project
    New(NewArgs),

    /// Open a project file and make it the current project
    Open(OpenArgs),

    /// Show the members of a project, grouped by folder
    List(ProjectArgs),

    /// Add files to a project
    Add(AddArgs),

    /// Remove a member from a project (the file stays on disk)
    Remove(RemoveArgs),

    /// Run the maintenance pass on a single file
    Maintain(MaintainArgs),

    /// Run the maintenance pass on every project member
    Run(ProjectArgs),

    /// Save content to a file, keeping the previous version as <file>.bak
    Save(SaveArgs),

    /// Show the effective settings
    Settings,
}

#[derive(Args)]
struct NewArgs {
    /// Project file to create (e.g. demo.cbp)
    path: PathBuf,

    /// Project title (defaults to the file name without extension)
    #[arg(long)]
    title: Option<String>,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct OpenArgs {
    /// Project file to open
    path: PathBuf,
}

#[derive(Args)]
struct ProjectArgs {
    /// Project file (defaults to the current project)
    #[arg(long, short = 'p')]
    project: Option<PathBuf>,
}

#[derive(Args)]
struct AddArgs {
    /// Files to add; stored relative to the project file
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Project file (defaults to the current project)
    #[arg(long, short = 'p')]
    project: Option<PathBuf>,
}

#[derive(Args)]
struct RemoveArgs {
    /// Member path as listed in the project
    member: String,

    /// Project file (defaults to the current project)
    #[arg(long, short = 'p')]
    project: Option<PathBuf>,
}

#[derive(Args)]
struct MaintainArgs {
    /// File to maintain
    file: PathBuf,
}

#[derive(Args)]
struct SaveArgs {
    /// File to write
    file: PathBuf,

    /// Read the new content from this file instead of stdin
    #[arg(long)]
    from: Option<PathBuf>,
}

pub fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();
    if cli.json {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config_path = cli
        .config
        .clone()
        .or_else(|| env::var_os(SETTINGS_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));
    let store = SettingsStore::new(&config_path);
    let settings = store.load();
    log::debug!("Settings loaded from {}", config_path.display());

    let shell = TerminalShell::new(cli.yes);
    let mut session = Session {
        store,
        settings,
        shell: &shell,
    };

    let response = match dispatch(&mut session, cli.command) {
        Ok(outcome) => {
            if !cli.json {
                shell.message(outcome.level, &outcome.message, &outcome.body);
            }
            CommandResponse::ok(outcome.message, outcome.data)
        }
        Err(err) => {
            let message = format!("{err:#}");
            if !cli.json {
                shell.message(MessageLevel::Error, "Error", &message);
            }
            CommandResponse::error(message)
        }
    };

    if cli.json {
        print_json(&response)?;
    }
    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

fn dispatch(session: &mut Session<'_>, command: Commands) -> Result<Outcome> {
    match command {
        Commands::New(args) => commands::new_project(session, args.path, args.title, args.force),
        Commands::Open(args) => commands::open_project(session, args.path),
        Commands::List(args) => commands::list_project(session, args.project),
        Commands::Add(args) => commands::add_files(session, args.project, args.files),
        Commands::Remove(args) => commands::remove_member(session, args.project, args.member),
        Commands::Maintain(args) => commands::maintain(session, args.file),
        Commands::Run(args) => commands::run_project(session, args.project),
        Commands::Save(args) => commands::save_file(args.file, args.from),
        Commands::Settings => commands::show_settings(session),
    }
}

fn print_json(response: &CommandResponse) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}
