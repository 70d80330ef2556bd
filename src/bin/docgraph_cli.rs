//! Docgraph CLI - include and image integrity tasks
//!
//! Commands: tasks, run <task>
//! Reports go to stdout, logs to stderr
//! Returns 1 on failure, 2 on unused files with --strict

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use docgraph_core::{output, Config, OutputFormat, Task, TaskError, Workspace, ENGINE_VERSION};

#[derive(Parser)]
#[command(name = "docgraph-cli")]
#[command(about = "Docgraph CLI - documentation referential integrity", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root containing the documentation tree
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file (defaults to <root>/docgraph.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Exit with status 2 when an unused report lists any file
    #[arg(long, global = true)]
    strict: bool,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List available tasks
    Tasks,

    /// Run a task, e.g. `includes:unused`
    Run {
        /// Task name
        task: Task,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn open_workspace(cli: &Cli) -> Result<Workspace, TaskError> {
    match &cli.config {
        Some(path) => {
            if !cli.root.is_dir() {
                return Err(TaskError::MissingInput(cli.root.clone()));
            }
            Ok(Workspace::new(&cli.root, Config::load_from_file(path)?))
        }
        None => Workspace::open(&cli.root),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Tasks => {
            println!("docgraph {}", ENGINE_VERSION);
            for task in Task::ALL {
                println!("  {:<34} {}", task.name(), task.description());
            }
            ExitCode::SUCCESS
        }

        Commands::Run { task } => {
            let task = *task;
            let workspace = match open_workspace(&cli) {
                Ok(w) => w,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };

            let result = match workspace.run(task) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Error: {}: {}", task, e);
                    return ExitCode::FAILURE;
                }
            };

            match output::render(&result, cli.format) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error: failed to render report: {}", e);
                    return ExitCode::FAILURE;
                }
            }

            let dirty = result.report.as_ref().is_some_and(|r| !r.is_clean());
            if cli.strict && dirty {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}
