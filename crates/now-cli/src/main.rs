mod render;
mod version;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use colored::Colorize;
use tracing::{debug, warn};

use now_core::config::Settings;
use now_core::storage::{StoreLock, TaskStore};
use now_core::task::TaskList;
use now_core::task_ops::{self, IdOutcome};
use now_core::views::{self, ListFilter, SortKey, ViewError};

#[derive(Parser)]
#[command(
    name = "now",
    version = version::FULL,
    about = "A minimal todo manager for the command line",
    after_help = render::NOTES
)]
struct Cli {
    /// Task file to use instead of ~/.nowfile
    #[arg(long, global = true, value_name = "PATH")]
    file: Option<PathBuf>,
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Add one or more tasks
    Add {
        #[arg(required = true, value_name = "TASK")]
        descriptions: Vec<String>,
    },
    /// Mark one or more tasks as done
    Done {
        #[arg(required = true, value_name = "ID")]
        ids: Vec<u32>,
    },
    /// Remove one or more tasks
    Remove {
        #[arg(required = true, value_name = "ID")]
        ids: Vec<u32>,
    },
    /// List tasks
    List(ListArgs),
    /// Search tasks by keyword
    Search {
        keyword: String,
        /// Print matching task records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show task statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct ListArgs {
    /// Display raw task descriptions without formatting
    #[arg(long)]
    raw: bool,
    /// Show only pending tasks with a due date
    #[arg(long)]
    due: bool,
    /// Show only completed tasks
    #[arg(long)]
    completed: bool,
    /// Show only pending tasks
    #[arg(long)]
    pending: bool,
    /// Sort tasks by creation, completion or due date
    #[arg(long, value_name = "created|completed|due", value_parser = parse_sort_key)]
    sort: Option<SortKey>,
    /// Print task records as JSON
    #[arg(long)]
    json: bool,
}

fn parse_sort_key(value: &str) -> Result<SortKey, ViewError> {
    value.parse()
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "now=debug,now_core=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(ExitCode::from(1));
    };

    let settings = Settings::resolve(cli.file.as_deref()).context("resolve task file location")?;
    let store = TaskStore::new(&settings.store_path);
    debug!(store = %store.path().display(), "using task file");

    match command {
        Command::Add { descriptions } => {
            let _lock = lock_store(&store);
            let mut list = load(&store)?;
            let report = task_ops::add(&mut list, descriptions, Local::now(), settings.max_tasks);
            for task in &report.added {
                println!(
                    "added task #{}: {}",
                    task.id,
                    render::paint_description(&task.description)
                );
            }
            if report.limit_reached {
                println!("maximum task limit reached.");
            }
            println!();
            if !report.added.is_empty() {
                save(&store, &list);
            }
        }
        Command::Done { ids } => {
            let _lock = lock_store(&store);
            let mut list = load(&store)?;
            if list.is_empty() {
                println!("no tasks found.");
                return Ok(ExitCode::SUCCESS);
            }
            for outcome in task_ops::mark_done(&mut list, &ids, Local::now()) {
                match outcome {
                    IdOutcome::Applied(id) => println!("task #{} marked as done.", id),
                    IdOutcome::NotFound(id) => println!("task #{} not found.", id),
                }
            }
            println!();
            save(&store, &list);
        }
        Command::Remove { ids } => {
            let _lock = lock_store(&store);
            let mut list = load(&store)?;
            if list.is_empty() {
                println!("no tasks found.");
                return Ok(ExitCode::SUCCESS);
            }
            for outcome in task_ops::remove(&mut list, &ids) {
                match outcome {
                    IdOutcome::Applied(id) => println!("task #{} removed.", id),
                    IdOutcome::NotFound(id) => println!("task #{} not found.", id),
                }
            }
            println!();
            save(&store, &list);
        }
        Command::Search { keyword, json } => {
            let list = load(&store)?;
            let matches = task_ops::search(&list, &keyword);
            if json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
                return Ok(ExitCode::SUCCESS);
            }
            if list.is_empty() {
                println!("no tasks found.");
                return Ok(ExitCode::SUCCESS);
            }
            let now = Local::now();
            for task in &matches {
                println!("{}", render::task_line(task, now, false));
            }
            if matches.is_empty() {
                println!("no tasks contained \"{}\".", keyword);
            }
            println!();
        }
        Command::List(args) => {
            let list = load(&store)?;
            let filter = ListFilter {
                due: args.due,
                completed: args.completed,
                pending: args.pending,
            };
            let selected = views::select(list.tasks(), &filter, args.sort);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&selected)?);
                return Ok(ExitCode::SUCCESS);
            }
            if list.is_empty() {
                println!("no tasks found.");
                return Ok(ExitCode::SUCCESS);
            }
            let now = Local::now();
            println!("{}", "Your tasks:".bold());
            for task in selected {
                println!("{}", render::task_line(task, now, args.raw));
            }
            println!();
        }
        Command::Stats { json } => {
            let list = load(&store)?;
            let stats = views::compute_stats(list.tasks(), Local::now());
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(ExitCode::SUCCESS);
            }
            if list.is_empty() {
                println!("no tasks found.");
                return Ok(ExitCode::SUCCESS);
            }
            println!("{}", render::stats_block(&stats));
            println!();
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load(store: &TaskStore) -> Result<TaskList> {
    store
        .load()
        .with_context(|| format!("failed to load tasks from {}", store.path().display()))
}

/// A failed save is reported but does not fail the command.
fn save(store: &TaskStore, list: &TaskList) {
    if let Err(err) = store.save(list) {
        eprintln!("{} failed to save tasks: {}", "warning:".yellow().bold(), err);
    }
}

fn lock_store(store: &TaskStore) -> Option<StoreLock> {
    match store.lock() {
        Ok(lock) => Some(lock),
        Err(err) => {
            warn!(error = %err, "continuing without store lock");
            None
        }
    }
}
