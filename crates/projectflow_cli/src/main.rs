//! ProjectFlow command-line front end.
//!
//! # Responsibility
//! - Own the board store for one invocation and translate subcommands into
//!   store operations.
//! - Render the active board as plain text.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use projectflow_core::db::open_db;
use projectflow_core::{BoardRepository, BoardStore, SqliteBoardRepository, TaskStatus};
use std::path::PathBuf;

mod config;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "projectflow")]
#[command(about = "Local kanban board: projects, tasks, and three status columns", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding the board database
    #[arg(long, global = true, env = "PROJECTFLOW_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Directory for rotating log files (default: <data-dir>/logs)
    #[arg(long, global = true, env = "PROJECTFLOW_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "PROJECTFLOW_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Manage tasks in a project
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Print a project's columns, counts, and progress
    Show(ProjectArg),
}

#[derive(Subcommand)]
enum ProjectAction {
    /// Create a project and make it active
    Add { name: String },
    /// List projects in board order
    List,
    /// Delete a project and all of its tasks
    Delete {
        #[command(flatten)]
        target: ProjectArg,
        /// Confirm the deletion; tasks cannot be recovered
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Add a task to the `todo` column
    Add {
        title: String,
        #[arg(long)]
        desc: Option<String>,
        #[command(flatten)]
        target: ProjectArg,
    },
    /// Delete one task
    Delete {
        task: String,
        #[command(flatten)]
        target: ProjectArg,
    },
    /// Move a task to a column, optionally at a position within it
    Move {
        task: String,
        status: TaskStatus,
        /// Zero-based position within the target column (clamped)
        #[arg(long, default_value_t = usize::MAX)]
        index: usize,
        #[command(flatten)]
        target: ProjectArg,
    },
}

#[derive(Args)]
struct ProjectArg {
    /// Project id (default: the first project)
    #[arg(long)]
    project: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(cli.data_dir, cli.log_dir, cli.log_level)?;

    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "failed to create data directory `{}`",
            config.data_dir.display()
        )
    })?;
    let log_dir = config.log_dir.to_string_lossy().into_owned();
    if let Err(err) = projectflow_core::init_logging(&config.log_level, &log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }
    info!(
        "event=cli_start module=cli status=ok version={}",
        projectflow_core::core_version()
    );

    let conn = open_db(config.db_path())
        .with_context(|| format!("failed to open `{}`", config.db_path().display()))?;
    let repo = SqliteBoardRepository::try_new(&conn)?;
    let mut store = BoardStore::open(repo)?;

    run(&mut store, cli.command)
}

fn run<R: BoardRepository>(store: &mut BoardStore<R>, command: Commands) -> Result<()> {
    match command {
        Commands::Project { action } => match action {
            ProjectAction::Add { name } => {
                let id = store.create_project(&name)?;
                println!("created project {id}");
            }
            ProjectAction::List => {
                let active = store.active_project_id().map(str::to_string);
                for project in store.projects() {
                    let marker = if active.as_deref() == Some(project.id.as_str()) {
                        '*'
                    } else {
                        ' '
                    };
                    println!("{marker} {}  {}", project.id, project.name);
                }
            }
            ProjectAction::Delete { target, yes } => {
                let id = activate(store, &target)?;
                if !yes {
                    bail!("refusing to delete project {id} without --yes; all tasks will be lost");
                }
                if store.delete_project(&id)? {
                    println!("deleted project {id}");
                }
            }
        },
        Commands::Task { action } => match action {
            TaskAction::Add {
                title,
                desc,
                target,
            } => {
                let project_id = activate(store, &target)?;
                let id = store.create_task(&project_id, &title, desc.as_deref())?;
                println!("created task {id}");
            }
            TaskAction::Delete { task, target } => {
                let project_id = activate(store, &target)?;
                if !store.delete_task(&project_id, &task)? {
                    bail!("task {task} not found in project {project_id}");
                }
                println!("deleted task {task}");
            }
            TaskAction::Move {
                task,
                status,
                index,
                target,
            } => {
                let project_id = activate(store, &target)?;
                if !store.move_task(&project_id, &task, status, index)? {
                    bail!("task {task} not found in project {project_id}");
                }
                println!("moved task {task} to {status}");
            }
        },
        Commands::Show(target) => {
            let project_id = activate(store, &target)?;
            render_project(store, &project_id)?;
        }
    }
    Ok(())
}

/// Applies `--project` (if given) and returns the active project id.
fn activate<R: BoardRepository>(store: &mut BoardStore<R>, target: &ProjectArg) -> Result<String> {
    if let Some(id) = target.project.as_deref() {
        if !store.select_project(id) {
            bail!("project {id} not found");
        }
    }
    match store.active_project_id() {
        Some(id) => Ok(id.to_string()),
        None => bail!("no project selected; create one with `projectflow project add <name>`"),
    }
}

fn render_project<R: BoardRepository>(store: &BoardStore<R>, project_id: &str) -> Result<()> {
    let overview = store.overview(project_id)?;
    println!("{} ({})", overview.name, overview.id);
    println!(
        "{} Total Tasks  progress {}%",
        overview.total_tasks, overview.progress
    );

    for status in TaskStatus::ALL {
        println!();
        println!("[{status}] {}", overview.counts.get(status));
        let column = store.column(project_id, status)?;
        if column.is_empty() {
            println!("  (empty)");
        }
        for task in column {
            match task.desc.as_deref() {
                Some(desc) => println!("  {}  {} - {desc}", task.id, task.title),
                None => println!("  {}  {}", task.id, task.title),
            }
        }
    }
    Ok(())
}
