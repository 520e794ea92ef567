#![forbid(unsafe_code)]

//! `todo-sync-ctl`: terminal client for the `todo-sync` server.
//!
//! Every command refreshes or mutates a [`SyncClient`] session over HTTP and
//! prints the resulting view. `watch` keeps the session alive and raises
//! reminders for tasks due within the hour.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use todo_sync::client::{spawn_deadline_scanner, ConsoleNotifier, HttpTaskApi, SyncClient};
use todo_sync::config::GlobalConfig;
use todo_sync::models::{NewTask, Priority, Task, TaskFilter, TaskPatch};
use todo_sync::{AppError, Result};

type Session = SyncClient<HttpTaskApi, ConsoleNotifier>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "todo-sync-ctl",
    about = "Terminal client for the todo-sync server",
    version,
    long_about = None
)]
struct Cli {
    /// Path to the TOML configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Server root URL, overriding `client.base_url`.
    #[arg(long)]
    base_url: Option<String>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List tasks with progress.
    List {
        /// Which tasks to show: all, active, or completed.
        #[arg(long, default_value = "all")]
        filter: TaskFilter,
    },

    /// Add a task.
    Add {
        /// Task text.
        text: String,
        /// Free-form deadline, e.g. `2030-01-02T17:00`.
        #[arg(long, default_value = "")]
        deadline: String,
        /// low, medium, or high; the server defaults to medium.
        #[arg(long)]
        priority: Option<Priority>,
        /// Note attached to the task.
        #[arg(long, default_value = "")]
        desc: String,
    },

    /// Mark a task completed.
    Done {
        /// Task ID.
        id: String,
    },

    /// Mark a task active again.
    Undo {
        /// Task ID.
        id: String,
    },

    /// Flip a task between active and completed.
    Toggle {
        /// Task ID.
        id: String,
    },

    /// Change selected fields of a task.
    Edit {
        /// Task ID.
        id: String,
        /// New text.
        #[arg(long)]
        text: Option<String>,
        /// New deadline; pass an empty string to clear.
        #[arg(long)]
        deadline: Option<String>,
        /// New priority.
        #[arg(long)]
        priority: Option<Priority>,
        /// New note; pass an empty string to clear.
        #[arg(long)]
        desc: Option<String>,
    },

    /// Delete a task.
    Rm {
        /// Task ID.
        id: String,
    },

    /// Show progress counters.
    Stats,

    /// Stay running and print reminders for tasks due within the hour.
    Watch,
}

fn main() -> ExitCode {
    let args = Cli::parse();
    if let Err(err) = init_tracing(args.log_format) {
        eprintln!("Error: {err}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to build tokio runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            if err.is_retryable() {
                eprintln!("Is the todo-sync server running?");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    let mut config = GlobalConfig::resolve(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        config.override_base_url(base_url)?;
    }

    let api = HttpTaskApi::new(&config.client)?;
    let mut session = SyncClient::new(api, ConsoleNotifier::new(config.client.alerts_enabled));

    match args.command {
        Command::List { filter } => {
            session.refresh().await?;
            for task in session.view(filter) {
                print_task(task);
            }
            print_metrics(&session);
        }
        Command::Add {
            text,
            deadline,
            priority,
            desc,
        } => {
            let draft = NewTask {
                text,
                deadline,
                priority,
                desc,
            };
            let task = session.create(draft).await?;
            print_task(&task);
        }
        Command::Done { id } => {
            let task = session.update(&id, &TaskPatch::completed(true)).await?;
            print_task(&task);
        }
        Command::Undo { id } => {
            let task = session.update(&id, &TaskPatch::completed(false)).await?;
            print_task(&task);
        }
        Command::Toggle { id } => {
            session.refresh().await?;
            let task = session.toggle(&id).await?;
            print_task(&task);
        }
        Command::Edit {
            id,
            text,
            deadline,
            priority,
            desc,
        } => {
            let patch = TaskPatch {
                completed: None,
                text,
                deadline,
                priority,
                desc,
            };
            if patch.is_empty() {
                return Err(AppError::InvalidRequest(
                    "edit needs at least one of --text, --deadline, --priority, --desc".into(),
                ));
            }
            let task = session.update(&id, &patch).await?;
            print_task(&task);
        }
        Command::Rm { id } => session.delete(&id).await?,
        Command::Stats => {
            session.refresh().await?;
            print_metrics(&session);
        }
        Command::Watch => watch(session, &config).await?,
    }

    Ok(())
}

async fn watch(mut session: Session, config: &GlobalConfig) -> Result<()> {
    let count = session.refresh().await?;
    println!(
        "Watching {count} task(s); checking deadlines every {}s. Ctrl-C to stop.",
        config.client.deadline_scan_seconds
    );

    let shared = Arc::new(Mutex::new(session));
    let ct = CancellationToken::new();
    let scanner = spawn_deadline_scanner(
        Arc::clone(&shared),
        config.client.scan_interval(),
        ct.clone(),
    );

    tokio::signal::ctrl_c()
        .await
        .map_err(|err| AppError::Io(format!("ctrl-c handler failed: {err}")))?;
    ct.cancel();
    let _ = scanner.await;
    Ok(())
}

fn print_task(task: &Task) {
    let mark = if task.completed { "x" } else { " " };
    println!("[{mark}] {} ({}) {}", task.id, task.priority, task.text);
    if !task.desc.trim().is_empty() {
        println!("      {}", task.desc);
    }
    if !task.deadline.is_empty() {
        println!("      Deadline: {}", task.deadline);
    }
}

fn print_metrics(session: &Session) {
    let metrics = session.metrics();
    println!("{metrics} ({:.0}% done)", metrics.percent);
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = fmt().with_env_filter(env_filter).with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
