use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use eyre::{Context, Result};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use todolist::{
    App, Backend, Config, FailureMode, FileStorage, Filter, MemoryStorage, MockSource, NewTask, Notice, NoticeKind,
    Priority, SqliteStorage, StatusFilter, Storage, Task, TaskId, TaskStatus, TaskStore,
};
use tracing::debug;

#[derive(Parser)]
#[command(name = "todolist")]
#[command(about = "todolist CLI - A local to-do list with write-through persistence")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the store directory (default: from config, else current directory)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Storage backend: sqlite, file or memory
    #[arg(short, long)]
    backend: Option<Backend>,

    /// Storage slot holding the task list
    #[arg(long)]
    slot: Option<String>,

    /// Config file (default: <config dir>/todolist/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Make the starter-task fetch fail
    #[arg(long)]
    simulate_outage: bool,

    /// Do not fetch starter tasks into an empty store
    #[arg(long)]
    no_seed: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        name: String,
        /// Explicit task id (default: current time in ms)
        #[arg(long)]
        id: Option<TaskId>,
        /// high, medium or low
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<String>,
        #[arg(short = 'C', long)]
        category: Option<String>,
    },

    /// List tasks
    List {
        /// all, completed or pending
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(short, long)]
        priority: Option<Priority>,
        #[arg(short = 'C', long)]
        category: Option<String>,
    },

    /// Search task names with a case-insensitive regular expression
    Search { pattern: String },

    /// Flip a task between completed and pending
    Toggle { id: TaskId },

    /// Rename a task
    Edit { id: TaskId, name: String },

    /// Delete a task
    Delete { id: TaskId },

    /// Log a task's status line
    Info { id: TaskId },

    /// Show completed vs. pending counts
    Summary,

    /// Fetch starter tasks into an empty store
    Init,
}

fn open_storage(config: &Config) -> Result<Box<dyn Storage>> {
    let storage: Box<dyn Storage> = match config.backend {
        Backend::Sqlite => Box::new(SqliteStorage::open(&config.store_path).context("Failed to open SQLite storage")?),
        Backend::File => Box::new(FileStorage::open(&config.store_path).context("Failed to open file storage")?),
        Backend::Memory => Box::new(MemoryStorage::new()),
    };
    Ok(storage)
}

fn paint(notice: &Notice) -> ColoredString {
    let text = notice.message.as_str();
    match notice.kind {
        NoticeKind::Success => text.green(),
        NoticeKind::Info => text.blue(),
        NoticeKind::Warning => text.yellow(),
        NoticeKind::Error => text.red().bold(),
    }
}

fn show(notices: &[Notice]) {
    for notice in notices {
        if notice.is_error() {
            eprintln!("{}", paint(notice));
        } else {
            println!("{}", paint(notice));
        }
    }
}

fn priority_dot(priority: Priority) -> ColoredString {
    match priority {
        Priority::High => "●".red(),
        Priority::Medium => "●".yellow(),
        Priority::Low => "●".blue(),
    }
}

fn render_tasks<S: Storage>(app: &App<S>, tasks: &[&Task], delay: Duration) {
    if tasks.is_empty() {
        println!("{}", "No tasks".dimmed());
        return;
    }

    let today = chrono::Utc::now().date_naive();
    for task in tasks {
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        let Some(view) = app.views().get(task.id) else {
            continue;
        };
        let status = if view.completed { view.status().green() } else { view.status().normal() };

        let mut line = format!("{} {} {}", task.id.to_string().dimmed(), priority_dot(task.priority), task.name);
        if !task.category.is_empty() {
            line.push_str(&format!(" {}", format!("[{}]", task.category).cyan()));
        }
        if !task.due_date.is_empty() {
            let due = format!("📅 {}", task.due_date);
            let due = if task.is_overdue(today) { due.red().bold() } else { due.normal() };
            line.push_str(&format!(" {}", due));
        }
        println!("{} - {}", line, status);
    }
}

fn render_summary<S: Storage>(app: &App<S>) {
    let summary = app.summary();
    let bar = |percent: f64| "█".repeat((percent / 5.0).round() as usize);

    println!("{}", "Task Status Distribution".bold());
    println!(
        "  {:<10} {:>4} {:>6.1}% {}",
        "Completed",
        summary.completed,
        summary.completed_percent(),
        bar(summary.completed_percent()).blue()
    );
    println!(
        "  {:<10} {:>4} {:>6.1}% {}",
        "Pending",
        summary.pending,
        summary.pending_percent(),
        bar(summary.pending_percent()).magenta()
    );
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = Config::resolve(cli.config.as_deref())?;
    if let Some(store_path) = cli.store_path {
        config.store_path = store_path;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(slot) = cli.slot {
        config.slot = slot;
    }
    config.simulate_outage |= cli.simulate_outage;
    if cli.no_seed {
        config.seed_on_empty = false;
    }
    debug!(?config, "Effective config");

    let storage = open_storage(&config)?;
    let store = TaskStore::open_slot(storage, &config.slot).context("Failed to load tasks")?;
    let mut app = App::new(store);

    let failure = if config.simulate_outage {
        FailureMode::Always
    } else {
        FailureMode::Never
    };
    let source = MockSource::new()
        .with_failure(failure)
        .with_latency(Duration::from_millis(config.seed_latency_ms));
    let delay = Duration::from_millis(config.render_delay_ms);

    if config.seed_on_empty && !matches!(cli.command, Commands::Init) {
        show(&app.initialize(&source));
    }

    match cli.command {
        Commands::Add {
            name,
            id,
            priority,
            due,
            category,
        } => {
            let options = NewTask {
                id,
                priority,
                due_date: due,
                category: category.map(|c| c.trim().to_string()),
            };
            show(&[app.add(&name, options)]);
        }
        Commands::List {
            status,
            priority,
            category,
        } => {
            let filter = Filter {
                status,
                priority,
                category,
            };
            render_tasks(&app, &app.filter(&filter), delay);
        }
        Commands::Search { pattern } => match app.search(&pattern) {
            Ok(tasks) => render_tasks(&app, &tasks, delay),
            Err(notice) => show(&[notice]),
        },
        Commands::Toggle { id } => show(&[app.toggle(id)]),
        Commands::Edit { id, name } => show(&[app.edit(id, &name)]),
        Commands::Delete { id } => show(&[app.delete(id)]),
        Commands::Info { id } => match app.log_info(id) {
            Some(view) => println!("{}", view),
            None => show(&[Notice::info(format!("Task {} not found", id))]),
        },
        Commands::Summary => render_summary(&app),
        Commands::Init => {
            let notices = app.initialize(&source);
            if notices.is_empty() {
                println!("{} tasks in store", app.store().len());
            }
            show(&notices);
        }
    }

    Ok(())
}
