//! ProjectBoard command-line front end.
//!
//! # Responsibility
//! - Load configuration, start logging and open the configured backend.
//! - Render store views as plain text, or export the data set as JSON.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::info;
use projectboard_core::views::board::{board_lanes, due_status, DueStatus};
use projectboard_core::views::gantt::{bar_offset_percent, gantt_window};
use projectboard_core::views::notes::note_card;
use projectboard_core::views::progress::task_progress;
use projectboard_core::views::timeline::{timeline, TimelineKind};
use projectboard_core::{
    default_log_level, init_logging, seed_snapshot, AppConfig, Backend, BackendKind,
    MemoryBackend, Project, ProjectStore, SqliteBackend, DEFAULT_CONFIG_PATH,
};
use std::path::PathBuf;

const GANTT_BAR_WIDTH: usize = 50;
/// About a century either way.
const MAX_GANTT_SHIFT_DAYS: i64 = 36_500;

#[derive(Parser)]
#[command(name = "projectboard")]
#[command(about = "Kanban boards, notes and calendars for small projects")]
#[command(version)]
struct Cli {
    /// YAML config file (default: .projectboard/config.yaml)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List projects with task completion
    Projects,
    /// Show a project's kanban board
    Board {
        /// Project id or name (default: current project)
        #[arg(short, long)]
        project: Option<String>,
    },
    /// Show task and event activity grouped by day
    Timeline {
        #[arg(short, long)]
        project: Option<String>,
    },
    /// Show dated tasks on a day axis
    Gantt {
        #[arg(short, long)]
        project: Option<String>,

        /// Scroll the window by this many days
        #[arg(
            long,
            default_value = "0",
            allow_hyphen_values = true,
            value_parser = clap::value_parser!(i64).range(-MAX_GANTT_SHIFT_DAYS..=MAX_GANTT_SHIFT_DAYS)
        )]
        shift: i64,
    },
    /// Show note cards with checklist progress
    Notes {
        #[arg(short, long)]
        project: Option<String>,
    },
    /// Write every table as JSON
    Export {
        /// Output file path (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let mut config = AppConfig::load(path)?;
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        }
        None => {
            // Logging is not up yet, so a broken default file is reported here.
            if let Err(err) = AppConfig::load_optional(DEFAULT_CONFIG_PATH) {
                eprintln!("warning: {err}; using default settings");
            }
            AppConfig::load_or_default()
        }
    };

    if let Some(dir) = &config.logging.dir {
        let level = config
            .logging
            .level
            .as_deref()
            .unwrap_or(default_log_level());
        init_logging(level, &dir.to_string_lossy()).context("failed to start logging")?;
    }

    match config.backend.kind {
        BackendKind::Seed => {
            let backend = MemoryBackend::with_snapshot(seed_snapshot(Utc::now()));
            run(ProjectStore::new(backend, config.store), cli.command)
        }
        BackendKind::Sqlite => {
            if let Some(parent) = config.backend.path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create database directory `{}`", parent.display())
                })?;
            }
            let backend =
                SqliteBackend::open(&config.backend.path, config.backend.busy_timeout())
                    .with_context(|| {
                        format!("failed to open `{}`", config.backend.path.display())
                    })?;
            run(ProjectStore::new(backend, config.store), cli.command)
        }
    }
}

fn run<B: Backend>(mut store: ProjectStore<B>, command: Commands) -> Result<()> {
    store.init().context("failed to load project data")?;
    info!(
        "event=cli_command module=cli status=start backend={} projects={}",
        store.backend().name(),
        store.projects().len()
    );

    match command {
        Commands::Projects => print_projects(&store),
        Commands::Board { project } => {
            let project = select_project(&store, project.as_deref())?;
            print_board(&store, &project);
        }
        Commands::Timeline { project } => {
            let project = select_project(&store, project.as_deref())?;
            print_timeline(&store, &project);
        }
        Commands::Gantt { project, shift } => {
            let project = select_project(&store, project.as_deref())?;
            print_gantt(&store, &project, shift)?;
        }
        Commands::Notes { project } => {
            let project = select_project(&store, project.as_deref())?;
            print_notes(&store, &project);
        }
        Commands::Export { output } => {
            let json = serde_json::to_string_pretty(&store.snapshot())?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("failed to write `{}`", path.display()))?,
                None => println!("{json}"),
            }
        }
    }

    store.dispose();
    Ok(())
}

fn select_project<B: Backend>(store: &ProjectStore<B>, selector: Option<&str>) -> Result<Project> {
    let found = match selector {
        None => store.current_project(),
        Some(selector) => store.projects().iter().find(|project| {
            project.id.to_string() == selector || project.name.eq_ignore_ascii_case(selector)
        }),
    };
    match found {
        Some(project) => Ok(project.clone()),
        None => match selector {
            Some(selector) => bail!("no project matches `{selector}`"),
            None => bail!("no projects yet"),
        },
    }
}

fn print_projects<B: Backend>(store: &ProjectStore<B>) {
    let current = store.current_project().map(|project| project.id);
    for project in store.projects() {
        let progress = task_progress(&store.get_project_tasks(project.id));
        let marker = if Some(project.id) == current { "*" } else { " " };
        println!(
            "{marker} {}  {} ({}/{} done, {}%)",
            project.id,
            project.name,
            progress.completed,
            progress.total,
            progress.percent()
        );
    }
}

fn print_board<B: Backend>(store: &ProjectStore<B>, project: &Project) {
    let now = Utc::now();
    let board = board_lanes(
        &store.get_project_board_columns(project.id),
        &store.get_project_tasks(project.id),
    );

    println!("{}", project.name);
    for lane in &board.lanes {
        println!("\n[{}] ({})", lane.column.name, lane.tasks.len());
        for task in &lane.tasks {
            let due = match (task.due_date, due_status(task.due_date, now)) {
                (Some(date), status) if status != DueStatus::None => {
                    format!("  due {} ({})", date.format("%Y-%m-%d"), status.as_str())
                }
                _ => String::new(),
            };
            let comments = store.get_task_comments(task.id).len();
            println!(
                "  - {} [{}]{due}  comments={comments}",
                task.title,
                task.status.as_str()
            );
        }
    }
    if !board.unplaced.is_empty() {
        println!("\n[unplaced] ({})", board.unplaced.len());
        for task in &board.unplaced {
            println!("  - {} [{}]", task.title, task.status.as_str());
        }
    }
}

fn print_timeline<B: Backend>(store: &ProjectStore<B>, project: &Project) {
    let days = timeline(
        &store.get_project_tasks(project.id),
        &store.get_project_events(project.id),
    );
    if days.is_empty() {
        println!("no activity");
        return;
    }
    for day in days {
        println!("{}", day.date.format("%A, %B %-d, %Y"));
        for entry in day.entries {
            let kind = match entry.kind {
                TimelineKind::Task => "task",
                TimelineKind::Event => "event",
            };
            println!("  {} {kind:<5} {}", entry.at.format("%H:%M"), entry.title);
        }
    }
}

fn print_gantt<B: Backend>(store: &ProjectStore<B>, project: &Project, shift: i64) -> Result<()> {
    let tasks = store.get_project_tasks(project.id);
    let Some(window) = gantt_window(&tasks) else {
        println!("no tasks with due dates");
        return Ok(());
    };
    let Some(window) = window.shift_days(shift) else {
        bail!("cannot shift the gantt window by {shift} days");
    };

    println!(
        "{} .. {} ({} days)",
        window.start,
        window.end,
        window.day_count()
    );
    let column = |day| {
        bar_offset_percent(day, &window)
            .map(|percent| (percent / 100.0 * GANTT_BAR_WIDTH as f64) as usize)
    };
    for task in tasks.iter() {
        let Some(due) = task.due_date.map(|due| due.date_naive()) else {
            continue;
        };
        let created = task.created_at.date_naive().min(due);
        let mut bar = vec![' '; GANTT_BAR_WIDTH];
        if due >= window.start && created <= window.end {
            let from = column(created).unwrap_or(0);
            let to = column(due).unwrap_or(GANTT_BAR_WIDTH - 1);
            bar[from..=to].iter_mut().for_each(|cell| *cell = '#');
        }
        println!(
            "{:<28} |{}| {}",
            task.title,
            bar.into_iter().collect::<String>(),
            task.status.as_str()
        );
    }
    Ok(())
}

fn print_notes<B: Backend>(store: &ProjectStore<B>, project: &Project) {
    for note in store.get_project_notes(project.id) {
        let card = note_card(&note, &store.get_note_check_items(note.id));
        println!("{} ({}/{} checked)", card.title, card.checked, card.total);
        if let Some(excerpt) = &card.excerpt {
            println!("  {excerpt}");
        }
        for item in &card.items {
            let mark = if item.checked { "x" } else { " " };
            println!("  [{mark}] {}", item.content);
        }
    }
}
