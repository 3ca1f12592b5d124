use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use fitboard::config::Config;
use fitboard::recompute::{recompute_snapshot, RecomputeOutput, RecomputeSettings};
use fitboard::scheduler::{write_corrections, Scheduler, SchedulerConfig};
use fitboard::store::{DataSource, FileStore, Snapshot, SnapshotError};

const EXIT_SUCCESS: i32 = 0;
const EXIT_STORE: i32 = 2;
const EXIT_INVALID: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the employee top list (default if no subcommand)
    Top {
        /// Only show employees whose name or department contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show the department table
    Departments {
        /// Minimum members a department needs to be listed
        #[arg(long)]
        min: Option<usize>,
    },
    /// List every result, newest first
    Results,
    /// Show each employee's best result per exercise
    Board,
    /// Show employee, exercise and result counts
    Stats,
    /// List the achievements that can be earned
    Achievements,
    /// Check a result value against an exercise kind, e.g. "Running" "25:30"
    Validate { kind: String, value: String },
    /// Running pace calculator
    Pace {
        /// Distance in kilometres
        #[arg(short, long)]
        distance: f64,
        /// Elapsed time as H:MM:SS or M:SS
        #[arg(short, long, required_unless_present = "speed", conflicts_with = "speed")]
        time: Option<String>,
        /// Speed in km/h
        #[arg(short, long)]
        speed: Option<f64>,
    },
    /// Recompute points once and write corrections to the data store
    Recompute,
    /// Recompute whenever the data store changes, until Ctrl-C
    Watch,
    /// Write a starter config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Register an employee
    AddEmployee { name: String, department: String },
    /// Register an exercise; the kind decides how results are ranked
    AddExercise {
        name: String,
        #[arg(default_value = "")]
        kind: String,
    },
    /// Register a result for an employee and exercise
    AddResult {
        employee: u32,
        exercise: u32,
        value: String,
        /// Date of the result (YYYY-MM-DD), defaults to now
        #[arg(long)]
        date: Option<String>,
        /// Approve immediately
        #[arg(long)]
        admin: bool,
    },
    /// Approve a pending result
    Approve { id: u32 },
    /// Reject (delete) a result
    Reject { id: u32 },
    /// Fill an empty data store with sample data
    Seed,
}

#[derive(Parser, Debug)]
#[command(name = "fitboard")]
#[command(about = "Scoring and leaderboard engine for an employee fitness challenge", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/fitboard/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the data store (overrides the config file)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let command = cli.command.unwrap_or(Commands::Top { search: None });
    let start_time = Instant::now();
    let use_colors = fitboard::output::should_use_colors();
    let config_path = cli.config.map(PathBuf::from);

    // Commands that need neither config nor data
    match &command {
        Commands::Init { force } => {
            let path = config_path.unwrap_or_else(fitboard::config::get_config_path);
            match fitboard::config::write_starter_config(&path, *force) {
                Ok(()) => {
                    println!("Wrote config to {}", path.display());
                    std::process::exit(EXIT_SUCCESS);
                }
                Err(e) => {
                    eprintln!("Config error: {:#}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            }
        }
        Commands::Validate { kind, value } => {
            let kind = fitboard::scoring::ExerciseKind::from_label(kind);
            match fitboard::scoring::check_value(value, kind) {
                Ok(()) => {
                    println!("Valid {} value", kind);
                    std::process::exit(EXIT_SUCCESS);
                }
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_INVALID);
                }
            }
        }
        Commands::Pace {
            distance,
            time,
            speed,
        } => std::process::exit(run_pace(*distance, time.as_deref(), *speed)),
        Commands::Achievements => {
            println!(
                "{}",
                fitboard::output::format_achievements(
                    fitboard::leaderboard::ACHIEVEMENTS,
                    use_colors
                )
            );
            std::process::exit(EXIT_SUCCESS);
        }
        _ => {}
    }

    // Load config
    let config = match fitboard::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = fitboard::scoring::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let data_path = cli.data.unwrap_or_else(|| config.data_path());
    tracing::debug!(path = %data_path.display(), "using data store");
    let store = FileStore::new(data_path);
    let settings = RecomputeSettings::from(&config.scoring());

    let outcome = match command {
        Commands::Top { search } => show(&store, &settings, |_, output| {
            let podium = fitboard::output::format_podium(&output.top_list, use_colors);
            if !podium.is_empty() && search.is_none() {
                println!("{}\n", podium);
            }
            let entries = output.top_list.search(search.as_deref().unwrap_or(""));
            println!("{}", fitboard::output::format_top_list(&entries, use_colors));
        })
        .await,
        Commands::Departments { min } => {
            let settings = RecomputeSettings {
                min_participants: min.unwrap_or(settings.min_participants),
                ..settings
            };
            show(&store, &settings, |_, output| {
                println!(
                    "{}",
                    fitboard::output::format_department_table(&output.department_table, use_colors)
                );
            })
            .await
        }
        Commands::Results => show(&store, &settings, |_, output| {
            println!(
                "{}",
                fitboard::output::format_combined_results(&output.combined_results, use_colors)
            );
        })
        .await,
        Commands::Board => show(&store, &settings, |snapshot, _| {
            let board = fitboard::leaderboard::best_result_board(
                &snapshot.employees,
                &snapshot.exercises,
                &snapshot.results,
            );
            println!("{}", fitboard::output::format_board(&board, use_colors));
        })
        .await,
        Commands::Stats => show(&store, &settings, |_, output| {
            println!("{}", fitboard::output::format_statistics(&output.statistics));
        })
        .await,
        Commands::Recompute => correct_points(&store, &settings, config.write_retries())
            .await
            .map(|(written, failed)| {
                println!("Corrected {} result(s)", written);
                if failed > 0 {
                    eprintln!("{} correction(s) could not be written", failed);
                    EXIT_STORE
                } else {
                    EXIT_SUCCESS
                }
            }),
        Commands::Watch => watch(store, &config).await.map(|()| EXIT_SUCCESS),
        Commands::AddEmployee { name, department } => {
            maintain(&store, &settings, &config, |s| {
                let employee = s.add_employee(&name, &department)?;
                Ok(format!("Added employee {} ({})", employee.name, employee.id))
            })
            .await
        }
        Commands::AddExercise { name, kind } => {
            maintain(&store, &settings, &config, |s| {
                let exercise = s.add_exercise(&name, &kind)?;
                Ok(format!(
                    "Added exercise {} ({}), ranked as {}",
                    exercise.name,
                    exercise.id,
                    exercise.kind()
                ))
            })
            .await
        }
        Commands::AddResult {
            employee,
            exercise,
            value,
            date,
            admin,
        } => {
            let date = match parse_date(date.as_deref()) {
                Ok(d) => d,
                Err(e) => {
                    eprintln!("{:#}", e);
                    std::process::exit(EXIT_INVALID);
                }
            };
            maintain(&store, &settings, &config, |s| {
                let result = s.add_result(employee, exercise, &value, date, admin)?;
                Ok(format!(
                    "Added result {} ({})",
                    result.id,
                    result.status.label()
                ))
            })
            .await
        }
        Commands::Approve { id } => {
            maintain(&store, &settings, &config, |s| {
                s.approve_result(id)?;
                Ok(format!("Approved result {}", id))
            })
            .await
        }
        Commands::Reject { id } => {
            maintain(&store, &settings, &config, |s| {
                s.reject_result(id)?;
                Ok(format!("Rejected result {}", id))
            })
            .await
        }
        Commands::Seed => {
            maintain(&store, &settings, &config, |s| {
                if !s.is_empty() {
                    anyhow::bail!("Data store already has data; not seeding");
                }
                s.seed_sample_data();
                Ok(format!(
                    "Seeded {} employees, {} exercises and {} results",
                    s.employees.len(),
                    s.exercises.len(),
                    s.results.len()
                ))
            })
            .await
        }
        Commands::Init { .. }
        | Commands::Validate { .. }
        | Commands::Pace { .. }
        | Commands::Achievements => Ok(EXIT_SUCCESS),
    };

    let code = match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if e.downcast_ref::<SnapshotError>().is_some() {
                EXIT_INVALID
            } else {
                EXIT_STORE
            }
        }
    };

    tracing::debug!(elapsed = ?start_time.elapsed(), "done");
    std::process::exit(code);
}

fn run_pace(distance: f64, time: Option<&str>, speed: Option<f64>) -> i32 {
    let output = match (time, speed) {
        (Some(time), _) => fitboard::scoring::parse_duration(time)
            .map_err(anyhow::Error::from)
            .and_then(|secs| {
                Ok(fitboard::pace::from_distance_and_time(distance, secs as f64)?)
            })
            .map(|pace| fitboard::output::format_pace_from_time(&pace)),
        (None, Some(speed)) => fitboard::pace::from_distance_and_speed(distance, speed)
            .map_err(anyhow::Error::from)
            .map(|pace| fitboard::output::format_pace_from_speed(&pace)),
        (None, None) => Err(anyhow::anyhow!("Give either --time or --speed")),
    };

    match output {
        Ok(text) => {
            println!("{}", text);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            EXIT_INVALID
        }
    }
}

fn parse_date(text: Option<&str>) -> Result<DateTime<Utc>> {
    let Some(text) = text else {
        return Ok(Utc::now());
    };
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", text))?;
    date.and_hms_opt(12, 0, 0)
        .map(|d| d.and_utc())
        .with_context(|| format!("Invalid date '{}'", text))
}

/// Read the store, recompute, and hand both to `render`. Nothing is written.
async fn show<F>(store: &FileStore, settings: &RecomputeSettings, render: F) -> Result<i32>
where
    F: FnOnce(&Snapshot, &RecomputeOutput),
{
    let snapshot = store.fetch_all().await?;
    let output = recompute_snapshot(&snapshot, settings);
    render(&snapshot, &output);
    Ok(EXIT_SUCCESS)
}

/// One recompute pass outside the scheduler; returns (written, failed).
/// Holds only the in-process store lock, see [`FileStore`].
async fn correct_points(
    store: &FileStore,
    settings: &RecomputeSettings,
    retries: usize,
) -> Result<(usize, usize)> {
    let snapshot = store.fetch_all().await?;
    let output = recompute_snapshot(&snapshot, settings);
    let report = write_corrections(store, output.corrections, retries).await;
    Ok((report.written, report.failed.len()))
}

/// Apply a store change, then bring stored points up to date
async fn maintain<F>(
    store: &FileStore,
    settings: &RecomputeSettings,
    config: &Config,
    change: F,
) -> Result<i32>
where
    F: FnOnce(&mut Snapshot) -> Result<String>,
{
    let message = store.modify(change).await?;
    println!("{}", message);

    let (written, failed) = correct_points(store, settings, config.write_retries()).await?;
    tracing::debug!(written, failed, "points updated after change");
    if failed > 0 {
        eprintln!("{} points correction(s) could not be written", failed);
        return Ok(EXIT_STORE);
    }
    Ok(EXIT_SUCCESS)
}

/// Run the scheduler on the file store and print every new top list
async fn watch(store: FileStore, config: &Config) -> Result<()> {
    let use_colors = fitboard::output::should_use_colors();
    let store = Arc::new(store);
    let mut file_changes = store.watch(config.poll_interval());
    let (tx, rx) = mpsc::unbounded_channel();

    let scheduler = Scheduler::new(Arc::clone(&store), SchedulerConfig::from(config));
    let mut updates = scheduler.subscribe();
    let handle = tokio::spawn(scheduler.run(rx));

    eprintln!("Watching {} (Ctrl-C to stop)", store.path().display());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(event) = file_changes.recv() => {
                if tx.send(event).is_err() {
                    break;
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let publication = updates.borrow_and_update().clone();
                if let Some(publication) = publication {
                    let output = &publication.output;
                    let entries: Vec<_> = output.top_list.entries().iter().collect();
                    println!("--- update {} ---", publication.generation);
                    let podium = fitboard::output::format_podium(&output.top_list, use_colors);
                    if !podium.is_empty() {
                        println!("{}\n", podium);
                    }
                    println!("{}", fitboard::output::format_top_list(&entries, use_colors));
                }
            }
            _ = &mut shutdown => {
                eprintln!("Stopping...");
                break;
            }
        }
    }

    // Closing the channel lets the scheduler finish its pending pass
    drop(tx);
    drop(file_changes);
    let stats = handle.await.context("Scheduler task failed")?;
    tracing::info!(
        passes = stats.passes,
        written = stats.corrections_written,
        "watch stopped"
    );
    Ok(())
}
