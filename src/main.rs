//! NIDS Monitor CLI
//!
//! Live-state core for a network intrusion monitoring dashboard.

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossbeam_channel::RecvTimeoutError;
use nids_live_core::{
    config::Config,
    core::{BellSink, Dashboard, ExportError, ReportExporter, Sampler, SharedDashboard},
    event::EventFeed,
    VERSION,
};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, MutexGuard};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nids-monitor")]
#[command(version = VERSION)]
#[command(about = "Live-state core for a network intrusion monitoring dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start monitoring classified packet events
    Run {
        /// JSON-lines event file to read, or '-' for stdin
        #[arg(long, short, default_value = "-")]
        input: String,

        /// Generate a synthetic event stream instead of reading input
        #[arg(long)]
        demo: bool,

        /// Milliseconds between synthetic events
        #[arg(long, default_value = "250")]
        demo_interval_ms: u64,

        /// Write a CSV report of the visible log on exit
        #[arg(long)]
        report_on_exit: bool,

        /// Don't ring the terminal bell on alerts
        #[arg(long)]
        quiet: bool,
    },

    /// Pause the log feed (counters keep running)
    Pause,

    /// Resume the log feed
    Resume,

    /// Clear the log of a running monitor
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Ask a running monitor to write a CSV report
    Export,

    /// Show current monitor status
    Status,

    /// Show configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input,
            demo,
            demo_interval_ms,
            report_on_exit,
            quiet,
        } => cmd_run(&input, demo, demo_interval_ms, report_on_exit, quiet),
        Commands::Pause => cmd_set_paused(true),
        Commands::Resume => cmd_set_paused(false),
        Commands::Clear { yes } => cmd_clear(yes),
        Commands::Export => cmd_export(),
        Commands::Status => cmd_status(),
        Commands::Config => cmd_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn cmd_run(
    input: &str,
    demo: bool,
    demo_interval_ms: u64,
    report_on_exit: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    println!("NIDS Monitor v{VERSION}");
    println!();

    let mut config = Config::load().unwrap_or_default();
    if config.begin_session() {
        println!("Cleared a pause left over from a previous session.");
        if let Err(e) = config.save() {
            eprintln!("Warning: Could not save config: {e}");
        }
    }
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }
    let exporter = ReportExporter::new(config.report_timezone().unwrap_or_else(|e| {
        eprintln!("Warning: {e}, dating reports in UTC");
        chrono_tz::Tz::UTC
    }));

    let mut feed = if demo {
        EventFeed::synthetic(Duration::from_millis(demo_interval_ms))?
    } else if input == "-" {
        EventFeed::from_reader(BufReader::new(std::io::stdin()))?
    } else {
        let file = std::fs::File::open(input).with_context(|| format!("opening {input}"))?;
        EventFeed::from_reader(BufReader::new(file))?
    };

    let sink: Box<dyn nids_live_core::AlertSink> = if quiet {
        Box::new(nids_live_core::core::NullSink)
    } else {
        Box::new(BellSink)
    };
    let dashboard = Dashboard::new(sink).into_shared();

    println!("Session ID: {}", lock(&dashboard).session_id());
    println!("  Source: {}", if demo { "synthetic" } else { input });
    println!("  Sample period: {}s", config.sample_period.as_secs());
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let sampler = Sampler::spawn(dashboard.clone(), config.sample_period)
        .context("starting intensity sampler")?;

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone())?;

    // Pause, clear and export requests arrive through the config file.
    let mut seen_clear = config.clear_requests;
    let mut seen_export = config.export_requests;
    let mut last_config_check = Instant::now();
    let mut last_status = Instant::now();

    let receiver = feed.receiver().clone();

    while running.load(Ordering::SeqCst) {
        if last_config_check.elapsed() >= Duration::from_secs(1) {
            let mut export_requested = false;
            if let Ok(cfg) = Config::load() {
                let mut dashboard = lock(&dashboard);
                if cfg.paused != dashboard.is_paused() {
                    if cfg.paused {
                        dashboard.pause();
                        println!("Log feed paused.");
                    } else {
                        dashboard.resume();
                        println!("Log feed resumed.");
                    }
                }
                if cfg.clear_requests != seen_clear {
                    seen_clear = cfg.clear_requests;
                    dashboard.clear_log();
                    println!("Log cleared.");
                }
                if cfg.export_requests != seen_export {
                    seen_export = cfg.export_requests;
                    export_requested = true;
                }
            }
            if export_requested {
                write_report(&exporter, &dashboard, &config.export_path);
            }
            last_config_check = Instant::now();
        }

        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(raw) => {
                // Rejections are logged and counted inside the dashboard.
                let _ = lock(&dashboard).handle_raw(raw);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                println!("Event source closed.");
                break;
            }
        }

        if last_status.elapsed() >= config.sample_period {
            print_status_line(&lock(&dashboard));
            last_status = Instant::now();
        }
    }

    println!();
    println!("Stopping monitor...");
    feed.stop();
    sampler.stop();

    if report_on_exit {
        write_report(&exporter, &dashboard, &config.export_path);
    }

    // Final stats
    println!();
    println!("{}", lock(&dashboard).summary());
    Ok(())
}

fn lock(dashboard: &SharedDashboard) -> MutexGuard<'_, Dashboard> {
    match dashboard.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn print_status_line(dashboard: &Dashboard) {
    let snapshot = dashboard.snapshot();
    let intensity: Vec<String> = snapshot.intensity.iter().map(|s| s.to_string()).collect();
    println!(
        "[{}] total: {} | threats: {} | counts: {:?} | intensity: [{}]{}",
        chrono::Local::now().format("%H:%M:%S"),
        snapshot.categories.total,
        snapshot.categories.threats,
        snapshot.categories.values(),
        intensity.join(" "),
        if snapshot.paused { " | PAUSED" } else { "" }
    );
}

/// Render the report under the dashboard lock, then write it once the lock is released.
fn write_report(exporter: &ReportExporter, dashboard: &SharedDashboard, dir: &std::path::Path) {
    let rendered = exporter.export(lock(dashboard).log());
    match rendered.and_then(|csv| exporter.write_csv(&csv, dir)) {
        Ok(path) => println!("Report written to {path:?}"),
        Err(ExportError::EmptyBuffer) => println!("{}", ExportError::EmptyBuffer),
        Err(e) => eprintln!("Error writing report: {e}"),
    }
}

fn cmd_set_paused(paused: bool) -> anyhow::Result<()> {
    let mut config = Config::load().unwrap_or_default();
    config.paused = paused;
    config.save().context("saving config")?;
    if paused {
        println!("Log feed paused. Use 'nids-monitor resume' to continue.");
    } else {
        println!("Log feed resumed.");
    }
    Ok(())
}

fn cmd_clear(yes: bool) -> anyhow::Result<()> {
    if !yes && !confirm("Are you sure you want to clear all current logs?")? {
        println!("Clear cancelled.");
        return Ok(());
    }

    let mut config = Config::load().unwrap_or_default();
    config.clear_requests += 1;
    config.save().context("saving config")?;
    println!("Clear requested.");
    Ok(())
}

fn cmd_export() -> anyhow::Result<()> {
    let mut config = Config::load().unwrap_or_default();
    config.export_requests += 1;
    config.save().context("saving config")?;
    println!(
        "Export requested; the running monitor writes to {:?}",
        config.export_path
    );
    Ok(())
}

fn cmd_status() -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("NIDS Monitor Status");
    println!("===================");
    println!();
    println!("Configuration:");
    println!("  Sample period: {}s", config.sample_period.as_secs());
    println!("  Paused: {}", config.paused);
    println!("  Report time zone: {}", config.timezone);
    println!();

    let reports: Vec<PathBuf> = std::fs::read_dir(&config.export_path)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().map(|e| e == "csv").unwrap_or(false))
                .collect()
        })
        .unwrap_or_default();

    if reports.is_empty() {
        println!("No reports found in {:?}", config.export_path);
    } else {
        println!("Reports in {:?}:", config.export_path);
        for report in reports {
            if let Some(name) = report.file_name() {
                println!("  {}", name.to_string_lossy());
            }
        }
    }
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl+C handler")
}
