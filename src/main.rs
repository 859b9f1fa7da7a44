use anyhow::{Context, Result};
use chrono::{Local, Timelike};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

mod app;
mod logging;
mod ui;

use app::App;
use rcsa_wizard::catalog;
use rcsa_wizard::config::Config;
use rcsa_wizard::dashboard::Dashboard;
use rcsa_wizard::format::RiskLevel;
use rcsa_wizard::notifications::LogNotifier;
use rcsa_wizard::store::AssessmentStore;
use rcsa_wizard::wizard::Step;

#[derive(Parser)]
#[command(name = "rcsa")]
#[command(about = "Risk and control self-assessment wizard")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the stored assessment
    Status,

    /// Write the stored assessment to a dated JSON file
    Export {
        /// Output directory (default: paths.exports)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the stored assessment with an exported file
    Import {
        /// Exported assessment JSON
        file: PathBuf,
    },

    /// Remove the stored assessment
    Clear {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show the demo dashboard
    Dashboard,

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let is_tui_mode = cli.command.is_none();
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Status) => cmd_status(&config)?,
        Some(Commands::Export { output }) => cmd_export(&config, output)?,
        Some(Commands::Import { file }) => cmd_import(&config, &file)?,
        Some(Commands::Clear { yes }) => cmd_clear(&config, yes)?,
        Some(Commands::Dashboard) => cmd_dashboard(),
        Some(Commands::Config) => cmd_config(&config)?,
        None => {
            // No subcommand = launch the wizard
            run_tui(config, logging_handle.log_file_path).await?;
        }
    }

    Ok(())
}

async fn run_tui(config: Config, log_file_path: Option<PathBuf>) -> Result<()> {
    let mut app = App::new(config)?;
    let result = app.run().await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

fn open_store(config: &Config) -> AssessmentStore {
    AssessmentStore::from_config(config, Arc::new(LogNotifier))
}

fn cmd_status(config: &Config) -> Result<()> {
    let store = open_store(config);
    let Some(state) = store
        .try_load()
        .context("Stored assessment could not be read")?
    else {
        println!("No assessment in progress");
        println!("Run 'rcsa' to start one");
        return Ok(());
    };

    let meta = &state.metadata;
    let step = Step::from_number(meta.current_step).unwrap_or(Step::first());
    println!("{} ({})", meta.process_name, meta.assessment_period);
    println!("{}", "─".repeat(60));
    println!("  Step:          {step}");
    println!(
        "  Last modified: {}",
        meta.last_modified
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
    );
    match meta.submitted_at {
        Some(at) => println!(
            "  Submitted:     {}",
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        None => println!("  Submitted:     no"),
    }
    println!();

    println!("Selected Risks ({})", state.selected_risks.len());
    for risk_id in &state.selected_risks {
        match state.risk_assessments.get(risk_id) {
            Some(rating) => {
                let level = RiskLevel::from_score(u32::from(rating.score()));
                println!(
                    "  {} [{} x {} = {} {}]",
                    catalog::risk_title(risk_id),
                    rating.likelihood,
                    rating.impact,
                    rating.score(),
                    level.label()
                );
            }
            None => println!("  {}", catalog::risk_title(risk_id)),
        }
    }

    Ok(())
}

fn cmd_export(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let store = open_store(config);
    if !store.has_stored() {
        println!("No assessment to export");
        return Ok(());
    }

    let dir = output.unwrap_or_else(|| config.exports_path());
    let state = store.load();
    let path = store
        .export_as_file(&state, &dir)
        .with_context(|| format!("Failed to export assessment to {}", dir.display()))?;
    println!("Exported {}", path.display());
    Ok(())
}

fn cmd_import(config: &Config, file: &std::path::Path) -> Result<()> {
    let store = open_store(config);
    let state = store
        .import_from_file(file)
        .with_context(|| format!("Failed to import {}", file.display()))?;
    println!(
        "Imported {} ({} risks, step {})",
        state.metadata.process_name,
        state.selected_risks.len(),
        state.metadata.current_step
    );
    Ok(())
}

fn cmd_clear(config: &Config, skip_confirm: bool) -> Result<()> {
    let store = open_store(config);
    if !store.has_stored() {
        println!("Nothing to clear");
        return Ok(());
    }

    if !skip_confirm {
        print!("Remove the stored assessment? [y/N] ");

        use std::io::{self, Write};
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled");
            return Ok(());
        }
    }

    if store.clear() {
        println!("Assessment cleared");
        Ok(())
    } else {
        anyhow::bail!("Failed to clear {}", store.key())
    }
}

fn cmd_dashboard() {
    print!("{}", Dashboard::demo().render_text(Local::now().hour()));
}

fn cmd_config(config: &Config) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
