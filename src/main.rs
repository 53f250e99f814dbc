mod commands;
mod logging;
mod render;

use std::io::{self, BufRead, Write};
use std::process;

use anyhow::Context;
use breach_lens::config::load_configuration;
use breach_lens::{AppConfig, Categorizer, ChartSink, DashboardEngine};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use render::{JsonSink, TableSink};
use tracing::{error, info, warn};

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Run { json }) => {
            if let Err(err) = run_dashboard(config, json) {
                error!("Error: {:#}", err);
                process::exit(1);
            }
        }
        Some(Commands::Categorize { text }) => {
            let categorizer = Categorizer::new(config.unmatched_method_default);
            println!("{}", categorizer.categorize(&text));
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
        }
        Some(Commands::CountCache) => {
            info!("Counting source cache keys...");
            let count = open_engine(config)?.cache().store().count_keys()?;
            println!("{} keys in source cache", format!("{}", count).cyan());
        }
        Some(Commands::ClearCache { yes }) => {
            let confirmed = yes
                || confirm(
                    "Remove every cached source payload?",
                    &mut io::stdin().lock(),
                    &mut io::stdout(),
                )?;
            if confirmed {
                open_engine(config)?.cache().store().clear_all()?;
                println!("{}", "Source cache cleared".green());
            }
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn open_engine(config: AppConfig) -> anyhow::Result<DashboardEngine> {
    if config.cache.persistent_path().is_none() {
        warn!("No cache path configured, the source cache lives in memory only");
    }
    DashboardEngine::new(config).context("opening source cache")
}

fn run_dashboard(config: AppConfig, json: bool) -> anyhow::Result<()> {
    if config.sources.is_empty() {
        warn!("No sources configured, nothing to render");
    }
    let engine = open_engine(config)?;
    let sink: &dyn ChartSink = if json { &JsonSink } else { &TableSink };
    let result = engine.run(sink).context("dashboard run failed")?;

    info!(
        "Load: {}, Aggregate: {}",
        format!("{:.2}s", result.fetch_duration.as_secs_f64()).green(),
        format!("{:.3}s", result.aggregate_duration.as_secs_f64()).green(),
    );
    info!(
        "{} records loaded, {} chart slots rendered",
        format!("{}", result.records_loaded).cyan(),
        format!("{}", result.rendered.len()).cyan(),
    );

    Ok(())
}

/// Ask a yes/no question; anything but an explicit yes is a no.
fn confirm(question: &str, input: &mut impl BufRead, output: &mut impl Write) -> io::Result<bool> {
    write!(output, "{} [y/N] ", question)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
