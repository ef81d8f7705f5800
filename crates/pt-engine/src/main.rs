//! Command line entry point for the headless engine

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pt_engine::{BuiltTable, DemoTraceProcessor, Engine, EngineConfig, EngineRequest};
use pt_prebuilt::{to_writer, PrebuiltConfigurationsLoader};
use pt_processing::{CancellationToken, StaticApplicationEnvironment};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless performance toolkit engine")]
struct Cli {
    /// Log filter such as `info` or `pt_processing=debug`; falls back to PT_LOG
    #[arg(long, global = true)]
    log: Option<String>,

    /// JSON engine configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process a synthetic trace and print the tables it produces
    Run {
        /// Number of samples to generate
        #[arg(long)]
        samples: Option<usize>,

        /// Optional table to build, by name or GUID (repeatable)
        #[arg(short, long = "enable")]
        enable: Vec<String>,

        /// Build every optional table
        #[arg(long)]
        all_tables: bool,

        /// Rows printed per table
        #[arg(long, default_value_t = 20)]
        max_rows: usize,
    },

    /// List the tables the demo processor can build
    Tables,

    /// Upgrade a prebuilt configuration file to the current schema
    Upgrade {
        file: PathBuf,

        /// Write the upgraded document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load prebuilt configuration files and report which ones are valid
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn init_logging(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(filter) => EnvFilter::try_new(filter).context("invalid --log filter")?,
        None => EnvFilter::try_from_env("PT_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref())?;

    let mut config = EngineConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Run {
            samples,
            enable,
            all_tables,
            max_rows,
        } => {
            if let Some(samples) = samples {
                config.sample_count = samples;
            }
            if !enable.is_empty() {
                config.enabled_tables = enable;
            }
            run(&config, all_tables, max_rows).await
        }
        Command::Tables => {
            list_tables();
            Ok(())
        }
        Command::Upgrade { file, output } => upgrade(&file, output.as_deref()),
        Command::Check { files } => check(&files),
    }
}

async fn run(config: &EngineConfig, all_tables: bool, max_rows: usize) -> Result<()> {
    info!(samples = config.sample_count, "Starting headless run");

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling processing");
            interrupt.cancel();
        }
    });

    let application = Arc::new(StaticApplicationEnvironment::new(config.application_name.clone()));
    let mut processor = DemoTraceProcessor::new(config.sample_count, Utc::now())
        .into_processor(config.processor_options(), application)?;

    let engine = Engine::new().with_progress_step(config.progress_step);
    let request = EngineRequest {
        enable_all: all_tables,
        ..EngineRequest::from_config(config)
    };
    let run = engine.run(&mut processor, &request, &cancel).await?;

    let info = run.data_source_info;
    println!(
        "Processed {} ns of events ({} .. {})",
        info.duration_ns(),
        info.first_event_wall_clock_utc(),
        info.last_event_wall_clock_utc()
    );
    for table in &run.tables {
        print_table(table, max_rows)?;
    }
    Ok(())
}

fn print_table(table: &BuiltTable, max_rows: usize) -> Result<()> {
    let kind = if table.descriptor.is_metadata_table { "metadata" } else { "table" };
    println!();
    println!("== {} [{kind}] {} rows", table.descriptor.name, table.row_count());
    if let Some(configuration) = table.default_configuration() {
        println!("   default configuration: {}", configuration.name);
    }

    let shown = table.row_count().min(max_rows);
    let head = table.batch.slice(0, shown);
    println!("{}", pretty_format_batches(&[head])?);
    if shown < table.row_count() {
        println!("   ... {} more rows", table.row_count() - shown);
    }
    Ok(())
}

fn list_tables() {
    for descriptor in DemoTraceProcessor::descriptors() {
        let kind = if descriptor.is_metadata_table { "metadata" } else { "optional" };
        println!(
            "{}  {:<24} {:<9} {}",
            descriptor.guid, descriptor.name, kind, descriptor.category
        );
    }
}

fn upgrade(file: &Path, output: Option<&Path>) -> Result<()> {
    let text = fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let loader = PrebuiltConfigurationsLoader::new();
    let current = loader.load_str(&text)?;

    if let Err(err) = current.clone().into_table_configurations() {
        warn!(error = %err, "upgraded document contains an invalid configuration");
    }

    match output {
        Some(path) => {
            let out = fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            to_writer(out, &current)?;
            info!(path = %path.display(), "Wrote upgraded configurations");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            to_writer(&mut stdout, &current)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

fn check(files: &[PathBuf]) -> Result<()> {
    let mut failed = 0;
    let mut loaded = Vec::with_capacity(files.len());
    for path in files {
        match fs::read_to_string(path) {
            Ok(text) => loaded.push((path, text)),
            Err(err) => {
                failed += 1;
                println!("{}: FAILED ({err})", path.display());
            }
        }
    }

    let loader = PrebuiltConfigurationsLoader::new();
    let results = loader.load_batch(loaded.iter().map(|(_, text)| text.as_str()));
    for ((path, _), result) in loaded.iter().zip(results) {
        match result.and_then(|document| document.into_table_configurations()) {
            Ok(tables) => {
                let configurations: usize = tables.iter().map(|t| t.configurations.len()).sum();
                println!(
                    "{}: ok ({} tables, {configurations} configurations)",
                    path.display(),
                    tables.len()
                );
            }
            Err(err) => {
                failed += 1;
                println!("{}: FAILED ({err})", path.display());
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} files failed to load", files.len());
    }
    Ok(())
}
