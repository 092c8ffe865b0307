//! Profiles a dataset file and prints the analysis report as JSON.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use flownix_engine::config::EngineConfig;
use flownix_engine::error::EngineError;
use flownix_engine::logging::setup::{init_logging, parse_level};
use flownix_engine::orchestrator::AnalysisOrchestrator;
use flownix_engine::sources::ingest_path;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV, JSON (newline-delimited), Parquet or Excel file
    file: PathBuf,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,

    /// Write logs to stderr as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Engine log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// CSV field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// CSV file has no header row
    #[arg(long)]
    no_header: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

async fn run(args: Args) -> flownix_engine::error::Result<()> {
    let config = EngineConfig::from_env()?;

    let mut logging = config.logging.clone();
    if args.json_logs {
        logging = logging.with_json_format(true);
    }
    if let Some(level) = &args.log_level {
        logging = logging.with_engine_level(parse_level(level)?);
    }

    let delimiter = u8::try_from(args.delimiter).map_err(|_| {
        EngineError::Configuration(format!("delimiter '{}' is not a single byte", args.delimiter))
    })?;
    let ingest = config
        .ingest
        .clone()
        .with_csv_delimiter(delimiter)
        .with_csv_header(!args.no_header);

    let config = config.with_logging(logging).with_ingest(ingest);
    init_logging(config.logging.clone())?;

    let ingested = ingest_path(&args.file, &config.ingest).await?;
    let orchestrator = AnalysisOrchestrator::in_memory();
    let id = orchestrator
        .register(ingested.table, ingested.metadata)
        .await?;
    let report = orchestrator.analyze(&id).await?;

    let json = if args.pretty {
        report.to_json_pretty()?
    } else {
        report.to_json()?
    };
    println!("{json}");
    Ok(())
}
