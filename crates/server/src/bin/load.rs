use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use finboard_import::{APPLE_CARD, BOA_CREDIT};
use finboard_server::{config::Config, ingest::import_file, logging, open_database};
use finboard_storage::close;

/// Import bank CSV exports into the finance database.
#[derive(Parser, Debug)]
#[command(name = "finboard-load", version)]
struct Args {
    /// Config file (defaults to finboard.toml when present)
    #[arg(long, env = "FINBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long)]
    database: Option<PathBuf>,

    /// Files to import, e.g. boa_credit=statements/jan.csv
    #[arg(value_name = "SOURCE=PATH", value_parser = parse_job)]
    files: Vec<(String, PathBuf)>,
}

fn parse_job(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((source, path)) if !source.is_empty() && !path.is_empty() => {
            Ok((source.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected SOURCE=PATH, got '{s}'")),
    }
}

fn default_jobs() -> Vec<(String, PathBuf)> {
    vec![
        (APPLE_CARD.to_string(), PathBuf::from("data/apple_card.csv")),
        (BOA_CREDIT.to_string(), PathBuf::from("data/boa_credit.csv")),
    ]
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init_fmt();

    match run(Args::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns false when any file failed to import.
async fn run(args: Args) -> anyhow::Result<bool> {
    let mut config = Config::load_from(args.config.as_deref())?;
    if let Some(database) = args.database {
        config.database_path = database;
    }

    let loader = Arc::new(config.loader()?);
    let pool = open_database(&config.database_path).await?;

    let jobs = if args.files.is_empty() {
        default_jobs()
    } else {
        args.files
    };

    let mut total = 0;
    let mut failed = 0;
    for (source, path) in &jobs {
        match import_file(&pool, loader.clone(), path, source).await {
            Ok(count) => {
                tracing::info!(source = %source, path = %path.display(), count, "loaded");
                total += count;
            }
            Err(e) => {
                tracing::error!(source = %source, path = %path.display(), error = %e, "failed to load");
                failed += 1;
            }
        }
    }

    tracing::info!(total, files = jobs.len(), failed, "import finished");
    close(pool).await;
    Ok(failed == 0)
}
