use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

mod args;
mod auth;
mod catalog;
mod cfg;
mod cursor;
mod difficulty;
mod job;
mod record;
mod sheets;
mod token;
mod topics;

use args::Args;
use cfg::{read_ssid, Cfg};
use job::Outcome;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("Starting leet_sheet");

    let cfg = Cfg::load(&args.config)?;
    cfg.validate()?;

    let spreadsheet_id = match read_ssid(Path::new(&cfg.ssid_path)) {
        Ok(id) => id,
        Err(e) => {
            error!("{}", e);
            println!("Please provide ssid file!");
            std::process::exit(1);
        }
    };

    match job::run(&cfg, &spreadsheet_id, args).await {
        Ok(Outcome::Listed(directory)) => println!("{}", directory.render()),
        Ok(Outcome::Recorded { range, record }) => {
            info!("Recorded problem {} at {}", record.id, range);
        }
        Err(e) if e.is_fatal() => return Err(e.into()),
        Err(e) => eprintln!("{}", e),
    }

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = match level {
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
