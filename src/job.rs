use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::{
    args::{ArgumentError, Args},
    auth::{self, AuthError, InstalledFlow},
    catalog::{CatalogError, LeetCodeCatalog, ProblemCatalog},
    cfg::Cfg,
    cursor::{locate_next_row, RowLookupError},
    record::{row_range, write_record, ProblemRecord},
    sheets::{SheetsError, SpreadsheetApi},
    topics::{fetch_directory, TopicDirectory},
};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Failed to setup spreadsheet API service: {0}")]
    Setup(#[from] AuthError),
    #[error("Failed to fetch topics from spreadsheets: {0}")]
    Directory(#[source] SheetsError),
    #[error("Argument check failed: {0}")]
    Arguments(#[from] ArgumentError),
    #[error("Failed to resolve problem metadata: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Failed to locate next row: {0}")]
    RowLookup(#[from] RowLookupError),
    #[error("Failed to write record: {0}")]
    Write(#[source] SheetsError),
}

impl RunError {
    /// Credential and catalog failures end the process with an error status.
    /// A Sheets client that cannot be built is reported like the other API failures.
    pub fn is_fatal(&self) -> bool {
        match self {
            RunError::Catalog(_) => true,
            RunError::Setup(AuthError::Connector(_)) => false,
            RunError::Setup(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Listed(TopicDirectory),
    Recorded { range: String, record: ProblemRecord },
}

pub async fn run(cfg: &Cfg, spreadsheet_id: &str, args: Args) -> Result<Outcome, RunError> {
    info!("Starting job execution");

    let flow = InstalledFlow::new(&cfg.credentials_path);
    let api = auth::open_session(Path::new(&cfg.token_path), &flow, spreadsheet_id).await?;
    let catalog = LeetCodeCatalog::new(cfg.catalog_url.clone());

    execute(&api, &catalog, args, &cfg.problem_url_base).await
}

/// Directory, then either the listing or validate, resolve, locate and write.
pub async fn execute<A, C>(
    api: &A,
    catalog: &C,
    args: Args,
    url_base: &str,
) -> Result<Outcome, RunError>
where
    A: SpreadsheetApi,
    C: ProblemCatalog,
{
    let directory = fetch_directory(api).await.map_err(RunError::Directory)?;
    if args.print {
        return Ok(Outcome::Listed(directory));
    }

    let request = args.into_request(&directory)?;
    info!("Recording problem {} under {}", request.number, request.topic);

    let meta = catalog.lookup(request.number).await?;
    let record = ProblemRecord::new(
        request.number,
        meta,
        request.time_complexity,
        request.space_complexity,
    );

    let row = locate_next_row(api, &request.topic).await?;
    write_record(api, &record, &request.topic, row, url_base)
        .await
        .map_err(RunError::Write)?;

    Ok(Outcome::Recorded {
        range: row_range(&request.topic, row),
        record,
    })
}
