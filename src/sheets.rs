use std::io;

use google_sheets4::api::ValueRange;
use google_sheets4::{hyper, hyper_rustls, Sheets};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::token::Credential;

pub type SheetsHub = Sheets<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>;

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("Failed to fetch spreadsheet metadata: {0}")]
    Metadata(String),
    #[error("Failed to fetch range {range}: {message}")]
    Read { range: String, message: String },
    #[error("Failed to write range {range}: {message}")]
    Write { range: String, message: String },
}

/// Worksheet display order and title as stored in the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTab {
    pub index: i32,
    pub title: String,
}

/// The handful of Sheets v4 calls the recorder needs, scoped to one spreadsheet.
pub trait SpreadsheetApi {
    async fn sheet_tabs(&self) -> Result<Vec<SheetTab>, SheetsError>;

    async fn read_range(&self, range: &str) -> Result<Vec<Vec<Value>>, SheetsError>;

    /// Overwrites `range` with user-entered values, returning the raw response for logging.
    async fn write_range(&self, range: &str, values: ValueRange) -> Result<String, SheetsError>;
}

pub struct SheetsClient {
    hub: SheetsHub,
    spreadsheet_id: String,
}

impl SheetsClient {
    pub fn connect(spreadsheet_id: &str, credential: &Credential) -> io::Result<Self> {
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()?
            .https_or_http()
            .enable_http1()
            .build();
        let client = hyper::Client::builder().build::<_, hyper::Body>(https);
        debug!("Sheets v4 hub ready for spreadsheet {}", spreadsheet_id);

        Ok(Self {
            hub: Sheets::new(client, credential.access_token.clone()),
            spreadsheet_id: spreadsheet_id.to_string(),
        })
    }
}

impl SpreadsheetApi for SheetsClient {
    async fn sheet_tabs(&self) -> Result<Vec<SheetTab>, SheetsError> {
        info!("Fetching worksheets of spreadsheet {}", self.spreadsheet_id);
        let (_, spreadsheet) = self
            .hub
            .spreadsheets()
            .get(&self.spreadsheet_id)
            .doit()
            .await
            .map_err(|e| SheetsError::Metadata(e.to_string()))?;

        let tabs = spreadsheet
            .sheets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|sheet| sheet.properties)
            .filter_map(|props| {
                Some(SheetTab {
                    index: props.index.unwrap_or_default(),
                    title: props.title?,
                })
            })
            .collect();
        Ok(tabs)
    }

    async fn read_range(&self, range: &str) -> Result<Vec<Vec<Value>>, SheetsError> {
        debug!("Reading range {}", range);
        let (_, value_range) = self
            .hub
            .spreadsheets()
            .values_get(&self.spreadsheet_id, range)
            .doit()
            .await
            .map_err(|e| SheetsError::Read {
                range: range.to_string(),
                message: e.to_string(),
            })?;
        Ok(value_range.values.unwrap_or_default())
    }

    async fn write_range(&self, range: &str, values: ValueRange) -> Result<String, SheetsError> {
        debug!("Writing range {}", range);
        let (_, response) = self
            .hub
            .spreadsheets()
            .values_update(values, &self.spreadsheet_id, range)
            .value_input_option("USER_ENTERED")
            .doit()
            .await
            .map_err(|e| SheetsError::Write {
                range: range.to_string(),
                message: e.to_string(),
            })?;
        Ok(format!("{:?}", response))
    }
}

/// A1 prefix for a worksheet, quoting names that need it.
pub fn sheet_prefix(title: &str) -> String {
    if !title.is_empty() && title.chars().all(|c| c.is_alphanumeric() || c == '_') {
        title.to_string()
    } else {
        format!("'{}'", title.replace('\'', "''"))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_prefix() {
        assert_eq!(sheet_prefix("Array"), "Array");
        assert_eq!(sheet_prefix("Two_Pointers"), "Two_Pointers");
        assert_eq!(sheet_prefix("Dynamic Programming"), "'Dynamic Programming'");
        assert_eq!(sheet_prefix("Kid's"), "'Kid''s'");
    }
}
