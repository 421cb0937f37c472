use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::sheets::{sheet_prefix, SheetsError, SpreadsheetApi};

/// Cell holding the number of records already in a worksheet.
pub const COUNTER_CELL: &str = "G1";

/// Header row plus one past the last record.
const ROW_OFFSET: u32 = 2;

#[derive(Error, Debug)]
pub enum RowLookupError {
    #[error(transparent)]
    Api(#[from] SheetsError),
    #[error("Counter cell {range} is empty")]
    EmptyCounter { range: String },
    #[error("Counter cell {range} holds {value}, expected a record count")]
    InvalidCounter { range: String, value: String },
}

pub async fn locate_next_row<A: SpreadsheetApi>(api: &A, topic: &str) -> Result<u32, RowLookupError> {
    let range = format!("{}!{}", sheet_prefix(topic), COUNTER_CELL);
    let values = api.read_range(&range).await?;

    let cell = values
        .first()
        .and_then(|row| row.first())
        .ok_or_else(|| RowLookupError::EmptyCounter {
            range: range.clone(),
        })?;
    let count = parse_counter(cell).ok_or_else(|| RowLookupError::InvalidCounter {
        range: range.clone(),
        value: cell.to_string(),
    })?;

    debug!("{} reports {} existing records", range, count);
    let row = count
        .checked_add(ROW_OFFSET)
        .ok_or_else(|| RowLookupError::InvalidCounter {
            range: range.clone(),
            value: cell.to_string(),
        })?;
    info!("Next free row on {}: {}", topic, row);
    Ok(row)
}

fn parse_counter(cell: &Value) -> Option<u32> {
    match cell {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::fake::FakeSpreadsheet;

    #[tokio::test]
    async fn test_counter_plus_two() {
        let api = FakeSpreadsheet::with_tabs(&["Array"]).with_cell("Array!G1", Value::from("5"));
        assert_eq!(locate_next_row(&api, "Array").await.unwrap(), 7);
        assert_eq!(api.reads.borrow().as_slice(), ["Array!G1".to_string()]);
    }

    #[tokio::test]
    async fn test_numeric_counter_and_quoted_sheet() {
        let api = FakeSpreadsheet::with_tabs(&["Binary Search"])
            .with_cell("'Binary Search'!G1", Value::from(0));
        assert_eq!(locate_next_row(&api, "Binary Search").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_non_integer_counter_is_rejected() {
        let api = FakeSpreadsheet::with_tabs(&["Array"]).with_cell("Array!G1", Value::from("n/a"));
        let err = locate_next_row(&api, "Array").await.unwrap_err();
        assert!(matches!(err, RowLookupError::InvalidCounter { .. }));
    }

    #[tokio::test]
    async fn test_counter_at_u32_limit_is_rejected() {
        for raw in ["4294967295", "4294967294"] {
            let api = FakeSpreadsheet::with_tabs(&["Array"]).with_cell("Array!G1", Value::from(raw));
            let err = locate_next_row(&api, "Array").await.unwrap_err();
            assert!(matches!(err, RowLookupError::InvalidCounter { .. }), "counter {raw}");
        }
    }

    #[tokio::test]
    async fn test_empty_counter_is_rejected() {
        let mut api = FakeSpreadsheet::with_tabs(&["Array"]);
        api.cells.insert("Array!G1".to_string(), vec![]);
        let err = locate_next_row(&api, "Array").await.unwrap_err();
        assert!(matches!(err, RowLookupError::EmptyCounter { .. }));
    }

    #[tokio::test]
    async fn test_api_error_propagates() {
        let api = FakeSpreadsheet::with_tabs(&["Array"]);
        let err = locate_next_row(&api, "Array").await.unwrap_err();
        assert!(matches!(err, RowLookupError::Api(SheetsError::Read { .. })));
    }
}
