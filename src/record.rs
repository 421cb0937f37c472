use google_sheets4::api::ValueRange;
use serde_json::Value;
use tracing::{debug, info};

use crate::catalog::ProblemMeta;
use crate::difficulty::Difficulty;
use crate::sheets::{sheet_prefix, SheetsError, SpreadsheetApi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemRecord {
    pub id: u32,
    pub title: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub time_complexity: String,
    pub space_complexity: String,
}

impl ProblemRecord {
    pub fn new(id: u32, meta: ProblemMeta, time_complexity: String, space_complexity: String) -> Self {
        Self {
            id,
            title: meta.title,
            difficulty: meta.difficulty,
            time_complexity,
            space_complexity,
        }
    }

    /// "Two Sum" becomes "two-sum".
    pub fn slug(&self) -> Option<String> {
        self.title.as_ref().map(|t| t.to_lowercase().replace(' ', "-"))
    }

    pub fn url(&self, base: &str) -> Option<String> {
        self.slug()
            .map(|slug| format!("{}/{}/description", base.trim_end_matches('/'), slug))
    }

    pub fn hyperlink(&self, base: &str) -> Option<String> {
        let (url, title) = (self.url(base)?, self.title.as_ref()?);
        Some(format!(
            "=HYPERLINK(\"{}\", \"{}\")",
            escape_formula(&url),
            escape_formula(title)
        ))
    }

    /// Columns A through E of the record's row.
    pub fn to_row_values(&self, base: &str) -> Vec<Value> {
        vec![
            Value::String(self.id.to_string()),
            Value::String(self.hyperlink(base).unwrap_or_default()),
            Value::String(
                self.difficulty
                    .map(|d| d.as_str().to_string())
                    .unwrap_or_default(),
            ),
            Value::String(self.time_complexity.clone()),
            Value::String(self.space_complexity.clone()),
        ]
    }

    pub fn value_range(&self, topic: &str, row: u32, base: &str) -> ValueRange {
        ValueRange {
            major_dimension: Some("ROWS".to_string()),
            range: Some(row_range(topic, row)),
            values: Some(vec![self.to_row_values(base)]),
        }
    }
}

pub fn row_range(topic: &str, row: u32) -> String {
    format!("{}!A{}:E{}", sheet_prefix(topic), row, row)
}

fn escape_formula(text: &str) -> String {
    text.replace('"', "\"\"")
}

pub async fn write_record<A: SpreadsheetApi>(
    api: &A,
    record: &ProblemRecord,
    topic: &str,
    row: u32,
    base: &str,
) -> Result<(), SheetsError> {
    let range = row_range(topic, row);
    let body = record.value_range(topic, row, base);
    debug!("Payload for {}: {:?}", range, body.values);

    let response = api.write_range(&range, body).await?;
    info!("{}", response);
    Ok(())
}
