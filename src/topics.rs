use thiserror::Error;
use tracing::{debug, info};

use crate::sheets::{SheetTab, SheetsError, SpreadsheetApi};

const RULE_WIDTH: usize = 36;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TopicError {
    #[error("Unknown topic: {0}.")]
    Unknown(String),
    #[error("Topic index {index} out of bound, please refer to the following table:\n{table}")]
    IndexOutOfBounds { index: String, table: String },
}

/// Worksheet titles in the spreadsheet's display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDirectory {
    topics: Vec<String>,
}

impl TopicDirectory {
    pub fn from_tabs(mut tabs: Vec<SheetTab>) -> Self {
        tabs.sort_by_key(|tab| tab.index);
        Self {
            topics: tabs.into_iter().map(|tab| tab.title).collect(),
        }
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Exact name first, then a zero-based index when the input is all digits.
    pub fn resolve(&self, input: &str) -> Result<String, TopicError> {
        if let Some(topic) = self.topics.iter().find(|t| t.as_str() == input) {
            return Ok(topic.clone());
        }

        if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
            return Err(TopicError::Unknown(input.to_string()));
        }

        input
            .parse::<usize>()
            .ok()
            .and_then(|index| self.topics.get(index))
            .cloned()
            .ok_or_else(|| TopicError::IndexOutOfBounds {
                index: input.to_string(),
                table: self.render(),
            })
    }

    pub fn render(&self) -> String {
        let rule = "\"".repeat(RULE_WIDTH);
        let rows: String = self
            .topics
            .iter()
            .enumerate()
            .map(|(i, topic)| format!("\t{}: {}\n", i, topic))
            .collect();
        format!("{}\n{}{}", rule, rows, rule)
    }
}

pub async fn fetch_directory<A: SpreadsheetApi>(api: &A) -> Result<TopicDirectory, SheetsError> {
    let tabs = api.sheet_tabs().await?;
    let directory = TopicDirectory::from_tabs(tabs);
    info!("Found {} topics", directory.topics().len());
    debug!("Topics: {:?}", directory.topics());
    Ok(directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::fake::FakeSpreadsheet;

    fn directory() -> TopicDirectory {
        TopicDirectory {
            topics: vec!["Array".into(), "Tree".into(), "Graph".into()],
        }
    }

    #[test]
    fn test_resolve_by_name_and_index() {
        assert_eq!(directory().resolve("Tree"), Ok("Tree".to_string()));
        assert_eq!(directory().resolve("1"), Ok("Tree".to_string()));
        assert_eq!(directory().resolve("0"), Ok("Array".to_string()));
    }

    #[test]
    fn test_resolve_out_of_bounds_carries_table() {
        let err = directory().resolve("5").unwrap_err();
        assert_eq!(
            err,
            TopicError::IndexOutOfBounds {
                index: "5".to_string(),
                table: directory().render(),
            }
        );
        assert!(err.to_string().contains("\t2: Graph"));
        assert!(directory().resolve("99999999999999999999999").is_err());
    }

    #[test]
    fn test_resolve_unknown() {
        let err = directory().resolve("Foo").unwrap_err();
        assert_eq!(err.to_string(), "Unknown topic: Foo.");
        assert!(matches!(directory().resolve("-1"), Err(TopicError::Unknown(_))));
        assert!(matches!(directory().resolve(""), Err(TopicError::Unknown(_))));
    }

    #[test]
    fn test_non_ascii_digits_are_not_an_index() {
        assert_eq!(
            directory().resolve("٣"),
            Err(TopicError::Unknown("٣".to_string()))
        );
        assert!(matches!(directory().resolve("１"), Err(TopicError::Unknown(_))));
    }

    #[test]
    fn test_numeric_title_matches_by_name_first() {
        let dir = TopicDirectory {
            topics: vec!["Array".into(), "2024".into()],
        };
        assert_eq!(dir.resolve("2024"), Ok("2024".to_string()));
    }

    #[test]
    fn test_render_empty_directory() {
        let dir = TopicDirectory { topics: vec![] };
        let rule = "\"".repeat(36);
        assert_eq!(dir.render(), format!("{rule}\n{rule}"));
    }

    #[test]
    fn test_render() {
        let rule = "\"".repeat(36);
        assert_eq!(
            directory().render(),
            format!("{rule}\n\t0: Array\n\t1: Tree\n\t2: Graph\n{rule}")
        );
    }

    #[tokio::test]
    async fn test_fetch_orders_by_sheet_index() {
        let mut api = FakeSpreadsheet::default();
        api.tabs = vec![
            SheetTab { index: 2, title: "Graph".into() },
            SheetTab { index: 0, title: "Array".into() },
            SheetTab { index: 1, title: "Tree".into() },
        ];
        assert_eq!(fetch_directory(&api).await.unwrap(), directory());
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let api = FakeSpreadsheet {
            fail_metadata: true,
            ..FakeSpreadsheet::default()
        };
        assert!(matches!(
            fetch_directory(&api).await,
            Err(SheetsError::Metadata(_))
        ));
    }
}
