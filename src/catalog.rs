use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::difficulty::Difficulty;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to fetch problem catalog from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Title and difficulty of a catalog entry. Both are `None` when the id is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemMeta {
    pub title: Option<String>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogResponse {
    pub stat_status_pairs: Vec<StatStatusPair>,
}

#[derive(Debug, Deserialize)]
pub struct StatStatusPair {
    pub stat: ProblemStat,
    pub difficulty: DifficultyLevel,
}

#[derive(Debug, Deserialize)]
pub struct ProblemStat {
    pub frontend_question_id: u32,
    #[serde(rename = "question__title")]
    pub question_title: String,
}

#[derive(Debug, Deserialize)]
pub struct DifficultyLevel {
    pub level: u64,
}

pub trait ProblemCatalog {
    async fn lookup(&self, id: u32) -> Result<ProblemMeta, CatalogError>;
}

pub struct LeetCodeCatalog {
    client: reqwest::Client,
    url: String,
}

impl LeetCodeCatalog {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl ProblemCatalog for LeetCodeCatalog {
    async fn lookup(&self, id: u32) -> Result<ProblemMeta, CatalogError> {
        info!("Fetching problem catalog from {}", self.url);

        let fetch_err = |source| CatalogError::Fetch {
            url: self.url.clone(),
            source,
        };
        let catalog: CatalogResponse = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(fetch_err)?
            .json()
            .await
            .map_err(fetch_err)?;

        debug!("Catalog holds {} problems", catalog.stat_status_pairs.len());
        Ok(find_problem(&catalog, id))
    }
}

pub fn find_problem(catalog: &CatalogResponse, id: u32) -> ProblemMeta {
    let Some(pair) = catalog
        .stat_status_pairs
        .iter()
        .find(|pair| pair.stat.frontend_question_id == id)
    else {
        warn!("Problem {} not found in catalog", id);
        return ProblemMeta::default();
    };

    let difficulty = match Difficulty::from_level(pair.difficulty.level) {
        Ok(difficulty) => Some(difficulty),
        Err(e) => {
            warn!("Problem {}: {}", id, e);
            None
        }
    };

    ProblemMeta {
        title: Some(pair.stat.question_title.clone()),
        difficulty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> CatalogResponse {
        serde_json::from_str(
            r#"{
                "user_name": "",
                "num_total": 3,
                "stat_status_pairs": [
                    {
                        "stat": {
                            "question_id": 1,
                            "question__title": "Two Sum",
                            "question__title_slug": "two-sum",
                            "frontend_question_id": 1
                        },
                        "status": null,
                        "difficulty": {"level": 1},
                        "paid_only": false
                    },
                    {
                        "stat": {
                            "question_id": 4,
                            "question__title": "Median of Two Sorted Arrays",
                            "frontend_question_id": 4
                        },
                        "difficulty": {"level": 3}
                    },
                    {
                        "stat": {"question__title": "Odd One", "frontend_question_id": 9},
                        "difficulty": {"level": 7}
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_find_existing_problem() {
        let meta = find_problem(&sample_catalog(), 4);
        assert_eq!(meta.title.as_deref(), Some("Median of Two Sorted Arrays"));
        assert_eq!(meta.difficulty, Some(Difficulty::Hard));
    }

    #[test]
    fn test_missing_problem_is_empty() {
        assert_eq!(find_problem(&sample_catalog(), 2), ProblemMeta::default());
    }

    #[test]
    fn test_unknown_level_keeps_title() {
        let meta = find_problem(&sample_catalog(), 9);
        assert_eq!(meta.title.as_deref(), Some("Odd One"));
        assert_eq!(meta.difficulty, None);
    }
}
