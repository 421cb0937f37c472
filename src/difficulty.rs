use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use thiserror::Error;

/// Canonical difficulty label written to the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Difficulty {
    #[value(name = "E")]
    Easy,
    #[value(name = "M")]
    Medium,
    #[value(name = "H")]
    Hard,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown difficulty encoding: {0}")]
pub struct DifficultyError(pub String);

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Catalog level: 1, 2 or 3.
    pub fn from_level(level: u64) -> Result<Self, DifficultyError> {
        level.to_string().parse()
    }
}

/// The normalization table: every raw encoding maps to one canonical label.
impl FromStr for Difficulty {
    type Err = DifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" | "E" | "Easy" => Ok(Difficulty::Easy),
            "2" | "M" | "Medium" => Ok(Difficulty::Medium),
            "3" | "H" | "Hard" => Ok(Difficulty::Hard),
            other => Err(DifficultyError(other.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
