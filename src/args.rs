use clap::Parser;
use thiserror::Error;
use tracing::debug;

use crate::difficulty::Difficulty;
use crate::topics::{TopicDirectory, TopicError};

#[derive(Parser, Debug)]
#[command(name = "leet_sheet")]
#[command(about = "Update LeetCode Record to GoogleSheet.")]
#[command(version)]
pub struct Args {
    /// # of the problem
    #[arg(required_unless_present = "print")]
    pub number: Option<u32>,

    /// Topic of the problem: a worksheet name or its index
    #[arg(num_args = 1.., required_unless_present = "print")]
    pub topic: Vec<String>,

    /// Time complexity
    #[arg(long, num_args = 1.., required_unless_present = "print")]
    pub tc: Vec<String>,

    /// Space complexity
    #[arg(long, num_args = 1.., required_unless_present = "print")]
    pub sc: Vec<String>,

    /// Name of the problem (optional)
    #[arg(long, num_args = 1..)]
    pub name: Vec<String>,

    /// Difficulty of the problem (optional)
    #[arg(short, long, value_enum)]
    pub difficulty: Option<Difficulty>,

    /// Print the mapping for topic and id
    #[arg(short, long)]
    pub print: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Path to config file
    #[arg(long, default_value = "config/config.toml")]
    pub config: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArgumentError {
    #[error(transparent)]
    Topic(#[from] TopicError),
    #[error("Missing required argument: {0}")]
    Missing(&'static str),
}

/// Validated input for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRequest {
    pub number: u32,
    pub topic: String,
    pub time_complexity: String,
    pub space_complexity: String,
}

impl Args {
    pub fn into_request(self, directory: &TopicDirectory) -> Result<RecordRequest, ArgumentError> {
        let topic = directory.resolve(&self.topic.join(" "))?;
        let number = self.number.ok_or(ArgumentError::Missing("number"))?;
        if self.tc.is_empty() {
            return Err(ArgumentError::Missing("--tc"));
        }
        if self.sc.is_empty() {
            return Err(ArgumentError::Missing("--sc"));
        }

        if !self.name.is_empty() || self.difficulty.is_some() {
            debug!(
                "Ignoring --name {:?} and --difficulty {:?}",
                self.name, self.difficulty
            );
        }

        Ok(RecordRequest {
            number,
            topic,
            time_complexity: self.tc.join(" "),
            space_complexity: self.sc.join(" "),
        })
    }
}
