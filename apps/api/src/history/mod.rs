//! Evaluation history: the session list of past evaluations, with file save/load.

pub mod handlers;
pub mod persistence;
pub mod store;

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evaluation::models::EvaluationResult;

pub use store::HistoryStore;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("no saved history at {}", .0.display())]
    NotFound(PathBuf),

    #[error("saved history is unreadable: {0}")]
    Deserialization(String),

    #[error("history file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Summary of one past evaluation. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub match_percentage: f64,
    pub missing_keywords: Vec<String>,
}

impl HistoryEntry {
    pub fn from_evaluation(result: &EvaluationResult, at: DateTime<Local>) -> Self {
        Self {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            match_percentage: result.match_percentage,
            missing_keywords: result.missing_keywords.clone(),
        }
    }

    pub fn match_display(&self) -> String {
        format!("{:.1}%", self.match_percentage)
    }

    fn has_valid_score(&self) -> bool {
        self.match_percentage.is_finite() && (0.0..=100.0).contains(&self.match_percentage)
    }
}
