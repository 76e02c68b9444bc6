use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grid::FillStats;

/// Payloads exchanged between the game client and the bot over the platform's
/// send-data channel. One vocabulary for both sides, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    #[serde(rename_all = "camelCase")]
    GameStarted {
        level: u32,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    LevelCompleted {
        level: u32,
        score: i32,
        time: u32,
        hints_used: u32,
        timestamp: DateTime<Utc>,
    },
    /// Like `LevelCompleted`, but for the final catalog level.
    #[serde(rename_all = "camelCase")]
    GameCompleted {
        level: u32,
        score: i32,
        time: u32,
        hints_used: u32,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    HelpRequested {
        level: u32,
        current_progress: ProgressSummary,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    AchievementUnlocked {
        achievement: String,
        description: String,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    ShareScore {
        level: u32,
        score: i32,
        time: u32,
        timestamp: DateTime<Utc>,
    },
}

impl GameEvent {
    /// Parse a raw payload from the game channel. Callers log and drop
    /// failures; a bad payload never aborts update handling.
    pub fn parse(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

/// Fill summary attached to help requests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub completed_words: usize,
    pub total_words: usize,
    pub filled_cells: usize,
    pub total_cells: usize,
    pub progress_percentage: u32,
}

impl From<FillStats> for ProgressSummary {
    fn from(stats: FillStats) -> Self {
        Self {
            progress_percentage: stats.percentage(),
            completed_words: stats.completed_words,
            total_words: stats.total_words,
            filled_cells: stats.filled_cells,
            total_cells: stats.total_cells,
        }
    }
}
