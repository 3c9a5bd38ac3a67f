//! Score ledger
//!
//! Final scores are appended per player. `JsonFileLedger` keeps the whole
//! history in one JSON file, rewritten through a temp file on every record.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Errors raised by ledger backends
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid player id {0:?}")]
    InvalidPlayer(String),
    #[error("failed to access score file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed score file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Sink for completed round scores
pub trait ScoreLedger {
    /// Record the final score of a completed round
    fn record_final_score(&mut self, player_id: &str, score: u64) -> Result<(), LedgerError>;
}

/// A single recorded round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u64,
    /// Unix timestamp (ms) when recorded
    pub timestamp: i64,
}

impl ScoreEntry {
    /// `yyyy-mm-dd hh:mm:ss` (UTC)
    pub fn formatted_time(&self) -> String {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// Summary over a player's rounds
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreStats {
    pub total_games: usize,
    pub highest: u64,
    pub lowest: u64,
    pub average: f64,
}

/// Per-player score history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreHistory {
    pub players: BTreeMap<String, Vec<ScoreEntry>>,
}

impl ScoreHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a score (in recording order)
    pub fn record(&mut self, player_id: &str, score: u64, timestamp: i64) -> Result<(), LedgerError> {
        let player_id = player_id.trim();
        if player_id.is_empty() {
            return Err(LedgerError::InvalidPlayer(player_id.to_string()));
        }
        self.players
            .entry(player_id.to_string())
            .or_default()
            .push(ScoreEntry { score, timestamp });
        Ok(())
    }

    /// Entries in recording order
    pub fn entries(&self, player_id: &str) -> &[ScoreEntry] {
        self.players
            .get(player_id.trim())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Entries sorted by score, best first (ties keep recording order)
    pub fn ranked(&self, player_id: &str) -> Vec<ScoreEntry> {
        let mut entries = self.entries(player_id).to_vec();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries
    }

    /// Best score for a player (if any)
    pub fn top_score(&self, player_id: &str) -> Option<u64> {
        self.entries(player_id).iter().map(|e| e.score).max()
    }

    pub fn stats(&self, player_id: &str) -> Option<ScoreStats> {
        let entries = self.entries(player_id);
        if entries.is_empty() {
            return None;
        }
        let total: u64 = entries.iter().map(|e| e.score).sum();
        Some(ScoreStats {
            total_games: entries.len(),
            highest: entries.iter().map(|e| e.score).max().unwrap_or(0),
            lowest: entries.iter().map(|e| e.score).min().unwrap_or(0),
            average: total as f64 / entries.len() as f64,
        })
    }

    /// Ranked listing with a statistics block, for a score-history view
    pub fn format_history(&self, player_id: &str) -> String {
        let player_id = player_id.trim();
        let Some(stats) = self.stats(player_id) else {
            return format!("No scores found for user: {}", player_id);
        };

        let mut out = format!("=== Score History for {} ===\n\n", player_id);
        for (i, entry) in self.ranked(player_id).iter().enumerate() {
            out.push_str(&format!(
                "#{}: {} points - {}\n",
                i + 1,
                entry.score,
                entry.formatted_time()
            ));
        }
        out.push_str("\n--- Statistics ---\n");
        out.push_str(&format!("Total Games: {}\n", stats.total_games));
        out.push_str(&format!("Highest Score: {}\n", stats.highest));
        out.push_str(&format!("Lowest Score: {}\n", stats.lowest));
        out.push_str(&format!("Average Score: {:.1}\n", stats.average));
        out
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// In-memory ledger (no persistence)
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    pub history: ScoreHistory,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreLedger for MemoryLedger {
    fn record_final_score(&mut self, player_id: &str, score: u64) -> Result<(), LedgerError> {
        self.history.record(player_id, score, now_millis())
    }
}

/// Ledger persisted as a JSON file
#[derive(Debug)]
pub struct JsonFileLedger {
    path: PathBuf,
    history: ScoreHistory,
}

impl JsonFileLedger {
    /// Open (or start) the ledger at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let history = match fs::read_to_string(&path) {
            Ok(json) => {
                let history: ScoreHistory = serde_json::from_str(&json)?;
                log::info!(
                    "Loaded score history for {} players from {}",
                    history.players.len(),
                    path.display()
                );
                history
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No score history at {}, starting fresh", path.display());
                ScoreHistory::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, history })
    }

    pub fn history(&self) -> &ScoreHistory {
        &self.history
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the history (tmp file, then rename over the old one)
    pub fn save(&self) -> Result<(), LedgerError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.history)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ScoreLedger for JsonFileLedger {
    fn record_final_score(&mut self, player_id: &str, score: u64) -> Result<(), LedgerError> {
        let previous = self.history.clone();
        self.history.record(player_id, score, now_millis())?;
        if let Err(e) = self.save() {
            self.history = previous;
            return Err(e);
        }
        log::info!("Score saved for {}: {}", player_id, score);
        Ok(())
    }
}
