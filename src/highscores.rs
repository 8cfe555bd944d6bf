//! High score leaderboard system
//!
//! Ranked by level reached, then score. Tracks the top 10 entries.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::level::Difficulty;
use crate::persistence::store::{load_record, write_record};
use crate::persistence::{Storage, StorageError, keys};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u32,
    pub level: u32,
    pub difficulty: Difficulty,
    /// Host-formatted date string
    pub date: String,
}

impl HighScoreEntry {
    /// Leaderboard order: higher level first, then higher score
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .level
            .cmp(&self.level)
            .then_with(|| other.score.cmp(&self.score))
    }
}

/// High score leaderboard
///
/// Stored as a bare JSON array.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a new entry, keeping the list sorted and capped
    ///
    /// Returns the rank achieved (1-indexed) or None if it fell off the end.
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        // Ties keep earlier entries ahead
        let pos = self
            .entries
            .iter()
            .position(|e| entry.rank_cmp(e) == Ordering::Less)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);

        (pos < MAX_HIGH_SCORES).then_some(pos + 1)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best entry (if any)
    pub fn top(&self) -> Option<&HighScoreEntry> {
        self.entries.first()
    }

    pub fn load(store: &dyn Storage) -> Result<Self, StorageError> {
        let mut scores: Self = load_record(store, keys::HIGH_SCORES)?;
        scores.entries.sort_by(HighScoreEntry::rank_cmp);
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }

    pub fn save(&self, store: &mut dyn Storage) -> Result<(), StorageError> {
        write_record(store, keys::HIGH_SCORES, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// Load, insert, save; returns the updated leaderboard
pub fn add_high_score(
    store: &mut dyn Storage,
    entry: HighScoreEntry,
) -> Result<HighScores, StorageError> {
    let mut scores = HighScores::load(store)?;
    scores.add(entry);
    scores.save(store)?;
    Ok(scores)
}
