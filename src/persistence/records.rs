//! Progress and statistics records

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::StorageError;
use super::keys;
use super::store::{Storage, load_record, merge_record};
use crate::consts::MAX_LEVEL;
use crate::level::Difficulty;

/// Campaign progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Progress {
    pub current_level: u32,
    pub highest_level_unlocked: u32,
    /// Best star rating per completed level
    pub level_stars: BTreeMap<u32, u8>,
    /// Unset until the player picks one; settings hold the fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            current_level: 1,
            highest_level_unlocked: 1,
            level_stars: BTreeMap::new(),
            difficulty: None,
        }
    }
}

/// Partial progress update; `None` fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_level_unlocked: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_stars: Option<BTreeMap<u32, u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

/// Cumulative play statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stats {
    pub total_games_played: u32,
    pub total_wins: u32,
    pub total_losses: u32,
    pub total_points_scored: u32,
    pub total_points_against: u32,
    pub current_win_streak: u32,
    pub best_win_streak: u32,
    pub total_play_time_seconds: u64,
    pub levels_completed: u32,
    /// Wins without conceding a point
    pub perfect_levels: u32,
}

impl Stats {
    /// Fold one finished match into the totals
    pub fn record(&mut self, outcome: &GameOutcome) {
        self.total_games_played += 1;
        self.total_points_scored += outcome.player_score;
        self.total_points_against += outcome.ai_score;
        self.total_play_time_seconds += outcome.play_time_seconds;

        if outcome.won {
            self.total_wins += 1;
            self.current_win_streak += 1;
            self.best_win_streak = self.best_win_streak.max(self.current_win_streak);
            self.levels_completed += 1;
            if outcome.ai_score == 0 {
                self.perfect_levels += 1;
            }
        } else {
            self.total_losses += 1;
            self.current_win_streak = 0;
        }
    }

    pub fn win_rate(&self) -> f32 {
        if self.total_games_played == 0 {
            0.0
        } else {
            self.total_wins as f32 / self.total_games_played as f32
        }
    }
}

/// Result of one match as seen by the stats record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub won: bool,
    pub player_score: u32,
    pub ai_score: u32,
    pub play_time_seconds: u64,
}

pub fn load_progress(store: &dyn Storage) -> Result<Progress, StorageError> {
    load_record(store, keys::PROGRESS)
}

pub fn save_progress(store: &mut dyn Storage, patch: &ProgressPatch) -> Result<(), StorageError> {
    merge_record(store, keys::PROGRESS, patch)
}

pub fn load_stats(store: &dyn Storage) -> Result<Stats, StorageError> {
    load_record(store, keys::STATS)
}

pub fn save_stats(store: &mut dyn Storage, stats: &Stats) -> Result<(), StorageError> {
    merge_record(store, keys::STATS, stats)
}

pub fn update_stats_after_game(
    store: &mut dyn Storage,
    outcome: &GameOutcome,
) -> Result<Stats, StorageError> {
    let mut stats = load_stats(store)?;
    stats.record(outcome);
    save_stats(store, &stats)?;
    Ok(stats)
}

/// Raise the unlock ceiling past `level` if it is the frontier
pub fn unlock_next_level(store: &mut dyn Storage, level: u32) -> Result<(), StorageError> {
    let progress = load_progress(store)?;
    if level >= progress.highest_level_unlocked {
        save_progress(
            store,
            &ProgressPatch {
                highest_level_unlocked: Some((level + 1).min(MAX_LEVEL)),
                ..Default::default()
            },
        )?;
    }
    Ok(())
}

/// Store `stars` for `level` unless an equal or better rating exists
pub fn set_level_stars(store: &mut dyn Storage, level: u32, stars: u8) -> Result<(), StorageError> {
    let progress = load_progress(store)?;
    let current = progress.level_stars.get(&level).copied().unwrap_or(0);
    if stars > current {
        let mut level_stars = progress.level_stars;
        level_stars.insert(level, stars);
        save_progress(
            store,
            &ProgressPatch {
                level_stars: Some(level_stars),
                ..Default::default()
            },
        )?;
    }
    Ok(())
}

/// Star rating for a finished match
///
/// 3 for a shutout, 2 for a margin of at least half the target, else 1.
/// Losses earn nothing.
pub fn calculate_stars(won: bool, player_score: u32, ai_score: u32, target_score: u32) -> u8 {
    if !won {
        return 0;
    }
    if ai_score == 0 {
        return 3;
    }
    if player_score.saturating_sub(ai_score) >= target_score / 2 {
        return 2;
    }
    1
}

/// Wipe every record
pub fn reset_all_data(store: &mut dyn Storage) -> Result<(), StorageError> {
    for key in keys::ALL {
        store.remove(key)?;
    }
    log::info!("All saved data cleared");
    Ok(())
}
