//! Save/load through a key-value storage collaborator
//!
//! Features:
//! - Four JSON records: progress, settings, stats, high scores
//! - Missing records and missing fields fall back to defaults
//! - Writes merge into the existing record instead of replacing it
//! - In-memory and directory-backed stores

pub mod error;
pub mod records;
pub mod store;

pub use error::StorageError;
pub use records::{
    GameOutcome, Progress, ProgressPatch, Stats, calculate_stars, load_progress, load_stats,
    reset_all_data, save_progress, save_stats, set_level_stars, unlock_next_level,
    update_stats_after_game,
};
pub use store::{FileStore, MemoryStore, Storage};

/// Storage keys for each record
pub mod keys {
    pub const PROGRESS: &str = "paddlebattle.progress";
    pub const SETTINGS: &str = "paddlebattle.settings";
    pub const STATS: &str = "paddlebattle.stats";
    pub const HIGH_SCORES: &str = "paddlebattle.highscores";

    pub const ALL: [&str; 4] = [PROGRESS, SETTINGS, STATS, HIGH_SCORES];
}
