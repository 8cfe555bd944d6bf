//! Match and progression state machine
//!
//! `Idle -> Playing <-> Paused -> GameOver -> Idle | Playing (next level)`
//!
//! All gameplay transitions succeed in memory immediately. Anything that
//! touches storage is queued and applied by [`MatchStateMachine::flush_persistence`],
//! so a slow or failing store never holds up the match.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_WINNING_SCORE, MAX_LEVEL};
use crate::highscores::{self, HighScoreEntry};
use crate::level::{Difficulty, LevelConfig};
use crate::persistence::{
    self, GameOutcome, ProgressPatch, Storage, StorageError, calculate_stars,
};
use crate::settings::{Settings, SettingsPatch};
use crate::sim::{GameEvent, Side};

/// Lifecycle of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    #[default]
    Idle,
    Playing,
    Paused,
    GameOver,
}

/// Match winner
pub type Winner = Side;

/// Score, status and campaign progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub status: GameStatus,
    pub player_score: u32,
    pub ai_score: u32,
    pub winner: Option<Winner>,
    pub current_level: u32,
    pub level_config: Option<LevelConfig>,
    pub difficulty: Difficulty,
    pub highest_level_unlocked: u32,
    pub level_stars: BTreeMap<u32, u8>,
}

impl Default for MatchState {
    fn default() -> Self {
        Self {
            status: GameStatus::Idle,
            player_score: 0,
            ai_score: 0,
            winner: None,
            current_level: 1,
            level_config: None,
            difficulty: Difficulty::Medium,
            highest_level_unlocked: 1,
            level_stars: BTreeMap::new(),
        }
    }
}

impl MatchState {
    /// Best recorded stars for `level` (0 if never won)
    pub fn stars_for(&self, level: u32) -> u8 {
        self.level_stars.get(&level).copied().unwrap_or(0)
    }

    pub fn is_unlocked(&self, level: u32) -> bool {
        (1..=self.highest_level_unlocked).contains(&level)
    }
}

/// A storage write waiting to be flushed
#[derive(Debug, Clone, PartialEq)]
enum PersistOp {
    Progress(ProgressPatch),
    Settings(SettingsPatch),
    GameResult(GameOutcome),
    Unlock(u32),
    Stars { level: u32, stars: u8 },
    HighScore(HighScoreEntry),
}

impl PersistOp {
    fn apply(&self, store: &mut dyn Storage) -> Result<(), StorageError> {
        match self {
            PersistOp::Progress(patch) => persistence::save_progress(store, patch),
            PersistOp::Settings(patch) => Settings::save(store, patch),
            PersistOp::GameResult(outcome) => {
                persistence::update_stats_after_game(store, outcome).map(|_| ())
            }
            PersistOp::Unlock(level) => persistence::unlock_next_level(store, *level),
            PersistOp::Stars { level, stars } => {
                persistence::set_level_stars(store, *level, *stars)
            }
            PersistOp::HighScore(entry) => {
                highscores::add_high_score(store, entry.clone()).map(|_| ())
            }
        }
    }
}

fn or_default<T: Default>(what: &str, loaded: Result<T, StorageError>) -> T {
    loaded.unwrap_or_else(|e| {
        if e.is_recoverable() {
            log::warn!("Could not read {}, using defaults: {}", what, e);
        } else {
            log::warn!("Discarding unreadable {}: {}", what, e);
        }
        T::default()
    })
}

/// Owns the match state; every mutation goes through its operations
pub struct MatchStateMachine {
    state: MatchState,
    settings: Settings,
    storage: Box<dyn Storage>,
    outbox: Vec<PersistOp>,
    events: Vec<GameEvent>,
    play_time_ms: f64,
    /// Bumped whenever `level_config` is replaced
    config_generation: u64,
}

impl MatchStateMachine {
    /// Restore progress and settings; unreadable records fall back to defaults
    pub fn load(storage: Box<dyn Storage>) -> Self {
        let progress = or_default("progress", persistence::load_progress(storage.as_ref()));
        let settings = or_default("settings", Settings::load(storage.as_ref()));
        let difficulty = progress.difficulty.unwrap_or(settings.difficulty);

        log::info!(
            "Loaded progress: level {}, unlocked {}, {:?}",
            progress.current_level,
            progress.highest_level_unlocked,
            difficulty
        );

        let state = MatchState {
            current_level: progress.current_level.clamp(1, MAX_LEVEL),
            highest_level_unlocked: progress.highest_level_unlocked.clamp(1, MAX_LEVEL),
            level_stars: progress.level_stars,
            difficulty,
            ..MatchState::default()
        };

        Self {
            state,
            settings: Settings {
                difficulty,
                ..settings
            },
            storage,
            outbox: Vec::new(),
            events: Vec::new(),
            play_time_ms: 0.0,
            config_generation: 0,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn config_generation(&self) -> u64 {
        self.config_generation
    }

    /// Points needed to win the current match
    pub fn winning_score(&self) -> u32 {
        self.state
            .level_config
            .as_ref()
            .map_or(DEFAULT_WINNING_SCORE, |c| c.target_score)
    }

    fn load_config(&mut self, level: u32) {
        self.state.level_config = Some(LevelConfig::generate(level, self.state.difficulty));
        self.config_generation += 1;
    }

    fn begin_match(&mut self) {
        self.state.status = GameStatus::Playing;
        self.state.player_score = 0;
        self.state.ai_score = 0;
        self.state.winner = None;
        self.play_time_ms = 0.0;
        self.events.push(GameEvent::GameStart);
    }

    /// Start a match at the current level
    pub fn start_game(&mut self) {
        self.load_config(self.state.current_level);
        self.begin_match();
        log::info!("Starting level {}", self.state.current_level);
    }

    /// Start a match at `level` (expected in 1..=100)
    pub fn start_level(&mut self, level: u32) {
        let level = level.clamp(1, MAX_LEVEL);
        self.state.current_level = level;
        self.load_config(level);
        self.begin_match();
        self.outbox.push(PersistOp::Progress(ProgressPatch {
            current_level: Some(level),
            ..Default::default()
        }));
        log::info!("Starting level {} ({:?})", level, self.state.difficulty);
    }

    /// Advance one level, stopping at the last
    pub fn next_level(&mut self) {
        self.start_level((self.state.current_level + 1).min(MAX_LEVEL));
    }

    pub fn increment_player_score(&mut self) {
        if self.state.status != GameStatus::Playing {
            return;
        }
        self.state.player_score += 1;
        if self.state.player_score >= self.winning_score() {
            self.end_game(Side::Player);
        }
    }

    pub fn increment_ai_score(&mut self) {
        if self.state.status != GameStatus::Playing {
            return;
        }
        self.state.ai_score += 1;
        if self.state.ai_score >= self.winning_score() {
            self.end_game(Side::Ai);
        }
    }

    pub fn pause_game(&mut self) {
        if self.state.status == GameStatus::Playing {
            self.state.status = GameStatus::Paused;
        }
    }

    pub fn resume_game(&mut self) {
        if self.state.status == GameStatus::Paused {
            self.state.status = GameStatus::Playing;
        }
    }

    /// Back to idle with cleared scores
    pub fn reset_game(&mut self) {
        self.state.status = GameStatus::Idle;
        self.state.player_score = 0;
        self.state.ai_score = 0;
        self.state.winner = None;
    }

    /// Finish the match and queue stats/unlock/star writes
    pub fn end_game(&mut self, winner: Winner) {
        let won = winner == Side::Player;
        let level = self.state.current_level;
        let (player_score, ai_score) = (self.state.player_score, self.state.ai_score);

        self.state.status = GameStatus::GameOver;
        self.state.winner = Some(winner);

        self.outbox.push(PersistOp::GameResult(GameOutcome {
            won,
            player_score,
            ai_score,
            play_time_seconds: (self.play_time_ms / 1000.0) as u64,
        }));

        if !won {
            log::info!("Level {} lost {}-{}", level, player_score, ai_score);
            self.events.push(GameEvent::GameLose);
            return;
        }

        let stars = calculate_stars(true, player_score, ai_score, self.winning_score());
        log::info!(
            "Level {} won {}-{} ({} stars)",
            level,
            player_score,
            ai_score,
            stars
        );
        self.events.push(GameEvent::GameWin);

        let unlocked = (level + 1).min(MAX_LEVEL);
        if unlocked > self.state.highest_level_unlocked {
            self.state.highest_level_unlocked = unlocked;
            self.events.push(GameEvent::LevelUp);
            log::info!("Unlocked level {}", unlocked);
        }
        self.outbox.push(PersistOp::Unlock(level));

        let best = self.state.level_stars.entry(level).or_insert(0);
        *best = (*best).max(stars);
        self.outbox.push(PersistOp::Stars { level, stars });
    }

    /// Change difficulty; an active match picks it up immediately
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.state.difficulty = difficulty;
        self.settings.difficulty = difficulty;
        self.outbox.push(PersistOp::Settings(SettingsPatch {
            difficulty: Some(difficulty),
            ..Default::default()
        }));
        self.outbox.push(PersistOp::Progress(ProgressPatch {
            difficulty: Some(difficulty),
            ..Default::default()
        }));

        if self.state.level_config.is_some() {
            self.load_config(self.state.current_level);
            log::info!("Difficulty now {:?}, level config regenerated", difficulty);
        }
    }

    fn update_settings(&mut self, patch: SettingsPatch) {
        self.settings.apply(&patch);
        self.outbox.push(PersistOp::Settings(patch));
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        self.update_settings(SettingsPatch {
            music_volume: Some(volume.clamp(0.0, 1.0)),
            ..Default::default()
        });
    }

    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.update_settings(SettingsPatch {
            sfx_volume: Some(volume.clamp(0.0, 1.0)),
            ..Default::default()
        });
    }

    pub fn set_vibration_enabled(&mut self, enabled: bool) {
        self.update_settings(SettingsPatch {
            vibration_enabled: Some(enabled),
            ..Default::default()
        });
    }

    /// Accumulate wall time spent in active play
    pub fn record_play_time(&mut self, delta_ms: f32) {
        if self.state.status == GameStatus::Playing {
            self.play_time_ms += f64::from(delta_ms);
        }
    }

    /// Queue a leaderboard entry for the current result
    pub fn submit_high_score(&mut self, name: impl Into<String>, date: impl Into<String>) {
        self.outbox.push(PersistOp::HighScore(HighScoreEntry {
            name: name.into(),
            score: self.state.player_score,
            level: self.state.current_level,
            difficulty: self.state.difficulty,
            date: date.into(),
        }));
    }

    /// Menu navigation feedback
    pub fn menu_select(&mut self) {
        self.events.push(GameEvent::MenuSelect);
    }

    pub fn pending_writes(&self) -> usize {
        self.outbox.len()
    }

    /// Apply queued writes in order; failures are logged and dropped
    ///
    /// Returns the number of writes that failed.
    pub fn flush_persistence(&mut self) -> usize {
        let mut failed = 0;
        for op in std::mem::take(&mut self.outbox) {
            if let Err(e) = op.apply(self.storage.as_mut()) {
                log::warn!("Dropped save ({:?}): {}", op, e);
                failed += 1;
            }
        }
        failed
    }

    /// Take lifecycle events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Wipe all saved data and in-memory progress
    pub fn reset_all_data(&mut self) {
        self.outbox.clear();
        if let Err(e) = persistence::reset_all_data(self.storage.as_mut()) {
            log::warn!("Failed to reset data: {}", e);
        }
        self.state = MatchState::default();
        self.settings = Settings::default();
        self.config_generation += 1;
    }
}
