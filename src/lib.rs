//! Paddle Battle - simulation core for a two-paddle arcade game
//!
//! Core modules:
//! - `level`: Procedural configuration for the 100 levels
//! - `sim`: Deterministic simulation (physics, AI, per-frame match loop)
//! - `game`: Match/progression state machine
//! - `session`: Frame driver wiring the loop to the state machine
//! - `persistence`: Key-value storage collaborator and saved records
//! - `audio`: Feedback events for audio/haptics backends

pub mod audio;
pub mod game;
pub mod highscores;
pub mod level;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;

pub use game::{GameStatus, MatchState, MatchStateMachine, Winner};
pub use highscores::{HighScoreEntry, HighScores};
pub use level::{Difficulty, LevelConfig, LevelModifier, LevelTier};
pub use session::Session;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Reference frame time (60 fps) used for frame normalization, in ms
    pub const REFERENCE_FRAME_MS: f32 = 16.67;

    /// Maximum paddle bounce angle, in degrees from vertical
    pub const MAX_BOUNCE_ANGLE_DEG: f32 = 60.0;

    /// Highest level in the campaign
    pub const MAX_LEVEL: u32 = 100;
    /// Winning score used when no level config is loaded
    pub const DEFAULT_WINNING_SCORE: u32 = 5;

    /// Base ball tuning (used before any level config is loaded)
    pub const BALL_INITIAL_SPEED: f32 = 6.0;
    pub const BALL_MAX_SPEED: f32 = 15.0;
    pub const BALL_SPEED_INCREMENT: f32 = 0.3;

    /// Base AI tuning
    pub const AI_REACTION_SPEED: f32 = 0.08;
    /// Pixels of random error
    pub const AI_PREDICTION_ERROR: f32 = 30.0;
    /// Max pixels per reference frame
    pub const AI_MAX_SPEED: f32 = 5.0;
}

/// Scale factor turning a per-reference-frame quantity into a per-step one
#[inline]
pub fn frame_normalization(delta_ms: f32) -> f32 {
    delta_ms / consts::REFERENCE_FRAME_MS
}

/// Linear interpolation
#[inline]
pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Quadratic ease-in
#[inline]
pub(crate) fn ease_in_quad(t: f32) -> f32 {
    t * t
}
