//! Simulation state and core types
//!
//! All state mutated by the per-frame loop lives here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::level::LevelConfig;

/// Seedable random source used by the AI and serve logic
pub type SimRng = Pcg32;

/// Build the simulation RNG from a seed
pub fn seeded_rng(seed: u64) -> SimRng {
    Pcg32::seed_from_u64(seed)
}

/// One of the two competitors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Ai,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Player => Side::Ai,
            Side::Ai => Side::Player,
        }
    }
}

/// Side wall hit by the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallSide {
    Left,
    Right,
}

/// Discrete notifications for audio/haptics, drained after each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameEvent {
    PaddleHit { is_player: bool },
    WallBounce,
    /// Point won by the given side
    Score(Side),
    GameStart,
    GameWin,
    GameLose,
    MenuSelect,
    LevelUp,
}

/// Field geometry, in screen pixels
///
/// Supplied by the host (device screen size, layout), never hardcoded by the
/// simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldGeometry {
    pub width: f32,
    pub height: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Distance between a paddle and its screen edge
    pub paddle_margin: f32,
    pub ball_radius: f32,
    /// Largest deflection off a paddle edge, in degrees from vertical
    pub max_bounce_angle_deg: f32,
}

/// Rejected field layout
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("Malformed field layout: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid field layout: {0}")]
    Invalid(&'static str),
}

impl Default for FieldGeometry {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 800.0,
            paddle_width: 100.0,
            paddle_height: 16.0,
            paddle_margin: 60.0,
            ball_radius: 12.0,
            max_bounce_angle_deg: MAX_BOUNCE_ANGLE_DEG,
        }
    }
}

impl FieldGeometry {
    /// Parse a host layout; omitted fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, FieldError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(FieldError::Invalid("expected a JSON object"));
        }
        let field: Self = serde_json::from_value(value)?;
        field.validate()?;
        Ok(field)
    }

    /// Check that a ball and both paddles fit on the field
    pub fn validate(&self) -> Result<(), FieldError> {
        let dims = [
            self.width,
            self.height,
            self.paddle_width,
            self.paddle_height,
            self.paddle_margin,
            self.ball_radius,
        ];
        if dims.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(FieldError::Invalid("dimensions must be finite and non-negative"));
        }
        if self.ball_radius <= 0.0 || self.paddle_width <= 0.0 || self.paddle_height <= 0.0 {
            return Err(FieldError::Invalid("ball and paddles need a positive size"));
        }
        if self.width <= 2.0 * self.ball_radius || self.width < self.paddle_width {
            return Err(FieldError::Invalid("field too narrow"));
        }
        if self.height <= 2.0 * (self.paddle_margin + self.paddle_height + self.ball_radius) {
            return Err(FieldError::Invalid("field too short"));
        }
        if !(self.max_bounce_angle_deg > 0.0 && self.max_bounce_angle_deg < 90.0) {
            return Err(FieldError::Invalid("bounce angle must be within (0, 90) degrees"));
        }
        Ok(())
    }

    /// Largest paddle deflection, in radians
    #[inline]
    pub fn max_bounce_angle(&self) -> f32 {
        self.max_bounce_angle_deg.to_radians()
    }

    /// Top edge of the AI paddle
    #[inline]
    pub fn ai_paddle_y(&self) -> f32 {
        self.paddle_margin
    }

    /// Top edge of the player paddle
    #[inline]
    pub fn player_paddle_y(&self) -> f32 {
        self.height - self.paddle_margin - self.paddle_height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Left edge that centers a paddle of `paddle_width`
    #[inline]
    pub fn centered_paddle_x(&self, paddle_width: f32) -> f32 {
        (self.width - paddle_width) / 2.0
    }

    /// Clamp a paddle's left edge to the field
    #[inline]
    pub fn clamp_paddle_x(&self, x: f32, paddle_width: f32) -> f32 {
        x.clamp(0.0, (self.width - paddle_width).max(0.0))
    }
}

/// Per-level numbers consumed by the loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopParams {
    pub initial_ball_speed: f32,
    pub max_ball_speed: f32,
    pub ball_speed_increment: f32,
    pub ai_reaction_speed: f32,
    pub ai_prediction_error: f32,
    pub ai_max_speed: f32,
    pub paddle_width_multiplier: f32,
}

impl Default for LoopParams {
    fn default() -> Self {
        Self {
            initial_ball_speed: BALL_INITIAL_SPEED,
            max_ball_speed: BALL_MAX_SPEED,
            ball_speed_increment: BALL_SPEED_INCREMENT,
            ai_reaction_speed: AI_REACTION_SPEED,
            ai_prediction_error: AI_PREDICTION_ERROR,
            ai_max_speed: AI_MAX_SPEED,
            paddle_width_multiplier: 1.0,
        }
    }
}

impl From<&LevelConfig> for LoopParams {
    fn from(config: &LevelConfig) -> Self {
        Self {
            initial_ball_speed: config.ball_speed,
            max_ball_speed: config.max_ball_speed,
            ball_speed_increment: config.ball_speed_increment,
            ai_reaction_speed: config.ai_reaction_speed,
            ai_prediction_error: config.ai_prediction_error,
            ai_max_speed: config.ai_max_speed,
            paddle_width_multiplier: config.paddle_width_multiplier,
        }
    }
}

/// Mutable ball/paddle state for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub ball_pos: Vec2,
    /// Direction; re-normalized every step
    pub ball_vel: Vec2,
    /// Pixels per reference frame
    pub ball_speed: f32,
    /// Left edge of the player paddle
    pub player_paddle_x: f32,
    /// Left edge of the AI paddle
    pub ai_paddle_x: f32,
    pub is_playing: bool,
}

impl SimulationState {
    /// Fresh state: ball centered heading toward the AI, paddles centered
    pub fn new(field: &FieldGeometry, params: &LoopParams) -> Self {
        let player_width = field.paddle_width * params.paddle_width_multiplier;
        Self {
            ball_pos: field.center(),
            ball_vel: Vec2::new(0.5, -1.0),
            ball_speed: params.initial_ball_speed,
            player_paddle_x: field.centered_paddle_x(player_width),
            ai_paddle_x: field.centered_paddle_x(field.paddle_width),
            is_playing: false,
        }
    }
}

/// Read-only copy of positions handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub ball: Vec2,
    /// Top-left corner of the player paddle
    pub player_paddle: Vec2,
    pub player_paddle_width: f32,
    /// Top-left corner of the AI paddle
    pub ai_paddle: Vec2,
    pub ai_paddle_width: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Difficulty;

    #[test]
    fn test_field_paddle_rows() {
        let field = FieldGeometry::default();
        assert_eq!(field.ai_paddle_y(), 60.0);
        assert_eq!(field.player_paddle_y(), 800.0 - 60.0 - 16.0);
        assert_eq!(field.clamp_paddle_x(-20.0, 100.0), 0.0);
        assert_eq!(field.clamp_paddle_x(390.0, 100.0), 300.0);
    }

    #[test]
    fn test_field_from_json() {
        let field = FieldGeometry::from_json(r#"{"width": 360.0, "height": 640.0}"#).unwrap();
        assert_eq!(field.width, 360.0);
        assert_eq!(field.paddle_width, 100.0);
        assert_eq!(field.center(), Vec2::new(180.0, 320.0));
        assert_eq!(field.max_bounce_angle_deg, 60.0);
        assert!(FieldGeometry::from_json("[1, 2]").is_err());
        assert!(FieldGeometry::from_json("{not json").is_err());
    }

    #[test]
    fn test_field_validation() {
        assert!(FieldGeometry::default().validate().is_ok());

        // Narrower than the ball
        assert!(matches!(
            FieldGeometry::from_json(r#"{"width": 20.0}"#),
            Err(FieldError::Invalid(_))
        ));
        // Paddles overlap vertically
        assert!(FieldGeometry::from_json(r#"{"height": 150.0}"#).is_err());
        assert!(FieldGeometry::from_json(r#"{"ball_radius": -1.0}"#).is_err());
        assert!(FieldGeometry::from_json(r#"{"max_bounce_angle_deg": 90.0}"#).is_err());

        let field = FieldGeometry::from_json(r#"{"max_bounce_angle_deg": 45.0}"#).unwrap();
        assert!((field.max_bounce_angle() - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    }

    #[test]
    fn test_loop_params_from_level() {
        let config = LevelConfig::generate(1, Difficulty::Easy);
        let params = LoopParams::from(&config);
        assert_eq!(params.initial_ball_speed, config.ball_speed);
        assert_eq!(params.paddle_width_multiplier, config.paddle_width_multiplier);
    }

    #[test]
    fn test_new_state_centered() {
        let field = FieldGeometry::default();
        let state = SimulationState::new(&field, &LoopParams::default());
        assert_eq!(state.ball_pos, Vec2::new(200.0, 400.0));
        assert_eq!(state.ai_paddle_x, 150.0);
        assert_eq!(state.player_paddle_x, 150.0);
        assert!(!state.is_playing);
        assert!(state.ball_vel.y < 0.0);
    }
}
