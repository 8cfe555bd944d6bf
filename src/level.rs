//! Procedural level configuration
//!
//! Every one of the 100 levels is derived from its number and the selected
//! difficulty. Nothing here is stored; configs are regenerated on demand.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_LEVEL;
use crate::{ease_in_quad, lerp};

/// Player-selected difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    fn modifiers(&self) -> DifficultyModifiers {
        match self {
            Difficulty::Easy => DifficultyModifiers {
                paddle: 1.3,
                ball_speed: 0.85,
                ai_reaction: 0.7,
                ai_error: 1.5,
            },
            Difficulty::Medium => DifficultyModifiers {
                paddle: 1.0,
                ball_speed: 1.0,
                ai_reaction: 1.0,
                ai_error: 1.0,
            },
            Difficulty::Hard => DifficultyModifiers {
                paddle: 0.8,
                ball_speed: 1.2,
                ai_reaction: 1.4,
                ai_error: 0.5,
            },
        }
    }
}

/// Per-difficulty scale factors
struct DifficultyModifiers {
    paddle: f32,
    ball_speed: f32,
    ai_reaction: f32,
    ai_error: f32,
}

/// Special level tags
///
/// Only `Boss`, `SpeedBoost` and `ShrinkingPaddle` are produced by the
/// generator; the others are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LevelModifier {
    Boss,
    SpeedBoost,
    ShrinkingPaddle,
    NarrowField,
    MultiBall,
}

/// Five level bands sharing a target score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LevelTier {
    Beginner,
    Rookie,
    Challenger,
    Expert,
    Master,
}

impl LevelTier {
    /// Tier containing `level`
    pub fn for_level(level: u32) -> Self {
        match level {
            ..=10 => LevelTier::Beginner,
            11..=25 => LevelTier::Rookie,
            26..=50 => LevelTier::Challenger,
            51..=75 => LevelTier::Expert,
            _ => LevelTier::Master,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LevelTier::Beginner => "BEGINNER",
            LevelTier::Rookie => "ROOKIE",
            LevelTier::Challenger => "CHALLENGER",
            LevelTier::Expert => "EXPERT",
            LevelTier::Master => "MASTER",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            LevelTier::Beginner => "#39ff14",
            LevelTier::Rookie => "#00ffff",
            LevelTier::Challenger => "#ff6b35",
            LevelTier::Expert => "#ff00ff",
            LevelTier::Master => "#9d00ff",
        }
    }

    /// Points needed to win a match in this tier
    pub fn target_score(&self) -> u32 {
        match self {
            LevelTier::Beginner => 5,
            LevelTier::Rookie => 7,
            LevelTier::Challenger => 10,
            LevelTier::Expert => 12,
            LevelTier::Master => 15,
        }
    }
}

/// Base ranges interpolated over level progress
mod base {
    pub const BALL_SPEED: (f32, f32) = (5.0, 12.0);
    pub const MAX_BALL_SPEED: (f32, f32) = (12.0, 20.0);
    pub const BALL_SPEED_INCREMENT: (f32, f32) = (0.2, 0.5);
    /// (hard end, easy end)
    pub const AI_REACTION: (f32, f32) = (0.04, 0.12);
    /// (accurate end, sloppy end), pixels
    pub const AI_ERROR: (f32, f32) = (10.0, 40.0);
    pub const AI_MAX_SPEED: (f32, f32) = (3.0, 7.0);
    pub const PADDLE_WIDTH: (f32, f32) = (1.1, 0.9);
}

pub const BOSS_LEVELS: [u32; 4] = [25, 50, 75, 100];

/// Fully resolved tuning for one level at one difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    pub level: u32,
    pub target_score: u32,
    pub ball_speed: f32,
    pub max_ball_speed: f32,
    pub ball_speed_increment: f32,
    /// Fraction of the gap closed per reference frame
    pub ai_reaction_speed: f32,
    /// Pixels of positional noise in the AI's target
    pub ai_prediction_error: f32,
    /// Pixels per reference frame
    pub ai_max_speed: f32,
    pub paddle_width_multiplier: f32,
    pub special_modifiers: Vec<LevelModifier>,
}

impl LevelConfig {
    /// Generate the config for `level` (expected in 1..=100)
    pub fn generate(level: u32, difficulty: Difficulty) -> Self {
        let progress = level.saturating_sub(1) as f32 / (MAX_LEVEL - 1) as f32;
        let eased = ease_in_quad(progress);
        let m = difficulty.modifiers();

        let ball_speed = lerp(base::BALL_SPEED.0, base::BALL_SPEED.1, eased) * m.ball_speed;
        let max_ball_speed =
            lerp(base::MAX_BALL_SPEED.0, base::MAX_BALL_SPEED.1, eased) * m.ball_speed;
        let ball_speed_increment = lerp(
            base::BALL_SPEED_INCREMENT.0,
            base::BALL_SPEED_INCREMENT.1,
            progress,
        );

        // Runs from the easy end toward the hard end
        let ai_reaction_speed =
            lerp(base::AI_REACTION.1, base::AI_REACTION.0, eased) * m.ai_reaction;
        let ai_prediction_error = lerp(base::AI_ERROR.1, base::AI_ERROR.0, progress) * m.ai_error;
        let ai_max_speed = lerp(base::AI_MAX_SPEED.0, base::AI_MAX_SPEED.1, progress);

        let paddle_width_multiplier =
            lerp(base::PADDLE_WIDTH.0, base::PADDLE_WIDTH.1, progress) * m.paddle;

        Self {
            level,
            target_score: LevelTier::for_level(level).target_score(),
            ball_speed,
            max_ball_speed,
            ball_speed_increment,
            ai_reaction_speed,
            ai_prediction_error,
            ai_max_speed,
            paddle_width_multiplier,
            special_modifiers: modifiers_for_level(level),
        }
    }

    pub fn has_modifier(&self, modifier: LevelModifier) -> bool {
        self.special_modifiers.contains(&modifier)
    }

    pub fn is_boss(&self) -> bool {
        self.has_modifier(LevelModifier::Boss)
    }
}

fn modifiers_for_level(level: u32) -> Vec<LevelModifier> {
    let mut modifiers = Vec::new();

    if BOSS_LEVELS.contains(&level) {
        modifiers.push(LevelModifier::Boss);
    } else if level >= 15 && level % 5 == 0 {
        modifiers.push(LevelModifier::SpeedBoost);
    }

    if level >= 60 && level % 7 == 0 {
        modifiers.push(LevelModifier::ShrinkingPaddle);
    }

    modifiers
}

/// Configs for levels 1..=100, in order (level select preview)
pub fn all_level_configs(difficulty: Difficulty) -> Vec<LevelConfig> {
    (1..=MAX_LEVEL)
        .map(|level| LevelConfig::generate(level, difficulty))
        .collect()
}

/// Named opponent for boss levels
pub fn boss_name(level: u32) -> Option<&'static str> {
    match level {
        25 => Some("THE WALL"),
        50 => Some("THE TWINS"),
        75 => Some("THE GHOST"),
        100 => Some("THE MASTER"),
        _ => None,
    }
}

pub fn level_tier(level: u32) -> &'static str {
    LevelTier::for_level(level).label()
}

pub fn tier_color(level: u32) -> &'static str {
    LevelTier::for_level(level).color()
}
