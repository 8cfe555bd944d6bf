//! Deterministic simulation module
//!
//! All gameplay math lives here. This module must stay deterministic:
//! - Caller-supplied frame time only
//! - Seeded RNG only
//! - No rendering, audio or storage dependencies

pub mod ai;
pub mod physics;
pub mod state;
pub mod tick;

pub use ai::{AiConfig, update_paddle};
pub use physics::{
    calculate_bounce_angle, calculate_paddle_bounce_velocity, check_paddle_collision,
    check_scoring, check_wall_collision, random_start_direction, update_ball_position,
};
pub use state::{
    FieldError, FieldGeometry, GameEvent, LoopParams, Side, SimRng, SimulationState, Snapshot,
    WallSide, seeded_rng,
};
pub use tick::MatchLoop;
