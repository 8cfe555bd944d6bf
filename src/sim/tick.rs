//! Per-frame match loop
//!
//! Advances the ball, resolves collisions, moves the AI and queues events.
//! Exactly one writer owns the state; the host calls [`MatchLoop::step`] once
//! per frame and drains events afterwards.

use glam::Vec2;
use rand::Rng;

use super::ai::{self, AiConfig};
use super::physics::{
    calculate_paddle_bounce_velocity, check_paddle_collision, check_scoring,
    check_wall_collision, random_start_direction, update_ball_position,
};
use super::state::{
    FieldGeometry, GameEvent, LoopParams, Side, SimRng, SimulationState, Snapshot, WallSide,
    seeded_rng,
};

/// Owns the simulation state for one match
#[derive(Debug, Clone)]
pub struct MatchLoop {
    field: FieldGeometry,
    params: LoopParams,
    state: SimulationState,
    rng: SimRng,
    events: Vec<GameEvent>,
}

impl MatchLoop {
    /// Create a loop with default tuning and a seeded RNG
    pub fn new(field: FieldGeometry, seed: u64) -> Self {
        let params = LoopParams::default();
        Self {
            state: SimulationState::new(&field, &params),
            field,
            params,
            rng: seeded_rng(seed),
            events: Vec::new(),
        }
    }

    pub fn field(&self) -> &FieldGeometry {
        &self.field
    }

    pub fn params(&self) -> &LoopParams {
        &self.params
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Width of the player paddle under the current level's multiplier
    pub fn player_paddle_width(&self) -> f32 {
        self.field.paddle_width * self.params.paddle_width_multiplier
    }

    /// Swap in new level tuning; the ball drops back to the new initial speed
    pub fn load_params(&mut self, params: LoopParams) {
        self.params = params;
        self.state.ball_speed = params.initial_ball_speed;
        // A narrower paddle may now overhang the right edge
        self.state.player_paddle_x = self
            .field
            .clamp_paddle_x(self.state.player_paddle_x, self.player_paddle_width());
    }

    /// Pause/resume stepping without touching positions
    pub fn set_playing(&mut self, playing: bool) {
        self.state.is_playing = playing;
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    /// Last write wins; read at the start of the next step
    pub fn set_player_paddle_x(&mut self, x: f32) {
        self.state.player_paddle_x = self.field.clamp_paddle_x(x, self.player_paddle_width());
    }

    /// Center ball and paddles with the ball at rest; draws nothing from the RNG
    pub fn center(&mut self) {
        self.state.ball_pos = self.field.center();
        self.state.ball_vel = Vec2::ZERO;
        self.state.ball_speed = self.params.initial_ball_speed;
        self.state.player_paddle_x = self.field.centered_paddle_x(self.player_paddle_width());
        self.state.ai_paddle_x = self.field.centered_paddle_x(self.field.paddle_width);
    }

    /// Center everything and pick a random opening direction
    pub fn reset(&mut self) {
        self.center();
        self.state.ball_vel = random_start_direction(&mut self.rng);
    }

    /// Re-center the ball after a point, heading toward the side that conceded
    pub fn serve(&mut self, scored_against: Side) {
        self.state.ball_pos = self.field.center();
        self.state.ball_speed = self.params.initial_ball_speed;
        let vx = if self.rng.random_bool(0.5) { 0.5 } else { -0.5 };
        let vy = match scored_against {
            Side::Player => 1.0,
            Side::Ai => -1.0,
        };
        self.state.ball_vel = Vec2::new(vx, vy);
    }

    /// Advance one frame; a no-op while paused
    pub fn step(&mut self, delta_ms: f32) {
        if !self.state.is_playing {
            return;
        }

        let field = self.field;
        let radius = field.ball_radius;
        let player_width = self.player_paddle_width();
        let s = &mut self.state;

        let mut next = update_ball_position(
            s.ball_pos.x,
            s.ball_pos.y,
            s.ball_vel.x,
            s.ball_vel.y,
            s.ball_speed,
            delta_ms,
        );

        if let Some(wall) = check_wall_collision(next.x, radius, field.width) {
            s.ball_vel.x = -s.ball_vel.x;
            next.x = match wall {
                WallSide::Left => radius,
                WallSide::Right => field.width - radius,
            };
            self.events.push(GameEvent::WallBounce);
        }

        // Player paddle, only while the ball is falling
        let player_y = field.player_paddle_y();
        if s.ball_vel.y > 0.0
            && check_paddle_collision(
                next.x,
                next.y,
                radius,
                s.player_paddle_x,
                player_y,
                player_width,
                field.paddle_height,
            )
        {
            s.ball_vel = calculate_paddle_bounce_velocity(
                next.x,
                s.player_paddle_x,
                player_width,
                field.max_bounce_angle(),
                true,
            );
            s.ball_speed =
                (s.ball_speed + self.params.ball_speed_increment).min(self.params.max_ball_speed);
            next.y = player_y - radius;
            self.events.push(GameEvent::PaddleHit { is_player: true });
        }

        // AI paddle, only while the ball is rising
        let ai_y = field.ai_paddle_y();
        if s.ball_vel.y < 0.0
            && check_paddle_collision(
                next.x,
                next.y,
                radius,
                s.ai_paddle_x,
                ai_y,
                field.paddle_width,
                field.paddle_height,
            )
        {
            s.ball_vel = calculate_paddle_bounce_velocity(
                next.x,
                s.ai_paddle_x,
                field.paddle_width,
                field.max_bounce_angle(),
                false,
            );
            s.ball_speed =
                (s.ball_speed + self.params.ball_speed_increment).min(self.params.max_ball_speed);
            next.y = ai_y + field.paddle_height + radius;
            self.events.push(GameEvent::PaddleHit { is_player: false });
        }

        if let Some(scorer) = check_scoring(next.y, radius, field.height) {
            log::debug!("Point to {:?}", scorer);
            self.events.push(GameEvent::Score(scorer));
            self.serve(scorer.opponent());
            return;
        }

        s.ai_paddle_x = ai::update_paddle(
            s.ai_paddle_x,
            field.paddle_width,
            next.x,
            s.ball_vel.y,
            field.width,
            delta_ms,
            &AiConfig::from(&self.params),
            &mut self.rng,
        );
        s.ball_pos = next;
    }

    /// Take the events queued since the last drain, in emission order
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Positions for the renderer
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            ball: self.state.ball_pos,
            player_paddle: Vec2::new(self.state.player_paddle_x, self.field.player_paddle_y()),
            player_paddle_width: self.player_paddle_width(),
            ai_paddle: Vec2::new(self.state.ai_paddle_x, self.field.ai_paddle_y()),
            ai_paddle_width: self.field.paddle_width,
        }
    }

    /// Direct state access for hosts restoring a position (and for tests)
    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }
}
