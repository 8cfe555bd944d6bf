//! Computer opponent
//!
//! A memoryless reactive controller: each step the paddle chases a noisy
//! reading of the ball's x-position. There is no trajectory extrapolation;
//! the "prediction error" is pure positional noise and is the only reason
//! the AI ever misses.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::LoopParams;
use crate::frame_normalization;

/// Tracking intensity while the ball heads away from the AI
const RELAXED_TRACKING: f32 = 0.3;

/// AI tuning taken from the active level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    /// Fraction of the remaining gap closed per reference frame
    pub reaction_speed: f32,
    /// Max noise added to the ball's x, in pixels
    pub prediction_error: f32,
    /// Pixels per reference frame
    pub max_speed: f32,
}

impl From<&LoopParams> for AiConfig {
    fn from(params: &LoopParams) -> Self {
        Self {
            reaction_speed: params.ai_reaction_speed,
            prediction_error: params.ai_prediction_error,
            max_speed: params.ai_max_speed,
        }
    }
}

/// New left edge for the AI paddle
///
/// Noise is drawn from `rng` on every call. Only the ball's x-position and
/// vertical direction matter, so the ball's y-position is not taken.
#[allow(clippy::too_many_arguments)]
pub fn update_paddle<R: Rng + ?Sized>(
    current_x: f32,
    paddle_width: f32,
    ball_x: f32,
    ball_velocity_y: f32,
    screen_width: f32,
    delta_ms: f32,
    config: &AiConfig,
    rng: &mut R,
) -> f32 {
    // The AI sits at the top, so negative vy means the ball is incoming
    let tracking = if ball_velocity_y < 0.0 {
        1.0
    } else {
        RELAXED_TRACKING
    };

    let paddle_center = current_x + paddle_width / 2.0;
    let error = (rng.random::<f32>() - 0.5) * 2.0 * config.prediction_error;
    let target_x = ball_x + error;

    let diff = target_x - paddle_center;
    let frame_norm = frame_normalization(delta_ms);
    let step = (diff.abs() * config.reaction_speed * tracking * frame_norm)
        .min(config.max_speed * frame_norm);

    let new_x = current_x + step.copysign(diff);
    new_x.clamp(0.0, (screen_width - paddle_width).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::seeded_rng;

    fn exact(reaction: f32, max_speed: f32) -> AiConfig {
        AiConfig {
            reaction_speed: reaction,
            prediction_error: 0.0,
            max_speed,
        }
    }

    #[test]
    fn test_moves_toward_ball() {
        let mut rng = seeded_rng(1);
        // Paddle centered at 200, ball at 300, incoming
        let x = update_paddle(150.0, 100.0, 300.0, -1.0, 400.0, 16.67, &exact(0.1, 50.0), &mut rng);
        assert!((x - 160.0).abs() < 1e-3);

        let x = update_paddle(150.0, 100.0, 100.0, -1.0, 400.0, 16.67, &exact(0.1, 50.0), &mut rng);
        assert!((x - 140.0).abs() < 1e-3);
    }

    #[test]
    fn test_relaxes_when_ball_moves_away() {
        let mut rng = seeded_rng(1);
        let incoming = update_paddle(150.0, 100.0, 300.0, -1.0, 400.0, 16.67, &exact(0.1, 50.0), &mut rng);
        let outgoing = update_paddle(150.0, 100.0, 300.0, 1.0, 400.0, 16.67, &exact(0.1, 50.0), &mut rng);
        assert!((incoming - 150.0) > (outgoing - 150.0));
        assert!((outgoing - 153.0).abs() < 1e-3);
    }

    #[test]
    fn test_speed_capped() {
        let mut rng = seeded_rng(1);
        let x = update_paddle(0.0, 100.0, 390.0, -1.0, 400.0, 16.67, &exact(1.0, 5.0), &mut rng);
        assert!((x - 5.0).abs() < 1e-3);

        // Double frame time doubles the cap
        let x = update_paddle(0.0, 100.0, 390.0, -1.0, 400.0, 33.34, &exact(1.0, 5.0), &mut rng);
        assert!((x - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_clamped_to_field() {
        let mut rng = seeded_rng(1);
        let x = update_paddle(298.0, 100.0, 400.0, -1.0, 400.0, 16.67, &exact(1.0, 50.0), &mut rng);
        assert_eq!(x, 300.0);
        let x = update_paddle(2.0, 100.0, 0.0, -1.0, 400.0, 16.67, &exact(1.0, 50.0), &mut rng);
        assert_eq!(x, 0.0);
    }

    #[test]
    fn test_noise_is_resampled_and_bounded() {
        let config = AiConfig {
            reaction_speed: 1.0,
            prediction_error: 30.0,
            max_speed: 1000.0,
        };
        let mut rng = seeded_rng(99);
        let mut seen = Vec::new();
        for _ in 0..50 {
            // Full reaction moves the center straight onto the noisy target
            let x = update_paddle(150.0, 100.0, 200.0, -1.0, 400.0, 16.67, &config, &mut rng);
            let offset = x + 50.0 - 200.0;
            assert!(offset.abs() <= 30.0 + 1e-3);
            seen.push(offset);
        }
        assert!(seen.windows(2).any(|w| (w[0] - w[1]).abs() > 1e-3));
    }

    #[test]
    fn test_same_seed_same_moves() {
        let config = AiConfig {
            reaction_speed: 0.08,
            prediction_error: 30.0,
            max_speed: 5.0,
        };
        let mut a = seeded_rng(5);
        let mut b = seeded_rng(5);
        let (mut xa, mut xb) = (150.0, 150.0);
        for i in 0..100 {
            let ball_x = (i * 7 % 400) as f32;
            xa = update_paddle(xa, 100.0, ball_x, -1.0, 400.0, 16.67, &config, &mut a);
            xb = update_paddle(xb, 100.0, ball_x, -1.0, 400.0, 16.67, &config, &mut b);
        }
        assert_eq!(xa, xb);
    }
}
