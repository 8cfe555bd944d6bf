//! Ball motion and collision math
//!
//! Everything here is a pure function of its arguments so it can run inside
//! a single simulation step without touching shared state.
//!
//! Coordinates are screen-space: x grows right, y grows down. The AI paddle
//! sits near the top edge and the player paddle near the bottom.

use glam::Vec2;
use rand::Rng;

use super::state::{Side, WallSide};
use crate::frame_normalization;

/// Advance a ball by one step
///
/// The velocity is treated as a direction only; `speed` is pixels per
/// reference frame. A zero velocity leaves the ball where it is.
pub fn update_ball_position(x: f32, y: f32, vx: f32, vy: f32, speed: f32, delta_ms: f32) -> Vec2 {
    let pos = Vec2::new(x, y);
    let magnitude = (vx * vx + vy * vy).sqrt();
    if magnitude == 0.0 {
        return pos;
    }

    let dir = Vec2::new(vx / magnitude, vy / magnitude);
    pos + dir * speed * frame_normalization(delta_ms)
}

/// Circle vs axis-aligned rectangle overlap
///
/// `paddle_x`/`paddle_y` are the rectangle's top-left corner.
pub fn check_paddle_collision(
    ball_x: f32,
    ball_y: f32,
    ball_radius: f32,
    paddle_x: f32,
    paddle_y: f32,
    paddle_width: f32,
    paddle_height: f32,
) -> bool {
    // Nearest point on the paddle to the ball center
    let closest_x = ball_x.min(paddle_x + paddle_width).max(paddle_x);
    let closest_y = ball_y.min(paddle_y + paddle_height).max(paddle_y);

    let dx = ball_x - closest_x;
    let dy = ball_y - closest_y;
    dx * dx + dy * dy < ball_radius * ball_radius
}

/// Bounce angle (radians from vertical) for a hit at `ball_x`
///
/// Center hits go straight back; edge hits deflect by up to `max_angle`
/// radians, positive to the right.
pub fn calculate_bounce_angle(
    ball_x: f32,
    paddle_x: f32,
    paddle_width: f32,
    max_angle: f32,
) -> f32 {
    let half_width = paddle_width / 2.0;
    let paddle_center = paddle_x + half_width;
    let hit = ((ball_x - paddle_center) / half_width).clamp(-1.0, 1.0);
    hit * max_angle
}

/// Side wall contact, left wins if both touch
pub fn check_wall_collision(ball_x: f32, ball_radius: f32, screen_width: f32) -> Option<WallSide> {
    if ball_x - ball_radius <= 0.0 {
        Some(WallSide::Left)
    } else if ball_x + ball_radius >= screen_width {
        Some(WallSide::Right)
    } else {
        None
    }
}

/// Which side scored, if the ball left the field
///
/// Leaving through the top means the AI missed. Top wins if both trigger.
pub fn check_scoring(ball_y: f32, ball_radius: f32, screen_height: f32) -> Option<Side> {
    if ball_y - ball_radius <= 0.0 {
        Some(Side::Player)
    } else if ball_y + ball_radius >= screen_height {
        Some(Side::Ai)
    } else {
        None
    }
}

/// Unit direction after a paddle hit
///
/// The player paddle always sends the ball up, the AI paddle always down.
pub fn calculate_paddle_bounce_velocity(
    ball_x: f32,
    paddle_x: f32,
    paddle_width: f32,
    max_angle: f32,
    is_player_paddle: bool,
) -> Vec2 {
    let angle = calculate_bounce_angle(ball_x, paddle_x, paddle_width, max_angle);
    let vy = angle.cos().abs();
    Vec2::new(
        angle.sin(),
        if is_player_paddle { -vy } else { vy },
    )
}

/// Direction for the opening serve of a match
pub fn random_start_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let sign_x = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let sign_y = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    // Offset in [-0.25, 0.25)
    let offset = (rng.random::<f32>() - 0.5) * 0.5;
    Vec2::new(sign_x * (0.5 + offset.abs()), sign_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const EPS: f32 = 1e-4;
    /// 60 degrees
    const MAX: f32 = std::f32::consts::FRAC_PI_3;

    #[test]
    fn test_update_ball_position_zero_velocity() {
        let pos = update_ball_position(100.0, 100.0, 0.0, 0.0, 10.0, 16.67);
        assert_eq!(pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_update_ball_position_normalizes() {
        let pos = update_ball_position(100.0, 100.0, 3.0, 4.0, 10.0, 16.67);
        let moved = pos - Vec2::new(100.0, 100.0);
        assert!((moved.length() - 10.0).abs() < EPS);
        assert!((moved.x - 6.0).abs() < EPS);
        assert!((moved.y - 8.0).abs() < EPS);
    }

    #[test]
    fn test_update_ball_position_frame_rate_independent() {
        // Two 30 fps steps cover the same ground as four 60 fps steps
        let slow = update_ball_position(0.0, 0.0, 0.0, -1.0, 6.0, 33.34);
        let mut fast = Vec2::ZERO;
        for _ in 0..2 {
            fast = update_ball_position(fast.x, fast.y, 0.0, -1.0, 6.0, 16.67);
        }
        assert!((slow.y - fast.y).abs() < EPS);
        assert!(slow.y < 0.0);
    }

    #[test]
    fn test_paddle_collision() {
        // Paddle at (100, 700), 100x16
        assert!(check_paddle_collision(150.0, 705.0, 12.0, 100.0, 700.0, 100.0, 16.0));
        // Touching the top edge from above
        assert!(check_paddle_collision(150.0, 690.0, 12.0, 100.0, 700.0, 100.0, 16.0));
        // Far away
        assert!(!check_paddle_collision(150.0, 400.0, 12.0, 100.0, 700.0, 100.0, 16.0));
        // Misses horizontally
        assert!(!check_paddle_collision(50.0, 705.0, 12.0, 100.0, 700.0, 100.0, 16.0));
        // Corner overlap
        assert!(check_paddle_collision(95.0, 695.0, 12.0, 100.0, 700.0, 100.0, 16.0));
        // Exactly radius away is not a hit
        assert!(!check_paddle_collision(150.0, 688.0, 12.0, 100.0, 700.0, 100.0, 16.0));
    }

    #[test]
    fn test_bounce_angle() {
        assert_eq!(calculate_bounce_angle(150.0, 100.0, 100.0, MAX), 0.0);
        assert!(calculate_bounce_angle(175.0, 100.0, 100.0, MAX) > 0.0);
        assert!(calculate_bounce_angle(125.0, 100.0, 100.0, MAX) < 0.0);

        let max = 60.0 * std::f32::consts::PI / 180.0;
        assert!((calculate_bounce_angle(200.0, 100.0, 100.0, MAX) - max).abs() < EPS);
        assert!((calculate_bounce_angle(100.0, 100.0, 100.0, MAX) + max).abs() < EPS);
        // Beyond the edges clamps
        assert!((calculate_bounce_angle(500.0, 100.0, 100.0, MAX) - max).abs() < EPS);
        assert!((calculate_bounce_angle(-500.0, 100.0, 100.0, MAX) + max).abs() < EPS);
    }

    #[test]
    fn test_bounce_angle_custom_limit() {
        let max = 45f32.to_radians();
        assert!((calculate_bounce_angle(200.0, 100.0, 100.0, max) - max).abs() < EPS);
        // Quarter of the way from center to edge
        assert!((calculate_bounce_angle(162.5, 100.0, 100.0, max) - max / 4.0).abs() < EPS);

        let v = calculate_paddle_bounce_velocity(200.0, 100.0, 100.0, max, true);
        assert!((v.x - v.y.abs()).abs() < EPS);
    }

    #[test]
    fn test_wall_collision() {
        assert_eq!(check_wall_collision(5.0, 10.0, 400.0), Some(WallSide::Left));
        assert_eq!(check_wall_collision(395.0, 10.0, 400.0), Some(WallSide::Right));
        assert_eq!(check_wall_collision(200.0, 10.0, 400.0), None);
        // Boundaries are inclusive
        assert_eq!(check_wall_collision(10.0, 10.0, 400.0), Some(WallSide::Left));
        assert_eq!(check_wall_collision(390.0, 10.0, 400.0), Some(WallSide::Right));
        // Degenerate field: left takes precedence
        assert_eq!(check_wall_collision(5.0, 10.0, 8.0), Some(WallSide::Left));
    }

    #[test]
    fn test_scoring() {
        assert_eq!(check_scoring(5.0, 10.0, 800.0), Some(Side::Player));
        assert_eq!(check_scoring(795.0, 10.0, 800.0), Some(Side::Ai));
        assert_eq!(check_scoring(400.0, 10.0, 800.0), None);
        assert_eq!(check_scoring(10.0, 10.0, 800.0), Some(Side::Player));
        assert_eq!(check_scoring(790.0, 10.0, 800.0), Some(Side::Ai));
        assert_eq!(check_scoring(5.0, 10.0, 8.0), Some(Side::Player));
    }

    #[test]
    fn test_paddle_bounce_velocity() {
        let up = calculate_paddle_bounce_velocity(150.0, 100.0, 100.0, MAX, true);
        assert!(up.y < 0.0);
        assert!(up.x.abs() < EPS);

        let down = calculate_paddle_bounce_velocity(150.0, 100.0, 100.0, MAX, false);
        assert!(down.y > 0.0);

        assert!(calculate_paddle_bounce_velocity(180.0, 100.0, 100.0, MAX, true).x > 0.0);
        assert!(calculate_paddle_bounce_velocity(120.0, 100.0, 100.0, MAX, true).x < 0.0);
    }

    #[test]
    fn test_random_start_direction_seeded() {
        let mut a = Pcg32::seed_from_u64(7);
        let mut b = Pcg32::seed_from_u64(7);
        for _ in 0..32 {
            let dir = random_start_direction(&mut a);
            assert_eq!(dir, random_start_direction(&mut b));
            assert!(dir.x.abs() >= 0.5 && dir.x.abs() <= 0.75);
            assert_eq!(dir.y.abs(), 1.0);
        }
    }

    proptest! {
        #[test]
        fn prop_bounce_velocity_is_unit(
            ball_x in -200.0f32..600.0,
            paddle_x in 0.0f32..300.0,
            width in 20.0f32..200.0,
            max_deg in 1.0f32..89.0,
            is_player in any::<bool>(),
        ) {
            let v = calculate_paddle_bounce_velocity(
                ball_x,
                paddle_x,
                width,
                max_deg.to_radians(),
                is_player,
            );
            prop_assert!((v.length() - 1.0).abs() < 1e-4);
            prop_assert_eq!(v.y < 0.0, is_player);
        }

        #[test]
        fn prop_bounce_angle_bounded(
            ball_x in -1000.0f32..1000.0,
            paddle_x in 0.0f32..300.0,
            width in 1.0f32..200.0,
            max_deg in 1.0f32..89.0,
        ) {
            let max = max_deg.to_radians();
            let angle = calculate_bounce_angle(ball_x, paddle_x, width, max);
            prop_assert!(angle.abs() <= max + 1e-6);
        }

        #[test]
        fn prop_step_length_matches_speed(
            vx in -10.0f32..10.0,
            vy in -10.0f32..10.0,
            speed in 0.0f32..30.0,
        ) {
            prop_assume!(vx.abs() > 0.01 || vy.abs() > 0.01);
            let pos = update_ball_position(0.0, 0.0, vx, vy, speed, 16.67);
            prop_assert!((pos.length() - speed).abs() < 1e-3);
        }
    }
}
