//! Orbit law
//!
//! Drives around the ball so the robot ends up behind it, facing the goal.
//!
//! The approach angle is worked out on the side the ball is on, as a relative
//! bearing in `[0, 180]`:
//! - Far ball: head (roughly) straight at it. Near dead ahead the bearing is
//!   tightened so the robot does not overshoot sideways.
//! - Near ball: move perpendicular to it, 90° further round than the bearing, to
//!   swing behind it.
//!
//! Strengths between the two bands blend linearly between both targets.

use super::Movement;
use crate::config::ControlConfig;
use crate::sensing::ball::BallObservation;

/// Movement that circles onto the ball; stops when no ball is seen
pub fn orbit(ball: &BallObservation, config: &ControlConfig) -> Movement {
    let Some(bearing) = ball.bearing else {
        return Movement::STOP;
    };

    let bearing = bearing as f32;
    let (relative, right) = if bearing < 180.0 {
        (bearing, true)
    } else {
        (360.0 - bearing, false)
    };

    let far = far_target(relative, config);
    let near = (relative + 90.0).min(180.0);
    let target = far + closeness(ball.strength, config) * (near - far);

    let angle = if right { target } else { 360.0 - target };
    Movement::new(angle, config.orbit_speed as f32)
}

/// Approach angle for a far ball at `relative` degrees off the nose
fn far_target(relative: f32, config: &ControlConfig) -> f32 {
    let tightener = config.orbit_tightener;
    if relative <= config.orbit_small_angle {
        relative * tightener
    } else if relative <= config.orbit_big_angle {
        let blend = (relative - config.orbit_small_angle) / (config.orbit_big_angle - config.orbit_small_angle);
        relative * (tightener + (1.0 - tightener) * blend)
    } else {
        relative
    }
}

/// 0 for a far ball, 1 for a near one
fn closeness(strength: u16, config: &ControlConfig) -> f32 {
    if strength > config.orbit_short_strength {
        1.0
    } else if strength > config.orbit_big_strength {
        (strength - config.orbit_big_strength) as f32
            / (config.orbit_short_strength - config.orbit_big_strength) as f32
    } else {
        0.0
    }
}
