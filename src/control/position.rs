//! Positioning laws: centre (attacker without ball) and defend
//!
//! Both hold a distance to a goal and correct sideways to line up with it. The
//! corrections are built as an `(x, y)` vector, x to the right and y forward,
//! each axis clamped on its own before converting back to angle and speed.

use libm::{atan2f, fabsf, hypotf, sinf};

use super::orbit::orbit;
use super::Movement;
use crate::angle;
use crate::config::{ControlConfig, PositionGains};
use crate::sensing::ball::BallObservation;
use crate::sensing::goal::GoalObservation;

/// Turns a clamped correction vector into a movement
fn vector_movement(x: f32, y: f32, gains: &PositionGains, max_speed: f32) -> Movement {
    let x = x.clamp(-gains.sideways_max_speed, gains.sideways_max_speed);
    let y = y.clamp(-gains.distance_max_speed, gains.distance_max_speed);
    let speed = hypotf(x, y).min(max_speed);
    if speed == 0.0 {
        return Movement::STOP;
    }
    Movement::new(angle::from_radians(atan2f(x, y)), speed)
}

/// Sideways correction to bring an angle onto the centre line
fn sideways(offset: f32, gains: &PositionGains) -> f32 {
    if fabsf(offset) > gains.angle_buffer {
        sinf(angle::to_radians(offset)) * gains.sideways_multiplier
    } else {
        0.0
    }
}

/// Waits in front of the attacking goal while the partner has the ball
///
/// Needs the goal in sight and the robot roughly facing up the field;
/// stands still otherwise.
pub fn centre(goal: &GoalObservation, heading: f32, config: &ControlConfig) -> Movement {
    if !goal.is_tracked() || angle::distance(heading, 0.0) >= config.centre_facing_angle {
        return Movement::STOP;
    }

    let gains = &config.centre;
    let distance_error = if goal.distance > config.centre_goal_distance + config.centre_goal_distance_buffer {
        goal.distance - config.centre_goal_distance
    } else if goal.distance < config.centre_goal_distance_close {
        goal.distance - config.centre_goal_distance_close
    } else {
        0.0
    };

    let y = distance_error * gains.distance_multiplier;
    let x = sideways(goal.angle, gains);
    vector_movement(x, y, gains, config.max_speed as f32)
}

/// Guards the own goal
///
/// The defender faces its own goal, so the law works in the turned-around frame
/// (ball bearing + 180, y pointing out of the goal) and turns the result back.
pub fn defend(ball: &BallObservation, goal: &GoalObservation, config: &ControlConfig) -> Movement {
    let ball_from_goal = ball.bearing.map(|b| angle::normalize(b as f32 + 180.0));
    let mirrored_ball = BallObservation {
        bearing: ball_from_goal.map(angle::to_degrees_u16),
        strength: ball.strength,
    };

    let movement = if goal.is_tracked() {
        match ball_from_goal {
            Some(bearing)
                if angle::distance(bearing, 0.0) < config.defend_charge_angle
                    && ball.strength > config.defend_charge_strength =>
            {
                // Close ball in front of the goal: go and clear it
                orbit(&mirrored_ball, config)
            }
            Some(bearing) => {
                let x = sideways(angle::signed_difference(bearing, 0.0), &config.defend);
                hold_distance(x, goal, config)
            }
            None if fabsf(goal.angle) > config.defend.angle_buffer => {
                let x = -sinf(angle::to_radians(goal.angle)) * config.defend.sideways_multiplier;
                vector_movement(x, 0.0, &config.defend, config.max_speed as f32)
            }
            None => hold_distance(0.0, goal, config),
        }
    } else if ball.bearing.is_some() {
        orbit(&mirrored_ball, config)
    } else {
        Movement::STOP
    };

    movement.mirrored()
}

/// Keeps the defending distance, y pointing away from the goal
fn hold_distance(x: f32, goal: &GoalObservation, config: &ControlConfig) -> Movement {
    let target = config.defend_goal_distance;
    let buffer = config.defend_goal_distance_buffer;
    let error = target - goal.distance;
    let y = if fabsf(error) > buffer {
        error * config.defend.distance_multiplier
    } else {
        0.0
    };
    vector_movement(x, y, &config.defend, config.max_speed as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensing::goal::GoalStatus;

    fn goal(angle: f32, distance: f32) -> GoalObservation {
        GoalObservation {
            status: GoalStatus::Visible,
            angle,
            distance,
        }
    }

    #[test]
    fn centre_needs_goal_and_forward_heading() {
        let config = ControlConfig::default();
        assert_eq!(centre(&GoalObservation::INVISIBLE, 0.0, &config), Movement::STOP);
        assert_eq!(centre(&goal(0.0, 90.0), 45.0, &config), Movement::STOP);
    }

    #[test]
    fn centre_drives_towards_far_goal() {
        let movement = centre(&goal(0.0, 21.0), 0.0, &ControlConfig::default());
        assert_eq!(movement.angle, 0.0);
        assert_eq!(movement.speed, 100.0);
    }

    #[test]
    fn centre_backs_off_when_too_close() {
        let movement = centre(&goal(0.0, 4.0), 0.0, &ControlConfig::default());
        assert!(angle::distance(movement.angle, 180.0) < 0.01);
        assert_eq!(movement.speed, 50.0);
    }

    #[test]
    fn centre_holds_inside_band() {
        let movement = centre(&goal(1.0, 10.0), 0.0, &ControlConfig::default());
        assert_eq!(movement, Movement::STOP);
    }

    #[test]
    fn centre_axes_are_clamped_separately() {
        let config = ControlConfig::default();
        let movement = centre(&goal(30.0, 200.0), 0.0, &config);
        // x = sin(30°) * 400 = 200, y clamped to 255
        let expected = angle::from_radians(atan2f(200.0, 255.0));
        assert!((movement.angle - expected).abs() < 0.01);
        assert_eq!(movement.speed, 255.0);
    }

    #[test]
    fn defender_backs_into_position() {
        // Goal straight ahead (the robot faces it) and too far away
        let movement = defend(&BallObservation::NONE, &goal(0.0, 60.0), &ControlConfig::default());
        assert!(angle::distance(movement.angle, 0.0) < 0.01);
        assert_eq!(movement.speed, 100.0);
    }

    #[test]
    fn defender_moves_away_from_goal_when_too_close() {
        let movement = defend(&BallObservation::NONE, &goal(0.0, 40.0), &ControlConfig::default());
        assert!(angle::distance(movement.angle, 180.0) < 0.01);
    }

    #[test]
    fn defender_sidesteps_to_centre_without_ball() {
        let config = ControlConfig::default();
        let movement = defend(&BallObservation::NONE, &goal(10.0, 50.0), &config);
        // Goal to the right of the robot: move right
        assert!(angle::distance(movement.angle, 90.0) < 0.01);
        assert!(movement.speed > 0.0);
    }

    #[test]
    fn defender_tracks_ball_sideways() {
        let config = ControlConfig::default();
        // Ball out in the field behind the defender's right shoulder
        let ball = BallObservation::new(Some(150), 80);
        let movement = defend(&ball, &goal(0.0, 50.0), &config);
        assert!(angle::distance(movement.angle, 90.0) < 0.01);
        assert_eq!(movement.speed, config.defend.sideways_max_speed);
    }

    #[test]
    fn defender_charges_close_ball() {
        let config = ControlConfig::default();
        let ball = BallObservation::new(Some(180), 160);
        let movement = defend(&ball, &goal(0.0, 50.0), &config);
        // Orbit on the turned-around bearing (0), then turned back
        assert!(angle::distance(movement.angle, 270.0) < 0.01);
        assert_eq!(movement.speed, config.orbit_speed as f32);
    }

    #[test]
    fn defender_without_goal_or_ball_stops() {
        let movement = defend(&BallObservation::NONE, &GoalObservation::INVISIBLE, &ControlConfig::default());
        assert_eq!(movement.speed, 0.0);
    }
}
