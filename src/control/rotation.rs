//! Facing and rotation correction
//!
//! The robot drives omnidirectionally, so where it faces is decided separately
//! from where it moves. [`facing`] picks the field direction to face, and
//! [`correction`] turns the heading error into a rotation command with a PD law.

use super::ControlInputs;
use crate::angle;
use crate::config::ControlConfig;
use crate::system::state::PlayMode;

/// Field direction to face and whether it tracks the goal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facing {
    pub direction: f32,
    /// Facing the goal, use the goal gains
    pub goal: bool,
}

impl Facing {
    fn fixed(direction: f32) -> Self {
        Self {
            direction,
            goal: false,
        }
    }
}

/// Chooses the direction to face
///
/// Attacking, the robot turns towards the goal as the ball gets close: fully above
/// the short strength, blended between the two strengths, forward below. Defending,
/// it faces its goal while it can see the ball and faces backwards otherwise.
pub fn facing(inputs: &ControlInputs, config: &ControlConfig) -> Facing {
    let goal_direction = angle::normalize(inputs.heading + inputs.goal.angle);
    let play = inputs.play;

    match play.mode {
        PlayMode::Defend => {
            if inputs.ball.is_visible() && inputs.goal.is_tracked() {
                Facing {
                    direction: goal_direction,
                    goal: true,
                }
            } else {
                Facing::fixed(180.0)
            }
        }
        _ if play.attacking_backwards => Facing::fixed(180.0),
        _ => {
            let strength = inputs.ball.strength;
            if !inputs.goal.is_tracked() || !inputs.ball.is_visible() || strength <= config.face_goal_big_strength {
                return Facing::fixed(0.0);
            }
            let factor = if strength >= config.face_goal_short_strength {
                1.0
            } else {
                (strength - config.face_goal_big_strength) as f32
                    / (config.face_goal_short_strength - config.face_goal_big_strength) as f32
            };
            Facing {
                direction: angle::blend(0.0, goal_direction, factor),
                goal: true,
            }
        }
    }
}

/// PD rotation towards `facing`, positive is clockwise
///
/// `rate` is the heading change since the last cycle. Corrections below the
/// minimum are dropped, larger ones are clamped to the maximum.
pub fn correction(heading: f32, rate: f32, facing: &Facing, config: &ControlConfig) -> i16 {
    let (p, d) = if facing.goal {
        (config.rotation_p_goal, config.rotation_d_goal)
    } else {
        (config.rotation_p, config.rotation_d)
    };

    let error = angle::signed_difference(facing.direction, heading);
    let rotation = p * error - d * rate;

    if libm::fabsf(rotation) < config.rotation_minimum {
        return 0;
    }
    libm::roundf(rotation.clamp(-config.rotation_maximum, config.rotation_maximum)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensing::ball::BallObservation;
    use crate::sensing::goal::{GoalObservation, GoalStatus};
    use crate::system::state::PlayState;

    fn attacking(strength: u16, goal_angle: f32) -> ControlInputs {
        ControlInputs {
            play: PlayState {
                mode: PlayMode::Attack,
                attacking_backwards: false,
            },
            ball: BallObservation::new(Some(0), strength),
            goal: GoalObservation {
                status: GoalStatus::Visible,
                angle: goal_angle,
                distance: 50.0,
            },
            ..ControlInputs::default()
        }
    }

    #[test]
    fn dead_zone() {
        let config = ControlConfig::default();
        assert_eq!(correction(0.0, 0.0, &Facing::fixed(0.5), &config), 0);
        assert_eq!(correction(359.5, 0.0, &Facing::fixed(0.0), &config), 0);
    }

    #[test]
    fn saturates_both_ways() {
        let config = ControlConfig::default();
        assert_eq!(correction(0.0, 0.0, &Facing::fixed(90.0), &config), 170);
        assert_eq!(correction(0.0, 0.0, &Facing::fixed(270.0), &config), -170);
    }

    #[test]
    fn proportional_and_damped() {
        let config = ControlConfig::default();
        assert_eq!(correction(0.0, 0.0, &Facing::fixed(10.0), &config), 25);
        assert_eq!(correction(0.0, 5.0, &Facing::fixed(10.0), &config), 15);
        let goal = Facing {
            direction: 10.0,
            goal: true,
        };
        assert_eq!(correction(0.0, 0.0, &goal, &config), 17);
    }

    #[test]
    fn attacker_faces_goal_with_close_ball() {
        let config = ControlConfig::default();
        let facing = facing(&attacking(130, 20.0), &config);
        assert_eq!(facing.direction, 20.0);
        assert!(facing.goal);
    }

    #[test]
    fn attacker_blends_between_strengths() {
        let config = ControlConfig::default();
        let facing = facing(&attacking(115, 20.0), &config);
        assert!((facing.direction - 10.0).abs() < 0.01);
    }

    #[test]
    fn attacker_faces_forward_with_far_ball() {
        let config = ControlConfig::default();
        assert_eq!(facing(&attacking(100, 20.0), &config), Facing::fixed(0.0));
    }

    #[test]
    fn defender_faces_backwards_without_ball() {
        let config = ControlConfig::default();
        let mut inputs = attacking(0, 0.0);
        inputs.play.mode = PlayMode::Defend;
        inputs.ball = BallObservation::NONE;
        assert_eq!(facing(&inputs, &config), Facing::fixed(180.0));

        inputs.ball = BallObservation::new(Some(180), 60);
        inputs.heading = 170.0;
        inputs.goal.angle = 5.0;
        let facing = facing(&inputs, &config);
        assert_eq!(facing.direction, 175.0);
        assert!(facing.goal);
    }

    #[test]
    fn attacking_backwards_keeps_facing_own_goal() {
        let config = ControlConfig::default();
        let mut inputs = attacking(150, 0.0);
        inputs.play.attacking_backwards = true;
        assert_eq!(facing(&inputs, &config), Facing::fixed(180.0));
    }
}
