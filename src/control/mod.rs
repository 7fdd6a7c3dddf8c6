//! Control laws
//!
//! One [`MovementCommand`] per cycle, computed as a pure function of what the robot
//! currently knows. The law is picked by role:
//!
//! | role                | ball seen           | no ball |
//! |---------------------|---------------------|---------|
//! | attack / undecided  | orbit               | centre  |
//! | attacking backwards | orbit, turned round | stop    |
//! | defend              | defend              | defend  |
//!
//! The line override runs on top of the chosen law, and the rotation correction
//! runs last.

pub mod avoid;
pub mod orbit;
pub mod position;
pub mod rotation;

use crate::angle;
use crate::config::ControlConfig;
use crate::sensing::ball::BallObservation;
use crate::sensing::goal::GoalObservation;
use crate::sensing::line::LineObservation;
use crate::system::state::{PlayMode, PlayState};

/// Command handed to the motor controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "firmware", derive(defmt::Format))]
pub struct MovementCommand {
    /// Direction of travel, robot-relative, `[0, 360)`
    pub angle: u16,
    pub speed: u8,
    /// Rotation, positive is clockwise
    pub rotation: i16,
}

impl MovementCommand {
    pub const STOP: Self = Self {
        angle: 0,
        speed: 0,
        rotation: 0,
    };
}

/// Direction and speed before rounding, used between the laws
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    pub angle: f32,
    pub speed: f32,
}

impl Movement {
    pub const STOP: Self = Self { angle: 0.0, speed: 0.0 };

    pub fn new(angle: f32, speed: f32) -> Self {
        Self {
            angle: angle::normalize(angle),
            speed: speed.max(0.0),
        }
    }

    /// Same movement, seen from the turned-around frame
    pub fn mirrored(self) -> Self {
        if self.speed == 0.0 {
            return self;
        }
        Self::new(self.angle + 180.0, self.speed)
    }
}

/// Everything the laws look at in one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlInputs {
    pub play: PlayState,
    pub ball: BallObservation,
    pub goal: GoalObservation,
    pub line: LineObservation,
    /// Compass heading, 0 = towards the attacking goal
    pub heading: f32,
    /// Heading change since the last cycle
    pub heading_rate: f32,
}

impl Default for ControlInputs {
    fn default() -> Self {
        Self {
            play: PlayState::default(),
            ball: BallObservation::NONE,
            goal: GoalObservation::INVISIBLE,
            line: LineObservation::ON_FIELD,
            heading: 0.0,
            heading_rate: 0.0,
        }
    }
}

/// Law selection plus the shared tuning
pub struct ControlEngine {
    config: ControlConfig,
}

impl Default for ControlEngine {
    fn default() -> Self {
        Self::new(ControlConfig::default())
    }
}

impl ControlEngine {
    pub fn new(config: ControlConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Movement chosen by the role's law, before line avoidance
    pub fn select_law(&self, inputs: &ControlInputs) -> Movement {
        let config = &self.config;
        match inputs.play.mode {
            PlayMode::Defend => position::defend(&inputs.ball, &inputs.goal, config),
            PlayMode::Attack | PlayMode::Undecided if inputs.play.attacking_backwards => {
                attack_backwards(&inputs.ball, config)
            }
            PlayMode::Attack | PlayMode::Undecided => {
                if inputs.ball.is_visible() {
                    orbit::orbit(&inputs.ball, config)
                } else {
                    position::centre(&inputs.goal, inputs.heading, config)
                }
            }
        }
    }

    /// Full cycle: law, line override, rotation
    pub fn compute(&self, inputs: &ControlInputs) -> MovementCommand {
        let config = &self.config;
        let movement = self.select_law(inputs);
        let movement = avoid::avoid_line(movement, &inputs.line, inputs.heading, config);

        let facing = rotation::facing(inputs, config);
        let rotation = rotation::correction(inputs.heading, inputs.heading_rate, &facing, config);

        let speed = libm::roundf(movement.speed.min(config.max_speed as f32)) as u8;
        MovementCommand {
            angle: if speed == 0 { 0 } else { angle::to_degrees_u16(movement.angle) },
            speed,
            rotation,
        }
    }
}

/// Orbit around the ball while facing the own goal
///
/// The robot just took over from defending and still faces backwards, so the
/// ball is chased in the turned-around frame.
pub fn attack_backwards(ball: &BallObservation, config: &ControlConfig) -> Movement {
    let turned = BallObservation {
        bearing: ball
            .bearing
            .map(|bearing| angle::to_degrees_u16(bearing as f32 + 180.0)),
        strength: ball.strength,
    };
    orbit::orbit(&turned, config).mirrored()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensing::goal::GoalStatus;
    use crate::sensing::line::LineSize;

    fn attacking() -> ControlInputs {
        ControlInputs {
            play: PlayState {
                mode: PlayMode::Attack,
                attacking_backwards: false,
            },
            ..ControlInputs::default()
        }
    }

    #[test]
    fn attacker_orbits_visible_ball() {
        let engine = ControlEngine::default();
        let mut inputs = attacking();
        inputs.ball = BallObservation::new(Some(0), 50);
        let command = engine.compute(&inputs);
        assert_eq!(command.angle, 0);
        assert_eq!(command.speed, engine.config().orbit_speed);
        assert_eq!(command.rotation, 0);
    }

    #[test]
    fn undecided_behaves_like_attack() {
        let engine = ControlEngine::default();
        let mut inputs = attacking();
        inputs.ball = BallObservation::new(Some(90), 150);
        let attack = engine.compute(&inputs);
        inputs.play.mode = PlayMode::Undecided;
        assert_eq!(engine.compute(&inputs), attack);
    }

    #[test]
    fn attacker_without_ball_or_goal_stops() {
        let engine = ControlEngine::default();
        assert_eq!(engine.compute(&attacking()), MovementCommand::STOP);
    }

    #[test]
    fn attacker_without_ball_centres_on_goal() {
        let engine = ControlEngine::default();
        let mut inputs = attacking();
        inputs.goal = GoalObservation {
            status: GoalStatus::Visible,
            angle: 0.0,
            distance: 31.0,
        };
        let command = engine.compute(&inputs);
        assert_eq!(command.angle, 0);
        assert_eq!(command.speed, 200);
    }

    #[test]
    fn attacking_backwards_chases_ball_behind() {
        let engine = ControlEngine::default();
        let mut inputs = attacking();
        inputs.play.attacking_backwards = true;
        inputs.heading = 180.0;
        // Far ball straight behind the robot: drive straight at it
        inputs.ball = BallObservation::new(Some(180), 50);
        let command = engine.compute(&inputs);
        assert_eq!(command.angle, 180);
        assert_eq!(command.rotation, 0);
    }

    #[test]
    fn line_override_wins_over_law() {
        let engine = ControlEngine::default();
        let mut inputs = attacking();
        inputs.ball = BallObservation::new(Some(0), 50);
        inputs.line = LineObservation {
            on_field: false,
            angle: 0.0,
            size: 1.2,
            category: LineSize::Over,
        };
        let command = engine.compute(&inputs);
        assert_eq!(command.angle, 180);
        assert_eq!(command.speed, engine.config().over_line_speed);
    }

    #[test]
    fn speed_and_rotation_stay_in_range() {
        let engine = ControlEngine::default();
        let config = *engine.config();
        for bearing in (0..360).step_by(15) {
            for heading in (0..360).step_by(45) {
                let mut inputs = attacking();
                inputs.ball = BallObservation::new(Some(bearing), 140);
                inputs.heading = heading as f32;
                inputs.heading_rate = -90.0;
                let command = engine.compute(&inputs);
                assert!(command.angle < 360);
                assert!(command.speed <= config.max_speed);
                assert!(command.rotation.unsigned_abs() as f32 <= config.rotation_maximum);
            }
        }
    }
}
