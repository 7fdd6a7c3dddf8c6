//! Control node cycle
//!
//! [`RobotContext`] owns every piece of state the control node keeps between
//! cycles: trackers, role coordinator, control engine and the deadline timers.
//! One call to [`RobotContext::step`] is one cycle; nothing in it blocks.
//!
//! # Timers
//! - Camera: polled every [`PIXY_UPDATE_TIME`]
//! - Radio: broadcast every [`XBEE_UPDATE_TIME`](crate::config::XBEE_UPDATE_TIME)
//!   (inside the coordinator)
//! - Indicator: toggled every [`LED_BLINK_TIME_MASTER`]

use crate::config::{
    ControlConfig, GoalConfig, LineConfig, PlayModeConfig, LED_BLINK_TIME_MASTER, PIXY_UPDATE_TIME,
};
use crate::control::{ControlEngine, ControlInputs, MovementCommand};
use crate::link::radio::RadioFrame;
use crate::link::{CommandChannel, SensorLink};
use crate::sensing::ball::BallObservation;
use crate::sensing::goal::{Blob, GoalTarget, GoalTracker};
use crate::sensing::heading::HeadingTracker;
use crate::sensing::line::{LineReading, LineTracker};
use crate::system::io::{Actuator, HeadingSource, VisionSource};
use crate::system::play_mode::PlayModeCoordinator;
use crate::system::state::{PlayMode, PlayState};
use crate::system::timer::{Clock, Timer};

/// Sensor data gathered for one cycle
#[derive(Debug, Clone, Copy)]
pub struct CycleInputs<'a> {
    pub ball: BallObservation,
    pub line: LineReading,
    /// Compass heading
    pub heading: f32,
    /// Camera blobs when the camera was polled this cycle
    pub blobs: Option<&'a [Blob]>,
    /// Peer report received since the last cycle
    pub peer_frame: Option<RadioFrame>,
}

/// What one cycle produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleOutput {
    pub command: MovementCommand,
    /// Report to send to the peer
    pub broadcast: Option<RadioFrame>,
    /// The indicator LED is due to change
    pub toggle_indicator: bool,
}

/// Hardware the cycle reads from and writes to
pub struct Collaborators<'a, H, V, B, L, A> {
    pub heading: &'a mut H,
    pub vision: &'a mut V,
    pub ball: &'a mut CommandChannel<B>,
    pub line: &'a mut CommandChannel<L>,
    pub actuator: &'a mut A,
}

/// Per-robot state of the control node
pub struct RobotContext {
    camera_timer: Timer,
    indicator_timer: Timer,
    line: LineTracker,
    goal: GoalTracker,
    heading: HeadingTracker,
    coordinator: PlayModeCoordinator,
    engine: ControlEngine,
}

impl Default for RobotContext {
    fn default() -> Self {
        Self::new(
            LineConfig::default(),
            GoalConfig::default(),
            PlayModeConfig::default(),
            ControlConfig::default(),
        )
    }
}

impl RobotContext {
    pub fn new(line: LineConfig, goal: GoalConfig, play_mode: PlayModeConfig, control: ControlConfig) -> Self {
        Self {
            camera_timer: Timer::new(PIXY_UPDATE_TIME),
            indicator_timer: Timer::new(LED_BLINK_TIME_MASTER),
            line: LineTracker::new(line),
            goal: GoalTracker::new(goal),
            heading: HeadingTracker::new(),
            coordinator: PlayModeCoordinator::new(play_mode),
            engine: ControlEngine::new(control),
        }
    }

    /// Whether the camera should be polled this cycle; restarts the camera period
    pub fn camera_due(&mut self, now: u64) -> bool {
        self.camera_timer.time_has_passed(now, true)
    }

    pub fn play_state(&self) -> PlayState {
        self.coordinator.state()
    }

    pub fn coordinator(&self) -> &PlayModeCoordinator {
        &self.coordinator
    }

    pub fn line_tracker(&self) -> &LineTracker {
        &self.line
    }

    pub fn goal_tracker(&self) -> &GoalTracker {
        &self.goal
    }

    /// Goal the camera should look for in the current role
    fn goal_target(&self) -> GoalTarget {
        let play = self.coordinator.state();
        if play.mode == PlayMode::Defend || play.attacking_backwards {
            GoalTarget::Defend
        } else {
            GoalTarget::Attack
        }
    }

    /// Runs one cycle on already gathered inputs
    pub fn step(&mut self, inputs: &CycleInputs<'_>, now: u64) -> CycleOutput {
        let heading_rate = self.heading.update(inputs.heading);
        let heading = self.heading.heading();

        let line = self.line.update(inputs.line, heading);

        if let Some(blobs) = inputs.blobs {
            let target = self.goal_target();
            self.goal.update(blobs, target, heading, now);
        }
        let goal = self.goal.observation();

        if let Some(frame) = inputs.peer_frame {
            self.coordinator.on_frame(frame, now);
        }
        let broadcast = self.coordinator.update(now, &inputs.ball, &goal, heading);

        let command = self.engine.compute(&ControlInputs {
            play: self.coordinator.state(),
            ball: inputs.ball,
            goal,
            line,
            heading,
            heading_rate,
        });

        CycleOutput {
            command,
            broadcast,
            toggle_indicator: self.indicator_timer.time_has_passed(now, true),
        }
    }

    /// Gathers inputs from the hardware, runs one cycle and drives the motors
    pub async fn run_cycle<H, V, B, L, A, C>(
        &mut self,
        io: &mut Collaborators<'_, H, V, B, L, A>,
        clock: &C,
        peer_frame: Option<RadioFrame>,
    ) -> CycleOutput
    where
        H: HeadingSource,
        V: VisionSource,
        B: SensorLink,
        L: SensorLink,
        A: Actuator,
        C: Clock,
    {
        let heading = io.heading.heading().await;
        let ball = io.ball.ball().await;
        let line = io.line.line_reading().await;

        let now = clock.now_us();
        let blobs = if self.camera_due(now) {
            Some(io.vision.blobs().await)
        } else {
            None
        };

        let output = self.step(
            &CycleInputs {
                ball,
                line,
                heading,
                blobs: blobs.as_deref(),
                peer_frame,
            },
            now,
        );
        io.actuator.drive(output.command);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::COLOUR_SIG_ATTACK;
    use crate::sensing::goal::GoalStatus;

    fn inputs<'a>(ball: BallObservation) -> CycleInputs<'a> {
        CycleInputs {
            ball,
            line: LineReading::NONE,
            heading: 0.0,
            blobs: None,
            peer_frame: None,
        }
    }

    #[test]
    fn lone_robot_is_undecided_and_still_chases() {
        let mut context = RobotContext::default();
        let output = context.step(&inputs(BallObservation::new(Some(0), 50)), 0);
        assert_eq!(context.play_state().mode, PlayMode::Undecided);
        assert_eq!(output.command.speed, ControlConfig::default().orbit_speed);
        assert!(output.broadcast.is_some());
        assert!(output.toggle_indicator);
    }

    #[test]
    fn peer_frame_drives_negotiation() {
        let mut context = RobotContext::default();
        let mut cycle = inputs(BallObservation::new(Some(0), 150));
        cycle.peer_frame = Some(RadioFrame {
            ball: BallObservation::NONE,
            heading: 0,
            mode: PlayMode::Undecided,
        });
        let output = context.step(&cycle, 1_000);
        assert_eq!(context.play_state().mode, PlayMode::Attack);
        assert_eq!(output.broadcast.map(|f| f.mode), Some(PlayMode::Attack));
    }

    #[test]
    fn camera_blobs_update_goal() {
        let mut context = RobotContext::default();
        let blobs = [Blob {
            signature: COLOUR_SIG_ATTACK,
            x: 160,
            y: 100,
            width: 40,
            height: 20,
        }];
        let mut cycle = inputs(BallObservation::NONE);
        cycle.blobs = Some(&blobs);
        context.step(&cycle, 0);
        assert_eq!(context.goal_tracker().observation().status, GoalStatus::Visible);
    }

    #[test]
    fn line_reading_overrides_command() {
        let mut context = RobotContext::default();
        let mut cycle = inputs(BallObservation::new(Some(0), 50));
        cycle.line = LineReading::new(0, 0.9);
        let output = context.step(&cycle, 0);
        assert!(!context.line_tracker().is_on_field());
        assert_eq!(output.command.angle, 180);
    }

    #[test]
    fn timers_gate_periodic_work() {
        let mut context = RobotContext::default();
        assert!(context.camera_due(0));
        assert!(!context.camera_due(10_000));
        assert!(context.camera_due(20_000));

        assert!(context.step(&inputs(BallObservation::NONE), 0).toggle_indicator);
        assert!(!context.step(&inputs(BallObservation::NONE), 50_000).toggle_indicator);
        assert!(context.step(&inputs(BallObservation::NONE), 100_000).toggle_indicator);
    }
}
