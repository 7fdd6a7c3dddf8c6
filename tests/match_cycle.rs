//! End-to-end runs of the pipeline on the host
//!
//! Sensing-node results travel through the responder and the command channel
//! into the control context, and two robots negotiate roles over frames passed
//! between their contexts.

use embassy_futures::block_on;
use soccer_robot::config::{
    ControlConfig, GoalConfig, LineConfig, PlayModeConfig, TSOP_NUM, XBEE_LOST_COMMUNICATION_TIME,
};
use soccer_robot::link::{
    CommandChannel, CommandHandler, LineHandler, LinkError, ReplyCache, Responder, SensorLink, TsopHandler,
};
use soccer_robot::sensing::ball::{BallObservation, BallSensorArray};
use soccer_robot::sensing::line::LineReading;
use soccer_robot::system::context::{CycleInputs, RobotContext};
use soccer_robot::system::state::PlayMode;

/// Wire straight into a responder, with its one-transaction lag
struct Wire<'a, H> {
    responder: &'a Responder<'a, H>,
}

impl<H: CommandHandler> SensorLink for Wire<'_, H> {
    async fn transfer(&mut self, word: u16) -> Result<u16, LinkError> {
        Ok(self.responder.on_transaction(word))
    }
}

fn robot(robot_id: u8) -> RobotContext {
    RobotContext::new(
        LineConfig::default(),
        GoalConfig::default(),
        PlayModeConfig {
            robot_id,
            ..PlayModeConfig::default()
        },
        ControlConfig::default(),
    )
}

fn cycle<'a>(ball: BallObservation) -> CycleInputs<'a> {
    CycleInputs {
        ball,
        line: LineReading::NONE,
        heading: 0.0,
        blobs: None,
        peer_frame: None,
    }
}

#[test]
fn ir_window_reaches_the_orbit_law() {
    let mut counts = [0; TSOP_NUM];
    counts[4] = 80;
    counts[5] = 150;
    counts[6] = 200;
    counts[7] = 150;
    counts[8] = 80;
    let mut array = BallSensorArray::default();
    let observation = array.evaluate(&counts);

    let cache = ReplyCache::new();
    cache.publish_ball(observation, array.has_ball());
    let responder = Responder::new(TsopHandler, &cache);
    let mut channel = CommandChannel::new(Wire { responder: &responder });

    let ball = block_on(channel.ball());
    assert_eq!(ball, BallObservation::new(Some(88), 155));
    assert!(block_on(channel.has_ball()));

    let mut context = robot(0);
    let output = context.step(&cycle(ball), 0);
    // near ball on the right: swing round 90° past it
    assert_eq!(output.command.angle, 178);
    assert_eq!(output.command.speed, ControlConfig::default().orbit_speed);
}

#[test]
fn line_node_reading_turns_robot_back() {
    let cache = ReplyCache::new();
    cache.publish_line(LineReading::new(0, 0.9));
    let responder = Responder::new(LineHandler, &cache);
    let mut channel = CommandChannel::new(Wire { responder: &responder });

    let line = block_on(channel.line_reading());
    assert_eq!(line.angle, Some(0));

    let mut context = robot(0);
    let mut inputs = cycle(BallObservation::new(Some(0), 50));
    inputs.line = line;
    let output = context.step(&inputs, 0);
    assert!(!context.line_tracker().is_on_field());
    assert_eq!(output.command.angle, 180);
}

#[test]
fn unanswered_link_degrades_to_no_ball() {
    struct Silent;
    impl SensorLink for Silent {
        async fn transfer(&mut self, _word: u16) -> Result<u16, LinkError> {
            Err(LinkError::Timeout)
        }
    }

    let mut channel = CommandChannel::new(Silent);
    let ball = block_on(channel.ball());
    assert_eq!(ball, BallObservation::NONE);

    let mut context = robot(0);
    let output = context.step(&cycle(ball), 0);
    assert_eq!(context.play_state().mode, PlayMode::Undecided);
    assert_eq!(output.command.speed, 0, "no ball and no goal: hold still");
}

#[test]
fn two_robots_settle_on_complementary_roles() {
    let mut near = robot(0);
    let mut far = robot(1);

    let first = near.step(&cycle(BallObservation::new(Some(0), 150)), 0);
    let hello = first.broadcast.expect("first cycle broadcasts");
    assert_eq!(hello.mode, PlayMode::Undecided);

    let mut inputs = cycle(BallObservation::new(Some(0), 60));
    inputs.peer_frame = Some(hello);
    let reply = far.step(&inputs, 0).broadcast.expect("role change broadcasts");
    assert_eq!(reply.mode, PlayMode::Defend);

    let mut inputs = cycle(BallObservation::new(Some(0), 150));
    inputs.peer_frame = Some(reply);
    let settled = near.step(&inputs, 1_000);
    assert_eq!(near.play_state().mode, PlayMode::Attack);
    assert_eq!(settled.broadcast.map(|frame| frame.mode), Some(PlayMode::Attack));
    assert_eq!(far.play_state().mode, PlayMode::Defend);

    // radio silence: back to undecided
    let later = 1_000 + XBEE_LOST_COMMUNICATION_TIME + 1;
    near.step(&cycle(BallObservation::new(Some(0), 150)), later);
    assert_eq!(near.play_state().mode, PlayMode::Undecided);
}
