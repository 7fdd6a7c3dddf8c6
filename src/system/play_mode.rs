//! Attack/defend negotiation between the two robots
//!
//! Each robot broadcasts what it sees (ball bearing and strength, heading, role)
//! and runs the same rules on its own data and the peer's latest report, so both
//! arrive at complementary roles without a master.
//!
//! # Rules
//! - No peer report within the timeout: undecided, attacking-backwards cleared
//! - Initial negotiation (local undecided):
//!   - peer already decided: take the other role
//!   - only one robot sees the ball: it attacks
//!   - both see it: a robot with the ball behind it defends when the other one
//!     has it in front; otherwise the stronger signal attacks, the lower robot
//!     id on a tie
//!   - nobody sees it: stay undecided
//! - Steady state:
//!   - both claim the same role: flip to the other role at once, unless this
//!     robot's own switch is still waiting for the peer to follow; that switch
//!     holds for `switch_time`, then the robot id settles it
//!   - local defends, peer attacks: take over (and attack backwards) when the
//!     peer lost the ball while this robot has it, or the rolling strength
//!     averages cross the hand-off thresholds
//!   - take-overs are at least `switch_time` apart; every switch is latched
//!     until the peer announces a role different from ours
//! - A role change is broadcast at once, otherwise every `broadcast_period`

use heapless::HistoryBuffer;

use crate::angle;
use crate::config::{PlayModeConfig, PLAYMODE_STRENGTH_HISTORY};
use crate::link::radio::RadioFrame;
use crate::sensing::ball::BallObservation;
use crate::sensing::goal::GoalObservation;
use crate::system::state::{PeerState, PlayMode, PlayState};
use crate::system::timer::Timer;

type StrengthHistory = HistoryBuffer<u16, PLAYMODE_STRENGTH_HISTORY>;

fn average(history: &StrengthHistory) -> u16 {
    let samples = history.as_slice();
    if samples.is_empty() {
        return 0;
    }
    let total: u32 = samples.iter().map(|&s| s as u32).sum();
    (total / samples.len() as u32) as u16
}

/// Owner of this robot's [`PlayState`]
pub struct PlayModeCoordinator {
    config: PlayModeConfig,
    state: PlayState,
    peer: Option<PeerState>,
    /// A report arrived since the last update
    fresh_report: bool,
    local_strengths: StrengthHistory,
    peer_strengths: StrengthHistory,
    last_switch: Option<u64>,
    switch_latched: bool,
    broadcast: Timer,
}

impl Default for PlayModeCoordinator {
    fn default() -> Self {
        Self::new(PlayModeConfig::default())
    }
}

impl PlayModeCoordinator {
    pub fn new(config: PlayModeConfig) -> Self {
        Self {
            config,
            state: PlayState::default(),
            peer: None,
            fresh_report: false,
            local_strengths: HistoryBuffer::new(),
            peer_strengths: HistoryBuffer::new(),
            last_switch: None,
            switch_latched: false,
            broadcast: Timer::new(config.broadcast_period),
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn mode(&self) -> PlayMode {
        self.state.mode
    }

    pub fn peer(&self) -> Option<PeerState> {
        self.peer
    }

    /// Stores a report received from the peer at `now`
    pub fn on_frame(&mut self, frame: RadioFrame, now: u64) {
        self.peer = Some(PeerState {
            ball: frame.ball,
            heading: frame.heading,
            mode: frame.mode,
            last_update: now,
        });
        self.fresh_report = true;
    }

    /// Runs the rules for this cycle; returns the frame to broadcast, if one is due
    pub fn update(&mut self, now: u64, ball: &BallObservation, goal: &GoalObservation, heading: f32) -> Option<RadioFrame> {
        let previous = self.state;

        match self.current_peer(now) {
            None => self.state = PlayState::default(),
            Some(peer) => {
                if self.fresh_report {
                    self.local_strengths.write(ball.strength);
                    self.peer_strengths.write(peer.ball.strength);
                }
                self.step_with_peer(now, &peer, ball, goal);
            }
        }
        self.fresh_report = false;

        if self.state.mode != previous.mode {
            log_info!("play mode: {:?} -> {:?}", previous.mode, self.state.mode);
        }
        if self.state.attacking_backwards != previous.attacking_backwards {
            log_info!("attacking backwards: {}", self.state.attacking_backwards);
        }

        let frame = RadioFrame {
            ball: *ball,
            heading: angle::to_degrees_u16(heading),
            mode: self.state.mode,
        };
        if self.state.mode != previous.mode {
            self.broadcast.reset(now);
            Some(frame)
        } else if self.broadcast.time_has_passed(now, true) {
            Some(frame)
        } else {
            None
        }
    }

    /// Peer report if it is still fresh; forgets a stale one
    fn current_peer(&mut self, now: u64) -> Option<PeerState> {
        match self.peer {
            Some(peer) if peer.is_stale(now, self.config.peer_timeout) => {
                log_warn!("peer lost, last report {} us ago", now.saturating_sub(peer.last_update));
                self.peer = None;
                self.local_strengths.clear();
                self.peer_strengths.clear();
                self.switch_latched = false;
                None
            }
            peer => peer,
        }
    }

    fn step_with_peer(&mut self, now: u64, peer: &PeerState, ball: &BallObservation, goal: &GoalObservation) {
        if self.state.attacking_backwards && self.backwards_finished(ball, goal) {
            self.state.attacking_backwards = false;
        }
        if self.switch_latched && peer.mode != self.state.mode {
            self.switch_latched = false;
        }

        match (self.state.mode, peer.mode) {
            (PlayMode::Undecided, PlayMode::Undecided) => {
                if let Some(mode) = self.negotiate(ball, &peer.ball) {
                    self.state.mode = mode;
                    self.last_switch = Some(now);
                }
            }
            (PlayMode::Undecided, peer_mode) => {
                self.state.mode = peer_mode.opposite();
                self.last_switch = Some(now);
            }
            (local, remote) if local == remote => {
                if !self.switch_latched {
                    self.force_switch(local.opposite(), now);
                } else if self.interval_over(now) {
                    // the peer never followed our last switch
                    let settled = self.id_tie_break();
                    if settled != local {
                        self.force_switch(settled, now);
                    }
                }
            }
            (PlayMode::Defend, PlayMode::Attack) => {
                if self.should_take_over(ball, &peer.ball) {
                    self.take_over(now);
                }
            }
            _ => {}
        }
    }

    /// Role this robot should have from the two ball reports, `None` when nobody sees it
    fn negotiate(&self, local: &BallObservation, peer: &BallObservation) -> Option<PlayMode> {
        match (local.bearing, peer.bearing) {
            (None, None) => None,
            (Some(_), None) => Some(PlayMode::Attack),
            (None, Some(_)) => Some(PlayMode::Defend),
            (Some(local_bearing), Some(peer_bearing)) => {
                let local_front = self.in_front(local_bearing);
                let peer_front = self.in_front(peer_bearing);
                Some(match (local_front, peer_front) {
                    (true, false) => PlayMode::Attack,
                    (false, true) => PlayMode::Defend,
                    _ if local.strength > peer.strength => PlayMode::Attack,
                    _ if local.strength < peer.strength => PlayMode::Defend,
                    _ => self.id_tie_break(),
                })
            }
        }
    }

    fn in_front(&self, bearing: u16) -> bool {
        angle::distance(bearing as f32, 0.0) < self.config.front_angle
    }

    /// Robot 0 attacks, any other id defends
    fn id_tie_break(&self) -> PlayMode {
        if self.config.robot_id == 0 {
            PlayMode::Attack
        } else {
            PlayMode::Defend
        }
    }

    fn should_take_over(&self, local: &BallObservation, peer: &BallObservation) -> bool {
        if peer.bearing.is_none() && local.bearing.is_some() {
            return true;
        }
        let local_average = average(&self.local_strengths);
        let peer_average = average(&self.peer_strengths);
        (local_average > self.config.defender_strength && peer_average < self.config.attacker_strength)
            || (peer_average < self.config.attacker_strength_far && local_average > peer_average)
    }

    fn backwards_finished(&self, ball: &BallObservation, goal: &GoalObservation) -> bool {
        if !ball.is_visible() {
            return true;
        }
        ball.strength < self.config.backwards_max_strength
            && (!goal.is_tracked() || goal.distance < self.config.backwards_goal_distance)
    }

    fn interval_over(&self, now: u64) -> bool {
        self.last_switch
            .map_or(true, |last| now.saturating_sub(last) >= self.config.switch_time)
    }

    fn can_switch(&self, now: u64) -> bool {
        self.interval_over(now) && !self.switch_latched
    }

    /// Switches regardless of the interval; the new role is latched
    fn force_switch(&mut self, mode: PlayMode, now: u64) {
        self.state = PlayState {
            mode,
            attacking_backwards: false,
        };
        self.last_switch = Some(now);
        self.switch_latched = true;
    }

    fn take_over(&mut self, now: u64) {
        if !self.can_switch(now) {
            return;
        }
        self.force_switch(PlayMode::Attack, now);
        self.state.attacking_backwards = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensing::goal::GoalStatus;

    const SECOND: u64 = 1_000_000;

    fn coordinator(robot_id: u8) -> PlayModeCoordinator {
        PlayModeCoordinator::new(PlayModeConfig {
            robot_id,
            ..PlayModeConfig::default()
        })
    }

    fn report(bearing: Option<u16>, strength: u16, mode: PlayMode) -> RadioFrame {
        RadioFrame {
            ball: BallObservation::new(bearing, strength),
            heading: 0,
            mode,
        }
    }

    fn ball(bearing: u16, strength: u16) -> BallObservation {
        BallObservation::new(Some(bearing), strength)
    }

    const NO_GOAL: GoalObservation = GoalObservation::INVISIBLE;

    #[test]
    fn undecided_without_peer() {
        let mut robot = coordinator(0);
        robot.update(0, &ball(0, 150), &NO_GOAL, 0.0);
        assert_eq!(robot.mode(), PlayMode::Undecided);
    }

    #[test]
    fn only_robot_seeing_ball_attacks() {
        let mut robot = coordinator(1);
        robot.on_frame(report(None, 0, PlayMode::Undecided), 0);
        robot.update(10, &ball(30, 120), &NO_GOAL, 0.0);
        assert_eq!(robot.mode(), PlayMode::Attack);

        let mut other = coordinator(0);
        other.on_frame(report(Some(30), 120, PlayMode::Undecided), 0);
        other.update(10, &BallObservation::NONE, &NO_GOAL, 0.0);
        assert_eq!(other.mode(), PlayMode::Defend);
    }

    #[test]
    fn nobody_sees_ball_stays_undecided() {
        let mut robot = coordinator(0);
        robot.on_frame(report(None, 0, PlayMode::Undecided), 0);
        robot.update(10, &BallObservation::NONE, &NO_GOAL, 0.0);
        assert_eq!(robot.mode(), PlayMode::Undecided);
    }

    #[test]
    fn ball_in_front_beats_stronger_ball_behind() {
        let mut robot = coordinator(0);
        robot.on_frame(report(Some(180), 150, PlayMode::Undecided), 0);
        robot.update(10, &ball(10, 100), &NO_GOAL, 0.0);
        assert_eq!(robot.mode(), PlayMode::Attack);
    }

    #[test]
    fn stronger_signal_attacks_and_ties_use_id() {
        let mut robot = coordinator(1);
        robot.on_frame(report(Some(20), 150, PlayMode::Undecided), 0);
        robot.update(10, &ball(10, 100), &NO_GOAL, 0.0);
        assert_eq!(robot.mode(), PlayMode::Defend);

        let mut first = coordinator(0);
        first.on_frame(report(Some(20), 120, PlayMode::Undecided), 0);
        first.update(10, &ball(10, 120), &NO_GOAL, 0.0);
        assert_eq!(first.mode(), PlayMode::Attack);

        let mut second = coordinator(1);
        second.on_frame(report(Some(10), 120, PlayMode::Undecided), 0);
        second.update(10, &ball(20, 120), &NO_GOAL, 0.0);
        assert_eq!(second.mode(), PlayMode::Defend);
    }

    #[test]
    fn takes_complement_of_decided_peer() {
        let mut robot = coordinator(0);
        robot.on_frame(report(None, 0, PlayMode::Attack), 0);
        robot.update(10, &ball(0, 150), &NO_GOAL, 0.0);
        assert_eq!(robot.mode(), PlayMode::Defend);
    }

    #[test]
    fn stale_peer_resets_to_undecided() {
        let mut robot = coordinator(0);
        robot.on_frame(report(None, 0, PlayMode::Undecided), 0);
        robot.update(10, &ball(0, 150), &NO_GOAL, 0.0);
        assert_eq!(robot.mode(), PlayMode::Attack);

        robot.update(SECOND + 11, &ball(0, 150), &NO_GOAL, 0.0);
        assert_eq!(robot.state(), PlayState::default());
        assert_eq!(robot.peer(), None);
    }

    #[test]
    fn defender_takes_over_when_attacker_loses_ball() {
        let mut robot = coordinator(1);
        robot.on_frame(report(Some(0), 150, PlayMode::Attack), 0);
        robot.update(0, &BallObservation::NONE, &NO_GOAL, 180.0);
        assert_eq!(robot.mode(), PlayMode::Defend);

        robot.on_frame(report(None, 0, PlayMode::Attack), 2 * SECOND);
        robot.update(2 * SECOND, &ball(180, 120), &NO_GOAL, 180.0);
        assert_eq!(
            robot.state(),
            PlayState {
                mode: PlayMode::Attack,
                attacking_backwards: true,
            }
        );
    }

    #[test]
    fn switches_are_rate_limited() {
        let mut robot = coordinator(1);
        robot.on_frame(report(Some(0), 150, PlayMode::Attack), 0);
        robot.update(0, &BallObservation::NONE, &NO_GOAL, 180.0);

        robot.on_frame(report(None, 0, PlayMode::Attack), SECOND / 2);
        robot.update(SECOND / 2, &ball(180, 120), &NO_GOAL, 180.0);
        assert_eq!(robot.mode(), PlayMode::Defend);
    }

    #[test]
    fn rolling_averages_hand_over() {
        let mut robot = coordinator(1);
        robot.on_frame(report(Some(0), 100, PlayMode::Attack), 0);
        robot.update(0, &ball(170, 140), &NO_GOAL, 180.0);
        assert_eq!(robot.mode(), PlayMode::Defend);

        // Peer keeps a weak ball, local strong: 140 > 130 and 100 < 110
        let now = 2 * SECOND;
        robot.on_frame(report(Some(0), 100, PlayMode::Attack), now);
        robot.update(now, &ball(170, 140), &NO_GOAL, 180.0);
        assert_eq!(robot.mode(), PlayMode::Attack);
        assert!(robot.state().attacking_backwards);
    }

    #[test]
    fn fresh_take_over_holds_through_collision() {
        let mut robot = coordinator(1);
        robot.on_frame(report(Some(0), 150, PlayMode::Attack), 0);
        robot.update(0, &BallObservation::NONE, &NO_GOAL, 180.0);
        robot.on_frame(report(None, 0, PlayMode::Attack), 2 * SECOND);
        robot.update(2 * SECOND, &ball(180, 120), &NO_GOAL, 180.0);
        assert_eq!(robot.mode(), PlayMode::Attack);

        // The peer has not followed yet
        robot.on_frame(report(Some(0), 200, PlayMode::Attack), 2 * SECOND + SECOND / 2);
        robot.update(2 * SECOND + SECOND / 2, &ball(180, 120), &NO_GOAL, 180.0);
        assert_eq!(robot.mode(), PlayMode::Attack);

        // It never does: the higher id gives way
        robot.on_frame(report(Some(0), 200, PlayMode::Attack), 4 * SECOND);
        robot.update(4 * SECOND, &ball(180, 120), &NO_GOAL, 180.0);
        assert_eq!(robot.state(), PlayState { mode: PlayMode::Defend, attacking_backwards: false });
    }

    #[test]
    fn simultaneous_flips_settle_by_id() {
        let mut first = coordinator(0);
        let mut second = coordinator(1);
        for robot in [&mut first, &mut second] {
            robot.on_frame(report(None, 0, PlayMode::Undecided), 0);
            robot.update(0, &ball(0, 100), &NO_GOAL, 0.0);
            assert_eq!(robot.mode(), PlayMode::Attack);
            robot.on_frame(report(Some(0), 100, PlayMode::Attack), 100_000);
            robot.update(100_000, &ball(0, 100), &NO_GOAL, 0.0);
            assert_eq!(robot.mode(), PlayMode::Defend);
            robot.on_frame(report(Some(0), 100, PlayMode::Defend), 200_000);
            robot.update(200_000, &ball(0, 100), &NO_GOAL, 0.0);
            assert_eq!(robot.mode(), PlayMode::Defend);
        }

        first.on_frame(report(Some(0), 100, PlayMode::Defend), 1_100_000);
        first.update(1_100_000, &ball(0, 100), &NO_GOAL, 0.0);
        assert_eq!(first.mode(), PlayMode::Attack);
        second.on_frame(report(Some(0), 100, PlayMode::Defend), 1_100_000);
        second.update(1_100_000, &ball(0, 100), &NO_GOAL, 0.0);
        assert_eq!(second.mode(), PlayMode::Defend);
    }

    #[test]
    fn defender_take_over_hands_role_to_peer() {
        let mut a = coordinator(1);
        let mut b = coordinator(0);
        let a_ball = ball(180, 140);
        let b_ball = ball(0, 100);
        let mut from_b = None;

        let mut now = 0;
        while now <= 10 * SECOND {
            if let Some(frame) = from_b.take() {
                a.on_frame(frame, now);
            }
            if let Some(frame) = a.update(now, &a_ball, &NO_GOAL, 180.0) {
                b.on_frame(frame, now);
            }
            from_b = b.update(now, &b_ball, &NO_GOAL, 0.0);

            if now >= 100_000 {
                assert_ne!(a.mode(), b.mode(), "roles collide at {} us", now);
            }
            if now == 500_000 {
                assert_eq!(a.mode(), PlayMode::Defend);
            }
            now += 100_000;
        }

        assert_eq!(a.state(), PlayState { mode: PlayMode::Attack, attacking_backwards: true });
        assert_eq!(b.state(), PlayState { mode: PlayMode::Defend, attacking_backwards: false });
    }

    #[test]
    fn collision_flips_unlatched_robot() {
        let mut robot = coordinator(0);
        robot.on_frame(report(None, 0, PlayMode::Undecided), 0);
        robot.update(0, &ball(0, 100), &NO_GOAL, 0.0);
        assert_eq!(robot.mode(), PlayMode::Attack);

        robot.on_frame(report(Some(0), 150, PlayMode::Attack), 2 * SECOND);
        robot.update(2 * SECOND, &ball(0, 100), &NO_GOAL, 0.0);
        assert_eq!(robot.mode(), PlayMode::Defend);
    }

    #[test]
    fn attacking_backwards_ends_when_ball_is_lost() {
        let mut robot = coordinator(1);
        robot.on_frame(report(Some(0), 150, PlayMode::Attack), 0);
        robot.update(0, &BallObservation::NONE, &NO_GOAL, 180.0);
        robot.on_frame(report(None, 0, PlayMode::Attack), 2 * SECOND);
        robot.update(2 * SECOND, &ball(180, 120), &NO_GOAL, 180.0);
        assert!(robot.state().attacking_backwards);

        let goal = GoalObservation {
            status: GoalStatus::Visible,
            angle: 0.0,
            distance: 60.0,
        };
        robot.update(2 * SECOND + 10, &ball(180, 90), &goal, 180.0);
        assert!(robot.state().attacking_backwards, "goal still far");

        robot.update(2 * SECOND + 20, &BallObservation::NONE, &goal, 180.0);
        assert!(!robot.state().attacking_backwards);
        assert_eq!(robot.mode(), PlayMode::Attack);
    }

    #[test]
    fn broadcasts_on_change_and_periodically() {
        let mut robot = coordinator(0);
        assert!(robot.update(0, &BallObservation::NONE, &NO_GOAL, 0.0).is_some());
        assert!(robot.update(100_000, &BallObservation::NONE, &NO_GOAL, 0.0).is_none());

        robot.on_frame(report(None, 0, PlayMode::Undecided), 150_000);
        let frame = robot.update(150_000, &ball(0, 150), &NO_GOAL, 0.0);
        assert_eq!(frame.map(|f| f.mode), Some(PlayMode::Attack));

        assert!(robot.update(300_000, &ball(0, 150), &NO_GOAL, 0.0).is_none());
        assert!(robot.update(350_000, &ball(0, 150), &NO_GOAL, 0.0).is_some());
    }
}
