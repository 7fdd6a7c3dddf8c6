//! Robot configuration
//!
//! Every tuned value of the robot lives here. The numbers were found on the field
//! and are not derived from anything; change them per robot, not at runtime.
//!
//! Each subsystem also gets a small `Copy` config struct whose `Default` is built
//! from these constants, so the algorithms take their tuning as a value and tests
//! can override a single field.
//!
//! # Units
//! - Angles in degrees, 0 = straight ahead, increasing clockwise
//! - Times in microseconds of the monotonic clock
//! - Speeds on the actuator's 0-255 scale

// ---------------------------------------------------------------------------
// Robot identity
// ---------------------------------------------------------------------------

/// Identity of this robot within the pair, flashed at build time (`ROBOT_ID` env)
pub const ROBOT_ID: u8 = parse_id(env!("ROBOT_ID"));

/// Parses a decimal robot id at compile time; anything unparsable becomes 0
const fn parse_id(text: &str) -> u8 {
    let bytes = text.as_bytes();
    let mut value: u8 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        if digit < b'0' || digit > b'9' {
            return 0;
        }
        value = value.wrapping_mul(10).wrapping_add(digit - b'0');
        i += 1;
    }
    value
}

// ---------------------------------------------------------------------------
// Actuator limits
// ---------------------------------------------------------------------------

/// Highest speed the motor controller accepts
pub const MAX_SPEED: u8 = 255;

// ---------------------------------------------------------------------------
// IR ball sensors (TSOP ring)
// ---------------------------------------------------------------------------

/// Number of IR receivers on the ring
pub const TSOP_NUM: usize = 24;
/// Samples summed into one window
pub const TSOP_LOOP_COUNT: u16 = 255;
/// Time the receivers stay powered off after each window (ms)
pub const TSOP_UNLOCK_DELAY_MS: u64 = 2;
/// Ranked receivers averaged for the weighted bearing
pub const TSOP_BEST_TSOP_NO_ANGLE: usize = 5;
/// Ranked receivers averaged for the strength
pub const TSOP_BEST_TSOP_NO_STRENGTH: usize = 2;
/// Smoothing weight of the receiver itself
pub const TSOP_K1: u16 = 10;
/// Smoothing weight of the direct neighbours
pub const TSOP_K2: u16 = 2;
/// Smoothing weight of the second neighbours
pub const TSOP_K3: u16 = 1;
/// Counts below this are noise
pub const TSOP_MIN_IGNORE: u16 = 50;
/// Counts above this are saturation
pub const TSOP_MAX_IGNORE: u16 = 220;
/// Weight of the strongest receiver in the weighted bearing
pub const TSOP_FIRST_TSOP_WEIGHT: i32 = 3;
/// Weight of the second strongest receiver in the weighted bearing
pub const TSOP_SECOND_TSOP_WEIGHT: i32 = 2;
/// Wire sentinel for "no ball"
pub const TSOP_NO_BALL: u16 = 400;
/// Strength above which the ball is considered in the robot's grip
pub const TSOP_HAS_BALL_STRENGTH: u16 = 130;

// ---------------------------------------------------------------------------
// Line sensors
// ---------------------------------------------------------------------------

/// Wire sentinel angle for "no line"
pub const NO_LINE_ANGLE: u16 = 400;
/// Size reported together with "no line"
pub const NO_LINE_SIZE: f32 = 3.0;
/// Line depth at or below which the robot is only touching the line
pub const LINE_SMALL_SIZE: f32 = 0.4;
/// Line depth above which the robot is over the line
pub const LINE_BIG_SIZE: f32 = 0.7;
/// Distance from a field axis beyond which a line bearing is treated as a corner
pub const LINE_CORNER_ANGLE_THRESHOLD: f32 = 30.0;
/// Widening of the avoidance window on straight edges
pub const LINE_ANGLE_BUFFER: f32 = -10.0;
/// Widening of the avoidance window in corners
pub const LINE_ANGLE_BUFFER_CORNER: f32 = -10.0;
/// Speed factor when escaping a small line touch
pub const LS_MOVEMENT_SMALL_MULTIPLIER: f32 = 0.5;
/// Escape speed when over the line
pub const OVER_LINE_SPEED: u8 = 255;
/// Escape speed when on the line
pub const LINE_SPEED: u8 = 255;

// ---------------------------------------------------------------------------
// Orbit
// ---------------------------------------------------------------------------

/// Strength above which the ball is close
pub const ORBIT_SHORT_STRENGTH: u16 = 135;
/// Strength below which the ball is far
pub const ORBIT_BIG_STRENGTH: u16 = 105;
/// Half-width of the band around 0 where the ball counts as dead ahead
pub const ORBIT_SMALL_ANGLE: f32 = 5.0;
/// Half-width of the band where the approach is blended
pub const ORBIT_BIG_ANGLE: f32 = 60.0;
/// Fraction of the bearing followed when the ball is dead ahead and far
pub const ORBIT_BALL_FORWARD_ANGLE_TIGHTENER: f32 = 0.5;
/// Orbit speed
pub const ORBIT_SPEED: u8 = 200;
/// Strength below which attacking backwards may end
pub const ATTACK_BACKWARDS_MAX_STRENGTH: u16 = 100;
/// Goal distance below which attacking backwards may end
pub const ATTACK_BACKWARDS_GOAL_DISTANCE: f32 = 30.0;

// ---------------------------------------------------------------------------
// Defence
// ---------------------------------------------------------------------------

/// Distance to the home goal the defender holds
pub const DEFEND_GOAL_DISTANCE: f32 = 50.0;
/// Tolerance around the defending distance
pub const DEFEND_GOAL_DISTANCE_BUFFER: f32 = 4.0;
/// Camera angle tolerance before the defender sidesteps
pub const DEFEND_GOAL_ANGLE_BUFFER: f32 = 3.0;
/// Lateral speed limit while defending
pub const DEFEND_SIDEWAYS_MAX_SPEED: f32 = 170.0;
/// Forward/backward speed limit while defending
pub const DEFEND_DISTANCE_MAX_SPEED: f32 = 160.0;
/// Lateral gain while defending
pub const DEFEND_SIDEWAYS_MULTIPLIER: f32 = 400.0;
/// Distance gain while defending
pub const DEFEND_DISTANCE_MULTIPLIER: f32 = 10.0;
/// Strength above which the defender charges a ball in front of the goal
pub const DEFEND_CHARGE_STRENGTH: u16 = 150;
/// Half-width of the sector in front of the goal the defender charges into
pub const DEFEND_CHARGE_ANGLE: f32 = 90.0;

// ---------------------------------------------------------------------------
// Centre (attacker without ball)
// ---------------------------------------------------------------------------

/// Distance to the attacking goal the attacker waits at
pub const CENTRE_GOAL_DISTANCE: f32 = 11.0;
/// Distance below which the waiting attacker backs off
pub const CENTRE_GOAL_DISTANCE_CLOSE: f32 = 9.0;
/// Extra tolerance above the waiting distance
pub const CENTRE_GOAL_DISTANCE_BUFFER: f32 = 0.0;
/// Lateral speed limit while centring
pub const CENTRE_SIDEWAYS_MAX_SPEED: f32 = 255.0;
/// Forward/backward speed limit while centring
pub const CENTRE_DISTANCE_MAX_SPEED: f32 = 255.0;
/// Lateral gain while centring
pub const CENTRE_SIDEWAYS_MULTIPLIER: f32 = 400.0;
/// Distance gain while centring
pub const CENTRE_DISTANCE_MULTIPLIER: f32 = 10.0;
/// Camera angle tolerance before the attacker corrects sideways
pub const CENTRE_GOAL_ANGLE_BUFFER: f32 = 2.0;
/// Heading tolerance for "facing forward" while centring
pub const CENTRE_FACING_ANGLE: f32 = 30.0;

// ---------------------------------------------------------------------------
// Rotation correction
// ---------------------------------------------------------------------------

/// Corrections smaller than this are dropped
pub const CORRECTION_ROTATION_MINIMUM: f32 = 2.0;
/// Largest correction sent to the motors
pub const CORRECTION_ROTATION_MAXIMUM: f32 = 170.0;
/// P gain while facing the goal
pub const CORRECTION_ROTATION_MULTIPLIER_P_GOAL: f32 = 1.7;
/// D gain while facing the goal
pub const CORRECTION_ROTATION_MULTIPLIER_D_GOAL: f32 = 2.0;
/// P gain otherwise
pub const CORRECTION_ROTATION_MULTIPLIER_P: f32 = 2.5;
/// D gain otherwise
pub const CORRECTION_ROTATION_MULTIPLIER_D: f32 = 2.0;

// ---------------------------------------------------------------------------
// Camera / goal
// ---------------------------------------------------------------------------

/// Smallest blob accepted as a goal (px²)
pub const GOAL_MIN_AREA: u32 = 100;
/// Camera frame width (px)
pub const PIXY_FRAME_WIDTH: u16 = 320;
/// Camera frame height (px)
pub const PIXY_FRAME_HEIGHT: u16 = 200;
/// Horizontal field of view (degrees)
pub const PIXY_HORIZONTAL_FOV: f32 = 75.0;
/// Blob height to distance conversion (distance = multiplier / height).
/// Every goal distance in this file is on this scale.
pub const GOAL_DISTANCE_MULTIPLIER: f32 = 100.0;
/// Field-direction tolerance for a blob to be the expected goal
pub const GOAL_ALIGNMENT_ANGLE: f32 = 90.0;
/// Most blobs read from the camera per poll
pub const PIXY_MAX_BLOBS: usize = 8;
/// Camera poll period
pub const PIXY_UPDATE_TIME: u64 = 20_000;
/// How long a goal stays usable after it was last seen
pub const LAST_SEEN_GOAL_TIME: u64 = 100_000;
/// Strength above which the attacker fully faces the goal
pub const FACE_GOAL_SHORT_STRENGTH: u16 = 120;
/// Strength below which the attacker faces forward
pub const FACE_GOAL_BIG_STRENGTH: u16 = 110;
/// Colour signature of the goal we attack (yellow)
pub const COLOUR_SIG_ATTACK: u8 = 1;
/// Colour signature of the goal we defend (blue)
pub const COLOUR_SIG_DEFEND: u8 = 2;

// ---------------------------------------------------------------------------
// Play mode
// ---------------------------------------------------------------------------

/// Half-width of the sector counted as "ball in front" when negotiating
pub const PLAYMODE_SWITCH_ATTACKER_ANGLE: f32 = 90.0;
/// Smoothed strength the defender needs before taking over
pub const PLAYMODE_SWITCH_DEFENDER_STRENGTH: u16 = 130;
/// Smoothed attacker strength below which the defender may take over
pub const PLAYMODE_SWITCH_ATTACKER_STRENGTH: u16 = 110;
/// Smoothed attacker strength below which any stronger defender takes over
pub const PLAYMODE_SWITCH_ATTACKER_STRENGTH_FAR: u16 = 95;
/// Minimum time between two role switches
pub const PLAYMODE_SWITCH_TIME: u64 = 1_000_000;
/// Samples in the rolling strength averages
pub const PLAYMODE_STRENGTH_HISTORY: usize = 25;

// ---------------------------------------------------------------------------
// Radio
// ---------------------------------------------------------------------------

/// Peer data older than this is discarded
pub const XBEE_LOST_COMMUNICATION_TIME: u64 = 1_000_000;
/// Broadcast period
pub const XBEE_UPDATE_TIME: u64 = 200_000;
/// Radio UART baud rate
pub const XBEE_BAUD: u32 = 57_600;
/// Start byte, sent twice at the head of every frame
pub const XBEE_START: u8 = 255;
/// Frame length including the start bytes
pub const XBEE_PACKET_SIZE: usize = 9;

// ---------------------------------------------------------------------------
// Sensing-node link and indicators
// ---------------------------------------------------------------------------

/// Transactions per command; the reply lags one transaction behind
pub const LINK_REPEAT: usize = 3;
/// Time the control node waits for a reply word (µs)
pub const LINK_REPLY_TIMEOUT: u64 = 2_000;
/// Link SPI clock (Hz)
pub const LINK_FREQUENCY: u32 = 1_000_000;
/// Motor controller UART baud rate
pub const MOTOR_BAUD: u32 = 115_200;
/// Indicator blink period on the control node
pub const LED_BLINK_TIME_MASTER: u64 = 100_000;
/// Indicator blink period on the sensing node
pub const LED_BLINK_TIME_SLAVE_TSOP: u64 = 300_000;

/// Tuning of the IR ball sensor pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallSensorConfig {
    /// Lower edge of the noise gate
    pub min_ignore: u16,
    /// Upper edge of the noise gate
    pub max_ignore: u16,
    /// Smoothing weights: self, neighbours, second neighbours
    pub k1: u16,
    pub k2: u16,
    pub k3: u16,
    /// Weights of the first and second ranked receiver in the bearing average
    pub first_weight: i32,
    pub second_weight: i32,
    /// Ranked receivers used for bearing and strength
    pub best_for_angle: usize,
    pub best_for_strength: usize,
    /// Strength above which [`crate::sensing::ball::BallSensorArray::has_ball`] holds
    pub has_ball_strength: u16,
}

impl Default for BallSensorConfig {
    fn default() -> Self {
        Self {
            min_ignore: TSOP_MIN_IGNORE,
            max_ignore: TSOP_MAX_IGNORE,
            k1: TSOP_K1,
            k2: TSOP_K2,
            k3: TSOP_K3,
            first_weight: TSOP_FIRST_TSOP_WEIGHT,
            second_weight: TSOP_SECOND_TSOP_WEIGHT,
            best_for_angle: TSOP_BEST_TSOP_NO_ANGLE,
            best_for_strength: TSOP_BEST_TSOP_NO_STRENGTH,
            has_ball_strength: TSOP_HAS_BALL_STRENGTH,
        }
    }
}

/// Tuning of the line tracker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineConfig {
    pub small_size: f32,
    pub big_size: f32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            small_size: LINE_SMALL_SIZE,
            big_size: LINE_BIG_SIZE,
        }
    }
}

/// Tuning of the goal tracker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalConfig {
    pub min_area: u32,
    pub frame_width: u16,
    pub horizontal_fov: f32,
    pub distance_multiplier: f32,
    pub alignment_angle: f32,
    pub last_seen_time: u64,
    pub attack_signature: u8,
    pub defend_signature: u8,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            min_area: GOAL_MIN_AREA,
            frame_width: PIXY_FRAME_WIDTH,
            horizontal_fov: PIXY_HORIZONTAL_FOV,
            distance_multiplier: GOAL_DISTANCE_MULTIPLIER,
            alignment_angle: GOAL_ALIGNMENT_ANGLE,
            last_seen_time: LAST_SEEN_GOAL_TIME,
            attack_signature: COLOUR_SIG_ATTACK,
            defend_signature: COLOUR_SIG_DEFEND,
        }
    }
}

/// Distance/lateral correction gains shared by the centre and defend laws
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionGains {
    pub distance_multiplier: f32,
    pub sideways_multiplier: f32,
    pub distance_max_speed: f32,
    pub sideways_max_speed: f32,
    pub angle_buffer: f32,
}

/// Tuning of every control law
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlConfig {
    pub max_speed: u8,

    pub orbit_short_strength: u16,
    pub orbit_big_strength: u16,
    pub orbit_small_angle: f32,
    pub orbit_big_angle: f32,
    pub orbit_tightener: f32,
    pub orbit_speed: u8,

    pub centre: PositionGains,
    pub centre_goal_distance: f32,
    pub centre_goal_distance_close: f32,
    pub centre_goal_distance_buffer: f32,
    pub centre_facing_angle: f32,

    pub defend: PositionGains,
    pub defend_goal_distance: f32,
    pub defend_goal_distance_buffer: f32,
    pub defend_charge_strength: u16,
    pub defend_charge_angle: f32,

    pub line_corner_threshold: f32,
    pub line_angle_buffer: f32,
    pub line_angle_buffer_corner: f32,
    pub line_small_multiplier: f32,
    pub over_line_speed: u8,
    pub line_speed: u8,

    pub rotation_minimum: f32,
    pub rotation_maximum: f32,
    pub rotation_p: f32,
    pub rotation_d: f32,
    pub rotation_p_goal: f32,
    pub rotation_d_goal: f32,

    pub face_goal_short_strength: u16,
    pub face_goal_big_strength: u16,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,

            orbit_short_strength: ORBIT_SHORT_STRENGTH,
            orbit_big_strength: ORBIT_BIG_STRENGTH,
            orbit_small_angle: ORBIT_SMALL_ANGLE,
            orbit_big_angle: ORBIT_BIG_ANGLE,
            orbit_tightener: ORBIT_BALL_FORWARD_ANGLE_TIGHTENER,
            orbit_speed: ORBIT_SPEED,

            centre: PositionGains {
                distance_multiplier: CENTRE_DISTANCE_MULTIPLIER,
                sideways_multiplier: CENTRE_SIDEWAYS_MULTIPLIER,
                distance_max_speed: CENTRE_DISTANCE_MAX_SPEED,
                sideways_max_speed: CENTRE_SIDEWAYS_MAX_SPEED,
                angle_buffer: CENTRE_GOAL_ANGLE_BUFFER,
            },
            centre_goal_distance: CENTRE_GOAL_DISTANCE,
            centre_goal_distance_close: CENTRE_GOAL_DISTANCE_CLOSE,
            centre_goal_distance_buffer: CENTRE_GOAL_DISTANCE_BUFFER,
            centre_facing_angle: CENTRE_FACING_ANGLE,

            defend: PositionGains {
                distance_multiplier: DEFEND_DISTANCE_MULTIPLIER,
                sideways_multiplier: DEFEND_SIDEWAYS_MULTIPLIER,
                distance_max_speed: DEFEND_DISTANCE_MAX_SPEED,
                sideways_max_speed: DEFEND_SIDEWAYS_MAX_SPEED,
                angle_buffer: DEFEND_GOAL_ANGLE_BUFFER,
            },
            defend_goal_distance: DEFEND_GOAL_DISTANCE,
            defend_goal_distance_buffer: DEFEND_GOAL_DISTANCE_BUFFER,
            defend_charge_strength: DEFEND_CHARGE_STRENGTH,
            defend_charge_angle: DEFEND_CHARGE_ANGLE,

            line_corner_threshold: LINE_CORNER_ANGLE_THRESHOLD,
            line_angle_buffer: LINE_ANGLE_BUFFER,
            line_angle_buffer_corner: LINE_ANGLE_BUFFER_CORNER,
            line_small_multiplier: LS_MOVEMENT_SMALL_MULTIPLIER,
            over_line_speed: OVER_LINE_SPEED,
            line_speed: LINE_SPEED,

            rotation_minimum: CORRECTION_ROTATION_MINIMUM,
            rotation_maximum: CORRECTION_ROTATION_MAXIMUM,
            rotation_p: CORRECTION_ROTATION_MULTIPLIER_P,
            rotation_d: CORRECTION_ROTATION_MULTIPLIER_D,
            rotation_p_goal: CORRECTION_ROTATION_MULTIPLIER_P_GOAL,
            rotation_d_goal: CORRECTION_ROTATION_MULTIPLIER_D_GOAL,

            face_goal_short_strength: FACE_GOAL_SHORT_STRENGTH,
            face_goal_big_strength: FACE_GOAL_BIG_STRENGTH,
        }
    }
}

/// Tuning of the attack/defend negotiation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayModeConfig {
    pub robot_id: u8,
    pub peer_timeout: u64,
    pub broadcast_period: u64,
    pub switch_time: u64,
    pub front_angle: f32,
    pub defender_strength: u16,
    pub attacker_strength: u16,
    pub attacker_strength_far: u16,
    pub backwards_max_strength: u16,
    pub backwards_goal_distance: f32,
}

impl Default for PlayModeConfig {
    fn default() -> Self {
        Self {
            robot_id: ROBOT_ID,
            peer_timeout: XBEE_LOST_COMMUNICATION_TIME,
            broadcast_period: XBEE_UPDATE_TIME,
            switch_time: PLAYMODE_SWITCH_TIME,
            front_angle: PLAYMODE_SWITCH_ATTACKER_ANGLE,
            defender_strength: PLAYMODE_SWITCH_DEFENDER_STRENGTH,
            attacker_strength: PLAYMODE_SWITCH_ATTACKER_STRENGTH,
            attacker_strength_far: PLAYMODE_SWITCH_ATTACKER_STRENGTH_FAR,
            backwards_max_strength: ATTACK_BACKWARDS_MAX_STRENGTH,
            backwards_goal_distance: ATTACK_BACKWARDS_GOAL_DISTANCE,
        }
    }
}
