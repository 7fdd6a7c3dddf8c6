//! IR ball sensor array
//!
//! Turns the on/off outputs of the IR receiver ring into a ball bearing and a
//! strength. The receivers are binary, so strength comes from oversampling: each
//! receiver is read [`TSOP_LOOP_COUNT`] times per window and the detections are
//! counted.
//!
//! # Window pipeline
//! At the end of every window:
//! 1. Noise gate: counts outside `[min_ignore, max_ignore]` become 0
//! 2. Smoothing: each count is mixed with its two neighbours on either side
//!    (circular), weights `k1`, `k2`, `k3`, divided by `k1 + 2·k2 + 2·k3`
//! 3. Ranking: strongest first, ties keep the lower receiver index first
//! 4. Simple bearing: the top receiver's direction
//! 5. Weighted bearing: weighted mean of the top receivers' offsets from the top one
//! 6. Strength: mean of the top receivers
//!
//! Counts are collected into one of two buffers while the other holds the window
//! being evaluated; the finished estimate is published as a whole, so readers only
//! ever see complete windows.

use crate::angle;
use crate::config::{BallSensorConfig, TSOP_LOOP_COUNT, TSOP_NO_BALL, TSOP_NUM};
use crate::sensing::rank::Ranking;

/// One ball estimate, valid for a whole window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "firmware", derive(defmt::Format))]
pub struct BallObservation {
    /// Robot-relative bearing in `[0, 360)`, `None` when no ball is seen
    pub bearing: Option<u16>,
    /// Signal strength, higher is closer
    pub strength: u16,
}

impl BallObservation {
    /// No ball, zero strength
    pub const NONE: Self = Self {
        bearing: None,
        strength: 0,
    };

    /// Builds an observation from a bearing/strength pair
    pub fn new(bearing: Option<u16>, strength: u16) -> Self {
        Self {
            bearing: bearing.map(|b| b % 360),
            strength,
        }
    }

    /// Whether a ball is seen
    pub fn is_visible(&self) -> bool {
        self.bearing.is_some()
    }

    /// Bearing as sent over the wire, [`TSOP_NO_BALL`] when no ball is seen
    pub fn bearing_word(&self) -> u16 {
        self.bearing.unwrap_or(TSOP_NO_BALL)
    }

    /// Decodes a wire bearing; anything outside `[0, 360)` means no ball
    pub fn bearing_from_word(word: u16) -> Option<u16> {
        if word < 360 {
            Some(word)
        } else {
            None
        }
    }
}

/// Receiver ring state: accumulation buffers plus the last finished window
pub struct BallSensorArray {
    config: BallSensorConfig,
    /// Two count buffers: one collecting, one holding the window being evaluated
    counts: [[u16; TSOP_NUM]; 2],
    /// Buffer currently collecting samples
    collecting: usize,
    /// Samples taken in the current window
    samples: u16,
    /// Last finished estimate using the weighted bearing
    observation: BallObservation,
    /// Last finished estimate using the top receiver only
    simple: BallObservation,
}

impl Default for BallSensorArray {
    fn default() -> Self {
        Self::new(BallSensorConfig::default())
    }
}

impl BallSensorArray {
    /// Creates an array with empty buffers and no ball
    pub fn new(config: BallSensorConfig) -> Self {
        Self {
            config,
            counts: [[0; TSOP_NUM]; 2],
            collecting: 0,
            samples: 0,
            observation: BallObservation::NONE,
            simple: BallObservation::NONE,
        }
    }

    /// Records one read of every receiver
    ///
    /// Bit `i` of `detections` is set when receiver `i` saw IR in this read.
    pub fn record_sample(&mut self, detections: u32) {
        let buffer = &mut self.counts[self.collecting];
        for (i, count) in buffer.iter_mut().enumerate() {
            if detections & (1 << i) != 0 {
                *count = count.saturating_add(1);
            }
        }
        self.samples = self.samples.saturating_add(1);
    }

    /// Whether the current window has collected all its samples
    pub fn window_complete(&self) -> bool {
        self.samples >= TSOP_LOOP_COUNT
    }

    /// Closes the current window and evaluates it
    ///
    /// Must be called exactly once per window. Swaps the buffers, runs the whole
    /// pipeline on the finished counts and publishes the new estimate.
    pub fn finish_window(&mut self) -> BallObservation {
        let finished = self.collecting;
        self.collecting ^= 1;
        self.counts[self.collecting] = [0; TSOP_NUM];
        self.samples = 0;

        let counts = self.counts[finished];
        self.evaluate(&counts)
    }

    /// Runs the window pipeline on a set of counts and publishes the result
    pub fn evaluate(&mut self, counts: &[u16; TSOP_NUM]) -> BallObservation {
        let gated = noise_gate(counts, &self.config);
        let filtered = smooth(&gated, &self.config);
        let ranking: Ranking<u16, TSOP_NUM> = Ranking::from_values(&filtered);

        self.simple = BallObservation {
            bearing: simple_bearing(&ranking, &self.config),
            strength: ranking.top().map_or(0, |top| top.value),
        };
        self.observation = BallObservation {
            bearing: weighted_bearing(&ranking, &self.config),
            strength: strength(&ranking, &self.config),
        };

        log_debug!(
            "ball window: bearing {:?} strength {}",
            self.observation.bearing,
            self.observation.strength
        );
        self.observation
    }

    /// Weighted bearing of the last window, `None` when no ball is seen
    pub fn bearing(&self) -> Option<u16> {
        self.observation.bearing
    }

    /// Bearing of the strongest receiver of the last window
    pub fn simple_bearing(&self) -> Option<u16> {
        self.simple.bearing
    }

    /// Mean of the strongest receivers of the last window
    pub fn strength(&self) -> u16 {
        self.observation.strength
    }

    /// Value of the strongest receiver of the last window
    pub fn simple_strength(&self) -> u16 {
        self.simple.strength
    }

    /// Whether the ball is close enough to be in the robot's grip
    pub fn has_ball(&self) -> bool {
        self.observation.strength > self.config.has_ball_strength
    }

    /// Last finished estimate
    pub fn observation(&self) -> BallObservation {
        self.observation
    }
}

/// Zeroes counts outside the trusted range
pub fn noise_gate(counts: &[u16; TSOP_NUM], config: &BallSensorConfig) -> [u16; TSOP_NUM] {
    let mut gated = [0; TSOP_NUM];
    for (out, &count) in gated.iter_mut().zip(counts.iter()) {
        if count >= config.min_ignore && count <= config.max_ignore {
            *out = count;
        }
    }
    gated
}

/// Weighted neighbourhood sums before normalisation
pub fn neighbourhood_sums(values: &[u16; TSOP_NUM], config: &BallSensorConfig) -> [u32; TSOP_NUM] {
    let at = |i: isize| values[i.rem_euclid(TSOP_NUM as isize) as usize] as u32;
    let mut sums = [0; TSOP_NUM];
    for (i, sum) in sums.iter_mut().enumerate() {
        let i = i as isize;
        *sum = config.k1 as u32 * at(i)
            + config.k2 as u32 * (at(i + 1) + at(i - 1))
            + config.k3 as u32 * (at(i + 2) + at(i - 2));
    }
    sums
}

/// Circular neighbourhood smoothing
pub fn smooth(values: &[u16; TSOP_NUM], config: &BallSensorConfig) -> [u16; TSOP_NUM] {
    let total_weight = (config.k1 as u32 + 2 * config.k2 as u32 + 2 * config.k3 as u32).max(1);
    let sums = neighbourhood_sums(values, config);
    let mut filtered = [0; TSOP_NUM];
    for (out, sum) in filtered.iter_mut().zip(sums.iter()) {
        *out = (sum / total_weight) as u16;
    }
    filtered
}

/// Direction of a receiver in whole degrees
fn index_to_degrees(index: usize) -> u16 {
    (index * 360 / TSOP_NUM) as u16
}

/// Bearing of the strongest receiver, `None` if it is at or below the noise floor
pub fn simple_bearing<const N: usize>(ranking: &Ranking<u16, N>, config: &BallSensorConfig) -> Option<u16> {
    let top = ranking.top()?;
    if top.value <= config.min_ignore {
        return None;
    }
    Some(index_to_degrees(top.index))
}

/// Offset of `index` from `best`, wrapped into `(-N/2, N/2]`
fn circular_offset(index: usize, best: usize) -> i32 {
    let half = (TSOP_NUM / 2) as i32;
    let mut offset = index as i32 - best as i32;
    if offset < 1 - half {
        offset += TSOP_NUM as i32;
    }
    if offset > half {
        offset -= TSOP_NUM as i32;
    }
    offset
}

/// Weighted mean direction of the strongest receivers
///
/// Offsets from the top receiver are averaged with weight `first_weight` for the
/// top entry, `second_weight` for the runner-up and 1 for the rest, then added
/// back onto the top receiver's index.
pub fn weighted_bearing<const N: usize>(
    ranking: &Ranking<u16, N>,
    config: &BallSensorConfig,
) -> Option<u16> {
    let top = ranking.top()?;
    if top.value <= config.min_ignore {
        return None;
    }

    let mut total = 0i32;
    let mut weight = 0i32;
    for (rank, entry) in ranking.entries().iter().take(config.best_for_angle).enumerate() {
        let w = match rank {
            0 => config.first_weight,
            1 => config.second_weight,
            _ => 1,
        };
        total += w * circular_offset(entry.index, top.index);
        weight += w;
    }

    let average = if weight > 0 {
        total as f32 / weight as f32
    } else {
        0.0
    };
    let index = libm::fmodf(top.index as f32 + average + TSOP_NUM as f32, TSOP_NUM as f32);
    Some(angle::to_degrees_u16(index * 360.0 / TSOP_NUM as f32))
}

/// Mean of the strongest receivers
pub fn strength<const N: usize>(ranking: &Ranking<u16, N>, config: &BallSensorConfig) -> u16 {
    let n = config.best_for_strength.max(1);
    let total: u32 = ranking
        .entries()
        .iter()
        .take(n)
        .map(|entry| entry.value as u32)
        .sum();
    (total / n as u32) as u16
}
