//! Goal tracking from camera blobs
//!
//! The camera reports coloured blobs. Each poll, the tracker picks the goal the
//! robot currently cares about (the opponent's goal when attacking, the own goal
//! when defending) and turns it into a camera-relative angle and a distance.
//!
//! # Filters
//! A blob is a goal candidate when it:
//! - is at least `min_area` pixels
//! - carries the colour signature of the wanted goal
//! - points, combined with the heading, at the side of the field that goal is on
//!
//! The largest candidate wins. A goal that was seen recently but is hidden this
//! poll is reported as [`GoalStatus::Blocked`] with its last known values.

use moving_median::MovingMedian;

use crate::angle;
use crate::config::GoalConfig;

/// Samples in the distance median
const DISTANCE_WINDOW_SIZE: usize = 5;

/// One camera detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "firmware", derive(defmt::Format))]
pub struct Blob {
    pub signature: u8,
    /// Centre of the blob, pixels from the left edge
    pub x: u16,
    /// Centre of the blob, pixels from the top edge
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Blob {
    pub fn area(&self) -> u32 {
        self.width as u32 * self.height as u32
    }
}

/// Which goal the robot is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "firmware", derive(defmt::Format))]
pub enum GoalTarget {
    /// The opponent's goal, straight up the field
    Attack,
    /// The own goal, straight down the field
    Defend,
}

impl GoalTarget {
    /// Field direction the goal lies in
    pub fn field_direction(&self) -> f32 {
        match self {
            GoalTarget::Attack => 0.0,
            GoalTarget::Defend => 180.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "firmware", derive(defmt::Format))]
pub enum GoalStatus {
    #[default]
    Invisible,
    /// Seen on this poll
    Visible,
    /// Hidden on this poll but seen recently, values are from the last sighting
    Blocked,
}

/// Where the wanted goal is
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GoalObservation {
    pub status: GoalStatus,
    /// Camera-relative angle, negative to the left
    pub angle: f32,
    /// Estimated distance, larger is further
    pub distance: f32,
}

impl GoalObservation {
    pub const INVISIBLE: Self = Self {
        status: GoalStatus::Invisible,
        angle: 0.0,
        distance: 0.0,
    };

    /// Whether the values can be steered by (visible or recently seen)
    pub fn is_tracked(&self) -> bool {
        self.status != GoalStatus::Invisible
    }
}

/// Picks and smooths the wanted goal across polls
pub struct GoalTracker {
    config: GoalConfig,
    distance_filter: MovingMedian<f32, DISTANCE_WINDOW_SIZE>,
    last: GoalObservation,
    last_target: Option<GoalTarget>,
    last_seen: Option<u64>,
}

impl Default for GoalTracker {
    fn default() -> Self {
        Self::new(GoalConfig::default())
    }
}

impl GoalTracker {
    pub fn new(config: GoalConfig) -> Self {
        Self {
            config,
            distance_filter: MovingMedian::new(),
            last: GoalObservation::INVISIBLE,
            last_target: None,
            last_seen: None,
        }
    }

    /// Feeds one camera poll
    pub fn update(&mut self, blobs: &[Blob], target: GoalTarget, heading: f32, now: u64) -> GoalObservation {
        if self.last_target != Some(target) {
            // A different goal, the old distances say nothing about it
            self.distance_filter = MovingMedian::new();
            self.last_seen = None;
            self.last_target = Some(target);
        }

        let best = blobs
            .iter()
            .filter(|blob| self.accepts(blob, target, heading))
            .fold(None::<&Blob>, |best, blob| match best {
                Some(current) if current.area() >= blob.area() => Some(current),
                _ => Some(blob),
            });

        self.last = match best {
            Some(blob) => {
                self.distance_filter.add_value(self.distance_of(blob));
                self.last_seen = Some(now);
                GoalObservation {
                    status: GoalStatus::Visible,
                    angle: self.angle_of(blob),
                    distance: self.distance_filter.median(),
                }
            }
            None => match self.last_seen {
                Some(seen) if now.saturating_sub(seen) <= self.config.last_seen_time => GoalObservation {
                    status: GoalStatus::Blocked,
                    ..self.last
                },
                _ => GoalObservation::INVISIBLE,
            },
        };

        self.last
    }

    /// Last result of [`GoalTracker::update`]
    pub fn observation(&self) -> GoalObservation {
        self.last
    }

    fn accepts(&self, blob: &Blob, target: GoalTarget, heading: f32) -> bool {
        let signature = match target {
            GoalTarget::Attack => self.config.attack_signature,
            GoalTarget::Defend => self.config.defend_signature,
        };
        if blob.signature != signature || blob.area() < self.config.min_area {
            return false;
        }
        let field_angle = angle::normalize(heading + self.angle_of(blob));
        angle::distance(field_angle, target.field_direction()) <= self.config.alignment_angle
    }

    fn angle_of(&self, blob: &Blob) -> f32 {
        let width = self.config.frame_width as f32;
        (blob.x as f32 - width / 2.0) / width * self.config.horizontal_fov
    }

    fn distance_of(&self, blob: &Blob) -> f32 {
        self.config.distance_multiplier / blob.height.max(1) as f32
    }
}
