//! Boundary line tracking
//!
//! The line sensors only see the white line while the robot is on top of it. Once
//! the robot has crossed further, the line drops out of view again, so the field
//! position is tracked with memory: the tracker remembers which edge was seen and
//! how deep the robot was, and reasons about what "no line" means from there.
//!
//! # Size
//! The sensor node reports how far across the line the robot is, as a depth in
//! `[0, 2]`: 0 just touching, 1 centred on the line, 2 fully across. Mirroring a
//! reading (the robot crossed to the far side of the line) maps `size` to
//! `2 - size` and turns the bearing around.
//!
//! # Wire format
//! The sensor node answers with one packed word, see [`LineReading::pack`].

use crate::angle;
use crate::config::{LineConfig, NO_LINE_ANGLE, NO_LINE_SIZE};

/// How deep into the line the robot is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "firmware", derive(defmt::Format))]
pub enum LineSize {
    /// On the field, no line
    #[default]
    None,
    /// Touching the line
    Small,
    /// On the line
    Big,
    /// Over the line
    Over,
}

impl LineSize {
    /// Category of a line depth
    pub fn from_size(size: f32, config: &LineConfig) -> Self {
        if size <= config.small_size {
            LineSize::Small
        } else if size <= config.big_size {
            LineSize::Big
        } else {
            LineSize::Over
        }
    }
}

/// One reading of the line sensor node, robot-relative
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineReading {
    /// Bearing of the line in `[0, 360)`, `None` when no line is seen
    pub angle: Option<u16>,
    /// Depth into the line, see the module docs
    pub size: f32,
}

impl LineReading {
    /// No line under the robot
    pub const NONE: Self = Self {
        angle: None,
        size: NO_LINE_SIZE,
    };

    pub fn new(angle: u16, size: f32) -> Self {
        Self {
            angle: Some(angle % 360),
            size,
        }
    }

    /// Packs the reading into one link word
    ///
    /// Bits 0-8 carry the bearing ([`NO_LINE_ANGLE`] when no line is seen),
    /// bits 9-15 carry `size * 50`.
    pub fn pack(&self) -> u16 {
        let angle = self.angle.unwrap_or(NO_LINE_ANGLE) & 0x1FF;
        let size = libm::roundf(self.size * 50.0).clamp(0.0, 127.0) as u16;
        angle | (size << 9)
    }

    /// Reverses [`LineReading::pack`]
    pub fn unpack(word: u16) -> Self {
        let angle = word & 0x1FF;
        if angle >= 360 {
            return Self::NONE;
        }
        Self {
            angle: Some(angle),
            size: (word >> 9) as f32 / 50.0,
        }
    }
}

/// Current estimate of the robot's position relative to the field edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineObservation {
    pub on_field: bool,
    /// Field-relative bearing of the edge that was crossed, in `[0, 360)`
    pub angle: f32,
    /// Depth into the line
    pub size: f32,
    pub category: LineSize,
}

impl LineObservation {
    /// On the field with nothing to avoid
    pub const ON_FIELD: Self = Self {
        on_field: true,
        angle: 0.0,
        size: NO_LINE_SIZE,
        category: LineSize::None,
    };
}

/// Hysteretic on-field/off-field tracker
pub struct LineTracker {
    config: LineConfig,
    state: LineObservation,
}

impl Default for LineTracker {
    fn default() -> Self {
        Self::new(LineConfig::default())
    }
}

impl LineTracker {
    /// Starts on the field
    pub fn new(config: LineConfig) -> Self {
        Self {
            config,
            state: LineObservation::ON_FIELD,
        }
    }

    /// Feeds one sensor reading
    ///
    /// `heading` is the robot's compass heading, used to turn the robot-relative
    /// reading into a field-relative bearing.
    pub fn update(&mut self, reading: LineReading, heading: f32) -> LineObservation {
        let seen = reading
            .angle
            .map(|raw| angle::normalize(raw as f32 + heading));

        match (self.state.on_field, seen) {
            (true, None) => {}
            (true, Some(line_angle)) => {
                self.store(line_angle, reading.size);
                self.state.on_field = false;
                log_info!(
                    "line: left field at {} (size {})",
                    self.state.angle,
                    self.state.size
                );
            }
            (false, Some(line_angle)) => {
                if angle::distance(line_angle, self.state.angle) <= 90.0 {
                    self.store(line_angle, reading.size);
                } else {
                    self.mirror();
                }
            }
            (false, None) => {
                if self.state.category == LineSize::Over {
                    self.mirror();
                } else if self.state.size <= self.config.small_size {
                    self.state = LineObservation::ON_FIELD;
                    log_info!("line: back on field");
                } else {
                    self.state.category = LineSize::Over;
                }
            }
        }

        self.state
    }

    /// Stores a reading verbatim
    fn store(&mut self, line_angle: f32, size: f32) {
        self.state.angle = line_angle;
        self.state.size = size;
        self.state.category = LineSize::from_size(size, &self.config);
    }

    /// The robot is on the far side of the stored edge
    fn mirror(&mut self) {
        let mirrored_angle = angle::normalize(self.state.angle + 180.0);
        let mirrored_size = 2.0 - self.state.size;
        self.store(mirrored_angle, mirrored_size);
    }

    pub fn is_on_field(&self) -> bool {
        self.state.on_field
    }

    pub fn angle(&self) -> f32 {
        self.state.angle
    }

    pub fn size_category(&self) -> LineSize {
        self.state.category
    }

    pub fn observation(&self) -> LineObservation {
        self.state
    }
}
