//! Heading rate from successive compass readings

use crate::angle;

/// Remembers the previous heading to derive a per-cycle rate
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingTracker {
    previous: Option<f32>,
    heading: f32,
}

impl HeadingTracker {
    pub const fn new() -> Self {
        Self {
            previous: None,
            heading: 0.0,
        }
    }

    /// Feeds the current heading; returns the change since the last call in `(-180, 180]`
    ///
    /// The first reading has no predecessor and yields a rate of 0.
    pub fn update(&mut self, heading: f32) -> f32 {
        let heading = angle::normalize(heading);
        let rate = match self.previous {
            Some(previous) => angle::signed_difference(heading, previous),
            None => 0.0,
        };
        self.previous = Some(heading);
        self.heading = heading;
        rate
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_wraps_through_north() {
        let mut tracker = HeadingTracker::new();
        assert_eq!(tracker.update(355.0), 0.0);
        assert_eq!(tracker.update(5.0), 10.0);
        assert_eq!(tracker.update(350.0), -15.0);
        assert_eq!(tracker.heading(), 350.0);
    }
}
