//! Line avoidance override
//!
//! Applied after the chosen law whenever the robot is off the field. Over the line
//! the robot always heads straight back in. On the line it only steps in when the
//! chosen movement would carry it further across or along the edge.

use super::Movement;
use crate::angle;
use crate::config::ControlConfig;
use crate::sensing::line::{LineObservation, LineSize};

/// Whether a field-relative line bearing points into a corner rather than at an edge
fn is_corner(line_angle: f32, threshold: f32) -> bool {
    let from_axis = libm::fmodf(angle::normalize(line_angle), 90.0);
    from_axis.min(90.0 - from_axis) > threshold
}

/// Replaces `movement` when it would take the robot out of the field
pub fn avoid_line(movement: Movement, line: &LineObservation, heading: f32, config: &ControlConfig) -> Movement {
    if line.on_field {
        return movement;
    }

    let line_relative = angle::normalize(line.angle - heading);
    let away = line_relative + 180.0;

    let speed = match line.category {
        LineSize::None => return movement,
        LineSize::Over => return Movement::new(away, config.over_line_speed as f32),
        LineSize::Big => config.line_speed as f32,
        LineSize::Small => config.line_speed as f32 * config.line_small_multiplier,
    };

    let buffer = if is_corner(line.angle, config.line_corner_threshold) {
        config.line_angle_buffer_corner
    } else {
        config.line_angle_buffer
    };

    if angle::distance(movement.angle, line_relative) < 90.0 + buffer {
        Movement::new(away, speed)
    } else {
        movement
    }
}
