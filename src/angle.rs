//! Angle helpers
//!
//! All angles in the crate are degrees, 0 = straight ahead (or field forward),
//! increasing clockwise. Stored angles are kept in `[0, 360)`; differences are
//! signed in `(-180, 180]`.

/// Wraps any angle into `[0, 360)`
pub fn normalize(angle: f32) -> f32 {
    let wrapped = libm::fmodf(angle, 360.0);
    let wrapped = if wrapped < 0.0 { wrapped + 360.0 } else { wrapped };
    // fmodf of a tiny negative value can round up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Shortest signed rotation from `from` to `to`, in `(-180, 180]`
pub fn signed_difference(to: f32, from: f32) -> f32 {
    let diff = normalize(to - from);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Unsigned angular distance between two angles, in `[0, 180]`
pub fn distance(a: f32, b: f32) -> f32 {
    libm::fabsf(signed_difference(a, b))
}

/// Rounds an angle to whole degrees, still inside `[0, 360)`
pub fn to_degrees_u16(angle: f32) -> u16 {
    let rounded = libm::roundf(normalize(angle)) as u16;
    if rounded >= 360 {
        0
    } else {
        rounded
    }
}

/// Converts degrees to radians
pub fn to_radians(angle: f32) -> f32 {
    angle * core::f32::consts::PI / 180.0
}

/// Converts radians to degrees
pub fn from_radians(radians: f32) -> f32 {
    radians * 180.0 / core::f32::consts::PI
}

/// Linear interpolation between two angles along the shorter arc
pub fn blend(from: f32, to: f32, factor: f32) -> f32 {
    normalize(from + signed_difference(to, from) * factor.clamp(0.0, 1.0))
}
