//! Ring Fall - a ball under gravity inside rotating concentric rings
//!
//! Core modules:
//! - `sim`: the simulation (ball, rings, collisions, frame step)
//! - `config`: validated simulation configuration
//!
//! Window, input handling, HUD and frame pacing live outside this crate.
//! They read state snapshots and feed back a frame delta plus discrete
//! commands once per frame.

pub mod config;
pub mod sim;

pub use config::SimConfig;

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Screen dimensions (pixels)
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    /// Default trail capacity (past positions kept for rendering)
    pub const TRAIL_CAPACITY: usize = 30;

    /// Default gravity (pixels/s², positive is down in screen coordinates)
    pub const GRAVITY: f32 = 1080.0;

    /// Largest frame delta accepted by one step (spiral-of-death guard)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Ring color palette size; the renderer maps indices to actual colors
    pub const RING_PALETTE: u32 = 6;

    /// Maximum simultaneous shockwave effects
    pub const MAX_SHOCKWAVES: usize = 32;

    /// Gap kept between the ball surface and a ring band after a bounce
    pub const BOUNCE_MARGIN: f32 = 0.5;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_deg(angle: f32) -> f32 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if a >= 360.0 { a - 360.0 } else { a }
}

/// Test whether `angle` lies on the closed arc from `start` to `end`,
/// going counter-clockwise (increasing angle). Degrees.
///
/// Handles the wraparound case where the arc crosses the 0° seam
/// (`start > end` after normalization). Endpoints are inclusive, so a
/// degenerate arc (`start == end`) matches only the boundary angle.
#[inline]
pub fn angle_in_arc(angle: f32, start: f32, end: f32) -> bool {
    let a = normalize_deg(angle);
    let s = normalize_deg(start);
    let e = normalize_deg(end);

    if s <= e {
        a >= s && a <= e
    } else {
        // Arc crosses 0°
        a >= s || a <= e
    }
}

/// Point at `radius` pixels from `center` in the direction `deg`
/// (screen coordinates, y grows downward)
#[inline]
pub fn polar_offset(center: Vec2, radius: f32, deg: f32) -> Vec2 {
    let rad = deg.to_radians();
    center + Vec2::new(rad.cos(), rad.sin()) * radius
}

/// Direction angle in degrees ([0, 360)) from `center` toward `p`
#[inline]
pub fn angle_to(center: Vec2, p: Vec2) -> f32 {
    let d = p - center;
    normalize_deg(d.y.atan2(d.x).to_degrees())
}
