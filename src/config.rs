//! Simulation configuration
//!
//! One flat struct of tunables consumed at construction. Values are validated
//! up front and rejected when out of range rather than silently clamped, so
//! the simulation invariants hold for the whole run.

use anyhow::{Result, bail};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Everything the simulation needs to build its initial state.
///
/// Runtime-mutable knobs (gravity, trail length, target frame rate) are copied
/// into [`crate::sim::Physics`] at construction; the rest stays fixed and is
/// reused by the reset commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    // === Arena ===
    /// Screen width in pixels
    pub width: f32,
    /// Screen height in pixels
    pub height: f32,
    /// Center shared by every ring
    pub center: Vec2,

    // === Ball ===
    /// Ball radius (fixed for the whole run)
    pub ball_radius: f32,
    /// Base spawn point; the actual spawn is jittered horizontally
    pub ball_spawn: Vec2,
    /// Horizontal spawn jitter (± pixels)
    pub ball_spawn_jitter: f32,
    /// Maximum magnitude of the random initial horizontal velocity (px/s)
    pub ball_launch_speed: f32,
    /// Trail capacity (past positions kept for rendering)
    pub trail_capacity: usize,

    // === Physics ===
    /// Gravity in px/s², positive is down; sign flips on invert-gravity
    pub gravity: f32,
    /// Fraction of velocity retained per second (1.0 disables damping)
    pub damping_per_sec: f32,
    /// Anti-stall speed floor in px/s (0 disables)
    pub min_speed: f32,
    /// Per-axis velocity jitter applied when the speed floor engages (px/s)
    pub stall_jitter: f32,

    // === Screen edges ===
    /// Velocity fraction kept on a wall bounce (1.0 = lossless)
    pub wall_restitution: f32,
    /// Minimum rebound speed off the gravity-facing edge (px/s, 0 disables)
    pub floor_rebound_min: f32,

    // === Rings ===
    /// Initial ring radii, outermost first
    pub ring_radii: Vec<f32>,
    /// Stroke thickness, also the collision tolerance band
    pub ring_thickness: f32,
    /// Half-width of the gap sector in degrees
    pub gap_half_width: f32,
    /// Radius a shrinking ring cannot go below
    pub ring_radius_floor: f32,
    /// Shrink rate in px/s (0 disables shrinking)
    pub shrink_rate: f32,
    /// Spin magnitude band for replacement rings (deg/s)
    pub spin_min: f32,
    pub spin_max: f32,

    // === Regeneration ===
    /// Replace escaped rings with fresh ones
    pub regenerate: bool,
    /// Random radius candidates tried before the off-screen fallback
    pub replace_attempts: u32,
    /// Preferred radius band for replacement rings
    pub replace_min_radius: f32,
    pub replace_max_radius: f32,
    /// Minimum radial separation from surviving rings
    pub replace_margin: f32,
    /// Fallback radius, off screen until shrinking brings it into view
    pub offscreen_radius: f32,

    // === Host loop ===
    /// Target frame rate knob for the (external) pacing layer
    pub target_fps: u32,

    // === Determinism ===
    /// Seed for the simulation RNG
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            center: Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0),

            ball_radius: BALL_RADIUS,
            ball_spawn: Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 3.0),
            ball_spawn_jitter: 30.0,
            ball_launch_speed: 180.0,
            trail_capacity: TRAIL_CAPACITY,

            gravity: GRAVITY,
            damping_per_sec: 1.0,
            min_speed: 60.0,
            stall_jitter: 20.0,

            wall_restitution: 1.0,
            floor_rebound_min: 260.0,

            ring_radii: vec![280.0, 230.0, 180.0, 140.0, 100.0, 60.0],
            ring_thickness: 3.0,
            gap_half_width: 20.0,
            ring_radius_floor: 40.0,
            shrink_rate: 12.0,
            spin_min: 15.0,
            spin_max: 65.0,

            regenerate: true,
            replace_attempts: 12,
            replace_min_radius: 60.0,
            replace_max_radius: 300.0,
            replace_margin: 25.0,
            offscreen_radius: 520.0,

            target_fps: 60,

            seed: 1,
        }
    }
}

impl SimConfig {
    /// Check every invariant the simulation relies on.
    ///
    /// Called by `SimState::new`; malformed configuration is the only fatal
    /// condition the core knows about.
    pub fn validate(&self) -> Result<()> {
        if self.ball_radius <= 0.0 {
            bail!("ball_radius must be positive, got {}", self.ball_radius);
        }
        if self.width <= self.ball_radius * 2.0 || self.height <= self.ball_radius * 2.0 {
            bail!(
                "arena {}x{} cannot contain a ball of radius {}",
                self.width,
                self.height,
                self.ball_radius
            );
        }
        if self.trail_capacity == 0 {
            bail!("trail_capacity must be at least 1");
        }
        if !(self.damping_per_sec > 0.0 && self.damping_per_sec <= 1.0) {
            bail!(
                "damping_per_sec must be in (0, 1], got {}",
                self.damping_per_sec
            );
        }
        if self.min_speed < 0.0 || self.stall_jitter < 0.0 {
            bail!("min_speed and stall_jitter must not be negative");
        }
        if !(self.wall_restitution > 0.0 && self.wall_restitution <= 1.0) {
            bail!(
                "wall_restitution must be in (0, 1], got {}",
                self.wall_restitution
            );
        }
        if self.floor_rebound_min < 0.0 {
            bail!("floor_rebound_min must not be negative");
        }
        if self.ring_radii.is_empty() {
            bail!("ring_radii must name at least one ring");
        }
        if self.ring_radius_floor <= 0.0 {
            bail!(
                "ring_radius_floor must be positive, got {}",
                self.ring_radius_floor
            );
        }
        for &r in &self.ring_radii {
            if r < self.ring_radius_floor {
                bail!(
                    "ring radius {} is below the radius floor {}",
                    r,
                    self.ring_radius_floor
                );
            }
        }
        if self.ring_thickness <= 0.0 {
            bail!("ring_thickness must be positive, got {}", self.ring_thickness);
        }
        if !(self.gap_half_width > 0.0 && self.gap_half_width < 180.0) {
            bail!(
                "gap_half_width must be in (0, 180) degrees, got {}",
                self.gap_half_width
            );
        }
        if self.shrink_rate < 0.0 {
            bail!("shrink_rate must not be negative, got {}", self.shrink_rate);
        }
        if self.spin_min < 0.0 || self.spin_max < self.spin_min {
            bail!(
                "spin band [{}, {}] is not a valid range",
                self.spin_min,
                self.spin_max
            );
        }
        if self.replace_attempts == 0 {
            bail!("replace_attempts must be at least 1");
        }
        if self.replace_min_radius < self.ring_radius_floor
            || self.replace_max_radius < self.replace_min_radius
        {
            bail!(
                "replacement band [{}, {}] must sit above the radius floor {}",
                self.replace_min_radius,
                self.replace_max_radius,
                self.ring_radius_floor
            );
        }
        if self.replace_margin < 0.0 {
            bail!("replace_margin must not be negative");
        }
        if self.offscreen_radius < self.replace_max_radius {
            bail!(
                "offscreen_radius {} must be at least the replacement band top {}",
                self.offscreen_radius,
                self.replace_max_radius
            );
        }
        if self.target_fps == 0 {
            bail!("target_fps must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_frame_rate() {
        let cfg = SimConfig {
            target_fps: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_ball_radius() {
        let cfg = SimConfig {
            ball_radius: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SimConfig {
            ball_radius: -4.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_wide_gap() {
        let cfg = SimConfig {
            gap_half_width: 180.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_ring_below_floor() {
        let cfg = SimConfig {
            ring_radii: vec![280.0, 30.0],
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
