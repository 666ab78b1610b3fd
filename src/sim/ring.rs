//! Rotating, partially open rings
//!
//! A ring is one circle of the concentric set: a solid stroke with a single
//! angular gap that rotates with the ring. The solid arc reflects the ball;
//! passing through the gap to the far side deactivates the ring.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::consts::BOUNCE_MARGIN;
use crate::{angle_in_arc, angle_to, normalize_deg};

use super::state::Ball;

/// Ring lifecycle.
///
/// `JustDeactivated` marks the frame of escape so the set manager can collect
/// destroyed rings with a plain scan before they go `Inactive` or get
/// replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RingState {
    Active,
    JustDeactivated,
    Inactive,
}

/// One concentric ring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ring {
    /// Center shared by the whole concentric set
    pub center: Vec2,
    /// Current radius; shrinks toward `radius_floor`
    pub radius: f32,
    /// Radius at construction
    pub radius_initial: f32,
    /// Lower bound for shrinking
    pub radius_floor: f32,
    /// Gap center angle in degrees, [0, 360)
    pub angle: f32,
    /// Signed rotation speed in deg/s
    pub angular_vel: f32,
    /// Half-width of the gap sector in degrees
    pub gap_half_width: f32,
    /// Stroke width; doubles as the collision tolerance band
    pub thickness: f32,
    /// Palette index, cosmetic only
    pub color: u32,
    /// Lifecycle state
    pub state: RingState,
    /// Ball is currently transiting the gap (sector and contact band)
    #[serde(default)]
    ball_in_gap: bool,
    /// Radial side the ball was on when it entered the gap (true = inside)
    #[serde(default)]
    gap_entry_inside: bool,
}

impl Ring {
    pub fn new(
        center: Vec2,
        radius: f32,
        angle: f32,
        angular_vel: f32,
        color: u32,
        cfg: &SimConfig,
    ) -> Self {
        Self {
            center,
            radius,
            radius_initial: radius,
            radius_floor: cfg.ring_radius_floor,
            angle: normalize_deg(angle),
            angular_vel,
            gap_half_width: cfg.gap_half_width,
            thickness: cfg.ring_thickness,
            color,
            state: RingState::Active,
            ball_in_gap: false,
            gap_entry_inside: false,
        }
    }

    /// Whether the ring still collides and draws
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == RingState::Active
    }

    /// Advance rotation by one frame
    pub fn rotate(&mut self, dt: f32) {
        self.angle = normalize_deg(self.angle + self.angular_vel * dt);
    }

    /// Shrink toward the radius floor (rate 0 disables)
    pub fn shrink(&mut self, rate: f32, dt: f32) {
        if rate > 0.0 {
            self.radius = (self.radius - rate * dt).max(self.radius_floor);
        }
    }

    /// Gap sector bounds in degrees, counter-clockwise from start to end
    pub fn gap_bounds(&self) -> (f32, f32) {
        (
            normalize_deg(self.angle - self.gap_half_width),
            normalize_deg(self.angle + self.gap_half_width),
        )
    }

    /// Test the ball against this ring.
    ///
    /// Returns true iff the ball is contacting the solid arc. As a side
    /// effect this tracks gap transit across frames and fires the escape
    /// transition (`Active -> JustDeactivated`) the moment the gap state ends
    /// with the ball on the far radial side. The transition fires at most
    /// once: a deactivated ring stops colliding entirely.
    pub fn check_collision(&mut self, ball: &Ball) -> bool {
        if !self.is_active() {
            return false;
        }

        let distance = (ball.pos - self.center).length();

        // Thickness-aware contact band around the current radius
        let in_band = (distance - self.radius).abs() <= ball.radius + self.thickness / 2.0;

        let ball_angle = angle_to(self.center, ball.pos);
        let (gap_start, gap_end) = self.gap_bounds();
        let in_gap = in_band && angle_in_arc(ball_angle, gap_start, gap_end);

        if in_gap {
            if !self.ball_in_gap {
                self.ball_in_gap = true;
                self.gap_entry_inside = distance < self.radius;
            }
            return false;
        }

        // Gap transit over: escaped if the ball came out on the other radial
        // side, otherwise it backed out the way it came in.
        if self.ball_in_gap {
            self.ball_in_gap = false;
            let now_inside = distance < self.radius;
            if now_inside != self.gap_entry_inside {
                self.state = RingState::JustDeactivated;
                return false;
            }
        }

        in_band
    }

    /// Reflect the ball off the solid arc and park it clear of the band.
    ///
    /// Reflects only when the velocity points into the ring from the ball's
    /// own side; a ball already moving away is left alone so one contact
    /// cannot reflect twice. A ball sitting exactly on the center has no
    /// usable normal and is skipped.
    pub fn resolve_bounce(&self, ball: &mut Ball) {
        let offset = ball.pos - self.center;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return;
        }
        let normal = offset / distance;
        let dot = ball.vel.dot(normal);

        let inside = distance < self.radius;
        if (inside && dot > 0.0) || (!inside && dot < 0.0) {
            ball.vel = reflect(ball.vel, normal);

            // Non-penetration margin on the ball's own side
            let clearance = ball.radius + BOUNCE_MARGIN;
            let corrected = if inside {
                self.radius - clearance
            } else {
                self.radius + clearance
            };
            ball.pos = self.center + normal * corrected;
        }
    }
}

/// Standard elastic reflection about a unit normal: `v - 2(v·n)n`
#[inline]
pub fn reflect(vel: Vec2, normal: Vec2) -> Vec2 {
    vel - 2.0 * vel.dot(normal) * normal
}
