//! Core shared types for `tire` (engine-agnostic).
// tire/types.rs
use nalgebra::{Point3, Vector3};

use crate::vehicle::TireConfig;

pub type Vec3 = Vector3<f32>;
pub type Pos3 = Point3<f32>;

#[inline]
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Clamped linear interpolation, `t` is forced into [0, 1].
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * clamp01(t)
}

// ============================================
// Tire frame (world space)
// ============================================

/// World-space placement of one tire for the current tick.
#[derive(Debug, Clone, Copy)]
pub struct TireFrame {
    pub position: Pos3, // world point forces are applied at
    pub forward: Vec3,  // rolling direction (includes steering yaw)
    pub right: Vec3,    // lateral direction
    pub up: Vec3,       // suspension axis
}

// ============================================
// Force output
// ============================================

/// A force to apply at a world point for exactly one physics step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedForce {
    pub force: Vec3,  // N, world space
    pub point: Pos3,  // world space
}

impl AppliedForce {
    pub fn along(dir: Vec3, magnitude: f32, point: Pos3) -> Self {
        Self { force: dir * magnitude, point }
    }

    pub fn zero(point: Pos3) -> Self {
        Self { force: Vec3::zeros(), point }
    }

    pub fn is_zero(&self) -> bool {
        self.force == Vec3::zeros()
    }
}

// ============================================
// Tire (runtime)
// ============================================

/// One wheel attachment point. Everything except the steering yaw is fixed
/// at assembly time.
#[derive(Debug, Clone)]
pub struct Tire {
    config: TireConfig,
    grip_mass: f32, // kg used to turn the lateral velocity change into a force
    yaw_deg: f32,   // written only by the steering pass
}

impl Tire {
    pub(crate) fn new(config: TireConfig, default_grip_mass: f32) -> Self {
        let grip_mass = config.tire_mass.unwrap_or(default_grip_mass);
        Self { config, grip_mass, yaw_deg: 0.0 }
    }

    pub fn config(&self) -> &TireConfig {
        &self.config
    }

    pub fn local_offset(&self) -> Pos3 {
        let [x, y, z] = self.config.local_offset;
        Pos3::new(x, y, z)
    }

    pub fn can_thrust(&self) -> bool {
        self.config.can_thrust
    }

    /// Signed steering multiplier: 0 = fixed, 1 = steers, -1 = counter-steers.
    pub fn steer_multiplier(&self) -> f32 {
        self.config.can_rotate
    }

    pub fn grip_mass(&self) -> f32 {
        self.grip_mass
    }

    pub fn yaw_deg(&self) -> f32 {
        self.yaw_deg
    }

    pub(crate) fn set_steering_angle(&mut self, steering_angle_deg: f32) {
        self.yaw_deg = self.config.can_rotate * steering_angle_deg;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lerp_clamps_parameter() {
        assert_relative_eq!(lerp(1.0, 0.5, 0.5), 0.75);
        assert_relative_eq!(lerp(1.0, 0.5, 4.0), 0.5);
        assert_relative_eq!(lerp(1.0, 0.5, -1.0), 1.0);
    }

    #[test]
    fn counter_steer_multiplier_inverts_yaw() {
        let mut tire = Tire::new(
            TireConfig {
                can_rotate: -1.0,
                ..TireConfig::default()
            },
            300.0,
        );
        tire.set_steering_angle(12.0);
        assert_relative_eq!(tire.yaw_deg(), -12.0);
    }

    #[test]
    fn explicit_tire_mass_overrides_share() {
        let tire = Tire::new(
            TireConfig {
                tire_mass: Some(42.0),
                ..TireConfig::default()
            },
            300.0,
        );
        assert_relative_eq!(tire.grip_mass(), 42.0);
    }
}
