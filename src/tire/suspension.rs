// ==============================================================================
// suspension.rs: RAYCAST SPRING-DAMPER
// ------------------------------------------------------------------------------
// Given the hit distance of the tire's downward ray:
//
//     offset   = hit_distance - rest_distance
//     v_up     = up · v(tire)
//     F        = -(offset * spring_strength) - (v_up * spring_damp)
//
// F is applied along the tire up axis at the tire position. A hanging wheel
// (offset > 0) pulls the chassis down, a compressed one pushes it up.
// The caller only invokes this on a hit; an airborne tire gets nothing.
// ==============================================================================

use crate::tire::types::{AppliedForce, TireFrame, Vec3};
use crate::vehicle::SuspensionConfig;

/// Scalar spring-damper force along the suspension axis (N).
#[inline]
pub fn spring_damper(offset: f32, velocity_along_up: f32, strength: f32, damp: f32) -> f32 {
    -(offset * strength) - (velocity_along_up * damp)
}

pub fn suspension_force(
    frame: &TireFrame,
    hit_distance: f32,
    tire_velocity: Vec3,
    cfg: &SuspensionConfig,
) -> AppliedForce {
    let velocity_along_up = frame.up.dot(&tire_velocity);
    let offset = hit_distance - cfg.rest_distance;

    let force = spring_damper(offset, velocity_along_up, cfg.spring_strength, cfg.spring_damp);

    AppliedForce::along(frame.up, force, frame.position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tire::types::Pos3;
    use approx::assert_relative_eq;

    fn flat_frame() -> TireFrame {
        TireFrame {
            position: Pos3::new(1.0, 0.9, 1.8),
            forward: Vec3::z(),
            right: -Vec3::x(),
            up: Vec3::y(),
        }
    }

    fn cfg() -> SuspensionConfig {
        SuspensionConfig {
            ray_length: 1.2,
            rest_distance: 0.9,
            spring_strength: 30_000.0,
            spring_damp: 3_000.0,
        }
    }

    #[test]
    fn rest_distance_at_rest_is_equilibrium() {
        let f = suspension_force(&flat_frame(), 0.9, Vec3::zeros(), &cfg());
        assert!(f.is_zero());
    }

    #[test]
    fn compressed_spring_pushes_up() {
        let f = suspension_force(&flat_frame(), 0.8, Vec3::zeros(), &cfg());
        assert_relative_eq!(f.force.y, 3_000.0, epsilon = 1e-2);
        assert_eq!(f.point, flat_frame().position);
    }

    #[test]
    fn hanging_wheel_retracts() {
        let f = suspension_force(&flat_frame(), 1.1, Vec3::zeros(), &cfg());
        assert!(f.force.y < 0.0);
    }

    #[test]
    fn damper_opposes_vertical_velocity() {
        let f = suspension_force(&flat_frame(), 0.9, Vec3::new(0.0, -2.0, 0.0), &cfg());
        assert_relative_eq!(f.force.y, 6_000.0);

        // sideways motion does not load the damper
        let f = suspension_force(&flat_frame(), 0.9, Vec3::new(3.0, 0.0, 4.0), &cfg());
        assert!(f.is_zero());
    }
}
