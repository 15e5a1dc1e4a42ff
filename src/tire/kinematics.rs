// ==============================================================================
// kinematics.rs: TIRE FRAME + POINT VELOCITY (WORLD SPACE)
// ------------------------------------------------------------------------------
// Chassis convention: right-handed, +Y up, +Z forward, so the chassis right is
// forward × up = -X.
//
// tire_frame(...):
// - World position = chassis isometry * tire local offset
// - Orientation = chassis rotation ∘ tire yaw about local up
// - Positive yaw turns forward toward right
//
// point_velocity(...):
//     v(p) = v_lin + ω × (p - com)
// with com the WORLD center of mass.
// ==============================================================================

use nalgebra::{Isometry3, UnitQuaternion, Vector3};

use crate::tire::types::{Pos3, TireFrame, Vec3};

/// World-space velocity of a point rigidly attached to the body.
#[inline]
pub fn point_velocity(linvel: Vec3, angvel: Vec3, com: Pos3, p: Pos3) -> Vec3 {
    linvel + angvel.cross(&(p - com))
}

/// Yaw about local up; positive degrees steer right.
#[inline]
pub fn yaw_rotation(yaw_deg: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -yaw_deg.to_radians())
}

#[inline]
pub fn chassis_forward(chassis: &Isometry3<f32>) -> Vec3 {
    chassis.rotation * Vector3::z()
}

pub fn tire_frame(chassis: &Isometry3<f32>, local_offset: Pos3, yaw_deg: f32) -> TireFrame {
    let rot = chassis.rotation * yaw_rotation(yaw_deg);

    let forward = rot * Vector3::z();
    let up = rot * Vector3::y();
    let right = forward.cross(&up);

    TireFrame {
        position: chassis * local_offset,
        forward,
        right,
        up,
    }
}
