// ==============================================================================
// lateral.rs: SPEED-BLENDED CORNERING GRIP
// ------------------------------------------------------------------------------
// Cancels a fraction of the tire's sideways velocity each step:
//
//     v_lat  = right · v(tire)
//     n      = clamp01(|v_lat| / grip_speed_threshold)
//     grip   = lerp(slow_grip, fast_grip, blend(n))
//     F      = right * grip_mass * (-v_lat * grip) / dt
//
// Dividing by dt turns the one-step velocity correction into a force;
// grip_mass is the tire's share of the chassis mass unless configured.
// The forward component of velocity is never read.
// ==============================================================================

use crate::tire::types::{AppliedForce, TireFrame, Vec3, clamp01, lerp};
use crate::vehicle::TireConfig;

/// Fraction of lateral velocity cancelled at this sideways speed.
pub fn grip_factor(cfg: &TireConfig, lateral_speed: f32) -> f32 {
    let normalized = clamp01(lateral_speed.abs() / cfg.grip_speed_threshold);
    lerp(cfg.slow_grip, cfg.fast_grip, cfg.grip_blend.eval(normalized))
}

pub fn lateral_force(
    frame: &TireFrame,
    tire_velocity: Vec3,
    cfg: &TireConfig,
    grip_mass: f32,
    dt: f32,
) -> AppliedForce {
    let steering_velocity = frame.right.dot(&tire_velocity);
    let grip = grip_factor(cfg, steering_velocity);

    let desired_velocity_change = -steering_velocity * grip;
    let desired_acceleration = desired_velocity_change / dt;

    AppliedForce::along(frame.right, grip_mass * desired_acceleration, frame.position)
}
