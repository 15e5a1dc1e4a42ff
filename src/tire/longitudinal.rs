// ==============================================================================
// longitudinal.rs: ENGINE / BRAKE / IDLE DRAG
// ==============================================================================
// Three mutually exclusive branches picked by the sign of the acceleration
// input:
//
// 1) Thrust (input > 0, tire can thrust)
//      n = clamp01(|forward(car) · v_lin| / top_speed)
//      F = forward(tire) * engine_strength * torque_curve(n)
//    A tire without thrust capability gets nothing in this branch.
//
// 2) Brake (input < 0), every tire
//      F = forward(tire) * (-forward(tire) · v(tire)) * braking_strength / dt
//
// 3) Idle drag (input == 0), every tire
//      same as brake with idle_drag_strength
//
// Brake and idle drag are velocity-zeroing impulses turned into a per-step
// force, like the lateral model.
// ==============================================================================

use crate::tire::types::{AppliedForce, TireFrame, Vec3, clamp01};
use crate::vehicle::AccelerationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongitudinalMode {
    Thrust,
    Brake,
    Idle,
}

impl LongitudinalMode {
    pub fn from_input(acceleration_input: f32) -> Self {
        if acceleration_input > 0.0 {
            LongitudinalMode::Thrust
        } else if acceleration_input < 0.0 {
            LongitudinalMode::Brake
        } else {
            LongitudinalMode::Idle
        }
    }
}

/// Engine force available at this chassis forward speed (N).
pub fn available_engine_force(cfg: &AccelerationConfig, car_speed: f32) -> f32 {
    let normalized = clamp01(car_speed.abs() / cfg.top_speed());
    cfg.torque_curve.eval(normalized) * cfg.engine_strength
}

/// Force that removes `strength / mass` of the tire's forward velocity per step.
pub fn velocity_zeroing_force(frame: &TireFrame, tire_velocity: Vec3, strength: f32, dt: f32) -> AppliedForce {
    let forward_velocity = frame.forward.dot(&tire_velocity);
    let desired_velocity_change = -forward_velocity * strength;
    let desired_acceleration = desired_velocity_change / dt;

    AppliedForce::along(frame.forward, desired_acceleration, frame.position)
}

pub fn longitudinal_force(
    frame: &TireFrame,
    tire_velocity: Vec3,
    can_thrust: bool,
    car_speed: f32,
    acceleration_input: f32,
    cfg: &AccelerationConfig,
    dt: f32,
) -> AppliedForce {
    match LongitudinalMode::from_input(acceleration_input) {
        LongitudinalMode::Thrust if can_thrust => {
            AppliedForce::along(frame.forward, available_engine_force(cfg, car_speed), frame.position)
        }
        LongitudinalMode::Thrust => AppliedForce::zero(frame.position),
        LongitudinalMode::Brake => velocity_zeroing_force(frame, tire_velocity, cfg.braking_strength, dt),
        LongitudinalMode::Idle => velocity_zeroing_force(frame, tire_velocity, cfg.idle_drag_strength, dt),
    }
}
