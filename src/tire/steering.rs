// ==============================================================================
// steering.rs: STEERING ANGLE INTEGRATOR
// ==============================================================================
// Advanced once per tick, whether or not any tire touches the ground:
//
// 1) No steering input and angle != 0 -> step toward 0 by center_step
//    (lands exactly on 0 when closer than one step)
// 2) angle += rotation_angle_delta
// 3) clamp to [-max_angle, max_angle]
//
// Angles are degrees. The result is written to each tire as
// yaw = can_rotate * angle, so a multiplier of 0 keeps the tire straight.
// ==============================================================================

use crate::vehicle::SteeringConfig;

#[derive(Debug, Clone, Copy)]
pub struct SteeringIntegrator {
    angle: f32,       // degrees
    max_angle: f32,   // degrees
    center_step: f32, // degrees per tick
}

impl SteeringIntegrator {
    pub fn new(cfg: &SteeringConfig) -> Self {
        Self {
            angle: 0.0,
            max_angle: cfg.max_rotation_angle,
            center_step: cfg.center_step_deg,
        }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn advance(&mut self, rotation_angle_delta: f32) -> f32 {
        if rotation_angle_delta == 0.0 && self.angle != 0.0 {
            self.angle = step_toward_zero(self.angle, self.center_step);
        }

        self.angle += rotation_angle_delta;
        self.angle = self.angle.clamp(-self.max_angle, self.max_angle);

        self.angle
    }
}

#[inline]
fn step_toward_zero(angle: f32, step: f32) -> f32 {
    if angle.abs() <= step {
        0.0
    } else {
        angle - angle.signum() * step
    }
}
