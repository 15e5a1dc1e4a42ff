// ==============================================================================
// car.rs: PER-TICK ORCHESTRATION
// ------------------------------------------------------------------------------
// Once per physics step, strictly before the backend integrates:
//
//   for tire in tires (fixed order):
//       ray from tire along -up, length = suspension.ray_length
//       if hit:
//           suspension -> lateral grip -> longitudinal
//   steering.advance(rotation_angle_delta), yaw written to every tire
//
// The car only reads a ChassisState snapshot and pushes forces into a
// ForceSink. It never touches the rigid body directly, so the backend decides
// how forces are accumulated.
// ==============================================================================

use nalgebra::Isometry3;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::tire::kinematics::{chassis_forward, point_velocity, tire_frame};
use crate::tire::lateral::lateral_force;
use crate::tire::longitudinal::longitudinal_force;
use crate::tire::suspension::suspension_force;
use crate::tire::{AppliedForce, Pos3, SteeringIntegrator, Tire, Vec3};
use crate::vehicle::CarConfig;

// ============================================
// Collaborator seams
// ============================================

/// Chassis pose and velocity read from the backend before the tire loop.
#[derive(Debug, Clone, Copy)]
pub struct ChassisState {
    pub position: Isometry3<f32>,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub center_of_mass: Pos3, // world space
}

impl ChassisState {
    pub fn at_rest(position: Isometry3<f32>) -> Self {
        Self {
            position,
            linear_velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            center_of_mass: position * Pos3::origin(),
        }
    }

    #[inline]
    pub fn velocity_at(&self, point: Pos3) -> Vec3 {
        point_velocity(self.linear_velocity, self.angular_velocity, self.center_of_mass, point)
    }

    /// Speed along the chassis forward axis (m/s, negative when reversing).
    pub fn forward_speed(&self) -> f32 {
        chassis_forward(&self.position).dot(&self.linear_velocity)
    }
}

/// Raycasting service. Returns the hit distance along the segment.
pub trait GroundQuery {
    fn cast_ray(&self, origin: Pos3, end: Pos3, layer_mask: u32) -> Option<f32>;
}

/// Receives every force the car produces during one tick.
pub trait ForceSink {
    fn apply_force(&mut self, force: Vec3, point: Pos3);
}

impl ForceSink for Vec<AppliedForce> {
    fn apply_force(&mut self, force: Vec3, point: Pos3) {
        self.push(AppliedForce { force, point });
    }
}

// ============================================
// Inputs + reports
// ============================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarInputs {
    pub acceleration_input: f32,  // -1..1 (brake .. throttle)
    pub rotation_angle_delta: f32, // degrees per tick
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TireReport {
    pub grounded: bool,
    pub hit_distance: Option<f32>,
    pub suspension_length: f32, // hit distance, or ray length while airborne
    pub suspension: [f32; 3],
    pub lateral: [f32; 3],
    pub longitudinal: [f32; 3],
    pub yaw_deg: f32,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub steering_angle: f32,
    pub car_speed: f32,
    pub tires: Vec<TireReport>,
}

impl TickReport {
    pub fn grounded_tires(&self) -> usize {
        self.tires.iter().filter(|t| t.grounded).count()
    }
}

// ============================================
// Car
// ============================================

pub struct Car {
    config: CarConfig,
    tires: Vec<Tire>,
    steering: SteeringIntegrator,
    inputs: CarInputs,
}

impl Car {
    pub fn new(config: CarConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let grip_mass = config.mass_per_tire();
        let tires = config
            .tires
            .iter()
            .cloned()
            .map(|t| Tire::new(t, grip_mass))
            .collect::<Vec<_>>();
        let steering = SteeringIntegrator::new(&config.steering);

        debug!(
            tires = tires.len(),
            mass = config.mass,
            top_speed = config.acceleration.top_speed(),
            "car assembled"
        );

        Ok(Self {
            config,
            tires,
            steering,
            inputs: CarInputs::default(),
        })
    }

    pub fn config(&self) -> &CarConfig {
        &self.config
    }

    pub fn tires(&self) -> &[Tire] {
        &self.tires
    }

    pub fn inputs(&self) -> CarInputs {
        self.inputs
    }

    pub fn steering_angle(&self) -> f32 {
        self.steering.angle()
    }

    /// Latest driver intent. Non-finite values count as no input.
    pub fn set_inputs(&mut self, inputs: CarInputs) {
        let sanitize = |v: f32| if v.is_finite() { v } else { 0.0 };
        self.inputs = CarInputs {
            acceleration_input: sanitize(inputs.acceleration_input).clamp(-1.0, 1.0),
            rotation_angle_delta: sanitize(inputs.rotation_angle_delta),
        };
    }

    /// Runs one tick. `dt` is the backend's fixed step.
    pub fn update<G, S>(&mut self, chassis: &ChassisState, ground: &G, sink: &mut S, dt: f32) -> TickReport
    where
        G: GroundQuery + ?Sized,
        S: ForceSink + ?Sized,
    {
        debug_assert!(dt > 0.0, "physics step must be positive");

        let car_speed = chassis.forward_speed();
        let suspension = &self.config.suspension;
        let acceleration = &self.config.acceleration;
        let mut reports = Vec::with_capacity(self.tires.len());

        for (index, tire) in self.tires.iter().enumerate() {
            let frame = tire_frame(&chassis.position, tire.local_offset(), tire.yaw_deg());
            let ray_end = frame.position - frame.up * suspension.ray_length;
            let hit = ground.cast_ray(frame.position, ray_end, self.config.ground_mask);

            let mut report = TireReport {
                grounded: hit.is_some(),
                hit_distance: hit,
                suspension_length: hit.unwrap_or(suspension.ray_length),
                yaw_deg: tire.yaw_deg(),
                ..TireReport::default()
            };

            let Some(hit_distance) = hit else {
                trace!(tire = index, "airborne");
                reports.push(report);
                continue;
            };

            let tire_velocity = chassis.velocity_at(frame.position);

            // 1) suspension
            let spring = suspension_force(&frame, hit_distance, tire_velocity, suspension);
            sink.apply_force(spring.force, spring.point);

            // 2) cornering grip
            let grip = lateral_force(&frame, tire_velocity, tire.config(), tire.grip_mass(), dt);
            sink.apply_force(grip.force, grip.point);

            // 3) thrust / brake / idle drag
            let drive = longitudinal_force(
                &frame,
                tire_velocity,
                tire.can_thrust(),
                car_speed,
                self.inputs.acceleration_input,
                acceleration,
                dt,
            );
            if !drive.is_zero() {
                sink.apply_force(drive.force, drive.point);
            }

            trace!(tire = index, hit_distance, spring = spring.force.y, "contact");

            report.suspension = spring.force.into();
            report.lateral = grip.force.into();
            report.longitudinal = drive.force.into();
            reports.push(report);
        }

        // steering runs every tick, contact or not
        let angle = self.steering.advance(self.inputs.rotation_angle_delta);
        for tire in self.tires.iter_mut() {
            tire.set_steering_angle(angle);
        }

        TickReport {
            steering_angle: angle,
            car_speed,
            tires: reports,
        }
    }
}
