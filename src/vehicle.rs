use std::path::Path;

use rapier3d::prelude::RigidBodyHandle;
use serde::{Deserialize, Serialize};

use crate::car::{Car, TickReport};
use crate::error::ConfigError;
use crate::tire::{GripBlend, TorqueCurve};

/// Collision layer the suspension rays look for by default.
pub const DEFAULT_GROUND_MASK: u32 = 0b0001;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub width: f32,  // meters (left to right)
    pub height: f32, // meters
    pub length: f32, // meters (front to back)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspensionConfig {
    pub ray_length: f32,      // m, how far below the tire the ray reaches
    pub rest_distance: f32,   // m, spring neutral length (<= ray_length)
    pub spring_strength: f32, // N/m
    pub spring_damp: f32,     // N*s/m
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SteeringConfig {
    pub max_rotation_angle: f32, // degrees
    #[serde(default = "default_center_step")]
    pub center_step_deg: f32,    // degrees per tick back toward straight
}

fn default_center_step() -> f32 {
    2.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccelerationConfig {
    pub top_speed_kmh: f32,
    pub engine_strength: f32,    // N per thrusting tire at full curve
    pub braking_strength: f32,   // velocity-cancel weight per step
    pub idle_drag_strength: f32, // same, while coasting
    #[serde(default)]
    pub torque_curve: TorqueCurve,
}

impl AccelerationConfig {
    /// Top speed in m/s.
    pub fn top_speed(&self) -> f32 {
        self.top_speed_kmh / 3.6
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TireConfig {
    pub local_offset: [f32; 3],    // chassis local space
    pub can_thrust: bool,          // is this a driven tire?
    pub can_rotate: f32,           // steering multiplier: 0 fixed, 1 steer, -1 counter-steer
    pub grip_speed_threshold: f32, // m/s of sideways speed where fast_grip takes over
    pub slow_grip: f32,            // 0..1
    pub fast_grip: f32,            // 0..1
    #[serde(default)]
    pub tire_mass: Option<f32>,    // kg, defaults to chassis mass / tire count
    #[serde(default)]
    pub grip_blend: GripBlend,
}

impl Default for TireConfig {
    fn default() -> Self {
        Self {
            local_offset: [0.0, 0.0, 0.0],
            can_thrust: false,
            can_rotate: 0.0,
            grip_speed_threshold: 27.0,
            slow_grip: 1.0,
            fast_grip: 1.0,
            tire_mass: None,
            grip_blend: GripBlend::Linear,
        }
    }
}

/// Everything needed to assemble one car. Each tuning experiment is a
/// different value of this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarConfig {
    pub dimensions: Dimensions,
    pub mass: f32,                 // kg
    #[serde(default)]
    pub inertia: Option<[f32; 3]>, // principal inertia, derived from the box when absent
    pub suspension: SuspensionConfig,
    pub steering: SteeringConfig,
    pub acceleration: AccelerationConfig,
    pub tires: Vec<TireConfig>,
    #[serde(default = "default_ground_mask")]
    pub ground_mask: u32,
}

fn default_ground_mask() -> u32 {
    DEFAULT_GROUND_MASK
}

// --------------------------------------------------
// validation helpers
// --------------------------------------------------

fn finite(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field: field.to_string() })
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field: field.to_string() })
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field: field.to_string() })
    }
}

fn unit_interval(field: &str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: field.to_string(),
            value,
            min: 0.0,
            max: 1.0,
        })
    }
}

impl TireConfig {
    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let field = |name: &str| format!("tires[{index}].{name}");

        for v in self.local_offset {
            finite(&field("localOffset"), v)?;
        }
        finite(&field("canRotate"), self.can_rotate)?;
        positive(&field("gripSpeedThreshold"), self.grip_speed_threshold)?;
        unit_interval(&field("slowGrip"), self.slow_grip)?;
        unit_interval(&field("fastGrip"), self.fast_grip)?;
        if let Some(mass) = self.tire_mass {
            positive(&field("tireMass"), mass)?;
        }
        self.grip_blend
            .check()
            .map_err(|reason| ConfigError::InvalidCurve { field: field("gripBlend"), reason })
    }
}

impl CarConfig {
    /// Refuses tunables the force models cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("dimensions.width", self.dimensions.width)?;
        positive("dimensions.height", self.dimensions.height)?;
        positive("dimensions.length", self.dimensions.length)?;
        positive("mass", self.mass)?;
        if let Some(inertia) = self.inertia {
            for v in inertia {
                positive("inertia", v)?;
            }
        }

        let s = &self.suspension;
        positive("suspension.rayLength", s.ray_length)?;
        non_negative("suspension.restDistance", s.rest_distance)?;
        non_negative("suspension.springStrength", s.spring_strength)?;
        non_negative("suspension.springDamp", s.spring_damp)?;
        if s.rest_distance > s.ray_length {
            return Err(ConfigError::RestBeyondRay {
                rest: s.rest_distance,
                ray: s.ray_length,
            });
        }

        non_negative("steering.maxRotationAngle", self.steering.max_rotation_angle)?;
        positive("steering.centerStepDeg", self.steering.center_step_deg)?;

        let a = &self.acceleration;
        positive("acceleration.topSpeedKmh", a.top_speed_kmh)?;
        non_negative("acceleration.engineStrength", a.engine_strength)?;
        non_negative("acceleration.brakingStrength", a.braking_strength)?;
        non_negative("acceleration.idleDragStrength", a.idle_drag_strength)?;
        a.torque_curve.check().map_err(|reason| ConfigError::InvalidCurve {
            field: "acceleration.torqueCurve".to_string(),
            reason,
        })?;

        if self.tires.is_empty() {
            return Err(ConfigError::NoTires);
        }
        for (i, tire) in self.tires.iter().enumerate() {
            tire.validate(i)?;
        }

        Ok(())
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: CarConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Chassis mass shared evenly over the tires.
    pub fn mass_per_tire(&self) -> f32 {
        self.mass / self.tires.len().max(1) as f32
    }

    /// 1354 kg rear-drive sedan, front tires steer.
    pub fn sedan() -> Self {
        let front = |x: f32| TireConfig {
            local_offset: [x, -0.3, 1.8],
            can_thrust: false,
            can_rotate: 1.0,
            grip_speed_threshold: 100.0 / 3.6,
            slow_grip: 1.0,
            fast_grip: 1.0,
            ..TireConfig::default()
        };
        let rear = |x: f32| TireConfig {
            local_offset: [x, -0.3, -1.8],
            can_thrust: true,
            can_rotate: 0.0,
            grip_speed_threshold: 100.0 / 3.6,
            slow_grip: 1.0,
            fast_grip: 0.5,
            ..TireConfig::default()
        };

        Self {
            dimensions: Dimensions { width: 1.7, height: 1.2, length: 4.6 },
            mass: 1354.0,
            inertia: None,
            suspension: SuspensionConfig {
                ray_length: 1.2,
                rest_distance: 0.9,
                spring_strength: 30_000.0,
                spring_damp: 3_000.0,
            },
            steering: SteeringConfig {
                max_rotation_angle: 25.0,
                center_step_deg: 2.0,
            },
            acceleration: AccelerationConfig {
                top_speed_kmh: 200.0,
                engine_strength: 25_000.0,
                braking_strength: 250.0,
                idle_drag_strength: 5.0,
                torque_curve: TorqueCurve::Tapered,
            },
            tires: vec![front(-1.0), front(1.0), rear(-1.0), rear(1.0)],
            ground_mask: DEFAULT_GROUND_MASK,
        }
    }

    /// 1000 kg box with 2 m tires and an offset torque curve.
    pub fn prototype() -> Self {
        let tire = |x: f32, z: f32, rear: bool| TireConfig {
            local_offset: [x, -1.0, z],
            can_thrust: rear,
            can_rotate: if rear { 0.0 } else { 1.0 },
            grip_speed_threshold: 5.0,
            slow_grip: 1.0,
            fast_grip: 0.2,
            ..TireConfig::default()
        };

        Self {
            dimensions: Dimensions { width: 3.0, height: 1.0, length: 5.0 },
            mass: 1000.0,
            inertia: None,
            suspension: SuspensionConfig {
                ray_length: 2.0,
                rest_distance: 1.0,
                spring_strength: 20_000.0,
                spring_damp: 1_000.0,
            },
            steering: SteeringConfig {
                max_rotation_angle: 15.0,
                center_step_deg: 1.0,
            },
            acceleration: AccelerationConfig {
                top_speed_kmh: 120.0,
                engine_strength: 5_000.0,
                braking_strength: 8.0,
                idle_drag_strength: 8.0,
                torque_curve: TorqueCurve::Offset { bias: 1.25 },
            },
            tires: vec![
                tire(1.5, 2.5, false),
                tire(-1.5, 2.5, false),
                tire(1.5, -2.5, true),
                tire(-1.5, -2.5, true),
            ],
            ground_mask: DEFAULT_GROUND_MASK,
        }
    }
}

/// A car paired with the chassis body that carries it in the physics world.
pub struct Vehicle {
    pub body: RigidBodyHandle, // the chassis body
    pub car: Car,              // tunables + tires + steering state
    pub last_report: TickReport,
}
