//! tire - engine-agnostic per-tire force models (pure math, no backend)

pub mod types;
pub mod curves;
pub mod kinematics;
pub mod suspension;
pub mod lateral;
pub mod longitudinal;
pub mod steering;

pub use types::*;
pub use curves::{GripBlend, TorqueCurve};
pub use steering::SteeringIntegrator;
