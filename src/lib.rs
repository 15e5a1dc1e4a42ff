//! Arcade car physics: raycast suspension, speed-blended cornering grip,
//! thrust/brake/idle drag and a self-centering steering angle, driven once
//! per fixed physics step. `tire` and `car` are backend-agnostic; `physics`
//! runs them on rapier3d and `net`/`state` serve the result over websockets.

pub mod car;
pub mod error;
pub mod net;
pub mod physics;
pub mod state;
pub mod tire;
pub mod vehicle;

pub use car::{Car, CarInputs, ChassisState, ForceSink, GroundQuery, TickReport, TireReport};
pub use error::ConfigError;
pub use vehicle::CarConfig;
