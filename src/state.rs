use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;
use uuid::Uuid;

use crate::car::CarInputs;
use crate::error::ConfigError;
use crate::physics::PhysicsWorld;
use crate::vehicle::CarConfig;

pub struct Player {
    pub id: String,
    pub inputs: CarInputs,
    pub last_input_tick: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TireSnapshot {
    pub grounded: bool,
    pub suspension_length: f32,
    pub yaw_deg: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: String,
    pub position: [f32; 3],
    pub rotation: [f32; 4], // quaternion xyzw
    pub speed: f32,         // m/s along chassis forward
    pub steering_angle: f32, // degrees
    pub tires: Vec<TireSnapshot>,
}

#[derive(Serialize)]
pub struct Snapshot {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub tick: u64,
    pub players: Vec<PlayerSnapshot>,
}

pub struct SharedGameState {
    pub tick: u64,
    pub clients: Vec<UnboundedSender<String>>,
    pub players: HashMap<String, Player>,
}

impl Default for SharedGameState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedGameState {
    pub fn new() -> Self {
        Self {
            tick: 0,
            clients: Vec::new(),
            players: HashMap::new(),
        }
    }

    pub fn register_client(&mut self, tx: UnboundedSender<String>) {
        self.clients.push(tx);
    }

    /// New player with a fresh id and neutral inputs.
    pub fn add_player(&mut self) -> String {
        let id = Uuid::new_v4().to_string();
        self.players.insert(
            id.clone(),
            Player {
                id: id.clone(),
                inputs: CarInputs::default(),
                last_input_tick: self.tick,
            },
        );
        id
    }

    /// Adds a player, spawns its car and only then subscribes `tx` to
    /// snapshots. A rejected car leaves no player and no client behind.
    pub fn join(
        &mut self,
        tx: UnboundedSender<String>,
        physics: &mut PhysicsWorld,
        car: CarConfig,
    ) -> Result<String, ConfigError> {
        let id = self.add_player();
        let position = self.spawn_position(physics.spawn_height);

        if let Err(err) = physics.spawn_car(id.clone(), car, position) {
            self.remove_player(&id);
            return Err(err);
        }

        self.register_client(tx);
        Ok(id)
    }

    pub fn remove_player(&mut self, id: &str) {
        self.players.remove(id);
    }

    pub fn update_input(&mut self, id: &str, inputs: CarInputs) {
        let tick = self.tick;
        if let Some(player) = self.players.get_mut(id) {
            player.inputs = inputs;
            player.last_input_tick = tick;
        }
    }

    /// Spawn slot for the next player, spread along X.
    pub fn spawn_position(&self, spawn_height: f32) -> [f32; 3] {
        let slot = self.players.len().saturating_sub(1) as f32;
        let side = if slot as usize % 2 == 0 { 1.0 } else { -1.0 };
        [side * 5.0 * (slot * 0.5).ceil(), spawn_height, 0.0]
    }

    pub fn snapshot(&self, physics: &PhysicsWorld) -> Snapshot {
        let mut players = Vec::with_capacity(self.players.len());

        for player in self.players.values() {
            let (Some(vehicle), Some(body)) = (physics.vehicle(&player.id), physics.chassis(&player.id)) else {
                continue;
            };

            let pos = body.translation();
            let rot = body.rotation();
            let report = &vehicle.last_report;

            players.push(PlayerSnapshot {
                id: player.id.clone(),
                position: [pos.x, pos.y, pos.z],
                rotation: [rot.i, rot.j, rot.k, rot.w],
                speed: report.car_speed,
                steering_angle: vehicle.car.steering_angle(),
                tires: report
                    .tires
                    .iter()
                    .map(|t| TireSnapshot {
                        grounded: t.grounded,
                        suspension_length: t.suspension_length,
                        yaw_deg: t.yaw_deg,
                    })
                    .collect(),
            });
        }

        players.sort_by(|a, b| a.id.cmp(&b.id));

        Snapshot {
            kind: "snapshot",
            tick: self.tick,
            players,
        }
    }

    /// Build and send a snapshot of all cars to all clients, dropping closed ones.
    pub fn broadcast_snapshot(&mut self, physics: &PhysicsWorld) {
        let json = match serde_json::to_string(&self.snapshot(physics)) {
            Ok(json) => json,
            Err(err) => {
                warn!(%err, "snapshot serialization failed");
                return;
            }
        };

        self.clients.retain(|tx| tx.send(json.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_slots_alternate_sides() {
        let mut game = SharedGameState::new();
        game.add_player();
        assert_eq!(game.spawn_position(2.0), [0.0, 2.0, 0.0]);
        game.add_player();
        assert_eq!(game.spawn_position(2.0), [-5.0, 2.0, 0.0]);
        game.add_player();
        assert_eq!(game.spawn_position(2.0), [5.0, 2.0, 0.0]);
    }

    #[test]
    fn snapshot_lists_spawned_players_only() {
        let mut game = SharedGameState::new();
        let mut physics = PhysicsWorld::new(1.0 / 60.0).unwrap();

        let spawned = game.add_player();
        let _pending = game.add_player();
        physics.spawn_car(spawned.clone(), CarConfig::sedan(), [0.0, 2.0, 0.0]).unwrap();

        let snapshot = game.snapshot(&physics);
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.players[0].id, spawned);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["type"], "snapshot");
        assert!(json["players"][0]["steeringAngle"].is_number());
    }

    #[test]
    fn join_spawns_car_and_subscribes_client() {
        let mut game = SharedGameState::new();
        let mut physics = PhysicsWorld::new(1.0 / 60.0).unwrap();
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        let id = game.join(tx, &mut physics, CarConfig::sedan()).unwrap();
        assert!(game.players.contains_key(&id));
        assert!(physics.vehicle(&id).is_some());
        assert_eq!(game.clients.len(), 1);
    }

    #[test]
    fn rejected_car_leaves_no_client_or_player() {
        let mut game = SharedGameState::new();
        let mut physics = PhysicsWorld::new(1.0 / 60.0).unwrap();
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        let mut car = CarConfig::sedan();
        car.tires.clear();

        assert!(matches!(game.join(tx, &mut physics, car), Err(ConfigError::NoTires)));
        assert!(game.players.is_empty());
        assert!(game.clients.is_empty());
        assert!(physics.vehicles.is_empty());
    }

    #[test]
    fn closed_clients_are_dropped() {
        let mut game = SharedGameState::new();
        let physics = PhysicsWorld::new(1.0 / 60.0).unwrap();

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        game.register_client(tx);
        drop(rx);

        game.broadcast_snapshot(&physics);
        assert!(game.clients.is_empty());
    }
}
