// src/physics.rs

use rapier3d::prelude::*;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::car::{Car, CarInputs, ChassisState, GroundQuery, TickReport};
use crate::error::ConfigError;
use crate::tire::{AppliedForce, Pos3};
use crate::vehicle::{CarConfig, DEFAULT_GROUND_MASK, Vehicle};

pub const GROUP_GROUND: Group = Group::from_bits_truncate(DEFAULT_GROUND_MASK);
pub const GROUP_CHASSIS: Group = Group::from_bits_truncate(0b0010);

/// Positions beyond this are treated as a blown-up simulation.
const WORLD_LIMIT: Real = 1_000.0;

// --------------------------------------------------
// Raycast adapter
// --------------------------------------------------

/// Suspension rays against the rapier world, ignoring the car's own body.
pub struct RapierGround<'a> {
    pub query: &'a QueryPipeline,
    pub bodies: &'a RigidBodySet,
    pub colliders: &'a ColliderSet,
    pub exclude: RigidBodyHandle,
}

impl GroundQuery for RapierGround<'_> {
    fn cast_ray(&self, origin: Pos3, end: Pos3, layer_mask: u32) -> Option<f32> {
        let segment = end - origin;
        let length = segment.norm();
        if length <= Real::EPSILON {
            return None;
        }

        let ray = Ray::new(origin, segment / length);
        let filter = QueryFilter::default()
            .groups(InteractionGroups::new(GROUP_CHASSIS, Group::from_bits_truncate(layer_mask)))
            .exclude_rigid_body(self.exclude);

        self.query
            .cast_ray(self.bodies, self.colliders, &ray, length, true, filter)
            .map(|(_collider, toi)| toi)
    }
}

pub fn chassis_state(body: &RigidBody) -> ChassisState {
    ChassisState {
        position: *body.position(),
        linear_velocity: *body.linvel(),
        angular_velocity: *body.angvel(),
        center_of_mass: *body.center_of_mass(),
    }
}

// --------------------------------------------------
// World
// --------------------------------------------------

pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub dt: Real, // fixed step (s)
    pub pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,          // ground + one chassis per car
    pub colliders: ColliderSet,
    pub joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    pub ccd: CCDSolver,
    pub query_pipeline: QueryPipeline, // suspension rays
    pub vehicles: HashMap<String, Vehicle>, // playerId → vehicle
    pub spawn_height: Real, // chassis origin height for spawns and resets
}

impl PhysicsWorld {
    /// Fails when the fixed step is not a positive finite number of seconds.
    pub fn new(dt: Real) -> Result<Self, ConfigError> {
        if !dt.is_finite() {
            return Err(ConfigError::NonFinite { field: "dt".to_string() });
        }
        if dt <= 0.0 {
            return Err(ConfigError::NonPositive { field: "dt".to_string() });
        }

        let gravity = vector![0.0, -9.81, 0.0];

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // === Flat static ground, top surface at y = 0 ===
        let ground_rb = RigidBodyBuilder::fixed()
            .translation(vector![0.0, -1.0, 0.0])
            .build();

        let ground_handle = bodies.insert(ground_rb);

        let ground_collider = ColliderBuilder::cuboid(500.0, 1.0, 500.0)
            .collision_groups(InteractionGroups::new(GROUP_GROUND, GROUP_CHASSIS))
            .friction(1.2)
            .restitution(0.0)
            .build();

        colliders.insert_with_parent(ground_collider, ground_handle, &mut bodies);

        info!(bodies = bodies.len(), colliders = colliders.len(), "🌎 ground inserted");

        Ok(Self {
            gravity,
            dt,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            vehicles: HashMap::new(),
            spawn_height: 2.0,
        })
    }

    /// Spawn a car for this player:
    /// - Dynamic rigid body with a box collider sized from the dimensions.
    /// - Mass from the config; explicit inertia when given, box inertia otherwise.
    pub fn spawn_car(&mut self, id: String, config: CarConfig, position: [Real; 3]) -> Result<RigidBodyHandle, ConfigError> {
        let car = Car::new(config)?;
        let cfg = car.config();

        let [x, y, z] = position;
        let mut rb = RigidBodyBuilder::dynamic()
            .translation(vector![x, y, z])
            .ccd_enabled(true);

        let d = &cfg.dimensions;
        let collider = ColliderBuilder::cuboid(d.width * 0.5, d.height * 0.5, d.length * 0.5)
            .collision_groups(InteractionGroups::new(GROUP_CHASSIS, GROUP_GROUND))
            .active_events(ActiveEvents::empty())
            .friction(0.0) // tires do all the ground work
            .restitution(0.0);

        let collider = match cfg.inertia {
            Some([ix, iy, iz]) => {
                rb = rb.additional_mass_properties(MassProperties::new(
                    point![0.0, 0.0, 0.0],
                    cfg.mass,
                    vector![ix, iy, iz],
                ));
                collider.density(0.0)
            }
            None => collider.mass(cfg.mass),
        }
        .build();

        if let Some(old) = self.vehicles.remove(&id) {
            self.remove_body(old.body);
        }

        let handle = self.bodies.insert(rb.build());
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);

        info!(player = %id, ?position, ?handle, "🚗 spawned car");

        self.vehicles.insert(
            id,
            Vehicle {
                body: handle,
                car,
                last_report: TickReport::default(),
            },
        );

        Ok(handle)
    }

    pub fn despawn_car(&mut self, id: &str) -> bool {
        match self.vehicles.remove(id) {
            Some(vehicle) => {
                self.remove_body(vehicle.body);
                info!(player = %id, "car removed");
                true
            }
            None => false,
        }
    }

    fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Store the latest inputs; forces are produced in `step`.
    pub fn set_inputs(&mut self, id: &str, inputs: CarInputs) {
        if let Some(v) = self.vehicles.get_mut(id) {
            v.car.set_inputs(inputs);
        }
    }

    pub fn vehicle(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    pub fn chassis(&self, id: &str) -> Option<&RigidBody> {
        self.vehicles.get(id).and_then(|v| self.bodies.get(v.body))
    }

    /// Runs every car's tire loop and replaces each chassis' forces with the result.
    fn apply_car_forces(&mut self) {
        let dt = self.dt;

        for (id, vehicle) in self.vehicles.iter_mut() {
            let Some(body) = self.bodies.get(vehicle.body) else {
                warn!(player = %id, "vehicle has no chassis body");
                continue;
            };
            let chassis = chassis_state(body);

            let ground = RapierGround {
                query: &self.query_pipeline,
                bodies: &self.bodies,
                colliders: &self.colliders,
                exclude: vehicle.body,
            };

            let mut forces: Vec<AppliedForce> = Vec::with_capacity(vehicle.car.tires().len() * 3);
            vehicle.last_report = vehicle.car.update(&chassis, &ground, &mut forces, dt);

            if let Some(body) = self.bodies.get_mut(vehicle.body) {
                body.reset_forces(true);
                for f in forces {
                    body.add_force_at_point(f.force, f.point, true);
                }
            }
        }
    }

    pub fn step(&mut self) {
        let hooks = ();
        let events = ();

        // 1) Raycasts must see the current (pre-step) world
        self.query_pipeline.update(&self.colliders);

        // 2) Suspension + grip + drive forces, then steering
        self.apply_car_forces();

        // 3) Integrate
        self.pipeline.step(
            &self.gravity,
            &IntegrationParameters {
                dt: self.dt,
                ..IntegrationParameters::default()
            },
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &hooks,
            &events,
        );

        // 4) Pull blown-up bodies back to the spawn point
        self.reset_exploded_bodies();
    }

    fn reset_exploded_bodies(&mut self) {
        let safe = vector![0.0, self.spawn_height, 0.0];

        for (handle, body) in self.bodies.iter_mut() {
            if !body.is_dynamic() {
                continue;
            }

            let pos = *body.translation();
            let bad = !pos.iter().all(|c| c.is_finite()) || pos.iter().any(|c| c.abs() > WORLD_LIMIT);

            if bad {
                body.set_position(Isometry::translation(safe.x, safe.y, safe.z), true);
                body.set_linvel(vector![0.0, 0.0, 0.0], true);
                body.set_angvel(vector![0.0, 0.0, 0.0], true);
                body.reset_forces(true);

                warn!(?handle, "⚠️ reset exploding body back to {:?}", safe);
            }
        }
    }
}
