use arcade_car::physics::PhysicsWorld;
use arcade_car::{CarConfig, CarInputs, ConfigError};

const DT: f32 = 1.0 / 60.0;

fn world_with_sedan(id: &str) -> PhysicsWorld {
    let mut world = PhysicsWorld::new(DT).unwrap();
    world.spawn_car(id.to_string(), CarConfig::sedan(), [0.0, 1.2, 0.0]).unwrap();
    world
}

fn run(world: &mut PhysicsWorld, steps: usize) {
    for _ in 0..steps {
        world.step();
    }
}

#[test]
fn sedan_settles_on_its_springs() {
    let mut world = world_with_sedan("p1");
    run(&mut world, 240);

    let body = world.chassis("p1").unwrap();
    let y = body.translation().y;
    // static sag: m g / (4 k) ~= 0.11 m below rest
    assert!((0.95..1.25).contains(&y), "chassis height {y}");
    assert!(body.linvel().norm() < 0.2, "still moving: {:?}", body.linvel());

    let report = &world.vehicle("p1").unwrap().last_report;
    assert_eq!(report.grounded_tires(), 4);
    for tire in &report.tires {
        let hit = tire.hit_distance.unwrap();
        assert!(hit < 0.9, "spring should be compressed, hit {hit}");
        assert!(tire.suspension[1] > 0.0);
    }
}

#[test]
fn rays_ignore_the_chassis_itself() {
    let mut world = world_with_sedan("p1");
    world.step();

    // tire origins sit inside the chassis box; a self-hit would read ~0
    let report = &world.vehicle("p1").unwrap().last_report;
    for tire in &report.tires {
        let hit = tire.hit_distance.unwrap();
        assert!(hit > 0.5, "hit {hit}");
    }
}

#[test]
fn throttle_drives_the_car_forward() {
    let mut world = world_with_sedan("p1");
    run(&mut world, 120);
    let start = *world.chassis("p1").unwrap().translation();

    world.set_inputs("p1", CarInputs { acceleration_input: 1.0, rotation_angle_delta: 0.0 });
    run(&mut world, 120);

    let body = world.chassis("p1").unwrap();
    let travelled = body.translation() - start;
    assert!(travelled.z > 5.0, "travelled {travelled:?}");
    assert!(travelled.x.abs() < 0.5, "drifted sideways {travelled:?}");
    assert!(body.linvel().z > 0.0);
    assert!(world.vehicle("p1").unwrap().last_report.car_speed > 0.0);
}

#[test]
fn braking_slows_a_moving_car() {
    let mut world = world_with_sedan("p1");
    run(&mut world, 120);

    world.set_inputs("p1", CarInputs { acceleration_input: 1.0, rotation_angle_delta: 0.0 });
    run(&mut world, 45);
    let cruising = world.chassis("p1").unwrap().linvel().z;

    world.set_inputs("p1", CarInputs { acceleration_input: -1.0, rotation_angle_delta: 0.0 });
    run(&mut world, 30);
    let braked = world.chassis("p1").unwrap().linvel().z;

    assert!(cruising > 1.0);
    assert!(braked.abs() < cruising * 0.5, "cruising {cruising}, braked {braked}");
}

#[test]
fn steering_changes_heading_while_driving() {
    let mut world = world_with_sedan("p1");
    run(&mut world, 120);

    world.set_inputs("p1", CarInputs { acceleration_input: 1.0, rotation_angle_delta: 1.0 });
    run(&mut world, 120);

    let vehicle = world.vehicle("p1").unwrap();
    assert_eq!(vehicle.car.steering_angle(), 25.0);
    let angvel = world.chassis("p1").unwrap().angvel();
    // turning toward the chassis right yaws clockwise seen from above
    assert!(angvel.y < 0.0, "angvel {angvel:?}");
}

#[test]
fn despawn_removes_body_and_vehicle() {
    let mut world = world_with_sedan("p1");
    let bodies_before = world.bodies.len();

    assert!(world.despawn_car("p1"));
    assert_eq!(world.bodies.len(), bodies_before - 1);
    assert!(world.vehicle("p1").is_none());
    assert!(!world.despawn_car("p1"));

    // stepping an empty world is fine
    run(&mut world, 5);
}

#[test]
fn respawn_replaces_the_previous_chassis() {
    let mut world = world_with_sedan("p1");
    let bodies_before = world.bodies.len();

    world.spawn_car("p1".into(), CarConfig::prototype(), [3.0, 2.5, 0.0]).unwrap();
    assert_eq!(world.bodies.len(), bodies_before);
    assert_eq!(world.vehicle("p1").unwrap().car.config().tires[0].fast_grip, 0.2);
}

#[test]
fn invalid_config_is_not_spawned() {
    let mut world = PhysicsWorld::new(DT).unwrap();
    let mut cfg = CarConfig::sedan();
    cfg.tires.clear();

    assert!(world.spawn_car("p1".into(), cfg, [0.0, 2.0, 0.0]).is_err());
    assert!(world.vehicle("p1").is_none());
    assert_eq!(world.bodies.len(), 1);
}

#[test]
fn unusable_step_is_refused() {
    assert!(matches!(PhysicsWorld::new(0.0), Err(ConfigError::NonPositive { .. })));
    assert!(matches!(PhysicsWorld::new(-1.0 / 60.0), Err(ConfigError::NonPositive { .. })));
    assert!(matches!(PhysicsWorld::new(f32::NAN), Err(ConfigError::NonFinite { .. })));
}
