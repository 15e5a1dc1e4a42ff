use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::time::{Duration, interval};
use tracing::info;

use arcade_car::CarConfig;
use arcade_car::net::start_websocket_server;
use arcade_car::physics::PhysicsWorld;
use arcade_car::state::SharedGameState;

#[derive(Parser, Debug)]
#[command(name = "car-server", about = "Headless arcade car physics server")]
struct Args {
    /// Websocket bind address
    #[arg(long, default_value = "0.0.0.0:9001")]
    bind: String,

    /// Fixed physics steps per second
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    tick_hz: u32,

    /// Car tuning file (TOML); the sedan preset when omitted
    #[arg(long)]
    car: Option<PathBuf>,

    /// Chassis origin height for spawns and resets (m)
    #[arg(long, default_value_t = 2.0)]
    spawn_height: f32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arcade_car=info,car_server=info".into()),
        )
        .init();

    let args = Args::parse();

    let car = match &args.car {
        Some(path) => CarConfig::load(path)?,
        None => {
            let preset = CarConfig::sedan();
            preset.validate()?;
            preset
        }
    };

    info!(tick_hz = args.tick_hz, tires = car.tires.len(), "🚀 starting car physics server");

    let dt = 1.0 / args.tick_hz as f32;
    let mut world = PhysicsWorld::new(dt)?;
    world.spawn_height = args.spawn_height;

    let state = Arc::new(Mutex::new(SharedGameState::new()));
    let physics = Arc::new(Mutex::new(world));

    let listener = TcpListener::bind(&args.bind).await?;
    tokio::spawn(start_websocket_server(
        listener,
        Arc::clone(&state),
        Arc::clone(&physics),
        Arc::new(car),
    ));

    let mut ticker = interval(Duration::from_secs_f32(dt));

    loop {
        ticker.tick().await;

        let mut game = state.lock().await;
        let mut phys = physics.lock().await;

        // Latest inputs -> cars (forces are produced inside step)
        for player in game.players.values() {
            phys.set_inputs(&player.id, player.inputs);
        }

        // Step physics
        phys.step();

        // Advance tick + broadcast snapshot
        game.tick += 1;
        game.broadcast_snapshot(&phys);
    }
}
