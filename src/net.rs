use std::sync::Arc;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::accept_async;
use tracing::{info, warn};
use tungstenite::Message;

use crate::car::CarInputs;
use crate::physics::PhysicsWorld;
use crate::state::SharedGameState;
use crate::vehicle::CarConfig;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    Input {
        #[serde(default)]
        acceleration_input: f32,
        #[serde(default)]
        rotation_angle_delta: f32,
    },
    Ping,
}

impl ClientMessage {
    pub fn from_json(txt: &str) -> Option<Self> {
        serde_json::from_str(txt).ok()
    }
}

pub async fn start_websocket_server(
    listener: TcpListener,
    state: Arc<Mutex<SharedGameState>>,
    physics: Arc<Mutex<PhysicsWorld>>,
    car: Arc<CarConfig>,
) {
    if let Ok(addr) = listener.local_addr() {
        info!("🌐 WebSocket listening on ws://{addr}");
    }

    loop {
        let raw = match listener.accept().await {
            Ok((raw, _)) => raw,
            Err(err) => {
                warn!(%err, "accept failed");
                continue;
            }
        };

        tokio::spawn(handle_client(
            raw,
            Arc::clone(&state),
            Arc::clone(&physics),
            Arc::clone(&car),
        ));
    }
}

async fn handle_client(
    raw: TcpStream,
    state: Arc<Mutex<SharedGameState>>,
    physics: Arc<Mutex<PhysicsWorld>>,
    car: Arc<CarConfig>,
) {
    let ws = match accept_async(raw).await {
        Ok(ws) => ws,
        Err(err) => {
            warn!(%err, "websocket handshake failed");
            return;
        }
    };
    let (mut write, mut read) = ws.split();

    // -------------------------------
    // 1) Outgoing message channel + send loop
    // -------------------------------
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if write.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // -------------------------------
    // 2) Create player + car (state before physics, same as the tick loop)
    // -------------------------------
    let player_id = {
        let mut game = state.lock().await;
        let mut phys = physics.lock().await;

        match game.join(tx.clone(), &mut phys, (*car).clone()) {
            Ok(id) => id,
            Err(err) => {
                warn!(%err, "car config rejected, closing connection");
                return;
            }
        }
    };

    info!(player = %player_id, "🟢 player connected");

    let welcome = serde_json::json!({ "type": "welcome", "playerId": player_id });
    let _ = tx.send(welcome.to_string());

    // -------------------------------
    // 3) Main receive loop
    // -------------------------------
    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(_) => break,
        };

        if !msg.is_text() {
            continue;
        }
        let Ok(text) = msg.to_text() else { continue };

        match ClientMessage::from_json(text) {
            Some(ClientMessage::Ping) => {
                let _ = tx.send(r#"{"type":"pong"}"#.to_string());
            }
            Some(ClientMessage::Input { acceleration_input, rotation_angle_delta }) => {
                let mut game = state.lock().await;
                game.update_input(
                    &player_id,
                    CarInputs {
                        acceleration_input,
                        rotation_angle_delta,
                    },
                );
            }
            None => warn!(player = %player_id, "unrecognized message dropped"),
        }
    }

    info!(player = %player_id, "🔴 player disconnected");
    let mut game = state.lock().await;
    game.remove_player(&player_id);
    let mut phys = physics.lock().await;
    phys.despawn_car(&player_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_input_and_ping() {
        let msg = ClientMessage::from_json(r#"{"type":"input","accelerationInput":1.0,"rotationAngleDelta":-2}"#);
        assert!(matches!(
            msg,
            Some(ClientMessage::Input { acceleration_input, rotation_angle_delta })
                if acceleration_input == 1.0 && rotation_angle_delta == -2.0
        ));

        assert!(matches!(ClientMessage::from_json(r#"{"type":"ping"}"#), Some(ClientMessage::Ping)));
    }

    #[test]
    fn missing_axes_default_to_zero() {
        let msg = ClientMessage::from_json(r#"{"type":"input"}"#);
        assert!(matches!(
            msg,
            Some(ClientMessage::Input { acceleration_input, rotation_angle_delta })
                if acceleration_input == 0.0 && rotation_angle_delta == 0.0
        ));
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(ClientMessage::from_json(r#"{"type":"teleport"}"#).is_none());
        assert!(ClientMessage::from_json("not json").is_none());
    }
}
