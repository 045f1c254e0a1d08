//! WebSocket game server for hexfort.
//!
//! Protocol:
//! - Clients send JSON frames with a `type` discriminator and an optional
//!   `request_id`; responses echo the `request_id`.
//! - Sessions bind to a uid after `auth_request` or `signup`.
//! - Battle observers receive `battle_update` pushes every broadcast
//!   interval and one final `battle_summary`.
//!
//! The world loop, the battle simulators and the snapshot writer run as
//! tokio tasks; ctrl-c raises the stop flag they all observe.

mod accounts;
mod handlers;
mod runtime;
mod session;

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use hexfort_engine::snapshot::Snapshot;
use hexfort_types::config::GameConfig;
use hexfort_types::messages::ClientMessage;
use hexfort_types::Uid;

use crate::runtime::AppState;

/// How long one frame may take to handle before the connection is closed.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Seconds between periodic snapshots.
const SNAPSHOT_INTERVAL_SECONDS: u64 = 60;

// =============================================================================
// Connection handling
// =============================================================================

async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: AppState, socket: WebSocket) {
    // The pump task owns the socket; this task talks to it over channels
    // so battle broadcasts and request replies interleave safely.
    let (out_tx, out_rx) = mpsc::channel::<Message>(64);
    let (in_tx, mut in_rx) = mpsc::channel::<Message>(64);
    tokio::spawn(socket_pump(socket, out_rx, in_tx));

    let (tx, mut rx) = mpsc::channel::<String>(state.config.session_buffer.max(1));
    let mut session_uid: Option<Uid> = None;

    loop {
        tokio::select! {
            // Outbound: broadcasts queued by battle loops and relays.
            queued = rx.recv() => {
                let Some(json) = queued else { break };
                if out_tx.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            // Inbound: one client frame.
            incoming = in_rx.recv() => {
                let Some(msg) = incoming else { break };
                let text = match msg {
                    Message::Text(t) => t,
                    Message::Close(_) => break,
                    _ => continue, // ignore binary/ping/pong
                };

                let handled = tokio::time::timeout(
                    REQUEST_TIMEOUT,
                    handle_frame(&state, &mut session_uid, &tx, text.as_str()),
                )
                .await;
                let response = match handled {
                    Ok(response) => response,
                    Err(_) => {
                        tracing::warn!("request handler timed out, closing connection");
                        break;
                    }
                };
                if let Some(json) = response {
                    if out_tx.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    if let Some(uid) = session_uid {
        state.hub.unregister(uid);
    }
}

/// Owns the WebSocket: forwards queued outbound messages and surfaces
/// inbound frames. Exits when either side closes.
async fn socket_pump(
    mut socket: WebSocket,
    mut out_rx: mpsc::Receiver<Message>,
    in_tx: mpsc::Sender<Message>,
) {
    loop {
        tokio::select! {
            outgoing = out_rx.recv() => {
                let Some(msg) = outgoing else { break };
                if socket.send(msg).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                let Some(Ok(msg)) = incoming else { break };
                if in_tx.send(msg).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Parse, dispatch, and serialise one frame, echoing its request_id.
async fn handle_frame(
    state: &AppState,
    session_uid: &mut Option<Uid>,
    tx: &mpsc::Sender<String>,
    text: &str,
) -> Option<String> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(error) => {
            return Some(error_json(None, &format!("Invalid JSON: {error}")));
        }
    };
    let request_id = value.get("request_id").cloned();

    let msg: ClientMessage = match serde_json::from_value(value) {
        Ok(msg) => msg,
        Err(error) => {
            return Some(error_json(request_id, &format!("Invalid request: {error}")));
        }
    };

    let bound_before = *session_uid;
    let response = handlers::handle_message(state, session_uid, msg);

    // A successful auth/signup binds this connection's outbound channel.
    if *session_uid != bound_before {
        if let Some(uid) = *session_uid {
            state.hub.register(uid, tx.clone());
        }
    }

    let response = response?;
    let mut json = serde_json::to_value(&response).ok()?;
    if let (Some(request_id), Some(object)) = (request_id, json.as_object_mut()) {
        object.insert("request_id".to_string(), request_id);
    }
    serde_json::to_string(&json).ok()
}

fn error_json(request_id: Option<serde_json::Value>, message: &str) -> String {
    let mut value = serde_json::json!({ "type": "error", "message": message });
    if let (Some(request_id), Some(object)) = (request_id, value.as_object_mut()) {
        object.insert("request_id".to_string(), request_id);
    }
    value.to_string()
}

// =============================================================================
// Routes & main
// =============================================================================

async fn health() -> &'static str {
    "hexfort-server ok"
}

async fn metrics_endpoint(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

async fn index() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html><head><title>hexfort</title></head>
<body>
<h1>hexfort game server</h1>
<p>Connect via WebSocket at <code>/ws</code></p>
<pre>
const ws = new WebSocket("ws://localhost:8765/ws");
ws.onmessage = (e) => console.log(JSON.parse(e.data));
ws.onopen = () => ws.send(JSON.stringify({ type: "signup", username: "demo", password: "demo123" }));
</pre>
</body></html>"#,
    )
}

fn load_config() -> GameConfig {
    let path = std::env::var("HEXFORT_CONFIG").unwrap_or_else(|_| "config/game.json".to_string());
    match std::fs::read_to_string(&path) {
        Ok(json) => match serde_json::from_str(&json) {
            Ok(config) => {
                tracing::info!(%path, "game config loaded");
                config
            }
            Err(error) => {
                tracing::warn!(%path, %error, "bad game config, using defaults");
                GameConfig::default()
            }
        },
        Err(_) => {
            tracing::info!(%path, "no game config found, using defaults");
            GameConfig::default()
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config();
    let port = config.port;
    let state = AppState::new(config);

    // Rehydrate from the last snapshot, if one exists.
    let snapshot_path =
        PathBuf::from(std::env::var("HEXFORT_STATE").unwrap_or_else(|_| "state.json".to_string()));
    if snapshot_path.exists() {
        match Snapshot::load(&snapshot_path) {
            Ok(snapshot) => {
                snapshot.restore(&mut state.world.lock().unwrap());
                tracing::info!(?snapshot_path, "state restored");
            }
            Err(error) => tracing::error!(?snapshot_path, %error, "state restore failed"),
        }
    }

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .expect("prometheus recorder");

    tokio::spawn(runtime::run_world_loop(state.clone()));
    tokio::spawn(runtime::run_snapshot_loop(
        state.clone(),
        snapshot_path.clone(),
        SNAPSHOT_INTERVAL_SECONDS,
    ));

    // Ctrl-c raises the stop flag for the world loop and every battle.
    {
        let state = state.clone();
        let snapshot_path = snapshot_path.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested");
                state.stop.store(true, Ordering::Relaxed);
                runtime::write_snapshot(&state, &snapshot_path);
                // Give loops a moment to finish their current tick.
                tokio::time::sleep(Duration::from_millis(200)).await;
                std::process::exit(0);
            }
        });
    }

    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/ws", get(ws_handler).with_state(state.clone()))
        .route(
            "/metrics",
            get(metrics_endpoint).with_state(prometheus.clone()),
        )
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap_or_else(|e| {
        eprintln!("Failed to bind to {addr}: {e}");
        std::process::exit(1);
    });
    tracing::info!(%addr, "hexfort-server listening");
    axum::serve(listener, app).await.expect("server run");
}
