//! WebSocket handler for real-time communication

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::audio::device::list_input_devices;
use crate::protocol::{ControlMessage, DevicesResponse};
use crate::session::SessionController;
use crate::ui::server::AppState;

/// WebSocket upgrade handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let controller = state.controller.clone();
    let mut control_rx = controller.subscribe();
    let control_tx = controller.sender();

    // Send initial status and the device list (enumerated once per
    // connection; labels may still be empty pre-permission).
    let status_msg = ControlMessage::Status(controller.status());
    if let Ok(json) = serde_json::to_string(&status_msg) {
        let _ = sender.send(Message::Text(json)).await;
    }
    let devices_msg = ControlMessage::Devices(DevicesResponse::new(list_input_devices()));
    if let Ok(json) = serde_json::to_string(&devices_msg) {
        let _ = sender.send(Message::Text(json)).await;
    }

    // Spawn task to forward broadcast messages (frames included) to the
    // WebSocket.
    let mut send_task = tokio::spawn(async move {
        loop {
            match control_rx.recv().await {
                Ok(msg) => {
                    if let Ok(json) = serde_json::to_string(&msg) {
                        if sender.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                }
                // A slow client only misses frames; the next one catches
                // it up.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Handle incoming messages
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if let Ok(control_msg) = serde_json::from_str::<ControlMessage>(&text) {
                        handle_control_message(control_msg, &controller, &control_tx).await;
                    }
                }
                Message::Binary(_) => {
                    // Binary messages not supported
                }
                Message::Ping(_data) => {
                    // Pong is handled automatically by axum
                }
                Message::Pong(_) => {
                    // Ignore pongs
                }
                Message::Close(_) => {
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }
}

/// Handle incoming control message
async fn handle_control_message(
    msg: ControlMessage,
    controller: &Arc<SessionController>,
    control_tx: &broadcast::Sender<ControlMessage>,
) {
    match msg {
        ControlMessage::GetStatus => {
            let _ = control_tx.send(ControlMessage::Status(controller.status()));
        }

        ControlMessage::ListDevices => {
            let resp = DevicesResponse::new(list_input_devices());
            let _ = control_tx.send(ControlMessage::Devices(resp));
        }

        ControlMessage::Start { device_id } => {
            if let Err(e) = controller.start(device_id.as_deref()) {
                tracing::warn!("Start request failed: {}", e);
                let _ = control_tx.send(ControlMessage::Error {
                    message: e.to_string(),
                });
            }
        }

        ControlMessage::Stop => {
            controller.stop();
        }

        ControlMessage::Ping => {
            let _ = control_tx.send(ControlMessage::Pong);
        }

        _ => {
            // Other messages are informational
        }
    }
}
