//! Per-connection handler: register, then pump frames both ways until the
//! socket closes.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use huddle_common::ConnectionId;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::error::RelayError;
use crate::handle::CoordinatorHandle;
use crate::protocol::parse_client_event;

/// Handle a single WebSocket connection.
pub async fn handle_connection(
    ws: WebSocketStream<TcpStream>,
    addr: SocketAddr,
    coordinator: CoordinatorHandle,
    outbound_queue: usize,
) {
    let (mut sink, mut stream) = ws.split();
    let id = ConnectionId::new();

    // 1. Create our outbound queue and register it.
    let (tx, mut rx) = mpsc::channel::<String>(outbound_queue.max(1));
    if coordinator.connect(id.clone(), tx).await.is_err() {
        tracing::warn!(peer = %addr, "Coordinator stopped, refusing connection");
        return;
    }

    tracing::info!(peer = %addr, conn = %id, "Client connected");

    // 2. Forwarding loop.
    loop {
        tokio::select! {
            // Queued events → this client's WebSocket
            Some(frame) = rx.recv() => {
                if sink.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }

            // This client's WebSocket → coordinator
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        let submitted = match parse_client_event(&text) {
                            Ok(event) => coordinator.event(id.clone(), event).await,
                            Err(e) => coordinator.reject(id.clone(), e).await,
                        };
                        if submitted.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        let error = RelayError::Protocol("binary frames are not supported".into());
                        if coordinator.reject(id.clone(), error).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(peer = %addr, conn = %id, error = %e, "WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    // 3. Cleanup.
    let _ = coordinator.disconnect(id.clone()).await;
    tracing::info!(peer = %addr, conn = %id, "Client disconnected");
}
