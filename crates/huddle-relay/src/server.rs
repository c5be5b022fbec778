//! TCP accept loop and coordinator lifecycle.

use std::future::Future;
use std::net::SocketAddr;

use huddle_common::HuddleError;
use huddle_config::HuddleConfig;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;

use crate::connection::handle_connection;
use crate::handle::{self, CoordinatorHandle};

/// A bound listener plus the coordinator it feeds.
///
/// The coordinator is created here and torn down when [`Server::run_until`]
/// returns.
pub struct Server {
    listener: TcpListener,
    coordinator: CoordinatorHandle,
    coordinator_task: JoinHandle<()>,
    outbound_queue: usize,
}

impl Server {
    /// Bind the configured address and start the coordinator.
    pub async fn bind(config: &HuddleConfig) -> Result<Self, HuddleError> {
        if config.relay.outbound_queue == 0 || config.relay.command_queue == 0 {
            return Err(HuddleError::Other(
                "relay.outbound_queue and relay.command_queue must be at least 1".into(),
            ));
        }

        let addr = config.server.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| HuddleError::Network(format!("failed to bind {addr}: {e}")))?;

        let (coordinator, coordinator_task) = handle::spawn(&config.relay, &config.chat);

        Ok(Self {
            listener,
            coordinator,
            coordinator_task,
            outbound_queue: config.relay.outbound_queue,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, HuddleError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn handle(&self) -> CoordinatorHandle {
        self.coordinator.clone()
    }

    /// Accept connections until `shutdown` resolves, then stop the coordinator.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), HuddleError>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("huddle-relay listening on {}", self.local_addr()?);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let coordinator = self.coordinator.clone();
                        let outbound_queue = self.outbound_queue;
                        tokio::spawn(async move {
                            match accept_async(stream).await {
                                Ok(ws) => handle_connection(ws, addr, coordinator, outbound_queue).await,
                                Err(e) => {
                                    tracing::warn!(peer = %addr, error = %e, "WS handshake failed");
                                }
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "TCP accept error");
                    }
                },
            }
        }

        let _ = self.coordinator.shutdown().await;
        self.coordinator_task
            .await
            .map_err(|e| HuddleError::Other(format!("coordinator task failed: {e}")))?;
        Ok(())
    }
}
