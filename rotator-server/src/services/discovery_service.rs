use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use rotator_api::models::DiscoveryReply;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time;

const MAX_DATAGRAM: usize = 1024;
const RECV_BACKOFF_BASE: Duration = Duration::from_millis(50);
const RECV_BACKOFF_MAX: Duration = Duration::from_secs(5);

/// Pause before the next receive after `consecutive_errors` failures in a row.
fn recv_backoff(consecutive_errors: u32) -> Duration {
    let factor = 1u32 << consecutive_errors.saturating_sub(1).min(7);
    (RECV_BACKOFF_BASE * factor).min(RECV_BACKOFF_MAX)
}

/// Answers Alpaca discovery probes with the HTTP port of this server.
pub struct DiscoveryResponder {
    local_addr: SocketAddr,
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl DiscoveryResponder {
    pub async fn start(addr: SocketAddr, alpaca_port: u16) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind discovery socket to {}: {}", addr, e);
            e
        })?;
        let local_addr = socket.local_addr()?;
        tracing::info!("Discovery responder listening on {}", local_addr);

        let reply = serde_json::to_vec(&DiscoveryReply { alpaca_port })
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let mut stop_fut = Box::pin(stop_rx);
            let mut buffer = [0u8; MAX_DATAGRAM];
            let mut consecutive_errors = 0u32;

            loop {
                tokio::select! {
                    _ = &mut stop_fut => {
                        tracing::info!("Discovery responder shutting down");
                        break;
                    },
                    received = socket.recv_from(&mut buffer) => {
                        match received {
                            Ok((len, peer)) => {
                                consecutive_errors = 0;
                                let datagram = &buffer[..len];
                                tracing::info!(
                                    "Discovery received \"{}\" from {}",
                                    String::from_utf8_lossy(datagram),
                                    peer
                                );

                                if DiscoveryReply::is_probe(datagram) {
                                    if let Err(e) = socket.send_to(&reply, peer).await {
                                        tracing::warn!("Failed to answer discovery probe from {}: {}", peer, e);
                                    }
                                }
                            },
                            Err(e) => {
                                consecutive_errors = consecutive_errors.saturating_add(1);
                                let backoff = recv_backoff(consecutive_errors);
                                tracing::error!("Discovery receive failed: {}, retrying in {:?}", e, backoff);

                                tokio::select! {
                                    _ = &mut stop_fut => {
                                        tracing::info!("Discovery responder shutting down");
                                        break;
                                    },
                                    _ = time::sleep(backoff) => {},
                                }
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            local_addr,
            stop_tx: Some(stop_tx),
            task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            if tx.send(()).is_err() {
                tracing::warn!("Discovery responder already stopped");
            }
        }

        if let Err(e) = (&mut self.task).await {
            tracing::warn!("Discovery task ended abnormally: {}", e);
        }
    }
}

impl Drop for DiscoveryResponder {
    fn drop(&mut self) {
        self.task.abort();
    }
}
