//! Socket Mode transport: owns the WebSocket and feeds inbound events into a channel.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use karma_core::InboundEvent;

use crate::api::SlackClient;
use crate::envelope::Envelope;
use crate::error::SlackError;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How a single connection ended.
#[derive(Debug, PartialEq)]
enum Session {
    /// Slack asked us to go away or closed the socket; open a new one.
    Reconnect,
    /// Shutdown was requested or nobody is listening anymore.
    Finished,
}

/// Socket Mode client that forwards every inbound event, in arrival order.
pub struct SocketModeClient {
    api: SlackClient,
}

impl SocketModeClient {
    pub fn new(api: SlackClient) -> Self {
        Self { api }
    }

    /// Run until `shutdown` fires or the receiving side of `events` is dropped.
    ///
    /// Reconnects whenever Slack ends a session. Failing to open or read a
    /// connection is unrecoverable and returned as an error.
    pub async fn run(
        &self,
        events: mpsc::Sender<InboundEvent>,
        shutdown: CancellationToken,
    ) -> Result<(), SlackError> {
        loop {
            let url = tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                url = self.api.open_connection() => url?,
            };

            let (socket, _) = tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                connected = connect_async(url.as_str()) => connected?,
            };
            tracing::info!("Socket Mode connection established");

            match serve(socket, &events, &shutdown).await? {
                Session::Reconnect => {
                    tracing::info!("Reconnecting to Socket Mode");
                }
                Session::Finished => {
                    tracing::info!("Socket Mode client stopped");
                    return Ok(());
                }
            }
        }
    }
}

async fn serve(
    socket: Socket,
    events: &mpsc::Sender<InboundEvent>,
    shutdown: &CancellationToken,
) -> Result<Session, SlackError> {
    let (mut write, mut read) = socket.split();

    loop {
        let frame = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                // Best effort, the process is going away either way
                let _ = write.send(Message::Close(None)).await;
                return Ok(Session::Finished);
            }
            frame = read.next() => frame,
        };

        let text = match frame {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Close(frame))) => {
                tracing::info!(?frame, "Socket closed by server");
                return Ok(Session::Reconnect);
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
            None => {
                tracing::info!("Socket stream ended");
                return Ok(Session::Reconnect);
            }
        };

        let envelope = match Envelope::decode(&text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable Socket Mode frame");
                // Still ack it, or Slack keeps redelivering the same frame
                if let Some(ack) = Envelope::ack_raw(&text) {
                    write.send(Message::Text(ack)).await?;
                }
                continue;
            }
        };

        if let Some(ack) = envelope.ack() {
            write.send(Message::Text(ack)).await?;
        }

        match envelope.event {
            InboundEvent::Hello => {
                tracing::debug!("Received hello");
            }
            InboundEvent::Disconnect { reason } => {
                tracing::info!(?reason, "Slack requested disconnect");
                let _ = write.send(Message::Close(None)).await;
                return Ok(Session::Reconnect);
            }
            event => {
                if events.send(event).await.is_err() {
                    tracing::info!("Event receiver dropped");
                    return Ok(Session::Finished);
                }
            }
        }
    }
}
