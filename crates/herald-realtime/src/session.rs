//! Per-connection session loop.
//!
//! A session joins its connection to the hub, relays every inbound text as a
//! private echo plus a public broadcast, and leaves the hub exactly once when
//! the client goes away. Outbound traffic is written by a separate task so a
//! slow socket only ever delays its own client.

use crate::connection::{
    connection, ClientId, MessageSink, MessageSource, Outbound, DEFAULT_OUTBOUND_CAPACITY,
};
use crate::error::{RecvError, SendError};
use crate::event::ChatMessage;
use crate::hub::Hub;
use crate::registry::ConnectionHandle;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default bound on a single socket write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Session tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Messages buffered for a client before further ones are dropped.
    pub outbound_capacity: usize,
    /// How long one write may take before the client is considered gone.
    pub write_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

/// What a finished session did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Handle the connection was joined under, if the hub accepted it.
    pub handle: Option<ConnectionHandle>,
    /// Inbound messages relayed.
    pub messages_relayed: u64,
}

/// Why the read loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Disconnected,
    TransportError,
    WriterClosed,
}

/// Run a session until the client disconnects or its writes fail.
pub async fn run_session<S, R>(
    hub: Arc<Hub>,
    client_id: ClientId,
    sink: S,
    mut source: R,
    config: SessionConfig,
) -> SessionSummary
where
    S: MessageSink + 'static,
    R: MessageSource,
{
    let (conn, outbound) = connection(client_id, config.outbound_capacity);
    let mut writer = tokio::spawn(write_loop(client_id, outbound, sink, config.write_timeout));

    let handle = match hub.join(conn) {
        Ok(handle) => handle,
        Err(e) => {
            warn!(client_id, error = %e, "Session rejected");
            writer.abort();
            return SessionSummary {
                handle: None,
                messages_relayed: 0,
            };
        }
    };

    let mut relayed = 0;
    let exit = loop {
        tokio::select! {
            received = source.receive() => match received {
                Ok(text) => {
                    hub.send(handle, ChatMessage::Echo { text: text.clone() }.to_string());
                    hub.broadcast(ChatMessage::Says { client_id, text }.to_string());
                    relayed += 1;
                }
                Err(RecvError::Disconnected) => break Exit::Disconnected,
                Err(e) => {
                    warn!(client_id, handle = %handle, error = %e, "Receive failed");
                    break Exit::TransportError;
                }
            },
            _ = &mut writer => break Exit::WriterClosed,
        }
    };

    hub.leave(handle);
    writer.abort();

    info!(
        client_id,
        handle = %handle,
        relayed,
        reason = ?exit,
        "Session ended"
    );

    SessionSummary {
        handle: Some(handle),
        messages_relayed: relayed,
    }
}

/// Drain the outbound queue into the transport.
///
/// Stops at the first failed or timed-out write; dropping the queue makes
/// every later hub write to this connection report `Closed`.
async fn write_loop<S: MessageSink>(
    client_id: ClientId,
    mut outbound: Outbound,
    mut sink: S,
    write_timeout: Duration,
) {
    while let Some(message) = outbound.recv().await {
        let written = tokio::time::timeout(write_timeout, sink.send(message))
            .await
            .unwrap_or(Err(SendError::TimedOut));

        match written {
            Ok(()) => {}
            Err(SendError::TimedOut) => {
                warn!(
                    client_id,
                    timeout_ms = write_timeout.as_millis() as u64,
                    "Write timed out"
                );
                break;
            }
            Err(e) => {
                debug!(client_id, error = %e, "Write failed");
                break;
            }
        }
    }

    outbound.close();
    sink.close().await;
    debug!(client_id, "Writer ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::HubConfig;
    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use tokio::task::JoinHandle;

    const WAIT: Duration = Duration::from_secs(2);

    struct TestClient {
        to_server: mpsc::Sender<String>,
        from_server: mpsc::Receiver<String>,
        task: JoinHandle<SessionSummary>,
    }

    impl TestClient {
        async fn say(&self, text: &str) {
            self.to_server.send(text.to_string()).await.unwrap();
        }

        async fn next(&mut self) -> String {
            tokio::time::timeout(WAIT, self.from_server.recv())
                .await
                .expect("timed out waiting for message")
                .expect("session closed")
        }

        async fn disconnect(self) -> (mpsc::Receiver<String>, SessionSummary) {
            drop(self.to_server);
            let summary = tokio::time::timeout(WAIT, self.task)
                .await
                .expect("session did not end")
                .unwrap();
            (self.from_server, summary)
        }
    }

    /// Start a session and wait until its own join notice arrives.
    async fn connect(hub: &Arc<Hub>, client_id: ClientId) -> TestClient {
        let (to_server, server_rx) = mpsc::channel(64);
        let (server_tx, from_server) = mpsc::channel(64);
        let task = tokio::spawn(run_session(
            hub.clone(),
            client_id,
            server_tx,
            server_rx,
            SessionConfig::default(),
        ));
        let mut client = TestClient {
            to_server,
            from_server,
            task,
        };
        assert_eq!(
            client.next().await,
            format!("Client #{} joined the chat", client_id)
        );
        client
    }

    #[tokio::test]
    async fn test_join_announced_to_existing_members() {
        let hub = Arc::new(Hub::default());
        let mut first = connect(&hub, 1).await;
        let _second = connect(&hub, 2).await;

        assert_eq!(first.next().await, "Client #2 joined the chat");
        assert_eq!(hub.connection_count(), 2);
    }

    #[tokio::test]
    async fn test_echo_and_fanout() {
        let hub = Arc::new(Hub::default());
        let mut sender = connect(&hub, 7).await;
        let mut other = connect(&hub, 8).await;
        assert_eq!(sender.next().await, "Client #8 joined the chat");

        sender.say("hi").await;

        assert_eq!(sender.next().await, "You wrote: hi");
        assert_eq!(sender.next().await, "Client #7 says: hi");
        assert_eq!(other.next().await, "Client #7 says: hi");
    }

    #[tokio::test]
    async fn test_order_preserved_per_sender() {
        let hub = Arc::new(Hub::default());
        let sender = connect(&hub, 1).await;
        let mut listener = connect(&hub, 2).await;

        for text in ["m1", "m2", "m3"] {
            sender.say(text).await;
        }

        assert_eq!(listener.next().await, "Client #1 says: m1");
        assert_eq!(listener.next().await, "Client #1 says: m2");
        assert_eq!(listener.next().await, "Client #1 says: m3");
    }

    #[tokio::test]
    async fn test_disconnect_announces_leave() {
        let hub = Arc::new(Hub::default());
        let leaver = connect(&hub, 3).await;
        let mut stayer = connect(&hub, 4).await;

        leaver.say("bye").await;
        assert_eq!(stayer.next().await, "Client #3 says: bye");

        let (_, summary) = leaver.disconnect().await;

        assert_eq!(summary.messages_relayed, 1);
        assert!(summary.handle.is_some());
        assert_eq!(stayer.next().await, "Client #3 left the chat");
        assert_eq!(hub.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_broken_writer_ends_session() {
        let hub = Arc::new(Hub::default());
        let mut broken = connect(&hub, 5).await;
        let mut watcher = connect(&hub, 6).await;
        assert_eq!(broken.next().await, "Client #6 joined the chat");

        // Client stops reading entirely; the next write to it fails
        let TestClient {
            to_server,
            from_server,
            task,
        } = broken;
        drop(from_server);
        hub.broadcast("wake up");

        let summary = tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
        assert!(summary.handle.is_some());

        assert_eq!(watcher.next().await, "wake up");
        assert_eq!(watcher.next().await, "Client #5 left the chat");
        assert_eq!(hub.connection_count(), 1);
        drop(to_server);
    }

    struct StalledSink;

    #[async_trait]
    impl MessageSink for StalledSink {
        async fn send(&mut self, _text: String) -> Result<(), SendError> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_stalled_writer_times_out() {
        let hub = Arc::new(Hub::default());
        let mut watcher = connect(&hub, 1).await;

        let (_to_server, server_rx) = mpsc::channel::<String>(8);
        let config = SessionConfig {
            outbound_capacity: 8,
            write_timeout: Duration::from_millis(50),
        };
        let summary = tokio::time::timeout(
            WAIT,
            run_session(hub.clone(), 2, StalledSink, server_rx, config),
        )
        .await
        .expect("stalled session should end");

        assert!(summary.handle.is_some());
        assert_eq!(watcher.next().await, "Client #2 joined the chat");
        assert_eq!(watcher.next().await, "Client #2 left the chat");
        assert_eq!(hub.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_when_full() {
        let hub = Arc::new(Hub::new(HubConfig {
            max_connections: Some(0),
        }));
        let (_to_server, server_rx) = mpsc::channel::<String>(8);
        let (server_tx, _from_server) = mpsc::channel::<String>(8);

        let summary = run_session(
            hub.clone(),
            9,
            server_tx,
            server_rx,
            SessionConfig::default(),
        )
        .await;

        assert_eq!(summary.handle, None);
        assert_eq!(hub.connection_count(), 0);
    }
}
