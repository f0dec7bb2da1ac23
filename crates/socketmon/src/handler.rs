//! Per-connection handler: registration, the read/write loop, and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register in the connection registry, send `assigned-id`
//!   2. Loop: decode inbound frames → dispatcher; drain outbound channel → socket
//!   3. Ping the client periodically; any inbound frame, pongs included,
//!      counts as a sign of life
//!   4. On close, error, or a full idle timeout with no inbound frame:
//!      disconnect cleanup via the guard

use std::sync::Arc;
use std::time::Duration;

use socketmon_protocol::{ClientEvent, Codec, ConnectionId, ServerEvent};
use socketmon_transport::{Connection, Inbound, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::dispatch;
use crate::server::ServerState;
use crate::SocketmonError;

/// Drop guard that runs disconnect cleanup when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async locks.
struct ConnectionGuard<C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            dispatch::disconnect(&state, conn_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), SocketmonError> {
    let conn_id = conn.id();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.registry.lock().await.register(conn_id, tx)?;
    let _guard = ConnectionGuard {
        conn_id,
        state: Arc::clone(&state),
    };

    send_event(
        &conn,
        &state.codec,
        &ServerEvent::AssignedId {
            connection_id: conn_id,
        },
    )
    .await?;

    // Only inbound frames push the deadline back; pings keep quiet
    // clients answering so they count as alive.
    let idle = tokio::time::sleep(state.idle_timeout);
    tokio::pin!(idle);
    let period = heartbeat_period(state.idle_timeout);
    let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            inbound = conn.recv() => {
                match inbound {
                    Ok(Some(frame)) => {
                        idle.as_mut().reset(Instant::now() + state.idle_timeout);
                        if let Inbound::Data(data) = frame {
                            handle_frame(&state, conn_id, &data).await;
                        }
                    }
                    Ok(None) => {
                        tracing::info!(%conn_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "recv error");
                        break;
                    }
                }
            }
            () = &mut idle => {
                tracing::info!(%conn_id, "no frames within idle timeout, closing");
                break;
            }
            _ = heartbeat.tick() => {
                if let Err(e) = conn.ping().await {
                    tracing::debug!(%conn_id, error = %e, "ping failed");
                    break;
                }
            }
            Some(event) = rx.recv() => {
                send_event(&conn, &state.codec, &event).await?;
            }
        }
    }

    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close failed");
    }
    // _guard drops here → disconnect cleanup fires.
    Ok(())
}

/// Pings go out three times per idle window, so one lost pong never
/// closes a live connection.
fn heartbeat_period(idle_timeout: Duration) -> Duration {
    (idle_timeout / 3).max(Duration::from_millis(10))
}

/// Decodes one inbound frame and hands it to the dispatcher.
///
/// Undecodable frames are answered with an `error` event and otherwise
/// ignored.
async fn handle_frame<C: Codec>(state: &ServerState<C>, conn_id: ConnectionId, data: &[u8]) {
    match state.codec.decode::<ClientEvent>(data) {
        Ok(event) => dispatch::route(state, conn_id, event).await,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "failed to decode event");
            state
                .registry
                .lock()
                .await
                .send(conn_id, ServerEvent::error(format!("invalid message: {e}")));
        }
    }
}

async fn send_event(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    event: &ServerEvent,
) -> Result<(), SocketmonError> {
    let text = codec.encode(event)?;
    conn.send(&text).await?;
    Ok(())
}
