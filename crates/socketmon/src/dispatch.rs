//! Event dispatcher: routes decoded client events to the orchestrator or
//! the chat relay, and fans the resulting events out to connections.

use socketmon_game::{Delivery, GameError, Orchestrator};
use socketmon_protocol::{ClientEvent, Codec, ConnectionId, ServerEvent};
use socketmon_registry::ConnectionRegistry;

use crate::server::ServerState;

/// Routes one inbound event from `sender`.
pub(crate) async fn route<C: Codec>(state: &ServerState<C>, sender: ConnectionId, event: ClientEvent) {
    match event {
        ClientEvent::DeclareRole { name, role } => {
            apply(state, sender, |orch| orch.declare_role(sender, &name, role)).await;
        }
        ClientEvent::SelectPosition { cell } => {
            apply(state, sender, |orch| orch.select_position(sender, cell)).await;
        }
        ClientEvent::Guess { cell } => {
            apply(state, sender, |orch| orch.guess(sender, cell)).await;
        }
        ClientEvent::ChatMessage {
            text,
            sender_name,
            target_connection_id,
        } => {
            relay_chat(state, sender, target_connection_id, sender_name, text).await;
        }
        ClientEvent::Message { text } => {
            tracing::info!(conn_id = %sender, %text, "message received");
        }
    }
}

/// Runs disconnect cleanup for `conn_id`.
///
/// Queue entry, game, and registry entry go together under both locks,
/// so no other event can observe a half-cleaned connection.
pub(crate) async fn disconnect<C: Codec>(state: &ServerState<C>, conn_id: ConnectionId) {
    let mut orchestrator = state.orchestrator.lock().await;
    let deliveries = orchestrator.disconnect(conn_id);

    let mut registry = state.registry.lock().await;
    if let Err(e) = registry.unregister(conn_id) {
        tracing::debug!(%conn_id, error = %e, "unregister failed");
    }
    deliver(&registry, deliveries);
}

/// Applies an orchestrator operation and delivers its outcome.
///
/// Rule violations go back to `sender` only, as an `error` event.
async fn apply<C, F>(state: &ServerState<C>, sender: ConnectionId, op: F)
where
    C: Codec,
    F: FnOnce(&mut Orchestrator) -> Result<Vec<Delivery>, GameError>,
{
    let mut orchestrator = state.orchestrator.lock().await;
    let result = op(&mut orchestrator);

    let registry = state.registry.lock().await;
    match result {
        Ok(deliveries) => deliver(&registry, deliveries),
        Err(e) => {
            tracing::debug!(conn_id = %sender, error = %e, "event rejected");
            registry.send(sender, ServerEvent::error(e.to_string()));
        }
    }
}

/// Forwards a chat line if the target is online; drops it otherwise.
async fn relay_chat<C: Codec>(
    state: &ServerState<C>,
    sender: ConnectionId,
    target: ConnectionId,
    sender_name: String,
    text: String,
) {
    let registry = state.registry.lock().await;
    if !registry.is_connected(target) {
        tracing::debug!(conn_id = %sender, %target, "chat target offline, dropped");
        return;
    }
    registry.send(target, ServerEvent::ChatMessage { sender_name, text });
}

fn deliver(registry: &ConnectionRegistry, deliveries: Vec<Delivery>) {
    for (target, event) in deliveries {
        if !registry.send(target, event) {
            tracing::debug!(%target, "delivery dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socketmon_game::GridConfig;
    use socketmon_protocol::{Cell, EndReason, JsonCodec, Role};
    use socketmon_registry::OutboundReceiver;
    use tokio::sync::{mpsc, Mutex};

    fn state() -> ServerState<JsonCodec> {
        ServerState {
            orchestrator: Mutex::new(Orchestrator::new(GridConfig::default())),
            registry: Mutex::new(ConnectionRegistry::new()),
            codec: JsonCodec,
            idle_timeout: crate::DEFAULT_IDLE_TIMEOUT,
        }
    }

    async fn connect(state: &ServerState<JsonCodec>, id: u64) -> (ConnectionId, OutboundReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ConnectionId::new(id);
        state.registry.lock().await.register(id, tx).unwrap();
        (id, rx)
    }

    fn drain(rx: &mut OutboundReceiver) -> Vec<ServerEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    fn declare(name: &str, role: Role) -> ClientEvent {
        ClientEvent::DeclareRole {
            name: name.into(),
            role,
        }
    }

    #[tokio::test]
    async fn test_rejected_move_reaches_only_the_sender() {
        let state = state();
        let (p, mut p_rx) = connect(&state, 1).await;
        let (t, mut t_rx) = connect(&state, 2).await;
        route(&state, p, declare("Pikachu", Role::Pokemon)).await;
        route(&state, t, declare("Ash", Role::Trainer)).await;
        drain(&mut p_rx);
        drain(&mut t_rx);

        route(&state, t, ClientEvent::Guess { cell: Cell(1) }).await;

        assert_eq!(drain(&mut t_rx), vec![ServerEvent::error("not your turn")]);
        assert!(drain(&mut p_rx).is_empty());
    }

    #[tokio::test]
    async fn test_chat_is_forwarded_verbatim() {
        let state = state();
        let (a, _a_rx) = connect(&state, 1).await;
        let (b, mut b_rx) = connect(&state, 2).await;

        route(
            &state,
            a,
            ClientEvent::ChatMessage {
                text: "bora jogar?".into(),
                sender_name: "Ash".into(),
                target_connection_id: b,
            },
        )
        .await;

        assert_eq!(
            drain(&mut b_rx),
            vec![ServerEvent::ChatMessage {
                sender_name: "Ash".into(),
                text: "bora jogar?".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_chat_to_offline_target_is_dropped_silently() {
        let state = state();
        let (a, mut a_rx) = connect(&state, 1).await;

        route(
            &state,
            a,
            ClientEvent::ChatMessage {
                text: "alô?".into(),
                sender_name: "Ash".into(),
                target_connection_id: ConnectionId::new(404),
            },
        )
        .await;

        assert!(drain(&mut a_rx).is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_cleans_queue_game_and_registry_together() {
        let state = state();
        let (p, _p_rx) = connect(&state, 1).await;
        let (t, mut t_rx) = connect(&state, 2).await;
        let (q, _q_rx) = connect(&state, 3).await;
        route(&state, p, declare("Pikachu", Role::Pokemon)).await;
        route(&state, t, declare("Ash", Role::Trainer)).await;
        route(&state, q, declare("Eevee", Role::Pokemon)).await;
        drain(&mut t_rx);

        disconnect(&state, p).await;
        disconnect(&state, q).await;

        assert_eq!(
            drain(&mut t_rx),
            vec![ServerEvent::GameEnded {
                reason: EndReason::OpponentDisconnected
            }]
        );
        let orch = state.orchestrator.lock().await;
        assert_eq!(orch.active_games(), 0);
        assert_eq!(orch.queued(Role::Pokemon), 0);
        let registry = state.registry.lock().await;
        assert!(!registry.is_connected(p));
        assert!(!registry.is_connected(q));
        assert!(registry.is_connected(t));
    }
}
