//! Role queues: who is waiting for an opponent.

use std::collections::VecDeque;

use socketmon_protocol::{ConnectionId, Role};

/// A player who declared a role and hasn't been matched yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitingPlayer {
    pub connection_id: ConnectionId,
    pub name: String,
}

/// Two FIFO waiting lists, one per role.
///
/// The queues don't check for duplicates; the orchestrator only enqueues
/// connections that have no membership in the directory.
#[derive(Debug, Default)]
pub struct RoleQueues {
    pokemon: VecDeque<WaitingPlayer>,
    trainer: VecDeque<WaitingPlayer>,
}

impl RoleQueues {
    /// Creates two empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self, role: Role) -> &VecDeque<WaitingPlayer> {
        match role {
            Role::Pokemon => &self.pokemon,
            Role::Trainer => &self.trainer,
        }
    }

    fn queue_mut(&mut self, role: Role) -> &mut VecDeque<WaitingPlayer> {
        match role {
            Role::Pokemon => &mut self.pokemon,
            Role::Trainer => &mut self.trainer,
        }
    }

    /// Adds a player at the tail of the queue for `role`.
    pub fn enqueue(&mut self, role: Role, player: WaitingPlayer) {
        self.queue_mut(role).push_back(player);
    }

    /// Removes a connection from the queue for `role`.
    ///
    /// Returns the removed entry, or `None` if it wasn't queued there.
    pub fn remove(&mut self, role: Role, id: ConnectionId) -> Option<WaitingPlayer> {
        let queue = self.queue_mut(role);
        let index = queue.iter().position(|p| p.connection_id == id)?;
        queue.remove(index)
    }

    /// Pops the longest-waiting pokemon and trainer, in that order.
    ///
    /// Pops nothing unless BOTH queues are non-empty.
    pub fn pop_pair(&mut self) -> Option<(WaitingPlayer, WaitingPlayer)> {
        if self.pokemon.is_empty() || self.trainer.is_empty() {
            return None;
        }
        let pokemon = self.pokemon.pop_front()?;
        let trainer = self.trainer.pop_front()?;
        Some((pokemon, trainer))
    }

    /// Number of players waiting for `role`.
    pub fn len(&self, role: Role) -> usize {
        self.queue(role).len()
    }

    /// Returns `true` if nobody is waiting in either queue.
    pub fn is_empty(&self) -> bool {
        self.pokemon.is_empty() && self.trainer.is_empty()
    }
}
