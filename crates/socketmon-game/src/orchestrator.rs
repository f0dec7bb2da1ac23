//! The orchestrator: matchmaking, move routing, and disconnect cleanup.
//!
//! This is the single owner of all shared game state. The server holds
//! one instance behind a mutex, so every method runs to completion
//! before the next event is looked at.

use socketmon_protocol::{Cell, ConnectionId, Role};

use crate::{
    Delivery, GameError, GameId, GameSession, GridConfig, Membership, RoleQueues, Seat,
    SessionDirectory, WaitingPlayer,
};

/// Owns the role queues, the session directory, and every game.
#[derive(Debug)]
pub struct Orchestrator {
    grid: GridConfig,
    queues: RoleQueues,
    directory: SessionDirectory,
    next_game_id: u64,
}

impl Orchestrator {
    /// Creates an orchestrator with empty queues and no games.
    pub fn new(grid: GridConfig) -> Self {
        Self {
            grid,
            queues: RoleQueues::new(),
            directory: SessionDirectory::new(),
            next_game_id: 1,
        }
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// Queues `id` for `role`, then tries to make a match.
    ///
    /// The name is trimmed; an empty name falls back to the role's default.
    /// Returns the `game-started` events if a match was made, or nothing
    /// if the player has to wait.
    ///
    /// # Errors
    /// [`GameError::AlreadyInGame`] or [`GameError::AlreadyQueued`] if `id`
    /// already has a membership. Nothing changes in that case.
    pub fn declare_role(
        &mut self,
        id: ConnectionId,
        name: &str,
        role: Role,
    ) -> Result<Vec<Delivery>, GameError> {
        match self.directory.membership(id) {
            Some(Membership::Playing(_)) => return Err(GameError::AlreadyInGame),
            Some(Membership::Queued(_)) => return Err(GameError::AlreadyQueued),
            None => {}
        }

        let name = match name.trim() {
            "" => role.default_name().to_string(),
            trimmed => trimmed.to_string(),
        };
        tracing::info!(conn_id = %id, %role, %name, "player queued");

        self.queues.enqueue(
            role,
            WaitingPlayer {
                connection_id: id,
                name,
            },
        );
        self.directory.mark_queued(id, role);

        Ok(self.try_match())
    }

    /// Routes a `select-position` from `id` to its game.
    ///
    /// # Errors
    /// [`GameError::NoActiveGame`] if `id` isn't playing; otherwise
    /// whatever the game rejects the move with.
    pub fn select_position(
        &mut self,
        id: ConnectionId,
        cell: Cell,
    ) -> Result<Vec<Delivery>, GameError> {
        self.play(id, |session, grid| session.select_position(id, cell, grid))
    }

    /// Routes a `guess` from `id` to its game, dropping the game if it
    /// ended.
    ///
    /// # Errors
    /// Same as [`select_position`](Self::select_position).
    pub fn guess(&mut self, id: ConnectionId, cell: Cell) -> Result<Vec<Delivery>, GameError> {
        self.play(id, |session, grid| session.guess(id, cell, grid))
    }

    /// Cleans up after a closed connection.
    ///
    /// Drops its queue entry, or tears down its game and tells the
    /// opponent. Unknown ids are a no-op.
    pub fn disconnect(&mut self, id: ConnectionId) -> Vec<Delivery> {
        match self.directory.remove_connection(id) {
            Some(Membership::Queued(role)) => {
                self.queues.remove(role, id);
                tracing::info!(conn_id = %id, %role, "queued player left");
                Vec::new()
            }
            Some(Membership::Playing(game_id)) => match self.directory.remove_session(game_id) {
                Some(session) => {
                    tracing::info!(conn_id = %id, %game_id, "player left mid-game, game ended");
                    session.abandon(id)
                }
                None => Vec::new(),
            },
            None => Vec::new(),
        }
    }

    /// The game `id` is playing in.
    pub fn session_of(&self, id: ConnectionId) -> Option<&GameSession> {
        self.directory
            .game_of(id)
            .and_then(|game_id| self.directory.session(game_id))
    }

    pub fn membership(&self, id: ConnectionId) -> Option<Membership> {
        self.directory.membership(id)
    }

    /// Number of players waiting for `role`.
    pub fn queued(&self, role: Role) -> usize {
        self.queues.len(role)
    }

    /// Number of games in progress.
    pub fn active_games(&self) -> usize {
        self.directory.session_count()
    }

    fn play<F>(&mut self, id: ConnectionId, apply: F) -> Result<Vec<Delivery>, GameError>
    where
        F: FnOnce(&mut GameSession, &GridConfig) -> Result<Vec<Delivery>, GameError>,
    {
        let game_id = self.directory.game_of(id).ok_or(GameError::NoActiveGame)?;
        let session = self
            .directory
            .session_mut(game_id)
            .ok_or(GameError::NoActiveGame)?;

        let deliveries = apply(session, &self.grid)?;

        if session.is_finished() {
            self.directory.remove_session(game_id);
            tracing::info!(%game_id, "game over, session removed");
        }
        Ok(deliveries)
    }

    fn try_match(&mut self) -> Vec<Delivery> {
        let Some((pokemon, trainer)) = self.queues.pop_pair() else {
            return Vec::new();
        };

        let game_id = GameId(self.next_game_id);
        self.next_game_id += 1;

        let session = GameSession::new(
            game_id,
            Seat {
                connection_id: pokemon.connection_id,
                name: pokemon.name,
            },
            Seat {
                connection_id: trainer.connection_id,
                name: trainer.name,
            },
        );
        tracing::info!(
            %game_id,
            pokemon = %pokemon.connection_id,
            trainer = %trainer.connection_id,
            "match made"
        );

        let deliveries = session.start_events();
        self.directory.insert_session(session);
        deliveries
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}
