//! Session directory: which connection is where.
//!
//! Two maps kept in lockstep:
//!
//! - `sessions`: every active game, by [`GameId`]
//! - `members`: every connection that is queued or playing
//!
//! A connection appears in `members` at most once, so it can't be in two
//! games, or in a game and a queue, at the same time.

use std::collections::HashMap;
use std::fmt;

use socketmon_protocol::{ConnectionId, Role};

use crate::GameSession;

/// A unique identifier for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// What a connection is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Waiting in the queue for this role.
    Queued(Role),
    /// Playing in this game.
    Playing(GameId),
}

/// Maps connections to their queue slot or game.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    sessions: HashMap<GameId, GameSession>,
    members: HashMap<ConnectionId, Membership>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// What `id` is doing, if anything.
    pub fn membership(&self, id: ConnectionId) -> Option<Membership> {
        self.members.get(&id).copied()
    }

    /// Records that `id` is waiting for `role`.
    pub fn mark_queued(&mut self, id: ConnectionId, role: Role) {
        self.members.insert(id, Membership::Queued(role));
    }

    /// Stores a new game and points both participants at it.
    ///
    /// Any `Queued` membership the participants had is replaced.
    pub fn insert_session(&mut self, session: GameSession) {
        let game_id = session.id();
        for id in session.participants() {
            self.members.insert(id, Membership::Playing(game_id));
        }
        self.sessions.insert(game_id, session);
    }

    /// The game `id` is playing in, if any.
    pub fn game_of(&self, id: ConnectionId) -> Option<GameId> {
        match self.members.get(&id)? {
            Membership::Playing(game_id) => Some(*game_id),
            Membership::Queued(_) => None,
        }
    }

    pub fn session(&self, game_id: GameId) -> Option<&GameSession> {
        self.sessions.get(&game_id)
    }

    pub fn session_mut(&mut self, game_id: GameId) -> Option<&mut GameSession> {
        self.sessions.get_mut(&game_id)
    }

    /// Removes a game and every membership that still points at it.
    pub fn remove_session(&mut self, game_id: GameId) -> Option<GameSession> {
        let session = self.sessions.remove(&game_id)?;
        for id in session.participants() {
            if self.members.get(&id) == Some(&Membership::Playing(game_id)) {
                self.members.remove(&id);
            }
        }
        Some(session)
    }

    /// Forgets `id` and returns what it was doing.
    ///
    /// Leaves any game it was in untouched; the caller decides what to do
    /// with it.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Membership> {
        self.members.remove(&id)
    }

    /// Number of active games.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of connections that are queued or playing.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Seat;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn session(game: u64, pokemon: u64, trainer: u64) -> GameSession {
        GameSession::new(
            GameId(game),
            Seat {
                connection_id: conn(pokemon),
                name: "Pikachu".into(),
            },
            Seat {
                connection_id: conn(trainer),
                name: "Ash".into(),
            },
        )
    }

    #[test]
    fn test_insert_session_replaces_queued_membership() {
        let mut dir = SessionDirectory::new();
        dir.mark_queued(conn(1), Role::Pokemon);
        dir.mark_queued(conn(2), Role::Trainer);

        dir.insert_session(session(7, 1, 2));

        assert_eq!(dir.membership(conn(1)), Some(Membership::Playing(GameId(7))));
        assert_eq!(dir.game_of(conn(2)), Some(GameId(7)));
        assert_eq!(dir.member_count(), 2);
    }

    #[test]
    fn test_game_of_queued_connection_is_none() {
        let mut dir = SessionDirectory::new();
        dir.mark_queued(conn(1), Role::Trainer);
        assert_eq!(dir.game_of(conn(1)), None);
        assert_eq!(dir.membership(conn(1)), Some(Membership::Queued(Role::Trainer)));
    }

    #[test]
    fn test_remove_session_clears_both_members() {
        let mut dir = SessionDirectory::new();
        dir.insert_session(session(7, 1, 2));

        let removed = dir.remove_session(GameId(7)).unwrap();
        assert_eq!(removed.id(), GameId(7));
        assert_eq!(dir.session_count(), 0);
        assert_eq!(dir.member_count(), 0);
        assert!(dir.remove_session(GameId(7)).is_none());
    }

    #[test]
    fn test_remove_connection_then_session_leaves_nothing_behind() {
        let mut dir = SessionDirectory::new();
        dir.insert_session(session(7, 1, 2));

        assert_eq!(
            dir.remove_connection(conn(1)),
            Some(Membership::Playing(GameId(7)))
        );
        dir.remove_session(GameId(7)).unwrap();

        assert_eq!(dir.membership(conn(2)), None);
        assert_eq!(dir.member_count(), 0);
    }

    #[test]
    fn test_games_are_independent() {
        let mut dir = SessionDirectory::new();
        dir.insert_session(session(1, 1, 2));
        dir.insert_session(session(2, 3, 4));

        dir.remove_session(GameId(1));

        assert_eq!(dir.game_of(conn(3)), Some(GameId(2)));
        assert!(dir.session(GameId(2)).is_some());
        assert_eq!(dir.session_count(), 1);
    }
}
