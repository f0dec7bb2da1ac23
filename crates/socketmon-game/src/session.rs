//! The per-game turn state machine.
//!
//! ```text
//!            select-position              guess (miss, < threshold)
//! AwaitingHiddenPosition ──→ AwaitingGuess ──────────────────┐
//!          ↑                      │                           │
//!          └──────────────────────┼───────────────────────────┘
//!                                 ├── guess (hit) ─────────→ Finished(PokemonCaught)
//!                                 └── guess (miss, threshold) → Finished(PokemonEscaped)
//! ```
//!
//! The hidden cell only exists inside `AwaitingGuess`, so "hidden position
//! set while it's the pokemon's turn" can't be represented. Every rejected
//! move returns before the first mutation.

use std::collections::BTreeSet;

use socketmon_protocol::{Cell, ConnectionId, EndReason, GameResult, Role, ServerEvent};

use crate::{GameError, GameId, GridConfig};

/// An event addressed to one connection.
pub type Delivery = (ConnectionId, ServerEvent);

const HIDE_PROMPT: &str = "Escolha onde se esconder";
const WAIT_PROMPT: &str = "Aguarde";
const POSITION_CHOSEN: &str = "Posição escolhida! Aguarde o treinador";
const GUESS_PROMPT: &str = "Adivinhe onde o pokémon está escondido";
const WRONG_GUESS: &str = "Errou! Aguarde o pokémon se esconder novamente";
const HIDE_AGAIN: &str = "O treinador errou! Escolha um novo esconderijo";
const CAUGHT_WIN: &str = "Você capturou o pokémon!";
const CAUGHT_LOSE: &str = "Você foi capturado!";
const ESCAPE_WIN: &str = "Você escapou!";
const ESCAPE_LOSE: &str = "O pokémon escapou!";

/// One participant of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub connection_id: ConnectionId,
    pub name: String,
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The trainer guessed the hidden cell.
    PokemonCaught { at: Cell },
    /// Only one unguessed cell was left.
    PokemonEscaped { hidden: Cell },
}

/// Where a game is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// The pokemon must pick a cell.
    AwaitingHiddenPosition,
    /// The trainer must guess; `hidden` is where the pokemon is.
    AwaitingGuess { hidden: Cell },
    /// Terminal. The directory drops the session right after.
    Finished(Outcome),
}

impl TurnState {
    /// The role allowed to move, or `None` once finished.
    pub fn current_turn(&self) -> Option<Role> {
        match self {
            Self::AwaitingHiddenPosition => Some(Role::Pokemon),
            Self::AwaitingGuess { .. } => Some(Role::Trainer),
            Self::Finished(_) => None,
        }
    }
}

/// A single game between one pokemon and one trainer.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: GameId,
    pokemon: Seat,
    trainer: Seat,
    state: TurnState,
    eliminated: BTreeSet<Cell>,
    attempts: u32,
}

impl GameSession {
    /// Creates a game in `AwaitingHiddenPosition`.
    pub fn new(id: GameId, pokemon: Seat, trainer: Seat) -> Self {
        Self {
            id,
            pokemon,
            trainer,
            state: TurnState::AwaitingHiddenPosition,
            eliminated: BTreeSet::new(),
            attempts: 0,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn current_turn(&self) -> Option<Role> {
        self.state.current_turn()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, TurnState::Finished(_))
    }

    /// Cells guessed wrong so far, ascending.
    pub fn eliminated_cells(&self) -> Vec<Cell> {
        self.eliminated.iter().copied().collect()
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempts
    }

    pub fn seat(&self, role: Role) -> &Seat {
        match role {
            Role::Pokemon => &self.pokemon,
            Role::Trainer => &self.trainer,
        }
    }

    /// Which side `id` plays in this game, if any.
    pub fn role_of(&self, id: ConnectionId) -> Option<Role> {
        if self.pokemon.connection_id == id {
            Some(Role::Pokemon)
        } else if self.trainer.connection_id == id {
            Some(Role::Trainer)
        } else {
            None
        }
    }

    /// Both participants' connection ids, pokemon first.
    pub fn participants(&self) -> [ConnectionId; 2] {
        [self.pokemon.connection_id, self.trainer.connection_id]
    }

    /// The `game-started` pair sent when the match is made.
    pub fn start_events(&self) -> Vec<Delivery> {
        let started = |role: Role, message: &str| {
            let opponent = self.seat(role.opponent());
            (
                self.seat(role).connection_id,
                ServerEvent::GameStarted {
                    role,
                    opponent_name: opponent.name.clone(),
                    opponent_connection_id: opponent.connection_id,
                    current_turn: Role::Pokemon,
                    message: message.to_string(),
                },
            )
        };
        vec![
            started(Role::Pokemon, HIDE_PROMPT),
            started(Role::Trainer, WAIT_PROMPT),
        ]
    }

    /// The pokemon hides in `cell`.
    ///
    /// # Errors
    /// [`GameError::NotYourTurn`] if `sender` isn't the pokemon or it's the
    /// trainer's turn; [`GameError::InvalidCell`] or
    /// [`GameError::CellEliminated`] for an unusable cell.
    pub fn select_position(
        &mut self,
        sender: ConnectionId,
        cell: Cell,
        grid: &GridConfig,
    ) -> Result<Vec<Delivery>, GameError> {
        self.check_turn(sender, Role::Pokemon)?;
        self.check_cell(cell, grid)?;

        self.state = TurnState::AwaitingGuess { hidden: cell };
        tracing::debug!(game_id = %self.id, %cell, "pokemon hid");

        Ok(vec![
            (self.pokemon.connection_id, ServerEvent::PositionAccepted {}),
            (
                self.pokemon.connection_id,
                ServerEvent::WaitTurn {
                    message: POSITION_CHOSEN.to_string(),
                },
            ),
            (self.trainer.connection_id, self.your_turn(GUESS_PROMPT)),
        ])
    }

    /// The trainer guesses `cell`.
    ///
    /// # Errors
    /// Same rules as [`select_position`](Self::select_position), for the
    /// trainer's side.
    pub fn guess(
        &mut self,
        sender: ConnectionId,
        cell: Cell,
        grid: &GridConfig,
    ) -> Result<Vec<Delivery>, GameError> {
        self.check_turn(sender, Role::Trainer)?;
        self.check_cell(cell, grid)?;
        let TurnState::AwaitingGuess { hidden } = self.state else {
            return Err(GameError::NotYourTurn);
        };

        self.attempts += 1;

        if cell == hidden {
            self.state = TurnState::Finished(Outcome::PokemonCaught { at: cell });
            tracing::info!(game_id = %self.id, attempts = self.attempts, "pokemon caught");
            return Ok(self.game_over(Role::Trainer, hidden, CAUGHT_WIN, CAUGHT_LOSE));
        }

        self.eliminated.insert(cell);

        if self.eliminated.len() >= grid.escape_threshold() {
            self.state = TurnState::Finished(Outcome::PokemonEscaped { hidden });
            tracing::info!(game_id = %self.id, attempts = self.attempts, "pokemon escaped");
            return Ok(self.game_over(Role::Pokemon, hidden, ESCAPE_WIN, ESCAPE_LOSE));
        }

        self.state = TurnState::AwaitingHiddenPosition;
        Ok(vec![
            (
                self.trainer.connection_id,
                ServerEvent::WrongGuess {
                    guessed_cell: cell,
                    eliminated_cells: self.eliminated_cells(),
                    attempt_count: self.attempts,
                    message: WRONG_GUESS.to_string(),
                },
            ),
            (self.pokemon.connection_id, self.your_turn(HIDE_AGAIN)),
        ])
    }

    /// Events for the participant left behind when `leaving` disconnects.
    pub fn abandon(&self, leaving: ConnectionId) -> Vec<Delivery> {
        self.participants()
            .into_iter()
            .filter(|id| *id != leaving)
            .map(|id| {
                (
                    id,
                    ServerEvent::GameEnded {
                        reason: EndReason::OpponentDisconnected,
                    },
                )
            })
            .collect()
    }

    fn check_turn(&self, sender: ConnectionId, role: Role) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::NoActiveGame);
        }
        if self.role_of(sender) != Some(role) || self.current_turn() != Some(role) {
            return Err(GameError::NotYourTurn);
        }
        Ok(())
    }

    fn check_cell(&self, cell: Cell, grid: &GridConfig) -> Result<(), GameError> {
        if !grid.contains(cell) {
            return Err(GameError::InvalidCell);
        }
        if self.eliminated.contains(&cell) {
            return Err(GameError::CellEliminated);
        }
        Ok(())
    }

    fn your_turn(&self, message: &str) -> ServerEvent {
        ServerEvent::YourTurn {
            message: message.to_string(),
            eliminated_cells: self.eliminated_cells(),
            attempt_count: self.attempts,
        }
    }

    fn game_over(
        &self,
        winner: Role,
        revealed: Cell,
        win_message: &str,
        lose_message: &str,
    ) -> Vec<Delivery> {
        let over = |result, message: &str| ServerEvent::GameOver {
            result,
            attempt_count: self.attempts,
            revealed_position: revealed,
            message: message.to_string(),
        };
        vec![
            (
                self.seat(winner).connection_id,
                over(GameResult::Win, win_message),
            ),
            (
                self.seat(winner.opponent()).connection_id,
                over(GameResult::Lose, lose_message),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POKEMON: ConnectionId = ConnectionId::new(1);
    const TRAINER: ConnectionId = ConnectionId::new(2);

    fn game() -> GameSession {
        GameSession::new(
            GameId(1),
            Seat {
                connection_id: POKEMON,
                name: "Pikachu".into(),
            },
            Seat {
                connection_id: TRAINER,
                name: "Ash".into(),
            },
        )
    }

    fn grid() -> GridConfig {
        GridConfig::default()
    }

    /// Snapshot of everything a rejected move must leave alone.
    fn snapshot(g: &GameSession) -> (TurnState, Vec<Cell>, u32) {
        (g.state(), g.eliminated_cells(), g.attempt_count())
    }

    #[test]
    fn test_new_game_awaits_hidden_position() {
        let g = game();
        assert_eq!(g.state(), TurnState::AwaitingHiddenPosition);
        assert_eq!(g.current_turn(), Some(Role::Pokemon));
        assert!(g.eliminated_cells().is_empty());
        assert_eq!(g.attempt_count(), 0);
    }

    #[test]
    fn test_start_events_tell_each_side_its_role() {
        let events = game().start_events();
        assert_eq!(events.len(), 2);

        let (to, event) = &events[0];
        assert_eq!(*to, POKEMON);
        assert_eq!(
            *event,
            ServerEvent::GameStarted {
                role: Role::Pokemon,
                opponent_name: "Ash".into(),
                opponent_connection_id: TRAINER,
                current_turn: Role::Pokemon,
                message: "Escolha onde se esconder".into(),
            }
        );

        let (to, event) = &events[1];
        assert_eq!(*to, TRAINER);
        assert!(matches!(
            event,
            ServerEvent::GameStarted { role: Role::Trainer, message, .. } if message == "Aguarde"
        ));
    }

    #[test]
    fn test_select_position_hands_turn_to_trainer() {
        let mut g = game();
        let out = g.select_position(POKEMON, Cell(3), &grid()).unwrap();

        assert_eq!(g.state(), TurnState::AwaitingGuess { hidden: Cell(3) });
        assert_eq!(out[0], (POKEMON, ServerEvent::PositionAccepted {}));
        assert!(matches!(out[1], (id, ServerEvent::WaitTurn { .. }) if id == POKEMON));
        assert!(matches!(
            &out[2],
            (id, ServerEvent::YourTurn { eliminated_cells, attempt_count: 0, .. })
                if *id == TRAINER && eliminated_cells.is_empty()
        ));
    }

    #[test]
    fn test_trainer_cannot_select_position() {
        let mut g = game();
        let before = snapshot(&g);
        assert_eq!(
            g.select_position(TRAINER, Cell(3), &grid()),
            Err(GameError::NotYourTurn)
        );
        assert_eq!(snapshot(&g), before);
    }

    #[test]
    fn test_pokemon_cannot_move_twice() {
        let mut g = game();
        g.select_position(POKEMON, Cell(3), &grid()).unwrap();
        let before = snapshot(&g);

        assert_eq!(
            g.select_position(POKEMON, Cell(4), &grid()),
            Err(GameError::NotYourTurn)
        );
        assert_eq!(snapshot(&g), before);
    }

    #[test]
    fn test_guess_before_pokemon_hides_is_rejected() {
        let mut g = game();
        let before = snapshot(&g);
        assert_eq!(g.guess(TRAINER, Cell(1), &grid()), Err(GameError::NotYourTurn));
        assert_eq!(snapshot(&g), before);
    }

    #[test]
    fn test_pokemon_cannot_guess() {
        let mut g = game();
        g.select_position(POKEMON, Cell(3), &grid()).unwrap();
        let before = snapshot(&g);
        assert_eq!(g.guess(POKEMON, Cell(3), &grid()), Err(GameError::NotYourTurn));
        assert_eq!(snapshot(&g), before);
    }

    #[test]
    fn test_stranger_cannot_move() {
        let mut g = game();
        let stranger = ConnectionId::new(99);
        assert_eq!(
            g.select_position(stranger, Cell(3), &grid()),
            Err(GameError::NotYourTurn)
        );
        g.select_position(POKEMON, Cell(3), &grid()).unwrap();
        assert_eq!(g.guess(stranger, Cell(3), &grid()), Err(GameError::NotYourTurn));
        assert_eq!(g.attempt_count(), 0);
    }

    #[test]
    fn test_out_of_range_cells_are_rejected() {
        let mut g = game();
        assert_eq!(
            g.select_position(POKEMON, Cell(0), &grid()),
            Err(GameError::InvalidCell)
        );
        assert_eq!(
            g.select_position(POKEMON, Cell(9), &grid()),
            Err(GameError::InvalidCell)
        );
        g.select_position(POKEMON, Cell(8), &grid()).unwrap();
        assert_eq!(g.guess(TRAINER, Cell(42), &grid()), Err(GameError::InvalidCell));
        assert_eq!(g.attempt_count(), 0);
    }

    #[test]
    fn test_wrong_guess_eliminates_cell_and_returns_turn() {
        let mut g = game();
        g.select_position(POKEMON, Cell(3), &grid()).unwrap();
        let out = g.guess(TRAINER, Cell(5), &grid()).unwrap();

        assert_eq!(g.state(), TurnState::AwaitingHiddenPosition);
        assert_eq!(g.eliminated_cells(), vec![Cell(5)]);
        assert_eq!(g.attempt_count(), 1);
        assert_eq!(
            out[0],
            (
                TRAINER,
                ServerEvent::WrongGuess {
                    guessed_cell: Cell(5),
                    eliminated_cells: vec![Cell(5)],
                    attempt_count: 1,
                    message: WRONG_GUESS.into(),
                }
            )
        );
        assert!(matches!(
            &out[1],
            (id, ServerEvent::YourTurn { eliminated_cells, attempt_count: 1, .. })
                if *id == POKEMON && *eliminated_cells == vec![Cell(5)]
        ));
    }

    #[test]
    fn test_eliminated_cells_block_both_roles() {
        let mut g = game();
        g.select_position(POKEMON, Cell(3), &grid()).unwrap();
        g.guess(TRAINER, Cell(5), &grid()).unwrap();

        let before = snapshot(&g);
        assert_eq!(
            g.select_position(POKEMON, Cell(5), &grid()),
            Err(GameError::CellEliminated)
        );
        assert_eq!(snapshot(&g), before);

        g.select_position(POKEMON, Cell(2), &grid()).unwrap();
        let before = snapshot(&g);
        assert_eq!(
            g.guess(TRAINER, Cell(5), &grid()),
            Err(GameError::CellEliminated)
        );
        assert_eq!(snapshot(&g), before);
    }

    #[test]
    fn test_correct_guess_on_first_attempt_catches_pokemon() {
        let mut g = game();
        g.select_position(POKEMON, Cell(3), &grid()).unwrap();
        let out = g.guess(TRAINER, Cell(3), &grid()).unwrap();

        assert_eq!(
            g.state(),
            TurnState::Finished(Outcome::PokemonCaught { at: Cell(3) })
        );
        assert_eq!(g.current_turn(), None);
        assert_eq!(
            out,
            vec![
                (
                    TRAINER,
                    ServerEvent::GameOver {
                        result: GameResult::Win,
                        attempt_count: 1,
                        revealed_position: Cell(3),
                        message: CAUGHT_WIN.into(),
                    }
                ),
                (
                    POKEMON,
                    ServerEvent::GameOver {
                        result: GameResult::Lose,
                        attempt_count: 1,
                        revealed_position: Cell(3),
                        message: CAUGHT_LOSE.into(),
                    }
                ),
            ]
        );
    }

    #[test]
    fn test_seventh_wrong_guess_lets_pokemon_escape() {
        let mut g = game();
        for wrong in 1..=6u8 {
            g.select_position(POKEMON, Cell(8), &grid()).unwrap();
            g.guess(TRAINER, Cell(wrong), &grid()).unwrap();
        }
        assert_eq!(g.eliminated_cells().len(), 6);
        assert_eq!(g.attempt_count(), 6);

        // Pokemon hides on 8 again; trainer misses on 7.
        g.select_position(POKEMON, Cell(8), &grid()).unwrap();
        let out = g.guess(TRAINER, Cell(7), &grid()).unwrap();

        assert_eq!(
            g.state(),
            TurnState::Finished(Outcome::PokemonEscaped { hidden: Cell(8) })
        );
        assert_eq!(g.eliminated_cells().len(), 7);
        assert!(matches!(
            out[0],
            (id, ServerEvent::GameOver { result: GameResult::Win, attempt_count: 7, .. })
                if id == POKEMON
        ));
        assert!(matches!(
            out[1],
            (id, ServerEvent::GameOver { result: GameResult::Lose, .. }) if id == TRAINER
        ));
    }

    #[test]
    fn test_escape_threshold_follows_grid_size() {
        let small = GridConfig::new(3).unwrap();
        let mut g = game();
        g.select_position(POKEMON, Cell(3), &small).unwrap();
        g.guess(TRAINER, Cell(1), &small).unwrap();
        g.select_position(POKEMON, Cell(3), &small).unwrap();
        g.guess(TRAINER, Cell(2), &small).unwrap();

        assert!(g.is_finished(), "two of three cells eliminated means escape");
    }

    #[test]
    fn test_finished_game_rejects_further_moves() {
        let mut g = game();
        g.select_position(POKEMON, Cell(3), &grid()).unwrap();
        g.guess(TRAINER, Cell(3), &grid()).unwrap();

        assert_eq!(
            g.select_position(POKEMON, Cell(4), &grid()),
            Err(GameError::NoActiveGame)
        );
        assert_eq!(g.guess(TRAINER, Cell(4), &grid()), Err(GameError::NoActiveGame));
    }

    #[test]
    fn test_abandon_notifies_only_the_other_side() {
        let g = game();
        assert_eq!(
            g.abandon(TRAINER),
            vec![(
                POKEMON,
                ServerEvent::GameEnded {
                    reason: EndReason::OpponentDisconnected
                }
            )]
        );
    }
}
