//! Error types for the game server.
//!
//! `ActionError` covers every gameplay rejection. These are expected, are
//! reported only to the connection that sent the action and never change the
//! game state. `ServerError` covers transport and codec failures.

use shared::{MAX_PLAYERS, MIN_PLAYERS};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    #[error("Game has already started")]
    AlreadyStarted,
    #[error("Game is full (max {} players)", MAX_PLAYERS)]
    GameFull,
    #[error("You have already joined")]
    AlreadyJoined,
    #[error("Need at least {} players to start", MIN_PLAYERS)]
    NotEnoughPlayers,
    #[error("Not your turn")]
    NotYourTurn,
    #[error("Invalid game phase")]
    WrongPhase,
    #[error("Property already owned")]
    AlreadyOwned,
    #[error("Not enough money")]
    InsufficientFunds,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("Codec error: {0}")]
    Codec(#[from] bincode::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_error_messages() {
        assert_eq!(ActionError::AlreadyStarted.to_string(), "Game has already started");
        assert_eq!(ActionError::GameFull.to_string(), "Game is full (max 6 players)");
        assert_eq!(ActionError::NotYourTurn.to_string(), "Not your turn");
        assert_eq!(ActionError::WrongPhase.to_string(), "Invalid game phase");
        assert_eq!(ActionError::InsufficientFunds.to_string(), "Not enough money");
    }

    #[test]
    fn test_server_error_from_io() {
        let err: ServerError = std::io::Error::new(std::io::ErrorKind::AddrInUse, "taken").into();
        assert!(matches!(err, ServerError::Io(_)));
        assert!(err.to_string().contains("taken"));
    }
}
