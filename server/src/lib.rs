//! # Game Server Library
//!
//! This library provides the authoritative server for a networked, turn-based
//! Monopoly-style board game. It holds the canonical game state, validates
//! every player action, applies its economic effects and broadcasts the result
//! so that all connected clients render the same board.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Rules
//! The server decides everything: it rolls the dice, moves tokens, charges
//! rent and tax, pays the GO bonus and records purchases. Clients only send
//! intents (join, start, roll, buy, skip) and render what comes back.
//!
//! ### Turn and Phase Control
//! A game-wide phase (`Waiting`, `Rolling`, `Buying`) gates which actions are
//! legal and for whom. After each roll or purchase decision the next step is
//! deferred briefly so clients can show the outcome before play continues.
//!
//! ### State Broadcasting
//! A full snapshot is sent to every connection after each change, together
//! with discrete events (`DiceRolled`, `PropertyBought`). Rejections go back
//! to the requesting connection only.
//!
//! ## Architecture Design
//!
//! ### Single-Writer Event Loop
//! Connection tasks and timer tasks never touch game state. They send
//! messages into one channel, and the main loop applies them one at a time in
//! arrival order. Deferred turn transitions carry a ticket that is re-checked
//! when it fires, so a timer that outlived its purpose does nothing.
//!
//! ### WebSocket Transport
//! Each client holds one WebSocket. Frames are binary and carry a single
//! bincode-encoded `shared::Packet`.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The game state store: roster in turn order, turn pointer, phase and the
//! ownership overlay on the static board catalog.
//!
//! ### Engine Module (`engine`)
//! Movement, landing resolution, rent calculation, purchase and skip.
//!
//! ### Turn Module (`turn`)
//! Scheduling and validation of the delayed return to the rolling phase,
//! including the extra roll after doubles.
//!
//! ### Session Module (`session`)
//! Maps connections to players and turns inbound packets into engine calls
//! and outbound packets.
//!
//! ### Client Manager Module (`client_manager`)
//! Open connections, capacity limits and best-effort fan-out.
//!
//! ### Network Module (`network`)
//! Listener, per-connection socket tasks and the main loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::Config;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         port: 3000,
//!         ..Config::default()
//!     };
//!
//!     // Binds the listener; dice come from the OS entropy pool unless a
//!     // seed is configured
//!     let server = Server::new(&config).await?;
//!
//!     // Runs until a Shutdown message arrives
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod config;
pub mod dice;
pub mod engine;
pub mod error;
pub mod game;
pub mod network;
pub mod session;
pub mod turn;
