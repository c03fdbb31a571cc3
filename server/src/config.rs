//! Server configuration: command line flags and game rules.

use clap::Parser;
use shared::{Money, GO_BONUS, MAX_PLAYERS, MIN_PLAYERS, STARTING_CASH};
use std::time::Duration;

/// Authoritative Monopoly game server
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Maximum number of simultaneous connections, players and spectators
    #[arg(short = 'c', long, default_value = "32")]
    pub max_connections: usize,

    /// Delay after a dice roll before the next roll is allowed
    #[arg(long, default_value = "2000")]
    pub roll_delay_ms: u64,

    /// Delay after a purchase before the turn passes
    #[arg(long, default_value = "2000")]
    pub buy_delay_ms: u64,

    /// Delay after a skipped purchase before the turn passes
    #[arg(long, default_value = "1000")]
    pub skip_delay_ms: u64,

    /// Fixed seed for the dice, for reproducible sessions
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_connections: 32,
            roll_delay_ms: 2000,
            buy_delay_ms: 2000,
            skip_delay_ms: 1000,
            seed: None,
        }
    }
}

impl Config {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn turn_delays(&self) -> TurnDelays {
        TurnDelays {
            after_roll: Duration::from_millis(self.roll_delay_ms),
            after_buy: Duration::from_millis(self.buy_delay_ms),
            after_skip: Duration::from_millis(self.skip_delay_ms),
        }
    }
}

/// How long clients get to show an outcome before play continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnDelays {
    pub after_roll: Duration,
    pub after_buy: Duration,
    pub after_skip: Duration,
}

impl Default for TurnDelays {
    fn default() -> Self {
        Config::default().turn_delays()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    pub starting_cash: Money,
    pub go_bonus: Money,
    pub min_players: usize,
    pub max_players: usize,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            starting_cash: STARTING_CASH,
            go_bonus: GO_BONUS,
            min_players: MIN_PLAYERS,
            max_players: MAX_PLAYERS,
        }
    }
}
