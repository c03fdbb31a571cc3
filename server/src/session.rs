//! Connection-facing game session.
//!
//! `Session` turns inbound packets from a connection into engine calls and
//! describes the results as `Outbound` items: packets for one client, packets
//! for everyone, and turn timers to start. It never touches a socket, so the
//! network layer decides how each item is delivered.

use crate::config::{GameRules, TurnDelays};
use crate::dice::Dice;
use crate::engine::{self, Purchase, RollOutcome};
use crate::error::ActionError;
use crate::game::GameState;
use crate::turn::{ScheduledTransition, TurnScheduler, TurnTicket};
use log::{debug, info, warn};
use shared::{Packet, PlayerId};

#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Send { to: PlayerId, packet: Packet },
    Broadcast(Packet),
    Schedule(ScheduledTransition),
}

pub struct Session {
    state: GameState,
    turns: TurnScheduler,
    dice: Box<dyn Dice>,
}

impl Session {
    pub fn new(rules: GameRules, delays: TurnDelays, dice: Box<dyn Dice>) -> Self {
        Self {
            state: GameState::new(rules),
            turns: TurnScheduler::new(delays),
            dice,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Greets a new connection with its id and the current state.
    pub fn connect(&self, client_id: PlayerId) -> Vec<Outbound> {
        vec![
            Outbound::Send {
                to: client_id,
                packet: Packet::Connected { client_id },
            },
            Outbound::Send {
                to: client_id,
                packet: Packet::GameState(self.state.snapshot()),
            },
        ]
    }

    pub fn handle(&mut self, client_id: PlayerId, packet: Packet) -> Vec<Outbound> {
        let result = match packet {
            Packet::JoinGame { name } => self.join(client_id, name),
            Packet::StartGame => self.start(),
            Packet::RollDice => self.roll(client_id),
            Packet::BuyProperty => self.buy(client_id),
            Packet::SkipBuy => self.skip(client_id),
            Packet::Leave => Ok(self.disconnect(client_id)),
            other => {
                warn!("Unexpected packet type from client {}: {:?}", client_id, other);
                Ok(Vec::new())
            }
        };

        result.unwrap_or_else(|err| {
            debug!("Rejected action from client {}: {}", client_id, err);
            vec![Outbound::Send {
                to: client_id,
                packet: Packet::Error {
                    message: err.to_string(),
                },
            }]
        })
    }

    /// Drops the player bound to this connection, if any.
    pub fn disconnect(&mut self, client_id: PlayerId) -> Vec<Outbound> {
        if self.state.remove_player(client_id).is_none() {
            return Vec::new();
        }
        vec![self.state_broadcast()]
    }

    /// Runs a turn timer that has elapsed.
    pub fn fire(&mut self, ticket: TurnTicket) -> Vec<Outbound> {
        if self.turns.fire(&mut self.state, ticket) {
            vec![self.state_broadcast()]
        } else {
            Vec::new()
        }
    }

    fn join(&mut self, client_id: PlayerId, name: String) -> Result<Vec<Outbound>, ActionError> {
        let name = match name.trim() {
            "" => format!("Player {}", self.state.player_count() + 1),
            trimmed => trimmed.to_string(),
        };
        self.state.add_player(client_id, name)?;
        Ok(vec![self.state_broadcast()])
    }

    fn start(&mut self) -> Result<Vec<Outbound>, ActionError> {
        self.state.start()?;
        Ok(vec![self.state_broadcast()])
    }

    fn roll(&mut self, client_id: PlayerId) -> Result<Vec<Outbound>, ActionError> {
        let outcome = engine::roll(&mut self.state, client_id, self.dice.as_mut())?;
        let scheduled = self.turns.after_roll(&mut self.state, &outcome);

        let mut out = vec![dice_rolled(&outcome), self.state_broadcast()];
        out.extend(scheduled.map(Outbound::Schedule));
        Ok(out)
    }

    fn buy(&mut self, client_id: PlayerId) -> Result<Vec<Outbound>, ActionError> {
        let purchase = engine::purchase(&mut self.state, client_id)?;
        info!(
            "Player {} bought {} for ${}",
            client_id, purchase.space.name, purchase.space.price
        );
        let scheduled = self.turns.after_purchase(&mut self.state, client_id);

        let mut out = vec![property_bought(&purchase), self.state_broadcast()];
        out.extend(scheduled.map(Outbound::Schedule));
        Ok(out)
    }

    fn skip(&mut self, client_id: PlayerId) -> Result<Vec<Outbound>, ActionError> {
        if !engine::skip(&mut self.state, client_id)? {
            return Ok(Vec::new());
        }
        let scheduled = self.turns.after_skip(&mut self.state, client_id);

        let mut out = vec![self.state_broadcast()];
        out.extend(scheduled.map(Outbound::Schedule));
        Ok(out)
    }

    fn state_broadcast(&self) -> Outbound {
        Outbound::Broadcast(Packet::GameState(self.state.snapshot()))
    }
}

fn dice_rolled(outcome: &RollOutcome) -> Outbound {
    Outbound::Broadcast(Packet::DiceRolled {
        player_id: outcome.player,
        dice: (outcome.roll.first, outcome.roll.second),
        total: outcome.roll.total(),
        is_doubles: outcome.roll.is_doubles(),
        passed_go: outcome.movement.passed_go,
        position: outcome.movement.to,
        effect: outcome.effect.clone(),
    })
}

fn property_bought(purchase: &Purchase) -> Outbound {
    Outbound::Broadcast(Packet::PropertyBought {
        player_id: purchase.player,
        space_name: purchase.space.name.to_string(),
        price: purchase.space.price,
    })
}
