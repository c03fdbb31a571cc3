//! Deferred turn transitions.
//!
//! After a roll or a purchase decision the phase drops to `Waiting` right
//! away, and the return to `Rolling` happens later so clients can show what
//! just happened. The delayed step is described by a `TurnTicket`. Tickets
//! are never cancelled: when one fires it checks that it is still the
//! transition the game is waiting for, and does nothing otherwise.

use crate::config::TurnDelays;
use crate::engine::RollOutcome;
use crate::game::GameState;
use log::{debug, info};
use shared::{Phase, PlayerId};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    /// Hand the dice to the next player.
    Advance,
    /// Same player rolls again after doubles.
    RollAgain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnTicket {
    pub serial: u64,
    pub player: PlayerId,
    pub followup: Followup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTransition {
    pub ticket: TurnTicket,
    pub delay: Duration,
}

pub struct TurnScheduler {
    delays: TurnDelays,
    next_serial: u64,
}

impl TurnScheduler {
    pub fn new(delays: TurnDelays) -> Self {
        Self {
            delays,
            next_serial: 1,
        }
    }

    pub fn delays(&self) -> TurnDelays {
        self.delays
    }

    /// Decides what follows a roll. Returns `None` when a purchase decision is
    /// pending, since buy or skip will schedule the next step.
    pub fn after_roll(&mut self, state: &mut GameState, outcome: &RollOutcome) -> Option<ScheduledTransition> {
        if outcome.purchase_pending() {
            return None;
        }

        let followup = if outcome.roll.is_doubles() {
            Followup::RollAgain
        } else {
            Followup::Advance
        };
        self.schedule(state, outcome.player, followup, self.delays.after_roll)
    }

    pub fn after_purchase(&mut self, state: &mut GameState, player: PlayerId) -> Option<ScheduledTransition> {
        self.schedule(state, player, Followup::Advance, self.delays.after_buy)
    }

    pub fn after_skip(&mut self, state: &mut GameState, player: PlayerId) -> Option<ScheduledTransition> {
        self.schedule(state, player, Followup::Advance, self.delays.after_skip)
    }

    fn schedule(
        &mut self,
        state: &mut GameState,
        player: PlayerId,
        followup: Followup,
        delay: Duration,
    ) -> Option<ScheduledTransition> {
        if !state.is_started() || state.player_count() == 0 {
            return None;
        }

        let serial = self.next_serial;
        self.next_serial += 1;

        state.set_phase(Phase::Waiting);
        state.set_pending_transition(Some(serial));
        debug!("Scheduled {:?} for player {} in {:?} (#{})", followup, player, delay, serial);

        Some(ScheduledTransition {
            ticket: TurnTicket {
                serial,
                player,
                followup,
            },
            delay,
        })
    }

    /// Applies a ticket whose delay has elapsed. Returns `true` if the state
    /// changed.
    pub fn fire(&self, state: &mut GameState, ticket: TurnTicket) -> bool {
        let current = state.is_started()
            && state.player_count() > 0
            && state.phase() == Phase::Waiting
            && state.pending_transition() == Some(ticket.serial);
        if !current {
            debug!("Ignoring stale turn ticket #{}", ticket.serial);
            return false;
        }

        // If the scheduled player left, the turn pointer already names the
        // next player in order.
        if ticket.followup == Followup::Advance && state.is_active(ticket.player) {
            state.advance_turn();
        }
        state.set_pending_transition(None);
        state.set_phase(Phase::Rolling);

        if let Some(player) = state.active_player() {
            info!("Player {} ({}) to roll", player.id, player.name);
        }
        true
    }
}
