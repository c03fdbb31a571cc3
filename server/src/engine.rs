//! Transaction engine: the economic effects of moving around the board.
//!
//! Every change to a player's cash goes through one of these functions.
//! Guards run before any mutation, so a rejected action leaves the state
//! exactly as it was.

use crate::dice::{Dice, DiceRoll};
use crate::error::ActionError;
use crate::game::GameState;
use log::debug;
use shared::{space, LandingEffect, Money, Phase, PlayerId, Space, SpaceKind, BOARD_SIZE, GO_POSITION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    pub from: u8,
    pub to: u8,
    pub passed_go: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOutcome {
    pub player: PlayerId,
    pub roll: DiceRoll,
    pub movement: Movement,
    pub effect: LandingEffect,
}

impl RollOutcome {
    /// True when the roll left a purchase decision open.
    pub fn purchase_pending(&self) -> bool {
        matches!(self.effect, LandingEffect::CanBuy { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Purchase {
    pub player: PlayerId,
    pub space: &'static Space,
}

/// Moves a token forward and pays the GO bonus for passing it. Landing
/// exactly on GO is paid by `resolve_landing` instead.
pub fn advance_token(state: &mut GameState, player: PlayerId, steps: u8) -> Option<Movement> {
    let from = state.player(player)?.position;
    let raw = u16::from(from) + u16::from(steps);
    let to = (raw % u16::from(BOARD_SIZE)) as u8;
    let passed_go = raw >= u16::from(BOARD_SIZE) && to != GO_POSITION;

    state.move_player(player, to);
    if passed_go {
        let bonus = state.rules().go_bonus;
        state.adjust_cash(player, bonus);
    }

    Some(Movement { from, to, passed_go })
}

/// Rent owed to `owner` for `space`. Utilities ignore the catalog rent and
/// charge a multiple of the dice instead.
pub fn rent_due(state: &GameState, space: &Space, owner: PlayerId, dice_total: u8) -> Money {
    match space.kind {
        SpaceKind::Railroad => {
            space.rent * state.owned_count(owner, SpaceKind::Railroad) as Money
        }
        SpaceKind::Utility => {
            let multiplier = if state.owned_count(owner, SpaceKind::Utility) == 2 {
                10
            } else {
                4
            };
            Money::from(dice_total) * multiplier
        }
        _ => space.rent,
    }
}

/// Applies the effect of `actor` coming to rest on their current space.
pub fn resolve_landing(state: &mut GameState, actor: PlayerId, dice_total: u8) -> LandingEffect {
    let Some(position) = state.player(actor).map(|player| player.position) else {
        return LandingEffect::None;
    };
    let landed = space(position);

    match landed.kind {
        SpaceKind::Property | SpaceKind::Railroad | SpaceKind::Utility => {
            match state.owner_of(landed.id) {
                None => LandingEffect::CanBuy {
                    space: landed.id,
                    price: landed.price,
                },
                Some(owner) if owner == actor => LandingEffect::None,
                Some(owner) => {
                    // Owners who left keep their deeds but collect nothing.
                    let Some(owner_name) = state.player(owner).map(|p| p.name.clone()) else {
                        return LandingEffect::None;
                    };
                    let rent = rent_due(state, landed, owner, dice_total);
                    state.adjust_cash(actor, -rent);
                    state.adjust_cash(owner, rent);
                    LandingEffect::PaidRent {
                        rent,
                        owner,
                        owner_name,
                    }
                }
            }
        }
        SpaceKind::Tax => {
            state.adjust_cash(actor, -landed.tax);
            LandingEffect::PaidTax { amount: landed.tax }
        }
        SpaceKind::GoToJail => {
            state.send_to_jail(actor);
            LandingEffect::GoToJail
        }
        SpaceKind::Go => {
            let bonus = state.rules().go_bonus;
            state.adjust_cash(actor, bonus);
            LandingEffect::PassedGo { amount: bonus }
        }
        SpaceKind::Chest | SpaceKind::Chance | SpaceKind::Jail | SpaceKind::FreeParking => {
            LandingEffect::None
        }
    }
}

/// Rolls for the active player, moves them and resolves the landing.
/// Leaves the phase at `Buying` when a purchase is on offer, else `Waiting`.
pub fn roll(state: &mut GameState, actor: PlayerId, dice: &mut dyn Dice) -> Result<RollOutcome, ActionError> {
    if !state.is_active(actor) {
        return Err(ActionError::NotYourTurn);
    }
    if state.phase() != Phase::Rolling {
        return Err(ActionError::WrongPhase);
    }

    let roll = dice.roll();
    let movement = advance_token(state, actor, roll.total()).ok_or(ActionError::NotYourTurn)?;
    let effect = resolve_landing(state, actor, roll.total());

    let next_phase = if matches!(effect, LandingEffect::CanBuy { .. }) {
        Phase::Buying
    } else {
        Phase::Waiting
    };
    state.set_phase(next_phase);

    debug!(
        "Player {} rolled {}+{} and moved {} -> {}: {:?}",
        actor, roll.first, roll.second, movement.from, movement.to, effect
    );

    Ok(RollOutcome {
        player: actor,
        roll,
        movement,
        effect,
    })
}

/// Buys the space the active player is standing on.
pub fn purchase(state: &mut GameState, actor: PlayerId) -> Result<Purchase, ActionError> {
    if !state.is_active(actor) {
        return Err(ActionError::NotYourTurn);
    }
    let Some(target) = state.active_space() else {
        return Err(ActionError::NotYourTurn);
    };
    if target.kind.is_ownable() && state.owner_of(target.id).is_some() {
        return Err(ActionError::AlreadyOwned);
    }
    if state.phase() != Phase::Buying || !target.kind.is_ownable() {
        return Err(ActionError::WrongPhase);
    }
    let cash = state.player(actor).map_or(0, |player| player.cash);
    if cash < target.price {
        return Err(ActionError::InsufficientFunds);
    }

    state.adjust_cash(actor, -target.price);
    state.apply_ownership(target.id, actor);
    state.set_phase(Phase::Waiting);

    Ok(Purchase {
        player: actor,
        space: target,
    })
}

/// Declines the purchase on offer. Returns `false` when there was nothing to
/// decline.
pub fn skip(state: &mut GameState, actor: PlayerId) -> Result<bool, ActionError> {
    if !state.is_active(actor) {
        return Err(ActionError::NotYourTurn);
    }
    if state.phase() != Phase::Buying {
        return Ok(false);
    }

    state.set_phase(Phase::Waiting);
    Ok(true)
}
