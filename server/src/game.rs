//! Authoritative game state.
//!
//! `GameState` is the one mutable aggregate: roster in turn order, the turn
//! pointer, the phase and the ownership overlay on top of the static board.
//! It is owned by the server's main loop and nothing else mutates it.

use crate::config::GameRules;
use crate::error::ActionError;
use log::info;
use shared::{
    space, BoardSpace, GameSnapshot, Money, Phase, Player, PlayerId, BOARD, BOARD_SIZE,
    JAIL_POSITION, PLAYER_COLORS,
};

#[derive(Debug, Clone)]
pub struct GameState {
    players: Vec<Player>,
    current_turn: usize,
    phase: Phase,
    started: bool,
    ownership: [Option<PlayerId>; BOARD_SIZE as usize],
    pending_transition: Option<u64>,
    rules: GameRules,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameRules::default())
    }
}

impl GameState {
    pub fn new(rules: GameRules) -> Self {
        Self {
            players: Vec::new(),
            current_turn: 0,
            phase: Phase::Waiting,
            started: false,
            ownership: [None; BOARD_SIZE as usize],
            pending_transition: None,
            rules,
        }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn has_player(&self, id: PlayerId) -> bool {
        self.player(id).is_some()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Index into `players()`, or `None` when nobody has joined.
    pub fn current_turn(&self) -> Option<usize> {
        (!self.players.is_empty()).then_some(self.current_turn)
    }

    pub fn active_player(&self) -> Option<&Player> {
        self.players.get(self.current_turn)
    }

    pub fn is_active(&self, id: PlayerId) -> bool {
        self.active_player().is_some_and(|player| player.id == id)
    }

    pub fn owner_of(&self, space_id: u8) -> Option<PlayerId> {
        self.ownership
            .get(space_id as usize)
            .copied()
            .flatten()
    }

    pub fn pending_transition(&self) -> Option<u64> {
        self.pending_transition
    }

    /// Adds a player at the end of the turn order with the first free color.
    pub fn add_player(&mut self, id: PlayerId, name: String) -> Result<&Player, ActionError> {
        if self.started {
            return Err(ActionError::AlreadyStarted);
        }
        if self.players.len() >= self.rules.max_players {
            return Err(ActionError::GameFull);
        }
        if self.has_player(id) {
            return Err(ActionError::AlreadyJoined);
        }

        let color = self.next_color();
        let player = Player::new(id, name, color, self.rules.starting_cash);
        info!("{} joined the game as player {}", player.name, id);
        self.players.push(player);

        Ok(&self.players[self.players.len() - 1])
    }

    fn next_color(&self) -> String {
        PLAYER_COLORS
            .iter()
            .find(|color| !self.players.iter().any(|player| player.color == **color))
            .unwrap_or(&PLAYER_COLORS[self.players.len() % PLAYER_COLORS.len()])
            .to_string()
    }

    /// Removes a player and keeps the turn pointer on the same person when
    /// possible. Resets the whole game once the roster is empty.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let index = self.players.iter().position(|player| player.id == id)?;
        let removed = self.players.remove(index);
        info!("Removed player {} ({})", id, removed.name);

        if self.players.is_empty() {
            self.reset();
            return Some(removed);
        }

        if index < self.current_turn {
            self.current_turn -= 1;
        } else if index == self.current_turn {
            if self.current_turn >= self.players.len() {
                self.current_turn = 0;
            }
            // The purchase offer belonged to the departed player.
            if self.phase == Phase::Buying {
                self.phase = Phase::Rolling;
            }
        }

        Some(removed)
    }

    pub fn start(&mut self) -> Result<(), ActionError> {
        if self.started {
            return Err(ActionError::AlreadyStarted);
        }
        if self.players.len() < self.rules.min_players {
            return Err(ActionError::NotEnoughPlayers);
        }

        self.started = true;
        self.current_turn = 0;
        self.phase = Phase::Rolling;
        info!("Game started with {} players", self.players.len());
        Ok(())
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_turn(&mut self, index: usize) {
        if !self.players.is_empty() {
            self.current_turn = index % self.players.len();
        }
    }

    pub fn advance_turn(&mut self) {
        self.set_turn(self.current_turn + 1);
    }

    pub(crate) fn set_pending_transition(&mut self, serial: Option<u64>) {
        self.pending_transition = serial;
    }

    pub fn apply_ownership(&mut self, space_id: u8, owner: PlayerId) {
        self.ownership[space_id as usize] = Some(owner);
        if let Some(player) = self.player_mut(owner) {
            player.properties.push(space_id);
        }
    }

    /// Spaces of the given kind currently held by `owner`.
    pub fn owned_count(&self, owner: PlayerId, kind: shared::SpaceKind) -> usize {
        BOARD
            .iter()
            .filter(|space| space.kind == kind && self.owner_of(space.id) == Some(owner))
            .count()
    }

    pub fn adjust_cash(&mut self, id: PlayerId, delta: Money) {
        if let Some(player) = self.player_mut(id) {
            player.cash += delta;
        }
    }

    pub fn move_player(&mut self, id: PlayerId, position: u8) {
        if let Some(player) = self.player_mut(id) {
            player.position = position % BOARD_SIZE;
        }
    }

    pub fn send_to_jail(&mut self, id: PlayerId) {
        if let Some(player) = self.player_mut(id) {
            player.position = JAIL_POSITION;
            player.in_jail = true;
        }
    }

    /// Back to a fresh lobby. Clearing the pending marker turns any timer
    /// still in flight into a no-op.
    pub fn reset(&mut self) {
        self.players.clear();
        self.current_turn = 0;
        self.phase = Phase::Waiting;
        self.started = false;
        self.ownership = [None; BOARD_SIZE as usize];
        self.pending_transition = None;
        info!("Game reset");
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self.players.clone(),
            current_turn: self.current_turn(),
            phase: self.phase,
            started: self.started,
            board: BOARD
                .iter()
                .map(|entry| BoardSpace::new(entry, self.owner_of(entry.id)))
                .collect(),
        }
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id == id)
    }

    /// The space the active player is standing on.
    pub fn active_space(&self) -> Option<&'static shared::Space> {
        self.active_player().map(|player| space(player.position))
    }
}
