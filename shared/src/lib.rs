use serde::{Deserialize, Serialize};

pub mod board;

pub use board::{space, ColorGroup, Space, SpaceKind, BOARD, BOARD_SIZE, GO_POSITION, JAIL_POSITION};

pub type PlayerId = u32;
pub type Money = i64;

pub const STARTING_CASH: Money = 1500;
pub const GO_BONUS: Money = 200;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;
pub const PLAYER_COLORS: [&str; MAX_PLAYERS] = [
    "#FF6B6B", "#4ECDC4", "#FFE66D", "#95E1D3", "#A8E6CF", "#FFD3A5",
];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Packet {
    JoinGame {
        name: String,
    },
    StartGame,
    RollDice,
    BuyProperty,
    SkipBuy,
    Leave,

    Connected {
        client_id: PlayerId,
    },
    Rejected {
        reason: String,
    },
    GameState(GameSnapshot),
    DiceRolled {
        player_id: PlayerId,
        dice: (u8, u8),
        total: u8,
        is_doubles: bool,
        passed_go: bool,
        position: u8,
        effect: LandingEffect,
    },
    PropertyBought {
        player_id: PlayerId,
        space_name: String,
        price: Money,
    },
    Error {
        message: String,
    },
}

impl Packet {
    /// True for the packets a client is allowed to send.
    pub fn is_client_action(&self) -> bool {
        matches!(
            self,
            Packet::JoinGame { .. }
                | Packet::StartGame
                | Packet::RollDice
                | Packet::BuyProperty
                | Packet::SkipBuy
                | Packet::Leave
        )
    }
}

/// Game-wide turn state gating which actions are legal.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Waiting,
    Rolling,
    Buying,
}

/// What happened when a token came to rest on a space.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum LandingEffect {
    None,
    CanBuy {
        space: u8,
        price: Money,
    },
    PaidRent {
        rent: Money,
        owner: PlayerId,
        owner_name: String,
    },
    PaidTax {
        amount: Money,
    },
    GoToJail,
    PassedGo {
        amount: Money,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub cash: Money,
    pub position: u8,
    pub properties: Vec<u8>,
    pub in_jail: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: String, color: String, cash: Money) -> Self {
        Self {
            id,
            name,
            color,
            cash,
            position: GO_POSITION,
            properties: Vec::new(),
            in_jail: false,
        }
    }

    pub fn owns(&self, space_id: u8) -> bool {
        self.properties.contains(&space_id)
    }
}

/// A catalog entry with its current owner, as sent to clients.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BoardSpace {
    pub id: u8,
    pub name: String,
    pub kind: SpaceKind,
    pub group: Option<ColorGroup>,
    pub price: Money,
    pub rent: Money,
    pub tax: Money,
    pub owner: Option<PlayerId>,
}

impl BoardSpace {
    pub fn new(space: &Space, owner: Option<PlayerId>) -> Self {
        Self {
            id: space.id,
            name: space.name.to_string(),
            kind: space.kind,
            group: space.group,
            price: space.price,
            rent: space.rent,
            tax: space.tax,
            owner,
        }
    }
}

/// Full copy of the authoritative state broadcast after every change.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameSnapshot {
    pub players: Vec<Player>,
    pub current_turn: Option<usize>,
    pub phase: Phase,
    pub started: bool,
    pub board: Vec<BoardSpace>,
}

impl GameSnapshot {
    pub fn active_player(&self) -> Option<&Player> {
        self.current_turn.and_then(|index| self.players.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> GameSnapshot {
        let mut alice = Player::new(1, "Alice".to_string(), PLAYER_COLORS[0].to_string(), 1440);
        alice.position = 1;
        alice.properties.push(1);
        let bob = Player::new(2, "Bob".to_string(), PLAYER_COLORS[1].to_string(), STARTING_CASH);

        let board = BOARD
            .iter()
            .map(|space| BoardSpace::new(space, (space.id == 1).then_some(1)))
            .collect();

        GameSnapshot {
            players: vec![alice, bob],
            current_turn: Some(1),
            phase: Phase::Rolling,
            started: true,
            board,
        }
    }

    #[test]
    fn test_player_creation() {
        let player = Player::new(7, "Carol".to_string(), "#FFE66D".to_string(), STARTING_CASH);
        assert_eq!(player.id, 7);
        assert_eq!(player.cash, 1500);
        assert_eq!(player.position, GO_POSITION);
        assert!(player.properties.is_empty());
        assert!(!player.in_jail);
    }

    #[test]
    fn test_player_owns() {
        let mut player = Player::new(1, "Alice".to_string(), "#FF6B6B".to_string(), STARTING_CASH);
        assert!(!player.owns(39));
        player.properties.push(39);
        assert!(player.owns(39));
    }

    #[test]
    fn test_board_space_copies_catalog() {
        let view = BoardSpace::new(space(39), Some(4));
        assert_eq!(view.name, "Boardwalk");
        assert_eq!(view.price, 400);
        assert_eq!(view.rent, 50);
        assert_eq!(view.group, Some(ColorGroup::DarkBlue));
        assert_eq!(view.owner, Some(4));
    }

    #[test]
    fn test_snapshot_active_player() {
        let snapshot = sample_snapshot();
        assert_eq!(snapshot.active_player().map(|p| p.id), Some(2));

        let empty = GameSnapshot {
            players: Vec::new(),
            current_turn: None,
            phase: Phase::Waiting,
            started: false,
            board: Vec::new(),
        };
        assert!(empty.active_player().is_none());
    }

    #[test]
    fn test_client_action_classification() {
        assert!(Packet::JoinGame { name: "x".to_string() }.is_client_action());
        assert!(Packet::RollDice.is_client_action());
        assert!(Packet::Leave.is_client_action());
        assert!(!Packet::Connected { client_id: 1 }.is_client_action());
        assert!(!Packet::Error { message: "nope".to_string() }.is_client_action());
    }

    #[test]
    fn test_packet_serialization_game_state() {
        let packet = Packet::GameState(sample_snapshot());
        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::GameState(snapshot) => {
                assert_eq!(snapshot.players.len(), 2);
                assert_eq!(snapshot.players[0].properties, vec![1]);
                assert_eq!(snapshot.board.len(), BOARD_SIZE as usize);
                assert_eq!(snapshot.board[1].owner, Some(1));
                assert_eq!(snapshot.phase, Phase::Rolling);
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_dice_rolled() {
        let packet = Packet::DiceRolled {
            player_id: 3,
            dice: (2, 4),
            total: 6,
            is_doubles: false,
            passed_go: false,
            position: 6,
            effect: LandingEffect::CanBuy { space: 6, price: 100 },
        };

        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();
        assert_eq!(deserialized, packet);
    }
}
