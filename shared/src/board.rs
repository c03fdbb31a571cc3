//! Static board layout: the 40 spaces of the classic board in play order.
//!
//! The catalog never changes at runtime. Who owns what lives in the server's
//! ownership overlay, not here.

use serde::{Deserialize, Serialize};

use crate::Money;

pub const BOARD_SIZE: u8 = 40;
pub const GO_POSITION: u8 = 0;
pub const JAIL_POSITION: u8 = 10;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceKind {
    Go,
    Property,
    Railroad,
    Utility,
    Chest,
    Chance,
    Tax,
    Jail,
    GoToJail,
    FreeParking,
}

impl SpaceKind {
    /// Property, railroad and utility spaces can hold an owner.
    pub fn is_ownable(self) -> bool {
        matches!(
            self,
            SpaceKind::Property | SpaceKind::Railroad | SpaceKind::Utility
        )
    }
}

/// Color sets for street properties.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorGroup {
    Brown,
    LightBlue,
    Pink,
    Orange,
    Red,
    Yellow,
    Green,
    DarkBlue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Space {
    pub id: u8,
    pub name: &'static str,
    pub kind: SpaceKind,
    pub group: Option<ColorGroup>,
    pub price: Money,
    pub rent: Money,
    pub tax: Money,
}

impl Space {
    const fn special(id: u8, name: &'static str, kind: SpaceKind) -> Self {
        Self {
            id,
            name,
            kind,
            group: None,
            price: 0,
            rent: 0,
            tax: 0,
        }
    }

    const fn property(id: u8, name: &'static str, group: ColorGroup, price: Money, rent: Money) -> Self {
        Self {
            id,
            name,
            kind: SpaceKind::Property,
            group: Some(group),
            price,
            rent,
            tax: 0,
        }
    }

    const fn railroad(id: u8, name: &'static str) -> Self {
        Self {
            id,
            name,
            kind: SpaceKind::Railroad,
            group: None,
            price: 200,
            rent: 25,
            tax: 0,
        }
    }

    const fn utility(id: u8, name: &'static str) -> Self {
        Self {
            id,
            name,
            kind: SpaceKind::Utility,
            group: None,
            price: 150,
            rent: 0,
            tax: 0,
        }
    }

    const fn tax(id: u8, name: &'static str, amount: Money) -> Self {
        Self {
            id,
            name,
            kind: SpaceKind::Tax,
            group: None,
            price: 0,
            rent: 0,
            tax: amount,
        }
    }
}

use ColorGroup::*;

pub static BOARD: [Space; BOARD_SIZE as usize] = [
    Space::special(0, "GO", SpaceKind::Go),
    Space::property(1, "Mediterranean Avenue", Brown, 60, 2),
    Space::special(2, "Community Chest", SpaceKind::Chest),
    Space::property(3, "Baltic Avenue", Brown, 60, 4),
    Space::tax(4, "Income Tax", 200),
    Space::railroad(5, "Reading Railroad"),
    Space::property(6, "Oriental Avenue", LightBlue, 100, 6),
    Space::special(7, "Chance", SpaceKind::Chance),
    Space::property(8, "Vermont Avenue", LightBlue, 100, 6),
    Space::property(9, "Connecticut Avenue", LightBlue, 120, 8),
    Space::special(10, "JAIL", SpaceKind::Jail),
    Space::property(11, "St. Charles Place", Pink, 140, 10),
    Space::utility(12, "Electric Company"),
    Space::property(13, "States Avenue", Pink, 140, 10),
    Space::property(14, "Virginia Avenue", Pink, 160, 12),
    Space::railroad(15, "Pennsylvania Railroad"),
    Space::property(16, "St. James Place", Orange, 180, 14),
    Space::special(17, "Community Chest", SpaceKind::Chest),
    Space::property(18, "Tennessee Avenue", Orange, 180, 14),
    Space::property(19, "New York Avenue", Orange, 200, 16),
    Space::special(20, "FREE PARKING", SpaceKind::FreeParking),
    Space::property(21, "Kentucky Avenue", Red, 220, 18),
    Space::special(22, "Chance", SpaceKind::Chance),
    Space::property(23, "Indiana Avenue", Red, 220, 18),
    Space::property(24, "Illinois Avenue", Red, 240, 20),
    Space::railroad(25, "B&O Railroad"),
    Space::property(26, "Atlantic Avenue", Yellow, 260, 22),
    Space::property(27, "Ventnor Avenue", Yellow, 260, 22),
    Space::utility(28, "Water Works"),
    Space::property(29, "Marvin Gardens", Yellow, 280, 24),
    Space::special(30, "GO TO JAIL", SpaceKind::GoToJail),
    Space::property(31, "Pacific Avenue", Green, 300, 26),
    Space::property(32, "North Carolina Avenue", Green, 300, 26),
    Space::special(33, "Community Chest", SpaceKind::Chest),
    Space::property(34, "Pennsylvania Avenue", Green, 320, 28),
    Space::railroad(35, "Short Line"),
    Space::special(36, "Chance", SpaceKind::Chance),
    Space::property(37, "Park Place", DarkBlue, 350, 35),
    Space::tax(38, "Luxury Tax", 100),
    Space::property(39, "Boardwalk", DarkBlue, 400, 50),
];

/// Looks up a space by board position. Positions wrap, so any `u8` is valid.
pub fn space(position: u8) -> &'static Space {
    &BOARD[(position % BOARD_SIZE) as usize]
}

/// All spaces of one kind, in board order.
pub fn spaces_of_kind(kind: SpaceKind) -> impl Iterator<Item = &'static Space> {
    BOARD.iter().filter(move |space| space.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_match_positions() {
        for (index, space) in BOARD.iter().enumerate() {
            assert_eq!(space.id as usize, index);
        }
    }

    #[test]
    fn test_special_positions() {
        assert_eq!(space(GO_POSITION).kind, SpaceKind::Go);
        assert_eq!(space(JAIL_POSITION).kind, SpaceKind::Jail);
        assert_eq!(space(30).kind, SpaceKind::GoToJail);
        assert_eq!(space(20).kind, SpaceKind::FreeParking);
    }

    #[test]
    fn test_kind_counts() {
        assert_eq!(spaces_of_kind(SpaceKind::Railroad).count(), 4);
        assert_eq!(spaces_of_kind(SpaceKind::Utility).count(), 2);
        assert_eq!(spaces_of_kind(SpaceKind::Property).count(), 22);
        assert_eq!(spaces_of_kind(SpaceKind::Tax).count(), 2);
    }

    #[test]
    fn test_only_properties_have_groups() {
        for space in BOARD.iter() {
            assert_eq!(space.group.is_some(), space.kind == SpaceKind::Property);
        }
    }

    #[test]
    fn test_tax_amounts() {
        assert_eq!(space(4).tax, 200);
        assert_eq!(space(38).tax, 100);
    }

    #[test]
    fn test_space_lookup_wraps() {
        assert_eq!(space(40).id, 0);
        assert_eq!(space(45).name, "Reading Railroad");
    }
}
