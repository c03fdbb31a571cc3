//! Server-side dice. Clients never supply roll results.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// One throw of two six-sided dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
    pub first: u8,
    pub second: u8,
}

impl DiceRoll {
    pub fn new(first: u8, second: u8) -> Self {
        Self { first, second }
    }

    pub fn total(&self) -> u8 {
        self.first + self.second
    }

    pub fn is_doubles(&self) -> bool {
        self.first == self.second
    }
}

pub trait Dice: Send {
    fn roll(&mut self) -> DiceRoll;
}

pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Dice for RandomDice {
    fn roll(&mut self) -> DiceRoll {
        DiceRoll::new(self.rng.gen_range(1..=6), self.rng.gen_range(1..=6))
    }
}

/// Replays a fixed list of rolls, then falls back to a seeded generator.
pub struct ScriptedDice {
    rolls: VecDeque<DiceRoll>,
    fallback: RandomDice,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = (u8, u8)>) -> Self {
        Self {
            rolls: rolls
                .into_iter()
                .map(|(first, second)| DiceRoll::new(first, second))
                .collect(),
            fallback: RandomDice::seeded(0),
        }
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> DiceRoll {
        self.rolls
            .pop_front()
            .unwrap_or_else(|| self.fallback.roll())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_properties() {
        let roll = DiceRoll::new(5, 5);
        assert_eq!(roll.total(), 10);
        assert!(roll.is_doubles());
        assert!(!DiceRoll::new(3, 4).is_doubles());
    }

    #[test]
    fn test_random_dice_in_range() {
        let mut dice = RandomDice::from_entropy();
        for _ in 0..1000 {
            let roll = dice.roll();
            assert!((1..=6).contains(&roll.first));
            assert!((1..=6).contains(&roll.second));
            assert!((2..=12).contains(&roll.total()));
        }
    }

    #[test]
    fn test_seeded_dice_repeat() {
        let mut a = RandomDice::seeded(7);
        let mut b = RandomDice::seeded(7);
        for _ in 0..50 {
            assert_eq!(a.roll(), b.roll());
        }
    }

    #[test]
    fn test_scripted_dice_replay_then_fallback() {
        let mut dice = ScriptedDice::new([(3, 4), (6, 6)]);
        assert_eq!(dice.remaining(), 2);
        assert_eq!(dice.roll(), DiceRoll::new(3, 4));
        assert_eq!(dice.roll(), DiceRoll::new(6, 6));
        assert_eq!(dice.remaining(), 0);

        let roll = dice.roll();
        assert!((2..=12).contains(&roll.total()));
    }
}
