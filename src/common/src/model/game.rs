use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::GameError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

// Rows are A's move, columns are B's move, both in `Move::ALL` order.
const OUTCOMES: [[Outcome; 3]; 3] = [
    //            Rock           Paper          Scissors
    [Outcome::Draw, Outcome::WinB, Outcome::WinA], // Rock
    [Outcome::WinA, Outcome::Draw, Outcome::WinB], // Paper
    [Outcome::WinB, Outcome::WinA, Outcome::Draw], // Scissors
];

// Compare two simultaneous moves. Pure; every pair is valid.
pub fn resolve(move_a: Move, move_b: Move) -> Outcome {
    OUTCOMES[move_a.index()][move_b.index()]
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    pub fn index(&self) -> usize {
        match self {
            Move::Rock => 0,
            Move::Paper => 1,
            Move::Scissors => 2,
        }
    }

    pub fn beats(&self, other: &Move) -> bool {
        resolve(*self, *other) == Outcome::WinA
    }

    // The move that wins against this one.
    pub fn beaten_by(&self) -> Move {
        match self {
            Move::Rock => Move::Paper,
            Move::Paper => Move::Scissors,
            Move::Scissors => Move::Rock,
        }
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Move::Rock => "Rock",
            Move::Paper => "Paper",
            Move::Scissors => "Scissors",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Move {
    type Err = GameError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "rock" | "r" => Ok(Move::Rock),
            "paper" | "p" => Ok(Move::Paper),
            "scissors" | "s" => Ok(Move::Scissors),
            _ => Err(GameError::InvalidMove {
                input: input.trim().to_owned(),
            }),
        }
    }
}

impl TryFrom<&str> for Move {
    type Error = GameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<u8> for Move {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Move::ALL
            .get(value as usize)
            .copied()
            .ok_or(GameError::InvalidMove {
                input: value.to_string(),
            })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(&self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    WinA,
    WinB,
    Draw,
}

impl Outcome {
    pub fn flip(&self) -> Outcome {
        match self {
            Outcome::WinA => Outcome::WinB,
            Outcome::WinB => Outcome::WinA,
            Outcome::Draw => Outcome::Draw,
        }
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::WinA => Some(Side::A),
            Outcome::WinB => Some(Side::B),
            Outcome::Draw => None,
        }
    }

    pub fn for_side(&self, side: Side) -> PlayerOutcome {
        match self.winner() {
            None => PlayerOutcome::Draw,
            Some(winner) if winner == side => PlayerOutcome::Win,
            Some(_) => PlayerOutcome::Loss,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerOutcome {
    Win,
    Loss,
    Draw,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_mirrored() {
        for a in Move::ALL {
            for b in Move::ALL {
                assert_eq!(resolve(a, b), resolve(b, a).flip(), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_identical_moves_draw() {
        for m in Move::ALL {
            assert_eq!(resolve(m, m), Outcome::Draw);
        }
    }

    #[test]
    fn test_cyclic_dominance() {
        assert_eq!(resolve(Move::Rock, Move::Scissors), Outcome::WinA);
        assert_eq!(resolve(Move::Scissors, Move::Paper), Outcome::WinA);
        assert_eq!(resolve(Move::Paper, Move::Rock), Outcome::WinA);
    }

    #[test]
    fn test_beaten_by_wins_against_move() {
        for m in Move::ALL {
            assert!(m.beaten_by().beats(&m));
            assert!(!m.beats(&m));
        }
    }

    #[test]
    fn test_outcome_per_side() {
        assert_eq!(Outcome::WinA.for_side(Side::A), PlayerOutcome::Win);
        assert_eq!(Outcome::WinA.for_side(Side::B), PlayerOutcome::Loss);
        assert_eq!(Outcome::WinB.for_side(Side::B), PlayerOutcome::Win);
        assert_eq!(Outcome::Draw.for_side(Side::A), PlayerOutcome::Draw);
        assert_eq!(Outcome::Draw.for_side(Side::B), PlayerOutcome::Draw);
    }

    #[test]
    fn test_parse_moves() {
        assert_eq!("Rock".parse::<Move>().unwrap(), Move::Rock);
        assert_eq!(" p ".parse::<Move>().unwrap(), Move::Paper);
        assert_eq!("SCISSORS".parse::<Move>().unwrap(), Move::Scissors);
        assert!(matches!(
            "lizard".parse::<Move>(),
            Err(GameError::InvalidMove { input }) if input == "lizard"
        ));
    }

    #[test]
    fn test_move_from_index() {
        assert_eq!(Move::try_from(2u8).unwrap(), Move::Scissors);
        assert!(matches!(
            Move::try_from(3u8),
            Err(GameError::InvalidMove { .. })
        ));
    }
}
