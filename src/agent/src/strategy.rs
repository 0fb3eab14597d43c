use common::{
    error::GameError,
    model::game::{resolve, Move, PlayerOutcome, Side},
};
use itertools::Itertools;
use rand::{distributions::WeightedIndex, prelude::Distribution, seq::SliceRandom, RngCore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Round {
    pub my_move: Move,
    pub their_move: Move,
    pub outcome: PlayerOutcome,
}

impl Round {
    pub fn new(my_move: Move, their_move: Move) -> Self {
        Round {
            my_move,
            their_move,
            outcome: resolve(my_move, their_move).for_side(Side::A),
        }
    }
}

// Decides a move from past rounds only. The opponent's move for the
// current round is never part of `history`.
pub trait Strategy: Send {
    // Relative weights for Rock, Paper and Scissors, in `Move::ALL` order.
    fn weights(&self, history: &[Round]) -> [f64; 3];

    fn make_move(&self, history: &[Round], rng: &mut dyn RngCore) -> Move {
        let weights = self.weights(history);
        match WeightedIndex::new(weights) {
            Ok(distribution) => Move::ALL[distribution.sample(rng)],
            // All-zero or non-finite weights fall back to a uniform pick.
            Err(_) => Move::ALL.choose(rng).copied().unwrap_or(Move::Rock),
        }
    }
}

// Trivial strategies
pub struct Fixed(pub Move);
impl Strategy for Fixed {
    fn weights(&self, _: &[Round]) -> [f64; 3] {
        let mut weights = [0.0; 3];
        weights[self.0.index()] = 1.0;
        weights
    }
}

pub struct Uniform;
impl Strategy for Uniform {
    fn weights(&self, _: &[Round]) -> [f64; 3] {
        [1.0; 3]
    }
}

pub struct Bias(pub [u32; 3]);
impl Strategy for Bias {
    fn weights(&self, _: &[Round]) -> [f64; 3] {
        self.0.map(f64::from)
    }
}

// Every move starts at weight 1; each past opponent move adds `strength`
// to the move that beats it.
pub struct CounterMostFrequent {
    pub strength: f64,
}
impl Strategy for CounterMostFrequent {
    fn weights(&self, history: &[Round]) -> [f64; 3] {
        let mut weights = [1.0; 3];
        for (their_move, count) in history.iter().map(|round| round.their_move).counts() {
            weights[their_move.beaten_by().index()] += self.strength * count as f64;
        }
        weights
    }
}

// Counters the opponent's previous move with `probability`, otherwise
// picks uniformly.
pub struct CounterLast {
    pub probability: f64,
}
impl Strategy for CounterLast {
    fn weights(&self, history: &[Round]) -> [f64; 3] {
        let Some(last) = history.last() else {
            return [1.0; 3];
        };
        let p = self.probability;
        let mut weights = [(1.0 - p) / 3.0; 3];
        weights[last.their_move.beaten_by().index()] += p;
        weights
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty {other:?}")),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum StrategyConfig {
    Fixed { value: Move },
    Uniform,
    Bias { weights: [u32; 3] },
    CounterMostFrequent { strength: f64 },
    CounterLast { probability: f64 },
}

impl StrategyConfig {
    // Rejects parameters that would leave no valid weights.
    pub fn validate(&self) -> Result<(), GameError> {
        let problem = match *self {
            StrategyConfig::Bias { weights } if weights == [0; 3] => {
                Some("bias weights must not all be zero".to_owned())
            }
            StrategyConfig::CounterMostFrequent { strength }
                if !strength.is_finite() || strength < 0.0 =>
            {
                Some(format!("strength must be a non-negative number, got {strength}"))
            }
            StrategyConfig::CounterLast { probability } if !(0.0..=1.0).contains(&probability) => {
                Some(format!("probability must be between 0 and 1, got {probability}"))
            }
            _ => None,
        };
        match problem {
            Some(problem) => Err(GameError::InvalidConfig(problem)),
            None => Ok(()),
        }
    }

    pub fn build(&self) -> Result<Box<dyn Strategy>, GameError> {
        self.validate()?;
        let strategy: Box<dyn Strategy> = match *self {
            StrategyConfig::Fixed { value } => Box::new(Fixed(value)),
            StrategyConfig::Uniform => Box::new(Uniform),
            StrategyConfig::Bias { weights } => Box::new(Bias(weights)),
            StrategyConfig::CounterMostFrequent { strength } => {
                Box::new(CounterMostFrequent { strength })
            }
            StrategyConfig::CounterLast { probability } => Box::new(CounterLast { probability }),
        };
        Ok(strategy)
    }
}

impl From<Difficulty> for StrategyConfig {
    fn from(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => StrategyConfig::Uniform,
            Difficulty::Medium => StrategyConfig::CounterMostFrequent { strength: 0.5 },
            Difficulty::Hard => StrategyConfig::CounterMostFrequent { strength: 2.0 },
        }
    }
}
