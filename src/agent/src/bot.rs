use common::{error::GameError, model::game::Move};
use rand::{rngs::StdRng, SeedableRng};
use tracing::trace;

use crate::strategy::{Round, Strategy, StrategyConfig};

pub struct Bot {
    strategy: Box<dyn Strategy>,
    rng: StdRng,
}

impl Bot {
    pub fn new(strategy: Box<dyn Strategy>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Bot { strategy, rng }
    }

    pub fn from_config(config: &StrategyConfig, seed: Option<u64>) -> Result<Self, GameError> {
        Ok(Self::new(config.build()?, seed))
    }

    pub fn play(&mut self, history: &[Round]) -> Move {
        let next_move = self.strategy.make_move(history, &mut self.rng);
        trace!("Bot picked {} after {} rounds", next_move, history.len());
        next_move
    }
}
