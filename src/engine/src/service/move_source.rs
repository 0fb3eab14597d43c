use agent::{strategy::Uniform, Bot, Round, StrategyConfig};
use common::{error::GameError, model::game::Move};
use tokio::sync::mpsc;
use tracing::{debug, trace};

// What a source may look at when choosing a move: the rounds of this match
// that are already resolved, from the source's own seat. The opponent's move
// for the current round is never in here.
#[derive(Debug, Clone, Copy)]
pub struct MoveContext<'a> {
    pub round: u32,
    pub history: &'a [Round],
}

pub struct HumanSource {
    name: String,
    receiver: mpsc::Receiver<Move>,
}

#[derive(Clone, Debug)]
pub struct HumanHandle {
    name: String,
    sender: mpsc::Sender<Move>,
}

impl HumanHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn submit(&self, value: Move) -> Result<(), GameError> {
        trace!("{} submitted {}", self.name, value);
        self.sender
            .send(value)
            .await
            .map_err(|_| GameError::MatchAbandoned)
    }

    // Parse raw input and submit it. Unparseable input is returned as
    // `InvalidMove` and nothing is sent.
    pub async fn submit_raw(&self, input: &str) -> Result<Move, GameError> {
        let value: Move = input.parse()?;
        self.submit(value).await?;
        Ok(value)
    }
}

// Create a human seat. Dropping every handle abandons the match at the next
// move request.
pub fn human(name: impl Into<String>) -> (HumanSource, HumanHandle) {
    let name = name.into();
    let (sender, receiver) = mpsc::channel(1);
    (
        HumanSource {
            name: name.clone(),
            receiver,
        },
        HumanHandle { name, sender },
    )
}

pub enum MoveSource {
    Human(HumanSource),
    RandomAi(Bot),
    WeightedAi(Bot),
}

impl MoveSource {
    pub fn random(seed: Option<u64>) -> Self {
        MoveSource::RandomAi(Bot::new(Box::new(Uniform), seed))
    }

    pub fn weighted(config: &StrategyConfig, seed: Option<u64>) -> Result<Self, GameError> {
        Ok(MoveSource::WeightedAi(Bot::from_config(config, seed)?))
    }

    pub fn ai(config: &StrategyConfig, seed: Option<u64>) -> Result<Self, GameError> {
        match config {
            StrategyConfig::Uniform => Ok(Self::random(seed)),
            _ => Self::weighted(config, seed),
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, MoveSource::Human(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            MoveSource::Human(_) => "human",
            MoveSource::RandomAi(_) => "random AI",
            MoveSource::WeightedAi(_) => "weighted AI",
        }
    }

    pub async fn produce_move(&mut self, context: &MoveContext<'_>) -> Result<Move, GameError> {
        match self {
            MoveSource::Human(source) => {
                debug!("Waiting for {} (round {})", source.name, context.round);
                source
                    .receiver
                    .recv()
                    .await
                    .ok_or(GameError::MatchAbandoned)
            }
            MoveSource::RandomAi(bot) | MoveSource::WeightedAi(bot) => {
                Ok(bot.play(context.history))
            }
        }
    }
}
