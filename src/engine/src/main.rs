use std::path::PathBuf;

use agent::Difficulty;
use clap::Parser;
use common::{
    model::record::{EndCondition, MatchMode},
    utility::{create_shutdown_channel, init_logging},
};
use engine::{entrypoint, ConfigError, SessionConfig};
use tracing::{error, Level};

#[derive(Parser, Debug)]
#[command(author, version, about = "Rock, paper, scissors in the terminal", long_about = None)]
struct Cli {
    /// vs-ai, local or ai-vs-ai
    #[arg(long)]
    mode: Option<MatchMode>,
    /// First side to this many round wins takes the match
    #[arg(long, conflicts_with = "rounds")]
    first_to: Option<u32>,
    /// Play exactly this many rounds
    #[arg(long)]
    rounds: Option<u32>,
    #[arg(long)]
    player1: Option<String>,
    #[arg(long)]
    player2: Option<String>,
    /// easy, medium or hard
    #[arg(long)]
    difficulty: Option<Difficulty>,
    #[arg(long)]
    seed: Option<u64>,
    /// SQLite file for match history and player stats
    #[arg(long)]
    db: Option<String>,
    /// JSON session config; flags override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// How many leaderboard rows and past matches to show
    #[arg(long)]
    history: Option<usize>,
    /// Pause after each round, in milliseconds
    #[arg(long)]
    delay: Option<u64>,
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn session(self) -> Result<SessionConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load(path)?,
            None => SessionConfig::default(),
        };
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(wins) = self.first_to {
            config.end_condition = EndCondition::FirstTo { wins };
        }
        if let Some(rounds) = self.rounds {
            config.end_condition = EndCondition::FixedRounds { rounds };
        }
        if let Some(difficulty) = self.difficulty {
            config.strategy = difficulty.into();
        }
        config.player_1 = self.player1.or(config.player_1);
        config.player_2 = self.player2.or(config.player_2);
        config.seed = self.seed.or(config.seed);
        config.db_url = self.db.or(config.db_url);
        config.history_limit = self.history.unwrap_or(config.history_limit);
        config.round_delay_ms = self.delay.unwrap_or(config.round_delay_ms);
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(if cli.verbose { Level::DEBUG } else { Level::INFO });

    let config = match cli.session() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };
    let shutdown_receiver = create_shutdown_channel().await;
    if let Err(e) = entrypoint::run(config, shutdown_receiver).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
