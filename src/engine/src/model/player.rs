use common::{
    error::GameError,
    model::{
        game::{Move, PlayerOutcome},
        record::PlayerStats,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    name: String,
    wins: u32,
    losses: u32,
    draws: u32,
    current_move: Option<Move>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Result<Self, GameError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(GameError::EmptyIdentity);
        }
        Ok(Player {
            name,
            wins: 0,
            losses: 0,
            draws: 0,
            current_move: None,
        })
    }

    pub fn from_stats(stats: PlayerStats) -> Result<Self, GameError> {
        let mut player = Self::new(stats.name)?;
        player.wins = stats.wins;
        player.losses = stats.losses;
        player.draws = stats.draws;
        Ok(player)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn losses(&self) -> u32 {
        self.losses
    }

    pub fn draws(&self) -> u32 {
        self.draws
    }

    pub fn rounds_played(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    // Count one round. Must be called exactly once per round; nothing
    // here can tell two calls for the same round apart.
    pub fn record_result(&mut self, outcome: PlayerOutcome) {
        match outcome {
            PlayerOutcome::Win => self.wins += 1,
            PlayerOutcome::Loss => self.losses += 1,
            PlayerOutcome::Draw => self.draws += 1,
        }
    }

    pub fn current_win_rate(&self) -> f64 {
        match self.rounds_played() {
            0 => 0.0,
            rounds => self.wins as f64 / rounds as f64,
        }
    }

    pub fn current_move(&self) -> Option<Move> {
        self.current_move
    }

    pub fn set_move(&mut self, value: Move) {
        self.current_move = Some(value);
    }

    pub fn clear_move(&mut self) {
        self.current_move = None;
    }

    pub fn stats(&self) -> PlayerStats {
        PlayerStats {
            name: self.name.clone(),
            wins: self.wins,
            losses: self.losses,
            draws: self.draws,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Games: {} | Wins: {} | Losses: {} | Draws: {} | Win Rate: {:.1}%",
            self.rounds_played(),
            self.wins,
            self.losses,
            self.draws,
            self.current_win_rate() * 100.0
        )
    }
}
