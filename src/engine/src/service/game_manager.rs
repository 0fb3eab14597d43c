use std::collections::HashMap;

use agent::{Difficulty, StrategyConfig};
use common::{
    error::GameError,
    model::{
        game::Side,
        record::{EndCondition, MatchMode, MatchRecord},
    },
};
use history::Leaderboard;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::{
    model::{events::MatchEvent, player::Player},
    service::{
        match_controller::{MatchConfig, MatchController},
        move_source::{human, HumanHandle, MoveSource},
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRequest {
    pub mode: MatchMode,
    pub names: (Option<String>, Option<String>),
    pub end_condition: EndCondition,
    // Used for every AI seat.
    pub strategy: StrategyConfig,
    pub seed: Option<u64>,
}

impl Default for MatchRequest {
    fn default() -> Self {
        MatchRequest {
            mode: MatchMode::VsAi,
            names: (None, None),
            end_condition: EndCondition::default(),
            strategy: Difficulty::default().into(),
            seed: None,
        }
    }
}

fn default_names(mode: MatchMode) -> (&'static str, &'static str) {
    match mode {
        MatchMode::VsAi => ("Player 1", "AI"),
        MatchMode::Local => ("Player 1", "Player 2"),
        MatchMode::AiVsAi => ("AI 1", "AI 2"),
    }
}

// A validated match that has not started yet. Human seats must be fed
// through the handles taken from here.
pub struct MatchSetup {
    config: MatchConfig,
    names: (String, String),
    sources: (MoveSource, MoveSource),
    humans: (Option<HumanHandle>, Option<HumanHandle>),
}

impl MatchSetup {
    pub fn config(&self) -> MatchConfig {
        self.config
    }

    pub fn names(&self) -> (&str, &str) {
        (&self.names.0, &self.names.1)
    }

    pub fn take_human(&mut self, side: Side) -> Option<HumanHandle> {
        match side {
            Side::A => self.humans.0.take(),
            Side::B => self.humans.1.take(),
        }
    }
}

pub struct GameManager {
    roster: HashMap<String, Player>,
    leaderboard: Leaderboard,
}

impl GameManager {
    pub fn new(leaderboard: Leaderboard) -> Self {
        GameManager {
            roster: HashMap::new(),
            leaderboard,
        }
    }

    pub fn start_match(&mut self, request: MatchRequest) -> Result<MatchSetup, GameError> {
        request.end_condition.validate()?;
        let defaults = default_names(request.mode);
        let name_a = self.enroll(request.names.0.as_deref().unwrap_or(defaults.0))?;
        let name_b = self.enroll(request.names.1.as_deref().unwrap_or(defaults.1))?;
        if name_a == name_b {
            return Err(GameError::InvalidConfig(format!(
                "both seats are named {name_a:?}"
            )));
        }

        let seed_b = request.seed.map(|seed| seed.wrapping_add(1));
        let mut humans = (None, None);
        let sources = match request.mode {
            MatchMode::VsAi => {
                let (source, handle) = human(name_a.clone());
                humans.0 = Some(handle);
                (
                    MoveSource::Human(source),
                    MoveSource::ai(&request.strategy, request.seed)?,
                )
            }
            MatchMode::Local => {
                let (source_a, handle_a) = human(name_a.clone());
                let (source_b, handle_b) = human(name_b.clone());
                humans = (Some(handle_a), Some(handle_b));
                (MoveSource::Human(source_a), MoveSource::Human(source_b))
            }
            MatchMode::AiVsAi => (
                MoveSource::ai(&request.strategy, request.seed)?,
                MoveSource::ai(&request.strategy, seed_b)?,
            ),
        };
        debug!("Seated {} and {} for a {} match", name_a, name_b, request.mode);

        Ok(MatchSetup {
            config: MatchConfig {
                mode: request.mode,
                end_condition: request.end_condition,
            },
            names: (name_a, name_b),
            sources,
            humans,
        })
    }

    // Run a prepared match against the rostered players and save their
    // counters afterwards, whether or not the match finished.
    pub async fn play(
        &mut self,
        setup: MatchSetup,
        abandon: &mut broadcast::Receiver<()>,
        events: Option<mpsc::Sender<MatchEvent>>,
    ) -> Result<MatchRecord, GameError> {
        // Seats nobody took a handle for leave right away.
        drop(setup.humans);
        let (name_a, name_b) = setup.names;
        let mut player_a = self.checkout(&name_a)?;
        let mut player_b = match self.checkout(&name_b) {
            Ok(player) => player,
            Err(e) => {
                self.roster.insert(name_a, player_a);
                return Err(e);
            }
        };

        let result = match MatchController::new(
            setup.config,
            (&mut player_a, &mut player_b),
            setup.sources,
            &mut self.leaderboard,
        ) {
            Ok(controller) => {
                let controller = match events {
                    Some(events) => controller.with_events(events),
                    None => controller,
                };
                controller.run(abandon).await
            }
            Err(e) => Err(e),
        };

        for player in [&player_a, &player_b] {
            self.save(player);
        }
        self.roster.insert(name_a, player_a);
        self.roster.insert(name_b, player_b);
        result
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.roster.get(name.trim())
    }

    pub fn player_summary(&self, name: &str) -> Option<String> {
        self.player(name).map(Player::summary)
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    // Add the player to the roster if needed and return the stored name.
    fn enroll(&mut self, name: &str) -> Result<String, GameError> {
        let name = name.trim();
        if let Some(player) = self.roster.get(name) {
            return Ok(player.name().to_owned());
        }

        let stored = match self.leaderboard.database() {
            Some(database) => database.load_player(name).unwrap_or_else(|e| {
                warn!("Failed to load stats for {}: {}", name, e);
                None
            }),
            None => None,
        };
        let player = match stored {
            Some(stats) => {
                info!("Restored {} ({} rounds)", stats.name, stats.total());
                Player::from_stats(stats)?
            }
            None => Player::new(name)?,
        };
        let name = player.name().to_owned();
        self.roster.insert(name.clone(), player);
        Ok(name)
    }

    fn checkout(&mut self, name: &str) -> Result<Player, GameError> {
        self.roster
            .remove(name)
            .ok_or_else(|| GameError::InvalidConfig(format!("{name:?} is not on the roster")))
    }

    fn save(&self, player: &Player) {
        let Some(database) = self.leaderboard.database() else {
            return;
        };
        if let Err(e) = database.save_player(&player.stats()) {
            warn!("Failed to save stats for {}: {}", player.name(), e);
        }
    }
}
