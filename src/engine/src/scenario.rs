// Scripted matches loaded from JSON, for tests. A scenario seats two
// players, then walks a sequence of inputs and expected events against a
// live match.

use std::{fs, time::Duration};

use agent::StrategyConfig;
use common::{
    error::GameError,
    model::{
        game::Side,
        record::{EndCondition, MatchMode, MatchRecord},
    },
};
use history::Leaderboard;
use serde::{Deserialize, Serialize};
use tokio::{
    sync::{broadcast, mpsc},
    time::timeout,
};
use tracing::{debug, info};

use crate::{
    model::events::MatchEvent,
    service::{
        game_manager::{GameManager, MatchRequest},
        move_source::HumanHandle,
    },
};

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
enum Step {
    Submit { seat: Side, input: String },
    Reject { seat: Side, input: String },
    Receive { event: MatchEvent },
    Leave { seat: Side },
    Abandon,
    Comment { text: String },
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Scenario {
    mode: MatchMode,
    names: (String, String),
    #[serde(default)]
    end_condition: EndCondition,
    #[serde(default = "default_strategy")]
    strategy: StrategyConfig,
    #[serde(default)]
    seed: Option<u64>,
    sequence: Vec<Step>,
}

fn default_strategy() -> StrategyConfig {
    StrategyConfig::Uniform
}

pub struct Report {
    pub result: Result<MatchRecord, GameError>,
    pub manager: GameManager,
}

impl Scenario {
    // Read a scenario, replacing every `${key}` with its value first.
    pub fn load(file_path: String, replacements: Vec<(impl ToString, impl ToString)>) -> Self {
        let mut text = fs::read_to_string(&file_path).expect("Unable to read scenario file");
        for (from, to) in replacements {
            let from = &format!("${{{}}}", from.to_string());
            text = text.replace(from, &to.to_string());
        }
        serde_json::from_str(&text).expect("Could not parse scenario")
    }

    pub async fn run(&self) -> Report {
        let timeout_len = Duration::from_millis(250);
        let mut manager = GameManager::new(Leaderboard::new());
        let mut setup = manager
            .start_match(MatchRequest {
                mode: self.mode,
                names: (Some(self.names.0.clone()), Some(self.names.1.clone())),
                end_condition: self.end_condition,
                strategy: self.strategy.clone(),
                seed: self.seed,
            })
            .expect("Scenario match could not start");
        let mut seats = (setup.take_human(Side::A), setup.take_human(Side::B));
        let (abandon_sender, mut abandon) = broadcast::channel(1);
        let (event_sender, mut events) = mpsc::channel(100);

        let script = async move {
            for step in self.sequence.iter() {
                match step {
                    Step::Submit { seat, input } => {
                        let handle = seat_handle(&seats, *seat);
                        timeout(timeout_len, handle.submit_raw(input))
                            .await
                            .unwrap_or_else(|_| panic!("Timeout submitting {:?}", input))
                            .unwrap_or_else(|e| panic!("Submit {:?} failed: {}", input, e));
                    }
                    Step::Reject { seat, input } => {
                        let handle = seat_handle(&seats, *seat);
                        let result = handle.submit_raw(input).await;
                        assert!(
                            matches!(result, Err(GameError::InvalidMove { .. })),
                            "Expected {:?} to be rejected, got {:?}",
                            input,
                            result
                        );
                    }
                    Step::Receive { event: expected } => {
                        let event = timeout(timeout_len, events.recv())
                            .await
                            .unwrap_or_else(|e| {
                                panic!("Timeout (error {:?}) waiting for {:?}", e, expected)
                            })
                            .expect("Match stopped sending events");
                        debug!("Received {:?}", event);
                        assert_eq!(expected, &event);
                    }
                    Step::Leave { seat } => {
                        let handle = match seat {
                            Side::A => seats.0.take(),
                            Side::B => seats.1.take(),
                        };
                        drop(handle);
                    }
                    Step::Abandon => {
                        abandon_sender.send(()).expect("Match is not listening");
                    }
                    Step::Comment { text } => {
                        info!("Comment: {:}", text)
                    }
                }
            }
            // Seats still held here leave with the script.
            drop(seats);
        };

        let (result, ()) = tokio::join!(
            manager.play(setup, &mut abandon, Some(event_sender)),
            script
        );
        Report { result, manager }
    }
}

fn seat_handle(seats: &(Option<HumanHandle>, Option<HumanHandle>), seat: Side) -> &HumanHandle {
    let handle = match seat {
        Side::A => &seats.0,
        Side::B => &seats.1,
    };
    handle
        .as_ref()
        .unwrap_or_else(|| panic!("No human handle for seat {:?}", seat))
}
