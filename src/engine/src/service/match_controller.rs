use agent::Round;
use chrono::Utc;
use common::{
    error::GameError,
    model::{
        game::{Move, Outcome, Side},
        id::Id,
        record::{EndCondition, MatchMode, MatchRecord},
    },
    utility::signalled,
};
use history::Leaderboard;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::{
    model::{
        events::{MatchEvent, RoundSummary},
        player::Player,
    },
    service::{
        move_source::{MoveContext, MoveSource},
        resolver::{describe, play_round},
    },
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConfig {
    pub mode: MatchMode,
    pub end_condition: EndCondition,
}

impl MatchConfig {
    fn check_seats(&self, sources: &(MoveSource, MoveSource)) -> Result<(), GameError> {
        let humans = [&sources.0, &sources.1]
            .iter()
            .filter(|source| source.is_human())
            .count();
        let expected = match self.mode {
            MatchMode::VsAi => 1,
            MatchMode::Local => 2,
            MatchMode::AiVsAi => 0,
        };
        if humans != expected {
            return Err(GameError::InvalidConfig(format!(
                "{} match needs {} human seats, got {}",
                self.mode, expected, humans
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MatchPhase {
    AwaitingMoves,
    Resolving { moves: (Move, Move) },
    CheckingEnd,
    Finished,
    Abandoned,
}

// Runs a single match between two seated players. Match scores live here;
// the players only carry their lifetime counters.
pub struct MatchController<'a> {
    config: MatchConfig,
    players: (&'a mut Player, &'a mut Player),
    sources: (MoveSource, MoveSource),
    leaderboard: &'a mut Leaderboard,
    events: Option<mpsc::Sender<MatchEvent>>,
    phase: MatchPhase,
    scores: (u32, u32),
    draws: u32,
    rounds: Vec<RoundSummary>,
    // Resolved rounds as each seat saw them
    history: (Vec<Round>, Vec<Round>),
}

impl<'a> MatchController<'a> {
    pub fn new(
        config: MatchConfig,
        players: (&'a mut Player, &'a mut Player),
        sources: (MoveSource, MoveSource),
        leaderboard: &'a mut Leaderboard,
    ) -> Result<Self, GameError> {
        config.end_condition.validate()?;
        if players.0.name() == players.1.name() {
            return Err(GameError::InvalidConfig(format!(
                "both seats are named {:?}",
                players.0.name()
            )));
        }
        config.check_seats(&sources)?;

        Ok(MatchController {
            config,
            players,
            sources,
            leaderboard,
            events: None,
            phase: MatchPhase::AwaitingMoves,
            scores: (0, 0),
            draws: 0,
            rounds: Vec::new(),
            history: (Vec::new(), Vec::new()),
        })
    }

    pub fn with_events(mut self, events: mpsc::Sender<MatchEvent>) -> Self {
        self.events = Some(events);
        self
    }

    // Drive the match to the end. A signal on `abandon` stops it from any
    // state; no record is stored then, and the players keep the counters of
    // the rounds resolved so far.
    pub async fn run(
        mut self,
        abandon: &mut broadcast::Receiver<()>,
    ) -> Result<MatchRecord, GameError> {
        info!(
            "Starting {} match: {} ({}) vs {} ({}), {}",
            self.config.mode,
            self.players.0.name(),
            self.sources.0.label(),
            self.players.1.name(),
            self.sources.1.label(),
            self.config.end_condition
        );
        loop {
            let step = tokio::select! {
                biased;
                _ = signalled(abandon) => Err(GameError::MatchAbandoned),
                step = self.step() => step,
            };
            match step {
                Ok(Some(record)) => {
                    self.emit(MatchEvent::MatchResult {
                        winner: record.winner_name().map(str::to_owned),
                        scores: record.scores,
                        rounds: record.rounds,
                    })
                    .await;
                    return Ok(record);
                }
                Ok(None) => continue,
                Err(e) => {
                    self.phase = MatchPhase::Abandoned;
                    warn!("Match abandoned after {} rounds", self.rounds.len());
                    self.emit(MatchEvent::Abandoned {
                        rounds: self.rounds.len() as u32,
                    })
                    .await;
                    return Err(e);
                }
            }
        }
    }

    // One state transition. Returns the record once the match is finished.
    async fn step(&mut self) -> Result<Option<MatchRecord>, GameError> {
        match self.phase {
            MatchPhase::AwaitingMoves => {
                let round = self.rounds.len() as u32 + 1;
                self.players.0.clear_move();
                self.players.1.clear_move();
                self.emit(MatchEvent::PendingMove { round }).await;

                let context_a = MoveContext {
                    round,
                    history: &self.history.0,
                };
                let context_b = MoveContext {
                    round,
                    history: &self.history.1,
                };
                let (move_a, move_b) = tokio::try_join!(
                    self.sources.0.produce_move(&context_a),
                    self.sources.1.produce_move(&context_b)
                )?;
                self.phase = MatchPhase::Resolving {
                    moves: (move_a, move_b),
                };
            }
            MatchPhase::Resolving { moves } => {
                let outcome = play_round(
                    &mut *self.players.0,
                    moves.0,
                    &mut *self.players.1,
                    moves.1,
                );
                match outcome {
                    Outcome::WinA => self.scores.0 += 1,
                    Outcome::WinB => self.scores.1 += 1,
                    Outcome::Draw => self.draws += 1,
                }
                self.history.0.push(Round::new(moves.0, moves.1));
                self.history.1.push(Round::new(moves.1, moves.0));

                let summary = RoundSummary {
                    round: self.rounds.len() as u32 + 1,
                    moves,
                    outcome,
                    scores: self.scores,
                    message: describe(
                        (self.players.0.name(), self.players.1.name()),
                        moves,
                        outcome,
                    ),
                };
                debug!("Round {}: {}", summary.round, summary.message);
                self.rounds.push(summary.clone());
                self.phase = MatchPhase::CheckingEnd;
                self.emit(MatchEvent::RoundResult(summary)).await;
            }
            MatchPhase::CheckingEnd => {
                let rounds_played = self.rounds.len() as u32;
                self.phase = if self.config.end_condition.is_met(self.scores, rounds_played) {
                    MatchPhase::Finished
                } else {
                    MatchPhase::AwaitingMoves
                };
            }
            MatchPhase::Finished => return Ok(Some(self.finish())),
            MatchPhase::Abandoned => return Err(GameError::MatchAbandoned),
        }
        Ok(None)
    }

    fn finish(&mut self) -> MatchRecord {
        let winner = match self.scores.0.cmp(&self.scores.1) {
            std::cmp::Ordering::Greater => Some(Side::A),
            std::cmp::Ordering::Less => Some(Side::B),
            std::cmp::Ordering::Equal => None,
        };
        let record = MatchRecord {
            id: Id::new(),
            mode: self.config.mode,
            player_a: self.players.0.name().to_owned(),
            player_b: self.players.1.name().to_owned(),
            scores: self.scores,
            draws: self.draws,
            rounds: self.rounds.len() as u32,
            winner,
            end_condition: self.config.end_condition,
            finished_at: Utc::now(),
        };
        info!("Match finished: {}", record.description());
        self.leaderboard.append(record.clone());
        record
    }

    async fn emit(&self, event: MatchEvent) {
        let Some(events) = &self.events else {
            return;
        };
        if events.send(event).await.is_err() {
            debug!("Nobody is listening for match events");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use agent::{strategy::Strategy, Bot, StrategyConfig};
    use common::model::game::PlayerOutcome;

    use super::*;
    use crate::service::move_source::{human, HumanHandle};

    fn players(a: &str, b: &str) -> (Player, Player) {
        (Player::new(a).unwrap(), Player::new(b).unwrap())
    }

    fn fixed(value: Move) -> MoveSource {
        MoveSource::weighted(&StrategyConfig::Fixed { value }, None).unwrap()
    }

    fn config(mode: MatchMode, end_condition: EndCondition) -> MatchConfig {
        MatchConfig {
            mode,
            end_condition,
        }
    }

    async fn feed(handle: HumanHandle, moves: Vec<Move>) {
        for value in moves {
            if handle.submit(value).await.is_err() {
                return;
            }
        }
    }

    fn collect(
        mut receiver: mpsc::Receiver<MatchEvent>,
    ) -> tokio::task::JoinHandle<Vec<RoundSummary>> {
        tokio::spawn(async move {
            let mut rounds = Vec::new();
            while let Some(event) = receiver.recv().await {
                if let MatchEvent::RoundResult(summary) = event {
                    rounds.push(summary);
                }
            }
            rounds
        })
    }

    #[tokio::test]
    async fn test_rock_always_against_random() {
        let mut side_a_won = false;
        for seed in 0..40 {
            let (mut a, mut b) = players("Rocky", "AI");
            let mut leaderboard = Leaderboard::new();
            let (_abandon_sender, mut abandon) = broadcast::channel(1);
            let (sender, receiver) = mpsc::channel(100);
            let collector = collect(receiver);

            let record = MatchController::new(
                config(MatchMode::AiVsAi, EndCondition::FirstTo { wins: 3 }),
                (&mut a, &mut b),
                (fixed(Move::Rock), MoveSource::random(Some(seed))),
                &mut leaderboard,
            )
            .unwrap()
            .with_events(sender)
            .run(&mut abandon)
            .await
            .unwrap();
            let rounds = collector.await.unwrap();

            let wins_a = rounds.iter().filter(|r| r.outcome == Outcome::WinA).count() as u32;
            let wins_b = rounds.iter().filter(|r| r.outcome == Outcome::WinB).count() as u32;
            assert_eq!(record.scores, (wins_a, wins_b));
            assert_eq!(record.scores.0.max(record.scores.1), 3);
            assert_eq!(record.rounds as usize, rounds.len());
            assert!(rounds.iter().all(|r| r.moves.0 == Move::Rock));
            assert_eq!(a.rounds_played(), record.rounds);
            assert_eq!(leaderboard.records(), &[record.clone()]);

            let (last, earlier) = rounds.split_last().unwrap();
            let earlier_wins_b = earlier.iter().filter(|r| r.outcome == Outcome::WinB).count() as u32;
            match record.winner {
                Some(Side::A) => {
                    side_a_won = true;
                    assert_eq!(record.scores.0, 3);
                    assert!(record.scores.1 < 3);
                    assert_eq!(last.outcome, Outcome::WinA);
                    assert_eq!(record.scores.1, earlier_wins_b);
                }
                Some(Side::B) => {
                    assert_eq!(record.scores.1, 3);
                    assert!(record.scores.0 < 3);
                    assert_eq!(last.outcome, Outcome::WinB);
                }
                None => panic!("first-to match ended without a winner (seed {seed})"),
            }
        }
        assert!(side_a_won, "no seed let the rock player win");
    }

    #[tokio::test]
    async fn test_first_to_three_finishes_on_third_win() {
        let (mut alice, mut bob) = players("Alice", "Bob");
        let mut leaderboard = Leaderboard::new();
        let (_abandon_sender, mut abandon) = broadcast::channel(1);
        let (source_a, handle_a) = human("Alice");
        let (source_b, handle_b) = human("Bob");

        use Move::*;
        tokio::spawn(feed(handle_a, vec![Rock, Rock, Paper, Scissors, Rock]));
        tokio::spawn(feed(handle_b, vec![Scissors, Paper, Rock, Rock, Scissors]));

        let record = MatchController::new(
            config(MatchMode::Local, EndCondition::default()),
            (&mut alice, &mut bob),
            (MoveSource::Human(source_a), MoveSource::Human(source_b)),
            &mut leaderboard,
        )
        .unwrap()
        .run(&mut abandon)
        .await
        .unwrap();

        assert_eq!(record.scores, (3, 2));
        assert_eq!(record.rounds, 5);
        assert_eq!(record.winner, Some(Side::A));
        assert_eq!(record.outcome_for("Bob"), Some(PlayerOutcome::Loss));
        assert_eq!((alice.wins(), alice.losses(), alice.draws()), (3, 2, 0));
        assert_eq!((bob.wins(), bob.losses(), bob.draws()), (2, 3, 0));
        assert_eq!(alice.current_move(), Some(Rock));
        assert_eq!(leaderboard.len(), 1);
    }

    #[tokio::test]
    async fn test_fixed_rounds_can_end_level() {
        let (mut a, mut b) = players("AI 1", "AI 2");
        let mut leaderboard = Leaderboard::new();
        let (_abandon_sender, mut abandon) = broadcast::channel(1);

        let record = MatchController::new(
            config(MatchMode::AiVsAi, EndCondition::FixedRounds { rounds: 3 }),
            (&mut a, &mut b),
            (fixed(Move::Paper), fixed(Move::Paper)),
            &mut leaderboard,
        )
        .unwrap()
        .run(&mut abandon)
        .await
        .unwrap();

        assert_eq!(record.scores, (0, 0));
        assert_eq!(record.draws, 3);
        assert_eq!(record.rounds, 3);
        assert_eq!(record.winner, None);
        assert_eq!(a.draws(), 3);
    }

    #[tokio::test]
    async fn test_fixed_rounds_ignores_win_count() {
        let (mut a, mut b) = players("AI 1", "AI 2");
        let mut leaderboard = Leaderboard::new();
        let (_abandon_sender, mut abandon) = broadcast::channel(1);

        let record = MatchController::new(
            config(MatchMode::AiVsAi, EndCondition::FixedRounds { rounds: 7 }),
            (&mut a, &mut b),
            (fixed(Move::Rock), fixed(Move::Scissors)),
            &mut leaderboard,
        )
        .unwrap()
        .run(&mut abandon)
        .await
        .unwrap();

        assert_eq!(record.scores, (7, 0));
        assert_eq!(record.winner, Some(Side::A));
        assert_eq!(b.losses(), 7);
    }

    #[tokio::test]
    async fn test_abandon_keeps_resolved_rounds_only() {
        let (mut alice, mut bob) = players("Alice", "Bob");
        let mut leaderboard = Leaderboard::new();
        let (abandon_sender, mut abandon) = broadcast::channel(1);
        let (source_a, handle_a) = human("Alice");
        let (source_b, handle_b) = human("Bob");
        let (sender, mut receiver) = mpsc::channel(100);

        let controller = MatchController::new(
            config(MatchMode::Local, EndCondition::default()),
            (&mut alice, &mut bob),
            (MoveSource::Human(source_a), MoveSource::Human(source_b)),
            &mut leaderboard,
        )
        .unwrap()
        .with_events(sender);

        let driver = async {
            while let Some(event) = receiver.recv().await {
                match event {
                    MatchEvent::PendingMove { round: 3 } => {
                        // Only Alice answers before the abandon.
                        handle_a.submit(Move::Rock).await.unwrap();
                        abandon_sender.send(()).unwrap();
                    }
                    MatchEvent::PendingMove { .. } => {
                        handle_a.submit(Move::Rock).await.unwrap();
                        handle_b.submit(Move::Paper).await.unwrap();
                    }
                    MatchEvent::Abandoned { rounds } => return rounds,
                    _ => {}
                }
            }
            panic!("event stream ended without an abandon");
        };
        let (result, abandoned_after) = tokio::join!(controller.run(&mut abandon), driver);

        assert_eq!(result, Err(GameError::MatchAbandoned));
        assert_eq!(abandoned_after, 2);
        assert!(leaderboard.is_empty());
        assert_eq!(alice.rounds_played(), 2);
        assert_eq!(bob.wins(), 2);
    }

    #[tokio::test]
    async fn test_leaving_player_abandons() {
        let (mut alice, mut ai) = players("Alice", "AI");
        let mut leaderboard = Leaderboard::new();
        let (_abandon_sender, mut abandon) = broadcast::channel(1);
        let (source, handle) = human("Alice");
        drop(handle);

        let result = MatchController::new(
            config(MatchMode::VsAi, EndCondition::default()),
            (&mut alice, &mut ai),
            (MoveSource::Human(source), MoveSource::random(Some(1))),
            &mut leaderboard,
        )
        .unwrap()
        .run(&mut abandon)
        .await;

        assert_eq!(result, Err(GameError::MatchAbandoned));
        assert_eq!(alice.rounds_played(), 0);
        assert!(leaderboard.is_empty());
    }

    // Records how much history it was shown on every move.
    struct Spy {
        seen: Arc<Mutex<Vec<Vec<Move>>>>,
    }

    impl Strategy for Spy {
        fn weights(&self, history: &[Round]) -> [f64; 3] {
            let opponent = history.iter().map(|round| round.their_move).collect();
            self.seen.lock().unwrap().push(opponent);
            [1.0; 3]
        }
    }

    #[tokio::test]
    async fn test_sources_only_see_resolved_rounds() {
        let (mut a, mut b) = players("Spy", "AI");
        let mut leaderboard = Leaderboard::new();
        let (_abandon_sender, mut abandon) = broadcast::channel(1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let spy = MoveSource::WeightedAi(Bot::new(
            Box::new(Spy {
                seen: Arc::clone(&seen),
            }),
            Some(9),
        ));

        MatchController::new(
            config(MatchMode::AiVsAi, EndCondition::FixedRounds { rounds: 3 }),
            (&mut a, &mut b),
            (spy, fixed(Move::Paper)),
            &mut leaderboard,
        )
        .unwrap()
        .run(&mut abandon)
        .await
        .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![vec![], vec![Move::Paper], vec![Move::Paper, Move::Paper]]
        );
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let (mut a, mut b) = players("Alice", "Alice");
        let mut leaderboard = Leaderboard::new();
        let result = MatchController::new(
            config(MatchMode::AiVsAi, EndCondition::default()),
            (&mut a, &mut b),
            (fixed(Move::Rock), fixed(Move::Rock)),
            &mut leaderboard,
        );
        assert!(matches!(result, Err(GameError::InvalidConfig(_))));

        let (mut a, mut b) = players("Alice", "Bob");
        let result = MatchController::new(
            config(MatchMode::AiVsAi, EndCondition::FirstTo { wins: 0 }),
            (&mut a, &mut b),
            (fixed(Move::Rock), fixed(Move::Rock)),
            &mut leaderboard,
        );
        assert!(matches!(result, Err(GameError::InvalidConfig(_))));

        let result = MatchController::new(
            config(MatchMode::VsAi, EndCondition::default()),
            (&mut a, &mut b),
            (fixed(Move::Rock), fixed(Move::Rock)),
            &mut leaderboard,
        );
        assert!(matches!(result, Err(GameError::InvalidConfig(_))));
    }
}
