use std::{error, io::Write, time::Duration};

use common::{
    error::GameError,
    model::game::Side,
    utility::signalled,
};
use history::{Database, Leaderboard, OrderBy};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use crate::{
    config::SessionConfig,
    model::events::MatchEvent,
    service::{game_manager::GameManager, move_source::HumanHandle},
};

type Result<T> = std::result::Result<T, Box<dyn error::Error>>;

// Play one match in the terminal, then print the leaderboard. A signal on
// `shutdown_receiver` abandons the match.
pub async fn run(
    config: SessionConfig,
    mut shutdown_receiver: broadcast::Receiver<()>,
) -> Result<()> {
    let leaderboard = match &config.db_url {
        Some(db_url) => Leaderboard::with_database(Database::open(db_url)?)?,
        None => Leaderboard::new(),
    };
    let mut manager = GameManager::new(leaderboard);
    let mut setup = manager.start_match(config.request())?;
    let names = (setup.names().0.to_owned(), setup.names().1.to_owned());
    let humans: Vec<HumanHandle> = [Side::A, Side::B]
        .into_iter()
        .filter_map(|side| setup.take_human(side))
        .collect();
    println!(
        "{} vs {} ({})",
        names.0,
        names.1,
        setup.config().end_condition
    );

    let (event_sender, event_receiver) = mpsc::channel(100);
    let front_end = FrontEnd {
        humans,
        names: names.clone(),
        input: spawn_input_reader(),
        events: event_receiver,
        shutdown_receiver: shutdown_receiver.resubscribe(),
        round_delay: Duration::from_millis(config.round_delay_ms),
    };
    let (result, ()) = tokio::join!(
        manager.play(setup, &mut shutdown_receiver, Some(event_sender)),
        front_end.run()
    );

    match result {
        Ok(record) => println!("\n{}", record.description()),
        Err(GameError::MatchAbandoned) => println!("\nMatch abandoned."),
        Err(e) => return Err(e.into()),
    }
    print_standings(&manager, config.history_limit);
    for name in [names.0, names.1] {
        if let Some(summary) = manager.player_summary(&name) {
            println!("{}: {}", name, summary);
        }
    }
    Ok(())
}

struct FrontEnd {
    humans: Vec<HumanHandle>,
    names: (String, String),
    input: mpsc::Receiver<String>,
    events: mpsc::Receiver<MatchEvent>,
    shutdown_receiver: broadcast::Receiver<()>,
    round_delay: Duration,
}

impl FrontEnd {
    // Ends when the match drops its event sender, or early when input runs
    // out, which abandons the match.
    async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            match event {
                MatchEvent::PendingMove { round } => {
                    if self.humans.is_empty() {
                        continue;
                    }
                    println!("\nRound {}", round);
                    if !self.collect_moves().await {
                        return;
                    }
                }
                MatchEvent::RoundResult(summary) => {
                    println!(
                        "{} played {}, {} played {}. {} Score: {}-{}",
                        self.names.0,
                        summary.moves.0,
                        self.names.1,
                        summary.moves.1,
                        summary.message,
                        summary.scores.0,
                        summary.scores.1
                    );
                    if !self.round_delay.is_zero() {
                        tokio::time::sleep(self.round_delay).await;
                    }
                }
                MatchEvent::MatchResult { winner, .. } => match winner {
                    Some(name) => println!("{} wins the match!", name),
                    None => println!("The match is a draw."),
                },
                MatchEvent::Abandoned { rounds } => {
                    debug!("Front end saw abandon after {} rounds", rounds)
                }
            }
        }
    }

    // Prompt every human seat once. False when input or the match is gone.
    async fn collect_moves(&mut self) -> bool {
        for handle in &self.humans {
            loop {
                print!("{}, your move (rock/paper/scissors): ", handle.name());
                let _ = std::io::stdout().flush();
                let line = tokio::select! {
                    _ = signalled(&mut self.shutdown_receiver) => return false,
                    line = self.input.recv() => line,
                };
                let Some(line) = line else {
                    info!("Input closed, leaving the match");
                    return false;
                };
                match handle.submit_raw(&line).await {
                    Ok(_) => break,
                    Err(e @ GameError::InvalidMove { .. }) => println!("{}", e),
                    Err(_) => return false,
                }
            }
        }
        true
    }
}

// Stdin reads block and cannot be cancelled, so they get their own thread.
fn spawn_input_reader() -> mpsc::Receiver<String> {
    let (sender, receiver) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else {
                break;
            };
            if sender.blocking_send(line).is_err() {
                break;
            }
        }
    });
    receiver
}

fn print_standings(manager: &GameManager, limit: usize) {
    let leaderboard = manager.leaderboard();
    println!("\nLeaderboard");
    for (rank, standing) in leaderboard
        .top_players(limit, OrderBy::Wins)
        .iter()
        .enumerate()
    {
        println!(
            "{:>3}. {:<16} {}W {}L {}D ({:.1}%)",
            rank + 1,
            standing.name,
            standing.wins,
            standing.losses,
            standing.draws,
            standing.win_rate() * 100.0
        );
    }

    println!("\nRecent matches");
    for record in leaderboard.recent_history(limit) {
        println!("  {}", record.description());
    }
    println!();
}
