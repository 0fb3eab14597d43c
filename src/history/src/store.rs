use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::model::{game::PlayerOutcome, record::MatchRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{database::Database, error::Result};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    #[default]
    Wins,
    WinRate,
}

impl std::str::FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "wins" => Ok(OrderBy::Wins),
            "win_rate" => Ok(OrderBy::WinRate),
            other => Err(format!("unknown ordering {other:?}")),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Standing {
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub last_played: DateTime<Utc>,
    // Position of the player's latest match in the store.
    #[serde(skip)]
    recency: usize,
}

impl Standing {
    pub fn matches(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    pub fn win_rate(&self) -> f64 {
        match self.matches() {
            0 => 0.0,
            matches => self.wins as f64 / matches as f64,
        }
    }
}

// Completed matches in the order they finished. Optionally writes every
// appended record through to a database.
#[derive(Default)]
pub struct Leaderboard {
    records: Vec<MatchRecord>,
    database: Option<Database>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Leaderboard {
            records: Vec::new(),
            database: None,
        }
    }

    pub fn with_database(database: Database) -> Result<Self> {
        let records = database.load_records()?;
        info!("Loaded {} match records", records.len());
        Ok(Leaderboard {
            records,
            database: Some(database),
        })
    }

    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }

    // Never fails: a database write error is logged and the record is still
    // kept in memory.
    pub fn append(&mut self, record: MatchRecord) {
        if let Some(database) = &self.database {
            if let Err(e) = database.save_record(&record) {
                warn!("Failed to persist match {}: {}", record.id, e);
            }
        }
        debug!("Appending match {}", record.id);
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    // Newest first.
    pub fn recent_history(&self, n: usize) -> Vec<&MatchRecord> {
        self.records.iter().rev().take(n).collect()
    }

    pub fn standing(&self, name: &str) -> Option<Standing> {
        self.standings().remove(name)
    }

    // At most `n` players, best first. Ties go to whoever played most
    // recently, then by name.
    pub fn top_players(&self, n: usize, order_by: OrderBy) -> Vec<Standing> {
        let mut standings: Vec<Standing> = self.standings().into_values().collect();
        standings.sort_by(|a, b| {
            let primary = match order_by {
                OrderBy::Wins => b.wins.cmp(&a.wins),
                OrderBy::WinRate => b.win_rate().total_cmp(&a.win_rate()),
            };
            primary
                .then(b.recency.cmp(&a.recency))
                .then_with(|| a.name.cmp(&b.name))
        });
        standings.truncate(n);
        standings
    }

    fn standings(&self) -> HashMap<String, Standing> {
        let mut standings: HashMap<String, Standing> = HashMap::new();
        for (index, record) in self.records.iter().enumerate() {
            for name in [&record.player_a, &record.player_b] {
                let Some(outcome) = record.outcome_for(name) else {
                    continue;
                };
                let standing = standings.entry(name.clone()).or_insert_with(|| Standing {
                    name: name.clone(),
                    wins: 0,
                    losses: 0,
                    draws: 0,
                    last_played: record.finished_at,
                    recency: index,
                });
                match outcome {
                    PlayerOutcome::Win => standing.wins += 1,
                    PlayerOutcome::Loss => standing.losses += 1,
                    PlayerOutcome::Draw => standing.draws += 1,
                }
                standing.last_played = record.finished_at;
                standing.recency = index;
            }
        }
        standings
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use common::model::{
        game::Side,
        id::Id,
        record::{EndCondition, MatchMode},
    };

    use super::*;

    fn record(player_a: &str, player_b: &str, winner: Option<Side>, minute: i64) -> MatchRecord {
        let scores = match winner {
            Some(Side::A) => (3, 1),
            Some(Side::B) => (1, 3),
            None => (2, 2),
        };
        MatchRecord {
            id: Id::new(),
            mode: MatchMode::Local,
            player_a: player_a.to_owned(),
            player_b: player_b.to_owned(),
            scores,
            draws: 0,
            rounds: scores.0 + scores.1,
            winner,
            end_condition: EndCondition::default(),
            finished_at: DateTime::<Utc>::UNIX_EPOCH + Duration::minutes(minute),
        }
    }

    fn names(standings: &[Standing]) -> Vec<&str> {
        standings.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_empty_store_queries_are_empty() {
        let leaderboard = Leaderboard::new();
        assert!(leaderboard.is_empty());
        assert!(leaderboard.recent_history(5).is_empty());
        assert!(leaderboard.top_players(5, OrderBy::Wins).is_empty());
        assert!(leaderboard.standing("Alice").is_none());
    }

    #[test]
    fn test_recent_history_is_newest_first() {
        let mut leaderboard = Leaderboard::new();
        let records: Vec<MatchRecord> = (0..4)
            .map(|i| record("Alice", "Bob", Some(Side::A), i))
            .collect();
        for r in records.iter().cloned() {
            leaderboard.append(r);
        }

        let recent = leaderboard.recent_history(2);
        assert_eq!(recent, vec![&records[3], &records[2]]);
        assert_eq!(leaderboard.recent_history(10).len(), 4);
    }

    #[test]
    fn test_top_players_by_wins() {
        let mut leaderboard = Leaderboard::new();
        leaderboard.append(record("Alice", "Bob", Some(Side::A), 0));
        leaderboard.append(record("Alice", "Carol", Some(Side::A), 1));
        leaderboard.append(record("Carol", "Bob", Some(Side::A), 2));
        leaderboard.append(record("Bob", "Dave", None, 3));

        let top = leaderboard.top_players(10, OrderBy::Wins);
        assert_eq!(top[0].name, "Alice");
        assert_eq!(top[0].wins, 2);
        assert_eq!(names(&top[1..2]), vec!["Carol"]);
        assert_eq!(leaderboard.top_players(1, OrderBy::Wins).len(), 1);

        let bob = leaderboard.standing("Bob").unwrap();
        assert_eq!((bob.wins, bob.losses, bob.draws), (0, 2, 1));
    }

    #[test]
    fn test_ties_go_to_most_recent_player() {
        let mut leaderboard = Leaderboard::new();
        leaderboard.append(record("Alice", "Bob", Some(Side::A), 0));
        leaderboard.append(record("Carol", "Dave", Some(Side::A), 1));

        let top = leaderboard.top_players(2, OrderBy::Wins);
        assert_eq!(names(&top), vec!["Carol", "Alice"]);

        // Alice plays again (a draw), which makes her the most recent.
        leaderboard.append(record("Alice", "Erin", None, 2));
        let top = leaderboard.top_players(2, OrderBy::Wins);
        assert_eq!(names(&top), vec!["Alice", "Carol"]);
    }

    #[test]
    fn test_players_of_a_drawn_match_rank_by_name() {
        for _ in 0..20 {
            let mut leaderboard = Leaderboard::new();
            leaderboard.append(record("Bob", "Alice", None, 0));
            assert_eq!(names(&leaderboard.top_players(1, OrderBy::Wins)), vec!["Alice"]);
            assert_eq!(
                names(&leaderboard.top_players(2, OrderBy::WinRate)),
                vec!["Alice", "Bob"]
            );
        }
    }

    #[test]
    fn test_top_players_by_win_rate() {
        let mut leaderboard = Leaderboard::new();
        leaderboard.append(record("Alice", "Bob", Some(Side::A), 0));
        leaderboard.append(record("Alice", "Bob", Some(Side::B), 1));
        leaderboard.append(record("Carol", "Dave", Some(Side::A), 2));

        let top = leaderboard.top_players(3, OrderBy::WinRate);
        assert_eq!(top[0].name, "Carol");
        assert!((top[0].win_rate() - 1.0).abs() < f64::EPSILON);
        // Alice and Bob are level at 50%.
        assert!((top[1].win_rate() - 0.5).abs() < f64::EPSILON);
        assert!((top[2].win_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_database_write_through() {
        let database = Database::open_in_memory().unwrap();
        let mut leaderboard = Leaderboard::with_database(database).unwrap();
        let first = record("Alice", "Bob", Some(Side::A), 0);
        leaderboard.append(first.clone());

        let stored = leaderboard.database().unwrap().load_records().unwrap();
        assert_eq!(stored, vec![first]);
    }

    #[test]
    fn test_failed_write_still_appends() {
        let database = Database::open_in_memory().unwrap();
        let mut leaderboard = Leaderboard::with_database(database).unwrap();
        let first = record("Alice", "Bob", Some(Side::A), 0);
        leaderboard.append(first.clone());
        // Same id again: the insert fails but the append does not.
        leaderboard.append(first);
        assert_eq!(leaderboard.len(), 2);
        assert_eq!(
            leaderboard.database().unwrap().load_records().unwrap().len(),
            1
        );
    }
}
