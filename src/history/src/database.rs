use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use common::model::{
    game::Side,
    id::Id,
    record::{EndCondition, MatchMode, MatchRecord, PlayerStats},
};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Result, StoreError};

const SCHEMA: &str = include_str!("../../../sql/create_tables.sql");

pub struct Database {
    connection: Connection,
}

// Column values as stored, before parsing back into model types.
struct StoredRecord {
    id: String,
    mode: String,
    player_1_name: String,
    player_2_name: String,
    player_1_score: u32,
    player_2_score: u32,
    draws: u32,
    rounds: u32,
    winner: Option<String>,
    end_condition: String,
    finished_at: String,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        debug!("Opening database at {:?}", path.as_ref());
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(connection: Connection) -> Result<Self> {
        connection.execute_batch(SCHEMA)?;
        Ok(Database { connection })
    }

    pub fn save_record(&self, record: &MatchRecord) -> Result<()> {
        let winner = record.winner.map(|side| match side {
            Side::A => "A",
            Side::B => "B",
        });
        self.connection.execute(
            "INSERT INTO match_results (
                id,
                mode,
                player_1_name,
                player_2_name,
                player_1_score,
                player_2_score,
                draws,
                rounds,
                winner,
                end_condition,
                finished_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.id.to_string(),
                record.mode.to_string(),
                record.player_a,
                record.player_b,
                record.scores.0,
                record.scores.1,
                record.draws,
                record.rounds,
                winner,
                serde_json::to_string(&record.end_condition)?,
                record.finished_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            ],
        )?;
        Ok(())
    }

    // All records in the order they were saved.
    pub fn load_records(&self) -> Result<Vec<MatchRecord>> {
        let mut statement = self.connection.prepare(
            "SELECT id, mode, player_1_name, player_2_name, player_1_score, player_2_score,
                    draws, rounds, winner, end_condition, finished_at
             FROM match_results ORDER BY rowid",
        )?;
        let rows = statement.query_map([], |row| {
            Ok(StoredRecord {
                id: row.get(0)?,
                mode: row.get(1)?,
                player_1_name: row.get(2)?,
                player_2_name: row.get(3)?,
                player_1_score: row.get(4)?,
                player_2_score: row.get(5)?,
                draws: row.get(6)?,
                rounds: row.get(7)?,
                winner: row.get(8)?,
                end_condition: row.get(9)?,
                finished_at: row.get(10)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(Self::parse_record(row?)?);
        }
        Ok(records)
    }

    fn parse_record(stored: StoredRecord) -> Result<MatchRecord> {
        let id = Id::parse(&stored.id).map_err(|_| StoreError::Malformed {
            column: "id",
            value: stored.id.clone(),
        })?;
        let mode: MatchMode = stored.mode.parse().map_err(|_| StoreError::Malformed {
            column: "mode",
            value: stored.mode.clone(),
        })?;
        let winner = match stored.winner.as_deref() {
            None => None,
            Some("A") => Some(Side::A),
            Some("B") => Some(Side::B),
            Some(other) => {
                return Err(StoreError::Malformed {
                    column: "winner",
                    value: other.to_owned(),
                })
            }
        };
        let end_condition: EndCondition = serde_json::from_str(&stored.end_condition)?;
        let finished_at = DateTime::parse_from_rfc3339(&stored.finished_at)?.with_timezone(&Utc);

        Ok(MatchRecord {
            id,
            mode,
            player_a: stored.player_1_name,
            player_b: stored.player_2_name,
            scores: (stored.player_1_score, stored.player_2_score),
            draws: stored.draws,
            rounds: stored.rounds,
            winner,
            end_condition,
            finished_at,
        })
    }

    pub fn save_player(&self, stats: &PlayerStats) -> Result<()> {
        self.connection.execute(
            "INSERT INTO player_stats (name, wins, losses, draws) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET
                wins = excluded.wins,
                losses = excluded.losses,
                draws = excluded.draws",
            params![stats.name, stats.wins, stats.losses, stats.draws],
        )?;
        Ok(())
    }

    pub fn load_player(&self, name: &str) -> Result<Option<PlayerStats>> {
        let stats = self
            .connection
            .query_row(
                "SELECT name, wins, losses, draws FROM player_stats WHERE name = ?1",
                [name],
                |row| {
                    Ok(PlayerStats {
                        name: row.get(0)?,
                        wins: row.get(1)?,
                        losses: row.get(2)?,
                        draws: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(stats)
    }

    pub fn load_players(&self) -> Result<Vec<PlayerStats>> {
        let mut statement = self
            .connection
            .prepare("SELECT name, wins, losses, draws FROM player_stats ORDER BY name")?;
        let players = statement
            .query_map([], |row| {
                Ok(PlayerStats {
                    name: row.get(0)?,
                    wins: row.get(1)?,
                    losses: row.get(2)?,
                    draws: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(players)
    }
}
