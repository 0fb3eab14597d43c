use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::{
    database::Database,
    store::{Leaderboard, OrderBy},
};

pub const DEFAULT_LIMIT: usize = 10;

#[derive(Clone)]
struct ApiState {
    db_url: String,
}

#[derive(Deserialize, Debug)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
    pub order_by: Option<OrderBy>,
}

#[derive(Deserialize, Debug)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

// Read-only routes over the match database. Each request opens its own
// connection, so the game can keep writing to the same file.
pub fn router(db_url: String) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/leaderboard", get(leaderboard))
        .route("/history", get(history))
        .route("/players/{name}", get(player))
        .layer(TraceLayer::new_for_http())
        .with_state(ApiState { db_url })
}

async fn root() -> &'static str {
    "Rock, paper, scissors!"
}

fn load(db_url: &str) -> crate::error::Result<Leaderboard> {
    Leaderboard::with_database(Database::open(db_url)?)
}

fn internal_error(e: impl std::fmt::Display) -> Response {
    error!("History query failed: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
}

async fn leaderboard(
    State(state): State<ApiState>,
    Query(query): Query<LeaderboardQuery>,
) -> Response {
    debug!("GET /leaderboard {:?}", query);
    match load(&state.db_url) {
        Ok(leaderboard) => Json(leaderboard.top_players(
            query.limit.unwrap_or(DEFAULT_LIMIT),
            query.order_by.unwrap_or_default(),
        ))
        .into_response(),
        Err(e) => internal_error(e),
    }
}

async fn history(State(state): State<ApiState>, Query(query): Query<HistoryQuery>) -> Response {
    debug!("GET /history {:?}", query);
    match load(&state.db_url) {
        Ok(leaderboard) => {
            Json(leaderboard.recent_history(query.limit.unwrap_or(DEFAULT_LIMIT))).into_response()
        }
        Err(e) => internal_error(e),
    }
}

async fn player(State(state): State<ApiState>, Path(name): Path<String>) -> Response {
    debug!("GET /players/{}", name);
    let stats = Database::open(&state.db_url).and_then(|database| database.load_player(&name));
    match stats {
        Ok(Some(stats)) => Json(stats).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, format!("no player named {name:?}")).into_response(),
        Err(e) => internal_error(e),
    }
}
