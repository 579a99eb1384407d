use std::{
    any::Any,
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    Router,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use diesel::{
    SqliteConnection,
    connection::SimpleConnection,
    r2d2::{ConnectionManager, CustomizeConnection, Pool},
};
use diesel_migrations::MigrationHarness;
use hypertext::prelude::*;
use serde::Deserialize;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{
    MIGRATIONS,
    admin::users::{do_set_role, list_users_page},
    auth::{
        login::{do_login, login_page},
        logout::do_logout,
        register::{do_register, register_page},
        session::handle_sessions,
    },
    dashboard::dashboard_page,
    finances::{
        create::{create_transaction_page, do_create_transaction},
        edit::{do_edit_transaction, edit_transaction_page},
        export::export_transactions_csv,
        list::list_transactions_page,
    },
    matches::{
        create::{create_match_page, do_create_match},
        edit::{do_edit_match, edit_match_page},
        list::list_matches_page,
        result::{do_clear_result, do_record_result, record_result_page},
        view::view_match_page,
    },
    players::{
        create::{create_player_page, do_create_player},
        edit::{do_edit_player, edit_player_page},
        list::list_players_page,
        view::view_player_page,
    },
    standings::view::{standings_page, standings_updates},
    state::{AppState, DbPool, commit_transactions},
    teams::{
        create::{create_team_page, do_create_team},
        edit::{do_edit_team, edit_team_page},
        list::list_teams_page,
        view::view_team_page,
    },
    template::Page,
    tournaments::{
        create::{create_tournament_page, do_create_tournament},
        edit::{do_edit_tournament, edit_tournament_page},
        list::list_tournaments_page,
        phases::manage::{do_create_knockout_stage, do_create_matchday},
        view::view_tournament_page,
    },
    util_resp::FailureResponse,
    widgets::alert::ErrorAlert,
};

/// Points and awarded scores used when building the league table.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ScoringConfig {
    pub points_win: i64,
    pub points_draw: i64,
    pub points_loss: i64,
    /// Goals credited to the opponent of a team which forfeits, does not
    /// turn up, or is sanctioned.
    pub awarded_goals: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_win: 3,
            points_draw: 1,
            points_loss: 0,
            awarded_goals: 3,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
    /// At least 64 bytes. Sessions do not survive a restart without it.
    pub secret_key: Option<String>,
    pub bind_addr: String,
    pub session_days: u64,
    pub scoring: ScoringConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: ":memory:".to_string(),
            secret_key: None,
            bind_addr: "127.0.0.1:8000".to_string(),
            session_days: 7,
            scoring: ScoringConfig::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read(PathBuf, std::io::Error),
    Parse(toml::de::Error),
    SecretKey,
    Pool(String),
    Migrations(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read(path, e) => {
                write!(f, "could not read {}: {e}", path.display())
            }
            ConfigError::Parse(e) => write!(f, "invalid configuration: {e}"),
            ConfigError::SecretKey => {
                write!(f, "the secret key must be at least 64 bytes long")
            }
            ConfigError::Pool(e) => {
                write!(f, "could not open the database: {e}")
            }
            ConfigError::Migrations(e) => {
                write!(f, "could not run migrations: {e}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    /// Reads the TOML file at `path` (if any), then applies the
    /// `DATABASE_URL`, `SECRET_KEY` and `BIND_ADDR` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
                toml::from_str::<AppConfig>(&text)
                    .map_err(ConfigError::Parse)?
            }
            None => AppConfig::default(),
        };

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(secret) = std::env::var("SECRET_KEY") {
            config.secret_key = Some(secret);
        }
        if let Ok(addr) = std::env::var("BIND_ADDR") {
            config.bind_addr = addr;
        }

        Ok(config)
    }
}

#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error>
    for SqlitePragmas
{
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn make_pool(db_url: &str) -> Result<DbPool, ConfigError> {
    Pool::builder()
        // every connection to `:memory:` is a distinct database
        .max_size(if db_url == ":memory:" { 1 } else { 10 })
        .connection_customizer(Box::new(SqlitePragmas))
        .build(ConnectionManager::<SqliteConnection>::new(db_url))
        .map_err(|e| ConfigError::Pool(e.to_string()))
}

pub fn run_migrations(pool: &DbPool) -> Result<(), ConfigError> {
    let mut conn = pool.get().map_err(|e| ConfigError::Pool(e.to_string()))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| ConfigError::Migrations(e.to_string()))?;
    tracing::info!(count = applied.len(), "applied pending migrations");
    Ok(())
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig) -> Result<Self, ConfigError> {
        let key = match &config.secret_key {
            Some(secret) => Key::try_from(secret.as_bytes())
                .map_err(|_| ConfigError::SecretKey)?,
            None => {
                tracing::warn!(
                    "no secret key configured; sessions will not survive a restart"
                );
                Key::generate()
            }
        };

        let (tx, _rx) = tokio::sync::broadcast::channel(1000);

        Ok(AppState {
            pool,
            key,
            config: Arc::new(config),
            tx,
        })
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!("handler panicked: {detail}");

    let body = Page::new()
        .body(maud! {
            ErrorAlert msg="Something went wrong while loading this page.";
            a class="btn btn-primary" href="" { "Try again" }
        })
        .render()
        .into_inner();

    (
        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        axum::response::Html(body),
    )
        .into_response()
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/login", get(login_page).post(do_login))
        .route("/register", get(register_page).post(do_register))
        .route("/logout", post(do_logout))
        .route("/tournaments", get(list_tournaments_page))
        .route(
            "/tournaments/create",
            get(create_tournament_page).post(do_create_tournament),
        )
        .route("/tournaments/:tid", get(view_tournament_page))
        .route(
            "/tournaments/:tid/edit",
            get(edit_tournament_page).post(do_edit_tournament),
        )
        .route("/tournaments/:tid/matchdays/create", post(do_create_matchday))
        .route(
            "/tournaments/:tid/stages/create",
            post(do_create_knockout_stage),
        )
        .route("/tournaments/:tid/standings", get(standings_page))
        .route("/tournaments/:tid/standings/live", get(standings_updates))
        .route("/teams", get(list_teams_page))
        .route("/teams/create", get(create_team_page).post(do_create_team))
        .route("/teams/:team_id", get(view_team_page))
        .route("/teams/:team_id/edit", get(edit_team_page).post(do_edit_team))
        .route("/players", get(list_players_page))
        .route(
            "/players/create",
            get(create_player_page).post(do_create_player),
        )
        .route("/players/:player_id", get(view_player_page))
        .route(
            "/players/:player_id/edit",
            get(edit_player_page).post(do_edit_player),
        )
        .route("/matches", get(list_matches_page))
        .route("/matches/create", get(create_match_page).post(do_create_match))
        .route("/matches/:match_id", get(view_match_page))
        .route(
            "/matches/:match_id/edit",
            get(edit_match_page).post(do_edit_match),
        )
        .route(
            "/matches/:match_id/result",
            get(record_result_page).post(do_record_result),
        )
        .route("/matches/:match_id/result/clear", post(do_clear_result))
        .route("/finances", get(list_transactions_page))
        .route("/finances/export.csv", get(export_transactions_csv))
        .route(
            "/finances/create",
            get(create_transaction_page).post(do_create_transaction),
        )
        .route(
            "/finances/:transaction_id/edit",
            get(edit_transaction_page).post(do_edit_transaction),
        )
        .route("/admin/users", get(list_users_page))
        .route("/admin/users/:user_id/role", post(do_set_role))
        .fallback(|| async { FailureResponse::NotFound(()) })
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(commit_transactions))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handle_sessions,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
