//! Cancha: an administration dashboard for indoor-soccer tournaments.
//!
//! The server renders HTML pages for tournaments, teams, players, matches,
//! standings and finances. Data lives in SQLite (through diesel) and every
//! request runs inside a single transaction (see [`state`]).

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod admin;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod finances;
pub mod matches;
pub mod msg;
pub mod permission;
pub mod players;
pub mod schema;
pub mod standings;
pub mod state;
pub mod teams;
pub mod template;
pub mod tournaments;
pub mod util_resp;
pub mod validation;
pub mod widgets;

#[cfg(test)]
mod test;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
