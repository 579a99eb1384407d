use chrono::{NaiveDate, NaiveDateTime};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::Serialize;

use crate::{
    schema::{players, teams},
    util_resp::FailureResponse,
};

pub mod create;
pub mod edit;
pub mod form;
pub mod list;
pub mod view;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    Goalkeeper,
    Defender,
    Winger,
    Pivot,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Winger,
        Position::Pivot,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Position::Goalkeeper => "goalkeeper",
            Position::Defender => "defender",
            Position::Winger => "winger",
            Position::Pivot => "pivot",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Goalkeeper => "Goalkeeper",
            Position::Defender => "Defender",
            Position::Winger => "Winger",
            Position::Pivot => "Pivot",
        }
    }

    pub fn parse(s: &str) -> Option<Position> {
        Position::ALL.into_iter().find(|p| p.as_str() == s)
    }

    pub fn options() -> Vec<(String, String)> {
        Position::ALL
            .into_iter()
            .map(|p| (p.as_str().to_string(), p.label().to_string()))
            .collect()
    }
}

#[derive(Queryable, Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub team_id: String,
    pub first_name: String,
    pub last_name: String,
    pub jersey_number: Option<i64>,
    pub position: String,
    pub level: i64,
    pub birth_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

impl Player {
    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Player, FailureResponse> {
        players::table
            .filter(players::id.eq(id))
            .first::<Player>(conn)
            .optional()?
            .ok_or(FailureResponse::NotFound(()))
    }

    /// Ordered by shirt number, unnumbered players last.
    pub fn of_team(
        team_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<Player>> {
        let mut players = players::table
            .filter(players::team_id.eq(team_id))
            .order_by((players::last_name.asc(), players::first_name.asc()))
            .load::<Player>(conn)?;
        players.sort_by_key(|p| p.jersey_number.unwrap_or(i64::MAX));
        Ok(players)
    }

    /// Every player, with the name of their team.
    pub fn all_with_team(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<(Player, String)>> {
        players::table
            .inner_join(teams::table)
            .order_by((
                teams::name.asc(),
                players::last_name.asc(),
                players::first_name.asc(),
            ))
            .select((players::all_columns, teams::name))
            .load::<(Player, String)>(conn)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Unknown position strings read as outfield defenders.
    pub fn position(&self) -> Position {
        Position::parse(&self.position).unwrap_or(Position::Defender)
    }
}
