use std::collections::HashMap;

use chrono::NaiveDateTime;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::Serialize;

use crate::{
    schema::{teams, tournaments},
    util_resp::FailureResponse,
};

pub mod create;
pub mod edit;
pub mod form;
pub mod list;
pub mod view;

#[derive(Queryable, Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Team {
    pub id: String,
    pub tournament_id: String,
    pub name: String,
    pub category: String,
    pub primary_color: String,
    pub secondary_color: Option<String>,
    /// 1 (recreational) to 5 (competitive).
    pub level: i64,
    /// The dirigente responsible for the team.
    pub director_id: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Team {
    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Team, FailureResponse> {
        teams::table
            .filter(teams::id.eq(id))
            .first::<Team>(conn)
            .optional()?
            .ok_or(FailureResponse::NotFound(()))
    }

    pub fn of_tournament(
        tid: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<Team>> {
        teams::table
            .filter(teams::tournament_id.eq(tid))
            .order_by((teams::name.asc(), teams::id.asc()))
            .load::<Team>(conn)
    }

    /// Every team, with the name of its tournament.
    pub fn all_with_tournament(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<(Team, String)>> {
        teams::table
            .inner_join(tournaments::table)
            .order_by((tournaments::start_date.desc(), teams::name.asc()))
            .select((teams::all_columns, tournaments::name))
            .load::<(Team, String)>(conn)
    }

    /// `(id, "team (tournament)")` pairs for select inputs.
    pub fn options(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<(String, String)>> {
        Ok(Self::all_with_tournament(conn)?
            .into_iter()
            .map(|(team, tournament)| {
                (team.id, format!("{} ({tournament})", team.name))
            })
            .collect())
    }

    /// Team names by id.
    pub fn names(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<HashMap<String, String>> {
        Ok(teams::table
            .select((teams::id, teams::name))
            .load::<(String, String)>(conn)?
            .into_iter()
            .collect())
    }
}
