use chrono::{NaiveDate, NaiveDateTime};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::Serialize;

use crate::{schema::tournaments, util_resp::FailureResponse};

pub mod create;
pub mod edit;
pub mod form;
pub mod list;
pub mod phases;
pub mod view;

#[derive(Queryable, Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub category: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub has_group_phase: bool,
    pub has_knockout_phase: bool,
    pub created_at: NaiveDateTime,
}

impl Tournament {
    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Tournament, FailureResponse> {
        tournaments::table
            .filter(tournaments::id.eq(id))
            .first::<Tournament>(conn)
            .optional()?
            .ok_or(FailureResponse::NotFound(()))
    }

    /// Most recent first.
    pub fn all(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<Tournament>> {
        tournaments::table
            .order_by((tournaments::start_date.desc(), tournaments::name.asc()))
            .load::<Tournament>(conn)
    }

    /// `(id, name)` pairs for select inputs.
    pub fn options(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<(String, String)>> {
        Ok(Self::all(conn)?
            .into_iter()
            .map(|t| (t.id, format!("{} ({})", t.name, t.category)))
            .collect())
    }

    pub fn format_label(&self) -> &'static str {
        match (self.has_group_phase, self.has_knockout_phase) {
            (true, true) => "Groups and knockout",
            (true, false) => "League",
            (false, true) => "Knockout",
            (false, false) => "No phases",
        }
    }

    pub fn dates_label(&self) -> String {
        match self.end_date {
            Some(end) => format!("{} – {}", self.start_date, end),
            None => format!("from {}", self.start_date),
        }
    }
}
