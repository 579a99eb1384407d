//! Fixtures between two teams of a tournament, and their results.

use chrono::NaiveDateTime;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::Serialize;

use crate::{
    matches::outcome::MatchOutcome, schema::matches,
    util_resp::FailureResponse,
};

pub mod create;
pub mod edit;
pub mod form;
pub mod list;
pub mod outcome;
pub mod result;
pub mod view;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchStatus {
    Scheduled,
    Finalized,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Finalized => "finalized",
        }
    }
}

#[derive(Queryable, Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Match {
    pub id: String,
    pub tournament_id: String,
    pub team_1_id: String,
    pub team_2_id: String,
    pub matchday_id: Option<String>,
    pub knockout_stage_id: Option<String>,
    pub referee: Option<String>,
    pub scheduled_at: Option<NaiveDateTime>,
    pub venue: Option<String>,
    pub status: String,
    pub outcome: Option<String>,
    pub goals_1: Option<i64>,
    pub goals_2: Option<i64>,
    pub penalties_1: Option<i64>,
    pub penalties_2: Option<i64>,
    pub affected_team_id: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Match {
    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Match, FailureResponse> {
        matches::table
            .filter(matches::id.eq(id))
            .first::<Match>(conn)
            .optional()?
            .ok_or(FailureResponse::NotFound(()))
    }

    pub fn of_tournament(
        tid: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<Match>> {
        matches::table
            .filter(matches::tournament_id.eq(tid))
            .order_by((matches::scheduled_at.asc(), matches::id.asc()))
            .load::<Match>(conn)
    }

    pub fn of_team(
        team_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<Match>> {
        matches::table
            .filter(
                matches::team_1_id
                    .eq(team_id)
                    .or(matches::team_2_id.eq(team_id)),
            )
            .order_by((matches::scheduled_at.asc(), matches::id.asc()))
            .load::<Match>(conn)
    }

    pub fn all(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<Match>> {
        matches::table
            .order_by((matches::scheduled_at.desc(), matches::id.desc()))
            .load::<Match>(conn)
    }

    /// The most recently played matches which have a result.
    pub fn recent_results(
        limit: i64,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<Match>> {
        matches::table
            .filter(matches::status.eq(MatchStatus::Finalized.as_str()))
            .order_by((matches::scheduled_at.desc(), matches::id.desc()))
            .limit(limit)
            .load::<Match>(conn)
    }

    /// Unknown status strings read as scheduled.
    pub fn status(&self) -> MatchStatus {
        match self.status.as_str() {
            "finalized" => MatchStatus::Finalized,
            _ => MatchStatus::Scheduled,
        }
    }

    /// The stored result, if the match has been played.
    pub fn outcome(&self) -> Option<MatchOutcome> {
        match self.status() {
            MatchStatus::Finalized => MatchOutcome::from_match(self),
            MatchStatus::Scheduled => None,
        }
    }

    /// e.g. `2 - 1`, `1 - 1 (4 - 3 pens)`, or `vs` before kick-off.
    pub fn score_label(&self) -> String {
        let Some(outcome) = self.outcome() else {
            return "vs".to_string();
        };
        let (g1, g2) = (self.goals_1.unwrap_or(0), self.goals_2.unwrap_or(0));
        match outcome {
            MatchOutcome::Regular { .. } => format!("{g1} - {g2}"),
            MatchOutcome::Shootout {
                penalties_1,
                penalties_2,
                ..
            } => format!("{g1} - {g2} ({penalties_1} - {penalties_2} pens)"),
            MatchOutcome::Awarded { kind, .. } => {
                format!("{g1} - {g2} ({})", kind.as_str())
            }
        }
    }

    #[cfg(test)]
    pub fn test_fixture(id: &str, team_1: &str, team_2: &str) -> Match {
        Match {
            id: id.to_string(),
            tournament_id: "t".to_string(),
            team_1_id: team_1.to_string(),
            team_2_id: team_2.to_string(),
            matchday_id: None,
            knockout_stage_id: None,
            referee: None,
            scheduled_at: None,
            venue: None,
            status: MatchStatus::Scheduled.as_str().to_string(),
            outcome: None,
            goals_1: None,
            goals_2: None,
            penalties_1: None,
            penalties_2: None,
            affected_team_id: None,
            created_at: chrono::NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }
}
