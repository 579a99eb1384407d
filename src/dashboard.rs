//! The landing page: headline counts and the latest results.

use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use hypertext::prelude::*;

use crate::{
    auth::User,
    matches::{Match, MatchStatus, list::MatchTable},
    schema::{matches, players, teams, tournaments},
    state::Conn,
    teams::Team,
    template::{Page, Section},
    util_resp::{StandardResponse, degrade, success},
    widgets::card::StatCard,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub tournaments: i64,
    pub teams: i64,
    pub players: i64,
    pub upcoming_matches: i64,
}

impl Counts {
    pub fn load(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Counts> {
        Ok(Counts {
            tournaments: tournaments::table.count().get_result(conn)?,
            teams: teams::table.count().get_result(conn)?,
            players: players::table.count().get_result(conn)?,
            upcoming_matches: matches::table
                .filter(matches::status.eq(MatchStatus::Scheduled.as_str()))
                .count()
                .get_result(conn)?,
        })
    }
}

pub async fn dashboard_page(user: User, mut conn: Conn) -> StandardResponse {
    let counts = degrade("dashboard counts", Counts::load(&mut *conn));
    let recent = degrade("recent results", Match::recent_results(8, &mut *conn));
    let team_names = degrade("team names", Team::names(&mut *conn));

    success(
        Page::new()
            .user(user)
            .section(Section::Dashboard)
            .body(maud! {
                h1 class="mb-4" { "Dashboard" }
                div class="row" {
                    StatCard label="Tournaments" value=(counts.tournaments) href="/tournaments";
                    StatCard label="Teams" value=(counts.teams) href="/teams";
                    StatCard label="Players" value=(counts.players) href="/players";
                    StatCard label="Upcoming matches" value=(counts.upcoming_matches) href="/matches";
                }
                h2 class="h4 mt-3" { "Recent results" }
                MatchTable matches=(recent.as_slice()) team_names=(&team_names);
            })
            .render(),
    )
}
