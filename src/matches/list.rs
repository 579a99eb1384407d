use std::collections::HashMap;

use hypertext::prelude::*;

use crate::{
    auth::User,
    matches::{Match, MatchStatus},
    permission::Permission,
    state::Conn,
    teams::Team,
    template::{Page, Section},
    util_resp::{StandardResponse, degrade, success},
    widgets::{actions::Actions, alert::InfoAlert},
};

/// Matches with their teams, score and status. Team ids missing from
/// `team_names` are shown as `?`.
pub struct MatchTable<'r> {
    pub matches: &'r [Match],
    pub team_names: &'r HashMap<String, String>,
}

impl Renderable for MatchTable<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let name = |id: &str| -> String {
            self.team_names
                .get(id)
                .cloned()
                .unwrap_or_else(|| "?".to_string())
        };
        maud! {
            @if self.matches.is_empty() {
                p class="text-muted" { "No matches." }
            } @else {
                table class="table table-sm align-middle" {
                    thead {
                        tr {
                            th scope="col" { "Kick-off" }
                            th scope="col" class="text-end" { "Home" }
                            th scope="col" class="text-center" { "Score" }
                            th scope="col" { "Away" }
                            th scope="col" { "Venue" }
                            th scope="col" {}
                        }
                    }
                    tbody {
                        @for m in self.matches {
                            tr {
                                td {
                                    @if let Some(at) = m.scheduled_at {
                                        (at.format("%Y-%m-%d %H:%M").to_string())
                                    } @else {
                                        span class="text-muted" { "TBC" }
                                    }
                                }
                                td class="text-end" { (name(&m.team_1_id)) }
                                td class="text-center fw-semibold" { (m.score_label()) }
                                td { (name(&m.team_2_id)) }
                                td { (m.venue.as_deref().unwrap_or("")) }
                                td {
                                    a href=(format!("/matches/{}", m.id)) {
                                        @if m.status() == MatchStatus::Finalized {
                                            "Details"
                                        } @else {
                                            "Open"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

pub async fn list_matches_page(user: User, mut conn: Conn) -> StandardResponse {
    let matches = degrade("matches", Match::all(&mut *conn));
    let team_names = degrade("team names", Team::names(&mut *conn));

    let (played, upcoming): (Vec<Match>, Vec<Match>) = matches
        .into_iter()
        .partition(|m| m.status() == MatchStatus::Finalized);

    let actions: &[(&str, &str)] = if user.can(Permission::ManageSportingData)
    {
        &[("/matches/create", "Schedule a match")]
    } else {
        &[]
    };

    success(
        Page::new()
            .user(user)
            .section(Section::Matches)
            .body(maud! {
                h1 { "Matches" }
                Actions options=(actions);
                @if played.is_empty() && upcoming.is_empty() {
                    InfoAlert msg="No matches have been scheduled.";
                } @else {
                    h2 class="h4" { "Upcoming" }
                    MatchTable matches=(upcoming.as_slice()) team_names=(&team_names);
                    h2 class="h4" { "Results" }
                    MatchTable matches=(played.as_slice()) team_names=(&team_names);
                }
            })
            .render(),
    )
}
