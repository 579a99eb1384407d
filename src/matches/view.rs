use axum::extract::Path;
use hypertext::prelude::*;

use crate::{
    auth::User,
    matches::{Match, MatchStatus, outcome::MatchOutcome},
    permission::Permission,
    state::Conn,
    teams::Team,
    template::{Page, Section},
    tournaments::{
        Tournament,
        phases::{KnockoutStage, Matchday, PhaseRef},
    },
    util_resp::{StandardResponse, degrade, success},
    widgets::{actions::Actions, swatch::ColorSwatch},
};

pub async fn view_match_page(
    Path(match_id): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    let m = Match::fetch(&match_id, &mut *conn)?;
    let tournament = Tournament::fetch(&m.tournament_id, &mut *conn)?;
    let team_1 = Team::fetch(&m.team_1_id, &mut *conn)?;
    let team_2 = Team::fetch(&m.team_2_id, &mut *conn)?;

    let phase_label = match PhaseRef::of_match(&m) {
        PhaseRef::Group { matchday_id } => degrade(
            "matchdays",
            Matchday::of_tournament(&tournament.id, &mut *conn),
        )
        .into_iter()
        .find(|md| md.id == matchday_id)
        .map(|md| md.label()),
        PhaseRef::Knockout { stage_id } => degrade(
            "knockout stages",
            KnockoutStage::of_tournament(&tournament.id, &mut *conn),
        )
        .into_iter()
        .find(|s| s.id == stage_id)
        .map(|s| s.name),
        PhaseRef::Unassigned => None,
    };

    let outcome = m.outcome();
    let winner = outcome.as_ref().and_then(MatchOutcome::winner).map(|side| {
        if side.team_id(&m) == team_1.id {
            team_1.name.clone()
        } else {
            team_2.name.clone()
        }
    });
    let finalized = m.status() == MatchStatus::Finalized;

    let can_manage = user.can(Permission::ManageSportingData);
    let edit_url = format!("/matches/{}/edit", m.id);
    let result_url = format!("/matches/{}/result", m.id);
    let actions: Vec<(&str, &str)> = if can_manage {
        vec![
            (&edit_url, "Edit"),
            (
                &result_url,
                if finalized { "Correct result" } else { "Record result" },
            ),
        ]
    } else {
        vec![]
    };

    success(
        Page::new()
            .user(user)
            .section(Section::Matches)
            .body(maud! {
                p class="text-muted mb-1" {
                    a href=(format!("/tournaments/{}", tournament.id)) { (tournament.name) }
                    @if let Some(label) = &phase_label {
                        " · " (label)
                    }
                }
                div class="d-flex align-items-center gap-3 my-3" {
                    ColorSwatch
                        primary=(&team_1.primary_color)
                        secondary=(team_1.secondary_color.as_deref());
                    a class="fs-3" href=(format!("/teams/{}", team_1.id)) { (team_1.name) }
                    span class="fs-3 fw-bold" { (m.score_label()) }
                    a class="fs-3" href=(format!("/teams/{}", team_2.id)) { (team_2.name) }
                    ColorSwatch
                        primary=(&team_2.primary_color)
                        secondary=(team_2.secondary_color.as_deref());
                }
                dl class="row" {
                    dt class="col-sm-3" { "Status" }
                    dd class="col-sm-9" { (m.status().as_str()) }
                    @if finalized {
                        dt class="col-sm-3" { "Winner" }
                        dd class="col-sm-9" {
                            @if let Some(winner) = &winner {
                                (winner)
                            } @else {
                                "Draw"
                            }
                        }
                    }
                    dt class="col-sm-3" { "Kick-off" }
                    dd class="col-sm-9" {
                        @if let Some(at) = m.scheduled_at {
                            (at.format("%Y-%m-%d %H:%M").to_string())
                        } @else {
                            "To be confirmed"
                        }
                    }
                    dt class="col-sm-3" { "Venue" }
                    dd class="col-sm-9" { (m.venue.as_deref().unwrap_or("-")) }
                    dt class="col-sm-3" { "Referee" }
                    dd class="col-sm-9" { (m.referee.as_deref().unwrap_or("-")) }
                }
                Actions options=(actions.as_slice());
                @if can_manage && finalized {
                    form method="post" action=(format!("/matches/{}/result/clear", m.id)) {
                        button type="submit" class="btn btn-outline-danger" {
                            "Clear result"
                        }
                    }
                }
            })
            .render(),
    )
}
