use std::collections::HashMap;

use axum::extract::Path;
use hypertext::prelude::*;

use crate::{
    auth::User,
    matches::{Match, list::MatchTable},
    permission::Permission,
    state::Conn,
    teams::Team,
    template::{Page, Section, form::TextInput},
    tournaments::{
        Tournament,
        phases::{KnockoutStage, Matchday, partition},
    },
    util_resp::{StandardResponse, degrade, success},
    validation::FormErrors,
    widgets::{actions::Actions, swatch::ColorSwatch},
};

pub async fn view_tournament_page(
    Path(tid): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    let tournament = Tournament::fetch(&tid, &mut *conn)?;

    let teams = degrade("teams", Team::of_tournament(&tid, &mut *conn));
    let matchdays =
        degrade("matchdays", Matchday::of_tournament(&tid, &mut *conn));
    let stages =
        degrade("knockout stages", KnockoutStage::of_tournament(&tid, &mut *conn));
    let matches = degrade("matches", Match::of_tournament(&tid, &mut *conn));

    let team_names: HashMap<String, String> = teams
        .iter()
        .map(|t| (t.id.clone(), t.name.clone()))
        .collect();
    let phases = partition(matches, &matchdays, &stages);

    let can_manage = user.can(Permission::ManageSportingData);
    let standings_url = format!("/tournaments/{tid}/standings");
    let edit_url = format!("/tournaments/{tid}/edit");
    let new_team_url = format!("/teams/create?tournament_id={tid}");
    let new_match_url = format!("/matches/create?tournament_id={tid}");
    let mut actions: Vec<(&str, &str)> = Vec::new();
    if tournament.has_group_phase {
        actions.push((&standings_url, "Standings"));
    }
    if can_manage {
        actions.push((&edit_url, "Edit"));
        actions.push((&new_team_url, "Add team"));
        actions.push((&new_match_url, "Schedule match"));
    }

    let no_errors = FormErrors::new();
    let next_matchday = (phases.group.len() + 1).to_string();
    let next_stage = (phases.knockout.len() + 1).to_string();

    success(
        Page::new()
            .user(user)
            .section(Section::Tournaments)
            .body(maud! {
                h1 {
                    (tournament.name) " "
                    span class="badge text-bg-secondary align-middle fs-6" {
                        (tournament.category)
                    }
                }
                p class="text-muted" {
                    (tournament.format_label()) ", " (tournament.dates_label())
                }
                Actions options=(&actions);

                div class="card mb-4" {
                    div class="card-header" { h5 class="card-title mb-0" { "Teams" } }
                    div class="card-body" {
                        @if teams.is_empty() {
                            p class="text-muted mb-0" { "No teams have registered." }
                        } @else {
                            ul class="list-unstyled mb-0" {
                                @for team in &teams {
                                    li {
                                        ColorSwatch
                                            primary=(&team.primary_color)
                                            secondary=(team.secondary_color.as_deref());
                                        " "
                                        a href=(format!("/teams/{}", team.id)) { (team.name) }
                                    }
                                }
                            }
                        }
                    }
                }

                @if tournament.has_group_phase {
                    div class="card mb-4" {
                        div class="card-header" { h5 class="card-title mb-0" { "Group phase" } }
                        div class="card-body" {
                            @for (matchday, ms) in &phases.group {
                                h3 class="h6 mt-2" {
                                    (matchday.label())
                                    @if let Some(date) = matchday.date {
                                        span class="text-muted" { " · " (date.to_string()) }
                                    }
                                }
                                MatchTable matches=(ms.as_slice()) team_names=(&team_names);
                            }
                            @if can_manage {
                                form method="post"
                                    action=(format!("/tournaments/{}/matchdays/create", tournament.id))
                                    class="row g-2 mt-2" {
                                    div class="col-md-2" {
                                        (TextInput::new("Number", "number", &next_matchday, &no_errors).kind("number"))
                                    }
                                    div class="col-md-5" {
                                        (TextInput::new("Name (optional)", "name", "", &no_errors))
                                    }
                                    div class="col-md-3" {
                                        (TextInput::new("Date (optional)", "date", "", &no_errors).kind("date"))
                                    }
                                    div class="col-md-2 d-flex align-items-center" {
                                        button type="submit" class="btn btn-outline-primary" { "Add matchday" }
                                    }
                                }
                            }
                        }
                    }
                }

                @if tournament.has_knockout_phase {
                    div class="card mb-4" {
                        div class="card-header" { h5 class="card-title mb-0" { "Knockout phase" } }
                        div class="card-body" {
                            @for (stage, ms) in &phases.knockout {
                                h3 class="h6 mt-2" { (stage.name) }
                                MatchTable matches=(ms.as_slice()) team_names=(&team_names);
                            }
                            @if can_manage {
                                form method="post"
                                    action=(format!("/tournaments/{}/stages/create", tournament.id))
                                    class="row g-2 mt-2" {
                                    div class="col-md-6" {
                                        (TextInput::new("Stage name", "name", "", &no_errors)
                                            .help("For example \"Quarter-finals\"."))
                                    }
                                    div class="col-md-3" {
                                        (TextInput::new("Position", "position", &next_stage, &no_errors).kind("number"))
                                    }
                                    div class="col-md-3 d-flex align-items-center" {
                                        button type="submit" class="btn btn-outline-primary" { "Add stage" }
                                    }
                                }
                            }
                        }
                    }
                }

                @if !phases.unassigned.is_empty() {
                    div class="card mb-4" {
                        div class="card-header" { h5 class="card-title mb-0" { "Not yet assigned to a phase" } }
                        div class="card-body" {
                            MatchTable matches=(phases.unassigned.as_slice()) team_names=(&team_names);
                        }
                    }
                }
            })
            .render(),
    )
}
