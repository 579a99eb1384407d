use std::collections::HashMap;

use axum::extract::Path;
use hypertext::prelude::*;

use crate::{
    auth::User,
    matches::{Match, list::MatchTable},
    permission::Permission,
    players::Player,
    state::Conn,
    teams::Team,
    template::{Page, Section},
    tournaments::Tournament,
    util_resp::{StandardResponse, degrade, success},
    widgets::{actions::Actions, alert::InfoAlert, swatch::ColorSwatch},
};

pub async fn view_team_page(
    Path(team_id): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    let team = Team::fetch(&team_id, &mut *conn)?;
    let tournament = Tournament::fetch(&team.tournament_id, &mut *conn)?;

    let director = match &team.director_id {
        Some(id) => degrade("team director", User::fetch(id, &mut *conn)),
        None => None,
    };
    let players = degrade("players", Player::of_team(&team.id, &mut *conn));
    let matches = degrade("matches", Match::of_team(&team.id, &mut *conn));
    let team_names: HashMap<String, String> = degrade(
        "team names",
        Team::of_tournament(&tournament.id, &mut *conn),
    )
    .into_iter()
    .map(|t| (t.id, t.name))
    .collect();

    let edit_url = format!("/teams/{}/edit", team.id);
    let add_player_url = format!("/players/create?team_id={}", team.id);
    let actions: Vec<(&str, &str)> = if user.can(Permission::ManageSportingData)
    {
        vec![(&edit_url, "Edit"), (&add_player_url, "Add player")]
    } else {
        vec![]
    };

    success(
        Page::new()
            .user(user)
            .section(Section::Teams)
            .body(maud! {
                div class="d-flex align-items-center gap-3" {
                    @if let Some(logo) = &team.logo_url {
                        img src=(logo) alt="" style="height: 3rem;";
                    }
                    h1 class="mb-0" { (team.name) }
                    ColorSwatch
                        primary=(&team.primary_color)
                        secondary=(team.secondary_color.as_deref());
                }
                dl class="row mt-3" {
                    dt class="col-sm-3" { "Tournament" }
                    dd class="col-sm-9" {
                        a href=(format!("/tournaments/{}", tournament.id)) { (tournament.name) }
                    }
                    dt class="col-sm-3" { "Category" }
                    dd class="col-sm-9" { (team.category) }
                    dt class="col-sm-3" { "Level" }
                    dd class="col-sm-9" { (team.level) " / 5" }
                    dt class="col-sm-3" { "Director" }
                    dd class="col-sm-9" {
                        @if let Some(director) = &director {
                            (director.username)
                        } @else {
                            span class="text-muted" { "None" }
                        }
                    }
                }
                Actions options=(actions.as_slice());

                h2 class="h4" { "Squad" }
                @if players.is_empty() {
                    InfoAlert msg="No players are registered for this team.";
                } @else {
                    table class="table table-sm" {
                        thead {
                            tr {
                                th scope="col" { "#" }
                                th scope="col" { "Name" }
                                th scope="col" { "Position" }
                                th scope="col" { "Level" }
                            }
                        }
                        tbody {
                            @for player in &players {
                                tr {
                                    td {
                                        @if let Some(n) = player.jersey_number {
                                            (n)
                                        }
                                    }
                                    td {
                                        a href=(format!("/players/{}", player.id)) { (player.full_name()) }
                                    }
                                    td { (player.position().label()) }
                                    td { (player.level) }
                                }
                            }
                        }
                    }
                }

                h2 class="h4" { "Matches" }
                MatchTable matches=(matches.as_slice()) team_names=(&team_names);
            })
            .render(),
    )
}
