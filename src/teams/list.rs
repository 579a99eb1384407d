use hypertext::prelude::*;

use crate::{
    auth::User,
    permission::Permission,
    state::Conn,
    teams::Team,
    template::{Page, Section},
    util_resp::{StandardResponse, degrade, success},
    widgets::{actions::Actions, alert::InfoAlert, swatch::ColorSwatch},
};

pub async fn list_teams_page(user: User, mut conn: Conn) -> StandardResponse {
    let teams = degrade("teams", Team::all_with_tournament(&mut *conn));
    let actions: &[(&str, &str)] = if user.can(Permission::ManageSportingData)
    {
        &[("/teams/create", "Register a team")]
    } else {
        &[]
    };

    success(
        Page::new()
            .user(user)
            .section(Section::Teams)
            .body(maud! {
                h1 { "Teams" }
                Actions options=(actions);
                @if teams.is_empty() {
                    InfoAlert msg="No teams yet.";
                } @else {
                    table class="table table-hover" {
                        thead {
                            tr {
                                th scope="col" { "Team" }
                                th scope="col" { "Tournament" }
                                th scope="col" { "Category" }
                                th scope="col" { "Level" }
                            }
                        }
                        tbody {
                            @for (team, tournament) in &teams {
                                tr {
                                    td {
                                        ColorSwatch
                                            primary=(&team.primary_color)
                                            secondary=(team.secondary_color.as_deref());
                                        " "
                                        a href=(format!("/teams/{}", team.id)) { (team.name) }
                                    }
                                    td {
                                        a href=(format!("/tournaments/{}", team.tournament_id)) { (tournament) }
                                    }
                                    td { (team.category) }
                                    td { (team.level) }
                                }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}
