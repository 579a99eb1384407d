use hypertext::prelude::*;

use crate::{
    auth::User,
    permission::Permission,
    players::Player,
    state::Conn,
    template::{Page, Section},
    util_resp::{StandardResponse, degrade, success},
    widgets::{actions::Actions, alert::InfoAlert},
};

pub async fn list_players_page(user: User, mut conn: Conn) -> StandardResponse {
    let players = degrade("players", Player::all_with_team(&mut *conn));
    let actions: &[(&str, &str)] = if user.can(Permission::ManageSportingData)
    {
        &[("/players/create", "Register a player")]
    } else {
        &[]
    };

    success(
        Page::new()
            .user(user)
            .section(Section::Players)
            .body(maud! {
                h1 { "Players" }
                Actions options=(actions);
                @if players.is_empty() {
                    InfoAlert msg="No players yet.";
                } @else {
                    table class="table table-hover" {
                        thead {
                            tr {
                                th scope="col" { "Name" }
                                th scope="col" { "Team" }
                                th scope="col" { "#" }
                                th scope="col" { "Position" }
                                th scope="col" { "Level" }
                            }
                        }
                        tbody {
                            @for (player, team) in &players {
                                tr {
                                    td {
                                        a href=(format!("/players/{}", player.id)) { (player.full_name()) }
                                    }
                                    td {
                                        a href=(format!("/teams/{}", player.team_id)) { (team) }
                                    }
                                    td {
                                        @if let Some(n) = player.jersey_number { (n) }
                                    }
                                    td { (player.position().label()) }
                                    td { (player.level) }
                                }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}
