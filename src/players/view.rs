use axum::extract::Path;
use hypertext::prelude::*;

use crate::{
    auth::User,
    permission::Permission,
    players::Player,
    state::Conn,
    teams::Team,
    template::{Page, Section},
    util_resp::{StandardResponse, success},
    widgets::{actions::Actions, swatch::ColorSwatch},
};

pub async fn view_player_page(
    Path(player_id): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    let player = Player::fetch(&player_id, &mut *conn)?;
    let team = Team::fetch(&player.team_id, &mut *conn)?;

    let edit_url = format!("/players/{}/edit", player.id);
    let actions: Vec<(&str, &str)> = if user.can(Permission::ManageSportingData)
    {
        vec![(&edit_url, "Edit")]
    } else {
        vec![]
    };

    success(
        Page::new()
            .user(user)
            .section(Section::Players)
            .body(maud! {
                h1 {
                    @if let Some(n) = player.jersey_number {
                        span class="text-muted" { "#" (n) " " }
                    }
                    (player.full_name())
                }
                dl class="row mt-3" {
                    dt class="col-sm-3" { "Team" }
                    dd class="col-sm-9" {
                        ColorSwatch
                            primary=(&team.primary_color)
                            secondary=(team.secondary_color.as_deref());
                        " "
                        a href=(format!("/teams/{}", team.id)) { (team.name) }
                    }
                    dt class="col-sm-3" { "Position" }
                    dd class="col-sm-9" { (player.position().label()) }
                    dt class="col-sm-3" { "Level" }
                    dd class="col-sm-9" { (player.level) " / 5" }
                    dt class="col-sm-3" { "Date of birth" }
                    dd class="col-sm-9" {
                        @if let Some(date) = player.birth_date {
                            (date.to_string())
                        } @else {
                            span class="text-muted" { "Unknown" }
                        }
                    }
                }
                Actions options=(actions.as_slice());
            })
            .render(),
    )
}
