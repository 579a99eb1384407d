use hypertext::prelude::*;

use crate::{
    auth::User,
    permission::Permission,
    state::Conn,
    template::{Page, Section},
    tournaments::Tournament,
    util_resp::{StandardResponse, degrade, success},
    widgets::{actions::Actions, alert::InfoAlert},
};

pub async fn list_tournaments_page(
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    let tournaments = degrade("tournaments", Tournament::all(&mut *conn));
    let actions: &[(&str, &str)] =
        if user.can(Permission::ManageSportingData) {
            &[("/tournaments/create", "New tournament")]
        } else {
            &[]
        };

    success(
        Page::new()
            .user(user)
            .section(Section::Tournaments)
            .body(maud! {
                h1 { "Tournaments" }
                Actions options=(actions);
                @if tournaments.is_empty() {
                    InfoAlert msg="No tournaments yet.";
                } @else {
                    table class="table table-hover" {
                        thead {
                            tr {
                                th scope="col" { "Name" }
                                th scope="col" { "Category" }
                                th scope="col" { "Format" }
                                th scope="col" { "Dates" }
                            }
                        }
                        tbody {
                            @for t in &tournaments {
                                tr {
                                    td {
                                        a href=(format!("/tournaments/{}", t.id)) { (t.name) }
                                    }
                                    td { (t.category) }
                                    td { (t.format_label()) }
                                    td { (t.dates_label()) }
                                }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}
