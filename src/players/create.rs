use axum::extract::{Form, Query};
use chrono::Utc;
use diesel::prelude::*;
use hypertext::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::User,
    permission::Permission,
    players::form::{PlayerForm, PlayerFormFields},
    schema::players,
    state::Conn,
    teams::Team,
    template::{Page, Section},
    util_resp::{StandardResponse, bad_request, degrade, see_other_ok, success},
    validation::FormErrors,
};

#[derive(Deserialize)]
pub struct CreatePlayerQuery {
    pub team_id: Option<String>,
}

fn create_form(
    user: User,
    form: &PlayerForm,
    errors: &FormErrors,
    conn: &mut Conn,
) -> Rendered<String> {
    let teams = degrade("teams", Team::options(&mut **conn));

    Page::new()
        .user(user)
        .section(Section::Players)
        .body(maud! {
            h1 { "Register a player" }
            form method="post" action="/players/create" {
                PlayerFormFields form=(form) errors=(errors) teams=(teams.as_slice());
                button type="submit" class="btn btn-primary" { "Create" }
            }
        })
        .render()
}

pub async fn create_player_page(
    user: User,
    mut conn: Conn,
    Query(query): Query<CreatePlayerQuery>,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    let form = PlayerForm::new(query.team_id);
    success(create_form(user, &form, &FormErrors::new(), &mut conn))
}

pub async fn do_create_player(
    user: User,
    mut conn: Conn,
    Form(form): Form<PlayerForm>,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return bad_request(create_form(user, &form, &errors, &mut conn));
        }
    };
    let errors = input.check_references(None, &mut *conn)?;
    if !errors.is_empty() {
        return bad_request(create_form(user, &form, &errors, &mut conn));
    }

    let id = Uuid::now_v7().to_string();
    diesel::insert_into(players::table)
        .values((
            players::id.eq(&id),
            players::team_id.eq(&input.team_id),
            players::first_name.eq(&input.first_name),
            players::last_name.eq(&input.last_name),
            players::jersey_number.eq(input.jersey_number),
            players::position.eq(input.position.as_str()),
            players::level.eq(input.level),
            players::birth_date.eq(input.birth_date),
            players::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)?;

    tracing::info!(player = %id, team = %input.team_id, "registered player");

    see_other_ok(format!("/players/{id}"))
}
