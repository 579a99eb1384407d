use axum::extract::Form;
use chrono::Utc;
use diesel::prelude::*;
use hypertext::prelude::*;
use uuid::Uuid;

use crate::{
    auth::User,
    permission::Permission,
    schema::tournaments,
    state::Conn,
    template::{Page, Section},
    tournaments::form::{TournamentForm, TournamentFormFields},
    util_resp::{StandardResponse, bad_request, see_other_ok, success},
    validation::FormErrors,
};

fn create_form(
    user: User,
    form: &TournamentForm,
    errors: &FormErrors,
) -> Rendered<String> {
    Page::new()
        .user(user)
        .section(Section::Tournaments)
        .body(maud! {
            h1 { "New tournament" }
            form method="post" {
                TournamentFormFields form=(form) errors=(errors);
                button type="submit" class="btn btn-primary" { "Create" }
            }
        })
        .render()
}

pub async fn create_tournament_page(user: User) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    success(create_form(user, &TournamentForm::new(), &FormErrors::new()))
}

pub async fn do_create_tournament(
    user: User,
    mut conn: Conn,
    Form(form): Form<TournamentForm>,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return bad_request(create_form(user, &form, &errors)),
    };

    let tid = Uuid::now_v7().to_string();
    diesel::insert_into(tournaments::table)
        .values((
            tournaments::id.eq(&tid),
            tournaments::name.eq(&input.name),
            tournaments::category.eq(&input.category),
            tournaments::start_date.eq(input.start_date),
            tournaments::end_date.eq(input.end_date),
            tournaments::has_group_phase.eq(input.has_group_phase),
            tournaments::has_knockout_phase.eq(input.has_knockout_phase),
            tournaments::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)?;

    tracing::info!(tournament = %tid, name = %input.name, "created tournament");

    see_other_ok(format!("/tournaments/{tid}"))
}
