use axum::extract::{Form, Path};
use diesel::{dsl::exists, prelude::*, select};
use hypertext::prelude::*;

use crate::{
    auth::User,
    permission::Permission,
    schema::{knockout_stages, matchdays, matches, tournaments},
    state::Conn,
    template::{Page, Section},
    tournaments::{
        Tournament,
        form::{TournamentForm, TournamentFormFields},
    },
    util_resp::{StandardResponse, bad_request, see_other_ok, success},
    validation::FormErrors,
};

fn edit_form(
    user: User,
    tournament: &Tournament,
    form: &TournamentForm,
    errors: &FormErrors,
) -> Rendered<String> {
    Page::new()
        .user(user)
        .section(Section::Tournaments)
        .body(maud! {
            h1 { "Edit " (tournament.name) }
            form method="post" {
                TournamentFormFields form=(form) errors=(errors);
                button type="submit" class="btn btn-primary" { "Save" }
                a class="btn btn-link" href=(format!("/tournaments/{}", tournament.id)) {
                    "Cancel"
                }
            }
        })
        .render()
}

pub async fn edit_tournament_page(
    Path(tid): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    let tournament = Tournament::fetch(&tid, &mut *conn)?;
    let form = TournamentForm::of_tournament(&tournament);
    success(edit_form(user, &tournament, &form, &FormErrors::new()))
}

pub async fn do_edit_tournament(
    Path(tid): Path<String>,
    user: User,
    mut conn: Conn,
    Form(form): Form<TournamentForm>,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    let tournament = Tournament::fetch(&tid, &mut *conn)?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return bad_request(edit_form(user, &tournament, &form, &errors));
        }
    };

    // a phase can only be switched off while nothing refers to it
    let mut errors = FormErrors::new();
    if tournament.has_group_phase && !input.has_group_phase {
        let in_use = select(exists(
            matchdays::table.filter(matchdays::tournament_id.eq(&tid)),
        ))
        .get_result::<bool>(&mut *conn)?
            || select(exists(
                matches::table
                    .filter(matches::tournament_id.eq(&tid))
                    .filter(matches::matchday_id.is_not_null()),
            ))
            .get_result::<bool>(&mut *conn)?;
        if in_use {
            errors.add(
                FormErrors::GENERAL,
                "the group phase cannot be removed once it has matchdays",
            );
        }
    }
    if tournament.has_knockout_phase && !input.has_knockout_phase {
        let in_use = select(exists(
            knockout_stages::table
                .filter(knockout_stages::tournament_id.eq(&tid)),
        ))
        .get_result::<bool>(&mut *conn)?;
        if in_use {
            errors.add(
                FormErrors::GENERAL,
                "the knockout phase cannot be removed once it has stages",
            );
        }
    }
    if !errors.is_empty() {
        return bad_request(edit_form(user, &tournament, &form, &errors));
    }

    diesel::update(tournaments::table.filter(tournaments::id.eq(&tid)))
        .set((
            tournaments::name.eq(&input.name),
            tournaments::category.eq(&input.category),
            tournaments::start_date.eq(input.start_date),
            tournaments::end_date.eq(input.end_date),
            tournaments::has_group_phase.eq(input.has_group_phase),
            tournaments::has_knockout_phase.eq(input.has_knockout_phase),
        ))
        .execute(&mut *conn)?;

    tracing::info!(tournament = %tid, "updated tournament");

    see_other_ok(format!("/tournaments/{tid}"))
}
