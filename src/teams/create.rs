use axum::extract::{Form, Query};
use chrono::Utc;
use diesel::prelude::*;
use hypertext::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::User,
    permission::Permission,
    schema::teams,
    state::Conn,
    teams::form::{TeamForm, TeamFormFields},
    template::{Page, Section},
    tournaments::Tournament,
    util_resp::{StandardResponse, bad_request, degrade, see_other_ok, success},
    validation::FormErrors,
};

#[derive(Deserialize)]
pub struct CreateTeamQuery {
    pub tournament_id: Option<String>,
}

fn create_form(
    user: User,
    form: &TeamForm,
    errors: &FormErrors,
    conn: &mut Conn,
) -> Rendered<String> {
    let tournaments = degrade("tournaments", Tournament::options(&mut **conn));
    let directors = degrade("users", User::all(&mut **conn))
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect::<Vec<_>>();

    Page::new()
        .user(user)
        .section(Section::Teams)
        .body(maud! {
            h1 { "Register a team" }
            form method="post" action="/teams/create" {
                TeamFormFields
                    form=(form)
                    errors=(errors)
                    tournaments=(Some(tournaments.as_slice()))
                    directors=(directors.as_slice());
                button type="submit" class="btn btn-primary" { "Create" }
            }
        })
        .render()
}

pub async fn create_team_page(
    user: User,
    mut conn: Conn,
    Query(query): Query<CreateTeamQuery>,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    let form = TeamForm::new(query.tournament_id);
    success(create_form(user, &form, &FormErrors::new(), &mut conn))
}

pub async fn do_create_team(
    user: User,
    mut conn: Conn,
    Form(form): Form<TeamForm>,
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

    let tournament = Tournament::fetch(&input.tournament_id, &mut *conn)?;
    let category = input.category.unwrap_or(tournament.category);

    let id = Uuid::now_v7().to_string();
    diesel::insert_into(teams::table)
        .values((
            teams::id.eq(&id),
            teams::tournament_id.eq(&input.tournament_id),
            teams::name.eq(&input.name),
            teams::category.eq(&category),
            teams::primary_color.eq(&input.primary_color),
            teams::secondary_color.eq(&input.secondary_color),
            teams::level.eq(input.level),
            teams::director_id.eq(&input.director_id),
            teams::logo_url.eq(&input.logo_url),
            teams::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)?;

    tracing::info!(team = %id, tournament = %input.tournament_id, "registered team");

    see_other_ok(format!("/teams/{id}"))
}
