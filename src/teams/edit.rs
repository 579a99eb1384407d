use axum::extract::{Form, Path};
use diesel::prelude::*;
use hypertext::prelude::*;

use crate::{
    auth::User,
    permission::Permission,
    schema::teams,
    state::Conn,
    teams::{
        Team,
        form::{TeamForm, TeamFormFields},
    },
    template::{Page, Section},
    tournaments::Tournament,
    util_resp::{StandardResponse, bad_request, degrade, see_other_ok, success},
    validation::FormErrors,
};

fn edit_form(
    user: User,
    team: &Team,
    form: &TeamForm,
    errors: &FormErrors,
    conn: &mut Conn,
) -> Rendered<String> {
    let directors = degrade("users", User::all(&mut **conn))
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect::<Vec<_>>();

    Page::new()
        .user(user)
        .section(Section::Teams)
        .body(maud! {
            h1 { "Edit " (team.name) }
            form method="post" {
                TeamFormFields
                    form=(form)
                    errors=(errors)
                    tournaments=(None)
                    directors=(directors.as_slice());
                button type="submit" class="btn btn-primary" { "Save" }
                a class="btn btn-link" href=(format!("/teams/{}", team.id)) { "Cancel" }
            }
        })
        .render()
}

pub async fn edit_team_page(
    Path(team_id): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    let team = Team::fetch(&team_id, &mut *conn)?;
    let form = TeamForm::of_team(&team);
    success(edit_form(user, &team, &form, &FormErrors::new(), &mut conn))
}

pub async fn do_edit_team(
    Path(team_id): Path<String>,
    user: User,
    mut conn: Conn,
    Form(mut form): Form<TeamForm>,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    let team = Team::fetch(&team_id, &mut *conn)?;
    form.tournament_id = team.tournament_id.clone();

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return bad_request(edit_form(user, &team, &form, &errors, &mut conn));
        }
    };
    let errors = input.check_references(Some(&team.id), &mut *conn)?;
    if !errors.is_empty() {
        return bad_request(edit_form(user, &team, &form, &errors, &mut conn));
    }

    let category = match input.category {
        Some(category) => category,
        None => Tournament::fetch(&team.tournament_id, &mut *conn)?.category,
    };

    diesel::update(teams::table.filter(teams::id.eq(&team.id)))
        .set((
            teams::name.eq(&input.name),
            teams::category.eq(&category),
            teams::primary_color.eq(&input.primary_color),
            teams::secondary_color.eq(&input.secondary_color),
            teams::level.eq(input.level),
            teams::director_id.eq(&input.director_id),
            teams::logo_url.eq(&input.logo_url),
        ))
        .execute(&mut *conn)?;

    tracing::info!(team = %team.id, "updated team");

    see_other_ok(format!("/teams/{}", team.id))
}
