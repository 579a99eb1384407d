use axum::extract::{Form, Path};
use diesel::prelude::*;
use hypertext::prelude::*;

use crate::{
    auth::User,
    permission::Permission,
    players::{
        Player,
        form::{PlayerForm, PlayerFormFields},
    },
    schema::players,
    state::Conn,
    teams::Team,
    template::{Page, Section},
    util_resp::{StandardResponse, bad_request, degrade, see_other_ok, success},
    validation::FormErrors,
};

fn edit_form(
    user: User,
    player: &Player,
    form: &PlayerForm,
    errors: &FormErrors,
    conn: &mut Conn,
) -> Rendered<String> {
    let teams = degrade("teams", Team::options(&mut **conn));

    Page::new()
        .user(user)
        .section(Section::Players)
        .body(maud! {
            h1 { "Edit " (player.full_name()) }
            form method="post" {
                PlayerFormFields form=(form) errors=(errors) teams=(teams.as_slice());
                button type="submit" class="btn btn-primary" { "Save" }
                a class="btn btn-link" href=(format!("/players/{}", player.id)) { "Cancel" }
            }
        })
        .render()
}

pub async fn edit_player_page(
    Path(player_id): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    let player = Player::fetch(&player_id, &mut *conn)?;
    let form = PlayerForm::of_player(&player);
    success(edit_form(user, &player, &form, &FormErrors::new(), &mut conn))
}

/// Players may be transferred to another team, subject to the shirt number
/// being free there.
pub async fn do_edit_player(
    Path(player_id): Path<String>,
    user: User,
    mut conn: Conn,
    Form(form): Form<PlayerForm>,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    let player = Player::fetch(&player_id, &mut *conn)?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return bad_request(edit_form(
                user, &player, &form, &errors, &mut conn,
            ));
        }
    };
    let errors = input.check_references(Some(&player.id), &mut *conn)?;
    if !errors.is_empty() {
        return bad_request(edit_form(user, &player, &form, &errors, &mut conn));
    }

    diesel::update(players::table.filter(players::id.eq(&player.id)))
        .set((
            players::team_id.eq(&input.team_id),
            players::first_name.eq(&input.first_name),
            players::last_name.eq(&input.last_name),
            players::jersey_number.eq(input.jersey_number),
            players::position.eq(input.position.as_str()),
            players::level.eq(input.level),
            players::birth_date.eq(input.birth_date),
        ))
        .execute(&mut *conn)?;

    tracing::info!(player = %player.id, "updated player");

    see_other_ok(format!("/players/{}", player.id))
}
