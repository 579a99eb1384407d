use axum::extract::{Form, Path, State};
use diesel::prelude::*;
use hypertext::prelude::*;
use tokio::sync::broadcast::Sender;

use crate::{
    auth::User,
    matches::{
        Match, MatchStatus,
        form::{MatchForm, MatchFormFields, MatchFormOptions},
        outcome::MatchOutcome,
    },
    msg::{Msg, MsgContents},
    permission::Permission,
    schema::matches,
    state::Conn,
    template::{Page, Section},
    tournaments::Tournament,
    util_resp::{
        FailureResponse, StandardResponse, bad_request, see_other_ok, success,
    },
    validation::FormErrors,
};

fn edit_form(
    user: User,
    m: &Match,
    tournament: &Tournament,
    form: &MatchForm,
    errors: &FormErrors,
    conn: &mut Conn,
) -> Result<Rendered<String>, FailureResponse> {
    let options = MatchFormOptions::load(tournament, &mut **conn)?;

    Ok(Page::new()
        .user(user)
        .section(Section::Matches)
        .body(maud! {
            h1 { "Edit match" }
            form method="post" {
                MatchFormFields
                    form=(form)
                    errors=(errors)
                    tournament=(tournament)
                    options=(&options);
                button type="submit" class="btn btn-primary" { "Save" }
                a class="btn btn-link" href=(format!("/matches/{}", m.id)) { "Cancel" }
            }
        })
        .render())
}

pub async fn edit_match_page(
    Path(match_id): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    let m = Match::fetch(&match_id, &mut *conn)?;
    let tournament = Tournament::fetch(&m.tournament_id, &mut *conn)?;
    let form = MatchForm::of_match(&m);
    success(edit_form(
        user,
        &m,
        &tournament,
        &form,
        &FormErrors::new(),
        &mut conn,
    )?)
}

pub async fn do_edit_match(
    Path(match_id): Path<String>,
    user: User,
    State(tx): State<Sender<Msg>>,
    mut conn: Conn,
    Form(mut form): Form<MatchForm>,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    let m = Match::fetch(&match_id, &mut *conn)?;
    let tournament = Tournament::fetch(&m.tournament_id, &mut *conn)?;
    // matches stay in their tournament
    form.tournament_id = tournament.id.clone();

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return bad_request(edit_form(
                user,
                &m,
                &tournament,
                &form,
                &errors,
                &mut conn,
            )?);
        }
    };

    let mut errors = input.check_references(&tournament, &mut *conn)?;
    if m.status() == MatchStatus::Finalized {
        if input.team_1_id != m.team_1_id || input.team_2_id != m.team_2_id {
            errors.add(
                FormErrors::GENERAL,
                "clear the result before changing the teams",
            );
        }
        if input.phase.is_group()
            && matches!(m.outcome(), Some(MatchOutcome::Shootout { .. }))
        {
            errors.add(
                FormErrors::GENERAL,
                "a match decided on penalties cannot be moved to the group phase",
            );
        }
    }
    if !errors.is_empty() {
        return bad_request(edit_form(
            user,
            &m,
            &tournament,
            &form,
            &errors,
            &mut conn,
        )?);
    }

    diesel::update(matches::table.filter(matches::id.eq(&m.id)))
        .set((
            matches::team_1_id.eq(&input.team_1_id),
            matches::team_2_id.eq(&input.team_2_id),
            matches::matchday_id.eq(input.phase.matchday_id()),
            matches::knockout_stage_id.eq(input.phase.stage_id()),
            matches::referee.eq(&input.referee),
            matches::scheduled_at.eq(input.scheduled_at),
            matches::venue.eq(&input.venue),
        ))
        .execute(&mut *conn)?;

    tracing::info!(match_id = %m.id, "updated match");

    let _ = tx.send(Msg {
        tournament_id: tournament.id.clone(),
        inner: MsgContents::MatchUpdated {
            match_id: m.id.clone(),
        },
    });

    see_other_ok(format!("/matches/{}", m.id))
}
