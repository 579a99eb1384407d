use axum::extract::{Form, Query, State};
use chrono::Utc;
use diesel::prelude::*;
use hypertext::prelude::*;
use serde::Deserialize;
use tokio::sync::broadcast::Sender;
use uuid::Uuid;

use crate::{
    auth::User,
    matches::{
        MatchStatus,
        form::{MatchForm, MatchFormFields, MatchFormOptions},
    },
    msg::{Msg, MsgContents},
    permission::Permission,
    schema::matches,
    state::Conn,
    template::{Page, Section, form::Select},
    tournaments::Tournament,
    util_resp::{
        FailureResponse, StandardResponse, bad_request, degrade, see_other_ok,
        success,
    },
    validation::FormErrors,
};

#[derive(Deserialize)]
pub struct CreateMatchQuery {
    pub tournament_id: Option<String>,
}

fn create_form(
    user: User,
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
            h1 { "Schedule a match" }
            p class="text-muted" { (tournament.name) " (" (tournament.category) ")" }
            form method="post" action="/matches/create" {
                MatchFormFields
                    form=(form)
                    errors=(errors)
                    tournament=(tournament)
                    options=(&options);
                button type="submit" class="btn btn-primary" { "Create" }
            }
        })
        .render())
}

/// Matches are scheduled within a tournament, so the tournament is picked
/// first.
fn tournament_picker(user: User, conn: &mut Conn) -> Rendered<String> {
    let tournaments = degrade("tournaments", Tournament::options(&mut **conn));
    let no_errors = FormErrors::new();
    Page::new()
        .user(user)
        .section(Section::Matches)
        .body(maud! {
            h1 { "Schedule a match" }
            form method="get" action="/matches/create" {
                Select
                    label="Tournament"
                    name="tournament_id"
                    options=(tournaments.as_slice())
                    selected=("")
                    errors=(&no_errors)
                    allow_empty=(false);
                button type="submit" class="btn btn-primary" { "Continue" }
            }
        })
        .render()
}

pub async fn create_match_page(
    user: User,
    mut conn: Conn,
    Query(query): Query<CreateMatchQuery>,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;

    let Some(tid) = query.tournament_id.filter(|tid| !tid.is_empty()) else {
        return success(tournament_picker(user, &mut conn));
    };
    let tournament = Tournament::fetch(&tid, &mut *conn)?;
    let form = MatchForm::new(tid);
    success(create_form(
        user,
        &tournament,
        &form,
        &FormErrors::new(),
        &mut conn,
    )?)
}

pub async fn do_create_match(
    user: User,
    State(tx): State<Sender<Msg>>,
    mut conn: Conn,
    Form(form): Form<MatchForm>,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    let tournament = Tournament::fetch(form.tournament_id.trim(), &mut *conn)?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return bad_request(create_form(
                user,
                &tournament,
                &form,
                &errors,
                &mut conn,
            )?);
        }
    };
    let errors = input.check_references(&tournament, &mut *conn)?;
    if !errors.is_empty() {
        return bad_request(create_form(
            user,
            &tournament,
            &form,
            &errors,
            &mut conn,
        )?);
    }

    let id = Uuid::now_v7().to_string();
    diesel::insert_into(matches::table)
        .values((
            matches::id.eq(&id),
            matches::tournament_id.eq(&tournament.id),
            matches::team_1_id.eq(&input.team_1_id),
            matches::team_2_id.eq(&input.team_2_id),
            matches::matchday_id.eq(input.phase.matchday_id()),
            matches::knockout_stage_id.eq(input.phase.stage_id()),
            matches::referee.eq(&input.referee),
            matches::scheduled_at.eq(input.scheduled_at),
            matches::venue.eq(&input.venue),
            matches::status.eq(MatchStatus::Scheduled.as_str()),
            matches::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)?;

    tracing::info!(match_id = %id, tournament = %tournament.id, "scheduled match");

    let _ = tx.send(Msg {
        tournament_id: tournament.id.clone(),
        inner: MsgContents::MatchUpdated { match_id: id.clone() },
    });

    see_other_ok(format!("/matches/{id}"))
}
