//! Adding matchdays and knockout stages to a tournament.

use axum::extract::{Form, Path};
use diesel::{dsl::exists, prelude::*, select};
use hypertext::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::User,
    permission::Permission,
    schema::{knockout_stages, matchdays},
    state::Conn,
    template::{Page, Section},
    tournaments::Tournament,
    util_resp::{StandardResponse, bad_request, see_other_ok},
    validation::{
        FormErrors, has_length, non_empty, parse_date, parse_int_in,
        parse_optional,
    },
    widgets::alert::ErrorAlert,
};

#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct MatchdayForm {
    pub number: String,
    pub name: String,
    pub date: String,
}

#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct KnockoutStageForm {
    pub name: String,
    pub position: String,
}

fn rejected(
    user: User,
    tournament: &Tournament,
    title: &str,
    errors: &FormErrors,
) -> Rendered<String> {
    Page::new()
        .user(user)
        .section(Section::Tournaments)
        .body(maud! {
            h1 { (title) }
            @for (field, msg) in errors.iter() {
                @if field == FormErrors::GENERAL {
                    ErrorAlert msg=(msg);
                } @else {
                    ErrorAlert msg=(format!("{field}: {msg}"));
                }
            }
            a href=(format!("/tournaments/{}", tournament.id)) {
                "Back to " (tournament.name)
            }
        })
        .render()
}

pub async fn do_create_matchday(
    Path(tid): Path<String>,
    user: User,
    mut conn: Conn,
    Form(form): Form<MatchdayForm>,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    let tournament = Tournament::fetch(&tid, &mut *conn)?;

    let mut errors = FormErrors::new();
    if !tournament.has_group_phase {
        errors.add(
            FormErrors::GENERAL,
            "this tournament does not have a group phase",
        );
    }
    let number = errors.take("number", parse_int_in(&form.number, 1..=999));
    let name = non_empty(&form.name);
    if let Some(name) = name {
        errors.check("name", has_length(name, 1..=64));
    }
    let date = errors.take("date", parse_optional(&form.date, parse_date));

    if let Some(number) = number {
        let taken = select(exists(
            matchdays::table
                .filter(matchdays::tournament_id.eq(&tid))
                .filter(matchdays::number.eq(number)),
        ))
        .get_result::<bool>(&mut *conn)?;
        if taken {
            errors.add("number", format!("matchday {number} already exists"));
        }
    }

    let (Some(number), Some(date), true) = (number, date, errors.is_empty())
    else {
        return bad_request(rejected(
            user,
            &tournament,
            "Could not add the matchday",
            &errors,
        ));
    };

    let id = Uuid::now_v7().to_string();
    diesel::insert_into(matchdays::table)
        .values((
            matchdays::id.eq(&id),
            matchdays::tournament_id.eq(&tid),
            matchdays::number.eq(number),
            matchdays::name.eq(name),
            matchdays::date.eq(date),
        ))
        .execute(&mut *conn)?;

    tracing::info!(tournament = %tid, matchday = %id, number, "created matchday");

    see_other_ok(format!("/tournaments/{tid}"))
}

pub async fn do_create_knockout_stage(
    Path(tid): Path<String>,
    user: User,
    mut conn: Conn,
    Form(form): Form<KnockoutStageForm>,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    let tournament = Tournament::fetch(&tid, &mut *conn)?;

    let mut errors = FormErrors::new();
    if !tournament.has_knockout_phase {
        errors.add(
            FormErrors::GENERAL,
            "this tournament does not have a knockout phase",
        );
    }
    let name = form.name.trim();
    errors.check("name", has_length(name, 1..=64));
    let position =
        errors.take("position", parse_int_in(&form.position, 1..=99));

    if let Some(position) = position {
        let taken = select(exists(
            knockout_stages::table
                .filter(knockout_stages::tournament_id.eq(&tid))
                .filter(knockout_stages::position.eq(position)),
        ))
        .get_result::<bool>(&mut *conn)?;
        if taken {
            errors.add(
                "position",
                format!("another stage is already at position {position}"),
            );
        }
    }

    let (Some(position), true) = (position, errors.is_empty()) else {
        return bad_request(rejected(
            user,
            &tournament,
            "Could not add the knockout stage",
            &errors,
        ));
    };

    let id = Uuid::now_v7().to_string();
    diesel::insert_into(knockout_stages::table)
        .values((
            knockout_stages::id.eq(&id),
            knockout_stages::tournament_id.eq(&tid),
            knockout_stages::name.eq(name),
            knockout_stages::position.eq(position),
        ))
        .execute(&mut *conn)?;

    tracing::info!(tournament = %tid, stage = %id, position, "created knockout stage");

    see_other_ok(format!("/tournaments/{tid}"))
}
