//! Recording and clearing match results. Every change is announced on the
//! broadcast channel so that open standings pages reload.

use std::sync::Arc;

use axum::extract::{Form, Path, State};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use hypertext::prelude::*;
use tokio::sync::broadcast::Sender;

use crate::{
    auth::User,
    config::{AppConfig, ScoringConfig},
    matches::{
        Match, MatchStatus,
        outcome::{AwardKind, MatchOutcome, ResultForm},
    },
    msg::{Msg, MsgContents},
    permission::Permission,
    schema::matches,
    state::Conn,
    teams::Team,
    template::{
        Page, Section,
        form::{FormErrorSummary, Select, TextInput},
    },
    tournaments::phases::PhaseRef,
    util_resp::{
        FailureResponse, StandardResponse, bad_request, see_other_ok, success,
    },
    validation::FormErrors,
};

/// Stores `outcome` as the result of `m`, replacing any earlier result.
pub fn record(
    m: &Match,
    outcome: &MatchOutcome,
    scoring: &ScoringConfig,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> QueryResult<()> {
    let (goals_1, goals_2) = outcome.goals(scoring.awarded_goals);
    let penalties = outcome.penalties();
    let affected_team_id = match outcome {
        MatchOutcome::Awarded { against, .. } => Some(against.team_id(m)),
        _ => None,
    };

    diesel::update(matches::table.filter(matches::id.eq(&m.id)))
        .set((
            matches::status.eq(MatchStatus::Finalized.as_str()),
            matches::outcome.eq(Some(outcome.column())),
            matches::goals_1.eq(Some(goals_1)),
            matches::goals_2.eq(Some(goals_2)),
            matches::penalties_1.eq(penalties.map(|(p1, _)| p1)),
            matches::penalties_2.eq(penalties.map(|(_, p2)| p2)),
            matches::affected_team_id.eq(affected_team_id),
        ))
        .execute(conn)?;
    Ok(())
}

/// Returns `m` to the scheduled state.
pub fn clear(
    m: &Match,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> QueryResult<()> {
    diesel::update(matches::table.filter(matches::id.eq(&m.id)))
        .set((
            matches::status.eq(MatchStatus::Scheduled.as_str()),
            matches::outcome.eq(None::<String>),
            matches::goals_1.eq(None::<i64>),
            matches::goals_2.eq(None::<i64>),
            matches::penalties_1.eq(None::<i64>),
            matches::penalties_2.eq(None::<i64>),
            matches::affected_team_id.eq(None::<String>),
        ))
        .execute(conn)?;
    Ok(())
}

fn result_form(
    user: User,
    m: &Match,
    form: &ResultForm,
    errors: &FormErrors,
    conn: &mut Conn,
) -> Result<Rendered<String>, FailureResponse> {
    let team_1 = Team::fetch(&m.team_1_id, &mut **conn)?;
    let team_2 = Team::fetch(&m.team_2_id, &mut **conn)?;
    let is_group = PhaseRef::of_match(m).is_group();

    let mut kinds = vec![("regular".to_string(), "Played".to_string())];
    kinds.extend(AwardKind::ALL.into_iter().map(|k| {
        let label = match k {
            AwardKind::Forfeit => "Forfeit",
            AwardKind::Walkover => "Walkover (no-show)",
            AwardKind::Sanction => "Sanction",
        };
        (k.as_str().to_string(), label.to_string())
    }));
    let sides = vec![
        (team_1.id.clone(), team_1.name.clone()),
        (team_2.id.clone(), team_2.name.clone()),
    ];
    let goals_1_label = format!("{} goals", team_1.name);
    let goals_2_label = format!("{} goals", team_2.name);
    let penalties_1_label = format!("{} penalties", team_1.name);
    let penalties_2_label = format!("{} penalties", team_2.name);

    Ok(Page::new()
        .user(user)
        .section(Section::Matches)
        .body(maud! {
            h1 { (team_1.name) " vs " (team_2.name) }
            form method="post" action=(format!("/matches/{}/result", m.id)) {
                FormErrorSummary errors=(errors);
                Select
                    label="Result"
                    name="outcome"
                    options=(kinds.as_slice())
                    selected=(&form.outcome)
                    errors=(errors)
                    allow_empty=(false);
                fieldset class="border rounded p-3 mb-3" {
                    legend class="fs-6" { "Score" }
                    div class="row" {
                        div class="col-md-6" {
                            (TextInput::new(&goals_1_label, "goals_1", &form.goals_1, errors).kind("number"))
                        }
                        div class="col-md-6" {
                            (TextInput::new(&goals_2_label, "goals_2", &form.goals_2, errors).kind("number"))
                        }
                    }
                    @if !is_group {
                        div class="row" {
                            div class="col-md-6" {
                                (TextInput::new(&penalties_1_label, "penalties_1", &form.penalties_1, errors)
                                    .kind("number")
                                    .help("Only after a drawn match."))
                            }
                            div class="col-md-6" {
                                (TextInput::new(&penalties_2_label, "penalties_2", &form.penalties_2, errors)
                                    .kind("number"))
                            }
                        }
                    }
                }
                fieldset class="border rounded p-3 mb-3" {
                    legend class="fs-6" { "Awarded result" }
                    Select
                        label="Awarded against"
                        name="affected_team_id"
                        options=(sides.as_slice())
                        selected=(&form.affected_team_id)
                        errors=(errors)
                        allow_empty=(true);
                    div class="form-text" {
                        "For forfeits, walkovers and sanctions. The opponent is credited with the win."
                    }
                }
                button type="submit" class="btn btn-primary" { "Save result" }
                a class="btn btn-link" href=(format!("/matches/{}", m.id)) { "Cancel" }
            }
        })
        .render())
}

pub async fn record_result_page(
    Path(match_id): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    let m = Match::fetch(&match_id, &mut *conn)?;
    let form = ResultForm::of_match(&m);
    success(result_form(user, &m, &form, &FormErrors::new(), &mut conn)?)
}

pub async fn do_record_result(
    Path(match_id): Path<String>,
    user: User,
    State(config): State<Arc<AppConfig>>,
    State(tx): State<Sender<Msg>>,
    mut conn: Conn,
    Form(form): Form<ResultForm>,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    let m = Match::fetch(&match_id, &mut *conn)?;

    let is_group = PhaseRef::of_match(&m).is_group();
    let outcome = match form.parse(&m, is_group) {
        Ok(outcome) => outcome,
        Err(errors) => {
            return bad_request(result_form(user, &m, &form, &errors, &mut conn)?);
        }
    };

    record(&m, &outcome, &config.scoring, &mut *conn)?;

    tracing::info!(
        match_id = %m.id,
        outcome = outcome.column(),
        previous = %m.status,
        "recorded result"
    );

    let _ = tx.send(Msg {
        tournament_id: m.tournament_id.clone(),
        inner: MsgContents::ResultRecorded {
            match_id: m.id.clone(),
        },
    });

    see_other_ok(format!("/matches/{}", m.id))
}

pub async fn do_clear_result(
    Path(match_id): Path<String>,
    user: User,
    State(tx): State<Sender<Msg>>,
    mut conn: Conn,
) -> StandardResponse {
    user.check_permission(Permission::ManageSportingData)?;
    let m = Match::fetch(&match_id, &mut *conn)?;

    clear(&m, &mut *conn)?;

    tracing::info!(match_id = %m.id, "cleared result");

    let _ = tx.send(Msg {
        tournament_id: m.tournament_id.clone(),
        inner: MsgContents::ResultCleared {
            match_id: m.id.clone(),
        },
    });

    see_other_ok(format!("/matches/{}", m.id))
}

#[cfg(test)]
mod tests {
    use diesel::{Connection, SqliteConnection};
    use diesel_migrations::MigrationHarness;

    use super::*;
    use crate::{MIGRATIONS, matches::outcome::Side};

    fn seeded() -> (SqliteConnection, Match) {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        conn.run_pending_migrations(MIGRATIONS).unwrap();
        for stmt in [
            "INSERT INTO tournaments VALUES ('t', 'Copa', 'Senior', '2026-01-01', NULL, 0, 1, '2026-01-01 00:00:00')",
            "INSERT INTO teams VALUES ('home', 't', 'Home', 'Senior', '#ffffff', NULL, 3, NULL, NULL, '2026-01-01 00:00:00')",
            "INSERT INTO teams VALUES ('away', 't', 'Away', 'Senior', '#000000', NULL, 3, NULL, NULL, '2026-01-01 00:00:00')",
            "INSERT INTO matches (id, tournament_id, team_1_id, team_2_id, status, created_at) VALUES ('m', 't', 'home', 'away', 'scheduled', '2026-01-01 00:00:00')",
        ] {
            diesel::sql_query(stmt).execute(&mut conn).unwrap();
        }
        let m = Match::fetch("m", &mut conn).unwrap();
        (conn, m)
    }

    #[test]
    fn record_then_clear() {
        let (mut conn, m) = seeded();
        let scoring = ScoringConfig::default();

        let walkover = MatchOutcome::Awarded {
            kind: AwardKind::Walkover,
            against: Side::Team2,
        };
        record(&m, &walkover, &scoring, &mut conn).unwrap();

        let stored = Match::fetch("m", &mut conn).unwrap();
        assert_eq!(stored.status(), MatchStatus::Finalized);
        assert_eq!((stored.goals_1, stored.goals_2), (Some(3), Some(0)));
        assert_eq!(stored.affected_team_id.as_deref(), Some("away"));
        assert_eq!(stored.outcome(), Some(walkover));
        assert_eq!(stored.score_label(), "3 - 0 (walkover)");

        let shootout = MatchOutcome::Shootout {
            goals_1: 2,
            goals_2: 2,
            penalties_1: 5,
            penalties_2: 4,
        };
        record(&stored, &shootout, &scoring, &mut conn).unwrap();
        let stored = Match::fetch("m", &mut conn).unwrap();
        assert_eq!(stored.affected_team_id, None);
        assert_eq!(stored.outcome(), Some(shootout));

        clear(&stored, &mut conn).unwrap();
        let stored = Match::fetch("m", &mut conn).unwrap();
        assert_eq!(stored.status(), MatchStatus::Scheduled);
        assert_eq!(stored.outcome, None);
        assert_eq!(stored.goals_1, None);
        assert_eq!(stored.score_label(), "vs");
    }
}
