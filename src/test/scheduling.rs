use axum::http::StatusCode;
use chrono::NaiveDate;
use diesel::prelude::*;

use super::{TestApp, body_string, id_from_redirect};
use crate::{schema::matches, tournaments::Tournament};

fn match_count(app: &TestApp) -> i64 {
    app.db(|conn| matches::table.count().get_result::<i64>(conn).unwrap())
}

#[tokio::test]
async fn tournaments_read_back_as_submitted() {
    let mut app = TestApp::with_admin().await;

    let res = app
        .post(
            "/tournaments/create",
            &[
                ("name", "Copa de Primavera"),
                ("category", "Sub-18"),
                ("start_date", "2026-03-14"),
                ("end_date", "2026-05-30"),
                ("has_knockout_phase", "on"),
            ],
        )
        .await;
    let tid = id_from_redirect(res, "/tournaments/").await;

    let t = app.db(|conn| Tournament::fetch(&tid, conn).unwrap());
    assert_eq!(t.name, "Copa de Primavera");
    assert_eq!(t.category, "Sub-18");
    assert_eq!(t.start_date, NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
    assert_eq!(t.end_date, NaiveDate::from_ymd_opt(2026, 5, 30));
    assert!(!t.has_group_phase);
    assert!(t.has_knockout_phase);

    let res = app.get(&format!("/tournaments/{tid}")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_string(res).await.contains("Copa de Primavera"));
}

#[tokio::test]
async fn tournaments_need_a_phase() {
    let mut app = TestApp::with_admin().await;
    let res = app
        .post(
            "/tournaments/create",
            &[
                ("name", "Sin fases"),
                ("category", "Senior"),
                ("start_date", "2026-03-14"),
            ],
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn a_team_cannot_play_itself() {
    let mut app = TestApp::with_admin().await;
    let tid = app.create_tournament("Liga", true, false).await;
    let team = app.create_team(&tid, "Halcones").await;
    let md = app.create_matchday(&tid, 1).await;

    let res = app.schedule_match(&tid, &team, &team, &md, "").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(
        body_string(res)
            .await
            .contains("a team cannot play against itself")
    );
    assert_eq!(match_count(&app), 0);
}

#[tokio::test]
async fn a_match_belongs_to_one_phase() {
    let mut app = TestApp::with_admin().await;
    let tid = app.create_tournament("Copa Mixta", true, true).await;
    let a = app.create_team(&tid, "Halcones").await;
    let b = app.create_team(&tid, "Toros").await;
    let md = app.create_matchday(&tid, 1).await;
    let stage = app.create_stage(&tid, "Final", 1).await;

    let res = app.schedule_match(&tid, &a, &b, &md, &stage).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(res).await.contains("not both"));
    assert_eq!(match_count(&app), 0);

    let res = app.schedule_match(&tid, &a, &b, "", &stage).await;
    let mid = id_from_redirect(res, "/matches/").await;
    let stored = app.db(|conn| {
        matches::table
            .filter(matches::id.eq(&mid))
            .select((matches::matchday_id, matches::knockout_stage_id))
            .first::<(Option<String>, Option<String>)>(conn)
            .unwrap()
    });
    assert_eq!(stored, (None, Some(stage)));

    // placeholders without a phase are allowed
    let res = app.schedule_match(&tid, &a, &b, "", "").await;
    assert_res_ok!(res);
    assert_eq!(match_count(&app), 2);
}

#[tokio::test]
async fn phases_must_be_enabled() {
    let mut app = TestApp::with_admin().await;
    let tid = app.create_tournament("Copa", false, true).await;

    let res = app
        .post(
            &format!("/tournaments/{tid}/matchdays/create"),
            &[("number", "1")],
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(
        body_string(res)
            .await
            .contains("this tournament does not have a group phase")
    );
}

#[tokio::test]
async fn teams_from_elsewhere_are_rejected() {
    let mut app = TestApp::with_admin().await;
    let liga = app.create_tournament("Liga", true, false).await;
    let copa = app.create_tournament("Copa", true, false).await;
    let a = app.create_team(&liga, "Halcones").await;
    let b = app.create_team(&copa, "Toros").await;

    let res = app.schedule_match(&liga, &a, &b, "", "").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(match_count(&app), 0);
}

#[tokio::test]
async fn jersey_numbers_are_unique_per_team() {
    let mut app = TestApp::with_admin().await;
    let tid = app.create_tournament("Liga", true, false).await;
    let a = app.create_team(&tid, "Halcones").await;
    let b = app.create_team(&tid, "Toros").await;

    let player = |team: &str, first: &str| {
        vec![
            ("team_id", team.to_string()),
            ("first_name", first.to_string()),
            ("last_name", "García".to_string()),
            ("jersey_number", "10".to_string()),
            ("position", "pivot".to_string()),
            ("level", "4".to_string()),
            ("birth_date", String::new()),
        ]
    };

    let res = app.post("/players/create", &player(&a, "Pablo")).await;
    assert_res_ok!(res);

    let res = app.post("/players/create", &player(&a, "Diego")).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(res).await.contains("already wears 10"));

    let res = app.post("/players/create", &player(&b, "Diego")).await;
    assert_res_ok!(res);
}

#[tokio::test]
async fn team_names_are_unique_per_tournament() {
    let mut app = TestApp::with_admin().await;
    let tid = app.create_tournament("Liga", true, false).await;
    app.create_team(&tid, "Halcones").await;

    let res = app
        .post(
            "/teams/create",
            &[
                ("tournament_id", tid.as_str()),
                ("name", "Halcones"),
                ("primary_color", "#000000"),
                ("level", "2"),
            ],
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
