use axum::http::{StatusCode, header::LOCATION};

use super::{TestApp, body_string};

#[tokio::test]
async fn anonymous_visitors_are_sent_to_login() {
    let mut app = TestApp::new();

    let res = app.get("/teams?tournament_id=x").await;
    assert!(res.status().is_redirection());
    assert_eq!(
        res.headers().get(LOCATION).unwrap(),
        "/login?next=%2Fteams%3Ftournament_id%3Dx"
    );

    let res = app.get("/login").await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn signed_in_users_skip_the_login_page() {
    let mut app = TestApp::with_admin().await;
    let res = app.get("/login").await;
    assert!(res.status().is_redirection());
    assert_eq!(res.headers().get(LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn standings_are_public() {
    let mut app = TestApp::with_admin().await;
    let tid = app.create_tournament("Liga Abierta", true, false).await;
    app.create_team(&tid, "Halcones").await;

    let res = app.post("/logout", &[] as &[(&str, &str)]).await;
    assert!(res.status().is_redirection());
    assert!(app.session.is_none());

    let res = app.get(&format!("/tournaments/{tid}/standings")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_string(res).await.contains("Halcones"));
}

#[tokio::test]
async fn later_accounts_can_only_read() {
    let mut app = TestApp::with_admin().await;
    app.post("/logout", &[] as &[(&str, &str)]).await;

    let res = app
        .post(
            "/register",
            &[
                ("username", "spectator"),
                ("email", "spectator@example.com"),
                ("password", "secret-password"),
                ("password2", "secret-password"),
            ],
        )
        .await;
    assert_res_ok!(res);

    let res = app.get("/tournaments").await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .post(
            "/tournaments/create",
            &[
                ("name", "Copa"),
                ("category", "Senior"),
                ("start_date", "2026-02-01"),
                ("has_group_phase", "on"),
            ],
        )
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.get("/admin/users").await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn administrators_promote_other_users() {
    use diesel::prelude::*;

    use crate::{auth::User, schema::users};

    let mut app = TestApp::with_admin().await;
    app.post("/logout", &[] as &[(&str, &str)]).await;
    app.post(
        "/register",
        &[
            ("username", "scorer"),
            ("email", "scorer@example.com"),
            ("password", "secret-password"),
            ("password2", "secret-password"),
        ],
    )
    .await;
    app.post("/logout", &[] as &[(&str, &str)]).await;
    let res = app
        .post(
            "/login",
            &[("id", super::ADMIN_USERNAME), ("password", super::ADMIN_PASSWORD)],
        )
        .await;
    assert_res_ok!(res);

    let (admin_id, scorer_id) = app.db(|conn| {
        let admin = users::table
            .filter(users::username.eq(super::ADMIN_USERNAME))
            .first::<User>(conn)
            .unwrap();
        let scorer = users::table
            .filter(users::username.eq("scorer"))
            .first::<User>(conn)
            .unwrap();
        (admin.id, scorer.id)
    });

    let res = app
        .post(&format!("/admin/users/{scorer_id}/role"), &[("role", "staff")])
        .await;
    assert_res_ok!(res);

    let res = app
        .post(&format!("/admin/users/{admin_id}/role"), &[("role", "viewer")])
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let roles = app.db(|conn| {
        users::table
            .order_by(users::username.asc())
            .select(users::role)
            .load::<String>(conn)
            .unwrap()
    });
    assert_eq!(roles, vec!["admin".to_string(), "staff".to_string()]);
}
