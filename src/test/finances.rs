use axum::http::{StatusCode, header::CONTENT_TYPE};

use super::{TestApp, body_string};

fn entry<'a>(
    kind: &'a str,
    category: &'a str,
    amount: &'a str,
    description: &'a str,
    tournament_id: &'a str,
    team_id: &'a str,
) -> Vec<(&'static str, &'a str)> {
    vec![
        ("kind", kind),
        ("category", category),
        ("amount", amount),
        ("description", description),
        ("occurred_on", "2026-02-03"),
        ("tournament_id", tournament_id),
        ("team_id", team_id),
    ]
}

#[tokio::test]
async fn the_ledger_balances_and_exports() {
    let mut app = TestApp::with_admin().await;
    let tid = app.create_tournament("Liga", true, false).await;
    let team = app.create_team(&tid, "Halcones").await;

    let res = app
        .post(
            "/finances/create",
            &entry("income", "registration", "150.5", "Inscripción", &tid, &team),
        )
        .await;
    assert_res_ok!(res);
    let res = app
        .post(
            "/finances/create",
            &entry("expense", "referee", "30.75", "Árbitro jornada 1", &tid, ""),
        )
        .await;
    assert_res_ok!(res);
    let res = app
        .post(
            "/finances/create",
            &entry("expense", "equipment", "12", "Balones", "", ""),
        )
        .await;
    assert_res_ok!(res);

    let res = app.get(&format!("/finances?tournament_id={tid}")).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_string(res).await;
    assert!(body.contains("150.50"));
    assert!(body.contains("119.75"));
    assert!(!body.contains("Balones"));

    let res = app.get("/finances").await;
    assert!(body_string(res).await.contains("107.75"));

    let res = app.get(&format!("/finances/export.csv?tournament_id={tid}")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers()
            .get(CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    let csv = body_string(res).await;
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().any(|r| r.ends_with("150.50,150.50")));
    assert!(rows.iter().any(|r| r.ends_with("30.75,-30.75")));
}

#[tokio::test]
async fn amounts_and_references_are_checked() {
    let mut app = TestApp::with_admin().await;
    let liga = app.create_tournament("Liga", true, false).await;
    let copa = app.create_tournament("Copa", true, false).await;
    let team = app.create_team(&liga, "Halcones").await;

    let res = app
        .post(
            "/finances/create",
            &entry("income", "registration", "10.999", "Cuota", "", ""),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .post(
            "/finances/create",
            &entry("income", "registration", "0", "Cuota", "", ""),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .post(
            "/finances/create",
            &entry("income", "registration", "50", "Cuota", &copa, &team),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(
        body_string(res)
            .await
            .contains("that team is not part of the chosen tournament")
    );

    // a team alone implies its tournament
    let res = app
        .post(
            "/finances/create",
            &entry("income", "registration", "50", "Cuota", "", &team),
        )
        .await;
    assert_res_ok!(res);
    let res = app.get(&format!("/finances?tournament_id={liga}")).await;
    assert!(body_string(res).await.contains("50.00"));
}
