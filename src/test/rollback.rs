use axum::{Router, middleware, routing::post};
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;

use super::TestApp;
use crate::{
    schema::tournaments,
    state::{Conn, commit_transactions},
    util_resp::{FailureResponse, StandardResponse},
};

async fn write_then_fail(mut conn: Conn) -> StandardResponse {
    diesel::insert_into(tournaments::table)
        .values((
            tournaments::id.eq("doomed"),
            tournaments::name.eq("Doomed"),
            tournaments::category.eq("Senior"),
            tournaments::start_date.eq(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            tournaments::has_group_phase.eq(true),
            tournaments::has_knockout_phase.eq(false),
            tournaments::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)?;
    Err(FailureResponse::ServerError(()))
}

#[tokio::test]
async fn failed_requests_leave_no_writes() {
    let mut app = TestApp::new();
    app.app = Router::new()
        .route("/fail", post(write_then_fail))
        .layer(middleware::from_fn(commit_transactions))
        .with_state(app.state.clone());

    let res = app.post("/fail", &[] as &[(&str, &str)]).await;
    assert!(res.status().is_server_error());

    let n = app.db(|conn| {
        tournaments::table.count().get_result::<i64>(conn).unwrap()
    });
    assert_eq!(n, 0);
}
