//! Tests which drive the whole application through its router, against a
//! fresh in-memory database.

use axum::{
    Router,
    body::Body,
    extract::Request,
    http::header::{COOKIE, LOCATION, SET_COOKIE},
    response::Response,
};
use diesel::SqliteConnection;
use serde::Serialize;
use tower::ServiceExt;

use crate::{
    auth::LOGIN_COOKIE,
    config::{AppConfig, create_app, make_pool, run_migrations},
    state::{AppState, DbPool},
};

// This is a macro rather than a function because the `assert!` panic
// then directly notes the span of the call site (rather than requiring
// a look at the stack trace to find it).
macro_rules! assert_res_ok {
    ($response:expr) => {
        assert!(
            $response.status().is_success()
                || $response.status().is_redirection(),
            "response status = {:?}, str = {}",
            $response.status(),
            {
                let body_bytes =
                    axum::body::to_bytes($response.into_body(), usize::MAX)
                        .await
                        .unwrap();
                String::from_utf8_lossy(&body_bytes).to_string()
            }
        );
    };
}

mod auth_flow;
mod finances;
mod rollback;
mod scheduling;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "password";

pub struct TestApp {
    pub app: Router,
    pub pool: DbPool,
    pub state: AppState,
    /// `name=value` of the session cookie, once signed in.
    pub session: Option<String>,
}

impl TestApp {
    pub fn new() -> Self {
        let pool = make_pool(":memory:").unwrap();
        run_migrations(&pool).unwrap();
        let state = AppState::new(pool.clone(), AppConfig::default()).unwrap();
        TestApp {
            app: create_app(state.clone()),
            pool,
            state,
            session: None,
        }
    }

    /// Registers the first account, which is made an administrator, and
    /// keeps its session.
    pub async fn with_admin() -> Self {
        let mut app = TestApp::new();
        let res = app
            .post(
                "/register",
                &[
                    ("username", ADMIN_USERNAME),
                    ("email", "admin@example.com"),
                    ("password", ADMIN_PASSWORD),
                    ("password2", ADMIN_PASSWORD),
                ],
            )
            .await;
        assert_res_ok!(res);
        assert!(app.session.is_some(), "registering should sign in");
        app
    }

    pub async fn send(&mut self, mut request: Request) -> Response {
        if let Some(session) = &self.session {
            request
                .headers_mut()
                .insert(COOKIE, session.parse().unwrap());
        }
        let response = self.app.clone().oneshot(request).await.unwrap();

        for cookie in response.headers().get_all(SET_COOKIE) {
            let pair = cookie.to_str().unwrap().split(';').next().unwrap();
            if let Some(value) = pair.strip_prefix(&format!("{LOGIN_COOKIE}=")) {
                self.session = if value.is_empty() {
                    None
                } else {
                    Some(pair.to_string())
                };
            }
        }
        response
    }

    pub async fn get(&mut self, uri: &str) -> Response {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post(&mut self, uri: &str, form: &(impl Serialize + ?Sized)) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(serde_urlencoded::to_string(form).unwrap()))
            .unwrap();
        self.send(request).await
    }

    /// Runs `f` against the database between requests. The in-memory pool
    /// holds a single connection, so it must not be kept across a request.
    pub fn db<T>(&self, f: impl FnOnce(&mut SqliteConnection) -> T) -> T {
        let mut conn = self.pool.get().unwrap();
        f(&mut conn)
    }

    pub async fn create_tournament(
        &mut self,
        name: &str,
        group: bool,
        knockout: bool,
    ) -> String {
        let mut form = vec![
            ("name", name),
            ("category", "Senior"),
            ("start_date", "2026-02-01"),
            ("end_date", ""),
        ];
        if group {
            form.push(("has_group_phase", "on"));
        }
        if knockout {
            form.push(("has_knockout_phase", "on"));
        }
        let res = self.post("/tournaments/create", &form).await;
        id_from_redirect(res, "/tournaments/").await
    }

    pub async fn create_team(&mut self, tid: &str, name: &str) -> String {
        let res = self
            .post(
                "/teams/create",
                &[
                    ("tournament_id", tid),
                    ("name", name),
                    ("category", ""),
                    ("primary_color", "#1a2b3c"),
                    ("secondary_color", ""),
                    ("level", "3"),
                    ("director_id", ""),
                    ("logo_url", ""),
                ],
            )
            .await;
        id_from_redirect(res, "/teams/").await
    }

    /// Adds matchday `number` and returns its id.
    pub async fn create_matchday(&mut self, tid: &str, number: i64) -> String {
        use crate::schema::matchdays;
        use diesel::prelude::*;

        let res = self
            .post(
                &format!("/tournaments/{tid}/matchdays/create"),
                &[("number", number.to_string().as_str()), ("name", ""), ("date", "")],
            )
            .await;
        assert_res_ok!(res);
        let tid = tid.to_string();
        self.db(move |conn| {
            matchdays::table
                .filter(matchdays::tournament_id.eq(&tid))
                .filter(matchdays::number.eq(number))
                .select(matchdays::id)
                .first::<String>(conn)
                .unwrap()
        })
    }

    /// Adds a knockout stage and returns its id.
    pub async fn create_stage(
        &mut self,
        tid: &str,
        name: &str,
        position: i64,
    ) -> String {
        use crate::schema::knockout_stages;
        use diesel::prelude::*;

        let res = self
            .post(
                &format!("/tournaments/{tid}/stages/create"),
                &[("name", name), ("position", position.to_string().as_str())],
            )
            .await;
        assert_res_ok!(res);
        let tid = tid.to_string();
        self.db(move |conn| {
            knockout_stages::table
                .filter(knockout_stages::tournament_id.eq(&tid))
                .filter(knockout_stages::position.eq(position))
                .select(knockout_stages::id)
                .first::<String>(conn)
                .unwrap()
        })
    }

    pub async fn schedule_match(
        &mut self,
        tid: &str,
        team_1: &str,
        team_2: &str,
        matchday: &str,
        stage: &str,
    ) -> Response {
        self.post(
            "/matches/create",
            &[
                ("tournament_id", tid),
                ("team_1_id", team_1),
                ("team_2_id", team_2),
                ("matchday_id", matchday),
                ("knockout_stage_id", stage),
                ("referee", ""),
                ("scheduled_at", "2026-02-07T19:30"),
                ("venue", "Pabellón 1"),
            ],
        )
        .await
    }

    pub async fn record_regular(
        &mut self,
        match_id: &str,
        goals_1: i64,
        goals_2: i64,
    ) -> Response {
        self.post(
            &format!("/matches/{match_id}/result"),
            &[
                ("outcome", "regular".to_string()),
                ("goals_1", goals_1.to_string()),
                ("goals_2", goals_2.to_string()),
                ("penalties_1", String::new()),
                ("penalties_2", String::new()),
                ("affected_team_id", String::new()),
            ],
        )
        .await
    }
}

/// Asserts that `res` redirects to `{prefix}{id}` and returns the id.
pub async fn id_from_redirect(res: Response, prefix: &str) -> String {
    let location = res
        .headers()
        .get(LOCATION)
        .map(|l| l.to_str().unwrap().to_string());
    match location {
        Some(location) if location.starts_with(prefix) => {
            location[prefix.len()..].to_string()
        }
        _ => {
            assert_res_ok!(res);
            panic!("expected a redirect to {prefix}..., got {location:?}");
        }
    }
}

pub async fn body_string(res: Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}
