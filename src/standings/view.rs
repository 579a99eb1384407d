//! The public standings page, and the websocket which tells it to reload.

use axum::{
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use axum_extra::extract::PrivateCookieJar;
use diesel::QueryResult;
use futures::future::join3;
use hypertext::{Raw, prelude::*};
use tokio::{
    sync::broadcast::{Receiver, Sender, error::RecvError},
    task::spawn_blocking,
};

use crate::{
    auth::{LoginSession, User},
    msg::Msg,
    standings::compute::{StandingRow, fetch_standings},
    state::{AppState, DbPool, PooledConn},
    template::{Page, Section},
    tournaments::Tournament,
    util_resp::{FailureResponse, StandardResponse, degrade, success},
    widgets::alert::InfoAlert,
};

/// Runs `f` on a pooled connection of its own, off the async runtime.
async fn with_conn<T, F>(pool: DbPool, f: F) -> Result<T, FailureResponse>
where
    T: Send + 'static,
    F: FnOnce(&mut PooledConn) -> T + Send + 'static,
{
    spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| {
            tracing::error!("could not check out a connection: {e}");
            FailureResponse::ServerError(())
        })?;
        Ok(f(&mut conn))
    })
    .await
    .map_err(|e| {
        tracing::error!("standings task failed: {e}");
        FailureResponse::ServerError(())
    })?
}

/// Like [`degrade`], for a query run through [`with_conn`]. A failed checkout
/// or task has already been logged there.
fn degrade_task<T: Default>(
    what: &str,
    result: Result<QueryResult<T>, FailureResponse>,
) -> T {
    match result {
        Ok(result) => degrade(what, result),
        Err(_) => T::default(),
    }
}

/// Visible without signing in. The tournament, its table and the current
/// user are loaded concurrently.
pub async fn standings_page(
    Path(tid): Path<String>,
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> StandardResponse {
    let scoring = state.config.scoring.clone();
    let session = LoginSession::from_jar(&jar);

    let tid1 = tid.clone();
    let tid2 = tid.clone();
    let (tournament, standings, user) = join3(
        with_conn(state.pool.clone(), move |conn| {
            Tournament::fetch(&tid1, conn)
        }),
        with_conn(state.pool.clone(), move |conn| {
            fetch_standings(&tid2, &scoring, conn)
        }),
        with_conn(state.pool.clone(), move |conn| match session {
            Some(session) => degrade("current user", User::fetch(&session.id, conn)),
            None => None,
        }),
    )
    .await;

    let tournament = tournament??;
    let standings: Vec<StandingRow> = degrade_task("standings", standings);
    let user = user.ok().flatten();

    let script = format!(
        r#"
        (function() {{
            var scheme = window.location.protocol === "https:" ? "wss://" : "ws://";
            var ws = new WebSocket(scheme + window.location.host + "/tournaments/{tid}/standings/live");
            ws.onmessage = function(event) {{
                if (event.data === "refresh") {{
                    window.location.reload();
                }}
            }};
        }})();
        "#
    );

    success(
        Page::new_full()
            .user_opt(user)
            .section(Section::Tournaments)
            .extra_head(maud! {
                script { (Raw::dangerously_create(&script)) }
            })
            .body(maud! {
                h1 { (tournament.name) ": standings" }
                p class="text-muted" {
                    a href=(format!("/tournaments/{}", tournament.id)) { (tournament.category) }
                    ", group phase. This table updates when a result is recorded."
                }
                @if !tournament.has_group_phase {
                    InfoAlert msg="This tournament has no group phase, so there is no league table.";
                } @else if standings.is_empty() {
                    InfoAlert msg="No teams have registered yet.";
                } @else {
                    table class="table table-striped align-middle" {
                        thead {
                            tr {
                                th scope="col" { "#" }
                                th scope="col" { "Team" }
                                th scope="col" class="text-end" title="Played" { "P" }
                                th scope="col" class="text-end" title="Won" { "W" }
                                th scope="col" class="text-end" title="Drawn" { "D" }
                                th scope="col" class="text-end" title="Lost" { "L" }
                                th scope="col" class="text-end" title="Goals for" { "GF" }
                                th scope="col" class="text-end" title="Goals against" { "GA" }
                                th scope="col" class="text-end" title="Goal difference" { "GD" }
                                th scope="col" class="text-end" { "Pts" }
                            }
                        }
                        tbody {
                            @for row in &standings {
                                tr {
                                    td { (row.rank_label()) }
                                    td { (row.team_name) }
                                    td class="text-end" { (row.played) }
                                    td class="text-end" { (row.won) }
                                    td class="text-end" { (row.drawn) }
                                    td class="text-end" { (row.lost) }
                                    td class="text-end" { (row.goals_for) }
                                    td class="text-end" { (row.goals_against) }
                                    td class="text-end" { (format!("{:+}", row.goal_difference())) }
                                    td class="text-end fw-bold" { (row.points) }
                                }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}

/// Sends `refresh` to the client whenever a match of `tid` changes.
pub async fn standings_updates(
    Path(tid): Path<String>,
    State(tx): State<Sender<Msg>>,
    ws: WebSocketUpgrade,
) -> Response {
    let rx = tx.subscribe();
    ws.on_upgrade(move |socket| forward_refreshes(socket, tid, rx))
}

async fn forward_refreshes(
    mut socket: WebSocket,
    tid: String,
    mut rx: Receiver<Msg>,
) {
    loop {
        let refresh = match rx.recv().await {
            Ok(msg) => msg.tournament_id == tid,
            // some messages were dropped; one of them may have been ours
            Err(RecvError::Lagged(n)) => {
                tracing::debug!(skipped = n, "standings listener lagged");
                true
            }
            Err(RecvError::Closed) => break,
        };

        if refresh
            && socket
                .send(Message::Text("refresh".to_string()))
                .await
                .is_err()
        {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_standings_loads_render_an_empty_table() {
        let checkout_failed: Result<QueryResult<Vec<i64>>, _> =
            Err(FailureResponse::ServerError(()));
        assert!(degrade_task("standings", checkout_failed).is_empty());

        let query_failed: Result<QueryResult<Vec<i64>>, FailureResponse> =
            Ok(Err(diesel::result::Error::NotFound));
        assert!(degrade_task("standings", query_failed).is_empty());

        let loaded: Result<QueryResult<Vec<i64>>, FailureResponse> =
            Ok(Ok(vec![3, 1]));
        assert_eq!(degrade_task("standings", loaded), vec![3, 1]);
    }
}
