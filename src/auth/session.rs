//! Session handling which applies to every route: anonymous visitors are sent
//! to the login page, signed-in users are kept away from the login and
//! registration forms, and sessions are extended while they are in use.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    auth::{LoginSession, session_lifetime, set_login_cookie},
    state::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Only for visitors who are not signed in.
    AuthOnly,
    /// Anyone may see these.
    Public,
    Protected,
}

pub fn classify(path: &str) -> Access {
    let segments: Vec<&str> =
        path.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        ["login"] | ["register"] => Access::AuthOnly,
        ["tournaments", _, "standings"]
        | ["tournaments", _, "standings", "live"] => Access::Public,
        _ => Access::Protected,
    }
}

pub fn login_redirect(path_and_query: &str) -> String {
    let next: String =
        url::form_urlencoded::byte_serialize(path_and_query.as_bytes())
            .collect();
    format!("/login?next={next}")
}

pub async fn handle_sessions(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    request: Request,
    next: Next,
) -> Response {
    let session = LoginSession::from_jar(&jar);
    let access = classify(request.uri().path());

    match (access, &session) {
        (Access::AuthOnly, Some(_)) => {
            return Redirect::to("/").into_response();
        }
        (Access::Protected, None) => {
            let target = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            tracing::debug!(target, "redirecting anonymous visitor to login");
            return Redirect::to(&login_redirect(target)).into_response();
        }
        _ => (),
    }

    let response = next.run(request).await;

    let lifetime = session_lifetime(state.config.session_days);
    match session {
        // do not resurrect a session which the handler has just ended
        Some(session)
            if session.needs_refresh(lifetime)
                && !response.headers().contains_key("set-cookie") =>
        {
            let jar = set_login_cookie(session.id, lifetime, jar);
            (jar, response).into_response()
        }
        _ => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standings_are_public() {
        assert_eq!(classify("/tournaments/abc/standings"), Access::Public);
        assert_eq!(classify("/tournaments/abc/standings/live"), Access::Public);
        assert_eq!(classify("/tournaments/abc"), Access::Protected);
        assert_eq!(classify("/"), Access::Protected);
        assert_eq!(classify("/login"), Access::AuthOnly);
        assert_eq!(classify("/register/"), Access::AuthOnly);
    }

    #[test]
    fn next_parameter_is_encoded() {
        assert_eq!(
            login_redirect("/matches?tournament=a&b"),
            "/login?next=%2Fmatches%3Ftournament%3Da%26b"
        );
    }
}
