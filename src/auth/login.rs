use std::sync::Arc;

use axum::extract::{Form, Query, State};
use axum_extra::extract::PrivateCookieJar;
use diesel::prelude::*;
use hypertext::prelude::*;
use serde::Deserialize;
use url::Url;

use crate::{
    auth::{User, session_lifetime, set_login_cookie},
    config::AppConfig,
    schema::users,
    state::Conn,
    template::Page,
    util_resp::{FailureResponse, StandardResponse, SuccessResponse},
    widgets::alert::ErrorAlert,
};

fn login_form(error: Option<&str>) -> Rendered<String> {
    Page::new()
        .body(maud! {
            div class="row justify-content-center" {
                div class="col-md-6 col-lg-4" {
                    h1 class="mb-3" { "Sign in" }
                    @if let Some(error) = error {
                        ErrorAlert msg=(error);
                    }
                    form method="post" {
                        div class="mb-3" {
                            label for="id" class="form-label" { "Email or username" }
                            input type="text" class="form-control" id="id" name="id" required;
                        }
                        div class="mb-3" {
                            label for="password" class="form-label" { "Password" }
                            input type="password" class="form-control" id="password" name="password" required;
                        }
                        button type="submit" class="btn btn-primary" { "Sign in" }
                    }
                    p class="mt-3" {
                        "No account yet? " a href="/register" { "Register" }
                    }
                }
            }
        })
        .render()
}

pub async fn login_page() -> StandardResponse {
    Ok(SuccessResponse::Success(login_form(None)))
}

#[derive(Deserialize)]
pub struct LoginQuery {
    next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    id: String,
    password: String,
}

/// Only paths on this site are followed after logging in.
fn redirect_target(next: Option<&str>) -> String {
    let base = Url::parse("http://localhost/").ok();
    match (base, next) {
        (Some(base), Some(next)) if next.starts_with('/') => {
            match base.join(next) {
                Ok(url) if url.host_str() == Some("localhost") => {
                    match url.query() {
                        Some(query) => format!("{}?{query}", url.path()),
                        None => url.path().to_string(),
                    }
                }
                _ => "/".to_string(),
            }
        }
        _ => "/".to_string(),
    }
}

pub async fn do_login(
    Query(query): Query<LoginQuery>,
    State(config): State<Arc<AppConfig>>,
    jar: PrivateCookieJar,
    mut conn: Conn,
    Form(form): Form<LoginForm>,
) -> Result<(PrivateCookieJar, SuccessResponse), FailureResponse> {
    let user = users::table
        .filter(users::email.eq(&form.id).or(users::username.eq(&form.id)))
        .first::<User>(&mut *conn)
        .optional()?;

    let user = match user {
        Some(user) if user.verify_password(&form.password) => user,
        // the same message for both, so as not to reveal which accounts exist
        _ => {
            tracing::info!(id = %form.id, "failed login attempt");
            return Err(FailureResponse::BadRequest(login_form(Some(
                "Incorrect username or password.",
            ))));
        }
    };

    tracing::info!(user = %user.id, "user logged in");

    let jar = set_login_cookie(
        user.id,
        session_lifetime(config.session_days),
        jar,
    );

    Ok((
        jar,
        SuccessResponse::SeeOther(redirect_target(query.next.as_deref())),
    ))
}

#[cfg(test)]
mod tests {
    use super::redirect_target;

    #[test]
    fn only_local_redirects_are_followed() {
        assert_eq!(redirect_target(None), "/");
        assert_eq!(redirect_target(Some("/matches")), "/matches");
        assert_eq!(
            redirect_target(Some("/matches?tournament=x")),
            "/matches?tournament=x"
        );
        assert_eq!(redirect_target(Some("https://evil.example/")), "/");
        assert_eq!(redirect_target(Some("//evil.example/x")), "/");
    }
}
