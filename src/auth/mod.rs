use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use chrono::{Duration, NaiveDateTime, Utc};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};

use crate::{
    permission::Role,
    schema::users,
    state::{DbPool, ThreadSafeConn},
};

pub mod login;
pub mod logout;
pub mod register;
pub mod session;

pub const LOGIN_COOKIE: &str = "cancha_session";

#[derive(Debug, Queryable, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn validate_username(username: &str) -> bool {
        (username.chars().count() > 3)
            && username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    pub fn validate_password(password: &str) -> bool {
        password.len() > 6
    }

    /// Unknown role strings are treated as the least privileged role.
    pub fn role(&self) -> Role {
        Role::parse(&self.role).unwrap_or(Role::Viewer)
    }

    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Option<User>> {
        users::table
            .filter(users::id.eq(id))
            .first::<User>(conn)
            .optional()
    }

    pub fn all(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<User>> {
        users::table.order_by(users::username.asc()).load::<User>(conn)
    }

    pub fn verify_password(&self, password: &str) -> bool {
        match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::error!(user = %self.id, "stored hash is malformed: {e}");
                false
            }
        }
    }
}

pub fn hash_password(
    password: &str,
) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

#[derive(Debug)]
pub enum AuthError {
    CookieMissingOrMalformed,
    NoDatabase,
    Unauthorized,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::CookieMissingOrMalformed | AuthError::Unauthorized => {
                Redirect::to("/login").into_response()
            }
            AuthError::NoDatabase => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
                    .into_response()
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginSession {
    pub id: String,
    pub expiry: NaiveDateTime,
}

impl LoginSession {
    /// The session stored in `jar`, if it is present and has not expired.
    pub fn from_jar(jar: &PrivateCookieJar) -> Option<LoginSession> {
        let cookie = jar.get(LOGIN_COOKIE)?;
        match serde_json::from_str::<LoginSession>(cookie.value()) {
            Ok(t) if Utc::now().naive_utc() < t.expiry => Some(t),
            _ => None,
        }
    }

    /// Whether less than half of `lifetime` remains.
    pub fn needs_refresh(&self, lifetime: Duration) -> bool {
        self.expiry - Utc::now().naive_utc() < lifetime / 2
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for User
where
    S: Send + Sync,
    DbPool: FromRef<S>,
    Key: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let jar: PrivateCookieJar<Key> =
            PrivateCookieJar::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::CookieMissingOrMalformed)?;

        let login = LoginSession::from_jar(&jar).ok_or(AuthError::Unauthorized)?;

        let conn_wrapper = ThreadSafeConn::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthError::NoDatabase)?;
        let mut conn = conn_wrapper
            .inner
            .try_lock()
            .map_err(|_| AuthError::NoDatabase)?;

        match User::fetch(&login.id, &mut *conn)
            .map_err(|_| AuthError::NoDatabase)?
        {
            Some(user) => Ok(user),
            None => Err(AuthError::Unauthorized),
        }
    }
}

pub fn set_login_cookie(
    id: String,
    lifetime: Duration,
    jar: PrivateCookieJar,
) -> PrivateCookieJar {
    let session = LoginSession {
        id,
        expiry: Utc::now().naive_utc() + lifetime,
    };
    let value = match serde_json::to_string(&session) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("could not serialize session: {e}");
            return jar;
        }
    };

    let mut cookie = Cookie::new(LOGIN_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    jar.add(cookie)
}

pub fn session_lifetime(days: u64) -> Duration {
    Duration::days(days.clamp(1, 3650) as i64)
}
