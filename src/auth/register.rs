use std::sync::Arc;

use axum::extract::{Form, State};
use axum_extra::extract::PrivateCookieJar;
use chrono::Utc;
use diesel::{insert_into, prelude::*};
use hypertext::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{User, hash_password, session_lifetime, set_login_cookie},
    config::AppConfig,
    permission::Role,
    schema::users,
    state::Conn,
    template::{
        Page,
        form::{FormErrorSummary, TextInput},
    },
    util_resp::{FailureResponse, StandardResponse, SuccessResponse},
    validation::{FormErrors, is_ascii_no_spaces, is_valid_email},
};

#[derive(Deserialize, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

impl RegisterForm {
    fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        if !User::validate_username(&self.username) {
            errors.add(
                "username",
                "usernames have more than three characters, using only \
                 letters, digits and underscores",
            );
        }
        errors.check("username", is_ascii_no_spaces(&self.username));
        errors.check("email", is_valid_email(&self.email));
        if !User::validate_password(&self.password) {
            errors.add("password", "passwords must be longer than six characters");
        }
        if self.password != self.password2 {
            errors.add("password2", "the passwords do not match");
        }
        errors
    }
}

fn register_form(form: &RegisterForm, errors: &FormErrors) -> Rendered<String> {
    Page::new()
        .body(maud! {
            div class="row justify-content-center" {
                div class="col-md-6 col-lg-4" {
                    h1 class="mb-3" { "Create an account" }
                    FormErrorSummary errors=(errors);
                    form method="post" {
                        (TextInput::new("Username", "username", &form.username, errors))
                        (TextInput::new("Email", "email", &form.email, errors).kind("email"))
                        (TextInput::new("Password", "password", "", errors).kind("password"))
                        (TextInput::new("Repeat password", "password2", "", errors).kind("password"))
                        button type="submit" class="btn btn-primary" { "Register" }
                    }
                }
            }
        })
        .render()
}

pub async fn register_page() -> StandardResponse {
    Ok(SuccessResponse::Success(register_form(
        &RegisterForm::default(),
        &FormErrors::new(),
    )))
}

pub async fn do_register(
    State(config): State<Arc<AppConfig>>,
    jar: PrivateCookieJar,
    mut conn: Conn,
    Form(form): Form<RegisterForm>,
) -> Result<(PrivateCookieJar, SuccessResponse), FailureResponse> {
    let mut errors = form.validate();

    let existing = users::table
        .filter(
            users::username
                .eq(&form.username)
                .or(users::email.eq(&form.email)),
        )
        .first::<User>(&mut *conn)
        .optional()?;

    if let Some(user) = existing {
        if user.email == form.email {
            errors.add("email", "that email is already taken");
        } else {
            errors.add("username", "that username is already taken");
        }
    }

    if !errors.is_empty() {
        return Err(FailureResponse::BadRequest(register_form(&form, &errors)));
    }

    // the first account administers the installation
    let n_users = users::table.count().get_result::<i64>(&mut *conn)?;
    let role = if n_users == 0 { Role::Admin } else { Role::Viewer };

    let password_hash = hash_password(&form.password).map_err(|e| {
        tracing::error!("could not hash password: {e}");
        FailureResponse::ServerError(())
    })?;

    let id = Uuid::now_v7().to_string();
    insert_into(users::table)
        .values((
            users::id.eq(&id),
            users::email.eq(&form.email),
            users::username.eq(&form.username),
            users::password_hash.eq(password_hash),
            users::role.eq(role.as_str()),
            users::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)?;

    tracing::info!(user = %id, %role, "registered new user");

    let jar = set_login_cookie(id, session_lifetime(config.session_days), jar);
    Ok((jar, SuccessResponse::SeeOther("/".to_string())))
}
