use axum::extract::{Form, Path};
use diesel::prelude::*;
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    auth::User,
    permission::{Permission, Role},
    schema::users,
    state::Conn,
    template::{Page, Section},
    util_resp::{
        FailureResponse, StandardResponse, bad_request, degrade, see_other_ok,
        success,
    },
    widgets::alert::ErrorAlert,
};

#[derive(Deserialize)]
pub struct RoleForm {
    pub role: String,
}

fn users_page(user: User, error: Option<&str>, conn: &mut Conn) -> Rendered<String> {
    let all = degrade("users", User::all(&mut **conn));
    let own_id = user.id.clone();

    Page::new()
        .user(user)
        .section(Section::Users)
        .body(maud! {
            h1 { "Users" }
            @if let Some(error) = error {
                ErrorAlert msg=(error);
            }
            table class="table align-middle" {
                thead {
                    tr {
                        th scope="col" { "Username" }
                        th scope="col" { "Email" }
                        th scope="col" { "Joined" }
                        th scope="col" { "Role" }
                    }
                }
                tbody {
                    @for u in &all {
                        tr {
                            td { (u.username) }
                            td { (u.email) }
                            td { (u.created_at.format("%Y-%m-%d").to_string()) }
                            td {
                                @if u.id == own_id {
                                    (u.role().as_str()) " (you)"
                                } @else {
                                    form method="post"
                                        action=(format!("/admin/users/{}/role", u.id))
                                        class="d-flex gap-2" {
                                        select class="form-select form-select-sm" name="role" {
                                            @for role in Role::ALL {
                                                option value=(role.as_str())
                                                    selected[role == u.role()] {
                                                    (role.as_str())
                                                }
                                            }
                                        }
                                        button type="submit" class="btn btn-sm btn-outline-primary" {
                                            "Set"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        })
        .render()
}

pub async fn list_users_page(user: User, mut conn: Conn) -> StandardResponse {
    user.check_permission(Permission::ManageUsers)?;
    success(users_page(user, None, &mut conn))
}

/// Administrators cannot change their own role, so there is always at
/// least one of them.
pub async fn do_set_role(
    Path(user_id): Path<String>,
    user: User,
    mut conn: Conn,
    Form(form): Form<RoleForm>,
) -> StandardResponse {
    user.check_permission(Permission::ManageUsers)?;

    let Some(role) = Role::parse(form.role.trim()) else {
        return bad_request(users_page(user, Some("Unknown role."), &mut conn));
    };
    if user_id == user.id {
        return bad_request(users_page(
            user,
            Some("You cannot change your own role."),
            &mut conn,
        ));
    }
    let target = User::fetch(&user_id, &mut *conn)?
        .ok_or(FailureResponse::NotFound(()))?;

    diesel::update(users::table.filter(users::id.eq(&target.id)))
        .set(users::role.eq(role.as_str()))
        .execute(&mut *conn)?;

    tracing::info!(
        admin = %user.id,
        user = %target.id,
        role = role.as_str(),
        "changed role"
    );

    see_other_ok("/admin/users")
}
