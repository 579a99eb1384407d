use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use diesel::QueryResult;
use hypertext::{Rendered, prelude::*};

use crate::{template::Page, widgets::alert::ErrorAlert};

pub fn see_other_ok(to: impl Into<String>) -> StandardResponse {
    Ok(SuccessResponse::SeeOther(to.into()))
}

pub fn bad_request(html: Rendered<String>) -> StandardResponse {
    Err(FailureResponse::BadRequest(html))
}

pub fn success(html: Rendered<String>) -> StandardResponse {
    Ok(SuccessResponse::Success(html))
}

/// Secondary page content (lists, counts, tables) falls back to its default
/// value when loading it fails, so that the rest of the page still renders.
pub fn degrade<T: Default>(what: &str, result: QueryResult<T>) -> T {
    match result {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!("failed to load {what}, rendering without it: {e}");
            T::default()
        }
    }
}

pub type StandardResponse = Result<SuccessResponse, FailureResponse>;

pub enum SuccessResponse {
    Success(Rendered<String>),
    SeeOther(String),
    Csv { filename: String, body: String },
}

impl IntoResponse for SuccessResponse {
    fn into_response(self) -> Response {
        match self {
            SuccessResponse::Success(html) => {
                Html(html.into_inner()).into_response()
            }
            SuccessResponse::SeeOther(to) => Redirect::to(&to).into_response(),
            SuccessResponse::Csv { filename, body } => (
                [
                    ("content-type", "text/csv; charset=utf-8".to_string()),
                    (
                        "content-disposition",
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                body,
            )
                .into_response(),
        }
    }
}

#[derive(Debug)]
pub enum FailureResponse {
    BadRequest(Rendered<String>),
    NotFound(()),
    Forbidden(()),
    ServerError(()),
}

impl From<diesel::result::Error> for FailureResponse {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => FailureResponse::NotFound(()),
            e => {
                tracing::error!("database error: {e}");
                FailureResponse::ServerError(())
            }
        }
    }
}

fn error_page(msg: &str) -> String {
    Page::new()
        .body(maud! {
            div class="container mt-4" {
                ErrorAlert msg=(msg);
                a href="/" { "Return to the dashboard" }
            }
        })
        .render()
        .into_inner()
}

impl IntoResponse for FailureResponse {
    fn into_response(self) -> Response {
        match self {
            FailureResponse::BadRequest(html) => {
                (StatusCode::BAD_REQUEST, Html(html.into_inner())).into_response()
            }
            FailureResponse::NotFound(()) => (
                StatusCode::NOT_FOUND,
                Html(error_page("The requested page does not exist.")),
            )
                .into_response(),
            FailureResponse::Forbidden(()) => (
                StatusCode::FORBIDDEN,
                Html(error_page(
                    "You do not have permission to perform this action.",
                )),
            )
                .into_response(),
            FailureResponse::ServerError(()) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(error_page("Something went wrong on our side.")),
            )
                .into_response(),
        }
    }
}
