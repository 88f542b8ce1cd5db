use crate::error::Error;
use std::fmt::Display;
use warp::{
    http::StatusCode,
    reject::{Reject, Rejection},
    reply::{Reply, Response},
};

#[derive(Debug, Clone)]
enum MininetRejection {
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    Redirect(&'static str),
    InternalServerError,
}
impl Reject for MininetRejection {}

/// Plain-text error htmx shows without swapping anything
fn fragment_error(message: String, status: StatusCode) -> Response {
    warp::reply::with_status(
        warp::reply::with_header(message, "HX-Reswap", "none"),
        status,
    )
    .into_response()
}

impl Reply for MininetRejection {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(reply) => fragment_error(reply, StatusCode::BAD_REQUEST),
            Self::Forbidden(reply) => fragment_error(reply, StatusCode::FORBIDDEN),
            Self::NotFound(reply) => fragment_error(reply, StatusCode::NOT_FOUND),
            Self::Redirect(location) => crate::util::redirect(location),
            Self::InternalServerError => fragment_error(
                "Internal Server Error".to_owned(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        }
    }
}

pub fn bad_request(reply: impl ToString) -> Rejection {
    warp::reject::custom(MininetRejection::BadRequest(reply.to_string()))
}
pub fn not_found(reply: impl ToString) -> Rejection {
    warp::reject::custom(MininetRejection::NotFound(reply.to_string()))
}
pub fn redirect(location: &'static str) -> Rejection {
    warp::reject::custom(MininetRejection::Redirect(location))
}
pub fn internal_server_error() -> Rejection {
    warp::reject::custom(MininetRejection::InternalServerError)
}

pub trait TryExt<T> {
    fn or_500(self) -> Result<T, Rejection>;

    fn or_bad_request(self, reply: impl ToString) -> Result<T, Rejection>;
}

impl<T, E: Display> TryExt<T> for Result<T, E> {
    fn or_500(self) -> Result<T, Rejection> {
        self.map_err(|e| {
            tracing::error!("{}", e);
            internal_server_error()
        })
    }

    fn or_bad_request(self, reply: impl ToString) -> Result<T, Rejection> {
        self.map_err(|e| {
            tracing::info!("{}", e);
            bad_request(reply)
        })
    }
}

impl From<Error> for Rejection {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => bad_request(msg),
            Error::NotFound(msg) => {
                tracing::info!("{}", msg);
                not_found(msg)
            }
            Error::Forbidden(msg) => {
                tracing::warn!("{}", msg);
                warp::reject::custom(MininetRejection::Forbidden(msg))
            }
            e @ (Error::Database(_) | Error::Timeout(_)) => {
                tracing::error!("{}", e);
                internal_server_error()
            }
        }
    }
}

#[tracing::instrument(level = "debug")]
pub async fn handle_rejections(err: Rejection) -> Result<Response, Rejection> {
    if let Some(err) = err.find::<MininetRejection>() {
        Ok(err.clone().into_response())
    } else if err.is_not_found() {
        Ok(crate::util::redirect("/"))
    } else {
        Err(err)
    }
}
