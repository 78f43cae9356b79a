use crate::models::ErrorResponse;
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::serde::json::Json;
use rocket::{catch, response, Response};
use std::io::Cursor;
use thiserror::Error;

/// Failure modes the frontend is expected to distinguish, mapped onto HTTP
/// statuses by the `Responder` impl below.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("upstream source unavailable: {0}")]
    SourceUnavailable(String),
}

impl LookupError {
    pub fn status(&self) -> Status {
        match self {
            LookupError::InvalidInput(_) => Status::BadRequest,
            LookupError::NotFound(_) => Status::NotFound,
            LookupError::SourceUnavailable(_) => Status::BadGateway,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            LookupError::InvalidInput(_) => "invalid_input",
            LookupError::NotFound(_) => "not_found",
            LookupError::SourceUnavailable(_) => "source_unavailable",
        }
    }
}

impl<'r> Responder<'r, 'static> for LookupError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        };
        let json = serde_json::to_string(&body).map_err(|_| Status::InternalServerError)?;
        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}

/// Requests that never reach a handler (unknown routes, undecodable bodies)
/// answer with the same `{error, message}` shape as `LookupError`.
#[catch(default)]
pub fn default_catcher(status: Status, _request: &Request) -> Json<ErrorResponse> {
    let (error, message) = match status.code {
        400 => ("invalid_input", "Malformed request"),
        404 => ("not_found", "Resource not found"),
        422 => ("invalid_input", "Request body could not be processed"),
        _ => ("error", status.reason_lossy()),
    };
    Json(ErrorResponse {
        error: error.to_string(),
        message: message.to_string(),
    })
}
