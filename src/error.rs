use std::io;

use rocket::response::{Responder, Response};
use rocket::{
    http::{ContentType, Status},
    response,
    serde::json::Json,
    Request,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidationErrors;

use crate::db::DbError;

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ApiError {
    pub err: String,
}

impl ApiError {
    pub(crate) fn new(err: String) -> ApiError {
        ApiError { err }
    }
}

#[derive(Debug)]
pub(crate) struct ErrorResponse<T = ApiError> {
    json: Json<T>,
    status: Status,
}

impl ErrorResponse<ApiError> {
    pub(crate) fn new(status: Status, err: String) -> ErrorResponse<ApiError> {
        ErrorResponse {
            json: Json(ApiError::new(err)),
            status,
        }
    }
}

impl<'r, T: Serialize> Responder<'r, 'static> for ErrorResponse<T> {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        Response::build_from(self.json.respond_to(req)?)
            .status(self.status)
            .header(ContentType::JSON)
            .ok()
    }
}

#[derive(Debug, Error)]
pub enum ThingsError {
    #[error("UNAUTHORIZED")]
    Unauthorized,
    #[error("Couldn't validate identity token")]
    InvalidToken,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("Upload too large")]
    PayloadTooLarge,
    #[error("database error: {0}")]
    Database(#[from] DbError),
    #[error("storage error: {0}")]
    Storage(#[from] io::Error),
    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl ThingsError {
    pub(crate) fn status(&self) -> Status {
        match self {
            ThingsError::Unauthorized | ThingsError::InvalidToken => Status::Unauthorized,
            ThingsError::NotFound(_) => Status::NotFound,
            ThingsError::Validation(_) => Status::UnprocessableEntity,
            ThingsError::PayloadTooLarge => Status::PayloadTooLarge,
            ThingsError::Database(_) | ThingsError::Storage(_) | ThingsError::Internal(_) => {
                Status::InternalServerError
            }
        }
    }

    /// Message shown to the client. Server-side failures stay in the log.
    fn public_message(&self) -> String {
        match self.status().code {
            500 => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<ValidationErrors> for ThingsError {
    fn from(errors: ValidationErrors) -> Self {
        ThingsError::Validation(errors.to_string())
    }
}

impl<'r> Responder<'r, 'static> for ThingsError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status.code >= 500 {
            tracing::error!(error = %self, uri = %req.uri(), "request failed");
        }

        ErrorResponse::new(status, self.public_message()).respond_to(req)
    }
}

#[catch(default)]
pub(crate) fn default_catcher(status: Status, _req: &Request<'_>) -> ErrorResponse {
    let err = match status.code {
        401 => ThingsError::Unauthorized.to_string(),
        _ => status.reason().unwrap_or("Unknown error").to_string(),
    };

    ErrorResponse::new(status, err)
}
