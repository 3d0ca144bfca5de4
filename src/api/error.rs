use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::{db::rates::MissingSupplier, prelude::*, validation::Violations};

/// Error answered to the client.
#[derive(Debug, derive_more::Display)]
pub enum ApiError {
    #[display("{_0}")]
    BadRequest(String),

    #[display("validation failed")]
    Validation(Violations),

    #[display("unauthorized")]
    Unauthorized,

    #[display("{_0}")]
    NotFound(String),

    #[display("{_0:#}")]
    Internal(Error),
}

impl ApiError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{what} not found"))
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        match error.downcast::<MissingSupplier>() {
            Ok(MissingSupplier(supplier_id)) => {
                Self::BadRequest(format!("Supplier with ID {supplier_id} does not exist"))
            }
            Err(error) => Self::Internal(error),
        }
    }
}

impl From<Violations> for ApiError {
    fn from(violations: Violations) -> Self {
        Self::Validation(violations)
    }
}

#[skip_serializing_none]
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    errors: Option<Violations>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let body = match self {
            Self::Internal(error) => {
                error!("{error:#}");
                ErrorBody { error: "An error occurred while processing the request".into(), errors: None }
            }
            Self::Validation(violations) => {
                ErrorBody { error: "Validation failed".into(), errors: Some(violations) }
            }
            Self::Unauthorized => ErrorBody { error: "Unauthorized".into(), errors: None },
            Self::BadRequest(message) | Self::NotFound(message) => {
                ErrorBody { error: message, errors: None }
            }
        };
        (status_code, Json(body)).into_response()
    }
}
