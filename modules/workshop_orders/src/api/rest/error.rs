//! HTTP error mapping to RFC-9457 Problem Details

use crate::contract::OrdersError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// RFC-9457 Problem Details for HTTP API errors
#[derive(Debug, Serialize)]
pub struct Problem {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub type_uri: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// One entry per failed field, row or short stock item
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl Problem {
    /// Create a new Problem Details response
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            errors: Vec::new(),
        }
    }

    /// Add detail message
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Map domain errors to HTTP Problem Details
pub fn map_domain_error(error: OrdersError) -> Problem {
    match error {
        OrdersError::NotFound { resource, id } => {
            Problem::new(StatusCode::NOT_FOUND, format!("{} Not Found", resource))
                .with_detail(format!("{} '{}' was not found", resource, id))
        }

        OrdersError::Validation { errors } => {
            let errors: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            Problem::new(StatusCode::BAD_REQUEST, "Validation Error")
                .with_detail(format!("{} field(s) failed validation", errors.len()))
                .with_errors(errors)
        }

        OrdersError::BusinessRule { reason } => {
            Problem::new(StatusCode::UNPROCESSABLE_ENTITY, "Request Rejected").with_detail(reason)
        }

        OrdersError::InsufficientStock { shortages } => {
            Problem::new(StatusCode::CONFLICT, "Insufficient Stock")
                .with_detail("Requested quantities exceed the available stock")
                .with_errors(shortages)
        }

        OrdersError::InvalidState { reason } => {
            Problem::new(StatusCode::CONFLICT, "Invalid Order State").with_detail(reason)
        }

        OrdersError::Internal => {
            Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                .with_detail("An unexpected error occurred")
        }
    }
}
