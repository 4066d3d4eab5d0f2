//! Contract error types for the workshop orders module
//!
//! These errors are transport-agnostic and used for inter-module communication.

use std::fmt;

/// A single failed check, optionally tied to a row of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// 1-based row number within a batch (garments, shelf lines)
    pub row: Option<usize>,
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row: None,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn in_row(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row: Some(row),
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "Row {}: {}: {}", row, self.field, self.message),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

/// Workshop orders domain errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrdersError {
    /// Customer, order, measurement or catalog entry not found
    NotFound {
        /// Resource type (customer, order, measurement, ...)
        resource: String,
        /// Resource identifier
        id: String,
    },
    /// Local validation failed; one entry per field or row
    Validation {
        errors: Vec<FieldError>,
    },
    /// A business rule refused the operation (linking, account linkage, ...)
    BusinessRule {
        reason: String,
    },
    /// Requested fabric or shelf quantities exceed recorded stock
    InsufficientStock {
        shortages: Vec<String>,
    },
    /// The order is not in a state that allows the operation
    InvalidState {
        reason: String,
    },
    /// Internal error
    Internal,
}

impl OrdersError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![FieldError::new(field, message)],
        }
    }

    pub fn rule(reason: impl Into<String>) -> Self {
        Self::BusinessRule {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for OrdersError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { resource, id } => {
                write!(f, "{} not found: {}", resource, id)
            }
            Self::Validation { errors } => {
                let joined: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                write!(f, "Validation failed: {}", joined.join("; "))
            }
            Self::BusinessRule { reason } => {
                write!(f, "Rejected: {}", reason)
            }
            Self::InsufficientStock { shortages } => {
                write!(f, "Insufficient stock: {}", shortages.join("; "))
            }
            Self::InvalidState { reason } => {
                write!(f, "Invalid state: {}", reason)
            }
            Self::Internal => {
                write!(f, "Internal error")
            }
        }
    }
}

impl std::error::Error for OrdersError {}
