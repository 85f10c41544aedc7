// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::store::StoreError;
use paddock::CoreError;
use paddock_domain::DomainError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The request lost a race or no longer matches the current state.
    ///
    /// Conflicts are retryable after reloading.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ItemNotFound(_) => Self::ResourceNotFound {
                resource_type: String::from("Item"),
                message: err.to_string(),
            },
            StoreError::ProviderNotFound(_) => Self::ResourceNotFound {
                resource_type: String::from("Provider"),
                message: err.to_string(),
            },
            StoreError::VersionConflict { .. } | StoreError::SlotAlreadyBooked { .. } => {
                Self::Conflict {
                    message: err.to_string(),
                }
            }
            StoreError::DuplicateItem(_) | StoreError::AuditSinkUnavailable(_) => Self::Internal {
                message: err.to_string(),
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let field: &str = match &err {
        DomainError::InvalidTimeWindow { .. } | DomainError::TimeParseError { .. } => "window",
        DomainError::InvalidDayOfWeek(_) => "day_of_week",
        DomainError::InvalidSlotDuration(_) => "slot_duration_minutes",
        DomainError::InvalidDateRange { .. }
        | DomainError::DateRangeTooLong { .. }
        | DomainError::DateArithmeticOverflow { .. }
        | DomainError::DateParseError { .. } => "date",
        DomainError::OverlappingRecurringRules { .. } => "rules",
        DomainError::OverlappingSpecificSlots { .. } | DomainError::BookedSlotModified { .. } => {
            "slots"
        }
        DomainError::MissingResources { .. } => "resource_ids",
        DomainError::InvalidTitle(_) => "title",
        DomainError::InvalidRole(_) => "role",
        DomainError::InvalidItemKind(_) => "kind",
        DomainError::InvalidItemStatus(_) => "status",
        DomainError::InvalidAssignmentType(_)
        | DomainError::AssignmentWithoutAssignee { .. }
        | DomainError::UnexpectedAssignee { .. } => "assignment_type",
        DomainError::InvalidPriority(_) => "priority",
        DomainError::InvalidBookingType(_) => "booking_type",
        DomainError::CompletionWithoutTimestamp { .. } => "completed_at",
    };

    ApiError::InvalidInput {
        field: String::from(field),
        message: err.to_string(),
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::InvalidTransition { .. } | CoreError::SlotUnavailable { .. } => {
            ApiError::Conflict {
                message: err.to_string(),
            }
        }
        CoreError::Unauthorized {
            action,
            required_role,
        } => ApiError::Unauthorized {
            action: String::from(action),
            required_role: String::from(required_role),
        },
        CoreError::MissingField(field) => ApiError::InvalidInput {
            field: String::from(field),
            message: err.to_string(),
        },
        CoreError::ItemNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Item"),
            message: err.to_string(),
        },
    }
}
