// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error taxonomy for programmer-facing failures.
//!
//! These are raised synchronously at configuration-load and public-API call
//! time. Reconciliation mismatches between the viewer and the mapping are
//! not errors; they are logged and ignored where they occur.

use thiserror::Error;

/// Stable machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Selector used before any mapping was loaded.
    NoMapping,
    /// Unknown attribute name.
    AttributeNotFound,
    /// Unknown value within a known attribute.
    ValueNotFound,
    /// Mapping failed validation.
    InvalidMapping,
    /// A mutation batch was not a well-formed sequence.
    InvalidMutations,
    /// Malformed argument (e.g. snapshot filename).
    InvalidParameter,
    /// Host DOM target missing.
    ParentNotFound,
}

impl ErrorCode {
    /// Every code, in declaration order.
    pub const ALL: [ErrorCode; 7] = [
        ErrorCode::NoMapping,
        ErrorCode::AttributeNotFound,
        ErrorCode::ValueNotFound,
        ErrorCode::InvalidMapping,
        ErrorCode::InvalidMutations,
        ErrorCode::InvalidParameter,
        ErrorCode::ParentNotFound,
    ];

    /// Code string as exposed to JavaScript callers.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NoMapping => "NO_MAPPING",
            ErrorCode::AttributeNotFound => "ATTRIBUTE_NOT_FOUND",
            ErrorCode::ValueNotFound => "VALUE_NOT_FOUND",
            ErrorCode::InvalidMapping => "INVALID_MAPPING",
            ErrorCode::InvalidMutations => "INVALID_MUTATIONS",
            ErrorCode::InvalidParameter => "INVALID_PARAMETER",
            ErrorCode::ParentNotFound => "PARENT_NOT_FOUND",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VirtualdisplayError {
    /// No mapping has been loaded yet.
    #[error("No mapping configured. Call setMapping() first.")]
    NoMapping,
    /// The attribute does not exist in the loaded mapping.
    #[error("Attribute \"{attribute}\" not found in mapping")]
    AttributeNotFound {
        /// Requested attribute name.
        attribute: String,
    },
    /// The value does not exist within the attribute.
    #[error("Value \"{value}\" not found for attribute \"{attribute}\"")]
    ValueNotFound {
        /// Attribute name.
        attribute: String,
        /// Requested value name.
        value: String,
    },
    /// The mapping configuration failed validation.
    #[error("Invalid mapping configuration{}", reason_suffix(.reason))]
    InvalidMapping {
        /// All violations, joined by `", "`.
        reason: Option<String>,
    },
    /// A mutation batch was malformed.
    #[error("Invalid mutations: {reason}")]
    InvalidMutations {
        /// What was wrong with the batch.
        reason: String,
    },
    /// A public API argument was malformed.
    #[error("{reason}")]
    InvalidParameter {
        /// What was wrong with the argument.
        reason: String,
    },
    /// The host element to attach the viewer to does not exist.
    #[error("Parent element not found: {selector}")]
    ParentNotFound {
        /// Selector that matched nothing.
        selector: String,
    },
}

impl VirtualdisplayError {
    /// Stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            VirtualdisplayError::NoMapping => ErrorCode::NoMapping,
            VirtualdisplayError::AttributeNotFound { .. } => ErrorCode::AttributeNotFound,
            VirtualdisplayError::ValueNotFound { .. } => ErrorCode::ValueNotFound,
            VirtualdisplayError::InvalidMapping { .. } => ErrorCode::InvalidMapping,
            VirtualdisplayError::InvalidMutations { .. } => ErrorCode::InvalidMutations,
            VirtualdisplayError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            VirtualdisplayError::ParentNotFound { .. } => ErrorCode::ParentNotFound,
        }
    }

    pub(crate) fn attribute_not_found(attribute: &str) -> Self {
        VirtualdisplayError::AttributeNotFound {
            attribute: attribute.to_owned(),
        }
    }

    pub(crate) fn value_not_found(attribute: &str, value: &str) -> Self {
        VirtualdisplayError::ValueNotFound {
            attribute: attribute.to_owned(),
            value: value.to_owned(),
        }
    }

    pub(crate) fn invalid_mapping(violations: &[String]) -> Self {
        VirtualdisplayError::InvalidMapping {
            reason: (!violations.is_empty()).then(|| violations.join(", ")),
        }
    }

    pub(crate) fn invalid_mutations(reason: impl Into<String>) -> Self {
        VirtualdisplayError::InvalidMutations {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_parameter(reason: impl Into<String>) -> Self {
        VirtualdisplayError::InvalidParameter {
            reason: reason.into(),
        }
    }
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(": {r}"))
        .unwrap_or_default()
}

/// Result alias used across the crate.
pub type Result<T, E = VirtualdisplayError> = std::result::Result<T, E>;
