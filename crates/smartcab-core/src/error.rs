//! Error types for Smartcab

use thiserror::Error;

use crate::types::Action;

/// Main error type for Smartcab
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SmartcabError {
    /// A reading fell outside its field's finite domain
    #[error("Domain error: {field} has no value {value:?}")]
    Domain { field: &'static str, value: String },

    /// A (state, action) pair was never enumerated by the value table
    #[error("Lookup error: no entry for state {state} and action {action}")]
    Lookup { state: String, action: Action },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment error: {0}")]
    Environment(String),
}

impl SmartcabError {
    pub fn domain(field: &'static str, value: impl Into<String>) -> Self {
        Self::Domain {
            field,
            value: value.into(),
        }
    }

    pub fn lookup(state: impl std::fmt::Display, action: Action) -> Self {
        Self::Lookup {
            state: state.to_string(),
            action,
        }
    }
}

/// Result type alias for Smartcab operations
pub type Result<T> = std::result::Result<T, SmartcabError>;

