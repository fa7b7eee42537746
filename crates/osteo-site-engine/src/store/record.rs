use std::fmt;

/// A field value rejected before any write is attempted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// An entity kept in a [`crate::store::Store`]
pub trait Record: Clone + fmt::Debug {
    /// Human readable entity name used in errors and logs
    const LABEL: &'static str;

    fn validate(&self) -> Result<(), ValidationError>;
}
