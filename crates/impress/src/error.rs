//! Navigation error types

use impress_core::StepRef;
use thiserror::Error;

/// Why a navigation request did nothing
///
/// The plain navigation calls collapse these to `None`; use
/// [`crate::Presentation::try_goto`] to see which one happened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// `init` has not run yet
    #[error("Presentation is not initialized")]
    NotInitialized,

    /// The reference does not name a registered step
    #[error("Step not found: {0}")]
    StepNotFound(String),
}

impl NavigationError {
    pub(crate) fn not_found(step: StepRef<'_>) -> Self {
        let described = match step {
            StepRef::Index(index) => format!("#{index}"),
            StepRef::Id(id) => format!("'{id}'"),
            StepRef::Step(handle) => format!("'{}' (unregistered)", handle.id()),
        };
        NavigationError::StepNotFound(described)
    }
}

/// Result type for navigation
pub type Result<T> = std::result::Result<T, NavigationError>;
