use thiserror::Error;

/// Failures the overlay subsystem can observe.
///
/// None of these are fatal: fetch and abort failures become the overlay's error
/// content, and an unmeasurable anchor keeps the overlay closed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverlayError {
    #[error("{0}")]
    Fetch(String),
    #[error("The request was aborted")]
    Aborted,
    #[error("Anchor element cannot be measured")]
    UnmeasurableAnchor,
    #[error("Malformed payload: {0}")]
    Decode(String),
}

impl OverlayError {
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}
