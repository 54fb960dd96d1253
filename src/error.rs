/// Error taxonomy for the report intake pipeline
///
/// Every device/permission class error is recoverable: the camera prompts a
/// retry, geolocation falls through to the next strategy, and a dead inference
/// engine just means classification is skipped. Only validation blocks
/// submission, and only until the citizen corrects the draft.

use thiserror::Error;

/// Errors that can surface anywhere in the intake pipeline
#[derive(Debug, Clone, Error)]
pub enum ReportError {
    /// Camera or geolocation hardware/permission failure
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A non-image file was selected
    #[error("not a supported image format: {0}")]
    InvalidFormat(String),

    /// The classification model failed to load or run
    #[error("inference engine unavailable: {0}")]
    InferenceUnavailable(String),

    /// The draft does not satisfy the submission preconditions
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The (simulated) submission endpoint rejected the report
    #[error("submission failed: {0}")]
    Submission(String),
}

/// Reasons a draft cannot be submitted
///
/// Surfaced inline next to the offending field; submission stays blocked
/// until every one of these is cleared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("an image of the issue is required")]
    MissingImage,

    /// Location resolution or classification has not settled yet
    #[error("location and identification are still in progress")]
    StillGathering,

    #[error("a location is required")]
    MissingLocation,

    /// Manually pinned locations have no GPS corroboration, so the citizen
    /// must describe the issue in their own words.
    #[error("a description is required when the location was pinned manually")]
    MissingDescription,
}
