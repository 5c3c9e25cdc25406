use thiserror::Error;

/// Error outputs from `CobKit`.
///
/// Every error is scoped to the current onboarding flow: callers either retry
/// the failing step or terminate the flow with an error result to the host.
#[derive(Debug, Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum CobKitError {
    /// An operation needed session context (session id / identity id) that has
    /// not been established yet. Raised before any network attempt.
    #[error("missing_session_context: {attribute}")]
    MissingSessionContext {
        /// Which piece of session context was missing.
        attribute: String,
    },
    /// The endpoint URL could not be constructed.
    #[error("invalid_endpoint")]
    InvalidEndpoint,
    /// The backend returned a response with no body.
    #[error("empty_response")]
    EmptyResponse,
    /// A response body could not be decoded.
    #[error("serialization_error: {error}")]
    SerializationError {
        /// Decode failure details.
        error: String,
    },
    /// Transport failure, surfaced untouched.
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    /// The presented input is not valid for the requested operation.
    #[error("invalid_input `{attribute}`: {reason}")]
    InvalidInput {
        /// The offending input.
        attribute: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The identity-capture capability could not be launched.
    #[error("verification_launch_failure: {reason}")]
    VerificationLaunchFailure {
        /// Why the launch was not attempted or failed.
        reason: String,
    },
    /// Identity verification completed with a failure outcome.
    #[error("verification_failed: {message}")]
    VerificationFailed {
        /// User-presentable failure message.
        message: String,
    },
    /// The user abandoned the flow.
    #[error("user_cancelled")]
    UserCancelled,
    /// Unhandled error.
    #[error("generic_error: {error}")]
    Generic {
        /// Failure details.
        error: String,
    },
}
