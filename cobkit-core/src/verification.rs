//! Identity-capture capability integration.
//!
//! The capture UI itself lives on the host side (it is a platform-native
//! component); the host registers a [`VerificationLauncher`] and the SDK hands
//! it a [`VerificationConfig`] and classifies the string result it returns.

/// Parameters the host passes to the identity-capture capability.
#[derive(Debug, Clone, uniffi::Record)]
pub struct VerificationConfig {
    /// Capability backend base URL.
    pub base_url: String,
    /// Bearer token issued by initiate/reinitiate. Single-use.
    pub token: String,
    /// Correlation id tying capability traffic to this onboarding session.
    pub correlation_id: String,
    /// UI locale.
    pub language: String,
    /// Optional host theme identifier.
    pub theme: Option<String>,
}

/// Host-side launcher for the identity-capture capability.
///
/// Implemented by the embedding app; `launch` presents the capture UI, blocks
/// until it is dismissed and returns the capability's raw result string, which
/// the SDK classifies with [`classify_result`].
#[uniffi::export(with_foreign)]
pub trait VerificationLauncher: Send + Sync {
    /// Presents the capture UI and returns its raw result string.
    fn launch(&self, config: VerificationConfig) -> String;
}

/// Classified outcome of a capability run.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum VerificationOutcome {
    /// The user completed capture; settlement arrives asynchronously.
    Completed,
    /// The user dismissed the capture UI.
    Cancelled,
    /// Capture ended without completing, with the capability's own message
    /// when one was embedded in the result.
    NotCompleted {
        /// Extracted capability error message.
        message: Option<String>,
    },
    /// Anything the other classes do not match.
    Failed,
}

/// Classifies the raw result string returned by the capability.
///
/// Matching is case-insensitive substring containment, in a fixed order:
/// cancellation first, then not-completed, then success. `notCompleted`
/// results contain the substring `completed`, so the order is load-bearing.
#[uniffi::export]
#[must_use]
pub fn classify_result(raw: &str) -> VerificationOutcome {
    let lowered = raw.to_lowercase();
    if lowered.contains("cancel") || lowered.contains("dismiss") {
        return VerificationOutcome::Cancelled;
    }
    if lowered.contains("notcompleted") {
        return VerificationOutcome::NotCompleted {
            message: extract_error_message(raw),
        };
    }
    if lowered.contains("success") || lowered.contains("completed") {
        return VerificationOutcome::Completed;
    }
    VerificationOutcome::Failed
}

/// Pulls the message out of a result shaped like
/// `notCompleted(errorMessage: Optional("..."))`.
fn extract_error_message(raw: &str) -> Option<String> {
    let (_, tail) = raw.split_once("errorMessage: Optional(")?;
    let (message, _) = tail.split_once(')')?;
    Some(message.trim_matches('"').to_string())
}
