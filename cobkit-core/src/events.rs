//! Push-notification events and completion arbitration.
//!
//! Verification settlement can reach the SDK through two channels at once: a
//! push notification and the long-poll response. [`CompletionGate`] makes sure
//! only the first arrival drives the flow forward.

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use crate::error::CobKitError;

/// A verification settlement event extracted from a push payload.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PushEvent {
    /// Settlement status, e.g. `"success"` or `"failed"`.
    pub status: Option<String>,
    /// Payload `type` discriminator, e.g. `"kyc"`.
    pub kind: Option<String>,
    /// The notification alert title, used by older backends that carry no
    /// `type` field.
    pub title: Option<String>,
}

impl PushEvent {
    /// Parses a raw push payload into an event.
    ///
    /// Reads `status` and `type` at the top level and the alert title from the
    /// platform envelope (`aps.alert.title`).
    ///
    /// # Errors
    /// [`CobKitError::SerializationError`] when `payload` is not valid JSON.
    pub fn from_payload(payload: &str) -> Result<Self, CobKitError> {
        let value: Value = serde_json::from_str(payload).map_err(|e| {
            CobKitError::SerializationError {
                error: format!("failed to decode push payload: {e}"),
            }
        })?;
        let title = value
            .pointer("/aps/alert/title")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(Self {
            status: value.get("status").and_then(Value::as_str).map(str::to_string),
            kind: value.get("type").and_then(Value::as_str).map(str::to_string),
            title,
        })
    }

    /// Whether this notification concerns the onboarding flow at all. Matches
    /// the `type` discriminator, falling back to a `kyc` mention in the alert
    /// title for payloads from older backends.
    #[must_use]
    pub fn is_relevant(&self) -> bool {
        if let Some(kind) = &self.kind {
            let kind = kind.to_lowercase();
            if kind == "kyc" || kind == "cob" {
                return true;
            }
        }
        self.title
            .as_deref()
            .is_some_and(|title| title.to_lowercase().contains("kyc"))
    }

    /// Whether the event reports a successful settlement.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("success"))
    }
}

/// One-shot latch arbitrating between the push and long-poll channels.
///
/// Whichever channel settles first wins [`try_accept`](Self::try_accept); the
/// loser sees `false` and must discard its result.
#[derive(Debug, Default)]
pub(crate) struct CompletionGate {
    accepted: AtomicBool,
}

impl CompletionGate {
    pub(crate) const fn new() -> Self {
        Self {
            accepted: AtomicBool::new(false),
        }
    }

    /// Claims the gate. Returns `true` exactly once per armed cycle.
    pub(crate) fn try_accept(&self) -> bool {
        !self.accepted.swap(true, Ordering::SeqCst)
    }

    /// Whether some channel has already claimed the gate.
    pub(crate) fn is_accepted(&self) -> bool {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Re-arms the gate for the next verification attempt.
    pub(crate) fn reset(&self) {
        self.accepted.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_with_type_field() {
        let event = PushEvent::from_payload(
            r#"{"status": "success", "type": "kyc", "aps": {"alert": {"title": "Done"}}}"#,
        )
        .unwrap();
        assert!(event.is_relevant());
        assert!(event.is_success());
        assert_eq!(event.title.as_deref(), Some("Done"));
    }

    #[test]
    fn test_legacy_payload_matched_by_title() {
        // Older backends send no `type`; the alert title is the only marker.
        let event = PushEvent::from_payload(
            r#"{"status": "failed", "aps": {"alert": {"title": "KYC verification"}}}"#,
        )
        .unwrap();
        assert!(event.is_relevant());
        assert!(!event.is_success());
    }

    #[test]
    fn test_unrelated_payload_is_ignored() {
        let event = PushEvent::from_payload(
            r#"{"status": "success", "type": "promo", "aps": {"alert": {"title": "Offer"}}}"#,
        )
        .unwrap();
        assert!(!event.is_relevant());
    }

    #[test]
    fn test_invalid_payload_is_a_decode_error() {
        let error = PushEvent::from_payload("not json").unwrap_err();
        assert!(matches!(error, CobKitError::SerializationError { .. }));
    }

    #[test]
    fn test_gate_accepts_exactly_once() {
        let gate = CompletionGate::new();
        assert!(gate.try_accept());
        assert!(!gate.try_accept());
        assert!(gate.is_accepted());
    }

    #[test]
    fn test_gate_rearms_after_reset() {
        let gate = CompletionGate::new();
        assert!(gate.try_accept());
        gate.reset();
        assert!(!gate.is_accepted());
        assert!(gate.try_accept());
    }
}
