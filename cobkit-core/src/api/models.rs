//! Wire types for the onboarding backend. Field names follow the backend's
//! camelCase JSON exactly; everything the server may omit is optional.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartOnboardingRequest {
    pub phone_number: String,
    pub email: String,
}

/// Envelope returned by `onboarding/start`.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct StartOnboardingResponse {
    /// Whether the backend accepted the request.
    pub succeeded: Option<bool>,
    /// Human-readable rejection reason, e.g. duplicate phone/email.
    pub message: Option<String>,
    /// Flow identifiers and initial checkpoint.
    pub data: Option<OnboardingData>,
    /// Backend-reported status code.
    pub status_code: Option<i32>,
}

/// Flow identifiers issued at onboarding start.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingData {
    /// Session id attached to almost every subsequent call.
    pub session_id: Option<String>,
    /// Backend-side flow status.
    pub status: Option<String>,
    /// When the OTP sent to the user expires.
    pub otp_expires_at: Option<String>,
    /// Identity id used for OTP validation.
    pub identity_id: Option<String>,
    /// Initial checkpoint for this flow.
    pub checkpoint: Option<String>,
    /// Pre-assigned account type id.
    pub account_type: Option<String>,
    /// Pre-assigned card type id.
    pub card_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ValidateOtpRequest {
    pub otp: String,
}

/// Envelope returned by `one-time-password/validate`.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct ValidateOtpResponse {
    /// Whether the backend accepted the code.
    pub succeeded: Option<bool>,
    /// Legacy duplicate of `succeeded` some deployments still send.
    pub success: Option<bool>,
    /// Rejection reason for a wrong code.
    pub message: Option<String>,
    /// Validation details.
    pub data: Option<OtpValidationData>,
}

/// Validation details of an OTP attempt.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct OtpValidationData {
    /// Whether the code matched.
    pub is_valid: Option<bool>,
    /// Backend-side flow status.
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PagedRequest {
    pub page: u32,
    pub length: u32,
}

/// Pagination info on list responses.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Total number of pages.
    pub total_page: Option<u32>,
    /// Page this response covers.
    pub current_page: Option<u32>,
    /// Requested page length.
    pub length: Option<u32>,
}

/// An account or card product the user can pick.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct ProductType {
    /// Backend id of the product.
    pub id: Option<String>,
    /// Display name shown to the user.
    pub name: Option<String>,
    /// Marketing description.
    pub description: Option<String>,
    /// Product artwork.
    pub image_url: Option<String>,
}

/// Envelope returned by `account-type/get` and `card-type/get`.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct ProductTypeResponse {
    /// Page this response covers.
    pub page_number: Option<u32>,
    /// Requested page length.
    pub page_size: Option<u32>,
    /// Pagination info.
    pub info: Option<PageInfo>,
    /// Whether the backend accepted the request.
    pub succeeded: Option<bool>,
    /// The products on this page.
    pub data: Option<Vec<ProductType>>,
    /// Backend-reported status code.
    pub status_code: Option<i32>,
}

/// Envelope returned by `term-and-condition`.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct TermsAndConditionResponse {
    /// Whether the backend accepted the request.
    pub succeeded: Option<bool>,
    /// Terms document reference.
    pub data: Option<TermsAndConditionData>,
    /// Backend-reported status code.
    pub status_code: Option<i32>,
}

/// Terms document reference.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct TermsAndConditionData {
    /// Id (or inline HTML) of the terms content to render.
    pub content_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InitiateOnboardingRequest {
    pub account_type: String,
    pub card_type: String,
}

/// Envelope returned by `onboarding/initiate`.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct InitiateOnboardingResponse {
    /// Whether the backend accepted the request.
    pub succeeded: Option<bool>,
    /// Capability token.
    pub data: Option<InitiateOnboardingData>,
    /// Backend-reported status code.
    pub status_code: Option<i32>,
}

/// Token issued for the identity-capture capability.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct InitiateOnboardingData {
    /// Bearer token for the capability.
    pub token: Option<String>,
}

/// Envelope returned by `onboarding/reinitiate`.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct ReinitiateOnboardingResponse {
    /// Whether the backend accepted the request.
    pub succeeded: Option<bool>,
    /// Fresh token and, possibly, a replacement session id.
    pub data: Option<ReinitiateOnboardingData>,
    /// Backend-reported status code.
    pub status_code: Option<i32>,
    /// Rejection reason.
    pub message: Option<String>,
}

/// Fresh capability token for a retry leg.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct ReinitiateOnboardingData {
    /// Bearer token for the capability.
    pub token: Option<String>,
    /// Replacement session id; the identity id stays the same.
    pub session_id: Option<String>,
}

/// Envelope returned by `onboarding/check-submission`.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct CheckSubmissionResponse {
    /// Whether the backend accepted the request.
    pub succeeded: Option<bool>,
    /// Submission status and verification breakdown.
    pub data: Option<CheckSubmissionData>,
    /// Backend-reported status code.
    pub status_code: Option<i32>,
}

/// Submission status and verification breakdown.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct CheckSubmissionData {
    /// Backend-side submission status.
    pub status: Option<String>,
    /// Web handoff URL for this submission.
    pub webview_url: Option<String>,
    /// Per-field verification verdicts.
    pub verification_result: Option<VerificationResult>,
}

/// Per-field verification verdicts; each field reads `"PASS"` on success.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    /// National id number verdict.
    pub nik: Option<String>,
    /// Name verdict.
    pub name: Option<String>,
    /// Date-of-birth verdict.
    pub date_of_birth: Option<String>,
    /// Selfie/liveness verdict.
    pub selfie: Option<String>,
}

impl VerificationResult {
    /// Whether every verified field passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        [&self.nik, &self.name, &self.date_of_birth, &self.selfie]
            .iter()
            .all(|field| {
                field
                    .as_deref()
                    .is_some_and(|value| value.eq_ignore_ascii_case("PASS"))
            })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateCheckpointRequest {
    pub checkpoint: String,
}

/// Envelope returned by `onboarding/update-checkpoint`.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCheckpointResponse {
    /// Whether the backend accepted the request.
    pub succeeded: Option<bool>,
    /// Rejection reason.
    pub message: Option<String>,
    /// The checkpoint the server settled on.
    pub data: Option<UpdateCheckpointData>,
    /// Backend-reported status code.
    pub status_code: Option<i32>,
}

/// The checkpoint the server settled on, which is authoritative.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCheckpointData {
    /// Server-normalized checkpoint name.
    pub checkpoint: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeviceTokenRequest {
    pub device_token: String,
}

/// Envelope returned by `onboarding/device-token`.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTokenResponse {
    /// Whether the backend accepted the token.
    pub succeeded: Option<bool>,
    /// Rejection reason.
    pub message: Option<String>,
    /// Backend-reported status code.
    pub status_code: Option<i32>,
}

/// Response of the long-poll endpoint, delivered when verification settles
/// (same event shape the push channel carries).
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct LongPollResponse {
    /// Backend job that produced the event.
    pub job_id: Option<String>,
    /// User the event belongs to.
    pub user_id: Option<String>,
    /// Notification title.
    pub title: Option<String>,
    /// Notification body.
    pub body: Option<String>,
    /// The settlement event itself.
    pub data: Option<LongPollData>,
}

/// Settlement event payload.
#[derive(Debug, Clone, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct LongPollData {
    /// Session the event belongs to.
    pub session_id: Option<String>,
    /// User the event belongs to.
    pub user_id: Option<String>,
    /// Capability submission id.
    pub submission_id: Option<String>,
    /// Outcome status, compared case-insensitively against `"success"`.
    pub status: Option<String>,
    /// Event kind, `"kyc"` or `"cob"`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_result_requires_all_fields_to_pass() {
        let passed = VerificationResult {
            nik: Some("PASS".to_string()),
            name: Some("pass".to_string()),
            date_of_birth: Some("PASS".to_string()),
            selfie: Some("PASS".to_string()),
        };
        assert!(passed.all_passed());

        let failed = VerificationResult {
            selfie: Some("FAIL".to_string()),
            ..passed.clone()
        };
        assert!(!failed.all_passed());

        let partial = VerificationResult {
            nik: None,
            ..passed
        };
        assert!(!partial.all_passed());
    }

    #[test]
    fn test_long_poll_event_decodes_type_field() {
        let raw = r#"{
            "jobId": "job-1",
            "data": {"sessionId": "sess-1", "status": "SUCCESS", "type": "kyc"}
        }"#;
        let parsed: LongPollResponse = serde_json::from_str(raw).unwrap();
        let data = parsed.data.unwrap();
        assert_eq!(data.kind.as_deref(), Some("kyc"));
        assert_eq!(data.status.as_deref(), Some("SUCCESS"));
    }

    #[test]
    fn test_start_response_tolerates_missing_fields() {
        let parsed: StartOnboardingResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.succeeded.is_none());
        assert!(parsed.data.is_none());
    }
}
