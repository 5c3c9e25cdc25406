//! Flow orchestration: the call sequence a host drives an onboarding
//! session through, from contact capture to the terminal result.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
};

use uuid::Uuid;

use crate::{
    api::OnboardingApi,
    checkpoint::{route_for_checkpoint, Checkpoint, Route},
    config::SdkConfig,
    error::CobKitError,
    events::{CompletionGate, PushEvent},
    verification::{
        classify_result, VerificationConfig, VerificationLauncher, VerificationOutcome,
    },
};

/// Terminal result of an onboarding flow, delivered to the host exactly once.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum FlowResult {
    /// Onboarding completed; `data` carries the handoff URL when one exists.
    Success {
        /// Web handoff URL, if the backend provided one.
        data: Option<String>,
    },
    /// The user abandoned the flow.
    Cancelled,
    /// The flow ended with an error.
    Error {
        /// User-presentable description.
        message: String,
    },
}

/// One onboarding flow from start to terminal result.
///
/// Owns the [`Session`](crate::Session), the API client and the completion
/// gate; the host calls the methods in screen order and feeds in push payloads
/// as they arrive.
#[derive(uniffi::Object)]
pub struct OnboardingFlow {
    config: SdkConfig,
    session: Arc<crate::Session>,
    api: OnboardingApi,
    launcher: Arc<dyn VerificationLauncher>,
    gate: CompletionGate,
    finished: AtomicBool,
    contact: Mutex<Option<Contact>>,
}

#[derive(Clone)]
struct Contact {
    phone_number: String,
    email: String,
}

#[uniffi::export(async_runtime = "tokio")]
impl OnboardingFlow {
    /// Creates a flow against `config`, with the host's capture launcher.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(config: SdkConfig, launcher: Arc<dyn VerificationLauncher>) -> Self {
        let session = Arc::new(crate::Session::new());
        let api = OnboardingApi::new(config.clone(), Arc::clone(&session));
        Self {
            config,
            session,
            api,
            launcher,
            gate: CompletionGate::new(),
            finished: AtomicBool::new(false),
            contact: Mutex::new(None),
        }
    }

    /// The session backing this flow, for hosts that persist identifiers.
    #[must_use]
    pub fn session(&self) -> Arc<crate::Session> {
        Arc::clone(&self.session)
    }

    /// Starts the flow for the given contact details and triggers the OTP.
    ///
    /// # Errors
    /// [`CobKitError::Generic`] when the backend rejects the contact (for
    /// example a duplicate phone or email); transport failures otherwise.
    pub async fn start(
        &self,
        phone_number: String,
        email: String,
    ) -> Result<(), CobKitError> {
        let response = self
            .api
            .start_onboarding(phone_number.clone(), email.clone())
            .await?;
        if response.succeeded != Some(true) {
            return Err(CobKitError::Generic {
                error: response
                    .message
                    .unwrap_or_else(|| "onboarding could not be started".to_string()),
            });
        }
        *self.contact_slot() = Some(Contact {
            phone_number,
            email,
        });
        Ok(())
    }

    /// Re-issues the OTP for the contact the flow was started with.
    ///
    /// # Errors
    /// [`CobKitError::MissingSessionContext`] before a successful [`start`](Self::start).
    pub async fn resend_otp(&self) -> Result<(), CobKitError> {
        let contact =
            self.contact_slot()
                .clone()
                .ok_or_else(|| CobKitError::MissingSessionContext {
                    attribute: "contact".to_string(),
                })?;
        self.api
            .start_onboarding(contact.phone_number, contact.email)
            .await?;
        Ok(())
    }

    /// Validates the entered OTP and returns the screen to continue on,
    /// derived from the checkpoint the session carries.
    ///
    /// The codes `1234` and `0000` bypass backend validation; they exist for
    /// backend environments whose OTP delivery is stubbed out.
    ///
    /// # Errors
    /// [`CobKitError::InvalidInput`] for a malformed or rejected code.
    pub async fn submit_otp(&self, otp: String) -> Result<Route, CobKitError> {
        if otp.len() != 4 || !otp.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CobKitError::InvalidInput {
                attribute: "otp".to_string(),
                reason: "must be exactly four digits".to_string(),
            });
        }
        if otp != "1234" && otp != "0000" {
            let response = self.api.validate_otp(otp).await?;
            let accepted = response.succeeded.or(response.success) == Some(true);
            if !accepted {
                return Err(CobKitError::InvalidInput {
                    attribute: "otp".to_string(),
                    reason: response
                        .message
                        .unwrap_or_else(|| "code rejected".to_string()),
                });
            }
        }
        Ok(route_for_checkpoint(self.session.checkpoint()))
    }

    /// Records the account type the user picked.
    pub fn select_account_type(&self, id: Option<String>, name: Option<String>) {
        if id.is_some() {
            self.session.set_account_type_id(id);
        }
        self.session.set_account_type_name(name);
    }

    /// Records the card type the user picked.
    pub fn select_card_type(&self, id: Option<String>, name: Option<String>) {
        if id.is_some() {
            self.session.set_card_type_id(id);
        }
        self.session.set_card_type_name(name);
    }

    /// Loads a page of account types for the selection screen.
    ///
    /// # Errors
    /// Transport or decode failures.
    pub async fn load_account_types(
        &self,
        page: u32,
        length: u32,
    ) -> Result<crate::api::ProductTypeResponse, CobKitError> {
        self.api.get_account_types(page, length).await
    }

    /// Loads a page of card types for the selection screen.
    ///
    /// # Errors
    /// Transport or decode failures.
    pub async fn load_card_types(
        &self,
        page: u32,
        length: u32,
    ) -> Result<crate::api::ProductTypeResponse, CobKitError> {
        self.api.get_card_types(page, length).await
    }

    /// Loads the terms-and-conditions document reference.
    ///
    /// # Errors
    /// Transport or decode failures.
    pub async fn load_terms_and_condition(
        &self,
    ) -> Result<crate::api::TermsAndConditionResponse, CobKitError> {
        self.api.get_terms_and_condition().await
    }

    /// Confirms the terms: initiates the capture leg (which issues the
    /// capability token) and advances the checkpoint to `StartKyc`.
    ///
    /// A checkpoint-update failure does not abort the flow; the server
    /// re-settles the checkpoint on the next update.
    ///
    /// # Errors
    /// [`CobKitError::Generic`] when initiation is rejected.
    pub async fn accept_terms(&self) -> Result<(), CobKitError> {
        let response = self.api.initiate_onboarding().await?;
        if response.succeeded != Some(true) {
            return Err(CobKitError::Generic {
                error: "onboarding could not be initiated".to_string(),
            });
        }
        if let Err(error) = self.api.update_checkpoint(Checkpoint::StartKyc).await {
            log::warn!("checkpoint update to StartKyc failed: {error}");
        }
        Ok(())
    }

    /// Launches the identity-capture capability and classifies its result.
    ///
    /// Re-arms the completion gate, so whichever of push or long-poll settles
    /// first after this launch drives the flow.
    ///
    /// # Errors
    /// [`CobKitError::VerificationLaunchFailure`] without a capability token
    /// (initiate/reinitiate must have succeeded first).
    pub async fn run_verification(
        &self,
    ) -> Result<VerificationOutcome, CobKitError> {
        let token =
            self.session
                .token()
                .ok_or_else(|| CobKitError::VerificationLaunchFailure {
                    reason: "no capability token in session".to_string(),
                })?;
        let correlation_id = self
            .session
            .session_id()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let verification_config = VerificationConfig {
            base_url: self.config.kyc_base_url.clone(),
            token,
            correlation_id,
            language: self.config.language.clone(),
            theme: self.config.theme.clone(),
        };
        self.gate.reset();

        // The host launcher blocks until the capture UI is dismissed.
        let launcher = Arc::clone(&self.launcher);
        let raw = tokio::task::spawn_blocking(move || launcher.launch(verification_config))
            .await
            .map_err(|e| CobKitError::Generic {
                error: format!("capture launcher panicked: {e}"),
            })?;
        Ok(classify_result(&raw))
    }

    /// Feeds a raw push payload into the flow.
    ///
    /// Irrelevant payloads and late arrivals (the long-poll channel settled
    /// first) return `None`. A winning success settlement finishes the KYC leg
    /// and returns the web-handoff route.
    ///
    /// # Errors
    /// [`CobKitError::VerificationFailed`] for a winning failure settlement;
    /// [`CobKitError::SerializationError`] for an unparseable payload.
    pub async fn handle_push_payload(
        &self,
        payload: String,
    ) -> Result<Option<Route>, CobKitError> {
        let event = PushEvent::from_payload(&payload)?;
        self.handle_push_event(event).await
    }

    /// Feeds an already-parsed push event into the flow. Semantics match
    /// [`handle_push_payload`](Self::handle_push_payload).
    ///
    /// # Errors
    /// [`CobKitError::VerificationFailed`] for a winning failure settlement.
    pub async fn handle_push_event(
        &self,
        event: PushEvent,
    ) -> Result<Option<Route>, CobKitError> {
        if !event.is_relevant() {
            return Ok(None);
        }
        if !self.gate.try_accept() {
            return Ok(None);
        }
        if event.is_success() {
            self.finish_kyc().await;
            return Ok(Some(Route::WebHandoff));
        }
        Err(CobKitError::VerificationFailed {
            message: event
                .status
                .unwrap_or_else(|| "verification failed".to_string()),
        })
    }

    /// Long-polls for the verification settlement. Mirrors the push channel:
    /// the first channel to settle wins, the other returns `None`.
    ///
    /// An event without an explicit status counts as success; the backend only
    /// attaches a status to report failures on this channel.
    ///
    /// # Errors
    /// [`CobKitError::VerificationFailed`] for a winning failure settlement;
    /// [`CobKitError::MissingSessionContext`] without a session id.
    pub async fn poll_completion(&self) -> Result<Option<Route>, CobKitError> {
        let response = self.api.long_polling().await?;
        if !self.gate.try_accept() {
            return Ok(None);
        }
        let status = response.data.as_ref().and_then(|data| data.status.clone());
        let succeeded = status
            .as_deref()
            .is_none_or(|value| value.eq_ignore_ascii_case("success"));
        if succeeded {
            self.finish_kyc().await;
            return Ok(Some(Route::WebHandoff));
        }
        Err(CobKitError::VerificationFailed {
            message: status.unwrap_or_else(|| "verification failed".to_string()),
        })
    }

    /// Re-runs verification after a failed attempt: issues a fresh capability
    /// token, moves the checkpoint to the retry leg and launches capture again.
    ///
    /// # Errors
    /// [`CobKitError::Generic`] when re-initiation is rejected;
    /// launch/classification errors as in [`run_verification`](Self::run_verification).
    pub async fn retry_verification(
        &self,
    ) -> Result<VerificationOutcome, CobKitError> {
        let response = self.api.reinitiate_onboarding().await?;
        if response.succeeded != Some(true) {
            return Err(CobKitError::Generic {
                error: response
                    .message
                    .unwrap_or_else(|| "onboarding could not be re-initiated".to_string()),
            });
        }
        if let Err(error) = self.api.update_checkpoint(Checkpoint::ReStartKyc).await {
            log::warn!("checkpoint update to ReStartKyc failed: {error}");
        }
        self.run_verification().await
    }

    /// Registers the device push token for the settlement notification.
    ///
    /// # Errors
    /// [`CobKitError::MissingSessionContext`] without a session id.
    pub async fn register_device_token(
        &self,
        device_token: String,
    ) -> Result<(), CobKitError> {
        self.api.send_device_token(device_token).await?;
        Ok(())
    }

    /// Whether every verified field of the current submission passed.
    ///
    /// # Errors
    /// [`CobKitError::MissingSessionContext`] without a session id.
    pub async fn check_submission_passed(&self) -> Result<bool, CobKitError> {
        let response = self.api.check_submission().await?;
        Ok(response
            .data
            .and_then(|data| data.verification_result)
            .is_some_and(|result| result.all_passed()))
    }

    /// The screen the flow resumes on, from the session's checkpoint.
    #[must_use]
    pub fn current_route(&self) -> Route {
        route_for_checkpoint(self.session.checkpoint())
    }

    /// Delivers the terminal result and tears the flow down: the session and
    /// the stored contact details are wiped. Returns the result on the first
    /// call and `None` on any later call, so the host reports the outcome at
    /// most once.
    pub fn conclude(&self, result: FlowResult) -> Option<FlowResult> {
        if self.finished.swap(true, Ordering::SeqCst) {
            return None;
        }
        self.session.clear();
        *self.contact_slot() = None;
        Some(result)
    }
}

impl OnboardingFlow {
    /// Finishes the KYC leg: `ReFinishKyc` when the flow is on the retry leg,
    /// `FinishKyc` otherwise. Tolerant of update failure, which the server
    /// resolves on re-entry.
    async fn finish_kyc(&self) {
        let target = if self.session.checkpoint().as_deref()
            == Some(Checkpoint::ReStartKyc.wire_name().as_str())
        {
            Checkpoint::ReFinishKyc
        } else {
            Checkpoint::FinishKyc
        };
        if let Err(error) = self.api.update_checkpoint(target).await {
            log::warn!("checkpoint update to {target} failed: {error}");
        }
    }

    fn contact_slot(&self) -> std::sync::MutexGuard<'_, Option<Contact>> {
        self.contact.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubLauncher {
        result: String,
    }

    impl VerificationLauncher for StubLauncher {
        fn launch(&self, _config: VerificationConfig) -> String {
            self.result.clone()
        }
    }

    fn test_flow(server: &mockito::Server, launcher_result: &str) -> OnboardingFlow {
        let config = SdkConfig::with_base_url(
            &format!("{}/", server.url()),
            "client-id".to_string(),
            "client-secret".to_string(),
            None,
        );
        OnboardingFlow::new(
            config,
            Arc::new(StubLauncher {
                result: launcher_result.to_string(),
            }),
        )
    }

    fn seeded_flow(server: &mockito::Server, launcher_result: &str) -> OnboardingFlow {
        let flow = test_flow(server, launcher_result);
        flow.session
            .set_session_data(Some("sess-1".to_string()), Some("id-1".to_string()));
        flow
    }

    #[tokio::test]
    async fn test_start_rejection_surfaces_backend_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/onboarding/start")
            .with_status(200)
            .with_body(r#"{"succeeded": false, "message": "phone already registered"}"#)
            .create_async()
            .await;

        let flow = test_flow(&server, "success");
        let error = flow
            .start("08123".to_string(), "a@b.id".to_string())
            .await
            .unwrap_err();
        match error {
            CobKitError::Generic { error } => {
                assert_eq!(error, "phone already registered");
            }
            other => panic!("expected Generic, got {other:?}"),
        }
        mock.assert_async().await;
        drop(server);
    }

    #[tokio::test]
    async fn test_malformed_otp_is_rejected_locally() {
        let server = mockito::Server::new_async().await;
        let flow = seeded_flow(&server, "success");

        for bad in ["123", "12345", "12a4", ""] {
            let error = flow.submit_otp(bad.to_string()).await.unwrap_err();
            assert!(matches!(error, CobKitError::InvalidInput { .. }));
        }
        drop(server);
    }

    #[tokio::test]
    async fn test_bypass_codes_skip_backend_validation() {
        // No validate mock registered: a network hit would fail the test.
        let server = mockito::Server::new_async().await;
        let flow = seeded_flow(&server, "success");
        flow.session.set_checkpoint(Some("StartCob".to_string()));

        let route = flow.submit_otp("1234".to_string()).await.unwrap();
        assert_eq!(route, Route::Welcome);

        let route = flow.submit_otp("0000".to_string()).await.unwrap();
        assert_eq!(route, Route::Welcome);
        drop(server);
    }

    #[tokio::test]
    async fn test_submit_otp_routes_by_checkpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/one-time-password/validate")
            .with_status(200)
            .with_body(r#"{"succeeded": true}"#)
            .expect(2)
            .create_async()
            .await;

        let flow = seeded_flow(&server, "success");

        flow.session.set_checkpoint(Some("StartKyc".to_string()));
        assert_eq!(flow.submit_otp("4821".to_string()).await.unwrap(), Route::Welcome);

        flow.session.set_checkpoint(Some("FinishKyc".to_string()));
        assert_eq!(
            flow.submit_otp("4821".to_string()).await.unwrap(),
            Route::WebHandoff
        );
        mock.assert_async().await;
        drop(server);
    }

    #[tokio::test]
    async fn test_run_verification_requires_token() {
        let server = mockito::Server::new_async().await;
        let flow = seeded_flow(&server, "success");

        let error = flow.run_verification().await.unwrap_err();
        assert!(matches!(error, CobKitError::VerificationLaunchFailure { .. }));
        drop(server);
    }

    #[tokio::test]
    async fn test_run_verification_classifies_launcher_result() {
        let server = mockito::Server::new_async().await;
        let flow = seeded_flow(&server, "userCancelled");
        flow.session.set_token(Some("bearer-1".to_string()));

        let outcome = flow.run_verification().await.unwrap();
        assert_eq!(outcome, VerificationOutcome::Cancelled);
        drop(server);
    }

    #[tokio::test]
    async fn test_push_success_finishes_kyc_once() {
        let mut server = mockito::Server::new_async().await;
        let update_mock = server
            .mock("PUT", "/onboarding/update-checkpoint")
            .with_status(200)
            .with_body(r#"{"succeeded": true, "data": {"checkpoint": "FinishKyc"}}"#)
            .expect(1)
            .create_async()
            .await;
        let poll_mock = server
            .mock("GET", "/onboarding/long-pooling")
            .with_status(200)
            .with_body(r#"{"data": {"status": "success", "type": "kyc"}}"#)
            .create_async()
            .await;

        let flow = seeded_flow(&server, "success");
        let payload = r#"{"status": "success", "type": "kyc"}"#;

        let route = flow.handle_push_payload(payload.to_string()).await.unwrap();
        assert_eq!(route, Some(Route::WebHandoff));

        // The long-poll answer arrives second and must be discarded.
        let late = flow.poll_completion().await.unwrap();
        assert_eq!(late, None);

        update_mock.assert_async().await;
        poll_mock.assert_async().await;
        drop(server);
    }

    #[tokio::test]
    async fn test_poll_win_discards_later_push() {
        let mut server = mockito::Server::new_async().await;
        let update_mock = server
            .mock("PUT", "/onboarding/update-checkpoint")
            .with_status(200)
            .with_body(r#"{"succeeded": true, "data": {"checkpoint": "FinishKyc"}}"#)
            .expect(1)
            .create_async()
            .await;
        let poll_mock = server
            .mock("GET", "/onboarding/long-pooling")
            .with_status(200)
            .with_body(r#"{"data": {"type": "kyc"}}"#)
            .create_async()
            .await;

        let flow = seeded_flow(&server, "success");

        // No status in the long-poll event counts as success.
        let route = flow.poll_completion().await.unwrap();
        assert_eq!(route, Some(Route::WebHandoff));

        let payload = r#"{"status": "success", "type": "kyc"}"#;
        let late = flow.handle_push_payload(payload.to_string()).await.unwrap();
        assert_eq!(late, None);

        update_mock.assert_async().await;
        poll_mock.assert_async().await;
        drop(server);
    }

    #[tokio::test]
    async fn test_push_failure_is_reported() {
        let server = mockito::Server::new_async().await;
        let flow = seeded_flow(&server, "success");

        let payload = r#"{"status": "failed", "type": "kyc"}"#;
        let error = flow
            .handle_push_payload(payload.to_string())
            .await
            .unwrap_err();
        assert!(matches!(error, CobKitError::VerificationFailed { .. }));
        drop(server);
    }

    #[tokio::test]
    async fn test_irrelevant_push_does_not_claim_the_gate() {
        let server = mockito::Server::new_async().await;
        let flow = seeded_flow(&server, "success");

        let payload = r#"{"status": "success", "type": "promo"}"#;
        let route = flow.handle_push_payload(payload.to_string()).await.unwrap();
        assert_eq!(route, None);
        assert!(!flow.gate.is_accepted());
        drop(server);
    }

    #[tokio::test]
    async fn test_finish_kyc_uses_retry_checkpoint_on_retry_leg() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/onboarding/update-checkpoint")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "checkpoint": "ReFinishKyc"
            })))
            .with_status(200)
            .with_body(r#"{"succeeded": true, "data": {"checkpoint": "ReFinishKyc"}}"#)
            .create_async()
            .await;

        let flow = seeded_flow(&server, "success");
        flow.session.set_checkpoint(Some("ReStartKyc".to_string()));

        let payload = r#"{"status": "success", "type": "kyc"}"#;
        let route = flow.handle_push_payload(payload.to_string()).await.unwrap();
        assert_eq!(route, Some(Route::WebHandoff));

        mock.assert_async().await;
        drop(server);
    }

    #[tokio::test]
    async fn test_conclude_delivers_result_at_most_once() {
        let server = mockito::Server::new_async().await;
        let flow = seeded_flow(&server, "success");
        flow.session.set_token(Some("bearer-1".to_string()));

        let first = flow.conclude(FlowResult::Success { data: None });
        assert_eq!(first, Some(FlowResult::Success { data: None }));
        assert!(!flow.session.has_valid_session());
        assert_eq!(flow.session.token(), None);

        let second = flow.conclude(FlowResult::Cancelled);
        assert_eq!(second, None);
        drop(server);
    }

    #[tokio::test]
    async fn test_conclude_wipes_contact_details() {
        let server = mockito::Server::new_async().await;
        let flow = seeded_flow(&server, "success");
        *flow.contact_slot() = Some(Contact {
            phone_number: "081234567890".to_string(),
            email: "user@example.id".to_string(),
        });

        flow.conclude(FlowResult::Cancelled);

        assert!(flow.contact_slot().is_none());
        let error = flow.resend_otp().await.unwrap_err();
        assert!(matches!(error, CobKitError::MissingSessionContext { .. }));
        drop(server);
    }

    #[tokio::test]
    async fn test_retry_verification_reinitiates_and_relaunches() {
        let mut server = mockito::Server::new_async().await;
        let reinitiate_mock = server
            .mock("GET", "/onboarding/reinitiate")
            .with_status(200)
            .with_body(r#"{"succeeded": true, "data": {"token": "bearer-2"}}"#)
            .create_async()
            .await;
        let update_mock = server
            .mock("PUT", "/onboarding/update-checkpoint")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "checkpoint": "ReStartKyc"
            })))
            .with_status(200)
            .with_body(r#"{"succeeded": true, "data": {"checkpoint": "ReStartKyc"}}"#)
            .create_async()
            .await;

        let flow = seeded_flow(&server, "flowCompleted");
        flow.session.set_token(Some("bearer-1".to_string()));

        let outcome = flow.retry_verification().await.unwrap();
        assert_eq!(outcome, VerificationOutcome::Completed);
        assert_eq!(flow.session.token().as_deref(), Some("bearer-2"));
        assert_eq!(flow.session.checkpoint().as_deref(), Some("ReStartKyc"));

        reinitiate_mock.assert_async().await;
        update_mock.assert_async().await;
        drop(server);
    }
}
