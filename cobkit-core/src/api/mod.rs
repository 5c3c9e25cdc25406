//! Stateless client for the onboarding REST backend.
//!
//! Each method performs one backend operation, attaches the session-derived
//! headers it needs, decodes the response and applies the documented session
//! side effect. No retry happens here; calls that require session context
//! fail before touching the network when that context is missing.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::{
    checkpoint::Checkpoint, config::SdkConfig, error::CobKitError,
    http_request::Request, session::Session,
};

mod models;
pub use models::*;

/// Client for the onboarding backend, bound to one flow's [`Session`].
#[derive(uniffi::Object)]
pub struct OnboardingApi {
    config: SdkConfig,
    session: Arc<Session>,
    request: Request,
}

#[uniffi::export(async_runtime = "tokio")]
impl OnboardingApi {
    /// Creates a client against `config`, reading and updating `session`.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(config: SdkConfig, session: Arc<Session>) -> Self {
        Self {
            config,
            session,
            request: Request::new(),
        }
    }

    /// Starts (or restarts) onboarding for the given contact details.
    ///
    /// On success the session receives the flow identifiers, the pre-assigned
    /// account/card type ids and the initial checkpoint. Calling this again
    /// re-issues the OTP for the same contact.
    ///
    /// # Errors
    /// Transport or decode failures; a backend rejection is reported through
    /// `succeeded`/`message` in the response, not as an error.
    pub async fn start_onboarding(
        &self,
        phone_number: String,
        email: String,
    ) -> Result<StartOnboardingResponse, CobKitError> {
        let url = self.endpoint("onboarding/start");
        let mut builder = self
            .request
            .post(&url, &self.config)
            .json(&StartOnboardingRequest {
                phone_number,
                email,
            });
        if let Some(platform) = &self.config.client_platform {
            builder = builder.header("x-client-platform", platform);
        }
        let response = self.request.handle(builder).await?;
        let parsed: StartOnboardingResponse = decode(response).await?;

        if let Some(data) = &parsed.data {
            if data.session_id.is_some() || data.identity_id.is_some() {
                self.session
                    .set_session_data(data.session_id.clone(), data.identity_id.clone());
            }
            if data.account_type.is_some() {
                self.session.set_account_type_id(data.account_type.clone());
            }
            if data.card_type.is_some() {
                self.session.set_card_type_id(data.card_type.clone());
            }
            if data.checkpoint.is_some() {
                self.session.set_checkpoint(data.checkpoint.clone());
            }
        }
        Ok(parsed)
    }

    /// Validates the OTP the user entered.
    ///
    /// # Errors
    /// [`CobKitError::MissingSessionContext`] when no identity id is present;
    /// transport or decode failures otherwise.
    pub async fn validate_otp(
        &self,
        otp: String,
    ) -> Result<ValidateOtpResponse, CobKitError> {
        let identity_id = self.require_identity_id()?;
        let url = self.endpoint("one-time-password/validate");
        let builder = self
            .request
            .post(&url, &self.config)
            .header("x-user-id", identity_id)
            .header("x-source", "SDK")
            .json(&ValidateOtpRequest { otp });
        let response = self.request.handle(builder).await?;
        decode(response).await
    }

    /// Fetches a page of account types.
    ///
    /// # Errors
    /// Transport or decode failures.
    pub async fn get_account_types(
        &self,
        page: u32,
        length: u32,
    ) -> Result<ProductTypeResponse, CobKitError> {
        self.get_product_types("account-type/get", page, length)
            .await
    }

    /// Fetches a page of card types.
    ///
    /// # Errors
    /// Transport or decode failures.
    pub async fn get_card_types(
        &self,
        page: u32,
        length: u32,
    ) -> Result<ProductTypeResponse, CobKitError> {
        self.get_product_types("card-type/get", page, length).await
    }

    /// Fetches the terms-and-conditions document reference.
    ///
    /// # Errors
    /// Transport or decode failures.
    pub async fn get_terms_and_condition(
        &self,
    ) -> Result<TermsAndConditionResponse, CobKitError> {
        let url = self.endpoint("term-and-condition");
        let builder = self.request.get(&url, &self.config);
        let response = self.request.handle(builder).await?;
        decode(response).await
    }

    /// Initiates the capture leg, exchanging the user's product selection for
    /// a capability bearer token. The token is stored in the session.
    ///
    /// The body carries the display names picked by the user, falling back to
    /// the ids assigned at start, then to the backend defaults.
    ///
    /// # Errors
    /// [`CobKitError::MissingSessionContext`] without a session id; transport
    /// or decode failures otherwise.
    pub async fn initiate_onboarding(
        &self,
    ) -> Result<InitiateOnboardingResponse, CobKitError> {
        let session_id = self.require_session_id()?;
        let url = self.endpoint("onboarding/initiate");
        let account_type = self
            .session
            .account_type_name()
            .or_else(|| self.session.account_type_id())
            .unwrap_or_else(|| "EA".to_string());
        let card_type = self
            .session
            .card_type_name()
            .or_else(|| self.session.card_type_id())
            .unwrap_or_else(|| "Gold".to_string());
        let builder = self
            .request
            .post(&url, &self.config)
            .header("x-session-id", session_id)
            .json(&InitiateOnboardingRequest {
                account_type,
                card_type,
            });
        let response = self.request.handle(builder).await?;
        let parsed: InitiateOnboardingResponse = decode(response).await?;
        if let Some(token) = parsed.data.as_ref().and_then(|data| data.token.clone()) {
            self.session.set_token(Some(token));
        }
        Ok(parsed)
    }

    /// Re-initiates the capture leg for a retry, issuing a fresh capability
    /// token and possibly a replacement session id.
    ///
    /// The token is stored in the session; when the response carries a new
    /// session id it replaces the current one while the identity id is kept.
    ///
    /// # Errors
    /// [`CobKitError::MissingSessionContext`] without a session id; transport
    /// or decode failures otherwise.
    pub async fn reinitiate_onboarding(
        &self,
    ) -> Result<ReinitiateOnboardingResponse, CobKitError> {
        let session_id = self.require_session_id()?;
        let url = self.endpoint("onboarding/reinitiate");
        let mut builder = self
            .request
            .get(&url, &self.config)
            .header("x-session-id", session_id);
        if let Some(platform) = &self.config.client_platform {
            builder = builder.header("x-client-platform", platform);
        }
        let response = self.request.handle(builder).await?;
        let parsed: ReinitiateOnboardingResponse = decode(response).await?;

        if let Some(data) = &parsed.data {
            if data.token.is_some() {
                self.session.set_token(data.token.clone());
            }
            if let Some(new_session_id) = &data.session_id {
                if let Some(identity_id) = self.session.identity_id() {
                    self.session.set_session_data(
                        Some(new_session_id.clone()),
                        Some(identity_id),
                    );
                }
            }
        }
        Ok(parsed)
    }

    /// Fetches the per-field verification verdicts for the current submission.
    ///
    /// # Errors
    /// [`CobKitError::MissingSessionContext`] without a session id; transport
    /// or decode failures otherwise.
    pub async fn check_submission(
        &self,
    ) -> Result<CheckSubmissionResponse, CobKitError> {
        let session_id = self.require_session_id()?;
        let url = self.endpoint("onboarding/check-submission");
        let builder = self
            .request
            .get(&url, &self.config)
            .header("x-session-id", session_id);
        let response = self.request.handle(builder).await?;
        decode(response).await
    }

    /// Advances the flow to `checkpoint` and stores the checkpoint the server
    /// settled on — which is authoritative and may differ from the request.
    ///
    /// # Errors
    /// [`CobKitError::MissingSessionContext`] without a session id; transport
    /// or decode failures otherwise.
    pub async fn update_checkpoint(
        &self,
        checkpoint: Checkpoint,
    ) -> Result<UpdateCheckpointResponse, CobKitError> {
        let session_id = self.require_session_id()?;
        let url = self.endpoint("onboarding/update-checkpoint");
        let builder = self
            .request
            .put(&url, &self.config)
            .header("x-session-id", session_id)
            .json(&UpdateCheckpointRequest {
                checkpoint: checkpoint.wire_name(),
            });
        let response = self.request.handle(builder).await?;
        let parsed: UpdateCheckpointResponse = decode(response).await?;
        if let Some(settled) = parsed.data.as_ref().and_then(|data| data.checkpoint.clone())
        {
            self.session.set_checkpoint(Some(settled));
        }
        Ok(parsed)
    }

    /// Registers the device's push token so the backend can notify this flow
    /// when verification settles.
    ///
    /// # Errors
    /// [`CobKitError::MissingSessionContext`] without a session id; transport
    /// or decode failures otherwise.
    pub async fn send_device_token(
        &self,
        device_token: String,
    ) -> Result<DeviceTokenResponse, CobKitError> {
        let session_id = self.require_session_id()?;
        let url = self.endpoint("onboarding/device-token");
        let builder = self
            .request
            .post(&url, &self.config)
            .header("x-session-id", session_id)
            .json(&DeviceTokenRequest { device_token });
        let response = self.request.handle(builder).await?;
        decode(response).await
    }

    /// Long-polls the backend for a verification settlement event. The server
    /// holds the request open until a status change or its own timeout; the
    /// caller decides what the result means for the flow.
    ///
    /// # Errors
    /// [`CobKitError::MissingSessionContext`] without a session id; transport
    /// or decode failures otherwise.
    pub async fn long_polling(&self) -> Result<LongPollResponse, CobKitError> {
        let session_id = self.require_session_id()?;
        // "long-pooling" is the backend's actual route name.
        let url = self.endpoint("onboarding/long-pooling");
        let builder = self
            .request
            .get_long_poll(&url, &self.config)
            .header("x-session-id", session_id);
        let response = self.request.handle(builder).await?;
        decode(response).await
    }
}

impl OnboardingApi {
    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    fn require_session_id(&self) -> Result<String, CobKitError> {
        self.session
            .session_id()
            .ok_or_else(|| CobKitError::MissingSessionContext {
                attribute: "session_id".to_string(),
            })
    }

    fn require_identity_id(&self) -> Result<String, CobKitError> {
        self.session
            .identity_id()
            .ok_or_else(|| CobKitError::MissingSessionContext {
                attribute: "identity_id".to_string(),
            })
    }

    async fn get_product_types(
        &self,
        path: &str,
        page: u32,
        length: u32,
    ) -> Result<ProductTypeResponse, CobKitError> {
        let url = self.endpoint(path);
        let builder = self
            .request
            .post(&url, &self.config)
            .json(&PagedRequest { page, length });
        let response = self.request.handle(builder).await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, CobKitError> {
    let url = response.url().to_string();
    let body = response.text().await?;
    if body.is_empty() {
        return Err(CobKitError::EmptyResponse);
    }
    serde_json::from_str(&body).map_err(|e| CobKitError::SerializationError {
        error: format!("failed to decode response from {url}: {e}"),
    })
}
