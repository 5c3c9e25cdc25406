//! SDK configuration and per-environment defaults.

use crate::Environment;

/// Everything an onboarding flow needs to reach the backend and the
/// identity-capture capability.
///
/// `client_id`/`client_secret` authenticate the embedding app on every call.
/// `client_platform`, when set, is forwarded as the `x-client-platform` header
/// on the calls that accept it.
#[derive(Debug, Clone, uniffi::Record)]
pub struct SdkConfig {
    /// Base URL of the onboarding REST backend, with trailing slash.
    pub base_url: String,
    /// Base URL handed to the identity-capture capability.
    pub kyc_base_url: String,
    /// Web handoff page shown once verification has settled.
    pub kyc_result_url: String,
    /// Final success page of the web handoff.
    pub success_url: String,
    /// Client id header value (`x-client-id`).
    pub client_id: String,
    /// Client secret header value (`x-client-secret`).
    pub client_secret: String,
    /// Optional `x-client-platform` header value.
    pub client_platform: Option<String>,
    /// Locale passed to the identity-capture capability.
    pub language: String,
    /// Optional theme identifier passed to the identity-capture capability.
    pub theme: Option<String>,
}

impl SdkConfig {
    /// Builds a configuration with the default hosts for `environment`.
    #[must_use]
    pub fn for_environment(
        environment: Environment,
        client_id: String,
        client_secret: String,
        client_platform: Option<String>,
    ) -> Self {
        let (base_url, kyc_base_url) = match environment {
            Environment::Staging => (
                "https://cob-gateway-staging.onboardgate.io/v1/api/",
                "https://onekyc-staging.onboardgate.io",
            ),
            Environment::Production => (
                "https://cob-gateway.onboardgate.io/v1/api/",
                "https://onekyc.onboardgate.io",
            ),
        };
        Self {
            base_url: base_url.to_string(),
            kyc_base_url: kyc_base_url.to_string(),
            kyc_result_url: format!("{}kyc-result", base_url_root(base_url)),
            success_url: format!("{}success", base_url_root(base_url)),
            client_id,
            client_secret,
            client_platform,
            language: "id".to_string(),
            theme: None,
        }
    }

    /// Builds a configuration against a custom backend URL. Used by tests and
    /// by hosts pointing at non-standard deployments.
    #[must_use]
    pub fn with_base_url(
        base_url: &str,
        client_id: String,
        client_secret: String,
        client_platform: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.to_string(),
            kyc_base_url: base_url.trim_end_matches('/').to_string(),
            kyc_result_url: format!("{}kyc-result", base_url_root(base_url)),
            success_url: format!("{}success", base_url_root(base_url)),
            client_id,
            client_secret,
            client_platform,
            language: "id".to_string(),
            theme: None,
        }
    }
}

/// Strips the `v1/api/` suffix so web handoff pages hang off the host root.
fn base_url_root(base_url: &str) -> String {
    let trimmed = base_url
        .trim_end_matches('/')
        .trim_end_matches("v1/api")
        .trim_end_matches('/');
    format!("{trimmed}/")
}

/// Builds an [`SdkConfig`] with the default hosts for `environment`.
#[uniffi::export]
#[must_use]
pub fn default_config(
    environment: Environment,
    client_id: String,
    client_secret: String,
    client_platform: Option<String>,
) -> SdkConfig {
    SdkConfig::for_environment(environment, client_id, client_secret, client_platform)
}
