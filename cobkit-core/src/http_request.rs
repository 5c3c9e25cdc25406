use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};

use crate::{config::SdkConfig, error::CobKitError};

/// Timeout for regular API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the long-poll endpoint, which the server holds open until a
/// status change.
const LONG_POLL_TIMEOUT: Duration = Duration::from_secs(360);

/// A simple wrapper on an HTTP client for making requests. Sets sensible
/// defaults such as timeouts and user-agent, and applies the client-auth
/// headers every onboarding call carries.
///
/// No retry is performed at this layer; where the flow allows a retry it is
/// orchestrated by the caller.
pub(crate) struct Request {
    client: reqwest::Client,
}

impl Request {
    pub(crate) fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Creates a request builder with defaults and client authentication applied.
    pub(crate) fn req(
        &self,
        method: Method,
        url: &str,
        config: &SdkConfig,
    ) -> RequestBuilder {
        self.req_with_timeout(method, url, config, REQUEST_TIMEOUT)
    }

    /// Creates a GET request builder held open long enough for the long-poll
    /// endpoint to answer.
    pub(crate) fn get_long_poll(&self, url: &str, config: &SdkConfig) -> RequestBuilder {
        self.req_with_timeout(Method::GET, url, config, LONG_POLL_TIMEOUT)
    }

    pub(crate) fn get(&self, url: &str, config: &SdkConfig) -> RequestBuilder {
        self.req(Method::GET, url, config)
    }

    pub(crate) fn post(&self, url: &str, config: &SdkConfig) -> RequestBuilder {
        self.req(Method::POST, url, config)
    }

    pub(crate) fn put(&self, url: &str, config: &SdkConfig) -> RequestBuilder {
        self.req(Method::PUT, url, config)
    }

    /// Sends a request built by `req`/`get`/`post`/`put`. Transport failures
    /// surface untouched.
    pub(crate) async fn handle(
        &self,
        request_builder: RequestBuilder,
    ) -> Result<Response, CobKitError> {
        let response = request_builder.send().await?;
        Ok(response)
    }

    fn req_with_timeout(
        &self,
        method: Method,
        url: &str,
        config: &SdkConfig,
        timeout: Duration,
    ) -> RequestBuilder {
        self.client
            .request(method, url)
            .timeout(timeout)
            .header(
                "User-Agent",
                format!("cobkit-core/{}", env!("CARGO_PKG_VERSION")),
            )
            .header("accept", "application/json")
            .header("x-client-id", &config.client_id)
            .header("x-client-secret", &config.client_secret)
    }
}
