use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Method, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio::time::sleep;

use crate::{
    auth::{CredentialStore, MemoryCredentialStore, RefreshGuard, RefreshOutcome},
    request::RequestDescriptor,
    retry::RetryBudget,
    ApiResponse, ClientError, ClientOptions, ErrorBody, RequestOptions, Result,
};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable read by [`ApiClient::from_env`].
pub const BASE_URL_ENV: &str = "TMS_API_URL";

/// Successful response of a single attempt, body not yet decoded.
struct RawResponse {
    status: StatusCode,
    content_type: Option<String>,
    body: String,
}

impl RawResponse {
    fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }
}

#[derive(Clone)]
/// Resilient HTTP client for the TMS API.
///
/// Every call runs a bounded attempt loop: per-attempt timeout, retry with
/// jittered exponential backoff on status 0/429/503, an idempotency key on
/// mutating requests, and one transparent session refresh on 401.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<RwLock<String>>,
    credentials: Arc<dyn CredentialStore>,
    refresh: Arc<RefreshGuard>,
    options: ClientOptions,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = self.credentials.access_token().map(|_| "<redacted>");
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url())
            .field("token", &token)
            .field("options", &self.options)
            .finish()
    }
}

impl ApiClient {
    /// Creates a client for `base_url` with an empty in-memory session.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be initialized, the same way
    /// `reqwest::Client::new` does. Use [`ApiClient::try_new`] to handle
    /// that case.
    pub fn new(base_url: impl Into<String>) -> Self {
        match Self::try_new(base_url) {
            Ok(client) => client,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a client for `base_url`, reporting a failure to build the
    /// cookie-keeping HTTP client instead of panicking.
    pub fn try_new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(ClientError::ClientBuild)?;
        Ok(Self {
            http,
            base_url: Arc::new(RwLock::new(normalize_base_url(base_url.into()))),
            credentials: Arc::new(MemoryCredentialStore::new()),
            refresh: Arc::new(RefreshGuard::default()),
            options: ClientOptions::default(),
        })
    }

    /// Creates a client from the `TMS_API_URL` environment variable,
    /// falling back to `http://localhost:8000` when it is unset.
    ///
    /// Returns an error if the variable is set but empty.
    pub fn from_env() -> std::result::Result<Self, String> {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if url.trim().is_empty() => Err(format!("{BASE_URL_ENV} is set but empty")),
            Ok(url) => Ok(Self::new(url)),
            Err(_) => Ok(Self::new(DEFAULT_BASE_URL)),
        }
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Replaces the session store.
    pub fn with_credentials(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = store;
        self
    }

    /// Replaces the underlying `reqwest` client.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Client-wide defaults applied to every request.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Session store holding the bearer token and post-login redirect.
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Current base URL, without a trailing slash.
    pub fn base_url(&self) -> String {
        self.base_url
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Points this client and all its clones at another API host.
    pub fn set_base_url(&self, url: impl Into<String>) {
        *self
            .base_url
            .write()
            .unwrap_or_else(PoisonError::into_inner) = normalize_base_url(url.into());
    }

    /// Executes one logical request and decodes the response envelope.
    ///
    /// A successful response with a non-JSON content type is returned as
    /// `{ data: <text> }`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
    ) -> Result<ApiResponse<T>> {
        let response = self.dispatch(request).await?;
        if response.is_json() {
            decode_json(&response)
        } else {
            let status = response.status.as_u16();
            let data = serde_json::from_value(serde_json::Value::String(response.body))
                .map_err(|err| ClientError::Decode {
                    status,
                    message: format!("text response does not fit the requested type: {err}"),
                })?;
            Ok(ApiResponse::new(data))
        }
    }

    /// Executes one logical request and decodes the body as `T` directly,
    /// without the envelope.
    pub async fn send<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<T> {
        let response = self.dispatch(request).await?;
        if response.body.trim().is_empty() {
            // 204-style replies decode into unit or `null`.
            return serde_json::from_value(serde_json::Value::Null).map_err(|err| {
                ClientError::Decode {
                    status: response.status.as_u16(),
                    message: format!("empty response body: {err}"),
                }
            });
        }
        if response.is_json() {
            decode_json(&response)
        } else {
            serde_json::from_value(serde_json::Value::String(response.body.clone())).map_err(
                |err| ClientError::Decode {
                    status: response.status.as_u16(),
                    message: format!("text response does not fit the requested type: {err}"),
                },
            )
        }
    }

    /// Sends a `GET` and decodes the envelope.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<ApiResponse<T>> {
        self.execute(RequestDescriptor::get(endpoint)).await
    }

    /// Sends a `GET` with per-request timeout and retry overrides.
    pub async fn get_with<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>> {
        self.execute(RequestDescriptor::get(endpoint).with_options(options))
            .await
    }

    /// Sends a `POST` with an optional JSON body.
    pub async fn post<T, B>(&self, endpoint: &str, body: Option<&B>) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(with_optional_body(RequestDescriptor::post(endpoint), body)?)
            .await
    }

    /// Sends a `POST` with per-request timeout and retry overrides.
    pub async fn post_with<T, B>(
        &self,
        endpoint: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = with_optional_body(RequestDescriptor::post(endpoint), body)?;
        self.execute(request.with_options(options)).await
    }

    /// Sends a `PUT` with an optional JSON body.
    pub async fn put<T, B>(&self, endpoint: &str, body: Option<&B>) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(with_optional_body(RequestDescriptor::put(endpoint), body)?)
            .await
    }

    /// Sends a `PATCH` with an optional JSON body.
    pub async fn patch<T, B>(&self, endpoint: &str, body: Option<&B>) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(with_optional_body(RequestDescriptor::patch(endpoint), body)?)
            .await
    }

    /// Sends a `DELETE`.
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<ApiResponse<T>> {
        self.execute(RequestDescriptor::delete(endpoint)).await
    }

    /// Runs the attempt loop and, on a 401 from a non-auth endpoint, one
    /// session refresh followed by exactly one replay.
    ///
    /// The replay draws on whatever is left of the retry budget, so the
    /// logical call stays within `max_retries + 1` attempts unless the 401
    /// arrived on the last allowed attempt.
    async fn dispatch(&self, mut request: RequestDescriptor) -> Result<RawResponse> {
        request.validate()?;
        request.ensure_idempotency_key();
        let budget = request.options.resolve(&self.options);
        let mut attempts = 0usize;

        let err = match self.send_with_retry(&request, &budget, &mut attempts).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        if err.status() != StatusCode::UNAUTHORIZED.as_u16() || request.is_auth_endpoint() {
            return Err(err);
        }

        if let Err(reason) = self.refresh_session().await {
            #[cfg(feature = "tracing")]
            tracing::warn!(endpoint = %request.endpoint, "session refresh failed: {reason}");
            #[cfg(not(feature = "tracing"))]
            let _ = reason;

            self.credentials.store_access_token(None);
            self.credentials.remember_redirect(&request.endpoint);
            return Err(ClientError::AuthExpired {
                login_path: self.options.login_path.clone(),
                redirect_to: Some(request.endpoint),
            });
        }

        let replay_budget = budget.remaining_after(attempts);
        self.send_with_retry(&request, &replay_budget, &mut attempts)
            .await
    }

    /// Attempt loop for one pass. `attempts` is incremented per network call.
    async fn send_with_retry(
        &self,
        request: &RequestDescriptor,
        budget: &RetryBudget,
        attempts: &mut usize,
    ) -> Result<RawResponse> {
        let url = format!("{}{}", self.base_url(), request.endpoint);
        let headers = self.attempt_headers(request);
        let mut attempt = 0usize;
        loop {
            *attempts += 1;
            let err = match self.attempt(&url, request, &headers, budget).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            if !err.is_retryable() || !budget.allows_retry(attempt) {
                return Err(err);
            }

            let delay = budget.backoff_delay(attempt);
            #[cfg(feature = "tracing")]
            tracing::debug!(
                method = %request.method,
                endpoint = %request.endpoint,
                status = err.status(),
                attempt,
                "retrying request after {} ms",
                delay.as_millis()
            );
            sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(
        &self,
        url: &str,
        request: &RequestDescriptor,
        headers: &HeaderMap,
        budget: &RetryBudget,
    ) -> Result<RawResponse> {
        let timeout_ms = budget.timeout.as_millis() as u64;
        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(headers.clone())
            .timeout(budget.timeout);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| ClientError::from_transport(err, timeout_ms))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response
            .text()
            .await
            .map_err(|err| ClientError::from_transport(err, timeout_ms))?;

        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_owned(),
                body: ErrorBody::parse(&body),
            });
        }

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }

    /// Headers shared by every attempt of one pass through the retry loop.
    ///
    /// The token is re-read per pass so the post-refresh replay carries the
    /// new one.
    fn attempt_headers(&self, request: &RequestDescriptor) -> HeaderMap {
        let mut headers = request.headers.clone();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        if let Some(authorization) = self
            .credentials
            .access_token()
            .and_then(|token| HeaderValue::from_str(&bearer_authorization(&token)).ok())
        {
            headers.insert(header::AUTHORIZATION, authorization);
        }
        headers
    }

    /// Refreshes the session, joining a refresh already in flight.
    async fn refresh_session(&self) -> RefreshOutcome {
        let http = self.http.clone();
        let credentials = Arc::clone(&self.credentials);
        let url = format!("{}{}", self.base_url(), self.options.refresh_path);
        let timeout = std::time::Duration::from_millis(self.options.timeout_ms);

        self.refresh
            .run(move || async move {
                #[cfg(feature = "tracing")]
                tracing::debug!("refreshing session");

                let response = http
                    .request(Method::POST, &url)
                    .header(header::CONTENT_TYPE, "application/json")
                    .timeout(timeout)
                    .send()
                    .await
                    .map_err(|err| format!("refresh request failed: {err}"))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(format!("token refresh failed with status {status}"));
                }

                let body = response.text().await.unwrap_or_default();
                let token = serde_json::from_str::<serde_json::Value>(&body)
                    .ok()
                    .and_then(|value| {
                        value
                            .get("access_token")
                            .and_then(|token| token.as_str())
                            .map(str::to_owned)
                    });
                if token.is_some() {
                    credentials.store_access_token(token);
                }
                Ok(())
            })
            .await
    }
}

fn with_optional_body<B: Serialize + ?Sized>(
    request: RequestDescriptor,
    body: Option<&B>,
) -> Result<RequestDescriptor> {
    match body {
        Some(body) => request.with_json(body),
        None => Ok(request),
    }
}

fn decode_json<T: DeserializeOwned>(response: &RawResponse) -> Result<T> {
    serde_json::from_str(&response.body).map_err(|err| ClientError::Decode {
        status: response.status.as_u16(),
        message: format!("invalid JSON response: {err}; body: {}", response.body),
    })
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_owned()
}

fn bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{bearer_authorization, normalize_base_url, ApiClient};
    use crate::{CredentialStore, MemoryCredentialStore};

    #[test]
    fn bearer_adds_prefix_when_missing() {
        assert_eq!(bearer_authorization("abc123"), "Bearer abc123".to_owned());
    }

    #[test]
    fn bearer_keeps_existing_prefix() {
        assert_eq!(bearer_authorization("bEaReR abc123"), "bEaReR abc123".to_owned());
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        assert_eq!(
            normalize_base_url(" https://api.example.com/v1/ ".to_owned()),
            "https://api.example.com/v1"
        );
    }

    #[test]
    fn try_new_builds_a_cookie_keeping_client() {
        let client = ApiClient::try_new("http://tms.example/").expect("client must build");
        assert_eq!(client.base_url(), "http://tms.example");
        assert!(client.credentials().access_token().is_none());
    }

    #[test]
    fn clones_share_base_url() {
        let client = ApiClient::new("http://old.example");
        let clone = client.clone();
        clone.set_base_url("http://new.example/");
        assert_eq!(client.base_url(), "http://new.example");
    }

    #[test]
    fn debug_redacts_access_token() {
        let client = ApiClient::new("http://localhost:8000").with_credentials(Arc::new(
            MemoryCredentialStore::with_access_token("secret-token"),
        ));
        let debug = format!("{client:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-token"));
    }
}
