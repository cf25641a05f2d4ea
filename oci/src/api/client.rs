use reqwest::header::{HeaderMap, AUTHORIZATION};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tfplug::Context;

use super::common::{ApiQueryParams, ApiResponse, ServiceErrorBody, OPC_NEXT_PAGE, OPC_REQUEST_ID};
use super::error::ApiError;
use super::pool::{ConnectionPoolConfig, RequestCounters, RequestStats};
use super::retry::RetryPolicy;

/// OCI REST client for one service endpoint
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: Option<String>,
    default_retry: RetryPolicy,
    counters: RequestCounters,
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub insecure: bool,
    /// Used for requests that carry no policy of their own
    pub default_retry: RetryPolicy,
    pub pool: ConnectionPoolConfig,
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(endpoint: &str, api_token: Option<&str>, insecure: bool) -> Result<Self, ApiError> {
        Self::with_config(
            endpoint,
            api_token,
            ClientConfig {
                insecure,
                ..ClientConfig::default()
            },
        )
    }

    pub fn with_config(
        endpoint: &str,
        api_token: Option<&str>,
        config: ClientConfig,
    ) -> Result<Self, ApiError> {
        let parsed = url::Url::parse(endpoint)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                endpoint
            )));
        }

        let http_client = config.pool.build_client(config.insecure)?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: endpoint.trim_end_matches('/').to_string(),
                auth_header: api_token.map(str::to_string),
                default_retry: config.default_retry,
                counters: RequestCounters::default(),
            }),
        })
    }

    pub fn stats(&self) -> RequestStats {
        self.inner.counters.snapshot()
    }

    /// Execute a GET request, retrying according to `retry` (or the client default).
    /// Returns `Cancelled` as soon as `ctx` is, even mid-request or mid-backoff.
    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        path: &str,
        params: &ApiQueryParams,
        retry: Option<&RetryPolicy>,
    ) -> Result<ApiResponse<T>, ApiError> {
        let url = format!("{}{}{}", self.inner.base_url, path, params.to_query_string());
        let policy = retry.unwrap_or(&self.inner.default_retry);
        let started = Instant::now();
        let mut attempts = 0;

        loop {
            if ctx.is_cancelled() {
                return Err(ApiError::Cancelled);
            }
            attempts += 1;

            let outcome = tokio::select! {
                outcome = self.send_once(&url) => outcome,
                _ = ctx.cancelled() => {
                    tracing::debug!("GET {} cancelled in flight", path);
                    return Err(ApiError::Cancelled);
                }
            };
            let error = match outcome {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            if !is_retryable(&error) || !policy.allows_retry(attempts, started.elapsed()) {
                return Err(error);
            }

            let backoff = policy.backoff(attempts);
            tracing::warn!(
                "Retrying GET {} after {}ms (attempt {}): {}",
                path,
                backoff.as_millis(),
                attempts + 1,
                error
            );
            self.inner.counters.record_retry();
            tokio::select! {
                _ = tokio::time::sleep(backoff) => {}
                _ = ctx.cancelled() => {
                    tracing::debug!("GET {} cancelled during backoff", path);
                    return Err(ApiError::Cancelled);
                }
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(&self, url: &str) -> Result<ApiResponse<T>, ApiError> {
        tracing::debug!("GET request to: {}", url);

        let mut request = self.inner.http_client.get(url);
        if let Some(auth) = &self.inner.auth_header {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                self.inner.counters.record(false);
                return Err(ApiError::RequestError(e));
            }
        };

        let status = response.status();
        let next_page = header_value(response.headers(), OPC_NEXT_PAGE);
        let request_id = header_value(response.headers(), OPC_REQUEST_ID);
        tracing::debug!("Response status: {} (opc-request-id {:?})", status, request_id);

        self.inner.counters.record(status.is_success());

        if status.is_success() {
            let text = response.text().await?;
            let data = serde_json::from_str::<T>(&text).map_err(|e| {
                tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
                ApiError::ParseError(e.to_string())
            })?;
            return Ok(ApiResponse {
                data,
                next_page,
                request_id,
            });
        }

        let code = status.as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(error_for_status(code, &text, request_id))
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn error_for_status(status: u16, body: &str, request_id: Option<String>) -> ApiError {
    let parsed = serde_json::from_str::<ServiceErrorBody>(body).ok();

    match status {
        401 => ApiError::AuthError,
        404 => ApiError::NotFound(
            parsed
                .map(|b| b.message)
                .unwrap_or_else(|| body.to_string()),
        ),
        429 => ApiError::RateLimited,
        s if s >= 500 => ApiError::ServiceUnavailable(s),
        _ => {
            let (code, message) = match parsed {
                Some(b) => (b.code, b.message),
                None => ("Unknown".to_string(), body.to_string()),
            };
            ApiError::Service {
                status,
                code,
                message,
                request_id,
            }
        }
    }
}

fn is_retryable(error: &ApiError) -> bool {
    match error {
        ApiError::RateLimited => true,
        ApiError::ServiceUnavailable(status) => RetryPolicy::is_retryable_status(*status),
        ApiError::RequestError(e) => e.is_timeout() || e.is_connect(),
        _ => false,
    }
}
