//! Shared HTTP client for the backend API.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::BackendError;
use crate::metrics::CallTimer;

/// HTTP client bound to one backend base URL.
///
/// Timeouts come from configuration and apply per request; there is no
/// retry layer on top.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    service_token: Option<String>,
}

impl BackendClient {
    /// Build a client for the given base URL.
    ///
    /// `service_token`, when configured, is sent as a bearer token on
    /// every request.
    pub fn new(
        base_url: impl Into<String>,
        service_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BackendError::from)?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            http,
            base_url,
            service_token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a request and decode the JSON response body.
    pub(crate) async fn request_json<T, B>(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let timer = CallTimer::new(operation);
        let result = match self.dispatch(operation, method, path, body).await {
            Ok(response) => response
                .json::<T>()
                .await
                .map_err(|err| BackendError::Decode(err.to_string())),
            Err(err) => Err(err),
        };
        match &result {
            Ok(_) => timer.record("success"),
            Err(err) => timer.record(err.outcome()),
        }
        result
    }

    /// Issue a request and discard the response body.
    pub(crate) async fn request_no_content<B>(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), BackendError>
    where
        B: Serialize + ?Sized,
    {
        let timer = CallTimer::new(operation);
        let result = self.dispatch(operation, method, path, body).await;
        match &result {
            Ok(_) => timer.record("success"),
            Err(err) => timer.record(err.outcome()),
        }
        result.map(|_| ())
    }

    async fn dispatch<B>(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, BackendError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(token) = &self.service_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                let err = BackendError::from(err);
                tracing::warn!(
                    operation,
                    method = %method,
                    path,
                    error = %err,
                    "Backend call failed"
                );
                return Err(err);
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        tracing::warn!(
            operation,
            method = %method,
            path,
            status = status.as_u16(),
            "Backend returned error status"
        );
        Err(Self::status_error(status, response).await)
    }

    async fn status_error(status: StatusCode, response: reqwest::Response) -> BackendError {
        if status == StatusCode::NOT_FOUND {
            return BackendError::NotFound;
        }
        if status.is_server_error() {
            return BackendError::Unavailable {
                status: status.as_u16(),
            };
        }
        let message = response
            .text()
            .await
            .ok()
            .and_then(|text| extract_message(&text))
            .unwrap_or_else(|| status.to_string());
        BackendError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

/// Pull a human-readable message out of a backend error body.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|v| v.as_str())
        .map(String::from)
}
