//! Executes `HttpRequest` values against the network.
//!
//! The core never performs I/O itself; `Api` hands every built request to a
//! `Transport`. Tests substitute a scripted implementation.

use std::future::Future;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport: Send + Sync {
    /// Perform one `POST` round-trip. Any status code is a successful
    /// round-trip; only failures to obtain a response are errors.
    fn execute(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

/// `reqwest` transport with a cookie store, so the session cookie set by
/// `/login` is sent on every later call made through the same instance.
///
/// Request paths must be absolute URLs, so the client's base (`API_URL`)
/// needs a scheme and host; the relative default only works for hosts that
/// resolve paths themselves.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        if reqwest::Url::parse(&request.path).is_err() {
            return Err(ApiError::Transport(format!(
                "{} is not an absolute URL; set API_URL to the server's full base URL",
                request.path
            )));
        }
        tracing::trace!(path = %request.path, "POST");
        let mut builder = self.client.post(&request.path);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        tracing::trace!(path = %request.path, status, "response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::AdminClient;
    use crate::config::ClientConfig;

    #[tokio::test]
    async fn relative_base_is_rejected_before_sending() {
        let client = AdminClient::new(&ClientConfig::default().api_url);
        let transport = ReqwestTransport::new().unwrap();

        let err = transport.execute(client.build_logout()).await.unwrap_err();

        assert!(matches!(err, ApiError::Transport(ref msg) if msg.contains("API_URL")));
    }
}
