//! A minimal Alerta API client.
//!
//! Only the "send alert" call is needed: `POST {endpoint}/alert` with the
//! payload as JSON. Transport failures map to [`AlertaError::Send`]; an
//! answer that rejects the alert maps to [`AlertaError::Api`].

use std::fs;

use alerta_config::{Options, TlsVerify};
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{AlertaError, Result};
use crate::types::AlertPayload;

/// What the server said about an accepted alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// HTTP status of the response.
    pub status_code: u16,
    /// Alert id assigned by the server, when it reported one.
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Blocking client for one Alerta endpoint.
#[derive(Debug, Clone)]
pub struct AlertaClient {
    http: Client,
    endpoint: String,
    key: String,
}

impl AlertaClient {
    /// Builds a client from resolved options.
    ///
    /// # Errors
    ///
    /// Returns `AlertaError::InvalidConfig` if the endpoint is empty, the CA
    /// bundle cannot be loaded, or the HTTP client cannot be built.
    pub fn new(options: &Options) -> Result<Self> {
        if options.endpoint.trim().is_empty() {
            return Err(AlertaError::InvalidConfig {
                reason: "endpoint cannot be empty".to_string(),
            });
        }

        let mut builder = Client::builder().timeout(options.timeout);
        builder = match &options.ssl_verify {
            TlsVerify::Enabled => builder,
            TlsVerify::Disabled => builder.danger_accept_invalid_certs(true),
            TlsVerify::CaBundle(path) => {
                let pem = fs::read(path).map_err(|e| AlertaError::InvalidConfig {
                    reason: format!("cannot read CA bundle {}: {e}", path.display()),
                })?;
                let cert =
                    reqwest::Certificate::from_pem(&pem).map_err(|e| AlertaError::InvalidConfig {
                        reason: format!("invalid CA bundle {}: {e}", path.display()),
                    })?;
                builder.add_root_certificate(cert)
            }
        };

        let http = builder.build().map_err(|e| AlertaError::InvalidConfig {
            reason: e.to_string(),
        })?;

        Ok(Self {
            http,
            endpoint: options.endpoint.trim_end_matches('/').to_string(),
            key: options.key.clone(),
        })
    }

    /// Base URL of the API.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// URL alerts are posted to.
    #[must_use]
    pub fn alert_url(&self) -> String {
        format!("{}/alert", self.endpoint)
    }

    /// Sends one alert.
    ///
    /// # Errors
    ///
    /// Returns `AlertaError::Send` if the request fails in transit and
    /// `AlertaError::Api` if the server rejects the alert.
    pub fn send_alert(&self, payload: &AlertPayload) -> Result<SendReceipt> {
        let mut request = self.http.post(self.alert_url()).json(payload);
        if !self.key.is_empty() {
            request = request.header(AUTHORIZATION, format!("Key {}", self.key));
        }

        let response = request.send().map_err(|e| AlertaError::transport(&e))?;
        let status = response.status();
        let body = response.text().map_err(|e| AlertaError::transport(&e))?;
        let parsed: Option<ApiResponse> = serde_json::from_str(&body).ok();

        let rejected = parsed
            .as_ref()
            .and_then(|r| r.status.as_deref())
            .is_some_and(|s| s == "error");

        if !status.is_success() || rejected {
            let message = parsed
                .and_then(|r| r.message)
                .unwrap_or_else(|| body.trim().to_string());
            warn!(
                url = %self.alert_url(),
                status = status.as_u16(),
                message = %message,
                "alerta rejected alert"
            );
            return Err(AlertaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let id = parsed.and_then(|r| r.id);
        debug!(status = status.as_u16(), id = ?id, "alerta accepted alert");

        Ok(SendReceipt {
            status_code: status.as_u16(),
            id,
        })
    }
}
