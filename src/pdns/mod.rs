// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed client for the PowerDNS Authoritative REST API.
//!
//! The client is a thin handle over a preconfigured [`reqwest::Client`]
//! (TLS, CA bundle, proxy and timeout are wired by the provider-client
//! resolver) bound to a base URL, a vhost/server id and an API key. It
//! exposes two capability sets mirroring the backend surface:
//!
//! - [`ZonesApi`](zones::ZonesApi) - get/add/change/delete zones
//! - [`RecordsApi`](records::RecordsApi) - get/change/delete record sets
//!
//! plus a server describe call used by the provider health check.
//!
//! All DNS names are canonicalized (single trailing dot) before being put
//! on the wire; see [`make_canonical`].

pub mod records;
pub mod types;
pub mod zones;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};

use self::types::Server;


/// Errors returned by the PowerDNS API client.
#[derive(Error, Debug)]
pub enum PdnsError {
    /// The requested object does not exist (HTTP 404).
    #[error("Not Found")]
    NotFound,

    /// The object conflicts with existing backend state (HTTP 409).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other non-success response from the API.
    #[error("PowerDNS API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Response body or error message.
        message: String,
    },

    /// Network-level failure (connection refused, timeout, TLS, ...).
    #[error("PowerDNS API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl PdnsError {
    /// True when the error means the object is absent backend-side.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, PdnsError::NotFound)
    }

    /// True when the error is a backend 409.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, PdnsError::Conflict(_))
    }
}

impl From<serde_json::Error> for PdnsError {
    fn from(e: serde_json::Error) -> Self {
        PdnsError::Api {
            status: 0,
            message: format!("invalid request body: {e}"),
        }
    }
}

/// Suffix a DNS name with exactly one trailing dot.
///
/// Idempotent: already-canonical names are returned unchanged. The empty
/// name canonicalizes to the root `.`.
#[must_use]
pub fn make_canonical(name: &str) -> String {
    format!("{}.", name.trim_end_matches('.'))
}

/// Strip the trailing dot from a canonical name for internal storage.
#[must_use]
pub fn trim_canonical(name: &str) -> String {
    name.trim_end_matches('.').to_string()
}

/// Handle on one PowerDNS Authoritative API endpoint.
///
/// Cheap to clone; the underlying [`reqwest::Client`] pools connections and
/// is immutable after construction.
#[derive(Clone, Debug)]
pub struct PdnsClient {
    http: reqwest::Client,
    base_url: String,
    vhost: String,
    api_key: String,
}

impl PdnsClient {
    /// Bind a client to `(base_url, vhost, api_key)` using a preconfigured
    /// HTTP client.
    #[must_use]
    pub fn new(base_url: &str, vhost: &str, api_key: &str, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            vhost: vhost.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// The vhost/server id this client addresses.
    #[must_use]
    pub fn vhost(&self) -> &str {
        &self.vhost
    }

    /// Zones capability set.
    #[must_use]
    pub fn zones(&self) -> zones::ZonesApi<'_> {
        zones::ZonesApi { client: self }
    }

    /// Records capability set.
    #[must_use]
    pub fn records(&self) -> records::RecordsApi<'_> {
        records::RecordsApi { client: self }
    }

    /// Describe the server: version, daemon type and id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend answers with a
    /// non-success status.
    pub async fn server(&self) -> Result<Server, PdnsError> {
        self.request_json(Method::GET, &format!("/servers/{}", self.vhost), None)
            .await
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    /// Execute one API request and return the raw response body.
    ///
    /// 404 and 409 responses are mapped to their typed variants so callers
    /// can branch on absence and duplication without parsing messages.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<String, PdnsError> {
        let url = self.url(path);

        debug!(
            method = %method,
            url = %url,
            vhost = %self.vhost,
            "PowerDNS API request"
        );

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header("X-API-Key", &self.api_key);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                method = %method,
                url = %url,
                status = %status,
                message = %message,
                "PowerDNS API request failed"
            );
            return Err(match status {
                StatusCode::NOT_FOUND => PdnsError::NotFound,
                StatusCode::CONFLICT => PdnsError::Conflict(message),
                _ => PdnsError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        Ok(response.text().await?)
    }

    /// Execute one API request and deserialize the JSON response.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, PdnsError> {
        let text = self.request(method, path, body).await?;
        serde_json::from_str(&text).map_err(|e| PdnsError::Api {
            status: 200,
            message: format!("invalid response body: {e}"),
        })
    }
}
