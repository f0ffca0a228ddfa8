// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider-client resolver.
//!
//! Resolves either a per-resource [`PDNSProvider`] reference or the
//! process-wide legacy client into an authenticated [`PdnsClient`]:
//!
//! 1. A non-empty `providerRef` fetches the `PDNSProvider` resource.
//! 2. The API key is loaded from the referenced secret.
//! 3. A TLS config honors the insecure flag and an optional CA bundle
//!    resolved from a ConfigMap or Secret.
//! 4. The HTTP transport gets an optional proxy; a proxy URL that fails to
//!    parse fails the reconcile, since it is user-visible configuration.
//! 5. The HTTP client carries the configured timeout.
//! 6. The backend client is bound to `(URL, vhost, key)`.
//!
//! An empty reference falls back to the legacy environment-configured
//! client if and only if one was built at startup.

use anyhow::{bail, Context as AnyhowContext, Result};
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::{Api, Client};
use std::time::Duration;

use crate::context::Context;
use crate::crd::PDNSProvider;
use crate::pdns::PdnsClient;

/// Resolve the PowerDNS client for a resource.
///
/// Prefers a non-empty provider reference; falls back to the legacy handle
/// when that is configured.
///
/// # Errors
///
/// Returns an error when the provider (or its secret, CA bundle or proxy
/// configuration) cannot be resolved, or when neither a reference nor a
/// legacy client is available.
pub async fn get_pdns_client(ctx: &Context, provider_ref: Option<&str>) -> Result<PdnsClient> {
    if let Some(name) = provider_ref.filter(|r| !r.is_empty()) {
        return provider_client(&ctx.client, name)
            .await
            .with_context(|| format!("failed to get client for provider '{name}'"));
    }

    if let Some(legacy) = &ctx.legacy_client {
        return Ok(legacy.clone());
    }

    bail!(
        "no PowerDNS client available: either set spec.providerRef to reference a \
         PDNSProvider resource, or provide legacy configuration via environment variables"
    )
}

/// Build an authenticated client from a [`PDNSProvider`] by name.
///
/// # Errors
///
/// Returns a wrapped not-found error when the provider is absent, plus any
/// secret/TLS/proxy resolution failure.
pub async fn provider_client(client: &Client, name: &str) -> Result<PdnsClient> {
    let api: Api<PDNSProvider> = Api::all(client.clone());
    let provider = api
        .get_opt(name)
        .await
        .with_context(|| format!("failed to fetch provider '{name}'"))?
        .with_context(|| format!("provider '{name}' not found"))?;

    build_provider_client(client, &provider).await
}

/// Build an authenticated client from an already-fetched provider.
///
/// # Errors
///
/// Returns any secret/TLS/proxy resolution failure.
pub async fn build_provider_client(client: &Client, provider: &PDNSProvider) -> Result<PdnsClient> {
    let api_key = get_api_key(client, provider).await?;
    let http = build_http_client(client, provider).await?;
    Ok(PdnsClient::new(
        &provider.spec.url,
        provider.vhost(),
        &api_key,
        http,
    ))
}

/// Load the API key from the provider's credentials secret.
///
/// # Errors
///
/// Returns an error when the secret is missing, or the key field is absent
/// or empty.
pub async fn get_api_key(client: &Client, provider: &PDNSProvider) -> Result<String> {
    let secret_ref = &provider.spec.credentials.secret_ref;
    let secrets: Api<Secret> = Api::namespaced(client.clone(), &secret_ref.namespace);
    let secret = secrets.get(&secret_ref.name).await.with_context(|| {
        format!(
            "failed to get secret '{}/{}'",
            secret_ref.namespace, secret_ref.name
        )
    })?;

    let key = provider.credentials_secret_key();
    let data = secret
        .data
        .as_ref()
        .and_then(|d| d.get(key))
        .with_context(|| {
            format!(
                "'{key}' field not found in secret '{}/{}'",
                secret_ref.namespace, secret_ref.name
            )
        })?;
    if data.0.is_empty() {
        bail!(
            "'{key}' field is empty in secret '{}/{}'",
            secret_ref.namespace,
            secret_ref.name
        );
    }

    String::from_utf8(data.0.clone()).context("API key is not valid UTF-8")
}

/// Resolve the configured CA bundle, from a ConfigMap or a Secret by kind.
async fn get_ca_bundle(client: &Client, provider: &PDNSProvider) -> Result<Option<Vec<u8>>> {
    let Some(ca_ref) = provider.ca_bundle_ref() else {
        return Ok(None);
    };

    let data = if ca_ref.kind() == "Secret" {
        let secrets: Api<Secret> = Api::namespaced(client.clone(), &ca_ref.namespace);
        let secret = secrets.get(&ca_ref.name).await.with_context(|| {
            format!("failed to get secret '{}/{}'", ca_ref.namespace, ca_ref.name)
        })?;
        secret
            .data
            .as_ref()
            .and_then(|d| d.get(ca_ref.key()))
            .map(|b| b.0.clone())
    } else {
        let config_maps: Api<ConfigMap> = Api::namespaced(client.clone(), &ca_ref.namespace);
        let config_map = config_maps.get(&ca_ref.name).await.with_context(|| {
            format!(
                "failed to get configmap '{}/{}'",
                ca_ref.namespace, ca_ref.name
            )
        })?;
        config_map
            .data
            .as_ref()
            .and_then(|d| d.get(ca_ref.key()))
            .map(|s| s.clone().into_bytes())
    };

    let data = data.with_context(|| {
        format!(
            "'{}' not found in {} '{}/{}'",
            ca_ref.key(),
            ca_ref.kind().to_lowercase(),
            ca_ref.namespace,
            ca_ref.name
        )
    })?;

    Ok(Some(data))
}

/// Build the HTTP client for a provider: TLS options, CA bundle, proxy
/// and timeout.
///
/// # Errors
///
/// Returns an error on missing CA data, invalid PEM, or an unparseable
/// proxy URL.
pub async fn build_http_client(client: &Client, provider: &PDNSProvider) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().timeout(provider.timeout());

    if provider.tls_insecure() {
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let Some(pem) = get_ca_bundle(client, provider).await? {
        let certs = reqwest::Certificate::from_pem_bundle(&pem)
            .context("failed to parse CA certificate")?;
        if certs.is_empty() {
            bail!("failed to parse CA certificate: no certificates in PEM bundle");
        }
        for cert in certs {
            builder = builder.add_root_certificate(cert);
        }
    }

    if let Some(proxy) = provider.spec.proxy.as_deref().filter(|p| !p.is_empty()) {
        let proxy_url = url::Url::parse(proxy)
            .with_context(|| format!("failed to parse proxy URL '{proxy}'"))?;
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    builder.build().context("failed to build HTTP client")
}

/// Build the HTTP client for the legacy environment-configured path:
/// insecure flag, optional CA file and timeout.
///
/// # Errors
///
/// Returns an error when the CA file cannot be read or parsed.
pub fn legacy_http_client(
    timeout: Duration,
    insecure: bool,
    ca_path: Option<&str>,
) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().timeout(timeout);

    if insecure {
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let Some(path) = ca_path.filter(|p| !p.is_empty()) {
        let pem = std::fs::read(path)
            .with_context(|| format!("unable to load CA certificate '{path}'"))?;
        let certs = reqwest::Certificate::from_pem_bundle(&pem)
            .with_context(|| format!("unable to parse CA certificate '{path}'"))?;
        if certs.is_empty() {
            bail!("unable to parse CA certificate '{path}': no certificates in PEM bundle");
        }
        for cert in certs {
            builder = builder.add_root_certificate(cert);
        }
    }

    builder.build().context("failed to build HTTP client")
}
