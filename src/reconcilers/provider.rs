// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! PDNSProvider reconciliation logic.
//!
//! On each event the reconciler validates credentials and reachability: it
//! resolves the API key, builds the HTTP client and issues a server
//! describe against the backend. Success requires the backend to report an
//! authoritative daemon; anything else is a connection failure. The result
//! lands in `status.connectionStatus` and a `Ready` condition, and the
//! resource is rescheduled after the configured interval (30 s on failure).

use anyhow::Result;
use kube::api::{Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::{Api, Resource, ResourceExt};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::constants::{
    LAST_CONNECTION_REFRESH_SECS, PROVIDER_FAILURE_REQUEUE_SECS, RESOURCES_FINALIZER_NAME,
};
use crate::context::Context;
use crate::crd::{PDNSProvider, PDNSProviderStatus};
use crate::pdns::types::Server;
use crate::pdns::PdnsClient;
use crate::reconcilers::finalizers::{ensure_finalizer, remove_finalizer};
use crate::reconcilers::resolver::{build_http_client, get_api_key};
use crate::reconcilers::status::{new_condition, set_condition};
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_READY, CONNECTED_STATUS,
    FAILED_STATUS, MESSAGE_CONNECTED, REASON_CONNECTED, REASON_CONNECTION_FAILED,
    REASON_SECRET_NOT_FOUND,
};

/// Reconcile one `PDNSProvider`.
///
/// # Errors
///
/// Returns an error only for failures that cannot be surfaced as status
/// (finalizer patches); connection and secret problems are written to
/// status and retried through timed requeues.
pub async fn reconcile_provider(
    provider: Arc<PDNSProvider>,
    ctx: Arc<Context>,
) -> Result<Action> {
    let name = provider.name_any();
    let api: Api<PDNSProvider> = Api::all(ctx.client.clone());

    info!(provider = %name, "Reconcile PDNSProvider");

    let is_deleted = provider.meta().deletion_timestamp.is_some();

    // The finalizer comes before any other action so a half-observed
    // resource can always be cleaned up.
    if is_deleted {
        remove_finalizer(&api, provider.as_ref(), RESOURCES_FINALIZER_NAME).await?;
        return Ok(Action::await_change());
    }
    ensure_finalizer(&api, provider.as_ref(), RESOURCES_FINALIZER_NAME).await?;

    // Credentials
    let api_key = match get_api_key(&ctx.client, &provider).await {
        Ok(key) => key,
        Err(e) => {
            warn!(provider = %name, error = %e, "Failed to get API key from secret");
            update_provider_status(
                &api,
                &provider,
                FAILED_STATUS,
                None,
                REASON_SECRET_NOT_FOUND,
                &e.to_string(),
            )
            .await;
            return Ok(Action::requeue(Duration::from_secs(
                PROVIDER_FAILURE_REQUEUE_SECS,
            )));
        }
    };

    // Reachability
    match check_connection(&ctx.client, &provider, &api_key).await {
        Ok(server) => {
            update_provider_status(
                &api,
                &provider,
                CONNECTED_STATUS,
                Some(&server),
                REASON_CONNECTED,
                MESSAGE_CONNECTED,
            )
            .await;
            Ok(Action::requeue(provider.interval()))
        }
        Err(e) => {
            warn!(provider = %name, error = %e, "Failed to connect to PowerDNS");
            update_provider_status(
                &api,
                &provider,
                FAILED_STATUS,
                None,
                REASON_CONNECTION_FAILED,
                &e.to_string(),
            )
            .await;
            Ok(Action::requeue(Duration::from_secs(
                PROVIDER_FAILURE_REQUEUE_SECS,
            )))
        }
    }
}

/// Issue a server describe and require an authoritative daemon.
async fn check_connection(
    client: &kube::Client,
    provider: &PDNSProvider,
    api_key: &str,
) -> Result<Server> {
    let http = build_http_client(client, provider).await?;
    let pdns = PdnsClient::new(&provider.spec.url, provider.vhost(), api_key, http);

    let server = pdns
        .server()
        .await
        .map_err(|e| anyhow::anyhow!("failed to connect to PowerDNS: {e}"))?;

    if let Some(daemon_type) = server.daemon_type.as_deref() {
        if daemon_type != "authoritative" {
            anyhow::bail!("PowerDNS server is not authoritative, got: {daemon_type}");
        }
    }

    Ok(server)
}

/// Merge-patch the provider status with the outcome of a connection check.
///
/// `lastConnectionTime` advances only when the connection state changed or
/// more than four minutes elapsed, which keeps periodic re-checks from
/// amplifying status writes. A patch failure is logged, not propagated:
/// the next interval re-runs the check anyway.
async fn update_provider_status(
    api: &Api<PDNSProvider>,
    provider: &PDNSProvider,
    connection_status: &str,
    server: Option<&Server>,
    reason: &str,
    message: &str,
) {
    let previous = provider.status.clone().unwrap_or_default();
    let now = chrono::Utc::now();

    let mut status = PDNSProviderStatus {
        connection_status: Some(connection_status.to_string()),
        observed_generation: provider.meta().generation,
        ..previous.clone()
    };

    if let Some(server) = server {
        status.power_dns_version = server.version.clone();
        status.daemon_type = server.daemon_type.clone();
        status.server_id = server.id.clone();

        let should_update_time = previous.connection_status.as_deref() != Some(connection_status)
            || previous
                .last_connection_time
                .as_deref()
                .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
                .is_none_or(|t| {
                    (now - t.with_timezone(&chrono::Utc)).num_seconds()
                        > LAST_CONNECTION_REFRESH_SECS
                });
        if should_update_time {
            status.last_connection_time = Some(now.to_rfc3339());
        }
    }

    let condition_status = if connection_status == CONNECTED_STATUS {
        CONDITION_STATUS_TRUE
    } else {
        CONDITION_STATUS_FALSE
    };
    let mut conditions = previous.conditions;
    set_condition(
        &mut conditions,
        new_condition(
            CONDITION_TYPE_READY,
            condition_status,
            reason,
            message,
            provider.meta().generation,
        ),
    );
    status.conditions = conditions;

    let patch = json!({ "status": status });
    if let Err(e) = api
        .patch_status(
            &provider.name_any(),
            &PatchParams::default(),
            &Patch::Merge(&patch),
        )
        .await
    {
        warn!(provider = %provider.name_any(), error = %e, "Failed to update provider status");
    }
}
