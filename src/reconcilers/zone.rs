// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone and ClusterZone reconciliation logic.
//!
//! One generic state machine serves both scopes (see
//! [`GenericZone`]). States are Pending (not yet persisted), Succeeded
//! (backend agrees with spec) and Failed (last reconcile hit an error or a
//! duplicate); every status write carries an `Available` condition.
//!
//! The update workflow is dual-phase: nameserver changes patch the NS
//! record set, every other writable attribute change patches the zone.
//! Either phase can fail independently, with a distinct condition reason.

use anyhow::Result;
use kube::api::{Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::{Api, ResourceExt};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::constants::{
    CONFLICT_REQUEUE_SECS, DEFAULT_TTL_FOR_NS_RECORDS, ERROR_REQUEUE_DURATION_SECS,
    FAILED_RETRY_COOLDOWN_SECS, METRICS_FINALIZER_NAME, RESOURCES_FINALIZER_NAME,
};
use crate::context::Context;
use crate::crd::{Condition, ZoneStatus};
use crate::generic::GenericZone;
use crate::metrics;
use crate::pdns::types::Zone as BackendZone;
use crate::pdns::{make_canonical, trim_canonical, PdnsClient};
use crate::reconcilers::finalizers::{ensure_finalizer, has_finalizer, remove_finalizer};
use crate::reconcilers::helpers::{
    duplicate_exists, filter_rrset, nameservers_of, zone_is_identical,
};
use crate::reconcilers::resolver::get_pdns_client;
use crate::reconcilers::status::{
    new_condition, remove_condition, set_condition, transitioned_within,
};
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_AVAILABLE, FAILED_STATUS,
    MESSAGE_ZONE_DUPLICATED, MESSAGE_ZONE_SYNC_SUCCEEDED, REASON_DUPLICATED,
    REASON_NS_SYNCHRONIZATION_FAILED, REASON_SYNCHRONIZATION_FAILED, REASON_ZONE_SYNCED,
    SUCCEEDED_STATUS,
};

/// Reconcile one `Zone` or `ClusterZone`.
///
/// # Errors
///
/// Returns an error only where no meaningful status can be written
/// (finalizer patches, backend deletion during cleanup); everything else
/// is surfaced through `status.syncStatus` and timed requeues.
pub async fn reconcile_zone<Z: GenericZone>(zone: Arc<Z>, ctx: Arc<Context>) -> Result<Action> {
    let name = zone.name_any();
    let namespace = zone.metrics_namespace();
    let api = zone.api(ctx.client.clone());

    info!(kind = %Z::KIND, zone = %name, "Reconcile zone");

    let is_modified = matches!(
        (
            zone.status().and_then(|s| s.observed_generation),
            zone.meta().generation,
        ),
        (Some(observed), Some(generation)) if observed != generation
    );
    let is_deleted = zone.meta().deletion_timestamp.is_some();

    // When only the message of a rewritten condition changes, the API
    // server keeps the old LastTransitionTime. Stripping the condition on a
    // spec change forces a fresh transition time on the rewrite.
    let mut conditions = zone
        .status()
        .map(|s| s.conditions.clone())
        .unwrap_or_default();
    if !is_deleted && is_modified {
        remove_condition(&mut conditions, CONDITION_TYPE_AVAILABLE);
        let patch = json!({ "status": { "conditions": conditions } });
        api.patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
    }

    if is_deleted {
        return delete_zone(&api, zone.as_ref(), &ctx, &name, &namespace).await;
    }

    ensure_finalizer(&api, zone.as_ref(), RESOURCES_FINALIZER_NAME).await?;
    ensure_finalizer(&api, zone.as_ref(), METRICS_FINALIZER_NAME).await?;

    // Failure back-off: a Failed zone whose spec did not change is not
    // retried against the backend more often than every 30 seconds.
    if zone.sync_status() == Some(FAILED_STATUS)
        && !is_modified
        && transitioned_within(
            &conditions,
            CONDITION_TYPE_AVAILABLE,
            FAILED_RETRY_COOLDOWN_SECS,
        )
    {
        debug!(zone = %name, "Zone failed recently, backing off");
        metrics::update_zone_metrics(FAILED_STATUS, &name, &namespace);
        return Ok(Action::requeue(Duration::from_secs(
            ERROR_REQUEUE_DURATION_SECS,
        )));
    }

    // Uniqueness: at most one Zone or ClusterZone may claim this FQDN.
    let entries = ctx.stores.zone_entries(&name);
    if duplicate_exists(
        &entries,
        &zone.uid().unwrap_or_default(),
        zone.creation_timestamp().as_ref(),
        zone.sync_status(),
    ) {
        warn!(kind = %Z::KIND, zone = %name, "Duplicated zone, another resource claims this FQDN");
        // The backend is never touched; the periodic retry only re-checks
        // the index so the loser converges once the winner is deleted.
        return finish(
            &api,
            zone.as_ref(),
            &name,
            &namespace,
            conditions,
            None,
            FAILED_STATUS,
            REASON_DUPLICATED,
            MESSAGE_ZONE_DUPLICATED,
        )
        .await;
    }

    let pdns = match get_pdns_client(&ctx, zone.provider_ref()).await {
        Ok(client) => client,
        Err(e) => {
            warn!(zone = %name, error = %e, "Failed to get PowerDNS client");
            return finish(
                &api,
                zone.as_ref(),
                &name,
                &namespace,
                conditions,
                None,
                FAILED_STATUS,
                REASON_SYNCHRONIZATION_FAILED,
                &e.to_string(),
            )
            .await;
        }
    };

    // Backend describe; a transport error is surfaced as status, never as
    // a reconcile error, so the status is always advanced.
    let backend_zone = match pdns.zones().get(&name).await {
        Ok(zone_res) => zone_res,
        Err(e) => {
            warn!(zone = %name, error = %e, "Failed to get zone from PowerDNS");
            return finish(
                &api,
                zone.as_ref(),
                &name,
                &namespace,
                conditions,
                None,
                FAILED_STATUS,
                REASON_SYNCHRONIZATION_FAILED,
                &e.to_string(),
            )
            .await;
        }
    };

    let (sync_status, reason, message) =
        converge(zone.as_ref(), &pdns, &name, backend_zone).await;

    // Re-describe so the status carries what the backend now holds
    // (serial bumps, synthesized catalog, ...).
    let backend_now = pdns.zones().get(&name).await.ok().flatten();

    finish(
        &api,
        zone.as_ref(),
        &name,
        &namespace,
        conditions,
        backend_now.as_ref(),
        sync_status,
        reason,
        &message,
    )
    .await
}

/// Drive the backend toward the declared spec.
///
/// Returns the resulting sync state with its condition reason and message.
async fn converge<Z: GenericZone>(
    zone: &Z,
    pdns: &PdnsClient,
    name: &str,
    backend_zone: Option<BackendZone>,
) -> (&'static str, &'static str, String) {
    let mut sync_status = SUCCEEDED_STATUS;
    let mut reason = REASON_ZONE_SYNCED;
    let mut message = MESSAGE_ZONE_SYNC_SUCCEEDED.to_string();

    match backend_zone {
        None => {
            // Zone does not exist backend-side: create it with canonical
            // nameservers and DNSSEC explicitly disabled.
            let payload = BackendZone {
                id: Some(name.to_string()),
                name: Some(name.to_string()),
                kind: Some(zone.zone_kind().as_str().to_string()),
                dnssec: Some(false),
                soa_edit_api: Some(zone.soa_edit_api().as_str().to_string()),
                nameservers: Some(zone.nameservers().iter().map(|n| make_canonical(n)).collect()),
                catalog: zone.catalog().map(make_canonical),
                ..BackendZone::default()
            };
            if let Err(e) = pdns.zones().add(&payload).await {
                warn!(zone = %name, error = %e, "Failed to create zone");
                sync_status = FAILED_STATUS;
                message = e.to_string();
                reason = if e.is_conflict() {
                    REASON_DUPLICATED
                } else {
                    REASON_SYNCHRONIZATION_FAILED
                };
            }
        }
        Some(backend) => {
            // Zone exists: compute both deltas and patch only what moved.
            let ns_response = match pdns.records().get(name, name, "NS").await {
                Ok(rrsets) => rrsets,
                Err(e) => {
                    warn!(zone = %name, error = %e, "Failed to get NS record set");
                    return (FAILED_STATUS, REASON_SYNCHRONIZATION_FAILED, e.to_string());
                }
            };
            let ns_rrset = filter_rrset(ns_response, name, "NS");
            let backend_nameservers = nameservers_of(ns_rrset.as_ref());

            let (zone_identical, ns_identical) =
                zone_is_identical(zone, &backend, &backend_nameservers);

            if !ns_identical {
                let ttl = ns_rrset
                    .as_ref()
                    .and_then(|rr| rr.ttl)
                    .unwrap_or(DEFAULT_TTL_FOR_NS_RECORDS);
                let canonical: Vec<String> =
                    zone.nameservers().iter().map(|n| make_canonical(n)).collect();
                if let Err(e) = pdns
                    .records()
                    .change(name, name, "NS", ttl, &canonical, Vec::new())
                    .await
                {
                    warn!(zone = %name, error = %e, "Failed to update NS in zone");
                    sync_status = FAILED_STATUS;
                    reason = REASON_NS_SYNCHRONIZATION_FAILED;
                    message = e.to_string();
                }
            }

            if !zone_identical {
                let payload = BackendZone {
                    name: Some(name.to_string()),
                    kind: Some(zone.zone_kind().as_str().to_string()),
                    soa_edit_api: Some(zone.soa_edit_api().as_str().to_string()),
                    catalog: zone.catalog().map(make_canonical),
                    ..BackendZone::default()
                };
                if let Err(e) = pdns.zones().change(name, &payload).await {
                    warn!(zone = %name, error = %e, "Failed to update zone");
                    sync_status = FAILED_STATUS;
                    reason = REASON_SYNCHRONIZATION_FAILED;
                    message = e.to_string();
                }
            }
        }
    }

    (sync_status, reason, message)
}

/// Deletion path: delete the backend zone (absence is success), then
/// release both finalizers and drop the gauges.
async fn delete_zone<Z: GenericZone>(
    api: &Api<Z>,
    zone: &Z,
    ctx: &Context,
    name: &str,
    namespace: &str,
) -> Result<Action> {
    if has_finalizer(zone, RESOURCES_FINALIZER_NAME) {
        let pdns = get_pdns_client(ctx, zone.provider_ref()).await?;
        match pdns.zones().delete(name).await {
            Ok(()) => info!(zone = %name, "Deleted zone from PowerDNS"),
            // Zone may have already been deleted and it is not an error.
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                warn!(zone = %name, error = %e, "Failed to delete zone");
                return Err(e.into());
            }
        }
        remove_finalizer(api, zone, RESOURCES_FINALIZER_NAME).await?;
    }

    if has_finalizer(zone, METRICS_FINALIZER_NAME) {
        metrics::remove_zone_metrics(name, namespace);
        remove_finalizer(api, zone, METRICS_FINALIZER_NAME).await?;
    }

    Ok(Action::await_change())
}

/// Write the final status (merge patch), publish the gauge and pick the
/// follow-up action: event-driven on success, a 30 s retry on failure,
/// an immediate requeue on a patch conflict.
#[allow(clippy::too_many_arguments)]
async fn finish<Z: GenericZone>(
    api: &Api<Z>,
    zone: &Z,
    name: &str,
    namespace: &str,
    mut conditions: Vec<Condition>,
    backend: Option<&BackendZone>,
    sync_status: &str,
    reason: &str,
    message: &str,
) -> Result<Action> {
    let condition_status = if sync_status == SUCCEEDED_STATUS {
        CONDITION_STATUS_TRUE
    } else {
        CONDITION_STATUS_FALSE
    };
    set_condition(
        &mut conditions,
        new_condition(
            CONDITION_TYPE_AVAILABLE,
            condition_status,
            reason,
            message,
            zone.meta().generation,
        ),
    );

    let status = ZoneStatus {
        id: backend.and_then(|b| b.id.clone()),
        name: backend.and_then(|b| b.name.as_deref().map(trim_canonical)),
        kind: backend.and_then(|b| b.kind.clone()),
        serial: backend.and_then(|b| b.serial),
        notified_serial: backend.and_then(|b| b.notified_serial),
        edited_serial: backend.and_then(|b| b.edited_serial),
        masters: backend.and_then(|b| b.masters.clone()),
        dnssec: backend.and_then(|b| b.dnssec),
        catalog: backend.and_then(|b| b.catalog.as_deref().map(trim_canonical)),
        sync_status: Some(sync_status.to_string()),
        conditions,
        observed_generation: zone.meta().generation,
    };

    let patch = json!({ "status": status });
    match api
        .patch_status(name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
    {
        Ok(_) => {}
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            info!(zone = %name, "Zone has been modified, forcing a new reconciliation");
            return Ok(Action::requeue(Duration::from_secs(CONFLICT_REQUEUE_SECS)));
        }
        Err(e) => return Err(e.into()),
    }

    metrics::update_zone_metrics(sync_status, name, namespace);

    if sync_status == SUCCEEDED_STATUS {
        Ok(Action::await_change())
    } else {
        Ok(Action::requeue(Duration::from_secs(
            ERROR_REQUEUE_DURATION_SECS,
        )))
    }
}
