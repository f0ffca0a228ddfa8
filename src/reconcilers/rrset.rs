// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! RRset and ClusterRRset reconciliation logic.
//!
//! One generic state machine serves both scopes (see [`GenericRRset`]).
//! A record set converges against the parent zone named by `spec.zoneRef`:
//!
//! - Parent missing: the record set goes Pending with reason
//!   `ZoneNotAvailable` and requeues after 2 seconds, which closes the
//!   common create-zone-and-rrset-together race.
//! - Parent Failed: short-circuit for 30 seconds after the record set's
//!   own last failure, then mark Failed but still attempt convergence,
//!   because the parent's status may be stale relative to backend reality.
//! - Parent Succeeded: converge.
//!
//! After convergence the parent becomes the controller owner of the record
//! set so zone deletion cascades through the API server.

use anyhow::Result;
use kube::api::{Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::{Api, ResourceExt};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::constants::{
    CONFLICT_REQUEUE_SECS, ERROR_REQUEUE_DURATION_SECS, FAILED_RETRY_COOLDOWN_SECS,
    METRICS_FINALIZER_NAME, RESOURCES_FINALIZER_NAME, RRSET_COMMENT_ACCOUNT,
    ZONE_NOT_AVAILABLE_REQUEUE_SECS,
};
use crate::context::Context;
use crate::crd::{ClusterZone, Condition, RRsetStatus, Zone, ZoneRefKind};
use crate::generic::{GenericRRset, ParentZone};
use crate::metrics;
use crate::pdns::types::Comment;
use crate::reconcilers::finalizers::{ensure_finalizer, has_finalizer, remove_finalizer};
use crate::reconcilers::helpers::{duplicate_exists, filter_rrset, rrset_fqdn, rrset_matches};
use crate::reconcilers::resolver::get_pdns_client;
use crate::reconcilers::status::{
    new_condition, remove_condition, set_condition, transitioned_within,
};
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_AVAILABLE, FAILED_STATUS,
    MESSAGE_NON_EXISTENT_ZONE, MESSAGE_RRSET_DUPLICATED, MESSAGE_RRSET_SYNC_SUCCEEDED,
    MESSAGE_UNAVAILABLE_ZONE, PENDING_STATUS, REASON_DUPLICATED, REASON_RRSET_SYNCED,
    REASON_SYNCHRONIZATION_FAILED, REASON_ZONE_NOT_AVAILABLE, SUCCEEDED_STATUS,
};

/// Reconcile one `RRset` or `ClusterRRset`.
///
/// # Errors
///
/// Returns an error only where no meaningful status can be written
/// (parent lookup failure, finalizer patches, backend deletion during
/// cleanup); everything else is surfaced through `status.syncStatus`.
pub async fn reconcile_rrset<R: GenericRRset>(rrset: Arc<R>, ctx: Arc<Context>) -> Result<Action> {
    let name = rrset.name_any();
    let namespace = rrset.metrics_namespace();
    let fqdn = rrset_fqdn(rrset.short_name(), &rrset.zone_ref().name);
    let rtype = rrset.rtype().to_string();
    let api = rrset.api(ctx.client.clone());

    info!(kind = %R::KIND, rrset = %name, fqdn = %fqdn, "Reconcile record set");

    let is_modified = matches!(
        (
            rrset.status().and_then(|s| s.observed_generation),
            rrset.meta().generation,
        ),
        (Some(observed), Some(generation)) if observed != generation
    );
    let is_deleted = rrset.meta().deletion_timestamp.is_some();

    // The metrics finalizer goes on before anything can fail so that
    // failure metrics clean up correctly even for invalid specs.
    if !is_deleted {
        ensure_finalizer(&api, rrset.as_ref(), METRICS_FINALIZER_NAME).await?;
    }

    // Force a fresh LastTransitionTime on the rewrite after a spec change.
    let mut conditions = rrset
        .status()
        .map(|s| s.conditions.clone())
        .unwrap_or_default();
    if !is_deleted && is_modified {
        remove_condition(&mut conditions, CONDITION_TYPE_AVAILABLE);
        let patch = json!({ "status": { "conditions": conditions } });
        api.patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
    }

    // Parent resolution; the zoneRef kind decides which API is queried.
    let zone_ref = rrset.zone_ref();
    let parent = match zone_ref.kind {
        ZoneRefKind::Zone => {
            let zones: Api<Zone> =
                Api::namespaced(ctx.client.clone(), &rrset.namespace().unwrap_or_default());
            zones.get_opt(&zone_ref.name).await?.map(ParentZone::Namespaced)
        }
        ZoneRefKind::ClusterZone => {
            let zones: Api<ClusterZone> = Api::all(ctx.client.clone());
            zones.get_opt(&zone_ref.name).await?.map(ParentZone::Cluster)
        }
    };

    let Some(parent) = parent else {
        return handle_missing_parent(
            &api, rrset.as_ref(), &ctx, &name, &namespace, &fqdn, &rtype, conditions, is_deleted,
        )
        .await;
    };

    // A parent in Failed state gates retries on the record set's own last
    // transition, not the zone's: the zone status may be stale and must
    // not wedge the child. Deletions skip this entirely and go straight
    // to backend cleanup below.
    if parent.sync_status() == Some(FAILED_STATUS) && !is_deleted {
        if transitioned_within(
            &conditions,
            CONDITION_TYPE_AVAILABLE,
            FAILED_RETRY_COOLDOWN_SECS,
        ) && !is_modified
        {
            let current = rrset.sync_status().unwrap_or(PENDING_STATUS).to_string();
            metrics::update_rrset_metrics(&fqdn, &rtype, &current, &name, &namespace);
            return Ok(Action::requeue(Duration::from_secs(
                ERROR_REQUEUE_DURATION_SECS,
            )));
        }

        let message = format!("{MESSAGE_UNAVAILABLE_ZONE}{}", parent.name());
        set_condition(
            &mut conditions,
            new_condition(
                CONDITION_TYPE_AVAILABLE,
                CONDITION_STATUS_FALSE,
                REASON_ZONE_NOT_AVAILABLE,
                &message,
                rrset.meta().generation,
            ),
        );
        patch_rrset_status(
            &api,
            &name,
            &RRsetStatus {
                sync_status: Some(FAILED_STATUS.to_string()),
                dns_entry_name: Some(fqdn.clone()),
                last_update_time: rrset.status().and_then(|s| s.last_update_time.clone()),
                conditions: conditions.clone(),
                observed_generation: rrset.meta().generation,
            },
        )
        .await?;
        metrics::update_rrset_metrics(&fqdn, &rtype, FAILED_STATUS, &name, &namespace);
        // Continue: the parent may have recovered backend-side even though
        // its status has not been rewritten yet.
    }

    let pdns = match get_pdns_client(&ctx, parent.provider_ref()).await {
        Ok(client) => client,
        Err(e) if is_deleted => return Err(e),
        Err(e) => {
            warn!(rrset = %name, error = %e, "Failed to get PowerDNS client");
            return finish(
                &api,
                rrset.as_ref(),
                &name,
                &namespace,
                &fqdn,
                &rtype,
                conditions,
                false,
                FAILED_STATUS,
                REASON_SYNCHRONIZATION_FAILED,
                &e.to_string(),
            )
            .await;
        }
    };

    if is_deleted {
        if has_finalizer(rrset.as_ref(), RESOURCES_FINALIZER_NAME) {
            match pdns.records().delete(&parent.name(), &fqdn, &rtype).await {
                Ok(()) => info!(rrset = %name, fqdn = %fqdn, "Deleted record set from PowerDNS"),
                Err(e) => {
                    warn!(rrset = %name, error = %e, "Failed to delete record set");
                    return Err(e.into());
                }
            }
            remove_finalizer(&api, rrset.as_ref(), RESOURCES_FINALIZER_NAME).await?;
        }
        if has_finalizer(rrset.as_ref(), METRICS_FINALIZER_NAME) {
            metrics::remove_rrset_metrics(&fqdn, &rtype, &name, &namespace);
            remove_finalizer(&api, rrset.as_ref(), METRICS_FINALIZER_NAME).await?;
        }
        return Ok(Action::await_change());
    }

    ensure_finalizer(&api, rrset.as_ref(), RESOURCES_FINALIZER_NAME).await?;

    // Uniqueness: at most one RRset or ClusterRRset per (FQDN, type).
    let entries = ctx.stores.rrset_entries(&format!("{fqdn}/{rtype}"));
    if duplicate_exists(
        &entries,
        &rrset.uid().unwrap_or_default(),
        rrset.creation_timestamp().as_ref(),
        rrset.sync_status(),
    ) {
        warn!(kind = %R::KIND, rrset = %name, fqdn = %fqdn, "Duplicated record set");
        // The backend is never touched; the periodic retry only re-checks
        // the index so the loser converges once the winner is deleted.
        return finish(
            &api,
            rrset.as_ref(),
            &name,
            &namespace,
            &fqdn,
            &rtype,
            conditions,
            false,
            FAILED_STATUS,
            REASON_DUPLICATED,
            MESSAGE_RRSET_DUPLICATED,
        )
        .await;
    }

    // Converge the backend record set.
    let mut sync_status = SUCCEEDED_STATUS;
    let mut reason = REASON_RRSET_SYNCED;
    let mut message = MESSAGE_RRSET_SYNC_SUCCEEDED.to_string();
    let mut changed = false;

    match pdns.records().get(&parent.name(), &fqdn, &rtype).await {
        Ok(rrsets) => {
            let backend_rrset = filter_rrset(rrsets, &fqdn, &rtype);
            let identical = backend_rrset
                .as_ref()
                .is_some_and(|backend| rrset_matches(rrset.as_ref(), backend));

            if identical {
                debug!(rrset = %name, fqdn = %fqdn, "Record set already in sync");
            } else {
                let comments = rrset
                    .comment()
                    .map(|content| {
                        vec![Comment {
                            content: content.to_string(),
                            account: Some(RRSET_COMMENT_ACCOUNT.to_string()),
                            modified_at: None,
                        }]
                    })
                    .unwrap_or_default();
                match pdns
                    .records()
                    .change(
                        &parent.name(),
                        &fqdn,
                        &rtype,
                        rrset.ttl(),
                        rrset.records(),
                        comments,
                    )
                    .await
                {
                    Ok(()) => changed = true,
                    Err(e) => {
                        warn!(rrset = %name, error = %e, "Failed to update record set");
                        sync_status = FAILED_STATUS;
                        reason = REASON_SYNCHRONIZATION_FAILED;
                        message = e.to_string();
                    }
                }
            }
        }
        Err(e) => {
            warn!(rrset = %name, error = %e, "Failed to get record set from PowerDNS");
            sync_status = FAILED_STATUS;
            reason = REASON_SYNCHRONIZATION_FAILED;
            message = e.to_string();
        }
    }

    // Owner reference from the parent zone, so zone deletion cascades.
    if let Some(action) = set_owner_reference(&api, rrset.as_ref(), &parent, &name).await? {
        return Ok(action);
    }

    finish(
        &api,
        rrset.as_ref(),
        &name,
        &namespace,
        &fqdn,
        &rtype,
        conditions,
        changed,
        sync_status,
        reason,
        &message,
    )
    .await
}

/// Parent zone not found in Kubernetes.
///
/// There is nothing left to converge against, so the resource finalizer is
/// released after a best-effort backend cleanup through the legacy client
/// (the parent's provider reference is gone with the parent). The record
/// set goes Pending and requeues shortly, closing the zone-then-rrset
/// creation race.
#[allow(clippy::too_many_arguments)]
async fn handle_missing_parent<R: GenericRRset>(
    api: &Api<R>,
    rrset: &R,
    ctx: &Context,
    name: &str,
    namespace: &str,
    fqdn: &str,
    rtype: &str,
    mut conditions: Vec<Condition>,
    is_deleted: bool,
) -> Result<Action> {
    if has_finalizer(rrset, RESOURCES_FINALIZER_NAME) {
        if let Some(legacy) = &ctx.legacy_client {
            // Best effort: the records may or may not have been dropped by
            // the zone deletion cascade already.
            if let Err(e) = legacy
                .records()
                .delete(&rrset.zone_ref().name, fqdn, rtype)
                .await
            {
                warn!(rrset = %name, error = %e, "Best-effort record cleanup failed, records may leak");
            }
        }
        remove_finalizer(api, rrset, RESOURCES_FINALIZER_NAME).await?;
    }

    if is_deleted {
        if has_finalizer(rrset, METRICS_FINALIZER_NAME) {
            metrics::remove_rrset_metrics(fqdn, rtype, name, namespace);
            remove_finalizer(api, rrset, METRICS_FINALIZER_NAME).await?;
        }
        return Ok(Action::await_change());
    }

    let message = format!("{MESSAGE_NON_EXISTENT_ZONE}{}", rrset.zone_ref().name);
    set_condition(
        &mut conditions,
        new_condition(
            CONDITION_TYPE_AVAILABLE,
            CONDITION_STATUS_FALSE,
            REASON_ZONE_NOT_AVAILABLE,
            &message,
            rrset.meta().generation,
        ),
    );
    patch_rrset_status(
        api,
        name,
        &RRsetStatus {
            sync_status: Some(PENDING_STATUS.to_string()),
            dns_entry_name: Some(fqdn.to_string()),
            last_update_time: rrset.status().and_then(|s| s.last_update_time.clone()),
            conditions,
            observed_generation: rrset.meta().generation,
        },
    )
    .await?;
    metrics::update_rrset_metrics(fqdn, rtype, PENDING_STATUS, name, namespace);

    Ok(Action::requeue(Duration::from_secs(
        ZONE_NOT_AVAILABLE_REQUEUE_SECS,
    )))
}

/// Make the parent zone the controller owner of this record set.
///
/// Returns an immediate requeue action on a metadata conflict instead of
/// an error, so controller-runtime re-reads and retries quietly.
async fn set_owner_reference<R: GenericRRset>(
    api: &Api<R>,
    rrset: &R,
    parent: &ParentZone,
    name: &str,
) -> Result<Option<Action>> {
    let Some(owner) = parent.owner_reference() else {
        return Ok(None);
    };

    let already_owned = rrset
        .meta()
        .owner_references
        .as_ref()
        .is_some_and(|refs| refs.iter().any(|r| r.uid == owner.uid));
    if already_owned {
        return Ok(None);
    }

    let patch = json!({ "metadata": { "ownerReferences": [owner] } });
    match api
        .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
    {
        Ok(_) => Ok(None),
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            info!(rrset = %name, "Owner reference conflict, forcing a new reconciliation");
            Ok(Some(Action::requeue(Duration::from_secs(
                CONFLICT_REQUEUE_SECS,
            ))))
        }
        Err(e) => Err(e.into()),
    }
}

async fn patch_rrset_status<R: GenericRRset>(
    api: &Api<R>,
    name: &str,
    status: &RRsetStatus,
) -> Result<()> {
    let patch = json!({ "status": status });
    api.patch_status(name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;
    Ok(())
}

/// Write the final status, publish the gauge and pick the follow-up
/// action.
///
/// `lastUpdateTime` is bumped only when the backend was actually written
/// (`changed`), preventing spurious status rewrites from re-triggering
/// the parent zone's reconcile through its watch.
#[allow(clippy::too_many_arguments)]
async fn finish<R: GenericRRset>(
    api: &Api<R>,
    rrset: &R,
    name: &str,
    namespace: &str,
    fqdn: &str,
    rtype: &str,
    mut conditions: Vec<Condition>,
    changed: bool,
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
            rrset.meta().generation,
        ),
    );

    let previous_update = rrset.status().and_then(|s| s.last_update_time.clone());
    let last_update_time = if changed || previous_update.is_none() {
        Some(chrono::Utc::now().to_rfc3339())
    } else {
        previous_update
    };

    let status = RRsetStatus {
        last_update_time,
        dns_entry_name: Some(fqdn.to_string()),
        sync_status: Some(sync_status.to_string()),
        conditions,
        observed_generation: rrset.meta().generation,
    };

    let patch = json!({ "status": status });
    match api
        .patch_status(name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
    {
        Ok(_) => {}
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            info!(rrset = %name, "Record set has been modified, forcing a new reconciliation");
            return Ok(Action::requeue(Duration::from_secs(CONFLICT_REQUEUE_SECS)));
        }
        Err(e) => return Err(e.into()),
    }

    metrics::update_rrset_metrics(fqdn, rtype, sync_status, name, namespace);

    if sync_status == SUCCEEDED_STATUS {
        Ok(Action::await_change())
    } else {
        Ok(Action::requeue(Duration::from_secs(
            ERROR_REQUEUE_DURATION_SECS,
        )))
    }
}
