// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared controller context and FQDN indexing stores.
//!
//! All controllers receive an `Arc<Context>` carrying the Kubernetes
//! client, the optional process-wide legacy PowerDNS client and reflector
//! stores for the four DNS kinds.
//!
//! The stores double as the cross-scope uniqueness indexer: a resource is
//! indexed under its entry name (`<fqdn>` for zones, `<fqdn>/<type>` for
//! record sets) only while its sync status is absent or Succeeded. Failed
//! resources drop out of the index so that deleting a duplicate lets its
//! peer converge. The indices are eventually consistent with the API
//! server; duplicate detection tolerates stale reads because backend
//! convergence is idempotent.

use futures::StreamExt;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::runtime::reflector::{self, Store};
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::constants::{KIND_CLUSTER_RRSET, KIND_CLUSTER_ZONE, KIND_RRSET, KIND_ZONE};
use crate::crd::{ClusterRRset, ClusterZone, RRset, Zone};
use crate::generic::{GenericRRset, GenericZone};
use crate::pdns::PdnsClient;
use crate::reconcilers::helpers::rrset_fqdn;
use crate::status_reasons::SUCCEEDED_STATUS;

/// Shared context passed to all controllers.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client for API operations.
    pub client: kube::Client,

    /// Reflector stores backing the uniqueness indexer.
    pub stores: Stores,

    /// Process-wide legacy PowerDNS client from the environment, if
    /// configured. Used when a zone carries no `providerRef`.
    pub legacy_client: Option<PdnsClient>,
}

/// One indexed resource, as much of it as duplicate detection needs.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexEntry {
    /// Kubernetes kind of the indexed resource.
    pub kind: &'static str,

    /// Object UID, used to exclude the resource being reconciled.
    pub uid: String,

    /// Resource name.
    pub name: String,

    /// Namespace; `None` for cluster-scoped resources.
    pub namespace: Option<String>,

    /// Creation timestamp, the tie-breaker between two pending claimants.
    pub creation_timestamp: Option<Time>,

    /// Sync status at indexing time (absent or Succeeded by construction).
    pub sync_status: Option<String>,
}

fn indexed(sync_status: Option<&str>) -> bool {
    sync_status.is_none_or(|s| s == SUCCEEDED_STATUS)
}

/// Reflector stores for the four DNS kinds.
#[derive(Clone)]
pub struct Stores {
    pub zones: Store<Zone>,
    pub cluster_zones: Store<ClusterZone>,
    pub rrsets: Store<RRset>,
    pub cluster_rrsets: Store<ClusterRRset>,
}

impl Stores {
    /// All indexed zones and cluster zones claiming `fqdn`.
    ///
    /// Failed resources are excluded; see the module docs.
    #[must_use]
    pub fn zone_entries(&self, fqdn: &str) -> Vec<IndexEntry> {
        let mut entries = Vec::new();

        for zone in self.zones.state() {
            if zone.name_any() == fqdn && indexed(zone.sync_status()) {
                entries.push(entry_for(&*zone, KIND_ZONE, zone.sync_status()));
            }
        }
        for zone in self.cluster_zones.state() {
            if zone.name_any() == fqdn && indexed(zone.sync_status()) {
                entries.push(entry_for(&*zone, KIND_CLUSTER_ZONE, zone.sync_status()));
            }
        }

        entries
    }

    /// All indexed record sets claiming the entry name `<fqdn>/<type>`.
    #[must_use]
    pub fn rrset_entries(&self, entry_name: &str) -> Vec<IndexEntry> {
        let mut entries = Vec::new();

        for rrset in self.rrsets.state() {
            if rrset_entry_name(&*rrset) == entry_name && indexed(rrset.sync_status()) {
                entries.push(entry_for(&*rrset, KIND_RRSET, rrset.sync_status()));
            }
        }
        for rrset in self.cluster_rrsets.state() {
            if rrset_entry_name(&*rrset) == entry_name && indexed(rrset.sync_status()) {
                entries.push(entry_for(&*rrset, KIND_CLUSTER_RRSET, rrset.sync_status()));
            }
        }

        entries
    }
}

/// Entry name of a record set: `<canonical fqdn>/<type>`.
#[must_use]
pub fn rrset_entry_name<R: GenericRRset>(rrset: &R) -> String {
    format!(
        "{}/{}",
        rrset_fqdn(rrset.short_name(), &rrset.zone_ref().name),
        rrset.rtype()
    )
}

fn entry_for<K: Resource<DynamicType = ()> + ResourceExt>(
    resource: &K,
    kind: &'static str,
    sync_status: Option<&str>,
) -> IndexEntry {
    IndexEntry {
        kind,
        uid: resource.uid().unwrap_or_default(),
        name: resource.name_any(),
        namespace: resource.namespace(),
        creation_timestamp: resource.creation_timestamp(),
        sync_status: sync_status.map(String::from),
    }
}

/// Spawn a reflector feeding one store.
///
/// The watcher uses the default configuration on purpose: index membership
/// depends on status (sync state), so status-only updates must reach the
/// store.
pub fn spawn_reflector<K>(
    api: Api<K>,
    writer: reflector::store::Writer<K>,
) -> tokio::task::JoinHandle<()>
where
    K: Resource<DynamicType = ()>
        + Clone
        + DeserializeOwned
        + std::fmt::Debug
        + Send
        + Sync
        + 'static,
{
    tokio::spawn(async move {
        let stream = reflector::reflector(writer, watcher(api, watcher::Config::default()))
            .default_backoff()
            .applied_objects();
        let mut stream = std::pin::pin!(stream);
        while let Some(event) = stream.next().await {
            if let Err(e) = event {
                warn!(error = %e, "Reflector stream error, watch will restart");
            }
        }
    })
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
