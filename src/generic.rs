// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Polymorphism over the namespaced and cluster-scoped resource twins.
//!
//! Zones and record sets each exist in two scopes that differ only in where
//! they live, not in what they mean. The [`GenericZone`] and
//! [`GenericRRset`] traits expose one capability set (spec field access,
//! status access, a correctly-scoped [`Api`]) implemented by both twins, so
//! the reconcile logic is written exactly once.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::{Api, Client, Resource, ResourceExt};
use serde::{de::DeserializeOwned, Serialize};

use crate::crd::{
    ClusterRRset, ClusterZone, RRset, RRsetStatus, SoaEditApi, Zone, ZoneKind, ZoneRef, ZoneStatus,
};

/// Capability set shared by [`Zone`] and [`ClusterZone`].
pub trait GenericZone:
    Resource<DynamicType = ()>
    + ResourceExt
    + Clone
    + std::fmt::Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Kubernetes kind of the concrete type.
    const KIND: &'static str;

    /// An [`Api`] scoped to this resource instance (namespaced for `Zone`,
    /// cluster-wide for `ClusterZone`).
    fn api(&self, client: Client) -> Api<Self>
    where
        Self: Sized;

    /// A cluster-wide [`Api`] for watching all instances of the kind.
    fn all_api(client: Client) -> Api<Self>
    where
        Self: Sized;

    fn zone_kind(&self) -> ZoneKind;

    fn nameservers(&self) -> &[String];

    fn catalog(&self) -> Option<&str>;

    /// Declared SOA-EDIT-API policy, defaulting to DEFAULT.
    fn soa_edit_api(&self) -> SoaEditApi;

    fn provider_ref(&self) -> Option<&str>;

    fn status(&self) -> Option<&ZoneStatus>;

    /// Current sync state, if any.
    fn sync_status(&self) -> Option<&str> {
        self.status().and_then(|s| s.sync_status.as_deref())
    }

    /// Namespace label value used on metrics; empty for cluster scope.
    fn metrics_namespace(&self) -> String {
        self.namespace().unwrap_or_default()
    }
}

impl GenericZone for Zone {
    const KIND: &'static str = crate::constants::KIND_ZONE;

    fn api(&self, client: Client) -> Api<Self> {
        Api::namespaced(client, &self.namespace().unwrap_or_default())
    }

    fn all_api(client: Client) -> Api<Self> {
        Api::all(client)
    }

    fn zone_kind(&self) -> ZoneKind {
        self.spec.kind
    }

    fn nameservers(&self) -> &[String] {
        &self.spec.nameservers
    }

    fn catalog(&self) -> Option<&str> {
        self.spec.catalog.as_deref()
    }

    fn soa_edit_api(&self) -> SoaEditApi {
        self.spec.soa_edit_api.unwrap_or_default()
    }

    fn provider_ref(&self) -> Option<&str> {
        self.spec.provider_ref.as_deref()
    }

    fn status(&self) -> Option<&ZoneStatus> {
        self.status.as_ref()
    }
}

impl GenericZone for ClusterZone {
    const KIND: &'static str = crate::constants::KIND_CLUSTER_ZONE;

    fn api(&self, client: Client) -> Api<Self> {
        Api::all(client)
    }

    fn all_api(client: Client) -> Api<Self> {
        Api::all(client)
    }

    fn zone_kind(&self) -> ZoneKind {
        self.spec.kind
    }

    fn nameservers(&self) -> &[String] {
        &self.spec.nameservers
    }

    fn catalog(&self) -> Option<&str> {
        self.spec.catalog.as_deref()
    }

    fn soa_edit_api(&self) -> SoaEditApi {
        self.spec.soa_edit_api.unwrap_or_default()
    }

    fn provider_ref(&self) -> Option<&str> {
        self.spec.provider_ref.as_deref()
    }

    fn status(&self) -> Option<&ZoneStatus> {
        self.status.as_ref()
    }
}

/// Capability set shared by [`RRset`] and [`ClusterRRset`].
pub trait GenericRRset:
    Resource<DynamicType = ()>
    + ResourceExt
    + Clone
    + std::fmt::Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Kubernetes kind of the concrete type.
    const KIND: &'static str;

    /// An [`Api`] scoped to this resource instance.
    fn api(&self, client: Client) -> Api<Self>
    where
        Self: Sized;

    /// A cluster-wide [`Api`] for watching all instances of the kind.
    fn all_api(client: Client) -> Api<Self>
    where
        Self: Sized;

    /// Record type (A, AAAA, CNAME, ...).
    fn rtype(&self) -> &str;

    /// Declared short name (empty, relative or canonical).
    fn short_name(&self) -> &str;

    fn ttl(&self) -> u32;

    fn records(&self) -> &[String];

    fn comment(&self) -> Option<&str>;

    fn zone_ref(&self) -> &ZoneRef;

    fn status(&self) -> Option<&RRsetStatus>;

    /// Current sync state, if any.
    fn sync_status(&self) -> Option<&str> {
        self.status().and_then(|s| s.sync_status.as_deref())
    }

    /// Namespace label value used on metrics; empty for cluster scope.
    fn metrics_namespace(&self) -> String {
        self.namespace().unwrap_or_default()
    }
}

impl GenericRRset for RRset {
    const KIND: &'static str = crate::constants::KIND_RRSET;

    fn api(&self, client: Client) -> Api<Self> {
        Api::namespaced(client, &self.namespace().unwrap_or_default())
    }

    fn all_api(client: Client) -> Api<Self> {
        Api::all(client)
    }

    fn rtype(&self) -> &str {
        &self.spec.r#type
    }

    fn short_name(&self) -> &str {
        &self.spec.name
    }

    fn ttl(&self) -> u32 {
        self.spec.ttl
    }

    fn records(&self) -> &[String] {
        &self.spec.records
    }

    fn comment(&self) -> Option<&str> {
        self.spec.comment.as_deref()
    }

    fn zone_ref(&self) -> &ZoneRef {
        &self.spec.zone_ref
    }

    fn status(&self) -> Option<&RRsetStatus> {
        self.status.as_ref()
    }
}

impl GenericRRset for ClusterRRset {
    const KIND: &'static str = crate::constants::KIND_CLUSTER_RRSET;

    fn api(&self, client: Client) -> Api<Self> {
        Api::all(client)
    }

    fn all_api(client: Client) -> Api<Self> {
        Api::all(client)
    }

    fn rtype(&self) -> &str {
        &self.spec.r#type
    }

    fn short_name(&self) -> &str {
        &self.spec.name
    }

    fn ttl(&self) -> u32 {
        self.spec.ttl
    }

    fn records(&self) -> &[String] {
        &self.spec.records
    }

    fn comment(&self) -> Option<&str> {
        self.spec.comment.as_deref()
    }

    fn zone_ref(&self) -> &ZoneRef {
        &self.spec.zone_ref
    }

    fn status(&self) -> Option<&RRsetStatus> {
        self.status.as_ref()
    }
}

/// A record set's resolved parent, independent of scope.
///
/// Exposes only what the record reconciler needs from either twin: the zone
/// name, its sync state, the provider reference and a controller owner
/// reference for the cascade on zone deletion.
#[derive(Clone, Debug)]
pub enum ParentZone {
    Namespaced(Zone),
    Cluster(ClusterZone),
}

impl ParentZone {
    /// Resource name of the parent (the zone FQDN).
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            ParentZone::Namespaced(z) => z.name_any(),
            ParentZone::Cluster(z) => z.name_any(),
        }
    }

    /// Sync state of the parent, if any.
    #[must_use]
    pub fn sync_status(&self) -> Option<&str> {
        match self {
            ParentZone::Namespaced(z) => z.sync_status(),
            ParentZone::Cluster(z) => z.sync_status(),
        }
    }

    /// Provider reference declared on the parent.
    #[must_use]
    pub fn provider_ref(&self) -> Option<&str> {
        match self {
            ParentZone::Namespaced(z) => z.provider_ref(),
            ParentZone::Cluster(z) => z.provider_ref(),
        }
    }

    /// Controller owner reference pointing at the parent, so the API server
    /// cascades record deletion when the zone goes away.
    #[must_use]
    pub fn owner_reference(&self) -> Option<OwnerReference> {
        match self {
            ParentZone::Namespaced(z) => z.controller_owner_ref(&()),
            ParentZone::Cluster(z) => z.controller_owner_ref(&()),
        }
    }
}
