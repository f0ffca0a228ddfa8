// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for PowerDNS management.
//!
//! This module defines all Kubernetes Custom Resource Definitions used by the
//! operator to manage PowerDNS Authoritative zones and record sets declaratively.
//!
//! # Resource Types
//!
//! ## Backend access
//!
//! - [`PDNSProvider`] - Describes how to reach a PowerDNS API endpoint
//!   (URL, credentials, TLS, proxy), cluster-scoped
//!
//! ## DNS Zones
//!
//! - [`Zone`] - A namespaced authoritative zone; the resource name is the FQDN
//! - [`ClusterZone`] - The cluster-scoped twin of [`Zone`]
//!
//! ## DNS Record Sets
//!
//! - [`RRset`] - A namespaced record set (name, type, TTL, records, comment)
//! - [`ClusterRRset`] - The cluster-scoped twin of [`RRset`]
//!
//! # Example: Creating a Zone with a record set
//!
//! ```yaml
//! apiVersion: dns.cav.enablers.ob/v1alpha2
//! kind: Zone
//! metadata:
//!   name: example.com
//!   namespace: default
//! spec:
//!   kind: Native
//!   nameservers:
//!     - ns1.example.com
//!     - ns2.example.com
//!   providerRef: production-pdns
//! ---
//! apiVersion: dns.cav.enablers.ob/v1alpha2
//! kind: RRset
//! metadata:
//!   name: web-example-com
//!   namespace: default
//! spec:
//!   type: A
//!   name: web
//!   ttl: 300
//!   records:
//!     - 1.1.1.1
//!     - 1.1.1.2
//!   zoneRef:
//!     name: example.com
//!     kind: Zone
//! ```
//!
//! Default values (vhost, timeout, interval, secret keys) live in accessor
//! helpers on the resource types, never in spec defaults at write time.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_API_VHOST, DEFAULT_CA_BUNDLE_KEY, DEFAULT_CA_BUNDLE_KIND,
    DEFAULT_CREDENTIALS_SECRET_KEY, DEFAULT_PROVIDER_INTERVAL_SECS,
};
use crate::status_reasons::CONNECTED_STATUS;

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the state of
/// a resource to users and controllers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition: `Available` for zones and record sets, `Ready` for providers.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,

    /// The generation of the spec this condition was computed from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

// ============================================================================
// Zones
// ============================================================================

/// PowerDNS zone kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ZoneKind {
    /// Replication handled outside of DNS (database-level).
    Native,
    /// Primary zone, sends NOTIFY to secondaries.
    Master,
    /// Secondary zone, transfers from masters.
    Slave,
    /// Catalog producer zone.
    Producer,
    /// Catalog consumer zone.
    Consumer,
}

impl ZoneKind {
    /// Backend string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Native => "Native",
            ZoneKind::Master => "Master",
            ZoneKind::Slave => "Slave",
            ZoneKind::Producer => "Producer",
            ZoneKind::Consumer => "Consumer",
        }
    }
}

/// Policy controlling how the SOA serial is bumped by API-driven changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SoaEditApi {
    /// Let the server apply its configured default policy.
    #[default]
    Default,
    /// Increase the serial by one on every change.
    Increase,
    /// Set the serial to the UNIX epoch timestamp of the change.
    Epoch,
}

impl SoaEditApi {
    /// Backend string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SoaEditApi::Default => "DEFAULT",
            SoaEditApi::Increase => "INCREASE",
            SoaEditApi::Epoch => "EPOCH",
        }
    }
}

/// Status shared by [`Zone`] and [`ClusterZone`], reflecting what the
/// backend reported after the last reconcile.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStatus {
    /// Opaque backend id of the zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Canonical zone name as stored by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Zone kind reported by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Current SOA serial.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<u32>,

    /// Serial last notified to secondaries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notified_serial: Option<u32>,

    /// Serial as edited through the API, before SOA-EDIT-API processing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_serial: Option<u32>,

    /// Masters this zone transfers from (Slave/Consumer kinds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masters: Option<Vec<String>>,

    /// Whether DNSSEC is enabled backend-side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnssec: Option<bool>,

    /// Catalog zone this zone is a member of, as synthesized by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,

    /// Sync state: Succeeded, Failed or Pending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_status: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// `Zone` declares an authoritative DNS zone in PowerDNS.
///
/// The resource name IS the zone's fully-qualified domain name and is
/// immutable after creation. At most one `Zone` or [`ClusterZone`] with a
/// given FQDN may reach sync state Succeeded; later duplicates stay Failed
/// with reason `Duplicated` until the winner is deleted.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "dns.cav.enablers.ob",
    version = "v1alpha2",
    kind = "Zone",
    namespaced,
    doc = "Zone declares an authoritative DNS zone managed in PowerDNS. The resource name is the zone FQDN.",
    printcolumn = r#"{"name":"Serial","type":"integer","jsonPath":".status.serial"}"#,
    printcolumn = r#"{"name":"ID","type":"string","jsonPath":".status.id"}"#,
    printcolumn = r#"{"name":"Sync Status","type":"string","jsonPath":".status.syncStatus"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[kube(status = "ZoneStatus")]
#[serde(rename_all = "camelCase")]
pub struct ZoneSpec {
    /// Zone kind: Native, Master, Slave, Producer or Consumer.
    pub kind: ZoneKind,

    /// Nameservers of the zone. At least one, each a bare hostname
    /// (canonicalization to a trailing dot happens on the wire).
    #[schemars(length(min = 1), inner(regex(pattern = r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$")))]
    pub nameservers: Vec<String>,

    /// Catalog zone to register this zone in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,

    /// SOA-EDIT-API policy: DEFAULT, INCREASE or EPOCH. Defaults to DEFAULT.
    #[serde(
        rename = "soa_edit_api",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub soa_edit_api: Option<SoaEditApi>,

    /// Name of the [`PDNSProvider`] describing the backend this zone lives
    /// on. When absent, the process-wide legacy client is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_ref: Option<String>,
}

/// `ClusterZone` is the cluster-scoped twin of [`Zone`].
///
/// It shares the spec and status shape with `Zone` and participates in the
/// same FQDN uniqueness invariant.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "dns.cav.enablers.ob",
    version = "v1alpha2",
    kind = "ClusterZone",
    doc = "ClusterZone declares a cluster-scoped authoritative DNS zone managed in PowerDNS.",
    printcolumn = r#"{"name":"Serial","type":"integer","jsonPath":".status.serial"}"#,
    printcolumn = r#"{"name":"ID","type":"string","jsonPath":".status.id"}"#,
    printcolumn = r#"{"name":"Sync Status","type":"string","jsonPath":".status.syncStatus"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[kube(status = "ZoneStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterZoneSpec {
    /// Zone kind: Native, Master, Slave, Producer or Consumer.
    pub kind: ZoneKind,

    /// Nameservers of the zone. At least one, each a bare hostname.
    #[schemars(length(min = 1), inner(regex(pattern = r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$")))]
    pub nameservers: Vec<String>,

    /// Catalog zone to register this zone in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,

    /// SOA-EDIT-API policy: DEFAULT, INCREASE or EPOCH. Defaults to DEFAULT.
    #[serde(
        rename = "soa_edit_api",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub soa_edit_api: Option<SoaEditApi>,

    /// Name of the [`PDNSProvider`] describing the backend this zone lives on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_ref: Option<String>,
}

// ============================================================================
// Record Sets
// ============================================================================

/// Scope of a record set's parent zone reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ZoneRefKind {
    /// Parent is a namespaced [`Zone`] in the record set's namespace.
    Zone,
    /// Parent is a cluster-scoped [`ClusterZone`].
    ClusterZone,
}

/// Reference from a record set to its parent zone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRef {
    /// Name of the parent zone resource (the zone FQDN).
    pub name: String,

    /// Kind of the parent: Zone or ClusterZone.
    pub kind: ZoneRefKind,
}

/// Status shared by [`RRset`] and [`ClusterRRset`].
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RRsetStatus {
    /// Time of the last backend write for this record set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<String>,

    /// Computed fully-qualified DNS entry name (without trailing dot).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_entry_name: Option<String>,

    /// Sync state: Succeeded, Failed or Pending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_status: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// `RRset` declares a DNS record set inside a parent zone.
///
/// The short name may be empty (apex), relative (`web` becomes
/// `web.<zone>`), or canonical (ends with a dot, used as-is). At most one
/// `RRset` or [`ClusterRRset`] per (canonical FQDN, type) may reach sync
/// state Succeeded.
///
/// # Example
///
/// ```yaml
/// apiVersion: dns.cav.enablers.ob/v1alpha2
/// kind: RRset
/// metadata:
///   name: mail-example-com
///   namespace: default
/// spec:
///   type: MX
///   name: ""
///   ttl: 3600
///   records:
///     - "10 mail.example.com."
///   comment: mail routing
///   zoneRef:
///     name: example.com
///     kind: Zone
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "dns.cav.enablers.ob",
    version = "v1alpha2",
    kind = "RRset",
    namespaced,
    doc = "RRset declares a DNS record set (name, type, TTL, records) inside a parent Zone or ClusterZone.",
    printcolumn = r#"{"name":"Type","type":"string","jsonPath":".spec.type"}"#,
    printcolumn = r#"{"name":"DNS Name","type":"string","jsonPath":".status.dnsEntryName"}"#,
    printcolumn = r#"{"name":"TTL","type":"integer","jsonPath":".spec.ttl"}"#,
    printcolumn = r#"{"name":"Sync Status","type":"string","jsonPath":".status.syncStatus"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[kube(status = "RRsetStatus")]
#[serde(rename_all = "camelCase")]
pub struct RRsetSpec {
    /// Record type: A, AAAA, CNAME, MX, TXT, PTR, SRV, NS, ...
    #[schemars(regex(pattern = r"^[A-Z][A-Z0-9]*$"))]
    pub r#type: String,

    /// Short name of the record set. Empty for the zone apex, relative to
    /// the parent zone, or canonical when it ends with a dot.
    pub name: String,

    /// TTL in seconds applied to every record of the set.
    pub ttl: u32,

    /// Record values, order-insensitive.
    #[schemars(length(min = 1))]
    pub records: Vec<String>,

    /// Free-form comment stored alongside the record set in the backend,
    /// attributed to the operator account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Parent zone reference.
    pub zone_ref: ZoneRef,
}

/// `ClusterRRset` is the cluster-scoped twin of [`RRset`].
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "dns.cav.enablers.ob",
    version = "v1alpha2",
    kind = "ClusterRRset",
    doc = "ClusterRRset declares a cluster-scoped DNS record set inside a parent Zone or ClusterZone.",
    printcolumn = r#"{"name":"Type","type":"string","jsonPath":".spec.type"}"#,
    printcolumn = r#"{"name":"DNS Name","type":"string","jsonPath":".status.dnsEntryName"}"#,
    printcolumn = r#"{"name":"TTL","type":"integer","jsonPath":".spec.ttl"}"#,
    printcolumn = r#"{"name":"Sync Status","type":"string","jsonPath":".status.syncStatus"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[kube(status = "RRsetStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterRRsetSpec {
    /// Record type: A, AAAA, CNAME, MX, TXT, PTR, SRV, NS, ...
    #[schemars(regex(pattern = r"^[A-Z][A-Z0-9]*$"))]
    pub r#type: String,

    /// Short name of the record set. Empty for the zone apex, relative to
    /// the parent zone, or canonical when it ends with a dot.
    pub name: String,

    /// TTL in seconds applied to every record of the set.
    pub ttl: u32,

    /// Record values, order-insensitive.
    #[schemars(length(min = 1))]
    pub records: Vec<String>,

    /// Free-form comment stored alongside the record set in the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Parent zone reference.
    pub zone_ref: ZoneRef,
}

// ============================================================================
// PDNSProvider
// ============================================================================

/// Reference to a Secret holding the PowerDNS API key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSecretRef {
    /// Name of the Secret.
    pub name: String,

    /// Namespace of the Secret. Required because [`PDNSProvider`] is
    /// cluster-scoped and carries no namespace of its own.
    pub namespace: String,

    /// Key in the Secret containing the API key. Defaults to `apiKey`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Credentials configuration for the PowerDNS API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentials {
    /// Reference to the Secret containing the PowerDNS API key.
    pub secret_ref: ProviderSecretRef,
}

/// Reference to a CA bundle stored in a ConfigMap or Secret.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaBundleRef {
    /// Name of the ConfigMap or Secret.
    pub name: String,

    /// Namespace of the ConfigMap or Secret.
    pub namespace: String,

    /// Kind of the referenced object: ConfigMap or Secret. Defaults to ConfigMap.
    #[schemars(regex(pattern = r"^(ConfigMap|Secret)$"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Key holding the PEM bundle. Defaults to `ca.crt`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// TLS options for the PowerDNS API connection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderTlsConfig {
    /// Skip TLS certificate verification. Defaults to false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// CA bundle to trust when verifying the API server certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_bundle_ref: Option<CaBundleRef>,
}

/// Status of a [`PDNSProvider`] connection check.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PDNSProviderStatus {
    /// Connection state: Connected or Failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_status: Option<String>,

    /// Version string reported by the PowerDNS server.
    #[serde(rename = "powerDNSVersion", skip_serializing_if = "Option::is_none")]
    pub power_dns_version: Option<String>,

    /// Daemon type reported by the server; the provider is healthy only
    /// when this is `authoritative`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daemon_type: Option<String>,

    /// Server id reported by the backend.
    #[serde(rename = "serverID", skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,

    /// Last time a successful connection was established.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_connection_time: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// `PDNSProvider` describes how to reach a PowerDNS Authoritative API:
/// URL, vhost, credentials, TLS options and an optional proxy.
///
/// Zones and cluster zones select a provider by name through
/// `spec.providerRef`; their record sets inherit the parent's provider.
///
/// # Example
///
/// ```yaml
/// apiVersion: dns.cav.enablers.ob/v1alpha3
/// kind: PDNSProvider
/// metadata:
///   name: production-pdns
/// spec:
///   url: https://pdns.example.net:8081
///   vhost: localhost
///   timeout: 10
///   credentials:
///     secretRef:
///       name: pdns-api-key
///       namespace: dns-system
///   tls:
///     caBundleRef:
///       name: pdns-ca
///       namespace: dns-system
///       kind: ConfigMap
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "dns.cav.enablers.ob",
    version = "v1alpha3",
    kind = "PDNSProvider",
    doc = "PDNSProvider describes a PowerDNS Authoritative API endpoint, including credentials, TLS and proxy settings.",
    printcolumn = r#"{"name":"URL","type":"string","jsonPath":".spec.url"}"#,
    printcolumn = r#"{"name":"Connection Status","type":"string","jsonPath":".status.connectionStatus"}"#,
    printcolumn = r#"{"name":"PowerDNS Version","type":"string","jsonPath":".status.powerDNSVersion"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[kube(status = "PDNSProviderStatus")]
#[serde(rename_all = "camelCase")]
pub struct PDNSProviderSpec {
    /// URL of the PowerDNS API.
    #[schemars(regex(pattern = r"^https?://"))]
    pub url: String,

    /// Vhost/server id of the PowerDNS API. Defaults to `localhost`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vhost: Option<String>,

    /// Timeout for PowerDNS API requests, in seconds. Defaults to 10.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Reconciliation interval for the connection check, in seconds.
    /// Defaults to 300.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,

    /// HTTP/HTTPS proxy URL for reaching the PowerDNS API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// TLS options for the API connection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<ProviderTlsConfig>,

    /// Credentials for the API connection.
    pub credentials: ProviderCredentials,
}

impl PDNSProvider {
    /// Returns true when the last connection check succeeded against an
    /// authoritative server.
    #[must_use]
    pub fn is_connection_healthy(&self) -> bool {
        self.status.as_ref().is_some_and(|s| {
            s.connection_status.as_deref() == Some(CONNECTED_STATUS)
                && s.daemon_type.as_deref() == Some("authoritative")
        })
    }

    /// API vhost, defaulting to `localhost`.
    #[must_use]
    pub fn vhost(&self) -> &str {
        self.spec.vhost.as_deref().unwrap_or(DEFAULT_API_VHOST)
    }

    /// API request timeout, defaulting to 10 seconds.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.spec.timeout.unwrap_or(DEFAULT_API_TIMEOUT_SECS))
    }

    /// Connection re-check interval, defaulting to 5 minutes.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.spec.interval.unwrap_or(DEFAULT_PROVIDER_INTERVAL_SECS))
    }

    /// TLS insecure flag, defaulting to false.
    #[must_use]
    pub fn tls_insecure(&self) -> bool {
        self.spec
            .tls
            .as_ref()
            .and_then(|t| t.insecure)
            .unwrap_or(false)
    }

    /// Credentials secret key, defaulting to `apiKey`.
    #[must_use]
    pub fn credentials_secret_key(&self) -> &str {
        self.spec
            .credentials
            .secret_ref
            .key
            .as_deref()
            .unwrap_or(DEFAULT_CREDENTIALS_SECRET_KEY)
    }

    /// The CA bundle reference, if configured.
    #[must_use]
    pub fn ca_bundle_ref(&self) -> Option<&CaBundleRef> {
        self.spec.tls.as_ref().and_then(|t| t.ca_bundle_ref.as_ref())
    }
}

impl CaBundleRef {
    /// Referenced kind, defaulting to ConfigMap.
    #[must_use]
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_CA_BUNDLE_KIND)
    }

    /// Key inside the referenced object, defaulting to `ca.crt`.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or(DEFAULT_CA_BUNDLE_KEY)
    }
}
