// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the PowerDNS operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all operator CRDs
pub const API_GROUP: &str = "dns.cav.enablers.ob";

/// Kind name for the `Zone` resource
pub const KIND_ZONE: &str = "Zone";

/// Kind name for the `ClusterZone` resource
pub const KIND_CLUSTER_ZONE: &str = "ClusterZone";

/// Kind name for the `RRset` resource
pub const KIND_RRSET: &str = "RRset";

/// Kind name for the `ClusterRRset` resource
pub const KIND_CLUSTER_RRSET: &str = "ClusterRRset";

/// Kind name for the `PDNSProvider` resource
pub const KIND_PDNS_PROVIDER: &str = "PDNSProvider";

// ============================================================================
// Finalizers
// ============================================================================

/// Finalizer guarding backend-side cleanup (zone/record deletion in PowerDNS)
pub const RESOURCES_FINALIZER_NAME: &str = "dns.cav.enablers.ob/finalizer";

/// Finalizer guarding in-process metric removal
pub const METRICS_FINALIZER_NAME: &str = "dns.cav.enablers.ob/metrics-finalizer";

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// TTL applied to NS records when the zone has no existing NS RRset to inherit from
pub const DEFAULT_TTL_FOR_NS_RECORDS: u32 = 1500;

/// Comment account attributed to operator-managed record sets
pub const RRSET_COMMENT_ACCOUNT: &str = "powerdns-operator";

// ============================================================================
// Provider Defaults
// ============================================================================

/// Default PowerDNS API vhost/server id
pub const DEFAULT_API_VHOST: &str = "localhost";

/// Default PowerDNS API request timeout (seconds)
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 10;

/// Default provider connection re-check interval (5 minutes)
pub const DEFAULT_PROVIDER_INTERVAL_SECS: u64 = 300;

/// Default key inside the credentials secret holding the API key
pub const DEFAULT_CREDENTIALS_SECRET_KEY: &str = "apiKey";

/// Default kind of the CA bundle reference
pub const DEFAULT_CA_BUNDLE_KIND: &str = "ConfigMap";

/// Default key inside the CA bundle ConfigMap/Secret
pub const DEFAULT_CA_BUNDLE_KEY: &str = "ca.crt";

/// `lastConnectionTime` is rewritten only on a state transition or after
/// this many seconds, to limit status write amplification
pub const LAST_CONNECTION_REFRESH_SECS: i64 = 240;

// ============================================================================
// Controller Timing Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Cooldown before a Failed resource is retried against the backend
pub const FAILED_RETRY_COOLDOWN_SECS: i64 = 30;

/// Requeue delay while a record set waits for its parent zone to appear.
/// Closes the create-zone-and-rrset-together race.
pub const ZONE_NOT_AVAILABLE_REQUEUE_SECS: u64 = 2;

/// Requeue delay after a status patch conflict (409); controller-runtime
/// re-reads the object and retries
pub const CONFLICT_REQUEUE_SECS: u64 = 1;

/// Requeue delay after a provider connection failure
pub const PROVIDER_FAILURE_REQUEUE_SECS: u64 = 30;

// ============================================================================
// Leader Election Constants
// ============================================================================

/// Default leader election lease duration (15 seconds)
pub const DEFAULT_LEASE_DURATION_SECS: u64 = 15;

/// Default leader election retry period (2 seconds)
pub const DEFAULT_LEASE_RETRY_PERIOD_SECS: u64 = 2;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for the Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for the Prometheus metrics and health HTTP server
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for the Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for the metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
