// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard status condition reasons and sync states for operator resources.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a
//! condition has a particular status. Every reconciled resource eventually
//! carries a sync status in {Succeeded, Failed, Pending} and an `Available`
//! condition whose message names the triggering issue.

// ============================================================================
// Sync States
// ============================================================================

/// The backend agrees with the declared spec.
pub const SUCCEEDED_STATUS: &str = "Succeeded";

/// The last reconcile hit an error or a duplicate.
pub const FAILED_STATUS: &str = "Failed";

/// Not yet persisted to the backend (e.g. parent zone missing).
pub const PENDING_STATUS: &str = "Pending";

/// Provider connection state when the backend answered and is authoritative.
pub const CONNECTED_STATUS: &str = "Connected";

// ============================================================================
// Condition Types
// ============================================================================

/// Condition carried by zones and record sets.
pub const CONDITION_TYPE_AVAILABLE: &str = "Available";

/// Condition carried by providers.
pub const CONDITION_TYPE_READY: &str = "Ready";

/// Condition status literal for True.
pub const CONDITION_STATUS_TRUE: &str = "True";

/// Condition status literal for False.
pub const CONDITION_STATUS_FALSE: &str = "False";

// ============================================================================
// Zone Reasons
// ============================================================================

/// Zone converged against the backend.
pub const REASON_ZONE_SYNCED: &str = "ZoneSynced";

/// Message accompanying [`REASON_ZONE_SYNCED`].
pub const MESSAGE_ZONE_SYNC_SUCCEEDED: &str = "Zone synced with PowerDNS instance";

/// A zone-level backend operation (describe, create, zone patch) failed.
pub const REASON_SYNCHRONIZATION_FAILED: &str = "SynchronizationFailed";

/// The NS record set patch failed while the zone-level attributes converged.
pub const REASON_NS_SYNCHRONIZATION_FAILED: &str = "NSSynchronizationFailed";

/// Another resource already claims the same canonical FQDN.
pub const REASON_DUPLICATED: &str = "Duplicated";

/// Message accompanying a duplicated zone.
pub const MESSAGE_ZONE_DUPLICATED: &str = "Already existing Zone with the same FQDN";

// ============================================================================
// RRset Reasons
// ============================================================================

/// Record set converged against the backend.
pub const REASON_RRSET_SYNCED: &str = "RrsetSynced";

/// Message accompanying [`REASON_RRSET_SYNCED`].
pub const MESSAGE_RRSET_SYNC_SUCCEEDED: &str = "RRset synced with PowerDNS instance";

/// The parent zone is missing or unable to serve this record set.
pub const REASON_ZONE_NOT_AVAILABLE: &str = "ZoneNotAvailable";

/// Message prefix when the referenced zone does not exist in Kubernetes.
pub const MESSAGE_NON_EXISTENT_ZONE: &str = "non-existent zone: ";

/// Message prefix when the referenced zone exists but is in Failed state.
pub const MESSAGE_UNAVAILABLE_ZONE: &str = "unavailable zone: ";

/// Message accompanying a duplicated record set.
pub const MESSAGE_RRSET_DUPLICATED: &str = "Already existing RRset with the same FQDN";

// ============================================================================
// Provider Reasons
// ============================================================================

/// The PowerDNS API answered and reports an authoritative daemon.
pub const REASON_CONNECTED: &str = "Connected";

/// Message accompanying [`REASON_CONNECTED`].
pub const MESSAGE_CONNECTED: &str = "Successfully connected to PowerDNS API";

/// The PowerDNS API could not be reached or is not authoritative.
pub const REASON_CONNECTION_FAILED: &str = "ConnectionFailed";

/// The referenced credentials secret or its key is missing or empty.
pub const REASON_SECRET_NOT_FOUND: &str = "SecretNotFound";
