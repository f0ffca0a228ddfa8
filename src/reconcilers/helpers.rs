// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Pure helpers shared by the zone and record set reconcilers:
//! FQDN computation, backend equality checks and duplicate detection.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

use crate::constants::RRSET_COMMENT_ACCOUNT;
use crate::context::IndexEntry;
use crate::generic::{GenericRRset, GenericZone};
use crate::pdns::types::RRset as BackendRRset;
use crate::pdns::types::Zone as BackendZone;
use crate::pdns::{make_canonical, trim_canonical};
use crate::status_reasons::SUCCEEDED_STATUS;

/// Compute the fully-qualified entry name of a record set, without the
/// trailing dot.
///
/// The short name may be empty or `@` (zone apex), canonical (ends with a
/// dot, used as-is), or relative to the parent zone.
#[must_use]
pub fn rrset_fqdn(short_name: &str, zone_name: &str) -> String {
    if short_name.is_empty() || short_name == "@" {
        trim_canonical(zone_name)
    } else if short_name.ends_with('.') {
        trim_canonical(short_name)
    } else {
        format!("{}.{}", short_name, trim_canonical(zone_name))
    }
}

/// Order-insensitive equality of two name lists, up to canonicalization.
#[must_use]
pub fn canonical_set_eq(a: &[String], b: &[String]) -> bool {
    let canon = |names: &[String]| -> BTreeMap<String, usize> {
        let mut set = BTreeMap::new();
        for n in names {
            *set.entry(make_canonical(n)).or_insert(0) += 1;
        }
        set
    };
    canon(a) == canon(b)
}

/// Defensively pick the record set matching (name, type) out of a backend
/// response.
///
/// Some backend versions leak unrelated record sets (and their comments)
/// into filtered GET responses, so the server-side filter cannot be
/// trusted on its own.
#[must_use]
pub fn filter_rrset(rrsets: Vec<BackendRRset>, name: &str, rtype: &str) -> Option<BackendRRset> {
    let canonical = make_canonical(name);
    rrsets
        .into_iter()
        .find(|rr| rr.name.as_deref() == Some(canonical.as_str()) && rr.rtype.as_deref() == Some(rtype))
}

/// Compare a declared zone against the backend's view.
///
/// Returns `(zone_identical, ns_identical)`. Nameserver changes are patched
/// through the records API, other scalar attribute changes through the zone
/// API, so the two deltas are reported separately.
#[must_use]
pub fn zone_is_identical<Z: GenericZone>(
    zone: &Z,
    backend: &BackendZone,
    backend_nameservers: &[String],
) -> (bool, bool) {
    let kind_identical = backend.kind.as_deref() == Some(zone.zone_kind().as_str());

    let declared_catalog = zone.catalog().filter(|c| !c.is_empty()).map(make_canonical);
    let backend_catalog = backend
        .catalog
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(make_canonical);
    let catalog_identical = declared_catalog == backend_catalog;

    // An unset backend policy means the server default applies.
    let backend_soa_edit = backend
        .soa_edit_api
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or("DEFAULT");
    let soa_edit_identical = backend_soa_edit == zone.soa_edit_api().as_str();

    let ns_identical = canonical_set_eq(zone.nameservers(), backend_nameservers);

    (
        kind_identical && catalog_identical && soa_edit_identical,
        ns_identical,
    )
}

/// Nameserver names held by a backend NS record set, trailing dots
/// stripped for comparison against the declared spec.
#[must_use]
pub fn nameservers_of(rrset: Option<&BackendRRset>) -> Vec<String> {
    rrset
        .map(|rr| rr.records.iter().map(|r| trim_canonical(&r.content)).collect())
        .unwrap_or_default()
}

/// Compare a declared record set against the backend's view.
///
/// Equality considers TTL, the record value multiset (order-insensitive)
/// and the comment including its operator-attributed account tag.
#[must_use]
pub fn rrset_matches<R: GenericRRset>(rrset: &R, backend: &BackendRRset) -> bool {
    if backend.ttl != Some(rrset.ttl()) {
        return false;
    }

    let mut declared: Vec<&str> = rrset.records().iter().map(String::as_str).collect();
    let mut actual: Vec<&str> = backend.records.iter().map(|r| r.content.as_str()).collect();
    declared.sort_unstable();
    actual.sort_unstable();
    if declared != actual {
        return false;
    }

    match rrset.comment() {
        None => backend.comments.is_empty(),
        Some(comment) => backend.comments.iter().any(|c| {
            c.content == comment && c.account.as_deref() == Some(RRSET_COMMENT_ACCOUNT)
        }),
    }
}

/// Decide whether the resource identified by (uid, creation, sync) loses
/// the claim on an entry name to one of the indexed `entries`.
///
/// The first-established resource wins: a resource loses to an
/// already-Succeeded peer, and between two claimants in the same state the
/// older creation timestamp (UID as final tie-break) prevails. Entries for
/// the resource itself are ignored.
#[must_use]
pub fn duplicate_exists(
    entries: &[IndexEntry],
    uid: &str,
    creation: Option<&Time>,
    sync_status: Option<&str>,
) -> bool {
    let self_succeeded = sync_status == Some(SUCCEEDED_STATUS);

    entries.iter().filter(|e| e.uid != uid).any(|other| {
        let other_succeeded = other.sync_status.as_deref() == Some(SUCCEEDED_STATUS);
        if other_succeeded != self_succeeded {
            other_succeeded
        } else {
            established_before(other, creation, uid)
        }
    })
}

fn established_before(other: &IndexEntry, self_creation: Option<&Time>, self_uid: &str) -> bool {
    match (&other.creation_timestamp, self_creation) {
        (Some(o), Some(s)) if o.0 != s.0 => o.0 < s.0,
        (Some(_), None) => true,
        (None, Some(_)) => false,
        _ => other.uid.as_str() < self_uid,
    }
}

#[cfg(test)]
#[path = "helpers_tests.rs"]
mod helpers_tests;
