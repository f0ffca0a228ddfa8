// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the zone and record set reconciliation helpers.

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::context::IndexEntry;
    use crate::crd::{RRset, RRsetSpec, Zone, ZoneKind, ZoneRef, ZoneRefKind, ZoneSpec};
    use crate::pdns::types::{Comment, RRset as BackendRRset, Record, Zone as BackendZone};
    use crate::status_reasons::{FAILED_STATUS, SUCCEEDED_STATUS};
    use chrono::{TimeZone, Utc};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

    fn test_zone(kind: ZoneKind, nameservers: &[&str], catalog: Option<&str>) -> Zone {
        Zone::new(
            "example.com",
            ZoneSpec {
                kind,
                nameservers: nameservers.iter().map(ToString::to_string).collect(),
                catalog: catalog.map(String::from),
                soa_edit_api: None,
                provider_ref: None,
            },
        )
    }

    fn test_rrset(rtype: &str, name: &str, ttl: u32, records: &[&str], comment: Option<&str>) -> RRset {
        RRset::new(
            "test-rrset",
            RRsetSpec {
                r#type: rtype.to_string(),
                name: name.to_string(),
                ttl,
                records: records.iter().map(ToString::to_string).collect(),
                comment: comment.map(String::from),
                zone_ref: ZoneRef {
                    name: "example.com".to_string(),
                    kind: ZoneRefKind::Zone,
                },
            },
        )
    }

    fn backend_rrset(name: &str, rtype: &str, ttl: u32, contents: &[&str]) -> BackendRRset {
        BackendRRset {
            name: Some(name.to_string()),
            rtype: Some(rtype.to_string()),
            ttl: Some(ttl),
            changetype: None,
            records: contents
                .iter()
                .map(|c| Record {
                    content: (*c).to_string(),
                    disabled: false,
                })
                .collect(),
            comments: vec![],
        }
    }

    fn entry(uid: &str, ts: i64, sync: Option<&str>) -> IndexEntry {
        IndexEntry {
            kind: "Zone",
            uid: uid.to_string(),
            name: "example.com".to_string(),
            namespace: Some("default".to_string()),
            creation_timestamp: Some(Time(Utc.timestamp_opt(ts, 0).unwrap())),
            sync_status: sync.map(String::from),
        }
    }

    // ------------------------------------------------------------------
    // rrset_fqdn
    // ------------------------------------------------------------------

    #[test]
    fn test_rrset_fqdn_relative_name() {
        assert_eq!(rrset_fqdn("web", "example.com"), "web.example.com");
    }

    #[test]
    fn test_rrset_fqdn_apex() {
        assert_eq!(rrset_fqdn("", "example.com"), "example.com");
        assert_eq!(rrset_fqdn("@", "example.com"), "example.com");
    }

    #[test]
    fn test_rrset_fqdn_canonical_name_used_as_is() {
        assert_eq!(rrset_fqdn("web.other.org.", "example.com"), "web.other.org");
    }

    #[test]
    fn test_rrset_fqdn_canonical_zone() {
        assert_eq!(rrset_fqdn("web", "example.com."), "web.example.com");
    }

    // ------------------------------------------------------------------
    // canonical_set_eq
    // ------------------------------------------------------------------

    #[test]
    fn test_canonical_set_eq_order_insensitive() {
        let a = vec!["ns1.example.com".to_string(), "ns2.example.com".to_string()];
        let b = vec!["ns2.example.com.".to_string(), "ns1.example.com.".to_string()];
        assert!(canonical_set_eq(&a, &b));
    }

    #[test]
    fn test_canonical_set_eq_detects_extra_entry() {
        let a = vec!["ns1.example.com".to_string(), "ns2.example.com".to_string()];
        let b = vec![
            "ns1.example.com".to_string(),
            "ns2.example.com".to_string(),
            "ns3.example.com".to_string(),
        ];
        assert!(!canonical_set_eq(&a, &b));
    }

    #[test]
    fn test_canonical_set_eq_multiset() {
        // A duplicated entry is not the same as a single one.
        let a = vec!["ns1.example.com".to_string(), "ns1.example.com".to_string()];
        let b = vec!["ns1.example.com".to_string()];
        assert!(!canonical_set_eq(&a, &b));
    }

    // ------------------------------------------------------------------
    // filter_rrset
    // ------------------------------------------------------------------

    #[test]
    fn test_filter_rrset_drops_leaked_entries() {
        // The backend is known to leak unrelated record sets into filtered
        // responses; only the exact (name, type) match may survive.
        let response = vec![
            backend_rrset("other.example.com.", "NS", 300, &["ns9.example.com."]),
            backend_rrset("example.com.", "A", 300, &["1.2.3.4"]),
            backend_rrset("example.com.", "NS", 1500, &["ns1.example.com."]),
        ];

        let filtered = filter_rrset(response, "example.com", "NS").unwrap();
        assert_eq!(filtered.ttl, Some(1500));
        assert_eq!(filtered.records.len(), 1);
    }

    #[test]
    fn test_filter_rrset_none_when_absent() {
        let response = vec![backend_rrset("other.example.com.", "NS", 300, &["ns9."])];
        assert!(filter_rrset(response, "example.com", "NS").is_none());
    }

    // ------------------------------------------------------------------
    // zone_is_identical
    // ------------------------------------------------------------------

    fn backend_zone(kind: &str, catalog: Option<&str>, soa_edit_api: Option<&str>) -> BackendZone {
        BackendZone {
            id: Some("example.com.".to_string()),
            name: Some("example.com.".to_string()),
            kind: Some(kind.to_string()),
            catalog: catalog.map(String::from),
            soa_edit_api: soa_edit_api.map(String::from),
            ..BackendZone::default()
        }
    }

    #[test]
    fn test_zone_identical_when_converged() {
        let zone = test_zone(ZoneKind::Native, &["ns1.example.com", "ns2.example.com"], None);
        let backend = backend_zone("Native", None, Some("DEFAULT"));
        let ns = vec!["ns1.example.com".to_string(), "ns2.example.com".to_string()];

        let (zone_identical, ns_identical) = zone_is_identical(&zone, &backend, &ns);
        assert!(zone_identical);
        assert!(ns_identical);
    }

    #[test]
    fn test_zone_kind_change_detected() {
        let zone = test_zone(ZoneKind::Master, &["ns1.example.com"], None);
        let backend = backend_zone("Native", None, None);

        let (zone_identical, _) =
            zone_is_identical(&zone, &backend, &["ns1.example.com".to_string()]);
        assert!(!zone_identical);
    }

    #[test]
    fn test_zone_catalog_compared_canonically() {
        let zone = test_zone(ZoneKind::Native, &["ns1.example.com"], Some("catalog.example"));
        let backend = backend_zone("Native", Some("catalog.example."), None);

        let (zone_identical, _) =
            zone_is_identical(&zone, &backend, &["ns1.example.com".to_string()]);
        assert!(zone_identical);
    }

    #[test]
    fn test_zone_absent_soa_edit_api_means_default() {
        let zone = test_zone(ZoneKind::Native, &["ns1.example.com"], None);
        let backend = backend_zone("Native", None, None);

        let (zone_identical, _) =
            zone_is_identical(&zone, &backend, &["ns1.example.com".to_string()]);
        assert!(zone_identical);
    }

    #[test]
    fn test_nameserver_delta_reported_separately() {
        let zone = test_zone(
            ZoneKind::Native,
            &["ns1.example.com", "ns2.example.com", "ns3.example.com"],
            None,
        );
        let backend = backend_zone("Native", None, None);
        let ns = vec!["ns1.example.com".to_string(), "ns2.example.com".to_string()];

        let (zone_identical, ns_identical) = zone_is_identical(&zone, &backend, &ns);
        assert!(zone_identical, "scalar attributes did not change");
        assert!(!ns_identical, "nameserver list grew");
    }

    #[test]
    fn test_nameservers_of_strips_trailing_dots() {
        let rrset = backend_rrset(
            "example.com.",
            "NS",
            1500,
            &["ns1.example.com.", "ns2.example.com."],
        );
        assert_eq!(
            nameservers_of(Some(&rrset)),
            vec!["ns1.example.com".to_string(), "ns2.example.com".to_string()]
        );
        assert!(nameservers_of(None).is_empty());
    }

    // ------------------------------------------------------------------
    // rrset_matches
    // ------------------------------------------------------------------

    #[test]
    fn test_rrset_matches_order_insensitive_records() {
        let declared = test_rrset("A", "web", 300, &["1.1.1.1", "1.1.1.2"], None);
        let backend = backend_rrset("web.example.com.", "A", 300, &["1.1.1.2", "1.1.1.1"]);
        assert!(rrset_matches(&declared, &backend));
    }

    #[test]
    fn test_rrset_matches_ttl_mismatch() {
        let declared = test_rrset("A", "web", 300, &["1.1.1.1"], None);
        let backend = backend_rrset("web.example.com.", "A", 600, &["1.1.1.1"]);
        assert!(!rrset_matches(&declared, &backend));
    }

    #[test]
    fn test_rrset_matches_record_value_mismatch() {
        let declared = test_rrset("A", "web", 300, &["1.1.1.1"], None);
        let backend = backend_rrset("web.example.com.", "A", 300, &["2.2.2.2"]);
        assert!(!rrset_matches(&declared, &backend));
    }

    #[test]
    fn test_rrset_matches_comment_with_account() {
        let declared = test_rrset("A", "web", 300, &["1.1.1.1"], Some("managed"));

        let mut backend = backend_rrset("web.example.com.", "A", 300, &["1.1.1.1"]);
        backend.comments = vec![Comment {
            content: "managed".to_string(),
            account: Some("powerdns-operator".to_string()),
            modified_at: None,
        }];
        assert!(rrset_matches(&declared, &backend));

        // Same content but foreign account tag is not ours.
        backend.comments[0].account = Some("someone-else".to_string());
        assert!(!rrset_matches(&declared, &backend));
    }

    #[test]
    fn test_rrset_matches_unexpected_backend_comment() {
        let declared = test_rrset("A", "web", 300, &["1.1.1.1"], None);
        let mut backend = backend_rrset("web.example.com.", "A", 300, &["1.1.1.1"]);
        backend.comments = vec![Comment {
            content: "stray".to_string(),
            account: None,
            modified_at: None,
        }];
        assert!(!rrset_matches(&declared, &backend));
    }

    // ------------------------------------------------------------------
    // duplicate_exists
    // ------------------------------------------------------------------

    #[test]
    fn test_duplicate_ignores_own_entry() {
        let entries = vec![entry("uid-a", 100, Some(SUCCEEDED_STATUS))];
        let ts = Time(Utc.timestamp_opt(100, 0).unwrap());
        assert!(!duplicate_exists(
            &entries,
            "uid-a",
            Some(&ts),
            Some(SUCCEEDED_STATUS)
        ));
    }

    #[test]
    fn test_duplicate_loses_to_succeeded_peer() {
        let entries = vec![entry("uid-winner", 200, Some(SUCCEEDED_STATUS))];
        let ts = Time(Utc.timestamp_opt(100, 0).unwrap());
        // Even an older pending resource loses to an established one.
        assert!(duplicate_exists(&entries, "uid-new", Some(&ts), None));
    }

    #[test]
    fn test_duplicate_succeeded_self_keeps_claim_over_pending_peer() {
        let entries = vec![entry("uid-pending", 50, None)];
        let ts = Time(Utc.timestamp_opt(100, 0).unwrap());
        assert!(!duplicate_exists(
            &entries,
            "uid-self",
            Some(&ts),
            Some(SUCCEEDED_STATUS)
        ));
    }

    #[test]
    fn test_duplicate_older_pending_peer_wins() {
        let older = vec![entry("uid-old", 50, None)];
        let newer = vec![entry("uid-new", 200, None)];
        let ts = Time(Utc.timestamp_opt(100, 0).unwrap());

        assert!(duplicate_exists(&older, "uid-self", Some(&ts), None));
        assert!(!duplicate_exists(&newer, "uid-self", Some(&ts), None));
    }

    #[test]
    fn test_duplicate_uid_breaks_timestamp_tie() {
        let entries = vec![entry("uid-a", 100, None)];
        let ts = Time(Utc.timestamp_opt(100, 0).unwrap());
        // "uid-a" < "uid-b": the other entry is considered established first.
        assert!(duplicate_exists(&entries, "uid-b", Some(&ts), None));
        assert!(!duplicate_exists(&entries, "uid-0", Some(&ts), None));
    }

    #[test]
    fn test_duplicate_failed_entries_are_not_indexed() {
        // A Failed resource never appears in the index in the first place;
        // this mirrors that contract at the helper level.
        let entries: Vec<IndexEntry> = vec![];
        let ts = Time(Utc.timestamp_opt(100, 0).unwrap());
        assert!(!duplicate_exists(&entries, "uid-self", Some(&ts), Some(FAILED_STATUS)));
    }
}
