// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the FQDN indexing stores.

#[cfg(test)]
mod tests {
    use crate::context::{rrset_entry_name, Stores};
    use crate::crd::{
        ClusterRRset, ClusterRRsetSpec, ClusterZone, ClusterZoneSpec, RRset, RRsetSpec,
        RRsetStatus, Zone, ZoneKind, ZoneRef, ZoneRefKind, ZoneSpec, ZoneStatus,
    };
    use crate::status_reasons::{FAILED_STATUS, PENDING_STATUS, SUCCEEDED_STATUS};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use kube::runtime::reflector::store;
    use kube::runtime::watcher::Event;

    fn meta(name: &str, namespace: Option<&str>, uid: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.to_string()),
            namespace: namespace.map(String::from),
            uid: Some(uid.to_string()),
            ..Default::default()
        }
    }

    fn zone(name: &str, namespace: &str, uid: &str, sync: Option<&str>) -> Zone {
        Zone {
            metadata: meta(name, Some(namespace), uid),
            spec: ZoneSpec {
                kind: ZoneKind::Native,
                nameservers: vec!["ns1.example.com".to_string()],
                catalog: None,
                soa_edit_api: None,
                provider_ref: None,
            },
            status: sync.map(|s| ZoneStatus {
                sync_status: Some(s.to_string()),
                ..ZoneStatus::default()
            }),
        }
    }

    fn cluster_zone(name: &str, uid: &str, sync: Option<&str>) -> ClusterZone {
        ClusterZone {
            metadata: meta(name, None, uid),
            spec: ClusterZoneSpec {
                kind: ZoneKind::Native,
                nameservers: vec!["ns1.example.com".to_string()],
                catalog: None,
                soa_edit_api: None,
                provider_ref: None,
            },
            status: sync.map(|s| ZoneStatus {
                sync_status: Some(s.to_string()),
                ..ZoneStatus::default()
            }),
        }
    }

    fn rrset(name: &str, namespace: &str, uid: &str, short: &str, sync: Option<&str>) -> RRset {
        RRset {
            metadata: meta(name, Some(namespace), uid),
            spec: RRsetSpec {
                r#type: "A".to_string(),
                name: short.to_string(),
                ttl: 300,
                records: vec!["1.1.1.1".to_string()],
                comment: None,
                zone_ref: ZoneRef {
                    name: "example.com".to_string(),
                    kind: ZoneRefKind::Zone,
                },
            },
            status: sync.map(|s| RRsetStatus {
                sync_status: Some(s.to_string()),
                ..RRsetStatus::default()
            }),
        }
    }

    fn empty_stores() -> (
        Stores,
        kube::runtime::reflector::store::Writer<Zone>,
        kube::runtime::reflector::store::Writer<ClusterZone>,
        kube::runtime::reflector::store::Writer<RRset>,
        kube::runtime::reflector::store::Writer<ClusterRRset>,
    ) {
        let (zones, zones_writer) = store::<Zone>();
        let (cluster_zones, cluster_zones_writer) = store::<ClusterZone>();
        let (rrsets, rrsets_writer) = store::<RRset>();
        let (cluster_rrsets, cluster_rrsets_writer) = store::<ClusterRRset>();
        (
            Stores {
                zones,
                cluster_zones,
                rrsets,
                cluster_rrsets,
            },
            zones_writer,
            cluster_zones_writer,
            rrsets_writer,
            cluster_rrsets_writer,
        )
    }

    #[test]
    fn test_zone_entries_span_both_scopes() {
        let (stores, mut zones_w, mut cluster_zones_w, _r, _cr) = empty_stores();

        zones_w.apply_watcher_event(&Event::Apply(zone(
            "example.com",
            "team-a",
            "uid-1",
            Some(SUCCEEDED_STATUS),
        )));
        cluster_zones_w.apply_watcher_event(&Event::Apply(cluster_zone(
            "example.com",
            "uid-2",
            None,
        )));

        let entries = stores.zone_entries("example.com");
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.kind == "Zone"));
        assert!(entries.iter().any(|e| e.kind == "ClusterZone"));
    }

    #[test]
    fn test_zone_entries_exclude_failed_resources() {
        // A Failed duplicate must drop out of the index so a freshly
        // deleted winner unblocks it, and so it does not block others.
        let (stores, mut zones_w, _cz, _r, _cr) = empty_stores();

        zones_w.apply_watcher_event(&Event::Apply(zone(
            "example.com",
            "team-a",
            "uid-1",
            Some(FAILED_STATUS),
        )));
        zones_w.apply_watcher_event(&Event::Apply(zone(
            "example.com",
            "team-b",
            "uid-2",
            Some(SUCCEEDED_STATUS),
        )));

        let entries = stores.zone_entries("example.com");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].uid, "uid-2");
    }

    #[test]
    fn test_zone_entries_include_pending_resources() {
        let (stores, mut zones_w, _cz, _r, _cr) = empty_stores();

        zones_w.apply_watcher_event(&Event::Apply(zone("example.com", "team-a", "uid-1", None)));
        zones_w.apply_watcher_event(&Event::Apply(zone(
            "example.com",
            "team-b",
            "uid-2",
            Some(PENDING_STATUS),
        )));

        // Absent status is indexed, Pending is not (only absent or
        // Succeeded participate in the claim).
        let entries = stores.zone_entries("example.com");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].uid, "uid-1");
    }

    #[test]
    fn test_zone_entries_keyed_by_name() {
        let (stores, mut zones_w, _cz, _r, _cr) = empty_stores();

        zones_w.apply_watcher_event(&Event::Apply(zone(
            "other.org",
            "team-a",
            "uid-1",
            Some(SUCCEEDED_STATUS),
        )));

        assert!(stores.zone_entries("example.com").is_empty());
    }

    #[test]
    fn test_rrset_entry_name_includes_type() {
        let record = rrset("web", "default", "uid-1", "web", None);
        assert_eq!(rrset_entry_name(&record), "web.example.com/A");
    }

    #[test]
    fn test_rrset_entries_match_on_fqdn_and_type() {
        let (stores, _z, _cz, mut rrsets_w, mut cluster_rrsets_w) = empty_stores();

        rrsets_w.apply_watcher_event(&Event::Apply(rrset(
            "web",
            "team-a",
            "uid-1",
            "web",
            Some(SUCCEEDED_STATUS),
        )));
        rrsets_w.apply_watcher_event(&Event::Apply(rrset(
            "mail",
            "team-a",
            "uid-2",
            "mail",
            Some(SUCCEEDED_STATUS),
        )));
        cluster_rrsets_w.apply_watcher_event(&Event::Apply(ClusterRRset {
            metadata: meta("web-cluster", None, "uid-3"),
            spec: ClusterRRsetSpec {
                r#type: "A".to_string(),
                name: "web".to_string(),
                ttl: 300,
                records: vec!["2.2.2.2".to_string()],
                comment: None,
                zone_ref: ZoneRef {
                    name: "example.com".to_string(),
                    kind: ZoneRefKind::ClusterZone,
                },
            },
            status: None,
        }));

        let entries = stores.rrset_entries("web.example.com/A");
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.kind == "RRset"));
        assert!(entries.iter().any(|e| e.kind == "ClusterRRset"));

        assert_eq!(stores.rrset_entries("mail.example.com/A").len(), 1);
        assert!(stores.rrset_entries("web.example.com/AAAA").is_empty());
    }
}
