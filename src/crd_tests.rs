// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for CRD types, serialized field names and accessor defaults.

#[cfg(test)]
mod tests {
    use crate::crd::{
        CaBundleRef, ClusterZone, ClusterZoneSpec, PDNSProvider, PDNSProviderSpec,
        PDNSProviderStatus, ProviderCredentials, ProviderSecretRef, RRset, RRsetSpec, SoaEditApi,
        Zone, ZoneKind, ZoneRef, ZoneRefKind, ZoneSpec,
    };
    use kube::core::CustomResourceExt;
    use kube::Resource;
    use std::time::Duration;

    fn test_provider(spec: PDNSProviderSpec) -> PDNSProvider {
        PDNSProvider::new("test-provider", spec)
    }

    fn minimal_provider_spec() -> PDNSProviderSpec {
        PDNSProviderSpec {
            url: "https://pdns.example.net:8081".to_string(),
            vhost: None,
            timeout: None,
            interval: None,
            proxy: None,
            tls: None,
            credentials: ProviderCredentials {
                secret_ref: ProviderSecretRef {
                    name: "pdns-api-key".to_string(),
                    namespace: "dns-system".to_string(),
                    key: None,
                },
            },
        }
    }

    // ------------------------------------------------------------------
    // API group and versions
    // ------------------------------------------------------------------

    #[test]
    fn test_api_versions() {
        assert_eq!(Zone::api_version(&()), "dns.cav.enablers.ob/v1alpha2");
        assert_eq!(ClusterZone::api_version(&()), "dns.cav.enablers.ob/v1alpha2");
        assert_eq!(RRset::api_version(&()), "dns.cav.enablers.ob/v1alpha2");
        assert_eq!(
            PDNSProvider::api_version(&()),
            "dns.cav.enablers.ob/v1alpha3"
        );
    }

    #[test]
    fn test_zone_is_namespaced_and_clusterzone_is_not() {
        let zone_crd = Zone::crd();
        assert_eq!(zone_crd.spec.scope, "Namespaced");

        let cluster_zone_crd = ClusterZone::crd();
        assert_eq!(cluster_zone_crd.spec.scope, "Cluster");

        let provider_crd = PDNSProvider::crd();
        assert_eq!(provider_crd.spec.scope, "Cluster");
    }

    // ------------------------------------------------------------------
    // Serialized field names
    // ------------------------------------------------------------------

    #[test]
    fn test_zone_spec_field_names() {
        let spec = ZoneSpec {
            kind: ZoneKind::Native,
            nameservers: vec!["ns1.example.com".to_string()],
            catalog: Some("catalog.example".to_string()),
            soa_edit_api: Some(SoaEditApi::Increase),
            provider_ref: Some("production-pdns".to_string()),
        };

        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["kind"], "Native");
        assert_eq!(value["soa_edit_api"], "INCREASE");
        assert_eq!(value["providerRef"], "production-pdns");
        assert_eq!(value["nameservers"][0], "ns1.example.com");
    }

    #[test]
    fn test_soa_edit_api_values() {
        assert_eq!(SoaEditApi::default(), SoaEditApi::Default);
        assert_eq!(SoaEditApi::Default.as_str(), "DEFAULT");
        assert_eq!(SoaEditApi::Increase.as_str(), "INCREASE");
        assert_eq!(SoaEditApi::Epoch.as_str(), "EPOCH");

        let parsed: SoaEditApi = serde_json::from_str("\"EPOCH\"").unwrap();
        assert_eq!(parsed, SoaEditApi::Epoch);
    }

    #[test]
    fn test_zone_kind_round_trip() {
        for (kind, literal) in [
            (ZoneKind::Native, "\"Native\""),
            (ZoneKind::Master, "\"Master\""),
            (ZoneKind::Slave, "\"Slave\""),
            (ZoneKind::Producer, "\"Producer\""),
            (ZoneKind::Consumer, "\"Consumer\""),
        ] {
            assert_eq!(serde_json::to_string(&kind).unwrap(), literal);
            let parsed: ZoneKind = serde_json::from_str(literal).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_rrset_spec_field_names() {
        let spec = RRsetSpec {
            r#type: "A".to_string(),
            name: "web".to_string(),
            ttl: 300,
            records: vec!["1.1.1.1".to_string()],
            comment: None,
            zone_ref: ZoneRef {
                name: "example.com".to_string(),
                kind: ZoneRefKind::ClusterZone,
            },
        };

        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["type"], "A");
        assert_eq!(value["zoneRef"]["name"], "example.com");
        assert_eq!(value["zoneRef"]["kind"], "ClusterZone");
        assert!(value.get("comment").is_none());
    }

    #[test]
    fn test_provider_status_field_names() {
        let status = PDNSProviderStatus {
            connection_status: Some("Connected".to_string()),
            power_dns_version: Some("4.9.1".to_string()),
            daemon_type: Some("authoritative".to_string()),
            server_id: Some("localhost".to_string()),
            ..PDNSProviderStatus::default()
        };

        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["connectionStatus"], "Connected");
        assert_eq!(value["powerDNSVersion"], "4.9.1");
        assert_eq!(value["serverID"], "localhost");
        assert_eq!(value["daemonType"], "authoritative");
    }

    // ------------------------------------------------------------------
    // Accessor defaults
    // ------------------------------------------------------------------

    #[test]
    fn test_provider_defaults() {
        let provider = test_provider(minimal_provider_spec());

        assert_eq!(provider.vhost(), "localhost");
        assert_eq!(provider.timeout(), Duration::from_secs(10));
        assert_eq!(provider.interval(), Duration::from_secs(300));
        assert!(!provider.tls_insecure());
        assert_eq!(provider.credentials_secret_key(), "apiKey");
        assert!(provider.ca_bundle_ref().is_none());
    }

    #[test]
    fn test_provider_explicit_values_override_defaults() {
        let mut spec = minimal_provider_spec();
        spec.vhost = Some("pdns-01".to_string());
        spec.timeout = Some(30);
        spec.interval = Some(60);
        spec.credentials.secret_ref.key = Some("token".to_string());
        let provider = test_provider(spec);

        assert_eq!(provider.vhost(), "pdns-01");
        assert_eq!(provider.timeout(), Duration::from_secs(30));
        assert_eq!(provider.interval(), Duration::from_secs(60));
        assert_eq!(provider.credentials_secret_key(), "token");
    }

    #[test]
    fn test_ca_bundle_ref_defaults() {
        let ca_ref = CaBundleRef {
            name: "pdns-ca".to_string(),
            namespace: "dns-system".to_string(),
            kind: None,
            key: None,
        };
        assert_eq!(ca_ref.kind(), "ConfigMap");
        assert_eq!(ca_ref.key(), "ca.crt");
    }

    #[test]
    fn test_provider_health_requires_authoritative_daemon() {
        let mut provider = test_provider(minimal_provider_spec());
        assert!(!provider.is_connection_healthy(), "no status yet");

        provider.status = Some(PDNSProviderStatus {
            connection_status: Some("Connected".to_string()),
            daemon_type: Some("recursor".to_string()),
            ..PDNSProviderStatus::default()
        });
        assert!(
            !provider.is_connection_healthy(),
            "connected to the wrong daemon type is not healthy"
        );

        provider.status = Some(PDNSProviderStatus {
            connection_status: Some("Connected".to_string()),
            daemon_type: Some("authoritative".to_string()),
            ..PDNSProviderStatus::default()
        });
        assert!(provider.is_connection_healthy());
    }

    // ------------------------------------------------------------------
    // Shared status shape across scopes
    // ------------------------------------------------------------------

    #[test]
    fn test_zone_twins_share_status_shape() {
        let zone = Zone::new(
            "example.com",
            ZoneSpec {
                kind: ZoneKind::Native,
                nameservers: vec!["ns1.example.com".to_string()],
                catalog: None,
                soa_edit_api: None,
                provider_ref: None,
            },
        );
        let cluster_zone = ClusterZone::new(
            "example.com",
            ClusterZoneSpec {
                kind: ZoneKind::Native,
                nameservers: vec!["ns1.example.com".to_string()],
                catalog: None,
                soa_edit_api: None,
                provider_ref: None,
            },
        );

        // Both serialize the same spec shape: declaring a zone in either
        // scope means the same thing to the backend.
        assert_eq!(
            serde_json::to_value(&zone.spec).unwrap(),
            serde_json::to_value(&cluster_zone.spec).unwrap()
        );
    }
}
