// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for finalizer helpers.

#[cfg(test)]
mod tests {
    use super::super::has_finalizer;
    use crate::constants::{METRICS_FINALIZER_NAME, RESOURCES_FINALIZER_NAME};
    use crate::crd::{Zone, ZoneKind, ZoneSpec};

    fn zone_with_finalizers(finalizers: &[&str]) -> Zone {
        let mut zone = Zone::new(
            "example.com",
            ZoneSpec {
                kind: ZoneKind::Native,
                nameservers: vec!["ns1.example.com".to_string()],
                catalog: None,
                soa_edit_api: None,
                provider_ref: None,
            },
        );
        if !finalizers.is_empty() {
            zone.metadata.finalizers =
                Some(finalizers.iter().map(ToString::to_string).collect());
        }
        zone
    }

    #[test]
    fn test_has_finalizer_absent() {
        let zone = zone_with_finalizers(&[]);
        assert!(!has_finalizer(&zone, RESOURCES_FINALIZER_NAME));
    }

    #[test]
    fn test_has_finalizer_present() {
        let zone = zone_with_finalizers(&[RESOURCES_FINALIZER_NAME]);
        assert!(has_finalizer(&zone, RESOURCES_FINALIZER_NAME));
        assert!(!has_finalizer(&zone, METRICS_FINALIZER_NAME));
    }

    #[test]
    fn test_has_finalizer_both_tokens() {
        let zone = zone_with_finalizers(&[RESOURCES_FINALIZER_NAME, METRICS_FINALIZER_NAME]);
        assert!(has_finalizer(&zone, RESOURCES_FINALIZER_NAME));
        assert!(has_finalizer(&zone, METRICS_FINALIZER_NAME));
    }
}
