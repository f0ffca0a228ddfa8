// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the PowerDNS operator.
//!
//! Two gauge families mirror resource sync state:
//!
//! - `zones_status{status,name,namespace}`
//! - `rrsets_status{fqdn,type,status,name,namespace}`
//!
//! For every reconciled resource exactly one series per object carries the
//! value 1: the one whose `status` label matches the current sync state.
//! Series for the other sync states of the same object are removed on every
//! update, and all of an object's series are removed when its metrics
//! finalizer is released.
//!
//! Operational metrics (reconciliation counters and durations) use the
//! `pdns_operator_` prefix.

use prometheus::{CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

use crate::status_reasons::{FAILED_STATUS, PENDING_STATUS, SUCCEEDED_STATUS};

/// Namespace prefix for operational metrics.
const METRICS_NAMESPACE: &str = "pdns_operator";

/// Every sync state a resource can be in; enumerated to emulate
/// partial-match deletion on the gauges.
const SYNC_STATES: [&str; 3] = [SUCCEEDED_STATUS, FAILED_STATUS, PENDING_STATUS];

/// Global Prometheus metrics registry, exposed via `/metrics`.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Statuses of Zones and ClusterZones processed.
pub static ZONES_STATUS: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new("zones_status", "Statuses of Zones processed");
    let gauge = GaugeVec::new(opts, &["status", "name", "namespace"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Statuses of RRsets and ClusterRRsets processed.
pub static RRSETS_STATUS: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new("rrsets_status", "Statuses of RRsets processed");
    let gauge = GaugeVec::new(opts, &["fqdn", "type", "status", "name", "namespace"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Total number of reconciliations by resource type and outcome.
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of reconciliations by resource type and outcome",
    );
    let counter = CounterVec::new(opts, &["resource_type", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliations in seconds by resource type.
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliations in seconds by resource type",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]);
    let histogram = HistogramVec::new(opts, &["resource_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Publish the gauge for a zone's current sync state and drop the series
/// for its other states.
pub fn update_zone_metrics(status: &str, name: &str, namespace: &str) {
    for state in SYNC_STATES {
        if state != status {
            let _ = ZONES_STATUS.remove_label_values(&[state, name, namespace]);
        }
    }
    ZONES_STATUS
        .with_label_values(&[status, name, namespace])
        .set(1.0);
}

/// Remove every zone gauge series for (name, namespace).
pub fn remove_zone_metrics(name: &str, namespace: &str) {
    for state in SYNC_STATES {
        let _ = ZONES_STATUS.remove_label_values(&[state, name, namespace]);
    }
}

/// Publish the gauge for a record set's current sync state and drop the
/// series for its other states.
pub fn update_rrset_metrics(fqdn: &str, rtype: &str, status: &str, name: &str, namespace: &str) {
    for state in SYNC_STATES {
        if state != status {
            let _ = RRSETS_STATUS.remove_label_values(&[fqdn, rtype, state, name, namespace]);
        }
    }
    RRSETS_STATUS
        .with_label_values(&[fqdn, rtype, status, name, namespace])
        .set(1.0);
}

/// Remove every record set gauge series for the object.
pub fn remove_rrset_metrics(fqdn: &str, rtype: &str, name: &str, namespace: &str) {
    for state in SYNC_STATES {
        let _ = RRSETS_STATUS.remove_label_values(&[fqdn, rtype, state, name, namespace]);
    }
}

/// Record a successful reconciliation.
pub fn record_reconciliation_success(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "success"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconciliation.
pub fn record_reconciliation_error(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "error"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Gather and encode all metrics in Prometheus text format.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone_gauge(status: &str, name: &str, namespace: &str) -> f64 {
        ZONES_STATUS
            .with_label_values(&[status, name, namespace])
            .get()
    }

    #[test]
    fn test_update_zone_metrics_replaces_previous_state() {
        update_zone_metrics(FAILED_STATUS, "example.com", "default");
        assert_eq!(zone_gauge(FAILED_STATUS, "example.com", "default"), 1.0);

        // Transition to Succeeded removes the Failed series; reading it back
        // through with_label_values recreates it at zero.
        update_zone_metrics(SUCCEEDED_STATUS, "example.com", "default");
        assert_eq!(zone_gauge(SUCCEEDED_STATUS, "example.com", "default"), 1.0);
        assert_eq!(zone_gauge(FAILED_STATUS, "example.com", "default"), 0.0);
    }

    #[test]
    fn test_remove_zone_metrics_clears_all_states() {
        update_zone_metrics(SUCCEEDED_STATUS, "gone.example.org", "default");
        remove_zone_metrics("gone.example.org", "default");
        assert_eq!(
            zone_gauge(SUCCEEDED_STATUS, "gone.example.org", "default"),
            0.0
        );
    }

    #[test]
    fn test_rrset_metrics_lifecycle() {
        update_rrset_metrics("web.example.com", "A", PENDING_STATUS, "web", "default");
        update_rrset_metrics("web.example.com", "A", SUCCEEDED_STATUS, "web", "default");

        let current = RRSETS_STATUS
            .with_label_values(&["web.example.com", "A", SUCCEEDED_STATUS, "web", "default"])
            .get();
        assert_eq!(current, 1.0);

        let stale = RRSETS_STATUS
            .with_label_values(&["web.example.com", "A", PENDING_STATUS, "web", "default"])
            .get();
        assert_eq!(stale, 0.0);

        remove_rrset_metrics("web.example.com", "A", "web", "default");
        let removed = RRSETS_STATUS
            .with_label_values(&["web.example.com", "A", SUCCEEDED_STATUS, "web", "default"])
            .get();
        assert_eq!(removed, 0.0);
    }

    #[test]
    fn test_gather_metrics() {
        update_zone_metrics(SUCCEEDED_STATUS, "gather.example.com", "default");
        record_reconciliation_success("Zone", Duration::from_millis(100));

        let result = gather_metrics();
        assert!(result.is_ok(), "Gathering metrics should succeed");

        let text = result.unwrap();
        assert!(text.contains("zones_status"));
        assert!(text.contains("pdns_operator_reconciliations_total"));
    }
}
