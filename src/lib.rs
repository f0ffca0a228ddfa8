// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # PowerDNS Operator for Kubernetes
//!
//! A Kubernetes operator written in Rust that reconciles declarative DNS
//! intent against a PowerDNS Authoritative server through its REST API.
//!
//! ## Overview
//!
//! This library provides the core functionality for the operator, including:
//!
//! - Custom Resource Definitions (CRDs) for zones, record sets and providers
//! - Reconciliation logic for each resource type
//! - A typed client for the PowerDNS Authoritative REST API
//! - Cross-scope FQDN uniqueness enforcement
//! - Per-resource status metrics with finalizer-driven cleanup
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types
//! - [`generic`] - Polymorphism over namespaced and cluster-scoped twins
//! - [`reconcilers`] - Reconciliation logic for each resource type
//! - [`pdns`] - PowerDNS Authoritative REST API client
//! - [`context`] - Shared controller context and FQDN indexing stores
//! - [`metrics`] - Prometheus status gauges and operational metrics
//!
//! ## Resource model
//!
//! Zones exist in two scopes (`Zone`, `ClusterZone`), as do record sets
//! (`RRset`, `ClusterRRset`). The resource name of a zone IS its
//! fully-qualified domain name. A `PDNSProvider` describes how to reach a
//! PowerDNS API endpoint, including credentials and TLS; zones select one
//! via `spec.providerRef`, falling back to the process-wide legacy client
//! configured through `PDNS_API_URL` / `PDNS_API_KEY`.

pub mod constants;
pub mod context;
pub mod crd;
pub mod generic;
pub mod metrics;
pub mod pdns;
pub mod reconcilers;
pub mod status_reasons;

#[cfg(test)]
mod crd_tests;
