// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Generic finalizer management for Kubernetes resources.
//!
//! Every reconciled resource carries up to two finalizer tokens: the
//! resource finalizer guarding backend-side cleanup and the metrics
//! finalizer guarding in-process gauge removal. They are added on first
//! observation and removed only after their respective cleanup succeeds.
//!
//! The functions here are scope-agnostic: the caller supplies an [`Api`]
//! already bound to the right scope (see `GenericZone::api` /
//! `GenericRRset::api`), so the same code serves namespaced and
//! cluster-scoped twins.

use anyhow::Result;
use kube::api::{Patch, PatchParams};
use kube::{Api, Resource, ResourceExt};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tracing::info;

/// Whether the resource currently carries `finalizer`.
#[must_use]
pub fn has_finalizer<T: ResourceExt>(resource: &T, finalizer: &str) -> bool {
    resource
        .meta()
        .finalizers
        .as_ref()
        .is_some_and(|f| f.iter().any(|t| t == finalizer))
}

/// Add a finalizer to a resource if not already present. Idempotent.
///
/// # Errors
///
/// Returns an error if the metadata patch fails.
pub async fn ensure_finalizer<T>(api: &Api<T>, resource: &T, finalizer: &str) -> Result<()>
where
    T: Resource<DynamicType = ()>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + Serialize
        + DeserializeOwned,
{
    if has_finalizer(resource, finalizer) {
        return Ok(());
    }

    let name = resource.name_any();
    info!(
        finalizer = %finalizer,
        kind = %T::kind(&()),
        name = %name,
        "Adding finalizer"
    );

    let mut finalizers = resource.meta().finalizers.clone().unwrap_or_default();
    finalizers.push(finalizer.to_string());

    let patch = json!({ "metadata": { "finalizers": finalizers } });
    api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    Ok(())
}

/// Remove a finalizer from a resource if present. Idempotent.
///
/// # Errors
///
/// Returns an error if the metadata patch fails.
pub async fn remove_finalizer<T>(api: &Api<T>, resource: &T, finalizer: &str) -> Result<()>
where
    T: Resource<DynamicType = ()>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + Serialize
        + DeserializeOwned,
{
    if !has_finalizer(resource, finalizer) {
        return Ok(());
    }

    let name = resource.name_any();
    info!(
        finalizer = %finalizer,
        kind = %T::kind(&()),
        name = %name,
        "Removing finalizer"
    );

    let mut finalizers = resource.meta().finalizers.clone().unwrap_or_default();
    finalizers.retain(|t| t != finalizer);

    let patch = json!({ "metadata": { "finalizers": finalizers } });
    api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    Ok(())
}

#[cfg(test)]
#[path = "finalizers_tests.rs"]
mod finalizers_tests;
