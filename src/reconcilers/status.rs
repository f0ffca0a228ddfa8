// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers for Kubernetes resources.
//!
//! Conditions follow the standard convention: `type`, `status` (True/False/
//! Unknown), CamelCase `reason`, human-readable `message`,
//! `lastTransitionTime` and `observedGeneration`.
//!
//! `lastTransitionTime` is preserved when a condition is rewritten without
//! a status change. Reconcilers that need a guaranteed fresh transition
//! time on a spec change strip the condition first (see the pre-stat step
//! of the zone and record set reconcilers).

use chrono::{DateTime, Utc};

use crate::crd::Condition;

/// Create a new condition stamped with the current time.
#[must_use]
pub fn new_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
    observed_generation: Option<i64>,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_transition_time: Some(Utc::now().to_rfc3339()),
        observed_generation,
    }
}

/// Insert or replace a condition by type.
///
/// When an existing condition of the same type has the same status, its
/// `lastTransitionTime` is carried over so the transition time reflects
/// the last actual status flip, not the last rewrite.
pub fn set_condition(conditions: &mut Vec<Condition>, mut condition: Condition) {
    if let Some(existing) = conditions.iter_mut().find(|c| c.r#type == condition.r#type) {
        if existing.status == condition.status {
            condition.last_transition_time = existing.last_transition_time.clone();
        }
        *existing = condition;
    } else {
        conditions.push(condition);
    }
}

/// Remove a condition by type. Used before a status rewrite to force a
/// fresh `lastTransitionTime`.
pub fn remove_condition(conditions: &mut Vec<Condition>, condition_type: &str) {
    conditions.retain(|c| c.r#type != condition_type);
}

/// Find a condition by type.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Parse the last transition time of a condition, if present and valid.
#[must_use]
pub fn last_transition_time(
    conditions: &[Condition],
    condition_type: &str,
) -> Option<DateTime<Utc>> {
    find_condition(conditions, condition_type)
        .and_then(|c| c.last_transition_time.as_deref())
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Utc))
}

/// Whether the condition transitioned less than `within_secs` seconds ago.
///
/// A missing or unparseable transition time counts as not recent, so a
/// resource without history is retried immediately.
#[must_use]
pub fn transitioned_within(
    conditions: &[Condition],
    condition_type: &str,
    within_secs: i64,
) -> bool {
    last_transition_time(conditions, condition_type)
        .is_some_and(|t| (Utc::now() - t).num_seconds() < within_secs)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
