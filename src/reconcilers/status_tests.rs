// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for status condition helpers.

#[cfg(test)]
mod tests {
    use super::super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_new_condition_fields() {
        let condition = new_condition("Available", "True", "ZoneSynced", "all good", Some(3));

        assert_eq!(condition.r#type, "Available");
        assert_eq!(condition.status, "True");
        assert_eq!(condition.reason.as_deref(), Some("ZoneSynced"));
        assert_eq!(condition.message.as_deref(), Some("all good"));
        assert_eq!(condition.observed_generation, Some(3));
        assert!(condition.last_transition_time.is_some());
    }

    #[test]
    fn test_set_condition_appends_new_type() {
        let mut conditions = vec![];
        set_condition(
            &mut conditions,
            new_condition("Available", "True", "ZoneSynced", "ok", Some(1)),
        );
        assert_eq!(conditions.len(), 1);
    }

    #[test]
    fn test_set_condition_preserves_transition_time_on_same_status() {
        let mut first = new_condition("Available", "False", "SynchronizationFailed", "boom", Some(1));
        first.last_transition_time = Some("2024-01-01T00:00:00+00:00".to_string());
        let mut conditions = vec![first];

        // Same status, different message: the rewrite keeps the original
        // transition time.
        set_condition(
            &mut conditions,
            new_condition("Available", "False", "SynchronizationFailed", "still boom", Some(2)),
        );
        assert_eq!(conditions.len(), 1);
        assert_eq!(
            conditions[0].last_transition_time.as_deref(),
            Some("2024-01-01T00:00:00+00:00")
        );
        assert_eq!(conditions[0].message.as_deref(), Some("still boom"));
    }

    #[test]
    fn test_set_condition_updates_transition_time_on_status_flip() {
        let mut first = new_condition("Available", "False", "SynchronizationFailed", "boom", Some(1));
        first.last_transition_time = Some("2024-01-01T00:00:00+00:00".to_string());
        let mut conditions = vec![first];

        set_condition(
            &mut conditions,
            new_condition("Available", "True", "ZoneSynced", "recovered", Some(2)),
        );
        assert_ne!(
            conditions[0].last_transition_time.as_deref(),
            Some("2024-01-01T00:00:00+00:00")
        );
        assert_eq!(conditions[0].status, "True");
    }

    #[test]
    fn test_remove_condition() {
        let mut conditions = vec![
            new_condition("Available", "True", "ZoneSynced", "ok", None),
            new_condition("Ready", "True", "Connected", "ok", None),
        ];
        remove_condition(&mut conditions, "Available");
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].r#type, "Ready");
    }

    #[test]
    fn test_find_condition() {
        let conditions = vec![new_condition("Available", "True", "ZoneSynced", "ok", None)];
        assert!(find_condition(&conditions, "Available").is_some());
        assert!(find_condition(&conditions, "Ready").is_none());
    }

    #[test]
    fn test_transitioned_within_recent() {
        let mut condition = new_condition("Available", "False", "SynchronizationFailed", "x", None);
        condition.last_transition_time = Some((Utc::now() - Duration::seconds(10)).to_rfc3339());
        assert!(transitioned_within(&[condition], "Available", 30));
    }

    #[test]
    fn test_transitioned_within_stale() {
        let mut condition = new_condition("Available", "False", "SynchronizationFailed", "x", None);
        condition.last_transition_time = Some((Utc::now() - Duration::seconds(60)).to_rfc3339());
        assert!(!transitioned_within(&[condition], "Available", 30));
    }

    #[test]
    fn test_transitioned_within_no_history() {
        // No condition means no cooldown: retry immediately.
        assert!(!transitioned_within(&[], "Available", 30));
    }
}
