// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record set operations against the PowerDNS API.
//!
//! The GET endpoint filters by name and type server-side, but some backend
//! versions leak unrelated record sets (and their comments) into filtered
//! responses. Callers MUST re-filter the returned list by (name, type);
//! see `filter_rrset` in the reconciler helpers.

use reqwest::Method;
use tracing::debug;

use super::types::{Comment, RRset, RRsetsPayload, Record, CHANGETYPE_DELETE, CHANGETYPE_REPLACE};
use super::{make_canonical, PdnsClient, PdnsError};

/// Records capability set: get, change and delete record sets in a zone.
pub struct RecordsApi<'a> {
    pub(crate) client: &'a PdnsClient,
}

impl RecordsApi<'_> {
    fn records_path(&self, zone: &str) -> String {
        format!(
            "/servers/{}/zones/{}/records",
            self.client.vhost(),
            make_canonical(zone)
        )
    }

    /// Fetch the record sets matching (name, type) in a zone.
    ///
    /// An absent zone or record set yields an empty list; the caller decides
    /// whether absence means "create" or "already deleted".
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-404 API error.
    pub async fn get(
        &self,
        zone: &str,
        name: &str,
        rtype: &str,
    ) -> Result<Vec<RRset>, PdnsError> {
        let path = format!(
            "{}?name={}&type={}",
            self.records_path(zone),
            make_canonical(name),
            rtype
        );
        match self.client.request_json::<Vec<RRset>>(Method::GET, &path, None).await {
            Ok(rrsets) => Ok(rrsets),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Upsert one record set (changetype REPLACE) carrying TTL, record
    /// values and optional comments.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success API status.
    pub async fn change(
        &self,
        zone: &str,
        name: &str,
        rtype: &str,
        ttl: u32,
        contents: &[String],
        comments: Vec<Comment>,
    ) -> Result<(), PdnsError> {
        debug!(zone = %zone, name = %name, rtype = %rtype, ttl = ttl, "Patching record set in PowerDNS");

        let payload = RRsetsPayload {
            rrsets: vec![RRset {
                name: Some(make_canonical(name)),
                rtype: Some(rtype.to_string()),
                ttl: Some(ttl),
                changetype: Some(CHANGETYPE_REPLACE.to_string()),
                records: contents
                    .iter()
                    .map(|c| Record {
                        content: c.clone(),
                        disabled: false,
                    })
                    .collect(),
                comments,
            }],
        };

        self.client
            .request(
                Method::PATCH,
                &self.records_path(zone),
                Some(serde_json::to_value(&payload)?),
            )
            .await?;
        Ok(())
    }

    /// Delete one record set (changetype DELETE). Absence is success.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-404 API error.
    pub async fn delete(&self, zone: &str, name: &str, rtype: &str) -> Result<(), PdnsError> {
        debug!(zone = %zone, name = %name, rtype = %rtype, "Deleting record set in PowerDNS");

        let payload = RRsetsPayload {
            rrsets: vec![RRset {
                name: Some(make_canonical(name)),
                rtype: Some(rtype.to_string()),
                changetype: Some(CHANGETYPE_DELETE.to_string()),
                ..RRset::default()
            }],
        };

        match self
            .client
            .request(
                Method::DELETE,
                &self.records_path(zone),
                Some(serde_json::to_value(&payload)?),
            )
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }
}
