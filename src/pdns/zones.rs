// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone operations against the PowerDNS API.

use reqwest::Method;
use tracing::debug;

use super::types::Zone;
use super::{make_canonical, PdnsClient, PdnsError};

/// Zones capability set: get, add, change and delete zones on one server.
pub struct ZonesApi<'a> {
    pub(crate) client: &'a PdnsClient,
}

impl ZonesApi<'_> {
    fn zone_path(&self, name: &str) -> String {
        format!(
            "/servers/{}/zones/{}",
            self.client.vhost(),
            make_canonical(name)
        )
    }

    /// Fetch a zone by name. Returns `Ok(None)` when the backend does not
    /// know the zone; transport and API failures bubble up.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-404 API error.
    pub async fn get(&self, name: &str) -> Result<Option<Zone>, PdnsError> {
        match self
            .client
            .request_json::<Zone>(Method::GET, &self.zone_path(name), None)
            .await
        {
            Ok(zone) => Ok(Some(zone)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create a zone.
    ///
    /// # Errors
    ///
    /// Returns [`PdnsError::Conflict`] when the zone already exists, or any
    /// transport/API failure.
    pub async fn add(&self, zone: &Zone) -> Result<Zone, PdnsError> {
        debug!(zone = ?zone.name, "Creating zone in PowerDNS");
        let path = format!("/servers/{}/zones", self.client.vhost());
        self.client
            .request_json(Method::POST, &path, Some(serde_json::to_value(zone)?))
            .await
    }

    /// Patch a zone's writable scalar attributes (kind, catalog,
    /// SOA-EDIT-API). Nameserver changes go through the records API.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success API status.
    pub async fn change(&self, name: &str, zone: &Zone) -> Result<(), PdnsError> {
        debug!(zone = %name, "Patching zone attributes in PowerDNS");
        self.client
            .request(
                Method::PATCH,
                &self.zone_path(name),
                Some(serde_json::to_value(zone)?),
            )
            .await?;
        Ok(())
    }

    /// Delete a zone. Callers treat [`PdnsError::NotFound`] as success
    /// since the zone may already be gone.
    ///
    /// # Errors
    ///
    /// Returns [`PdnsError::NotFound`] when absent, or any transport/API
    /// failure.
    pub async fn delete(&self, name: &str) -> Result<(), PdnsError> {
        debug!(zone = %name, "Deleting zone in PowerDNS");
        self.client
            .request(Method::DELETE, &self.zone_path(name), None)
            .await?;
        Ok(())
    }
}
