// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Wire types of the PowerDNS Authoritative REST API.
//!
//! Field names follow the backend's JSON exactly (snake_case). Optional
//! fields are omitted from request bodies when unset so a PATCH only
//! touches what the caller filled in.

use serde::{Deserialize, Serialize};

/// Changetype for record set patches: upsert.
pub const CHANGETYPE_REPLACE: &str = "REPLACE";

/// Changetype for record set patches: removal.
pub const CHANGETYPE_DELETE: &str = "DELETE";

/// Server description returned by `GET /servers/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Server {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// `authoritative` or `recursor`; the operator requires the former.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daemon_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Zone object as stored by the backend.
///
/// Also used as the create/patch payload; absent fields are left to the
/// backend's defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Native, Master, Slave, Producer or Consumer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notified_serial: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_serial: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub masters: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnssec: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub soa_edit_api: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,

    /// Canonical nameserver names; only meaningful on zone creation, the
    /// backend materializes them into the NS record set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nameservers: Option<Vec<String>>,
}

/// One record value inside a record set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub content: String,

    #[serde(default)]
    pub disabled: bool,
}

/// Operator-attributed comment on a record set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<u64>,
}

/// A record set: (name, type) with TTL, values and comments.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RRset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub rtype: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,

    /// REPLACE or DELETE; only set on patch payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changetype: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<Record>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
}

/// Body of a record set PATCH/DELETE request.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RRsetsPayload {
    pub rrsets: Vec<RRset>,
}
