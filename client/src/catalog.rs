//! The fixed table of EUVD endpoints.
//!
//! | Endpoint | Route | Parameter | Shape |
//! |----------|-------|-----------|-------|
//! | [`LatestVulnerabilities`] | `/lastvulnerabilities` | - | `Vec<LatestVulnerability>` |
//! | [`CriticalVulnerabilities`] | `/criticalvulnerabilities` | - | `Vec<CriticalVulnerability>` |
//! | [`ExploitedVulnerabilities`] | `/exploitedvulnerabilities` | - | `Vec<ExploitedVulnerability>` |
//! | [`VulnerabilityLookup`] | `/vulnerability` | `id` | `VulnerabilityById` |
//! | [`EnisaLookup`] | `/enisaid` | `id` | `EnisaVulnerabilityById` |
//! | [`AdvisoryLookup`] | `/advisory` | `id` | `AdvisoryById` |
//! | [`TextSearch`] | `/vulnerabilities` | `text` | `VulnerabilityQueryResponse` |
//!
//! Each query type implements [`Query`], which ties the request path to the
//! response type it decodes into.

use euvd_types::{
    AdvisoryById, CriticalVulnerability, EnisaVulnerabilityById, ExploitedVulnerability,
    LatestVulnerability, NonEmptyString, VulnerabilityById, VulnerabilityQueryResponse,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    Latest,
    Critical,
    Exploited,
    VulnerabilityById,
    EnisaById,
    AdvisoryById,
    Search,
}

impl EndpointKind {
    pub const ALL: [Self; 7] = [
        Self::Latest,
        Self::Critical,
        Self::Exploited,
        Self::VulnerabilityById,
        Self::EnisaById,
        Self::AdvisoryById,
        Self::Search,
    ];

    #[must_use]
    pub fn descriptor(self) -> &'static EndpointDescriptor {
        &CATALOG[self as usize]
    }
}

/// Static description of one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub kind: EndpointKind,
    pub name: &'static str,
    pub route: &'static str,
    /// Query parameter carrying the operator's value, if any.
    pub param: Option<&'static str>,
    /// Name of the decoded shape, for diagnostics.
    pub shape: &'static str,
}

/// Indexed by `EndpointKind as usize`.
pub static CATALOG: [EndpointDescriptor; 7] = [
    EndpointDescriptor {
        kind: EndpointKind::Latest,
        name: "Latest Vulnerabilities",
        route: "/lastvulnerabilities",
        param: None,
        shape: "Vec<LatestVulnerability>",
    },
    EndpointDescriptor {
        kind: EndpointKind::Critical,
        name: "Critical Vulnerabilities",
        route: "/criticalvulnerabilities",
        param: None,
        shape: "Vec<CriticalVulnerability>",
    },
    EndpointDescriptor {
        kind: EndpointKind::Exploited,
        name: "Exploited Vulnerabilities",
        route: "/exploitedvulnerabilities",
        param: None,
        shape: "Vec<ExploitedVulnerability>",
    },
    EndpointDescriptor {
        kind: EndpointKind::VulnerabilityById,
        name: "Vulnerability By ID",
        route: "/vulnerability",
        param: Some("id"),
        shape: "VulnerabilityById",
    },
    EndpointDescriptor {
        kind: EndpointKind::EnisaById,
        name: "ENISA Vulnerability By ID",
        route: "/enisaid",
        param: Some("id"),
        shape: "EnisaVulnerabilityById",
    },
    EndpointDescriptor {
        kind: EndpointKind::AdvisoryById,
        name: "Advisory By ID",
        route: "/advisory",
        param: Some("id"),
        shape: "AdvisoryById",
    },
    EndpointDescriptor {
        kind: EndpointKind::Search,
        name: "Text Search",
        route: "/vulnerabilities",
        param: Some("text"),
        shape: "VulnerabilityQueryResponse",
    },
];

/// A typed request against one catalog entry.
pub trait Query {
    /// Shape the response body decodes into.
    type Response: DeserializeOwned + Serialize;

    const KIND: EndpointKind;

    /// Value for the endpoint's query parameter.
    fn param(&self) -> Option<&str> {
        None
    }

    /// Path relative to the API base URL, with the parameter percent-encoded.
    fn path(&self) -> String {
        let descriptor = Self::KIND.descriptor();
        debug_assert_eq!(
            descriptor.param.is_some(),
            self.param().is_some(),
            "{} query parameter does not match its catalog entry",
            descriptor.name
        );
        match (descriptor.param, self.param()) {
            (Some(name), Some(value)) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair(name, value)
                    .finish();
                format!("{}?{query}", descriptor.route)
            }
            _ => descriptor.route.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LatestVulnerabilities;

impl Query for LatestVulnerabilities {
    type Response = Vec<LatestVulnerability>;
    const KIND: EndpointKind = EndpointKind::Latest;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CriticalVulnerabilities;

impl Query for CriticalVulnerabilities {
    type Response = Vec<CriticalVulnerability>;
    const KIND: EndpointKind = EndpointKind::Critical;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExploitedVulnerabilities;

impl Query for ExploitedVulnerabilities {
    type Response = Vec<ExploitedVulnerability>;
    const KIND: EndpointKind = EndpointKind::Exploited;
}

/// Lookup by CVE-style identifier, e.g. `CVE-2024-0864`.
#[derive(Debug, Clone)]
pub struct VulnerabilityLookup(pub NonEmptyString);

impl Query for VulnerabilityLookup {
    type Response = VulnerabilityById;
    const KIND: EndpointKind = EndpointKind::VulnerabilityById;

    fn param(&self) -> Option<&str> {
        Some(self.0.as_str())
    }
}

/// Lookup by ENISA identifier, e.g. `EUVD-2024-45012`.
#[derive(Debug, Clone)]
pub struct EnisaLookup(pub NonEmptyString);

impl Query for EnisaLookup {
    type Response = EnisaVulnerabilityById;
    const KIND: EndpointKind = EndpointKind::EnisaById;

    fn param(&self) -> Option<&str> {
        Some(self.0.as_str())
    }
}

/// Lookup by vendor advisory identifier, e.g. `cisco-sa-ata19x-multi-RDTEqRsy`.
#[derive(Debug, Clone)]
pub struct AdvisoryLookup(pub NonEmptyString);

impl Query for AdvisoryLookup {
    type Response = AdvisoryById;
    const KIND: EndpointKind = EndpointKind::AdvisoryById;

    fn param(&self) -> Option<&str> {
        Some(self.0.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct TextSearch(pub NonEmptyString);

impl Query for TextSearch {
    type Response = VulnerabilityQueryResponse;
    const KIND: EndpointKind = EndpointKind::Search;

    fn param(&self) -> Option<&str> {
        Some(self.0.as_str())
    }
}
