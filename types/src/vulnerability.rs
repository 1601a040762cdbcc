//! Decoded response shapes for the EUVD API.
//!
//! Decoding is lenient: absent fields take their default, unknown fields are
//! ignored, and an explicit `null` decodes like an absent field. Field names
//! follow the API's wire names on both decode and encode, so re-serialized
//! values look like the service's own JSON.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Treat `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductName {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorName {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnisaProductInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub product: ProductName,
    #[serde(deserialize_with = "null_as_default")]
    pub product_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnisaVendorInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub vendor: VendorName,
}

/// The common record returned by the list endpoints and by text search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VulnerabilitySummary {
    #[serde(deserialize_with = "null_as_default")]
    pub aliases: String,
    #[serde(deserialize_with = "null_as_default")]
    pub assigner: String,
    #[serde(deserialize_with = "null_as_default")]
    pub base_score: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub base_score_vector: String,
    #[serde(deserialize_with = "null_as_default")]
    pub base_score_version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date_published: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date_updated: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub enisa_id_product: Vec<EnisaProductInfo>,
    #[serde(deserialize_with = "null_as_default")]
    pub enisa_id_vendor: Vec<EnisaVendorInfo>,
    #[serde(deserialize_with = "null_as_default")]
    pub epss: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub references: String,
}

/// `/lastvulnerabilities` element.
pub type LatestVulnerability = VulnerabilitySummary;
/// `/criticalvulnerabilities` element.
pub type CriticalVulnerability = VulnerabilitySummary;
/// `/vulnerabilities` search hit.
pub type VulnerabilityItem = VulnerabilitySummary;

/// `/exploitedvulnerabilities` element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExploitedVulnerability {
    #[serde(flatten)]
    pub summary: VulnerabilitySummary,
    #[serde(deserialize_with = "null_as_default")]
    pub exploited_since: String,
}

/// `/vulnerabilities?text=` response page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VulnerabilityQueryResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<VulnerabilityItem>,
    #[serde(deserialize_with = "null_as_default")]
    pub total: u64,
}

/// `/vulnerability?id=` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VulnerabilityById {
    #[serde(deserialize_with = "null_as_default")]
    pub assigner: String,
    #[serde(deserialize_with = "null_as_default")]
    pub base_score: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub date_published: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date_updated: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "enisa_id", deserialize_with = "null_as_default")]
    pub enisa_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub epss: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub references: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// Shape not published by the service; kept as raw JSON.
    #[serde(deserialize_with = "null_as_default")]
    pub vulnerability_advisory: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub vulnerability_product: Vec<EnisaProductInfo>,
    #[serde(deserialize_with = "null_as_default")]
    pub vulnerability_vendor: Vec<EnisaVendorInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnisaVulnWrapper {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub vulnerability: VulnerabilityById,
}

/// `/enisaid?id=` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnisaVulnerabilityById {
    #[serde(deserialize_with = "null_as_default")]
    pub aliases: String,
    #[serde(deserialize_with = "null_as_default")]
    pub assigner: String,
    #[serde(deserialize_with = "null_as_default")]
    pub base_score: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub date_published: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date_updated: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub enisa_id_advisory: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub enisa_id_product: Vec<EnisaProductInfo>,
    #[serde(deserialize_with = "null_as_default")]
    pub enisa_id_vendor: Vec<EnisaVendorInfo>,
    #[serde(deserialize_with = "null_as_default")]
    pub enisa_id_vulnerability: Vec<EnisaVulnWrapper>,
    #[serde(deserialize_with = "null_as_default")]
    pub epss: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub references: String,
}

/// ENISA record as embedded in an advisory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnisaVulnerability {
    #[serde(deserialize_with = "null_as_default")]
    pub aliases: String,
    #[serde(deserialize_with = "null_as_default")]
    pub assigner: String,
    #[serde(deserialize_with = "null_as_default")]
    pub base_score: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub base_score_vector: String,
    #[serde(deserialize_with = "null_as_default")]
    pub base_score_version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date_published: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date_updated: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub enisa_id_vendor: Vec<EnisaVendorInfo>,
    #[serde(deserialize_with = "null_as_default")]
    pub epss: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub references: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnisaAdvisoryWrapper {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub enisa_id: EnisaVulnerability,
}

/// `/advisory?id=` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdvisoryById {
    #[serde(deserialize_with = "null_as_default")]
    pub advisory_product: Vec<EnisaProductInfo>,
    #[serde(deserialize_with = "null_as_default")]
    pub aliases: String,
    #[serde(deserialize_with = "null_as_default")]
    pub base_score: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub date_published: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date_updated: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub enisa_id_advisories: Vec<EnisaAdvisoryWrapper>,
}
