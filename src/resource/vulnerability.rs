use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::serde_helpers::null_as_default;
use crate::resource::{RemoteResource, ResourceId, ResourceType};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VulnerabilityResource {
    #[serde(deserialize_with = "null_as_default")]
    id: ResourceId,
    title: Option<String>,
    description: Option<String>,
    /// Affected version ranges
    #[serde(deserialize_with = "null_as_default")]
    versions: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    references: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    published: i64,
    #[serde(deserialize_with = "null_as_default")]
    updated: i64,
}

impl VulnerabilityResource {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn references(&self) -> &[String] {
        &self.references
    }

    pub fn published(&self) -> Option<DateTime<Utc>> {
        millis_to_datetime(self.published)
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        millis_to_datetime(self.updated)
    }
}

/// `0` (or less) is how the server says "unknown"
pub(crate) fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    if millis > 0 {
        DateTime::from_timestamp_millis(millis)
    } else {
        None
    }
}

impl RemoteResource for VulnerabilityResource {
    const RESOURCE_TYPE: ResourceType = ResourceType::Vulnerability;

    fn id(&self) -> ResourceId {
        self.id
    }

    fn from_id(id: ResourceId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

impl PartialEq for VulnerabilityResource {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_vulnerability_with_dates() {
        let vulnerability: VulnerabilityResource = serde_json::from_str(
            r#"{
                "id": 55,
                "title": "XSS in selector",
                "versions": ["<1.9.0"],
                "references": ["https://example.org/advisory"],
                "published": 1420070400000,
                "updated": 0
            }"#,
        )
        .unwrap();

        assert_eq!(vulnerability.id(), ResourceId::Resolved(55));
        assert_eq!(vulnerability.title(), Some("XSS in selector"));
        assert_eq!(vulnerability.versions(), ["<1.9.0".to_string()]);
        assert_eq!(
            vulnerability.published().map(|d| d.to_rfc3339()),
            Some("2015-01-01T00:00:00+00:00".to_string())
        );
        assert_eq!(vulnerability.updated(), None);
    }

    #[test]
    fn explicit_nulls_decode_as_defaults() {
        let vulnerability: VulnerabilityResource = serde_json::from_str(
            r#"{"id": 9, "versions": null, "references": null, "published": null, "updated": null}"#,
        )
        .unwrap();

        assert!(vulnerability.versions().is_empty());
        assert!(vulnerability.references().is_empty());
        assert_eq!(vulnerability.published(), None);
        assert_eq!(vulnerability.updated(), None);
    }
}
