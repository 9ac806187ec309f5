use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::error::ClientError;
use crate::registry::ResourceRegistry;
use crate::resource::serde_helpers::null_as_default;
use crate::resource::{RemoteResource, ResourceId, ResourceType, VulnerabilityResource};

/// A source repository tracked by the index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScmResource {
    #[serde(deserialize_with = "null_as_default")]
    id: ResourceId,
    uri: Option<String>,
    name: Option<String>,
    description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    size: i64,
    scm_type: Option<String>,
    requires: Option<String>,
    #[serde(rename = "hasVulnerability", deserialize_with = "null_as_default")]
    has_vulnerability: bool,
    #[serde(rename = "vulnerabilities")]
    vulnerabilities_url: Option<String>,
    #[serde(rename = "references")]
    references_url: Option<String>,
    #[serde(rename = "releases")]
    releases_url: Option<String>,
    #[serde(rename = "files")]
    files_url: Option<String>,
    #[serde(rename = "authors")]
    authors_url: Option<String>,
    #[serde(rename = "languages")]
    languages_url: Option<String>,
    #[serde(skip)]
    vulnerability_cache: OnceCell<Vec<VulnerabilityResource>>,
}

impl ScmResource {
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn scm_type(&self) -> Option<&str> {
        self.scm_type.as_deref()
    }

    pub fn requires(&self) -> Option<&str> {
        self.requires.as_deref()
    }

    pub fn has_vulnerability(&self) -> bool {
        self.has_vulnerability
    }

    pub fn vulnerabilities_url(&self) -> Option<&str> {
        self.vulnerabilities_url.as_deref()
    }

    pub fn references_url(&self) -> Option<&str> {
        self.references_url.as_deref()
    }

    pub fn releases_url(&self) -> Option<&str> {
        self.releases_url.as_deref()
    }

    pub fn files_url(&self) -> Option<&str> {
        self.files_url.as_deref()
    }

    pub fn authors_url(&self) -> Option<&str> {
        self.authors_url.as_deref()
    }

    pub fn languages_url(&self) -> Option<&str> {
        self.languages_url.as_deref()
    }

    /// Known vulnerabilities of this repository, fetched once.
    ///
    /// Repositories flagged without vulnerabilities answer with an empty list
    /// and no request is made.
    pub async fn vulnerabilities(
        &self,
        registry: &ResourceRegistry,
    ) -> Result<&[VulnerabilityResource], ClientError> {
        if !self.has_vulnerability {
            return Ok(&[]);
        }
        if let Some(cached) = self.vulnerability_cache.get() {
            return Ok(cached);
        }

        match registry.scm_vulnerabilities(self.id).await? {
            Some(list) => {
                let list = self.vulnerability_cache.get_or_init(|| async move { list }).await;
                Ok(list.as_slice())
            }
            None => Ok(&[]),
        }
    }
}

impl RemoteResource for ScmResource {
    const RESOURCE_TYPE: ResourceType = ResourceType::Scm;

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

impl PartialEq for ScmResource {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for ScmResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.uri, &self.name) {
            (Some(uri), _) => f.write_str(uri),
            (None, Some(name)) => f.write_str(name),
            (None, None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_links_and_flag() {
        let scm: ScmResource = serde_json::from_str(
            r#"{
                "id": 8,
                "uri": "https://github.com/jquery/jquery",
                "name": "jquery",
                "scm_type": "git",
                "hasVulnerability": true,
                "vulnerabilities": "https://ossindex.net/v1.0/scm/8/vulnerabilities",
                "languages": "https://ossindex.net/v1.0/scm/8/languages"
            }"#,
        )
        .unwrap();

        assert!(scm.has_vulnerability());
        assert_eq!(scm.scm_type(), Some("git"));
        assert_eq!(
            scm.vulnerabilities_url(),
            Some("https://ossindex.net/v1.0/scm/8/vulnerabilities")
        );
        assert_eq!(scm.releases_url(), None);
    }

    #[test]
    fn displays_uri_then_name() {
        let with_uri: ScmResource =
            serde_json::from_str(r#"{"id": 1, "uri": "git://a", "name": "a"}"#).unwrap();
        let name_only: ScmResource = serde_json::from_str(r#"{"id": 2, "name": "b"}"#).unwrap();

        assert_eq!(with_uri.to_string(), "git://a");
        assert_eq!(name_only.to_string(), "b");
    }

    #[test]
    fn serializes_with_wire_names() {
        let scm: ScmResource =
            serde_json::from_str(r#"{"id": 1, "hasVulnerability": true}"#).unwrap();
        let json = serde_json::to_value(&scm).unwrap();
        assert_eq!(json["hasVulnerability"], true);
        assert_eq!(json["id"], 1);
        assert!(json.get("vulnerability_cache").is_none());
    }

    #[test]
    fn explicit_nulls_decode_as_defaults() {
        let scm: ScmResource = serde_json::from_str(
            r#"{"id": 3, "size": null, "hasVulnerability": null, "uri": null}"#,
        )
        .unwrap();

        assert_eq!(scm.size(), 0);
        assert!(!scm.has_vulnerability());
        assert_eq!(scm.uri(), None);
    }
}
