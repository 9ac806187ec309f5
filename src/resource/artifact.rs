use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::error;

use crate::error::ClientError;
use crate::registry::ResourceRegistry;
use crate::resource::serde_helpers::null_as_default;
use crate::resource::{PackageResource, RemoteResource, ResourceId, ResourceType};
use crate::version::{ResourceVersion, VersionSchemes};

static NAME_WITH_TRIPLE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)-[0-9]+\.[0-9]+\.[0-9]+").expect("valid regex"));
static NAME_WITH_DOUBLE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)-[0-9]+\.[0-9]+").expect("valid regex"));

/// A released, versioned build of a package
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactResource {
    #[serde(deserialize_with = "null_as_default")]
    id: ResourceId,
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
    package_manager: Option<String>,
    /// URI of the source repository
    scm: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    scm_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    package_id: i64,
    url: Option<String>,
    details: Option<String>,
    dependencies: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    search: Vec<String>,
    #[serde(skip)]
    dependency_graph: OnceCell<Vec<ArtifactResource>>,
    #[serde(skip)]
    package: OnceCell<PackageResource>,
}

impl ArtifactResource {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn version_string(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn package_manager(&self) -> Option<&str> {
        self.package_manager.as_deref()
    }

    pub fn scm_uri(&self) -> Option<&str> {
        self.scm.as_deref()
    }

    pub fn scm_id(&self) -> i64 {
        self.scm_id
    }

    pub fn package_id(&self) -> i64 {
        self.package_id
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn details_url(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn dependencies_url(&self) -> Option<&str> {
        self.dependencies.as_deref()
    }

    /// Terms the server matched this artifact on
    pub fn search_terms(&self) -> &[String] {
        &self.search
    }

    /// Artifact name without its version suffix (`slf4j-api-1.7.12` -> `slf4j-api`)
    pub fn package_name(&self) -> String {
        let Some(name) = self.name.as_deref() else {
            return String::new();
        };

        if let Some(version) = self.version.as_deref().filter(|v| !v.is_empty())
            && let Some(index) = name.rfind(version)
            && index > 0
        {
            return name[..index].trim_end_matches('-').to_string();
        }

        [&NAME_WITH_TRIPLE_VERSION, &NAME_WITH_DOUBLE_VERSION]
            .into_iter()
            .find_map(|pattern| pattern.captures(name))
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| name.to_string())
    }

    /// Version parsed under the rules of the artifact's package manager
    pub fn version(&self) -> Option<ResourceVersion> {
        VersionSchemes::standard().parse(self.package_manager(), self.version_string())
    }

    /// Compare by version; artifacts without a usable version sort lowest
    pub fn compare_versions(&self, other: &Self) -> Ordering {
        self.version().cmp(&other.version())
    }

    /// Transitive dependencies as computed by the server. Failures are logged
    /// and yield `None`.
    pub async fn dependency_graph(&self, registry: &ResourceRegistry) -> Option<&[ArtifactResource]> {
        if let Some(graph) = self.dependency_graph.get() {
            return Some(graph);
        }

        match registry.dependency_graph(self.id).await {
            Ok(Some(graph)) => {
                let graph = self.dependency_graph.get_or_init(|| async move { graph }).await;
                Some(graph.as_slice())
            }
            Ok(None) => None,
            Err(e) => {
                error!("Failed to fetch dependency graph of artifact {}: {}", self.id, e);
                None
            }
        }
    }

    /// The package this artifact belongs to, `None` when it has none
    pub async fn package(
        &self,
        registry: &ResourceRegistry,
    ) -> Result<Option<&PackageResource>, ClientError> {
        if self.package_id <= 0 {
            return Ok(None);
        }
        if let Some(package) = self.package.get() {
            return Ok(Some(package));
        }

        match registry.find_single::<PackageResource>(self.package_id).await? {
            Some(package) => Ok(Some(self.package.get_or_init(|| async move { package }).await)),
            None => Ok(None),
        }
    }
}

impl RemoteResource for ArtifactResource {
    const RESOURCE_TYPE: ResourceType = ResourceType::Artifact;

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

impl PartialEq for ArtifactResource {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Sort so the highest version comes first; artifacts without a usable
/// version end up last.
pub fn rank_best_first(artifacts: &mut [ArtifactResource]) {
    artifacts.sort_by_cached_key(|artifact| std::cmp::Reverse(artifact.version()));
}

/// Artifact with the highest version, preferring any versioned artifact over
/// an unversioned one
pub fn best_match<'a>(
    artifacts: impl IntoIterator<Item = &'a ArtifactResource>,
) -> Option<&'a ArtifactResource> {
    artifacts
        .into_iter()
        .map(|artifact| (artifact.version(), artifact))
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, artifact)| artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn artifact(name: &str, version: Option<&str>, pm: &str) -> ArtifactResource {
        let json = serde_json::json!({
            "id": 1,
            "name": name,
            "version": version,
            "package_manager": pm,
        });
        serde_json::from_value(json).unwrap()
    }

    #[rstest]
    #[case("slf4j-api-1.7.12", Some("1.7.12"), "slf4j-api")]
    #[case("async-1.5.0", Some("1.5.0"), "async")]
    #[case("commons-lang3-3.4", Some("3.4"), "commons-lang3")]
    #[case("java-semver--0.9.0", Some("0.9.0"), "java-semver")]
    #[case("left-pad-1.1.3", None, "left-pad")]
    #[case("jquery-3.1", Some("unrelated"), "jquery")]
    #[case("lodash", Some("4.17.21"), "lodash")]
    #[case("4.17.21", Some("4.17.21"), "4.17.21")]
    fn strips_version_suffix_from_name(
        #[case] name: &str,
        #[case] version: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(artifact(name, version, "npm").package_name(), expected);
    }

    #[test]
    fn parses_version_under_its_package_manager() {
        let a = artifact("slf4j-api-1.7.2", Some("1.7.2"), "maven");
        let b = artifact("slf4j-api-1.7.12", Some("1.7.12"), "maven");

        assert_eq!(a.version().unwrap().package_manager(), Some("maven"));
        assert_eq!(a.compare_versions(&b), Ordering::Less);
    }

    #[test]
    fn unversioned_artifacts_rank_last() {
        let mut artifacts = vec![
            artifact("async", None, "npm"),
            artifact("async-1.2.0", Some("1.2.0"), "npm"),
            artifact("async-latest", Some("latest"), "npm"),
            artifact("async-1.10.0", Some("1.10.0"), "npm"),
        ];

        rank_best_first(&mut artifacts);

        let versions: Vec<_> = artifacts.iter().map(|a| a.version_string()).collect();
        assert_eq!(versions[0], Some("1.10.0"));
        assert_eq!(versions[1], Some("1.2.0"));
        assert!(artifacts[2].version().is_none());
        assert!(artifacts[3].version().is_none());
    }

    #[test]
    fn best_match_prefers_highest_version() {
        let artifacts = [
            artifact("async", None, "npm"),
            artifact("async-1.10.0", Some("1.10.0"), "npm"),
            artifact("async-1.9.3", Some("1.9.3"), "npm"),
        ];

        let best = best_match(&artifacts).unwrap();
        assert_eq!(best.version_string(), Some("1.10.0"));
        assert!(best_match(&[]).is_none());
    }

    #[test]
    fn explicit_nulls_decode_as_defaults() {
        let artifact: ArtifactResource = serde_json::from_str(
            r#"{
                "id": 4,
                "name": "async-1.5.0",
                "version": null,
                "scm_id": null,
                "package_id": null,
                "search": null
            }"#,
        )
        .unwrap();

        assert_eq!(artifact.id(), ResourceId::Resolved(4));
        assert_eq!(artifact.scm_id(), 0);
        assert_eq!(artifact.package_id(), 0);
        assert!(artifact.search_terms().is_empty());
        assert!(artifact.version().is_none());
    }
}
