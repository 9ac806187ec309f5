//! Typed lookups against the index
//!
//! ```text
//! ┌──────────────────┐     ┌────────────────┐     ┌─────────────────┐
//! │ ResourceRegistry │────▶│ ResourceClient │────▶│ PersistentCache │
//! │ (paths, decode)  │     │ (cool-down)    │     │                 │
//! └──────────────────┘     └────────────────┘     └─────────────────┘
//! ```
//!
//! Every entity returned by a batch or derived query is also stored under its
//! single-item path, so a later [`ResourceRegistry::find_single`] for it is a
//! cache hit.
//!
//! # Modules
//!
//! - [`paths`]: request path table
//! - [`hash`]: SHA-1 digests of local files
//! - [`request`]: the v2 package request

pub mod hash;
pub mod paths;
pub mod request;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::PersistentCache;
use crate::client::{HttpTransport, ResourceClient};
use crate::config::ClientConfig;
use crate::error::{CacheError, ClientError};
use crate::resource::artifact::best_match;
use crate::resource::{
    ArtifactResource, FileResource, PackageDependency, PackageResource, RemoteResource, Resource,
    ResourceId, ResourceType, ScmResource, VulnerabilityResource,
};

pub use request::PackageRequest;

/// One entry of an artifact search payload
#[derive(Debug, Serialize)]
struct SearchTerm<'a> {
    pm: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
    version: &'a str,
}

impl<'a> From<&'a PackageDependency> for SearchTerm<'a> {
    fn from(dep: &'a PackageDependency) -> Self {
        Self {
            pm: dep.package_manager(),
            name: dep.name(),
            group: dep.group(),
            version: dep.version(),
        }
    }
}

pub struct ResourceRegistry {
    client: ResourceClient,
}

impl ResourceRegistry {
    /// Registry talking HTTP to `config.base_url`
    pub fn new(config: &ClientConfig, cache: PersistentCache) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config.request_timeout)?;
        Ok(Self::with_client(ResourceClient::new(
            Arc::new(transport),
            cache,
            config,
        )))
    }

    pub fn with_client(client: ResourceClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    /// Fetch one entity. A response that arrives as an array from the server
    /// is reduced to its first element, which is re-cached on its own.
    pub async fn find_single<R: RemoteResource>(&self, id: i64) -> Result<Option<R>, ClientError> {
        let path = paths::single(R::RESOURCE_TYPE, id);
        let Some(body) = self.client.get(&path).await? else {
            return Ok(None);
        };

        let from_network = body.is_network();
        let body = body.as_str().trim();
        if !body.starts_with('[') {
            return decode(&path, body).map(Some);
        }

        let mut values: Vec<Value> = decode(&path, body)?;
        if values.is_empty() {
            return Ok(None);
        }
        let first = values.swap_remove(0);
        if first.is_null() {
            return Ok(Some(R::missing()));
        }
        if from_network {
            self.client.cache_put(&path, &first.to_string())?;
        }
        serde_json::from_value(first)
            .map(Some)
            .map_err(|source| ClientError::MalformedResponse { path, source })
    }

    /// Fetch several entities of one type in a single request
    pub async fn find_many<R: RemoteResource>(&self, ids: &[i64]) -> Result<Vec<R>, ClientError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let path = paths::batch(R::RESOURCE_TYPE, ids);
        Ok(self.fetch_list(&path).await?.unwrap_or_default())
    }

    /// [`find_many`](Self::find_many) for a type chosen at runtime
    pub async fn find_by_ids(
        &self,
        resource_type: ResourceType,
        ids: &[i64],
    ) -> Result<Vec<Resource>, ClientError> {
        let resources = match resource_type {
            ResourceType::Artifact => wrap(self.find_many(ids).await?, Resource::Artifact),
            ResourceType::File => wrap(self.find_many(ids).await?, Resource::File),
            ResourceType::Package => wrap(self.find_many(ids).await?, Resource::Package),
            ResourceType::Scm => wrap(self.find_many(ids).await?, Resource::Scm),
            ResourceType::Vulnerability => {
                wrap(self.find_many(ids).await?, Resource::Vulnerability)
            }
        };
        Ok(resources)
    }

    pub async fn find_scm_resources(&self, ids: &[i64]) -> Result<Vec<ScmResource>, ClientError> {
        self.find_many(ids).await
    }

    /// Search artifacts matching any of `deps` with one POST
    pub async fn find_by_dependencies(
        &self,
        deps: &[PackageDependency],
    ) -> Result<Vec<ArtifactResource>, ClientError> {
        if deps.is_empty() {
            return Ok(Vec::new());
        }

        let terms: Vec<SearchTerm> = deps.iter().map(SearchTerm::from).collect();
        let payload = encode(paths::ARTIFACT_SEARCH, &terms)?;
        debug!("Searching artifacts for {} dependencies", deps.len());

        let body = self.client.post(paths::ARTIFACT_SEARCH, &payload).await?;
        let artifacts = decode_list(paths::ARTIFACT_SEARCH, body.as_str())?;
        if body.is_network() {
            self.precache(&artifacts)?;
        }
        Ok(artifacts)
    }

    pub async fn find_artifact_resource(
        &self,
        dep: &PackageDependency,
    ) -> Result<Option<ArtifactResource>, ClientError> {
        let artifacts = self.find_by_dependencies(std::slice::from_ref(dep)).await?;
        Ok(artifacts.into_iter().next())
    }

    /// Look files up by content digest. Results line up with `files`; files
    /// unknown to the index come back as missing placeholders.
    pub async fn find_file_resources<P: AsRef<Path>>(
        &self,
        files: &[P],
    ) -> Result<Vec<FileResource>, ClientError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let digests = try_join_all(files.iter().map(|f| hash::file_sha1(f.as_ref()))).await?;
        let path = paths::sha1_batch(&digests);
        Ok(self.fetch_list(&path).await?.unwrap_or_default())
    }

    pub async fn find_file_resource(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Option<FileResource>, ClientError> {
        let files = self.find_file_resources(&[path.as_ref()]).await?;
        Ok(files.into_iter().next())
    }

    /// Attach to each dependency its best matching artifact and that
    /// artifact's source repository
    pub async fn resolve_dependencies(
        &self,
        deps: &mut [PackageDependency],
    ) -> Result<(), ClientError> {
        if deps.is_empty() {
            return Ok(());
        }

        let artifacts = self.find_by_dependencies(deps).await?;
        for dep in deps.iter_mut() {
            let candidates = artifacts.iter().filter(|a| a.exists() && dep.matches(a));
            if let Some(best) = best_match(candidates) {
                debug!("Resolved {} to artifact {}", dep, best.id());
                dep.set_artifact(best.clone());
            }
        }

        let mut seen = HashSet::new();
        let scm_ids: Vec<i64> = deps
            .iter()
            .filter_map(|dep| dep.artifact().map(ArtifactResource::scm_id))
            .filter(|id| *id > 0 && seen.insert(*id))
            .collect();
        let scms = self.find_scm_resources(&scm_ids).await?;

        for dep in deps.iter_mut() {
            let Some(scm_id) = dep.artifact().map(ArtifactResource::scm_id) else {
                continue;
            };
            if let Some(scm) = scms.iter().find(|s| s.id().value() == scm_id) {
                dep.set_scm(scm.clone());
            }
        }
        Ok(())
    }

    pub fn package_request(&self) -> PackageRequest<'_> {
        PackageRequest::new(self)
    }

    pub(crate) async fn dependency_graph(
        &self,
        artifact: ResourceId,
    ) -> Result<Option<Vec<ArtifactResource>>, ClientError> {
        self.fetch_list(&paths::dependency_graph(artifact)).await
    }

    pub(crate) async fn package_artifacts(
        &self,
        package: ResourceId,
    ) -> Result<Option<Vec<ArtifactResource>>, ClientError> {
        self.fetch_list(&paths::package_artifacts(package)).await
    }

    pub(crate) async fn scm_vulnerabilities(
        &self,
        scm: ResourceId,
    ) -> Result<Option<Vec<VulnerabilityResource>>, ClientError> {
        self.fetch_list(&paths::scm_vulnerabilities(scm)).await
    }

    pub fn commit(&self) -> Result<(), CacheError> {
        self.client.commit()
    }

    pub fn close(self) -> Result<(), CacheError> {
        self.client.close()
    }

    /// GET an array of entities. Entities fresh from the server are
    /// pre-cached; cached bodies are not re-stored, so their age is kept.
    /// `None` when the server answered with a non-success status.
    async fn fetch_list<R: RemoteResource>(&self, path: &str) -> Result<Option<Vec<R>>, ClientError> {
        let Some(body) = self.client.get_array(path).await? else {
            return Ok(None);
        };
        let resources = decode_list(path, body.as_str())?;
        if body.is_network() {
            self.precache(&resources)?;
        }
        Ok(Some(resources))
    }

    fn precache<R: RemoteResource>(&self, resources: &[R]) -> Result<(), ClientError> {
        for resource in resources.iter().filter(|r| r.exists()) {
            let path = paths::single(R::RESOURCE_TYPE, resource.id());
            let json = encode(&path, resource)?;
            self.client.cache_put(&path, &json)?;
        }
        Ok(())
    }
}

fn decode<T: serde::de::DeserializeOwned>(path: &str, body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|source| ClientError::MalformedResponse {
        path: path.to_string(),
        source,
    })
}

pub(crate) fn encode<T: Serialize + ?Sized>(path: &str, value: &T) -> Result<String, ClientError> {
    serde_json::to_string(value).map_err(|source| ClientError::Encode {
        path: path.to_string(),
        source,
    })
}

/// `null` slots become missing placeholders so positions match the request
fn decode_list<R: RemoteResource>(path: &str, body: &str) -> Result<Vec<R>, ClientError> {
    let slots: Vec<Option<R>> = decode(path, body)?;
    Ok(slots
        .into_iter()
        .map(|slot| slot.unwrap_or_else(R::missing))
        .collect())
}

fn wrap<R>(resources: Vec<R>, variant: fn(R) -> Resource) -> Vec<Resource> {
    resources.into_iter().map(variant).collect()
}
