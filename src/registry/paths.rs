//! Request paths of the index API

use std::fmt::Display;

use crate::resource::{ResourceId, ResourceType};

const API_PREFIX: &str = "/v1.0";

pub const ARTIFACT_SEARCH: &str = "/v1.0/search/artifact/";
pub const PACKAGE_REQUEST: &str = "/v2.0/package";

/// Query for one entity, also the key its pre-cached copy is stored under
pub fn single(resource_type: ResourceType, id: impl Display) -> String {
    format!("{}/{}/{}", API_PREFIX, resource_type, id)
}

/// Query for several entities of one type in a single request
pub fn batch<T: Display>(resource_type: ResourceType, ids: &[T]) -> String {
    format!("{}/{}/{}", API_PREFIX, resource_type, join(ids))
}

/// Files looked up by SHA-1 digest
pub fn sha1_batch(digests: &[String]) -> String {
    format!("{}/sha1/{}", API_PREFIX, join(digests))
}

pub fn dependency_graph(artifact: ResourceId) -> String {
    format!("{}/dependency_graph", single(ResourceType::Artifact, artifact))
}

pub fn package_artifacts(package: ResourceId) -> String {
    format!("{}/artifacts", single(ResourceType::Package, package))
}

pub fn scm_vulnerabilities(scm: ResourceId) -> String {
    format!("{}/vulnerabilities", single(ResourceType::Scm, scm))
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
