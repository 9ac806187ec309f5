//! Entities served by the remote index
//!
//! # Modules
//!
//! - [`id`]: three-state resource identity
//! - [`artifact`], [`file`], [`package`], [`scm`], [`vulnerability`]: entity types
//! - [`dependency`]: a package reference found in a project, the input of artifact searches
//! - [`descriptor`]: request and response bodies of the package request

pub mod artifact;
pub mod dependency;
pub mod descriptor;
pub mod file;
pub mod id;
pub mod package;
pub mod scm;
mod serde_helpers;
pub mod vulnerability;

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use artifact::ArtifactResource;
pub use dependency::{FilePosition, PackageDependency};
pub use descriptor::{PackageDescriptor, VulnerabilityDescriptor};
pub use file::FileResource;
pub use id::ResourceId;
pub use package::PackageResource;
pub use scm::ScmResource;
pub use vulnerability::VulnerabilityResource;

/// Kind of entity, which also names its path segment on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Artifact,
    File,
    Package,
    Scm,
    Vulnerability,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Artifact => "artifact",
            ResourceType::File => "file",
            ResourceType::Package => "package",
            ResourceType::Scm => "scm",
            ResourceType::Vulnerability => "vulnerability",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common behaviour of every entity fetched from the index
///
/// Entities are hydrated by deserialization. A value built with
/// [`with_id`](RemoteResource::with_id) only carries its id until fetched.
pub trait RemoteResource: Serialize + DeserializeOwned + Send + Sync + Sized {
    const RESOURCE_TYPE: ResourceType;

    fn id(&self) -> ResourceId;

    fn from_id(id: ResourceId) -> Self;

    fn with_id(id: i64) -> Self {
        Self::from_id(ResourceId::from(id))
    }

    /// Placeholder for an entry the server reported as unknown
    fn missing() -> Self {
        Self::from_id(ResourceId::NotFound)
    }

    fn exists(&self) -> bool {
        self.id().is_resolved()
    }
}

/// Any entity, for lookups where the type is only known at runtime
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Artifact(ArtifactResource),
    File(FileResource),
    Package(PackageResource),
    Scm(ScmResource),
    Vulnerability(VulnerabilityResource),
}

impl Resource {
    pub fn id(&self) -> ResourceId {
        match self {
            Resource::Artifact(r) => r.id(),
            Resource::File(r) => r.id(),
            Resource::Package(r) => r.id(),
            Resource::Scm(r) => r.id(),
            Resource::Vulnerability(r) => r.id(),
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        match self {
            Resource::Artifact(_) => ResourceType::Artifact,
            Resource::File(_) => ResourceType::File,
            Resource::Package(_) => ResourceType::Package,
            Resource::Scm(_) => ResourceType::Scm,
            Resource::Vulnerability(_) => ResourceType::Vulnerability,
        }
    }

    pub fn exists(&self) -> bool {
        self.id().is_resolved()
    }
}
