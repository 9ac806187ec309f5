use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::error;

use crate::registry::ResourceRegistry;
use crate::resource::vulnerability::millis_to_datetime;
use crate::resource::serde_helpers::null_as_default;
use crate::resource::{ArtifactResource, RemoteResource, ResourceId, ResourceType};

/// A named package, grouping the artifacts released under it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageResource {
    #[serde(deserialize_with = "null_as_default")]
    id: ResourceId,
    name: Option<String>,
    description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    creation_date: i64,
    #[serde(deserialize_with = "null_as_default")]
    update_date: i64,
    #[serde(skip)]
    artifacts: OnceCell<Vec<ArtifactResource>>,
}

impl PackageResource {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn creation_date(&self) -> Option<DateTime<Utc>> {
        millis_to_datetime(self.creation_date)
    }

    pub fn update_date(&self) -> Option<DateTime<Utc>> {
        millis_to_datetime(self.update_date)
    }

    /// All artifacts of this package. Failures are logged and yield `None`.
    pub async fn artifacts(&self, registry: &ResourceRegistry) -> Option<&[ArtifactResource]> {
        if let Some(artifacts) = self.artifacts.get() {
            return Some(artifacts);
        }

        match registry.package_artifacts(self.id).await {
            Ok(Some(artifacts)) => {
                let artifacts = self.artifacts.get_or_init(|| async move { artifacts }).await;
                Some(artifacts.as_slice())
            }
            Ok(None) => None,
            Err(e) => {
                error!("Failed to fetch artifacts of package {}: {}", self.id, e);
                None
            }
        }
    }
}

impl RemoteResource for PackageResource {
    const RESOURCE_TYPE: ResourceType = ResourceType::Package;

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

/// Unnamed packages sort first, then by name and finally by id
impl Ord for PackageResource {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for PackageResource {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PackageResource {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageResource {}
