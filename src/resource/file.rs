use serde::{Deserialize, Serialize};

use crate::resource::serde_helpers::null_as_default;
use crate::resource::{RemoteResource, ResourceId, ResourceType};

/// A file known to the index, looked up by its SHA-1 digest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileResource {
    #[serde(deserialize_with = "null_as_default")]
    id: ResourceId,
    name: Option<String>,
}

impl FileResource {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Replace the name reported by the server, e.g. with the local path
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }
}

impl RemoteResource for FileResource {
    const RESOURCE_TYPE: ResourceType = ResourceType::File;

    fn id(&self) -> ResourceId {
        self.id
    }

    fn from_id(id: ResourceId) -> Self {
        Self { id, name: None }
    }
}

impl PartialEq for FileResource {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
