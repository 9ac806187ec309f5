use tracing::debug;

use crate::error::ClientError;
use crate::registry::{ResourceRegistry, encode, paths};
use crate::resource::PackageDescriptor;

/// Batch of packages to check in one v2 request
pub struct PackageRequest<'a> {
    registry: &'a ResourceRegistry,
    packages: Vec<PackageDescriptor>,
}

impl<'a> PackageRequest<'a> {
    pub(crate) fn new(registry: &'a ResourceRegistry) -> Self {
        Self {
            registry,
            packages: Vec::new(),
        }
    }

    pub fn add(&mut self, pm: &str, group: Option<&str>, name: &str, version: &str) -> &PackageDescriptor {
        self.packages
            .push(PackageDescriptor::new(pm, group, name, version));
        &self.packages[self.packages.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Send the request. An empty request answers empty without contacting
    /// the server.
    pub async fn run(self) -> Result<Vec<PackageDescriptor>, ClientError> {
        if self.packages.is_empty() {
            return Ok(Vec::new());
        }

        let payload = encode(paths::PACKAGE_REQUEST, &self.packages)?;
        debug!("Package request for {} packages", self.packages.len());

        let body = self
            .registry
            .client()
            .post(paths::PACKAGE_REQUEST, &payload)
            .await?;
        serde_json::from_str(body.as_str()).map_err(|source| ClientError::MalformedResponse {
            path: paths::PACKAGE_REQUEST.to_string(),
            source,
        })
    }
}
