//! Package references found in a project, the input of artifact searches

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::ClientError;
use crate::registry::ResourceRegistry;
use crate::resource::{ArtifactResource, ScmResource, VulnerabilityResource};

/// Where a dependency was declared in its source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilePosition {
    pub line: u32,
    pub offset: u32,
    pub length: u32,
}

impl FilePosition {
    pub fn new(line: u32, offset: u32, length: u32) -> Self {
        Self {
            line,
            offset,
            length,
        }
    }
}

/// A `(package manager, group, name, version)` reference plus whatever the
/// index resolved it to.
///
/// Two dependencies are equal when package manager, name and version match;
/// group, position and resolution state are ignored.
#[derive(Debug, Clone)]
pub struct PackageDependency {
    package_manager: String,
    group: Option<String>,
    name: String,
    version: String,
    position: Option<FilePosition>,
    optional: bool,
    root: bool,
    artifact: Option<ArtifactResource>,
    scm: Option<ScmResource>,
    parent: Option<Arc<PackageDependency>>,
}

impl PackageDependency {
    pub fn new(
        package_manager: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            package_manager: package_manager.into(),
            group: None,
            name: name.into(),
            version: version.into(),
            position: None,
            optional: false,
            root: false,
            artifact: None,
            scm: None,
            parent: None,
        }
    }

    /// Maven style coordinates with a group id
    pub fn with_group(
        package_manager: impl Into<String>,
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: Some(group.into()),
            ..Self::new(package_manager, name, version)
        }
    }

    pub fn at(mut self, position: FilePosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_parent(mut self, parent: Arc<PackageDependency>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn package_manager(&self) -> &str {
        &self.package_manager
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn position(&self) -> Option<FilePosition> {
        self.position
    }

    pub fn line(&self) -> u32 {
        self.position.map_or(0, |p| p.line)
    }

    pub fn offset(&self) -> u32 {
        self.position.map_or(0, |p| p.offset)
    }

    pub fn length(&self) -> u32 {
        self.position.map_or(0, |p| p.length)
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn set_optional(&mut self, optional: bool) {
        self.optional = optional;
    }

    pub fn is_root(&self) -> bool {
        self.root
    }

    pub fn set_root(&mut self, root: bool) {
        self.root = root;
    }

    pub fn parent(&self) -> Option<&Arc<PackageDependency>> {
        self.parent.as_ref()
    }

    pub fn artifact(&self) -> Option<&ArtifactResource> {
        self.artifact.as_ref()
    }

    pub fn set_artifact(&mut self, artifact: ArtifactResource) {
        self.artifact = Some(artifact);
    }

    pub fn scm(&self) -> Option<&ScmResource> {
        self.scm.as_ref()
    }

    pub fn set_scm(&mut self, scm: ScmResource) {
        self.scm = Some(scm);
    }

    /// `group:name:version`, with an empty group when there is none
    pub fn id(&self) -> String {
        format!(
            "{}:{}:{}",
            self.group.as_deref().unwrap_or_default(),
            self.name,
            self.version
        )
    }

    pub fn description(&self) -> &str {
        self.artifact
            .as_ref()
            .and_then(|a| a.description())
            .unwrap_or("unknown")
    }

    /// Whether `artifact` is a release of this dependency's package
    pub fn matches(&self, artifact: &ArtifactResource) -> bool {
        let same_manager = artifact
            .package_manager()
            .is_some_and(|pm| pm.eq_ignore_ascii_case(&self.package_manager));
        if !same_manager {
            return false;
        }

        artifact
            .search_terms()
            .iter()
            .any(|term| term == &self.name)
            || artifact.package_name() == self.name
    }

    /// Vulnerabilities of the resolved source repository, empty while unresolved
    pub async fn vulnerabilities(
        &self,
        registry: &ResourceRegistry,
    ) -> Result<&[VulnerabilityResource], ClientError> {
        match &self.scm {
            Some(scm) => scm.vulnerabilities(registry).await,
            None => Ok(&[]),
        }
    }
}

impl PartialEq for PackageDependency {
    fn eq(&self, other: &Self) -> bool {
        self.package_manager == other.package_manager
            && self.name == other.name
            && self.version == other.version
    }
}

impl Eq for PackageDependency {}

impl Hash for PackageDependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.package_manager.hash(state);
        self.name.hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for PackageDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.package_manager, self.name, self.version)
    }
}
