//! Package-manager scoped version parsing and ordering

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use pep508_rs::pep440_rs;

use crate::version::generic::{GenericScheme, GenericVersion};
use crate::version::maven::{MavenScheme, MavenVersion};
use crate::version::pypi::Pep440Scheme;
use crate::version::semver::SemverScheme;

/// Trait for package-manager specific version parsing
///
/// Each scheme turns a raw version string into a [`ParsedVersion`] whose
/// ordering follows that ecosystem's rules:
/// - semver: pre-release tags below the release (`1.0.0-rc.1 < 1.0.0`)
/// - PEP 440: `a < b < rc < release < post`
/// - Maven: qualifier ranking (`alpha < beta < milestone < rc < snapshot < release < sp`)
pub trait VersionScheme: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns `None` when the string is not a version under this scheme
    fn parse(&self, raw: &str) -> Option<ParsedVersion>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedVersion {
    Semver(semver::Version),
    Pep440(Box<pep440_rs::Version>),
    Maven(MavenVersion),
    Generic(GenericVersion),
}

impl ParsedVersion {
    /// Generic comes first so that, within one package manager, a string the
    /// native scheme rejected sorts below every string it accepted
    fn rank(&self) -> u8 {
        match self {
            ParsedVersion::Generic(_) => 0,
            ParsedVersion::Semver(_) => 1,
            ParsedVersion::Pep440(_) => 2,
            ParsedVersion::Maven(_) => 3,
        }
    }
}

/// Scheme rank first, then the scheme's own order
impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ParsedVersion::Semver(a), ParsedVersion::Semver(b)) => a.cmp(b),
            (ParsedVersion::Pep440(a), ParsedVersion::Pep440(b)) => a.cmp(b),
            (ParsedVersion::Maven(a), ParsedVersion::Maven(b)) => a.cmp(b),
            (ParsedVersion::Generic(a), ParsedVersion::Generic(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A version string parsed under the scheme of the package manager it came from
#[derive(Debug, Clone)]
pub struct ResourceVersion {
    package_manager: Option<String>,
    raw: String,
    parsed: ParsedVersion,
}

impl ResourceVersion {
    pub fn package_manager(&self) -> Option<&str> {
        self.package_manager.as_deref()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn parsed(&self) -> &ParsedVersion {
        &self.parsed
    }
}

impl fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for ResourceVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed.cmp(&other.parsed)
    }
}

impl PartialOrd for ResourceVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ResourceVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ResourceVersion {}

/// Lookup table from package-manager name to its version scheme
pub struct VersionSchemes {
    schemes: HashMap<String, Arc<dyn VersionScheme>>,
    fallback: Arc<dyn VersionScheme>,
}

static STANDARD: LazyLock<VersionSchemes> = LazyLock::new(VersionSchemes::default);

impl Default for VersionSchemes {
    fn default() -> Self {
        let semver: Arc<dyn VersionScheme> = Arc::new(SemverScheme);
        let pep440: Arc<dyn VersionScheme> = Arc::new(Pep440Scheme);
        let maven: Arc<dyn VersionScheme> = Arc::new(MavenScheme);

        let mut schemes = Self::empty();
        for pm in ["npm", "cargo", "crates", "nuget", "composer"] {
            schemes.register(pm, semver.clone());
        }
        for pm in ["pypi", "pip"] {
            schemes.register(pm, pep440.clone());
        }
        for pm in ["maven", "gradle"] {
            schemes.register(pm, maven.clone());
        }
        schemes
    }
}

impl VersionSchemes {
    /// Only the generic fallback, no package-manager specific rules
    pub fn empty() -> Self {
        Self {
            schemes: HashMap::new(),
            fallback: Arc::new(GenericScheme),
        }
    }

    /// Shared table with the built-in schemes
    pub fn standard() -> &'static VersionSchemes {
        &STANDARD
    }

    pub fn register(&mut self, package_manager: &str, scheme: Arc<dyn VersionScheme>) {
        self.schemes
            .insert(package_manager.to_ascii_lowercase(), scheme);
    }

    pub fn scheme_for(&self, package_manager: Option<&str>) -> &Arc<dyn VersionScheme> {
        package_manager
            .and_then(|pm| self.schemes.get(&pm.to_ascii_lowercase()))
            .unwrap_or(&self.fallback)
    }

    /// Parse `raw` under the scheme of `package_manager`, falling back to the
    /// generic scheme. Returns `None` for absent, empty or unparseable input.
    pub fn parse(&self, package_manager: Option<&str>, raw: Option<&str>) -> Option<ResourceVersion> {
        let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;

        let parsed = self
            .scheme_for(package_manager)
            .parse(raw)
            .or_else(|| self.fallback.parse(raw))?;

        Some(ResourceVersion {
            package_manager: package_manager.map(str::to_string),
            raw: raw.to_string(),
            parsed,
        })
    }

    /// Compare two raw versions of the same package manager. Unset or
    /// unparseable versions sort below any parseable one, and versions only
    /// the generic fallback could read sort below those the native scheme read.
    pub fn compare(&self, package_manager: Option<&str>, a: Option<&str>, b: Option<&str>) -> Ordering {
        self.parse(package_manager, a)
            .cmp(&self.parse(package_manager, b))
    }
}
