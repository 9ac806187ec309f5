use semver::Version;

use crate::version::scheme::{ParsedVersion, VersionScheme};

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Handles partial versions like "1" or "1.2" by padding with zeros, and strips
/// a leading `v`.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "v1.2.3" -> Version(1, 2, 3)
pub fn parse_version(version: &str) -> Option<Version> {
    let version = version.trim();
    let version = version.strip_prefix('v').unwrap_or(version);
    let parts: Vec<&str> = version.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// Semantic versioning, used by npm, Cargo, NuGet and Composer
pub struct SemverScheme;

impl VersionScheme for SemverScheme {
    fn name(&self) -> &'static str {
        "semver"
    }

    fn parse(&self, raw: &str) -> Option<ParsedVersion> {
        parse_version(raw).map(ParsedVersion::Semver)
    }
}
