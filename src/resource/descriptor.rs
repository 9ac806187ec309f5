//! Bodies of the v2 package request
//!
//! The same type is sent (coordinates only) and received back with the
//! vulnerability counts filled in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resource::serde_helpers::null_as_default;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageDescriptor {
    #[serde(skip_serializing_if = "is_zero", deserialize_with = "null_as_default")]
    id: i64,
    pm: Option<String>,
    name: Option<String>,
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    #[serde(
        rename = "vulnerability-total",
        skip_serializing_if = "is_zero",
        deserialize_with = "null_as_default"
    )]
    vulnerability_total: i64,
    #[serde(
        rename = "vulnerability-matches",
        skip_serializing_if = "is_zero",
        deserialize_with = "null_as_default"
    )]
    vulnerability_matches: i64,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    vulnerabilities: Vec<VulnerabilityDescriptor>,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

impl PackageDescriptor {
    pub fn new(pm: &str, group: Option<&str>, name: &str, version: &str) -> Self {
        Self {
            pm: Some(pm.to_string()),
            group: group.map(str::to_string),
            name: Some(name.to_string()),
            version: Some(version.to_string()),
            ..Self::default()
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn pm(&self) -> &str {
        self.pm.as_deref().unwrap_or_default()
    }

    pub fn group(&self) -> &str {
        self.group.as_deref().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or_default()
    }

    pub fn vulnerability_total(&self) -> i64 {
        self.vulnerability_total
    }

    pub fn vulnerability_matches(&self) -> i64 {
        self.vulnerability_matches
    }

    pub fn vulnerabilities(&self) -> &[VulnerabilityDescriptor] {
        &self.vulnerabilities
    }
}

impl fmt::Display for PackageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PKG: [{}] {}::{}.{} {}",
            self.id,
            self.pm(),
            self.group(),
            self.name(),
            self.version()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VulnerabilityDescriptor {
    #[serde(deserialize_with = "null_as_default")]
    id: i64,
    title: Option<String>,
    description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    versions: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    references: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    published: i64,
    #[serde(deserialize_with = "null_as_default")]
    updated: i64,
}

impl VulnerabilityDescriptor {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn references(&self) -> &[String] {
        &self.references
    }

    pub fn published(&self) -> i64 {
        self.published
    }

    pub fn updated(&self) -> i64 {
        self.updated
    }
}
