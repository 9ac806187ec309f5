//! Version ordering across package-manager specific version schemes
//!
//! ```text
//! ┌──────────────────┐     ┌───────────────┐     ┌──────────────────┐
//! │  VersionSchemes  │────▶│ VersionScheme │────▶│ ResourceVersion  │
//! │ (pm -> scheme)   │     │   (parse)     │     │  (total order)   │
//! └──────────────────┘     └───────────────┘     └──────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`scheme`]: scheme trait, lookup table and the comparable [`ResourceVersion`]
//! - [`semver`]: npm / Cargo style semantic versions
//! - [`pypi`]: PEP 440 versions
//! - [`maven`]: Maven versions with qualifier ranking
//! - [`generic`]: fallback for unknown package managers

pub mod generic;
pub mod maven;
pub mod pypi;
pub mod scheme;
pub mod semver;

pub use scheme::{ParsedVersion, ResourceVersion, VersionScheme, VersionSchemes};
