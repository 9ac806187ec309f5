//! PyPI versions ordered by PEP 440

use std::str::FromStr;

use pep508_rs::pep440_rs::Version;

use crate::version::scheme::{ParsedVersion, VersionScheme};

pub struct Pep440Scheme;

impl VersionScheme for Pep440Scheme {
    fn name(&self) -> &'static str {
        "pep440"
    }

    fn parse(&self, raw: &str) -> Option<ParsedVersion> {
        Version::from_str(raw.trim())
            .ok()
            .map(|v| ParsedVersion::Pep440(Box::new(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(raw: &str) -> ParsedVersion {
        Pep440Scheme.parse(raw).unwrap()
    }

    #[rstest]
    #[case("5.0a1", "5.0b1")]
    #[case("5.0b1", "5.0rc1")]
    #[case("5.0rc1", "5.0")]
    #[case("5.0", "5.0.post1")]
    #[case("2.9", "2.10")]
    #[case("1.0.dev1", "1.0a1")]
    fn orders_by_pep440(#[case] lower: &str, #[case] higher: &str) {
        assert!(parse(lower) < parse(higher));
    }

    #[test]
    fn rejects_non_pep440_strings() {
        assert!(Pep440Scheme.parse("not a version").is_none());
    }
}
