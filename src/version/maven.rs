//! Maven version ordering
//!
//! Numeric segments compare by value. Qualifiers are ranked
//! `alpha < beta < milestone < rc < snapshot < release < sp`; unknown
//! qualifiers sort after `sp`, lexically among themselves, and below any
//! non-zero number. A missing segment, a `0` and a release qualifier
//! (`ga`, `final`, `release`) are the same position value, so `1`, `1.0` and
//! `1.0.Final` are equal.

use std::cmp::Ordering;

use crate::version::generic::{Token, tokenize};
use crate::version::scheme::{ParsedVersion, VersionScheme};

/// Ordering key of one position; declaration order is the sort order
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Segment<'a> {
    /// `alpha` (0) to `snapshot` (4)
    PreRelease(u8),
    /// Missing, zero or a release qualifier
    Release,
    ServicePack,
    Unknown(&'a str),
    /// Non-zero number as (digit count, digits)
    Number(usize, &'a str),
}

fn segment(token: Option<&Token>) -> Segment<'_> {
    match token {
        None => Segment::Release,
        Some(Token::Number(n)) if n.is_empty() => Segment::Release,
        Some(Token::Number(n)) => Segment::Number(n.len(), n),
        Some(Token::Text(q)) => match q.as_str() {
            "alpha" | "a" => Segment::PreRelease(0),
            "beta" | "b" => Segment::PreRelease(1),
            "milestone" | "m" => Segment::PreRelease(2),
            "rc" | "cr" => Segment::PreRelease(3),
            "snapshot" => Segment::PreRelease(4),
            "" | "ga" | "final" | "release" => Segment::Release,
            "sp" => Segment::ServicePack,
            other => Segment::Unknown(other),
        },
    }
}

#[derive(Debug, Clone)]
pub struct MavenVersion {
    tokens: Vec<Token>,
}

impl MavenVersion {
    pub fn parse(raw: &str) -> Option<Self> {
        let tokens = tokenize(raw);
        match tokens.first() {
            Some(Token::Number(_)) => Some(Self { tokens }),
            _ => None,
        }
    }
}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.tokens.len().max(other.tokens.len());
        (0..len)
            .map(|i| segment(self.tokens.get(i)).cmp(&segment(other.tokens.get(i))))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialEq for MavenVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MavenVersion {}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct MavenScheme;

impl VersionScheme for MavenScheme {
    fn name(&self) -> &'static str {
        "maven"
    }

    fn parse(&self, raw: &str) -> Option<ParsedVersion> {
        MavenVersion::parse(raw).map(ParsedVersion::Maven)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(raw: &str) -> MavenVersion {
        MavenVersion::parse(raw).unwrap()
    }

    #[rstest]
    #[case("1.0-alpha-1", "1.0-beta-1", Ordering::Less)]
    #[case("1.0-beta", "1.0-M1", Ordering::Less)]
    #[case("1.0-M1", "1.0-RC1", Ordering::Less)]
    #[case("1.0-RC1", "1.0-SNAPSHOT", Ordering::Less)]
    #[case("1.0-SNAPSHOT", "1.0", Ordering::Less)]
    #[case("1.0", "1.0-sp1", Ordering::Less)]
    #[case("1.0.Final", "1.0", Ordering::Equal)]
    #[case("1.0", "1.0.0", Ordering::Equal)]
    #[case("1.0-ga", "1.0.final", Ordering::Equal)]
    #[case("1.0-sp", "1.0-jboss", Ordering::Less)]
    #[case("3.4", "3.10", Ordering::Less)]
    #[case("1.7.12", "1.7.2", Ordering::Greater)]
    #[case("1.0.1", "1.0-sp", Ordering::Greater)]
    #[case("1-sp", "1.0", Ordering::Greater)]
    #[case("1-sp", "1", Ordering::Greater)]
    #[case("1.0-jboss", "1.1", Ordering::Less)]
    fn orders_maven_versions(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(v(a).cmp(&v(b)), expected);
        assert_eq!(v(b).cmp(&v(a)), expected.reverse());
    }

    #[test]
    fn version_must_start_with_a_number() {
        assert_eq!(MavenVersion::parse("SNAPSHOT"), None);
        assert_eq!(MavenVersion::parse(""), None);
    }
}
