//! Fallback ordering for version strings of unknown schemes
//!
//! The string is cut on `.`, `-`, `_`, `+` and on digit/letter boundaries.
//! Numeric segments compare by value, text segments case-insensitively, and a
//! number outranks text at the same position (so `1.0` > `1.0-beta`). Missing
//! trailing segments count as zero.

use std::cmp::Ordering;

use crate::version::scheme::{ParsedVersion, VersionScheme};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Decimal digits with leading zeros removed
    Number(String),
    /// Lowercased text
    Text(String),
}

impl Token {
    fn zero() -> Self {
        Token::Number(String::new())
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Token::Number(a), Token::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Token::Number(_), Token::Text(_)) => Ordering::Greater,
            (Token::Text(_), Token::Number(_)) => Ordering::Less,
            (Token::Text(a), Token::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Split a raw version string into tokens. A leading `v` before a digit is dropped.
pub fn tokenize(raw: &str) -> Vec<Token> {
    let raw = raw.trim();
    let raw = match raw.strip_prefix(['v', 'V']) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => raw,
    };

    let mut tokens = Vec::new();
    for part in raw.split(['.', '-', '_', '+']) {
        let mut chars = part.char_indices().peekable();
        while let Some((start, c)) = chars.next() {
            let is_digit = c.is_ascii_digit();
            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if next.is_ascii_digit() != is_digit {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }

            let piece = &part[start..end];
            if is_digit {
                tokens.push(Token::Number(piece.trim_start_matches('0').to_string()));
            } else {
                tokens.push(Token::Text(piece.to_lowercase()));
            }
        }
    }
    tokens
}

#[derive(Debug, Clone)]
pub struct GenericVersion {
    tokens: Vec<Token>,
}

impl GenericVersion {
    /// Returns `None` when the string holds no digits at all.
    pub fn parse(raw: &str) -> Option<Self> {
        let tokens = tokenize(raw);
        if !tokens.iter().any(|t| matches!(t, Token::Number(_))) {
            return None;
        }
        Some(Self { tokens })
    }
}

impl Ord for GenericVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.tokens.len().max(other.tokens.len());
        let zero = Token::zero();
        for i in 0..len {
            let a = self.tokens.get(i).unwrap_or(&zero);
            let b = other.tokens.get(i).unwrap_or(&zero);
            match a.cmp(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialEq for GenericVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GenericVersion {}

impl PartialOrd for GenericVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct GenericScheme;

impl VersionScheme for GenericScheme {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn parse(&self, raw: &str) -> Option<ParsedVersion> {
        GenericVersion::parse(raw).map(ParsedVersion::Generic)
    }
}
