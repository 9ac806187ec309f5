//! Identity of a remote resource
//!
//! On the wire an id is a plain integer. Positive values are real ids, `-1`
//! marks a resource that was never looked up and `-2` one the server does not
//! know about.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

const UNCHECKED: i64 = -1;
const NOT_FOUND: i64 = -2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ResourceId {
    Resolved(u64),
    #[default]
    Unchecked,
    NotFound,
}

impl ResourceId {
    pub fn value(self) -> i64 {
        match self {
            ResourceId::Resolved(id) => id as i64,
            ResourceId::Unchecked => UNCHECKED,
            ResourceId::NotFound => NOT_FOUND,
        }
    }

    pub fn is_resolved(self) -> bool {
        matches!(self, ResourceId::Resolved(_))
    }
}

impl From<i64> for ResourceId {
    fn from(value: i64) -> Self {
        match value {
            id if id > 0 => ResourceId::Resolved(id as u64),
            NOT_FOUND => ResourceId::NotFound,
            _ => ResourceId::Unchecked,
        }
    }
}

impl From<ResourceId> for i64 {
    fn from(id: ResourceId) -> Self {
        id.value()
    }
}

impl Ord for ResourceId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value().cmp(&other.value())
    }
}

impl PartialOrd for ResourceId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
