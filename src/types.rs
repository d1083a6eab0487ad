use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Cost of a link or a path.
///
/// Every finite cost orders before `Unreachable`. Addition saturates to
/// `Unreachable` instead of wrapping, so an overflowing sum is never taken
/// for a large finite cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cost {
    Finite(u32),
    #[default]
    Unreachable,
}

impl Cost {
    pub const ZERO: Cost = Cost::Finite(0);

    pub fn is_finite(&self) -> bool {
        matches!(self, Cost::Finite(_))
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Cost::Unreachable)
    }

    pub fn value(&self) -> Option<u32> {
        match self {
            Cost::Finite(value) => Some(*value),
            Cost::Unreachable => None,
        }
    }
}

impl From<u32> for Cost {
    fn from(value: u32) -> Self {
        Cost::Finite(value)
    }
}

impl From<Option<u32>> for Cost {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Cost::Unreachable, Cost::Finite)
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, other: Cost) -> Cost {
        match (self, other) {
            (Cost::Finite(a), Cost::Finite(b)) => a.checked_add(b).into(),
            _ => Cost::Unreachable,
        }
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cost::Finite(value) => write!(f, "{}", value),
            Cost::Unreachable => write!(f, "∞"),
        }
    }
}
