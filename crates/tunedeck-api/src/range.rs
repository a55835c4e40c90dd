// Item range encoding: `offset:count` in URL paths and query strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const DEFAULT_OFFSET: u32 = 0;
pub const DEFAULT_COUNT: u32 = 1000;

/// A window of playlist items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub offset: u32,
    pub count: u32,
}

impl Range {
    pub const fn new(offset: u32, count: u32) -> Self {
        Range { offset, count }
    }

    /// Build a range from optional parts, filling in `0` / `1000`.
    pub fn from_parts(offset: Option<u32>, count: Option<u32>) -> Self {
        Range {
            offset: offset.unwrap_or(DEFAULT_OFFSET),
            count: count.unwrap_or(DEFAULT_COUNT),
        }
    }

    /// Exclusive end index.
    pub fn end(&self) -> u32 {
        self.offset.saturating_add(self.count)
    }

    pub fn contains(&self, index: u32) -> bool {
        index >= self.offset && index < self.end()
    }
}

impl Default for Range {
    fn default() -> Self {
        Range::new(DEFAULT_OFFSET, DEFAULT_COUNT)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.offset, self.count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid range `{0}`: expected `offset:count`")]
pub struct ParseRangeError(String);

impl FromStr for Range {
    type Err = ParseRangeError;

    /// Accepts `offset:count`, `offset:`, `:count`, `offset` or the empty
    /// string; missing parts take the defaults.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRangeError(s.to_string());
        let parse_part = |part: &str| -> Result<Option<u32>, ParseRangeError> {
            let part = part.trim();
            if part.is_empty() {
                Ok(None)
            } else {
                part.parse().map(Some).map_err(|_| err())
            }
        };

        match s.split_once(':') {
            Some((offset, count)) => Ok(Range::from_parts(parse_part(offset)?, parse_part(count)?)),
            None => Ok(Range::from_parts(parse_part(s)?, None)),
        }
    }
}

impl Serialize for Range {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Range {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
