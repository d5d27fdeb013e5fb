//! Selected spans of a document.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Half-open interval `[begin, end)` over character offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Region {
    pub begin: usize,
    pub end: usize,
}

impl Region {
    /// Build a region from two offsets in either order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            begin: a.min(b),
            end: a.max(b),
        }
    }

    /// A collapsed region, i.e. a plain cursor.
    pub fn cursor(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.begin, self.end)
    }
}

impl FromStr for Region {
    type Err = String;

    /// Parse `START:END`, or a single offset for a cursor.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let offset = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|e| format!("invalid offset {part:?}: {e}"))
        };
        match s.split_once(':') {
            Some((begin, end)) => Ok(Self::new(offset(begin)?, offset(end)?)),
            None => Ok(Self::cursor(offset(s)?)),
        }
    }
}
