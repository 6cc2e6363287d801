use std::{fmt, str::FromStr};

use itertools::Itertools;

use crate::{
    board::Cell,
    error::{Result, UniverseError},
};

/// Neighbor counts that bring a dead cell to life (`birth`) or keep a live
/// one alive (`survive`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub birth: Vec<u8>,
    pub survive: Vec<u8>,
}

impl Rule {
    pub fn new(birth: impl IntoIterator<Item = u8>, survive: impl IntoIterator<Item = u8>) -> Self {
        Self {
            birth: birth.into_iter().sorted().dedup().collect(),
            survive: survive.into_iter().sorted().dedup().collect(),
        }
    }

    pub fn next_state(&self, cell: Cell, alive_neighbors: u8) -> Cell {
        let alive = match cell {
            Cell::Alive => self.survive.contains(&alive_neighbors),
            Cell::Dead => self.birth.contains(&alive_neighbors),
        };

        if alive { Cell::Alive } else { Cell::Dead }
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            birth: vec![3],
            survive: vec![2, 3],
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "B{}/S{}",
            self.birth.iter().join(""),
            self.survive.iter().join("")
        )
    }
}

impl FromStr for Rule {
    type Err = UniverseError;

    /// Parses `B3/S23` notation. The two halves may come in either order.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| UniverseError::InvalidRule(format!("{s:?}: {reason}"));

        let mut birth = None;
        let mut survive = None;

        for part in s.trim().split('/') {
            let mut chars = part.trim().chars();
            let slot = match chars.next().map(|c| c.to_ascii_uppercase()) {
                Some('B') => &mut birth,
                Some('S') => &mut survive,
                _ => return Err(invalid("each half must start with B or S")),
            };

            if slot.is_some() {
                return Err(invalid("duplicate half"));
            }

            let counts = chars
                .map(|c| match c.to_digit(10) {
                    Some(d) if d <= 8 => Ok(d as u8),
                    _ => Err(invalid("neighbor counts must be digits 0-8")),
                })
                .collect::<Result<Vec<_>>>()?;

            *slot = Some(counts);
        }

        match (birth, survive) {
            (Some(birth), Some(survive)) => Ok(Self::new(birth, survive)),
            _ => Err(invalid("expected both a B and an S half")),
        }
    }
}
