//! Axial hex coordinates for the star map.
//!
//! Systems sit on a hex grid addressed by axial `(q, r)` coordinates. The
//! third cube coordinate is implied (`s = -q - r`). Distance from the map
//! center is the ring index used by map generation and intel rules.

use serde::{Deserialize, Serialize};

/// An axial hex coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hex {
    /// Axial column.
    pub q: i32,
    /// Axial row.
    pub r: i32,
}

impl Hex {
    /// The map center.
    pub const ORIGIN: Self = Self { q: 0, r: 0 };

    /// The six axial direction offsets, clockwise from east.
    pub const DIRECTIONS: [Self; 6] = [
        Self { q: 1, r: 0 },
        Self { q: 1, r: -1 },
        Self { q: 0, r: -1 },
        Self { q: -1, r: 0 },
        Self { q: -1, r: 1 },
        Self { q: 0, r: 1 },
    ];

    /// Construct a coordinate.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implied cube `s` coordinate.
    #[must_use]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Component-wise sum.
    #[must_use]
    pub const fn offset(self, other: Self) -> Self {
        Self {
            q: self.q + other.q,
            r: self.r + other.r,
        }
    }

    /// Hex distance between two coordinates.
    #[must_use]
    pub const fn distance(self, other: Self) -> u32 {
        let dq = (self.q - other.q).unsigned_abs();
        let dr = (self.r - other.r).unsigned_abs();
        let ds = (self.s() - other.s()).unsigned_abs();
        (dq + dr + ds) / 2
    }

    /// Ring index: distance from the map center.
    #[must_use]
    pub const fn ring(self) -> u32 {
        self.distance(Self::ORIGIN)
    }

    /// The six neighboring coordinates, clockwise from east.
    #[must_use]
    pub const fn neighbors(self) -> [Self; 6] {
        [
            self.offset(Self::DIRECTIONS[0]),
            self.offset(Self::DIRECTIONS[1]),
            self.offset(Self::DIRECTIONS[2]),
            self.offset(Self::DIRECTIONS[3]),
            self.offset(Self::DIRECTIONS[4]),
            self.offset(Self::DIRECTIONS[5]),
        ]
    }
}

impl core::fmt::Display for Hex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        let a = Hex::new(3, -2);
        let b = Hex::new(-1, 4);
        assert_eq!(a.distance(b), b.distance(a));
    }

    #[test]
    fn neighbors_are_at_distance_one() {
        let center = Hex::new(2, 2);
        for n in center.neighbors() {
            assert_eq!(center.distance(n), 1);
        }
    }

    #[test]
    fn ring_of_origin_is_zero() {
        assert_eq!(Hex::ORIGIN.ring(), 0);
        assert_eq!(Hex::new(0, -3).ring(), 3);
        assert_eq!(Hex::new(2, -1).ring(), 2);
    }
}
