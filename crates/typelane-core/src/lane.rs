//! Race lanes.
//!
//! A race has exactly [`LANE_COUNT`] lanes. On the wire a lane is a 1-based
//! `u8`; in memory it indexes a fixed-size progress board. [`Lane`] can only
//! be constructed from a valid wire value, so holding one is proof the index
//! is in range.

/// Number of lanes in a race.
pub const LANE_COUNT: usize = 4;

/// One of the four fixed race lanes.
///
/// Wire representation is 1-based (`1..=4`); `0` is reserved so that a
/// zeroed frame header never aliases a real lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lane(u8);

impl Lane {
    /// Parse a lane from its wire value. `None` if outside `1..=4`.
    #[must_use]
    pub fn from_wire(value: u8) -> Option<Self> {
        (1..=LANE_COUNT as u8).contains(&value).then_some(Self(value))
    }

    /// Lane by zero-based board index. `None` if `index >= LANE_COUNT`.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        (index < LANE_COUNT).then(|| Self(index as u8 + 1))
    }

    /// Wire value (1-based).
    #[must_use]
    pub fn wire(self) -> u8 {
        self.0
    }

    /// Zero-based index into a per-lane board.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0) - 1
    }

    /// The first lane (wire value 1).
    #[must_use]
    pub fn first() -> Self {
        Self(1)
    }

    /// All lanes in board order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=LANE_COUNT as u8).map(Self)
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lane {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_range_is_one_through_four() {
        assert!(Lane::from_wire(0).is_none());
        assert!(Lane::from_wire(5).is_none());
        for value in 1..=4u8 {
            let lane = Lane::from_wire(value).unwrap();
            assert_eq!(lane.wire(), value);
            assert_eq!(lane.index(), usize::from(value) - 1);
        }
    }

    #[test]
    fn index_round_trips() {
        for index in 0..LANE_COUNT {
            assert_eq!(Lane::from_index(index).unwrap().index(), index);
        }
        assert!(Lane::from_index(LANE_COUNT).is_none());
    }

    #[test]
    fn all_covers_every_lane_once() {
        let lanes: Vec<_> = Lane::all().collect();
        assert_eq!(lanes.len(), LANE_COUNT);
        assert_eq!(lanes[0].wire(), 1);
        assert_eq!(lanes[3].wire(), 4);
    }
}
