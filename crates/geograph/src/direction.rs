use std::fmt;

use geo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// One of the four compass directions, with north pointing towards +y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardinalDirection {
    North,
    East,
    South,
    West,
}

impl CardinalDirection {
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Stable index into four-element direction tables.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// The coordinate of `rect`'s side facing this direction.
    pub fn side_of(self, rect: &Rect<f64>) -> f64 {
        match self {
            Self::North => rect.max().y,
            Self::East => rect.max().x,
            Self::South => rect.min().y,
            Self::West => rect.min().x,
        }
    }

    /// How far `inner`'s matching side sits from `outer`'s, measured inward.
    pub fn inset(self, outer: &Rect<f64>, inner: &Rect<f64>) -> f64 {
        match self {
            Self::North | Self::East => self.side_of(outer) - self.side_of(inner),
            Self::South | Self::West => self.side_of(inner) - self.side_of(outer),
        }
    }
}

impl fmt::Display for CardinalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
        };
        write!(f, "{name}")
    }
}

/// The axis a seam separates along.
///
/// `NorthSouth` produces a northern and a southern half, `WestEast` a western
/// and an eastern half.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    NorthSouth,
    WestEast,
}

impl Alignment {
    /// The two sides produced by a split along this axis, in (a, b) order.
    #[inline]
    pub fn halves(self) -> (CardinalDirection, CardinalDirection) {
        match self {
            Self::NorthSouth => (CardinalDirection::North, CardinalDirection::South),
            Self::WestEast => (CardinalDirection::West, CardinalDirection::East),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NorthSouth => write!(f, "north-south"),
            Self::WestEast => write!(f, "west-east"),
        }
    }
}

/// Direction of `target` as seen from `base`.
///
/// Quadrants are centred on the compass points. A bearing exactly on a
/// diagonal goes to the counter-clockwise neighbor (north-west is west,
/// south-west is south, south-east is east, north-east is north), and
/// coincident points are north.
pub fn find_direction(base: Point<f64>, target: Point<f64>) -> CardinalDirection {
    if base == target { return CardinalDirection::North }

    let bearing = (target.y() - base.y()).atan2(target.x() - base.x()).to_degrees() - 90.0;
    let bearing = if bearing < 0.0 { bearing + 360.0 } else { bearing };

    match bearing {
        b if (45.0..135.0).contains(&b) => CardinalDirection::West,
        b if (135.0..225.0).contains(&b) => CardinalDirection::South,
        b if (225.0..315.0).contains(&b) => CardinalDirection::East,
        _ => CardinalDirection::North,
    }
}

/// Longer axis of a bounding box; square boxes count as west-east.
pub fn alignment_of(rect: &Rect<f64>) -> Alignment {
    if rect.height() > rect.width() { Alignment::NorthSouth } else { Alignment::WestEast }
}

/// Sides of `outer` that `inner` reaches, within `tol`.
pub fn touching_sides(outer: &Rect<f64>, inner: &Rect<f64>, tol: f64) -> Vec<CardinalDirection> {
    CardinalDirection::ALL.into_iter()
        .filter(|dir| dir.inset(outer, inner) <= tol)
        .collect()
}

/// The side of `outer` closest to `inner`; ties resolve in `ALL` order.
pub fn nearest_side(outer: &Rect<f64>, inner: &Rect<f64>) -> CardinalDirection {
    CardinalDirection::ALL.into_iter()
        .min_by(|a, b| a.inset(outer, inner).total_cmp(&b.inset(outer, inner)))
        .unwrap_or(CardinalDirection::North)
}
