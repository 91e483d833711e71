//! Geographic primitives shared by every crate in the workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A latitude/longitude pair in decimal degrees (WGS84).
///
/// Values are validated on construction through [`Coordinate::new`]; once a
/// session has captured a coordinate it is never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] when latitude is outside
    /// `[-90, 90]`, longitude is outside `[-180, 180]`, or either is NaN/infinite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        let invalid = |reason| CoreError::InvalidCoordinate {
            latitude,
            longitude,
            reason,
        };

        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(invalid("not a finite number"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(invalid("latitude out of range"));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid("longitude out of range"));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Formats the coordinate as `"<lat>,<lng>"`, the form routing APIs expect.
    #[must_use]
    pub fn to_query_value(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unparseable = || CoreError::UnparseableCoordinate(s.to_owned());
        let (lat, lng) = s.split_once(',').ok_or_else(unparseable)?;
        let latitude = lat.trim().parse::<f64>().map_err(|_| unparseable())?;
        let longitude = lng.trim().parse::<f64>().map_err(|_| unparseable())?;
        Self::new(latitude, longitude)
    }
}

/// The smallest latitude/longitude rectangle covering a set of points.
///
/// Used to frame the map viewport around a computed route. Regions that
/// cross the antimeridian are not special-cased.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRegion {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl BoundingRegion {
    /// A degenerate region containing exactly one point.
    #[must_use]
    pub fn from_point(point: Coordinate) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    /// Folds every point into a single region. Returns `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut region = Self::from_point(first);
        for point in points {
            region.extend(point);
        }
        Some(region)
    }

    /// Grows the region just enough to include `point`.
    pub fn extend(&mut self, point: Coordinate) {
        self.south_west.latitude = self.south_west.latitude.min(point.latitude);
        self.south_west.longitude = self.south_west.longitude.min(point.longitude);
        self.north_east.latitude = self.north_east.latitude.max(point.latitude);
        self.north_east.longitude = self.north_east.longitude.max(point.longitude);
    }

    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate {
            latitude: (self.south_west.latitude + self.north_east.latitude) / 2.0,
            longitude: (self.south_west.longitude + self.north_east.longitude) / 2.0,
        }
    }
}
