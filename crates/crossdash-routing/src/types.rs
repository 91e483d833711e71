//! Route request and result types.

use std::fmt;

use crossdash_core::{BoundingRegion, Coordinate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelMode::Driving => write!(f, "driving"),
            TravelMode::Walking => write!(f, "walking"),
            TravelMode::Bicycling => write!(f, "bicycling"),
            TravelMode::Transit => write!(f, "transit"),
        }
    }
}

/// One routing question: how to get from `origin` to `destination`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub mode: TravelMode,
}

impl RouteRequest {
    #[must_use]
    pub fn driving(origin: Coordinate, destination: Coordinate) -> Self {
        Self {
            origin,
            destination,
            mode: TravelMode::Driving,
        }
    }
}

/// A single manoeuvre of a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSegment {
    pub start: Coordinate,
    pub end: Coordinate,
    pub distance_meters: u64,
    pub duration_secs: u64,
    /// Provider-formatted instruction (may contain HTML markup).
    pub instruction: Option<String>,
}

impl RouteSegment {
    /// The instruction with markup tags removed and whitespace collapsed.
    #[must_use]
    pub fn plain_instruction(&self) -> Option<String> {
        let raw = self.instruction.as_deref()?;
        let mut text = String::with_capacity(raw.len());
        let mut in_tag = false;
        for c in raw.chars() {
            match c {
                '<' => {
                    in_tag = true;
                    text.push(' ');
                }
                '>' => in_tag = false,
                _ if !in_tag => text.push(c),
                _ => {}
            }
        }
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!collapsed.is_empty()).then_some(collapsed)
    }
}

/// Ordered segments from origin to destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePath {
    pub summary: Option<String>,
    pub segments: Vec<RouteSegment>,
}

impl RoutePath {
    /// Every segment start and end point, in path order.
    pub fn waypoints(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.segments.iter().flat_map(|s| [s.start, s.end])
    }

    #[must_use]
    pub fn distance_meters(&self) -> u64 {
        self.segments.iter().map(|s| s.distance_meters).sum()
    }

    #[must_use]
    pub fn duration_secs(&self) -> u64 {
        self.segments.iter().map(|s| s.duration_secs).sum()
    }
}

/// A computed path plus the region that frames all of it.
///
/// Only authoritative for the invocation that produced it: traffic may
/// change the path on the next computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub path: RoutePath,
    pub bounds: BoundingRegion,
}
