//! Driving-route computation between the user and a facility.
//!
//! [`compute_route`] asks a [`RoutingCapability`] for a path and reduces every
//! segment endpoint into the [`BoundingRegion`](crossdash_core::BoundingRegion)
//! the map is fitted to. [`DirectionsClient`] is the HTTP-backed capability.

pub mod directions;
pub mod error;
pub mod route;
pub mod types;

pub use directions::DirectionsClient;
pub use error::{RoutingError, RoutingErrorKind};
pub use route::{compute_route, RoutingCapability};
pub use types::{RoutePath, RouteRequest, RouteResult, RouteSegment, TravelMode};
