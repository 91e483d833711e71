use async_trait::async_trait;
use crossdash_core::{BoundingRegion, Coordinate};

use crate::error::RoutingError;
use crate::types::{RoutePath, RouteRequest, RouteResult};

/// An external provider of turn-by-turn paths.
#[async_trait]
pub trait RoutingCapability: Send + Sync {
    async fn directions(&self, request: &RouteRequest) -> Result<RoutePath, RoutingError>;
}

/// Computes a driving route and the region that frames it.
///
/// Every segment start and end point is folded into the bounding region.
/// Each call hits the provider again; results are never cached.
///
/// # Errors
///
/// - [`RoutingError::NoRouteFound`] if the provider has no route or returns
///   a path without segments.
/// - Any provider-side [`RoutingError`] from the capability.
pub async fn compute_route(
    capability: &dyn RoutingCapability,
    origin: Coordinate,
    destination: Coordinate,
) -> Result<RouteResult, RoutingError> {
    let request = RouteRequest::driving(origin, destination);
    let path = capability.directions(&request).await?;

    let Some(bounds) = BoundingRegion::from_points(path.waypoints()) else {
        return Err(RoutingError::NoRouteFound {
            status: "EMPTY_PATH".to_owned(),
        });
    };

    tracing::debug!(
        %origin,
        %destination,
        segments = path.segments.len(),
        distance_meters = path.distance_meters(),
        "route computed"
    );
    Ok(RouteResult { path, bounds })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::types::{RouteSegment, TravelMode};

    struct ScriptedCapability {
        path: RoutePath,
        seen: Mutex<Vec<RouteRequest>>,
    }

    #[async_trait]
    impl RoutingCapability for ScriptedCapability {
        async fn directions(&self, request: &RouteRequest) -> Result<RoutePath, RoutingError> {
            self.seen.lock().unwrap().push(*request);
            Ok(self.path.clone())
        }
    }

    fn coord(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).unwrap()
    }

    fn step(start: Coordinate, end: Coordinate) -> RouteSegment {
        RouteSegment {
            start,
            end,
            distance_meters: 500,
            duration_secs: 60,
            instruction: None,
        }
    }

    #[tokio::test]
    async fn bounds_cover_all_segment_endpoints() {
        let capability = ScriptedCapability {
            path: RoutePath {
                summary: Some("Broadway".to_owned()),
                segments: vec![
                    step(coord(40.71, -74.00), coord(40.73, -73.99)),
                    step(coord(40.73, -73.99), coord(40.70, -73.95)),
                ],
            },
            seen: Mutex::new(Vec::new()),
        };

        let result = compute_route(&capability, coord(40.71, -74.00), coord(40.70, -73.95))
            .await
            .unwrap();

        assert_eq!(result.bounds.south_west, coord(40.70, -74.00));
        assert_eq!(result.bounds.north_east, coord(40.73, -73.95));

        let seen = capability.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].mode, TravelMode::Driving);
        assert_eq!(seen[0].destination, coord(40.70, -73.95));
    }

    #[tokio::test]
    async fn empty_path_is_no_route() {
        let capability = ScriptedCapability {
            path: RoutePath {
                summary: None,
                segments: Vec::new(),
            },
            seen: Mutex::new(Vec::new()),
        };

        let err = compute_route(&capability, coord(0.0, 0.0), coord(1.0, 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, RoutingError::NoRouteFound { .. }));
    }
}
