//! The render boundary to the map widget.

use crossdash_core::{BoundingRegion, Coordinate};
use crossdash_routing::RoutePath;

/// Zoom level used when the map first centres on the user.
pub const DEFAULT_ZOOM: u8 = 14;

/// Imperative surface of the map widget.
///
/// Calls come from the orchestrator's event loop only, one at a time.
pub trait MapView: Send + Sync {
    fn center_on(&self, at: Coordinate, zoom: u8);

    /// Places (or moves) the user marker.
    fn show_marker(&self, at: Coordinate);

    fn draw_route(&self, path: &RoutePath);

    fn fit_bounds(&self, bounds: &BoundingRegion);
}
