//! One-shot `resolve` and `route` commands.
//!
//! Both call a single capability directly, outside of any session, which is
//! handy for checking resolver and routing configuration.

use crossdash_core::{AppConfig, Coordinate};
use crossdash_resolver::ResolverClient;
use crossdash_routing::{compute_route, DirectionsClient, RouteResult};

/// Resolve one coordinate and print the result as pretty JSON.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the resolver call fails.
pub(crate) async fn run_resolve(config: &AppConfig, at: Coordinate) -> anyhow::Result<()> {
    let client = ResolverClient::from_config(config)?;
    let result = client.find_address(at).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Compute a driving route and print a summary (or JSON with `json`).
///
/// # Errors
///
/// Returns an error if the client cannot be built or no route is available.
pub(crate) async fn run_route(
    config: &AppConfig,
    from: Coordinate,
    to: Coordinate,
    json: bool,
) -> anyhow::Result<()> {
    let client = DirectionsClient::from_config(config)?;
    let route = compute_route(&client, from, to).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&route)?);
    } else {
        for line in route_summary(&route) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Human-readable route description: a header line, then one line per step.
pub(crate) fn route_summary(route: &RouteResult) -> Vec<String> {
    let path = &route.path;
    let km = distance_km(path.distance_meters());
    let minutes = path.duration_secs().div_ceil(60);

    let mut lines = vec![format!(
        "Route{}: {km:.1} km, {minutes} min, {} steps",
        path.summary
            .as_deref()
            .map(|s| format!(" via {s}"))
            .unwrap_or_default(),
        path.segments.len()
    )];
    for (index, segment) in path.segments.iter().enumerate() {
        let instruction = segment
            .plain_instruction()
            .unwrap_or_else(|| format!("Continue to {}", segment.end));
        lines.push(format!("  {:>2}. {instruction}", index + 1));
    }
    lines
}

#[allow(clippy::cast_precision_loss)]
fn distance_km(meters: u64) -> f64 {
    meters as f64 / 1000.0
}
