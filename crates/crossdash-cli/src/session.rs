//! The interactive `run` command.
//!
//! Spawns a session against the configured capabilities, turns stdin lines
//! into reveal signals, and prints what changes in the session snapshot.

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use crossdash_core::{AppConfig, BoundingRegion, Coordinate};
use crossdash_resolver::ResolverClient;
use crossdash_routing::{DirectionsClient, RoutePath};
use crossdash_session::{
    provider_from_config, Advisory, Capabilities, FixedLocation, LocationProvider, MapView, Phase,
    RevealSignal, SessionHandle, SessionSnapshot,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Terminal stand-in for the map widget.
struct ConsoleMap;

impl MapView for ConsoleMap {
    fn center_on(&self, at: Coordinate, zoom: u8) {
        tracing::info!(center = %at, zoom, "map centred");
    }

    fn show_marker(&self, at: Coordinate) {
        println!("You are here: {at}");
    }

    fn draw_route(&self, path: &RoutePath) {
        tracing::info!(
            segments = path.segments.len(),
            distance_meters = path.distance_meters(),
            "route drawn"
        );
    }

    fn fit_bounds(&self, bounds: &BoundingRegion) {
        tracing::info!(
            center = %bounds.center(),
            south_west = %bounds.south_west,
            north_east = %bounds.north_east,
            "map fitted to route"
        );
    }
}

/// Run one session until Ctrl-C or a terminal failure.
///
/// # Errors
///
/// Returns an error if a capability cannot be built from `config`, or with
/// the user-facing message if the session fails.
pub(crate) async fn run_session(
    config: &AppConfig,
    fixed: Option<Coordinate>,
    advisory: Option<String>,
    audio: Option<String>,
) -> anyhow::Result<()> {
    let location: Arc<dyn LocationProvider> = match fixed {
        Some(at) => Arc::new(FixedLocation(at)),
        None => provider_from_config(config)?,
    };
    let caps = Capabilities {
        location,
        resolver: Arc::new(ResolverClient::from_config(config)?),
        routing: Arc::new(DirectionsClient::from_config(config)?),
        map: Arc::new(ConsoleMap),
    };

    let handle = SessionHandle::spawn(caps, Duration::from_secs(config.eta_tick_secs));
    tracing::info!(session = %handle.id(), "session spawned");

    if let Some(text) = advisory {
        let mut advisory = Advisory::new(text);
        if let Some(audio) = audio {
            advisory = advisory.with_audio(audio);
        }
        handle.reveal(RevealSignal::shown(advisory)).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut snapshots = handle.subscribe();
    let mut previous = SessionSnapshot::default();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }

            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = snapshots.borrow_and_update().clone();
                for line in describe_changes(&previous, &current) {
                    println!("{line}");
                }
                if current.phase.is_failed() {
                    handle.shutdown().await?;
                    bail!(current.error_message.unwrap_or_else(|| "session failed".to_owned()));
                }
                previous = current;
            }

            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(text) => {
                        handle.reveal(reveal_from_line(&text)).await;
                    }
                    None => stdin_open = false,
                }
            }
        }
    }

    let last = handle.shutdown().await?;
    tracing::info!(phase = %last.phase, "session finished");
    Ok(())
}

/// A blank line hides the guidance; anything else shows it.
pub(crate) fn reveal_from_line(line: &str) -> RevealSignal {
    let text = line.trim();
    if text.is_empty() {
        RevealSignal::hidden()
    } else {
        RevealSignal::shown(Advisory::new(text))
    }
}

/// Output lines for what differs between two snapshots.
pub(crate) fn describe_changes(previous: &SessionSnapshot, current: &SessionSnapshot) -> Vec<String> {
    let mut out = Vec::new();

    if previous.phase != current.phase {
        match &current.phase {
            Phase::LocatingUser => out.push("Locating you...".to_owned()),
            Phase::ResolvingLocation => out.push("Finding nearby help...".to_owned()),
            Phase::Failed(failure) => out.push(format!("Error: {}", failure.message)),
            Phase::Idle | Phase::Resolved | Phase::RouteComputed => {}
        }
    }

    if previous.address != current.address {
        if let Some(address) = &current.address {
            out.push(format!("Address: {address}"));
        }
    }

    if previous.destination != current.destination {
        if let Some(facility) = &current.destination {
            let name = facility.name.as_deref().unwrap_or("Nearest facility");
            match &facility.vicinity {
                Some(vicinity) => out.push(format!("Destination: {name}, {vicinity}")),
                None => out.push(format!("Destination: {name} {}", facility.location)),
            }
        }
    }

    if previous.eta_minutes != current.eta_minutes {
        if let Some(label) = current.eta_label() {
            out.push(label);
        }
    }

    if previous.advisory != current.advisory {
        if let Some(advisory) = &current.advisory {
            out.push("Guidance:".to_owned());
            out.extend(advisory.steps().into_iter().map(|step| format!("  - {step}")));
            if let Some(audio) = &advisory.audio {
                out.push(format!("  (audio: {audio})"));
            }
        }
    }

    if previous.route != current.route {
        if let Some(route) = &current.route {
            out.extend(crate::lookup::route_summary(route));
        }
    }

    out
}
