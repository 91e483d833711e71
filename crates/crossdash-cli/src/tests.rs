use clap::Parser;
use crossdash_core::{BoundingRegion, Coordinate};
use crossdash_resolver::Facility;
use crossdash_routing::{RoutePath, RouteResult, RouteSegment};
use crossdash_session::{Advisory, Phase, RevealSignal, SessionSnapshot};

use super::*;
use crate::lookup::route_summary;
use crate::session::{describe_changes, reveal_from_line};

#[test]
fn parses_run_with_fixed_location() {
    let cli = Cli::try_parse_from(["crossdash", "run", "--lat", "40.7", "--lng", "-74.0"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Run {
            lat: Some(_),
            lng: Some(_),
            advisory: None,
            audio: None,
        }
    ));
}

#[test]
fn run_rejects_lat_without_lng() {
    assert!(Cli::try_parse_from(["crossdash", "run", "--lat", "40.7"]).is_err());
}

#[test]
fn audio_requires_advisory() {
    assert!(Cli::try_parse_from(["crossdash", "run", "--audio", "a.mp3"]).is_err());
}

#[test]
fn parses_route_coordinates() {
    let cli = Cli::try_parse_from([
        "crossdash",
        "route",
        "--from",
        "40.7128,-74.006",
        "--to",
        "-33.86,151.2",
    ])
    .expect("expected valid cli args");

    let Commands::Route { from, to, json } = cli.command else {
        panic!("expected route command");
    };
    assert_eq!(from, Coordinate::new(40.7128, -74.006).unwrap());
    assert_eq!(to, Coordinate::new(-33.86, 151.2).unwrap());
    assert!(!json);
}

#[test]
fn route_rejects_malformed_coordinate() {
    assert!(Cli::try_parse_from(["crossdash", "route", "--from", "north", "--to", "1,2"]).is_err());
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["crossdash"]).is_err());
}

#[test]
fn blank_line_hides_guidance() {
    assert_eq!(reveal_from_line("   "), RevealSignal::hidden());
    assert_eq!(
        reveal_from_line(" Stay calm \n"),
        RevealSignal::shown(Advisory::new("Stay calm"))
    );
}

fn coord(latitude: f64, longitude: f64) -> Coordinate {
    Coordinate::new(latitude, longitude).unwrap()
}

fn route() -> RouteResult {
    let path = RoutePath {
        summary: Some("I-95".to_owned()),
        segments: vec![
            RouteSegment {
                start: coord(40.0, -74.0),
                end: coord(40.5, -74.0),
                distance_meters: 1_500,
                duration_secs: 70,
                instruction: Some("Head <b>north</b>".to_owned()),
            },
            RouteSegment {
                start: coord(40.5, -74.0),
                end: coord(40.5, -73.5),
                distance_meters: 1_000,
                duration_secs: 50,
                instruction: None,
            },
        ],
    };
    let bounds = BoundingRegion::from_points(path.waypoints()).unwrap();
    RouteResult { path, bounds }
}

#[test]
fn route_summary_lists_each_step() {
    let lines = route_summary(&route());
    assert_eq!(lines[0], "Route via I-95: 2.5 km, 2 min, 2 steps");
    assert_eq!(lines[1], "   1. Head north");
    assert!(lines[2].starts_with("   2. Continue to "));
}

#[test]
fn describe_changes_reports_resolution() {
    let previous = SessionSnapshot {
        phase: Phase::ResolvingLocation,
        ..SessionSnapshot::default()
    };
    let current = SessionSnapshot {
        phase: Phase::Resolved,
        address: Some("1 Main St".to_owned()),
        eta_minutes: Some(8),
        destination: Some(Facility {
            location: coord(40.0, -73.0),
            name: Some("General".to_owned()),
            vicinity: Some("Elm St".to_owned()),
            metadata: serde_json::Map::new(),
        }),
        ..SessionSnapshot::default()
    };

    assert_eq!(
        describe_changes(&previous, &current),
        vec![
            "Address: 1 Main St".to_owned(),
            "Destination: General, Elm St".to_owned(),
            "ETA: 8 Minutes".to_owned(),
        ]
    );
}

#[test]
fn describe_changes_is_quiet_when_nothing_changed() {
    let snapshot = SessionSnapshot {
        phase: Phase::RouteComputed,
        route: Some(route()),
        ..SessionSnapshot::default()
    };
    assert!(describe_changes(&snapshot, &snapshot).is_empty());
}

#[test]
fn describe_changes_prints_guidance_steps() {
    let current = SessionSnapshot {
        advisory: Some(Advisory::new("Call for help - Check breathing").with_audio("a.mp3")),
        revealed: true,
        ..SessionSnapshot::default()
    };
    assert_eq!(
        describe_changes(&SessionSnapshot::default(), &current),
        vec![
            "Guidance:".to_owned(),
            "  - Call for help".to_owned(),
            "  - Check breathing".to_owned(),
            "  (audio: a.mp3)".to_owned(),
        ]
    );
}
