//! The session's ordering rules as a pure transition function.
//!
//! [`SessionMachine::handle`] consumes one [`SessionEvent`] and returns the
//! [`Effect`]s the driver must perform. It never awaits and never touches a
//! capability, so every interleaving of settlements and reveal signals can be
//! replayed synchronously.

use std::fmt;

use chrono::{DateTime, Utc};
use crossdash_core::Coordinate;
use crossdash_resolver::{Facility, ResolutionErrorKind, ResolutionResult};
use crossdash_routing::{RouteResult, RoutingErrorKind};

use crate::advisory::{Advisory, RevealSignal};
use crate::location::LocationError;

/// Where a session stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    LocatingUser,
    ResolvingLocation,
    Resolved,
    RouteComputed,
    /// Terminal. No event leaves this phase.
    Failed(SessionFailure),
}

impl Phase {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::LocatingUser => "locating_user",
            Phase::ResolvingLocation => "resolving_location",
            Phase::Resolved => "resolved",
            Phase::RouteComputed => "route_computed",
            Phase::Failed(_) => "failed",
        }
    }

    /// True once the resolution is in hand and routes may be computed.
    #[must_use]
    pub fn is_routable(&self) -> bool {
        matches!(self, Phase::Resolved | Phase::RouteComputed)
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Phase::Failed(_))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    Location(LocationError),
    Resolution(ResolutionErrorKind),
}

/// A terminal failure and the message the user sees for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub cause: FailureCause,
    pub message: String,
}

impl SessionFailure {
    fn location(err: LocationError) -> Self {
        let message = err.user_message().to_owned();
        Self {
            cause: FailureCause::Location(err),
            message,
        }
    }

    fn resolution(kind: ResolutionErrorKind) -> Self {
        Self {
            cause: FailureCause::Resolution(kind),
            message: kind.user_message().to_owned(),
        }
    }
}

/// Everything the display layer renders for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub user_location: Option<Coordinate>,
    pub located_at: Option<DateTime<Utc>>,
    pub address: Option<String>,
    /// Currently displayed ETA in minutes.
    pub eta_minutes: Option<u32>,
    /// The facility routes are computed to.
    pub destination: Option<Facility>,
    pub advisory: Option<Advisory>,
    /// Whether guidance is currently on screen.
    pub revealed: bool,
    pub route: Option<RouteResult>,
    pub error_message: Option<String>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn eta_label(&self) -> Option<String> {
        self.eta_minutes.map(|n| format!("ETA: {n} Minutes"))
    }
}

/// Inputs to the machine: the session start, capability settlements, reveal
/// signals, and countdown ticks.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Start,
    LocationSettled {
        result: Result<Coordinate, LocationError>,
        at: DateTime<Utc>,
    },
    ResolutionSettled(Result<ResolutionResult, ResolutionErrorKind>),
    Reveal(RevealSignal),
    RouteSettled {
        generation: u64,
        result: Result<RouteResult, RoutingErrorKind>,
    },
    EtaTick(Option<u32>),
}

/// Work the driver performs on the machine's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AcquireLocation,
    Resolve(Coordinate),
    /// Centre the map on the user and place the marker.
    ShowUser(Coordinate),
    StartCountdown(Vec<u32>),
    ComputeRoute {
        generation: u64,
        origin: Coordinate,
        destination: Coordinate,
    },
    /// Draw the path and fit the map to its bounds.
    RenderRoute(RouteResult),
}

#[derive(Debug, Default)]
pub struct SessionMachine {
    snapshot: SessionSnapshot,
    resolution: Option<ResolutionResult>,
    /// A rising edge seen before the session became routable.
    pending_reveal: bool,
    /// Generation of the newest route request; older results are stale.
    route_generation: u64,
}

impl SessionMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.snapshot.phase
    }

    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::Start => self.on_start(),
            SessionEvent::LocationSettled { result, at } => self.on_location(result, at),
            SessionEvent::ResolutionSettled(result) => self.on_resolution(result),
            SessionEvent::Reveal(signal) => self.on_reveal(signal),
            SessionEvent::RouteSettled { generation, result } => self.on_route(generation, result),
            SessionEvent::EtaTick(eta) => {
                if self.snapshot.phase.is_routable() {
                    self.snapshot.eta_minutes = eta;
                }
                Vec::new()
            }
        }
    }

    fn on_start(&mut self) -> Vec<Effect> {
        if self.snapshot.phase != Phase::Idle {
            tracing::debug!(phase = %self.snapshot.phase, "session already started");
            return Vec::new();
        }
        self.snapshot.phase = Phase::LocatingUser;
        vec![Effect::AcquireLocation]
    }

    fn on_location(
        &mut self,
        result: Result<Coordinate, LocationError>,
        at: DateTime<Utc>,
    ) -> Vec<Effect> {
        if self.snapshot.phase != Phase::LocatingUser {
            tracing::debug!(phase = %self.snapshot.phase, "ignoring unexpected location result");
            return Vec::new();
        }

        match result {
            Ok(location) => {
                tracing::info!(location = %location, "user located");
                self.snapshot.user_location = Some(location);
                self.snapshot.located_at = Some(at);
                self.snapshot.phase = Phase::ResolvingLocation;
                vec![Effect::ShowUser(location), Effect::Resolve(location)]
            }
            Err(err) => {
                tracing::error!(error = %err, "location acquisition failed");
                self.fail(SessionFailure::location(err));
                Vec::new()
            }
        }
    }

    fn on_resolution(
        &mut self,
        result: Result<ResolutionResult, ResolutionErrorKind>,
    ) -> Vec<Effect> {
        if self.snapshot.phase != Phase::ResolvingLocation {
            tracing::debug!(phase = %self.snapshot.phase, "ignoring unexpected resolution result");
            return Vec::new();
        }

        let resolution = match result {
            Ok(resolution) => resolution,
            Err(kind) => {
                tracing::error!(kind = ?kind, "resolution failed");
                self.fail(SessionFailure::resolution(kind));
                return Vec::new();
            }
        };

        tracing::info!(
            address = %resolution.address,
            facilities = resolution.facilities.len(),
            eta_steps = resolution.eta_minutes.len(),
            "session resolved"
        );

        let mut effects = Vec::new();
        self.snapshot.address = Some(resolution.address.clone());
        self.snapshot.destination = resolution.primary_facility().cloned();
        self.snapshot.eta_minutes = resolution.eta_minutes.first().copied();
        if !resolution.eta_minutes.is_empty() {
            effects.push(Effect::StartCountdown(resolution.eta_minutes.clone()));
        }
        self.resolution = Some(resolution);
        self.snapshot.phase = Phase::Resolved;

        if std::mem::take(&mut self.pending_reveal) {
            tracing::debug!("honouring reveal received before resolution");
            effects.extend(self.request_route());
        }
        effects
    }

    fn on_reveal(&mut self, signal: RevealSignal) -> Vec<Effect> {
        let rising = signal.visible && !self.snapshot.revealed;
        self.snapshot.revealed = signal.visible;
        if let Some(advisory) = signal.advisory {
            self.snapshot.advisory = Some(advisory);
        }

        if !signal.visible {
            self.pending_reveal = false;
            return Vec::new();
        }
        if !rising {
            return Vec::new();
        }

        match &self.snapshot.phase {
            Phase::Resolved | Phase::RouteComputed => self.request_route(),
            Phase::Failed(_) => {
                tracing::debug!("reveal after failure; no route computed");
                Vec::new()
            }
            Phase::Idle | Phase::LocatingUser | Phase::ResolvingLocation => {
                tracing::debug!(phase = %self.snapshot.phase, "reveal deferred until resolved");
                self.pending_reveal = true;
                Vec::new()
            }
        }
    }

    fn request_route(&mut self) -> Vec<Effect> {
        let Some(origin) = self.snapshot.user_location else {
            tracing::warn!("no user location captured; route not requested");
            return Vec::new();
        };
        let Some(facility) = self.resolution.as_ref().and_then(|r| r.primary_facility()) else {
            tracing::warn!("no facility to route to");
            return Vec::new();
        };

        self.route_generation += 1;
        tracing::info!(
            generation = self.route_generation,
            origin = %origin,
            destination = %facility.location,
            "requesting route"
        );
        vec![Effect::ComputeRoute {
            generation: self.route_generation,
            origin,
            destination: facility.location,
        }]
    }

    fn on_route(
        &mut self,
        generation: u64,
        result: Result<RouteResult, RoutingErrorKind>,
    ) -> Vec<Effect> {
        if generation != self.route_generation || !self.snapshot.phase.is_routable() {
            tracing::debug!(
                generation,
                latest = self.route_generation,
                "discarding stale route result"
            );
            return Vec::new();
        }

        match result {
            Ok(route) => {
                tracing::info!(
                    generation,
                    segments = route.path.segments.len(),
                    distance_meters = route.path.distance_meters(),
                    "route computed"
                );
                self.snapshot.route = Some(route.clone());
                self.snapshot.phase = Phase::RouteComputed;
                vec![Effect::RenderRoute(route)]
            }
            Err(kind) => {
                // Non-fatal: the map keeps showing the marker only.
                tracing::warn!(generation, kind = ?kind, "route computation failed");
                Vec::new()
            }
        }
    }

    fn fail(&mut self, failure: SessionFailure) {
        self.pending_reveal = false;
        self.snapshot.error_message = Some(failure.message.clone());
        self.snapshot.phase = Phase::Failed(failure);
    }
}

#[cfg(test)]
#[path = "machine_test.rs"]
mod tests;
