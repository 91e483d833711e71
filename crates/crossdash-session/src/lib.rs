//! Location-to-route session orchestration.
//!
//! A session acquires the user's position, resolves it to an address and a
//! ranked facility list, counts the ETA down once per tick, and computes a
//! driving route to the top facility once the advisory flow signals that
//! guidance is on screen.
//!
//! [`SessionMachine`] holds every ordering rule as a pure transition function;
//! [`Orchestrator`] executes its effects against injected capabilities.

pub mod advisory;
pub mod countdown;
pub mod location;
pub mod machine;
pub mod map;
pub mod orchestrator;

pub use advisory::{Advisory, RevealSignal};
pub use countdown::{CountdownScheduler, CountdownState};
pub use location::{
    provider_from_config, FixedLocation, HttpLocationProvider, LocationError, LocationProvider,
    UnsupportedLocation,
};
pub use machine::{
    Effect, FailureCause, Phase, SessionEvent, SessionFailure, SessionMachine, SessionSnapshot,
};
pub use map::{MapView, DEFAULT_ZOOM};
pub use orchestrator::{Capabilities, Orchestrator, SessionHandle};
