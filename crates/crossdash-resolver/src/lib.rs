//! Client for the remote address/facility resolver.
//!
//! Turns a captured [`Coordinate`](crossdash_core::Coordinate) into a street
//! address, a priority-ordered list of responding facilities, and the ETA
//! sequence used to drive the on-screen countdown.

pub mod client;
pub mod error;
pub mod types;

pub use client::{AddressResolver, ResolverClient};
pub use error::{ResolutionError, ResolutionErrorKind};
pub use types::{Facility, ResolutionResult};
