//! Resolver wire format and the domain types it is parsed into.

use crossdash_core::Coordinate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ResolutionError;

/// Raw `find-address` response body.
///
/// Facility entries are kept as loose JSON objects because the resolver
/// serializes coordinates as either strings or numbers depending on the
/// upstream places provider.
#[derive(Debug, Deserialize)]
pub(crate) struct FindAddressResponse {
    pub address: String,
    pub eta: Vec<u32>,
    pub hospitals: Vec<Map<String, Value>>,
}

/// A candidate responding facility (typically a hospital).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facility {
    pub location: Coordinate,
    pub name: Option<String>,
    /// Street address or neighbourhood text, when the resolver provides one.
    pub vicinity: Option<String>,
    /// Every other wire field, preserved untouched.
    pub metadata: Map<String, Value>,
}

/// Everything the resolver returns for one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionResult {
    pub address: String,
    /// Priority order: the first facility is the routing target.
    pub facilities: Vec<Facility>,
    /// Successive per-minute ETA estimates; the head is the current one.
    pub eta_minutes: Vec<u32>,
}

impl ResolutionResult {
    /// The facility a route should be computed to.
    #[must_use]
    pub fn primary_facility(&self) -> Option<&Facility> {
        self.facilities.first()
    }
}

impl FindAddressResponse {
    pub(crate) fn into_result(self) -> Result<ResolutionResult, ResolutionError> {
        let mut facilities = Vec::with_capacity(self.hospitals.len());
        for (index, raw) in self.hospitals.into_iter().enumerate() {
            match parse_facility(index, raw) {
                Ok(facility) => facilities.push(facility),
                // The first entry is the routing target and must be usable.
                Err(e) if index == 0 => return Err(e),
                Err(e) => {
                    tracing::warn!(index, error = %e, "dropping facility with unusable coordinates");
                }
            }
        }

        Ok(ResolutionResult {
            address: self.address,
            facilities,
            eta_minutes: self.eta,
        })
    }
}

fn parse_facility(index: usize, mut raw: Map<String, Value>) -> Result<Facility, ResolutionError> {
    let latitude = take_degrees(&mut raw, index, "lat")?;
    let longitude = take_degrees(&mut raw, index, "lng")?;
    let location =
        Coordinate::new(latitude, longitude).map_err(|e| ResolutionError::MalformedResponse {
            context: format!("hospitals[{index}]"),
            reason: e.to_string(),
        })?;

    let name = take_text(&mut raw, "name");
    let vicinity = take_text(&mut raw, "vicinity").or_else(|| take_text(&mut raw, "address"));

    Ok(Facility {
        location,
        name,
        vicinity,
        metadata: raw,
    })
}

/// Removes `key` from the object and reads it as degrees, accepting both
/// JSON numbers and numeric strings.
fn take_degrees(
    raw: &mut Map<String, Value>,
    index: usize,
    key: &str,
) -> Result<f64, ResolutionError> {
    let malformed = |reason: String| ResolutionError::MalformedResponse {
        context: format!("hospitals[{index}].{key}"),
        reason,
    };

    match raw.remove(key) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| malformed(format!("{n} is not representable as f64"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| malformed(format!("\"{s}\": {e}"))),
        Some(other) => Err(malformed(format!("unexpected value {other}"))),
        None => Err(malformed("missing".to_owned())),
    }
}

fn take_text(raw: &mut Map<String, Value>, key: &str) -> Option<String> {
    match raw.remove(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Some(Value::String(_)) | None => None,
        Some(other) => {
            // Not text: hand it back so it survives in metadata.
            raw.insert(key.to_owned(), other);
            None
        }
    }
}
