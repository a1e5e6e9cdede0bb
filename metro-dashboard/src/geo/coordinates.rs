//! Geographic coordinate type.

use std::fmt;

use serde::Serialize;

/// Error returned when a latitude or longitude cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate {value:?}: {reason}")]
pub struct InvalidCoordinate {
    value: String,
    reason: &'static str,
}

impl InvalidCoordinate {
    /// The offending input, as it appeared in the source document.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A WGS84 latitude/longitude pair.
///
/// Both components are finite by construction.
///
/// # Examples
///
/// ```
/// use metro_dashboard::geo::Coordinates;
///
/// let kfd = Coordinates::parse("24.7136", "46.6753").unwrap();
/// assert_eq!(kfd.latitude(), 24.7136);
/// assert_eq!(kfd.longitude(), 46.6753);
///
/// assert!(Coordinates::parse("north", "46.6753").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    lat: f64,
    lon: f64,
}

impl Coordinates {
    /// Create coordinates from already-numeric components.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidCoordinate> {
        Ok(Self {
            lat: finite(lat)?,
            lon: finite(lon)?,
        })
    }

    /// Parse coordinates from their textual latitude and longitude.
    ///
    /// Surrounding whitespace is ignored.
    pub fn parse(lat: &str, lon: &str) -> Result<Self, InvalidCoordinate> {
        Ok(Self {
            lat: parse_component(lat)?,
            lon: parse_component(lon)?,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.lat
    }

    pub fn longitude(&self) -> f64 {
        self.lon
    }

    /// Position in `[longitude, latitude]` order, as GeoJSON and most map
    /// layers expect.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

fn parse_component(s: &str) -> Result<f64, InvalidCoordinate> {
    let value: f64 = s.trim().parse().map_err(|_| InvalidCoordinate {
        value: s.to_string(),
        reason: "not a number",
    })?;
    finite(value)
}

fn finite(value: f64) -> Result<f64, InvalidCoordinate> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InvalidCoordinate {
            value: value.to_string(),
            reason: "must be finite",
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any finite pair formatted as text parses back to the same values
        #[test]
        fn display_parse_roundtrip(lat in -90.0f64..90.0, lon in -180.0f64..180.0) {
            let c = Coordinates::parse(&lat.to_string(), &lon.to_string()).unwrap();
            prop_assert_eq!(c.latitude(), lat);
            prop_assert_eq!(c.longitude(), lon);
        }

        /// Alphabetic input is always rejected
        #[test]
        fn letters_rejected(s in "[a-hj-mo-z]{1,8}") {
            prop_assert!(Coordinates::parse(&s, "0").is_err());
        }
    }
}
