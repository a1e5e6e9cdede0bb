//! Wire shapes of the metro network description.
//!
//! The document is a single JSON object:
//!
//! ```json
//! { "metro": {
//!     "line":  [ { "routeColor": "#FF0000",
//!                  "lineName": [ { "en": "Blue Line", "ar": "المسار الأزرق" } ],
//!                  "coords": [ [[46.67, 24.71], [46.68, 24.72]] ] } ],
//!     "stops": [ { "stop_lat": "24.7136", "stop_lon": "46.6753",
//!                  "stop": [ { "language": "en", "translation": "King Fahd" } ] } ] } }
//! ```
//!
//! Lines and stops are decoded one at a time so that a single bad entry
//! does not sink the rest of the document.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::geo::{Coordinates, InvalidCoordinate};

/// Language tag of the names shown in the dashboard.
pub const DISPLAY_LANGUAGE: &str = "en";

/// One metro line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDto {
    pub route_color: String,

    /// Localized names, each entry mapping language tags to names.
    #[serde(default)]
    pub line_name: Vec<Map<String, Value>>,

    /// Coordinate segments. Their contents are never inspected.
    pub coords: Vec<Value>,
}

impl LineDto {
    /// The first name tagged with the display language.
    pub fn display_name(&self) -> Option<&str> {
        self.line_name
            .iter()
            .find_map(|names| names.get(DISPLAY_LANGUAGE).and_then(Value::as_str))
    }

    /// The first name in any language.
    ///
    /// Entries are tried in order; within an entry, tags are tried alphabetically.
    pub fn first_name(&self) -> Option<&str> {
        self.line_name
            .iter()
            .flat_map(|names| names.values())
            .find_map(Value::as_str)
    }
}

/// One station.
#[derive(Debug, Deserialize)]
pub struct StopDto {
    #[serde(default)]
    pub stop_lat: Option<Value>,

    #[serde(default)]
    pub stop_lon: Option<Value>,

    #[serde(default, rename = "stop")]
    pub translations: Vec<TranslationDto>,
}

impl StopDto {
    /// Parse the stop's latitude and longitude.
    ///
    /// Either component may be a JSON string or a JSON number.
    pub fn coordinates(&self) -> Result<Coordinates, InvalidCoordinate> {
        let lat = coordinate_text(self.stop_lat.as_ref());
        let lon = coordinate_text(self.stop_lon.as_ref());
        Coordinates::parse(&lat, &lon)
    }

    /// The first translation in the display language, or an empty string.
    pub fn display_name(&self) -> &str {
        self.translations
            .iter()
            .find(|t| t.language == DISPLAY_LANGUAGE)
            .map(|t| t.translation.as_str())
            .unwrap_or("")
    }
}

/// A localized stop name.
#[derive(Debug, Deserialize)]
pub struct TranslationDto {
    #[serde(default)]
    pub language: String,

    #[serde(default)]
    pub translation: String,
}

fn coordinate_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
