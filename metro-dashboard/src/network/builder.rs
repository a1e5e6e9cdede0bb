//! Flattening of a network description into a [`StationIndex`].

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::document::{LineDto, StopDto};
use super::error::NetworkError;
use super::index::{LineSummary, StationIndex, StopRecord};
use crate::geo::Coordinates;

/// What to do with a line that has no English display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingLinePolicy {
    /// Leave the line out and report it.
    #[default]
    Skip,
    /// Use the first name found in any language.
    FirstAvailable,
    /// Fail the whole build.
    Abort,
}

impl MissingLinePolicy {
    /// Parse a policy name (`skip`, `first-available`, `abort`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Some(Self::Skip),
            "first-available" | "first_available" => Some(Self::FirstAvailable),
            "abort" => Some(Self::Abort),
            _ => None,
        }
    }
}

/// Lines and stops left out of a build, with the reason for each.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub skipped: Vec<NetworkError>,
}

impl BuildReport {
    /// Check if nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    fn skip(&mut self, err: NetworkError) {
        warn!("skipping entry: {err}");
        self.skipped.push(err);
    }
}

/// A stop that decoded cleanly.
struct ParsedStop {
    name: String,
    coordinates: Coordinates,
}

/// Builds a [`StationIndex`] from a metro network description.
///
/// Every stop in the document is attached to every coordinate segment of
/// every line, so a document with lines `L` and `M` stops yields
/// `Σ segments(L) × M` records. No geometric check ties a stop to the line
/// it is filed under.
#[derive(Debug, Clone, Default)]
pub struct StationIndexBuilder {
    policy: MissingLinePolicy,
}

impl StationIndexBuilder {
    /// Create a builder with the default [`MissingLinePolicy::Skip`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy for lines lacking an English name.
    pub fn with_policy(mut self, policy: MissingLinePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the index, discarding the report of skipped entries.
    pub fn build(&self, document: &Value) -> Result<StationIndex, NetworkError> {
        self.build_with_report(document).map(|(index, _)| index)
    }

    /// Build the index from JSON text.
    pub fn build_from_str(&self, json: &str) -> Result<(StationIndex, BuildReport), NetworkError> {
        let document: Value = serde_json::from_str(json)?;
        self.build_with_report(&document)
    }

    /// Build the index from a JSON file.
    pub fn build_from_path(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<(StationIndex, BuildReport), NetworkError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| NetworkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.build_from_str(&contents)
    }

    /// Build the index and report every line or stop that was left out.
    pub fn build_with_report(
        &self,
        document: &Value,
    ) -> Result<(StationIndex, BuildReport), NetworkError> {
        let metro = document
            .get("metro")
            .and_then(Value::as_object)
            .ok_or(NetworkError::Malformed {
                reason: "missing `metro` object",
            })?;
        let raw_lines = metro
            .get("line")
            .and_then(Value::as_array)
            .ok_or(NetworkError::Malformed {
                reason: "missing `metro.line` array",
            })?;
        let raw_stops = metro
            .get("stops")
            .and_then(Value::as_array)
            .ok_or(NetworkError::Malformed {
                reason: "missing `metro.stops` array",
            })?;

        let mut report = BuildReport::default();

        let mut stops = Vec::with_capacity(raw_stops.len());
        for (i, raw) in raw_stops.iter().enumerate() {
            match parse_stop(i, raw) {
                Ok(stop) => stops.push(stop),
                Err(e) => report.skip(e),
            }
        }

        let mut records = Vec::new();
        let mut lines = Vec::with_capacity(raw_lines.len());

        for (i, raw) in raw_lines.iter().enumerate() {
            let line = match LineDto::deserialize(raw) {
                Ok(line) => line,
                Err(e) => {
                    report.skip(NetworkError::InvalidLine {
                        line: i,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let Some(name) = self.line_name(i, &line)? else {
                report.skip(NetworkError::MissingLocalization { line: i });
                continue;
            };

            for _segment in &line.coords {
                for stop in &stops {
                    records.push(StopRecord {
                        name: stop.name.clone(),
                        coordinates: stop.coordinates,
                        route_color: line.route_color.clone(),
                        route_name: name.clone(),
                    });
                }
            }

            debug!(
                line = %name,
                segments = line.coords.len(),
                stops = stops.len(),
                "flattened line"
            );

            lines.push(LineSummary {
                name,
                color: line.route_color,
                segments: line.coords.len(),
            });
        }

        Ok((StationIndex::new(records, lines), report))
    }

    /// Resolve a line's display name under the configured policy.
    ///
    /// `Ok(None)` means the line should be skipped.
    fn line_name(&self, i: usize, line: &LineDto) -> Result<Option<String>, NetworkError> {
        if let Some(name) = line.display_name() {
            return Ok(Some(name.to_string()));
        }

        match self.policy {
            MissingLinePolicy::Skip => Ok(None),
            MissingLinePolicy::FirstAvailable => Ok(line.first_name().map(str::to_string)),
            MissingLinePolicy::Abort => Err(NetworkError::MissingLocalization { line: i }),
        }
    }
}

fn parse_stop(i: usize, raw: &Value) -> Result<ParsedStop, NetworkError> {
    let stop = StopDto::deserialize(raw).map_err(|e| NetworkError::InvalidStop {
        stop: i,
        message: e.to_string(),
    })?;

    let coordinates = stop
        .coordinates()
        .map_err(|source| NetworkError::InvalidCoordinate { stop: i, source })?;

    Ok(ParsedStop {
        name: stop.display_name().to_string(),
        coordinates,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        /// Record count is the sum over lines of segments × stops
        #[test]
        fn record_count_is_cross_product(
            segments in proptest::collection::vec(0usize..4, 0..5),
            stop_count in 0usize..6,
        ) {
            let lines: Vec<Value> = segments
                .iter()
                .enumerate()
                .map(|(i, &n)| json!({
                    "routeColor": format!("#{i:06}"),
                    "lineName": [{ "en": format!("Line {i}") }],
                    "coords": vec![json!([]); n],
                }))
                .collect();
            let stops: Vec<Value> = (0..stop_count)
                .map(|i| json!({
                    "stop_lat": format!("{}", 24.0 + i as f64 / 10.0),
                    "stop_lon": "46.5",
                    "stop": [{ "language": "en", "translation": format!("Stop {i}") }],
                }))
                .collect();
            let doc = json!({ "metro": { "line": lines, "stops": stops } });

            let index = StationIndexBuilder::new().build(&doc).unwrap();
            let expected: usize = segments.iter().map(|s| s * stop_count).sum();
            prop_assert_eq!(index.len(), expected);
        }
    }
}
