//! Flat, queryable index of metro stops.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::geo::Coordinates;

/// One stop as seen from one line.
///
/// The same stop name appears once per line segment it was flattened under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopRecord {
    pub name: String,
    pub coordinates: Coordinates,
    pub route_color: String,
    pub route_name: String,
}

/// A line that contributed records to the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineSummary {
    pub name: String,
    pub color: String,
    /// Number of coordinate segments the line declared.
    pub segments: usize,
}

/// A match returned by [`StationIndex::search`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopMatch {
    pub name: String,
    pub coordinates: Coordinates,
}

/// Resolves stop display names to coordinates.
pub trait StopLookup {
    /// Coordinates of the first stop named `name`, if any.
    fn lookup(&self, name: &str) -> Option<Coordinates>;
}

/// Ordered stop records plus name lookup.
///
/// Built once per session and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct StationIndex {
    records: Vec<StopRecord>,
    lines: Vec<LineSummary>,
    /// Name → position of the first record carrying it.
    first_by_name: HashMap<String, usize>,
    unique_names: Vec<String>,
}

impl StationIndex {
    /// Create an index from records in insertion order.
    pub fn new(records: Vec<StopRecord>, lines: Vec<LineSummary>) -> Self {
        let mut first_by_name = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            first_by_name.entry(record.name.clone()).or_insert(i);
        }

        let unique_names: Vec<String> = records
            .iter()
            .map(|r| r.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            records,
            lines,
            first_by_name,
            unique_names,
        }
    }

    /// Coordinates of the first record named `name`.
    ///
    /// `None` is an ordinary outcome: names in the travel-time table need not
    /// be metro stops at all.
    pub fn resolve(&self, name: &str) -> Option<Coordinates> {
        self.resolve_record(name).map(|r| r.coordinates)
    }

    /// The first record named `name`.
    pub fn resolve_record(&self, name: &str) -> Option<&StopRecord> {
        self.first_by_name.get(name).map(|&i| &self.records[i])
    }

    /// Check if any record carries `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.first_by_name.contains_key(name)
    }

    /// Every record named `name`, in insertion order.
    pub fn records_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a StopRecord> + 'a {
        self.records.iter().filter(move |r| r.name == name)
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[StopRecord] {
        &self.records
    }

    /// Lines in document order.
    pub fn lines(&self) -> &[LineSummary] {
        &self.lines
    }

    /// Distinct stop names, sorted.
    pub fn unique_names(&self) -> &[String] {
        &self.unique_names
    }

    /// Get the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the index has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Case-insensitive substring search over distinct stop names.
    ///
    /// Names starting with the query rank ahead of names merely containing
    /// it. Unnamed stops never match.
    pub fn search(&self, query: &str, limit: usize) -> Vec<StopMatch> {
        let needle = query.trim().to_lowercase();

        let mut hits: Vec<(bool, &String)> = self
            .unique_names
            .iter()
            .filter(|name| !name.is_empty())
            .filter_map(|name| {
                let lower = name.to_lowercase();
                if needle.is_empty() || lower.contains(&needle) {
                    Some((!lower.starts_with(&needle), name))
                } else {
                    None
                }
            })
            .collect();

        // Stable sort keeps alphabetical order within each group
        hits.sort_by_key(|(not_prefix, _)| *not_prefix);

        hits.into_iter()
            .take(limit)
            .filter_map(|(_, name)| {
                self.resolve(name).map(|coordinates| StopMatch {
                    name: name.clone(),
                    coordinates,
                })
            })
            .collect()
    }
}

impl StopLookup for StationIndex {
    fn lookup(&self, name: &str) -> Option<Coordinates> {
        self.resolve(name)
    }
}
