//! Metro network description and the stop index built from it.
//!
//! The network document nests stops and coordinate segments under
//! localized lines; [`StationIndexBuilder`] flattens it into a
//! [`StationIndex`] that can resolve stop names to coordinates.

mod builder;
mod document;
mod error;
mod index;

pub use builder::{BuildReport, MissingLinePolicy, StationIndexBuilder};
pub use document::DISPLAY_LANGUAGE;
pub use error::NetworkError;
pub use index::{LineSummary, StationIndex, StopLookup, StopMatch, StopRecord};
