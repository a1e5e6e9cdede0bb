//! Travel-time table and the filter pipeline run over it.

mod filter;
mod table;

pub use filter::{
    ALL, BooleanFilter, CategoricalFilter, FilterCriteria, FilteredDataset, InvalidRange,
    RangeFilter, StageKind, StageReport, apply_filters,
};
pub use table::{Cell, TableError, TripRecord, TripTable};

/// Column names of the travel-time table.
pub mod columns {
    pub const ORIGIN: &str = "Origin";
    pub const DESTINATION: &str = "Destination";
    pub const TRANSIT_IS_FASTER: &str = "Transit is Faster";
    pub const DRIVING_DISTANCE_KM: &str = "Driving Distance (KM)";
    pub const TRANSIT_PERCENTAGE_FASTER: &str = "Transit Percentage Faster";
}
