//! Geographic primitives shared by the station index and route layers.

mod coordinates;

pub use coordinates::{Coordinates, InvalidCoordinate};
