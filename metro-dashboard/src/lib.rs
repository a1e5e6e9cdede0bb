//! Metro trip dashboard server.
//!
//! Cross-references a metro network description with a road/transit
//! travel-time table: filter trips, then draw the route between two stops.

pub mod config;
pub mod geo;
pub mod network;
pub mod route;
pub mod session;
pub mod trips;
pub mod web;
