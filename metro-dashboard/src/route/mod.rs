//! Route resolution and rendering.
//!
//! A route is the straight connector between two named stops. The
//! [`RouteResolver`] finds the endpoints; a [`RouteRenderer`] describes how
//! to draw them.

mod render;
mod resolver;

pub use render::{ElevatedArc, GroundPolyline, RouteRenderer, RouteStyle};
pub use resolver::{DEFAULT_ZOOM, RouteGeometry, RouteResolution, RouteResolver};
