//! Presentation adapters over a [`RouteGeometry`].
//!
//! Both styles draw the same two endpoints and the same straight connector;
//! they differ only in how a map client is expected to draw them.

use std::fmt;

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value as GeoValue};
use serde::Serialize;
use serde_json::Value;

use super::resolver::RouteGeometry;

/// Marker color for the origin.
const ORIGIN_COLOR: &str = "green";
/// Marker color for the destination.
const DESTINATION_COLOR: &str = "red";
/// Connector color.
const CONNECTOR_COLOR: &str = "blue";
const CONNECTOR_WEIGHT: f64 = 2.5;

/// How a route is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStyle {
    /// Markers joined by a polyline on the ground.
    #[default]
    Ground,
    /// An arc lifted above the map between the two endpoints.
    Arc,
}

impl RouteStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ground" | "polyline" => Some(Self::Ground),
            "arc" => Some(Self::Arc),
            _ => None,
        }
    }

    /// The adapter drawing this style.
    pub fn renderer(self) -> Box<dyn RouteRenderer + Send + Sync> {
        match self {
            RouteStyle::Ground => Box::new(GroundPolyline),
            RouteStyle::Arc => Box::new(ElevatedArc::default()),
        }
    }
}

impl fmt::Display for RouteStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteStyle::Ground => f.write_str("ground"),
            RouteStyle::Arc => f.write_str("arc"),
        }
    }
}

/// Turns a route into a layer description a map client can draw.
pub trait RouteRenderer {
    fn style(&self) -> RouteStyle;

    fn render(&self, route: &RouteGeometry) -> Result<Value, serde_json::Error>;
}

/// GeoJSON: one point per endpoint and a line string between them.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroundPolyline;

impl GroundPolyline {
    /// Build the feature collection for `route`.
    pub fn feature_collection(&self, route: &RouteGeometry) -> FeatureCollection {
        let mut origin = feature(GeoValue::Point(route.origin.lon_lat().to_vec()));
        origin.set_property("role", "origin");
        origin.set_property("label", route.origin_label.clone());
        origin.set_property("popup", format!("Origin: {}", route.origin_label));
        origin.set_property("marker-color", ORIGIN_COLOR);

        let mut destination = feature(GeoValue::Point(route.destination.lon_lat().to_vec()));
        destination.set_property("role", "destination");
        destination.set_property("label", route.destination_label.clone());
        destination.set_property("popup", format!("Destination: {}", route.destination_label));
        destination.set_property("marker-color", DESTINATION_COLOR);

        let mut connector = feature(GeoValue::LineString(
            route.path().iter().map(|c| c.lon_lat().to_vec()).collect(),
        ));
        connector.set_property("role", "connector");
        connector.set_property("stroke", CONNECTOR_COLOR);
        connector.set_property("stroke-width", CONNECTOR_WEIGHT);
        connector.set_property("stroke-opacity", 1.0);

        FeatureCollection {
            bbox: None,
            features: vec![origin, destination, connector],
            foreign_members: None,
        }
    }
}

impl RouteRenderer for GroundPolyline {
    fn style(&self) -> RouteStyle {
        RouteStyle::Ground
    }

    fn render(&self, route: &RouteGeometry) -> Result<Value, serde_json::Error> {
        serde_json::to_value(GeoJson::FeatureCollection(self.feature_collection(route)))
    }
}

fn feature(value: GeoValue) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: None,
        foreign_members: None,
    }
}

/// An arc layer: source and target positions with per-end colors.
#[derive(Debug, Clone, Copy)]
pub struct ElevatedArc {
    pub width: f64,
    /// Arc height relative to the distance between endpoints.
    pub height: f64,
}

impl Default for ElevatedArc {
    fn default() -> Self {
        Self {
            width: 4.0,
            height: 1.0,
        }
    }
}

#[derive(Serialize)]
struct ArcLayer<'a> {
    source: [f64; 2],
    target: [f64; 2],
    source_label: &'a str,
    target_label: &'a str,
    source_color: [u8; 3],
    target_color: [u8; 3],
    width: f64,
    height: f64,
}

impl RouteRenderer for ElevatedArc {
    fn style(&self) -> RouteStyle {
        RouteStyle::Arc
    }

    fn render(&self, route: &RouteGeometry) -> Result<Value, serde_json::Error> {
        serde_json::to_value(ArcLayer {
            source: route.origin.lon_lat(),
            target: route.destination.lon_lat(),
            source_label: &route.origin_label,
            target_label: &route.destination_label,
            source_color: [0, 128, 0],
            target_color: [255, 0, 0],
            width: self.width,
            height: self.height,
        })
    }
}
