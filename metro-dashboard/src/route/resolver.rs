//! Endpoint resolution into a drawable route.

use serde::Serialize;

use crate::geo::Coordinates;
use crate::network::StopLookup;

/// Zoom level a map showing a route opens at.
pub const DEFAULT_ZOOM: u8 = 12;

/// Two resolved endpoints and their labels.
///
/// The path between them is a straight connector; nothing is routed along
/// the network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteGeometry {
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub origin_label: String,
    pub destination_label: String,
}

impl RouteGeometry {
    /// The connector: exactly the two endpoints, origin first.
    pub fn path(&self) -> [Coordinates; 2] {
        [self.origin, self.destination]
    }

    /// Where a map showing the route is centered.
    pub fn center(&self) -> Coordinates {
        self.origin
    }
}

/// Outcome of resolving a pair of endpoint names.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteResolution {
    Resolved(RouteGeometry),
    /// At least one name matched no stop. Lists the names that failed,
    /// origin first.
    EndpointsUnresolved { missing: Vec<String> },
}

impl RouteResolution {
    pub fn geometry(&self) -> Option<&RouteGeometry> {
        match self {
            RouteResolution::Resolved(route) => Some(route),
            RouteResolution::EndpointsUnresolved { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, RouteResolution::Resolved(_))
    }
}

/// Turns origin/destination names into a [`RouteGeometry`].
pub struct RouteResolver<'a, L: StopLookup> {
    stops: &'a L,
}

impl<'a, L: StopLookup> RouteResolver<'a, L> {
    pub fn new(stops: &'a L) -> Self {
        Self { stops }
    }

    /// Resolve both names; fails softly if either is unknown.
    pub fn resolve_route(&self, origin: &str, destination: &str) -> RouteResolution {
        match (self.stops.lookup(origin), self.stops.lookup(destination)) {
            (Some(from), Some(to)) => RouteResolution::Resolved(RouteGeometry {
                origin: from,
                destination: to,
                origin_label: origin.to_string(),
                destination_label: destination.to_string(),
            }),
            (from, to) => {
                let missing = [(origin, from), (destination, to)]
                    .into_iter()
                    .filter(|(_, found)| found.is_none())
                    .map(|(name, _)| name.to_string())
                    .collect();
                RouteResolution::EndpointsUnresolved { missing }
            }
        }
    }
}
