//! HTTP route handlers.

use std::path::Path;

use askama::Template;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::services::ServeDir;
use tracing::{debug, error, warn};

use crate::route::{RouteResolution, RouteStyle};
use crate::trips::FilteredDataset;

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/api/stations", get(search_stations))
        .route("/api/lines", get(list_lines))
        .route("/api/trips", get(filter_trips))
        .route("/api/route", get(draw_route))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Run the dashboard filters for `query`.
fn explore(state: &AppState, query: &TripQuery) -> Result<FilteredDataset, AppError> {
    let criteria = query.to_criteria().map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;
    let filtered = state.session.explore(&criteria);
    debug!(
        rows_in = state.session.trips().len(),
        rows_out = filtered.len(),
        "filtered trips"
    );
    Ok(filtered)
}

/// Dashboard page.
async fn index_page(
    State(state): State<AppState>,
    Query(query): Query<TripQuery>,
) -> Result<Response, AppError> {
    let filtered = explore(&state, &query)?;
    let choices = state.session.endpoint_choices(&filtered);
    let origin_options = state.session.origin_options();

    let template = IndexTemplate {
        filters: FilterFormView::new(&query, &origin_options, &filtered),
        trips: TripTableView::new(&filtered, state.session.trips().len()),
        origins: choices.origins,
        destinations: choices.destinations,
    };
    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })?;

    Ok(Html(html).into_response())
}

/// Search stop names.
async fn search_stations(
    State(state): State<AppState>,
    Query(req): Query<StationSearchRequest>,
) -> Json<StationSearchResponse> {
    let limit = req.limit.unwrap_or(10).min(50);
    let stations = state.session.stations().search(&req.q, limit);

    Json(StationSearchResponse { stations })
}

/// Metro lines in document order.
async fn list_lines(State(state): State<AppState>) -> Json<LinesResponse> {
    Json(LinesResponse {
        lines: state.session.stations().lines().to_vec(),
    })
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Filter the travel-time table.
async fn filter_trips(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TripQuery>,
) -> Result<Response, AppError> {
    let filtered = explore(&state, &query)?;
    let total_rows = state.session.trips().len();

    // Return HTML or JSON based on Accept header
    if accepts_html(&headers) {
        let template = TripTableTemplate {
            trips: TripTableView::new(&filtered, total_rows),
        };
        let html = template.render().map_err(|e| AppError::Internal {
            message: format!("Template error: {}", e),
        })?;

        Ok(Html(html).into_response())
    } else {
        let choices = state.session.endpoint_choices(&filtered);
        Ok(Json(TripsResponse::new(
            total_rows,
            filtered,
            state.session.origin_options(),
            choices.origins,
            choices.destinations,
        ))
        .into_response())
    }
}

/// Resolve two stop names and describe the route between them.
async fn draw_route(
    State(state): State<AppState>,
    Query(req): Query<RouteQuery>,
) -> Result<Json<RouteResponse>, AppError> {
    let style = match req.style.as_deref().filter(|s| !s.trim().is_empty()) {
        None => RouteStyle::default(),
        Some(s) => RouteStyle::parse(s).ok_or_else(|| AppError::BadRequest {
            message: format!("Unknown route style: {s}"),
        })?,
    };

    match state.session.route(&req.origin, &req.destination) {
        RouteResolution::Resolved(route) => {
            let layer = style
                .renderer()
                .render(&route)
                .map_err(|e| AppError::Internal {
                    message: format!("Route rendering failed: {e}"),
                })?;
            Ok(Json(RouteResponse::resolved(style, route, layer)))
        }
        RouteResolution::EndpointsUnresolved { missing } => {
            debug!(?missing, "route endpoints not in station index");
            Ok(Json(RouteResponse::unresolved(missing)))
        }
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Internal { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
