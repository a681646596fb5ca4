//! Nearby safe-space lookup

use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use manas_core::geo::Place;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ResultExt};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SafeZonesRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct SafeZonesResponse {
    pub places: Vec<Place>,
}

impl SafeZonesRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ApiError::bad_request("'latitude' must be between -90 and 90"));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ApiError::bad_request("'longitude' must be between -180 and 180"));
        }
        Ok(())
    }
}

pub async fn safe_zones(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<SafeZonesRequest>, ApiError>,
) -> Result<Json<SafeZonesResponse>, ApiError> {
    req.validate()?;

    let places = state
        .places
        .nearby(req.latitude, req.longitude)
        .await
        .public_error("Could not find safe zones nearby.")?;
    info!("Safe-zone lookup returned {} places", places.len());

    Ok(Json(SafeZonesResponse { places }))
}
