//! Coordinate value types shared by every endpoint.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::query::{coord, QueryValue};

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", coord(self.lat), coord(self.lng))
    }
}

impl QueryValue for GeoPoint {
    fn to_query_value(&self) -> Result<String, ApiError> {
        Ok(self.to_string())
    }
}

/// Rectangle given by its top-left and bottom-right corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top_left: GeoPoint,
    pub bottom_right: GeoPoint,
}

impl BoundingBox {
    pub fn new(top_left: GeoPoint, bottom_right: GeoPoint) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }
}

impl QueryValue for BoundingBox {
    fn to_query_value(&self) -> Result<String, ApiError> {
        Ok(format!("{},{}", self.top_left, self.bottom_right))
    }
}
