//! Geocoding API: forward (address) and reverse lookups.
//!
//! Endpoints live under `geocoding/v1`. Both return the same response shape.
//! Batch requests and five-box input are not supported.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::client::{parse_json, Client};
use crate::error::ApiError;
use crate::geo::{BoundingBox, GeoPoint};
use crate::http::{HttpRequest, HttpResponse};
use crate::query::{EncodeQuery, QueryParams};

const ADDRESS_PATH: &str = "geocoding/v1/address";
const REVERSE_PATH: &str = "geocoding/v1/reverse";
const OUTPUT_FORMAT: (&str, &str) = ("outFormat", "json");

/// Forward geocoding request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeocodeAddressRequest {
    pub location: String,
    pub bounding_box: Option<BoundingBox>,
    pub ignore_lat_lng_input: bool,
    /// The service default is `true`, so `false` is always sent explicitly.
    pub thumb_maps: bool,
    pub max_results: Option<i32>,
}

impl Default for GeocodeAddressRequest {
    fn default() -> Self {
        Self {
            location: String::new(),
            bounding_box: None,
            ignore_lat_lng_input: false,
            thumb_maps: true,
            max_results: None,
        }
    }
}

impl EncodeQuery for GeocodeAddressRequest {
    fn encode_query(&self, params: &mut QueryParams) -> Result<(), ApiError> {
        params.set("location", self.location.as_str());
        params.encode_opt("boundingBox", self.bounding_box.as_ref())?;
        params.set_flag("ignoreLatLngInput", self.ignore_lat_lng_input);
        params.set_bool("thumbMaps", self.thumb_maps);
        params.set_limit("maxResults", self.max_results);
        Ok(())
    }
}

/// Reverse geocoding request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeocodeReverseRequest {
    pub location: GeoPoint,
    pub thumb_maps: bool,
    pub include_nearest_intersection: bool,
    pub include_road_metadata: bool,
}

impl Default for GeocodeReverseRequest {
    fn default() -> Self {
        Self {
            location: GeoPoint::default(),
            thumb_maps: true,
            include_nearest_intersection: false,
            include_road_metadata: false,
        }
    }
}

impl EncodeQuery for GeocodeReverseRequest {
    fn encode_query(&self, params: &mut QueryParams) -> Result<(), ApiError> {
        params.encode("location", &self.location)?;
        params.set_bool("thumbMaps", self.thumb_maps);
        params.set_flag("includeNearestIntersection", self.include_nearest_intersection);
        params.set_flag("includeRoadMetadata", self.include_road_metadata);
        Ok(())
    }
}

/// Response of both geocoding endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub info: Option<GeocodeInfo>,
    pub options: Option<GeocodeOptions>,
    pub results: Option<Vec<GeocodeResult>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeocodeInfo {
    /// Service status, 0 on success. `None` when the field was absent.
    #[serde(rename = "statuscode")]
    pub status_code: Option<i32>,
    pub copyright: Option<Copyright>,
    pub messages: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Copyright {
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub image_alt_text: Option<String>,
}

/// Options as the service understood them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeOptions {
    pub max_results: Option<i32>,
    pub thumb_maps: Option<bool>,
    pub ignore_lat_lng_input: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    pub provided_location: Option<ProvidedLocation>,
    #[serde(default, alias = "location")]
    pub locations: Vec<GeocodeLocation>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidedLocation {
    pub location: Option<String>,
    pub lat_lng: Option<GeoPoint>,
}

/// Whether a location is a stop or a via point. Other values are kept
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeType {
    Stop,
    Via,
    Other(String),
}

impl GeocodeType {
    pub fn as_str(&self) -> &str {
        match self {
            GeocodeType::Stop => "s",
            GeocodeType::Via => "v",
            GeocodeType::Other(raw) => raw,
        }
    }
}

impl Serialize for GeocodeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GeocodeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "s" => GeocodeType::Stop,
            "v" => GeocodeType::Via,
            _ => GeocodeType::Other(raw),
        })
    }
}

/// A single geocoded location. Admin areas run from country (1) to
/// neighborhood (6).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeLocation {
    pub lat_lng: Option<GeoPoint>,
    pub display_lat_lng: Option<GeoPoint>,
    pub map_url: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<GeocodeType>,
    pub admin_area6: Option<String>,
    pub admin_area6_type: Option<String>,
    pub admin_area5: Option<String>,
    pub admin_area5_type: Option<String>,
    pub admin_area4: Option<String>,
    pub admin_area4_type: Option<String>,
    pub admin_area3: Option<String>,
    pub admin_area3_type: Option<String>,
    pub admin_area2: Option<String>,
    pub admin_area2_type: Option<String>,
    pub admin_area1: Option<String>,
    pub admin_area1_type: Option<String>,
    pub geocode_quality: Option<String>,
    pub geocode_quality_code: Option<String>,
    pub side_of_street: Option<String>,
    #[serde(alias = "unkownInput")]
    pub unknown_input: Option<String>,
    pub road_metadata: Option<RoadMetadata>,
    pub nearest_intersection: Option<NearestIntersection>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadMetadata {
    pub speed_limit_units: Option<String>,
    /// Undocumented shape; entries are kept as raw JSON.
    #[serde(alias = "TollRoad")]
    pub toll_road: Option<Vec<serde_json::Value>>,
    pub speed_limit: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestIntersection {
    pub street_display_name: Option<String>,
    pub distance_meters: Option<String>,
    pub lat_lng: Option<GeoPoint>,
    pub label: Option<String>,
}

/// Accessor for the geocoding endpoints.
#[derive(Debug, Clone, Copy)]
pub struct GeocodingApi<'a> {
    client: &'a Client,
}

impl<'a> GeocodingApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn build_address(&self, req: &GeocodeAddressRequest) -> Result<HttpRequest, ApiError> {
        self.client.build_request(ADDRESS_PATH, req, &[OUTPUT_FORMAT])
    }

    pub fn parse_address(&self, response: HttpResponse) -> Result<GeocodeResponse, ApiError> {
        parse_json(response)
    }

    pub fn address(&self, req: &GeocodeAddressRequest) -> Result<GeocodeResponse, ApiError> {
        let request = self.build_address(req)?;
        self.parse_address(self.client.send(&request)?)
    }

    /// Geocode a free-text location, capping results at `limit` (negative means zero).
    pub fn simple_address(&self, location: &str, limit: i32) -> Result<GeocodeResponse, ApiError> {
        self.address(&GeocodeAddressRequest {
            location: location.to_string(),
            max_results: Some(limit.max(0)),
            ..Default::default()
        })
    }

    pub fn build_reverse(&self, req: &GeocodeReverseRequest) -> Result<HttpRequest, ApiError> {
        self.client.build_request(REVERSE_PATH, req, &[OUTPUT_FORMAT])
    }

    pub fn parse_reverse(&self, response: HttpResponse) -> Result<GeocodeResponse, ApiError> {
        parse_json(response)
    }

    pub fn reverse(&self, req: &GeocodeReverseRequest) -> Result<GeocodeResponse, ApiError> {
        let request = self.build_reverse(req)?;
        self.parse_reverse(self.client.send(&request)?)
    }

    pub fn simple_reverse(&self, lat: f64, lng: f64) -> Result<GeocodeResponse, ApiError> {
        self.reverse(&GeocodeReverseRequest {
            location: GeoPoint::new(lat, lng),
            ..Default::default()
        })
    }
}
