//! Nominatim (OpenStreetMap data) search and reverse lookup.
//!
//! # Design
//! Search accepts either a free-text query or structured address parts,
//! never both: a non-empty `query` suppresses the structured fields when the
//! request is encoded.
//!
//! Nominatim sends coordinates, bounding boxes and importance as quoted
//! strings on some deployments and bare numbers on others, and ids as either
//! strings or integers. The decoders accept both forms.

use serde::{Deserialize, Deserializer, Serialize};

use crate::client::{parse_json, Client};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::query::{coord, EncodeQuery, QueryParams, QueryValue};

const SEARCH_PATH: &str = "nominatim/v1/search.php";
const REVERSE_PATH: &str = "nominatim/v1/reverse.php";
const OUTPUT_FORMAT: (&str, &str) = ("format", "json");

/// Rectangle biasing or restricting search results.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct ViewBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl QueryValue for ViewBox {
    fn to_query_value(&self) -> Result<String, ApiError> {
        Ok(format!(
            "{},{},{},{}",
            coord(self.left),
            coord(self.top),
            coord(self.right),
            coord(self.bottom)
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum OsmType {
    #[serde(rename = "N")]
    Node,
    #[serde(rename = "W")]
    Way,
    #[serde(rename = "R")]
    Relation,
}

impl OsmType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OsmType::Node => "N",
            OsmType::Way => "W",
            OsmType::Relation => "R",
        }
    }
}

/// Place search request.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct NominatimSearchRequest {
    /// Free-text query. Takes precedence over the structured fields.
    pub query: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub address_details: bool,
    pub limit: Option<i32>,
    pub country_codes: Vec<String>,
    pub view_box: Option<ViewBox>,
    pub exclude_place_ids: Vec<String>,
    pub bounded: bool,
    pub route_width: Option<f64>,
    pub osm_type: Option<OsmType>,
    pub osm_id: Option<String>,
}

impl NominatimSearchRequest {
    fn free_text(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.is_empty())
    }
}

impl EncodeQuery for NominatimSearchRequest {
    fn encode_query(&self, params: &mut QueryParams) -> Result<(), ApiError> {
        match self.free_text() {
            Some(q) => params.set("q", q),
            None => {
                params.set_opt("street", self.street.as_deref());
                params.set_opt("city", self.city.as_deref());
                params.set_opt("county", self.county.as_deref());
                params.set_opt("state", self.state.as_deref());
                params.set_opt("country", self.country.as_deref());
                params.set_opt("postalcode", self.postal_code.as_deref());
            }
        }
        params.set_flag("addressdetails", self.address_details);
        params.set_limit("limit", self.limit);
        params.set_list("countrycodes", &self.country_codes);
        params.encode_opt("viewbox", self.view_box.as_ref())?;
        params.set_list("exclude_place_ids", &self.exclude_place_ids);
        params.set_flag("bounded", self.bounded);
        if let Some(width) = self.route_width {
            params.set("routewidth", width.to_string());
        }
        params.set_opt("osm_type", self.osm_type.as_ref().map(OsmType::as_str));
        params.set_opt("osm_id", self.osm_id.as_deref());
        Ok(())
    }
}

/// Reverse lookup request.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct NominatimReverseRequest {
    pub lat: f64,
    pub lon: f64,
    pub osm_type: Option<OsmType>,
    pub osm_id: Option<String>,
}

impl EncodeQuery for NominatimReverseRequest {
    fn encode_query(&self, params: &mut QueryParams) -> Result<(), ApiError> {
        params.set("lat", coord(self.lat));
        params.set("lon", coord(self.lon));
        params.set_opt("osm_type", self.osm_type.as_ref().map(OsmType::as_str));
        params.set_opt("osm_id", self.osm_id.as_deref());
        Ok(())
    }
}

/// Search results in service order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NominatimSearchResponse {
    pub results: Vec<NominatimPlace>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NominatimPlace {
    pub address: Option<NominatimAddress>,
    /// `[south, north, west, east]`.
    #[serde(default, rename = "boundingbox", deserialize_with = "lenient_f64_vec")]
    pub bounding_box: Option<Vec<f64>>,
    pub class: Option<String>,
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub importance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lon: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub osm_id: Option<String>,
    pub osm_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub place_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub licence: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NominatimAddress {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub pedestrian: Option<String>,
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub hamlet: Option<String>,
    pub village: Option<String>,
    pub town: Option<String>,
    pub city: Option<String>,
    pub city_district: Option<String>,
    pub county: Option<String>,
    pub state_district: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub continent: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected a number, got {s:?}"))),
        }
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Option::<NumberOrString>::deserialize(d)?
        .map(NumberOrString::into_f64::<D::Error>)
        .transpose()
}

fn lenient_f64_vec<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<f64>>, D::Error> {
    Option::<Vec<NumberOrString>>::deserialize(d)?
        .map(|items| items.into_iter().map(NumberOrString::into_f64::<D::Error>).collect())
        .transpose()
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match Option::<serde_json::Value>::deserialize(d)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}

/// Accessor for the Nominatim endpoints.
#[derive(Debug, Clone, Copy)]
pub struct NominatimApi<'a> {
    client: &'a Client,
}

impl<'a> NominatimApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn build_search(&self, req: &NominatimSearchRequest) -> Result<HttpRequest, ApiError> {
        self.client.build_request(SEARCH_PATH, req, &[OUTPUT_FORMAT])
    }

    pub fn parse_search(&self, response: HttpResponse) -> Result<NominatimSearchResponse, ApiError> {
        parse_json(response)
    }

    pub fn search(&self, req: &NominatimSearchRequest) -> Result<NominatimSearchResponse, ApiError> {
        let request = self.build_search(req)?;
        self.parse_search(self.client.send(&request)?)
    }

    pub fn simple_search(&self, query: &str, limit: i32) -> Result<NominatimSearchResponse, ApiError> {
        self.search(&NominatimSearchRequest {
            query: Some(query.to_string()),
            limit: Some(limit.max(0)),
            ..Default::default()
        })
    }

    pub fn build_reverse(&self, req: &NominatimReverseRequest) -> Result<HttpRequest, ApiError> {
        self.client.build_request(REVERSE_PATH, req, &[OUTPUT_FORMAT])
    }

    pub fn parse_reverse(&self, response: HttpResponse) -> Result<NominatimPlace, ApiError> {
        parse_json(response)
    }

    pub fn reverse(&self, req: &NominatimReverseRequest) -> Result<NominatimPlace, ApiError> {
        let request = self.build_reverse(req)?;
        self.parse_reverse(self.client.send(&request)?)
    }

    pub fn simple_reverse(&self, lat: f64, lon: f64) -> Result<NominatimPlace, ApiError> {
        self.reverse(&NominatimReverseRequest {
            lat,
            lon,
            ..Default::default()
        })
    }
}
