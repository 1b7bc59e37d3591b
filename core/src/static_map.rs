//! Static map API: server-rendered map bitmaps.
//!
//! # Design
//! Most of the request is plain values, but several parameters use their own
//! small grammars:
//!
//! - `size`: `W,H` with an optional `@2` retina suffix.
//! - `locations`: entries joined by `||`, each `location|marker`.
//! - `banner`: text, then modifiers. The first modifier follows a `|`, the
//!   rest follow a `-`.
//! - colors: decimal `R,G,B` or `R,G,B,A`.
//!
//! The response is a PNG, GIF or JPEG body. `map` decodes it with the
//! `image` crate; `map_reader` hands back the raw stream.

use std::io::Read;

use image::DynamicImage;
use serde::Deserialize;
use tracing::trace;

use crate::client::{check_status, Client};
use crate::error::{ApiError, InvalidInput};
use crate::geo::BoundingBox;
use crate::http::{HttpRequest, HttpResponse};
use crate::query::{EncodeQuery, QueryParams, QueryValue};

const MAP_PATH: &str = "staticmap/v5/map";

/// Largest width or height the service renders.
pub const MAX_DIMENSION: u32 = 1920;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
    /// Request a double-density image.
    pub retina: bool,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            retina: false,
        }
    }

    pub fn retina(mut self) -> Self {
        self.retina = true;
        self
    }
}

impl QueryValue for Size {
    fn to_query_value(&self) -> Result<String, ApiError> {
        for (axis, value) in [("width", self.width), ("height", self.height)] {
            if value > MAX_DIMENSION {
                return Err(InvalidInput::DimensionTooLarge {
                    axis,
                    value,
                    max: MAX_DIMENSION,
                }
                .into());
            }
        }

        let mut size = String::new();
        if self.width > 0 && self.height > 0 {
            size = format!("{},{}", self.width, self.height);
        }
        if self.retina {
            size.push_str("@2");
        }
        Ok(size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapFormat {
    Png,
    Gif,
    Jpeg,
    Jpg,
    Jpg70,
    Jpg80,
    Jpg90,
}

impl MapFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapFormat::Png => "png",
            MapFormat::Gif => "gif",
            MapFormat::Jpeg => "jpeg",
            MapFormat::Jpg => "jpg",
            MapFormat::Jpg70 => "jpg70",
            MapFormat::Jpg80 => "jpg80",
            MapFormat::Jpg90 => "jpg90",
        }
    }
}

/// Map style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MapType {
    #[serde(rename = "dark")]
    Dark,
    #[serde(rename = "light")]
    Light,
    #[serde(rename = "map")]
    Map,
    #[serde(rename = "hyb")]
    Hybrid,
    #[serde(rename = "sat")]
    Satellite,
}

impl MapType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapType::Dark => "dark",
            MapType::Light => "light",
            MapType::Map => "map",
            MapType::Hybrid => "hyb",
            MapType::Satellite => "sat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalebarPosition {
    Top,
    Bottom,
}

impl ScalebarPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalebarPosition::Top => "top",
            ScalebarPosition::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Scalebar {
    pub enabled: bool,
    pub position: Option<ScalebarPosition>,
}

impl QueryValue for Scalebar {
    fn to_query_value(&self) -> Result<String, ApiError> {
        if !self.enabled {
            return Ok("false".to_string());
        }
        Ok(match self.position {
            Some(position) => format!("true|{}", position.as_str()),
            None => "true".to_string(),
        })
    }
}

/// A location, either an address or `lat,lng`, with an optional marker
/// descriptor such as `marker-sm-22407F`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Location {
    pub location: String,
    pub marker: Option<String>,
}

impl Location {
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            marker: None,
        }
    }

    pub fn with_marker(mut self, marker: &str) -> Self {
        self.marker = Some(marker.to_string());
        self
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.marker.as_deref().filter(|m| !m.is_empty()) {
            Some(marker) => write!(f, "{}|{marker}", self.location),
            None => f.write_str(&self.location),
        }
    }
}

impl QueryValue for Location {
    fn to_query_value(&self) -> Result<String, ApiError> {
        Ok(self.to_string())
    }
}

/// Ordered locations. An empty list still encodes, to an empty value.
pub type LocationList = Vec<Location>;

impl QueryValue for LocationList {
    fn to_query_value(&self) -> Result<String, ApiError> {
        Ok(self
            .iter()
            .map(Location::to_string)
            .collect::<Vec<_>>()
            .join("||"))
    }
}

/// RGBA color. An alpha of zero means "not specified".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0 }
    }

    /// From a packed `0xRRGGBB` value.
    pub fn from_rgb(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
            a: 0,
        }
    }

    /// From a packed `0xRRGGBBAA` value.
    pub fn from_rgba(hex: u32) -> Self {
        Self {
            a: (hex & 0xff) as u8,
            ..Self::from_rgb(hex >> 8)
        }
    }
}

impl QueryValue for Color {
    fn to_query_value(&self) -> Result<String, ApiError> {
        Ok(if self.a == 0 {
            format!("{},{},{}", self.r, self.g, self.b)
        } else {
            format!("{},{},{},{}", self.r, self.g, self.b, self.a)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum BannerSize {
    #[serde(rename = "sm")]
    Small,
    #[serde(rename = "md")]
    Medium,
    #[serde(rename = "lg")]
    Large,
}

impl BannerSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            BannerSize::Small => "sm",
            BannerSize::Medium => "md",
            BannerSize::Large => "lg",
        }
    }
}

/// Text banner drawn over the map. Shown at the bottom unless `on_top`.
///
/// Colors are packed `0xRRGGBB` values; bits above 24 are ignored and zero
/// leaves the service default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Banner {
    pub text: String,
    pub size: Option<BannerSize>,
    pub on_top: bool,
    pub text_color: u32,
    pub background_color: u32,
}

impl QueryValue for Banner {
    fn to_query_value(&self) -> Result<String, ApiError> {
        let mut value = self.text.clone();
        let mut has_modifier = false;
        let mut push = |modifier: &str| {
            value.push(if has_modifier { '-' } else { '|' });
            value.push_str(modifier);
            has_modifier = true;
        };

        if let Some(size) = self.size {
            push(size.as_str());
        }
        if self.on_top {
            push("top");
        }
        // Only the low 24 bits are a color.
        let text_color = self.text_color & 0xff_ffff;
        let background_color = self.background_color & 0xff_ffff;
        if text_color != 0 {
            push(&format!("{text_color:06x}"));
        }
        if background_color != 0 {
            // The background slot is positional and follows the text color.
            if text_color == 0 {
                push("ffffff");
            }
            push(&format!("{background_color:06x}"));
        }
        Ok(value)
    }
}

/// Static map request. Every field is optional.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct StaticMapRequest {
    pub size: Option<Size>,
    /// Address or `lat,lng`.
    pub center: Option<String>,
    pub bounding_box: Option<BoundingBox>,
    pub margin: Option<u32>,
    pub zoom: Option<u8>,
    pub format: Option<MapFormat>,
    #[serde(rename = "type")]
    pub map_type: Option<MapType>,
    pub scalebar: Option<Scalebar>,

    /// `Some(vec![])` sends an empty `locations=`; `None` omits it.
    pub locations: Option<LocationList>,
    pub declutter: bool,
    pub default_marker: Option<String>,

    pub banner: Option<Banner>,

    pub start: Option<Location>,
    pub end: Option<Location>,
    pub route_arc: bool,
    pub route_width: Option<u32>,
    pub route_color: Option<Color>,
}

impl EncodeQuery for StaticMapRequest {
    fn encode_query(&self, params: &mut QueryParams) -> Result<(), ApiError> {
        params.encode_opt("size", self.size.as_ref())?;
        params.set_opt("center", self.center.as_deref());
        params.encode_opt("boundingBox", self.bounding_box.as_ref())?;
        if let Some(margin) = self.margin {
            params.set("margin", margin.to_string());
        }
        if let Some(zoom) = self.zoom {
            params.set("zoom", zoom.to_string());
        }
        params.set_opt("format", self.format.as_ref().map(MapFormat::as_str));
        params.set_opt("type", self.map_type.as_ref().map(MapType::as_str));
        params.encode_opt("scalebar", self.scalebar.as_ref())?;

        params.encode_opt("locations", self.locations.as_ref())?;
        params.set_flag("declutter", self.declutter);
        params.set_opt("defaultMarker", self.default_marker.as_deref());

        params.encode_opt("banner", self.banner.as_ref())?;

        params.encode_opt("start", self.start.as_ref())?;
        params.encode_opt("end", self.end.as_ref())?;
        params.set_flag("routeArc", self.route_arc);
        if let Some(width) = self.route_width {
            params.set("routeWidth", width.to_string());
        }
        params.encode_opt("routeColor", self.route_color.as_ref())?;
        Ok(())
    }
}

/// Accessor for the static map endpoint.
#[derive(Debug, Clone, Copy)]
pub struct StaticMapApi<'a> {
    client: &'a Client,
}

impl<'a> StaticMapApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fails with `InvalidInput` before any I/O when the size is too large.
    pub fn build_map(&self, req: &StaticMapRequest) -> Result<HttpRequest, ApiError> {
        self.client.build_request(MAP_PATH, req, &[])
    }

    /// Decode a map response body into a bitmap.
    pub fn parse_map(&self, response: HttpResponse) -> Result<DynamicImage, ApiError> {
        let mut response = check_status(response)?;
        let mut bytes = Vec::new();
        response
            .body
            .read_to_end(&mut bytes)
            .map_err(|e| ApiError::Transport(e.into()))?;
        drop(response);

        let image = image::load_from_memory(&bytes)?;
        trace!(
            bytes = bytes.len(),
            width = image.width(),
            height = image.height(),
            "decoded static map"
        );
        Ok(image)
    }

    pub fn map(&self, req: &StaticMapRequest) -> Result<DynamicImage, ApiError> {
        let request = self.build_map(req)?;
        self.parse_map(self.client.send(&request)?)
    }

    /// Fetch the map and return the undecoded image stream.
    pub fn map_reader(&self, req: &StaticMapRequest) -> Result<Box<dyn Read + Send>, ApiError> {
        let request = self.build_map(req)?;
        let response = check_status(self.client.send(&request)?)?;
        Ok(response.body)
    }
}
