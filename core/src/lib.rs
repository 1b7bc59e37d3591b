//! Synchronous client for the MapQuest Open Data APIs.
//!
//! # Overview
//! Covers geocoding (`geocoding/v1`), Nominatim place search
//! (`nominatim/v1`) and static map images (`staticmap/v5`). Each call
//! encodes a typed request into the query-string grammar the service
//! expects, performs one GET through an injected `Transport`, and decodes
//! the JSON or image body.
//!
//! ```no_run
//! use mapquest_core::{Client, Size, StaticMapRequest};
//!
//! let client = Client::new("<your-app-key>");
//! let img = client.static_map().map(&StaticMapRequest {
//!     center: Some("11.54165,48.151313".to_string()),
//!     zoom: Some(9),
//!     size: Some(Size::new(500, 300)),
//!     ..Default::default()
//! })?;
//! # Ok::<(), mapquest_core::ApiError>(())
//! ```
//!
//! # Design
//! - `Client` is immutable after construction: key, base URL, transport.
//! - Every endpoint has a pure `build_*`, a pure `parse_*`, and a method
//!   that runs both around the transport, so hosts can do the I/O
//!   themselves.
//! - Request types implement `EncodeQuery` field by field; values with
//!   their own grammar implement `QueryValue`.
//! - No retries, caching or timeouts in the core. Configure timeouts on the
//!   transport.

pub mod client;
pub mod config;
pub mod error;
pub mod geo;
pub mod geocoding;
pub mod http;
pub mod nominatim;
pub mod query;
pub mod static_map;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{ApiError, InvalidInput, TransportError};
pub use geo::{BoundingBox, GeoPoint};
pub use geocoding::{
    GeocodeAddressRequest, GeocodeLocation, GeocodeResponse, GeocodeReverseRequest, GeocodeType,
    GeocodingApi,
};
#[cfg(feature = "ureq")]
pub use http::UreqTransport;
pub use http::{HttpRequest, HttpResponse, Transport};
pub use nominatim::{
    NominatimApi, NominatimPlace, NominatimReverseRequest, NominatimSearchRequest,
    NominatimSearchResponse, OsmType, ViewBox,
};
pub use query::{EncodeQuery, QueryParams, QueryValue};
pub use static_map::{
    Banner, BannerSize, Color, Location, LocationList, MapFormat, MapType, Scalebar,
    ScalebarPosition, Size, StaticMapApi, StaticMapRequest,
};
