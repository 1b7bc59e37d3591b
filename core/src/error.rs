//! Error types for the MapQuest client.
//!
//! # Design
//! Every failed call yields exactly one `ApiError`. Input problems are
//! detected while the query string is built, so `InvalidInput` never costs a
//! network round trip. Transport errors are carried unchanged so callers can
//! downcast to the concrete error of the transport they injected.

use thiserror::Error;

/// Boxed error produced by a `Transport` implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Caller-supplied values the service would reject.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    /// A static map dimension exceeds the service maximum.
    #[error("map {axis} of {value}px exceeds the maximum of {max}px")]
    DimensionTooLarge {
        axis: &'static str,
        value: u32,
        max: u32,
    },

    /// No API key was configured.
    #[error("no API key configured")]
    MissingApiKey,
}

/// Errors returned by the endpoint accessors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was rejected before it reached the network.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// The request URL could not be assembled.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The injected transport failed to deliver the request.
    #[error("transport failed: {0}")]
    Transport(#[source] TransportError),

    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response body did not match the expected JSON shape.
    #[error("decoding failed: {0}")]
    Decode(String),

    /// The static map body was not a PNG, GIF or JPEG the codec could read.
    #[error("image decoding failed: {0}")]
    ImageCodec(#[from] image::ImageError),
}
