//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every endpoint
//! over real HTTP through `UreqTransport`. Validates that request encoding
//! and response decoding agree with what the server accepts and returns.

#![cfg(feature = "ureq")]

use std::io::Read;

use mapquest_core::{
    ApiError, Client, GeoPoint, GeocodeAddressRequest, GeocodeReverseRequest, GeocodeType,
    InvalidInput, MapFormat, NominatimReverseRequest, NominatimSearchRequest, Size,
    StaticMapRequest, UreqTransport,
};

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn client(base: &str, key: &str) -> Client {
    Client::with_transport(key, UreqTransport::new()).with_base_url(base)
}

#[test]
fn geocoding_round_trip() {
    let base = start_server();
    let client = client(&base, "test-key");

    // Forward geocode with every option set.
    let resp = client
        .geocoding()
        .address(&GeocodeAddressRequest {
            location: "Denver, CO".to_string(),
            thumb_maps: false,
            max_results: Some(1),
            ..Default::default()
        })
        .unwrap();
    let options = resp.options.unwrap();
    assert_eq!(options.thumb_maps, Some(false));
    assert_eq!(options.max_results, Some(1));
    let results = resp.results.unwrap();
    let result = &results[0];
    assert_eq!(
        result.provided_location.as_ref().unwrap().location.as_deref(),
        Some("Denver, CO")
    );
    let location = &result.locations[0];
    assert_eq!(location.kind, Some(GeocodeType::Stop));
    assert_eq!(location.lat_lng, Some(GeoPoint::new(39.738453, -104.984853)));

    // Convenience form.
    let resp = client.geocoding().simple_address("Boulder", 3).unwrap();
    assert_eq!(resp.info.unwrap().status_code, Some(0));
    assert_eq!(resp.options.unwrap().max_results, Some(3));

    // Reverse without and with the optional sections.
    let resp = client.geocoding().simple_reverse(39.75, -104.99).unwrap();
    let results = resp.results.unwrap();
    let location = &results[0].locations[0];
    assert!(location.road_metadata.is_none());
    assert!(location.nearest_intersection.is_none());

    let resp = client
        .geocoding()
        .reverse(&GeocodeReverseRequest {
            location: GeoPoint::new(39.75, -104.99),
            thumb_maps: true,
            include_nearest_intersection: true,
            include_road_metadata: true,
        })
        .unwrap();
    let results = resp.results.unwrap();
    let location = &results[0].locations[0];
    assert_eq!(location.road_metadata.as_ref().unwrap().speed_limit, Some(25));
    assert_eq!(
        location.nearest_intersection.as_ref().unwrap().label.as_deref(),
        Some("Blake St & 16th St")
    );
    assert_eq!(location.lat_lng, Some(GeoPoint::new(39.75, -104.99)));
}

#[test]
fn nominatim_round_trip() {
    let base = start_server();
    let client = client(&base, "test-key");

    let resp = client.nominatim().simple_search("Springfield", 2).unwrap();
    assert_eq!(resp.results.len(), 2);
    let first = &resp.results[0];
    assert_eq!(first.lat, Some(48.1371079));
    assert_eq!(first.lon, Some(11.5753822));
    assert_eq!(first.place_id.as_deref(), Some("101"));
    assert_eq!(first.osm_id.as_deref(), Some("1010"));
    assert_eq!(first.bounding_box.as_ref().map(Vec::len), Some(4));

    // Structured search.
    let resp = client
        .nominatim()
        .search(&NominatimSearchRequest {
            city: Some("Eugene".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(resp.results.len(), 3);
    assert!(resp.results[2]
        .display_name
        .as_deref()
        .unwrap()
        .starts_with("Eugene"));

    let place = client
        .nominatim()
        .reverse(&NominatimReverseRequest {
            lat: 48.137,
            lon: 11.575,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(place.lat, Some(48.137));
    assert_eq!(place.lon, Some(11.575));
    assert_eq!(place.address.unwrap().city.as_deref(), Some("Munich"));
}

#[test]
fn static_map_round_trip() {
    let base = start_server();
    let client = client(&base, "test-key");

    let img = client
        .static_map()
        .map(&StaticMapRequest {
            size: Some(Size::new(40, 30)),
            center: Some("Denver, CO".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!((img.width(), img.height()), (40, 30));

    let img = client
        .static_map()
        .map(&StaticMapRequest {
            size: Some(Size::new(40, 30).retina()),
            format: Some(MapFormat::Jpg80),
            ..Default::default()
        })
        .unwrap();
    assert_eq!((img.width(), img.height()), (80, 60));

    let img = client
        .static_map()
        .map(&StaticMapRequest {
            size: Some(Size::new(12, 9)),
            format: Some(MapFormat::Gif),
            ..Default::default()
        })
        .unwrap();
    assert_eq!((img.width(), img.height()), (12, 9));

    // Raw bytes are handed over undecoded.
    let mut reader = client
        .static_map()
        .map_reader(&StaticMapRequest {
            size: Some(Size::new(8, 8)),
            format: Some(MapFormat::Gif),
            ..Default::default()
        })
        .unwrap();
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).unwrap();
    assert!(bytes.starts_with(b"GIF8"));
}

#[test]
fn errors_surface_as_api_errors() {
    let base = start_server();

    // The server rejects an empty key.
    let err = client(&base, "")
        .geocoding()
        .simple_address("Denver", 1)
        .unwrap_err();
    match err {
        ApiError::HttpStatus { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("AppKey"));
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }

    // Oversized maps never leave the client.
    let err = client(&base, "test-key")
        .static_map()
        .map(&StaticMapRequest {
            size: Some(Size::new(1921, 10)),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::InvalidInput(InvalidInput::DimensionTooLarge { axis: "width", .. })
    ));

    // Nothing listens on this port.
    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = closed.local_addr().unwrap();
    drop(closed);
    let err = client(&format!("http://{addr}"), "test-key")
        .nominatim()
        .simple_reverse(48.1, 11.5)
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
