use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn get(uri: &str) -> axum::response::Response {
    app()
        .oneshot(Request::builder().uri(uri).body(String::new()).unwrap())
        .await
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn every_endpoint_requires_a_key() {
    for uri in [
        "/geocoding/v1/address?location=Denver",
        "/geocoding/v1/reverse?location=39.7,-104.9",
        "/nominatim/v1/search.php?q=Munich",
        "/nominatim/v1/reverse.php?lat=48.1&lon=11.5",
        "/staticmap/v5/map?size=10,10",
    ] {
        let resp = get(uri).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{uri}");
        let body = body_bytes(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("AppKey"), "{uri}");
    }
}

// --- geocoding ---

#[tokio::test]
async fn address_echoes_location_and_thumb_maps() {
    let resp = get("/geocoding/v1/address?key=k&location=Denver%2C+CO&thumbMaps=false&maxResults=2").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["info"]["statuscode"], 0);
    assert_eq!(body["options"]["thumbMaps"], false);
    assert_eq!(body["options"]["maxResults"], 2);
    assert_eq!(body["results"][0]["providedLocation"]["location"], "Denver, CO");
    assert_eq!(body["results"][0]["locations"][0]["latLng"]["lat"], 39.738453);
}

#[tokio::test]
async fn reverse_includes_optional_sections_on_request() {
    let resp = get("/geocoding/v1/reverse?key=k&location=39.75,-104.99").await;
    let body = body_json(resp).await;
    let location = &body["results"][0]["locations"][0];
    assert!(location.get("roadMetadata").is_none());
    assert!(location.get("nearestIntersection").is_none());

    let resp = get(
        "/geocoding/v1/reverse?key=k&location=39.75,-104.99&includeRoadMetadata=true&includeNearestIntersection=true",
    )
    .await;
    let body = body_json(resp).await;
    let location = &body["results"][0]["locations"][0];
    assert_eq!(location["roadMetadata"]["speedLimit"], 25);
    assert_eq!(location["nearestIntersection"]["distanceMeters"], "41.2");
    assert_eq!(location["latLng"]["lng"], -104.99);
}

#[tokio::test]
async fn reverse_rejects_malformed_location() {
    let resp = get("/geocoding/v1/reverse?key=k&location=nowhere").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- nominatim ---

#[tokio::test]
async fn search_returns_string_coordinates_and_honours_limit() {
    let resp = get("/nominatim/v1/search.php?key=k&format=json&q=Springfield&limit=2").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0]["lat"].is_string());
    assert!(results[0]["display_name"].as_str().unwrap().starts_with("Springfield"));
}

#[tokio::test]
async fn search_accepts_structured_city() {
    let resp = get("/nominatim/v1/search.php?key=k&city=Eugene").await;
    let body = body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn search_without_query_is_rejected() {
    let resp = get("/nominatim/v1/search.php?key=k").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn nominatim_reverse_returns_address() {
    let resp = get("/nominatim/v1/reverse.php?key=k&lat=48.137&lon=11.575").await;
    let body = body_json(resp).await;
    assert_eq!(body["lat"], "48.137");
    assert_eq!(body["address"]["city"], "Munich");
}

// --- static map ---

#[tokio::test]
async fn map_renders_requested_size_and_format() {
    let resp = get("/staticmap/v5/map?key=k&size=32,16").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = body_bytes(resp).await;
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (32, 16));
}

#[tokio::test]
async fn map_retina_doubles_dimensions() {
    let resp = get("/staticmap/v5/map?key=k&size=32,16@2&format=jpg80").await;
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/jpeg");
    let bytes = body_bytes(resp).await;
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (64, 32));
}

#[tokio::test]
async fn map_gif() {
    let resp = get("/staticmap/v5/map?key=k&size=8,8&format=gif").await;
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/gif");
    let bytes = body_bytes(resp).await;
    assert_eq!(
        image::guess_format(&bytes).unwrap(),
        image::ImageFormat::Gif
    );
}

#[tokio::test]
async fn map_rejects_oversized_request() {
    let resp = get("/staticmap/v5/map?key=k&size=4000,10").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
