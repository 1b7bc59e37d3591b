use std::{collections::HashMap, io::Cursor};

use axum::{
    extract::Query,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::debug;

pub type Params = HashMap<String, String>;
type Rejection = (StatusCode, String);

/// Fixed coordinate every forward geocode resolves to.
pub const DENVER: (f64, f64) = (39.738453, -104.984853);

/// Fill colour of rendered maps.
pub const WATER: [u8; 3] = [170, 211, 223];

pub fn app() -> Router {
    Router::new()
        .route("/geocoding/v1/address", get(geocode_address))
        .route("/geocoding/v1/reverse", get(geocode_reverse))
        .route("/nominatim/v1/search.php", get(nominatim_search))
        .route("/nominatim/v1/reverse.php", get(nominatim_reverse))
        .route("/staticmap/v5/map", get(static_map))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn require_key(params: &Params) -> Result<(), Rejection> {
    match params.get("key") {
        Some(key) if !key.is_empty() => Ok(()),
        _ => Err((
            StatusCode::FORBIDDEN,
            "The AppKey submitted with this request is invalid.".to_string(),
        )),
    }
}

fn bad_request(msg: &str) -> Rejection {
    (StatusCode::BAD_REQUEST, format!("Illegal argument from request: {msg}"))
}

fn flag(params: &Params, name: &str, default: bool) -> bool {
    params.get(name).map(|v| v == "true").unwrap_or(default)
}

fn parse_lat_lng(value: &str) -> Option<(f64, f64)> {
    let (lat, lng) = value.split_once(',')?;
    Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
}

async fn geocode_address(Query(params): Query<Params>) -> Result<Json<Value>, Rejection> {
    require_key(&params)?;
    debug!(?params, "geocode address");
    let location = params.get("location").cloned().unwrap_or_default();
    let max_results: i64 = params
        .get("maxResults")
        .and_then(|v| v.parse().ok())
        .unwrap_or(-1);

    Ok(Json(json!({
        "info": {
            "statuscode": 0,
            "copyright": {
                "text": "© 2024 MapQuest, Inc.",
                "imageUrl": "https://api.mqcdn.com/res/mqlogo.gif",
                "imageAltText": "© 2024 MapQuest, Inc."
            },
            "messages": []
        },
        "options": {
            "maxResults": max_results,
            "thumbMaps": flag(&params, "thumbMaps", true),
            "ignoreLatLngInput": flag(&params, "ignoreLatLngInput", false)
        },
        "results": [{
            "providedLocation": { "location": location },
            "locations": [{
                "street": "",
                "adminArea5": location,
                "adminArea5Type": "City",
                "adminArea1": "US",
                "adminArea1Type": "Country",
                "type": "s",
                "geocodeQuality": "CITY",
                "geocodeQualityCode": "A5XAX",
                "latLng": { "lat": DENVER.0, "lng": DENVER.1 },
                "displayLatLng": { "lat": DENVER.0, "lng": DENVER.1 }
            }]
        }]
    })))
}

async fn geocode_reverse(Query(params): Query<Params>) -> Result<Json<Value>, Rejection> {
    require_key(&params)?;
    let (lat, lng) = params
        .get("location")
        .and_then(|v| parse_lat_lng(v))
        .ok_or_else(|| bad_request("location"))?;

    let mut location = json!({
        "street": "1555 Blake St",
        "postalCode": "80202",
        "adminArea5": "Denver",
        "adminArea5Type": "City",
        "type": "s",
        "geocodeQualityCode": "P1AAA",
        "latLng": { "lat": lat, "lng": lng }
    });
    if flag(&params, "includeRoadMetadata", false) {
        location["roadMetadata"] = json!({
            "speedLimitUnits": "mph",
            "tollRoad": null,
            "speedLimit": 25
        });
    }
    if flag(&params, "includeNearestIntersection", false) {
        location["nearestIntersection"] = json!({
            "streetDisplayName": "Blake St",
            "distanceMeters": "41.2",
            "latLng": { "lat": lat, "lng": lng },
            "label": "Blake St & 16th St"
        });
    }

    Ok(Json(json!({
        "info": { "statuscode": 0, "messages": [] },
        "options": { "thumbMaps": flag(&params, "thumbMaps", true) },
        "results": [{
            "providedLocation": { "latLng": { "lat": lat, "lng": lng } },
            "locations": [location]
        }]
    })))
}

fn place(place_id: u64, name: &str, lat: &str, lon: &str) -> Value {
    json!({
        "place_id": place_id.to_string(),
        "licence": "Data © OpenStreetMap contributors, ODbL 1.0.",
        "osm_type": "node",
        "osm_id": place_id * 10,
        "boundingbox": ["48.0616244", "48.2481162", "11.360777", "11.7229083"],
        "lat": lat,
        "lon": lon,
        "display_name": name,
        "class": "place",
        "type": "city",
        "importance": 0.82
    })
}

async fn nominatim_search(Query(params): Query<Params>) -> Result<Json<Value>, Rejection> {
    require_key(&params)?;
    let label = params
        .get("q")
        .or_else(|| params.get("city"))
        .cloned()
        .ok_or_else(|| bad_request("q or city"))?;

    let mut results = vec![
        place(101, &format!("{label}, Bavaria, Germany"), "48.1371079", "11.5753822"),
        place(102, &format!("{label}, Illinois, United States"), "39.7990175", "-89.6439575"),
        place(103, &format!("{label}, Oregon, United States"), "44.0462362", "-123.0220289"),
    ];
    if let Some(limit) = params.get("limit").and_then(|v| v.parse::<usize>().ok()) {
        if limit > 0 {
            results.truncate(limit);
        }
    }
    Ok(Json(Value::Array(results)))
}

async fn nominatim_reverse(Query(params): Query<Params>) -> Result<Json<Value>, Rejection> {
    require_key(&params)?;
    let lat = params.get("lat").ok_or_else(|| bad_request("lat"))?;
    let lon = params.get("lon").ok_or_else(|| bad_request("lon"))?;

    let mut result = place(201, "Marienplatz, Munich, Bavaria, Germany", lat, lon);
    result["address"] = json!({
        "road": "Marienplatz",
        "city": "Munich",
        "state": "Bavaria",
        "postcode": "80331",
        "country": "Germany",
        "country_code": "de"
    });
    Ok(Json(result))
}

/// Parse `W,H` or `W,H@2`; defaults to 400x300.
fn parse_size(value: Option<&String>) -> Result<(u32, u32), Rejection> {
    let Some(value) = value else {
        return Ok((400, 300));
    };
    let (dims, scale) = match value.strip_suffix("@2") {
        Some(dims) => (dims, 2),
        None => (value.as_str(), 1),
    };
    let (w, h) = dims.split_once(',').ok_or_else(|| bad_request("size"))?;
    let w: u32 = w.parse().map_err(|_| bad_request("size"))?;
    let h: u32 = h.parse().map_err(|_| bad_request("size"))?;
    if w == 0 || h == 0 || w > 1920 || h > 1920 {
        return Err(bad_request("size"));
    }
    Ok((w * scale, h * scale))
}

async fn static_map(Query(params): Query<Params>) -> Result<impl IntoResponse, Rejection> {
    require_key(&params)?;
    let (width, height) = parse_size(params.get("size"))?;
    let (format, content_type) = match params.get("format").map(String::as_str) {
        None | Some("png") => (ImageFormat::Png, "image/png"),
        Some("gif") => (ImageFormat::Gif, "image/gif"),
        Some(f) if f.starts_with("jp") => (ImageFormat::Jpeg, "image/jpeg"),
        Some(_) => return Err(bad_request("format")),
    };

    let image = match format {
        ImageFormat::Gif => {
            let [r, g, b] = WATER;
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])))
        }
        _ => DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(WATER))),
    };
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_key_is_forbidden() {
        let err = require_key(&params(&[])).unwrap_err();
        assert_eq!(err.0, StatusCode::FORBIDDEN);
        assert!(require_key(&params(&[("key", "")])).is_err());
        assert!(require_key(&params(&[("key", "k")])).is_ok());
    }

    #[test]
    fn size_parsing() {
        assert_eq!(parse_size(None).unwrap(), (400, 300));
        assert_eq!(parse_size(Some(&"10,20".to_string())).unwrap(), (10, 20));
        assert_eq!(parse_size(Some(&"10,20@2".to_string())).unwrap(), (20, 40));
        assert!(parse_size(Some(&"1921,20".to_string())).is_err());
        assert!(parse_size(Some(&"@2".to_string())).is_err());
    }

    #[test]
    fn lat_lng_parsing() {
        assert_eq!(parse_lat_lng("48.100000,11.500000"), Some((48.1, 11.5)));
        assert_eq!(parse_lat_lng("48.1"), None);
        assert_eq!(parse_lat_lng("a,b"), None);
    }

    #[test]
    fn flags_fall_back_to_default() {
        let p = params(&[("thumbMaps", "false")]);
        assert!(!flag(&p, "thumbMaps", true));
        assert!(flag(&p, "missing", true));
    }

    #[test]
    fn places_use_string_coordinates() {
        let p = place(1, "x", "48.1", "11.5");
        assert_eq!(p["lat"], "48.1");
        assert_eq!(p["osm_id"], 10);
    }
}
