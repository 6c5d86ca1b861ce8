//! HTTP server for the Darwin Core converter API.
//!
//! A thin transport wrapper over [`crate::convert`]: all request state lives
//! on the stack of a single handler invocation, so concurrent uploads need
//! no coordination.
//!
//! # API Endpoints
//!
//! | Method | Path        | Description                          |
//! |--------|-------------|--------------------------------------|
//! | GET    | `/health`   | Health check                         |
//! | POST   | `/convert`  | Convert an uploaded CSV with mapping |

use axum::{
    extract::{Multipart, Query},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

use super::types::{error_response, ConvertQuery, OUTPUT_FILENAME};
use crate::convert::convert_csv_to_dwc;
use crate::mapping::MappingSpec;

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/convert", post(convert))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Darwin Core converter running on http://localhost:{}", port);
    println!("   POST /convert - Convert CSV using a column mapping");
    println!("   GET  /health  - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "dwc-converter",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "convert": "POST /convert",
            "health": "GET /health"
        }
    }))
}

type Rejection = (StatusCode, Json<Value>);

fn bad_request(message: &str) -> Rejection {
    (StatusCode::BAD_REQUEST, Json(error_response(message)))
}

/// Convert endpoint.
///
/// Expects a multipart form with a `csv_file` part (the input table) and a
/// `mapping_file` part (the mapping JSON). Responds with the converted CSV
/// as a download, or a 400 carrying the failing component's error text.
async fn convert(
    Query(query): Query<ConvertQuery>,
    mut multipart: Multipart,
) -> Result<Response, Rejection> {
    let mut csv_bytes: Option<Vec<u8>> = None;
    let mut mapping_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| bad_request(&format!("Read error: {}", e)))?
            .to_vec();

        match name.as_str() {
            "csv_file" => csv_bytes = Some(data),
            "mapping_file" => mapping_bytes = Some(data),
            _ => {}
        }
    }

    let csv_bytes = csv_bytes
        .filter(|b| !b.is_empty())
        .ok_or_else(|| bad_request("Empty CSV file."))?;
    let mapping_bytes = mapping_bytes
        .filter(|b| !b.is_empty())
        .ok_or_else(|| bad_request("Empty mapping JSON file."))?;

    // The mapping must be valid JSON before any row work starts.
    let mapping = std::str::from_utf8(&mapping_bytes)
        .ok()
        .and_then(|text| MappingSpec::from_json(text).ok())
        .ok_or_else(|| bad_request("Invalid mapping JSON format."))?;

    let options = query.to_options().map_err(|e| bad_request(&e))?;

    println!(
        "📄 Convert request: {} input bytes, {} mapping fields",
        csv_bytes.len(),
        mapping.fields.len()
    );

    let output = convert_csv_to_dwc(&csv_bytes, &mapping, &options)
        .map_err(|e| bad_request(&e.to_string()))?;

    println!("✅ Converted {} output bytes", output.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", OUTPUT_FILENAME),
            ),
        ],
        output,
    )
        .into_response())
}
