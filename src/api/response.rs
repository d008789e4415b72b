// API response utility functions module

use crate::http::response::log_build_error;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Build JSON response
///
/// Bodies are compact and keep non-ASCII text unescaped.
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    enable_cors: bool,
) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return internal_error();
        }
    };

    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", "application/json; charset=utf-8")
        .header("Content-Length", json.len())
        .header("Cache-Control", "no-store");
    if enable_cors {
        builder = builder.header("Access-Control-Allow-Origin", "*");
    }

    builder.body(Full::new(Bytes::from(json))).unwrap_or_else(|e| {
        log_build_error(status, &e);
        internal_error()
    })
}

fn internal_error() -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::from_static(
        br#"{"error":"Internal server error"}"#,
    )));
    *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    resp
}
