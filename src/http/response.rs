//! HTTP response building module
//!
//! Builders for the plain (non-JSON) responses of the static file server.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW};
use hyper::{Response, StatusCode};

const ALLOWED_METHODS: &str = "GET, HEAD, POST, OPTIONS";

fn plain_text(status: StatusCode, text: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from_static(text.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            Response::new(Full::new(Bytes::from_static(text.as_bytes())))
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, last_modified: Option<&str>) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header("ETag", etag);
    if let Some(lm) = last_modified {
        builder = builder.header("Last-Modified", lm);
    }
    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error(StatusCode::NOT_MODIFIED, &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    plain_text(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    let mut resp = plain_text(StatusCode::METHOD_NOT_ALLOWED, "405 Method Not Allowed");
    resp.headers_mut()
        .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    resp
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    plain_text(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large")
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error(StatusCode::NO_CONTENT, &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 301 redirect, used to add the trailing slash to directory paths
pub fn build_moved_response(location: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header("Location", location)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from("Moved Permanently")))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::MOVED_PERMANENTLY, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 200 response for a static file
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
    last_modified: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("ETag", etag)
        .header("Cache-Control", "no-cache");
    if let Some(lm) = last_modified {
        builder = builder.header("Last-Modified", lm);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(StatusCode::OK, &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Log response build error
pub fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_response_head_has_length_but_no_body() {
        let resp = build_file_response(
            Bytes::from_static(b"<h1>hi</h1>"),
            "text/html; charset=utf-8",
            "\"e\"",
            Some("Tue, 14 Nov 2023 22:13:20 GMT"),
            true,
        );
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Length"], "11");
        assert_eq!(resp.headers()["ETag"], "\"e\"");
        assert!(resp.headers().contains_key("Last-Modified"));
    }

    #[test]
    fn test_error_builders() {
        assert_eq!(build_404_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(build_413_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
        let resp = build_405_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["Allow"], ALLOWED_METHODS);
        let resp = build_moved_response("/docs/");
        assert_eq!(resp.headers()["Location"], "/docs/");
    }

    #[test]
    fn test_options_cors() {
        let resp = build_options_response(true);
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
        assert!(!build_options_response(false)
            .headers()
            .contains_key("Access-Control-Allow-Origin"));
    }
}
