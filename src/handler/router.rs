//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. API requests go to the
//! questionnaire handlers; everything else falls through to static serving.

use crate::api::{self, ApiRoute};
use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::{HeaderMap, Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context for static serving
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);
    let version = req.version();
    let headers = req.headers().clone();

    logger::log_debug(&format!("[Request] {method} {} {version:?}", req.uri()));

    let route = api::match_route(&method, &path);
    let mut response = if body_too_large(&headers, state.config.http.max_body_size) {
        match route {
            Some(ApiRoute::Save) => api::reject_oversized_save(&state),
            _ => http::build_413_response(),
        }
    } else {
        match route {
            Some(ApiRoute::List) => api::handle_list(&state).await,
            Some(ApiRoute::Save) => api::handle_save(req, &state).await,
            None => {
                let ctx = RequestContext {
                    path: &path,
                    query: query.as_deref(),
                    is_head: method == Method::HEAD,
                    if_none_match: header_str(&headers, "if-none-match"),
                    if_modified_since: header_str(&headers, "if-modified-since"),
                };
                serve_static(&ctx, &method, &state).await
            }
        }
    };

    if let Ok(name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, name);
    }

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(remote_addr.ip().to_string(), method.to_string(), path);
        entry.query = query;
        entry.http_version = http_version_label(version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.referer = header_str(&headers, "referer").map(ToString::to_string);
        entry.user_agent = header_str(&headers, "user-agent").map(ToString::to_string);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry);
    }

    Ok(response)
}

/// Static fallback: only GET/HEAD are served, OPTIONS answers preflight
async fn serve_static(
    ctx: &RequestContext<'_>,
    method: &Method,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    match *method {
        Method::GET | Method::HEAD => {
            static_files::serve(ctx, &state.root_dir, &state.config.storage.index_files).await
        }
        Method::OPTIONS => http::build_options_response(state.config.http.enable_cors),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method} {}", ctx.path));
            http::build_405_response()
        }
    }
}

/// Whether the declared Content-Length exceeds the limit
fn body_too_large(headers: &HeaderMap, max_body_size: u64) -> bool {
    let Some(size_str) = header_str(headers, "content-length") else {
        return false;
    };
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            true
        }
        Ok(_) => false,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            false
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

const fn http_version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
