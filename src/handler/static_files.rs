//! Static file serving module
//!
//! Serves files under the root directory, with index documents for
//! directories, MIME detection and conditional GET.

use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Outcome of mapping a request path onto the root directory
#[derive(Debug, PartialEq, Eq)]
pub enum Resolved {
    File(PathBuf),
    /// Directory requested without trailing slash; redirect to this location
    Redirect(String),
    NotFound,
}

/// Serve a static file for the request
pub async fn serve(
    ctx: &RequestContext<'_>,
    root: &Path,
    index_files: &[String],
) -> Response<Full<Bytes>> {
    let file_path = match resolve(root, ctx.path, ctx.query, index_files).await {
        Resolved::File(p) => p,
        Resolved::Redirect(location) => return http::build_moved_response(&location),
        Resolved::NotFound => return http::build_404_response(),
    };

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            return http::build_404_response();
        }
    };

    let last_modified = fs::metadata(&file_path)
        .await
        .and_then(|m| m.modified())
        .ok();
    let last_modified_header = last_modified.map(cache::format_http_date);
    let etag = cache::generate_etag(&content);

    let unchanged = if ctx.if_none_match.is_some() {
        cache::etag_matches(ctx.if_none_match, &etag)
    } else {
        last_modified.is_some_and(|t| cache::not_modified_since(ctx.if_modified_since, t))
    };
    if unchanged {
        return http::build_304_response(&etag, last_modified_header.as_deref());
    }

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    http::build_file_response(
        Bytes::from(content),
        content_type,
        &etag,
        last_modified_header.as_deref(),
        ctx.is_head,
    )
}

/// Map a URL path to a file inside `root`.
///
/// Empty, `.` and `..` segments are dropped, so the path can never climb out
/// of the root lexically; the canonical path is checked as well to stop
/// symlinks leading outside.
pub async fn resolve(
    root: &Path,
    url_path: &str,
    query: Option<&str>,
    index_files: &[String],
) -> Resolved {
    let Ok(decoded) = percent_decode_str(url_path).decode_utf8() else {
        return Resolved::NotFound;
    };

    let mut target = root.to_path_buf();
    for segment in decoded.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
            continue;
        }
        target.push(segment);
    }

    let trailing_slash = decoded.ends_with('/');
    if fs::metadata(&target).await.is_ok_and(|m| m.is_dir()) {
        if !trailing_slash {
            let location = match query {
                Some(q) => format!("{url_path}/?{q}"),
                None => format!("{url_path}/"),
            };
            return Resolved::Redirect(location);
        }
        let mut index = None;
        for name in index_files {
            let candidate = target.join(name);
            if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
                index = Some(candidate);
                break;
            }
        }
        let Some(index) = index else {
            return Resolved::NotFound;
        };
        target = index;
    } else if trailing_slash {
        return Resolved::NotFound;
    }

    let Ok(canonical) = fs::canonicalize(&target).await else {
        return Resolved::NotFound;
    };
    if !canonical.starts_with(root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {url_path} -> {}",
            canonical.display()
        ));
        return Resolved::NotFound;
    }
    if !fs::metadata(&canonical).await.is_ok_and(|m| m.is_file()) {
        return Resolved::NotFound;
    }
    Resolved::File(canonical)
}
