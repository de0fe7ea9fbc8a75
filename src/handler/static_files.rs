//! Static file serving module
//!
//! Serves files under the public directory with MIME detection, `ETag`
//! validation and path traversal protection. A request that does not
//! name an existing file falls through to the page pipeline.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::config::AppState;
use crate::http::{self, cache, mime};
use crate::logger;

use super::router::RequestContext;

/// Serve the request from the public directory, if it names a file there
pub async fn try_serve(
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> Option<Response<Full<Bytes>>> {
    let public_dir = state.config.site.public_dir();

    // Remove leading slashes and flatten traversal attempts; the result
    // must stay relative or join() would replace the public dir entirely
    let clean_path = ctx.path.trim_start_matches('/').replace("..", "");
    let clean_path = clean_path.trim_start_matches('/');
    if clean_path.is_empty() {
        return None;
    }

    // Missing public dir or missing file: not a static request
    let public_canonical = public_dir.canonicalize().ok()?;
    let file_canonical = public_dir.join(clean_path).canonicalize().ok()?;

    // canonicalize resolves symlinks; the prefix check is the guard
    if !file_canonical.starts_with(&public_canonical) {
        logger::log_warning(&format!("Path traversal attempt blocked: {}", ctx.path));
        return None;
    }
    if !file_canonical.is_file() {
        return None;
    }

    let content = match tokio::fs::read(&file_canonical).await {
        Ok(content) => content,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_canonical.display()
            ));
            return None;
        }
    };

    let content_type = mime::get_content_type(file_canonical.extension().and_then(|e| e.to_str()));
    let etag = cache::generate_etag(&content);

    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return Some(http::build_304_response(&etag));
    }

    Some(http::response::build_static_response(
        Bytes::from(content),
        content_type,
        &etag,
        ctx.is_head,
    ))
}
