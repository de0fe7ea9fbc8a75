//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, static
//! file lookup, page pipeline, access logging.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HeaderMap;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};

use super::{page, static_files};

/// Request context shared by the static-file and page handlers
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub raw_query: &'a str,
    pub is_head: bool,
    pub version: Version,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _body) = req.into_parts();

    let path = parts.uri.path();
    let raw_query = parts.uri.query().unwrap_or("");
    let is_head = parts.method == Method::HEAD;

    let response = if let Some(resp) =
        check_http_method(&parts.method, state.config.http.enable_cors)
    {
        resp
    } else if let Some(resp) = check_body_size(&parts.headers, state.config.http.max_body_size) {
        resp
    } else {
        let ctx = RequestContext {
            path,
            raw_query,
            is_head,
            version: parts.version,
            if_none_match: header_string(&parts.headers, "if-none-match"),
        };

        // An existing file under the public directory wins over routing
        match static_files::try_serve(&ctx, &state).await {
            Some(resp) => resp,
            None => page::serve_page(&ctx, &state),
        }
    };

    if state.config.logging.access_log {
        let entry = AccessLogEntry {
            remote_addr: peer_addr.ip().to_string(),
            time: chrono::Local::now(),
            method: parts.method.to_string(),
            path: path.to_string(),
            query: (!raw_query.is_empty()).then(|| raw_query.to_string()),
            http_version: version_str(parts.version).to_string(),
            status: response.status().as_u16(),
            body_bytes: response_body_bytes(&response),
            referer: header_string(&parts.headers, "referer"),
            user_agent: header_string(&parts.headers, "user-agent"),
            request_time_us: u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
        };
        logger::log_access(&entry, state.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and answer non-GET/HEAD methods directly
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate the Content-Length header and answer 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let size_str = headers.get("content-length")?.to_str().ok()?;
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_error(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        _ => None,
    }
}

/// Copy a header value out of the request, if it is valid UTF-8
fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

/// Size of the response body as advertised to the client
fn response_body_bytes(response: &Response<Full<Bytes>>) -> usize {
    response
        .headers()
        .get("content-length")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// Protocol version as it appears in log lines
fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
}
