//! Content resolution module
//!
//! Maps a raw request path and query string to a render context: which
//! content page to serve, with which body class and layout. Resolution
//! never fails — a request that matches nothing, references a missing
//! content file, or carries a disallowed query parameter resolves to the
//! error context, which the HTTP layer sends with status 404.

use percent_encoding::percent_decode_str;
use std::collections::HashMap;

use crate::config::SiteConfig;
use crate::content::ContentStore;

use super::menu::Menu;
use super::query;

/// Content file rendered for unresolved requests
pub const ERROR_PAGE: &str = "404";

/// Body class of the error context
const ERROR_BODY_CLASS: &str = "error";

/// Characters preserved by path sanitization besides ASCII alphanumerics.
/// Everything outside the URL character set is stripped.
const URL_SAFE: &str = "$-_.+!*'(),{}|\\^~[]`<>#%\";/?:@&=";

/// A parsed and allow-list-checked request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    /// Sanitized path with the leading slash removed
    pub path: String,
    /// Decoded query parameters, duplicate keys last-value-wins
    pub query_params: HashMap<String, String>,
    /// Query parameter names rejected by the allow-list
    pub blocked_params: Vec<String>,
}

impl ResolvedRequest {
    /// Parse the raw path and query string and apply the allow-list.
    pub fn parse(raw_path: &str, raw_query: &str, allowed: &[String]) -> Self {
        let query_params = query::parse_query(raw_query);
        let blocked_params = query::blocked_params(&query_params, allowed);

        Self {
            path: sanitize_path(raw_path),
            query_params,
            blocked_params,
        }
    }
}

/// Everything the render layer needs for one request.
/// Derived once per request and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    /// Content file name under the content directory
    pub page: String,
    /// Class for the body element, possibly empty
    pub body_class: String,
    /// Layout template name
    pub layout: String,
    /// Whether this is the error context
    pub is_error: bool,
}

/// Resolve a request to a render context.
///
/// The request is valid iff all of: the sanitized path is a key in the
/// menu, that entry's content file exists in the content store, and no
/// query parameter was blocked. Anything else yields the error context.
/// The default-layout fallback for entries that name no layout happens
/// here and nowhere else.
pub fn resolve(
    request: &ResolvedRequest,
    menu: &Menu,
    site: &SiteConfig,
    content: &ContentStore,
) -> RenderContext {
    if request.blocked_params.is_empty() {
        if let Some(entry) = menu.get(&request.path) {
            if content.page_exists(&entry.file) {
                return RenderContext {
                    page: entry.file.clone(),
                    body_class: entry.body_class.clone().unwrap_or_default(),
                    layout: entry
                        .layout
                        .clone()
                        .unwrap_or_else(|| site.default_layout.clone()),
                    is_error: false,
                };
            }
        }
    }

    error_context(site)
}

/// The context every unresolved request renders with
pub fn error_context(site: &SiteConfig) -> RenderContext {
    RenderContext {
        page: ERROR_PAGE.to_string(),
        body_class: ERROR_BODY_CLASS.to_string(),
        layout: site.error_page_layout.clone(),
        is_error: true,
    }
}

/// Percent-decode a request path, strip characters outside the URL set,
/// and remove the leading slash used by menu keys.
pub fn sanitize_path(raw: &str) -> String {
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    decoded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || URL_SAFE.contains(*c))
        .collect::<String>()
        .trim_start_matches('/')
        .to_string()
}
