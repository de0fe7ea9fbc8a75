//! Page pipeline handler
//!
//! Runs the content router on the request and renders the resolved
//! context. Render failures on a resolved page degrade to the error
//! context; if even that cannot render, a plain-text 404 goes out.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::render;
use crate::routing::{self, ResolvedRequest};

use super::router::RequestContext;

/// Resolve and render the page for this request
pub fn serve_page(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let site = &state.config.site;

    let request = ResolvedRequest::parse(ctx.path, ctx.raw_query, &site.allowed_url_params);
    if !request.blocked_params.is_empty() {
        logger::log_warning(&format!(
            "Blocked query parameters: {}",
            request.blocked_params.join(", ")
        ));
    }

    let resolved = routing::resolve(&request, &state.menu, site, &state.content);
    let status = if resolved.is_error { 404 } else { 200 };

    match render::render_page(&state.theme, &state.content, &resolved, &request) {
        Ok(html) => http::response::build_page_response(
            html,
            status,
            ctx.version,
            &state.config.http.server_name,
            ctx.is_head,
        ),
        Err(e) => {
            logger::log_error(&format!("Render failed for page '{}': {e}", resolved.page));
            if resolved.is_error {
                // even the error page cannot render
                http::build_404_response(ctx.version)
            } else {
                render_error_fallback(ctx, state, &request)
            }
        }
    }
}

/// Degrade a failed page render to the error context
fn render_error_fallback(
    ctx: &RequestContext<'_>,
    state: &AppState,
    request: &ResolvedRequest,
) -> Response<Full<Bytes>> {
    let error_ctx = routing::error_context(&state.config.site);

    match render::render_page(&state.theme, &state.content, &error_ctx, request) {
        Ok(html) => http::response::build_page_response(
            html,
            404,
            ctx.version,
            &state.config.http.server_name,
            ctx.is_head,
        ),
        Err(e) => {
            logger::log_error(&format!("Error page render failed: {e}"));
            http::build_404_response(ctx.version)
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::config::{
        Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, SiteConfig,
    };
    use http_body_util::BodyExt;
    use hyper::Version;

    /// State over a temp site tree holding the given files
    pub fn test_state(files: &[(&str, &str)]) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in files {
            let path = dir.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, body).unwrap();
        }

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: false,
                access_log_format: "combined".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
                max_connections: None,
            },
            http: HttpConfig {
                server_name: "Sitebeam/test".to_string(),
                enable_cors: false,
                max_body_size: 1024,
            },
            site: SiteConfig {
                root: dir.path().to_str().unwrap().to_string(),
                default_layout: "main".to_string(),
                error_page_layout: "main".to_string(),
                menus: vec!["main".to_string()],
                allowed_url_params: vec!["lang".to_string()],
            },
        };

        let state = AppState::new(config).unwrap();
        (dir, state)
    }

    /// A complete small site: one page, an error page, one layout
    fn site_files() -> Vec<(&'static str, &'static str)> {
        vec![
            (
                "content/_menu_main.json",
                r#"{"about": {"file": "about", "body_class": "", "layout": ""}}"#,
            ),
            ("content/about.html", "<h1>About</h1>"),
            ("content/404.html", "<h1>Not found</h1>"),
            (
                "layouts/main.html",
                "<body class=\"{{ body_class }}\">{{ article }}</body>",
            ),
        ]
    }

    fn ctx<'a>(path: &'a str, raw_query: &'a str) -> RequestContext<'a> {
        RequestContext {
            path,
            raw_query,
            is_head: false,
            version: Version::HTTP_11,
            if_none_match: None,
        }
    }

    async fn body_of(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_request_renders_page_with_200() {
        let (_dir, state) = test_state(&site_files());
        let resp = serve_page(&ctx("/about", ""), &state);

        assert_eq!(resp.status(), 200);
        assert_eq!(body_of(resp).await, "<body class=\"\"><h1>About</h1></body>");
    }

    #[tokio::test]
    async fn test_unknown_path_renders_error_page_with_404() {
        let (_dir, state) = test_state(&site_files());
        let resp = serve_page(&ctx("/contact", ""), &state);

        assert_eq!(resp.status(), 404);
        assert_eq!(
            body_of(resp).await,
            "<body class=\"error\"><h1>Not found</h1></body>"
        );
    }

    #[tokio::test]
    async fn test_blocked_param_renders_error_page() {
        let (_dir, state) = test_state(&site_files());
        let resp = serve_page(&ctx("/about", "token=x"), &state);
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_allowed_param_renders_page() {
        let (_dir, state) = test_state(&site_files());
        let resp = serve_page(&ctx("/about", "lang=de"), &state);
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn test_missing_error_page_falls_back_to_plain_404() {
        // no content/404.html and no layouts at all
        let (_dir, state) = test_state(&[(
            "content/_menu_main.json",
            r#"{"about": {"file": "about"}}"#,
        )]);
        let resp = serve_page(&ctx("/missing", ""), &state);

        assert_eq!(resp.status(), 404);
        assert_eq!(resp.headers()["Content-Type"], "text/plain");
        assert_eq!(body_of(resp).await, "404 Not Found");
    }

    #[tokio::test]
    async fn test_broken_page_degrades_to_error_context() {
        // menu and content exist, but the entry's layout is missing
        let mut files = site_files();
        files[0] = (
            "content/_menu_main.json",
            r#"{"about": {"file": "about", "layout": "gone"}}"#,
        );
        let (_dir, state) = test_state(&files);
        let resp = serve_page(&ctx("/about", ""), &state);

        assert_eq!(resp.status(), 404);
        assert_eq!(
            body_of(resp).await,
            "<body class=\"error\"><h1>Not found</h1></body>"
        );
    }

    #[tokio::test]
    async fn test_head_request_sends_headers_only() {
        let (_dir, state) = test_state(&site_files());
        let head_ctx = RequestContext {
            path: "/about",
            raw_query: "",
            is_head: true,
            version: Version::HTTP_11,
            if_none_match: None,
        };
        let resp = serve_page(&head_ctx, &state);

        assert_eq!(resp.status(), 200);
        let advertised: usize = resp.headers()["Content-Length"]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(advertised > 0);
        assert!(body_of(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_echoes_request_version() {
        let (_dir, state) = test_state(&site_files());
        let legacy_ctx = RequestContext {
            path: "/missing",
            raw_query: "",
            is_head: false,
            version: Version::HTTP_10,
            if_none_match: None,
        };
        let resp = serve_page(&legacy_ctx, &state);
        assert_eq!(resp.version(), Version::HTTP_10);
    }
}
