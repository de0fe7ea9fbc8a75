//! Page rendering pipeline
//!
//! Composes one response body from a resolved render context: modules
//! render into their positions, the content fragment renders into the
//! article, and the layout wraps it all.

use std::collections::HashMap;

use crate::content::{ContentStore, ModuleRef, PageModules};
use crate::logger;
use crate::routing::{RenderContext, ResolvedRequest};

use super::theme::ThemeEngine;

/// Render the full page for a resolved request.
///
/// A missing module template is an optional piece: it is skipped with a
/// warning and the page still renders. A missing content fragment or
/// layout is a required piece and surfaces as the returned error, which
/// the handler degrades to the error context.
pub fn render_page(
    theme: &ThemeEngine,
    content: &ContentStore,
    context: &RenderContext,
    request: &ResolvedRequest,
) -> Result<String, tera::Error> {
    let meta = content
        .load_meta(&context.page)
        .unwrap_or_else(|| serde_json::json!({}));
    let modules = content.load_modules(&context.page).unwrap_or_default();

    // Each declared position becomes a pre-rendered HTML string the
    // layout can place wherever it wants
    let mut positions: HashMap<String, String> = HashMap::new();
    for position in modules.position_names() {
        positions.insert(
            position.to_string(),
            render_position(theme, &modules, position),
        );
    }

    let mut tera_ctx = tera::Context::new();
    tera_ctx.insert("page", &context.page);
    tera_ctx.insert("meta", &meta);
    tera_ctx.insert("params", &request.query_params);

    let article = theme.render(&format!("content/{}", context.page), &tera_ctx)?;

    tera_ctx.insert("article", &article);
    tera_ctx.insert("body_class", &context.body_class);
    tera_ctx.insert("positions", &positions);

    theme.render(&format!("layouts/{}", context.layout), &tera_ctx)
}

/// Render every module at one position, in declaration order
fn render_position(theme: &ThemeEngine, modules: &PageModules, position: &str) -> String {
    let mut html = String::new();

    for module in modules.modules_for_position(position) {
        match render_module(theme, module) {
            Ok(rendered) => {
                // wrapper class the site stylesheets target
                html.push_str(&format!(
                    "<div class=\"module module-{}\">{rendered}</div>",
                    module.module
                ));
            }
            Err(e) => {
                logger::log_warning(&format!("Skipping module '{}': {e}", module.module));
            }
        }
    }

    html
}

fn render_module(theme: &ThemeEngine, module: &ModuleRef) -> Result<String, tera::Error> {
    let mut tera_ctx = tera::Context::new();
    tera_ctx.insert("params", &module.params);
    theme.render(&format!("modules/{}", module.module), &tera_ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::ERROR_PAGE;

    struct Fixture {
        _dir: tempfile::TempDir,
        theme: ThemeEngine,
        content: ContentStore,
    }

    fn fixture(templates: &[(&str, &str)], content_files: &[(&str, &str)]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let content_dir = dir.path().join("content");
        std::fs::create_dir_all(&content_dir).unwrap();
        for (name, body) in content_files {
            std::fs::write(content_dir.join(name), body).unwrap();
        }

        let theme = ThemeEngine::with_templates(dir.path().join("public"), templates).unwrap();
        let content = ContentStore::new(content_dir);

        Fixture {
            _dir: dir,
            theme,
            content,
        }
    }

    fn context(page: &str, body_class: &str, layout: &str, is_error: bool) -> RenderContext {
        RenderContext {
            page: page.to_string(),
            body_class: body_class.to_string(),
            layout: layout.to_string(),
            is_error,
        }
    }

    fn empty_request() -> ResolvedRequest {
        ResolvedRequest::parse("/about", "", &[])
    }

    #[test]
    fn test_article_renders_inside_layout() {
        let fx = fixture(
            &[
                ("layouts/main", "<body class=\"{{ body_class }}\">{{ article }}</body>"),
                ("content/about", "<h1>{{ meta.title }}</h1>"),
            ],
            &[("about_meta.json", r#"{"title": "About us"}"#)],
        );

        let html = render_page(
            &fx.theme,
            &fx.content,
            &context("about", "plain", "main", false),
            &empty_request(),
        )
        .unwrap();

        assert_eq!(html, "<body class=\"plain\"><h1>About us</h1></body>");
    }

    #[test]
    fn test_positions_render_in_declaration_order() {
        let fx = fixture(
            &[
                ("layouts/main", "{{ positions.sidebar | default(value=\"\") }}"),
                ("content/about", "x"),
                ("modules/gallery", "G:{{ params.album }}"),
                ("modules/map", "M"),
            ],
            &[(
                "about_modules.json",
                r#"{"sidebar": [
                    {"module": "gallery", "params": {"album": "office"}},
                    {"module": "map"}
                ]}"#,
            )],
        );

        let html = render_page(
            &fx.theme,
            &fx.content,
            &context("about", "", "main", false),
            &empty_request(),
        )
        .unwrap();

        assert_eq!(
            html,
            "<div class=\"module module-gallery\">G:office</div>\
             <div class=\"module module-map\">M</div>"
        );
    }

    #[test]
    fn test_missing_module_template_is_skipped() {
        let fx = fixture(
            &[
                ("layouts/main", "{{ positions.sidebar | default(value=\"\") }}"),
                ("content/about", "x"),
                ("modules/map", "M"),
            ],
            &[(
                "about_modules.json",
                r#"{"sidebar": [{"module": "gone"}, {"module": "map"}]}"#,
            )],
        );

        let html = render_page(
            &fx.theme,
            &fx.content,
            &context("about", "", "main", false),
            &empty_request(),
        )
        .unwrap();

        assert_eq!(html, "<div class=\"module module-map\">M</div>");
    }

    #[test]
    fn test_query_params_reach_the_content_template() {
        let fx = fixture(
            &[
                ("layouts/main", "{{ article }}"),
                ("content/about", "lang={{ params.lang | default(value=\"en\") }}"),
            ],
            &[],
        );

        let request = ResolvedRequest::parse("/about", "lang=de", &["lang".to_string()]);
        let html = render_page(
            &fx.theme,
            &fx.content,
            &context("about", "", "main", false),
            &request,
        )
        .unwrap();

        assert_eq!(html, "lang=de");
    }

    #[test]
    fn test_missing_content_fragment_is_an_error() {
        let fx = fixture(&[("layouts/main", "{{ article }}")], &[]);
        let result = render_page(
            &fx.theme,
            &fx.content,
            &context("about", "", "main", false),
            &empty_request(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_layout_is_an_error() {
        let fx = fixture(&[("content/about", "x")], &[]);
        let result = render_page(
            &fx.theme,
            &fx.content,
            &context("about", "", "main", false),
            &empty_request(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_error_context_renders_like_any_page() {
        let fx = fixture(
            &[
                ("layouts/error", "<body class=\"{{ body_class }}\">{{ article }}</body>"),
                ("content/404", "<h1>Not found</h1>"),
            ],
            &[],
        );

        let html = render_page(
            &fx.theme,
            &fx.content,
            &context(ERROR_PAGE, "error", "error", true),
            &empty_request(),
        )
        .unwrap();

        assert_eq!(html, "<body class=\"error\"><h1>Not found</h1></body>");
    }
}
