//! Theme engine module
//!
//! Owns the Tera instance holding layout, module and content templates,
//! and registers the asset helper functions available to all of them.
//!
//! Templates are addressed by directory prefix and stem: `layouts/main`,
//! `modules/gallery`, `content/about`. Names carry no `.html` suffix, so
//! Tera's auto-escaping stays off; fragments and positions are inserted
//! into layouts verbatim, matching the trust model of a site whose
//! templates are all statically authored.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tera::Tera;

use crate::assets::AssetResolver;
use crate::config::SiteConfig;
use crate::error::SiteError;
use crate::logger;

/// Theme engine for rendering layouts, modules and content fragments
pub struct ThemeEngine {
    tera: Tera,
}

impl ThemeEngine {
    /// Load every template of the site and register helper functions.
    ///
    /// A missing template directory contributes no templates and logs a
    /// warning; a template that fails to parse is a startup error.
    pub fn new(site: &SiteConfig) -> Result<Self, SiteError> {
        let mut tera = Tera::default();
        // Templates loaded from disk carry a `.html` file path, which Tera
        // prefers over the suffix-free template name when deciding whether
        // to auto-escape. Disable auto-escaping outright so fragments and
        // positions are inserted verbatim, matching the trust model above.
        tera.autoescape_on(vec![]);

        for (dir, prefix) in [
            (site.layouts_dir(), "layouts"),
            (site.modules_dir(), "modules"),
            (site.content_dir(), "content"),
        ] {
            add_templates(&mut tera, &dir, prefix)?;
        }

        register_functions(&mut tera, AssetResolver::new(site.public_dir()));
        Ok(Self { tera })
    }

    /// Engine built from raw templates, for tests
    #[cfg(test)]
    pub fn with_templates(
        public_dir: std::path::PathBuf,
        templates: &[(&str, &str)],
    ) -> Result<Self, SiteError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        for (name, body) in templates {
            tera.add_raw_template(name, body)?;
        }
        register_functions(&mut tera, AssetResolver::new(public_dir));
        Ok(Self { tera })
    }

    /// Render a template by prefixed name
    pub fn render(&self, name: &str, context: &tera::Context) -> Result<String, tera::Error> {
        self.tera.render(name, context)
    }

    /// Whether a template with this prefixed name is loaded
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template(name).is_ok()
    }
}

/// Load every `*.html` file in `dir` as `<prefix>/<stem>`
fn add_templates(tera: &mut Tera, dir: &Path, prefix: &str) -> Result<(), SiteError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            logger::log_warning(&format!("Template directory not found: {}", dir.display()));
            return Ok(());
        }
        Err(source) => {
            return Err(SiteError::Io {
                path: dir.display().to_string(),
                source,
            });
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SiteError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "html") {
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                files.push((path.clone(), Some(format!("{prefix}/{stem}"))));
            }
        }
    }

    tera.add_template_files(files)?;
    Ok(())
}

/// Register the `asset`, `css` and `js` helper functions.
///
/// All three resolve against the public directory and append the
/// mtime version token. A missing asset renders an HTML comment for
/// `css`/`js` and an empty string for `asset`, never a broken reference.
fn register_functions(tera: &mut Tera, assets: AssetResolver) {
    let assets = Arc::new(assets);

    let resolver = Arc::clone(&assets);
    tera.register_function(
        "asset",
        move |args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
            let path = required_str(args, "path", "asset")?;
            Ok(tera::Value::String(match resolver.versioned(&path) {
                Some(versioned) => format!("/{versioned}"),
                None => {
                    logger::log_warning(&format!("Static asset not found: {path}"));
                    String::new()
                }
            }))
        },
    );

    let resolver = Arc::clone(&assets);
    tera.register_function(
        "css",
        move |args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
            let name = required_str(args, "name", "css")?;
            let tag = match resolver.versioned(&format!("css/{name}.css")) {
                Some(href) => format!("<link rel=\"stylesheet\" href=\"/{href}\">"),
                None => format!("<!-- stylesheet not found: {name} -->"),
            };
            Ok(tera::Value::String(tag))
        },
    );

    let resolver = assets;
    tera.register_function(
        "js",
        move |args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
            let name = required_str(args, "name", "js")?;
            let tag = match resolver.versioned(&format!("js/{name}.js")) {
                Some(src) => format!("<script src=\"/{src}\"></script>"),
                None => format!("<!-- script not found: {name} -->"),
            };
            Ok(tera::Value::String(tag))
        },
    );
}

/// Fetch a required string argument of a helper function
fn required_str(
    args: &HashMap<String, tera::Value>,
    key: &str,
    function: &str,
) -> tera::Result<String> {
    args.get(key)
        .and_then(tera::Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| tera::Error::msg(format!("`{function}` requires a string `{key}` argument")))
}
