// Application state module
// Built once at startup, shared read-only across all connections

use crate::content::ContentStore;
use crate::error::SiteError;
use crate::logger::AccessLogFormat;
use crate::render::ThemeEngine;
use crate::routing::Menu;

use super::types::Config;

/// Application state
///
/// Holds everything a request needs: the immutable configuration, the
/// merged menu table, the content store and the theme engine. Nothing in
/// here changes after startup.
pub struct AppState {
    pub config: Config,
    pub menu: Menu,
    pub content: ContentStore,
    pub theme: ThemeEngine,
    pub access_log_format: AccessLogFormat,
}

impl AppState {
    /// Load the menu table and templates and assemble the state.
    pub fn new(config: Config) -> Result<Self, SiteError> {
        let menu = Menu::load(&config.site)?;
        let content = ContentStore::new(config.site.content_dir());
        let theme = ThemeEngine::new(&config.site)?;
        let access_log_format = AccessLogFormat::parse(&config.logging.access_log_format);

        if !theme.has_template(&format!("layouts/{}", config.site.error_page_layout)) {
            crate::logger::log_warning(&format!(
                "Error page layout '{}' is not loaded; unresolved requests will \
                 fall back to a plain-text 404",
                config.site.error_page_layout
            ));
        }

        Ok(Self {
            config,
            menu,
            content,
            theme,
            access_log_format,
        })
    }
}
