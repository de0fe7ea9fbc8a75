// Startup error types
// Request handling never surfaces these; a request that cannot be
// satisfied renders the error page instead.

use thiserror::Error;

/// Errors raised while loading the site at startup.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}
