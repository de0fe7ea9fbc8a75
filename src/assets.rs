//! Static-asset reference resolver
//!
//! Produces cache-busted references to files under the public directory.
//! The version token is the asset's last-modified time in unix seconds,
//! so a republished file changes its URL without any manifest.

use std::path::PathBuf;
use std::time::UNIX_EPOCH;

/// Resolves relative asset paths against the public directory
pub struct AssetResolver {
    public_dir: PathBuf,
}

impl AssetResolver {
    pub const fn new(public_dir: PathBuf) -> Self {
        Self { public_dir }
    }

    /// `Some("<rel>?v=<mtime>")` when the file exists, `None` otherwise.
    pub fn versioned(&self, rel: &str) -> Option<String> {
        // Reject traversal before touching the filesystem
        if rel.split(['/', '\\']).any(|segment| segment == "..") {
            return None;
        }

        let path = self.public_dir.join(rel.trim_start_matches('/'));
        let metadata = std::fs::metadata(&path).ok()?;
        if !metadata.is_file() {
            return None;
        }

        let mtime = metadata
            .modified()
            .ok()?
            .duration_since(UNIX_EPOCH)
            .ok()?
            .as_secs();

        Some(format!("{rel}?v={mtime}"))
    }
}
