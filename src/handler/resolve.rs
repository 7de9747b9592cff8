//! Request path resolution
//!
//! Maps a URL path to a file relative to the document root together with
//! the header policy it is served with. Paths are decoded and normalized
//! here; anything that could climb out of the root is refused before the
//! filesystem is touched.

use std::path::PathBuf;

use percent_encoding::percent_decode_str;

use crate::config::SiteConfig;
use crate::error::ServeError;
use crate::http::policy::{lookup_path, AssetPolicy};

const JAVASCRIPT: &str = "application/javascript";
const FAVICON_PATH: &str = "favicon.ico";

/// Which route of the site layout matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Index,
    RootScript,
    Favicon,
    AssetDir,
    Literal,
}

/// A resolved request: file to read and headers to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub kind: RouteKind,
    /// Path relative to the document root, normalized
    pub relative: PathBuf,
    pub policy: AssetPolicy,
}

/// Resolve a request path against the site layout
///
/// Order: index, root scripts, favicon, asset directories, literal path.
pub fn resolve(path: &str, site: &SiteConfig) -> Result<ResolvedRoute, ServeError> {
    let segments = normalize(path)?;

    let Some((first, rest)) = segments.split_first() else {
        return Ok(ResolvedRoute {
            kind: RouteKind::Index,
            relative: PathBuf::from(&site.index_file),
            policy: lookup_path(&site.index_file),
        });
    };

    if rest.is_empty() {
        if site.root_scripts.iter().any(|s| s == first) {
            return Ok(ResolvedRoute {
                kind: RouteKind::RootScript,
                relative: PathBuf::from(first),
                policy: AssetPolicy::pinned(JAVASCRIPT),
            });
        }
        if first == FAVICON_PATH {
            return Ok(ResolvedRoute {
                kind: RouteKind::Favicon,
                relative: PathBuf::from(&site.favicon),
                policy: lookup_path(&site.favicon),
            });
        }
    }

    let kind = if !rest.is_empty() && site.asset_dirs.iter().any(|d| d == first) {
        RouteKind::AssetDir
    } else {
        RouteKind::Literal
    };

    let relative: PathBuf = segments.iter().collect();
    let policy = lookup_path(segments.last().map_or("", String::as_str));

    Ok(ResolvedRoute {
        kind,
        relative,
        policy,
    })
}

/// Percent-decode a URL path and split it into safe segments
///
/// Empty and `.` segments are dropped. `..`, backslashes and NUL bytes are
/// refused. On Windows so is any `:`, which would name a drive or an
/// alternate data stream; elsewhere it is an ordinary filename character.
pub fn normalize(path: &str) -> Result<Vec<String>, ServeError> {
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| ServeError::NotFound)?;

    let mut segments = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(ServeError::Forbidden(path.to_string())),
            s if s.contains(['\\', '\0']) || (cfg!(windows) && s.contains(':')) => {
                return Err(ServeError::Forbidden(path.to_string()));
            }
            s => segments.push(s.to_string()),
        }
    }
    Ok(segments)
}
