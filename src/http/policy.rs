//! Extension policy table
//!
//! Maps a file extension to the `Content-Type`, `Cache-Control` and CORS
//! headers it is served with. The table is ordered and the first matching
//! row wins; anything unmatched gets the standard type and `no-cache`.

use super::cache::CachePolicy;
use super::mime;

/// One row of the policy table
#[derive(Debug)]
pub struct ExtensionRule {
    /// Lowercase extensions without the dot
    pub extensions: &'static [&'static str],
    /// Pinned content type, `None` falls back to the standard guess
    pub content_type: Option<&'static str>,
    pub cache: CachePolicy,
    /// Send `Access-Control-Allow-Origin: *`
    pub cors: bool,
}

/// Header rules for Unity WebGL build output
pub const POLICY_TABLE: &[ExtensionRule] = &[
    ExtensionRule {
        extensions: &["wasm"],
        content_type: Some("application/wasm"),
        cache: CachePolicy::LONG_LIVED,
        cors: true,
    },
    ExtensionRule {
        extensions: &["data"],
        content_type: Some("application/octet-stream"),
        cache: CachePolicy::LONG_LIVED,
        cors: true,
    },
    ExtensionRule {
        extensions: &["js"],
        content_type: Some("application/javascript"),
        cache: CachePolicy::LONG_LIVED,
        cors: true,
    },
    ExtensionRule {
        extensions: &["css", "png", "jpg", "jpeg", "ico"],
        content_type: None,
        cache: CachePolicy::LONG_LIVED,
        cors: false,
    },
];

/// Encoding of a file stored pre-compressed on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Gzip,
    Brotli,
}

impl ContentEncoding {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Brotli => "br",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "gz" => Some(Self::Gzip),
            "br" => Some(Self::Brotli),
            _ => None,
        }
    }
}

/// Headers derived for a served file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetPolicy {
    pub content_type: &'static str,
    pub cache: CachePolicy,
    pub cors: bool,
    /// Set when the file on disk is already encoded (`Web.wasm.br`)
    pub content_encoding: Option<ContentEncoding>,
}

impl AssetPolicy {
    /// Policy for files whose route pins the content type and requires revalidation
    pub const fn pinned(content_type: &'static str) -> Self {
        Self {
            content_type,
            cache: CachePolicy::NoCache,
            cors: false,
            content_encoding: None,
        }
    }
}

/// Find the first table row listing `ext` (already lowercase)
pub fn find_rule(ext: &str) -> Option<&'static ExtensionRule> {
    POLICY_TABLE.iter().find(|rule| rule.extensions.contains(&ext))
}

/// Policy for a bare extension
///
/// # Examples
/// ```
/// use webgl_host::http::policy::lookup_extension;
/// let policy = lookup_extension(Some("wasm"));
/// assert_eq!(policy.content_type, "application/wasm");
/// assert!(policy.cors);
/// ```
pub fn lookup_extension(ext: Option<&str>) -> AssetPolicy {
    let ext = ext.map(str::to_ascii_lowercase);
    let ext = ext.as_deref();

    match ext.and_then(find_rule) {
        Some(rule) => AssetPolicy {
            content_type: rule
                .content_type
                .unwrap_or_else(|| mime::get_content_type(ext)),
            cache: rule.cache,
            cors: rule.cors,
            content_encoding: None,
        },
        None => AssetPolicy {
            content_type: mime::get_content_type(ext),
            cache: CachePolicy::NoCache,
            cors: false,
            content_encoding: None,
        },
    }
}

/// Policy for a request or file path, recognizing pre-compressed build files
pub fn lookup_path(path: &str) -> AssetPolicy {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let Some((stem, ext)) = split_extension(name) else {
        return lookup_extension(None);
    };

    let outer = ext.to_ascii_lowercase();
    if let Some(encoding) = ContentEncoding::from_extension(&outer) {
        if let Some((_, inner)) = split_extension(stem) {
            if find_rule(&inner.to_ascii_lowercase()).is_some() {
                return AssetPolicy {
                    content_encoding: Some(encoding),
                    ..lookup_extension(Some(inner))
                };
            }
        }
    }

    lookup_extension(Some(&outer))
}

fn split_extension(name: &str) -> Option<(&str, &str)> {
    name.rsplit_once('.')
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
}
