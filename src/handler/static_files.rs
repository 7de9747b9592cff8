//! Static file serving module
//!
//! Opens files confined to the document root and builds asset responses
//! with conditional, range and compression handling. Bodies are streamed
//! from disk; only files small enough to gzip are read into memory.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use hyper::Response;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::config::HttpConfig;
use crate::error::ServeError;
use crate::handler::resolve::ResolvedRoute;
use crate::handler::router::RequestContext;
use crate::http::range::{self, ByteSpan, RangeOutcome};
use crate::http::response::{empty_body, full_body, stream_body, ResponseBody};
use crate::http::{self, cache, compress, mime, response, AssetPolicy};
use crate::logger;

/// Largest body that is buffered for on-the-fly gzip
pub const BUFFER_LIMIT: u64 = 1024 * 1024;

/// An open regular file inside the document root
#[derive(Debug)]
pub struct StaticFile {
    pub path: PathBuf,
    pub file: fs::File,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

/// Serve a resolved route from the document root
pub async fn serve(
    ctx: &RequestContext<'_>,
    root: &Path,
    route: &ResolvedRoute,
    http_config: &HttpConfig,
) -> Response<ResponseBody> {
    let result = match open_file(root, &route.relative).await {
        Ok(file) => build_asset_response(ctx, file, &route.policy, http_config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(resp) => resp,
        Err(ServeError::NotFound) => http::build_404_response(),
        Err(e @ ServeError::Forbidden(_)) => {
            logger::log_warning(&format!("Path traversal attempt blocked: {e}"));
            http::build_404_response()
        }
        Err(e @ ServeError::Io { .. }) => {
            logger::log_error(&e.to_string());
            http::build_404_response()
        }
    }
}

/// Open a file relative to `root`, refusing anything that resolves outside it
///
/// `root` must already be canonical. Symlinks are followed and the final
/// target is checked, so a link pointing out of the root is refused too.
pub async fn open_file(root: &Path, relative: &Path) -> Result<StaticFile, ServeError> {
    let canonical = resolve_within(root, relative).await?;

    let file = fs::File::open(&canonical)
        .await
        .map_err(|e| io_error(&canonical, e))?;
    let metadata = file
        .metadata()
        .await
        .map_err(|e| io_error(&canonical, e))?;
    if !metadata.is_file() {
        return Err(ServeError::NotFound);
    }

    Ok(StaticFile {
        path: canonical,
        file,
        len: metadata.len(),
        modified: metadata.modified().ok(),
    })
}

/// Canonicalize `root/relative` and check it stays inside `root`
pub async fn resolve_within(root: &Path, relative: &Path) -> Result<PathBuf, ServeError> {
    if relative.is_absolute() {
        return Err(ServeError::Forbidden(relative.display().to_string()));
    }

    let candidate = root.join(relative);
    let canonical = fs::canonicalize(&candidate)
        .await
        .map_err(|e| io_error(&candidate, e))?;

    if canonical.starts_with(root) {
        Ok(canonical)
    } else {
        Err(ServeError::Forbidden(format!(
            "{} -> {}",
            relative.display(),
            canonical.display()
        )))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ServeError {
    use std::io::ErrorKind;
    match source.kind() {
        // NotADirectory shows up when a path walks through a regular file
        ErrorKind::NotFound | ErrorKind::NotADirectory => ServeError::NotFound,
        _ => ServeError::Io {
            path: path.to_path_buf(),
            source,
        },
    }
}

/// Build the response for an opened file
///
/// Order: pick the representation (identity or gzip), answer 304 when the
/// client already holds it, then apply any byte range.
pub async fn build_asset_response(
    ctx: &RequestContext<'_>,
    file: StaticFile,
    policy: &AssetPolicy,
    http_config: &HttpConfig,
) -> Result<Response<ResponseBody>, ServeError> {
    let len = file.len;
    let negotiable = http_config.compression
        && policy.content_encoding.is_none()
        && mime::is_compressible(policy.content_type)
        && (http_config.compression_min_size..=BUFFER_LIMIT).contains(&len);
    let use_gzip =
        negotiable && ctx.range_header.is_none() && compress::accepts_gzip(ctx.accept_encoding);

    let identity_etag = cache::generate_etag(len, file.modified);
    let etag = if use_gzip {
        cache::variant_etag(&identity_etag, "gzip")
    } else {
        identity_etag.clone()
    };

    if cache::check_etag_match(ctx.if_none_match, &etag) {
        let mut resp = http::build_304_response(policy, &etag);
        if negotiable {
            resp.headers_mut().insert(
                hyper::header::VARY,
                hyper::header::HeaderValue::from_static("accept-encoding"),
            );
        }
        return Ok(resp);
    }

    if use_gzip {
        return gzip_response(ctx, file, policy, &etag, &identity_etag).await;
    }

    match range::resolve(ctx.range_header, len) {
        RangeOutcome::Partial(span) => {
            let mut builder = response::asset_builder(206, policy, &etag)
                .header("Content-Range", span.content_range(len))
                .header("Content-Length", span.len());
            if negotiable {
                builder = builder.header("Vary", "accept-encoding");
            }
            let body = if ctx.is_head {
                empty_body()
            } else {
                stream_span(file, span).await?
            };
            Ok(response::finish(builder, body, "206"))
        }
        RangeOutcome::Unsatisfiable => Ok(http::build_416_response(len)),
        RangeOutcome::Full => {
            let body = if ctx.is_head {
                empty_body()
            } else {
                stream_body(file.file.take(len))
            };
            Ok(full_response(body, len, policy, &etag, negotiable))
        }
    }
}

/// Read a small text file into memory and gzip it
///
/// Falls back to the identity body if compression fails.
async fn gzip_response(
    ctx: &RequestContext<'_>,
    mut file: StaticFile,
    policy: &AssetPolicy,
    etag: &str,
    identity_etag: &str,
) -> Result<Response<ResponseBody>, ServeError> {
    let mut content = Vec::new();
    file.file
        .read_to_end(&mut content)
        .await
        .map_err(|e| io_error(&file.path, e))?;

    match compress::gzip(&content) {
        Ok(packed) => {
            let builder = response::asset_builder(200, policy, etag)
                .header("Content-Encoding", "gzip")
                .header("Vary", "accept-encoding")
                .header("Content-Length", packed.len());
            Ok(response::finish(builder, body_for(ctx, packed), "200"))
        }
        Err(e) => {
            logger::log_error(&format!("gzip failed, sending identity body: {e}"));
            let len = content.len() as u64;
            Ok(full_response(body_for(ctx, content), len, policy, identity_etag, true))
        }
    }
}

/// Seek to the start of `span` and stream exactly its bytes
async fn stream_span(mut file: StaticFile, span: ByteSpan) -> Result<ResponseBody, ServeError> {
    file.file
        .seek(SeekFrom::Start(span.start))
        .await
        .map_err(|e| io_error(&file.path, e))?;
    Ok(stream_body(file.file.take(span.len())))
}

fn full_response(
    body: ResponseBody,
    len: u64,
    policy: &AssetPolicy,
    etag: &str,
    vary: bool,
) -> Response<ResponseBody> {
    let mut builder = response::asset_builder(200, policy, etag).header("Content-Length", len);
    if vary {
        builder = builder.header("Vary", "accept-encoding");
    }
    response::finish(builder, body, "200")
}

fn body_for(ctx: &RequestContext<'_>, data: Vec<u8>) -> ResponseBody {
    if ctx.is_head {
        empty_body()
    } else {
        full_body(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::policy::lookup_path;
    use http_body_util::BodyExt;
    use hyper::body::Body;
    use tempfile::TempDir;

    fn http_config() -> HttpConfig {
        HttpConfig {
            server_name: "test".to_string(),
            compression: true,
            compression_min_size: 16,
        }
    }

    fn ctx() -> RequestContext<'static> {
        RequestContext {
            path: "/",
            is_head: false,
            if_none_match: None,
            range_header: None,
            accept_encoding: None,
        }
    }

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new(name: &str, content: &[u8]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join(name), content).unwrap();
            Self { dir }
        }

        fn root(&self) -> PathBuf {
            self.dir.path().canonicalize().unwrap()
        }

        async fn respond(
            &self,
            name: &str,
            ctx: &RequestContext<'_>,
        ) -> Response<ResponseBody> {
            let file = open_file(&self.root(), Path::new(name)).await.unwrap();
            build_asset_response(ctx, file, &lookup_path(name), &http_config())
                .await
                .unwrap()
        }
    }

    async fn collect(resp: Response<ResponseBody>) -> Vec<u8> {
        resp.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    #[tokio::test]
    async fn test_full_response() {
        let fx = Fixture::new("game.wasm", b"0123456789");
        let resp = fx.respond("game.wasm", &ctx()).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-length"], "10");
        assert_eq!(resp.headers()["accept-ranges"], "bytes");
        assert!(resp.headers().get("vary").is_none());
        assert_eq!(collect(resp).await, b"0123456789");
    }

    #[tokio::test]
    async fn test_not_modified() {
        let fx = Fixture::new("game.data", b"payload");
        let first = fx.respond("game.data", &ctx()).await;
        let etag = first.headers()["etag"].to_str().unwrap().to_string();

        let ctx = RequestContext {
            if_none_match: Some(etag.as_str()),
            ..ctx()
        };
        let resp = fx.respond("game.data", &ctx).await;
        assert_eq!(resp.status(), 304);
        assert_eq!(resp.headers()["cache-control"], "public, max-age=31536000, immutable");
    }

    #[tokio::test]
    async fn test_range() {
        let fx = Fixture::new("game.data", b"0123456789");
        let ranged = RequestContext {
            range_header: Some("bytes=2-5"),
            ..ctx()
        };
        let resp = fx.respond("game.data", &ranged).await;
        assert_eq!(resp.status(), 206);
        assert_eq!(resp.headers()["content-range"], "bytes 2-5/10");
        assert_eq!(resp.headers()["content-length"], "4");
        assert_eq!(collect(resp).await, b"2345");

        let past_end = RequestContext {
            range_header: Some("bytes=50-"),
            ..ctx()
        };
        let resp = fx.respond("game.data", &past_end).await;
        assert_eq!(resp.status(), 416);
    }

    #[tokio::test]
    async fn test_gzip_only_for_text_when_accepted() {
        let script = "var unityInstance = null;\n".repeat(20);
        let fx = Fixture::new("loader.js", script.as_bytes());
        std::fs::write(fx.dir.path().join("game.wasm"), script.as_bytes()).unwrap();

        let plain = fx.respond("loader.js", &ctx()).await;
        assert!(plain.headers().get("content-encoding").is_none());
        assert_eq!(plain.headers()["vary"], "accept-encoding");

        let gz_ctx = RequestContext {
            accept_encoding: Some("gzip, br"),
            ..ctx()
        };
        let packed = fx.respond("loader.js", &gz_ctx).await;
        assert_eq!(packed.headers()["content-encoding"], "gzip");
        assert_ne!(packed.headers()["etag"], plain.headers()["etag"]);

        let binary = fx.respond("game.wasm", &gz_ctx).await;
        assert!(binary.headers().get("content-encoding").is_none());
    }

    #[tokio::test]
    async fn test_small_bodies_are_not_compressed() {
        let fx = Fixture::new("index.html", b"<p>");
        let gz_ctx = RequestContext {
            accept_encoding: Some("gzip"),
            ..ctx()
        };
        let resp = fx.respond("index.html", &gz_ctx).await;
        assert!(resp.headers().get("content-encoding").is_none());
    }

    #[tokio::test]
    async fn test_large_text_is_streamed_uncompressed() {
        let big = vec![b'a'; usize::try_from(BUFFER_LIMIT).unwrap() + 1];
        let fx = Fixture::new("huge.js", &big);
        let gz_ctx = RequestContext {
            accept_encoding: Some("gzip"),
            ..ctx()
        };
        let resp = fx.respond("huge.js", &gz_ctx).await;
        assert!(resp.headers().get("content-encoding").is_none());
        assert!(resp.headers().get("vary").is_none());
        assert_eq!(collect(resp).await.len(), big.len());
    }

    #[tokio::test]
    async fn test_head_has_length_but_no_body() {
        let fx = Fixture::new("a.png", b"0123456789");
        let ctx = RequestContext {
            is_head: true,
            ..ctx()
        };
        let resp = fx.respond("a.png", &ctx).await;
        assert_eq!(resp.headers()["content-length"], "10");
        assert_eq!(resp.body().size_hint().exact(), Some(0));
    }

    #[tokio::test]
    async fn test_directory_is_not_found() {
        let fx = Fixture::new("a.png", b"x");
        std::fs::create_dir(fx.dir.path().join("Build")).unwrap();
        let err = open_file(&fx.root(), Path::new("Build")).await.unwrap_err();
        assert!(matches!(err, ServeError::NotFound));
    }
}
