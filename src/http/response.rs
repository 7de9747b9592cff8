//! HTTP response building module
//!
//! Builders for each status code the server answers with.

use std::io;

use futures_util::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::http::response::Builder;
use hyper::Response;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use super::policy::AssetPolicy;

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Body of every response: either buffered bytes or a streamed file
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Buffered body
pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

pub fn empty_body() -> ResponseBody {
    Empty::new().map_err(|never| match never {}).boxed_unsync()
}

/// Body read from `reader` in chunks as the client consumes it
pub fn stream_body<R>(reader: R) -> ResponseBody
where
    R: AsyncRead + Send + 'static,
{
    StreamBody::new(ReaderStream::new(reader).map_ok(Frame::data)).boxed_unsync()
}

/// Start a response carrying the headers an asset policy prescribes
pub fn asset_builder(status: u16, policy: &AssetPolicy, etag: &str) -> Builder {
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", policy.content_type)
        .header("Cache-Control", policy.cache.to_header_value())
        .header("Accept-Ranges", "bytes")
        .header("ETag", etag);

    if policy.cors {
        builder = builder.header("Access-Control-Allow-Origin", "*");
    }
    if let Some(encoding) = policy.content_encoding {
        builder = builder.header("Content-Encoding", encoding.as_str());
    }
    builder
}

/// Finish a builder, falling back to an empty response if a header was invalid
pub fn finish(builder: Builder, body: ResponseBody, label: &str) -> Response<ResponseBody> {
    builder.body(body).unwrap_or_else(|e| {
        log_build_error(label, &e);
        Response::new(empty_body())
    })
}

/// Build 304 Not Modified response
pub fn build_304_response(policy: &AssetPolicy, etag: &str) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(304)
        .header("ETag", etag)
        .header("Cache-Control", policy.cache.to_header_value());
    if policy.cors {
        builder = builder.header("Access-Control-Allow-Origin", "*");
    }
    finish(builder, empty_body(), "304")
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .header("Cache-Control", "no-cache");
    finish(builder, full_body(Bytes::from_static(b"404 Not Found")), "404")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", ALLOWED_METHODS);
    finish(builder, full_body(Bytes::from_static(b"405 Method Not Allowed")), "405")
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response() -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(204)
        .header("Allow", ALLOWED_METHODS)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
        .header("Access-Control-Allow-Headers", "Content-Type, Range")
        .header("Access-Control-Max-Age", "86400");
    finish(builder, empty_body(), "OPTIONS")
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(416)
        .header("Content-Type", "text/plain")
        .header("Content-Range", format!("bytes */{file_size}"));
    finish(builder, full_body(Bytes::from_static(b"Range Not Satisfiable")), "416")
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
