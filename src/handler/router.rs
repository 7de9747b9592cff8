//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, route
//! resolution, file serving and access logging.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use hyper::body::Body;
use hyper::header::{HeaderValue, CONTENT_LENGTH, SERVER};
use hyper::{HeaderMap, Method, Request, Response};

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::{resolve, static_files};
use crate::http::{self, response::ResponseBody};
use crate::logger::{self, AccessLogEntry};

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
    pub range_header: Option<&'a str>,
    pub accept_encoding: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    fn from_parts(method: &Method, path: &'a str, headers: &'a HeaderMap) -> Self {
        let header = move |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        Self {
            path,
            is_head: *method == Method::HEAD,
            if_none_match: header("if-none-match"),
            range_header: header("range"),
            accept_encoding: header("accept-encoding"),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let path = req.uri().path();

    let mut response = match check_http_method(method) {
        Some(resp) => resp,
        None => {
            let ctx = RequestContext::from_parts(method, path, req.headers());
            route_request(&ctx, &state).await
        }
    };

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if state.access_log {
        log_access(&req, &response, &state, peer_addr, started);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_debug(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Resolve the path against the site layout and serve the file
async fn route_request(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    let route = match resolve::resolve(ctx.path, &state.config.site) {
        Ok(route) => route,
        Err(ServeError::Forbidden(path)) => {
            logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
            return http::build_404_response();
        }
        Err(_) => return http::build_404_response(),
    };

    logger::log_debug(&format!(
        "{} -> {:?} {}",
        ctx.path,
        route.kind,
        route.relative.display()
    ));

    static_files::serve(ctx, &state.document_root, &route, &state.config.http).await
}

fn log_access<B>(
    req: &Request<B>,
    response: &Response<ResponseBody>,
    state: &AppState,
    peer_addr: SocketAddr,
    started: Instant,
) {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    // streamed bodies have no exact size hint, Content-Length is authoritative
    entry.body_bytes = if req.method() == Method::HEAD {
        0
    } else {
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .or_else(|| {
                let exact = response.body().size_hint().exact()?;
                usize::try_from(exact).ok()
            })
            .unwrap_or_default()
    };
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}
