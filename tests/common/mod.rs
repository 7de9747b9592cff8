#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use http_body_util::BodyExt;
use hyper::body::Bytes;
use hyper::{Request, Response};
use tempfile::TempDir;

use webgl_host::config::Overrides;
use webgl_host::http::response::ResponseBody;
use webgl_host::{handler, AppState, Config};

pub const INDEX_HTML: &str = "<!DOCTYPE html><html><body><canvas id=\"unity-canvas\"></canvas></body></html>";

/// A document root laid out like a Unity WebGL build
pub struct Site {
    pub dir: TempDir,
    pub state: Arc<AppState>,
}

impl Site {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        write(root, "index.html", INDEX_HTML.as_bytes());
        write(root, "storage.js", b"window.gameStorage = {};");
        write(root, "sw.js", b"self.addEventListener('fetch', () => {});");
        write(root, "notes.html", b"<p>patch notes</p>");
        write(root, "Build/game.wasm", b"\0asm\x01\0\0\0");
        write(root, "Build/game.data", b"UnityWebData1.0\0");
        write(root, "Build/game.loader.js", b"function createUnityInstance() {}");
        write(root, "Build/game.framework.js.gz", b"\x1f\x8b\x08\0fake");
        write(root, "TemplateData/game.wasm", b"\0asm\x01\0\0\0");
        write(root, "TemplateData/style.css", b"body { margin: 0; }");
        write(root, "TemplateData/favicon.ico", b"\0\0\x01\0icon");
        write(root, "TemplateData/progress-bar.png", b"\x89PNGfake");

        let missing = root.join("no-config-here").display().to_string();
        let overrides = Overrides {
            root: Some(root.display().to_string()),
            port: None,
        };
        let mut cfg = Config::load_with(&missing, &overrides).unwrap();
        cfg.logging.access_log = false;
        adjust(&mut cfg);

        let state = Arc::new(AppState::new(&cfg).unwrap());
        Self { dir, state }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub async fn get(&self, path: &str) -> Response<ResponseBody> {
        self.send(Request::get(path).body(()).unwrap()).await
    }

    pub async fn send(&self, req: Request<()>) -> Response<ResponseBody> {
        let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        handler::handle_request(req, Arc::clone(&self.state), peer)
            .await
            .unwrap()
    }
}

pub fn write(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

pub async fn body(resp: Response<ResponseBody>) -> Bytes {
    resp.into_body().collect().await.unwrap().to_bytes()
}

pub fn header<'a>(resp: &'a Response<ResponseBody>, name: &str) -> Option<&'a str> {
    resp.headers().get(name).and_then(|v| v.to_str().ok())
}
