//! Response compression
//!
//! gzip encoding of text responses, negotiated through `Accept-Encoding`.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Write};

/// Whether the client accepts a `gzip` coding (`q=0` counts as refusal)
pub fn accepts_gzip(accept_encoding: Option<&str>) -> bool {
    let Some(header) = accept_encoding else {
        return false;
    };

    let mut wildcard = None;
    for item in header.split(',') {
        let mut params = item.split(';').map(str::trim);
        let coding = params.next().unwrap_or_default().to_ascii_lowercase();
        let quality = params
            .find_map(|p| p.strip_prefix("q="))
            .and_then(|q| q.parse::<f32>().ok())
            .unwrap_or(1.0);

        match coding.as_str() {
            "gzip" | "x-gzip" => return quality > 0.0,
            "*" => wildcard = Some(quality > 0.0),
            _ => {}
        }
    }

    wildcard.unwrap_or(false)
}

/// gzip `data` at the default compression level
pub fn gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
