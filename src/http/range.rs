//! Byte range requests
//!
//! Single-range `Range: bytes=` parsing (RFC 9110 §14). Multi-range requests
//! and other units are ignored and answered with the full body.

/// How a `Range` header applies to a body of known length
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No usable range; send the full body
    Full,
    /// Send the inclusive byte span
    Partial(ByteSpan),
    /// Range lies beyond the body, answer 416
    Unsatisfiable,
}

/// Resolved inclusive byte span, always within the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    pub start: u64,
    pub end: u64,
}

impl ByteSpan {
    pub const fn len(self) -> u64 {
        self.end - self.start + 1
    }

    /// A resolved span covers at least one byte
    pub const fn is_empty(self) -> bool {
        false
    }

    /// `Content-Range` header value
    pub fn content_range(self, total: u64) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// Resolve a `Range` header against a body of `len` bytes
///
/// Supported forms: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.
pub fn resolve(range_header: Option<&str>, len: u64) -> RangeOutcome {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeOutcome::Full;
    };

    if spec.contains(',') {
        return RangeOutcome::Full;
    }

    let Some((first, last)) = spec.split_once('-') else {
        return RangeOutcome::Full;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        return resolve_suffix(last, len);
    }

    let Ok(start) = first.parse::<u64>() else {
        return RangeOutcome::Full;
    };
    if start >= len {
        return RangeOutcome::Unsatisfiable;
    }

    let end = if last.is_empty() {
        len - 1
    } else {
        match last.parse::<u64>() {
            Ok(end) if end < start => return RangeOutcome::Full,
            Ok(end) => end.min(len - 1),
            Err(_) => return RangeOutcome::Full,
        }
    };

    RangeOutcome::Partial(ByteSpan { start, end })
}

fn resolve_suffix(last: &str, len: u64) -> RangeOutcome {
    let Ok(suffix) = last.parse::<u64>() else {
        return RangeOutcome::Full;
    };
    if suffix == 0 || len == 0 {
        return RangeOutcome::Unsatisfiable;
    }

    RangeOutcome::Partial(ByteSpan {
        start: len.saturating_sub(suffix),
        end: len - 1,
    })
}
