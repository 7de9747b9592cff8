//! HTTP protocol layer module
//!
//! Header policy, caching, ranges, compression and response builders,
//! independent of how a request path is mapped to a file.

pub mod cache;
pub mod compress;
pub mod mime;
pub mod policy;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use policy::{lookup_path, AssetPolicy};
pub use response::{
    build_304_response, build_404_response, build_405_response, build_416_response,
    build_options_response,
};
