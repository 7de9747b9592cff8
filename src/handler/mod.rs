//! Request handler module
//!
//! Responsible for request routing dispatch and static file serving.

pub mod resolve;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::{handle_request, RequestContext};
