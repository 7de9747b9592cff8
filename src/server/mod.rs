// Server module entry point
// Listener setup, accept loop, connection handling, timeouts and signals

pub mod accept;
pub mod connection;
pub mod listener;
pub mod signal;
pub mod write_timeout;

pub use accept::serve;
pub use listener::create_listener;
pub use signal::shutdown_signal;
