// Trusted-source verification API core
//
// HTTP surface over the `verification` library: claim verification as JSON,
// research as a server-sent event stream.

pub mod config;
pub mod server;

pub use config::*;
