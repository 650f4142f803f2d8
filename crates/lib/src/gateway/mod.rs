//! Control-plane HTTP server: start/update/stop/state for the Deribit
//! subscription session.

mod server;

pub use server::run_gateway;
