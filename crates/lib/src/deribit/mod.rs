//! Deribit market-data provider: JSON-RPC subscription frames over the
//! managed session, raw frames appended to the sink.

mod models;
mod service;

pub use models::{ChannelUpdate, Operation, SubscribeRequest};
pub use service::{DeribitService, DEFAULT_WS_URL};
