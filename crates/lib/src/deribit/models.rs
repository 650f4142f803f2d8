//! Request bodies for the Deribit control endpoints.

use serde::{Deserialize, Serialize};

/// Subscription operations Deribit exposes for public channels. Serialized
/// as the JSON-RPC method names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "public/subscribe")]
    Subscribe,
    #[serde(rename = "public/unsubscribe")]
    Unsubscribe,
}

impl Operation {
    /// JSON-RPC method name.
    pub fn method(self) -> &'static str {
        match self {
            Operation::Subscribe => "public/subscribe",
            Operation::Unsubscribe => "public/unsubscribe",
        }
    }
}

/// Body of POST /deribit/start: channels for the initial subscription
/// (e.g. "incremental_ticker.BTC-PERPETUAL").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub channels: Vec<String>,
}

/// One entry of POST /deribit/update: subscribe to or unsubscribe from a
/// channel on the live session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelUpdate {
    pub operation: Operation,
    pub channel: String,
}
