//! Server push channel.
//!
//! The backend pushes a `sensor_data` event for every simulated reading
//! over Socket.IO. `listener` owns the WebSocket, `frame` decodes the
//! Engine.IO / Socket.IO packet layers, and everything the page sees comes
//! out as a `PushEvent` on its inbound queue.

pub mod frame;
pub mod listener;

use serde::Deserialize;
use thiserror::Error;

use crate::model::{Reading, Severity};

/// Name of the only event the page subscribes to.
pub const SENSOR_DATA_EVENT: &str = "sensor_data";

#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    Connected,
    Disconnected,
    Reading(SensorUpdate),
}

/// Payload of a `sensor_data` event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SensorUpdate {
    /// Display name of the site.
    #[serde(default)]
    pub name: String,
    /// Carries the site id (`water_body_id`) and every scalar.
    #[serde(flatten)]
    pub reading: Reading,
    /// Alerts raised server-side by this reading.
    #[serde(default)]
    pub alerts: Vec<PushedAlert>,
}

impl SensorUpdate {
    pub fn site_id(&self) -> Option<u32> {
        self.reading.site_id
    }
}

/// `[type, message, severity]` as serialized by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PushedAlert(pub String, pub String, pub Severity);

#[derive(Debug, Error)]
pub enum PushError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("malformed packet: {0}")]
    Malformed(String),
}
