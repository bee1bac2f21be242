//! Push listener.
//!
//! Holds one WebSocket to the backend's Socket.IO endpoint and forwards
//! what it hears into the page's inbound queue. Reconnecting is not this
//! module's job: when the socket ends, `Disconnected` is posted and the
//! listener returns.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::tungstenite::Message;

use super::frame::{self, Frame, CONNECT, PONG};
use super::{PushError, PushEvent, SensorUpdate, SENSOR_DATA_EVENT};
use crate::logging::{self, Source};

/// What the listener does in response to one text message.
#[derive(Debug, Default, PartialEq)]
pub struct Step {
    pub reply: Option<&'static str>,
    pub event: Option<PushEvent>,
    pub closed: bool,
}

/// Socket.IO client protocol state, kept apart from the socket so it can
/// be driven directly.
#[derive(Debug, Default)]
pub struct ChannelState {
    connected: bool,
}

impl ChannelState {
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn on_text(&mut self, text: &str) -> Result<Step, PushError> {
        let step = match frame::decode(text)? {
            Frame::Open(_) => Step {
                reply: Some(CONNECT),
                ..Step::default()
            },
            Frame::Ping => Step {
                reply: Some(PONG),
                ..Step::default()
            },
            Frame::Connected => {
                self.connected = true;
                Step {
                    event: Some(PushEvent::Connected),
                    ..Step::default()
                }
            }
            Frame::Disconnected | Frame::Close => self.on_close(),
            Frame::ConnectError(reason) => {
                return Err(PushError::Malformed(format!("connect refused: {}", reason)));
            }
            Frame::Event { name, payload } if name == SENSOR_DATA_EVENT => {
                let update: SensorUpdate =
                    serde_json::from_value(payload).map_err(|e| PushError::Malformed(e.to_string()))?;
                if update.site_id().is_none() {
                    return Err(PushError::Malformed("sensor_data without water_body_id".into()));
                }
                Step {
                    event: Some(PushEvent::Reading(update)),
                    ..Step::default()
                }
            }
            Frame::Event { .. } | Frame::Pong | Frame::Ignored => Step::default(),
        };
        Ok(step)
    }

    /// The socket ended. `Disconnected` is only reported once, and only
    /// after a `Connected`.
    pub fn on_close(&mut self) -> Step {
        let was_connected = std::mem::replace(&mut self.connected, false);
        Step {
            reply: None,
            event: was_connected.then_some(PushEvent::Disconnected),
            closed: true,
        }
    }
}

/// Connects to `url` and forwards push events until the socket closes or
/// the receiving page goes away.
pub async fn run_listener<T>(url: String, tx: UnboundedSender<T>) -> Result<(), PushError>
where
    T: From<PushEvent> + Send + 'static,
{
    logging::info(Source::Push, None, &format!("Connecting to push channel at {}", url));

    let (mut ws, _response) = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok(conn) => conn,
        Err(e) => {
            logging::warn(Source::Push, None, &format!("Push channel unavailable: {}", e));
            let _ = tx.send(PushEvent::Disconnected.into());
            return Err(e.into());
        }
    };

    let mut state = ChannelState::default();
    let mut outcome = Ok(());

    while let Some(message) = ws.next().await {
        let step = match message {
            Ok(Message::Text(text)) => match state.on_text(&text) {
                Ok(step) => step,
                Err(e) => {
                    logging::warn(Source::Push, None, &format!("Dropping packet: {}", e));
                    continue;
                }
            },
            Ok(Message::Ping(data)) => {
                if let Err(e) = ws.send(Message::Pong(data)).await {
                    outcome = Err(e.into());
                    break;
                }
                continue;
            }
            Ok(Message::Close(_)) => state.on_close(),
            Ok(_) => continue,
            Err(e) => {
                logging::warn(Source::Push, None, &format!("Push channel error: {}", e));
                outcome = Err(e.into());
                state.on_close()
            }
        };

        if let Some(reply) = step.reply {
            if let Err(e) = ws.send(Message::Text(reply.into())).await {
                outcome = Err(e.into());
                break;
            }
        }
        if let Some(event) = step.event {
            if let PushEvent::Reading(update) = &event {
                logging::debug(Source::Push, update.site_id(), "sensor_data received");
            }
            if tx.send(event.into()).is_err() {
                // Page has shut down.
                return Ok(());
            }
        }
        if step.closed {
            logging::info(Source::Push, None, "Push channel closed");
            return outcome;
        }
    }

    if let Some(event) = state.on_close().event {
        let _ = tx.send(event.into());
    }
    outcome
}
