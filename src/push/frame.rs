//! Engine.IO v4 / Socket.IO v5 text packets.
//!
//! Every WebSocket text message is one Engine.IO packet: a type digit
//! followed by its data. Type `4` (message) wraps a Socket.IO packet, which
//! again starts with a type digit, optionally followed by a namespace
//! (`/ns,`) and an ack id, then a JSON body.
//!
//! Only the subset the dashboard needs is decoded; binary packets and
//! upgrades never occur on a pure WebSocket transport.

use serde_json::Value;

use super::PushError;

/// Engine.IO pong, answering a server ping.
pub const PONG: &str = "3";
/// Socket.IO connect request for the default namespace.
pub const CONNECT: &str = "40";

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Engine.IO handshake; carries the session JSON (sid, ping interval).
    Open(String),
    Close,
    Ping,
    Pong,
    /// Socket.IO namespace connect acknowledged.
    Connected,
    /// Socket.IO namespace disconnected by the server.
    Disconnected,
    Event { name: String, payload: Value },
    /// A Socket.IO connect error from the server.
    ConnectError(String),
    /// A well-formed packet the dashboard does not use (noop, ack, ...).
    Ignored,
}

pub fn decode(text: &str) -> Result<Frame, PushError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or_else(|| PushError::Malformed("empty packet".into()))?;
    let rest = chars.as_str();

    match kind {
        '0' => Ok(Frame::Open(rest.to_string())),
        '1' => Ok(Frame::Close),
        '2' => Ok(Frame::Ping),
        '3' => Ok(Frame::Pong),
        '4' => decode_socket_packet(rest),
        '5' | '6' => Ok(Frame::Ignored),
        other => Err(PushError::Malformed(format!("unknown engine packet type '{}'", other))),
    }
}

fn decode_socket_packet(text: &str) -> Result<Frame, PushError> {
    let mut chars = text.chars();
    let kind = chars
        .next()
        .ok_or_else(|| PushError::Malformed("empty socket packet".into()))?;
    let body = strip_ack_id(strip_namespace(chars.as_str()));

    match kind {
        '0' => Ok(Frame::Connected),
        '1' => Ok(Frame::Disconnected),
        '2' => decode_event(body),
        '4' => Ok(Frame::ConnectError(body.to_string())),
        '3' | '5' | '6' => Ok(Frame::Ignored),
        other => Err(PushError::Malformed(format!("unknown socket packet type '{}'", other))),
    }
}

/// Drops a leading `/namespace,` if present.
fn strip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        match body.find(',') {
            Some(i) => &body[i + 1..],
            None => "",
        }
    } else {
        body
    }
}

fn strip_ack_id(body: &str) -> &str {
    body.trim_start_matches(|c: char| c.is_ascii_digit())
}

fn decode_event(body: &str) -> Result<Frame, PushError> {
    let parts: Vec<Value> = serde_json::from_str(body).map_err(|e| PushError::Malformed(e.to_string()))?;
    let mut parts = parts.into_iter();
    let name = match parts.next() {
        Some(Value::String(name)) => name,
        _ => return Err(PushError::Malformed("event without a name".into())),
    };
    Ok(Frame::Event {
        name,
        payload: parts.next().unwrap_or(Value::Null),
    })
}
