// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON encoding helpers and the inbound message gate.
//!
//! The browser `message` channel is shared with every other script on the
//! page, so inbound payloads are untrusted. [`decode_inbound`] only accepts
//! the two shapes the viewer originates:
//!
//! * `{type: "state", nodes: [...], isInitial?: bool}`
//! * `{type: "snapshot", filename: string, data: string}`
//!
//! Anything else, including client → viewer shapes echoed back, yields
//! `None`.

use serde_json::Value;

use crate::Message;

/// Tag of viewer state reports.
pub const STATE: &str = "state";
/// Tag of snapshot requests and responses.
pub const SNAPSHOT: &str = "snapshot";

/// Serialize a message to JSON text.
pub fn encode(message: &Message) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

/// Serialize a message to a JSON value (e.g. for `postMessage` bridges).
pub fn to_value(message: &Message) -> Result<Value, serde_json::Error> {
    serde_json::to_value(message)
}

/// Parse JSON text and pass it through [`decode_inbound`].
pub fn decode_text(text: &str) -> Option<Message> {
    let value: Value = serde_json::from_str(text).ok()?;
    decode_inbound(&value)
}

/// Accept a raw inbound payload only when it is a well-formed viewer message.
pub fn decode_inbound(value: &Value) -> Option<Message> {
    let obj = value.as_object()?;
    match obj.get("type")?.as_str()? {
        STATE => {
            if !obj.get("nodes")?.is_array() {
                return None;
            }
        }
        SNAPSHOT => {
            obj.get("filename")?.as_str()?;
            obj.get("data")?.as_str()?;
        }
        _ => return None,
    }
    serde_json::from_value(value.clone()).ok()
}
