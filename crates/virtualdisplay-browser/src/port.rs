// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `postMessage` transport into the viewer iframe.

use serde::Serialize;
use virtualdisplay_core::proto::Message;
use virtualdisplay_core::{PortError, ViewerPort};
use web_sys::HtmlIFrameElement;

/// Any origin: the viewer host is configurable.
pub const TARGET_ORIGIN: &str = "*";

/// Posts messages as plain JS objects to the iframe's window.
#[derive(Debug, Clone)]
pub struct PostMessagePort {
    iframe: HtmlIFrameElement,
}

impl PostMessagePort {
    /// Port targeting `iframe`.
    pub fn new(iframe: HtmlIFrameElement) -> Self {
        Self { iframe }
    }
}

impl ViewerPort for PostMessagePort {
    fn post_message(&self, message: &Message) -> Result<(), PortError> {
        let window = self
            .iframe
            .content_window()
            .ok_or(PortError::WindowUnavailable)?;
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let value = message
            .serialize(&serializer)
            .map_err(|err| PortError::Encode {
                message_type: message.type_name(),
                reason: err.to_string(),
            })?;
        window
            .post_message(&value, TARGET_ORIGIN)
            .map_err(|err| PortError::Rejected(format!("{err:?}")))
    }
}
