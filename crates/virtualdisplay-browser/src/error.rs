// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Conversions into JavaScript errors.

use virtualdisplay_core::VirtualdisplayError;
use wasm_bindgen::prelude::*;

/// Message thrown to JavaScript: the code in brackets, then the text.
pub fn js_error_message(err: &VirtualdisplayError) -> String {
    format!("[{}] {err}", err.code())
}

/// Client error as a thrown JS `Error`.
pub fn to_js_error(err: &VirtualdisplayError) -> JsError {
    JsError::new(&js_error_message(err))
}

/// Conversion failure between JS values and Rust data.
pub fn conversion_error(what: &str, err: &serde_wasm_bindgen::Error) -> JsError {
    JsError::new(&format!("[INVALID_PARAMETER] {what}: {err}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn message_is_prefixed_with_code() {
        let err = VirtualdisplayError::ValueNotFound {
            attribute: "Color".into(),
            value: "Green".into(),
        };
        assert_eq!(
            js_error_message(&err),
            "[VALUE_NOT_FOUND] Value \"Green\" not found for attribute \"Color\""
        );
        assert_eq!(
            js_error_message(&VirtualdisplayError::NoMapping),
            "[NO_MAPPING] No mapping configured. Call setMapping() first."
        );
    }
}
