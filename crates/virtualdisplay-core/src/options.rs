// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Client construction options.

use serde::{Deserialize, Serialize};
use virtualdisplay_proto::{CameraConfig, UiConfig};

/// Viewer host used when `serverUrl` is not given.
pub const DEFAULT_SERVER_URL: &str = "https://server.virtualdisplay.io";

/// Options accepted by the client, in the host-facing camelCase shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    /// CSS selector of the element the viewer is attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Model identifier.
    pub model: String,
    /// License key.
    pub license: String,
    /// Verbose logging and the viewer's debug mode.
    #[serde(default)]
    pub debug: bool,
    /// Viewer UI language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Legacy flat flag; wins over `ui.arEnabled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ar_enabled: Option<bool>,
    /// Legacy flat flag; wins over `ui.fullscreenEnabled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullscreen_enabled: Option<bool>,
    /// Legacy flat flag; wins over `ui.loadingIndicatorEnabled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_indicator_enabled: Option<bool>,
    /// UI toggles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<UiConfig>,
    /// Initial camera placement and limits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraConfig>,
    /// Viewer host override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
}

impl ClientOptions {
    /// Options for `model` under `license`.
    pub fn new(model: impl Into<String>, license: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            license: license.into(),
            ..Self::default()
        }
    }

    /// Viewer host.
    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    /// Query parameters for the viewer URL, in order.
    pub fn viewer_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("license", self.license.clone()),
            ("model", self.model.clone()),
        ];
        if self.debug {
            query.push(("debug", "true".to_owned()));
        }
        if let Some(language) = &self.language {
            query.push(("language", language.clone()));
        }
        query
    }

    /// UI flags after applying legacy precedence.
    pub fn effective_ui(&self) -> UiConfig {
        let ui = self.ui.clone().unwrap_or_default();
        UiConfig {
            ar_enabled: self.ar_enabled.or(ui.ar_enabled),
            fullscreen_enabled: self.fullscreen_enabled.or(ui.fullscreen_enabled),
            loading_indicator_enabled: self
                .loading_indicator_enabled
                .or(ui.loading_indicator_enabled),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_camel_case_and_defaults_server() {
        let options: ClientOptions = serde_json::from_value(json!({
            "parent": "#viewer",
            "model": "chair",
            "license": "abc",
            "arEnabled": false,
            "ui": {"arEnabled": true, "fullscreenEnabled": false},
            "camera": {"initialZoom": 80.0}
        }))
        .unwrap();
        assert_eq!(options.server_url(), DEFAULT_SERVER_URL);
        assert!(!options.debug);
        let ui = options.effective_ui();
        assert_eq!(ui.ar_enabled, Some(false));
        assert_eq!(ui.fullscreen_enabled, Some(false));
        assert_eq!(ui.loading_indicator_enabled, None);
    }

    #[test]
    fn query_order_is_fixed() {
        let mut options = ClientOptions::new("chair", "abc");
        assert_eq!(
            options.viewer_query(),
            vec![("license", "abc".to_owned()), ("model", "chair".to_owned())]
        );
        options.debug = true;
        options.language = Some("nl".into());
        let keys: Vec<_> = options.viewer_query().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["license", "model", "debug", "language"]);
    }
}
