// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Viewer UI configuration messages.

use tracing::debug;
use virtualdisplay_proto::{Message, UiConfig, ViewerConfig};

use crate::events::{DomainEvent, EventBus};
use crate::options::ClientOptions;

/// Sends `config` messages controlling the viewer's buttons and camera.
#[derive(Debug, Clone)]
pub struct ViewerService {
    bus: EventBus,
}

impl ViewerService {
    /// Service emitting on `bus`.
    pub fn new(bus: &EventBus) -> Self {
        Self { bus: bus.clone() }
    }

    /// Initial configuration derived from `options`.
    ///
    /// Only UI flags explicitly disabled are sent, legacy flat flags taking
    /// precedence over `ui.*`; the camera block is sent when present.
    /// Nothing is sent when neither remains.
    pub fn send_initial_config(&self, options: &ClientOptions) {
        let effective = options.effective_ui();
        let disabled = |flag: Option<bool>| (flag == Some(false)).then_some(false);
        let ui = UiConfig {
            ar_enabled: disabled(effective.ar_enabled),
            fullscreen_enabled: disabled(effective.fullscreen_enabled),
            loading_indicator_enabled: disabled(effective.loading_indicator_enabled),
        };
        let config = ViewerConfig {
            ui: (!ui.is_empty()).then_some(ui),
            camera: options.camera.clone(),
        };
        if config.ui.is_none() && config.camera.is_none() {
            return;
        }
        debug!(?config, "sending initial viewer config");
        self.send(config);
    }

    /// Show or hide the AR button.
    pub fn set_ar_enabled(&self, enabled: bool) {
        self.update_ui_config(UiConfig {
            ar_enabled: Some(enabled),
            ..UiConfig::default()
        });
    }

    /// Show or hide the fullscreen button.
    pub fn set_fullscreen_enabled(&self, enabled: bool) {
        self.update_ui_config(UiConfig {
            fullscreen_enabled: Some(enabled),
            ..UiConfig::default()
        });
    }

    /// Show or hide the loading indicator.
    pub fn set_loading_indicator_enabled(&self, enabled: bool) {
        self.update_ui_config(UiConfig {
            loading_indicator_enabled: Some(enabled),
            ..UiConfig::default()
        });
    }

    /// Send the flags set in `ui`; nothing when none are.
    pub fn update_ui_config(&self, ui: UiConfig) {
        if ui.is_empty() {
            return;
        }
        debug!(?ui, "updating viewer ui");
        self.send(ViewerConfig {
            ui: Some(ui),
            camera: None,
        });
    }

    /// Hide every UI element.
    pub fn hide_all_ui(&self) {
        self.update_ui_config(UiConfig::all(false));
    }

    /// Show every UI element.
    pub fn show_all_ui(&self) {
        self.update_ui_config(UiConfig::all(true));
    }

    fn send(&self, config: ViewerConfig) {
        self.bus
            .emit(&DomainEvent::ConfigMessage(Message::Config { config }));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::events::EventName;
    use std::cell::RefCell;
    use std::rc::Rc;
    use virtualdisplay_proto::CameraConfig;

    fn capture(bus: &EventBus) -> Rc<RefCell<Vec<ViewerConfig>>> {
        let sent = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&sent);
        bus.subscribe(EventName::ConfigMessage, move |event| {
            if let DomainEvent::ConfigMessage(Message::Config { config }) = event {
                s.borrow_mut().push(config.clone());
            }
        });
        sent
    }

    #[test]
    fn initial_config_sends_only_disabled_flags() {
        let bus = EventBus::new();
        let sent = capture(&bus);
        let mut options = ClientOptions::new("m", "l");
        options.ar_enabled = Some(false);
        options.fullscreen_enabled = Some(true);
        options.ui = Some(UiConfig {
            ar_enabled: Some(true),
            fullscreen_enabled: None,
            loading_indicator_enabled: Some(false),
        });
        ViewerService::new(&bus).send_initial_config(&options);
        assert_eq!(
            *sent.borrow(),
            vec![ViewerConfig {
                ui: Some(UiConfig {
                    ar_enabled: Some(false),
                    fullscreen_enabled: None,
                    loading_indicator_enabled: Some(false),
                }),
                camera: None,
            }]
        );
    }

    #[test]
    fn initial_config_with_nothing_to_say_is_skipped() {
        let bus = EventBus::new();
        let sent = capture(&bus);
        let mut options = ClientOptions::new("m", "l");
        options.ar_enabled = Some(true);
        ViewerService::new(&bus).send_initial_config(&options);
        assert!(sent.borrow().is_empty());

        options.camera = Some(CameraConfig {
            initial_zoom: Some(80.0),
            ..CameraConfig::default()
        });
        ViewerService::new(&bus).send_initial_config(&options);
        assert_eq!(sent.borrow().len(), 1);
        assert!(sent.borrow()[0].ui.is_none());
    }

    #[test]
    fn setters_send_single_flag_configs() {
        let bus = EventBus::new();
        let sent = capture(&bus);
        let viewer = ViewerService::new(&bus);
        viewer.set_ar_enabled(true);
        viewer.update_ui_config(UiConfig::default());
        viewer.hide_all_ui();
        let sent = sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].ui.as_ref().and_then(|u| u.ar_enabled), Some(true));
        assert_eq!(sent[1].ui, Some(UiConfig::all(false)));
    }
}
