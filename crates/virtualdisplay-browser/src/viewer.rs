// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The JavaScript-facing client class.

use std::rc::Rc;

use js_sys::{Function, Object, Reflect};
use serde::Serialize;
use tracing::{info, warn};
use virtualdisplay_core::proto::ModelNodeDto;
use virtualdisplay_core::{ClientOptions, VirtualdisplayClient, VirtualdisplayError};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlIFrameElement, MessageEvent};

use crate::error::{conversion_error, to_js_error};
use crate::iframe::{IframeBuilder, Parent};
use crate::mapping::{from_js, JsMapping};
use crate::port::PostMessagePort;

/// Interactive 3D viewer embedded in the page.
///
/// ```js
/// const viewer = new VirtualdisplayViewer({ parent: '#viewer', model: 'chair', license: 'key' });
/// viewer.setMapping({ attributes: [{ name: 'Color', values: [
///   { value: 'Red', nodeIds: ['red_seat'], isSelected: true },
///   { value: 'Blue', nodeIds: ['blue_seat'] },
/// ] }] });
/// viewer.select('Color', 'Blue');
/// ```
#[wasm_bindgen]
pub struct VirtualdisplayViewer {
    client: Rc<VirtualdisplayClient>,
    iframe: Option<HtmlIFrameElement>,
    on_load: Option<Closure<dyn FnMut()>>,
    on_message: Option<Closure<dyn FnMut(MessageEvent)>>,
}

#[wasm_bindgen]
impl VirtualdisplayViewer {
    /// Create the client and its iframe.
    ///
    /// `options.parent` may be a CSS selector or an element.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<VirtualdisplayViewer, JsError> {
        #[cfg(feature = "console-panic")]
        console_error_panic_hook::set_once();

        let (options, parent) = parse_options(&options)?;
        crate::logging::init(options.debug);
        let client = Rc::new(VirtualdisplayClient::new(options.clone()));

        let ready = Rc::clone(&client);
        let on_load = Closure::<dyn FnMut()>::new(move || ready.notify_ready());
        let iframe = IframeBuilder::new(&options, parent).create(on_load.as_ref().unchecked_ref())?;
        client.attach_port(Rc::new(PostMessagePort::new(iframe.clone())));

        let inbound = Rc::clone(&client);
        let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            // unrelated page traffic fails conversion or validation
            if let Ok(value) = serde_wasm_bindgen::from_value::<serde_json::Value>(event.data()) {
                if !inbound.receive(&value) {
                    tracing::trace!("ignored foreign message");
                }
            }
        });
        let window = web_sys::window().ok_or_else(|| JsError::new("no window available"))?;
        window
            .add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())
            .map_err(|_| JsError::new("failed to listen for messages"))?;

        Ok(Self {
            client,
            iframe: Some(iframe),
            on_load: Some(on_load),
            on_message: Some(on_message),
        })
    }

    /// Load an attribute mapping; `values` may be a function of the
    /// current selections.
    #[wasm_bindgen(js_name = setMapping)]
    pub fn set_mapping(&self, config: JsValue) -> Result<(), JsError> {
        let result = match from_js(&config)? {
            JsMapping::Literal(json) => self.client.set_mapping_json(&json),
            JsMapping::Typed(typed) => self.client.set_mapping(typed),
        };
        result.map_err(|err| to_js_error(&err))
    }

    /// Select `value` of `attribute`.
    pub fn select(&self, attribute: &str, value: &str) -> Result<(), JsError> {
        let selector = self
            .client
            .get_attribute(attribute)
            .map_err(|err| to_js_error(&err))?;
        selector.select(value).map_err(|err| to_js_error(&err))?;
        Ok(())
    }

    /// Selected value of `attribute`.
    #[wasm_bindgen(js_name = currentValue)]
    pub fn current_value(&self, attribute: &str) -> Result<Option<String>, JsError> {
        self.client
            .get_attribute(attribute)
            .map(|s| s.current_value())
            .map_err(|err| to_js_error(&err))
    }

    /// Value names of `attribute`.
    #[wasm_bindgen(js_name = availableValues)]
    pub fn available_values(&self, attribute: &str) -> Result<Vec<String>, JsError> {
        self.client
            .get_attribute(attribute)
            .map(|s| s.available_values())
            .map_err(|err| to_js_error(&err))
    }

    /// Call `callback` whenever the viewer reports state for `attribute`.
    #[wasm_bindgen(js_name = onAttributeChange)]
    pub fn on_attribute_change(&self, attribute: &str, callback: Function) -> Result<(), JsError> {
        let selector = self
            .client
            .get_attribute(attribute)
            .map_err(|err| to_js_error(&err))?;
        selector.on_change(move || call(&callback, &[]));
        Ok(())
    }

    /// Show a node; false when the node is unknown.
    #[wasm_bindgen(js_name = showNode)]
    pub fn show_node(&self, id: &str) -> bool {
        self.client.node_selector(id).map(|n| n.show()).is_some()
    }

    /// Hide a node; false when the node is unknown.
    #[wasm_bindgen(js_name = hideNode)]
    pub fn hide_node(&self, id: &str) -> bool {
        self.client.node_selector(id).map(|n| n.hide()).is_some()
    }

    /// Toggle a node; false when the node is unknown.
    #[wasm_bindgen(js_name = toggleNode)]
    pub fn toggle_node(&self, id: &str) -> bool {
        self.client.node_selector(id).map(|n| n.toggle()).is_some()
    }

    /// Last reported visibility of a node.
    #[wasm_bindgen(js_name = isNodeVisible)]
    pub fn is_node_visible(&self, id: &str) -> bool {
        self.client.get_node(id).is_some_and(|n| n.is_visible())
    }

    /// Every known node as `{id, name, type, visible}`.
    pub fn nodes(&self) -> Result<JsValue, JsError> {
        let nodes: Vec<ModelNodeDto> = self.client.get_nodes().iter().map(|n| n.to_dto()).collect();
        nodes
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|err| conversion_error("nodes", &err))
    }

    /// Send a raw mutation batch `[{type, nodeId}]`.
    #[wasm_bindgen(js_name = sendMutations)]
    pub fn send_mutations(&self, mutations: JsValue) -> Result<(), JsError> {
        let json: serde_json::Value = serde_wasm_bindgen::from_value(mutations)
            .map_err(|err| conversion_error("mutations", &err))?;
        self.client
            .send_mutations_json(&json)
            .map_err(|err| to_js_error(&err))
    }

    /// True once the viewer's initial state has arrived.
    #[wasm_bindgen(getter, js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.client.is_ready()
    }

    /// Call `callback` when ready; immediately if already ready.
    #[wasm_bindgen(js_name = onReady)]
    pub fn on_ready(&self, callback: Function) {
        self.client.on_ready(move || call(&callback, &[]));
    }

    /// Queue an absolute rotation in degrees.
    pub fn rotate(&self, degrees: f64) {
        self.client.camera().rotate(degrees);
    }

    /// Queue an absolute tilt in degrees.
    pub fn tilt(&self, degrees: f64) {
        self.client.camera().tilt(degrees);
    }

    /// Queue a zoom percentage.
    pub fn zoom(&self, percentage: f64) {
        self.client.camera().zoom(percentage);
    }

    /// Send the queued camera commands.
    #[wasm_bindgen(js_name = applyCamera)]
    pub fn apply_camera(&self) {
        self.client.camera().set();
    }

    /// Return the camera to its initial placement.
    #[wasm_bindgen(js_name = resetCamera)]
    pub fn reset_camera(&self) {
        self.client.camera().reset();
    }

    /// Request a snapshot; `callback(filename, data)` runs when it arrives.
    #[wasm_bindgen(js_name = takeSnapshot)]
    pub fn take_snapshot(&self, filename: &str, callback: Function) -> Result<(), JsError> {
        let photo = self
            .client
            .snapshot()
            .take(filename)
            .map_err(|err| to_js_error(&err))?;
        photo.on_developed(move |data| {
            call(
                &callback,
                &[JsValue::from_str(&data.filename), JsValue::from_str(&data.data)],
            );
        });
        Ok(())
    }

    /// Show or hide the AR button.
    #[wasm_bindgen(js_name = setArEnabled)]
    pub fn set_ar_enabled(&self, enabled: bool) {
        self.client.viewer().set_ar_enabled(enabled);
    }

    /// Show or hide the fullscreen button.
    #[wasm_bindgen(js_name = setFullscreenEnabled)]
    pub fn set_fullscreen_enabled(&self, enabled: bool) {
        self.client.viewer().set_fullscreen_enabled(enabled);
    }

    /// Show or hide the loading indicator.
    #[wasm_bindgen(js_name = setLoadingIndicatorEnabled)]
    pub fn set_loading_indicator_enabled(&self, enabled: bool) {
        self.client.viewer().set_loading_indicator_enabled(enabled);
    }

    /// Hide every viewer UI element.
    #[wasm_bindgen(js_name = hideAllUi)]
    pub fn hide_all_ui(&self) {
        self.client.viewer().hide_all_ui();
    }

    /// Show every viewer UI element.
    #[wasm_bindgen(js_name = showAllUi)]
    pub fn show_all_ui(&self) {
        self.client.viewer().show_all_ui();
    }

    /// Tear down the client, its listeners and the iframe.
    pub fn destroy(&mut self) {
        self.teardown();
    }
}

impl VirtualdisplayViewer {
    /// Detach every listener before its closure is freed. Runs once.
    fn teardown(&mut self) {
        if self.on_message.is_none() && self.iframe.is_none() {
            return;
        }
        self.client.destroy();
        if let (Some(window), Some(listener)) = (web_sys::window(), self.on_message.take()) {
            let removed = window
                .remove_event_listener_with_callback("message", listener.as_ref().unchecked_ref());
            if removed.is_err() {
                warn!("failed to remove message listener");
            }
        }
        if let Some(iframe) = self.iframe.take() {
            if let Some(on_load) = self.on_load.take() {
                let removed = iframe
                    .remove_event_listener_with_callback("load", on_load.as_ref().unchecked_ref());
                if removed.is_err() {
                    warn!("failed to remove load listener");
                }
            }
            iframe.remove();
        }
        self.on_load = None;
        info!("viewer destroyed");
    }
}

impl Drop for VirtualdisplayViewer {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn parse_options(raw: &JsValue) -> Result<(ClientOptions, Parent), JsError> {
    let parent_value = Reflect::get(raw, &JsValue::from_str("parent")).unwrap_or(JsValue::UNDEFINED);
    let parent = match parent_value.dyn_into::<Element>() {
        Ok(element) => Some(Parent::Element(element)),
        Err(other) => other.as_string().map(Parent::Selector),
    };

    // the element form cannot be deserialized, so strip it from a copy
    let copy = Object::assign(&Object::new(), raw.unchecked_ref());
    let _ = Reflect::delete_property(&copy, &JsValue::from_str("parent"));
    let mut options: ClientOptions =
        serde_wasm_bindgen::from_value(copy.into()).map_err(|err| conversion_error("options", &err))?;

    let parent = parent.ok_or_else(|| {
        to_js_error(&VirtualdisplayError::ParentNotFound {
            selector: String::new(),
        })
    })?;
    if let Parent::Selector(selector) = &parent {
        options.parent = Some(selector.clone());
    }
    Ok((options, parent))
}

fn call(callback: &Function, args: &[JsValue]) {
    let result = match args {
        [] => callback.call0(&JsValue::NULL),
        [a] => callback.call1(&JsValue::NULL, a),
        [a, b, ..] => callback.call2(&JsValue::NULL, a, b),
    };
    if let Err(err) = result {
        warn!(error = ?err, "host callback threw");
    }
}
