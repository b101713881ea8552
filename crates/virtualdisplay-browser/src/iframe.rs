// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Viewer iframe creation and attachment.

use tracing::{debug, info};
use virtualdisplay_core::{ClientOptions, VirtualdisplayError};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlIFrameElement, Url};

use crate::error::to_js_error;

/// Where the iframe is attached.
#[derive(Debug, Clone)]
pub enum Parent {
    /// CSS selector resolved against the document.
    Selector(String),
    /// Element handed over by the host.
    Element(Element),
}

/// Builds the viewer iframe for one client.
#[derive(Debug)]
pub struct IframeBuilder<'a> {
    options: &'a ClientOptions,
    parent: Parent,
}

impl<'a> IframeBuilder<'a> {
    /// Builder for `options`, attaching under `parent`.
    pub fn new(options: &'a ClientOptions, parent: Parent) -> Self {
        Self { options, parent }
    }

    /// Viewer URL: server plus `license`, `model`, `debug`, `language`.
    pub fn viewer_url(&self) -> Result<String, JsValue> {
        let url = Url::new(self.options.server_url())?;
        let params = url.search_params();
        for (key, value) in self.options.viewer_query() {
            params.set(key, &value);
        }
        Ok(url.href())
    }

    /// Create the iframe, append it to the parent and register `on_load`.
    ///
    /// # Errors
    /// `[PARENT_NOT_FOUND]` when the selector matches nothing.
    pub fn create(&self, on_load: &js_sys::Function) -> Result<HtmlIFrameElement, JsError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsError::new("no document available"))?;
        let parent = self.resolve_parent(&document)?;
        let iframe: HtmlIFrameElement = document
            .create_element("iframe")
            .map_err(|_| JsError::new("failed to create iframe"))?
            .dyn_into()
            .map_err(|_| JsError::new("created element is not an iframe"))?;

        let src = self
            .viewer_url()
            .map_err(|_| JsError::new("invalid viewer server url"))?;
        debug!(%src, "creating viewer iframe");
        iframe.set_src(&src);
        let style = iframe.style();
        for (property, value) in [("width", "100%"), ("height", "100%"), ("border", "none")] {
            style
                .set_property(property, value)
                .map_err(|_| JsError::new("failed to style iframe"))?;
        }
        iframe
            .set_attribute("allowfullscreen", "true")
            .and_then(|()| iframe.set_attribute("allow", "xr-spatial-tracking; fullscreen"))
            .map_err(|_| JsError::new("failed to configure iframe"))?;
        iframe
            .add_event_listener_with_callback("load", on_load)
            .map_err(|_| JsError::new("failed to listen for iframe load"))?;

        parent
            .append_child(&iframe)
            .map_err(|_| JsError::new("failed to attach iframe"))?;
        info!("viewer iframe attached");
        Ok(iframe)
    }

    fn resolve_parent(&self, document: &web_sys::Document) -> Result<Element, JsError> {
        match &self.parent {
            Parent::Element(element) => Ok(element.clone()),
            Parent::Selector(selector) => document
                .query_selector(selector)
                .ok()
                .flatten()
                .ok_or_else(|| {
                    to_js_error(&VirtualdisplayError::ParentNotFound {
                        selector: selector.clone(),
                    })
                }),
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn viewer_url_carries_query_in_order() {
        let mut options = ClientOptions::new("chair", "key");
        options.server_url = Some("https://viewer.test/embed".into());
        options.debug = true;
        options.language = Some("nl".into());
        let builder = IframeBuilder::new(&options, Parent::Selector("#viewer".into()));
        assert_eq!(
            builder.viewer_url().ok().as_deref(),
            Some("https://viewer.test/embed?license=key&model=chair&debug=true&language=nl")
        );
    }

    #[wasm_bindgen_test]
    fn viewer_url_omits_unset_flags() {
        let options = ClientOptions::new("chair", "key");
        let builder = IframeBuilder::new(&options, Parent::Selector("#viewer".into()));
        let url = builder.viewer_url().ok().unwrap_or_default();
        assert!(url.ends_with("?license=key&model=chair"), "{url}");
    }
}
