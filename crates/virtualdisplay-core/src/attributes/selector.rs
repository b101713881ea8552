// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fluent, checked access to one attribute.

use std::rc::Rc;

use super::{Attribute, AttributeService, AttributeValue};
use crate::error::{Result, VirtualdisplayError};

/// Handle for one attribute name.
///
/// Reads always go through the service, so a selector stays valid across
/// mapping reloads and dynamic re-evaluation.
#[derive(Debug, Clone)]
pub struct AttributeSelector {
    service: AttributeService,
    name: String,
}

impl AttributeSelector {
    /// Selector for `name`. Existence is checked by the caller.
    pub fn new(service: AttributeService, name: impl Into<String>) -> Self {
        Self {
            service,
            name: name.into(),
        }
    }

    /// Select `value`; the viewer updates asynchronously.
    ///
    /// # Errors
    /// [`VirtualdisplayError::AttributeNotFound`] if the attribute vanished
    /// from the mapping, [`VirtualdisplayError::ValueNotFound`] for an
    /// unknown value.
    pub fn select(&self, value: &str) -> Result<&Self> {
        let attribute = self.attribute()?;
        if !attribute.has_value(value) {
            return Err(VirtualdisplayError::value_not_found(&self.name, value));
        }
        self.service.select_attribute_value(&self.name, value);
        Ok(self)
    }

    /// Attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Selected value name.
    pub fn current_value(&self) -> Option<String> {
        self.service
            .get_attribute(&self.name)
            .and_then(|a| a.current_selection().map(str::to_owned))
    }

    /// Value names in declaration order.
    pub fn available_values(&self) -> Vec<String> {
        self.service
            .get_attribute(&self.name)
            .map(|a| a.value_names())
            .unwrap_or_default()
    }

    /// Live value handles.
    pub fn values(&self) -> Vec<Rc<AttributeValue>> {
        self.service
            .get_attribute(&self.name)
            .map(|a| a.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Live handle for one value.
    pub fn value(&self, value: &str) -> Option<Rc<AttributeValue>> {
        self.service
            .get_attribute(&self.name)
            .and_then(|a| a.get_value(value).cloned())
    }

    /// Install `callback` on every current value, replacing their callbacks.
    pub fn on_change(&self, callback: impl Fn() + 'static) -> &Self {
        let callback: Rc<dyn Fn()> = Rc::new(callback);
        for value in self.values() {
            value.set_on_change_shared(Rc::clone(&callback));
        }
        self
    }

    fn attribute(&self) -> Result<Attribute> {
        self.service
            .get_attribute(&self.name)
            .ok_or_else(|| VirtualdisplayError::attribute_not_found(&self.name))
    }
}
