// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! One selectable option and the nodes it controls.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::mutation::Mutation;

/// Named option bound to an ordered set of node ids.
///
/// Handles are shared (`Rc<AttributeValue>`) between the owning attribute
/// and host code. The change callback is a single slot: assigning a new
/// one discards the previous.
pub struct AttributeValue {
    value: String,
    node_ids: Vec<String>,
    selected: Cell<bool>,
    on_change: RefCell<Option<Rc<dyn Fn()>>>,
}

impl std::fmt::Debug for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeValue")
            .field("value", &self.value)
            .field("node_ids", &self.node_ids)
            .field("selected", &self.selected.get())
            .finish_non_exhaustive()
    }
}

impl AttributeValue {
    /// Create a value. Duplicate node ids keep their first position.
    pub fn new(value: impl Into<String>, node_ids: Vec<String>, selected: bool) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(node_ids.len());
        for id in node_ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Self {
            value: value.into(),
            node_ids: unique,
            selected: Cell::new(selected),
            on_change: RefCell::new(None),
        }
    }

    /// Value name.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Bound node ids in declaration order.
    pub fn node_ids(&self) -> &[String] {
        &self.node_ids
    }

    /// Whether `node_id` is bound to this value.
    pub fn has_node(&self, node_id: &str) -> bool {
        self.node_ids.iter().any(|id| id == node_id)
    }

    /// Current selection flag.
    pub fn is_selected(&self) -> bool {
        self.selected.get()
    }

    /// Show every bound node when selected, hide them otherwise.
    pub fn get_mutations(&self) -> Vec<Mutation> {
        let selected = self.selected.get();
        self.node_ids
            .iter()
            .map(|id| {
                if selected {
                    Mutation::show(id.as_str())
                } else {
                    Mutation::hide(id.as_str())
                }
            })
            .collect()
    }

    /// Set the flag and invoke the change callback, even if unchanged.
    pub fn set_selected(&self, selected: bool) {
        self.selected.set(selected);
        let callback = self.on_change.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Set the flag without notifying.
    pub(crate) fn set_selected_silently(&self, selected: bool) {
        self.selected.set(selected);
    }

    /// Replace the change callback.
    pub fn set_on_change(&self, callback: impl Fn() + 'static) {
        self.set_on_change_shared(Rc::new(callback));
    }

    pub(crate) fn set_on_change_shared(&self, callback: Rc<dyn Fn()>) {
        *self.on_change.borrow_mut() = Some(callback);
    }

    /// Remove the change callback.
    pub fn clear_on_change(&self) {
        self.on_change.borrow_mut().take();
    }
}
