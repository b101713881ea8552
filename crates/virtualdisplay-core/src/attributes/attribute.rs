// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Mutually exclusive group of values.

use std::rc::Rc;

use indexmap::IndexMap;

use super::AttributeValue;
use crate::mutation::{inverse_all, Mutation};

/// Named group of values in declaration order.
///
/// Cloning shares the value handles.
#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
    values: IndexMap<String, Rc<AttributeValue>>,
}

impl Attribute {
    /// Empty attribute.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: IndexMap::new(),
        }
    }

    /// Add a value; a value with the same name is replaced in place.
    pub fn add_value(&mut self, value: AttributeValue) -> Rc<AttributeValue> {
        let handle = Rc::new(value);
        self.values
            .insert(handle.value().to_owned(), Rc::clone(&handle));
        handle
    }

    /// Attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value by name.
    pub fn get_value(&self, value: &str) -> Option<&Rc<AttributeValue>> {
        self.values.get(value)
    }

    /// Whether `value` exists.
    pub fn has_value(&self, value: &str) -> bool {
        self.values.contains_key(value)
    }

    /// Values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &Rc<AttributeValue>> {
        self.values.values()
    }

    /// Value names in declaration order.
    pub fn value_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    /// First selected value.
    pub fn current_value(&self) -> Option<&Rc<AttributeValue>> {
        self.values.values().find(|v| v.is_selected())
    }

    /// Name of the first selected value.
    pub fn current_selection(&self) -> Option<&str> {
        self.current_value().map(|v| v.value())
    }

    /// Every value's mutations, concatenated in declaration order.
    pub fn default_mutations(&self) -> Vec<Mutation> {
        self.values
            .values()
            .flat_map(|v| v.get_mutations())
            .collect()
    }

    /// Switch the selection to `value` and return the transition.
    ///
    /// Returns `[]` when `value` is unknown or already selected. Otherwise
    /// the inverse of the outgoing value's mutations followed by the inverse
    /// of the incoming value's, computed before the flags change. Flags are
    /// updated without firing callbacks.
    pub fn select(&self, value: &str) -> Vec<Mutation> {
        let Some(next) = self.values.get(value) else {
            return Vec::new();
        };
        if next.is_selected() {
            return Vec::new();
        }
        let current = self.current_value();
        let mut mutations = current.map_or_else(Vec::new, |c| inverse_all(&c.get_mutations()));
        mutations.extend(inverse_all(&next.get_mutations()));
        for v in self.values.values() {
            v.set_selected_silently(Rc::ptr_eq(v, next));
        }
        mutations
    }
}
