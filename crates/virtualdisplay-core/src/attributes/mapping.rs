// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Mapping configuration: which values of which attributes drive which nodes.
//!
//! Any part of a value list may be [`Dynamic::Computed`] from the current
//! selections. Computed parts are evaluated on every load and, when the
//! mapping contains at least one of them, again after every selection.

use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::Result;

/// Literal data or a function of the current selections.
pub enum Dynamic<T> {
    /// Fixed value.
    Literal(T),
    /// Re-evaluated against a [`MappingContext`].
    Computed(Rc<dyn Fn(&MappingContext) -> T>),
}

impl<T: Clone> Dynamic<T> {
    /// Wrap a closure.
    pub fn computed(f: impl Fn(&MappingContext) -> T + 'static) -> Self {
        Dynamic::Computed(Rc::new(f))
    }

    /// Produce the value for `context`.
    pub fn evaluate(&self, context: &MappingContext) -> T {
        match self {
            Dynamic::Literal(v) => v.clone(),
            Dynamic::Computed(f) => f(context),
        }
    }
}

impl<T> Dynamic<T> {
    /// Whether this is a function.
    pub fn is_computed(&self) -> bool {
        matches!(self, Dynamic::Computed(_))
    }

    /// Literal payload, if any.
    pub fn as_literal(&self) -> Option<&T> {
        match self {
            Dynamic::Literal(v) => Some(v),
            Dynamic::Computed(_) => None,
        }
    }
}

impl<T: Clone> Clone for Dynamic<T> {
    fn clone(&self) -> Self {
        match self {
            Dynamic::Literal(v) => Dynamic::Literal(v.clone()),
            Dynamic::Computed(f) => Dynamic::Computed(Rc::clone(f)),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Dynamic<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dynamic::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Dynamic::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl<T> From<T> for Dynamic<T> {
    fn from(value: T) -> Self {
        Dynamic::Literal(value)
    }
}

/// Read-only view of the selections handed to computed values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingContext {
    selections: IndexMap<String, String>,
}

impl MappingContext {
    pub(crate) fn new(selections: IndexMap<String, String>) -> Self {
        Self { selections }
    }

    /// Selected value of `attribute`.
    pub fn value(&self, attribute: &str) -> Option<&str> {
        self.selections.get(attribute).map(String::as_str)
    }

    /// True when nothing is selected yet.
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// `(attribute, value)` pairs in attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.selections
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One value of an attribute.
#[derive(Debug, Clone)]
pub struct AttributeValueConfig {
    /// Value name.
    pub value: Dynamic<String>,
    /// Nodes shown while the value is selected.
    pub node_ids: Dynamic<Vec<String>>,
    /// Initial selection; absent means false.
    pub is_selected: Option<Dynamic<bool>>,
}

impl AttributeValueConfig {
    /// Literal value.
    pub fn new<I, S>(value: impl Into<String>, node_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value: Dynamic::Literal(value.into()),
            node_ids: Dynamic::Literal(node_ids.into_iter().map(Into::into).collect()),
            is_selected: None,
        }
    }

    /// Mark as initially selected.
    pub fn selected(mut self) -> Self {
        self.is_selected = Some(Dynamic::Literal(true));
        self
    }

    /// Whether any field is computed.
    pub fn is_dynamic(&self) -> bool {
        self.value.is_computed()
            || self.node_ids.is_computed()
            || self.is_selected.as_ref().is_some_and(Dynamic::is_computed)
    }

    pub(crate) fn resolve(&self, context: &MappingContext) -> ResolvedValue {
        ResolvedValue {
            value: self.value.evaluate(context),
            node_ids: self.node_ids.evaluate(context),
            is_selected: self
                .is_selected
                .as_ref()
                .is_some_and(|s| s.evaluate(context)),
        }
    }
}

/// One attribute and its values.
#[derive(Debug, Clone)]
pub struct AttributeConfig {
    /// Attribute name.
    pub name: String,
    /// Value list, literal or computed as a whole.
    pub values: Dynamic<Vec<AttributeValueConfig>>,
}

impl AttributeConfig {
    /// Attribute with a literal value list.
    pub fn new(name: impl Into<String>, values: Vec<AttributeValueConfig>) -> Self {
        Self {
            name: name.into(),
            values: Dynamic::Literal(values),
        }
    }

    /// Attribute whose value list is recomputed from the selections.
    pub fn computed(
        name: impl Into<String>,
        values: impl Fn(&MappingContext) -> Vec<AttributeValueConfig> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            values: Dynamic::computed(values),
        }
    }

    /// Whether the list or any of its values is computed.
    pub fn is_dynamic(&self) -> bool {
        match &self.values {
            Dynamic::Computed(_) => true,
            Dynamic::Literal(values) => values.iter().any(AttributeValueConfig::is_dynamic),
        }
    }

    pub(crate) fn resolve(&self, context: &MappingContext) -> Vec<ResolvedValue> {
        self.values
            .evaluate(context)
            .iter()
            .map(|v| v.resolve(context))
            .collect()
    }
}

/// Complete mapping.
#[derive(Debug, Clone, Default)]
pub struct MappingConfiguration {
    /// Attributes in declaration order.
    pub attributes: Vec<AttributeConfig>,
}

impl MappingConfiguration {
    /// Mapping from attributes.
    pub fn new(attributes: Vec<AttributeConfig>) -> Self {
        Self { attributes }
    }

    /// Parse a literal mapping from JSON, reporting every violation.
    pub fn from_json(value: &Value) -> Result<Self> {
        super::validator::validate_json(value)
    }
}

/// Whether the mapping has a computed part anywhere.
pub fn contains_dynamic_values(config: &MappingConfiguration) -> bool {
    config.attributes.iter().any(AttributeConfig::is_dynamic)
}

/// A value after evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedValue {
    pub(crate) value: String,
    pub(crate) node_ids: Vec<String>,
    pub(crate) is_selected: bool,
}
