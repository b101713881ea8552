// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JS mapping objects to typed mappings.
//!
//! Plain objects become literal mappings. Functions may stand in for an
//! attribute's whole `values` list or for a value's `value`, `nodeIds` or
//! `isSelected`; each becomes a computed part called with a context exposing
//! `getValue(attributeName)`. One context object serves the whole mapping
//! and stays valid while the mapping is loaded, so host functions may keep
//! `ctx.getValue` and read the latest selections later.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::{Array, Function, Object, Reflect};
use serde_json::Value;
use tracing::warn;
use virtualdisplay_core::attributes::validator::parse_values_json;
use virtualdisplay_core::{
    AttributeConfig, AttributeValueConfig, Dynamic, MappingConfiguration, MappingContext,
    VirtualdisplayError,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::error::{conversion_error, to_js_error};

const VALUE_FIELDS: [&str; 3] = ["value", "nodeIds", "isSelected"];

/// Mapping passed from JavaScript.
pub enum JsMapping {
    /// No functions anywhere; validated as JSON.
    Literal(Value),
    /// At least one computed part.
    Typed(MappingConfiguration),
}

/// Context object handed to value functions.
struct JsContext {
    selections: Rc<RefCell<HashMap<String, String>>>,
    object: Object,
    _get_value: Closure<dyn Fn(String) -> JsValue>,
}

impl JsContext {
    fn new() -> Result<Rc<Self>, JsError> {
        let selections: Rc<RefCell<HashMap<String, String>>> = Rc::default();
        let read = Rc::clone(&selections);
        let get_value = Closure::<dyn Fn(String) -> JsValue>::new(move |attribute: String| {
            read.borrow()
                .get(&attribute)
                .map_or(JsValue::UNDEFINED, |v| JsValue::from_str(v))
        });
        let object = Object::new();
        Reflect::set(&object, &JsValue::from_str("getValue"), get_value.as_ref())
            .map_err(|_| JsError::new("failed to build mapping context"))?;
        Ok(Rc::new(Self {
            selections,
            object,
            _get_value: get_value,
        }))
    }

    fn call(&self, function: &Function, context: &MappingContext) -> Result<JsValue, String> {
        *self.selections.borrow_mut() = context
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        function
            .call1(&JsValue::NULL, &self.object)
            .map_err(|err| format!("{err:?}"))
    }
}

/// Inspect `config` and convert it.
pub fn from_js(config: &JsValue) -> Result<JsMapping, JsError> {
    let attributes = Reflect::get(config, &JsValue::from_str("attributes"))
        .ok()
        .and_then(|a| a.dyn_into::<Array>().ok());
    let has_functions = attributes
        .as_ref()
        .is_some_and(|list| list.iter().any(|a| values_have_functions(&get(&a, "values"))));
    if !has_functions {
        let value: Value = serde_wasm_bindgen::from_value(config.clone())
            .map_err(|err| conversion_error("mapping", &err))?;
        return Ok(JsMapping::Literal(value));
    }

    let context = JsContext::new()?;
    let mut typed = Vec::new();
    for (i, attribute) in attributes.iter().flat_map(Array::iter).enumerate() {
        let name = get(&attribute, "name").as_string().unwrap_or_default();
        let values = get(&attribute, "values");
        if let Some(function) = values.dyn_ref::<Function>() {
            typed.push(AttributeConfig {
                name,
                values: computed(&context, function.clone(), "values", js_values, Vec::new()),
            });
        } else if values_have_functions(&values) {
            let entries: Array = values
                .dyn_into()
                .map_err(|_| invalid(&format!("attributes[{i}].values"), "must be array"))?;
            let values = entries
                .iter()
                .enumerate()
                .map(|(j, entry)| {
                    value_entry(&context, &entry, &format!("attributes[{i}].values[{j}]"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            typed.push(AttributeConfig::new(name, values));
        } else {
            let json: Value = serde_wasm_bindgen::from_value(values)
                .map_err(|err| conversion_error("attribute values", &err))?;
            let values = parse_values_json(&json).map_err(|err| to_js_error(&err))?;
            typed.push(AttributeConfig::new(name, values));
        }
    }
    Ok(JsMapping::Typed(MappingConfiguration::new(typed)))
}

fn values_have_functions(values: &JsValue) -> bool {
    if values.is_function() {
        return true;
    }
    values.dyn_ref::<Array>().is_some_and(|entries| {
        entries
            .iter()
            .any(|entry| VALUE_FIELDS.iter().any(|f| get(&entry, f).is_function()))
    })
}

fn value_entry(
    context: &Rc<JsContext>,
    entry: &JsValue,
    path: &str,
) -> Result<AttributeValueConfig, JsError> {
    let value = match get(entry, "value").dyn_into::<Function>() {
        Ok(f) => computed(context, f, "value", js_string, String::new()),
        Err(v) => Dynamic::Literal(
            js_string(v).map_err(|r| invalid(&format!("{path}.value"), &r))?,
        ),
    };
    let node_ids = match get(entry, "nodeIds").dyn_into::<Function>() {
        Ok(f) => computed(context, f, "nodeIds", js_node_ids, Vec::new()),
        Err(v) => Dynamic::Literal(
            js_node_ids(v).map_err(|r| invalid(&format!("{path}.nodeIds"), &r))?,
        ),
    };
    let selected = get(entry, "isSelected");
    let is_selected = if selected.is_undefined() || selected.is_null() {
        None
    } else {
        Some(match selected.dyn_into::<Function>() {
            Ok(f) => computed(context, f, "isSelected", js_bool, false),
            Err(v) => Dynamic::Literal(
                js_bool(v).map_err(|r| invalid(&format!("{path}.isSelected"), &r))?,
            ),
        })
    };
    Ok(AttributeValueConfig {
        value,
        node_ids,
        is_selected,
    })
}

/// Wrap a host function; failures log and fall back.
fn computed<T: Clone + 'static>(
    context: &Rc<JsContext>,
    function: Function,
    field: &'static str,
    convert: fn(JsValue) -> Result<T, String>,
    fallback: T,
) -> Dynamic<T> {
    let context = Rc::clone(context);
    Dynamic::computed(move |selections| {
        context
            .call(&function, selections)
            .and_then(convert)
            .unwrap_or_else(|reason| {
                warn!(field, %reason, "mapping function failed, using fallback");
                fallback.clone()
            })
    })
}

fn js_string(value: JsValue) -> Result<String, String> {
    value.as_string().ok_or_else(|| "must be string".to_owned())
}

fn js_bool(value: JsValue) -> Result<bool, String> {
    value.as_bool().ok_or_else(|| "must be boolean".to_owned())
}

fn js_node_ids(value: JsValue) -> Result<Vec<String>, String> {
    serde_wasm_bindgen::from_value(value).map_err(|err| err.to_string())
}

fn js_values(value: JsValue) -> Result<Vec<AttributeValueConfig>, String> {
    let json: Value = serde_wasm_bindgen::from_value(value).map_err(|err| err.to_string())?;
    parse_values_json(&json).map_err(|err| err.to_string())
}

fn get(target: &JsValue, key: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn invalid(path: &str, reason: &str) -> JsError {
    to_js_error(&VirtualdisplayError::InvalidMapping {
        reason: Some(format!("{path} {reason}")),
    })
}
