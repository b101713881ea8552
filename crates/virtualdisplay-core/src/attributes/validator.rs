// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Structural checks for mapping configurations.
//!
//! Every violation is collected and reported in one
//! [`VirtualdisplayError::InvalidMapping`]. Mappings with computed parts get
//! the top-level checks only, since a function's output cannot be checked
//! before it runs.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use super::mapping::{
    contains_dynamic_values, AttributeConfig, AttributeValueConfig, Dynamic,
    MappingConfiguration,
};
use crate::error::{Result, VirtualdisplayError};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MappingJson {
    attributes: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AttributeJson {
    name: String,
    values: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ValueJson {
    value: String,
    node_ids: Vec<String>,
    #[serde(default)]
    is_selected: Option<bool>,
}

impl From<ValueJson> for AttributeValueConfig {
    fn from(json: ValueJson) -> Self {
        Self {
            value: Dynamic::Literal(json.value),
            node_ids: Dynamic::Literal(json.node_ids),
            is_selected: json.is_selected.map(Dynamic::Literal),
        }
    }
}

/// Check a typed mapping.
pub fn validate(config: &MappingConfiguration) -> Result<()> {
    let mut violations = Vec::new();
    check(config, &mut violations);
    finish(violations)
}

/// Check a JSON mapping and convert it.
///
/// On top of the typed rules, rejects wrong JSON types, missing required
/// properties and unknown properties. Shape errors are reported once per
/// malformed object, prefixed with its path.
pub fn validate_json(value: &Value) -> Result<MappingConfiguration> {
    let mut violations = Vec::new();
    let config = parse_mapping(value, &mut violations);
    if let Some(config) = &config {
        check(config, &mut violations);
    }
    match config {
        Some(config) if violations.is_empty() => Ok(config),
        _ => Err(VirtualdisplayError::invalid_mapping(&violations)),
    }
}

/// Parse a JSON value list, checking JSON shape only.
///
/// Used for lists produced at evaluation time, which get no deep checks.
pub fn parse_values_json(value: &Value) -> Result<Vec<AttributeValueConfig>> {
    let mut violations = Vec::new();
    let parsed = shape::<Vec<Value>>(value, "values", &mut violations)
        .and_then(|values| parse_values("", &values, &mut violations));
    match parsed {
        Some(values) if violations.is_empty() => Ok(values),
        _ => Err(VirtualdisplayError::invalid_mapping(&violations)),
    }
}

fn finish(violations: Vec<String>) -> Result<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(VirtualdisplayError::invalid_mapping(&violations))
    }
}

fn check(config: &MappingConfiguration, out: &mut Vec<String>) {
    if config.attributes.is_empty() {
        out.push("attributes must not be empty".to_owned());
        return;
    }
    let deep = !contains_dynamic_values(config);
    let mut names = HashSet::new();
    for (i, attribute) in config.attributes.iter().enumerate() {
        if attribute.name.is_empty() {
            out.push(format!("attributes[{i}].name must not be empty"));
        } else if !names.insert(attribute.name.as_str()) {
            out.push(format!(
                "attributes[{i}].name \"{}\" is not unique",
                attribute.name
            ));
        }
        if let Dynamic::Literal(values) = &attribute.values {
            if values.is_empty() {
                out.push(format!("attributes[{i}].values must not be empty"));
            } else if deep {
                check_values(i, attribute, values, out);
            }
        }
    }
}

fn check_values(
    i: usize,
    attribute: &AttributeConfig,
    values: &[AttributeValueConfig],
    out: &mut Vec<String>,
) {
    let mut seen = HashSet::new();
    let mut selected = 0usize;
    for (j, value) in values.iter().enumerate() {
        let path = format!("attributes[{i}].values[{j}]");
        if let Some(name) = value.value.as_literal() {
            if name.is_empty() {
                out.push(format!("{path}.value must not be empty"));
            } else if !seen.insert(name.as_str()) {
                out.push(format!(
                    "{path}.value \"{name}\" is not unique within \"{}\"",
                    attribute.name
                ));
            }
        }
        if let Some(node_ids) = value.node_ids.as_literal() {
            let mut ids = HashSet::new();
            for (k, id) in node_ids.iter().enumerate() {
                if id.is_empty() {
                    out.push(format!("{path}.nodeIds[{k}] must not be empty"));
                } else if !ids.insert(id.as_str()) {
                    out.push(format!("{path}.nodeIds[{k}] \"{id}\" is not unique"));
                }
            }
        }
        if matches!(value.is_selected, Some(Dynamic::Literal(true))) {
            selected += 1;
        }
    }
    if selected > 1 {
        out.push(format!(
            "attributes[{i}].values must have at most one isSelected value"
        ));
    }
}

fn parse_mapping(value: &Value, out: &mut Vec<String>) -> Option<MappingConfiguration> {
    let mapping: MappingJson = shape(value, "mapping", out)?;
    let parsed: Vec<Option<AttributeConfig>> = mapping
        .attributes
        .iter()
        .enumerate()
        .map(|(i, a)| parse_attribute(i, a, out))
        .collect();
    parsed
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .map(MappingConfiguration::new)
}

fn parse_attribute(i: usize, value: &Value, out: &mut Vec<String>) -> Option<AttributeConfig> {
    let path = format!("attributes[{i}]");
    let attribute: AttributeJson = shape(value, &path, out)?;
    let values = parse_values(&path, &attribute.values, out)?;
    Some(AttributeConfig::new(attribute.name, values))
}

/// Entries are parsed one by one so every malformed sibling is reported.
fn parse_values(
    path: &str,
    values: &[Value],
    out: &mut Vec<String>,
) -> Option<Vec<AttributeValueConfig>> {
    let prefix = if path.is_empty() {
        "values".to_owned()
    } else {
        format!("{path}.values")
    };
    let parsed: Vec<Option<ValueJson>> = values
        .iter()
        .enumerate()
        .map(|(j, v)| shape(v, &format!("{prefix}[{j}]"), out))
        .collect();
    parsed
        .into_iter()
        .map(|v| v.map(AttributeValueConfig::from))
        .collect()
}

fn shape<'de, T: Deserialize<'de>>(
    value: &'de Value,
    path: &str,
    out: &mut Vec<String>,
) -> Option<T> {
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            out.push(format!("{path}: {err}"));
            None
        }
    }
}
