// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Attributes, their values and the service that maps them onto nodes.

mod attribute;
mod mapping;
mod selector;
mod service;
pub mod validator;
mod value;

pub use attribute::Attribute;
pub use mapping::{
    contains_dynamic_values, AttributeConfig, AttributeValueConfig, Dynamic, MappingConfiguration,
    MappingContext,
};
pub use selector::AttributeSelector;
pub use service::AttributeService;
pub use value::AttributeValue;
