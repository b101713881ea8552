// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Authority translating selections into mutation batches.
//!
//! Selections made through the API update value flags without firing
//! callbacks. Viewer state reports update every flag through
//! [`AttributeValue::set_selected`], which always fires, so bound UI
//! re-renders on viewer-originated changes without echoing its own
//! commands back.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info, warn};

use super::mapping::{contains_dynamic_values, MappingConfiguration, MappingContext};
use super::{validator, Attribute, AttributeValue};
use crate::error::Result;
use crate::events::{DomainEvent, EventBus, EventName, Listener};
use crate::messaging::mutation_message;
use crate::mutation::Mutation;
use crate::nodes::ModelNode;

type Selections = IndexMap<String, String>;

#[derive(Default)]
struct Inner {
    config: Option<MappingConfiguration>,
    dynamic: bool,
    attributes: IndexMap<String, Attribute>,
    selections: Selections,
    initialized: bool,
}

struct Shared {
    bus: EventBus,
    inner: RefCell<Inner>,
}

/// Owner of every [`Attribute`]. Clones share state.
#[derive(Clone)]
pub struct AttributeService {
    shared: Rc<Shared>,
}

impl std::fmt::Debug for AttributeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.borrow();
        f.debug_struct("AttributeService")
            .field("attributes", &inner.attributes.len())
            .field("dynamic", &inner.dynamic)
            .field("selections", &inner.selections)
            .field("initialized", &inner.initialized)
            .finish()
    }
}

impl AttributeService {
    /// Create a service that reconciles against every state change on `bus`.
    pub fn new(bus: &EventBus) -> Self {
        let shared = Rc::new(Shared {
            bus: bus.clone(),
            inner: RefCell::new(Inner::default()),
        });
        let weak: Weak<Shared> = Rc::downgrade(&shared);
        let _: Listener = bus.subscribe(EventName::StateChanged, move |event| {
            let DomainEvent::StateChanged(nodes) = event else {
                return;
            };
            if let Some(shared) = weak.upgrade() {
                AttributeService { shared }.sync_with_nodes(nodes);
            }
        });
        Self { shared }
    }

    /// Validate, evaluate and install `config`, replacing the previous one.
    ///
    /// A selection carried over from an earlier load wins over `isSelected`
    /// while the value still exists. Emits one batch with every value's
    /// default mutations unless there are none. Fails before touching any
    /// state.
    pub fn load_mapping(&self, config: MappingConfiguration) -> Result<()> {
        validator::validate(&config)?;
        let dynamic = contains_dynamic_values(&config);
        let prior = self.shared.inner.borrow().selections.clone();
        let (attributes, selections) = build(&config, &prior);
        let mutations: Vec<Mutation> = attributes
            .values()
            .flat_map(Attribute::default_mutations)
            .collect();
        info!(
            attributes = attributes.len(),
            dynamic,
            mutations = mutations.len(),
            "mapping loaded"
        );
        {
            let mut inner = self.shared.inner.borrow_mut();
            inner.config = Some(config);
            inner.dynamic = dynamic;
            inner.attributes = attributes;
            inner.selections = selections;
            inner.initialized = true;
        }
        self.emit(&mutations);
        Ok(())
    }

    /// Select `value` of `attribute` and emit the visibility diff.
    ///
    /// Unknown attributes or values are logged and ignored. Dynamic mappings
    /// are fully re-evaluated against the updated selections.
    pub fn select_attribute_value(&self, attribute: &str, value: &str) {
        let (before, reevaluate) = {
            let mut guard = self.shared.inner.borrow_mut();
            let inner = &mut *guard;
            let Some(current) = inner.attributes.get(attribute) else {
                warn!(attribute, value, "ignoring selection of unknown attribute");
                return;
            };
            if !current.has_value(value) {
                warn!(attribute, value, "ignoring selection of unknown value");
                return;
            }
            let before = visible_nodes(&inner.attributes, &inner.selections);
            inner
                .selections
                .insert(attribute.to_owned(), value.to_owned());
            let reevaluate = if inner.dynamic {
                inner.config.clone().map(|c| (c, inner.selections.clone()))
            } else {
                for v in current.values() {
                    v.set_selected_silently(v.value() == value);
                }
                None
            };
            (before, reevaluate)
        };

        if let Some((config, selections)) = reevaluate {
            debug!(attribute, value, "re-evaluating dynamic mapping");
            let (attributes, selections) = build(&config, &selections);
            let mut inner = self.shared.inner.borrow_mut();
            inner.attributes = attributes;
            inner.selections = selections;
        }

        let after = {
            let inner = self.shared.inner.borrow();
            visible_nodes(&inner.attributes, &inner.selections)
        };
        let mut mutations: Vec<Mutation> = before
            .iter()
            .filter(|id| !after.contains(*id))
            .map(|id| Mutation::hide(id.as_str()))
            .collect();
        mutations.extend(
            after
                .iter()
                .filter(|id| !before.contains(*id))
                .map(|id| Mutation::show(id.as_str())),
        );
        debug!(attribute, value, mutations = mutations.len(), "selection applied");
        self.emit(&mutations);
    }

    /// Attribute by name. The clone shares value handles with the service.
    pub fn get_attribute(&self, name: &str) -> Option<Attribute> {
        self.shared.inner.borrow().attributes.get(name).cloned()
    }

    /// Every attribute in declaration order.
    pub fn get_all_attributes(&self) -> Vec<Attribute> {
        self.shared
            .inner
            .borrow()
            .attributes
            .values()
            .cloned()
            .collect()
    }

    /// Current selections, as computed values would see them.
    pub fn selections(&self) -> MappingContext {
        MappingContext::new(self.shared.inner.borrow().selections.clone())
    }

    /// True once a mapping has loaded.
    pub fn is_initialized(&self) -> bool {
        self.shared.inner.borrow().initialized
    }

    /// Whether the loaded mapping has computed parts.
    pub fn is_dynamic(&self) -> bool {
        self.shared.inner.borrow().dynamic
    }

    /// Forget the mapping, its attributes and the selections.
    pub fn clear(&self) {
        *self.shared.inner.borrow_mut() = Inner::default();
    }

    /// Set every value's flag from reported visibility.
    ///
    /// A value counts as selected when all of its nodes are visible; values
    /// without nodes never do. Callbacks fire for every value. An attribute
    /// left with exactly one selected value records it as the selection, so
    /// the next API selection diffs against what the viewer shows.
    pub fn sync_with_nodes(&self, nodes: &[Rc<ModelNode>]) {
        let visibility: HashMap<&str, bool> =
            nodes.iter().map(|n| (n.id(), n.is_visible())).collect();
        let updates: Vec<(Rc<AttributeValue>, bool)> = {
            let mut guard = self.shared.inner.borrow_mut();
            let inner = &mut *guard;
            if !inner.initialized {
                return;
            }
            let mut updates = Vec::new();
            for (name, attribute) in &inner.attributes {
                let mut shown = Vec::new();
                for v in attribute.values() {
                    let ids = v.node_ids();
                    let selected = !ids.is_empty()
                        && ids
                            .iter()
                            .all(|id| visibility.get(id.as_str()).copied().unwrap_or(false));
                    if selected {
                        shown.push(v.value().to_owned());
                    }
                    updates.push((Rc::clone(v), selected));
                }
                if let [only] = shown.as_slice() {
                    inner.selections.insert(name.clone(), only.clone());
                }
            }
            updates
        };
        debug!(values = updates.len(), "syncing attribute values with node state");
        for (value, selected) in updates {
            value.set_selected(selected);
        }
    }

    fn emit(&self, mutations: &[Mutation]) {
        if mutations.is_empty() {
            return;
        }
        self.shared
            .bus
            .emit(&DomainEvent::MutationMessage(mutation_message(mutations)));
    }
}

/// Evaluate `config` against `prior` selections.
fn build(config: &MappingConfiguration, prior: &Selections) -> (IndexMap<String, Attribute>, Selections) {
    let context = MappingContext::new(prior.clone());
    let mut attributes = IndexMap::with_capacity(config.attributes.len());
    let mut selections = Selections::new();
    for attribute_config in &config.attributes {
        let resolved = attribute_config.resolve(&context);
        let name = attribute_config.name.as_str();
        let carried = prior
            .get(name)
            .filter(|v| resolved.iter().any(|r| &r.value == *v))
            .cloned();
        let chosen = carried.or_else(|| {
            let mut flagged = resolved.iter().filter(|r| r.is_selected);
            let first = flagged.next().map(|r| r.value.clone());
            if flagged.next().is_some() {
                warn!(attribute = name, "several values marked selected, keeping the first");
            }
            first
        });

        let mut attribute = Attribute::new(name);
        for r in resolved {
            let selected = chosen.as_deref() == Some(r.value.as_str());
            debug!(attribute = name, value = %r.value, nodes = r.node_ids.len(), selected, "created attribute value");
            attribute.add_value(AttributeValue::new(r.value, r.node_ids, selected));
        }
        if let Some(chosen) = chosen {
            selections.insert(name.to_owned(), chosen);
        }
        attributes.insert(name.to_owned(), attribute);
    }
    (attributes, selections)
}

/// Node ids the selections want visible, in attribute order, deduplicated.
fn visible_nodes(
    attributes: &IndexMap<String, Attribute>,
    selections: &Selections,
) -> IndexSet<String> {
    let mut out = IndexSet::new();
    for (name, attribute) in attributes {
        let Some(value) = selections.get(name).and_then(|v| attribute.get_value(v)) else {
            continue;
        };
        out.extend(value.node_ids().iter().cloned());
    }
    out
}
