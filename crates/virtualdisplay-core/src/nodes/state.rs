// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canonical node visibility as last reported by the viewer.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::{debug, info};
use virtualdisplay_proto::{Message, ModelNodeDto};

use super::ModelNode;
use crate::events::{DomainEvent, EventBus, EventName, Listener};

struct Shared {
    bus: EventBus,
    nodes: RefCell<IndexMap<String, Rc<ModelNode>>>,
    has_initial: Cell<bool>,
}

/// Node registry. Clones share the same registry.
#[derive(Clone)]
pub struct StateService {
    shared: Rc<Shared>,
}

impl std::fmt::Debug for StateService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateService")
            .field("nodes", &self.node_count())
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl StateService {
    /// Create a registry that applies every `state` message seen on `bus`.
    pub fn new(bus: &EventBus) -> Self {
        let shared = Rc::new(Shared {
            bus: bus.clone(),
            nodes: RefCell::new(IndexMap::new()),
            has_initial: Cell::new(false),
        });
        let weak: Weak<Shared> = Rc::downgrade(&shared);
        let _: Listener = bus.subscribe(EventName::MessageReceived, move |event| {
            let DomainEvent::MessageReceived(Message::State { nodes, is_initial }) = event else {
                return;
            };
            if let Some(shared) = weak.upgrade() {
                StateService { shared }.apply_report(nodes, *is_initial);
            }
        });
        Self { shared }
    }

    /// Apply one viewer report.
    ///
    /// Initial reports only add unknown nodes. Incremental reports create or
    /// overwrite every listed node and fire the callback of nodes whose
    /// visibility flipped. Emits one [`EventName::StateChanged`] per report
    /// and [`EventName::InitialStateReceived`] for the first initial report.
    pub fn apply_report(&self, reported: &[ModelNodeDto], is_initial: bool) {
        debug!(
            incoming = reported.len(),
            is_initial,
            known = self.node_count(),
            "applying state report"
        );
        let mut flipped = Vec::new();
        {
            let mut nodes = self.shared.nodes.borrow_mut();
            for dto in reported {
                match nodes.get(&dto.id) {
                    Some(_) if is_initial => {
                        debug!(id = %dto.id, "initial report keeps known node");
                    }
                    Some(node) => {
                        if node.set_visible(dto.visible) {
                            flipped.push(Rc::clone(node));
                        }
                    }
                    None => {
                        debug!(id = %dto.id, node_type = dto.node_type.as_str(), visible = dto.visible, "created node");
                        nodes.insert(dto.id.clone(), Rc::new(ModelNode::from_dto(dto)));
                    }
                }
            }
        }
        for node in &flipped {
            node.notify_change();
        }

        let first_initial = is_initial && !self.shared.has_initial.replace(true);
        info!(
            total_nodes = self.node_count(),
            was_initial = first_initial,
            "state updated"
        );
        self.shared
            .bus
            .emit(&DomainEvent::StateChanged(self.get_all_nodes()));
        if first_initial {
            info!("initial state received, client is ready");
            self.shared.bus.emit(&DomainEvent::InitialStateReceived);
        }
    }

    /// Node by id.
    pub fn get_node(&self, id: &str) -> Option<Rc<ModelNode>> {
        self.shared.nodes.borrow().get(id).cloned()
    }

    /// Every known node, in first-seen order.
    pub fn get_all_nodes(&self) -> Vec<Rc<ModelNode>> {
        self.shared.nodes.borrow().values().cloned().collect()
    }

    /// Number of known nodes.
    pub fn node_count(&self) -> usize {
        self.shared.nodes.borrow().len()
    }

    /// True once an initial report has been applied.
    pub fn is_ready(&self) -> bool {
        self.shared.has_initial.get()
    }

    /// Forget every node and the initial report.
    pub fn clear(&self) {
        self.shared.nodes.borrow_mut().clear();
        self.shared.has_initial.set(false);
    }
}
