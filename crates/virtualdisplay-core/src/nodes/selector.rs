// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Direct control of a single node, bypassing the attribute mapping.

use std::rc::Rc;

use tracing::{debug, warn};
use virtualdisplay_proto::NodeType;

use super::{ModelNode, StateService};
use crate::events::{DomainEvent, EventBus};
use crate::messaging::mutation_message;
use crate::mutation::Mutation;

/// Handle for one node id.
#[derive(Debug, Clone)]
pub struct NodeSelector {
    bus: EventBus,
    state: StateService,
    node_id: String,
}

impl NodeSelector {
    /// Selector for `node_id`. Existence is checked by the caller.
    pub fn new(bus: EventBus, state: StateService, node_id: impl Into<String>) -> Self {
        Self {
            bus,
            state,
            node_id: node_id.into(),
        }
    }

    /// Ask the viewer to show the node.
    pub fn show(&self) {
        debug!(node_id = %self.node_id, "showing node");
        self.emit(Mutation::show(self.node_id.as_str()));
    }

    /// Ask the viewer to hide the node.
    pub fn hide(&self) {
        debug!(node_id = %self.node_id, "hiding node");
        self.emit(Mutation::hide(self.node_id.as_str()));
    }

    /// Flip the node based on its last reported visibility.
    pub fn toggle(&self) {
        let Some(node) = self.node() else {
            warn!(node_id = %self.node_id, "cannot toggle node: node not found");
            return;
        };
        if node.is_visible() {
            self.hide();
        } else {
            self.show();
        }
    }

    /// Target node id.
    pub fn id(&self) -> &str {
        &self.node_id
    }

    /// Last reported visibility; false if the node is unknown.
    pub fn is_visible(&self) -> bool {
        self.node().is_some_and(|n| n.is_visible())
    }

    /// Live node record.
    pub fn node(&self) -> Option<Rc<ModelNode>> {
        self.state.get_node(&self.node_id)
    }

    /// Reported name.
    pub fn name(&self) -> Option<String> {
        self.node().map(|n| n.name().to_owned())
    }

    /// Reported type.
    pub fn node_type(&self) -> Option<NodeType> {
        self.node().map(|n| n.node_type())
    }

    fn emit(&self, mutation: Mutation) {
        self.bus
            .emit(&DomainEvent::MutationMessage(mutation_message(&[mutation])));
    }
}
