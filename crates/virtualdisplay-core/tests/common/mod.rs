// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};
use virtualdisplay_core::proto::{Message, MutationDto, MutationKind};
use virtualdisplay_core::{
    AttributeConfig, AttributeValueConfig, ClientOptions, MappingConfiguration, PortError,
    ViewerPort, VirtualdisplayClient,
};

/// Port that records every posted message.
#[derive(Default)]
pub struct RecordingPort {
    sent: RefCell<Vec<Message>>,
}

impl RecordingPort {
    pub fn sent(&self) -> Vec<Message> {
        self.sent.borrow().clone()
    }

    pub fn mutation_batches(&self) -> Vec<Vec<(MutationKind, String)>> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|m| match m {
                Message::Mutation { mutations } => Some(pairs(mutations)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.sent.borrow_mut().clear();
    }
}

impl ViewerPort for RecordingPort {
    fn post_message(&self, message: &Message) -> Result<(), PortError> {
        self.sent.borrow_mut().push(message.clone());
        Ok(())
    }
}

pub fn pairs(mutations: &[MutationDto]) -> Vec<(MutationKind, String)> {
    mutations
        .iter()
        .map(|m| (m.kind, m.node_id.clone()))
        .collect()
}

pub fn show(id: &str) -> (MutationKind, String) {
    (MutationKind::Show, id.to_owned())
}

pub fn hide(id: &str) -> (MutationKind, String) {
    (MutationKind::Hide, id.to_owned())
}

/// Client with a recording port attached, not yet ready.
pub fn client() -> (VirtualdisplayClient, Rc<RecordingPort>) {
    let client = VirtualdisplayClient::new(ClientOptions::new("chair", "test-license"));
    let port = Rc::new(RecordingPort::default());
    client.attach_port(port.clone());
    (client, port)
}

/// `Color: Red (selected, r1 r2), Blue (b1)`.
pub fn color_mapping() -> MappingConfiguration {
    MappingConfiguration::new(vec![AttributeConfig::new(
        "Color",
        vec![
            AttributeValueConfig::new("Red", ["r1", "r2"]).selected(),
            AttributeValueConfig::new("Blue", ["b1"]),
        ],
    )])
}

pub fn state(nodes: &[(&str, bool)], is_initial: bool) -> Value {
    let nodes: Vec<Value> = nodes
        .iter()
        .map(|(id, visible)| json!({"id": id, "name": id, "type": "mesh", "visible": visible}))
        .collect();
    json!({"type": "state", "nodes": nodes, "isInitial": is_initial})
}
