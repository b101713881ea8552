// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Host-facing client wiring every service onto one bus.

use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::attributes::{AttributeSelector, AttributeService, MappingConfiguration};
use crate::camera::Camera;
use crate::error::{Result, VirtualdisplayError};
use crate::events::{DomainEvent, EventBus, EventName};
use crate::messaging::{mutation_message, mutation_message_from_json, MessageHandler, ViewerPort};
use crate::mutation::Mutation;
use crate::nodes::{ModelNode, NodeSelector, StateService};
use crate::options::ClientOptions;
use crate::snapshot::Snapshot;
use crate::viewer::ViewerService;

/// One viewer session.
///
/// The transport is supplied by the host: attach a [`ViewerPort`], call
/// [`notify_ready`](Self::notify_ready) when the viewer can receive
/// messages, and feed raw inbound payloads to [`receive`](Self::receive).
#[derive(Debug)]
pub struct VirtualdisplayClient {
    options: ClientOptions,
    bus: EventBus,
    attributes: AttributeService,
    state: StateService,
    messages: MessageHandler,
    viewer: ViewerService,
    camera: Camera,
    snapshot: Snapshot,
}

impl VirtualdisplayClient {
    /// Wire a client for `options`. Nothing is sent until the ready signal.
    pub fn new(options: ClientOptions) -> Self {
        info!(
            model = %options.model,
            debug = options.debug,
            language = options.language.as_deref(),
            "initializing client"
        );
        let bus = EventBus::new();
        let attributes = AttributeService::new(&bus);
        let state = StateService::new(&bus);
        let messages = MessageHandler::new(&bus);
        let viewer = ViewerService::new(&bus);
        let camera = Camera::new(&bus);
        let snapshot = Snapshot::new(&bus);

        // registered after the handler's own ready listener, so the queue
        // is flushed before the initial config goes out
        let initial_viewer = viewer.clone();
        let initial_options = options.clone();
        bus.once(EventName::IframeReady, move |_| {
            initial_viewer.send_initial_config(&initial_options);
        });

        Self {
            options,
            bus,
            attributes,
            state,
            messages,
            viewer,
            camera,
            snapshot,
        }
    }

    /// Options the client was created with.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// The client's private event bus.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Attach the outbound transport.
    pub fn attach_port(&self, port: Rc<dyn ViewerPort>) {
        debug!("viewer port attached");
        self.messages.set_port(port);
    }

    /// Signal that the viewer can receive messages. Only the first call
    /// has an effect.
    pub fn notify_ready(&self) {
        info!("viewer transport ready");
        self.bus.emit(&DomainEvent::IframeReady);
    }

    /// Feed one raw inbound payload; returns whether it was recognized.
    pub fn receive(&self, raw: &Value) -> bool {
        self.messages.handle_inbound(raw)
    }

    /// Load a mapping.
    ///
    /// # Errors
    /// [`VirtualdisplayError::InvalidMapping`] when validation fails.
    pub fn set_mapping(&self, config: MappingConfiguration) -> Result<()> {
        debug!(attributes = config.attributes.len(), "setting attribute mapping");
        self.attributes.load_mapping(config)
    }

    /// Load a literal mapping from JSON.
    ///
    /// # Errors
    /// [`VirtualdisplayError::InvalidMapping`] when validation fails.
    pub fn set_mapping_json(&self, config: &Value) -> Result<()> {
        self.set_mapping(MappingConfiguration::from_json(config)?)
    }

    /// Fluent selector for `name`.
    ///
    /// # Errors
    /// [`VirtualdisplayError::NoMapping`] before any mapping is loaded,
    /// [`VirtualdisplayError::AttributeNotFound`] for unknown names.
    pub fn get_attribute(&self, name: &str) -> Result<AttributeSelector> {
        if !self.attributes.is_initialized() {
            return Err(VirtualdisplayError::NoMapping);
        }
        if self.attributes.get_attribute(name).is_none() {
            return Err(VirtualdisplayError::attribute_not_found(name));
        }
        debug!(attribute = name, "attribute selector");
        Ok(AttributeSelector::new(self.attributes.clone(), name))
    }

    /// The attribute service, for direct access to attributes.
    pub fn attributes(&self) -> &AttributeService {
        &self.attributes
    }

    /// Selector for a known node; `None` and a warning otherwise.
    pub fn node_selector(&self, node_id: &str) -> Option<NodeSelector> {
        if self.state.get_node(node_id).is_none() {
            warn!(node_id, "node not found");
            return None;
        }
        Some(NodeSelector::new(
            self.bus.clone(),
            self.state.clone(),
            node_id,
        ))
    }

    /// Live node record.
    pub fn get_node(&self, id: &str) -> Option<Rc<ModelNode>> {
        self.state.get_node(id)
    }

    /// Every known node.
    pub fn get_nodes(&self) -> Vec<Rc<ModelNode>> {
        self.state.get_all_nodes()
    }

    /// True once the viewer's initial state has arrived.
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Run `callback` when ready; immediately if already ready.
    pub fn on_ready(&self, callback: impl FnOnce() + 'static) {
        if self.state.is_ready() {
            callback();
            return;
        }
        self.bus
            .once(EventName::InitialStateReceived, move |_| callback());
    }

    /// Send a raw mutation batch.
    pub fn send_mutations(&self, mutations: &[Mutation]) {
        self.bus
            .emit(&DomainEvent::MutationMessage(mutation_message(mutations)));
    }

    /// Send a mutation batch given as JSON.
    ///
    /// # Errors
    /// [`VirtualdisplayError::InvalidMutations`] for malformed batches.
    pub fn send_mutations_json(&self, mutations: &Value) -> Result<()> {
        let message = mutation_message_from_json(mutations)?;
        self.bus.emit(&DomainEvent::MutationMessage(message));
        Ok(())
    }

    /// UI configuration.
    pub fn viewer(&self) -> &ViewerService {
        &self.viewer
    }

    /// Camera control.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Screenshots.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Tear down: forget attributes and nodes, drop queued messages and
    /// detach every listener.
    pub fn destroy(&self) {
        info!("destroying client");
        self.attributes.clear();
        self.state.clear();
        self.messages.destroy();
        self.bus.clear();
    }
}
