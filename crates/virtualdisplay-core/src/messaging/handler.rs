// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ready-gated outbound queue and inbound demultiplexer.
//!
//! The handler starts not-ready and queues every outbound message. The
//! first [`EventName::IframeReady`] flips it to ready exactly once and
//! flushes the queue in enqueue order; afterwards messages go straight to
//! the port. Teardown empties the queue and detaches from the bus.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::{debug, info, warn};
use virtualdisplay_proto::{wire, Message};

use super::ViewerPort;
use crate::events::{DomainEvent, EventBus, EventName, Listener};

#[derive(Default)]
struct Shared {
    port: RefCell<Option<Rc<dyn ViewerPort>>>,
    ready: Cell<bool>,
    destroyed: Cell<bool>,
    queue: RefCell<VecDeque<Message>>,
    subscriptions: RefCell<Vec<(EventName, Listener)>>,
}

impl Shared {
    fn queue_or_send(&self, message: &Message) {
        if self.destroyed.get() {
            return;
        }
        if self.ready.get() {
            self.send(message);
            return;
        }
        self.queue.borrow_mut().push_back(message.clone());
        debug!(
            message_type = message.type_name(),
            queued = self.queue.borrow().len(),
            "viewer not ready, message queued"
        );
    }

    fn flush(&self) {
        if self.ready.replace(true) {
            return;
        }
        let pending = std::mem::take(&mut *self.queue.borrow_mut());
        debug!(count = pending.len(), "viewer ready, flushing queue");
        for message in &pending {
            self.send(message);
        }
    }

    fn send(&self, message: &Message) {
        let port = self.port.borrow().clone();
        let Some(port) = port else {
            warn!(
                message_type = message.type_name(),
                "cannot send message, viewer window not attached"
            );
            return;
        };
        match port.post_message(message) {
            Ok(()) => debug!(message_type = message.type_name(), "message sent to viewer"),
            Err(err) => warn!(
                message_type = message.type_name(),
                error = %err,
                "message not delivered"
            ),
        }
    }
}

/// Bridges the bus and a [`ViewerPort`]. Clones share state.
#[derive(Clone)]
pub struct MessageHandler {
    bus: EventBus,
    shared: Rc<Shared>,
}

impl std::fmt::Debug for MessageHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageHandler")
            .field("ready", &self.shared.ready.get())
            .field("queued", &self.shared.queue.borrow().len())
            .field("attached", &self.shared.port.borrow().is_some())
            .finish()
    }
}

impl MessageHandler {
    /// Subscribe to outbound message events and the ready signal on `bus`.
    pub fn new(bus: &EventBus) -> Self {
        let shared = Rc::new(Shared::default());
        let mut subscriptions = Vec::with_capacity(EventName::OUTBOUND.len() + 1);
        for name in EventName::OUTBOUND {
            let weak: Weak<Shared> = Rc::downgrade(&shared);
            let listener = bus.subscribe(name, move |event| {
                let (Some(shared), Some(message)) = (weak.upgrade(), event.outbound_message())
                else {
                    return;
                };
                shared.queue_or_send(message);
            });
            subscriptions.push((name, listener));
        }
        let weak = Rc::downgrade(&shared);
        let ready = bus.once(EventName::IframeReady, move |_| {
            if let Some(shared) = weak.upgrade() {
                shared.flush();
            }
        });
        subscriptions.push((EventName::IframeReady, ready));
        *shared.subscriptions.borrow_mut() = subscriptions;
        Self {
            bus: bus.clone(),
            shared,
        }
    }

    /// Attach the outbound transport. Replaces any previous port.
    pub fn set_port(&self, port: Rc<dyn ViewerPort>) {
        *self.shared.port.borrow_mut() = Some(port);
    }

    /// Validate a raw inbound payload and re-emit it as
    /// [`EventName::MessageReceived`]. Unrecognized payloads are dropped
    /// silently; returns whether the payload was accepted.
    pub fn handle_inbound(&self, raw: &Value) -> bool {
        if self.shared.destroyed.get() {
            return false;
        }
        let Some(message) = wire::decode_inbound(raw) else {
            return false;
        };
        info!(message_type = message.type_name(), "valid message received from viewer");
        self.bus.emit(&DomainEvent::MessageReceived(message));
        true
    }

    /// True once the ready signal has been seen.
    pub fn is_ready(&self) -> bool {
        self.shared.ready.get()
    }

    /// Messages waiting for the ready signal.
    pub fn queued(&self) -> usize {
        self.shared.queue.borrow().len()
    }

    /// Drop queued messages, return to not-ready and detach from the bus
    /// and port. Messages already sent stay sent.
    pub fn destroy(&self) {
        self.shared.destroyed.set(true);
        self.shared.queue.borrow_mut().clear();
        self.shared.ready.set(false);
        self.shared.port.borrow_mut().take();
        let subscriptions = std::mem::take(&mut *self.shared.subscriptions.borrow_mut());
        for (name, listener) in &subscriptions {
            self.bus.off(*name, listener);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::messaging::PortError;
    use crate::mutation::Mutation;
    use crate::messaging::mutation_message;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        sent: RefCell<Vec<Message>>,
    }

    impl ViewerPort for Recorder {
        fn post_message(&self, message: &Message) -> Result<(), PortError> {
            self.sent.borrow_mut().push(message.clone());
            Ok(())
        }
    }

    struct Gone;

    impl ViewerPort for Gone {
        fn post_message(&self, _: &Message) -> Result<(), PortError> {
            Err(PortError::WindowUnavailable)
        }
    }

    fn batch(id: &str) -> DomainEvent {
        DomainEvent::MutationMessage(mutation_message(&[Mutation::show(id)]))
    }

    fn wired() -> (EventBus, MessageHandler, Rc<Recorder>) {
        let bus = EventBus::new();
        let handler = MessageHandler::new(&bus);
        let port = Rc::new(Recorder::default());
        handler.set_port(port.clone());
        (bus, handler, port)
    }

    #[test]
    fn queues_until_ready_then_flushes_in_order() {
        let (bus, handler, port) = wired();
        bus.emit(&batch("a"));
        bus.emit(&DomainEvent::CameraMessage(Message::Camera { commands: vec![] }));
        bus.emit(&batch("b"));
        assert!(port.sent.borrow().is_empty());
        assert_eq!(handler.queued(), 3);

        bus.emit(&DomainEvent::IframeReady);
        let sent = port.sent.borrow();
        let types: Vec<_> = sent.iter().map(Message::type_name).collect();
        assert_eq!(types, vec!["mutation", "camera", "mutation"]);
        assert_eq!(sent[0], mutation_message(&[Mutation::show("a")]));
        assert_eq!(sent[2], mutation_message(&[Mutation::show("b")]));
        assert_eq!(handler.queued(), 0);
    }

    #[test]
    fn sends_immediately_once_ready_and_flushes_only_once() {
        let (bus, handler, port) = wired();
        bus.emit(&batch("a"));
        bus.emit(&DomainEvent::IframeReady);
        bus.emit(&DomainEvent::IframeReady);
        bus.emit(&batch("b"));
        assert!(handler.is_ready());
        assert_eq!(port.sent.borrow().len(), 2);
    }

    #[test]
    fn port_failures_are_swallowed() {
        let bus = EventBus::new();
        let handler = MessageHandler::new(&bus);
        handler.set_port(Rc::new(Gone));
        bus.emit(&DomainEvent::IframeReady);
        bus.emit(&batch("a"));
        assert_eq!(handler.queued(), 0);
    }

    #[test]
    fn missing_port_drops_without_panicking() {
        let bus = EventBus::new();
        let handler = MessageHandler::new(&bus);
        bus.emit(&batch("a"));
        bus.emit(&DomainEvent::IframeReady);
        assert_eq!(handler.queued(), 0);
    }

    #[test]
    fn inbound_accepts_viewer_shapes_only() {
        let (bus, handler, _) = wired();
        let received = Rc::new(RefCell::new(Vec::new()));
        let r = Rc::clone(&received);
        bus.subscribe(EventName::MessageReceived, move |event| {
            if let DomainEvent::MessageReceived(m) = event {
                r.borrow_mut().push(m.type_name());
            }
        });
        assert!(handler.handle_inbound(&json!({"type": "state", "nodes": []})));
        assert!(handler.handle_inbound(
            &json!({"type": "snapshot", "filename": "a.png", "data": "AAA"})
        ));
        assert!(!handler.handle_inbound(&json!({"type": "snapshot", "filename": "a.png"})));
        assert!(!handler.handle_inbound(&json!({"type": "mutation", "mutations": []})));
        assert!(!handler.handle_inbound(&json!("webpackHotUpdate")));
        assert_eq!(*received.borrow(), vec!["state", "snapshot"]);
    }

    #[test]
    fn destroy_clears_queue_and_detaches() {
        let (bus, handler, port) = wired();
        bus.emit(&batch("a"));
        handler.destroy();
        assert_eq!(handler.queued(), 0);
        assert!(!handler.is_ready());
        bus.emit(&DomainEvent::IframeReady);
        bus.emit(&batch("b"));
        assert!(port.sent.borrow().is_empty());
        for name in EventName::OUTBOUND {
            assert_eq!(bus.listener_count(name), 0);
        }
        assert_eq!(bus.listener_count(EventName::IframeReady), 0);
    }
}
