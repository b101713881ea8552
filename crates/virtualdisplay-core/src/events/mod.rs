// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Domain events and the in-process bus that carries them.

mod bus;

pub use bus::{EventBus, Listener};

use std::rc::Rc;

use virtualdisplay_proto::Message;

use crate::nodes::ModelNode;

/// Closed set of event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    /// The viewer transport can receive messages (fired once).
    IframeReady,
    /// Outbound mutation batch.
    MutationMessage,
    /// Outbound viewer configuration.
    ConfigMessage,
    /// Outbound camera commands.
    CameraMessage,
    /// Outbound snapshot request.
    SnapshotMessage,
    /// Validated inbound viewer message.
    MessageReceived,
    /// Node registry updated from a viewer report.
    StateChanged,
    /// First initial report processed.
    InitialStateReceived,
}

impl EventName {
    /// Every event name.
    pub const ALL: [EventName; 8] = [
        EventName::IframeReady,
        EventName::MutationMessage,
        EventName::ConfigMessage,
        EventName::CameraMessage,
        EventName::SnapshotMessage,
        EventName::MessageReceived,
        EventName::StateChanged,
        EventName::InitialStateReceived,
    ];

    /// Events whose payload is a message bound for the viewer.
    pub const OUTBOUND: [EventName; 4] = [
        EventName::MutationMessage,
        EventName::ConfigMessage,
        EventName::CameraMessage,
        EventName::SnapshotMessage,
    ];

    /// Namespaced event label, used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::IframeReady => "iframe:ready",
            EventName::MutationMessage => "mutation:message",
            EventName::ConfigMessage => "config:message",
            EventName::CameraMessage => "camera:message",
            EventName::SnapshotMessage => "snapshot:take",
            EventName::MessageReceived => "message:received",
            EventName::StateChanged => "state:changed",
            EventName::InitialStateReceived => "state:initial-received",
        }
    }
}

/// Event payloads, one variant per [`EventName`].
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// See [`EventName::IframeReady`].
    IframeReady,
    /// See [`EventName::MutationMessage`].
    MutationMessage(Message),
    /// See [`EventName::ConfigMessage`].
    ConfigMessage(Message),
    /// See [`EventName::CameraMessage`].
    CameraMessage(Message),
    /// See [`EventName::SnapshotMessage`].
    SnapshotMessage(Message),
    /// See [`EventName::MessageReceived`].
    MessageReceived(Message),
    /// See [`EventName::StateChanged`]. Carries every known node.
    StateChanged(Vec<Rc<ModelNode>>),
    /// See [`EventName::InitialStateReceived`].
    InitialStateReceived,
}

impl DomainEvent {
    /// Name this payload is dispatched under.
    pub fn name(&self) -> EventName {
        match self {
            DomainEvent::IframeReady => EventName::IframeReady,
            DomainEvent::MutationMessage(_) => EventName::MutationMessage,
            DomainEvent::ConfigMessage(_) => EventName::ConfigMessage,
            DomainEvent::CameraMessage(_) => EventName::CameraMessage,
            DomainEvent::SnapshotMessage(_) => EventName::SnapshotMessage,
            DomainEvent::MessageReceived(_) => EventName::MessageReceived,
            DomainEvent::StateChanged(_) => EventName::StateChanged,
            DomainEvent::InitialStateReceived => EventName::InitialStateReceived,
        }
    }

    /// Message bound for the viewer, if this is an outbound event.
    pub fn outbound_message(&self) -> Option<&Message> {
        match self {
            DomainEvent::MutationMessage(m)
            | DomainEvent::ConfigMessage(m)
            | DomainEvent::CameraMessage(m)
            | DomainEvent::SnapshotMessage(m) => Some(m),
            _ => None,
        }
    }
}
