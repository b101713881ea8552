// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Attribute/mutation synchronization engine for the Virtualdisplay viewer.
//!
//! The host selects named product options ([`attributes`]); the engine turns
//! them into show/hide [`Mutation`]s for the viewer's nodes, queues them
//! until the viewer is ready ([`messaging`]), and reconciles option state
//! with the node visibility the viewer reports back ([`nodes`]).
//!
//! Everything runs on one thread. Components talk through a per-client
//! [`EventBus`]; the transport itself is a [`ViewerPort`] supplied by the
//! host, which keeps this crate target independent.
//!
//! ```
//! use virtualdisplay_core::{
//!     AttributeConfig, AttributeValueConfig, ClientOptions, MappingConfiguration,
//!     VirtualdisplayClient,
//! };
//!
//! let client = VirtualdisplayClient::new(ClientOptions::new("chair", "license-key"));
//! client
//!     .set_mapping(MappingConfiguration::new(vec![AttributeConfig::new(
//!         "Color",
//!         vec![
//!             AttributeValueConfig::new("Red", ["red_seat"]).selected(),
//!             AttributeValueConfig::new("Blue", ["blue_seat"]),
//!         ],
//!     )]))
//!     .unwrap();
//! client.get_attribute("Color").unwrap().select("Blue").unwrap();
//! ```

pub mod attributes;
pub mod camera;
pub mod client;
pub mod error;
pub mod events;
pub mod messaging;
pub mod mutation;
pub mod nodes;
pub mod options;
pub mod snapshot;
pub mod viewer;

pub use attributes::{
    Attribute, AttributeConfig, AttributeSelector, AttributeService, AttributeValue,
    AttributeValueConfig, Dynamic, MappingConfiguration, MappingContext,
};
pub use camera::Camera;
pub use client::VirtualdisplayClient;
pub use error::{ErrorCode, Result, VirtualdisplayError};
pub use events::{DomainEvent, EventBus, EventName, Listener};
pub use messaging::{MessageHandler, PortError, ViewerPort};
pub use mutation::Mutation;
pub use nodes::{ModelNode, NodeSelector, StateService};
pub use options::{ClientOptions, DEFAULT_SERVER_URL};
pub use snapshot::{Photo, PhotoData, Snapshot};
pub use viewer::ViewerService;
pub use virtualdisplay_proto as proto;
