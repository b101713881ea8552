// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transport port towards the viewer.

use thiserror::Error;
use virtualdisplay_proto::Message;

/// Delivery failure reported by a [`ViewerPort`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// The viewer's window is gone or not yet attached.
    #[error("viewer window is not available")]
    WindowUnavailable,
    /// The message could not be converted for the transport.
    #[error("failed to encode {message_type} message: {reason}")]
    Encode {
        /// Wire tag of the message.
        message_type: &'static str,
        /// Encoder error text.
        reason: String,
    },
    /// The transport refused the message.
    #[error("transport rejected message: {0}")]
    Rejected(String),
}

/// Outbound side of the viewer transport.
///
/// Delivery is fire-and-forget: the viewer never acknowledges receipt, so
/// `Ok` only means the message left this process.
pub trait ViewerPort {
    /// Post one message to the viewer.
    ///
    /// # Errors
    /// Returns a [`PortError`] when the message cannot be handed to the
    /// transport.
    fn post_message(&self, message: &Message) -> Result<(), PortError>;
}
