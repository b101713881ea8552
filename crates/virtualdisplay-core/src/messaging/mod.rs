// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Outbound message construction and delivery to the viewer.

mod handler;
mod port;

pub use handler::MessageHandler;
pub use port::{PortError, ViewerPort};

use serde_json::Value;
use virtualdisplay_proto::{Message, MutationDto};

use crate::error::{Result, VirtualdisplayError};
use crate::mutation::Mutation;

/// Mutation batch message, preserving order.
pub fn mutation_message(mutations: &[Mutation]) -> Message {
    Message::Mutation {
        mutations: mutations.iter().map(Mutation::to_dto).collect(),
    }
}

/// Mutation batch from host-provided JSON.
///
/// # Errors
/// [`VirtualdisplayError::InvalidMutations`] if `value` is not an array or
/// an entry is not `{type: "show"|"hide", nodeId: string}`.
pub fn mutation_message_from_json(value: &Value) -> Result<Message> {
    let Value::Array(entries) = value else {
        return Err(VirtualdisplayError::invalid_mutations("must be an array"));
    };
    let mutations = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<MutationDto>(entry.clone()).map_err(|err| {
                VirtualdisplayError::invalid_mutations(format!("entry {index}: {err}"))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Message::Mutation { mutations })
}
