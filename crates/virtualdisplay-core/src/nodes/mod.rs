// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Node registry fed by viewer state reports.

mod node;
mod selector;
mod state;

pub use node::ModelNode;
pub use selector::NodeSelector;
pub use state::StateService;
