// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Show/hide instruction for a single node.

use virtualdisplay_proto::{MutationDto, MutationKind};

/// Immutable show/hide instruction for one node.
///
/// Two mutations are equal iff they share kind and node id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mutation {
    kind: MutationKind,
    node_id: String,
}

impl Mutation {
    /// Build a mutation.
    pub fn new(kind: MutationKind, node_id: impl Into<String>) -> Self {
        Self {
            kind,
            node_id: node_id.into(),
        }
    }

    /// Show `node_id`.
    pub fn show(node_id: impl Into<String>) -> Self {
        Self::new(MutationKind::Show, node_id)
    }

    /// Hide `node_id`.
    pub fn hide(node_id: impl Into<String>) -> Self {
        Self::new(MutationKind::Hide, node_id)
    }

    /// Same node, opposite kind.
    pub fn inverse(&self) -> Self {
        Self::new(self.kind.inverse(), self.node_id.clone())
    }

    /// Show or hide.
    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    /// Target node.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Wire representation.
    pub fn to_dto(&self) -> MutationDto {
        MutationDto {
            kind: self.kind,
            node_id: self.node_id.clone(),
        }
    }
}

impl From<MutationDto> for Mutation {
    fn from(dto: MutationDto) -> Self {
        Self::new(dto.kind, dto.node_id)
    }
}

impl From<&Mutation> for MutationDto {
    fn from(mutation: &Mutation) -> Self {
        mutation.to_dto()
    }
}

/// Invert every mutation of a list, preserving order.
pub fn inverse_all(mutations: &[Mutation]) -> Vec<Mutation> {
    mutations.iter().map(Mutation::inverse).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn inverse_flips_kind_and_keeps_node() {
        let m = Mutation::show("n1");
        assert_eq!(m.inverse(), Mutation::hide("n1"));
        assert_eq!(Mutation::hide("n1").inverse(), m);
    }

    #[test]
    fn equality_needs_kind_and_node() {
        assert_eq!(Mutation::show("a"), Mutation::show("a"));
        assert_ne!(Mutation::show("a"), Mutation::hide("a"));
        assert_ne!(Mutation::show("a"), Mutation::show("b"));
    }

    #[test]
    fn dto_conversion_is_plain_data() {
        let dto = Mutation::hide("node-7").to_dto();
        assert_eq!(dto.kind, MutationKind::Hide);
        assert_eq!(dto.node_id, "node-7");
        assert_eq!(Mutation::from(dto), Mutation::hide("node-7"));
    }

    proptest! {
        #[test]
        fn double_inverse_is_identity(show in any::<bool>(), node in "[a-z0-9-]{1,12}") {
            let m = if show { Mutation::show(node) } else { Mutation::hide(node) };
            prop_assert_eq!(m.inverse().inverse(), m);
        }
    }
}
