// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Live node record.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use virtualdisplay_proto::{ModelNodeDto, NodeType};

/// Addressable mesh or variant in the viewer's scene.
///
/// Records are created the first time the viewer mentions a node and are
/// never replaced afterwards; only `visible` changes, so host code may keep
/// `Rc<ModelNode>` handles for the lifetime of the client.
pub struct ModelNode {
    id: String,
    name: String,
    node_type: NodeType,
    visible: Cell<bool>,
    on_change: RefCell<Option<Rc<dyn Fn()>>>,
}

impl std::fmt::Debug for ModelNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("node_type", &self.node_type)
            .field("visible", &self.visible.get())
            .finish_non_exhaustive()
    }
}

impl ModelNode {
    /// Create a node record.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        node_type: NodeType,
        visible: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type,
            visible: Cell::new(visible),
            on_change: RefCell::new(None),
        }
    }

    /// Create a record from a reported node.
    pub fn from_dto(dto: &ModelNodeDto) -> Self {
        Self::new(dto.id.clone(), dto.name.clone(), dto.node_type, dto.visible)
    }

    /// Stable identity.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name reported by the viewer.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mesh or variant.
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Last reported visibility.
    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// Wire representation.
    pub fn to_dto(&self) -> ModelNodeDto {
        ModelNodeDto {
            id: self.id.clone(),
            name: self.name.clone(),
            node_type: self.node_type,
            visible: self.visible.get(),
        }
    }

    /// Replace the change callback. Only the latest assignment is kept.
    pub fn set_on_change(&self, callback: impl Fn() + 'static) {
        *self.on_change.borrow_mut() = Some(Rc::new(callback));
    }

    /// Remove the change callback.
    pub fn clear_on_change(&self) {
        self.on_change.borrow_mut().take();
    }

    /// Store `visible`; returns whether it differed.
    pub(crate) fn set_visible(&self, visible: bool) -> bool {
        self.visible.replace(visible) != visible
    }

    /// Invoke the change callback, if any.
    pub(crate) fn notify_change(&self) {
        let callback = self.on_change.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn latest_callback_wins() {
        let node = ModelNode::new("n1", "Wheel", NodeType::Mesh, true);
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&log);
        node.set_on_change(move || first.borrow_mut().push("first"));
        let second = Rc::clone(&log);
        node.set_on_change(move || second.borrow_mut().push("second"));
        node.notify_change();
        assert_eq!(*log.borrow(), vec!["second"]);
    }

    #[test]
    fn set_visible_reports_change() {
        let node = ModelNode::new("n1", "Wheel", NodeType::Variant, false);
        assert!(!node.set_visible(false));
        assert!(node.set_visible(true));
        assert!(node.is_visible());
    }

    #[test]
    fn callback_may_replace_itself() {
        let node = Rc::new(ModelNode::new("n1", "Wheel", NodeType::Mesh, true));
        let weak = Rc::downgrade(&node);
        node.set_on_change(move || {
            if let Some(n) = weak.upgrade() {
                n.clear_on_change();
            }
        });
        node.notify_change();
        node.notify_change();
        assert!(node.on_change.borrow().is_none());
    }
}
