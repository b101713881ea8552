// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Chained camera commands.

use std::cell::RefCell;

use tracing::debug;
use virtualdisplay_proto::{CameraAction, CameraCommand, Message};

use crate::events::{DomainEvent, EventBus};

/// Accumulates rotate/tilt/zoom commands until [`Camera::set`].
#[derive(Debug)]
pub struct Camera {
    bus: EventBus,
    pending: RefCell<Vec<CameraCommand>>,
}

impl Camera {
    /// Camera emitting on `bus`.
    pub fn new(bus: &EventBus) -> Self {
        Self {
            bus: bus.clone(),
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Absolute horizontal rotation in degrees (0 is the front view).
    pub fn rotate(&self, degrees: f64) -> &Self {
        self.push(CameraAction::Rotate, degrees)
    }

    /// Absolute vertical tilt in degrees (0 is top, 90 horizontal).
    pub fn tilt(&self, degrees: f64) -> &Self {
        self.push(CameraAction::Tilt, degrees)
    }

    /// Zoom percentage; 100 is the default framing.
    pub fn zoom(&self, percentage: f64) -> &Self {
        self.push(CameraAction::Zoom, percentage)
    }

    /// Send the accumulated commands as one message and clear them.
    pub fn set(&self) {
        let commands = std::mem::take(&mut *self.pending.borrow_mut());
        if commands.is_empty() {
            return;
        }
        debug!(commands = commands.len(), "sending camera commands");
        self.bus
            .emit(&DomainEvent::CameraMessage(Message::Camera { commands }));
    }

    /// Return to the initial placement now. Pending commands are kept.
    pub fn reset(&self) {
        self.bus.emit(&DomainEvent::CameraMessage(Message::Camera {
            commands: vec![CameraCommand {
                action: CameraAction::Reset,
                value: None,
            }],
        }));
    }

    /// Commands waiting for [`Camera::set`].
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    fn push(&self, action: CameraAction, value: f64) -> &Self {
        self.pending.borrow_mut().push(CameraCommand {
            action,
            value: Some(value),
        });
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::events::EventName;
    use std::rc::Rc;

    fn capture(bus: &EventBus) -> Rc<RefCell<Vec<Vec<CameraCommand>>>> {
        let sent = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&sent);
        bus.subscribe(EventName::CameraMessage, move |event| {
            if let DomainEvent::CameraMessage(Message::Camera { commands }) = event {
                s.borrow_mut().push(commands.clone());
            }
        });
        sent
    }

    #[test]
    fn set_sends_accumulated_commands_once() {
        let bus = EventBus::new();
        let sent = capture(&bus);
        let camera = Camera::new(&bus);
        camera.rotate(45.0).tilt(60.0).zoom(120.0).set();
        camera.set();
        let sent = sent.borrow();
        assert_eq!(sent.len(), 1);
        let actions: Vec<_> = sent[0].iter().map(|c| c.action).collect();
        assert_eq!(
            actions,
            vec![CameraAction::Rotate, CameraAction::Tilt, CameraAction::Zoom]
        );
        assert_eq!(sent[0][2].value, Some(120.0));
    }

    #[test]
    fn reset_is_immediate_and_keeps_pending() {
        let bus = EventBus::new();
        let sent = capture(&bus);
        let camera = Camera::new(&bus);
        camera.rotate(10.0);
        camera.reset();
        assert_eq!(camera.pending(), 1);
        assert_eq!(
            sent.borrow()[0],
            vec![CameraCommand {
                action: CameraAction::Reset,
                value: None
            }]
        );
    }
}
