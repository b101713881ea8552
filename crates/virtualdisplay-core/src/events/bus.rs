// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Synchronous publish/subscribe keyed by [`EventName`].
//!
//! Dispatch iterates a snapshot of the listener list taken before the first
//! call, so listeners may register or remove listeners (including
//! themselves) while an emit is in flight without skipping or repeating
//! anyone in that dispatch. Listeners are identified by `Rc` address.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use super::{DomainEvent, EventName};

/// Registered callback. Keep the handle to remove it with [`EventBus::off`].
pub type Listener = Rc<dyn Fn(&DomainEvent)>;

type ListenerMap = HashMap<EventName, Vec<Listener>>;

/// Cheaply clonable handle to one bus; clones share listeners.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Rc<RefCell<ListenerMap>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.borrow();
        let mut map = f.debug_map();
        for (name, list) in listeners.iter() {
            map.entry(&name.as_str(), &list.len());
        }
        map.finish()
    }
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `name`. The same handle may be registered twice.
    pub fn on(&self, name: EventName, listener: Listener) {
        self.listeners
            .borrow_mut()
            .entry(name)
            .or_default()
            .push(listener);
    }

    /// Register a closure and return its handle.
    pub fn subscribe(&self, name: EventName, f: impl Fn(&DomainEvent) + 'static) -> Listener {
        let listener: Listener = Rc::new(f);
        self.on(name, Rc::clone(&listener));
        listener
    }

    /// Remove the first registration of `listener` under `name`.
    pub fn off(&self, name: EventName, listener: &Listener) {
        remove(&self.listeners, name, listener);
    }

    /// Register `f` to run on the next `name` event only.
    ///
    /// The registration is removed before `f` runs, so a panicking `f`
    /// leaves nothing behind. The returned handle can cancel it early.
    pub fn once(&self, name: EventName, f: impl FnOnce(&DomainEvent) + 'static) -> Listener {
        let pending = RefCell::new(Some(f));
        let this: Rc<RefCell<Option<Weak<dyn Fn(&DomainEvent)>>>> = Rc::default();
        let bus = Rc::downgrade(&self.listeners);
        let slot = Rc::clone(&this);
        let wrapper: Listener = Rc::new(move |event: &DomainEvent| {
            let Some(f) = pending.borrow_mut().take() else {
                return;
            };
            let me = slot.borrow().as_ref().and_then(Weak::upgrade);
            if let (Some(listeners), Some(me)) = (bus.upgrade(), me) {
                remove(&listeners, name, &me);
            }
            f(event);
        });
        *this.borrow_mut() = Some(Rc::downgrade(&wrapper));
        self.on(name, Rc::clone(&wrapper));
        wrapper
    }

    /// Synchronously invoke every listener registered for the event's name.
    pub fn emit(&self, event: &DomainEvent) {
        let snapshot: Vec<Listener> = match self.listeners.borrow().get(&event.name()) {
            Some(list) if !list.is_empty() => list.clone(),
            _ => return,
        };
        for listener in snapshot {
            listener(event);
        }
    }

    /// Number of registrations under `name`.
    pub fn listener_count(&self, name: EventName) -> usize {
        self.listeners.borrow().get(&name).map_or(0, Vec::len)
    }

    /// Drop every registration.
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

fn remove(listeners: &RefCell<ListenerMap>, name: EventName, listener: &Listener) {
    let mut map = listeners.borrow_mut();
    if let Some(list) = map.get_mut(&name) {
        if let Some(pos) = list.iter().position(|l| same_listener(l, listener)) {
            list.remove(pos);
        }
    }
}

fn same_listener(a: &Listener, b: &Listener) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    fn counter(bus: &EventBus, name: EventName) -> (Rc<Cell<u32>>, Listener) {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let listener = bus.subscribe(name, move |_| h.set(h.get() + 1));
        (hits, listener)
    }

    #[test]
    fn emit_reaches_listeners_of_that_name_only() {
        let bus = EventBus::new();
        let (ready, _) = counter(&bus, EventName::IframeReady);
        let (initial, _) = counter(&bus, EventName::InitialStateReceived);
        bus.emit(&DomainEvent::IframeReady);
        assert_eq!(ready.get(), 1);
        assert_eq!(initial.get(), 0);
    }

    #[test]
    fn off_removes_by_identity() {
        let bus = EventBus::new();
        let (hits, listener) = counter(&bus, EventName::IframeReady);
        let (other, _) = counter(&bus, EventName::IframeReady);
        bus.off(EventName::IframeReady, &listener);
        bus.emit(&DomainEvent::IframeReady);
        assert_eq!(hits.get(), 0);
        assert_eq!(other.get(), 1);
    }

    #[test]
    fn buses_are_isolated() {
        let a = EventBus::new();
        let b = EventBus::new();
        let (hits, _) = counter(&a, EventName::IframeReady);
        b.emit(&DomainEvent::IframeReady);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn once_fires_a_single_time() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        bus.once(EventName::IframeReady, move |_| h.set(h.get() + 1));
        bus.emit(&DomainEvent::IframeReady);
        bus.emit(&DomainEvent::IframeReady);
        assert_eq!(hits.get(), 1);
        assert_eq!(bus.listener_count(EventName::IframeReady), 0);
    }

    #[test]
    fn several_self_removing_once_listeners_all_run() {
        let bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let o = Rc::clone(&order);
            bus.once(EventName::IframeReady, move |_| o.borrow_mut().push(i));
        }
        let (plain, _) = counter(&bus, EventName::IframeReady);
        bus.emit(&DomainEvent::IframeReady);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        assert_eq!(plain.get(), 1);
        bus.emit(&DomainEvent::IframeReady);
        assert_eq!(order.borrow().len(), 3);
        assert_eq!(plain.get(), 2);
    }

    #[test]
    fn listener_added_during_dispatch_waits_for_next_emit() {
        let bus = EventBus::new();
        let late = Rc::new(Cell::new(0));
        let (b, l) = (bus.clone(), Rc::clone(&late));
        bus.once(EventName::IframeReady, move |_| {
            let l = Rc::clone(&l);
            b.subscribe(EventName::IframeReady, move |_| l.set(l.get() + 1));
        });
        bus.emit(&DomainEvent::IframeReady);
        assert_eq!(late.get(), 0);
        bus.emit(&DomainEvent::IframeReady);
        assert_eq!(late.get(), 1);
    }

    #[test]
    fn listener_removed_during_dispatch_still_runs_in_that_dispatch() {
        let bus = EventBus::new();
        let (hits, victim) = counter(&bus, EventName::IframeReady);
        let b = bus.clone();
        // registered after the victim, so it runs second
        bus.subscribe(EventName::IframeReady, move |_| {
            b.off(EventName::IframeReady, &victim);
        });
        bus.emit(&DomainEvent::IframeReady);
        assert_eq!(hits.get(), 1);
        bus.emit(&DomainEvent::IframeReady);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn once_is_unregistered_before_a_panicking_callback() {
        let bus = EventBus::new();
        bus.once(EventName::IframeReady, |_| panic!("listener failure"));
        let b = bus.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            b.emit(&DomainEvent::IframeReady);
        }));
        assert!(result.is_err());
        assert_eq!(bus.listener_count(EventName::IframeReady), 0);
    }

    #[test]
    fn cancelled_once_never_fires() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let handle = bus.once(EventName::IframeReady, move |_| h.set(h.get() + 1));
        bus.off(EventName::IframeReady, &handle);
        bus.emit(&DomainEvent::IframeReady);
        assert_eq!(hits.get(), 0);
    }
}
