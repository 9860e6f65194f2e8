use std::fmt;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Box<dyn FnMut(&E)>;

/// A typed publish/subscribe bus owned by a single session.
///
/// Listeners run synchronously, in subscription order, on the thread that
/// publishes. There is no process-wide instance: whoever owns the session
/// owns its bus.
pub struct EventBus<E> {
    listeners: Vec<(ListenerId, Listener<E>)>,
    next_id: u64,
    published: u64,
}

impl<E> EventBus<E> {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
            published: 0,
        }
    }

    /// Register a listener. It receives every event published afterwards.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&E) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Deliver an event to every listener.
    pub fn publish(&mut self, event: &E) {
        self.published += 1;
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Total number of events published so far.
    pub fn published(&self) -> u64 {
        self.published
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("published", &self.published)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn listeners_receive_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus: EventBus<u32> = EventBus::new();

        let first = Rc::clone(&seen);
        bus.subscribe(move |e| first.borrow_mut().push(("first", *e)));
        let second = Rc::clone(&seen);
        bus.subscribe(move |e| second.borrow_mut().push(("second", *e)));

        bus.publish(&7);
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
        assert_eq!(bus.published(), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut bus: EventBus<&str> = EventBus::default();
        let c = Rc::clone(&count);
        let id = bus.subscribe(move |_| *c.borrow_mut() += 1);

        bus.publish(&"a");
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&"b");

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.listener_count(), 0);
        assert_eq!(bus.published(), 2);
    }

    #[test]
    fn debug_does_not_require_debug_events() {
        struct Opaque;
        let bus: EventBus<Opaque> = EventBus::new();
        assert_eq!(format!("{bus:?}"), "EventBus { listeners: 0, published: 0 }");
    }
}
