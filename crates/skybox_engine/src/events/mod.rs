//! Frame event registry
//!
//! Observer registration for per-frame notifications such as a scene's
//! "before render" point. Key properties:
//! - `subscribe` hands back a [`ListenerToken`]; the same token is the only way
//!   to unsubscribe, so a listener can never be removed twice by accident
//! - Listeners are invoked synchronously, in subscription order
//! - Dispatch works on a snapshot, so a listener may unsubscribe itself (or
//!   others) while the event is being emitted

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::foundation::collections::{ListenerKey, SlotMap};
use crate::render::{Camera, Renderer};
use crate::scene::RenderNotifier;

/// Listener signature for "before render" notifications
///
/// Receives the renderer about to draw the frame, the scene being rendered
/// and the camera it is rendered from.
pub type BeforeRenderListener = dyn FnMut(&mut dyn Renderer, &dyn RenderNotifier, &Camera);

type SharedListener = Rc<RefCell<Box<BeforeRenderListener>>>;

/// Cancellation token returned by [`FrameEvent::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(ListenerKey);

/// Synchronous, single-threaded frame notification point
pub struct FrameEvent {
    name: &'static str,
    listeners: RefCell<SlotMap<ListenerKey, SharedListener>>,
    order: RefCell<Vec<ListenerKey>>,
}

impl FrameEvent {
    /// Create an event with no listeners
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            listeners: RefCell::new(SlotMap::with_key()),
            order: RefCell::new(Vec::new()),
        }
    }

    /// Event name, used in log output
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register a listener, returning the token needed to remove it
    pub fn subscribe<F>(&self, listener: F) -> ListenerToken
    where
        F: FnMut(&mut dyn Renderer, &dyn RenderNotifier, &Camera) + 'static,
    {
        let boxed: Box<BeforeRenderListener> = Box::new(listener);
        let key = self.listeners.borrow_mut().insert(Rc::new(RefCell::new(boxed)));
        self.order.borrow_mut().push(key);
        log::debug!("'{}': listener subscribed ({} total)", self.name, self.listener_count());
        ListenerToken(key)
    }

    /// Remove the listener registered under `token`
    ///
    /// Returns `false` if the token was already used or never belonged to this
    /// event.
    pub fn unsubscribe(&self, token: ListenerToken) -> bool {
        let removed = self.listeners.borrow_mut().remove(token.0).is_some();
        if removed {
            self.order.borrow_mut().retain(|key| *key != token.0);
            log::debug!("'{}': listener unsubscribed ({} left)", self.name, self.listener_count());
        }
        removed
    }

    /// Whether `token` still refers to a live listener
    pub fn is_subscribed(&self, token: ListenerToken) -> bool {
        self.listeners.borrow().contains_key(token.0)
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Invoke every listener with the frame arguments
    ///
    /// Returns the number of listeners that ran.
    pub fn emit(&self, renderer: &mut dyn Renderer, scene: &dyn RenderNotifier, camera: &Camera) -> usize {
        let snapshot: Vec<ListenerKey> = self.order.borrow().clone();
        let mut invoked = 0;

        for key in snapshot {
            // Removed by an earlier listener during this dispatch
            let Some(listener) = self.listeners.borrow().get(key).cloned() else {
                continue;
            };

            let Ok(mut callback) = listener.try_borrow_mut() else {
                log::warn!("'{}': skipping re-entrant listener invocation", self.name);
                continue;
            };
            (*callback)(&mut *renderer, scene, camera);
            invoked += 1;
        }

        invoked
    }
}

impl fmt::Debug for FrameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameEvent")
            .field("name", &self.name)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessRenderer;
    use crate::scene::Scene;
    use std::cell::Cell;

    fn emit_once(event: &FrameEvent) -> usize {
        let scene = Scene::new("events");
        let mut renderer = HeadlessRenderer::headless();
        event.emit(&mut renderer, &scene, &Camera::default())
    }

    #[test]
    fn test_subscribe_and_emit() {
        let event = FrameEvent::new("beforerender");
        let hits = Rc::new(Cell::new(0));

        let counter = Rc::clone(&hits);
        let token = event.subscribe(move |_, _, _| counter.set(counter.get() + 1));

        assert!(event.is_subscribed(token));
        assert_eq!(emit_once(&event), 1);
        assert_eq!(emit_once(&event), 1);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_unsubscribe_is_token_exact() {
        let event = FrameEvent::new("beforerender");
        let token = event.subscribe(|_, _, _| {});

        assert!(event.unsubscribe(token));
        assert!(!event.unsubscribe(token));
        assert_eq!(event.listener_count(), 0);
        assert_eq!(emit_once(&event), 0);
    }

    #[test]
    fn test_listeners_run_in_subscription_order() {
        let event = FrameEvent::new("beforerender");
        let calls = Rc::new(RefCell::new(Vec::new()));

        let first = event.subscribe({
            let calls = Rc::clone(&calls);
            move |_, _, _| calls.borrow_mut().push("first")
        });
        event.subscribe({
            let calls = Rc::clone(&calls);
            move |_, _, _| calls.borrow_mut().push("second")
        });
        // Reuses the freed slot but must still run last
        event.unsubscribe(first);
        event.subscribe({
            let calls = Rc::clone(&calls);
            move |_, _, _| calls.borrow_mut().push("third")
        });

        emit_once(&event);
        assert_eq!(*calls.borrow(), vec!["second", "third"]);
    }

    #[test]
    fn test_listener_can_unsubscribe_during_emit() {
        let event = Rc::new(FrameEvent::new("beforerender"));
        let own_token: Rc<Cell<Option<ListenerToken>>> = Rc::new(Cell::new(None));

        let token = event.subscribe({
            let event = Rc::downgrade(&event);
            let own_token = Rc::clone(&own_token);
            move |_, _, _| {
                if let (Some(event), Some(token)) = (event.upgrade(), own_token.get()) {
                    event.unsubscribe(token);
                }
            }
        });
        own_token.set(Some(token));

        assert_eq!(emit_once(&event), 1);
        assert_eq!(event.listener_count(), 0);
        assert_eq!(emit_once(&event), 0);
    }
}
