//! URL event fan-out.
//!
//! # Data Flow
//! ```text
//! URL source (CLI args, stdin, OS "open URL" events)
//!     → UrlEventHub::publish(url)
//!     → every live listener (typically a RouteRegistry)
//!     → RouteRegistry::route_url → dispatch
//! ```
//!
//! # Design Decisions
//! - Listeners are held weakly; dropping a registry unsubscribes it
//! - Dead listeners are pruned on publish
//! - The hub is an ordinary value, not a process-wide singleton

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Receives URLs published on a hub.
pub trait UrlEventListener: Send + Sync {
    fn handle_url(&self, url: &str);
}

/// Broadcasts URL strings to registered listeners.
#[derive(Default)]
pub struct UrlEventHub {
    listeners: Mutex<Vec<Weak<dyn UrlEventListener>>>,
}

impl UrlEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener. The hub keeps only a weak reference.
    pub fn add_listener<L: UrlEventListener + 'static>(&self, listener: &Arc<L>) {
        let listener: Arc<dyn UrlEventListener> = listener.clone();
        self.lock().push(Arc::downgrade(&listener));
    }

    /// Unsubscribe a listener. Returns false if it was not subscribed.
    pub fn remove_listener<L: UrlEventListener + 'static>(&self, listener: &Arc<L>) -> bool {
        let target = Arc::as_ptr(listener) as *const ();
        let mut listeners = self.lock();
        match listeners
            .iter()
            .position(|w| w.as_ptr() as *const () == target)
        {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of listeners still alive.
    pub fn listener_count(&self) -> usize {
        self.lock().iter().filter(|w| w.strong_count() > 0).count()
    }

    /// Deliver `url` to every live listener and return how many received it.
    ///
    /// Listeners run outside the hub's lock and may subscribe or unsubscribe.
    pub fn publish(&self, url: &str) -> usize {
        let live: Vec<Arc<dyn UrlEventListener>> = {
            let mut listeners = self.lock();
            listeners.retain(|w| w.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };

        tracing::trace!(url, listeners = live.len(), "Publishing URL event");
        for listener in &live {
            listener.handle_url(url);
        }
        live.len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Weak<dyn UrlEventListener>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{RouteRegistry, RoutingRequest};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl UrlEventListener for Recorder {
        fn handle_url(&self, url: &str) {
            self.seen.lock().unwrap().push(url.to_string());
        }
    }

    #[test]
    fn test_publish_reaches_all_listeners() {
        let hub = UrlEventHub::new();
        let a = Arc::new(Recorder::default());
        let b = Arc::new(Recorder::default());
        hub.add_listener(&a);
        hub.add_listener(&b);

        assert_eq!(hub.publish("app://x"), 2);
        assert_eq!(*a.seen.lock().unwrap(), vec!["app://x"]);
        assert_eq!(*b.seen.lock().unwrap(), vec!["app://x"]);
    }

    #[test]
    fn test_dropped_listener_is_skipped() {
        let hub = UrlEventHub::new();
        let kept = Arc::new(Recorder::default());
        hub.add_listener(&kept);
        {
            let dropped = Arc::new(Recorder::default());
            hub.add_listener(&dropped);
            assert_eq!(hub.listener_count(), 2);
        }
        assert_eq!(hub.listener_count(), 1);
        assert_eq!(hub.publish("app://y"), 1);
    }

    #[test]
    fn test_remove_listener() {
        let hub = UrlEventHub::new();
        let a = Arc::new(Recorder::default());
        hub.add_listener(&a);
        assert!(hub.remove_listener(&a));
        assert!(!hub.remove_listener(&a));
        assert_eq!(hub.publish("app://z"), 0);
        assert!(a.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_multiple_registries() {
        let hub = UrlEventHub::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let r1 = Arc::new(RouteRegistry::default());
        let r2 = Arc::new(RouteRegistry::default());
        for registry in [&r1, &r2] {
            let hits = hits.clone();
            registry
                .register("/test", move |_: &RoutingRequest| {
                    hits.fetch_add(1, Ordering::SeqCst);
                    true
                })
                .unwrap();
            hub.add_listener(registry);
        }

        let called_dropped = Arc::new(AtomicBool::new(false));
        {
            let r3 = Arc::new(RouteRegistry::default());
            let flag = called_dropped.clone();
            r3.register("/test", move |_: &RoutingRequest| {
                flag.store(true, Ordering::SeqCst);
                true
            })
            .unwrap();
            hub.add_listener(&r3);
        }

        assert_eq!(hub.publish("scheme://test"), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(!called_dropped.load(Ordering::SeqCst));
    }
}
