//! Synchronous observer registry.
//!
//! Listeners are called in subscription order on the thread that caused the
//! change, before the mutating call returns. The registry lock is released
//! before listeners run, so a listener may read from (or even mutate) the
//! object it observes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registry<E> {
    next_id: u64,
    listeners: Vec<(u64, Listener<E>)>,
}

/// A set of listeners for events of type `E`.
pub(crate) struct Observers<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E: 'static> Observers<E> {
    pub(crate) fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register a listener. It stays registered while the returned
    /// [`Subscription`] is alive.
    pub(crate) fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, Arc::new(listener)));
            id
        };

        let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.registry);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    lock(&registry).listeners.retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    /// Call every current listener with `event`.
    pub(crate) fn notify(&self, event: &E) {
        let listeners: Vec<Listener<E>> = lock(&self.registry)
            .listeners
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.registry).listeners.len()
    }
}

fn lock<E>(registry: &Mutex<Registry<E>>) -> MutexGuard<'_, Registry<E>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle keeping a listener registered.
///
/// Dropping it (or calling [`unsubscribe`](Self::unsubscribe)) detaches the
/// listener. Use [`forget`](Self::forget) to keep it for the lifetime of the
/// observed object.
#[must_use = "dropping a Subscription immediately detaches the listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Detach the listener now.
    pub fn unsubscribe(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }

    /// Keep the listener registered for as long as the observed object lives.
    pub fn forget(mut self) {
        self.detach = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_notify_reaches_all_listeners_in_order() {
        let observers: Observers<u32> = Observers::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let a = {
            let seen = Arc::clone(&seen);
            observers.subscribe(move |e: &u32| seen.lock().unwrap().push(("a", *e)))
        };
        let b = {
            let seen = Arc::clone(&seen);
            observers.subscribe(move |e: &u32| seen.lock().unwrap().push(("b", *e)))
        };

        observers.notify(&7);
        assert_eq!(*seen.lock().unwrap(), vec![("a", 7), ("b", 7)]);
        drop((a, b));
    }

    #[test]
    fn test_drop_detaches() {
        let observers: Observers<()> = Observers::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let sub = {
            let hits = Arc::clone(&hits);
            observers.subscribe(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };
        observers.notify(&());
        drop(sub);
        observers.notify(&());

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(observers.len(), 0);
    }

    #[test]
    fn test_unsubscribe_and_forget() {
        let observers: Observers<()> = Observers::new();
        observers.subscribe(|_| {}).unsubscribe();
        assert_eq!(observers.len(), 0);

        observers.subscribe(|_| {}).forget();
        assert_eq!(observers.len(), 1);
    }

    #[test]
    fn test_subscription_outlives_registry() {
        let observers: Observers<()> = Observers::new();
        let sub = observers.subscribe(|_| {});
        drop(observers);
        drop(sub);
    }

    #[test]
    fn test_listener_can_subscribe_during_notify() {
        let observers: Arc<Observers<()>> = Arc::new(Observers::new());
        let inner = Arc::clone(&observers);
        observers
            .subscribe(move |_| inner.subscribe(|_| {}).forget())
            .forget();

        observers.notify(&());
        assert_eq!(observers.len(), 2);
    }
}
