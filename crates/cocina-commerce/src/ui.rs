//! Cart drawer visibility.
//!
//! [`CartUi`] owns whether the cart summary is on screen. It knows nothing
//! about cart contents; the presentation layer decides when to open it.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::observer::{Observers, Subscription};

/// Default badge ceiling; larger counts render as `"99+"`.
pub const DEFAULT_BADGE_CAP: i64 = 99;

/// Drawer visibility change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawerChange {
    /// Visibility after the change.
    pub is_open: bool,
}

/// Open/closed state of the cart drawer. Starts closed.
pub struct CartUi {
    open: AtomicBool,
    observers: Observers<DrawerChange>,
}

impl CartUi {
    /// Create a closed drawer.
    pub fn new() -> Self {
        Self {
            open: AtomicBool::new(false),
            observers: Observers::new(),
        }
    }

    /// Show the drawer. Opening an open drawer does nothing.
    pub fn open(&self) {
        self.set(true);
    }

    /// Hide the drawer. Closing a closed drawer does nothing.
    pub fn close(&self) {
        self.set(false);
    }

    /// Flip visibility. Returns the new state.
    pub fn toggle(&self) -> bool {
        let is_open = !self.open.fetch_xor(true, Ordering::SeqCst);
        self.changed(is_open);
        is_open
    }

    /// Whether the drawer is showing.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Listen for visibility changes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&DrawerChange) + Send + Sync + 'static,
    {
        self.observers.subscribe(listener)
    }

    fn set(&self, is_open: bool) {
        if self.open.swap(is_open, Ordering::SeqCst) != is_open {
            self.changed(is_open);
        }
    }

    fn changed(&self, is_open: bool) {
        tracing::debug!(is_open, "cart drawer toggled");
        self.observers.notify(&DrawerChange { is_open });
    }
}

impl Default for CartUi {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CartUi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartUi")
            .field("is_open", &self.is_open())
            .finish()
    }
}

/// Label for the header cart badge.
///
/// `None` hides the badge (empty cart); counts above `cap` show as `"{cap}+"`.
/// A `cap` below 1 is treated as 1.
pub fn badge_label(total_items: i64, cap: i64) -> Option<String> {
    let cap = cap.max(1);
    if total_items <= 0 {
        return None;
    }
    if total_items > cap {
        return Some(format!("{}+", cap));
    }
    Some(total_items.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_starts_closed() {
        assert!(!CartUi::new().is_open());
    }

    #[test]
    fn test_open_close_toggle_scenario() {
        let ui = CartUi::new();
        ui.open();
        ui.close();
        ui.toggle();
        assert!(ui.is_open());
    }

    #[test]
    fn test_open_and_close_are_idempotent() {
        let ui = CartUi::new();
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        let _sub = ui.subscribe(move |c: &DrawerChange| sink.lock().unwrap().push(c.is_open));

        ui.open();
        ui.open();
        ui.close();
        ui.close();

        assert_eq!(*changes.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn test_toggle_always_notifies() {
        let ui = CartUi::new();
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        let _sub = ui.subscribe(move |c: &DrawerChange| sink.lock().unwrap().push(c.is_open));

        assert!(ui.toggle());
        assert!(!ui.toggle());
        assert_eq!(*changes.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn test_badge_label() {
        assert_eq!(badge_label(0, DEFAULT_BADGE_CAP), None);
        assert_eq!(badge_label(7, DEFAULT_BADGE_CAP).as_deref(), Some("7"));
        assert_eq!(badge_label(99, DEFAULT_BADGE_CAP).as_deref(), Some("99"));
        assert_eq!(badge_label(100, DEFAULT_BADGE_CAP).as_deref(), Some("99+"));
    }

    #[test]
    fn test_badge_label_with_non_positive_cap() {
        assert_eq!(badge_label(5, 0).as_deref(), Some("1+"));
        assert_eq!(badge_label(5, -1).as_deref(), Some("1+"));
        assert_eq!(badge_label(1, 0).as_deref(), Some("1"));
        assert_eq!(badge_label(0, -1), None);
    }
}
