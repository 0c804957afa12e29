//! Observable state containers.
//!
//! The presentation layer renders whatever these containers hold and
//! reacts to broadcasts; it never reaches into the services directly for
//! state. Built on `tokio::sync::watch`, so a subscriber always observes
//! the latest value even if it missed intermediate updates.

use tokio::sync::watch;

/// A single observable value with update-and-broadcast semantics.
///
/// `set` stores the new value and wakes every live subscriber. Dropping
/// the observable (with its owning controller) closes all subscriptions.
#[derive(Debug)]
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> Observable<T> {
    /// Create an observable holding `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            tx: watch::Sender::new(initial),
        }
    }

    /// Snapshot of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Store `value` and broadcast to all subscribers.
    pub fn set(&self, value: T) {
        // send_replace delivers even when no subscriber is listening.
        let _ = self.tx.send_replace(value);
    }

    /// Subscribe to updates. The receiver sees the current value
    /// immediately and every later `set`.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_latest_value() {
        let obs = Observable::new(0);
        obs.set(7);
        assert_eq!(obs.get(), 7);
    }

    #[tokio::test]
    async fn test_subscriber_sees_broadcasts() {
        let obs = Observable::new("initial".to_string());
        let mut rx = obs.subscribe();
        assert_eq!(*rx.borrow_and_update(), "initial");

        obs.set("updated".to_string());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "updated");
    }

    #[tokio::test]
    async fn test_subscription_closes_on_drop() {
        let obs = Observable::new(1);
        let mut rx = obs.subscribe();
        drop(obs);
        assert!(rx.changed().await.is_err());
    }
}
