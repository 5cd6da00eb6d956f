//! Observable state cells handed to the presentation layer.
//!
//! A [`StateHolder`] caches the last value pushed into it and notifies its
//! observers, in registration order, whenever a `set` changes the value.
//! Setting a value equal to the current one is a no-op.
//!
//! Observers run synchronously on the thread that called `set`. Concurrent
//! `set`s are serialized, so observers see values in the order they were
//! stored. An observer may call `read` but must not call `set` on the same
//! holder.

use arc_swap::ArcSwap;
use std::sync::{
    Arc, Mutex, Weak,
    atomic::{AtomicU64, Ordering},
};

type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: Mutex<T>,
    /// Held for the whole store-then-notify sequence of a `set`.
    notify: Mutex<()>,
    observers: ArcSwap<Vec<(u64, Observer<T>)>>,
    next_id: AtomicU64,
}

/// A single-value observable cell.
///
/// Cloning a StateHolder yields another handle to the same cell.
pub struct StateHolder<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for StateHolder<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> std::fmt::Debug for StateHolder<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateHolder")
            .field("value", &*self.inner.value.lock().unwrap())
            .field("observers", &self.inner.observers.load().len())
            .finish()
    }
}

impl<T> StateHolder<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                value: Mutex::new(value),
                notify: Mutex::new(()),
                observers: ArcSwap::from_pointee(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Returns the current value.
    pub fn read(&self) -> T {
        self.inner.value.lock().unwrap().clone()
    }

    /// Replaces the value and notifies observers if it changed.
    pub fn set(&self, value: T) {
        let _notify = self.inner.notify.lock().unwrap();

        {
            let mut current = self.inner.value.lock().unwrap();
            if *current == value {
                return;
            }
            *current = value.clone();
        }

        for (_, observer) in self.inner.observers.load().iter() {
            observer(&value);
        }
    }

    /// Registers an observer called with each new value.
    ///
    /// The observer stays registered until the returned [`Subscription`] is
    /// dropped. It is not called with the current value; use [`Self::read`].
    pub fn subscribe<F>(&self, observer: F) -> Subscription<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let observer: Observer<T> = Arc::new(observer);

        self.inner.observers.rcu(|observers| {
            let mut observers = Vec::clone(observers);
            observers.push((id, observer.clone()));
            observers
        });

        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Returns a handle that can observe this cell but not write to it.
    pub fn read_only(&self) -> ReadState<T> {
        ReadState {
            holder: self.clone(),
        }
    }

    #[cfg(test)]
    fn observer_count(&self) -> usize {
        self.inner.observers.load().len()
    }
}

/// Read-only view of a [`StateHolder`].
pub struct ReadState<T> {
    holder: StateHolder<T>,
}

impl<T> Clone for ReadState<T> {
    fn clone(&self) -> Self {
        Self {
            holder: self.holder.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ReadState<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ReadState").field(&self.holder).finish()
    }
}

impl<T> ReadState<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn read(&self) -> T {
        self.holder.read()
    }

    pub fn subscribe<F>(&self, observer: F) -> Subscription<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.holder.subscribe(observer)
    }
}

/// Guard returned by `subscribe`. Dropping it unregisters the observer.
#[must_use = "dropping a Subscription unregisters the observer"]
pub struct Subscription<T> {
    id: u64,
    inner: Weak<Inner<T>>,
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };

        let id = self.id;
        inner.observers.rcu(|observers| {
            observers
                .iter()
                .filter(|(other, _)| *other != id)
                .cloned()
                .collect::<Vec<_>>()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn recorder(holder: &StateHolder<i32>) -> (Subscription<i32>, Arc<Mutex<Vec<i32>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let subscription = holder.subscribe({
            let seen = seen.clone();
            move |value| seen.lock().unwrap().push(*value)
        });
        (subscription, seen)
    }

    #[test]
    fn read_returns_initial_value() {
        let holder = StateHolder::new(7);
        assert_eq!(holder.read(), 7);
    }

    #[test]
    fn set_notifies_on_change() {
        let holder = StateHolder::new(0);
        let (_sub, seen) = recorder(&holder);

        holder.set(1);
        holder.set(2);

        assert_eq!(holder.read(), 2);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn set_with_equal_value_is_silent() {
        let holder = StateHolder::new(5);
        let (_sub, seen) = recorder(&holder);

        holder.set(5);

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn observers_notified_in_registration_order() {
        let holder = StateHolder::new(0);
        let order = Arc::new(Mutex::new(Vec::new()));

        let _first = holder.subscribe({
            let order = order.clone();
            move |_| order.lock().unwrap().push("first")
        });
        let _second = holder.subscribe({
            let order = order.clone();
            move |_| order.lock().unwrap().push("second")
        });

        holder.set(1);

        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let holder = StateHolder::new(0);
        let (sub, seen) = recorder(&holder);
        let (_other, _) = recorder(&holder);

        holder.set(1);
        drop(sub);
        holder.set(2);

        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert_eq!(holder.observer_count(), 1);
    }

    #[test]
    fn subscription_outliving_holder_drops_cleanly() {
        let holder = StateHolder::new(0);
        let (sub, _) = recorder(&holder);
        drop(holder);
        drop(sub);
    }

    #[test]
    fn observer_can_read_inside_callback() {
        let holder = StateHolder::new(0);
        let (tx, rx) = mpsc::channel();

        let _sub = holder.subscribe({
            let holder = holder.read_only();
            move |value| tx.send((*value, holder.read())).unwrap()
        });

        holder.set(3);

        assert_eq!(rx.recv().unwrap(), (3, 3));
    }

    #[test]
    fn late_observer_reads_last_value() {
        let holder = StateHolder::new(0);
        holder.set(1);
        holder.set(2);

        let (_sub, seen) = recorder(&holder);

        assert_eq!(holder.read_only().read(), 2);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn set_from_other_thread_notifies() {
        let holder = StateHolder::new(0);
        let (tx, rx) = mpsc::channel();
        let _sub = holder.subscribe(move |value| tx.send(*value).unwrap());

        std::thread::spawn({
            let holder = holder.clone();
            move || {
                for i in 1..=100 {
                    holder.set(i);
                }
            }
        })
        .join()
        .unwrap();

        let seen = rx.try_iter().collect::<Vec<_>>();
        assert_eq!(seen, (1..=100).collect::<Vec<_>>());
        assert_eq!(holder.read(), 100);
    }
}
