//! Single-writer, multi-reader observable cells.
//!
//! # Responsibility
//! - Hold the latest value of one piece of presentation-facing state.
//! - Let readers poll a revision counter or subscribe to changes.
//!
//! # Invariants
//! - Every `set` replaces the value, bumps the revision by one and notifies
//!   all current subscribers with the new value; no intermediate values are
//!   queued.
//! - Only core code writes (`set` is crate-private); subscribing needs `&self`.
//! - Callbacks run synchronously on the writer and must not re-enter the
//!   engine.

use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Handle returned by [`Observable::subscribe`].
pub type SubscriptionId = u64;

type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;

pub struct Observable<T> {
    value: T,
    revision: u64,
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(SubscriptionId, Callback<T>)>>,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            revision: 0,
            next_id: AtomicU64::new(1),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Number of writes since creation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Registers `callback` to run after every subsequent write.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Box::new(callback)));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    pub(crate) fn set(&mut self, value: T) {
        self.value = value;
        self.revision += 1;
        let subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, callback) in subscribers.iter() {
            callback(&self.value);
        }
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Debug> Debug for Observable<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}
