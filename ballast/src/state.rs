//! The single current-state cell.

use parking_lot::Mutex;
use tokio::sync::watch;

/// Holds the one current State of a ViewModel.
///
/// Readers take a cheap clone of the latest value. Writers are serialized by
/// a lock, so every update observes the value it replaces and the sequence of
/// published values is total. Subscribers see updates through a
/// [`watch::Receiver`].
pub(crate) struct StateCell<S> {
    write: Mutex<()>,
    current: watch::Sender<S>,
}

impl<S: Clone + Send + Sync> StateCell<S> {
    pub(crate) fn new(initial: S) -> Self {
        Self {
            write: Mutex::new(()),
            current: watch::Sender::new(initial),
        }
    }

    pub(crate) fn get(&self) -> S {
        self.current.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<S> {
        self.current.subscribe()
    }

    /// Replace the state with `f(previous)`.
    ///
    /// `published` runs before the write lock is released, so anything it
    /// records is ordered exactly like the updates themselves. Returns the
    /// previous and the new value.
    pub(crate) fn update(&self, f: impl FnOnce(S) -> S, published: impl FnOnce(&S)) -> (S, S) {
        let _write = self.write.lock();
        let previous = self.get();
        let next = f(previous.clone());
        self.current.send_replace(next.clone());
        published(&next);
        (previous, next)
    }
}
