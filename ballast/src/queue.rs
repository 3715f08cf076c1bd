//! Bounded, backpressured delivery from many producers to one consumer.
//!
//! Inputs and Events are funnelled through [`BoundedQueue`]. What happens when
//! the queue is full depends on its [`BufferOverflow`] policy: producers either
//! wait for room, or the oldest queued value is discarded to make room.

use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;

/// Default capacity for input and event queues.
pub const DEFAULT_BUFFER_CAPACITY: usize = 64;

/// What a full queue does with a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferOverflow {
    /// The producer waits until the consumer makes room.
    #[default]
    Suspend,
    /// The oldest queued value is discarded; producers never wait.
    DropOldest,
}

/// Why a value could not be queued.
#[derive(Debug, PartialEq, Eq)]
pub enum QueueError<T> {
    /// The queue has been closed.
    Closed(T),
    /// The queue is full and the caller did not want to wait.
    Full(T),
}

/// The result of a successful enqueue.
#[derive(Debug, PartialEq, Eq)]
pub enum Enqueued<T> {
    /// The value was appended.
    Accepted,
    /// The value was appended after discarding the oldest queued value.
    Replaced(T),
}

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// A bounded multi-producer, single-consumer queue.
pub struct BoundedQueue<T> {
    state: Mutex<QueueState<T>>,
    capacity: usize,
    overflow: BufferOverflow,
    readable: Notify,
    writable: Notify,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` values (minimum 1).
    pub fn new(capacity: usize, overflow: BufferOverflow) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            capacity,
            overflow,
            readable: Notify::new(),
            writable: Notify::new(),
        }
    }

    /// The configured overflow policy.
    pub fn overflow(&self) -> BufferOverflow {
        self.overflow
    }

    /// Number of values currently queued.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Whether the queue currently holds no values.
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Whether the queue has been closed to producers.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Enqueue a value, waiting for room under [`BufferOverflow::Suspend`].
    pub async fn send(&self, item: T) -> Result<Enqueued<T>, QueueError<T>> {
        self.send_with(item, |_, _| {}).await
    }

    /// Like [`send`](Self::send), calling `on_enqueue` under the queue lock
    /// with the new value and the value it displaced, if any.
    ///
    /// Because the consumer pops under the same lock, anything `on_enqueue`
    /// records is ordered before anything the consumer records for that value.
    pub async fn send_with(
        &self,
        item: T,
        mut on_enqueue: impl FnMut(&T, Option<&T>),
    ) -> Result<Enqueued<T>, QueueError<T>> {
        let mut item = item;
        loop {
            // Register interest before checking, so a `recv` that runs between
            // the check and the await still wakes us.
            let writable = self.writable.notified();
            tokio::pin!(writable);
            writable.as_mut().enable();

            match self.try_send_with(item, &mut on_enqueue) {
                Err(QueueError::Full(rejected)) => item = rejected,
                outcome => return outcome,
            }

            writable.await;
        }
    }

    /// Enqueue a value without waiting.
    ///
    /// Under [`BufferOverflow::DropOldest`] this never reports `Full`.
    pub fn try_send(&self, item: T) -> Result<Enqueued<T>, QueueError<T>> {
        self.try_send_with(item, |_, _| {})
    }

    /// Like [`try_send`](Self::try_send), with an `on_enqueue` observer.
    pub fn try_send_with(
        &self,
        item: T,
        mut on_enqueue: impl FnMut(&T, Option<&T>),
    ) -> Result<Enqueued<T>, QueueError<T>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(QueueError::Closed(item));
        }

        let dropped = if state.items.len() < self.capacity {
            None
        } else {
            match self.overflow {
                BufferOverflow::Suspend => return Err(QueueError::Full(item)),
                BufferOverflow::DropOldest => state.items.pop_front(),
            }
        };
        on_enqueue(&item, dropped.as_ref());
        state.items.push_back(item);
        drop(state);

        self.readable.notify_one();
        Ok(match dropped {
            Some(dropped) => Enqueued::Replaced(dropped),
            None => Enqueued::Accepted,
        })
    }

    /// Take the next value, waiting until one arrives.
    ///
    /// Returns `None` once the queue is closed and empty.
    pub async fn recv(&self) -> Option<T> {
        loop {
            let readable = self.readable.notified();
            tokio::pin!(readable);
            readable.as_mut().enable();

            {
                let mut state = self.state.lock();
                if let Some(item) = state.items.pop_front() {
                    drop(state);
                    self.writable.notify_one();
                    return Some(item);
                }
                if state.closed {
                    return None;
                }
            }

            readable.await;
        }
    }

    /// Close the queue. Already-queued values can still be received.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.readable.notify_waiters();
        self.writable.notify_waiters();
    }

    /// Append a final value, ignoring capacity, and close the queue in one step.
    ///
    /// Returns the value back if the queue was already closed.
    pub fn close_with(&self, last: T) -> Result<(), T> {
        {
            let mut state = self.state.lock();
            if state.closed {
                return Err(last);
            }
            state.items.push_back(last);
            state.closed = true;
        }
        self.readable.notify_one();
        self.writable.notify_waiters();
        Ok(())
    }

    /// Remove and return everything still queued.
    pub fn drain(&self) -> Vec<T> {
        let drained: Vec<T> = self.state.lock().items.drain(..).collect();
        self.writable.notify_waiters();
        drained
    }
}
