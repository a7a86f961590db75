//! Lock-free single-producer single-consumer queue.
//!
//! Backs the event queue. One slot stays empty so that `head == tail`
//! unambiguously means "empty", giving `N - 1` usable slots.
//!
//! The two roles are enforced in one of two ways:
//!
//! - [`SpscQueue::split`] hands out one [`Producer`] and one [`Consumer`].
//!   Each takes `&mut self`, so safe code cannot run two pushes (or two
//!   pops) at once.
//! - [`SpscQueue::enqueue`] and [`SpscQueue::dequeue`] work on a shared
//!   `&self` (e.g. a `static`) and are `unsafe`: the caller serializes each
//!   role itself, typically with a critical section.

use core::cell::{Cell, UnsafeCell};
use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Fixed-capacity SPSC ring of `T`.
pub struct SpscQueue<T, const N: usize> {
    slots: [UnsafeCell<MaybeUninit<T>>; N],
    /// Next slot the producer fills.
    head: AtomicUsize,
    /// Next slot the consumer drains.
    tail: AtomicUsize,
}

// SAFETY: a slot is written only by the producer while it lies outside
// `tail..head`, and read only by the consumer while it lies inside. The
// Release store of `head` (resp. `tail`) publishes the slot to the other
// side. Producer and consumer uniqueness is upheld by `split` borrowing
// the queue mutably, or by the callers of the unsafe `enqueue`/`dequeue`.
unsafe impl<T: Send, const N: usize> Sync for SpscQueue<T, N> {}

impl<T, const N: usize> SpscQueue<T, N> {
    pub const fn new() -> Self {
        const { assert!(N >= 2, "an SPSC queue needs at least one usable slot") };
        SpscQueue {
            slots: [const { UnsafeCell::new(MaybeUninit::uninit()) }; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Usable capacity.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Split into the two role handles. The queue stays borrowed until
    /// both are dropped.
    pub fn split(&mut self) -> (Producer<'_, T, N>, Consumer<'_, T, N>) {
        let queue: &Self = self;
        (
            Producer {
                queue,
                _unsync: PhantomData,
            },
            Consumer {
                queue,
                _unsync: PhantomData,
            },
        )
    }

    /// Enqueue `item`, handing it back if the queue is full.
    ///
    /// # Safety
    ///
    /// No other `enqueue` (or [`Producer::push`]) on this queue may run
    /// concurrently.
    pub unsafe fn enqueue(&self, item: T) -> Result<(), T> {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) % N;
        if next == self.tail.load(Ordering::Acquire) {
            return Err(item);
        }
        // SAFETY: the caller guarantees a sole producer; `next != tail`
        // means the consumer is not reading this slot.
        unsafe { (*self.slots[head].get()).write(item) };
        self.head.store(next, Ordering::Release);
        Ok(())
    }

    /// Dequeue the oldest item.
    ///
    /// # Safety
    ///
    /// No other `dequeue` (or [`Consumer::pop`]) on this queue may run
    /// concurrently.
    pub unsafe fn dequeue(&self) -> Option<T> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: the caller guarantees a sole consumer; `tail != head`
        // means the producer finished this slot before its Release store.
        let item = unsafe { (*self.slots[tail].get()).assume_init_read() };
        self.tail.store((tail + 1) % N, Ordering::Release);
        Some(item)
    }

    /// Items currently queued. Only a hint while the other side is active.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (head + N - tail) % N
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == N - 1
    }
}

impl<T, const N: usize> Default for SpscQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Drop for SpscQueue<T, N> {
    fn drop(&mut self) {
        // SAFETY: `&mut self` excludes every other accessor.
        while unsafe { self.dequeue() }.is_some() {}
    }
}

/// The enqueuing half of a split queue. `Send` but not `Sync`.
pub struct Producer<'q, T, const N: usize> {
    queue: &'q SpscQueue<T, N>,
    _unsync: PhantomData<Cell<()>>,
}

impl<T, const N: usize> Producer<'_, T, N> {
    /// Enqueue `item`, handing it back if the queue is full.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        // SAFETY: this handle is the only producer and `&mut self`
        // serializes its calls.
        unsafe { self.queue.enqueue(item) }
    }

    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }
}

/// The dequeuing half of a split queue. `Send` but not `Sync`.
pub struct Consumer<'q, T, const N: usize> {
    queue: &'q SpscQueue<T, N>,
    _unsync: PhantomData<Cell<()>>,
}

impl<T, const N: usize> Consumer<'_, T, N> {
    /// Dequeue the oldest item.
    pub fn pop(&mut self) -> Option<T> {
        // SAFETY: this handle is the only consumer and `&mut self`
        // serializes its calls.
        unsafe { self.queue.dequeue() }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
