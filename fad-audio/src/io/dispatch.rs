//! Control events and the queue that carries them to the event task.
//!
//! Button handlers, the serial console and the wireless stack all produce
//! [`Event`]s. They never touch the pipeline directly: they
//! [`dispatch`](Dispatch::dispatch) into an [`EventQueue`] and a single
//! event task drains it, applying each event through
//! [`Transport`](crate::pipeline::Transport).
//!
//! Producers may run in any context, including interrupts. [`EventQueue`]
//! serializes them with a [`critical_section`], so the SPSC ring underneath
//! only ever sees one producer and one consumer at a time. The target must
//! link a `critical-section` implementation (e.g. `cortex-m`'s
//! `critical-section-single-core`).

use crate::config::Selection;
use crate::error::Error;
use crate::io::hardware::OutputMode;
use crate::io::spsc::SpscQueue;

/// A request to change the pipeline's run state or configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Start the sample clock.
    Start,
    /// Stop the sample clock.
    Stop,
    /// Route output to the DAC or the wireless link.
    SetOutputMode(OutputMode),
    /// Replace the active algorithm.
    ChangeAlgorithm(Selection),
}

/// Anything that accepts control events.
///
/// `dispatch` takes `&self` and may be called from several contexts at
/// once; implementations serialize concurrent producers themselves.
pub trait Dispatch {
    fn dispatch(&self, event: Event) -> Result<(), Error>;
}

/// Default slot count; one slot stays empty, leaving five usable.
pub const EVENT_QUEUE_SLOTS: usize = 6;

/// Bounded event queue, shareable as a `static`.
///
/// Any number of producers and consumers; each access holds a short
/// critical section around the SPSC push or pop.
pub struct EventQueue<const Q: usize = EVENT_QUEUE_SLOTS> {
    queue: SpscQueue<Event, Q>,
}

impl<const Q: usize> EventQueue<Q> {
    pub const fn new() -> Self {
        EventQueue {
            queue: SpscQueue::new(),
        }
    }

    /// Take the oldest pending event.
    pub fn next(&self) -> Option<Event> {
        // SAFETY: every dequeue runs inside a critical section.
        critical_section::with(|_| unsafe { self.queue.dequeue() })
    }

    /// Events waiting to be taken.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Usable slots.
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

impl<const Q: usize> Default for EventQueue<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const Q: usize> Dispatch for EventQueue<Q> {
    fn dispatch(&self, event: Event) -> Result<(), Error> {
        // SAFETY: every enqueue runs inside a critical section.
        let pushed = critical_section::with(|_| unsafe { self.queue.enqueue(event) });
        pushed.map_err(|dropped| {
            log::warn!("event queue full, dropping {:?}", dropped);
            Error::QueueFull
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AlgorithmKind, AlgorithmMode};

    #[test]
    fn default_queue_holds_five_events() {
        let q: EventQueue = EventQueue::new();
        assert_eq!(q.capacity(), 5);
        for _ in 0..5 {
            q.dispatch(Event::Start).unwrap();
        }
        assert_eq!(q.dispatch(Event::Stop), Err(Error::QueueFull));
        assert_eq!(q.pending(), 5);
    }

    #[test]
    fn events_come_out_in_dispatch_order() {
        let q: EventQueue = EventQueue::new();
        let change = Event::ChangeAlgorithm(Selection::new(
            AlgorithmKind::DelayLine,
            AlgorithmMode::Mode2,
        ));
        q.dispatch(Event::Stop).unwrap();
        q.dispatch(change).unwrap();
        q.dispatch(Event::SetOutputMode(OutputMode::Dac)).unwrap();
        q.dispatch(Event::Start).unwrap();

        assert_eq!(q.next(), Some(Event::Stop));
        assert_eq!(q.next(), Some(change));
        assert_eq!(q.next(), Some(Event::SetOutputMode(OutputMode::Dac)));
        assert_eq!(q.next(), Some(Event::Start));
        assert_eq!(q.next(), None);
    }

    #[test]
    fn concurrent_producers_lose_nothing() {
        extern crate std;
        use std::thread;

        let q: EventQueue = EventQueue::new();
        let per_producer = 2_000;
        let mut received = [0usize; 2];
        thread::scope(|s| {
            for event in [Event::Start, Event::Stop] {
                let q = &q;
                s.spawn(move || {
                    let mut sent = 0;
                    while sent < per_producer {
                        if q.dispatch(event).is_ok() {
                            sent += 1;
                        }
                    }
                });
            }
            while received.iter().sum::<usize>() < 2 * per_producer {
                match q.next() {
                    Some(Event::Start) => received[0] += 1,
                    Some(Event::Stop) => received[1] += 1,
                    Some(other) => panic!("unexpected {other:?}"),
                    None => thread::yield_now(),
                }
            }
        });
        assert_eq!(received, [per_producer, per_producer]);
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn full_queue_recovers_after_drain() {
        let q: EventQueue<3> = EventQueue::new();
        q.dispatch(Event::Start).unwrap();
        q.dispatch(Event::Stop).unwrap();
        assert!(q.dispatch(Event::Start).is_err());
        assert_eq!(q.next(), Some(Event::Start));
        assert!(q.dispatch(Event::Start).is_ok());
    }
}
