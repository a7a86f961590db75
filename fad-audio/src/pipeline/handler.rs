//! The per-sample interrupt body.

use core::sync::atomic::Ordering;

use crate::constants::{INPUT_CHANNEL, OUTPUT_CHANNEL};
use crate::io::{OutputMode, SampleSink, SampleSource, Snapshot};
use crate::pipeline::{Pipeline, PipelineStats};

/// Wakes the deferred worker after a chunk completes.
///
/// Called from interrupt context: must be wait-free (give a semaphore,
/// resume a task, unpark a thread).
pub trait Wake {
    fn wake(&self);
}

/// Polling workers need no wake-up.
impl Wake for () {
    fn wake(&self) {}
}

impl<W: Wake + ?Sized> Wake for &W {
    fn wake(&self) {
        (**self).wake()
    }
}

/// Capture-and-dispatch handler: one call to [`on_tick`](Self::on_tick)
/// per sample interrupt.
///
/// Per tick, in order:
///
/// 1. read one sample into the input ring and advance the input cursor;
/// 2. every `M` input samples, play the next output sample (DAC mode) and
///    advance the output cursor;
/// 3. every `C` input samples, publish a [`Snapshot`] and wake the worker.
///
/// Re-arming the alarm is left to
/// [`SampleClock::service`](crate::clock::SampleClock::service). Nothing
/// here allocates, blocks or logs.
pub struct CaptureHandler<'p, S, D, W, const N: usize> {
    pipeline: &'p Pipeline<N>,
    source: S,
    dac: D,
    waker: W,
}

impl<'p, S, D, W, const N: usize> CaptureHandler<'p, S, D, W, N>
where
    S: SampleSource,
    D: SampleSink,
    W: Wake,
{
    pub fn new(pipeline: &'p Pipeline<N>, source: S, dac: D, waker: W) -> Self {
        CaptureHandler {
            pipeline,
            source,
            dac,
            waker,
        }
    }

    pub fn pipeline(&self) -> &'p Pipeline<N> {
        self.pipeline
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn dac(&self) -> &D {
        &self.dac
    }

    /// One sample interrupt.
    #[inline]
    pub fn on_tick(&mut self) {
        let p = self.pipeline;
        let chunk = p.chunk_size.load(Ordering::Relaxed);
        let m = p.multisamples.load(Ordering::Relaxed);

        let pos = p.input_cursor.load(Ordering::Relaxed);
        p.input.write(pos, self.source.read_sample(INPUT_CHANNEL));
        let next = (pos + 1) & (N - 1);
        p.input_cursor.store(next, Ordering::Relaxed);

        let mut out = p.output_cursor.load(Ordering::Relaxed);
        if next % m == 0 {
            if p.output_mode() == OutputMode::Dac {
                self.dac.write_sample(OUTPUT_CHANNEL, p.output.read(out));
            }
            out = (out + 1) % (N / m);
            p.output_cursor.store(out, Ordering::Relaxed);
        }

        if next % chunk == 0 {
            // The chunk just completed starts one chunk behind the cursor;
            // its output lands one output chunk ahead of playback.
            let snapshot = Snapshot::new(
                (next + N - chunk) % N,
                (out + chunk / m) % (N / m),
            );
            if p.signal.publish(snapshot) {
                PipelineStats::bump(&p.stats.overruns, 1);
            }
            PipelineStats::bump(&p.stats.chunks_signalled, 1);
            self.waker.wake();
        }

        PipelineStats::bump(&p.stats.ticks, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::Requirements;
    use core::cell::Cell;

    /// Produces 0, 1, 2, ... on successive reads.
    struct Counter(u16);

    impl SampleSource for Counter {
        fn read_sample(&mut self, channel: u8) -> u16 {
            assert_eq!(channel, INPUT_CHANNEL);
            let v = self.0;
            self.0 = self.0.wrapping_add(1);
            v
        }
    }

    /// Remembers the last few DAC writes.
    #[derive(Default)]
    struct Recorder {
        writes: [u8; 8],
        count: usize,
    }

    impl SampleSink for Recorder {
        fn write_sample(&mut self, channel: u8, value: u8) {
            assert_eq!(channel, OUTPUT_CHANNEL);
            self.writes[self.count % 8] = value;
            self.count += 1;
        }
    }

    struct Wakes(Cell<u32>);

    impl Wake for Wakes {
        fn wake(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn samples_land_at_cursor_and_wrap() {
        let p: Pipeline<8> = Pipeline::new();
        p.set_read_size(4).unwrap();
        let mut h = CaptureHandler::new(&p, Counter(100), (), ());
        for _ in 0..10 {
            h.on_tick();
        }
        // Second lap overwrote indices 0 and 1.
        assert_eq!(p.input().read(0), 108);
        assert_eq!(p.input().read(1), 109);
        assert_eq!(p.input().read(2), 102);
        assert_eq!(p.cursors().0, 2);
    }

    #[test]
    fn snapshot_describes_completed_chunk() {
        let p: Pipeline<16> = Pipeline::new();
        p.apply(Requirements::new(4, 2)).unwrap();
        let wakes = Wakes(Cell::new(0));
        let mut h = CaptureHandler::new(&p, Counter(0), (), &wakes);

        for _ in 0..3 {
            h.on_tick();
        }
        assert!(!p.signal().is_pending());
        h.on_tick();
        // Output cursor advanced C / M = 2; window to fill is 2 further on.
        assert_eq!(p.signal().take(), Some(Snapshot::new(0, 4)));
        assert_eq!(p.cursors(), (4, 2));

        for _ in 0..4 {
            h.on_tick();
        }
        assert_eq!(p.signal().take(), Some(Snapshot::new(4, 6)));
        assert_eq!(wakes.0.get(), 2);
    }

    #[test]
    fn unconsumed_snapshot_counts_as_overrun() {
        let p: Pipeline<16> = Pipeline::new();
        p.set_read_size(4).unwrap();
        let mut h = CaptureHandler::new(&p, Counter(0), (), ());
        for _ in 0..12 {
            h.on_tick();
        }
        let stats = p.stats().snapshot();
        assert_eq!(stats.ticks, 12);
        assert_eq!(stats.chunks_signalled, 3);
        assert_eq!(stats.overruns, 2);
        assert_eq!(p.signal().take(), Some(Snapshot::new(8, 0)));
    }

    #[test]
    fn dac_plays_one_sample_per_output_tick() {
        let p: Pipeline<16> = Pipeline::new();
        p.apply(Requirements::new(4, 2)).unwrap();
        p.set_output_mode(OutputMode::Dac).unwrap();
        for i in 0..8 {
            p.output().write(i, i as u8 * 10);
        }
        let mut h = CaptureHandler::new(&p, Counter(0), Recorder::default(), ());
        for _ in 0..8 {
            h.on_tick();
        }
        assert_eq!(h.dac().count, 4);
        assert_eq!(&h.dac().writes[..4], &[0, 10, 20, 30]);
    }

    #[test]
    fn output_cursor_stays_inside_shrunk_ring() {
        let p: Pipeline<16> = Pipeline::new();
        p.set_read_size(4).unwrap();
        let mut h = CaptureHandler::new(&p, Counter(0), (), ());
        for _ in 0..14 {
            h.on_tick();
        }
        assert_eq!(p.cursors(), (14, 14));

        // L drops from 16 to 4.
        p.set_multisamples(4).unwrap();
        assert_eq!(p.cursors(), (0, 0));
        for tick in 1..=16 {
            h.on_tick();
            assert!(p.cursors().1 < p.output_len(), "tick {tick}");
        }
        assert_eq!(p.cursors(), (0, 0));
    }

    #[test]
    fn wireless_mode_leaves_dac_alone() {
        let p: Pipeline<16> = Pipeline::new();
        p.set_read_size(4).unwrap();
        let mut h = CaptureHandler::new(&p, Counter(0), Recorder::default(), ());
        for _ in 0..8 {
            h.on_tick();
        }
        assert_eq!(h.dac().count, 0);
        // The output cursor still advances.
        assert_eq!(p.cursors().1, 8);
    }
}
