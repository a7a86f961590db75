//! The deferred worker: runs the algorithm outside interrupt context.

use crate::algorithm::Algorithm;
use crate::error::Error;
use crate::io::{OutputMode, Snapshot, StreamSink};
use crate::pipeline::{Pipeline, PipelineStats};

/// Bytes staged on the stack per stream hand-off.
pub const STREAM_BLOCK: usize = 64;

/// How the worker waits for the next chunk signal.
///
/// Blocks until woken (semaphore take, task suspend, thread park). Spurious
/// returns are fine: the worker simply finds nothing pending.
pub trait Park {
    fn park(&mut self);
}

impl<F: FnMut()> Park for F {
    fn park(&mut self) {
        self()
    }
}

/// Consumes chunk snapshots and owns the active algorithm.
///
/// Handling one chunk is two steps, always in this order:
/// [`run_algorithm`](Self::run_algorithm) fills the output window, then
/// [`advance_output`](Self::advance_output) hands it to the stream sink
/// when output is wireless.
pub struct DeferredWorker<'p, A, K, const N: usize> {
    pipeline: &'p Pipeline<N>,
    algorithm: Option<A>,
    stream: K,
}

impl<'p, A, K, const N: usize> DeferredWorker<'p, A, K, N>
where
    A: Algorithm,
    K: StreamSink,
{
    pub fn new(pipeline: &'p Pipeline<N>, stream: K) -> Self {
        DeferredWorker {
            pipeline,
            algorithm: None,
            stream,
        }
    }

    pub fn pipeline(&self) -> &'p Pipeline<N> {
        self.pipeline
    }

    /// The installed algorithm, if any.
    pub fn algorithm(&self) -> Option<&A> {
        self.algorithm.as_ref()
    }

    pub fn stream(&self) -> &K {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut K {
        &mut self.stream
    }

    /// Swap in `algorithm`, returning the one it replaces.
    ///
    /// Refused with [`Error::ClockRunning`] while the clock ticks. The new
    /// geometry is validated and applied before anything else changes, so
    /// a rejected geometry leaves the current algorithm in place. Applying
    /// rewinds the cursors and drops any stale snapshot. Then the old
    /// algorithm is deinitialized and the new one initialized; `init` is
    /// the last fallible step. If it fails the worker is left with no
    /// algorithm and a silent output ring.
    pub fn install(&mut self, mut algorithm: A, params: &A::Params) -> Result<Option<A>, Error> {
        let p = self.pipeline;
        if p.is_running() {
            log::warn!("algorithm install refused: sample clock running");
            return Err(Error::ClockRunning);
        }
        let requirements = A::requirements(params);
        requirements.validate(N).inspect_err(|e| {
            log::warn!("algorithm install refused: {}", e);
        })?;
        p.apply(requirements)?;

        let mut previous = self.algorithm.take();
        if let Some(old) = previous.as_mut() {
            old.deinit();
        }
        if let Err(e) = algorithm.init(params) {
            log::warn!("algorithm init failed: {}", e);
            return Err(e);
        }
        self.algorithm = Some(algorithm);
        log::info!(
            "algorithm installed: chunk {} multisamples {}",
            requirements.chunk_size,
            requirements.multisamples
        );
        Ok(previous)
    }

    /// Handle the latest chunk, if one is pending.
    pub fn run_pending(&mut self) -> Option<Snapshot> {
        let snapshot = self.pipeline.signal().take()?;
        self.handle_chunk(snapshot);
        Some(snapshot)
    }

    /// Run both per-chunk steps for `snapshot`.
    pub fn handle_chunk(&mut self, snapshot: Snapshot) {
        self.run_algorithm(snapshot);
        self.advance_output(snapshot);
    }

    /// Let the algorithm fill the output window for `snapshot`.
    ///
    /// Without an algorithm the window keeps its previous contents.
    pub fn run_algorithm(&mut self, snapshot: Snapshot) {
        let Some(algorithm) = self.algorithm.as_mut() else {
            return;
        };
        let stats = self.pipeline.stats();
        let mut chunk = self.pipeline.chunk(snapshot);
        match algorithm.process(&mut chunk) {
            Ok(()) => {
                PipelineStats::bump(&stats.chunks_processed, 1);
                log::trace!(
                    "chunk in={} out={}",
                    snapshot.input_pos,
                    snapshot.output_pos
                );
            }
            Err(e) => {
                PipelineStats::bump(&stats.window_violations, 1);
                log::warn!("algorithm contract violation at in={}: {}", snapshot.input_pos, e);
            }
        }
    }

    /// Stream the freshly written window when output is wireless.
    ///
    /// Whatever the sink does not accept is counted as dropped; the worker
    /// never waits for the link.
    pub fn advance_output(&mut self, snapshot: Snapshot) {
        let p = self.pipeline;
        if p.output_mode() != OutputMode::Wireless {
            return;
        }
        let window = p.output_window(snapshot);
        let mut block = [0u8; STREAM_BLOCK];
        let mut offset = 0;
        while offset < window.len() {
            let staged = window.copy_to(offset, &mut block);
            let accepted = self.stream.push_block(&block[..staged]).min(staged);
            offset += accepted;
            if accepted < staged {
                let dropped = window.len() - offset;
                PipelineStats::bump(&p.stats().stream_drops, dropped as u32);
                log::trace!("stream sink full, dropped {} bytes", dropped);
                break;
            }
        }
    }

    /// Worker loop: handle chunks as they arrive, parking in between,
    /// until `keep_running` returns `false`.
    pub fn run(&mut self, park: &mut impl Park, mut keep_running: impl FnMut() -> bool) {
        while keep_running() {
            if self.run_pending().is_none() {
                park.park();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{Passthrough, PassthroughParams, SpectralMask, SpectralMaskParams};
    use crate::buffer::Chunk;
    use crate::constants::OUTPUT_IDLE_LEVEL;

    fn passthrough(read_size: usize) -> PassthroughParams {
        PassthroughParams {
            read_size,
            multisamples: 1,
            gate_period: None,
        }
    }

    /// Accepts at most `room` bytes in total and keeps the first 32.
    struct Capped {
        room: usize,
        seen: [u8; 32],
        len: usize,
    }

    impl Capped {
        fn new(room: usize) -> Self {
            Capped {
                room,
                seen: [0; 32],
                len: 0,
            }
        }
    }

    impl StreamSink for Capped {
        fn push_block(&mut self, block: &[u8]) -> usize {
            let n = block.len().min(self.room);
            for &b in &block[..n] {
                if self.len < self.seen.len() {
                    self.seen[self.len] = b;
                }
                self.len += 1;
            }
            self.room -= n;
            n
        }
    }

    /// Writes one sample past its window.
    struct Overreach;

    impl Algorithm for Overreach {
        type Params = usize;

        fn requirements(read_size: &usize) -> crate::algorithm::Requirements {
            crate::algorithm::Requirements::new(*read_size, 1)
        }

        fn init(&mut self, _: &usize) -> Result<(), Error> {
            Ok(())
        }

        fn deinit(&mut self) {}

        fn process(&mut self, chunk: &mut Chunk<'_>) -> Result<(), Error> {
            let out = chunk.output();
            let len = out.len();
            out.set(len, 0)
        }
    }

    #[test]
    fn install_rejected_while_running() {
        let p: Pipeline<64> = Pipeline::new();
        let mut w: DeferredWorker<'_, Passthrough, (), 64> = DeferredWorker::new(&p, ());
        p.set_running(true);
        assert!(matches!(
            w.install(Passthrough::new(), &passthrough(16)),
            Err(Error::ClockRunning)
        ));
        assert!(w.algorithm().is_none());
    }

    #[test]
    fn invalid_geometry_keeps_current_algorithm() {
        let p: Pipeline<64> = Pipeline::new();
        let mut w: DeferredWorker<'_, Passthrough, (), 64> = DeferredWorker::new(&p, ());
        w.install(Passthrough::new(), &passthrough(16)).unwrap();
        assert!(matches!(
            w.install(Passthrough::new(), &passthrough(48)),
            Err(Error::InvalidChunkSize { .. })
        ));
        assert!(w.algorithm().is_some());
        assert_eq!(p.read_size(), 16);
    }

    #[test]
    fn install_resets_cursors_and_signal() {
        let p: Pipeline<64> = Pipeline::new();
        p.signal().publish(Snapshot::new(16, 16));
        p.output().write(5, 1);
        let mut w: DeferredWorker<'_, Passthrough, (), 64> = DeferredWorker::new(&p, ());
        let previous = w.install(Passthrough::new(), &passthrough(8)).unwrap();
        assert!(previous.is_none());
        assert!(!p.signal().is_pending());
        assert_eq!(p.output().read(5), OUTPUT_IDLE_LEVEL);
        assert_eq!(p.read_size(), 8);
        assert!(w.install(Passthrough::new(), &passthrough(8)).unwrap().is_some());
    }

    static GEOMETRY: Pipeline<64> = Pipeline::new();

    /// Initializes only if the pipeline already runs its geometry.
    struct GeometryFirst;

    impl Algorithm for GeometryFirst {
        type Params = usize;

        fn requirements(read_size: &usize) -> crate::algorithm::Requirements {
            crate::algorithm::Requirements::new(*read_size, 1)
        }

        fn init(&mut self, read_size: &usize) -> Result<(), Error> {
            if GEOMETRY.read_size() != *read_size || GEOMETRY.cursors() != (0, 0) {
                return Err(Error::InvalidParameter { name: "read_size" });
            }
            Ok(())
        }

        fn deinit(&mut self) {}

        fn process(&mut self, _: &mut Chunk<'_>) -> Result<(), Error> {
            Ok(())
        }
    }

    #[test]
    fn geometry_is_applied_before_init() {
        let mut w: DeferredWorker<'_, GeometryFirst, (), 64> = DeferredWorker::new(&GEOMETRY, ());
        w.install(GeometryFirst, &8).unwrap();
        assert_eq!(GEOMETRY.read_size(), 8);
        let previous = w.install(GeometryFirst, &32).unwrap();
        assert!(previous.is_some());
        assert_eq!(GEOMETRY.read_size(), 32);
    }

    #[test]
    fn failed_init_leaves_no_algorithm() {
        let p: Pipeline<64> = Pipeline::new();
        let mut w: DeferredWorker<'_, SpectralMask, (), 64> = DeferredWorker::new(&p, ());
        let bad = SpectralMaskParams {
            read_size: 32,
            multisamples: 1,
            window: 64,
            sample_rate: 8192,
        };
        assert_eq!(
            w.install(SpectralMask::new(), &bad).err(),
            Some(Error::InvalidParameter { name: "window" })
        );
        assert!(w.algorithm().is_none());
        assert_eq!(p.read_size(), 32);
        assert_eq!(p.cursors(), (0, 0));
    }

    #[test]
    fn run_pending_processes_latest_chunk() {
        let p: Pipeline<32> = Pipeline::new();
        let mut w: DeferredWorker<'_, Passthrough, (), 32> = DeferredWorker::new(&p, ());
        w.install(Passthrough::new(), &passthrough(8)).unwrap();
        for i in 0..8 {
            p.input().write(i, (i as u16 + 1) * 16);
        }
        assert_eq!(w.run_pending(), None);
        p.signal().publish(Snapshot::new(0, 16));
        assert_eq!(w.run_pending(), Some(Snapshot::new(0, 16)));
        for i in 0..8 {
            assert_eq!(p.output().read(16 + i), i as u8 + 1);
        }
        assert_eq!(p.stats().snapshot().chunks_processed, 1);
    }

    #[test]
    fn violations_are_counted_not_fatal() {
        let p: Pipeline<32> = Pipeline::new();
        let mut w: DeferredWorker<'_, Overreach, (), 32> = DeferredWorker::new(&p, ());
        w.install(Overreach, &8).unwrap();
        p.signal().publish(Snapshot::new(0, 0));
        w.run_pending();
        p.signal().publish(Snapshot::new(8, 8));
        w.run_pending();
        let stats = p.stats().snapshot();
        assert_eq!(stats.window_violations, 2);
        assert_eq!(stats.chunks_processed, 0);
        // Neighbouring chunk untouched.
        assert_eq!(p.output().read(16), OUTPUT_IDLE_LEVEL);
    }

    #[test]
    fn wireless_output_streams_window() {
        let p: Pipeline<256> = Pipeline::new();
        let mut w: DeferredWorker<'_, Passthrough, Capped, 256> =
            DeferredWorker::new(&p, Capped::new(usize::MAX));
        w.install(Passthrough::new(), &passthrough(128)).unwrap();
        for i in 0..128 {
            p.input().write(i, i as u16 * 16);
        }
        p.signal().publish(Snapshot::new(0, 128));
        w.run_pending();
        assert_eq!(w.stream().len, 128);
        assert_eq!(&w.stream().seen[..4], &[0, 1, 2, 3]);
        assert_eq!(p.stats().snapshot().stream_drops, 0);
    }

    #[test]
    fn slow_sink_drops_instead_of_blocking() {
        let p: Pipeline<256> = Pipeline::new();
        let mut w: DeferredWorker<'_, Passthrough, Capped, 256> =
            DeferredWorker::new(&p, Capped::new(100));
        w.install(Passthrough::new(), &passthrough(128)).unwrap();
        p.signal().publish(Snapshot::new(0, 0));
        w.run_pending();
        assert_eq!(w.stream().len, 100);
        assert_eq!(p.stats().snapshot().stream_drops, 28);
    }

    #[test]
    fn dac_mode_does_not_stream() {
        let p: Pipeline<64> = Pipeline::new();
        p.set_output_mode(OutputMode::Dac).unwrap();
        let mut w: DeferredWorker<'_, Passthrough, Capped, 64> =
            DeferredWorker::new(&p, Capped::new(usize::MAX));
        w.install(Passthrough::new(), &passthrough(16)).unwrap();
        p.signal().publish(Snapshot::new(0, 0));
        w.run_pending();
        assert_eq!(w.stream().len, 0);
    }

    #[test]
    fn run_parks_when_idle_and_stops_on_request() {
        let p: Pipeline<32> = Pipeline::new();
        let mut w: DeferredWorker<'_, Passthrough, (), 32> = DeferredWorker::new(&p, ());
        w.install(Passthrough::new(), &passthrough(8)).unwrap();
        p.signal().publish(Snapshot::new(0, 0));

        let mut parks = 0;
        let mut rounds = 0;
        w.run(&mut || parks += 1, || {
            rounds += 1;
            rounds <= 3
        });
        assert_eq!(parks, 2);
        assert_eq!(p.stats().snapshot().chunks_processed, 1);
    }
}
