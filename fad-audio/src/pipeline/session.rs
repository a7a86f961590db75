//! Run-state typestate and the control-event state machine.
//!
//! A [`Session`] bundles the sample clock and the capture handler. In the
//! [`Stopped`] state it can be reconfigured and can install algorithms; in
//! the [`Running`] state it can only service alarms and be stopped. Moving
//! between the two consumes the session, so "reconfigure while running"
//! does not type-check. [`Transport`] wraps both states for code that
//! learns the desired state at runtime, such as the event task.

use core::marker::PhantomData;

use crate::algorithm::{Algorithm, AnyAlgorithm};
use crate::clock::{AlarmTimer, ClockConfig, SampleClock};
use crate::error::Error;
use crate::io::{Event, OutputMode, SampleSink, SampleSource, StreamSink};
use crate::pipeline::{CaptureHandler, DeferredWorker, Pipeline, Wake};

/// Typestate: the clock is stopped.
pub struct Stopped;

/// Typestate: the clock is ticking.
pub struct Running;

pub struct Session<'p, T: AlarmTimer, S, D, W, const N: usize, State = Stopped> {
    clock: SampleClock<'p, T, N>,
    handler: CaptureHandler<'p, S, D, W, N>,
    _state: PhantomData<State>,
}

impl<'p, T, S, D, W, const N: usize, State> Session<'p, T, S, D, W, N, State>
where
    T: AlarmTimer,
    S: SampleSource,
    D: SampleSink,
    W: Wake,
{
    pub fn pipeline(&self) -> &'p Pipeline<N> {
        self.handler.pipeline()
    }

    pub fn clock(&self) -> &SampleClock<'p, T, N> {
        &self.clock
    }

    pub fn handler(&self) -> &CaptureHandler<'p, S, D, W, N> {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut CaptureHandler<'p, S, D, W, N> {
        &mut self.handler
    }

    fn into_state<Next>(self) -> Session<'p, T, S, D, W, N, Next> {
        Session {
            clock: self.clock,
            handler: self.handler,
            _state: PhantomData,
        }
    }
}

impl<'p, T, S, D, W, const N: usize> Session<'p, T, S, D, W, N, Stopped>
where
    T: AlarmTimer,
    S: SampleSource,
    D: SampleSink,
    W: Wake,
{
    pub fn new(pipeline: &'p Pipeline<N>, timer: T, source: S, dac: D, waker: W) -> Self {
        Session {
            clock: SampleClock::new(timer, pipeline),
            handler: CaptureHandler::new(pipeline, source, dac, waker),
            _state: PhantomData,
        }
    }

    /// Program the sample clock for `frequency` Hz.
    pub fn init_clock(&mut self, frequency: u32) -> Result<ClockConfig, Error> {
        self.clock.init(frequency)
    }

    /// Set the chunk size. A new geometry rewinds both cursors.
    pub fn set_read_size(&mut self, chunk: usize) -> Result<(), Error> {
        self.clock.set_read_size(chunk)
    }

    /// Set the multisample ratio. A new geometry rewinds both cursors.
    pub fn set_multisamples(&mut self, multisamples: usize) -> Result<(), Error> {
        self.pipeline().set_multisamples(multisamples)
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) -> Result<(), Error> {
        self.clock.set_output_mode(mode)
    }

    /// Hot-swap the worker's algorithm.
    pub fn install<A, K>(
        &mut self,
        worker: &mut DeferredWorker<'p, A, K, N>,
        algorithm: A,
        params: &A::Params,
    ) -> Result<Option<A>, Error>
    where
        A: Algorithm,
        K: StreamSink,
    {
        worker.install(algorithm, params)
    }

    /// Start the clock. On failure the stopped session is handed back.
    pub fn start(mut self) -> Result<Session<'p, T, S, D, W, N, Running>, (Self, Error)> {
        match self.clock.start() {
            Ok(()) => Ok(self.into_state()),
            Err(e) => {
                log::warn!("start refused: {}", e);
                Err((self, e))
            }
        }
    }
}

impl<'p, T, S, D, W, const N: usize> Session<'p, T, S, D, W, N, Running>
where
    T: AlarmTimer,
    S: SampleSource,
    D: SampleSink,
    W: Wake,
{
    pub fn stop(mut self) -> Session<'p, T, S, D, W, N, Stopped> {
        self.clock.stop();
        self.into_state()
    }

    /// Sample interrupt entry point.
    #[inline]
    pub fn on_alarm(&mut self) {
        let handler = &mut self.handler;
        self.clock.service(|| handler.on_tick());
    }
}

/// A session in whichever state it currently is.
pub enum Transport<'p, T: AlarmTimer, S, D, W, const N: usize> {
    Stopped(Session<'p, T, S, D, W, N, Stopped>),
    Running(Session<'p, T, S, D, W, N, Running>),
}

impl<'p, T, S, D, W, const N: usize> Transport<'p, T, S, D, W, N>
where
    T: AlarmTimer,
    S: SampleSource,
    D: SampleSink,
    W: Wake,
{
    pub fn is_running(&self) -> bool {
        matches!(self, Transport::Running(_))
    }

    /// Service one sample alarm; ignored while stopped.
    #[inline]
    pub fn on_alarm(&mut self) {
        if let Transport::Running(session) = self {
            session.on_alarm();
        }
    }

    /// Apply one control event.
    ///
    /// Configuration events received while running are serialized as
    /// stop, apply, restart. The returned transport reflects the state
    /// actually reached, even when the event failed.
    pub fn handle<K: StreamSink>(
        self,
        event: Event,
        worker: &mut DeferredWorker<'p, AnyAlgorithm, K, N>,
    ) -> (Self, Result<(), Error>) {
        log::info!("event: {:?}", event);
        match event {
            Event::Start => match self {
                Transport::Stopped(session) => match session.start() {
                    Ok(running) => (Transport::Running(running), Ok(())),
                    Err((stopped, e)) => (Transport::Stopped(stopped), Err(e)),
                },
                running => (running, Ok(())),
            },
            Event::Stop => match self {
                Transport::Running(session) => (Transport::Stopped(session.stop()), Ok(())),
                stopped => (stopped, Ok(())),
            },
            Event::SetOutputMode(mode) => self.while_stopped(|s| s.set_output_mode(mode)),
            Event::ChangeAlgorithm(selection) => {
                let params = selection.params();
                let algorithm = AnyAlgorithm::for_params(&params);
                self.while_stopped(|s| s.install(worker, algorithm, &params).map(|_| ()))
            }
        }
    }

    fn while_stopped(
        self,
        apply: impl FnOnce(&mut Session<'p, T, S, D, W, N, Stopped>) -> Result<(), Error>,
    ) -> (Self, Result<(), Error>) {
        match self {
            Transport::Stopped(mut session) => {
                let result = apply(&mut session);
                (Transport::Stopped(session), result)
            }
            Transport::Running(session) => {
                let mut session = session.stop();
                let result = apply(&mut session);
                match session.start() {
                    Ok(running) => (Transport::Running(running), result),
                    Err((stopped, e)) => (Transport::Stopped(stopped), result.and(Err(e))),
                }
            }
        }
    }
}

impl<'p, T: AlarmTimer, S, D, W, const N: usize> From<Session<'p, T, S, D, W, N, Stopped>>
    for Transport<'p, T, S, D, W, N>
{
    fn from(session: Session<'p, T, S, D, W, N, Stopped>) -> Self {
        Transport::Stopped(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualTimer;
    use crate::config::{AlgorithmKind, AlgorithmMode, Selection};
    use crate::constants::SAMPLE_RATE_HZ;

    struct Silence;

    impl SampleSource for Silence {
        fn read_sample(&mut self, _channel: u8) -> u16 {
            2048
        }
    }

    type TestSession<'p, State> = Session<'p, ManualTimer, Silence, (), (), 2048, State>;

    fn stopped(p: &Pipeline<2048>) -> TestSession<'_, Stopped> {
        let mut s = Session::new(p, ManualTimer::new(), Silence, (), ());
        s.init_clock(SAMPLE_RATE_HZ).unwrap();
        s
    }

    #[test]
    fn start_without_clock_init_hands_session_back() {
        let p: Pipeline<2048> = Pipeline::new();
        let s: TestSession<'_, Stopped> = Session::new(&p, ManualTimer::new(), Silence, (), ());
        let Err((s, e)) = s.start() else {
            panic!("start should fail before init");
        };
        assert_eq!(e, Error::NotInitialized);
        assert!(!s.pipeline().is_running());
    }

    #[test]
    fn running_session_ticks_and_rearms() {
        let p: Pipeline<2048> = Pipeline::new();
        let mut running = stopped(&p).start().ok().unwrap();
        for _ in 0..10 {
            running.on_alarm();
        }
        assert_eq!(running.clock().timer().rearms(), 10);
        assert_eq!(p.stats().snapshot().ticks, 10);
        let s = running.stop();
        assert!(!s.pipeline().is_running());
    }

    #[test]
    fn change_algorithm_while_running_restarts() {
        let p: Pipeline<2048> = Pipeline::new();
        let mut worker: DeferredWorker<'_, AnyAlgorithm, (), 2048> = DeferredWorker::new(&p, ());
        let t: Transport<'_, _, _, _, _, 2048> = stopped(&p).into();
        let (t, r) = t.handle(Event::Start, &mut worker);
        assert!(r.is_ok() && t.is_running());

        let change = Event::ChangeAlgorithm(Selection::new(
            AlgorithmKind::SpectralMask,
            AlgorithmMode::Mode1,
        ));
        let (t, r) = t.handle(change, &mut worker);
        assert_eq!(r, Ok(()));
        assert!(t.is_running());
        assert_eq!(worker.algorithm().map(|a| a.kind()), Some(AlgorithmKind::SpectralMask));
        assert_eq!(p.read_size(), 1024);
    }

    #[test]
    fn output_mode_event_applies_between_stop_and_start() {
        let p: Pipeline<2048> = Pipeline::new();
        let mut worker: DeferredWorker<'_, AnyAlgorithm, (), 2048> = DeferredWorker::new(&p, ());
        let t: Transport<'_, _, _, _, _, 2048> = stopped(&p).into();
        let (t, _) = t.handle(Event::Start, &mut worker);
        let (t, r) = t.handle(Event::SetOutputMode(OutputMode::Dac), &mut worker);
        assert_eq!(r, Ok(()));
        assert!(t.is_running());
        assert_eq!(p.output_mode(), OutputMode::Dac);

        let (t, r) = t.handle(Event::Stop, &mut worker);
        assert_eq!(r, Ok(()));
        assert!(!t.is_running());
        let (t, r) = t.handle(Event::Stop, &mut worker);
        assert_eq!(r, Ok(()));
        assert!(!t.is_running());
    }
}
