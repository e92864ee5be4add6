use std::{sync::Arc, time::Duration};

use render_integration::{BoardLayout, DetachedRenderer, SlotRenderer};
use shared::{
    domain::{Mode, SessionId, TimingMode, WordIndex},
    protocol::RotatorEvent,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

pub mod cascade;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod session;
pub mod wheel;
pub mod words;

pub use cascade::{plan_transition, CascadeController, CascadeHandle, SlotPlan, TransitionPlan};
pub use config::{CascadeTiming, RotatorConfig};
pub use error::RotatorError;
pub use scheduler::{Dispatch, Intervals, Phase, RotationScheduler};
pub use words::{normalize_words, Word, WordList, DEFAULT_WORDS};

/// How long the renderer is given to slide the word stack in wheel mode.
pub const WHEEL_SLIDE_DURATION: Duration = Duration::from_millis(800);
const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatorSnapshot {
    pub phase: Phase,
    pub current: WordIndex,
    pub mode: Mode,
    pub timing_mode: TimingMode,
    pub intervals: Intervals,
    pub slot_count: usize,
    pub words: Vec<String>,
    pub active_session: Option<SessionId>,
}

/// Drives a rotating headline: owns the rotation timer, dispatches each transition to the
/// flip cascade or the wheel slide, and publishes [`RotatorEvent`]s to subscribers.
///
/// Timer and slot tasks hold clones of the `Arc`; call [`Rotator::destroy`] to release them.
pub struct Rotator {
    renderer: Arc<dyn SlotRenderer>,
    cascade: Arc<CascadeController>,
    events: broadcast::Sender<RotatorEvent>,
    inner: Mutex<RotatorState>,
}

struct RotatorState {
    words: WordList,
    scheduler: RotationScheduler,
    timer: Option<JoinHandle<()>>,
    timer_epoch: u64,
    transition_seq: u64,
    active_transition: Option<u64>,
    /// Bumped whenever the board is reset; slides from an older layout stay silent.
    generation: u64,
    destroyed: bool,
}

impl RotatorState {
    fn layout(&self) -> BoardLayout {
        BoardLayout {
            mode: self.scheduler.mode(),
            slot_count: self.words.slot_count(),
            words: self.words.words().to_vec(),
            current: self.scheduler.current(),
        }
    }

    fn cancel_timer(&mut self) -> bool {
        self.timer_epoch += 1;
        match self.timer.take() {
            Some(timer) => {
                timer.abort();
                true
            }
            None => false,
        }
    }

    fn begin_transition(&mut self) -> u64 {
        self.transition_seq += 1;
        self.active_transition = Some(self.transition_seq);
        self.transition_seq
    }
}

impl Rotator {
    pub async fn new(
        config: RotatorConfig,
        renderer: Arc<dyn SlotRenderer>,
    ) -> Result<Arc<Self>, RotatorError> {
        config.validate()?;

        let words = WordList::new(&config.words);
        let scheduler = RotationScheduler::new(
            words.len(),
            config.mode,
            config.timing_mode,
            config.intervals(),
        );
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let cascade = CascadeController::new(
            Arc::clone(&renderer),
            events.clone(),
            config.cascade_timing(),
        );

        let state = RotatorState {
            words,
            scheduler,
            timer: None,
            timer_epoch: 0,
            transition_seq: 0,
            active_transition: None,
            generation: 0,
            destroyed: false,
        };
        if renderer.is_attached() {
            renderer.prepare_board(&state.layout()).await;
        }

        Ok(Arc::new(Self {
            renderer,
            cascade,
            events,
            inner: Mutex::new(state),
        }))
    }

    /// A rotator without a render target. It accepts every call and never rotates.
    pub async fn detached(config: RotatorConfig) -> Result<Arc<Self>, RotatorError> {
        Self::new(config, Arc::new(DetachedRenderer)).await
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RotatorEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> RotatorSnapshot {
        let state = self.inner.lock().await;
        RotatorSnapshot {
            phase: state.scheduler.phase(),
            current: state.scheduler.current(),
            mode: state.scheduler.mode(),
            timing_mode: state.scheduler.timing_mode(),
            intervals: state.scheduler.intervals(),
            slot_count: state.words.slot_count(),
            words: state.words.words().to_vec(),
            active_session: self.cascade.active_session().await,
        }
    }

    /// Arm the rotation timer for the word on display.
    pub async fn start(self: &Arc<Self>) {
        let mut state = self.inner.lock().await;
        self.start_locked(&mut state);
    }

    /// Cancel the armed rotation. Flips already in motion run to completion.
    pub async fn stop(&self) {
        let mut state = self.inner.lock().await;
        let had_timer = state.cancel_timer();
        let was_running = state.scheduler.stop();
        info!(had_timer, was_running, "rotator: stopped");
    }

    pub async fn set_words<I, S>(self: &Arc<Self>, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = self.inner.lock().await;
        self.reset_locked(&mut state).await;
        state.words = WordList::new(words);
        let (word_count, mode) = (state.words.len(), state.scheduler.mode());
        state.scheduler.reset(word_count, mode);
        info!(
            words = word_count,
            slot_count = state.words.slot_count(),
            "rotator: word list replaced"
        );
        self.relayout_and_start(&mut state).await;
    }

    pub async fn set_mode(self: &Arc<Self>, mode: Mode) {
        let mut state = self.inner.lock().await;
        self.reset_locked(&mut state).await;
        let word_count = state.words.len();
        state.scheduler.reset(word_count, mode);
        info!(%mode, "rotator: mode changed");
        self.relayout_and_start(&mut state).await;
    }

    /// New intervals apply the next time the timer is armed.
    pub async fn set_intervals(&self, first: Duration, other: Duration, last: Option<Duration>) {
        let mut state = self.inner.lock().await;
        state
            .scheduler
            .set_intervals(Intervals::new(first, other, last));
        debug!(?first, ?other, ?last, "rotator: intervals updated");
    }

    pub async fn set_timing_mode(&self, timing_mode: TimingMode) {
        let mut state = self.inner.lock().await;
        state.scheduler.set_timing_mode(timing_mode);
        debug!(%timing_mode, "rotator: timing mode updated");
    }

    /// Cancel everything and refuse further starts.
    pub async fn destroy(&self) {
        let mut state = self.inner.lock().await;
        state.cancel_timer();
        state.scheduler.stop();
        state.active_transition = None;
        state.generation += 1;
        state.destroyed = true;
        self.cascade.invalidate().await;
        info!("rotator: destroyed");
    }

    fn start_locked(self: &Arc<Self>, state: &mut RotatorState) {
        if state.destroyed {
            return;
        }
        if !self.renderer.is_attached() {
            warn!("rotator: no render target attached; rotation not started");
            return;
        }
        if let Some(delay) = state.scheduler.start() {
            self.arm_timer(state, delay);
        }
    }

    async fn reset_locked(&self, state: &mut RotatorState) {
        state.cancel_timer();
        state.active_transition = None;
        state.generation += 1;
        self.cascade.invalidate().await;
    }

    async fn relayout_and_start(self: &Arc<Self>, state: &mut RotatorState) {
        if state.destroyed {
            return;
        }
        if self.renderer.is_attached() {
            self.renderer.prepare_board(&state.layout()).await;
        }
        self.start_locked(state);
    }

    fn arm_timer(self: &Arc<Self>, state: &mut RotatorState, delay: Duration) {
        state.cancel_timer();
        let epoch = state.timer_epoch;
        debug!(
            word_index = state.scheduler.current().0,
            ?delay,
            "rotator: timer armed"
        );
        let rotator = Arc::clone(self);
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            rotator.on_timer(epoch).await;
        }));
    }

    async fn on_timer(self: &Arc<Self>, epoch: u64) {
        let mut state = self.inner.lock().await;
        if state.timer_epoch != epoch {
            return;
        }
        // This task owns the handle; dropping it detaches instead of aborting ourselves.
        state.timer = None;

        let Some(dispatch) = state.scheduler.fire() else {
            return;
        };
        info!(
            from = dispatch.from.0,
            to = dispatch.to.0,
            mode = %dispatch.mode,
            "rotator: rotating"
        );
        let _ = self.events.send(RotatorEvent::Rotated {
            word_index: dispatch.to,
            settled: false,
        });

        let seq = state.begin_transition();
        match dispatch.mode {
            Mode::Flip => {
                let plan = plan_transition(&state.words, dispatch.from, dispatch.to);
                let handle = self.cascade.begin_transition(plan).await;
                let rotator = Arc::clone(self);
                tokio::spawn(async move {
                    if handle.settled.await.is_ok() {
                        rotator.on_transition_complete(seq, dispatch.to).await;
                    }
                });
            }
            Mode::Wheel => {
                let generation = state.generation;
                let rotator = Arc::clone(self);
                tokio::spawn(async move {
                    if let Err(error) = rotator
                        .renderer
                        .slide_to_word(dispatch.from, dispatch.to, WHEEL_SLIDE_DURATION)
                        .await
                    {
                        warn!(to = dispatch.to.0, %error, "rotator: wheel slide failed");
                    }
                    rotator.on_slide_complete(generation, seq, dispatch.to).await;
                });
            }
        }

        if let Some(delay) = state.scheduler.after_dispatch() {
            self.arm_timer(&mut state, delay);
        }
    }

    /// Slides overlap when the interval is shorter than the slide, and every one of them
    /// still reports settling. Only the newest may hand completion to the scheduler.
    async fn on_slide_complete(
        self: &Arc<Self>,
        generation: u64,
        seq: u64,
        word_index: WordIndex,
    ) {
        let mut state = self.inner.lock().await;
        if state.generation != generation {
            debug!(seq, "rotator: ignoring slide from a replaced layout");
            return;
        }

        let _ = self.events.send(RotatorEvent::Rotated {
            word_index,
            settled: true,
        });
        if state.active_transition != Some(seq) {
            return;
        }
        state.active_transition = None;
        if let Some(delay) = state.scheduler.on_transition_complete() {
            self.arm_timer(&mut state, delay);
        }
    }

    async fn on_transition_complete(self: &Arc<Self>, seq: u64, word_index: WordIndex) {
        let mut state = self.inner.lock().await;
        if state.active_transition != Some(seq) {
            debug!(seq, "rotator: ignoring completion of superseded transition");
            return;
        }
        state.active_transition = None;

        let _ = self.events.send(RotatorEvent::Rotated {
            word_index,
            settled: true,
        });
        if let Some(delay) = state.scheduler.on_transition_complete() {
            self.arm_timer(&mut state, delay);
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
