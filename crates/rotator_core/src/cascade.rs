//! Staggered per-slot cascade for one word-to-word transition.

use std::sync::Arc;

use render_integration::SlotRenderer;
use shared::{
    domain::{SessionId, SlotIndex, WordIndex},
    protocol::RotatorEvent,
};
use tokio::sync::{broadcast, oneshot, Mutex};
use tracing::{debug, info, trace, warn};

use crate::{
    config::CascadeTiming,
    session::{Landing, SessionTracker},
    wheel::{hop_count, locate, next_index, Wheel},
    words::WordList,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPlan {
    pub slot: SlotIndex,
    pub wheel: Wheel,
    pub from_char: char,
    pub to_char: char,
    pub from_accent: bool,
    pub target_accent: bool,
    pub from_position: usize,
    pub to_position: usize,
    pub hops: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub from: WordIndex,
    pub target: WordIndex,
    pub slots: Vec<SlotPlan>,
}

impl TransitionPlan {
    pub fn total_hops(&self) -> usize {
        self.slots.iter().map(|slot| slot.hops).sum()
    }
}

/// Work out source and target wheel positions for every slot.
///
/// A letter sits on the accent position only when moving out of, or into, the first word.
/// Otherwise the same letter is read from the base alphabet, even if it equals the accent.
pub fn plan_transition(words: &WordList, from: WordIndex, target: WordIndex) -> TransitionPlan {
    let from_word = words.padded(from);
    let to_word = words.padded(target);
    let leaving_first = words.previous_index(target).0 == 0;
    let entering_first = target.0 == 0;

    let slots = (0..words.slot_count())
        .map(SlotIndex)
        .map(|slot| {
            let wheel = words.wheel(slot);
            let from_char = from_word.char_at(slot);
            let to_char = to_word.char_at(slot);
            let from_accent = leaving_first && wheel.is_accent_match(from_char);
            let target_accent = entering_first && wheel.is_accent_match(to_char);
            let from_position = locate(from_char, from_accent);
            let to_position = locate(to_char, target_accent);
            SlotPlan {
                slot,
                wheel,
                from_char,
                to_char,
                from_accent,
                target_accent,
                from_position,
                to_position,
                hops: hop_count(from_position, to_position),
            }
        })
        .collect();

    TransitionPlan {
        from,
        target,
        slots,
    }
}

pub struct CascadeHandle {
    pub session: SessionId,
    /// Resolves once every slot of this session has landed. Closed if superseded.
    pub settled: oneshot::Receiver<()>,
}

pub struct CascadeController {
    renderer: Arc<dyn SlotRenderer>,
    events: broadcast::Sender<RotatorEvent>,
    timing: CascadeTiming,
    sessions: Mutex<SessionTracker>,
}

impl CascadeController {
    pub fn new(
        renderer: Arc<dyn SlotRenderer>,
        events: broadcast::Sender<RotatorEvent>,
        timing: CascadeTiming,
    ) -> Arc<Self> {
        Arc::new(Self {
            renderer,
            events,
            timing,
            sessions: Mutex::new(SessionTracker::new()),
        })
    }

    /// Start a new session for `plan`, superseding whatever was in flight.
    pub async fn begin_transition(self: &Arc<Self>, plan: TransitionPlan) -> CascadeHandle {
        let (session, settled) = self
            .sessions
            .lock()
            .await
            .begin(plan.target, plan.slots.len());

        info!(
            session = session.0,
            from = plan.from.0,
            target = plan.target.0,
            slots = plan.slots.len(),
            hops = plan.total_hops(),
            "cascade: transition started"
        );

        for slot_plan in plan.slots {
            let controller = Arc::clone(self);
            let offset = u32::try_from(slot_plan.slot.0).unwrap_or(u32::MAX);
            let delay = self.timing.cascade_delay.saturating_mul(offset);
            let target = plan.target;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                controller.drive_slot(session, target, slot_plan).await;
            });
        }

        CascadeHandle { session, settled }
    }

    /// Drop the active session so its pending slot callbacks are ignored.
    pub async fn invalidate(&self) -> Option<SessionId> {
        let invalidated = self.sessions.lock().await.invalidate();
        if let Some(session) = invalidated {
            debug!(session = session.0, "cascade: session invalidated");
        }
        invalidated
    }

    pub async fn is_current(&self, session: SessionId) -> bool {
        self.sessions.lock().await.is_current(session)
    }

    pub async fn active_session(&self) -> Option<SessionId> {
        self.sessions.lock().await.active_id()
    }

    async fn drive_slot(&self, session: SessionId, word_index: WordIndex, plan: SlotPlan) {
        if plan.hops == 0 {
            self.land(session, word_index, &plan).await;
            return;
        }

        {
            let sessions = self.sessions.lock().await;
            if sessions.is_current(session) {
                let _ = self.events.send(RotatorEvent::LetterLanded {
                    slot: plan.slot,
                    letter: plan.from_char,
                    word_index,
                    accent: false,
                });
            }
        }

        debug!(
            session = session.0,
            slot = plan.slot.0,
            hops = plan.hops,
            "cascade: slot cycling"
        );

        let mut position = plan.from_position;
        for step in 0..plan.hops {
            let next = next_index(position);
            self.renderer
                .set_slot_visual(plan.slot, plan.wheel.symbol(position), plan.wheel.symbol(next))
                .await;
            if let Err(error) = self
                .renderer
                .play_transition(plan.slot, self.timing.flip_speed)
                .await
            {
                warn!(
                    session = session.0,
                    slot = plan.slot.0,
                    step,
                    %error,
                    "cascade: flip step failed, advancing wheel anyway"
                );
            }
            trace!(slot = plan.slot.0, position = next, "cascade: step done");
            position = next;
        }

        self.land(session, word_index, &plan).await;
    }

    async fn land(&self, session: SessionId, word_index: WordIndex, plan: &SlotPlan) {
        let mut sessions = self.sessions.lock().await;
        if !sessions.is_current(session) {
            debug!(
                session = session.0,
                slot = plan.slot.0,
                "cascade: discarding landing from superseded session"
            );
            return;
        }

        let _ = self.events.send(RotatorEvent::LetterLanded {
            slot: plan.slot,
            letter: plan.to_char,
            word_index,
            accent: plan.target_accent,
        });

        match sessions.record_landing(session) {
            Landing::Settled => {
                info!(
                    session = session.0,
                    word_index = word_index.0,
                    "cascade: all slots landed"
                );
            }
            Landing::Pending { landed, expected } => {
                trace!(session = session.0, landed, expected, "cascade: slot landed");
            }
            Landing::Stale => {}
        }
    }
}

#[cfg(test)]
#[path = "tests/cascade_tests.rs"]
mod tests;
