//! Bookkeeping for the single word transition in flight.
//!
//! Deferred slot tasks carry the [`SessionId`] they were started under and report back
//! through [`SessionTracker::record_landing`]. Anything tagged with a superseded id is
//! reported as [`Landing::Stale`] and leaves the active counter alone.

use shared::domain::{SessionId, WordIndex};
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Stale,
    Pending { landed: usize, expected: usize },
    Settled,
}

#[derive(Debug)]
struct ActiveSession {
    id: SessionId,
    target: WordIndex,
    landed: usize,
    expected: usize,
    settled_tx: Option<oneshot::Sender<()>>,
}

#[derive(Debug, Default)]
pub struct SessionTracker {
    next_id: u64,
    active: Option<ActiveSession>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session expecting `expected` landings. The previous session, if any, is
    /// dropped and its settle receiver observes a closed channel.
    pub fn begin(
        &mut self,
        target: WordIndex,
        expected: usize,
    ) -> (SessionId, oneshot::Receiver<()>) {
        self.next_id += 1;
        let id = SessionId(self.next_id);
        let (settled_tx, settled_rx) = oneshot::channel();
        self.active = Some(ActiveSession {
            id,
            target,
            landed: 0,
            expected,
            settled_tx: Some(settled_tx),
        });
        (id, settled_rx)
    }

    pub fn invalidate(&mut self) -> Option<SessionId> {
        self.active.take().map(|session| session.id)
    }

    pub fn is_current(&self, id: SessionId) -> bool {
        self.active.as_ref().is_some_and(|session| session.id == id)
    }

    pub fn active_id(&self) -> Option<SessionId> {
        self.active.as_ref().map(|session| session.id)
    }

    pub fn active_target(&self) -> Option<WordIndex> {
        self.active.as_ref().map(|session| session.target)
    }

    pub fn record_landing(&mut self, id: SessionId) -> Landing {
        let Some(session) = self.active.as_mut().filter(|session| session.id == id) else {
            return Landing::Stale;
        };

        session.landed += 1;
        if session.landed < session.expected {
            return Landing::Pending {
                landed: session.landed,
                expected: session.expected,
            };
        }

        if let Some(settled_tx) = session.settled_tx.take() {
            let _ = settled_tx.send(());
        }
        self.active = None;
        Landing::Settled
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
