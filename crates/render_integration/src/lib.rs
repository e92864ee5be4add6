//! Rendering seam between the rotation engine and whatever draws the board.

use std::time::Duration;

use async_trait::async_trait;
use shared::domain::{Mode, SlotIndex, WordIndex};
use tokio::sync::Mutex;

/// What a renderer needs to lay out the board before the first rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardLayout {
    pub mode: Mode,
    pub slot_count: usize,
    pub words: Vec<String>,
    pub current: WordIndex,
}

impl BoardLayout {
    /// The word currently on display, uppercased and padded to the slot count.
    pub fn current_letters(&self) -> Vec<char> {
        let word = self
            .words
            .get(self.current.0)
            .map(|w| w.to_uppercase())
            .unwrap_or_default();
        let mut letters: Vec<char> = word.chars().take(self.slot_count).collect();
        letters.resize(self.slot_count, ' ');
        letters
    }
}

#[async_trait]
pub trait SlotRenderer: Send + Sync {
    /// A detached renderer has no target to draw on; the rotator stays idle.
    fn is_attached(&self) -> bool {
        true
    }

    async fn prepare_board(&self, layout: &BoardLayout);

    /// Prime a slot with the character it rests on and the one flipping in.
    async fn set_slot_visual(&self, slot: SlotIndex, resting: char, incoming: char);

    /// Play one primed flip. Must resolve exactly once, after `duration`.
    async fn play_transition(&self, slot: SlotIndex, duration: Duration) -> anyhow::Result<()>;

    /// Wheel mode: slide the whole word stack from `from` to `to`.
    async fn slide_to_word(
        &self,
        from: WordIndex,
        to: WordIndex,
        duration: Duration,
    ) -> anyhow::Result<()>;
}

/// Stand-in used when no render target is available.
pub struct DetachedRenderer;

#[async_trait]
impl SlotRenderer for DetachedRenderer {
    fn is_attached(&self) -> bool {
        false
    }

    async fn prepare_board(&self, _layout: &BoardLayout) {}

    async fn set_slot_visual(&self, _slot: SlotIndex, _resting: char, _incoming: char) {}

    async fn play_transition(&self, slot: SlotIndex, _duration: Duration) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("no render target attached for slot {slot}"))
    }

    async fn slide_to_word(
        &self,
        _from: WordIndex,
        to: WordIndex,
        _duration: Duration,
    ) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("no render target attached to slide to word {to}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlipStep {
    pub slot: SlotIndex,
    pub from: char,
    pub to: char,
}

#[derive(Debug, Default)]
struct HeadlessBoard {
    layout: Option<BoardLayout>,
    resting: Vec<char>,
    primed: Vec<Option<(char, char)>>,
    steps: Vec<FlipStep>,
    slides: Vec<(WordIndex, WordIndex)>,
}

/// In-memory board that honours flip timing without drawing anything.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    board: Mutex<HeadlessBoard>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resting_text(&self) -> String {
        self.board.lock().await.resting.iter().collect()
    }

    pub async fn steps(&self) -> Vec<FlipStep> {
        self.board.lock().await.steps.clone()
    }

    pub async fn steps_for(&self, slot: SlotIndex) -> Vec<FlipStep> {
        self.board
            .lock()
            .await
            .steps
            .iter()
            .filter(|step| step.slot == slot)
            .copied()
            .collect()
    }

    pub async fn slides(&self) -> Vec<(WordIndex, WordIndex)> {
        self.board.lock().await.slides.clone()
    }

    pub async fn layout(&self) -> Option<BoardLayout> {
        self.board.lock().await.layout.clone()
    }
}

#[async_trait]
impl SlotRenderer for HeadlessRenderer {
    async fn prepare_board(&self, layout: &BoardLayout) {
        let mut board = self.board.lock().await;
        board.resting = layout.current_letters();
        board.primed = vec![None; layout.slot_count];
        board.layout = Some(layout.clone());
    }

    async fn set_slot_visual(&self, slot: SlotIndex, resting: char, incoming: char) {
        let mut board = self.board.lock().await;
        if let Some(primed) = board.primed.get_mut(slot.0) {
            *primed = Some((resting, incoming));
        }
    }

    async fn play_transition(&self, slot: SlotIndex, duration: Duration) -> anyhow::Result<()> {
        let (from, to) = {
            let board = self.board.lock().await;
            board
                .primed
                .get(slot.0)
                .copied()
                .flatten()
                .ok_or_else(|| anyhow::anyhow!("slot {slot} was not primed before flipping"))?
        };

        tokio::time::sleep(duration).await;

        let mut board = self.board.lock().await;
        if let Some(resting) = board.resting.get_mut(slot.0) {
            *resting = to;
        }
        if let Some(primed) = board.primed.get_mut(slot.0) {
            *primed = None;
        }
        board.steps.push(FlipStep { slot, from, to });
        Ok(())
    }

    async fn slide_to_word(
        &self,
        from: WordIndex,
        to: WordIndex,
        duration: Duration,
    ) -> anyhow::Result<()> {
        tokio::time::sleep(duration).await;
        let mut board = self.board.lock().await;
        board.slides.push((from, to));
        let letters = board.layout.as_ref().map(|layout| {
            BoardLayout {
                current: to,
                ..layout.clone()
            }
            .current_letters()
        });
        if let Some(letters) = letters {
            board.resting = letters;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(words: &[&str], slot_count: usize) -> BoardLayout {
        BoardLayout {
            mode: Mode::Flip,
            slot_count,
            words: words.iter().map(|w| w.to_string()).collect(),
            current: WordIndex(0),
        }
    }

    #[test]
    fn current_letters_are_uppercased_and_padded() {
        let letters = layout(&["cat", "horse"], 5).current_letters();
        assert_eq!(letters, vec!['C', 'A', 'T', ' ', ' ']);
    }

    #[tokio::test(start_paused = true)]
    async fn headless_flip_commits_incoming_letter_after_duration() {
        let renderer = HeadlessRenderer::new();
        renderer.prepare_board(&layout(&["cat"], 3)).await;
        renderer.set_slot_visual(SlotIndex(0), 'C', 'D').await;

        let started = tokio::time::Instant::now();
        renderer
            .play_transition(SlotIndex(0), Duration::from_millis(35))
            .await
            .expect("flip");

        assert!(started.elapsed() >= Duration::from_millis(35));
        assert_eq!(renderer.resting_text().await, "DAT");
        assert_eq!(
            renderer.steps().await,
            vec![FlipStep {
                slot: SlotIndex(0),
                from: 'C',
                to: 'D'
            }]
        );
    }

    #[tokio::test]
    async fn headless_flip_requires_priming() {
        let renderer = HeadlessRenderer::new();
        renderer.prepare_board(&layout(&["cat"], 3)).await;
        let err = renderer
            .play_transition(SlotIndex(1), Duration::ZERO)
            .await
            .expect_err("unprimed slot");
        assert!(err.to_string().contains("not primed"));
    }

    #[tokio::test]
    async fn detached_renderer_reports_missing_target() {
        let renderer = DetachedRenderer;
        assert!(!renderer.is_attached());
        assert!(renderer
            .play_transition(SlotIndex(0), Duration::ZERO)
            .await
            .is_err());
    }
}
