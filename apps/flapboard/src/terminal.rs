//! Single-line split-flap board drawn on a terminal.

use std::{
    io::{self, Write},
    time::Duration,
};

use anyhow::Context;
use async_trait::async_trait;
use crossterm::style::{StyledContent, Stylize};
use render_integration::{BoardLayout, SlotRenderer};
use shared::domain::{SlotIndex, WordIndex};
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Default)]
struct TerminalBoard {
    layout: Option<BoardLayout>,
    resting: Vec<char>,
    accent: Vec<bool>,
    primed: Vec<Option<char>>,
}

impl TerminalBoard {
    fn reset_to(&mut self, letters: Vec<char>, accented: bool) {
        self.accent = vec![accented; letters.len()];
        self.primed = vec![None; letters.len()];
        self.resting = letters;
    }
}

pub struct TerminalRenderer<W> {
    board: Mutex<TerminalBoard>,
    out: Mutex<W>,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            board: Mutex::new(TerminalBoard::default()),
            out: Mutex::new(out),
        }
    }

    /// Style a slot as part of the first word, or drop that styling while it cycles.
    pub async fn mark_accent(&self, slot: SlotIndex, accent: bool) -> anyhow::Result<()> {
        let line = {
            let mut board = self.board.lock().await;
            match board.accent.get_mut(slot.0) {
                Some(flag) if *flag != accent => *flag = accent,
                _ => return Ok(()),
            }
            render_line(&board.resting, &board.accent)
        };
        self.draw(&line).await
    }

    async fn draw(&self, line: &str) -> anyhow::Result<()> {
        let mut out = self.out.lock().await;
        write!(out, "\r{line}").context("failed to write board")?;
        out.flush().context("failed to flush board")?;
        Ok(())
    }
}

fn accented(ch: char) -> StyledContent<char> {
    ch.bold().yellow()
}

/// Render resting characters, drawing accented non-blank slots in bold yellow.
pub fn render_line(resting: &[char], accent: &[bool]) -> String {
    let mut line = String::with_capacity(resting.len());
    for (slot, ch) in resting.iter().enumerate() {
        if *ch != ' ' && accent.get(slot).copied().unwrap_or(false) {
            line.push_str(&accented(*ch).to_string());
        } else {
            line.push(*ch);
        }
    }
    line
}

#[async_trait]
impl<W: Write + Send> SlotRenderer for TerminalRenderer<W> {
    async fn prepare_board(&self, layout: &BoardLayout) {
        let line = {
            let mut board = self.board.lock().await;
            board.reset_to(layout.current_letters(), layout.current.0 == 0);
            board.layout = Some(layout.clone());
            render_line(&board.resting, &board.accent)
        };
        if let Err(error) = self.draw(&line).await {
            warn!(%error, "terminal: initial draw failed");
        }
    }

    async fn set_slot_visual(&self, slot: SlotIndex, _resting: char, incoming: char) {
        let mut board = self.board.lock().await;
        if let Some(primed) = board.primed.get_mut(slot.0) {
            *primed = Some(incoming);
        }
    }

    async fn play_transition(&self, slot: SlotIndex, duration: Duration) -> anyhow::Result<()> {
        let incoming = {
            let mut board = self.board.lock().await;
            board
                .primed
                .get_mut(slot.0)
                .and_then(Option::take)
                .with_context(|| format!("slot {slot} was not primed before flipping"))?
        };

        tokio::time::sleep(duration).await;

        let line = {
            let mut board = self.board.lock().await;
            if let Some(resting) = board.resting.get_mut(slot.0) {
                *resting = incoming;
            }
            render_line(&board.resting, &board.accent)
        };
        self.draw(&line).await
    }

    async fn slide_to_word(
        &self,
        _from: WordIndex,
        to: WordIndex,
        duration: Duration,
    ) -> anyhow::Result<()> {
        tokio::time::sleep(duration).await;

        let line = {
            let mut board = self.board.lock().await;
            let letters = board
                .layout
                .as_ref()
                .map(|layout| {
                    BoardLayout {
                        current: to,
                        ..layout.clone()
                    }
                    .current_letters()
                })
                .context("board was never prepared")?;
            board.reset_to(letters, to.0 == 0);
            render_line(&board.resting, &board.accent)
        };
        self.draw(&line).await
    }
}

#[cfg(test)]
#[path = "tests/terminal_tests.rs"]
mod tests;
