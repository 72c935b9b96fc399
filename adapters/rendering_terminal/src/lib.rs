#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless rendering backend that prints frames as plain text.
//!
//! Simulated time advances by a fixed delta per frame regardless of how long
//! a frame takes to print, so output depends only on the update closure. The
//! optional real-time mode merely sleeps between frames to make runs
//! watchable.

use anyhow::{Context, Result};
use ascii_rogue_rendering::{Frame, FrameControl, Presentation, RenderingBackend};
use log::{debug, info};
use std::{
    io::{self, Write},
    thread,
    time::Duration,
};

/// Simulated time that elapses per frame unless overridden.
pub const DEFAULT_FRAME_DT: Duration = Duration::from_millis(100);

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Rendering backend that writes each new turn's viewport to a writer.
#[derive(Debug)]
pub struct TerminalBackend<W> {
    writer: W,
    frame_dt: Duration,
    frame_limit: Option<u64>,
    realtime: bool,
    clear_screen: bool,
}

impl TerminalBackend<io::Stdout> {
    /// Creates a backend that prints to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalBackend<W> {
    /// Creates a backend that prints to `writer` without frame limit or pacing.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            frame_dt: DEFAULT_FRAME_DT,
            frame_limit: None,
            realtime: false,
            clear_screen: false,
        }
    }

    /// Sets the simulated time handed to the update closure each frame.
    #[must_use]
    pub fn with_frame_dt(mut self, frame_dt: Duration) -> Self {
        self.frame_dt = frame_dt;
        self
    }

    /// Stops the run after `limit` updates. `None` runs until the closure exits.
    #[must_use]
    pub fn with_frame_limit(mut self, limit: Option<u64>) -> Self {
        self.frame_limit = limit;
        self
    }

    /// Sleeps for the frame delta between frames when enabled.
    #[must_use]
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Clears the terminal before each printed frame when enabled.
    #[must_use]
    pub fn with_clear_screen(mut self, clear_screen: bool) -> Self {
        self.clear_screen = clear_screen;
        self
    }

    fn present(&mut self, frame: &Frame) -> Result<()> {
        if self.clear_screen {
            self.writer
                .write_all(CLEAR_SCREEN.as_bytes())
                .context("failed to clear terminal")?;
        }
        writeln!(self.writer, "{}", frame.viewport)
            .and_then(|()| writeln!(self.writer))
            .with_context(|| format!("failed to print frame for turn {}", frame.turn))?;
        debug!("presented turn {}", frame.turn);
        Ok(())
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_frame: F) -> anyhow::Result<()>
    where
        F: FnMut(Duration, &mut Frame) -> FrameControl + 'static,
    {
        writeln!(self.writer, "{}", presentation.window_title)
            .context("failed to print window title")?;

        let mut frame = presentation.frame;
        self.present(&frame)?;
        let mut presented_turn = frame.turn;
        let mut frames = 0_u64;

        while self.frame_limit.map_or(true, |limit| frames < limit) {
            let control = update_frame(self.frame_dt, &mut frame);
            frames += 1;

            if frame.turn != presented_turn {
                self.present(&frame)?;
                presented_turn = frame.turn;
            }
            if control == FrameControl::Exit {
                break;
            }
            if self.realtime {
                thread::sleep(self.frame_dt);
            }
        }

        self.writer.flush().context("failed to flush terminal output")?;
        info!("terminal backend stopped after {frames} frames at turn {presented_turn}");
        Ok(())
    }
}
