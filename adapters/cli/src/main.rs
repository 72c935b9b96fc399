#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the ASCII Rogue simulation.

mod config;
mod session;

use anyhow::{Context, Result};
use ascii_rogue_rendering::{
    AtlasMetrics, FrameControl, GlyphTable, Presentation, QuadLayout, RenderingBackend,
};
use ascii_rogue_rendering_terminal::TerminalBackend;
use clap::Parser;
use log::info;

use self::{
    config::{Args, Settings},
    session::Session,
};

/// Entry point for the ASCII Rogue command-line interface.
fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let settings = Settings::load(&args)?;
    let mut session = Session::new(&settings.world).context("failed to generate world")?;

    let (width, height) = session.dimensions();
    let layout = QuadLayout::new(width, height, &AtlasMetrics::CLASSIC)?;
    let presentation = Presentation::new(
        session.welcome_banner(),
        layout,
        GlyphTable::classic()?,
        session.frame(),
    );

    info!(
        "starting {width}x{height} world with seed {} ({} ms per frame)",
        settings.world.seed, settings.display.frame_ms
    );

    TerminalBackend::stdout()
        .with_frame_dt(settings.display.frame_dt())
        .with_frame_limit(settings.display.frames)
        .with_realtime(settings.display.realtime)
        .with_clear_screen(settings.display.clear_screen)
        .run(presentation, move |dt, frame| {
            session.advance(dt, frame);
            FrameControl::Continue
        })
}
