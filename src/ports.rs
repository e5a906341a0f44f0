//! Interfaces the session core drives
//!
//! The core never touches the DOM or an audio API directly; hosts plug in
//! implementations of these traits.

use crate::feedback::BannerView;
use crate::roster::Target;

/// Overlays the host can show on top of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    GameOver,
    PauseMenu,
    /// Shown while the window does not have focus
    Unfocused,
}

/// One complete frame: targets back to front plus live banners
#[derive(Debug, Clone, Default)]
pub struct FrameView<'a> {
    pub targets: Vec<&'a Target>,
    pub banners: Vec<BannerView>,
}

/// Rendering/UI port
pub trait RenderPort {
    /// Clear and redraw everything in `frame`
    fn draw(&mut self, frame: &FrameView<'_>);
    /// Countdown display (seconds)
    fn update_timer(&mut self, seconds: f32);
    /// Score / level display
    fn update_score(&mut self, score: u32);
    fn set_overlay(&mut self, overlay: Overlay, visible: bool);
}

/// Sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Primary target found
    Caught,
    /// Decoy clicked
    Penalty,
}

/// Audio port
pub trait AudioPort {
    fn play(&mut self, cue: SoundCue);
}

/// Audio port that plays nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AudioPort for Silent {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Format the countdown the way the HUD shows it
pub fn format_timer(seconds: f32) -> String {
    format!("{:.2}", seconds.max(0.0))
}
