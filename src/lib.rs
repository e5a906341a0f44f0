//! Find Maxence - a timed spot-the-character game
//!
//! Core modules:
//! - `session`: Session state machine, countdown and the controller that drives a round
//! - `sim`: Target motion simulator running on its own execution unit
//! - `difficulty`: Score-driven target counts and speeds
//! - `roster`: Sprite catalogue and round roster building
//! - `hit`: Pointer-to-canvas mapping and target hit resolution
//! - `feedback`: Floating bonus/penalty text
//! - `ports`: Rendering and audio interfaces the core talks to
//! - `leaderboard`: Score submission validation, record store and HTTP client
//! - `platform`: Browser host pieces (canvas renderer, overlays) and shared helpers

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod difficulty;
pub mod feedback;
pub mod hit;
pub mod leaderboard;
pub mod platform;
pub mod ports;
pub mod roster;
pub mod session;
pub mod settings;
pub mod sim;

pub use leaderboard::{LeaderboardEntry, LeaderboardError, MemoryLeaderboard, ScoreReporter};
pub use session::{GameSession, Phase, SessionController};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Logical canvas size (pixels)
    pub const CANVAS_WIDTH: f32 = 960.0;
    pub const CANVAS_HEIGHT: f32 = 540.0;

    /// Countdown start value and hard cap (seconds)
    pub const START_TIME: f32 = 60.0;
    pub const MAX_TIME: f32 = 60.0;
    /// Time granted for finding the primary target
    pub const TIME_BONUS: f32 = 5.0;
    /// Time lost for clicking a decoy
    pub const TIME_PENALTY: f32 = 10.0;

    /// Freeze on the found target before the next round (ms)
    pub const ROUND_WON_DELAY_MS: f64 = 3000.0;
    /// Clicks are ignored for this long after a penalty (ms)
    pub const INVINCIBILITY_MS: f64 = 500.0;
    /// Feedback banner lifetime (ms)
    pub const BANNER_LIFETIME_MS: f64 = 1200.0;
    /// Upward drift of a banner over its lifetime (pixels)
    pub const BANNER_RISE: f32 = 40.0;

    /// Fixed simulation timestep used when interpolating (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per animate request to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest single variable step (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Extra velocity per point of score
    pub const SPEED_PER_POINT: f32 = 10.0;
}
