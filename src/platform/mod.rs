//! Platform abstraction layer
//!
//! Browser-specific hosts live in `web` (canvas renderer, DOM overlays).
//! Anything here that is not behind `cfg(wasm32)` is shared by every host.

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Number of frames averaged for the FPS readout
const FPS_WINDOW: usize = 60;

/// Frames per second over the last `FPS_WINDOW` frames
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frame_times: [f64; FPS_WINDOW],
    frame_index: usize,
    filled: bool,
    fps: u32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frame_times: [0.0; FPS_WINDOW],
            frame_index: 0,
            filled: false,
            fps: 0,
        }
    }

    /// Record a frame timestamp (ms) and return the current estimate
    pub fn record(&mut self, time: f64) -> u32 {
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;
        if self.frame_index == 0 {
            self.filled = true;
        }

        // Oldest sample sits at the next write slot once the ring is full
        let (oldest, frames) = if self.filled {
            (self.frame_times[self.frame_index], FPS_WINDOW - 1)
        } else {
            (self.frame_times[0], self.frame_index.saturating_sub(1))
        };
        let elapsed = time - oldest;
        if frames > 0 && elapsed > 0.0 {
            self.fps = (frames as f64 * 1000.0 / elapsed).round() as u32;
        }
        self.fps
    }
}
