//! Score-driven difficulty
//!
//! Every round derives its target count bounds and speed from the score alone.

use rand::Rng;

use crate::consts::SPEED_PER_POINT;
use crate::settings::Settings;

/// Difficulty for one round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyParameters {
    /// Fewest targets in the round (primary included)
    pub min_count: u32,
    /// Most targets in the round (primary included)
    pub max_count: u32,
    /// Velocity magnitude scale
    pub speed: f32,
}

impl DifficultyParameters {
    /// Draw a target count uniformly from `[min_count, max_count]`
    pub fn draw_count<R: Rng>(&self, rng: &mut R) -> u32 {
        rng.random_range(self.min_count..=self.max_count)
    }
}

/// Base difficulty taken from settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyScaler {
    base_min: u32,
    base_max: u32,
    base_speed: f32,
    speed_per_point: f32,
}

impl DifficultyScaler {
    pub fn new(base_min: u32, base_max: u32, base_speed: f32) -> Self {
        // Inverted bases would break min <= max at score 0
        let (base_min, base_max) = if base_min <= base_max {
            (base_min, base_max)
        } else {
            (base_max, base_min)
        };
        Self {
            base_min: base_min.max(1),
            base_max: base_max.max(1),
            base_speed: base_speed.max(0.0),
            speed_per_point: SPEED_PER_POINT,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.min_icons, settings.max_icons, settings.speed)
    }

    /// `min = base_min + score`, `max = base_max + 2 * score`, speed grows linearly
    pub fn parameters(&self, score: u32) -> DifficultyParameters {
        DifficultyParameters {
            min_count: self.base_min.saturating_add(score),
            max_count: self.base_max.saturating_add(score.saturating_mul(2)),
            speed: self.base_speed + self.speed_per_point * score as f32,
        }
    }
}

impl Default for DifficultyScaler {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
