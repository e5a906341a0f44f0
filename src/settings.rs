//! Game settings and preferences
//!
//! Persisted in LocalStorage on the web; native builds run on defaults.
//! Keys match the ones the settings page writes.

use serde::{Deserialize, Serialize};

use crate::roster::SpriteKey;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    // === Decoy sprites ===
    pub use_timothee: bool,
    pub use_valentin: bool,
    pub use_lucas: bool,
    pub use_antoine: bool,
    pub use_martin: bool,
    pub use_garance: bool,

    // === Simulation ===
    /// Randomize the draw order of targets
    pub shuffle_character_layers: bool,
    /// Fixed-step motion with interpolated positions
    pub use_interpolation: bool,
    /// Minimum aggregate movement (pixels) before the simulator reports positions
    pub movement_threshold: f32,

    // === Base difficulty ===
    pub min_icons: u32,
    pub max_icons: u32,
    pub speed: f32,

    // === Audio ===
    pub music: bool,
    #[serde(rename = "SFX")]
    pub sfx: bool,

    // === HUD ===
    #[serde(rename = "showFPS")]
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_timothee: true,
            use_valentin: true,
            use_lucas: true,
            use_antoine: true,
            use_martin: true,
            use_garance: true,

            shuffle_character_layers: true,
            use_interpolation: false,
            movement_threshold: 1.0,

            min_icons: 10,
            max_icons: 20,
            speed: 100.0,

            music: true,
            sfx: true,

            show_fps: true,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "find_maxence_settings";

    /// Parse settings from JSON; missing keys fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Settings>(json).map(Settings::normalized)
    }

    /// Repair values the game cannot run with
    pub fn normalized(mut self) -> Self {
        if self.min_icons > self.max_icons {
            std::mem::swap(&mut self.min_icons, &mut self.max_icons);
        }
        self.min_icons = self.min_icons.max(1);
        self.max_icons = self.max_icons.max(self.min_icons);
        if !self.movement_threshold.is_finite() || self.movement_threshold < 0.0 {
            self.movement_threshold = 0.0;
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            self.speed = 0.0;
        }
        self
    }

    /// Decoy sprites enabled for spawning, in catalogue order
    pub fn enabled_decoys(&self) -> Vec<SpriteKey> {
        SpriteKey::DECOYS
            .iter()
            .copied()
            .filter(|key| match key {
                SpriteKey::Timothee => self.use_timothee,
                SpriteKey::Valentin => self.use_valentin,
                SpriteKey::Lucas => self.use_lucas,
                SpriteKey::Antoine => self.use_antoine,
                SpriteKey::Martin => self.use_martin,
                SpriteKey::Garance => self.use_garance,
                SpriteKey::Maxence => false,
            })
            .collect()
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
