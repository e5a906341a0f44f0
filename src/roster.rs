//! Sprite catalogue and round roster building
//!
//! The roster and the simulator targets built here are index-aligned: entry `i`
//! of one always describes the same character as entry `i` of the other.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::difficulty::DifficultyParameters;
use crate::settings::Settings;
use crate::sim::SimTarget;

/// Character sprites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpriteKey {
    Maxence,
    Timothee,
    Valentin,
    Lucas,
    Antoine,
    Martin,
    Garance,
}

impl SpriteKey {
    /// The character the player is looking for
    pub const PRIMARY: SpriteKey = SpriteKey::Maxence;

    /// Every decoy, in catalogue order
    pub const DECOYS: [SpriteKey; 6] = [
        SpriteKey::Timothee,
        SpriteKey::Valentin,
        SpriteKey::Lucas,
        SpriteKey::Antoine,
        SpriteKey::Martin,
        SpriteKey::Garance,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SpriteKey::Maxence => "maxence",
            SpriteKey::Timothee => "timothee",
            SpriteKey::Valentin => "valentin",
            SpriteKey::Lucas => "lucas",
            SpriteKey::Antoine => "antoine",
            SpriteKey::Martin => "martin",
            SpriteKey::Garance => "garance",
        }
    }

    /// Drawn size in canvas pixels
    pub fn size(&self) -> Vec2 {
        match self {
            SpriteKey::Maxence => Vec2::new(60.0, 77.0),
            _ => Vec2::new(60.0, 83.0),
        }
    }

    /// Image path relative to the site root
    pub fn image_path(&self) -> String {
        format!("img/character/{}.png", self.name())
    }
}

/// A character on the canvas
///
/// Positions mirror the simulator's authoritative copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: u32,
    pub sprite: SpriteKey,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub is_primary: bool,
}

impl Target {
    /// Inclusive bounding-box containment
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.pos.x
            && point.x <= self.pos.x + self.size.x
            && point.y >= self.pos.y
            && point.y <= self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

/// The targets of the current round
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    pub targets: Vec<Target>,
    /// Permutation of target indices, back to front
    pub draw_order: Vec<usize>,
}

impl Roster {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn clear(&mut self) {
        self.targets.clear();
        self.draw_order.clear();
    }

    pub fn primary(&self) -> Option<&Target> {
        self.targets.iter().find(|t| t.is_primary)
    }

    /// Targets back to front
    pub fn in_draw_order(&self) -> impl Iterator<Item = &Target> {
        self.draw_order.iter().filter_map(|&i| self.targets.get(i))
    }

    /// Drop every decoy, leaving the primary alone on the canvas
    pub fn keep_primary_only(&mut self) {
        self.targets.retain(|t| t.is_primary);
        self.draw_order = (0..self.targets.len()).collect();
    }

    /// Overwrite positions index by index; the caller has validated the length
    pub fn apply_positions(&mut self, positions: &[Vec2]) {
        for (target, pos) in self.targets.iter_mut().zip(positions) {
            target.pos = *pos;
        }
    }
}

/// Build a round: the canvas roster and its index-aligned simulator targets
///
/// `next_id` is advanced so ids stay unique across rounds.
pub fn build_round<R: Rng>(
    settings: &Settings,
    params: &DifficultyParameters,
    rng: &mut R,
    next_id: &mut u32,
) -> (Roster, Vec<SimTarget>) {
    let count = params.draw_count(rng).max(1) as usize;
    let decoys = settings.enabled_decoys();
    let speed = params.speed;

    let mut sprites = Vec::with_capacity(count);
    sprites.push(SpriteKey::PRIMARY);
    if !decoys.is_empty() {
        sprites.extend((0..count - 1).map(|i| decoys[i % decoys.len()]));
    }

    let mut roster = Roster {
        targets: Vec::with_capacity(sprites.len()),
        draw_order: (0..sprites.len()).collect(),
    };
    let mut sim_targets = Vec::with_capacity(sprites.len());

    for sprite in sprites {
        let size = sprite.size();
        let pos = Vec2::new(
            rng.random::<f32>() * (CANVAS_WIDTH - size.x).max(0.0),
            rng.random::<f32>() * (CANVAS_HEIGHT - size.y).max(0.0),
        );
        let vel = Vec2::new(
            (rng.random::<f32>() - 0.5) * speed,
            (rng.random::<f32>() - 0.5) * speed,
        );

        roster.targets.push(Target {
            id: *next_id,
            sprite,
            pos,
            size,
            is_primary: sprite == SpriteKey::PRIMARY,
        });
        sim_targets.push(SimTarget { pos, vel, size });
        *next_id += 1;
    }

    if settings.shuffle_character_layers {
        roster.draw_order.shuffle(rng);
    }

    (roster, sim_targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyScaler;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn build(settings: &Settings, score: u32, seed: u64) -> (Roster, Vec<SimTarget>) {
        let params = DifficultyScaler::from_settings(settings).parameters(score);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut next_id = 1;
        build_round(settings, &params, &mut rng, &mut next_id)
    }

    #[test]
    fn test_exactly_one_primary() {
        for seed in 0..20 {
            let (roster, _) = build(&Settings::default(), seed as u32, seed);
            assert_eq!(roster.targets.iter().filter(|t| t.is_primary).count(), 1);
            assert_eq!(roster.targets[0].sprite, SpriteKey::PRIMARY);
        }
    }

    #[test]
    fn test_count_within_bounds_and_aligned() {
        let settings = Settings::default();
        for score in 0..5 {
            let params = DifficultyScaler::from_settings(&settings).parameters(score);
            let (roster, sim) = build(&settings, score, 42 + score as u64);
            let n = roster.len() as u32;
            assert!(n >= params.min_count && n <= params.max_count);
            assert_eq!(sim.len(), roster.len());
            for (target, sim_target) in roster.targets.iter().zip(&sim) {
                assert_eq!(target.pos, sim_target.pos);
                assert_eq!(target.size, sim_target.size);
            }
        }
    }

    #[test]
    fn test_decoys_round_robin_over_enabled() {
        let settings = Settings {
            use_timothee: false,
            use_lucas: false,
            use_antoine: false,
            use_martin: false,
            min_icons: 5,
            max_icons: 5,
            ..Default::default()
        };
        let (roster, _) = build(&settings, 0, 1);
        let sprites: Vec<_> = roster.targets.iter().map(|t| t.sprite).collect();
        assert_eq!(
            sprites,
            vec![
                SpriteKey::Maxence,
                SpriteKey::Valentin,
                SpriteKey::Garance,
                SpriteKey::Valentin,
                SpriteKey::Garance,
            ]
        );
    }

    #[test]
    fn test_no_decoys_leaves_primary_alone() {
        let settings = Settings {
            use_timothee: false,
            use_valentin: false,
            use_lucas: false,
            use_antoine: false,
            use_martin: false,
            use_garance: false,
            ..Default::default()
        };
        let (roster, sim) = build(&settings, 0, 3);
        assert_eq!(roster.len(), 1);
        assert_eq!(sim.len(), 1);
        assert!(roster.targets[0].is_primary);
    }

    #[test]
    fn test_shuffle_only_touches_draw_order() {
        let settings = Settings {
            min_icons: 15,
            max_icons: 15,
            ..Default::default()
        };
        let (roster, _) = build(&settings, 0, 9);
        let mut order = roster.draw_order.clone();
        order.sort_unstable();
        assert_eq!(order, (0..roster.len()).collect::<Vec<_>>());
        // Roster itself stays in spawn order
        assert!(roster.targets[0].is_primary);

        let unshuffled = Settings {
            shuffle_character_layers: false,
            ..settings
        };
        let (roster, _) = build(&unshuffled, 0, 9);
        assert_eq!(roster.draw_order, (0..roster.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_spawns_inside_canvas_with_scaled_speed() {
        let settings = Settings {
            speed: 100.0,
            ..Default::default()
        };
        let (roster, sim) = build(&settings, 4, 11);
        let half = (100.0 + 4.0 * crate::consts::SPEED_PER_POINT) / 2.0;
        for (target, sim_target) in roster.targets.iter().zip(&sim) {
            assert!(target.pos.x >= 0.0 && target.pos.x + target.size.x <= CANVAS_WIDTH);
            assert!(target.pos.y >= 0.0 && target.pos.y + target.size.y <= CANVAS_HEIGHT);
            assert!(sim_target.vel.x.abs() <= half && sim_target.vel.y.abs() <= half);
        }
    }

    #[test]
    fn test_ids_continue_across_rounds() {
        let settings = Settings::default();
        let params = DifficultyScaler::from_settings(&settings).parameters(0);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut next_id = 1;
        let (first, _) = build_round(&settings, &params, &mut rng, &mut next_id);
        let (second, _) = build_round(&settings, &params, &mut rng, &mut next_id);
        let last_first = first.targets.last().map(|t| t.id).unwrap();
        assert_eq!(second.targets[0].id, last_first + 1);
    }

    #[test]
    fn test_keep_primary_only() {
        let (mut roster, _) = build(&Settings::default(), 0, 2);
        roster.keep_primary_only();
        assert_eq!(roster.len(), 1);
        assert!(roster.targets[0].is_primary);
        assert_eq!(roster.draw_order, vec![0]);
    }
}
