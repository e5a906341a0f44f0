//! Floating bonus/penalty text
//!
//! Banners run on their own clock: they fade out over a fixed window whatever
//! the session is doing, and are dropped once expired.

use glam::Vec2;

use crate::consts::{BANNER_LIFETIME_MS, BANNER_RISE};

/// Banner flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Bonus,
    Penalty,
}

impl BannerKind {
    /// RGB colour (green for bonus, red for penalty)
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            BannerKind::Bonus => [0x2e, 0xcc, 0x40],
            BannerKind::Penalty => [0xff, 0x41, 0x36],
        }
    }
}

/// A transient line of text at a canvas position
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackBanner {
    pub pos: Vec2,
    pub text: String,
    pub kind: BannerKind,
    /// Creation time (ms)
    pub start: f64,
}

impl FeedbackBanner {
    pub fn bonus(pos: Vec2, seconds: f32, now: f64) -> Self {
        Self {
            pos,
            text: format!("+{}", seconds),
            kind: BannerKind::Bonus,
            start: now,
        }
    }

    pub fn penalty(pos: Vec2, seconds: f32, now: f64) -> Self {
        Self {
            pos,
            text: format!("-{}", seconds),
            kind: BannerKind::Penalty,
            start: now,
        }
    }

    /// Fraction of the lifetime elapsed, clamped to [0, 1]
    fn progress(&self, now: f64) -> f32 {
        ((now - self.start) / BANNER_LIFETIME_MS).clamp(0.0, 1.0) as f32
    }

    /// Opacity, fading linearly from 1 to 0
    pub fn alpha(&self, now: f64) -> f32 {
        1.0 - self.progress(now)
    }

    /// Drawn position, drifting upward as it fades
    pub fn position(&self, now: f64) -> Vec2 {
        self.pos - Vec2::new(0.0, BANNER_RISE * self.progress(now))
    }

    pub fn is_expired(&self, now: f64) -> bool {
        now - self.start >= BANNER_LIFETIME_MS
    }
}

/// A banner ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct BannerView {
    pub pos: Vec2,
    pub text: String,
    pub rgb: [u8; 3],
    pub alpha: f32,
}

/// Active banners
#[derive(Debug, Clone, Default)]
pub struct FeedbackOverlay {
    banners: Vec<FeedbackBanner>,
}

impl FeedbackOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, banner: FeedbackBanner) {
        self.banners.push(banner);
    }

    /// Drop expired banners; returns true if any were removed
    pub fn prune(&mut self, now: f64) -> bool {
        let before = self.banners.len();
        self.banners.retain(|b| !b.is_expired(now));
        self.banners.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.banners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.banners.len()
    }

    pub fn banners(&self) -> &[FeedbackBanner] {
        &self.banners
    }

    /// Live banners with their current position and opacity
    pub fn views(&self, now: f64) -> Vec<BannerView> {
        self.banners
            .iter()
            .filter(|b| !b.is_expired(now))
            .map(|b| BannerView {
                pos: b.position(now),
                text: b.text.clone(),
                rgb: b.kind.rgb(),
                alpha: b.alpha(now),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_text() {
        assert_eq!(FeedbackBanner::bonus(Vec2::ZERO, 5.0, 0.0).text, "+5");
        assert_eq!(FeedbackBanner::penalty(Vec2::ZERO, 10.0, 0.0).text, "-10");
    }

    #[test]
    fn test_linear_fade() {
        let banner = FeedbackBanner::bonus(Vec2::new(100.0, 100.0), 5.0, 1000.0);
        assert_eq!(banner.alpha(1000.0), 1.0);
        assert!((banner.alpha(1600.0) - 0.5).abs() < 1e-6);
        assert_eq!(banner.alpha(2200.0), 0.0);
        // Before creation counts as fully opaque
        assert_eq!(banner.alpha(900.0), 1.0);
    }

    #[test]
    fn test_drifts_upward() {
        let banner = FeedbackBanner::penalty(Vec2::new(100.0, 100.0), 10.0, 0.0);
        assert_eq!(banner.position(0.0), Vec2::new(100.0, 100.0));
        assert_eq!(banner.position(600.0), Vec2::new(100.0, 100.0 - BANNER_RISE / 2.0));
    }

    #[test]
    fn test_expiry_and_prune() {
        let mut overlay = FeedbackOverlay::new();
        overlay.push(FeedbackBanner::bonus(Vec2::ZERO, 5.0, 0.0));
        overlay.push(FeedbackBanner::penalty(Vec2::ZERO, 10.0, 1000.0));

        assert_eq!(overlay.views(500.0).len(), 2);
        assert!(!overlay.prune(1199.0));
        assert!(overlay.prune(1200.0));
        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay.banners()[0].kind, BannerKind::Penalty);

        assert!(overlay.views(2200.0).is_empty());
        assert!(overlay.prune(2200.0));
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_view_carries_colour() {
        let mut overlay = FeedbackOverlay::new();
        overlay.push(FeedbackBanner::bonus(Vec2::ZERO, 5.0, 0.0));
        let views = overlay.views(0.0);
        assert_eq!(views[0].rgb, BannerKind::Bonus.rgb());
        assert_eq!(views[0].alpha, 1.0);
    }
}
