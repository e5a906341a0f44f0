//! Pointer hit testing
//!
//! The canvas is scaled uniformly to fit its container, so a click has to be
//! mapped back through the letterbox before it can be compared with target boxes.

use glam::Vec2;

use crate::roster::Target;

/// A raw pointer event in client (page) coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub client: Vec2,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            client: Vec2::new(x, y),
        }
    }
}

/// Where the canvas sits on the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Canvas backing size in pixels
    pub canvas: Vec2,
    /// Displayed (CSS) size of the element
    pub display: Vec2,
    /// Top-left of the element in client coordinates
    pub origin: Vec2,
}

impl Viewport {
    /// Canvas shown at its native size at the page origin
    pub fn identity(canvas: Vec2) -> Self {
        Self {
            canvas,
            display: canvas,
            origin: Vec2::ZERO,
        }
    }
}

/// Uniform scale plus the centring offset left by letterboxing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub offset: Vec2,
}

impl Letterbox {
    /// Fit `canvas` into `display` preserving aspect ratio
    ///
    /// Returns `None` for degenerate sizes, where no mapping exists.
    pub fn fit(canvas: Vec2, display: Vec2) -> Option<Self> {
        let scale = (display.x / canvas.x).min(display.y / canvas.y);
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }
        let offset = (display - canvas * scale) / 2.0;
        Some(Self { scale, offset })
    }

    /// Element-local display coordinates -> canvas coordinates
    pub fn to_canvas(&self, display: Vec2) -> Vec2 {
        (display - self.offset) / self.scale
    }

    /// Canvas coordinates -> element-local display coordinates
    pub fn to_display(&self, canvas: Vec2) -> Vec2 {
        canvas * self.scale + self.offset
    }
}

/// What a click struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Roster index of the primary target
    Primary(usize),
    /// Roster index of the first decoy containing the point
    Decoy(usize),
}

/// Map a pointer event into canvas space
pub fn pointer_to_canvas(event: &PointerEvent, viewport: &Viewport) -> Option<Vec2> {
    let letterbox = Letterbox::fit(viewport.canvas, viewport.display)?;
    Some(letterbox.to_canvas(event.client - viewport.origin))
}

/// Resolve a canvas point against the roster
///
/// The primary target wins over any overlapping decoy.
pub fn resolve(point: Vec2, targets: &[Target]) -> Option<Hit> {
    if let Some(i) = targets
        .iter()
        .position(|t| t.is_primary && t.contains(point))
    {
        return Some(Hit::Primary(i));
    }
    targets
        .iter()
        .position(|t| !t.is_primary && t.contains(point))
        .map(Hit::Decoy)
}

/// Map and resolve in one go
pub fn hit_test(event: &PointerEvent, viewport: &Viewport, targets: &[Target]) -> Option<(Vec2, Hit)> {
    let point = pointer_to_canvas(event, viewport)?;
    resolve(point, targets).map(|hit| (point, hit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::SpriteKey;
    use proptest::prelude::*;

    const CANVAS: Vec2 = Vec2::new(960.0, 540.0);

    fn target(id: u32, x: f32, y: f32, primary: bool) -> Target {
        let sprite = if primary {
            SpriteKey::Maxence
        } else {
            SpriteKey::Lucas
        };
        Target {
            id,
            sprite,
            pos: Vec2::new(x, y),
            size: sprite.size(),
            is_primary: primary,
        }
    }

    #[test]
    fn test_pillarbox_offset() {
        // Wider container than 16:9: bars left and right
        let lb = Letterbox::fit(CANVAS, Vec2::new(1920.0, 540.0)).unwrap();
        assert_eq!(lb.scale, 1.0);
        assert_eq!(lb.offset, Vec2::new(480.0, 0.0));
    }

    #[test]
    fn test_letterbox_offset_and_scale() {
        // Half-size canvas in a taller container: bars top and bottom
        let lb = Letterbox::fit(CANVAS, Vec2::new(480.0, 400.0)).unwrap();
        assert_eq!(lb.scale, 0.5);
        assert_eq!(lb.offset, Vec2::new(0.0, (400.0 - 270.0) / 2.0));
        assert_eq!(lb.to_canvas(Vec2::new(240.0, 200.0)), Vec2::new(480.0, 270.0));
    }

    #[test]
    fn test_pointer_to_canvas_accounts_for_origin() {
        let viewport = Viewport {
            canvas: CANVAS,
            display: Vec2::new(1920.0, 1080.0),
            origin: Vec2::new(10.0, 20.0),
        };
        let point = pointer_to_canvas(&PointerEvent::new(210.0, 220.0), &viewport).unwrap();
        assert_eq!(point, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_degenerate_display_maps_nothing() {
        let viewport = Viewport {
            canvas: CANVAS,
            display: Vec2::ZERO,
            origin: Vec2::ZERO,
        };
        assert!(pointer_to_canvas(&PointerEvent::new(1.0, 1.0), &viewport).is_none());
    }

    #[test]
    fn test_primary_wins_over_overlapping_decoy() {
        // Decoy listed first and overlapping the primary
        let targets = vec![target(1, 100.0, 100.0, false), target(2, 110.0, 110.0, true)];
        assert_eq!(resolve(Vec2::new(120.0, 120.0), &targets), Some(Hit::Primary(1)));
    }

    #[test]
    fn test_first_decoy_in_roster_order() {
        let targets = vec![
            target(1, 500.0, 300.0, true),
            target(2, 100.0, 100.0, false),
            target(3, 105.0, 105.0, false),
        ];
        assert_eq!(resolve(Vec2::new(110.0, 110.0), &targets), Some(Hit::Decoy(1)));
    }

    #[test]
    fn test_edges_are_inclusive_and_misses_are_none() {
        let targets = vec![target(1, 100.0, 100.0, true)];
        assert_eq!(resolve(Vec2::new(160.0, 177.0), &targets), Some(Hit::Primary(0)));
        assert_eq!(resolve(Vec2::new(160.1, 120.0), &targets), None);
        assert_eq!(resolve(Vec2::new(10.0, 10.0), &[]), None);
    }

    #[test]
    fn test_hit_test_through_scaled_viewport() {
        let targets = vec![target(1, 400.0, 200.0, true)];
        let viewport = Viewport {
            canvas: CANVAS,
            display: Vec2::new(480.0, 400.0),
            origin: Vec2::ZERO,
        };
        // Canvas (420, 220) -> display (210, 110 + 65)
        let (point, hit) = hit_test(&PointerEvent::new(210.0, 175.0), &viewport, &targets).unwrap();
        assert_eq!(hit, Hit::Primary(0));
        assert_eq!(point, Vec2::new(420.0, 220.0));
    }

    proptest! {
        #[test]
        fn identity_transform_round_trips(x in 0.0f32..960.0, y in 0.0f32..540.0) {
            let lb = Letterbox::fit(CANVAS, CANVAS).unwrap();
            prop_assert_eq!(lb.scale, 1.0);
            prop_assert_eq!(lb.offset, Vec2::ZERO);
            let p = Vec2::new(x, y);
            prop_assert_eq!(lb.to_display(lb.to_canvas(p)), p);
        }

        #[test]
        fn scaled_transform_round_trips(w in 100.0f32..4000.0, h in 100.0f32..4000.0, x in 0.0f32..1.0, y in 0.0f32..1.0) {
            let lb = Letterbox::fit(CANVAS, Vec2::new(w, h)).unwrap();
            let p = Vec2::new(x * w, y * h);
            let back = lb.to_display(lb.to_canvas(p));
            prop_assert!((back - p).abs().max_element() < 1e-2);
        }
    }
}
