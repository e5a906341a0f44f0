//! Browser host pieces: 2D canvas renderer and DOM overlays

use std::collections::HashMap;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, HtmlImageElement};

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::hit::Viewport;
use crate::ports::{FrameView, Overlay, RenderPort, format_timer};
use crate::roster::SpriteKey;

const BANNER_FONT: &str = "bold 28px sans-serif";

/// Element id and CSS display value used when an overlay is shown
fn overlay_element(overlay: Overlay) -> (&'static str, &'static str) {
    match overlay {
        Overlay::GameOver => ("gameOver", "block"),
        Overlay::PauseMenu => ("pauseMenu", "flex"),
        Overlay::Unfocused => ("unfocusedNotice", "block"),
    }
}

/// Show or hide an element by id
pub fn set_display(document: &Document, id: &str, display: &str) {
    let Some(el) = document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        log::debug!("No #{} element", id);
        return;
    };
    let _ = el.style().set_property("display", display);
}

pub fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

/// Where the canvas currently sits on the page
pub fn viewport(canvas: &HtmlCanvasElement) -> Viewport {
    let rect = canvas.get_bounding_client_rect();
    Viewport {
        canvas: Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT),
        display: Vec2::new(rect.width() as f32, rect.height() as f32),
        origin: Vec2::new(rect.left() as f32, rect.top() as f32),
    }
}

/// Renders frames onto a 2D canvas and drives the HUD elements
pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    document: Document,
    sprites: HashMap<SpriteKey, HtmlImageElement>,
}

impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement, document: Document) -> Result<Self, JsValue> {
        canvas.set_width(CANVAS_WIDTH as u32);
        canvas.set_height(CANVAS_HEIGHT as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        ctx.set_image_smoothing_enabled(false);

        let mut sprites = HashMap::new();
        for key in std::iter::once(SpriteKey::PRIMARY).chain(SpriteKey::DECOYS) {
            let img = HtmlImageElement::new()?;
            img.set_src(&key.image_path());
            sprites.insert(key, img);
        }
        log::info!("Loading {} sprites", sprites.len());

        Ok(Self {
            ctx,
            document,
            sprites,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl RenderPort for CanvasRenderer {
    fn draw(&mut self, frame: &FrameView<'_>) {
        let ctx = &self.ctx;
        ctx.clear_rect(0.0, 0.0, CANVAS_WIDTH as f64, CANVAS_HEIGHT as f64);
        ctx.set_image_smoothing_enabled(false);

        for target in &frame.targets {
            let Some(img) = self.sprites.get(&target.sprite) else {
                continue;
            };
            // Not decoded yet; skip rather than draw a broken image
            if !img.complete() || img.natural_width() == 0 {
                continue;
            }
            let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                img,
                target.pos.x as f64,
                target.pos.y as f64,
                target.size.x as f64,
                target.size.y as f64,
            );
        }

        if frame.banners.is_empty() {
            return;
        }
        ctx.save();
        ctx.set_font(BANNER_FONT);
        ctx.set_text_align("center");
        for banner in &frame.banners {
            let [r, g, b] = banner.rgb;
            ctx.set_global_alpha(banner.alpha as f64);
            ctx.set_fill_style_str(&format!("rgb({r}, {g}, {b})"));
            let _ = ctx.fill_text(&banner.text, banner.pos.x as f64, banner.pos.y as f64);
        }
        ctx.restore();
    }

    fn update_timer(&mut self, seconds: f32) {
        set_text(&self.document, "time-remaining", &format_timer(seconds));
    }

    fn update_score(&mut self, score: u32) {
        set_text(&self.document, "level-number", &score.to_string());
    }

    fn set_overlay(&mut self, overlay: Overlay, visible: bool) {
        let (id, shown) = overlay_element(overlay);
        set_display(&self.document, id, if visible { shown } else { "none" });
    }
}
