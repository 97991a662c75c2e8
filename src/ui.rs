// src/ui.rs - Theme and the pre-drawn hand visuals
use crate::debounce::LogicalState;
use anyhow::Result;
use eframe::egui::{self, Color32, Stroke};
use tracing::warn;
use usvg::TreeParsing;

#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: Color32,
    pub surface: Color32,
    pub error: Color32,
    pub warning: Color32,
    pub success: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color32::from_rgb(96, 140, 235),
            surface: Color32::from_rgb(32, 32, 40),
            error: Color32::from_rgb(244, 67, 54),
            warning: Color32::from_rgb(255, 170, 40),
            success: Color32::from_rgb(92, 190, 96),
            text_primary: Color32::WHITE,
            text_secondary: Color32::from_rgb(190, 190, 198),
        }
    }
}

/// How the active hand visual is decorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
    /// Normal highlight while recognition runs.
    Active,
    /// Distinct heavier border while the lock is engaged.
    Locked,
}

const HAND_TEXTURE_SIZE: u32 = 320;

fn asset_path(state: LogicalState) -> &'static str {
    match state {
        LogicalState::Relaxed => "assets/hand_relaxed.svg",
        LogicalState::Pen => "assets/hand_pen.svg",
        LogicalState::Phone => "assets/hand_phone.svg",
        LogicalState::Key => "assets/hand_key.svg",
        LogicalState::Salute => "assets/hand_salute.svg",
    }
}

const ALL_STATES: [LogicalState; 5] = [
    LogicalState::Relaxed,
    LogicalState::Pen,
    LogicalState::Phone,
    LogicalState::Key,
    LogicalState::Salute,
];

pub struct UIComponents {
    pub theme: Theme,
    hand_textures: Vec<(LogicalState, Option<egui::TextureHandle>)>,
}

impl UIComponents {
    pub fn new(ctx: &egui::Context) -> Self {
        let mut hand_textures = Vec::with_capacity(ALL_STATES.len());

        for state in ALL_STATES {
            let path = asset_path(state);
            let texture = match load_svg_as_rgba(path, HAND_TEXTURE_SIZE) {
                Ok(rgba) => {
                    let size = [HAND_TEXTURE_SIZE as usize, HAND_TEXTURE_SIZE as usize];
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &rgba);
                    Some(ctx.load_texture(path, color_image, Default::default()))
                }
                Err(e) => {
                    warn!(path, error = %e, "hand illustration missing, using placeholder");
                    None
                }
            };
            hand_textures.push((state, texture));
        }

        Self {
            theme: Theme::default(),
            hand_textures,
        }
    }

    fn texture_for(&self, state: LogicalState) -> Option<&egui::TextureHandle> {
        self.hand_textures
            .iter()
            .find(|(s, _)| *s == state)
            .and_then(|(_, t)| t.as_ref())
    }

    /// Draws the single active hand illustration with its decoration.
    pub fn draw_hand(&self, ui: &mut egui::Ui, state: LogicalState, decoration: Decoration) {
        let (border_color, border_width) = match decoration {
            Decoration::Active => (self.theme.success, 2.0),
            Decoration::Locked => (self.theme.warning, 5.0),
        };

        let side = ui.available_width().min(360.0).max(120.0);
        let (rect, _response) =
            ui.allocate_exact_size(egui::vec2(side, side), egui::Sense::hover());

        ui.painter()
            .rect_filled(rect, egui::Rounding::same(12.0), self.theme.surface);

        if let Some(texture) = self.texture_for(state) {
            let image_rect = rect.shrink(16.0);
            ui.painter().image(
                texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        } else {
            // Placeholder silhouette when the SVG asset is absent.
            ui.painter().circle_filled(
                rect.center(),
                rect.width() * 0.25,
                self.theme.primary.gamma_multiply(0.4),
            );
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                state.caption(),
                egui::FontId::proportional(16.0),
                self.theme.text_secondary,
            );
        }

        ui.painter().rect_stroke(
            rect,
            egui::Rounding::same(12.0),
            Stroke::new(border_width, border_color),
        );
    }
}

fn load_svg_as_rgba(path: &str, size: u32) -> Result<Vec<u8>> {
    let svg_data = std::fs::read_to_string(path)?;
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(&svg_data, &opt)?;

    let pixmap_size = tree.size.to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size, size)
        .ok_or_else(|| anyhow::anyhow!("failed to allocate pixmap"))?;

    let scale = size as f32 / pixmap_size.width().max(pixmap_size.height()) as f32;
    let transform = resvg::tiny_skia::Transform::from_scale(scale, scale);

    resvg::Tree::from_usvg(&tree).render(transform, &mut pixmap.as_mut());

    Ok(pixmap.data().to_vec())
}
