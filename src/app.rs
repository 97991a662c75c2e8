// src/app.rs
use crate::config::AppSettings;
use crate::debounce::LogicalState;
use crate::detector;
use crate::session::RecognitionSession;
use crate::ui::{Decoration, UIComponents};
use crate::video::{CameraFacing, VideoSource};

use chrono::Local;
use eframe::egui;
use image::DynamicImage;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::debug;

const EVENT_LOG_LEN: usize = 8;

pub struct HandOverlayApp {
    // Core components
    session: RecognitionSession,
    video: Option<VideoSource>,

    // Frame plumbing
    last_frame: Option<DynamicImage>,
    frame_texture: Option<egui::TextureHandle>,

    // UI State
    ui_components: UIComponents,
    show_settings: bool,
    show_about: bool,
    locked_decoration: bool,
    status: String,
    status_is_error: bool,
    event_log: VecDeque<String>,

    // Settings
    settings: AppSettings,
}

impl HandOverlayApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();
        let session = RecognitionSession::new(detector::make_detector(), settings.adapter());

        let mut app = Self {
            session,
            video: None,
            last_frame: None,
            frame_texture: None,
            ui_components: UIComponents::new(&cc.egui_ctx),
            show_settings: false,
            show_about: false,
            locked_decoration: false,
            status: String::from("Ready. Start the camera to begin."),
            status_is_error: false,
            event_log: VecDeque::with_capacity(EVENT_LOG_LEN),
            settings,
        };

        app.push_event(format!("Detection backend: {}", app.session.backend_name()));

        if app.settings.auto_start_camera {
            app.start_camera();
        }

        app
    }

    fn push_event(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        if self.event_log.len() == EVENT_LOG_LEN {
            self.event_log.pop_front();
        }
        self.event_log
            .push_back(format!("{}  {}", Local::now().format("%H:%M:%S"), message));
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.status_is_error = false;
        let status = self.status.clone();
        self.push_event(status);
    }

    fn set_error_status(&mut self, status: impl Into<String>) {
        self.set_status(status);
        self.status_is_error = true;
    }

    fn start_camera(&mut self) {
        // Tear down the previous stream before switching devices.
        self.video = None;
        self.last_frame = None;

        match VideoSource::open(self.settings.facing) {
            Ok(source) => {
                let label = source.facing().label();
                self.video = Some(source);
                self.set_status(format!("Camera started ({}).", label));
            }
            Err(e) => {
                self.set_error_status(format!("Camera error: {}", e));
            }
        }
    }

    fn capture_frame(&mut self, ctx: &egui::Context) {
        let Some(video) = self.video.as_mut() else {
            return;
        };

        match video.read_frame() {
            Ok(frame) => {
                let rgba = frame.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                self.frame_texture =
                    Some(ctx.load_texture("camera-frame", color_image, Default::default()));
                self.last_frame = Some(frame);
            }
            Err(e) => {
                // Not-yet-ready frames are normal right after opening.
                debug!(error = %e, "frame not available");
                self.last_frame = None;
            }
        }
    }

    // Manual simulation triggers always reset the visual decorations first.
    fn simulate(&mut self, state: LogicalState) {
        self.locked_decoration = false;
        self.session.simulate(state, Instant::now());
        self.push_event(format!("Simulated: {}", state.caption()));
    }

    fn engage_lock(&mut self) {
        self.session.lock();
        self.locked_decoration = true;
        self.set_status("Lock active: recognition paused.");
    }

    fn mini_open(&mut self) {
        if !self.session.locked() {
            return;
        }
        self.locked_decoration = false;
        self.set_status("Mini-open: thickness reset.");
    }

    fn relax(&mut self) {
        self.session.relax(Instant::now());
        self.locked_decoration = false;
        self.set_status("Relax: unlocked.");
    }

    fn render_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            egui::menu::bar(ui, |ui| {
                ui.heading("Hand Gesture Overlay");
                ui.separator();
                ui.label(format!("Model: {}", self.session.backend_name()));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("\u{2699} Settings").clicked() {
                        self.show_settings = !self.show_settings;
                    }
                    if ui.button("\u{2139} About").clicked() {
                        self.show_about = !self.show_about;
                    }
                });
            });
            ui.add_space(8.0);
        });
    }

    fn render_main_content(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                // Left column - camera feed and HUD
                columns[0].group(|ui| {
                    ui.heading("Camera Feed");
                    self.render_video_panel(ui);
                });

                // Right column - the active hand illustration
                columns[1].group(|ui| {
                    ui.heading("Hand");
                    self.render_hand_panel(ui);
                });
            });

            ui.separator();
            let status_color = if self.status_is_error {
                self.ui_components.theme.error
            } else {
                self.ui_components.theme.text_primary
            };
            ui.horizontal(|ui| {
                ui.colored_label(status_color, &self.status);
                if self.session.frozen(Instant::now()) {
                    ui.colored_label(self.ui_components.theme.warning, "(freeze window active)");
                }
            });
            for entry in &self.event_log {
                ui.weak(entry);
            }
        });
    }

    fn render_video_panel(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_width();
        if let Some(texture) = self.frame_texture.as_ref() {
            let aspect = {
                let size = texture.size_vec2();
                size.y / size.x.max(1.0)
            };
            ui.image((texture.id(), egui::vec2(available, available * aspect)));
        } else {
            ui.centered_and_justified(|ui| {
                ui.label("No camera feed - press Start Camera");
            });
        }

        // Overlay HUD line, mirroring the on-video text of the original demo.
        ui.colored_label(self.ui_components.theme.text_secondary, self.session.hud());
    }

    fn render_hand_panel(&mut self, ui: &mut egui::Ui) {
        let decoration = if self.session.locked() && self.locked_decoration {
            Decoration::Locked
        } else {
            Decoration::Active
        };

        let state = self.session.state();
        self.ui_components.draw_hand(ui, state, decoration);
        ui.add_space(6.0);
        ui.label(state.caption());
    }

    fn render_control_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.add_space(8.0);

            // Camera row
            ui.horizontal(|ui| {
                if ui
                    .add_sized([130.0, 32.0], egui::Button::new("\u{1F3A5} Start Camera"))
                    .clicked()
                {
                    self.start_camera();
                }

                egui::ComboBox::from_id_source("facing")
                    .selected_text(self.settings.facing.label())
                    .show_ui(ui, |ui| {
                        ui.selectable_value(
                            &mut self.settings.facing,
                            CameraFacing::Front,
                            CameraFacing::Front.label(),
                        );
                        ui.selectable_value(
                            &mut self.settings.facing,
                            CameraFacing::Rear,
                            CameraFacing::Rear.label(),
                        );
                    });

                ui.separator();

                let mut percent = self.settings.score_threshold * 100.0;
                ui.label("Score threshold:");
                if ui
                    .add(egui::Slider::new(&mut percent, 0.0..=100.0).suffix(" %"))
                    .changed()
                {
                    self.settings.score_threshold = percent / 100.0;
                }

                ui.label("Max results:");
                ui.add(egui::Slider::new(&mut self.settings.max_results, 1..=10));
            });

            ui.add_space(4.0);

            // Simulation and lock row
            ui.horizontal(|ui| {
                ui.label("Simulate:");
                if ui.button("None").clicked() {
                    self.simulate(LogicalState::Relaxed);
                }
                if ui.button("Pen").clicked() {
                    self.simulate(LogicalState::Pen);
                }
                if ui.button("Phone").clicked() {
                    self.simulate(LogicalState::Phone);
                }
                if ui.button("Key").clicked() {
                    self.simulate(LogicalState::Key);
                }
                if ui.button("Salute").clicked() {
                    self.simulate(LogicalState::Salute);
                }

                ui.separator();

                let lock_label = if self.session.locked() {
                    "Lock (ON)"
                } else {
                    "Lock"
                };
                if ui.button(lock_label).clicked() {
                    self.engage_lock();
                }
                if ui.button("Mini-open").clicked() {
                    self.mini_open();
                }
                if ui.button("Relax").clicked() {
                    self.relax();
                }
            });

            ui.add_space(8.0);
        });
    }

    fn render_settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        let mut save_requested = false;

        egui::Window::new("Settings")
            .open(&mut open)
            .resizable(false)
            .default_size([360.0, 260.0])
            .show(ctx, |ui| {
                ui.heading("Recognition");

                ui.label("Score threshold:");
                ui.add(
                    egui::Slider::new(&mut self.settings.score_threshold, 0.0..=1.0)
                        .step_by(0.01),
                );

                ui.label("Max results:");
                ui.add(egui::Slider::new(&mut self.settings.max_results, 1..=10));

                ui.separator();
                ui.heading("Camera");
                egui::ComboBox::from_label("Facing")
                    .selected_text(self.settings.facing.label())
                    .show_ui(ui, |ui| {
                        ui.selectable_value(
                            &mut self.settings.facing,
                            CameraFacing::Front,
                            CameraFacing::Front.label(),
                        );
                        ui.selectable_value(
                            &mut self.settings.facing,
                            CameraFacing::Rear,
                            CameraFacing::Rear.label(),
                        );
                    });
                ui.checkbox(&mut self.settings.auto_start_camera, "Start camera on launch");

                ui.separator();
                if ui.button("Save settings").clicked() {
                    save_requested = true;
                }
            });

        self.show_settings = open;

        if save_requested {
            match self.settings.save() {
                Ok(()) => self.set_status("Settings saved."),
                Err(e) => self.set_status(format!("Failed to save settings: {}", e)),
            }
        }
    }

    fn render_about_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_about;
        egui::Window::new("About")
            .open(&mut open)
            .resizable(false)
            .default_size([360.0, 200.0])
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading("Hand Gesture Overlay");
                    ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                    ui.add_space(12.0);
                    ui.label("Shows a simulated hand illustration for gestures");
                    ui.label("inferred from a generic object-detection model.");
                    ui.add_space(12.0);
                    ui.weak(format!("Session {}", self.session.id()));
                });
            });
        self.show_about = open;
    }
}

impl eframe::App for HandOverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // The update loop doubles as the recognition polling loop: one frame
        // read and at most one detection call per repaint, strictly serial.
        self.capture_frame(ctx);

        self.session.set_adapter(self.settings.adapter());
        self.session.tick(self.last_frame.as_ref(), Instant::now());

        self.render_header(ctx);
        self.render_control_panel(ctx);
        self.render_main_content(ctx);

        if self.show_settings {
            self.render_settings_window(ctx);
        }
        if self.show_about {
            self.render_about_window(ctx);
        }

        // Keep polling even when no input events arrive.
        ctx.request_repaint();
    }
}
