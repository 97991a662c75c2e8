// src/main.rs
mod adapter;
mod app;
mod config;
mod debounce;
mod detector;
mod session;
mod ui;
mod video;

use eframe::egui;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    if let Ok(p) = std::env::current_exe() {
        eprintln!("Running from: {}", p.display());
    }

    // List the available cameras so facing-selection failures are explainable
    println!("=== Camera Detection ===");
    match nokhwa::query(nokhwa::utils::ApiBackend::Auto) {
        Ok(cameras) => {
            println!("Found {} camera(s):", cameras.len());
            for (i, camera) in cameras.iter().enumerate() {
                println!("  [{}] {}", i, camera.human_name());
            }
        }
        Err(e) => {
            println!("Failed to query cameras: {}", e);
        }
    }
    println!("========================\n");

    // Set up GUI options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([900.0, 640.0]),
        centered: true,
        ..Default::default()
    };

    // Run the application
    let result = eframe::run_native(
        "Hand Gesture Overlay",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(create_visuals());
            Box::new(app::HandOverlayApp::new(cc))
        }),
    );

    if let Err(e) = result {
        eprintln!("Error running application: {:?}", e);
    }
}

fn create_visuals() -> egui::Visuals {
    let mut visuals = egui::Visuals::dark();

    visuals.widgets.noninteractive.bg_fill = egui::Color32::from_rgb(32, 32, 40);
    visuals.widgets.inactive.bg_fill = egui::Color32::from_rgb(44, 44, 54);
    visuals.widgets.hovered.bg_fill = egui::Color32::from_rgb(56, 56, 68);
    visuals.widgets.active.bg_fill = egui::Color32::from_rgb(96, 140, 235);

    visuals.widgets.noninteractive.rounding = egui::Rounding::same(8.0);
    visuals.widgets.inactive.rounding = egui::Rounding::same(8.0);
    visuals.widgets.hovered.rounding = egui::Rounding::same(8.0);
    visuals.widgets.active.rounding = egui::Rounding::same(8.0);

    visuals.window_rounding = egui::Rounding::same(12.0);
    visuals.menu_rounding = egui::Rounding::same(8.0);

    visuals
}
