#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use yama::BackgroundConfig;

// When compiling natively:
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    use std::sync::mpsc;

    use yama::{Background, BackgroundApp, NativeHost};

    const WINDOW_SIZE: (u32, u32) = (1280, 800);

    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("yama")
            .with_inner_size([WINDOW_SIZE.0 as f32, WINDOW_SIZE.1 as f32])
            .with_transparent(true),
        ..Default::default()
    };
    eframe::run_native(
        "yama",
        native_options,
        Box::new(|cc| {
            let mut host = NativeHost::new(WINDOW_SIZE.0, WINDOW_SIZE.1);
            let background = Background::boot(&mut host, BackgroundConfig::default())?
                .ok_or("reduced motion requested")?;
            // the window raises no events of its own beyond what egui reports
            let (_sender, events) = mpsc::channel();
            Ok(Box::new(BackgroundApp::new(cc, background, events)?))
        }),
    )
}

// When compiling to web using trunk:
#[cfg(target_arch = "wasm32")]
fn main() {
    // Redirect `log` message to `console.log` and friends:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    wasm_bindgen_futures::spawn_local(yama::web::start(BackgroundConfig::default()));
}
