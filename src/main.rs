mod app;
mod config;
mod dialog;
mod error;
mod export;
mod input;
mod mapping;
mod notify;
mod overlay;
mod poller;
mod profile;
mod session;
mod snippet;

use app::PadMapApp;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([960.0, 540.0])
            .with_title("FTC Gamepad Mapper"),
        ..Default::default()
    };

    eframe::run_native(
        "FTC Gamepad Mapper",
        native_options,
        Box::new(|cc| Ok(Box::new(PadMapApp::new(cc)))),
    )
}
