use remask::RemaskApp;
use remask::config::AppConfig;
use remask::constants::APP_NAME;

fn main() -> Result<(), eframe::Error> {
    let config = AppConfig::load_from_default_path().unwrap_or_default();

    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([
                config.preferences.window_width,
                config.preferences.window_height,
            ])
            .with_min_inner_size([640.0, 480.0])
            .with_title(APP_NAME),
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| Ok(Box::new(RemaskApp::new(cc, config)))),
    )
}
