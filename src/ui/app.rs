//! The eframe application: toolbar, pair list, and the display surface.

use eframe::egui;

use crate::config::AppConfig;
use crate::constants::{CATALOG_PANEL_WIDTH, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};
use crate::session::EditSession;

/// Top-level application state: the session plus display plumbing.
pub struct RemaskApp {
    session: EditSession,
    config: AppConfig,
    texture: Option<egui::TextureHandle>,
    status: Option<String>,
}

impl RemaskApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        Self {
            session: EditSession::new(
                DEFAULT_WINDOW_WIDTH - CATALOG_PANEL_WIDTH,
                DEFAULT_WINDOW_HEIGHT,
            ),
            config,
            texture: None,
            status: None,
        }
    }

    fn report(&mut self, message: String) {
        log::error!("{}", message);
        self.status = Some(message);
    }

    /// Ask for a folder and load its catalog. Remembers the folder for the
    /// next launch.
    fn open_folder(&mut self) {
        let mut dialog = rfd::FileDialog::new();
        if let Some(last) = &self.config.preferences.last_folder {
            dialog = dialog.set_directory(last);
        }
        let Some(folder) = dialog.pick_folder() else {
            return;
        };
        match self.session.load_catalog(&folder) {
            Ok(count) => {
                log::info!("Catalog loaded: {} pairs in {:?}", count, folder);
                self.status = None;
                self.texture = None;
                self.config.preferences.last_folder = Some(folder);
                if let Err(e) = self.config.save_to_default_path() {
                    log::warn!("Failed to save config: {}", e);
                }
            }
            Err(e) => self.report(format!("Failed to load folder: {}", e)),
        }
    }

    /// Re-upload the session's composite to the GPU. Called only after
    /// state-mutating events.
    fn refresh_composite(&mut self, ctx: &egui::Context) {
        match self.session.render_composite() {
            Some(composite) => {
                let size = [composite.width() as usize, composite.height() as usize];
                let image = egui::ColorImage::from_rgb(size, composite.as_raw());
                match &mut self.texture {
                    Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                    None => {
                        self.texture =
                            Some(ctx.load_texture("composite", image, egui::TextureOptions::LINEAR));
                    }
                }
            }
            None => self.texture = None,
        }
    }

    fn select_pair(&mut self, ctx: &egui::Context, index: usize) {
        match self.session.select_pair(index) {
            Ok(()) => {
                self.status = None;
                self.refresh_composite(ctx);
            }
            Err(e) => self.report(format!("Failed to open pair: {}", e)),
        }
    }

    fn toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Load").clicked() {
                    self.open_folder();
                }
                if ui.button("Save").clicked() {
                    match self.session.persist_active() {
                        Ok(()) => self.status = None,
                        Err(e) => self.report(format!("Failed to save mask: {}", e)),
                    }
                }
                if ui.button("Restore").clicked() {
                    self.session.discard_active();
                    self.refresh_composite(ctx);
                }
                if let Some(status) = &self.status {
                    ui.colored_label(egui::Color32::LIGHT_RED, status);
                }
            });
        });
    }

    fn catalog_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("catalog")
            .default_width(CATALOG_PANEL_WIDTH)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let labels: Vec<String> = self
                        .session
                        .catalog()
                        .iter()
                        .map(|pair| pair.display_name())
                        .collect();
                    for (index, label) in labels.iter().enumerate() {
                        let selected = self.session.active_index() == Some(index);
                        if ui.selectable_label(selected, label).clicked() {
                            self.select_pair(ctx, index);
                        }
                    }
                });
            });
    }

    fn canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let size = ui.available_size();
                self.session.set_viewport(size.x, size.y);

                let (response, painter) = ui.allocate_painter(size, egui::Sense::click());
                let origin = response.rect.min;

                if let (Some(geometry), Some(processor), Some(texture)) = (
                    self.session.geometry().copied(),
                    self.session.processor(),
                    &self.texture,
                ) {
                    let (w, h) = geometry.scaled_size(processor.width(), processor.height());
                    let rect = egui::Rect::from_min_size(
                        origin + egui::vec2(geometry.offset_x, geometry.offset_y),
                        egui::vec2(w, h),
                    );
                    painter.image(
                        texture.id(),
                        rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                }

                if let Some(pos) = response.interact_pointer_pos() {
                    let display = pos - origin;
                    if response.clicked()
                        && self.session.handle_primary_click(display.x, display.y)
                    {
                        self.refresh_composite(ctx);
                    }
                    if response.secondary_clicked()
                        && self.session.handle_secondary_click(display.x, display.y)
                    {
                        self.refresh_composite(ctx);
                    }
                }
            });
    }
}

impl eframe::App for RemaskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.toolbar(ctx);
        self.catalog_panel(ctx);
        self.canvas(ctx);
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.session.title()));
    }
}
