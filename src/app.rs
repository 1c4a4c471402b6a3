use crate::config::AppConfig;
use crate::error::MapError;
use crate::export::{self, PixelRect, SaveResult, MAPPING_EXTENSION};
use crate::input::{InputEvent, InputReader};
use crate::mapping::{MappingStore, PressSemantics};
use crate::notify::{NoticeLevel, Notifications};
use crate::overlay::{self, LabelRole, Primitive, TextAnchor};
use crate::poller::{ConnectionState, PollerEvent};
use crate::profile::{self, DeviceProfile, Point};
use crate::session::MappingSession;
use crate::snippet;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Give up on a screenshot the backend never delivers
const CAPTURE_TIMEOUT: Duration = Duration::from_secs(3);

const TITLE_COLOR: egui::Color32 = egui::Color32::WHITE;
const FUNCTION_COLOR: egui::Color32 = egui::Color32::from_rgb(0x73, 0x73, 0x73);
const BACKDROP_COLOR: egui::Color32 = egui::Color32::from_rgb(9, 9, 11);

struct PendingCapture {
    path: PathBuf,
    rect: egui::Rect,
    requested_at: Instant,
}

pub struct PadMapApp {
    config: AppConfig,
    profile: &'static DeviceProfile,
    store: MappingStore,
    input_reader: Option<InputReader>,
    session: MappingSession,
    notices: Notifications,

    background: Option<egui::TextureHandle>,
    pending_capture: Option<PendingCapture>,
    save_tx: Sender<SaveResult>,
    save_rx: Receiver<SaveResult>,
}

impl PadMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = AppConfig::load().unwrap_or_default();
        let profile = profile::f310();
        let mut notices = Notifications::new(config.notification_lifetime());

        let image_path = profile.image_path(&config.resolved_asset_dir());
        let background = match export::load_background(&image_path) {
            Ok(rgba) => {
                let size = [rgba.width() as usize, rgba.height() as usize];
                let image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                Some(cc.egui_ctx.load_texture("gamepad", image, egui::TextureOptions::LINEAR))
            }
            Err(e) => {
                notices.error(e.to_string());
                None
            }
        };

        let mut input_reader = match InputReader::new() {
            Ok(reader) => Some(reader),
            Err(e) => {
                log::error!("Failed to initialize input reader: {}", e);
                None
            }
        };
        let initial_events = input_reader
            .as_mut()
            .map(|reader| reader.initial_events())
            .unwrap_or_default();

        let (save_tx, save_rx) = crossbeam_channel::unbounded();

        let mut app = Self {
            session: MappingSession::new(profile, config.settle_delay()),
            config,
            profile,
            store: MappingStore::new(profile),
            input_reader,
            notices,
            background,
            pending_capture: None,
            save_tx,
            save_rx,
        };
        app.handle_input_events(initial_events, Instant::now());
        app
    }

    fn handle_input_events(&mut self, events: Vec<InputEvent>, now: Instant) {
        for event in events {
            match self.session.handle_input_event(event, now) {
                Some(PollerEvent::Connected) => self.notices.success("Gamepad connected!"),
                Some(PollerEvent::Disconnected) => self.notices.warning("Gamepad disconnected!"),
                _ => {}
            }
        }
    }

    fn process_inputs(&mut self, now: Instant) {
        let Some(ref mut reader) = self.input_reader else {
            return;
        };
        let events = reader.poll();
        let snapshot = reader.snapshot();

        self.handle_input_events(events, now);
        self.session.tick(&self.store, now, snapshot.as_ref());
    }

    fn remember_dir(&mut self, path: &Path) {
        let dir = path.parent().map(Path::to_path_buf);
        if dir != self.config.export_dir {
            self.config.export_dir = dir;
            if let Err(e) = self.config.save() {
                log::error!("Failed to save config: {}", e);
            }
        }
    }

    fn save_dialog(&self, filter: &str, extension: &str) -> Option<PathBuf> {
        let now = chrono::Local::now().naive_local();
        let mut dialog = rfd::FileDialog::new()
            .add_filter(filter, &[extension])
            .set_file_name(export::default_file_name(self.profile.name, extension, now));
        if let Some(ref dir) = self.config.export_dir {
            dialog = dialog.set_directory(dir);
        }
        dialog.save_file()
    }

    fn export_mapping(&mut self) {
        let Some(path) = self.save_dialog("Gamepad mapping", MAPPING_EXTENSION) else {
            return;
        };
        match export::export_json(&self.store, &path) {
            Ok(()) => self.notices.success("Exported JSON successfully!"),
            Err(e) => self.notices.error(format!("JSON export failed: {}", e)),
        }
        self.remember_dir(&path);
    }

    fn import_mapping(&mut self) {
        let mut dialog = rfd::FileDialog::new()
            .add_filter("Gamepad mapping", &[MAPPING_EXTENSION])
            .set_title("Import Mapping");
        if let Some(ref dir) = self.config.export_dir {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.pick_file() else {
            return;
        };

        match export::import_json(&mut self.store, &path) {
            Ok(count) => self
                .notices
                .success(format!("Imported {} controls from {}", count, path.display())),
            Err(MapError::Parse(e)) => self.notices.error(format!("Invalid mapping file: {}", e)),
            Err(e) => self.notices.error(format!("Import failed: {}", e)),
        }
        self.remember_dir(&path);
    }

    fn clear_mapping(&mut self) {
        if self.store.is_empty() {
            self.notices.info("Nothing is mapped yet");
            return;
        }
        self.store.clear();
        self.notices.success("Cleared all mappings");
    }

    fn copy_code(&mut self, ctx: &egui::Context) {
        let code = snippet::listing(self.profile, &self.store);
        if code.is_empty() {
            self.notices.info("No mapped controls are marked for export");
            return;
        }
        ctx.copy_text(code);
        self.notices.success("Copied code to clipboard");
    }

    fn export_svg(&mut self) {
        let Some(path) = self.save_dialog("SVG image", "svg") else {
            return;
        };
        let image_path = self.profile.image_path(&self.config.resolved_asset_dir());
        let href = std::fs::canonicalize(&image_path).unwrap_or(image_path);
        match export::export_svg(self.profile, &self.store, &href.to_string_lossy(), &path) {
            Ok(()) => self.notices.success("Exported SVG successfully!"),
            Err(e) => self.notices.error(format!("SVG export failed: {}", e)),
        }
        self.remember_dir(&path);
    }

    fn request_png_export(&mut self, ctx: &egui::Context) {
        if self.background.is_none() {
            let e = MapError::Resource("Gamepad image not found".to_string());
            self.notices.error(format!("Image export failed: {}", e));
            return;
        }
        let Some(path) = self.save_dialog("PNG image", "png") else {
            return;
        };
        self.remember_dir(&path);

        let size = (self.profile.image.width, self.profile.image.height);
        let rect = export::capture_rect(ctx.screen_rect(), ctx.pixels_per_point(), size);

        self.pending_capture = Some(PendingCapture {
            path,
            rect,
            requested_at: Instant::now(),
        });
        ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
    }

    fn handle_capture(&mut self, ctx: &egui::Context, now: Instant) {
        let Some(ref pending) = self.pending_capture else {
            return;
        };

        let screenshot = ctx.input(|i| {
            i.raw.events.iter().find_map(|event| match event {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });

        let Some(screenshot) = screenshot else {
            if now.saturating_duration_since(pending.requested_at) > CAPTURE_TIMEOUT {
                self.pending_capture = None;
                self.notices
                    .error("Image export failed: the window could not be captured");
            }
            return;
        };

        let region = PixelRect::from_points(pending.rect, ctx.pixels_per_point());
        let size = (self.profile.image.width, self.profile.image.height);
        let flattened = export::color_image_to_rgba(&screenshot)
            .and_then(|frame| export::flatten_capture(&frame, region, size));

        match flattened {
            Ok(image) => {
                if let Some(pending) = self.pending_capture.take() {
                    export::spawn_png_save(image, pending.path, self.save_tx.clone());
                }
            }
            Err(e) => {
                self.pending_capture = None;
                self.notices.error(format!("Image export failed: {}", e));
            }
        }
    }

    fn drain_saves(&mut self) {
        while let Ok(result) = self.save_rx.try_recv() {
            match result {
                SaveResult::Png(Ok(path)) => {
                    log::info!("Diagram written to {}", path.display());
                    self.notices.success("Exported image successfully!");
                }
                SaveResult::Png(Err(e)) => self.notices.error(format!("Image export failed: {}", e)),
            }
        }
    }

    fn render_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.heading("FTC Gamepad Mapper");
                    ui.label(
                        egui::RichText::new("Press a button or move an axis on your gamepad to start mapping")
                            .color(egui::Color32::GRAY),
                    );
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let status = match (self.session.state(), self.session.device_name()) {
                        (ConnectionState::Ready, Some(name)) => {
                            egui::RichText::new(name).color(egui::Color32::GREEN)
                        }
                        (ConnectionState::Connected, _) => {
                            egui::RichText::new("Connecting...").color(egui::Color32::YELLOW)
                        }
                        _ => egui::RichText::new("Disconnected").color(egui::Color32::RED),
                    };
                    ui.label(status);
                    ui.separator();
                    ui.label(format!("{} mapped", self.store.len()));
                    ui.separator();

                    if ui.button("Clear").clicked() {
                        self.clear_mapping();
                    }

                    if ui.button("Export PNG").clicked() {
                        self.request_png_export(ctx);
                    }
                    if ui.button("Export SVG").clicked() {
                        self.export_svg();
                    }
                    if ui
                        .button("Copy Code")
                        .on_hover_text("Copy code for every mapped control")
                        .clicked()
                    {
                        self.copy_code(ctx);
                    }
                    if ui.button("Import").clicked() {
                        self.import_mapping();
                    }
                    if ui.button("Export").clicked() {
                        self.export_mapping();
                    }
                });
            });
        });
    }

    fn render_diagram(&self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let (view_w, view_h) = self.profile.view_box;
            let available = ui.available_rect_before_wrap();
            let scale = (available.width() / view_w).min(available.height() / view_h);
            let rect = egui::Rect::from_center_size(
                available.center(),
                egui::vec2(view_w * scale, view_h * scale),
            );
            ui.allocate_rect(rect, egui::Sense::hover());
            self.paint_diagram(&ui.painter_at(rect), rect);
        });
    }

    /// Redraw the diagram on top of everything at the export size, for the
    /// frame the screenshot is taken from
    fn render_capture_layer(&self, ctx: &egui::Context) {
        let Some(ref pending) = self.pending_capture else {
            return;
        };
        let layer = egui::LayerId::new(egui::Order::Foreground, egui::Id::new("png_capture"));
        let painter = ctx.layer_painter(layer).with_clip_rect(pending.rect);
        self.paint_diagram(&painter, pending.rect);
    }

    fn paint_diagram(&self, painter: &egui::Painter, rect: egui::Rect) {
        let scale = rect.width() / self.profile.view_box.0;

        painter.rect_filled(rect, 0.0, BACKDROP_COLOR);
        if let Some(ref texture) = self.background {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), rect, uv, egui::Color32::WHITE);
        }

        let to_screen = |p: Point| egui::pos2(rect.min.x + p.x * scale, rect.min.y + p.y * scale);

        for primitive in overlay::render(self.profile, &self.store) {
            match primitive {
                Primitive::Line { from, to, width } => {
                    painter.line_segment(
                        [to_screen(from), to_screen(to)],
                        egui::Stroke::new(width * scale, egui::Color32::WHITE),
                    );
                }
                Primitive::Label {
                    at,
                    text,
                    anchor,
                    role,
                } => {
                    // SVG text sits on its baseline
                    let align = match anchor {
                        TextAnchor::Start => egui::Align2::LEFT_BOTTOM,
                        TextAnchor::End => egui::Align2::RIGHT_BOTTOM,
                    };
                    let (size, color) = match role {
                        LabelRole::Title => (overlay::TITLE_SIZE, TITLE_COLOR),
                        LabelRole::Function => (overlay::FUNCTION_SIZE, FUNCTION_COLOR),
                    };
                    painter.text(
                        to_screen(at),
                        align,
                        text,
                        egui::FontId::proportional(size * scale),
                        color,
                    );
                }
            }
        }
    }

    fn render_dialog(&mut self, ctx: &egui::Context) {
        let waiting = self.session.waiting();
        let Some(dialog) = self.session.dialog_mut() else {
            return;
        };
        let Some(spec) = self.profile.spec(dialog.key) else {
            self.session.close_dialog();
            return;
        };

        let mut save = false;
        let mut cancel = false;

        let response = egui::Modal::new(egui::Id::new("mapping_dialog")).show(ctx, |ui| {
            ui.set_width(380.0);
            ui.heading(dialog.heading());
            ui.label(dialog.description());
            ui.add_space(10.0);

            ui.label("Function Name");
            let edit = ui.add(
                egui::TextEdit::singleline(&mut dialog.function_name).hint_text("Enter function name"),
            );
            if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                save = true;
            }

            if dialog.is_button() {
                ui.add_space(6.0);
                ui.label("Press Type");
                egui::ComboBox::from_id_salt("press_type")
                    .selected_text(dialog.press.label())
                    .show_ui(ui, |ui| {
                        for press in PressSemantics::ALL {
                            ui.selectable_value(&mut dialog.press, press, press.label());
                        }
                    });
            }

            ui.add_space(6.0);
            ui.checkbox(&mut dialog.export_in_code, "Export in code");
            ui.label(egui::RichText::new(dialog.preview(spec)).monospace())
                .on_hover_text("How the robot code reads this control");

            if waiting > 0 {
                ui.label(
                    egui::RichText::new(format!("{} more controls waiting", waiting))
                        .color(egui::Color32::GRAY),
                );
            }

            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    cancel = true;
                }
                if ui.button("Save").clicked() {
                    save = true;
                }
            });
        });

        if response.should_close() {
            cancel = true;
        }

        if save {
            match dialog.save(&mut self.store) {
                Ok(()) => {
                    self.session.close_dialog();
                    self.notices.success("Successfully mapped control!");
                }
                Err(e) => self.notices.error(e.to_string()),
            }
        } else if cancel {
            self.session.close_dialog();
        }
    }

    fn render_disconnected(&mut self, ctx: &egui::Context) {
        if self.session.state() != ConnectionState::Disconnected {
            return;
        }

        egui::Modal::new(egui::Id::new("not_connected")).show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Gamepad not connected").size(24.0).strong());
                let hint = if self.input_reader.is_some() {
                    "Please connect your gamepad and press a button to continue"
                } else {
                    "Gamepad support could not be started, see the log for details"
                };
                ui.label(egui::RichText::new(hint).size(14.0));
            });
        });
    }

    fn render_notices(&mut self, ctx: &egui::Context) {
        if self.notices.is_empty() {
            return;
        }

        let mut dismissed = None;
        egui::Area::new(egui::Id::new("notices"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
            .order(egui::Order::Tooltip)
            .show(ctx, |ui| {
                for notice in self.notices.iter() {
                    let color = match notice.level {
                        NoticeLevel::Success => egui::Color32::GREEN,
                        NoticeLevel::Info => egui::Color32::LIGHT_BLUE,
                        NoticeLevel::Warning => egui::Color32::YELLOW,
                        NoticeLevel::Error => egui::Color32::RED,
                    };
                    let clicked = egui::Frame::popup(ui.style())
                        .show(ui, |ui| {
                            ui.add(
                                egui::Label::new(egui::RichText::new(&notice.text).color(color))
                                    .sense(egui::Sense::click()),
                            )
                            .on_hover_text("Click to dismiss")
                            .clicked()
                        })
                        .inner;
                    if clicked {
                        dismissed = Some(notice.id);
                    }
                }
            });

        if let Some(id) = dismissed {
            self.notices.dismiss(id);
        }
    }
}

impl eframe::App for PadMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.process_inputs(now);
        self.handle_capture(ctx, now);
        self.drain_saves();
        self.notices.expire(now);

        self.render_top_panel(ctx);
        self.render_diagram(ctx);
        self.render_capture_layer(ctx);

        // Keep the captured frame free of dialogs and notices
        if self.pending_capture.is_none() {
            self.render_dialog(ctx);
            self.render_disconnected(ctx);
            self.render_notices(ctx);
        }

        match self.session.state() {
            ConnectionState::Disconnected if self.pending_capture.is_none() => {
                ctx.request_repaint_after(Duration::from_millis(100));
            }
            _ => ctx.request_repaint(),
        }
    }
}
