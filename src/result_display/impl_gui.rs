use crate::controller::main::Controller;
use crate::controller::present::{ChartEntry, View};
use crate::library::logger::interface::Logger;
use crate::preview::interface::{PreviewHandle, PreviewStore};
use crate::result_display::interface::ResultDisplay;
use crate::selected_file::SelectedFile;
use eframe::egui;
use std::error::Error;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Holds the latest view for the window and wakes it up on change.
#[derive(Clone, Default)]
pub struct ResultDisplayGui {
    view: Arc<Mutex<View>>,
    ctx: Arc<Mutex<Option<egui::Context>>>,
}

impl ResultDisplayGui {
    pub fn new() -> Self {
        Self::default()
    }

    fn attach(&self, ctx: egui::Context) {
        *self.ctx.lock().unwrap_or_else(PoisonError::into_inner) = Some(ctx);
    }

    fn current(&self) -> View {
        self.view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ResultDisplay for ResultDisplayGui {
    fn show(&mut self, view: &View) -> Result<(), Box<dyn Error + Send + Sync>> {
        *self.view.lock().unwrap_or_else(PoisonError::into_inner) = view.clone();

        if let Some(ctx) = self
            .ctx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            ctx.request_repaint();
        }

        Ok(())
    }
}

struct EmotionWindow {
    display: ResultDisplayGui,
    controller: Controller,
    preview_store: Arc<dyn PreviewStore + Send + Sync>,
    logger: Arc<dyn Logger + Send + Sync>,
    texture: Option<(PreviewHandle, egui::TextureHandle)>,
    status: Option<String>,
}

impl EmotionWindow {
    fn pick_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };

        match SelectedFile::from_path(&path) {
            Ok(file) => {
                self.status = None;
                self.controller.select_file(Some(file));
            }
            Err(err) => {
                self.status = Some(format!("Could not read {}: {}", path.display(), err));
            }
        }
    }

    fn sync_texture(&mut self, ctx: &egui::Context, handle: Option<PreviewHandle>) {
        let Some(handle) = handle else {
            self.texture = None;
            return;
        };

        if matches!(&self.texture, Some((current, _)) if *current == handle) {
            return;
        }

        match self.preview_store.get(handle) {
            Some(preview) => {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [preview.width as usize, preview.height as usize],
                    &preview.rgba,
                );
                let texture = ctx.load_texture(
                    format!("preview:{}", handle.0),
                    image,
                    egui::TextureOptions::LINEAR,
                );
                self.texture = Some((handle, texture));
            }
            None => {
                // still decoding, or not an image the preview store understands
                self.texture = None;
                ctx.request_repaint_after(Duration::from_millis(100));
            }
        }
    }
}

impl eframe::App for EmotionWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let view = self.display.current();
        self.sync_texture(ctx, view.preview);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Emotion recognition");
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                if ui.button("Choose image...").clicked() {
                    self.pick_file();
                }
                ui.label(view.file_name.as_deref().unwrap_or("No file selected"));
            });

            if ui.button("Upload and analyze").clicked() {
                if let Err(err) = self.controller.submit() {
                    let _ = self.logger.info(&format!("Submit rejected: {}", err));
                }
            }

            if view.is_busy() {
                ui.add(
                    egui::ProgressBar::new(f32::from(view.progress) / 100.0)
                        .text(format!("Analyzing... {}%", view.progress)),
                );
            }

            for message in [&view.notice, &view.error, &self.status]
                .into_iter()
                .flatten()
            {
                ui.colored_label(egui::Color32::from_rgb(220, 50, 50), message);
            }

            ui.add_space(8.0);

            if let Some((_, texture)) = &self.texture {
                ui.label("Preview");
                ui.add(egui::Image::new(egui::load::SizedTexture::new(
                    texture.id(),
                    texture.size_vec2(),
                )));
            }

            if view.file_name.is_some() {
                ui.add_space(8.0);
                if let Some(label) = &view.label {
                    ui.heading(format!("Predicted emotion: {}", label));
                }
                paint_chart(ui, &view.series);
            }
        });

        if view.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

fn paint_chart(ui: &mut egui::Ui, series: &[ChartEntry]) {
    let desired = egui::vec2(ui.available_width().min(420.0), 220.0);
    let (rect, _) = ui.allocate_exact_size(desired, egui::Sense::hover());
    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();
    let bar_color = egui::Color32::from_rgba_unmultiplied(59, 130, 246, 128);

    painter.rect_stroke(rect, 0.0, egui::Stroke::new(1.0, egui::Color32::GRAY));

    let label_height = 18.0;
    let bottom = rect.bottom() - label_height;
    let plot_height = rect.height() - label_height * 2.0;
    let slot = rect.width() / series.len().max(1) as f32;

    for (i, entry) in series.iter().enumerate() {
        let left = rect.left() + slot * i as f32 + slot * 0.15;
        let right = left + slot * 0.7;
        let top = bottom - plot_height * entry.value.clamp(0.0, 1.0);
        let center = (left + right) / 2.0;

        painter.rect_filled(
            egui::Rect::from_min_max(egui::pos2(left, top), egui::pos2(right, bottom)),
            2.0,
            bar_color,
        );
        painter.text(
            egui::pos2(center, bottom + 2.0),
            egui::Align2::CENTER_TOP,
            entry.label,
            egui::FontId::proportional(11.0),
            text_color,
        );
        painter.text(
            egui::pos2(center, top - 2.0),
            egui::Align2::CENTER_BOTTOM,
            format!("{:.2}", entry.value),
            egui::FontId::proportional(10.0),
            text_color,
        );
    }
}

/// Opens the window on the calling thread and blocks until it is closed.
pub fn run_window(
    display: ResultDisplayGui,
    controller: Controller,
    preview_store: Arc<dyn PreviewStore + Send + Sync>,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Result<(), eframe::Error> {
    let logger = logger.with_namespace("window");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([520.0, 760.0])
            .with_title("Emotion Lens"),
        ..Default::default()
    };

    eframe::run_native(
        "Emotion Lens",
        options,
        Box::new(move |cc| {
            display.attach(cc.egui_ctx.clone());
            Box::new(EmotionWindow {
                display,
                controller,
                preview_store,
                logger,
                texture: None,
                status: None,
            })
        }),
    )
}
