pub mod config;
mod summary_view;
mod turntable_view;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{Local, Locale};
use config::AppConfig;
use egui::{Color32, RichText, Visuals, style::Widgets};
use log::{error, info};

use crate::sessions::loader::{SessionLoader, SessionSource};
use crate::sessions::summary::{SummaryView, viewer_locale};
use crate::spin::SpinAnimator;

use super::{PALETTE_BLACK, PALETTE_MAROON, PALETTE_OCHRE, PALETTE_SAND};
use turntable_view::Turntable;

const HEADLINE: &str = "My Listening History";
const SUMMARY_PANEL_WIDTH: f32 = 420.;
const LOADER_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// `ListeningHistoryApp` shows the spinnable record next to the listening
/// session summary.
///
/// # Fields
///
/// * `app_config` - Persisted settings, saved again on exit.
/// * `animator` - Spin state of the record, advanced once per frame.
/// * `turntable` - The record being rotated.
/// * `loader` - One-shot loader for the session document.
/// * `summary` - Rows built from the loader's state, rebuilt only when a load
///   starts or finishes.
/// * `locale` - Viewer's locale for start times, looked up once.
pub struct ListeningHistoryApp {
    app_config: AppConfig,
    animator: SpinAnimator,
    turntable: Turntable,
    loader: SessionLoader,
    summary: SummaryView,
    locale: Option<Locale>,
}

impl ListeningHistoryApp {
    pub fn new(
        app_config: AppConfig,
        source: SessionSource,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        let default_visuals = Visuals {
            dark_mode: true,
            hyperlink_color: PALETTE_MAROON,
            faint_bg_color: PALETTE_BLACK,
            extreme_bg_color: PALETTE_BLACK,
            panel_fill: Color32::from_rgb(40, 36, 28),
            widgets: Widgets::dark(),
            striped: true,
            ..Default::default()
        };
        cc.egui_ctx.set_visuals(default_visuals);

        let loader = SessionLoader::spawn(source, app_config.fetch_timeout());
        let locale = viewer_locale();
        info!("Formatting start times for locale {:?}", locale);
        let summary = SummaryView::from_state(loader.state(), &Local, locale);

        Self {
            app_config,
            animator: SpinAnimator::new(),
            turntable: Turntable::default(),
            loader,
            summary,
            locale,
        }
    }

    /// Replaces the current loader, which cancels its fetch if still running.
    fn open_session_file(&mut self, path: PathBuf) {
        info!("Opening session file {:?}", path);
        self.app_config.session_source = path.display().to_string();
        self.loader = SessionLoader::spawn(SessionSource::File(path), self.app_config.fetch_timeout());
        self.summary = SummaryView::from_state(self.loader.state(), &Local, self.locale);
    }

    fn header_view(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::new().inner_margin(8))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(RichText::new(HEADLINE).color(PALETTE_SAND).strong());
                    ui.separator();
                    ui.label(RichText::new("music streaming summary").color(PALETTE_OCHRE));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.visuals_mut().button_frame = false;
                        if ui.button("📂 Open sessions").clicked()
                            && let Some(path) = rfd::FileDialog::new()
                                .add_filter("json", &["json"])
                                .pick_file()
                        {
                            self.open_session_file(path);
                        }
                    });
                });
            });
    }
}

impl eframe::App for ListeningHistoryApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(e) = self.app_config.save() {
            error!("Error while saving config file: {}", e);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let state = self.loader.poll();
        self.summary.refresh(state, &Local, self.locale);

        let dt = ctx.input(|i| i.stable_dt);
        self.animator.tick(&mut self.turntable, Instant::now(), dt);

        if let Some(inner_rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.app_config.window_width = inner_rect.width();
            self.app_config.window_height = inner_rect.height();
        }

        self.header_view(ctx);

        egui::SidePanel::right("sessions")
            .resizable(false)
            .exact_width(SUMMARY_PANEL_WIDTH)
            .show(ctx, |ui| {
                self.summary_view(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.turntable_view(ui);
        });

        if self.animator.is_spinning() {
            ctx.request_repaint();
        } else if self.loader.state().is_loading() {
            ctx.request_repaint_after(LOADER_POLL_INTERVAL);
        }
    }
}
