use egui::{Align, Color32, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::sessions::summary::{EMPTY_MESSAGE, LOADING_MESSAGE, SessionRow, SummaryView};
use crate::ui::{PALETTE_OCHRE, PALETTE_SAND};

use super::ListeningHistoryApp;

const HEADER_HEIGHT: f32 = 20.;
const ROW_HEIGHT: f32 = 20.;

impl ListeningHistoryApp {
    pub(crate) fn summary_view(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Listening sessions").color(PALETTE_SAND).strong());
        ui.label(
            RichText::new(self.loader.source())
                .color(PALETTE_OCHRE)
                .small(),
        );
        ui.separator();

        match &self.summary {
            SummaryView::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(LOADING_MESSAGE);
                });
            }
            SummaryView::Error(message) => {
                ui.label(RichText::new(format!("Error: {message}")).color(Color32::RED));
            }
            SummaryView::Empty => {
                ui.label(RichText::new(EMPTY_MESSAGE).color(Color32::WHITE));
            }
            SummaryView::Rows(rows) => {
                ui.label(
                    RichText::new(format!("{} sessions", rows.len()))
                        .color(PALETTE_OCHRE)
                        .small(),
                );
                session_table(ui, rows, self.app_config.list_max_height);
            }
        }
    }
}

fn session_table(ui: &mut Ui, rows: &[SessionRow], max_height: f32) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(false)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::remainder().clip(true))
        .max_scroll_height(max_height)
        .header(HEADER_HEIGHT, |mut header| {
            for title in ["#", "Started", "Duration", "Tracks", "Artists"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for row in rows {
                body.row(ROW_HEIGHT, |mut table_row| {
                    table_row.col(|ui| {
                        ui.label(row.index.to_string());
                    });
                    table_row.col(|ui| {
                        ui.label(&row.started);
                    });
                    table_row.col(|ui| {
                        ui.label(&row.duration);
                    });
                    table_row.col(|ui| {
                        ui.label(row.track_count.to_string());
                    });
                    table_row.col(|ui| {
                        ui.label(&row.artists).on_hover_text(&row.artists);
                    });
                });
            }
        });
}
