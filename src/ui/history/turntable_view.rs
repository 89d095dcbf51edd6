use std::time::Instant;

use egui::{CursorIcon, Pos2, RichText, Sense, Stroke, Ui, Vec2};

use crate::spin::{PEAK_ANGULAR_VELOCITY, Rotatable};
use crate::ui::{
    PALETTE_GROOVE, PALETTE_OCHRE, PALETTE_ORANGE, PALETTE_SILVER, PALETTE_VINYL, stroke_shade,
};

use super::ListeningHistoryApp;

const GROOVE_RINGS: usize = 6;
const LABEL_RATIO: f32 = 0.32;
const HOLE_RATIO: f32 = 0.05;
const DISK_MARGIN: f32 = 24.;

/// The record on the platter, seen from above.
#[derive(Debug, Default)]
pub(crate) struct Turntable {
    rotation_y: f32,
}

impl Rotatable for Turntable {
    fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    fn set_rotation_y(&mut self, angle: f32) {
        self.rotation_y = angle;
    }
}

impl ListeningHistoryApp {
    pub(crate) fn turntable_view(&mut self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            let available = ui.available_size();
            let side = (available.x.min(available.y - 40.) - DISK_MARGIN).max(64.);
            let (rect, response) = ui.allocate_exact_size(Vec2::splat(side), Sense::click());

            let now = Instant::now();
            if response.clicked() {
                self.animator.request_spin(&self.turntable, now);
            }
            response.on_hover_cursor(CursorIcon::PointingHand);

            let speed = self.animator.angular_velocity(now) / PEAK_ANGULAR_VELOCITY;
            paint_record(ui, rect.center(), side / 2., self.turntable.rotation_y(), speed);

            ui.add_space(8.);
            let hint = if self.animator.is_spinning() {
                "spinning..."
            } else {
                "click the record to spin it"
            };
            ui.label(RichText::new(hint).color(PALETTE_OCHRE).italics());
        });
    }
}

fn paint_record(ui: &Ui, center: Pos2, radius: f32, angle: f32, speed: f32) {
    let painter = ui.painter();
    let rim = stroke_shade(PALETTE_GROOVE, PALETTE_ORANGE, speed);

    painter.circle_filled(center, radius, PALETTE_VINYL);
    painter.circle_stroke(center, radius, Stroke::new(3., rim));
    for ring in 1..=GROOVE_RINGS {
        let t = ring as f32 / (GROOVE_RINGS + 1) as f32;
        let groove_radius = radius * (LABEL_RATIO + (1. - LABEL_RATIO) * t);
        painter.circle_stroke(center, groove_radius, Stroke::new(1., PALETTE_GROOVE));
    }

    painter.circle_filled(center, radius * LABEL_RATIO, PALETTE_ORANGE);
    // marker so the rotation is visible on an otherwise symmetric disk
    let direction = Vec2::angled(angle);
    painter.line_segment(
        [
            center + direction * radius * (LABEL_RATIO + 0.04),
            center + direction * radius * 0.95,
        ],
        Stroke::new(2., PALETTE_SILVER),
    );
    painter.circle_filled(center, radius * HOLE_RATIO, PALETTE_SILVER);
}
