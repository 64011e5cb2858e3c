use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{
    self, Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2,
};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Plot};

use crate::color::{label_color_on, GenderPalette};
use crate::data::aggregate::{GenderCounts, Summary};
use crate::data::gender::Gender;
use crate::data::model::{
    AuthorPosition, Publication, COUNTRY_COLUMN, FIRST_GENDER_COLUMN, LAST_GENDER_COLUMN,
    TOPICS_COLUMN, YEAR_COLUMN,
};

const BAR_COLOR: Color32 = Color32::from_rgb(0x83, 0xc9, 0xff);
const PIE_SIZE: f32 = 200.0;

// ---------------------------------------------------------------------------
// Preview table
// ---------------------------------------------------------------------------

/// First rows of a view with the known columns followed by `extra_columns`.
pub fn preview_table(ui: &mut Ui, id: &str, rows: &[Publication], extra_columns: &[String]) {
    if rows.is_empty() {
        ui.label(RichText::new("No matching publications.").weak());
        return;
    }

    let mut headers: Vec<&str> = vec![
        YEAR_COLUMN,
        COUNTRY_COLUMN,
        TOPICS_COLUMN,
        FIRST_GENDER_COLUMN,
        LAST_GENDER_COLUMN,
    ];
    headers.extend(extra_columns.iter().map(String::as_str));

    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal()
            .auto_shrink([false, true])
            .show(ui, |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .resizable(true)
                    .vscroll(false)
                    .columns(Column::auto().at_least(60.0).clip(true), headers.len())
                    .header(22.0, |mut header| {
                        for name in &headers {
                            header.col(|ui: &mut Ui| {
                                ui.strong(*name);
                            });
                        }
                    })
                    .body(|mut body| {
                        for rec in rows {
                            body.row(20.0, |mut row| {
                                for cell in preview_cells(rec, extra_columns) {
                                    row.col(|ui: &mut Ui| {
                                        ui.label(cell);
                                    });
                                }
                            });
                        }
                    });
            });
    });
}

/// Cell text for one record, in header order.
fn preview_cells(rec: &Publication, extra_columns: &[String]) -> Vec<String> {
    let mut cells = vec![
        rec.year.to_string(),
        rec.country.clone().unwrap_or_default(),
        rec.topics.iter().cloned().collect::<Vec<_>>().join("; "),
        rec.first_gender.clone().unwrap_or_default(),
        rec.last_gender.clone().unwrap_or_default(),
    ];
    cells.extend(
        extra_columns
            .iter()
            .map(|col| rec.extra.get(col).cloned().unwrap_or_default()),
    );
    cells
}

// ---------------------------------------------------------------------------
// Publications per year
// ---------------------------------------------------------------------------

pub fn year_bar_chart(ui: &mut Ui, id: &str, per_year: &[(i32, usize)]) {
    if per_year.is_empty() {
        ui.label(RichText::new("No publications to chart.").weak());
        return;
    }

    let bars: Vec<Bar> = per_year
        .iter()
        .map(|&(year, count)| {
            Bar::new(f64::from(year), count as f64)
                .width(0.8)
                .name(year.to_string())
        })
        .collect();
    let chart = BarChart::new(bars).color(BAR_COLOR).name("Publications");

    Plot::new(id)
        .height(260.0)
        .x_axis_label("Year")
        .y_axis_label("Publications")
        .allow_scroll(false)
        .allow_drag(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
}

// ---------------------------------------------------------------------------
// Gender pies
// ---------------------------------------------------------------------------

/// First- and last-author pies side by side.
pub fn gender_pies(ui: &mut Ui, summary: &Summary, palette: &GenderPalette) {
    ui.columns(2, |cols: &mut [Ui]| {
        for (col, position) in cols
            .iter_mut()
            .zip([AuthorPosition::First, AuthorPosition::Last])
        {
            gender_pie(
                col,
                &format!("{position} Gender"),
                summary.gender_counts(position),
                palette,
            );
        }
    });
}

/// One pie with categories drawn clockwise from 12 o'clock in display order.
pub fn gender_pie(ui: &mut Ui, title: &str, counts: &GenderCounts, palette: &GenderPalette) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong(title);

        let (response, painter) = ui.allocate_painter(Vec2::splat(PIE_SIZE), Sense::hover());
        let center = response.rect.center();
        let radius = PIE_SIZE * 0.45;

        if counts.total() == 0 {
            painter.circle_stroke(center, radius, Stroke::new(1.0, Color32::GRAY));
            painter.text(
                center,
                Align2::CENTER_CENTER,
                "No data",
                FontId::proportional(14.0),
                ui.visuals().weak_text_color(),
            );
            return;
        }

        let mut start = -FRAC_PI_2;
        for gender in Gender::ALL {
            let share = counts.share(gender) as f32;
            if share <= 0.0 {
                continue;
            }
            let sweep = share * TAU;
            let fill = palette.color_for(gender);
            for wedge in wedge_polygons(center, radius, start, sweep) {
                painter.add(Shape::convex_polygon(wedge, fill, Stroke::NONE));
            }

            if share >= 0.05 {
                let mid = start + sweep / 2.0;
                let at = center + Vec2::angled(mid) * radius * 0.62;
                painter.text(
                    at,
                    Align2::CENTER_CENTER,
                    format!("{:.1}%", share * 100.0),
                    FontId::proportional(12.0),
                    label_color_on(fill),
                );
            }
            start += sweep;
        }

        let tooltip: Vec<String> = Gender::ALL
            .iter()
            .map(|g| format!("{g}: {}", counts.get(*g)))
            .collect();
        response.on_hover_text(tooltip.join("\n"));
    });
}

/// Split a wedge into convex pieces of at most a quarter turn.
fn wedge_polygons(center: Pos2, radius: f32, start: f32, sweep: f32) -> Vec<Vec<Pos2>> {
    const ARC_POINTS: usize = 16;
    // Tolerance keeps an exact quarter multiple from rounding up a piece.
    let pieces = (sweep / FRAC_PI_2 - 1e-4).ceil().max(1.0) as usize;
    let piece_sweep = sweep / pieces as f32;

    (0..pieces)
        .map(|p| {
            let a0 = start + piece_sweep * p as f32;
            let mut points = Vec::with_capacity(ARC_POINTS + 2);
            points.push(center);
            for i in 0..=ARC_POINTS {
                let angle = a0 + piece_sweep * i as f32 / ARC_POINTS as f32;
                points.push(center + Vec2::angled(angle) * radius);
            }
            points
        })
        .collect()
}

/// Colour key in display order.
pub fn gender_legend(ui: &mut Ui, palette: &GenderPalette) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (gender, color) in palette.legend_entries() {
            let (rect, _) = ui.allocate_exact_size(Vec2::splat(12.0), Sense::hover());
            ui.painter().rect_filled(rect, 2.0, color);
            ui.label(gender.as_str());
            ui.add_space(8.0);
        }
    });
}
