use std::path::PathBuf;

use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::filter::{FilterStep, StepCount};
use crate::data::loader::load_file;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data Options");
    ui.label("Choose a topic in women's health to explore and add additional filters.");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            topic_selector(ui, state);
            ui.separator();

            ui.strong("Additional Filter Options");
            ui.add_space(4.0);
            year_filter(ui, state);
            ui.add_space(8.0);
            country_filter(ui, state);
        });
}

fn topic_selector(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Subset the Data");
    ui.label("Select a keyword to filter the publications by:");

    let current = state.controls.topic.clone();
    let mut chosen = None;
    egui::ComboBox::from_id_salt("topic")
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for topic in &state.config.filters.topics {
                if ui.selectable_label(current == *topic, topic).clicked() {
                    chosen = Some(topic.clone());
                }
            }
        });
    if let Some(topic) = chosen.filter(|t| *t != current) {
        state.set_topic(&topic);
    }

    match_count(ui, &state.dashboard.steps, FilterStep::Topic);
}

fn year_filter(ui: &mut Ui, state: &mut AppState) {
    let mut enabled = state.controls.years_enabled;
    if ui.checkbox(&mut enabled, "Date of Publication").changed() {
        state.set_years_enabled(enabled);
    }
    if !state.controls.years_enabled {
        return;
    }

    let (min, max) = state.year_bounds();
    let mut low = state.controls.year_low;
    let mut high = state.controls.year_high;
    let mut changed = false;
    changed |= ui.add(Slider::new(&mut low, min..=max).text("from")).changed();
    changed |= ui.add(Slider::new(&mut high, min..=max).text("to")).changed();
    if changed {
        state.set_year_range(low, high);
    }

    match_count(ui, &state.dashboard.steps, FilterStep::Years);
}

fn country_filter(ui: &mut Ui, state: &mut AppState) {
    let mut enabled = state.controls.country_enabled;
    if ui.checkbox(&mut enabled, "Country of Publication").changed() {
        state.set_country_enabled(enabled);
    }
    if !state.controls.country_enabled {
        return;
    }

    if state.country_options.is_empty() {
        ui.label(RichText::new("No countries for this selection.").weak());
        match_count(ui, &state.dashboard.steps, FilterStep::Country);
        return;
    }

    let current = state.controls.country.clone().unwrap_or_default();
    let mut chosen = None;
    egui::ComboBox::from_id_salt("country")
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for country in &state.country_options {
                if ui.selectable_label(current == *country, country).clicked() {
                    chosen = Some(country.clone());
                }
            }
        });
    if let Some(country) = chosen.filter(|c| *c != current) {
        state.set_country(&country);
    }

    match_count(ui, &state.dashboard.steps, FilterStep::Country);
}

fn match_count(ui: &mut Ui, steps: &[StepCount], step: FilterStep) {
    if let Some(count) = steps.iter().find(|s| s.step == step) {
        ui.label(format!("Number of matching articles: {}", count.matches));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open topic dataset…").clicked() {
                open_dataset_dialog(state, DatasetSlot::Topic);
                ui.close_menu();
            }
            if ui.button("Open baseline dataset…").clicked() {
                open_dataset_dialog(state, DatasetSlot::Baseline);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Export summary…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} topic records, {} matching · {} baseline records",
            state.topic_data.len(),
            state.dashboard.topic.total,
            state.baseline_data.len(),
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum DatasetSlot {
    Topic,
    Baseline,
}

fn open_dataset_dialog(state: &mut AppState, slot: DatasetSlot) {
    let title = match slot {
        DatasetSlot::Topic => "Open topic dataset",
        DatasetSlot::Baseline => "Open baseline dataset",
    };
    let file = rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    let Some(path) = file else {
        return;
    };
    match load_file(&path).with_context(|| format!("loading {}", path.display())) {
        Ok(dataset) => match slot {
            DatasetSlot::Topic => state.replace_topic_data(dataset),
            DatasetSlot::Baseline => state.replace_baseline_data(dataset),
        },
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn export_dialog(state: &mut AppState) {
    let file: Option<PathBuf> = rfd::FileDialog::new()
        .set_title("Export summary")
        .set_file_name("summary.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match state.export_dashboard(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export summary: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
