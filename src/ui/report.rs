use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::data::dashboard::BaselineSummary;
use crate::data::gender::Gender;
use crate::state::AppState;
use crate::ui::charts;

// ---------------------------------------------------------------------------
// Central panel – the report
// ---------------------------------------------------------------------------

/// Render the two-part report for the current selection.
pub fn central_report(ui: &mut Ui, state: &AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("PubMed Publication Analysis");
            ui.label(RichText::new("Who is conducting research in women's health?").strong());
            intro(ui, state);
            ui.separator();

            topic_section(ui, state);
            ui.separator();
            baseline_section(ui, state);
            ui.separator();
            part3_section(ui);
        });
}

/// Where the data comes from and what the search covered.
fn intro(ui: &mut Ui, state: &AppState) {
    ui.label("Articles were selected with PubMed's advanced search on these MeSH terms:");
    for topic in &state.config.filters.topics {
        ui.label(format!("• {topic}/Diagnosis"));
    }
    ui.label(
        "Only studies on human subjects published between 2000 and 2025 were kept. \
         The analysis runs on the cleaned, filtered export of that search.",
    );
    ui.label(
        RichText::new(
            "Source: PubMed MEDLINE (.nbib) exports, cleaned to one row per article with \
             predicted first- and last-author genders.",
        )
        .small()
        .weak(),
    );
}

fn topic_section(ui: &mut Ui, state: &AppState) {
    let summary = &state.dashboard.topic;
    let topic = &state.dashboard.filters.topic;

    ui.heading("Part 1: Explore Publications in a Women's Health Topic");
    ui.label(format!("Current topic: {topic}"));
    ui.add_space(6.0);

    ui.strong("Preview of the filtered dataset:");
    charts::preview_table(
        ui,
        "topic_preview",
        &summary.preview,
        state.topic_data.extra_columns(),
    );
    ui.add_space(6.0);

    ui.strong("Number of publications per year:");
    charts::year_bar_chart(ui, "topic_years", &summary.per_year);
    ui.add_space(6.0);

    ui.strong(format!("Gender distribution in articles regarding the diagnosis of {topic}."));
    charts::gender_pies(ui, summary, &state.palette);
    charts::gender_legend(ui, &state.palette);

    egui::CollapsingHeader::new("More information on the gender predictor")
        .id_salt("predictor_info")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.label(
                "Genders are predicted from first names against a database of \
                 gender-labeled names. Key:",
            );
            for gender in Gender::ALL {
                ui.label(format!("• {gender}: {}", gender.description()));
            }
        });

    ui.label(
        RichText::new(
            "Note: these are predictions and can carry the biases of their training data, \
             especially for countries or cultures it under-represents. Use them for \
             exploratory analysis, not as concrete evidence.",
        )
        .small()
        .italics(),
    );
}

fn baseline_section(ui: &mut Ui, state: &AppState) {
    let label = &state.config.data.baseline_label;

    ui.heading("Part 2: Comparison to a Gender-Neutral Topic");
    ui.label(format!(
        "Baseline: {label}. The year and country filters above apply here too."
    ));
    ui.add_space(6.0);

    match &state.dashboard.baseline {
        BaselineSummary::Present { summary, .. } => {
            ui.strong(format!(
                "Gender distribution in articles regarding the diagnosis of {label} ({} articles).",
                summary.total
            ));
            charts::gender_pies(ui, summary, &state.palette);

            egui::CollapsingHeader::new("Baseline publications")
                .id_salt("baseline_details")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    charts::preview_table(
                        ui,
                        "baseline_preview",
                        &summary.preview,
                        state.baseline_data.extra_columns(),
                    );
                    ui.add_space(6.0);
                    charts::year_bar_chart(ui, "baseline_years", &summary.per_year);
                });
        }
        BaselineSummary::Absent { country } => {
            let message = match country {
                Some(country) => {
                    format!("No baseline publications for {country} and/or this time range.")
                }
                None => "No publications for this country and/or time range.".to_string(),
            };
            ui.label(RichText::new(message).color(ui.visuals().error_fg_color));
        }
    }
}

// ---------------------------------------------------------------------------
// Part 3 – analysis questions
// ---------------------------------------------------------------------------

const ANALYSIS_QUESTIONS: [(&str, &str); 3] = [
    (
        "How has women's health research changed over the years?",
        "For the topics explored here, the number of published articles grows \
         gradually from the start of the 21st century to now.",
    ),
    (
        "Who is performing this research?",
        "Allowing for the uncertainty of a probability-based gender predictor, author \
         gender in these women's health topics leans heavily female, especially next to \
         a neutral condition such as heart disease, and most of all for articles \
         published in the United States.",
    ),
    (
        "Where do we go from here?",
        "The findings have clear limits, but they point at questions worth asking for a \
         more equitable healthcare industry: whether women-led teams, who appear to lead \
         research on women's conditions, receive equal funding, and how to bring more men \
         into women's health fields.",
    ),
];

fn part3_section(ui: &mut Ui) {
    ui.heading("Part 3: Analysis Questions");
    for (question, answer) in ANALYSIS_QUESTIONS {
        ui.add_space(4.0);
        ui.strong(question);
        ui.label(answer);
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{CentralPanel, Context, Pos2, RawInput, Rect, Shape};

    use super::*;
    use crate::config::Config;
    use crate::data::model::fixtures::publication;
    use crate::data::model::Dataset;

    fn collect_text(shape: &Shape, out: &mut Vec<String>) {
        match shape {
            Shape::Text(text) => out.push(text.galley.text().to_string()),
            Shape::Vec(shapes) => shapes.iter().for_each(|s| collect_text(s, out)),
            _ => {}
        }
    }

    fn rendered_text(state: &AppState) -> Vec<String> {
        let ctx = Context::default();
        let input = RawInput {
            screen_rect: Some(Rect::from_min_max(Pos2::ZERO, Pos2::new(1200.0, 20_000.0))),
            ..Default::default()
        };
        let output = ctx.run(input, |ctx| {
            CentralPanel::default().show(ctx, |ui| central_report(ui, state));
        });
        let mut out = Vec::new();
        for clipped in &output.shapes {
            collect_text(&clipped.shape, &mut out);
        }
        out
    }

    fn state() -> AppState {
        let topic = Dataset::from_records(
            vec![publication(2012, None, &["Endometriosis"], Some("female"), None)],
            Vec::new(),
        );
        let baseline = Dataset::from_records(
            vec![publication(2012, Some("Japan"), &[], Some("male"), None)],
            Vec::new(),
        );
        AppState::new(Config::default(), topic, baseline).unwrap()
    }

    #[test]
    fn report_has_intro_and_analysis_questions() {
        let text = rendered_text(&state());
        let has = |needle: &str| text.iter().any(|t| t.contains(needle));

        assert!(has("Endometriosis/Diagnosis"));
        assert!(has("between 2000 and 2025"));
        assert!(has("Part 1: Explore Publications"));
        assert!(has("Part 2: Comparison"));
        assert!(has("Part 3: Analysis Questions"));
        for (question, _) in ANALYSIS_QUESTIONS {
            assert!(has(question), "missing {question:?}");
        }
    }

    #[test]
    fn country_filter_without_options_shows_missing_baseline() {
        let mut s = state();
        s.set_country_enabled(true);
        let text = rendered_text(&s);
        assert!(text
            .iter()
            .any(|t| t.contains("No publications for this country and/or time range.")));
    }
}
