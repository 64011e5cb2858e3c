use anyhow::{Context, Result};
use eframe::egui;

use pubmed_lens::app::PubmedLensApp;
use pubmed_lens::config::Config;
use pubmed_lens::data::loader::load_file;
use pubmed_lens::state::AppState;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load().context("loading configuration")?;

    // Both tables are required; there is no degraded mode.
    let topic_data = load_file(&config.data.topic_path)
        .with_context(|| format!("loading topic dataset {}", config.data.topic_path.display()))?;
    let baseline_data = load_file(&config.data.baseline_path).with_context(|| {
        format!(
            "loading baseline dataset {}",
            config.data.baseline_path.display()
        )
    })?;

    let state = AppState::new(config, topic_data, baseline_data)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "PubMed Lens – Publication Analysis",
        options,
        Box::new(|_cc| Ok(Box::new(PubmedLensApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}
