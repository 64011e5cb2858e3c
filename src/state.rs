use std::path::Path;

use anyhow::{Context, Result};

use crate::color::GenderPalette;
use crate::config::{Config, ConfigError};
use crate::data::dashboard::Dashboard;
use crate::data::filter::{
    country_options, resolve_country, CountryFilter, FilterState, YearRange,
};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Controls – raw widget values
// ---------------------------------------------------------------------------

/// Widget values as the user left them. A [`FilterState`] is built from
/// these on every interaction; toggled-off filters keep their last value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    pub topic: String,
    pub years_enabled: bool,
    pub year_low: i32,
    pub year_high: i32,
    pub country_enabled: bool,
    pub country: Option<String>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: Config,
    pub palette: GenderPalette,

    /// Loaded tables; replaced wholesale when the user opens another file.
    pub topic_data: Dataset,
    pub baseline_data: Dataset,

    pub controls: Controls,

    /// Countries selectable under the current topic and year range.
    pub country_options: Vec<String>,

    /// Derived view of the current selection (recomputed).
    pub dashboard: Dashboard,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(
        config: Config,
        topic_data: Dataset,
        baseline_data: Dataset,
    ) -> Result<Self, ConfigError> {
        let palette = config.display.colors.palette()?;
        let topic = config
            .filters
            .topics
            .first()
            .cloned()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "filters.topics".to_string(),
                reason: "at least one topic is required".to_string(),
            })?;
        let (year_low, year_high) = topic_data.year_bounds().unwrap_or((0, 0));

        let controls = Controls {
            topic,
            years_enabled: false,
            year_low,
            year_high,
            country_enabled: false,
            country: None,
        };
        // Country filter starts off, so there is no choice to reconcile yet.
        let filters = FilterState::new(controls.topic.clone());
        let options = country_options(&topic_data, &filters);
        let dashboard = Dashboard::compute(
            &topic_data,
            &baseline_data,
            &filters,
            config.display.preview_rows,
        );

        Ok(AppState {
            config,
            palette,
            topic_data,
            baseline_data,
            controls,
            country_options: options,
            dashboard,
            status_message: None,
        })
    }

    /// Slider limits: the topic dataset's observed year span.
    pub fn year_bounds(&self) -> (i32, i32) {
        self.topic_data.year_bounds().unwrap_or((0, 0))
    }

    /// Build the filter selection from the current controls. An enabled
    /// country filter with nothing selected stays active and matches nothing.
    pub fn filter_state(&self) -> FilterState {
        let c = &self.controls;
        FilterState {
            topic: c.topic.clone(),
            years: c
                .years_enabled
                .then(|| YearRange::new(c.year_low, c.year_high)),
            country: match (c.country_enabled, &c.country) {
                (false, _) => CountryFilter::Off,
                (true, Some(country)) => CountryFilter::only(country.clone()),
                (true, None) => CountryFilter::Unavailable,
            },
        }
    }

    /// Rebuild country options, reconcile the country choice and recompute
    /// the dashboard from scratch.
    pub fn recompute(&mut self) {
        self.country_options = country_options(&self.topic_data, &self.filter_state());
        if self.controls.country_enabled {
            self.controls.country = resolve_country(
                &self.country_options,
                self.controls.country.as_deref(),
                &self.config.filters.default_country,
            );
        }
        self.dashboard = Dashboard::compute(
            &self.topic_data,
            &self.baseline_data,
            &self.filter_state(),
            self.config.display.preview_rows,
        );
    }

    pub fn set_topic(&mut self, topic: &str) {
        self.controls.topic = topic.to_string();
        self.recompute();
    }

    pub fn set_years_enabled(&mut self, enabled: bool) {
        self.controls.years_enabled = enabled;
        self.recompute();
    }

    pub fn set_year_range(&mut self, low: i32, high: i32) {
        let range = YearRange::new(low, high);
        self.controls.year_low = range.low();
        self.controls.year_high = range.high();
        self.recompute();
    }

    pub fn set_country_enabled(&mut self, enabled: bool) {
        self.controls.country_enabled = enabled;
        self.recompute();
    }

    pub fn set_country(&mut self, country: &str) {
        self.controls.country = Some(country.to_string());
        self.recompute();
    }

    /// Swap in a newly opened topic dataset; the year range resets to its span.
    pub fn replace_topic_data(&mut self, dataset: Dataset) {
        let (low, high) = dataset.year_bounds().unwrap_or((0, 0));
        self.topic_data = dataset;
        self.controls.year_low = low;
        self.controls.year_high = high;
        self.status_message = None;
        self.recompute();
    }

    pub fn replace_baseline_data(&mut self, dataset: Dataset) {
        self.baseline_data = dataset;
        self.status_message = None;
        self.recompute();
    }

    /// Write the current dashboard as pretty JSON.
    pub fn export_dashboard(&self, path: &Path) -> Result<()> {
        let json = self.dashboard.to_json().context("serializing dashboard")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported dashboard to {}", path.display());
        Ok(())
    }
}
