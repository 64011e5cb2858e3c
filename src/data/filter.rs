use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::model::{Dataset, Publication};

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Inclusive year interval. Construction orders the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    low: i32,
    high: i32,
}

impl YearRange {
    pub fn new(a: i32, b: i32) -> Self {
        YearRange {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// The observed year span of a dataset, if it has any records.
    pub fn spanning(dataset: &Dataset) -> Option<Self> {
        dataset.year_bounds().map(|(lo, hi)| YearRange::new(lo, hi))
    }

    pub fn low(&self) -> i32 {
        self.low
    }

    pub fn high(&self) -> i32 {
        self.high
    }

    pub fn contains(&self, year: i32) -> bool {
        self.low <= year && year <= self.high
    }
}

/// Country step of a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CountryFilter<S = String> {
    #[default]
    Off,
    /// The step is on but no country is offered; nothing matches.
    Unavailable,
    Only(S),
}

impl CountryFilter {
    pub fn only(country: impl Into<String>) -> Self {
        CountryFilter::Only(country.into())
    }

    pub fn as_deref(&self) -> CountryFilter<&str> {
        match self {
            CountryFilter::Off => CountryFilter::Off,
            CountryFilter::Unavailable => CountryFilter::Unavailable,
            CountryFilter::Only(country) => CountryFilter::Only(country.as_str()),
        }
    }
}

impl<S> CountryFilter<S> {
    pub fn is_active(&self) -> bool {
        !matches!(self, CountryFilter::Off)
    }
}

/// The user's complete selection. All active predicates must hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub topic: String,
    pub years: Option<YearRange>,
    pub country: CountryFilter,
}

impl FilterState {
    /// Topic only; year and country filters off.
    pub fn new(topic: impl Into<String>) -> Self {
        FilterState {
            topic: topic.into(),
            years: None,
            country: CountryFilter::Off,
        }
    }

    /// Criteria for the topic dataset: every active predicate.
    pub fn topic_criteria(&self) -> Criteria<'_> {
        Criteria {
            topic: Some(&self.topic),
            years: self.years,
            country: self.country.as_deref(),
        }
    }

    /// Criteria mirrored onto the baseline dataset: year and country only.
    pub fn baseline_criteria(&self) -> Criteria<'_> {
        Criteria {
            topic: None,
            ..self.topic_criteria()
        }
    }
}

/// Predicates for one [`apply`] call. `None` / `Off` means the step is inactive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Criteria<'s> {
    pub topic: Option<&'s str>,
    pub years: Option<YearRange>,
    pub country: CountryFilter<&'s str>,
}

// ---------------------------------------------------------------------------
// View – a borrowed subset of a dataset
// ---------------------------------------------------------------------------

/// Ordered indices of records in `dataset`. Refinements return new views.
#[derive(Debug, Clone)]
pub struct View<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> View<'a> {
    /// Every record of the dataset.
    pub fn all(dataset: &'a Dataset) -> Self {
        View {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Records in source order.
    pub fn records(&self) -> impl Iterator<Item = &'a Publication> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    /// Keep the records satisfying `predicate`.
    pub fn retain(&self, predicate: impl Fn(&Publication) -> bool) -> View<'a> {
        let records = self.dataset.records();
        View {
            dataset: self.dataset,
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| predicate(&records[i]))
                .collect(),
        }
    }

    pub fn with_topic(&self, topic: &str) -> View<'a> {
        self.retain(|rec| rec.has_topic(topic))
    }

    pub fn with_years(&self, range: YearRange) -> View<'a> {
        self.retain(|rec| range.contains(rec.year))
    }

    /// Exact, case-sensitive country match; records without a country never match.
    pub fn with_country(&self, country: &str) -> View<'a> {
        self.retain(|rec| rec.country.as_deref() == Some(country))
    }

    /// Sorted unique non-null countries present in the view.
    pub fn countries(&self) -> BTreeSet<&'a str> {
        self.records()
            .filter_map(|rec| rec.country.as_deref())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterStep {
    Topic,
    Years,
    Country,
}

impl fmt::Display for FilterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStep::Topic => write!(f, "topic"),
            FilterStep::Years => write!(f, "year range"),
            FilterStep::Country => write!(f, "country"),
        }
    }
}

/// Number of records left after an active step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepCount {
    pub step: FilterStep,
    pub matches: usize,
}

/// Outcome of [`apply`]: the final view and the count after each active step.
#[derive(Debug, Clone)]
pub struct Filtered<'a> {
    pub view: View<'a>,
    pub steps: Vec<StepCount>,
}

/// Run the active predicates over `dataset` in order topic, years, country.
///
/// The same function serves the topic dataset and the baseline dataset; the
/// caller picks which predicates apply through `criteria`.
pub fn apply<'a>(dataset: &'a Dataset, criteria: &Criteria<'_>) -> Filtered<'a> {
    let mut view = View::all(dataset);
    let mut steps = Vec::new();

    if let Some(topic) = criteria.topic {
        view = view.with_topic(topic);
        steps.push(StepCount {
            step: FilterStep::Topic,
            matches: view.len(),
        });
    }
    if let Some(range) = criteria.years {
        view = view.with_years(range);
        steps.push(StepCount {
            step: FilterStep::Years,
            matches: view.len(),
        });
    }
    if criteria.country.is_active() {
        view = match criteria.country {
            CountryFilter::Only(country) => view.with_country(country),
            _ => view.retain(|_| false),
        };
        steps.push(StepCount {
            step: FilterStep::Country,
            matches: view.len(),
        });
    }

    Filtered { view, steps }
}

/// The baseline dataset seen through the shared year/country filters.
#[derive(Debug, Clone)]
pub enum Baseline<'a> {
    Present(Filtered<'a>),
    /// The country step matched no baseline records. `country` is `None`
    /// when the step is on without any country to choose.
    Absent { country: Option<String> },
}

/// Mirror the year and country selections onto the baseline dataset.
pub fn filter_baseline<'a>(baseline: &'a Dataset, filters: &FilterState) -> Baseline<'a> {
    let filtered = apply(baseline, &filters.baseline_criteria());
    match &filters.country {
        CountryFilter::Only(country) if filtered.view.is_empty() => Baseline::Absent {
            country: Some(country.clone()),
        },
        CountryFilter::Unavailable => Baseline::Absent { country: None },
        _ => Baseline::Present(filtered),
    }
}

// ---------------------------------------------------------------------------
// Country selection
// ---------------------------------------------------------------------------

/// Countries offered for selection: those of the topic view after the topic
/// and year steps, sorted.
pub fn country_options(dataset: &Dataset, filters: &FilterState) -> Vec<String> {
    let criteria = Criteria {
        country: CountryFilter::Off,
        ..filters.topic_criteria()
    };
    apply(dataset, &criteria)
        .view
        .countries()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Keep `current` when it is still offered, otherwise fall back to
/// `preferred`, then to the first option. `None` when nothing is offered.
pub fn resolve_country(
    options: &[String],
    current: Option<&str>,
    preferred: &str,
) -> Option<String> {
    let offered = |c: &str| options.iter().any(|o| o == c);
    current
        .filter(|&c| offered(c))
        .or_else(|| offered(preferred).then_some(preferred))
        .map(str::to_string)
        .or_else(|| options.first().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::publication;

    fn topic_dataset() -> Dataset {
        Dataset::from_records(
            vec![
                publication(2009, Some("United States"), &["Endometriosis"], Some("female"), None),
                publication(2010, Some("United States"), &["Endometriosis", "Humans"], Some("male"), None),
                publication(2012, Some("united states"), &["Endometriosis"], None, None),
                publication(2015, Some("United States"), &["Endometriosis"], Some("andy"), None),
                publication(2016, Some("United States"), &["Endometriosis"], None, None),
                publication(2013, Some("Qatar"), &["Endometriosis"], Some("female"), None),
                publication(2011, Some("United States"), &["Dysmenorrhea"], Some("female"), None),
                publication(2014, None, &["Endometriosis"], Some("female"), None),
                publication(2014, Some("Japan"), &[], Some("female"), None),
            ],
            Vec::new(),
        )
    }

    fn baseline_dataset() -> Dataset {
        Dataset::from_records(
            vec![
                publication(2010, Some("United States"), &["Heart Arrest"], Some("male"), None),
                publication(2014, Some("Japan"), &["Heart Arrest"], Some("male"), None),
                publication(2020, Some("United States"), &["Heart Arrest"], None, None),
            ],
            Vec::new(),
        )
    }

    fn filters(topic: &str, years: Option<(i32, i32)>, country: Option<&str>) -> FilterState {
        FilterState {
            topic: topic.to_string(),
            years: years.map(|(a, b)| YearRange::new(a, b)),
            country: country.map_or(CountryFilter::Off, CountryFilter::only),
        }
    }

    #[test]
    fn year_range_orders_bounds_and_is_inclusive() {
        let range = YearRange::new(2015, 2010);
        assert_eq!((range.low(), range.high()), (2010, 2015));
        assert!(range.contains(2010));
        assert!(range.contains(2015));
        assert!(!range.contains(2009));
        assert!(!range.contains(2016));
    }

    #[test]
    fn all_predicates_compose() {
        let ds = topic_dataset();
        let state = filters("Endometriosis", Some((2010, 2015)), Some("United States"));
        let out = apply(&ds, &state.topic_criteria());

        let years: Vec<i32> = out.view.records().map(|r| r.year).collect();
        assert_eq!(years, [2010, 2015]);
        for rec in out.view.records() {
            assert!(rec.has_topic("Endometriosis"));
            assert!((2010..=2015).contains(&rec.year));
            assert_eq!(rec.country.as_deref(), Some("United States"));
        }
    }

    #[test]
    fn steps_report_counts_for_active_filters_only() {
        let ds = topic_dataset();
        let out = apply(&ds, &filters("Endometriosis", None, None).topic_criteria());
        assert_eq!(
            out.steps,
            [StepCount {
                step: FilterStep::Topic,
                matches: 7
            }]
        );

        let state = filters("Endometriosis", Some((2010, 2015)), Some("United States"));
        let counts: Vec<(FilterStep, usize)> = apply(&ds, &state.topic_criteria())
            .steps
            .iter()
            .map(|s| (s.step, s.matches))
            .collect();
        assert_eq!(
            counts,
            [
                (FilterStep::Topic, 7),
                (FilterStep::Years, 5),
                (FilterStep::Country, 2)
            ]
        );
    }

    #[test]
    fn filtered_is_subset_of_topic_matches() {
        let ds = topic_dataset();
        let topic_only: BTreeSet<usize> = View::all(&ds)
            .with_topic("Endometriosis")
            .indices()
            .iter()
            .copied()
            .collect();
        for state in [
            filters("Endometriosis", Some((2010, 2013)), None),
            filters("Endometriosis", None, Some("Qatar")),
            filters("Endometriosis", Some((2000, 2030)), Some("United States")),
        ] {
            let out = apply(&ds, &state.topic_criteria());
            assert!(out.view.indices().iter().all(|i| topic_only.contains(i)));
            assert!(out.view.len() <= ds.len());
        }
    }

    #[test]
    fn year_filter_is_idempotent() {
        let ds = topic_dataset();
        let range = YearRange::new(2011, 2014);
        let once = View::all(&ds).with_years(range);
        let twice = once.with_years(range);
        assert_eq!(once.indices(), twice.indices());
    }

    #[test]
    fn country_match_is_exact() {
        let ds = topic_dataset();
        let view = View::all(&ds).with_country("united states");
        assert_eq!(view.len(), 1);
        assert_eq!(View::all(&ds).with_country("United").len(), 0);
    }

    #[test]
    fn unknown_topic_yields_empty_view() {
        let ds = topic_dataset();
        let out = apply(&ds, &filters("Postpartum Hemorrhage", None, None).topic_criteria());
        assert!(out.view.is_empty());
        assert_eq!(out.steps[0].matches, 0);
    }

    #[test]
    fn views_do_not_mutate_the_dataset() {
        let ds = topic_dataset();
        let before = ds.records().to_vec();
        let _ = apply(&ds, &filters("Endometriosis", Some((2012, 2013)), Some("Qatar")).topic_criteria());
        assert_eq!(ds.records(), before.as_slice());
    }

    #[test]
    fn baseline_ignores_topic_and_mirrors_years() {
        let base = baseline_dataset();
        let state = filters("Endometriosis", Some((2010, 2015)), None);
        match filter_baseline(&base, &state) {
            Baseline::Present(out) => {
                assert_eq!(out.view.len(), 2);
                assert!(out.steps.iter().all(|s| s.step != FilterStep::Topic));
            }
            Baseline::Absent { .. } => panic!("baseline should be present"),
        }
    }

    #[test]
    fn baseline_absent_when_country_has_no_records() {
        let ds = topic_dataset();
        let base = baseline_dataset();
        let state = filters("Endometriosis", None, Some("Qatar"));

        let topic = apply(&ds, &state.topic_criteria());
        assert_eq!(topic.view.len(), 1);

        match filter_baseline(&base, &state) {
            Baseline::Absent { country } => assert_eq!(country.as_deref(), Some("Qatar")),
            Baseline::Present(_) => panic!("baseline should be absent"),
        }
    }

    #[test]
    fn empty_baseline_without_country_is_present() {
        let base = baseline_dataset();
        let state = filters("Endometriosis", Some((1990, 1995)), None);
        match filter_baseline(&base, &state) {
            Baseline::Present(out) => assert!(out.view.is_empty()),
            Baseline::Absent { .. } => panic!("only a country selection marks absence"),
        }
    }

    #[test]
    fn unavailable_country_matches_nothing_and_marks_baseline_absent() {
        let ds = topic_dataset();
        let base = baseline_dataset();
        let mut state = filters("Endometriosis", None, None);
        state.country = CountryFilter::Unavailable;

        let out = apply(&ds, &state.topic_criteria());
        assert!(out.view.is_empty());
        assert_eq!(
            out.steps.last(),
            Some(&StepCount {
                step: FilterStep::Country,
                matches: 0
            })
        );
        match filter_baseline(&base, &state) {
            Baseline::Absent { country } => assert_eq!(country, None),
            Baseline::Present(_) => panic!("baseline should be absent"),
        }
    }

    #[test]
    fn country_options_follow_topic_and_years() {
        let ds = topic_dataset();
        let all = country_options(&ds, &filters("Endometriosis", None, Some("Japan")));
        assert_eq!(all, ["Qatar", "United States", "united states"]);

        let narrowed = country_options(&ds, &filters("Endometriosis", Some((2015, 2016)), None));
        assert_eq!(narrowed, ["United States"]);
    }

    #[test]
    fn resolve_country_prefers_current_then_default_then_first() {
        let options = vec!["Japan".to_string(), "Qatar".to_string(), "United States".to_string()];
        assert_eq!(
            resolve_country(&options, Some("Qatar"), "United States").as_deref(),
            Some("Qatar")
        );
        assert_eq!(
            resolve_country(&options, Some("France"), "United States").as_deref(),
            Some("United States")
        );
        assert_eq!(
            resolve_country(&options[..2], None, "United States").as_deref(),
            Some("Japan")
        );
        assert_eq!(resolve_country(&[], Some("Japan"), "United States"), None);
    }
}
