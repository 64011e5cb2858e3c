use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::View;
use super::gender::Gender;
use super::model::{AuthorPosition, Publication};

// ---------------------------------------------------------------------------
// Per-year counts
// ---------------------------------------------------------------------------

/// `(year, count)` pairs sorted by year. Years without records are omitted.
pub fn year_counts(view: &View<'_>) -> Vec<(i32, usize)> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for rec in view.records() {
        *counts.entry(rec.year).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Per-category gender counts
// ---------------------------------------------------------------------------

/// Count of records per canonical gender. Zero-count categories are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GenderCounts(BTreeMap<Gender, usize>);

impl GenderCounts {
    /// Count for `gender`, zero when the category never occurred.
    pub fn get(&self, gender: Gender) -> usize {
        self.0.get(&gender).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Fraction of the total in `gender`; 0.0 for an empty total.
    pub fn share(&self, gender: Gender) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.get(gender) as f64 / total as f64,
        }
    }

    /// Present categories in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Gender, usize)> + '_ {
        self.0.iter().map(|(g, n)| (*g, *n))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Gender> for GenderCounts {
    fn from_iter<I: IntoIterator<Item = Gender>>(iter: I) -> Self {
        let mut counts = BTreeMap::new();
        for gender in iter {
            *counts.entry(gender).or_insert(0) += 1;
        }
        GenderCounts(counts)
    }
}

/// Normalise and count the author gender at `position` over the view.
pub fn gender_counts(view: &View<'_>, position: AuthorPosition) -> GenderCounts {
    view.records().map(|rec| rec.gender(position)).collect()
}

// ---------------------------------------------------------------------------
// Summary – everything the dashboard shows for one view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    /// The first records of the view, in source order.
    pub preview: Vec<Publication>,
    pub per_year: Vec<(i32, usize)>,
    pub first_author: GenderCounts,
    pub last_author: GenderCounts,
}

impl Summary {
    pub fn from_view(view: &View<'_>, preview_rows: usize) -> Self {
        Summary {
            total: view.len(),
            preview: view.records().take(preview_rows).cloned().collect(),
            per_year: year_counts(view),
            first_author: gender_counts(view, AuthorPosition::First),
            last_author: gender_counts(view, AuthorPosition::Last),
        }
    }

    pub fn gender_counts(&self, position: AuthorPosition) -> &GenderCounts {
        match position {
            AuthorPosition::First => &self.first_author,
            AuthorPosition::Last => &self.last_author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::View;
    use crate::data::model::fixtures::publication;
    use crate::data::model::Dataset;

    fn dataset() -> Dataset {
        Dataset::from_records(
            vec![
                publication(2014, None, &["A"], Some("female"), Some("male")),
                publication(2010, None, &["A"], Some("mostly_female"), Some("mostly_male")),
                publication(2014, None, &["A"], Some("andy"), None),
                publication(2012, None, &["B"], None, Some("unknown")),
                publication(2010, None, &["A"], Some("male"), Some("female")),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn years_are_sorted_and_sparse() {
        let ds = dataset();
        let counts = year_counts(&View::all(&ds));
        assert_eq!(counts, [(2010, 2), (2012, 1), (2014, 2)]);
    }

    #[test]
    fn year_counts_sum_to_view_size() {
        let ds = dataset();
        for view in [View::all(&ds), View::all(&ds).with_topic("A"), View::all(&ds).with_topic("Z")] {
            let sum: usize = year_counts(&view).iter().map(|(_, n)| n).sum();
            assert_eq!(sum, view.len());
        }
    }

    #[test]
    fn gender_counts_per_position() {
        let ds = dataset();
        let view = View::all(&ds);

        let first = gender_counts(&view, AuthorPosition::First);
        assert_eq!(first.get(Gender::Female), 2);
        assert_eq!(first.get(Gender::Male), 1);
        assert_eq!(first.get(Gender::Andy), 1);
        assert_eq!(first.get(Gender::Unknown), 1);

        let last = gender_counts(&view, AuthorPosition::Last);
        assert_eq!(last.get(Gender::Male), 2);
        assert_eq!(last.get(Gender::Female), 1);
        assert_eq!(last.get(Gender::Unknown), 2);
        assert_eq!(last.get(Gender::Andy), 0);
        assert_eq!(last.total(), 5);
    }

    #[test]
    fn zero_categories_are_absent() {
        let ds = dataset();
        let last = gender_counts(&View::all(&ds), AuthorPosition::Last);
        let present: Vec<Gender> = last.iter().map(|(g, _)| g).collect();
        assert_eq!(present, [Gender::Female, Gender::Male, Gender::Unknown]);
    }

    #[test]
    fn empty_view_aggregates_to_nothing() {
        let ds = dataset();
        let view = View::all(&ds).with_topic("Z");
        let summary = Summary::from_view(&view, 5);
        assert_eq!(summary.total, 0);
        assert!(summary.preview.is_empty());
        assert!(summary.per_year.is_empty());
        assert!(summary.first_author.is_empty());
        assert_eq!(summary.first_author.share(Gender::Female), 0.0);
    }

    #[test]
    fn summary_is_deterministic_and_previews_in_order() {
        let ds = dataset();
        let view = View::all(&ds).with_topic("A");
        let a = Summary::from_view(&view, 2);
        let b = Summary::from_view(&view, 2);
        assert_eq!(a, b);
        let years: Vec<i32> = a.preview.iter().map(|r| r.year).collect();
        assert_eq!(years, [2014, 2010]);
        assert_eq!(a.total, 4);
    }

    #[test]
    fn shares_sum_to_one() {
        let ds = dataset();
        let counts = gender_counts(&View::all(&ds), AuthorPosition::First);
        let sum: f64 = Gender::ALL.iter().map(|g| counts.share(*g)).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!((counts.share(Gender::Female) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn serializes_categories_by_name() {
        let counts: GenderCounts = [Gender::Male, Gender::Male, Gender::Andy].into_iter().collect();
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"male":2,"andy":1}"#);
    }
}
