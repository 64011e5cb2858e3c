use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use super::gender::Gender;

/// Source column names shared by every supported file format.
pub const YEAR_COLUMN: &str = "Year";
pub const COUNTRY_COLUMN: &str = "Country";
pub const TOPICS_COLUMN: &str = "MeSH_Clean";
pub const FIRST_GENDER_COLUMN: &str = "Predicted_First_Gender";
pub const LAST_GENDER_COLUMN: &str = "Predicted_Last_Gender";

/// Columns the loader interprets; everything else is carried as `extra`.
pub const KNOWN_COLUMNS: [&str; 5] = [
    YEAR_COLUMN,
    COUNTRY_COLUMN,
    TOPICS_COLUMN,
    FIRST_GENDER_COLUMN,
    LAST_GENDER_COLUMN,
];

// ---------------------------------------------------------------------------
// AuthorPosition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorPosition {
    First,
    Last,
}

impl fmt::Display for AuthorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorPosition::First => write!(f, "First Author"),
            AuthorPosition::Last => write!(f, "Last Author"),
        }
    }
}

// ---------------------------------------------------------------------------
// Publication – one row of the source table
// ---------------------------------------------------------------------------

/// A single article's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Publication {
    pub year: i32,
    pub country: Option<String>,
    /// Topic tags parsed from the string-encoded list at load time.
    pub topics: BTreeSet<String>,
    /// Raw predictor labels, kept as-is for the preview table.
    pub first_gender: Option<String>,
    pub last_gender: Option<String>,
    /// Remaining source columns: column_name → cell text.
    pub extra: BTreeMap<String, String>,
}

impl Publication {
    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.contains(topic)
    }

    pub fn raw_gender(&self, position: AuthorPosition) -> Option<&str> {
        match position {
            AuthorPosition::First => self.first_gender.as_deref(),
            AuthorPosition::Last => self.last_gender.as_deref(),
        }
    }

    /// Canonical gender of the author at `position`.
    pub fn gender(&self, position: AuthorPosition) -> Gender {
        Gender::normalize(self.raw_gender(position))
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An immutable loaded table with pre-computed column facts.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Publication>,
    /// Extra column names in source order.
    extra_columns: Vec<String>,
    /// Observed (min, max) year; `None` for an empty table.
    year_bounds: Option<(i32, i32)>,
    /// Sorted unique non-null countries.
    countries: BTreeSet<String>,
}

impl Dataset {
    /// Build column facts from the loaded records.
    pub fn from_records(records: Vec<Publication>, extra_columns: Vec<String>) -> Self {
        let year_bounds = records.iter().fold(None, |acc, rec| match acc {
            None => Some((rec.year, rec.year)),
            Some((lo, hi)) => Some((i32::min(lo, rec.year), i32::max(hi, rec.year))),
        });
        let countries = records
            .iter()
            .filter_map(|rec| rec.country.clone())
            .collect();

        Dataset {
            records,
            extra_columns,
            year_bounds,
            countries,
        }
    }

    pub fn records(&self) -> &[Publication] {
        &self.records
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        self.year_bounds
    }

    pub fn countries(&self) -> &BTreeSet<String> {
        &self.countries
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
