use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Gender – canonical category of a predicted author gender
// ---------------------------------------------------------------------------

/// Canonical author-gender category.
///
/// The variant order is the fixed display order used by every chart and
/// table, so a `BTreeMap<Gender, _>` iterates female, male, andy, unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    /// Names seen equally often as male and female ("androgynous").
    Andy,
    Unknown,
}

impl Gender {
    /// All categories in display order.
    pub const ALL: [Gender; 4] = [Gender::Female, Gender::Male, Gender::Andy, Gender::Unknown];

    /// Map a raw predicted-gender label to its canonical category.
    ///
    /// Labels are matched exactly; anything unrecognised, including a missing
    /// or empty cell, becomes [`Gender::Unknown`].
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw {
            Some("male" | "mostly_male") => Gender::Male,
            Some("female" | "mostly_female") => Gender::Female,
            Some("andy") => Gender::Andy,
            _ => Gender::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
            Gender::Andy => "andy",
            Gender::Unknown => "unknown",
        }
    }

    /// Which raw predictor labels fold into this category.
    pub fn description(self) -> &'static str {
        match self {
            Gender::Female => "observations predicted as `female` or `mostly_female`",
            Gender::Male => "observations predicted as `male` or `mostly_male`",
            Gender::Andy => {
                "names seen equally often as male and female in the predictor's training data"
            }
            Gender::Unknown => "names not found in the predictor's training data",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_mostly_labels() {
        assert_eq!(Gender::normalize(Some("mostly_female")), Gender::Female);
        assert_eq!(Gender::normalize(Some("mostly_male")), Gender::Male);
        assert_eq!(Gender::normalize(Some("female")), Gender::Female);
        assert_eq!(Gender::normalize(Some("male")), Gender::Male);
        assert_eq!(Gender::normalize(Some("andy")), Gender::Andy);
    }

    #[test]
    fn missing_and_empty_are_unknown() {
        assert_eq!(Gender::normalize(None), Gender::Unknown);
        assert_eq!(Gender::normalize(Some("")), Gender::Unknown);
        assert_eq!(Gender::normalize(Some("unknown")), Gender::Unknown);
    }

    #[test]
    fn matching_is_exact() {
        assert_eq!(Gender::normalize(Some("Female")), Gender::Unknown);
        assert_eq!(Gender::normalize(Some(" male")), Gender::Unknown);
        assert_eq!(Gender::normalize(Some("mostly-male")), Gender::Unknown);
    }

    #[test]
    fn every_label_maps_into_all() {
        for raw in ["male", "mostly_male", "female", "mostly_female", "andy", "x", ""] {
            let g = Gender::normalize(Some(raw));
            assert!(Gender::ALL.contains(&g));
            assert_eq!(g, Gender::normalize(Some(raw)));
        }
    }

    #[test]
    fn ordering_is_display_order() {
        let mut sorted = vec![Gender::Unknown, Gender::Andy, Gender::Male, Gender::Female];
        sorted.sort();
        assert_eq!(sorted, Gender::ALL.to_vec());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Gender::Andy).unwrap();
        assert_eq!(json, "\"andy\"");
    }
}
