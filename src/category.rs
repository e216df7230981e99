//! Hazard categories
//!
//! A category's string form is at once the layer id, the preference key and
//! the value matched against the `type` property of dataset features.
//! `as_str` is the only place that string is spelled out.

use std::fmt;
use std::str::FromStr;

use crate::error::OverlayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HazardCategory {
    LargeAirport,
    MediumAirport,
    SmallAirport,
    Heliport,
    SeaplaneBase,
    UsNationalPark,
    Tfr,
    AmaClub,
}

impl HazardCategory {
    /// Table order. Layers are added in this order.
    pub const ALL: [HazardCategory; 8] = [
        HazardCategory::LargeAirport,
        HazardCategory::MediumAirport,
        HazardCategory::SmallAirport,
        HazardCategory::Heliport,
        HazardCategory::SeaplaneBase,
        HazardCategory::UsNationalPark,
        HazardCategory::Tfr,
        HazardCategory::AmaClub,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            HazardCategory::LargeAirport => "large_airport",
            HazardCategory::MediumAirport => "medium_airport",
            HazardCategory::SmallAirport => "small_airport",
            HazardCategory::Heliport => "heliport",
            HazardCategory::SeaplaneBase => "seaplane_base",
            HazardCategory::UsNationalPark => "usnational_park",
            HazardCategory::Tfr => "tfr",
            HazardCategory::AmaClub => "ama_club",
        }
    }
}

impl fmt::Display for HazardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HazardCategory {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HazardCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| OverlayError::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_form_parses_back() {
        for category in HazardCategory::ALL {
            let parsed: HazardCategory = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
            assert_eq!(category.to_string(), category.as_str());
        }
    }

    #[test]
    fn test_legacy_key_is_not_a_category() {
        let err = "flying_sites_260".parse::<HazardCategory>().unwrap_err();
        assert_eq!(err, OverlayError::UnknownCategory("flying_sites_260".into()));
    }

    #[test]
    fn test_string_forms_are_unique() {
        let mut names: Vec<_> = HazardCategory::ALL.iter().map(|c| c.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), HazardCategory::ALL.len());
    }
}
