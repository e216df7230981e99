//! Static styling table for hazard categories
//!
//! The one place colors, opacities and dataset assignments live.

use bevy::color::Srgba;

use crate::category::HazardCategory;
use crate::datasets::DatasetName;

const BLUE: Srgba = Srgba::new(0.0, 0.0, 1.0, 1.0);
const PURPLE: Srgba = Srgba::new(0.5, 0.0, 0.5, 1.0);
const ORANGE: Srgba = Srgba::new(1.0, 0.5, 0.0, 1.0);
const YELLOW: Srgba = Srgba::new(1.0, 1.0, 0.0, 1.0);
const CYAN: Srgba = Srgba::new(0.0, 1.0, 1.0, 1.0);
const PINK: Srgba = Srgba::new(1.0, 0.176, 0.333, 1.0);
const GREEN: Srgba = Srgba::new(0.0, 1.0, 0.0, 1.0);

pub const STRIPE_PATTERN: &str = "stripe-pattern";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayShape {
    /// Point features drawn as a circle of fixed real-world radius
    Circle,
    /// Features whose geometry is already an area
    Polygon,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Srgba,
    pub width: f32,
}

const WHITE_STROKE: Stroke = Stroke {
    color: Srgba::WHITE,
    width: 1.0,
};

/// `property == value` filter over feature properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFilter {
    pub property: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStyle {
    pub category: HazardCategory,
    pub dataset: DatasetName,
    pub shape: OverlayShape,
    pub fill_color: Srgba,
    pub fill_pattern: Option<&'static str>,
    pub stroke: Option<Stroke>,
    pub opacity: f32,
    pub filter: Option<FeatureFilter>,
    pub source_layer: Option<&'static str>,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl CategoryStyle {
    fn airport(category: HazardCategory, fill_color: Srgba, opacity: f32) -> Self {
        Self {
            category,
            dataset: DatasetName::Airports,
            shape: OverlayShape::Circle,
            fill_color,
            fill_pattern: None,
            stroke: Some(WHITE_STROKE),
            opacity,
            filter: Some(FeatureFilter {
                property: "type",
                value: category.as_str(),
            }),
            source_layer: None,
            min_zoom: 4.0,
            max_zoom: 20.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    entries: Vec<CategoryStyle>,
}

impl CategoryRegistry {
    pub fn standard() -> Self {
        let entries = vec![
            CategoryStyle::airport(HazardCategory::LargeAirport, BLUE, 0.4),
            CategoryStyle::airport(HazardCategory::MediumAirport, PURPLE, 0.4),
            CategoryStyle::airport(HazardCategory::SmallAirport, ORANGE, 0.4),
            CategoryStyle::airport(HazardCategory::Heliport, YELLOW, 0.3),
            CategoryStyle::airport(HazardCategory::SeaplaneBase, CYAN, 0.4),
            CategoryStyle {
                category: HazardCategory::UsNationalPark,
                dataset: DatasetName::Parks,
                shape: OverlayShape::Polygon,
                fill_color: PINK,
                fill_pattern: None,
                stroke: Some(WHITE_STROKE),
                opacity: 0.6,
                filter: None,
                source_layer: Some(HazardCategory::UsNationalPark.as_str()),
                min_zoom: 0.0,
                max_zoom: 22.0,
            },
            CategoryStyle {
                category: HazardCategory::Tfr,
                dataset: DatasetName::UasRestrictions,
                shape: OverlayShape::Polygon,
                fill_color: PINK,
                fill_pattern: Some(STRIPE_PATTERN),
                stroke: None,
                opacity: 0.8,
                filter: None,
                source_layer: None,
                min_zoom: 0.0,
                max_zoom: 22.0,
            },
            CategoryStyle {
                category: HazardCategory::AmaClub,
                dataset: DatasetName::AmaClub,
                shape: OverlayShape::Circle,
                fill_color: GREEN,
                fill_pattern: None,
                stroke: Some(WHITE_STROKE),
                opacity: 0.4,
                filter: None,
                source_layer: None,
                min_zoom: 4.0,
                max_zoom: 20.0,
            },
        ];
        Self { entries }
    }

    pub fn get(&self, category: HazardCategory) -> Option<&CategoryStyle> {
        self.entries.iter().find(|e| e.category == category)
    }

    /// Entries in table order
    pub fn iter(&self) -> impl Iterator<Item = &CategoryStyle> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_entry_per_category_in_table_order() {
        let registry = CategoryRegistry::standard();
        let order: Vec<_> = registry.iter().map(|e| e.category).collect();
        assert_eq!(order, HazardCategory::ALL.to_vec());
    }

    #[test]
    fn test_opacity_by_kind() {
        let registry = CategoryRegistry::standard();
        let opacity = |c| registry.get(c).unwrap().opacity;
        assert_eq!(opacity(HazardCategory::LargeAirport), 0.4);
        assert_eq!(opacity(HazardCategory::SeaplaneBase), 0.4);
        assert_eq!(opacity(HazardCategory::Heliport), 0.3);
        assert_eq!(opacity(HazardCategory::UsNationalPark), 0.6);
        assert_eq!(opacity(HazardCategory::Tfr), 0.8);
    }

    #[test]
    fn test_tfr_uses_pattern_instead_of_stroke() {
        let registry = CategoryRegistry::standard();
        let tfr = registry.get(HazardCategory::Tfr).unwrap();
        assert!(tfr.stroke.is_none());
        assert_eq!(tfr.fill_pattern, Some(STRIPE_PATTERN));

        for entry in registry.iter().filter(|e| e.category != HazardCategory::Tfr) {
            assert_eq!(entry.stroke, Some(WHITE_STROKE), "{}", entry.category);
            assert!(entry.fill_pattern.is_none());
        }
    }

    #[test]
    fn test_shapes_and_datasets() {
        let registry = CategoryRegistry::standard();
        let circles: Vec<_> = registry
            .iter()
            .filter(|e| e.shape == OverlayShape::Circle)
            .map(|e| e.category)
            .collect();
        assert_eq!(
            circles,
            vec![
                HazardCategory::LargeAirport,
                HazardCategory::MediumAirport,
                HazardCategory::SmallAirport,
                HazardCategory::Heliport,
                HazardCategory::SeaplaneBase,
                HazardCategory::AmaClub,
            ]
        );

        let heliport = registry.get(HazardCategory::Heliport).unwrap();
        assert_eq!(heliport.dataset, DatasetName::Airports);
        assert_eq!(
            heliport.filter,
            Some(FeatureFilter {
                property: "type",
                value: "heliport"
            })
        );
        assert_eq!(
            registry.get(HazardCategory::UsNationalPark).unwrap().dataset,
            DatasetName::Parks
        );
    }
}
