//! Per-meal-type defaults used when a plan leaves a field out

use serde::Serialize;

/// Default serving time for meal types containing `keyword`
///
/// `variants` refine the time when the type also contains a qualifier,
/// e.g. "morning snack".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeRule {
    pub keyword: &'static str,
    pub time: &'static str,
    pub variants: &'static [(&'static str, &'static str)],
}

/// Versioned lookup table of meal-type defaults
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MealTypeDefaults {
    pub version: &'static str,
    /// Searched in order; the first keyword found in any food names the meal
    pub protein_keywords: &'static [&'static str],
    /// Exact lower-case type -> name used when no food names the meal
    pub names: &'static [(&'static str, &'static str)],
    /// Exact lower-case type -> description
    pub descriptions: &'static [(&'static str, &'static str)],
    pub fallback_description: &'static str,
    /// Substring rules, first match wins
    pub times: &'static [TimeRule],
    pub fallback_time: &'static str,
    /// Type used when a meal carries neither `type` nor `meal_type`
    pub missing_type: &'static str,
    pub unknown_food_item: &'static str,
}

impl MealTypeDefaults {
    pub const V1: MealTypeDefaults = MealTypeDefaults {
        version: "v1",
        protein_keywords: &["chicken", "beef", "fish", "salmon", "tofu", "eggs", "turkey"],
        names: &[
            ("breakfast", "Balanced Breakfast"),
            ("lunch", "Nutrient-Rich Lunch"),
            ("dinner", "Complete Dinner"),
            ("snack", "Healthy Snack"),
        ],
        descriptions: &[
            (
                "breakfast",
                "A nutritious morning meal to kickstart your day with energy and focus",
            ),
            (
                "lunch",
                "Balanced midday meal with protein and complex carbs to sustain energy levels",
            ),
            (
                "dinner",
                "Wholesome evening meal with lean protein and vegetables for recovery and repair",
            ),
            (
                "snack",
                "Strategic snack to maintain energy and support your fitness goals",
            ),
        ],
        fallback_description: "Balanced meal with optimal macronutrient distribution",
        times: &[
            TimeRule {
                keyword: "breakfast",
                time: "8:00 AM",
                variants: &[],
            },
            TimeRule {
                keyword: "lunch",
                time: "12:30 PM",
                variants: &[],
            },
            TimeRule {
                keyword: "dinner",
                time: "7:00 PM",
                variants: &[],
            },
            TimeRule {
                keyword: "snack",
                time: "3:30 PM",
                variants: &[("morning", "10:00 AM"), ("afternoon", "3:30 PM")],
            },
        ],
        fallback_time: "12:00 PM",
        missing_type: "meal",
        unknown_food_item: "Unknown food item",
    };

    /// Name for a meal with no usable food, keyed on the exact lower-case type
    pub fn default_name(&self, meal_type: &str) -> Option<&'static str> {
        lookup(self.names, meal_type)
    }

    pub fn description(&self, meal_type: &str) -> &'static str {
        lookup(self.descriptions, meal_type).unwrap_or(self.fallback_description)
    }

    /// Default time by substring match on the lower-cased type
    pub fn default_time(&self, meal_type: &str) -> &'static str {
        let lowered = meal_type.to_lowercase();
        self.times
            .iter()
            .find(|rule| lowered.contains(rule.keyword))
            .map(|rule| {
                rule.variants
                    .iter()
                    .find(|(qualifier, _)| lowered.contains(qualifier))
                    .map(|(_, time)| *time)
                    .unwrap_or(rule.time)
            })
            .unwrap_or(self.fallback_time)
    }
}

impl Default for MealTypeDefaults {
    fn default() -> Self {
        Self::V1
    }
}

fn lookup(table: &'static [(&'static str, &'static str)], meal_type: &str) -> Option<&'static str> {
    let lowered = meal_type.to_lowercase();
    table
        .iter()
        .find(|(key, _)| *key == lowered)
        .map(|(_, value)| *value)
}
