//! Nutrient extraction from food entries
//!
//! Foods come either as objects with a `nutrients` block or as free text
//! such as `"1 cup oatmeal, 150 cal, 5g protein, 27g carbs, 3g fat"`.

use super::json::{int_from_first, is_truthy};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::AddAssign;

static CALORIES_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*cal").ok());
static PROTEIN_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)g\s*protein").ok());
static CARBS_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)g\s*carbs").ok());
static FAT_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)g\s*fats?").ok());

/// Unrounded nutrient accumulator for one meal
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl AddAssign for NutrientTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.calories += rhs.calories;
        self.protein += rhs.protein;
        self.carbs += rhs.carbs;
        self.fat += rhs.fat;
    }
}

/// Pulls nutrient amounts out of food entries that carry no meal-level macros
pub struct NutrientExtractor;

impl NutrientExtractor {
    /// Sum the nutrients of every food entry
    ///
    /// Entries that are neither text nor objects with a `nutrients` block
    /// contribute nothing.
    pub fn extract(foods: &[Value]) -> NutrientTotals {
        foods.iter().fold(NutrientTotals::default(), |mut totals, food| {
            totals += Self::from_food(food);
            totals
        })
    }

    /// Nutrients of a single food entry
    pub fn from_food(food: &Value) -> NutrientTotals {
        match food {
            Value::String(text) => Self::from_text(text),
            Value::Object(obj) => match obj.get("nutrients") {
                Some(nutrients) if is_truthy(nutrients) => Self::from_nutrients(nutrients),
                _ => NutrientTotals::default(),
            },
            _ => NutrientTotals::default(),
        }
    }

    /// Integer-parse a structured `nutrients` block
    pub fn from_nutrients(nutrients: &Value) -> NutrientTotals {
        NutrientTotals {
            calories: int_from_first([nutrients.get("calories")]),
            protein: int_from_first([nutrients.get("protein")]),
            carbs: int_from_first([nutrients.get("carbs")]),
            fat: int_from_first([nutrients.get("fats"), nutrients.get("fat")]),
        }
    }

    /// Scan free text for `<n> cal`, `<n>g protein`, `<n>g carbs` and `<n>g fat(s)`
    pub fn from_text(text: &str) -> NutrientTotals {
        NutrientTotals {
            calories: capture_amount(&CALORIES_PATTERN, text),
            protein: capture_amount(&PROTEIN_PATTERN, text),
            carbs: capture_amount(&CARBS_PATTERN, text),
            fat: capture_amount(&FAT_PATTERN, text),
        }
    }
}

fn capture_amount(pattern: &Lazy<Option<Regex>>, text: &str) -> f64 {
    pattern
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_with_all_nutrients() {
        let totals = NutrientExtractor::from_text("1 cup oatmeal, 150 cal, 5g protein, 27g carbs, 3g fat");
        assert_eq!(
            totals,
            NutrientTotals {
                calories: 150.0,
                protein: 5.0,
                carbs: 27.0,
                fat: 3.0
            }
        );
    }

    #[test]
    fn test_text_with_decimals_and_plural_fats() {
        let totals = NutrientExtractor::from_text("Salmon fillet (165 calories, 22.5g protein, 0g carbs, 7.5g fats)");
        assert_eq!(totals.calories, 165.0);
        assert_eq!(totals.protein, 22.5);
        assert_eq!(totals.carbs, 0.0);
        assert_eq!(totals.fat, 7.5);
    }

    #[test]
    fn test_text_missing_nutrients_contribute_zero() {
        let totals = NutrientExtractor::from_text("2 eggs, 140 cal");
        assert_eq!(totals.calories, 140.0);
        assert_eq!(totals.protein, 0.0);
        assert_eq!(totals.carbs, 0.0);
        assert_eq!(totals.fat, 0.0);

        assert_eq!(NutrientExtractor::from_text("a handful of almonds"), NutrientTotals::default());
    }

    #[test]
    fn test_text_is_case_sensitive_like_the_generator_output() {
        // The generator always emits lower-case units
        let totals = NutrientExtractor::from_text("Oats, 150 CAL, 5G Protein");
        assert_eq!(totals, NutrientTotals::default());
    }

    #[test]
    fn test_nutrients_object_truncates_and_prefers_fats() {
        let food = json!({
            "item": "Grilled chicken",
            "nutrients": {"calories": "165 cal", "protein": 31.8, "carbs": "0g", "fats": "3.6g", "fat": 99}
        });
        let totals = NutrientExtractor::from_food(&food);
        assert_eq!(
            totals,
            NutrientTotals {
                calories: 165.0,
                protein: 31.0,
                carbs: 0.0,
                fat: 3.0
            }
        );
    }

    #[test]
    fn test_nutrients_object_falls_back_to_fat() {
        let food = json!({"nutrients": {"calories": 90, "fats": "", "fat": "4g"}});
        assert_eq!(NutrientExtractor::from_food(&food).fat, 4.0);
    }

    #[test]
    fn test_unparseable_fields_are_zero() {
        let food = json!({"nutrients": {"calories": "lots", "protein": null}});
        assert_eq!(NutrientExtractor::from_food(&food), NutrientTotals::default());
    }

    #[test]
    fn test_objects_without_nutrients_and_other_values_are_ignored() {
        assert_eq!(
            NutrientExtractor::from_food(&json!({"item": "Apple, 95 cal"})),
            NutrientTotals::default()
        );
        assert_eq!(NutrientExtractor::from_food(&json!(42)), NutrientTotals::default());
        assert_eq!(NutrientExtractor::from_food(&json!(null)), NutrientTotals::default());
    }

    #[test]
    fn test_extract_sums_mixed_entries() {
        let foods = vec![
            json!("1 cup oatmeal, 150 cal, 5g protein, 27g carbs, 3g fat"),
            json!({"item": "Banana", "nutrients": {"calories": 105, "protein": 1, "carbs": 27, "fat": 0}}),
            json!("Black coffee"),
        ];
        let totals = NutrientExtractor::extract(&foods);
        assert_eq!(
            totals,
            NutrientTotals {
                calories: 255.0,
                protein: 6.0,
                carbs: 54.0,
                fat: 3.0
            }
        );
        assert_eq!(NutrientExtractor::extract(&[]), NutrientTotals::default());
    }
}
