//! Diet plan normalization
//!
//! Turns a generated diet plan, in any of the payload layouts the plan
//! generator has produced, into one canonical per-day structure with
//! resolved meal names, times and nutrient totals.
//!
//! # Contract
//!
//! 1. **One entry per day, one meal per meal**: nothing is dropped; missing
//!    fields fall back to defaults
//! 2. **Whole non-negative numbers**: every nutrient in the output is rounded
//!    and clamped at zero
//! 3. **`fat` vs `fats`**: meals report `fat`, daily totals report `fats`.
//!    Display code depends on both keys.

pub mod defaults;
pub mod json;
pub mod meal;
pub mod nutrients;
pub mod shape;
pub mod targets;

pub use defaults::{MealTypeDefaults, TimeRule};
pub use meal::{CanonicalMeal, MealContext};
pub use nutrients::{NutrientExtractor, NutrientTotals};
pub use shape::{classify, PlanShape};
pub use targets::{compare_to_targets, DayTargetComparison, TargetDelta, CALORIE_TOLERANCE};

use crate::errors::PlanError;
use json::{amount_from_first, array_field, to_count};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

// ============================================================================
// Canonical Types
// ============================================================================

/// Nutrient totals for a whole day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DailyTotals {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fats: u32,
}

impl DailyTotals {
    /// Add one meal, saturating at `u32::MAX`
    fn add_meal(self, meal: &CanonicalMeal) -> Self {
        Self {
            calories: self.calories.saturating_add(meal.calories),
            protein: self.protein.saturating_add(meal.protein),
            carbs: self.carbs.saturating_add(meal.carbs),
            fats: self.fats.saturating_add(meal.fat),
        }
    }
}

/// One day of the canonical plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDay {
    pub title: String,
    pub meals: Vec<CanonicalMeal>,
    #[serde(rename = "dailyTotals")]
    pub daily_totals: DailyTotals,
    /// Raw food lists keyed by the meal type as written in the plan
    #[serde(rename = "originalFoods")]
    pub original_foods: BTreeMap<String, Vec<Value>>,
}

/// Normalized plan, keyed `day<N>` in input order
///
/// Serializes as a JSON object whose keys keep the order the days
/// appeared in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanonicalPlan {
    days: Vec<(String, CanonicalDay)>,
}

impl CanonicalPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a day, replacing an existing day with the same key in place
    pub fn insert(&mut self, key: String, day: CanonicalDay) -> Option<CanonicalDay> {
        match self.days.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, day)),
            None => {
                self.days.push((key, day));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&CanonicalDay> {
        self.days.iter().find(|(k, _)| k == key).map(|(_, day)| day)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.days.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CanonicalDay)> {
        self.days.iter().map(|(key, day)| (key.as_str(), day))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl Serialize for CanonicalPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (key, day) in &self.days {
            map.serialize_entry(key, day)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CanonicalPlan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PlanVisitor;

        impl<'de> Visitor<'de> for PlanVisitor {
            type Value = CanonicalPlan;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of day keys to canonical days")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut plan = CanonicalPlan::new();
                while let Some((key, day)) = access.next_entry::<String, CanonicalDay>()? {
                    plan.insert(key, day);
                }
                Ok(plan)
            }
        }

        deserializer.deserialize_map(PlanVisitor)
    }
}

// ============================================================================
// Day Totals
// ============================================================================

type DayTotalsResolver = fn(&Value, &[CanonicalMeal]) -> Option<DailyTotals>;

/// Explicit day totals win over the sum of the meals
pub const DAY_TOTALS_RESOLVERS: [DayTotalsResolver; 2] = [day_totals_from_plan, day_totals_from_meals];

/// Day-level totals blocks, in order
const DAY_TOTALS_KEYS: [&str; 2] = ["totals", "daily_totals"];

/// `totals` or `daily_totals` when it is an object; fat is read from `fats` then `fat`
///
/// Numbers are rounded, strings keep their leading integer.
pub fn day_totals_from_plan(day: &Value, _meals: &[CanonicalMeal]) -> Option<DailyTotals> {
    let totals = DAY_TOTALS_KEYS
        .iter()
        .find_map(|key| day.get(key).filter(|v| v.is_object()))?;
    Some(DailyTotals {
        calories: to_count(amount_from_first([totals.get("calories")])),
        protein: to_count(amount_from_first([totals.get("protein")])),
        carbs: to_count(amount_from_first([totals.get("carbs")])),
        fats: to_count(amount_from_first([totals.get("fats"), totals.get("fat")])),
    })
}

pub fn day_totals_from_meals(_day: &Value, meals: &[CanonicalMeal]) -> Option<DailyTotals> {
    Some(meals.iter().fold(DailyTotals::default(), DailyTotals::add_meal))
}

/// `N` of the `day<N>` key as written in the plan's `day` field
fn explicit_day_number(day: &Value) -> Option<String> {
    match day.get("day") {
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(whole), _) => Some(whole.to_string()),
            (None, Some(v)) if v.fract() == 0.0 => Some(format!("{v:.0}")),
            (None, Some(v)) => Some(v.to_string()),
            (None, None) => None,
        },
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Day numbers for every day of a plan, in input order
///
/// A day without a usable `day` field takes its 1-based position, moving
/// up to the next position no other day claims.
pub fn day_numbers(days: &[Value]) -> Vec<String> {
    let explicit: Vec<Option<String>> = days.iter().map(explicit_day_number).collect();
    let mut taken: HashSet<String> = explicit.iter().flatten().cloned().collect();

    explicit
        .into_iter()
        .enumerate()
        .map(|(index, number)| {
            number.unwrap_or_else(|| {
                let free = (index + 1..)
                    .map(|position| position.to_string())
                    .find(|candidate| !taken.contains(candidate))
                    .unwrap_or_default();
                taken.insert(free.clone());
                free
            })
        })
        .collect()
}

// ============================================================================
// Normalizer
// ============================================================================

/// Normalizes plan payloads against a set of meal-type defaults
#[derive(Debug, Clone, Default)]
pub struct PlanNormalizer {
    defaults: MealTypeDefaults,
}

impl PlanNormalizer {
    pub fn new(defaults: MealTypeDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &MealTypeDefaults {
        &self.defaults
    }

    /// Normalize a raw plan payload
    ///
    /// Fails only when the payload matches none of the known layouts.
    pub fn normalize(&self, payload: &Value) -> Result<CanonicalPlan, PlanError> {
        let shape = classify(payload).map_err(|err| {
            warn!("Unrecognized meal plan payload shape");
            err
        })?;
        debug!(shape = shape.name(), days = shape.days().len(), "Normalizing meal plan");

        let days = shape.days();
        let mut plan = CanonicalPlan::new();
        for (number, day) in day_numbers(days).iter().zip(days) {
            let (key, canonical) = self.normalize_day(number, day);
            if plan.insert(key.clone(), canonical).is_some() {
                warn!(day = %key, "Duplicate day in meal plan, keeping the later one");
            }
        }
        Ok(plan)
    }

    /// Normalize one day numbered `number`, returning its `day<N>` key
    pub fn normalize_day(&self, number: &str, day: &Value) -> (String, CanonicalDay) {
        let mut original_foods: BTreeMap<String, Vec<Value>> = BTreeMap::new();

        let meals: Vec<CanonicalMeal> = array_field(day, "meals")
            .iter()
            .map(|raw| {
                let ctx = MealContext::new(raw, &self.defaults);
                // A later meal of the same type replaces the earlier list
                original_foods.insert(ctx.meal_type.to_string(), ctx.foods.to_vec());
                meal::assemble(&ctx)
            })
            .collect();

        let daily_totals = DAY_TOTALS_RESOLVERS
            .iter()
            .find_map(|resolve| resolve(day, &meals))
            .unwrap_or_default();

        let canonical = CanonicalDay {
            title: format!("Day {number}"),
            meals,
            daily_totals,
            original_foods,
        };
        (format!("day{number}"), canonical)
    }
}

/// Normalize with the current meal-type defaults
pub fn normalize_plan(payload: &Value) -> Result<CanonicalPlan, PlanError> {
    PlanNormalizer::default().normalize(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn sample_days() -> Value {
        json!([
            {
                "day": 1,
                "meals": [
                    {"type": "breakfast", "foods": ["1 cup oatmeal, 150 cal, 5g protein, 27g carbs, 3g fat"]},
                    {
                        "meal_type": "lunch",
                        "time": "1:00 PM",
                        "foods": [{"item": "Grilled chicken salad", "nutrients": {"calories": "420", "protein": "38g", "carbs": "20g", "fats": "18g"}}]
                    }
                ],
                "totals": {"calories": 2000, "protein": "150g", "carbs": 210, "fat": 60}
            },
            {
                "day": 2,
                "meals": [
                    {"type": "dinner", "macros": {"calories": 610, "protein": 45, "carbs": 50, "fats": 22}, "foods": ["Salmon fillet"]},
                    {"type": "snack", "foods": ["Apple, 95 cal, 0g protein, 25g carbs"]}
                ]
            }
        ])
    }

    #[test]
    fn test_normalize_full_plan() {
        let plan = normalize_plan(&json!({"meal_plan": {"days": sample_days()}})).unwrap();
        assert_eq!(plan.keys().collect::<Vec<_>>(), vec!["day1", "day2"]);

        let day1 = plan.get("day1").unwrap();
        assert_eq!(day1.title, "Day 1");
        assert_eq!(day1.meals.len(), 2);
        assert_eq!(day1.meals[0].name, "Oatmeal-Based Breakfast");
        assert_eq!(day1.meals[0].items, vec!["oatmeal, 1 cup"]);
        assert_eq!(day1.meals[1].meal_type, "Lunch");
        assert_eq!(day1.meals[1].time, "1:00 PM");
        assert_eq!(day1.meals[1].name, "Chicken-Based Lunch");
        assert_eq!(day1.meals[1].calories, 420);
        assert_eq!(day1.meals[1].fat, 18);
        // Explicit totals are used verbatim, `fat` accepted on input
        assert_eq!(
            day1.daily_totals,
            DailyTotals {
                calories: 2000,
                protein: 150,
                carbs: 210,
                fats: 60
            }
        );
        assert_eq!(day1.original_foods.len(), 2);
        assert_eq!(day1.original_foods["lunch"][0]["item"], "Grilled chicken salad");

        let day2 = plan.get("day2").unwrap();
        assert_eq!(day2.meals[0].name, "Salmon-Based Dinner");
        assert_eq!(day2.meals[1].time, "3:30 PM");
        assert_eq!(
            day2.daily_totals,
            DailyTotals {
                calories: 705,
                protein: 45,
                carbs: 75,
                fats: 22
            }
        );
    }

    #[test]
    fn test_fat_key_asymmetry_in_json() {
        let plan = normalize_plan(&json!({"meal_plan": sample_days()})).unwrap();
        let value = serde_json::to_value(&plan).unwrap();
        let day2 = &value["day2"];
        assert_eq!(day2["meals"][0]["fat"], 22);
        assert!(day2["meals"][0].get("fats").is_none());
        assert_eq!(day2["dailyTotals"]["fats"], 22);
        assert!(day2["dailyTotals"].get("fat").is_none());
        assert!(day2.get("originalFoods").is_some());
    }

    #[test]
    fn test_empty_days_and_unrecognized_payload() {
        let plan = normalize_plan(&json!({"meal_plan": {"days": []}})).unwrap();
        assert!(plan.is_empty());
        assert_eq!(serde_json::to_string(&plan).unwrap(), "{}");

        assert_eq!(normalize_plan(&json!({})), Err(PlanError::UnrecognizedPlanShape));
    }

    #[test]
    fn test_day_keys() {
        let plan = normalize_plan(&json!({"meal_plan": [
            {"day": "3", "meals": []},
            {"meals": []},
            {"day": 5.0, "meals": []},
            {"day": " ", "meals": []}
        ]}))
        .unwrap();
        assert_eq!(plan.keys().collect::<Vec<_>>(), vec!["day3", "day2", "day5", "day4"]);
        assert_eq!(plan.get("day5").unwrap().title, "Day 5");
    }

    #[test]
    fn test_duplicate_day_replaces_in_place() {
        let plan = normalize_plan(&json!({"meal_plan": [
            {"day": 1, "meals": [{"type": "breakfast"}]},
            {"day": 2, "meals": []},
            {"day": 1, "meals": [{"type": "dinner"}]}
        ]}))
        .unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.keys().collect::<Vec<_>>(), vec!["day1", "day2"]);
        assert_eq!(plan.get("day1").unwrap().meals[0].meal_type, "Dinner");
    }

    #[test]
    fn test_missing_meals_and_types() {
        let plan = normalize_plan(&json!({"formatted_plan": {"days": [
            {"day": 1},
            {"day": 2, "meals": [{"foods": ["Rice, 200 cal"]}, {"foods": ["Beans, 120 cal"]}]}
        ]}}))
        .unwrap();
        let day1 = plan.get("day1").unwrap();
        assert!(day1.meals.is_empty());
        assert_eq!(day1.daily_totals, DailyTotals::default());

        let day2 = plan.get("day2").unwrap();
        assert_eq!(day2.meals[0].meal_type, "Meal");
        // The last meal of a type supplies its original foods
        assert_eq!(day2.original_foods["meal"], vec![json!("Beans, 120 cal")]);
        assert_eq!(day2.original_foods.len(), 1);
        assert_eq!(day2.daily_totals.calories, 320);
    }

    #[test]
    fn test_positional_day_keys_skip_explicit_numbers() {
        let plan = normalize_plan(&json!({"meal_plan": [
            {"day": 2, "meals": [{"type": "lunch"}]},
            {"meals": [{"type": "dinner"}]}
        ]}))
        .unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.keys().collect::<Vec<_>>(), vec!["day2", "day3"]);
        assert_eq!(plan.get("day3").unwrap().meals[0].meal_type, "Dinner");

        // An explicit number later in the plan still wins its key
        let plan = normalize_plan(&json!({"meal_plan": [
            {"meals": []},
            {"day": 1, "meals": []}
        ]}))
        .unwrap();
        assert_eq!(plan.keys().collect::<Vec<_>>(), vec!["day2", "day1"]);
    }

    #[test]
    fn test_daily_totals_saturate() {
        let plan = normalize_plan(&json!({"meal_plan": [{"day": 1, "meals": [
            {"type": "lunch", "macros": {"calories": 3_000_000_000u64, "protein": 10}},
            {"type": "dinner", "macros": {"calories": 3_000_000_000u64, "protein": 5}}
        ]}]}))
        .unwrap();
        let totals = plan.get("day1").unwrap().daily_totals;
        assert_eq!(totals.calories, u32::MAX);
        assert_eq!(totals.protein, 15);
    }

    #[test]
    fn test_daily_totals_sum_rounded_meals() {
        let plan = normalize_plan(&json!({"meal_plan": [{"day": 1, "meals": [
            {"type": "snack", "foods": ["Nuts, 100.5 cal"]},
            {"type": "snack", "foods": ["Nuts, 100.5 cal"]}
        ]}]}))
        .unwrap();
        // Each meal rounds to 101 before summing
        assert_eq!(plan.get("day1").unwrap().daily_totals.calories, 202);
    }

    #[test]
    fn test_daily_totals_key_order() {
        let day = json!({"totals": "n/a", "daily_totals": {"calories": 1800, "fats": 55, "fat": 70}});
        let totals = day_totals_from_plan(&day, &[]).unwrap();
        assert_eq!(totals.calories, 1800);
        assert_eq!(totals.fats, 55);

        let day = json!({"totals": {"calories": 1999.7, "protein": "120.9g", "carbs": 180.2, "fat": 64.5}});
        let totals = day_totals_from_plan(&day, &[]).unwrap();
        assert_eq!(totals.calories, 2000);
        assert_eq!(totals.protein, 120);
        assert_eq!(totals.carbs, 180);
        assert_eq!(totals.fats, 65);
        assert_eq!(day_totals_from_plan(&json!({"totals": null}), &[]), None);
    }

    #[test]
    fn test_canonical_plan_json_roundtrip_keeps_order() {
        let plan = normalize_plan(&json!({"meal_plan": [
            {"day": 10, "meals": []},
            {"day": 2, "meals": []}
        ]}))
        .unwrap();
        let text = serde_json::to_string(&plan).unwrap();
        assert!(text.find("day10").unwrap() < text.find("day2").unwrap());
        let back: CanonicalPlan = serde_json::from_str(&text).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn test_custom_defaults_are_used() {
        const DEFAULTS: MealTypeDefaults = MealTypeDefaults {
            version: "test",
            fallback_time: "11:00 AM",
            ..MealTypeDefaults::V1
        };
        let normalizer = PlanNormalizer::new(DEFAULTS);
        let plan = normalizer
            .normalize(&json!({"meal_plan": [{"day": 1, "meals": [{"type": "brunch"}]}]}))
            .unwrap();
        assert_eq!(plan.get("day1").unwrap().meals[0].time, "11:00 AM");
        assert_eq!(normalizer.defaults().version, "test");
    }

    fn arb_food() -> impl Strategy<Value = Value> {
        prop_oneof![
            (1u32..900, 0u32..60, 0u32..120, 0u32..40).prop_map(|(cal, p, c, f)| {
                json!(format!("1 serving food, {cal} cal, {p}g protein, {c}g carbs, {f}g fat"))
            }),
            (1u32..900, "[a-z]{3,10}").prop_map(|(cal, name)| json!({"item": name, "nutrients": {"calories": cal}})),
        ]
    }

    fn arb_days() -> impl Strategy<Value = Vec<Value>> {
        let meal = (
            prop::sample::select(vec!["breakfast", "lunch", "dinner", "snack", "morning snack"]),
            prop::collection::vec(arb_food(), 0..4),
        )
            .prop_map(|(meal_type, foods)| json!({"type": meal_type, "foods": foods}));
        prop::collection::vec(prop::collection::vec(meal, 0..4), 0..5).prop_map(|days| {
            days.into_iter()
                .enumerate()
                .map(|(i, meals)| json!({"day": i + 1, "meals": meals}))
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: the payload layout does not change the canonical plan
        #[test]
        fn prop_shapes_normalize_identically(days in arb_days()) {
            let nested = normalize_plan(&json!({"meal_plan": {"days": days.clone()}})).unwrap();
            let bare = normalize_plan(&json!({"meal_plan": days.clone()})).unwrap();
            let formatted = normalize_plan(&json!({"formatted_plan": {"days": days.clone()}})).unwrap();

            prop_assert_eq!(&nested, &bare);
            prop_assert_eq!(&nested, &formatted);
            prop_assert_eq!(nested.len(), days.len());
        }

        /// Property: one canonical meal per input meal, totals add up
        #[test]
        fn prop_meal_counts_and_sums(days in arb_days()) {
            let plan = normalize_plan(&json!({"meal_plan": days.clone()})).unwrap();
            for (day, (_, canonical)) in days.iter().zip(plan.iter()) {
                let meal_count = day["meals"].as_array().map(Vec::len).unwrap_or(0);
                prop_assert_eq!(canonical.meals.len(), meal_count);
                let calories: u32 = canonical.meals.iter().map(|m| m.calories).sum();
                prop_assert_eq!(canonical.daily_totals.calories, calories);
            }
        }
    }
}
