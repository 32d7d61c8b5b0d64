//! Meal assembly
//!
//! Every derived field walks an ordered list of resolvers and takes the
//! first answer. The last resolver of each list always answers.

use super::defaults::MealTypeDefaults;
use super::json::{array_field, capitalize_first, int_from_first, is_truthy, non_empty_str, to_count};
use super::nutrients::{NutrientExtractor, NutrientTotals};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Leading quantity in a food name, e.g. `"1 cup "` or `"1/2 "`
static NAME_QUANTITY_PREFIX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[\d/]+([\s\w]+)?\s+").ok());

/// Quantity and name of a food entry, e.g. `"2 slices"` + `"whole wheat toast"`
static ITEM_QUANTITY_SPLIT: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^([\d/]+\s*[a-zA-Z]+|[\d/]+)\s(.+)").ok());

/// One meal in canonical form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalMeal {
    #[serde(rename = "type")]
    pub meal_type: String,
    pub time: String,
    pub name: String,
    pub description: String,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub items: Vec<String>,
}

/// A raw meal object plus everything resolvers share about it
pub struct MealContext<'a> {
    pub raw: &'a Value,
    /// `type`, then `meal_type`, then the missing-type placeholder
    pub meal_type: &'a str,
    pub foods: &'a [Value],
    pub defaults: &'a MealTypeDefaults,
}

impl<'a> MealContext<'a> {
    pub fn new(raw: &'a Value, defaults: &'a MealTypeDefaults) -> Self {
        let meal_type = resolve_meal_type(raw).unwrap_or_else(|| {
            warn!(meal = %raw, "Meal missing type");
            defaults.missing_type
        });
        Self {
            raw,
            meal_type,
            foods: array_field(raw, "foods"),
            defaults,
        }
    }

    /// The resolved type with its first letter upper-cased
    pub fn display_type(&self) -> String {
        capitalize_first(self.meal_type)
    }

    /// Text of each food: strings as-is, objects by `item` then `description`
    pub fn food_texts(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.foods.iter().map(food_text)
    }
}

fn resolve_meal_type(raw: &Value) -> Option<&str> {
    non_empty_str(raw, "type").or_else(|| non_empty_str(raw, "meal_type"))
}

fn food_text(food: &Value) -> &str {
    match food {
        Value::String(text) => text,
        _ => non_empty_str(food, "item")
            .or_else(|| non_empty_str(food, "description"))
            .unwrap_or(""),
    }
}

// ============================================================================
// Name
// ============================================================================

type NameResolver = fn(&MealContext<'_>) -> Option<String>;

pub const NAME_RESOLVERS: [NameResolver; 3] = [name_from_protein, name_from_first_food, name_from_type];

/// First protein keyword, in keyword order, found in any food
pub fn name_from_protein(ctx: &MealContext<'_>) -> Option<String> {
    let texts: Vec<String> = ctx.food_texts().map(str::to_lowercase).collect();
    ctx.defaults
        .protein_keywords
        .iter()
        .find(|keyword| texts.iter().any(|text| text.contains(*keyword)))
        .map(|keyword| based_on(keyword, ctx))
}

/// The first food's name with any leading quantity removed
pub fn name_from_first_food(ctx: &MealContext<'_>) -> Option<String> {
    let first = ctx.food_texts().next()?;
    let name = leading_phrase(first);
    let name = match NAME_QUANTITY_PREFIX.as_ref() {
        Some(re) => re.replace(name, "").into_owned(),
        None => name.to_string(),
    };
    if name.is_empty() {
        return None;
    }
    Some(based_on(&name, ctx))
}

pub fn name_from_type(ctx: &MealContext<'_>) -> Option<String> {
    Some(
        ctx.defaults
            .default_name(ctx.meal_type)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} Meal", ctx.display_type())),
    )
}

fn based_on(ingredient: &str, ctx: &MealContext<'_>) -> String {
    format!("{}-Based {}", capitalize_first(ingredient), ctx.display_type())
}

/// Text before the first comma, trimmed
fn leading_phrase(text: &str) -> &str {
    text.split(',').next().unwrap_or(text).trim()
}

// ============================================================================
// Time
// ============================================================================

type TimeResolver = fn(&MealContext<'_>) -> Option<String>;

pub const TIME_RESOLVERS: [TimeResolver; 2] = [time_from_meal, time_from_type];

pub fn time_from_meal(ctx: &MealContext<'_>) -> Option<String> {
    non_empty_str(ctx.raw, "time").map(str::to_string)
}

pub fn time_from_type(ctx: &MealContext<'_>) -> Option<String> {
    Some(ctx.defaults.default_time(ctx.meal_type).to_string())
}

// ============================================================================
// Totals
// ============================================================================

type TotalsResolver = fn(&MealContext<'_>) -> Option<NutrientTotals>;

pub const TOTALS_RESOLVERS: [TotalsResolver; 2] = [totals_from_meal_macros, totals_from_foods];

/// Meal-level blocks consulted for explicit totals, in order
const MACRO_BLOCKS: [&str; 2] = ["macros", "nutrients"];

/// Keys tried for each nutrient inside a block, in order
const CALORIE_KEYS: &[&str] = &["calories"];
const PROTEIN_KEYS: &[&str] = &["protein"];
const CARB_KEYS: &[&str] = &["carbs"];
const FAT_KEYS: &[&str] = &["fat", "fats"];

/// Explicit `macros` or `nutrients` on the meal
///
/// Each field takes the first present value walking the blocks in order
/// and, within a block, the keys in order.
pub fn totals_from_meal_macros(ctx: &MealContext<'_>) -> Option<NutrientTotals> {
    let has_block = MACRO_BLOCKS
        .iter()
        .any(|block| ctx.raw.get(block).is_some_and(is_truthy));
    if !has_block {
        return None;
    }

    let field = |keys: &[&str]| {
        int_from_first(MACRO_BLOCKS.iter().flat_map(|block| {
            keys.iter()
                .map(move |key| ctx.raw.get(block).and_then(|b| b.get(key)))
        }))
    };

    Some(NutrientTotals {
        calories: field(CALORIE_KEYS),
        protein: field(PROTEIN_KEYS),
        carbs: field(CARB_KEYS),
        fat: field(FAT_KEYS),
    })
}

pub fn totals_from_foods(ctx: &MealContext<'_>) -> Option<NutrientTotals> {
    Some(NutrientExtractor::extract(ctx.foods))
}

// ============================================================================
// Items
// ============================================================================

/// Display label for one food entry
///
/// `"1 cup oatmeal, 150 cal"` becomes `"oatmeal, 1 cup"`.
pub fn item_label(food: &Value, defaults: &MealTypeDefaults) -> String {
    match food {
        Value::String(text) => {
            let name = leading_phrase(text);
            ITEM_QUANTITY_SPLIT
                .as_ref()
                .and_then(|re| re.captures(name))
                .and_then(|caps| Some(format!("{}, {}", caps.get(2)?.as_str(), caps.get(1)?.as_str())))
                .unwrap_or_else(|| name.to_string())
        }
        Value::Object(_) => non_empty_str(food, "item")
            .or_else(|| non_empty_str(food, "description"))
            .unwrap_or(defaults.unknown_food_item)
            .to_string(),
        _ => defaults.unknown_food_item.to_string(),
    }
}

// ============================================================================
// Assembly
// ============================================================================

fn first_answer<T>(resolvers: &[fn(&MealContext<'_>) -> Option<T>], ctx: &MealContext<'_>) -> Option<T> {
    resolvers.iter().find_map(|resolve| resolve(ctx))
}

/// Build the canonical meal from its context
pub fn assemble(ctx: &MealContext<'_>) -> CanonicalMeal {
    let totals = first_answer(&TOTALS_RESOLVERS, ctx).unwrap_or_default();
    CanonicalMeal {
        meal_type: ctx.display_type(),
        time: first_answer(&TIME_RESOLVERS, ctx).unwrap_or_else(|| ctx.defaults.fallback_time.to_string()),
        name: first_answer(&NAME_RESOLVERS, ctx).unwrap_or_else(|| format!("{} Meal", ctx.display_type())),
        description: ctx.defaults.description(ctx.meal_type).to_string(),
        calories: to_count(totals.calories),
        protein: to_count(totals.protein),
        carbs: to_count(totals.carbs),
        fat: to_count(totals.fat),
        items: ctx.foods.iter().map(|food| item_label(food, ctx.defaults)).collect(),
    }
}
