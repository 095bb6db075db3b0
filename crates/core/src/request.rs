//! Generation request DTOs, ingestion defaults, and range validation.
//!
//! Defaults for optional fields are applied exactly once, at deserialization,
//! so downstream code (prompt construction, the worker) never re-defaults.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Request limits
// ---------------------------------------------------------------------------

/// Minimum / maximum number of days in a meal plan.
pub const MIN_PLAN_DAYS: u32 = 1;
pub const MAX_PLAN_DAYS: u32 = 14;

/// Minimum / maximum meals per day in a meal plan.
pub const MIN_MEALS_PER_DAY: u32 = 2;
pub const MAX_MEALS_PER_DAY: u32 = 5;

/// Minimum / maximum people a meal plan is sized for.
pub const MIN_PEOPLE: u32 = 1;
pub const MAX_PEOPLE: u32 = 10;

/// Minimum / maximum daily calorie target.
pub const MIN_TARGET_CALORIES: u32 = 500;
pub const MAX_TARGET_CALORIES: u32 = 5000;

/// Default cooking-time ceiling for a single recipe, in minutes.
pub const DEFAULT_MAX_COOKING_TIME_MINUTES: u32 = 30;
/// Default serving count for a single recipe.
pub const DEFAULT_SERVINGS: u32 = 2;
/// Default meal type for a single recipe.
pub const DEFAULT_MEAL_TYPE: &str = "dinner";

// ---------------------------------------------------------------------------
// Macro targets
// ---------------------------------------------------------------------------

/// Per-day or per-recipe macro targets. Each field is independently optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MacroTargets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fats_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
}

impl MacroTargets {
    /// True when no target field is set.
    pub fn is_empty(&self) -> bool {
        self.protein_g.is_none()
            && self.carbs_g.is_none()
            && self.fats_g.is_none()
            && self.calories.is_none()
    }
}

// ---------------------------------------------------------------------------
// Single-recipe request
// ---------------------------------------------------------------------------

/// A request for one AI-generated recipe. Immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Available ingredient names, in user order. Must be non-empty.
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    /// Allergy tags. These must never appear in the generated output.
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macro_targets: Option<MacroTargets>,
    #[serde(default)]
    pub cuisine_preferences: Vec<String>,
    #[serde(default = "default_max_cooking_time")]
    pub max_cooking_time_minutes: u32,
    #[serde(default = "default_servings")]
    pub servings: u32,
    #[serde(default = "default_meal_type")]
    pub meal_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_request: Option<String>,
}

fn default_max_cooking_time() -> u32 {
    DEFAULT_MAX_COOKING_TIME_MINUTES
}

fn default_servings() -> u32 {
    DEFAULT_SERVINGS
}

fn default_meal_type() -> String {
    DEFAULT_MEAL_TYPE.to_string()
}

impl GenerationRequest {
    /// Validate request fields. Returns `CoreError::Validation` on the first
    /// violated rule.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.ingredients.is_empty() {
            return Err(CoreError::Validation(
                "at least one ingredient is required".into(),
            ));
        }
        if self.ingredients.iter().any(|i| i.trim().is_empty()) {
            return Err(CoreError::Validation(
                "ingredient names must not be blank".into(),
            ));
        }
        if self.max_cooking_time_minutes == 0 {
            return Err(CoreError::Validation(
                "max_cooking_time_minutes must be positive".into(),
            ));
        }
        if self.servings == 0 {
            return Err(CoreError::Validation("servings must be positive".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Meal-plan request
// ---------------------------------------------------------------------------

/// A request for a multi-day meal plan, processed asynchronously as a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanRequest {
    pub days: u32,
    pub meals_per_day: u32,
    pub people: u32,
    pub target_calories: u32,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macro_goals: Option<MacroTargets>,
}

impl MealPlanRequest {
    /// Validate all field ranges. Returns `CoreError::Validation` on the
    /// first violated rule.
    pub fn validate(&self) -> Result<(), CoreError> {
        range_check("days", self.days, MIN_PLAN_DAYS, MAX_PLAN_DAYS)?;
        range_check(
            "meals_per_day",
            self.meals_per_day,
            MIN_MEALS_PER_DAY,
            MAX_MEALS_PER_DAY,
        )?;
        range_check("people", self.people, MIN_PEOPLE, MAX_PEOPLE)?;
        range_check(
            "target_calories",
            self.target_calories,
            MIN_TARGET_CALORIES,
            MAX_TARGET_CALORIES,
        )?;
        Ok(())
    }
}

fn range_check(field: &str, value: u32, min: u32, max: u32) -> Result<(), CoreError> {
    if value < min || value > max {
        return Err(CoreError::Validation(format!(
            "{field} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}
