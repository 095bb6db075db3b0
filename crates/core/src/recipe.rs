//! Recipe and meal-plan domain objects.
//!
//! These are the shapes the generation provider is contracted to return
//! (see [`crate::prompt`]) and the shapes persisted as job results. Field
//! names are part of the provider output contract; renaming one changes
//! the prompt format block in lockstep.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Timestamp;

/// Recipe difficulty rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One ingredient line of a recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientLine {
    pub name: String,
    pub amount: String,
    pub unit: String,
}

/// One numbered instruction step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionStep {
    /// 1-based step number; contiguous within a recipe.
    pub step: u32,
    pub text: String,
    /// Optional per-step time in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// Per-serving nutrition estimate. Only fiber is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fats_g: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber_g: Option<f64>,
}

/// A single generated recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub description: String,
    pub cooking_time_minutes: u32,
    pub servings: u32,
    pub difficulty: Difficulty,
    pub cuisine: String,
    pub meal_type: String,
    pub ingredients: Vec<IngredientLine>,
    pub instructions: Vec<InstructionStep>,
    pub nutrition: Nutrition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// One meal slot within a day plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedMeal {
    pub meal_type: String,
    pub recipe: Recipe,
}

/// All meals for one day of the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    /// 1-based day index.
    pub day: u32,
    pub meals: Vec<PlannedMeal>,
}

/// One aggregated shopping list entry. All fields are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub name: String,
    pub quantity: String,
    pub category: String,
    pub estimated_cost: f64,
}

/// The meal-plan shape the provider is contracted to return.
///
/// Identifier, request echoes, and timestamps are assigned server-side when
/// the payload is promoted to a [`MealPlanResult`]; the model never invents
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanPayload {
    pub name: String,
    pub total_estimated_cost: f64,
    pub day_plans: Vec<DayPlan>,
    pub shopping_list: Vec<ShoppingItem>,
}

/// A complete generated meal plan, the result payload of a meal-plan job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanResult {
    pub id: Uuid,
    pub name: String,
    /// Echoed from the originating request.
    pub days: u32,
    pub meals_per_day: u32,
    pub people: u32,
    pub total_estimated_cost: f64,
    pub day_plans: Vec<DayPlan>,
    pub shopping_list: Vec<ShoppingItem>,
    pub created_at: Timestamp,
}

impl MealPlanResult {
    /// Promote a validated provider payload to a full result, echoing the
    /// request dimensions and stamping identity and creation time.
    pub fn from_payload(
        payload: MealPlanPayload,
        days: u32,
        meals_per_day: u32,
        people: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: payload.name,
            days,
            meals_per_day,
            people,
            total_estimated_cost: payload.total_estimated_cost,
            day_plans: payload.day_plans,
            shopping_list: payload.shopping_list,
            created_at: chrono::Utc::now(),
        }
    }
}
