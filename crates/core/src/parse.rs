//! Provider response parsing and validation.
//!
//! The prompt contract (see [`crate::prompt`]) instructs the model to return
//! a bare JSON object, so parsing is limited to stripping stray code fences
//! and decoding. The original raw text is preserved on malformed output so
//! failures can be diagnosed from the job's error record.

use serde_json::Value;

use crate::recipe::{MealPlanPayload, Recipe};

/// Typed parse failure for provider output.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The response was not decodable JSON at all. The raw text is retained.
    #[error("malformed output: {detail}")]
    MalformedOutput { detail: String, raw: String },

    /// The response decoded but is not a valid/complete domain object.
    #[error("invalid recipe structure: {0}")]
    InvalidStructure(String),
}

/// Strip a single leading/trailing markdown code fence, if present.
///
/// Accepts both a ```json-tagged fence and an unlabeled one, with surrounding
/// whitespace. Text without fences is returned trimmed and otherwise
/// untouched.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the fence tag line ("json", "JSON", or empty).
    let body = match rest.split_once('\n') {
        Some((_tag, body)) => body,
        None => rest,
    };

    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a provider response into a [`Recipe`].
///
/// Presence of `name` and non-empty `ingredients`/`instructions` is checked
/// before the typed decode so incompleteness is reported as a structure
/// problem rather than a generic decode failure.
pub fn parse_recipe(raw: &str) -> Result<Recipe, ParseError> {
    let value = decode_object(raw)?;

    require_string(&value, "name")?;
    require_non_empty_array(&value, "ingredients")?;
    require_non_empty_array(&value, "instructions")?;

    serde_json::from_value(value).map_err(|e| ParseError::InvalidStructure(e.to_string()))
}

/// Parse a provider response into a [`MealPlanPayload`], applying the deeper
/// schema validation used by the batch path: full typed decode plus
/// per-recipe checks. Malformed nested fields fail the whole plan.
pub fn parse_meal_plan(raw: &str) -> Result<MealPlanPayload, ParseError> {
    let value = decode_object(raw)?;

    let payload: MealPlanPayload =
        serde_json::from_value(value).map_err(|e| ParseError::InvalidStructure(e.to_string()))?;

    if payload.day_plans.is_empty() {
        return Err(ParseError::InvalidStructure(
            "meal plan has no day plans".into(),
        ));
    }

    for day in &payload.day_plans {
        if day.meals.is_empty() {
            return Err(ParseError::InvalidStructure(format!(
                "day {} has no meals",
                day.day
            )));
        }
        for meal in &day.meals {
            validate_recipe(&meal.recipe).map_err(|e| {
                ParseError::InvalidStructure(format!(
                    "day {} {}: {e}",
                    day.day, meal.meal_type
                ))
            })?;
        }
    }

    Ok(payload)
}

/// Validate a decoded recipe's structural invariants: non-empty ingredient
/// and instruction lists, and instruction step numbers contiguous from 1.
pub fn validate_recipe(recipe: &Recipe) -> Result<(), String> {
    if recipe.name.trim().is_empty() {
        return Err("recipe name is empty".into());
    }
    if recipe.ingredients.is_empty() {
        return Err(format!("recipe '{}' has no ingredients", recipe.name));
    }
    if recipe.instructions.is_empty() {
        return Err(format!("recipe '{}' has no instructions", recipe.name));
    }
    for (index, instruction) in recipe.instructions.iter().enumerate() {
        let expected = index as u32 + 1;
        if instruction.step != expected {
            return Err(format!(
                "recipe '{}' instruction steps are not contiguous: expected {expected}, got {}",
                recipe.name, instruction.step
            ));
        }
    }
    Ok(())
}

fn decode_object(raw: &str) -> Result<Value, ParseError> {
    let stripped = strip_code_fences(raw);
    serde_json::from_str(stripped).map_err(|e| ParseError::MalformedOutput {
        detail: e.to_string(),
        raw: raw.to_string(),
    })
}

fn require_string(value: &Value, field: &str) -> Result<(), ParseError> {
    match value.get(field).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(ParseError::InvalidStructure(format!(
            "missing or empty field: {field}"
        ))),
    }
}

fn require_non_empty_array(value: &Value, field: &str) -> Result<(), ParseError> {
    match value.get(field).and_then(Value::as_array) {
        Some(items) if !items.is_empty() => Ok(()),
        _ => Err(ParseError::InvalidStructure(format!(
            "missing or empty field: {field}"
        ))),
    }
}
