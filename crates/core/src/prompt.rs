//! Prompt construction for the generation provider.
//!
//! Both builders are total, deterministic functions of their request. Each
//! prompt ends with an explicit output-format contract, a fenced JSON
//! example whose shape matches the domain object exactly, so response
//! parsing only has to strip formatting, never extract from free text.

use std::fmt::Write;

use crate::request::{GenerationRequest, MacroTargets, MealPlanRequest};

/// JSON example embedded in every single-recipe prompt. Must stay in lockstep
/// with [`crate::recipe::Recipe`].
const RECIPE_FORMAT: &str = r#"{
  "name": "Recipe Name",
  "description": "One-sentence description",
  "cooking_time_minutes": 30,
  "servings": 2,
  "difficulty": "easy",
  "cuisine": "italian",
  "meal_type": "dinner",
  "ingredients": [
    { "name": "ingredient", "amount": "200", "unit": "g" }
  ],
  "instructions": [
    { "step": 1, "text": "Do the thing", "duration_minutes": 5 }
  ],
  "nutrition": {
    "calories": 450,
    "protein_g": 30,
    "carbs_g": 40,
    "fats_g": 15,
    "fiber_g": 6
  },
  "tips": ["Optional tip"],
  "tags": ["optional-tag"]
}"#;

/// JSON example embedded in every meal-plan prompt. Must stay in lockstep
/// with [`crate::recipe::MealPlanPayload`].
const MEAL_PLAN_FORMAT: &str = r#"{
  "name": "Plan Name",
  "total_estimated_cost": 85.50,
  "day_plans": [
    {
      "day": 1,
      "meals": [
        { "meal_type": "breakfast", "recipe": { ...recipe object as below... } }
      ]
    }
  ],
  "shopping_list": [
    { "name": "item", "quantity": "2 kg", "category": "produce", "estimated_cost": 4.20 }
  ]
}"#;

/// Build the prompt for a single-recipe generation request.
pub fn build_recipe_prompt(request: &GenerationRequest) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str("You are a professional chef. Create a recipe using the available ingredients below.\n\n");

    prompt.push_str("Available ingredients:\n");
    for ingredient in &request.ingredients {
        let _ = writeln!(prompt, "- {ingredient}");
    }

    let _ = writeln!(prompt, "\nMeal type: {}", request.meal_type);
    let _ = writeln!(prompt, "Servings: {}", request.servings);
    let _ = writeln!(
        prompt,
        "Maximum cooking time: {} minutes",
        request.max_cooking_time_minutes
    );

    if !request.dietary_restrictions.is_empty() {
        let _ = writeln!(
            prompt,
            "Dietary restrictions: {}",
            request.dietary_restrictions.join(", ")
        );
    }

    if !request.allergies.is_empty() {
        let _ = writeln!(
            prompt,
            "Allergies (MUST AVOID): {}",
            request.allergies.join(", ")
        );
    }

    if let Some(targets) = &request.macro_targets {
        push_macro_block(&mut prompt, "Macro targets per serving:", targets);
    }

    if !request.cuisine_preferences.is_empty() {
        let _ = writeln!(
            prompt,
            "Cuisine preferences: {}",
            request.cuisine_preferences.join(", ")
        );
    }

    if let Some(special) = &request.special_request {
        let _ = writeln!(prompt, "\nSpecial request: {special}");
    }

    push_format_contract(&mut prompt, RECIPE_FORMAT);
    prompt
}

/// Build the prompt for a multi-day meal-plan request.
pub fn build_meal_plan_prompt(request: &MealPlanRequest) -> String {
    let mut prompt = String::with_capacity(1024);

    let _ = writeln!(
        prompt,
        "You are a professional meal planner. Create a {}-day meal plan with {} meals per day for {} people.",
        request.days, request.meals_per_day, request.people
    );
    let _ = writeln!(
        prompt,
        "Target calories per person per day: {}",
        request.target_calories
    );

    if !request.dietary_restrictions.is_empty() {
        let _ = writeln!(
            prompt,
            "Dietary restrictions: {}",
            request.dietary_restrictions.join(", ")
        );
    }

    if !request.allergies.is_empty() {
        let _ = writeln!(
            prompt,
            "Allergies (MUST AVOID): {}",
            request.allergies.join(", ")
        );
    }

    if let Some(goals) = &request.macro_goals {
        push_macro_block(&mut prompt, "Daily macro goals per person:", goals);
    }

    let _ = writeln!(
        prompt,
        "\nInclude a consolidated shopping list with quantities, categories, and estimated costs."
    );

    push_format_contract(&mut prompt, MEAL_PLAN_FORMAT);
    prompt
}

/// Emit one line per present macro field, preceded by a header. Emits
/// nothing when every field is absent.
fn push_macro_block(prompt: &mut String, header: &str, targets: &MacroTargets) {
    if targets.is_empty() {
        return;
    }
    let _ = writeln!(prompt, "{header}");
    if let Some(protein) = targets.protein_g {
        let _ = writeln!(prompt, "- Protein: {protein}g");
    }
    if let Some(carbs) = targets.carbs_g {
        let _ = writeln!(prompt, "- Carbs: {carbs}g");
    }
    if let Some(fats) = targets.fats_g {
        let _ = writeln!(prompt, "- Fats: {fats}g");
    }
    if let Some(calories) = targets.calories {
        let _ = writeln!(prompt, "- Calories: {calories}");
    }
}

fn push_format_contract(prompt: &mut String, format: &str) {
    let _ = write!(
        prompt,
        "\nRespond with ONLY a JSON object in exactly this format, with no prose and no markdown fences:\n```json\n{format}\n```\n"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::GenerationRequest;

    fn base_request() -> GenerationRequest {
        serde_json::from_str(r#"{"ingredients": ["chicken breast", "basmati rice", "broccoli"]}"#)
            .unwrap()
    }

    #[test]
    fn every_ingredient_appears_as_a_bullet() {
        let request = base_request();
        let prompt = build_recipe_prompt(&request);
        for ingredient in &request.ingredients {
            assert!(
                prompt.contains(&format!("- {ingredient}\n")),
                "missing bullet for {ingredient}"
            );
        }
    }

    #[test]
    fn defaults_are_always_stated() {
        let prompt = build_recipe_prompt(&base_request());
        assert!(prompt.contains("Meal type: dinner"));
        assert!(prompt.contains("Servings: 2"));
        assert!(prompt.contains("Maximum cooking time: 30 minutes"));
    }

    #[test]
    fn conditional_sections_are_omitted_when_empty() {
        let prompt = build_recipe_prompt(&base_request());
        assert!(!prompt.contains("Dietary restrictions:"));
        assert!(!prompt.contains("MUST AVOID"));
        assert!(!prompt.contains("Macro targets"));
        assert!(!prompt.contains("Cuisine preferences:"));
        assert!(!prompt.contains("Special request:"));
    }

    #[test]
    fn allergies_appear_only_on_the_must_avoid_line() {
        let mut request = base_request();
        request.allergies = vec!["peanuts".into(), "shellfish".into()];
        let prompt = build_recipe_prompt(&request);

        assert!(prompt.contains("Allergies (MUST AVOID): peanuts, shellfish"));
        for line in prompt.lines() {
            if line.contains("peanuts") || line.contains("shellfish") {
                assert!(line.contains("MUST AVOID"), "allergy leaked into: {line}");
            }
        }
    }

    #[test]
    fn macro_block_has_one_line_per_present_field() {
        let mut request = base_request();
        request.macro_targets = serde_json::from_str(r#"{"protein_g": 40, "calories": 600}"#).ok();
        let prompt = build_recipe_prompt(&request);

        assert!(prompt.contains("- Protein: 40g"));
        assert!(prompt.contains("- Calories: 600"));
        assert!(!prompt.contains("- Carbs:"));
        assert!(!prompt.contains("- Fats:"));
    }

    #[test]
    fn special_request_is_appended_verbatim() {
        let mut request = base_request();
        request.special_request = Some("make it kid-friendly & not too spicy".into());
        let prompt = build_recipe_prompt(&request);
        assert!(prompt.contains("Special request: make it kid-friendly & not too spicy"));
    }

    #[test]
    fn prompt_ends_with_the_format_contract() {
        let prompt = build_recipe_prompt(&base_request());
        assert!(prompt.contains("ONLY a JSON object"));
        assert!(prompt.trim_end().ends_with("```"));
        // The example must carry the required recipe fields.
        for field in ["\"name\"", "\"ingredients\"", "\"instructions\"", "\"nutrition\""] {
            assert!(prompt.contains(field));
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        let request = base_request();
        assert_eq!(build_recipe_prompt(&request), build_recipe_prompt(&request));
    }

    #[test]
    fn meal_plan_prompt_states_dimensions_and_contract() {
        let request: MealPlanRequest = serde_json::from_str(
            r#"{"days": 3, "meals_per_day": 3, "people": 2, "target_calories": 2000}"#,
        )
        .unwrap();
        let prompt = build_meal_plan_prompt(&request);
        assert!(prompt.contains("3-day meal plan with 3 meals per day for 2 people"));
        assert!(prompt.contains("Target calories per person per day: 2000"));
        assert!(prompt.contains("shopping_list"));
        assert!(prompt.contains("ONLY a JSON object"));
    }
}
