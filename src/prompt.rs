//! Grounded prompt assembly.

use crate::store::RecipeRecord;
use std::fmt::Write;

pub const UNKNOWN_RECIPE: &str = "Unknown Recipe";
pub const NOT_AVAILABLE: &str = "N/A";

const NAME_KEY: &str = "RecipeName";
const TIME_KEY: &str = "TotalTimeInMins";
const SERVINGS_KEY: &str = "Servings";

/// Render the retrieved recipes as numbered option sections, in retrieval order
pub fn format_context(records: &[RecipeRecord]) -> String {
    let mut context = String::new();

    for (i, record) in records.iter().enumerate() {
        let name = record
            .metadata_text(NAME_KEY)
            .unwrap_or_else(|| UNKNOWN_RECIPE.to_string());
        let time = record
            .metadata_text(TIME_KEY)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let servings = record
            .metadata_text(SERVINGS_KEY)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        // Writing into a String cannot fail
        let _ = write!(
            context,
            "\n--- OPTION {}: {} ---\nCooking Time: {} mins | Servings: {}\nInstructions: {}\n",
            i + 1,
            name,
            time,
            servings,
            record.document
        );
    }

    context
}

/// Build the generation prompt from the cook's ingredients, the retrieved
/// recipes and the free-text constraints.
pub fn build_prompt(ingredients: &[String], records: &[RecipeRecord], constraints: &str) -> String {
    format!(
        "You are a friendly, expert kitchen assistant. A home cook has: {ingredients}.\n\
         IMPORTANT DIETARY/EQUIPMENT CONSTRAINTS: {constraints}\n\n\
         Based on their ingredients AND the constraints above, suggest the 3 best matches from the provided database. \
         If a recipe uses an ingredient they are allergic to or requires equipment they don't have, \
         you MUST modify the steps to accommodate them or explain why a certain substitution was made.\n\n\
         Don't mention 'searching a database'—just offer your best culinary advice based on these recipes:\n\
         {context}",
        ingredients = ingredients.join(", "),
        constraints = constraints,
        context = format_context(records),
    )
}
