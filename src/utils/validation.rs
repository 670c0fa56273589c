// Validation utilities
use crate::error::{Error, Result};

/// Validate the ingredient list of a recommendation request.
/// Entries are echoed back verbatim, so nothing is normalized here; the
/// request body limit bounds the list size.
pub fn validate_ingredients(ingredients: &[String]) -> Result<()> {
    if ingredients.is_empty() {
        return Err(Error::Validation(
            "ingredients must contain at least one item".to_string(),
        ));
    }

    Ok(())
}
