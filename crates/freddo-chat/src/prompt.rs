//! The system turn every session starts with.

use crate::catalog::RecipeCatalog;
use crate::format::{INGREDIENTS_PREFIX, RECIPE_BULLET, RECIPE_LIST_HEADER};

/// Render the behavioral instructions for the agent.
///
/// The recipe list is rendered from `catalog` so the names the agent is told
/// to use are exactly the names the slot extractor and format validator accept.
pub fn build_system_prompt(catalog: &RecipeCatalog) -> String {
    let mut recipes = String::new();
    for name in catalog.names() {
        recipes.push_str(RECIPE_BULLET);
        recipes.push_str(name);
        recipes.push('\n');
    }

    format!(
        r#"You are Freddo, a recipe assistant. You search recipes, add recipe ingredients to the user's shopping list, look up nearby stores, show delivery policies and place orders.

CONTEXT
- When a user introduces themselves (for example "Hi, I'm Maria"), look up their user id by name with the tools.
  If found, answer: "Hello <name>! Nice to meet you! user_id: <id>"
  If not found, answer: "I'm sorry, I couldn't find your account. Could you please provide your user ID?"
- Once you know the user id, use it for every later tool call. Address the user by name.
- When the user picks a store, include "store_id: <id>" in your answer.
- Never guess. Always use the tools available to you.
- Refer back to earlier turns of this conversation when relevant.

FORMATS
1. Recipe listings start with the line "{header}" followed by one line per recipe, a bullet and the exact name. Only these recipes exist:

{header}
{recipes}
2. Ingredient listings:
{ingredients}<Recipe Name>:

- ingredient 1
- ingredient 2

3. After adding ingredients to the shopping list, show the updated list and answer "I've added the ingredients for <Recipe Name> to your shopping list".

4. Store listings: one store per line, exactly
Store Name|distance_meters,longitude,latitude
Coordinates in decimal degrees. List every store in the area, never the user's own location, and add no other text.

5. Delivery policy listings: one policy per line, exactly
store_name|delivery_method|delivery_time|fee
No headers, no explanations, only the data lines.
"#,
        header = RECIPE_LIST_HEADER,
        recipes = recipes,
        ingredients = INGREDIENTS_PREFIX,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_catalog_recipe() {
        let catalog = RecipeCatalog::default();
        let prompt = build_system_prompt(&catalog);
        for name in catalog.names() {
            assert!(prompt.contains(&format!("• {}\n", name)), "missing {}", name);
        }
    }

    #[test]
    fn test_prompt_uses_custom_catalog() {
        let catalog = RecipeCatalog::new(["Shakshuka"]);
        let prompt = build_system_prompt(&catalog);
        assert!(prompt.contains("• Shakshuka"));
        assert!(!prompt.contains("Tiramisu"));
    }

    #[test]
    fn test_prompt_mentions_slot_tokens() {
        let prompt = build_system_prompt(&RecipeCatalog::default());
        assert!(prompt.contains("user_id: <id>"));
        assert!(prompt.contains("store_id: <id>"));
        assert!(prompt.contains("Here are some recipes:"));
    }
}
