//! Slot extraction: recipe names, store ids and user ids from free text.
//!
//! Grammar:
//! - recipe: the lowercased text contains one of [`TRIGGER_WORDS`] (plain
//!   substring test), and then the first catalog name, in catalog order, that
//!   is a case-insensitive substring of the text.
//! - store id: `store_id` `:` optional whitespace, then a run of ASCII digits,
//!   matched on the lowercased text. First occurrence wins.
//! - user id: same shape with the token `user_id`.
//!
//! No match is a normal outcome and is reported as `None`.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::RecipeCatalog;
use crate::types::{LastAction, SessionContext};

/// Words that gate recipe extraction.
pub const TRIGGER_WORDS: &[&str] = &["add", "ingredients", "recipe for", "show ingredients"];

static STORE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"store_id:\s*(\d+)").expect("Invalid store_id regex"));

static USER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"user_id:\s*(\d+)").expect("Invalid user_id regex"));

/// Whether `text` contains a trigger word.
pub fn has_trigger_word(text: &str) -> bool {
    let lower = text.to_lowercase();
    TRIGGER_WORDS.iter().any(|w| lower.contains(w))
}

/// Recipe named in `text`, returned with catalog casing.
pub fn extract_recipe<'c>(text: &str, catalog: &'c RecipeCatalog) -> Option<&'c str> {
    if !has_trigger_word(text) {
        return None;
    }
    catalog.find_in(text)
}

/// Store id announced as `store_id: <digits>`.
pub fn extract_store_id(text: &str) -> Option<i64> {
    first_id(&STORE_ID_RE, text)
}

/// User id announced as `user_id: <digits>`.
pub fn extract_user_id(text: &str) -> Option<i64> {
    first_id(&USER_ID_RE, text)
}

fn first_id(re: &Regex, text: &str) -> Option<i64> {
    let lower = text.to_lowercase();
    let caps = re.captures(&lower)?;
    // Digit runs too large for i64 count as no match.
    caps.get(1)?.as_str().parse().ok()
}

/// Apply all slot extractors for one turn.
///
/// The recipe comes from the user's utterance; user and store ids come from
/// the assistant turn that ended the previous exchange. Returns the last
/// action recorded during this update, if any.
pub fn update_context(
    context: &mut SessionContext,
    utterance: &str,
    trailing_assistant: Option<&str>,
    catalog: &RecipeCatalog,
) -> Option<LastAction> {
    let mut action = None;

    if let Some(recipe) = extract_recipe(utterance, catalog) {
        tracing::debug!(recipe, "Updated current recipe");
        context.current_recipe = Some(recipe.to_string());
        action = Some(LastAction::SetRecipe);
    }

    if let Some(reply) = trailing_assistant {
        if let Some(user_id) = extract_user_id(reply) {
            tracing::debug!(user_id, "Updated current user id");
            context.current_user_id = Some(user_id);
            action = Some(LastAction::SetUser);
        }
        if let Some(store_id) = extract_store_id(reply) {
            tracing::debug!(store_id, "Updated current store id");
            context.current_store_id = Some(store_id);
            action = Some(LastAction::SetStore);
        }
    }

    if action.is_some() {
        context.last_action = action;
    }
    action
}
