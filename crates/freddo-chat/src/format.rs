//! Response format validation.
//!
//! The system prompt asks the agent for strict listing formats so that the
//! frontend can render recipes, ingredients, stores and delivery policies.
//! This module recognises which listing a reply is meant to be and checks it.
//! A violation is reported as a [`FormatMismatch`], which callers log and
//! otherwise ignore: the reply is still delivered.

use std::fmt;

use serde::Serialize;

use crate::catalog::RecipeCatalog;

/// Header line of a recipe listing.
pub const RECIPE_LIST_HEADER: &str = "Here are some recipes:";
/// Prefix of every recipe line.
pub const RECIPE_BULLET: &str = "• ";
/// Prefix of the ingredient listing header.
pub const INGREDIENTS_PREFIX: &str = "Ingredients for ";
/// Prefix of every ingredient line.
pub const INGREDIENT_BULLET: &str = "- ";

/// Listing formats an agent reply can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// `Here are some recipes:` followed by `• <catalog name>` lines.
    RecipeList,
    /// `Ingredients for <recipe>:` followed by `- <item>` lines.
    Ingredients,
    /// `name|distance_meters,longitude,latitude` per line.
    StoreList,
    /// `store_name|delivery_method|delivery_time|fee` per line.
    DeliveryPolicies,
    /// Conversational text with no format contract.
    FreeText,
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseFormat::RecipeList => "recipe list",
            ResponseFormat::Ingredients => "ingredient list",
            ResponseFormat::StoreList => "store list",
            ResponseFormat::DeliveryPolicies => "delivery policy list",
            ResponseFormat::FreeText => "free text",
        };
        f.write_str(name)
    }
}

/// A reply that looks like a listing but breaks its format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{expected} line {line}: {reason}")]
pub struct FormatMismatch {
    pub expected: ResponseFormat,
    /// 1-based line number within the reply.
    pub line: usize,
    pub reason: String,
}

impl FormatMismatch {
    fn new(expected: ResponseFormat, line: usize, reason: impl Into<String>) -> Self {
        Self {
            expected,
            line,
            reason: reason.into(),
        }
    }
}

/// Guess which listing `text` is meant to be.
pub fn classify(text: &str) -> ResponseFormat {
    let trimmed = text.trim();
    if trimmed.contains(RECIPE_LIST_HEADER) {
        return ResponseFormat::RecipeList;
    }
    if trimmed.starts_with(INGREDIENTS_PREFIX) {
        return ResponseFormat::Ingredients;
    }

    let lines: Vec<&str> = non_empty_lines(trimmed).map(|(_, l)| l).collect();
    if lines.is_empty() || !lines.iter().all(|l| l.contains('|')) {
        return ResponseFormat::FreeText;
    }
    // The first line decides; later lines are checked by the validator.
    if is_delivery_record(lines[0]) {
        ResponseFormat::DeliveryPolicies
    } else if is_store_record(lines[0]) {
        ResponseFormat::StoreList
    } else {
        ResponseFormat::FreeText
    }
}

/// `a|b|c|d`: exactly four fields.
fn is_delivery_record(line: &str) -> bool {
    line.matches('|').count() == 3
}

/// `name|x,y,z`: one separator and a comma triplet after it.
fn is_store_record(line: &str) -> bool {
    match line.split_once('|') {
        Some((_, rest)) => !rest.contains('|') && rest.matches(',').count() == 2,
        None => false,
    }
}

/// Classify `text` and check it against its format.
pub fn validate(text: &str, catalog: &RecipeCatalog) -> Result<ResponseFormat, FormatMismatch> {
    let format = classify(text);
    match format {
        ResponseFormat::RecipeList => validate_recipe_list(text, catalog)?,
        ResponseFormat::Ingredients => validate_ingredients(text)?,
        ResponseFormat::StoreList => validate_store_list(text)?,
        ResponseFormat::DeliveryPolicies => validate_delivery_policies(text)?,
        ResponseFormat::FreeText => {}
    }
    Ok(format)
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
}

fn validate_recipe_list(text: &str, catalog: &RecipeCatalog) -> Result<(), FormatMismatch> {
    let fmt = ResponseFormat::RecipeList;
    let mut lines = non_empty_lines(text);

    match lines.next() {
        Some((_, RECIPE_LIST_HEADER)) => {}
        Some((n, _)) => {
            return Err(FormatMismatch::new(
                fmt,
                n,
                format!("expected header {:?}", RECIPE_LIST_HEADER),
            ))
        }
        None => return Err(FormatMismatch::new(fmt, 1, "empty reply")),
    }

    let mut count = 0;
    for (n, line) in lines {
        let name = line
            .strip_prefix(RECIPE_BULLET)
            .or_else(|| line.strip_prefix('•'))
            .map(str::trim)
            .ok_or_else(|| FormatMismatch::new(fmt, n, "recipe line must start with a bullet"))?;
        if !catalog.contains(name) {
            return Err(FormatMismatch::new(
                fmt,
                n,
                format!("unknown recipe {:?}", name),
            ));
        }
        count += 1;
    }

    if count == 0 {
        return Err(FormatMismatch::new(fmt, 1, "no recipes listed"));
    }
    Ok(())
}

fn validate_ingredients(text: &str) -> Result<(), FormatMismatch> {
    let fmt = ResponseFormat::Ingredients;
    let mut lines = non_empty_lines(text);

    let (n, header) = lines
        .next()
        .ok_or_else(|| FormatMismatch::new(fmt, 1, "empty reply"))?;
    let recipe = header
        .strip_prefix(INGREDIENTS_PREFIX)
        .and_then(|rest| rest.strip_suffix(':'))
        .map(str::trim)
        .unwrap_or("");
    if recipe.is_empty() {
        return Err(FormatMismatch::new(
            fmt,
            n,
            "header must be \"Ingredients for <recipe>:\"",
        ));
    }

    let mut count = 0;
    for (n, line) in lines {
        let item = line
            .strip_prefix(INGREDIENT_BULLET)
            .map(str::trim)
            .unwrap_or("");
        if item.is_empty() {
            return Err(FormatMismatch::new(
                fmt,
                n,
                "ingredient line must be \"- <item>\"",
            ));
        }
        count += 1;
    }

    if count == 0 {
        return Err(FormatMismatch::new(fmt, n, "no ingredients listed"));
    }
    Ok(())
}

fn validate_store_list(text: &str) -> Result<(), FormatMismatch> {
    let fmt = ResponseFormat::StoreList;
    for (n, line) in non_empty_lines(text) {
        let (name, coords) = line
            .split_once('|')
            .ok_or_else(|| FormatMismatch::new(fmt, n, "missing '|' separator"))?;
        if name.trim().is_empty() {
            return Err(FormatMismatch::new(fmt, n, "empty store name"));
        }
        let fields: Vec<&str> = coords.split(',').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(FormatMismatch::new(
                fmt,
                n,
                "expected distance_meters,longitude,latitude",
            ));
        }
        if fields.iter().any(|f| f.parse::<f64>().is_err()) {
            return Err(FormatMismatch::new(fmt, n, "non-numeric distance or coordinate"));
        }
    }
    Ok(())
}

fn validate_delivery_policies(text: &str) -> Result<(), FormatMismatch> {
    let fmt = ResponseFormat::DeliveryPolicies;
    for (n, line) in non_empty_lines(text) {
        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        if fields.len() != 4 {
            return Err(FormatMismatch::new(
                fmt,
                n,
                format!("expected 4 fields, found {}", fields.len()),
            ));
        }
        if fields.iter().any(|f| f.is_empty()) {
            return Err(FormatMismatch::new(fmt, n, "empty field"));
        }
    }
    Ok(())
}
