//! The fixed list of recipes the assistant can talk about.

use freddo_core::config::DEFAULT_RECIPES;

/// Ordered recipe catalog.
///
/// Iteration order is significant: when several names match a piece of text,
/// the earliest one wins.
#[derive(Debug, Clone)]
pub struct RecipeCatalog {
    names: Vec<String>,
    lowered: Vec<String>,
}

impl RecipeCatalog {
    /// Build a catalog from names in matching order. Blank and duplicate
    /// (case-insensitive) names are skipped.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self {
            names: Vec::new(),
            lowered: Vec::new(),
        };
        for name in names {
            let name: String = name.into();
            let trimmed = name.trim();
            if trimmed.is_empty() {
                continue;
            }
            let lower = trimmed.to_lowercase();
            if catalog.lowered.contains(&lower) {
                continue;
            }
            catalog.names.push(trimmed.to_string());
            catalog.lowered.push(lower);
        }
        catalog
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Exact (case-sensitive) membership.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// First catalog name contained in `text`, ignoring case.
    pub fn find_in(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.lowered
            .iter()
            .position(|name| lower.contains(name.as_str()))
            .map(|idx| self.names[idx].as_str())
    }
}

impl Default for RecipeCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_RECIPES.iter().copied())
    }
}
