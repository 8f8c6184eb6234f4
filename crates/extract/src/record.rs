// ABOUTME: Recipe record emitted once per parsed recipe page, with the sentinel placeholders.
// ABOUTME: Serializes with the French feed keys used by the JSON exporter.

use serde::{Deserialize, Serialize};

/// Placeholder title when no selector or metadata yields one.
pub const TITLE_NOT_FOUND: &str = "Titre non trouvé";
/// Single-entry ingredient list emitted when nothing is found.
pub const INGREDIENTS_NOT_FOUND: &str = "Ingrédients non trouvés";
/// Single-entry step list emitted when nothing is found.
pub const STEPS_NOT_FOUND: &str = "Étapes non trouvées";
/// Placeholder for prep time, cook time and servings.
pub const NOT_SPECIFIED: &str = "Non spécifié";
/// Placeholder for difficulty (feminine agreement).
pub const DIFFICULTY_NOT_SPECIFIED: &str = "Non spécifiée";

/// A recipe extracted from one page.
///
/// Every field is best-effort: a field that could not be extracted holds its
/// sentinel value rather than being absent. Records are built by the
/// extractor and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipe {
    #[serde(rename = "titre")]
    title: String,
    ingredients: Vec<String>,
    #[serde(rename = "etapes_preparation")]
    steps: Vec<String>,
    #[serde(rename = "temps_preparation")]
    prep_time: String,
    #[serde(rename = "temps_cuisson")]
    cook_time: String,
    #[serde(rename = "difficulte")]
    difficulty: String,
    #[serde(rename = "nb_personnes")]
    servings: String,
    url: String,
    site_source: String,
}

/// Field values gathered by the extractor before the record is sealed.
///
/// `None` (or an empty list) means the field was not found and the sentinel
/// is substituted by [`Recipe::from_parts`].
#[derive(Debug, Clone, Default)]
pub struct RecipeParts {
    pub title: Option<String>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub difficulty: Option<String>,
    pub servings: Option<String>,
}

impl Recipe {
    /// Seal extracted parts into a record, substituting sentinels for gaps.
    pub fn from_parts(
        parts: RecipeParts,
        url: impl Into<String>,
        site_source: impl Into<String>,
    ) -> Self {
        fn or_sentinel(list: Vec<String>, sentinel: &str) -> Vec<String> {
            if list.is_empty() {
                vec![sentinel.to_string()]
            } else {
                list
            }
        }

        Self {
            title: parts.title.unwrap_or_else(|| TITLE_NOT_FOUND.to_string()),
            ingredients: or_sentinel(parts.ingredients, INGREDIENTS_NOT_FOUND),
            steps: or_sentinel(parts.steps, STEPS_NOT_FOUND),
            prep_time: parts.prep_time.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            cook_time: parts.cook_time.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            difficulty: parts
                .difficulty
                .unwrap_or_else(|| DIFFICULTY_NOT_SPECIFIED.to_string()),
            servings: parts.servings.unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            url: url.into(),
            site_source: site_source.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn prep_time(&self) -> &str {
        &self.prep_time
    }

    pub fn cook_time(&self) -> &str {
        &self.cook_time
    }

    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    pub fn servings(&self) -> &str {
        &self.servings
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn site_source(&self) -> &str {
        &self.site_source
    }

    /// Names of the fields that hold their sentinel value.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title == TITLE_NOT_FOUND {
            missing.push("titre");
        }
        if self.ingredients == [INGREDIENTS_NOT_FOUND] {
            missing.push("ingredients");
        }
        if self.steps == [STEPS_NOT_FOUND] {
            missing.push("etapes_preparation");
        }
        if self.prep_time == NOT_SPECIFIED {
            missing.push("temps_preparation");
        }
        if self.cook_time == NOT_SPECIFIED {
            missing.push("temps_cuisson");
        }
        if self.difficulty == DIFFICULTY_NOT_SPECIFIED {
            missing.push("difficulte");
        }
        if self.servings == NOT_SPECIFIED {
            missing.push("nb_personnes");
        }
        missing
    }

    /// Returns true if at least one field fell back to its sentinel.
    pub fn has_field_gaps(&self) -> bool {
        !self.missing_fields().is_empty()
    }
}
