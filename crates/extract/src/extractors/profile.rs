// ABOUTME: Site profile data model: per-field selector lists, fallback patterns and listing rules.
// ABOUTME: Profiles deserialize from JSON and are looked up by domain through ProfileRegistry.

//! Site profiles for recipe extraction.
//!
//! A profile holds every site-specific rule the extractor needs: the ordered
//! selector list for each field, the regex fallbacks, the length thresholds
//! and the listing-page link rules. Profiles are plain data so new sites can
//! be described in JSON without touching the extraction code.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ExtractError;
use crate::extractors::compiled::precompile;

/// Ordered selectors for a single-valued text field.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TextRules {
    #[serde(default)]
    pub selectors: Vec<String>,
}

/// How a regex fallback match is turned into a field value.
///
/// The first capture group holds the number; `Duration` also reads the
/// unit from the second group.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchFormat {
    /// Use the first capture group as-is.
    #[default]
    Whole,
    /// Render `<n> min` or `<n> h` depending on the captured unit.
    Duration,
    /// Append a fixed suffix to the captured number.
    Suffix { value: String },
}

/// Selectors plus one regex fallback for a single-valued field.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PatternRules {
    #[serde(default)]
    pub selectors: Vec<String>,
    /// Pattern applied to the visible page text when no selector matches.
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub format: MatchFormat,
}

/// Rules for the ingredient list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientRules {
    #[serde(default)]
    pub selectors: Vec<String>,
    /// Entries shorter than this many characters are dropped.
    #[serde(default = "default_ingredient_min_chars")]
    pub min_chars: usize,
    /// Patterns scanned over the body text, in order.
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default = "default_max_matches_per_pattern")]
    pub max_matches_per_pattern: usize,
}

/// Rules for the preparation steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRules {
    #[serde(default)]
    pub selectors: Vec<String>,
    /// Minimum length of a step taken from a selector match.
    #[serde(default = "default_step_min_chars")]
    pub min_chars: usize,
    /// Minimum length of a step taken from JSON-LD instructions.
    #[serde(default = "default_structured_min_chars")]
    pub structured_min_chars: usize,
    /// Free-text blocks split into sentences as a last resort.
    #[serde(default)]
    pub block_selectors: Vec<String>,
    #[serde(default = "default_sentence_pattern")]
    pub sentence_pattern: String,
    #[serde(default = "default_min_sentence_chars")]
    pub min_sentence_chars: usize,
}

/// Rules for discovering recipe links on a listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRules {
    pub link_selector: String,
    /// Substrings every kept link must contain.
    #[serde(default)]
    pub link_markers: Vec<String>,
    #[serde(default = "default_max_links_per_page")]
    pub max_links_per_page: usize,
    #[serde(default)]
    pub next_page_selector: Option<String>,
}

/// A complete extraction profile for one site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Primary domain this profile applies to
    pub domain: String,
    #[serde(default)]
    pub supported_domains: Vec<String>,
    /// Value written to each record's `site_source`
    pub site_source: String,
    /// Listing pages a crawl starts from
    #[serde(default)]
    pub start_urls: Vec<String>,
    pub listing: ListingRules,
    #[serde(default)]
    pub title: TextRules,
    pub ingredients: IngredientRules,
    pub steps: StepRules,
    #[serde(default)]
    pub prep_time: PatternRules,
    #[serde(default)]
    pub cook_time: PatternRules,
    #[serde(default)]
    pub difficulty: TextRules,
    #[serde(default)]
    pub servings: PatternRules,
}

fn default_ingredient_min_chars() -> usize {
    3
}

fn default_max_matches_per_pattern() -> usize {
    5
}

fn default_step_min_chars() -> usize {
    21
}

fn default_structured_min_chars() -> usize {
    11
}

fn default_sentence_pattern() -> String {
    r"\p{Lu}[^.!?]*[.!?]".to_string()
}

fn default_min_sentence_chars() -> usize {
    31
}

fn default_max_links_per_page() -> usize {
    15
}

impl SiteProfile {
    /// Parses a profile from JSON and checks that every rule compiles.
    pub fn from_json(json: &str) -> Result<Self, ExtractError> {
        let profile: SiteProfile = serde_json::from_str(json).map_err(ExtractError::profile)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Compiles all selectors and patterns, failing on the first bad batch.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.domain.trim().is_empty() {
            return Err(ExtractError::profile("domain must not be empty"));
        }
        let invalid = precompile(self.selector_sources(), self.pattern_sources());
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(ExtractError::profile(format!(
                "{}: {}",
                self.domain,
                invalid.join(", ")
            )))
        }
    }

    /// Every CSS selector string the profile references.
    pub fn selector_sources(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        out.push(&self.listing.link_selector);
        out.extend(self.listing.next_page_selector.as_deref());
        for list in [
            &self.title.selectors,
            &self.ingredients.selectors,
            &self.steps.selectors,
            &self.steps.block_selectors,
            &self.prep_time.selectors,
            &self.cook_time.selectors,
            &self.difficulty.selectors,
            &self.servings.selectors,
        ] {
            out.extend(list.iter().map(String::as_str));
        }
        out
    }

    /// Every regex pattern string the profile references.
    pub fn pattern_sources(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.ingredients.patterns.iter().map(String::as_str).collect();
        out.push(&self.steps.sentence_pattern);
        for rules in [&self.prep_time, &self.cook_time, &self.servings] {
            out.extend(rules.pattern.as_deref());
        }
        out
    }
}

/// Registry for looking up site profiles by domain.
#[derive(Debug, Default, Clone)]
pub struct ProfileRegistry {
    map: HashMap<String, SiteProfile>,
}

impl ProfileRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a profile for its primary and supported domains.
    ///
    /// A later registration for the same domain replaces the earlier one.
    pub fn register(&mut self, profile: SiteProfile) {
        for dom in &profile.supported_domains {
            self.map.insert(dom.to_lowercase(), profile.clone());
        }
        self.map.insert(profile.domain.to_lowercase(), profile);
    }

    /// Looks up a profile by domain (case-insensitive).
    pub fn get(&self, domain: &str) -> Option<&SiteProfile> {
        self.map.get(&domain.to_lowercase())
    }

    /// Returns the number of registered domain mappings.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no profiles are registered.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
