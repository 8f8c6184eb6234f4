// ABOUTME: Per-field recipe getters: structured metadata, then selectors, then regex fallback.
// ABOUTME: Each getter returns None or an empty list when nothing matched; sentinels are applied later.

//! Recipe field getters.
//!
//! Every getter follows the same priority order:
//! 1. JSON-LD Recipe metadata, when schema.org has the field.
//! 2. The profile's ordered selector list; first selector with a usable value wins.
//! 3. The profile's regex fallback over the visible page text.
//!
//! Getters never fail. A field nothing matched comes back as `None` (or an
//! empty list) and [`crate::record::Recipe::from_parts`] substitutes its sentinel.

use once_cell::unsync::OnceCell;
use regex::Captures;
use scraper::Html;
use tracing::debug;

use crate::extractors::compiled;
use crate::extractors::profile::{
    IngredientRules, MatchFormat, PatternRules, StepRules, TextRules,
};
use crate::extractors::select::{
    body_text, element_text, first_list, first_text, normalize_whitespace, page_text,
};
use crate::extractors::structured::StructuredRecipes;

/// A parsed page plus the derived views the getters share.
pub struct PageContext<'a> {
    doc: &'a Html,
    structured: StructuredRecipes,
    page_text: OnceCell<String>,
    body_text: OnceCell<String>,
}

impl<'a> PageContext<'a> {
    pub fn new(doc: &'a Html) -> Self {
        Self {
            doc,
            structured: StructuredRecipes::from_document(doc),
            page_text: OnceCell::new(),
            body_text: OnceCell::new(),
        }
    }

    pub fn structured(&self) -> &StructuredRecipes {
        &self.structured
    }

    fn page_text(&self) -> &str {
        self.page_text.get_or_init(|| page_text(self.doc))
    }

    fn body_text(&self) -> &str {
        self.body_text.get_or_init(|| body_text(self.doc))
    }
}

/// Title: JSON-LD `name`, then selectors.
pub fn extract_title(ctx: &PageContext<'_>, rules: &TextRules) -> Option<String> {
    ctx.structured
        .name()
        .or_else(|| first_text(ctx.doc, &rules.selectors))
}

/// Ingredients: JSON-LD, then the first selector with usable entries, then
/// the quantity patterns over the body text.
pub fn extract_ingredients(ctx: &PageContext<'_>, rules: &IngredientRules) -> Vec<String> {
    let structured = ctx.structured.ingredients();
    if !structured.is_empty() {
        return structured;
    }

    let selected = first_list(ctx.doc, &rules.selectors, rules.min_chars);
    if !selected.is_empty() {
        return selected;
    }

    let found = pattern_matches(
        ctx.body_text(),
        &rules.patterns,
        rules.max_matches_per_pattern,
    );
    if !found.is_empty() {
        debug!(count = found.len(), "ingredients taken from text patterns");
    }
    found
}

/// Runs each pattern over `text`, keeping at most `per_pattern` matches from
/// each, in pattern order, without duplicates.
pub fn pattern_matches(text: &str, patterns: &[String], per_pattern: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for pattern in patterns {
        let Some(re) = compiled::regex(pattern) else {
            continue;
        };
        for m in re.find_iter(text).take(per_pattern) {
            let found = normalize_whitespace(m.as_str());
            if !found.is_empty() && !out.contains(&found) {
                out.push(found);
            }
        }
    }
    out
}

/// Steps: JSON-LD instructions, then list selectors, then sentences split out
/// of free-text preparation blocks.
pub fn extract_steps(ctx: &PageContext<'_>, rules: &StepRules) -> Vec<String> {
    let structured = ctx.structured.instructions(rules.structured_min_chars);
    if !structured.is_empty() {
        return structured;
    }

    let selected = first_list(ctx.doc, &rules.selectors, rules.min_chars);
    if !selected.is_empty() {
        return selected;
    }

    let sentences = block_sentences(ctx.doc, rules);
    if !sentences.is_empty() {
        debug!(count = sentences.len(), "steps taken from preparation blocks");
    }
    sentences
}

fn block_sentences(doc: &Html, rules: &StepRules) -> Vec<String> {
    if rules.block_selectors.is_empty() {
        return vec![];
    }
    let (Some(blocks), Some(sentence_re)) = (
        compiled::selector(&rules.block_selectors.join(", ")),
        compiled::regex(&rules.sentence_pattern),
    ) else {
        return vec![];
    };

    let mut out = Vec::new();
    for block in doc.select(&blocks) {
        let text = element_text(block);
        for m in sentence_re.find_iter(&text) {
            let sentence = m.as_str().trim();
            if sentence.chars().count() >= rules.min_sentence_chars {
                out.push(sentence.to_string());
            }
        }
    }
    out
}

/// Preparation time: JSON-LD `prepTime`, then the profile rules.
pub fn extract_prep_time(ctx: &PageContext<'_>, rules: &PatternRules) -> Option<String> {
    ctx.structured
        .prep_time()
        .or_else(|| extract_with_pattern(ctx, rules))
}

/// Cooking time: JSON-LD `cookTime`, then the profile rules.
pub fn extract_cook_time(ctx: &PageContext<'_>, rules: &PatternRules) -> Option<String> {
    ctx.structured
        .cook_time()
        .or_else(|| extract_with_pattern(ctx, rules))
}

/// Difficulty has no schema.org counterpart and no text pattern.
pub fn extract_difficulty(ctx: &PageContext<'_>, rules: &TextRules) -> Option<String> {
    first_text(ctx.doc, &rules.selectors)
}

/// Servings: JSON-LD `recipeYield`, then the profile rules.
///
/// A bare numeric yield is formatted like a pattern match so `4` and
/// "4 personnes" in the page text produce the same value.
pub fn extract_servings(ctx: &PageContext<'_>, rules: &PatternRules) -> Option<String> {
    if let Some(raw) = ctx.structured.recipe_yield() {
        if raw.chars().all(|c| c.is_ascii_digit()) {
            if let MatchFormat::Suffix { value } = &rules.format {
                return Some(format!("{raw}{value}"));
            }
        }
        return Some(raw);
    }
    extract_with_pattern(ctx, rules)
}

/// Selectors first, then the regex over the visible page text.
fn extract_with_pattern(ctx: &PageContext<'_>, rules: &PatternRules) -> Option<String> {
    if let Some(found) = first_text(ctx.doc, &rules.selectors) {
        return Some(found);
    }
    let re = compiled::regex(rules.pattern.as_deref()?)?;
    let caps = re.captures(ctx.page_text())?;
    format_match(&caps, &rules.format)
}

/// Turns a fallback match into a field value according to `format`.
pub fn format_match(caps: &Captures<'_>, format: &MatchFormat) -> Option<String> {
    let number = caps.get(1).or_else(|| caps.get(0))?.as_str().trim();
    if number.is_empty() {
        return None;
    }
    let value = match format {
        MatchFormat::Whole => number.to_string(),
        MatchFormat::Duration => {
            let hours = caps
                .get(2)
                .is_some_and(|unit| unit.as_str().to_lowercase().starts_with('h'));
            if hours {
                format!("{number} h")
            } else {
                format!("{number} min")
            }
        }
        MatchFormat::Suffix { value } => format!("{number}{value}"),
    };
    Some(value)
}
