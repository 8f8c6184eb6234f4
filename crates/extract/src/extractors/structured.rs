// ABOUTME: JSON-LD lookup of schema.org Recipe nodes embedded in a page.
// ABOUTME: Malformed blocks are skipped; each accessor returns the first non-empty value.

use scraper::Html;
use serde_json::Value;
use tracing::debug;

use crate::duration::humanize_duration;
use crate::extractors::compiled;
use crate::extractors::select::normalize_whitespace;

const LD_JSON_SELECTOR: &str = "script[type='application/ld+json']";

/// Keys under which publishers nest the Recipe node.
const CONTAINER_KEYS: &[&str] = &["@graph", "mainEntity"];

/// All schema.org Recipe objects found in a page's JSON-LD blocks, in
/// document order.
#[derive(Debug, Clone, Default)]
pub struct StructuredRecipes {
    nodes: Vec<Value>,
}

impl StructuredRecipes {
    /// Parses every JSON-LD block of `doc` and keeps the Recipe nodes.
    pub fn from_document(doc: &Html) -> Self {
        let mut nodes = Vec::new();
        let Some(sel) = compiled::selector(LD_JSON_SELECTOR) else {
            return Self { nodes };
        };
        for script in doc.select(&sel) {
            let text = script.text().collect::<String>();
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => collect_recipes(&value, &mut nodes),
                Err(err) => debug!(error = %err, "skipping malformed JSON-LD block"),
            }
        }
        Self { nodes }
    }

    /// Wraps already-parsed JSON-LD values.
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut nodes = Vec::new();
        for value in values {
            collect_recipes(value, &mut nodes);
        }
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Ingredients of the first recipe that lists any.
    pub fn ingredients(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|node| {
                let list = node
                    .get("recipeIngredient")
                    .or_else(|| node.get("ingredients"));
                list.map(string_list).unwrap_or_default()
            })
            .find(|list| !list.is_empty())
            .unwrap_or_default()
    }

    /// Instruction texts of the first recipe yielding any entry of at least
    /// `min_chars` characters.
    pub fn instructions(&self, min_chars: usize) -> Vec<String> {
        self.nodes
            .iter()
            .filter_map(|node| node.get("recipeInstructions"))
            .map(|value| {
                let mut out = Vec::new();
                instruction_texts(value, &mut out);
                out.retain(|t| t.chars().count() >= min_chars);
                out
            })
            .find(|list| !list.is_empty())
            .unwrap_or_default()
    }

    pub fn name(&self) -> Option<String> {
        self.first_scalar("name")
    }

    /// Preparation time, with ISO 8601 durations rendered for display.
    pub fn prep_time(&self) -> Option<String> {
        self.first_scalar("prepTime").map(|s| humanize_duration(&s))
    }

    /// Cooking time, with ISO 8601 durations rendered for display.
    pub fn cook_time(&self) -> Option<String> {
        self.first_scalar("cookTime").map(|s| humanize_duration(&s))
    }

    /// Raw `recipeYield`; arrays contribute their first usable entry.
    pub fn recipe_yield(&self) -> Option<String> {
        self.first_scalar("recipeYield")
    }

    fn first_scalar(&self, key: &str) -> Option<String> {
        self.nodes
            .iter()
            .filter_map(|node| node.get(key))
            .find_map(scalar_text)
    }
}

/// Depth-first search for Recipe objects.
fn collect_recipes(value: &Value, out: &mut Vec<Value>) {
    match value {
        Value::Object(map) => {
            if map.get("@type").is_some_and(|t| matches_type(t, "Recipe")) {
                out.push(value.clone());
                return;
            }
            for key in CONTAINER_KEYS {
                if let Some(inner) = map.get(*key) {
                    collect_recipes(inner, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_recipes(item, out);
            }
        }
        _ => {}
    }
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s.eq_ignore_ascii_case(expected),
        Value::Array(arr) => arr.iter().any(|v| matches_type(v, expected)),
        _ => false,
    }
}

/// Text of a string, number or the first usable element of an array.
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => normalize_whitespace(s),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => return items.iter().find_map(scalar_text),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

/// Flattens `recipeInstructions` into step texts.
///
/// Accepts plain strings (one step per line), HowToStep objects (their
/// `text`, else `name`), HowToSection objects (their `itemListElement`) and
/// arrays of any of these.
fn instruction_texts(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(
            s.lines()
                .map(normalize_whitespace)
                .filter(|line| !line.is_empty()),
        ),
        Value::Array(items) => {
            for item in items {
                instruction_texts(item, out);
            }
        }
        Value::Object(map) => {
            if let Some(children) = map.get("itemListElement") {
                instruction_texts(children, out);
                return;
            }
            let text = map
                .get("text")
                .and_then(scalar_text)
                .or_else(|| map.get("name").and_then(scalar_text));
            out.extend(text);
        }
        Value::Number(n) => out.push(n.to_string()),
        Value::Bool(_) | Value::Null => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn page(blocks: &[&str]) -> Html {
        let scripts: String = blocks
            .iter()
            .map(|b| format!(r#"<script type="application/ld+json">{b}</script>"#))
            .collect();
        Html::parse_document(&format!("<html><head>{scripts}</head><body></body></html>"))
    }

    #[test]
    fn finds_top_level_recipe() {
        let doc = page(&[r#"{"@type": "Recipe", "recipeIngredient": ["4 pommes", " 1 pâte  brisée "]}"#]);
        let recipes = StructuredRecipes::from_document(&doc);
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes.ingredients(), vec!["4 pommes", "1 pâte brisée"]);
    }

    #[test]
    fn finds_recipe_in_graph_and_arrays() {
        let graph = json!({"@graph": [{"@type": "WebPage"}, {"@type": ["Recipe"], "name": "Quiche"}]});
        let list = json!([{"@type": "BreadcrumbList"}, {"@type": "recipe", "name": "Soupe"}]);
        let recipes = StructuredRecipes::from_values([&graph, &list]);
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes.name(), Some("Quiche".to_string()));
    }

    #[test]
    fn finds_recipe_under_main_entity() {
        let page = json!({"@type": "WebPage", "mainEntity": {"@type": "Recipe", "recipeYield": 4}});
        let recipes = StructuredRecipes::from_values([&page]);
        assert_eq!(recipes.recipe_yield(), Some("4".to_string()));
    }

    #[test]
    fn skips_malformed_blocks() {
        let doc = page(&[
            "{ this is not json",
            r#"{"@type": "Recipe", "recipeIngredient": ["2 oeufs"]}"#,
        ]);
        let recipes = StructuredRecipes::from_document(&doc);
        assert_eq!(recipes.ingredients(), vec!["2 oeufs"]);
    }

    #[test]
    fn empty_ingredients_fall_through_to_next_recipe() {
        let a = json!({"@type": "Recipe", "recipeIngredient": []});
        let b = json!({"@type": "Recipe", "ingredients": ["sel", "poivre"]});
        let recipes = StructuredRecipes::from_values([&a, &b]);
        assert_eq!(recipes.ingredients(), vec!["sel", "poivre"]);
    }

    #[test]
    fn instructions_from_steps_and_sections() {
        let recipe = json!({
            "@type": "Recipe",
            "recipeInstructions": [
                {"@type": "HowToStep", "text": "Préchauffer le four à 180°C."},
                {"@type": "HowToStep", "text": "Couper."},
                {"@type": "HowToSection", "name": "Pâte", "itemListElement": [
                    {"@type": "HowToStep", "text": "Mélanger la farine et le beurre."}
                ]},
                "Enfourner pour 30 minutes."
            ]
        });
        let recipes = StructuredRecipes::from_values([&recipe]);
        assert_eq!(
            recipes.instructions(11),
            vec![
                "Préchauffer le four à 180°C.",
                "Mélanger la farine et le beurre.",
                "Enfourner pour 30 minutes.",
            ]
        );
    }

    #[test]
    fn instructions_string_is_split_into_lines() {
        let recipe = json!({
            "@type": "Recipe",
            "recipeInstructions": "Éplucher les pommes.\n\nCuire la compote doucement."
        });
        let recipes = StructuredRecipes::from_values([&recipe]);
        assert_eq!(
            recipes.instructions(11),
            vec!["Éplucher les pommes.", "Cuire la compote doucement."]
        );
    }

    #[test]
    fn times_are_humanized() {
        let recipe = json!({"@type": "Recipe", "prepTime": "PT20M", "cookTime": "PT1H5M"});
        let recipes = StructuredRecipes::from_values([&recipe]);
        assert_eq!(recipes.prep_time(), Some("20 min".to_string()));
        assert_eq!(recipes.cook_time(), Some("1 h 5 min".to_string()));
    }

    #[test]
    fn yield_array_takes_first_entry() {
        let recipe = json!({"@type": "Recipe", "recipeYield": ["", "6 parts"]});
        let recipes = StructuredRecipes::from_values([&recipe]);
        assert_eq!(recipes.recipe_yield(), Some("6 parts".to_string()));
    }

    #[test]
    fn non_recipe_pages_are_empty() {
        let article = json!({"@type": "NewsArticle", "name": "Actualité"});
        let recipes = StructuredRecipes::from_values([&article]);
        assert!(recipes.is_empty());
        assert!(recipes.name().is_none());
        assert!(recipes.ingredients().is_empty());
    }
}
