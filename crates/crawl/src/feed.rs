// ABOUTME: JSON feed output: writes crawled recipes as one pretty-printed UTF-8 array.
// ABOUTME: An empty crawl writes no file at all.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use recettes_extract::Recipe;
use tracing::info;

use crate::error::CrawlError;

/// Default feed file name for a crawl of `n` recipes.
pub fn default_feed_name(n: usize) -> String {
    format!("recettes_{}_extraites.json", n)
}

/// Write `recipes` to `path` as a JSON array indented by two spaces.
///
/// Non-ASCII text is written as-is. Returns `Ok(false)` without touching the
/// filesystem when `recipes` is empty.
pub fn write_feed(path: &Path, recipes: &[Recipe]) -> Result<bool, CrawlError> {
    let path_str = path.display().to_string();
    if recipes.is_empty() {
        info!(path = path_str.as_str(), "no recipes, feed not written");
        return Ok(false);
    }

    let file = File::create(path)
        .map_err(|e| CrawlError::output(path_str.as_str(), "WriteFeed", Some(e.into())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, recipes)
        .map_err(|e| CrawlError::output(path_str.as_str(), "WriteFeed", Some(e.into())))?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| CrawlError::output(path_str.as_str(), "WriteFeed", Some(e.into())))?;

    info!(path = path_str.as_str(), recipes = recipes.len(), "feed written");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recettes_extract::RecipeParts;
    use std::fs;
    use tempfile::TempDir;

    fn sample() -> Recipe {
        Recipe::from_parts(
            RecipeParts {
                title: Some("Crêpes sucrées".to_string()),
                ingredients: vec!["250 g de farine".to_string()],
                ..Default::default()
            },
            "https://www.ptitchef.com/recettes/dessert/crepes-fid-1",
            "ptitchef.com",
        )
    }

    #[test]
    fn default_name_counts_recipes() {
        assert_eq!(default_feed_name(40), "recettes_40_extraites.json");
    }

    #[test]
    fn writes_pretty_utf8_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feed.json");

        assert!(write_feed(&path, &[sample()]).unwrap());

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("[\n  {\n    \"titre\": \"Crêpes sucrées\""));
        let parsed: Vec<Recipe> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, vec![sample()]);
    }

    #[test]
    fn empty_list_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vide.json");

        assert!(!write_feed(&path, &[]).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_path_is_output_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent").join("feed.json");

        let err = write_feed(&path, &[sample()]).unwrap_err();
        assert!(err.is_output());
    }
}
