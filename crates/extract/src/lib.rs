// ABOUTME: Main library entry point for recipe page extraction.
// ABOUTME: Re-exports the public API: Extractor, Recipe, ListingPage, SiteProfile, ExtractError.

//! Recettes - structured recipe extraction from recipe-site HTML.
//!
//! Each recipe page is reduced to one [`Recipe`] record. Every field is
//! looked up through embedded JSON-LD metadata first, then an ordered list of
//! CSS selectors, then a regex over the page text; fields that cannot be
//! found hold a fixed placeholder instead of failing the page. Listing pages
//! are reduced to their recipe links and next-page link.
//!
//! # Example
//!
//! ```
//! use recettes_extract::Extractor;
//!
//! let html = r#"<html><body><h1>Soupe à l'oignon</h1></body></html>"#;
//! let recipe = Extractor::builtin()
//!     .extract_recipe(html, "https://www.ptitchef.com/recettes/soupe-fid-1")
//!     .unwrap();
//! assert_eq!(recipe.title(), "Soupe à l'oignon");
//! ```

pub mod duration;
pub mod error;
pub mod extractor;
pub mod extractors;
pub mod listing;
pub mod record;

pub use crate::error::ExtractError;
pub use crate::extractor::Extractor;
pub use crate::extractors::loader::{builtin_profile, load_builtin_registry};
pub use crate::extractors::profile::{
    IngredientRules, ListingRules, MatchFormat, PatternRules, ProfileRegistry, SiteProfile,
    StepRules, TextRules,
};
pub use crate::listing::ListingPage;
pub use crate::record::{Recipe, RecipeParts};
