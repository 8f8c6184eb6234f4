// ABOUTME: Public extraction facade: picks the site profile for a URL and runs every field getter.
// ABOUTME: Produces one sealed Recipe per page or a ListingPage for category pages.

use scraper::Html;
use tracing::{debug, info};
use url::Url;

use crate::error::ExtractError;
use crate::extractors::fields::{
    extract_cook_time, extract_difficulty, extract_ingredients, extract_prep_time,
    extract_servings, extract_steps, extract_title, PageContext,
};
use crate::extractors::loader::{builtin_profile, load_builtin_registry};
use crate::extractors::profile::{ProfileRegistry, SiteProfile};
use crate::listing::{parse_listing, ListingPage};
use crate::record::{Recipe, RecipeParts};

/// Runs recipe and listing extraction against registered site profiles.
///
/// Hosts without a registered profile use the generic profile, with
/// `site_source` derived from the host name.
#[derive(Debug, Clone)]
pub struct Extractor {
    registry: ProfileRegistry,
    generic: SiteProfile,
}

impl Extractor {
    /// Creates an extractor over `registry`, falling back to the builtin profile.
    pub fn new(registry: ProfileRegistry) -> Self {
        Self {
            registry,
            generic: builtin_profile(),
        }
    }

    /// Creates an extractor with only the builtin profiles registered.
    pub fn builtin() -> Self {
        Self::new(load_builtin_registry())
    }

    /// Registers an extra profile, replacing any profile for the same domains.
    pub fn with_profile(mut self, profile: SiteProfile) -> Self {
        self.registry.register(profile);
        self
    }

    /// Returns the profile applying to `url` and the site name to record.
    pub fn profile_for(&self, url: &Url) -> (&SiteProfile, String) {
        let host = url.host_str().unwrap_or_default().to_lowercase();
        match self.registry.get(&host) {
            Some(profile) => (profile, profile.site_source.clone()),
            None => {
                let site = host.strip_prefix("www.").unwrap_or(&host).to_string();
                (&self.generic, site)
            }
        }
    }

    /// Extracts one recipe record from a recipe page.
    ///
    /// Fails only on empty HTML or an unusable URL; every field that cannot
    /// be found holds its sentinel value.
    pub fn extract_recipe(&self, html: &str, url: &str) -> Result<Recipe, ExtractError> {
        let page_url = validate(html, url)?;
        let (profile, site_source) = self.profile_for(&page_url);

        let doc = Html::parse_document(html);
        let ctx = PageContext::new(&doc);
        if !ctx.structured().is_empty() {
            debug!(url, recipes = ctx.structured().len(), "found JSON-LD recipe metadata");
        }

        let parts = RecipeParts {
            title: extract_title(&ctx, &profile.title),
            ingredients: extract_ingredients(&ctx, &profile.ingredients),
            steps: extract_steps(&ctx, &profile.steps),
            prep_time: extract_prep_time(&ctx, &profile.prep_time),
            cook_time: extract_cook_time(&ctx, &profile.cook_time),
            difficulty: extract_difficulty(&ctx, &profile.difficulty),
            servings: extract_servings(&ctx, &profile.servings),
        };
        let recipe = Recipe::from_parts(parts, url, site_source);

        if recipe.has_field_gaps() {
            info!(
                url,
                title = recipe.title(),
                missing = ?recipe.missing_fields(),
                "extracted recipe with gaps"
            );
        } else {
            info!(url, title = recipe.title(), "extracted recipe");
        }
        Ok(recipe)
    }

    /// Extracts recipe links and the next-page link from a listing page.
    pub fn parse_listing(&self, html: &str, url: &str) -> Result<ListingPage, ExtractError> {
        let page_url = validate(html, url)?;
        let (profile, _) = self.profile_for(&page_url);

        let doc = Html::parse_document(html);
        let listing = parse_listing(&doc, &page_url, &profile.listing);
        info!(
            url,
            recipes = listing.recipe_urls.len(),
            next = listing.next_page.as_deref().unwrap_or("-"),
            "parsed listing page"
        );
        Ok(listing)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate(html: &str, url: &str) -> Result<Url, ExtractError> {
    if url.trim().is_empty() {
        return Err(ExtractError::invalid_url(url, "empty URL"));
    }
    let parsed = Url::parse(url).map_err(|e| ExtractError::invalid_url(url, e))?;
    if html.trim().is_empty() {
        return Err(ExtractError::EmptyHtml(url.to_string()));
    }
    Ok(parsed)
}
