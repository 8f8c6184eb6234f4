// ABOUTME: Listing page parsing: recipe links and the pagination link of a category page.
// ABOUTME: Links are filtered by marker substrings, resolved, deduplicated and capped per page.

use scraper::Html;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::extractors::profile::ListingRules;
use crate::extractors::select::select_attrs;

/// Recipe links and pagination found on one listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPage {
    pub url: String,
    pub recipe_urls: Vec<String>,
    pub next_page: Option<String>,
}

/// Parses a listing page with the given rules.
///
/// Relative links are resolved against `base`. Links that cannot be resolved
/// are dropped. Order is the first-seen document order.
pub fn parse_listing(doc: &Html, base: &Url, rules: &ListingRules) -> ListingPage {
    let mut recipe_urls: Vec<String> = Vec::new();
    for href in select_attrs(doc, &rules.link_selector, "href") {
        if !rules.link_markers.iter().all(|m| href.contains(m.as_str())) {
            continue;
        }
        let Some(resolved) = resolve(base, &href) else {
            continue;
        };
        if !recipe_urls.contains(&resolved) {
            recipe_urls.push(resolved);
        }
    }
    recipe_urls.truncate(rules.max_links_per_page);

    let next_page = rules
        .next_page_selector
        .as_deref()
        .and_then(|css| select_attrs(doc, css, "href").into_iter().next())
        .and_then(|href| resolve(base, &href));

    ListingPage {
        url: base.to_string(),
        recipe_urls,
        next_page,
    }
}

fn resolve(base: &Url, href: &str) -> Option<String> {
    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::loader::builtin_profile;
    use pretty_assertions::assert_eq;

    fn listing(html: &str) -> ListingPage {
        let base = Url::parse("https://www.ptitchef.com/recettes/plat/").expect("url");
        parse_listing(&Html::parse_document(html), &base, &builtin_profile().listing)
    }

    #[test]
    fn keeps_only_recipe_links() {
        let page = listing(
            r#"<html><body>
            <a href="/recettes/plat/gratin-fid-1234">Gratin</a>
            <a href="/recettes/dessert/">Desserts</a>
            <a href="https://www.ptitchef.com/recettes/entree/soupe-fid-99">Soupe</a>
            <a href="/blog/fid-5">Blog</a>
            </body></html>"#,
        );
        assert_eq!(
            page.recipe_urls,
            vec![
                "https://www.ptitchef.com/recettes/plat/gratin-fid-1234",
                "https://www.ptitchef.com/recettes/entree/soupe-fid-99",
            ]
        );
        assert!(page.next_page.is_none());
    }

    #[test]
    fn deduplicates_preserving_order() {
        let page = listing(
            r#"<html><body>
            <a href="/recettes/plat/b-fid-2">B</a>
            <a href="/recettes/plat/a-fid-1">A</a>
            <a href="/recettes/plat/b-fid-2#comments">B again</a>
            <a href="https://www.ptitchef.com/recettes/plat/a-fid-1">A again</a>
            </body></html>"#,
        );
        assert_eq!(
            page.recipe_urls,
            vec![
                "https://www.ptitchef.com/recettes/plat/b-fid-2",
                "https://www.ptitchef.com/recettes/plat/a-fid-1",
            ]
        );
    }

    #[test]
    fn caps_links_per_page() {
        let links: String = (0..20)
            .map(|i| format!(r#"<a href="/recettes/plat/r-fid-{i}">r</a>"#))
            .collect();
        let page = listing(&format!("<html><body>{links}</body></html>"));
        assert_eq!(page.recipe_urls.len(), 15);
        assert!(page.recipe_urls[0].ends_with("r-fid-0"));
        assert!(page.recipe_urls[14].ends_with("r-fid-14"));
    }

    #[test]
    fn resolves_next_page() {
        let page = listing(
            r#"<html><body>
            <a class="next" href="?page=2">Suivant</a>
            </body></html>"#,
        );
        assert_eq!(
            page.next_page.as_deref(),
            Some("https://www.ptitchef.com/recettes/plat/?page=2")
        );
        assert_eq!(page.url, "https://www.ptitchef.com/recettes/plat/");
    }

    #[test]
    fn skips_non_http_links() {
        let page = listing(
            r#"<html><body>
            <a href="javascript:open('/recettes/x-fid-1')">js</a>
            </body></html>"#,
        );
        assert!(page.recipe_urls.is_empty());
    }
}
