// ABOUTME: Crawl configuration: the Options struct and the CrawlerBuilder fluent API.
// ABOUTME: Defaults follow the builtin site profile: its start URLs, its domains, 40 recipes, 2 s delay.

use std::collections::HashMap;
use std::time::Duration;

use recettes_extract::{builtin_profile, Extractor};

use crate::crawler::Crawler;
use crate::error::CrawlError;

/// Default number of recipes collected before the crawl stops.
pub const DEFAULT_MAX_RECIPES: usize = 40;

/// Default pause between two requests.
pub const DEFAULT_DOWNLOAD_DELAY: Duration = Duration::from_secs(2);

/// Configuration options for a crawl.
#[derive(Debug, Clone)]
pub struct Options {
    pub start_urls: Vec<String>,
    pub max_recipes: usize,
    /// Lower cap on recipe links taken from each listing page.
    pub max_links_per_page: Option<usize>,
    pub download_delay: Duration,
    pub timeout: Duration,
    pub user_agent: String,
    /// Hosts the crawl may visit; subdomains match. Empty allows every host.
    pub allowed_domains: Vec<String>,
    pub allow_private_networks: bool,
    pub headers: HashMap<String, String>,
    pub http_client: Option<reqwest::Client>,
    pub extractor: Option<Extractor>,
}

impl Default for Options {
    fn default() -> Self {
        let profile = builtin_profile();
        Self {
            start_urls: profile.start_urls.clone(),
            max_recipes: DEFAULT_MAX_RECIPES,
            max_links_per_page: None,
            download_delay: DEFAULT_DOWNLOAD_DELAY,
            timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (compatible; recettes/0.1)".to_string(),
            allowed_domains: profile.supported_domains,
            allow_private_networks: false,
            headers: HashMap::new(),
            http_client: None,
            extractor: None,
        }
    }
}

/// Builder for constructing Crawler instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct CrawlerBuilder {
    opts: Options,
}

impl CrawlerBuilder {
    /// Create a new CrawlerBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the listing pages the crawl starts from.
    pub fn start_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.start_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Stop after this many recipes.
    pub fn max_recipes(mut self, max: usize) -> Self {
        self.opts.max_recipes = max;
        self
    }

    pub fn max_links_per_page(mut self, max: usize) -> Self {
        self.opts.max_links_per_page = Some(max);
        self
    }

    /// Set the pause between requests.
    pub fn download_delay(mut self, delay: Duration) -> Self {
        self.opts.download_delay = delay;
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Restrict the crawl to these hosts and their subdomains.
    pub fn allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.allowed_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Allow or disallow requests to private networks.
    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.opts.allow_private_networks = allow;
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Use a custom extractor, e.g. one with extra site profiles.
    pub fn extractor(mut self, extractor: Extractor) -> Self {
        self.opts.extractor = Some(extractor);
        self
    }

    /// Build the Crawler with the configured options.
    pub fn build(self) -> Result<Crawler, CrawlError> {
        Crawler::new(self.opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_builtin_profile() {
        let opts = Options::default();
        assert_eq!(opts.max_recipes, 40);
        assert_eq!(opts.download_delay, Duration::from_secs(2));
        assert_eq!(opts.timeout, Duration::from_secs(30));
        assert!(!opts.start_urls.is_empty());
        assert!(opts
            .start_urls
            .iter()
            .all(|u| u.starts_with("https://www.ptitchef.com/")));
        assert_eq!(opts.allowed_domains, vec!["ptitchef.com".to_string()]);
        assert!(!opts.allow_private_networks);
    }

    #[test]
    fn builder_overrides() {
        let builder = CrawlerBuilder::new()
            .start_urls(["http://localhost/recettes/"])
            .max_recipes(3)
            .max_links_per_page(5)
            .download_delay(Duration::ZERO)
            .allowed_domains(Vec::<String>::new())
            .header("accept-language", "fr");
        let opts = &builder.opts;
        assert_eq!(opts.start_urls, vec!["http://localhost/recettes/"]);
        assert_eq!(opts.max_recipes, 3);
        assert_eq!(opts.max_links_per_page, Some(5));
        assert_eq!(opts.download_delay, Duration::ZERO);
        assert!(opts.allowed_domains.is_empty());
        assert_eq!(opts.headers.get("accept-language").map(String::as_str), Some("fr"));
    }
}
