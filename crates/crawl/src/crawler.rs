// ABOUTME: The Crawler: walks listing pages breadth-first and extracts every linked recipe page.
// ABOUTME: Sequential, one request in flight, with a fixed delay; failed pages are logged and skipped.

use std::collections::{HashSet, VecDeque};
use std::net::ToSocketAddrs;
use std::time::Duration;

use recettes_extract::{Extractor, ListingPage, Recipe};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::CrawlError;
use crate::options::{CrawlerBuilder, Options};
use crate::resource::{fetch, is_private_ip, FetchOptions};

/// Counters reported at the end of a crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub listings: usize,
    pub recipes: usize,
    pub failures: usize,
}

/// Spaces requests at least `delay` apart.
struct Pacer {
    delay: Duration,
    last: Option<Instant>,
}

impl Pacer {
    fn new(delay: Duration) -> Self {
        Self { delay, last: None }
    }

    async fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                sleep(self.delay - elapsed).await;
            }
        }
        self.last = Some(Instant::now());
    }
}

/// Recipe site crawler.
pub struct Crawler {
    opts: Options,
    http_client: reqwest::Client,
    extractor: Extractor,
}

impl Crawler {
    /// Create a new CrawlerBuilder for configuring the crawler.
    pub fn builder() -> CrawlerBuilder {
        CrawlerBuilder::new()
    }

    /// Create a new Crawler with the given options.
    pub fn new(opts: Options) -> Result<Self, CrawlError> {
        let http_client = match opts.http_client.clone() {
            Some(client) => client,
            None => build_http_client(&opts)?,
        };
        let extractor = opts.extractor.clone().unwrap_or_default();

        Ok(Self {
            opts,
            http_client,
            extractor,
        })
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Returns true if `url` is on one of the allowed domains.
    pub fn is_allowed(&self, url: &str) -> bool {
        if self.opts.allowed_domains.is_empty() {
            return true;
        }
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        else {
            return false;
        };
        self.opts.allowed_domains.iter().any(|domain| {
            let domain = domain.to_lowercase();
            host == domain || host.ends_with(&format!(".{}", domain))
        })
    }

    /// Fetch a page and return its decoded HTML and final URL.
    async fn fetch_html(&self, url: &str) -> Result<(String, String), CrawlError> {
        let fetch_opts = FetchOptions {
            headers: self.opts.headers.clone(),
            allow_private_networks: self.opts.allow_private_networks,
        };
        let page = fetch(&self.http_client, url, &fetch_opts).await?;
        Ok((page.text(), page.final_url))
    }

    /// Fetch a recipe page and extract its record.
    ///
    /// The record's URL is the final URL after redirects.
    pub async fn fetch_recipe(&self, url: &str) -> Result<Recipe, CrawlError> {
        let (html, final_url) = self.fetch_html(url).await?;
        self.extractor
            .extract_recipe(&html, &final_url)
            .map_err(|e| CrawlError::extract(url, "ExtractRecipe", e))
    }

    /// Fetch a listing page and collect its recipe links.
    pub async fn fetch_listing(&self, url: &str) -> Result<ListingPage, CrawlError> {
        let (html, final_url) = self.fetch_html(url).await?;
        let mut listing = self
            .extractor
            .parse_listing(&html, &final_url)
            .map_err(|e| CrawlError::extract(url, "ParseListing", e))?;
        if let Some(cap) = self.opts.max_links_per_page {
            listing.recipe_urls.truncate(cap);
        }
        Ok(listing)
    }

    /// Crawl from the start URLs, handing each extracted record to `sink`.
    ///
    /// Listing pages are visited in FIFO order; each listing's recipes are
    /// fetched before its next page is queued. Stops once `max_recipes`
    /// records were emitted or no listing pages remain.
    pub async fn run<F>(&self, mut sink: F) -> CrawlStats
    where
        F: FnMut(Recipe),
    {
        let mut stats = CrawlStats::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        let mut pacer = Pacer::new(self.opts.download_delay);
        let max = self.opts.max_recipes;

        for url in &self.opts.start_urls {
            if self.is_allowed(url) {
                queue.push_back(url.clone());
            } else {
                warn!(url = url.as_str(), "start URL outside allowed domains, skipping");
            }
        }

        while let Some(listing_url) = queue.pop_front() {
            if stats.recipes >= max {
                break;
            }
            if !visited.insert(listing_url.clone()) {
                continue;
            }

            pacer.wait().await;
            let listing = match self.fetch_listing(&listing_url).await {
                Ok(listing) => listing,
                Err(e) => {
                    warn!(url = listing_url.as_str(), error = %e, "listing page failed");
                    stats.failures += 1;
                    continue;
                }
            };
            stats.listings += 1;
            info!(
                url = listing_url.as_str(),
                links = listing.recipe_urls.len(),
                "visiting listing page"
            );

            for recipe_url in &listing.recipe_urls {
                if stats.recipes >= max {
                    break;
                }
                if !self.is_allowed(recipe_url) {
                    debug!(url = recipe_url.as_str(), "outside allowed domains");
                    continue;
                }
                if !visited.insert(recipe_url.clone()) {
                    continue;
                }

                pacer.wait().await;
                match self.fetch_recipe(recipe_url).await {
                    Ok(recipe) => {
                        stats.recipes += 1;
                        sink(recipe);
                    }
                    Err(e) => {
                        warn!(url = recipe_url.as_str(), error = %e, "recipe page failed");
                        stats.failures += 1;
                    }
                }
            }

            if let Some(next) = listing.next_page {
                if self.is_allowed(&next) && !visited.contains(&next) {
                    queue.push_back(next);
                }
            }
        }

        info!(
            listings = stats.listings,
            recipes = stats.recipes,
            failures = stats.failures,
            "crawl finished"
        );
        stats
    }

    /// Crawl and collect every record in emission order.
    pub async fn collect(&self) -> (Vec<Recipe>, CrawlStats) {
        let mut recipes = Vec::new();
        let stats = self.run(|recipe| recipes.push(recipe)).await;
        (recipes, stats)
    }
}

/// Builds the HTTP client, refusing redirects into private networks unless allowed.
fn build_http_client(opts: &Options) -> Result<reqwest::Client, CrawlError> {
    let allow_private = opts.allow_private_networks;
    let redirect_policy = reqwest::redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= 10 {
            return attempt.error("too many redirects");
        }
        if allow_private {
            return attempt.follow();
        }
        let next = attempt.url().clone();
        let Some(host) = next.host_str() else {
            return attempt.follow();
        };
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            if is_private_ip(&ip) {
                return attempt.error("redirect to private IP blocked");
            }
            return attempt.follow();
        }
        // synchronous DNS resolution to avoid async in redirect policy
        let port = next.port_or_known_default().unwrap_or(80);
        match (host, port).to_socket_addrs() {
            Ok(mut addrs) => {
                if addrs.any(|sa| is_private_ip(&sa.ip())) {
                    attempt.error("redirect to private IP blocked")
                } else {
                    attempt.follow()
                }
            }
            Err(_) => attempt.error("DNS lookup failed during redirect"),
        }
    });

    reqwest::Client::builder()
        .redirect(redirect_policy)
        .user_agent(&opts.user_agent)
        .timeout(opts.timeout)
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
        .map_err(|e| {
            CrawlError::fetch(
                "",
                "BuildClient",
                Some(anyhow::anyhow!("failed to build HTTP client: {}", e)),
            )
        })
}
