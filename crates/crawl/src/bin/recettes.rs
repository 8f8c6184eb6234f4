// ABOUTME: CLI binary for crawling recipe sites and extracting recipe records.
// ABOUTME: Subcommands: crawl (write a JSON feed), parse (one HTML file), fetch (URLs to stdout).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use recettes_crawl::{default_feed_name, write_feed, Crawler, CrawlerBuilder};
use recettes_extract::{builtin_profile, Extractor, Recipe, SiteProfile};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "recettes")]
#[command(about = "Crawl recipe sites and extract structured recipes")]
struct Args {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl listing pages and write every recipe found to a JSON feed
    Crawl {
        /// Number of recipes to collect
        #[arg(short = 'n', long = "nombre", default_value_t = 40)]
        nombre: usize,

        /// Feed path (default: recettes_<nombre>_extraites.json)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Seconds between two requests
        #[arg(long = "delay", default_value_t = 2.0)]
        delay: f64,

        /// Extra site profile (JSON)
        #[arg(long = "profile")]
        profile: Option<PathBuf>,

        /// Allow fetching from private/local networks
        #[arg(long = "allow-private-networks")]
        allow_private_networks: bool,

        /// Listing pages to start from (default: the profile's start URLs)
        #[arg()]
        start_urls: Vec<String>,
    },

    /// Extract one recipe (or a listing) from an HTML file
    Parse {
        /// HTML file to parse
        #[arg(long = "html")]
        html: PathBuf,

        /// URL the page was served from
        #[arg(long = "url")]
        url: String,

        /// Parse as a listing page instead of a recipe page
        #[arg(long = "listing")]
        listing: bool,

        /// Extra site profile (JSON)
        #[arg(long = "profile")]
        profile: Option<PathBuf>,
    },

    /// Fetch recipe pages and print their records as a JSON array
    Fetch {
        /// Recipe page URLs
        #[arg(required = true)]
        urls: Vec<String>,

        /// Allow fetching from private/local networks
        #[arg(long = "allow-private-networks")]
        allow_private_networks: bool,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_profile(path: &Path) -> Result<SiteProfile> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading profile {}", path.display()))?;
    let profile = SiteProfile::from_json(&json)
        .with_context(|| format!("loading profile {}", path.display()))?;
    Ok(profile)
}

fn build_extractor(profile: Option<&SiteProfile>) -> Extractor {
    match profile {
        Some(profile) => Extractor::builtin().with_profile(profile.clone()),
        None => Extractor::builtin(),
    }
}

async fn crawl(
    nombre: usize,
    output: Option<PathBuf>,
    delay: f64,
    profile: Option<PathBuf>,
    allow_private_networks: bool,
    start_urls: Vec<String>,
) -> Result<()> {
    if !delay.is_finite() || delay < 0.0 {
        bail!("--delay must be a non-negative number of seconds");
    }
    let profile = profile.as_deref().map(load_profile).transpose()?;
    let base = profile.clone().unwrap_or_else(builtin_profile);

    let start_urls = if start_urls.is_empty() {
        base.start_urls.clone()
    } else {
        start_urls
    };
    if start_urls.is_empty() {
        bail!("no start URLs given and the profile defines none");
    }

    let mut allowed: Vec<String> = base.supported_domains.clone();
    allowed.push(base.domain.clone());
    for url in &start_urls {
        let parsed = Url::parse(url).with_context(|| format!("invalid start URL {url}"))?;
        if let Some(host) = parsed.host_str() {
            allowed.push(host.to_lowercase());
        }
    }
    allowed.sort();
    allowed.dedup();

    let crawler: Crawler = CrawlerBuilder::new()
        .start_urls(start_urls)
        .max_recipes(nombre)
        .download_delay(Duration::from_secs_f64(delay))
        .allowed_domains(allowed)
        .allow_private_networks(allow_private_networks)
        .extractor(build_extractor(profile.as_ref()))
        .build()?;

    let (recipes, stats) = crawler.collect().await;
    let path = output.unwrap_or_else(|| PathBuf::from(default_feed_name(nombre)));
    if write_feed(&path, &recipes)? {
        info!(
            path = %path.display(),
            recipes = stats.recipes,
            failures = stats.failures,
            "crawl saved"
        );
    }
    Ok(())
}

fn parse(html: &Path, url: &str, listing: bool, profile: Option<PathBuf>) -> Result<()> {
    let profile = profile.as_deref().map(load_profile).transpose()?;
    let extractor = build_extractor(profile.as_ref());
    let content =
        fs::read_to_string(html).with_context(|| format!("reading {}", html.display()))?;

    let output = if listing {
        serde_json::to_string_pretty(&extractor.parse_listing(&content, url)?)?
    } else {
        serde_json::to_string_pretty(&extractor.extract_recipe(&content, url)?)?
    };
    println!("{}", output);
    Ok(())
}

/// Fetches each URL in turn; returns false if any of them failed.
async fn fetch(urls: &[String], allow_private_networks: bool) -> Result<bool> {
    let crawler = Crawler::builder()
        .allowed_domains(Vec::<String>::new())
        .allow_private_networks(allow_private_networks)
        .build()?;

    let mut recipes: Vec<Recipe> = Vec::new();
    let mut all_ok = true;
    for url in urls {
        match crawler.fetch_recipe(url).await {
            Ok(recipe) => recipes.push(recipe),
            Err(e) => {
                error!(url = url.as_str(), error = %e, "fetch failed");
                all_ok = false;
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&recipes)?);
    Ok(all_ok)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match args.command {
        Command::Crawl {
            nombre,
            output,
            delay,
            profile,
            allow_private_networks,
            start_urls,
        } => crawl(
            nombre,
            output,
            delay,
            profile,
            allow_private_networks,
            start_urls,
        )
        .await
        .map(|_| true),
        Command::Parse {
            html,
            url,
            listing,
            profile,
        } => parse(&html, &url, listing, profile).map(|_| true),
        Command::Fetch {
            urls,
            allow_private_networks,
        } => fetch(&urls, allow_private_networks).await,
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
