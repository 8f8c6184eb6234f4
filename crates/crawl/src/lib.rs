// ABOUTME: Library entry point for crawling recipe sites and writing the JSON feed.
// ABOUTME: Re-exports Crawler, CrawlerBuilder, Options, CrawlStats, CrawlError and the feed writer.

//! Sequential crawler for recipe sites.
//!
//! Listing pages are walked from the configured start URLs; each linked
//! recipe page is fetched and reduced to a [`recettes_extract::Recipe`]
//! with the site's extraction profile.

pub mod crawler;
pub mod error;
pub mod feed;
pub mod options;
pub mod resource;

pub use crate::crawler::{CrawlStats, Crawler};
pub use crate::error::{CrawlError, ErrorCode};
pub use crate::feed::{default_feed_name, write_feed};
pub use crate::options::{CrawlerBuilder, Options};
pub use crate::resource::{fetch, FetchOptions, FetchResult};
