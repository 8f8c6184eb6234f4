// ABOUTME: Pre-compiled CSS selector and regex caches keyed by their source strings.
// ABOUTME: Site profiles are plain strings; this avoids reparsing them on every page.

//! Compilation caches for profile rules.
//!
//! Profiles store selectors and patterns as strings so they can be loaded
//! from JSON. Parsing them is expensive relative to matching a single page,
//! so each source string is compiled once and reused for every page.
//! Invalid sources are cached as `None` and skipped by callers.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;

static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

static REGEX_CACHE: Lazy<RwLock<HashMap<String, Option<Regex>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Looks up `key` in `cache`, compiling and inserting it on a miss.
fn cached<T: Clone>(
    cache: &RwLock<HashMap<String, Option<T>>>,
    key: &str,
    compile: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    // A poisoned lock still holds a consistent map: entries are only ever inserted whole.
    {
        let map = cache.read().unwrap_or_else(|e| e.into_inner());
        if let Some(hit) = map.get(key) {
            return hit.clone();
        }
    }

    let compiled = compile(key);
    let mut map = cache.write().unwrap_or_else(|e| e.into_inner());
    map.entry(key.to_string())
        .or_insert_with(|| compiled.clone())
        .clone()
}

/// Gets or compiles a CSS selector.
///
/// Returns `None` if the selector does not parse.
pub fn selector(css: &str) -> Option<Selector> {
    cached(&SELECTOR_CACHE, css, |s| Selector::parse(s).ok())
}

/// Gets or compiles a regular expression.
///
/// Returns `None` if the pattern does not compile.
pub fn regex(pattern: &str) -> Option<Regex> {
    cached(&REGEX_CACHE, pattern, |p| Regex::new(p).ok())
}

/// Compiles every selector and pattern up front.
///
/// Returns the sources that failed to compile, so a profile loader can
/// reject them instead of silently skipping them at extraction time.
pub fn precompile<'a, S, P>(selectors: S, patterns: P) -> Vec<String>
where
    S: IntoIterator<Item = &'a str>,
    P: IntoIterator<Item = &'a str>,
{
    let mut invalid = Vec::new();
    for css in selectors {
        if selector(css).is_none() {
            invalid.push(format!("selector {css:?}"));
        }
    }
    for pattern in patterns {
        if regex(pattern).is_none() {
            invalid.push(format!("pattern {pattern:?}"));
        }
    }
    invalid
}
