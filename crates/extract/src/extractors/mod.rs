// ABOUTME: Field extraction strategies for recipe pages.
// ABOUTME: Structured JSON-LD metadata, selector lists and regex fallbacks driven by site profiles.

//! Field extraction module.
//!
//! Submodules:
//! - `profile`: site profiles with configurable selectors and patterns.
//! - `loader`: the embedded builtin profiles.
//! - `compiled`: selector and regex compilation caches.
//! - `select`: selector-based text extraction utilities.
//! - `structured`: JSON-LD Recipe lookup.
//! - `fields`: the per-field getters combining the above.

pub mod compiled;
pub mod fields;
pub mod loader;
pub mod profile;
pub mod select;
pub mod structured;
