// ABOUTME: Loader for the builtin site profiles embedded as JSON.
// ABOUTME: Provides builtin_profile() and load_builtin_registry() for the default ProfileRegistry.

//! Builtin profile loader.
//!
//! The ptitchef.com profile is embedded at compile time and doubles as the
//! generic profile for hosts without a dedicated one: its selectors are the
//! common recipe-markup class names rather than site-specific ids.

use crate::extractors::profile::{ProfileRegistry, SiteProfile};

/// Embedded JSON for the ptitchef.com profile.
const PTITCHEF_PROFILE_JSON: &str = include_str!("../../data/ptitchef.json");

/// Parses the embedded ptitchef.com profile.
///
/// # Panics
///
/// Panics if the embedded JSON is malformed or one of its rules does not compile.
pub fn builtin_profile() -> SiteProfile {
    SiteProfile::from_json(PTITCHEF_PROFILE_JSON).expect("failed to parse builtin profile")
}

/// Loads the builtin profile registry.
pub fn load_builtin_registry() -> ProfileRegistry {
    let mut registry = ProfileRegistry::new();
    registry.register(builtin_profile());
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::profile::MatchFormat;

    #[test]
    fn load_builtin_registry_succeeds() {
        let registry = load_builtin_registry();
        assert!(!registry.is_empty());
    }

    #[test]
    fn builtin_registry_contains_ptitchef_aliases() {
        let registry = load_builtin_registry();
        for host in ["www.ptitchef.com", "ptitchef.com"] {
            let profile = registry.get(host).expect("ptitchef profile");
            assert_eq!(profile.site_source, "ptitchef.com");
        }
    }

    #[test]
    fn builtin_profile_keeps_selector_order() {
        let profile = builtin_profile();
        assert_eq!(profile.title.selectors.first().map(String::as_str), Some("h1.recipe-title"));
        assert_eq!(profile.ingredients.patterns.len(), 4);
        assert_eq!(profile.steps.selectors.len(), 7);
        assert_eq!(profile.start_urls.len(), 3);
        assert_eq!(profile.prep_time.format, MatchFormat::Duration);
        assert_eq!(
            profile.servings.format,
            MatchFormat::Suffix {
                value: " personnes".to_string()
            }
        );
    }
}
