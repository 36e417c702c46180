//! Built-in page variants.

use crate::config::{ConfigError, SiteConfig};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// The preset used when neither a preset nor a config file is given.
pub const DEFAULT_PRESET: &str = "academy";

/// Embedded preset sources, keyed by name.
static PRESETS: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("academy", include_str!("presets/academy.yaml")),
        ("academy-headline", include_str!("presets/academy-headline.yaml")),
        ("minimal", include_str!("presets/minimal.yaml")),
    ])
});

/// The names of all built-in presets, sorted.
pub fn names() -> impl Iterator<Item = &'static str> {
    PRESETS.keys().copied()
}

/// Load a built-in preset by name.
pub fn load(name: &str) -> Result<SiteConfig, ConfigError> {
    let source = PRESETS.get(name).ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?;
    SiteConfig::from_yaml(source)
}
