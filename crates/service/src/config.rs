use std::str::FromStr;

use pagecraft_core::brandkit_apply::{ApplicationOptions, ConflictResolution};

/// Engine defaults loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Language used when a caller does not name one (default: `en`).
    pub default_language: String,
    /// Default conflict-resolution policy (default: `merge`).
    pub conflict_resolution: ConflictResolution,
    /// Default for `preserve_customizations` (default: `true`).
    pub preserve_customizations: bool,
    /// Default for `apply_responsive` (default: `true`).
    pub apply_responsive: bool,
    /// Upper bound on sections a single application may touch (default: `500`).
    pub max_sections_per_application: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            conflict_resolution: ConflictResolution::Merge,
            preserve_customizations: true,
            apply_responsive: true,
            max_sections_per_application: 500,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                            | Default |
    /// |------------------------------------|---------|
    /// | `DEFAULT_LANGUAGE`                 | `en`    |
    /// | `BRANDKIT_CONFLICT_POLICY`         | `merge` |
    /// | `BRANDKIT_PRESERVE_CUSTOMIZATIONS` | `true`  |
    /// | `BRANDKIT_APPLY_RESPONSIVE`        | `true`  |
    /// | `MAX_SECTIONS_PER_APPLICATION`     | `500`   |
    ///
    /// Unparsable values are logged and replaced by the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let default_language = lookup("DEFAULT_LANGUAGE")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.default_language);

        let conflict_resolution = match lookup("BRANDKIT_CONFLICT_POLICY") {
            Some(raw) => ConflictResolution::parse(raw.trim()).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring BRANDKIT_CONFLICT_POLICY");
                defaults.conflict_resolution
            }),
            None => defaults.conflict_resolution,
        };

        Self {
            default_language,
            conflict_resolution,
            preserve_customizations: parse_or(
                &lookup,
                "BRANDKIT_PRESERVE_CUSTOMIZATIONS",
                defaults.preserve_customizations,
            ),
            apply_responsive: parse_or(
                &lookup,
                "BRANDKIT_APPLY_RESPONSIVE",
                defaults.apply_responsive,
            ),
            max_sections_per_application: parse_or(
                &lookup,
                "MAX_SECTIONS_PER_APPLICATION",
                defaults.max_sections_per_application,
            ),
        }
    }

    /// Application options seeded from this configuration.
    pub fn default_options(&self) -> ApplicationOptions {
        ApplicationOptions {
            preserve_customizations: self.preserve_customizations,
            apply_responsive: self.apply_responsive,
            conflict_resolution: self.conflict_resolution,
            ..Default::default()
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparsable configuration value");
            default
        }),
        None => default,
    }
}
