//! Brandkit design-token model and validation.
//!
//! A brandkit bundles color scales, a typography scale and spacing presets.
//! Tokens are addressed by role and step, e.g. `primary.500` for a color or
//! `lg` for a type-scale step.
//!
//! The "exactly one default brandkit" rule is a persistence invariant: the
//! store unsets the previous default and sets the new one in a single
//! transaction. The helpers at the bottom of this module only check it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::style_settings::{BoxSides, Breakpoint};
use crate::types::{DbId, Timestamp};

/// `#rgb`, `#rrggbb` or `#rrggbbaa`.
static HEX_COLOR_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").expect("valid regex")
});

/// Maximum length for a brandkit name.
pub const MAX_BRANDKIT_NAME_LEN: usize = 100;

/* --------------------------------------------------------------------------
   Colors
   -------------------------------------------------------------------------- */

/// Semantic color role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorRole {
    Primary,
    Secondary,
    Accent,
    Neutral,
    Success,
    Warning,
    Error,
}

impl ColorRole {
    pub const ALL: [ColorRole; 7] = [
        Self::Primary,
        Self::Secondary,
        Self::Accent,
        Self::Neutral,
        Self::Success,
        Self::Warning,
        Self::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Accent => "accent",
            Self::Neutral => "neutral",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown color role '{s}'. Must be one of: primary, secondary, accent, neutral, success, warning, error"
                ))
            })
    }
}

impl fmt::Display for ColorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A shade step within a color scale: 0, 50, 100, 200 … 900, 950.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct ShadeStep(u16);

impl ShadeStep {
    pub const ALLOWED: [u16; 12] = [0, 50, 100, 200, 300, 400, 500, 600, 700, 800, 900, 950];

    pub fn new(step: u16) -> Result<Self, CoreError> {
        if Self::ALLOWED.contains(&step) {
            Ok(Self(step))
        } else {
            Err(CoreError::Validation(format!(
                "Invalid shade step {step}. Must be one of: 0, 50, 100, 200, 300, 400, 500, 600, 700, 800, 900, 950"
            )))
        }
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// For compile-time token tables; `step` must be in [`Self::ALLOWED`].
    pub(crate) const fn fixed(step: u16) -> Self {
        Self(step)
    }
}

impl TryFrom<u16> for ShadeStep {
    type Error = CoreError;

    fn try_from(step: u16) -> Result<Self, Self::Error> {
        Self::new(step)
    }
}

impl From<ShadeStep> for u16 {
    fn from(step: ShadeStep) -> Self {
        step.0
    }
}

impl fmt::Display for ShadeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shade step → hex color.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorScale(pub BTreeMap<ShadeStep, String>);

impl ColorScale {
    pub fn get(&self, step: ShadeStep) -> Option<&str> {
        self.0.get(&step).map(String::as_str)
    }
}

impl<const N: usize> From<[(u16, &str); N]> for ColorScale {
    /// Build a scale from literal pairs. Disallowed steps are dropped.
    fn from(pairs: [(u16, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .filter_map(|(step, hex)| ShadeStep::new(step).ok().map(|s| (s, hex.to_string())))
                .collect(),
        )
    }
}

/// Reference to a single color token, written `role.shade`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorToken {
    pub role: ColorRole,
    pub shade: ShadeStep,
}

impl ColorToken {
    pub fn new(role: ColorRole, shade: u16) -> Result<Self, CoreError> {
        Ok(Self {
            role,
            shade: ShadeStep::new(shade)?,
        })
    }

    /// Parse `primary.500`.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let (role, shade) = s.split_once('.').ok_or_else(|| {
            CoreError::Validation(format!("Invalid color token '{s}'. Expected 'role.shade'"))
        })?;
        let shade: u16 = shade.parse().map_err(|_| {
            CoreError::Validation(format!("Invalid shade '{shade}' in color token '{s}'"))
        })?;
        Self::new(ColorRole::parse(role)?, shade)
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.role, self.shade)
    }
}

/* --------------------------------------------------------------------------
   Typography
   -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontRole {
    Heading,
    Body,
    Mono,
}

impl fmt::Display for FontRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Heading => "heading",
            Self::Body => "body",
            Self::Mono => "mono",
        })
    }
}

/// One step of the type scale (`xs`, `sm`, `base`, `lg`, `xl`, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStep {
    pub font_size: String,
    pub line_height: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandkitTypography {
    #[serde(default)]
    pub font_families: BTreeMap<FontRole, String>,
    #[serde(default)]
    pub scale: BTreeMap<String, TypeStep>,
}

/* --------------------------------------------------------------------------
   Spacing
   -------------------------------------------------------------------------- */

/// Named padding/margin pair for a kind of component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacingPreset {
    #[serde(default)]
    pub padding: BoxSides,
    #[serde(default)]
    pub margin: BoxSides,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandkitSpacing {
    /// Spacing scale in pixels, keyed by step name (`xs` … `3xl`).
    #[serde(default)]
    pub scale: BTreeMap<String, u32>,
    /// Component presets (`hero`, `section`, `compact`, …).
    #[serde(default)]
    pub presets: BTreeMap<String, SpacingPreset>,
    /// Container max width per breakpoint.
    #[serde(default)]
    pub containers: BTreeMap<Breakpoint, String>,
}

/* --------------------------------------------------------------------------
   Brandkit
   -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandkitAssets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brandkit {
    pub id: DbId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub colors: BTreeMap<ColorRole, ColorScale>,
    #[serde(default)]
    pub typography: BrandkitTypography,
    #[serde(default)]
    pub spacing: BrandkitSpacing,
    #[serde(default)]
    pub assets: BrandkitAssets,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_default: bool,
    /// Incremented on every edit; token values are immutable per version.
    #[serde(default = "default_version")]
    pub version: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

fn default_true() -> bool {
    true
}

fn default_version() -> i32 {
    1
}

impl Brandkit {
    /// An active, non-default brandkit with no tokens.
    pub fn new(id: DbId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            colors: BTreeMap::new(),
            typography: BrandkitTypography::default(),
            spacing: BrandkitSpacing::default(),
            assets: BrandkitAssets::default(),
            is_active: true,
            is_default: false,
            version: 1,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn color(&self, token: ColorToken) -> Option<&str> {
        self.colors.get(&token.role).and_then(|s| s.get(token.shade))
    }

    /// Look up a `role.shade` reference. Malformed references resolve to `None`.
    pub fn resolve_color_ref(&self, reference: &str) -> Option<&str> {
        ColorToken::parse(reference)
            .ok()
            .and_then(|token| self.color(token))
    }

    pub fn font_family(&self, role: FontRole) -> Option<&str> {
        self.typography.font_families.get(&role).map(String::as_str)
    }

    pub fn type_step(&self, step: &str) -> Option<&TypeStep> {
        self.typography.scale.get(step)
    }

    pub fn spacing_preset(&self, name: &str) -> Option<&SpacingPreset> {
        self.spacing.presets.get(name)
    }
}

/* --------------------------------------------------------------------------
   Validation
   -------------------------------------------------------------------------- */

/// Validate a brandkit name: non-empty after trimming and within the limit.
pub fn validate_brandkit_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Brandkit name must not be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_BRANDKIT_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Brandkit name too long: {} chars (max {MAX_BRANDKIT_NAME_LEN})",
            trimmed.len()
        )));
    }
    Ok(())
}

pub fn validate_hex_color(value: &str) -> Result<(), CoreError> {
    if HEX_COLOR_RE.is_match(value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid hex color '{value}'. Expected #rgb, #rrggbb or #rrggbbaa"
        )))
    }
}

/// Validate a brandkit before it is written.
pub fn validate_brandkit(brandkit: &Brandkit) -> Result<(), CoreError> {
    validate_brandkit_name(&brandkit.name)?;

    for (role, scale) in &brandkit.colors {
        for (step, hex) in &scale.0 {
            validate_hex_color(hex).map_err(|_| {
                CoreError::Validation(format!(
                    "Invalid hex color '{hex}' for token {role}.{step}"
                ))
            })?;
        }
    }

    for (name, step) in &brandkit.typography.scale {
        if step.font_size.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Type step '{name}' must have a font size"
            )));
        }
    }

    if brandkit.spacing.presets.keys().any(|k| k.trim().is_empty()) {
        return Err(CoreError::Validation(
            "Spacing preset names must not be empty".to_string(),
        ));
    }

    if brandkit.is_default && !brandkit.is_active {
        return Err(CoreError::Validation(
            "The default brandkit must be active".to_string(),
        ));
    }

    Ok(())
}

/* --------------------------------------------------------------------------
   Default brandkit invariant
   -------------------------------------------------------------------------- */

/// Reject deletion of the default brandkit.
pub fn ensure_deletable(brandkit: &Brandkit) -> Result<(), CoreError> {
    if brandkit.is_default {
        return Err(CoreError::Conflict(format!(
            "Brandkit '{}' is the default and cannot be deleted",
            brandkit.name
        )));
    }
    Ok(())
}

/// The current default brandkit, if any.
pub fn find_default(brandkits: &[Brandkit]) -> Option<&Brandkit> {
    brandkits.iter().find(|b| b.is_default)
}

/// Check that at most one brandkit is flagged default.
pub fn validate_single_default(brandkits: &[Brandkit]) -> Result<(), CoreError> {
    let defaults: Vec<DbId> = brandkits
        .iter()
        .filter(|b| b.is_default)
        .map(|b| b.id)
        .collect();
    if defaults.len() > 1 {
        return Err(CoreError::Conflict(format!(
            "Multiple default brandkits: {defaults:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn sample() -> Brandkit {
        let mut kit = Brandkit::new(1, "Acme");
        kit.colors.insert(
            ColorRole::Primary,
            ColorScale::from([(50, "#eff6ff"), (500, "#3b82f6"), (600, "#2563eb")]),
        );
        kit.typography
            .font_families
            .insert(FontRole::Heading, "Inter".into());
        kit.typography.scale.insert(
            "lg".into(),
            TypeStep {
                font_size: "1.125rem".into(),
                line_height: "1.75rem".into(),
                font_weight: None,
            },
        );
        kit
    }

    // --- Tokens ---

    #[test]
    fn color_token_parse_and_display() {
        let token = ColorToken::parse("primary.500").unwrap();
        assert_eq!(token.role, ColorRole::Primary);
        assert_eq!(token.shade.value(), 500);
        assert_eq!(token.to_string(), "primary.500");
    }

    #[test]
    fn color_token_parse_rejects_bad_input() {
        assert_matches!(ColorToken::parse("primary"), Err(CoreError::Validation(_)));
        assert!(ColorToken::parse("brand.500").is_err());
        assert!(ColorToken::parse("primary.550").is_err());
        assert!(ColorToken::parse("primary.x").is_err());
    }

    #[test]
    fn color_lookup() {
        let kit = sample();
        assert_eq!(kit.resolve_color_ref("primary.600"), Some("#2563eb"));
        assert_eq!(kit.resolve_color_ref("primary.900"), None);
        assert_eq!(kit.resolve_color_ref("accent.500"), None);
        assert_eq!(kit.resolve_color_ref("nonsense"), None);
    }

    #[test]
    fn color_scale_from_drops_disallowed_steps() {
        let scale = ColorScale::from([(0, "#ffffff"), (75, "#eeeeee")]);
        assert_eq!(scale.0.len(), 1);
        assert_eq!(scale.get(ShadeStep::new(0).unwrap()), Some("#ffffff"));
    }

    // --- Serde ---

    #[test]
    fn deserializes_wire_shape() {
        let kit: Brandkit = serde_json::from_value(json!({
            "id": 7,
            "name": "Ocean",
            "colors": {"primary": {"0": "#ffffff", "500": "#0ea5e9"}},
            "typography": {
                "fontFamilies": {"body": "Source Sans"},
                "scale": {"base": {"fontSize": "1rem", "lineHeight": "1.5rem"}}
            },
            "spacing": {
                "presets": {"section": {"padding": {"top": 64, "bottom": 64}}},
                "containers": {"lg": "1024px"}
            },
            "isDefault": true
        }))
        .unwrap();
        assert!(kit.is_active);
        assert!(kit.is_default);
        assert_eq!(kit.version, 1);
        assert_eq!(kit.resolve_color_ref("primary.0"), Some("#ffffff"));
        assert_eq!(kit.font_family(FontRole::Body), Some("Source Sans"));
        assert_eq!(kit.spacing_preset("section").unwrap().padding.top, Some(64));
        assert_eq!(kit.spacing.containers[&Breakpoint::Lg], "1024px");
    }

    #[test]
    fn deserialize_rejects_unknown_shade() {
        let result: Result<Brandkit, _> = serde_json::from_value(json!({
            "id": 1,
            "name": "Bad",
            "colors": {"primary": {"550": "#000000"}}
        }));
        assert!(result.is_err());
    }

    // --- Validation ---

    #[test]
    fn validate_brandkit_accepts_sample() {
        assert!(validate_brandkit(&sample()).is_ok());
    }

    #[test]
    fn validate_brandkit_rejects_bad_hex() {
        let mut kit = sample();
        kit.colors
            .insert(ColorRole::Accent, ColorScale::from([(500, "orange")]));
        let err = validate_brandkit(&kit).unwrap_err();
        assert!(err.to_string().contains("accent.500"));
    }

    #[test]
    fn validate_brandkit_name_rules() {
        assert!(validate_brandkit_name("   ").is_err());
        let long = "n".repeat(MAX_BRANDKIT_NAME_LEN + 1);
        assert!(validate_brandkit_name(&long).unwrap_err().to_string().contains("too long"));
    }

    #[test]
    fn hex_color_formats() {
        assert!(validate_hex_color("#fff").is_ok());
        assert!(validate_hex_color("#A1B2C3").is_ok());
        assert!(validate_hex_color("#a1b2c3d4").is_ok());
        assert!(validate_hex_color("#abcd").is_err());
        assert!(validate_hex_color("fff").is_err());
    }

    #[test]
    fn default_must_be_active() {
        let mut kit = sample();
        kit.is_default = true;
        kit.is_active = false;
        assert!(validate_brandkit(&kit).is_err());
    }

    // --- Default invariant ---

    #[test]
    fn default_brandkit_cannot_be_deleted() {
        let mut kit = sample();
        assert!(ensure_deletable(&kit).is_ok());
        kit.is_default = true;
        assert_matches!(ensure_deletable(&kit), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn single_default_check() {
        let mut a = Brandkit::new(1, "A");
        let mut b = Brandkit::new(2, "B");
        assert!(validate_single_default(&[a.clone(), b.clone()]).is_ok());
        assert!(find_default(&[a.clone(), b.clone()]).is_none());
        a.is_default = true;
        assert_eq!(find_default(&[a.clone(), b.clone()]).map(|k| k.id), Some(1));
        b.is_default = true;
        assert_matches!(validate_single_default(&[a, b]), Err(CoreError::Conflict(_)));
    }
}
