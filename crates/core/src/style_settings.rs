//! Per-section style settings.
//!
//! Every field family is optional; `None` means "inherit / unset", never
//! zero. Families that have independent sub-fields (typography, spacing,
//! responsive) implement [`Composite`] so they can be merged sub-field by
//! sub-field.
//!
//! Whether the section author deliberately set a field is tracked
//! explicitly in [`StyleSettings::customized`] rather than inferred from
//! emptiness. A field can be customized and empty: the author cleared it on
//! purpose.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

/// A top-level style field family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleField {
    TextColor,
    Background,
    Typography,
    Spacing,
    Border,
    Shadow,
    Effects,
    Responsive,
}

impl StyleField {
    pub const ALL: [StyleField; 8] = [
        Self::TextColor,
        Self::Background,
        Self::Typography,
        Self::Spacing,
        Self::Border,
        Self::Shadow,
        Self::Effects,
        Self::Responsive,
    ];

    /// Wire name, as used in reports and persisted settings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextColor => "textColor",
            Self::Background => "background",
            Self::Typography => "typography",
            Self::Spacing => "spacing",
            Self::Border => "border",
            Self::Shadow => "shadow",
            Self::Effects => "effects",
            Self::Responsive => "responsive",
        }
    }
}

impl fmt::Display for StyleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Composite merging
// ---------------------------------------------------------------------------

/// A field family whose sub-fields merge independently.
pub trait Composite {
    /// True when no sub-field is set.
    fn is_unset(&self) -> bool;

    /// Fill every unset sub-field from `other`, keeping set ones.
    ///
    /// Returns the number of sub-fields that were filled.
    fn fill_from(&mut self, other: &Self) -> usize;
}

fn fill_option<T: Clone>(slot: &mut Option<T>, other: &Option<T>) -> usize {
    match (slot.is_none(), other) {
        (true, Some(v)) => {
            *slot = Some(v.clone());
            1
        }
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// Field families
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    Color,
    Gradient,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background {
    #[serde(rename = "type")]
    pub kind: BackgroundKind,
    pub value: String,
}

impl Background {
    pub fn color(value: impl Into<String>) -> Self {
        Self {
            kind: BackgroundKind::Color,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
}

impl Composite for TypographySettings {
    fn is_unset(&self) -> bool {
        self.heading_font.is_none()
            && self.body_font.is_none()
            && self.font_size.is_none()
            && self.line_height.is_none()
            && self.font_weight.is_none()
    }

    fn fill_from(&mut self, other: &Self) -> usize {
        fill_option(&mut self.heading_font, &other.heading_font)
            + fill_option(&mut self.body_font, &other.body_font)
            + fill_option(&mut self.font_size, &other.font_size)
            + fill_option(&mut self.line_height, &other.line_height)
            + fill_option(&mut self.font_weight, &other.font_weight)
    }
}

/// Four independent sides, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxSides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<u32>,
}

impl BoxSides {
    /// All four sides set to `v`.
    pub fn uniform(v: u32) -> Self {
        Self {
            top: Some(v),
            right: Some(v),
            bottom: Some(v),
            left: Some(v),
        }
    }

    /// Vertical sides `v`, horizontal sides `h`.
    pub fn symmetric(v: u32, h: u32) -> Self {
        Self {
            top: Some(v),
            right: Some(h),
            bottom: Some(v),
            left: Some(h),
        }
    }
}

impl Composite for BoxSides {
    fn is_unset(&self) -> bool {
        self.top.is_none() && self.right.is_none() && self.bottom.is_none() && self.left.is_none()
    }

    fn fill_from(&mut self, other: &Self) -> usize {
        fill_option(&mut self.top, &other.top)
            + fill_option(&mut self.right, &other.right)
            + fill_option(&mut self.bottom, &other.bottom)
            + fill_option(&mut self.left, &other.left)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacingSettings {
    #[serde(default, skip_serializing_if = "Composite::is_unset")]
    pub padding: BoxSides,
    #[serde(default, skip_serializing_if = "Composite::is_unset")]
    pub margin: BoxSides,
}

impl Composite for SpacingSettings {
    fn is_unset(&self) -> bool {
        self.padding.is_unset() && self.margin.is_unset()
    }

    fn fill_from(&mut self, other: &Self) -> usize {
        self.padding.fill_from(&other.padding) + self.margin.fill_from(&other.margin)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectsSettings {
    /// Opacity percentage, 0..=100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
}

/// Responsive breakpoints, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Sm,
    Md,
    Lg,
    Xl,
    #[serde(rename = "2xl")]
    Xxl,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsiveSettings {
    /// Max container width per breakpoint, as a CSS length.
    #[serde(default)]
    pub container_widths: BTreeMap<Breakpoint, String>,
}

impl Composite for ResponsiveSettings {
    fn is_unset(&self) -> bool {
        self.container_widths.is_empty()
    }

    fn fill_from(&mut self, other: &Self) -> usize {
        let mut filled = 0;
        for (bp, width) in &other.container_widths {
            if !self.container_widths.contains_key(bp) {
                self.container_widths.insert(*bp, width.clone());
                filled += 1;
            }
        }
        filled
    }
}

// ---------------------------------------------------------------------------
// StyleSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<TypographySettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<SpacingSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<BorderSettings>,
    /// CSS `box-shadow` value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<EffectsSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<ResponsiveSettings>,
    /// Fields the section author set (or cleared) deliberately.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub customized: BTreeSet<StyleField>,
}

impl StyleSettings {
    /// Whether `field` currently holds a non-empty value.
    pub fn is_set(&self, field: StyleField) -> bool {
        match field {
            StyleField::TextColor => self
                .text_color
                .as_deref()
                .is_some_and(|c| !c.trim().is_empty()),
            StyleField::Background => self
                .background
                .as_ref()
                .is_some_and(|b| !b.value.trim().is_empty()),
            StyleField::Typography => self.typography.as_ref().is_some_and(|t| !t.is_unset()),
            StyleField::Spacing => self.spacing.as_ref().is_some_and(|s| !s.is_unset()),
            StyleField::Border => self.border.as_ref().is_some_and(|b| *b != BorderSettings::default()),
            StyleField::Shadow => self.shadow.as_deref().is_some_and(|s| !s.trim().is_empty()),
            StyleField::Effects => self
                .effects
                .as_ref()
                .is_some_and(|e| *e != EffectsSettings::default()),
            StyleField::Responsive => self.responsive.as_ref().is_some_and(|r| !r.is_unset()),
        }
    }

    pub fn is_customized(&self, field: StyleField) -> bool {
        self.customized.contains(&field)
    }

    /// Record that the author deliberately set or cleared `field`.
    pub fn mark_customized(&mut self, field: StyleField) {
        self.customized.insert(field);
    }

    pub fn clear_customized(&mut self, field: StyleField) {
        self.customized.remove(&field);
    }

    /// JSON view of one field; `Null` when unset.
    pub fn field_value(&self, field: StyleField) -> Value {
        fn to_json<T: Serialize>(v: &Option<T>) -> Value {
            v.as_ref()
                .and_then(|v| serde_json::to_value(v).ok())
                .unwrap_or(Value::Null)
        }
        match field {
            StyleField::TextColor => to_json(&self.text_color),
            StyleField::Background => to_json(&self.background),
            StyleField::Typography => to_json(&self.typography),
            StyleField::Spacing => to_json(&self.spacing),
            StyleField::Border => to_json(&self.border),
            StyleField::Shadow => to_json(&self.shadow),
            StyleField::Effects => to_json(&self.effects),
            StyleField::Responsive => to_json(&self.responsive),
        }
    }
}

/// True when every value set in `before` survives unchanged in `after`.
///
/// Objects are compared key by key (recursively); anything else must be
/// equal. `Null` in `before` is trivially contained.
pub fn json_contains(after: &Value, before: &Value) -> bool {
    match (before, after) {
        (Value::Null, _) => true,
        (Value::Object(b), Value::Object(a)) => b
            .iter()
            .all(|(k, bv)| a.get(k).is_some_and(|av| json_contains(av, bv))),
        _ => before == after,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn box_sides_fill_only_unset() {
        let mut existing = BoxSides {
            top: Some(8),
            ..Default::default()
        };
        let filled = existing.fill_from(&BoxSides::uniform(4));
        assert_eq!(filled, 3);
        assert_eq!(
            existing,
            BoxSides {
                top: Some(8),
                right: Some(4),
                bottom: Some(4),
                left: Some(4),
            }
        );
        assert_eq!(existing.fill_from(&BoxSides::uniform(2)), 0);
    }

    #[test]
    fn spacing_fills_padding_and_margin_independently() {
        let mut existing = SpacingSettings {
            padding: BoxSides::uniform(10),
            margin: BoxSides::default(),
        };
        let derived = SpacingSettings {
            padding: BoxSides::uniform(1),
            margin: BoxSides::symmetric(0, 16),
        };
        assert_eq!(existing.fill_from(&derived), 4);
        assert_eq!(existing.padding, BoxSides::uniform(10));
        assert_eq!(existing.margin, BoxSides::symmetric(0, 16));
    }

    #[test]
    fn responsive_fills_missing_breakpoints() {
        let mut existing = ResponsiveSettings {
            container_widths: BTreeMap::from([(Breakpoint::Md, "700px".to_string())]),
        };
        let derived = ResponsiveSettings {
            container_widths: BTreeMap::from([
                (Breakpoint::Sm, "640px".to_string()),
                (Breakpoint::Md, "768px".to_string()),
            ]),
        };
        assert_eq!(existing.fill_from(&derived), 1);
        assert_eq!(existing.container_widths[&Breakpoint::Md], "700px");
        assert_eq!(existing.container_widths[&Breakpoint::Sm], "640px");
    }

    #[test]
    fn is_set_ignores_blank_and_empty_values() {
        let style = StyleSettings {
            text_color: Some("  ".into()),
            background: Some(Background::color("")),
            typography: Some(TypographySettings::default()),
            spacing: Some(SpacingSettings::default()),
            shadow: Some("0 1px 2px #000".into()),
            ..Default::default()
        };
        assert!(!style.is_set(StyleField::TextColor));
        assert!(!style.is_set(StyleField::Background));
        assert!(!style.is_set(StyleField::Typography));
        assert!(!style.is_set(StyleField::Spacing));
        assert!(!style.is_set(StyleField::Border));
        assert!(style.is_set(StyleField::Shadow));
    }

    #[test]
    fn customized_flag_is_independent_of_value() {
        let mut style = StyleSettings::default();
        style.mark_customized(StyleField::Background);
        assert!(style.is_customized(StyleField::Background));
        assert!(!style.is_set(StyleField::Background));
        style.clear_customized(StyleField::Background);
        assert!(!style.is_customized(StyleField::Background));
    }

    #[test]
    fn serde_uses_camel_case_and_skips_unset() {
        let mut style = StyleSettings {
            text_color: Some("#111111".into()),
            spacing: Some(SpacingSettings {
                padding: BoxSides {
                    top: Some(8),
                    ..Default::default()
                },
                margin: BoxSides::default(),
            }),
            ..Default::default()
        };
        style.mark_customized(StyleField::TextColor);
        assert_eq!(
            serde_json::to_value(&style).unwrap(),
            json!({
                "textColor": "#111111",
                "spacing": {"padding": {"top": 8}},
                "customized": ["textColor"]
            })
        );
    }

    #[test]
    fn deserializes_background_and_breakpoints() {
        let style: StyleSettings = serde_json::from_value(json!({
            "background": {"type": "gradient", "value": "linear-gradient(#fff, #000)"},
            "responsive": {"containerWidths": {"sm": "640px", "2xl": "1536px"}}
        }))
        .unwrap();
        assert_eq!(
            style.background.as_ref().unwrap().kind,
            BackgroundKind::Gradient
        );
        let widths = &style.responsive.as_ref().unwrap().container_widths;
        assert_eq!(widths[&Breakpoint::Xxl], "1536px");
    }

    #[test]
    fn field_value_is_null_when_unset() {
        let style = StyleSettings::default();
        for field in StyleField::ALL {
            assert_eq!(style.field_value(field), Value::Null);
        }
    }

    #[test]
    fn json_contains_checks_author_values_survive() {
        let before = json!({"padding": {"top": 8}});
        let filled = json!({"padding": {"top": 8, "left": 4}});
        let replaced = json!({"padding": {"top": 4, "left": 4}});
        assert!(json_contains(&filled, &before));
        assert!(!json_contains(&replaced, &before));
        assert!(json_contains(&json!("#fff"), &Value::Null));
        assert!(!json_contains(&json!("#fff"), &json!("#000")));
    }
}
