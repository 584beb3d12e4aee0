//! Brandkit application: merging design tokens into section style settings.
//!
//! For every section in scope, a style fragment is derived from the
//! brandkit according to the section type's theme, then merged into the
//! section's existing settings under a [`ConflictResolution`] policy:
//!
//! - `overwrite`: the derived value always replaces the existing one.
//! - `skip`: set fields are left alone; unset fields are filled.
//! - `merge`: like `skip` for scalar fields; composite fields (typography,
//!   spacing, responsive) are filled sub-field by sub-field.
//!
//! With `preserve_customizations`, fields flagged as customized by the
//! section author are never touched.
//!
//! [`apply_brandkit`] is a pure function of its inputs. Callers persist the
//! returned sections unless `dry_run` is set.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::brandkit::{Brandkit, ColorRole, ColorToken, FontRole, ShadeStep};
use crate::error::CoreError;
use crate::section::{find_section, Section, SectionType};
use crate::style_settings::{
    json_contains, Background, Composite, ResponsiveSettings, SpacingSettings, StyleField,
    StyleSettings, TypographySettings,
};
use crate::types::SectionId;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How brandkit values interact with values already present on a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictResolution {
    Overwrite,
    #[default]
    Merge,
    Skip,
}

impl ConflictResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Merge => "merge",
            Self::Skip => "skip",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "overwrite" => Ok(Self::Overwrite),
            "merge" => Ok(Self::Merge),
            "skip" => Ok(Self::Skip),
            _ => Err(CoreError::Validation(format!(
                "Invalid conflict resolution '{s}'. Must be one of: overwrite, merge, skip"
            ))),
        }
    }
}

impl fmt::Display for ConflictResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationOptions {
    /// Sections to apply to. `None` or an empty list means every section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_ids: Option<Vec<SectionId>>,
    pub preserve_customizations: bool,
    pub apply_colors: bool,
    pub apply_typography: bool,
    pub apply_spacing: bool,
    pub apply_responsive: bool,
    pub conflict_resolution: ConflictResolution,
    pub dry_run: bool,
}

impl Default for ApplicationOptions {
    fn default() -> Self {
        Self {
            section_ids: None,
            preserve_customizations: true,
            apply_colors: true,
            apply_typography: true,
            apply_spacing: true,
            apply_responsive: true,
            conflict_resolution: ConflictResolution::Merge,
            dry_run: false,
        }
    }
}

impl ApplicationOptions {
    /// Restrict application to the given section ids.
    pub fn scoped<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SectionId>,
    {
        self.section_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_policy(mut self, policy: ConflictResolution) -> Self {
        self.conflict_resolution = policy;
        self
    }

    fn scope(&self) -> Option<&[SectionId]> {
        self.section_ids.as_deref().filter(|ids| !ids.is_empty())
    }

    fn any_family_enabled(&self) -> bool {
        self.apply_colors || self.apply_typography || self.apply_spacing || self.apply_responsive
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionChange {
    pub section_id: SectionId,
    pub changed_fields: Vec<StyleField>,
    pub skipped_fields: Vec<StyleField>,
}

impl SectionChange {
    fn new(section_id: &str) -> Self {
        Self {
            section_id: section_id.to_string(),
            changed_fields: Vec::new(),
            skipped_fields: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.changed_fields.is_empty() && self.skipped_fields.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResult {
    /// False only when nothing was in scope.
    pub success: bool,
    /// One entry per in-scope section that had at least one field changed or skipped.
    pub changed_sections: Vec<SectionChange>,
    pub warnings: Vec<String>,
}

impl ApplicationResult {
    pub fn section(&self, section_id: &str) -> Option<&SectionChange> {
        self.changed_sections
            .iter()
            .find(|c| c.section_id == section_id)
    }

    /// Total number of changed fields across all sections.
    pub fn changed_field_count(&self) -> usize {
        self.changed_sections
            .iter()
            .map(|c| c.changed_fields.len())
            .sum()
    }
}

/// Output of [`apply_brandkit`].
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    /// The full section list, in input order, with in-scope sections updated.
    pub sections: Vec<Section>,
    pub result: ApplicationResult,
}

// ---------------------------------------------------------------------------
// Section themes
// ---------------------------------------------------------------------------

/// Which brandkit tokens feed a section type's derived style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionTheme {
    pub background: ColorToken,
    pub text: ColorToken,
    /// Type-scale step for body text.
    pub type_step: &'static str,
    pub spacing_preset: &'static str,
}

const fn token(role: ColorRole, shade: u16) -> ColorToken {
    ColorToken {
        role,
        shade: ShadeStep::fixed(shade),
    }
}

pub fn section_theme(section_type: SectionType) -> SectionTheme {
    match section_type {
        SectionType::Hero => SectionTheme {
            background: token(ColorRole::Primary, 600),
            text: token(ColorRole::Neutral, 50),
            type_step: "xl",
            spacing_preset: "hero",
        },
        SectionType::Header => SectionTheme {
            background: token(ColorRole::Neutral, 50),
            text: token(ColorRole::Neutral, 900),
            type_step: "base",
            spacing_preset: "compact",
        },
        SectionType::Footer => SectionTheme {
            background: token(ColorRole::Neutral, 900),
            text: token(ColorRole::Neutral, 100),
            type_step: "sm",
            spacing_preset: "compact",
        },
        SectionType::Cta => SectionTheme {
            background: token(ColorRole::Accent, 500),
            text: token(ColorRole::Neutral, 50),
            type_step: "lg",
            spacing_preset: "section",
        },
        SectionType::Features
        | SectionType::Content
        | SectionType::Testimonials
        | SectionType::Pricing
        | SectionType::Gallery
        | SectionType::Contact
        | SectionType::Custom => SectionTheme {
            background: token(ColorRole::Neutral, 50),
            text: token(ColorRole::Neutral, 800),
            type_step: "base",
            spacing_preset: "section",
        },
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// The style fragment a brandkit contributes to one section.
///
/// A `None` field is not applied: either its family is switched off or the
/// brandkit lacks the tokens for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedStyle {
    pub text_color: Option<String>,
    pub background: Option<Background>,
    pub typography: Option<TypographySettings>,
    pub spacing: Option<SpacingSettings>,
    pub responsive: Option<ResponsiveSettings>,
}

/// Derive the brandkit fragment for `section`.
///
/// Missing tokens never abort: the affected field is left out and a
/// warning is appended.
pub fn derive_section_style(
    section: &Section,
    brandkit: &Brandkit,
    options: &ApplicationOptions,
    warnings: &mut Vec<String>,
) -> DerivedStyle {
    let theme = section_theme(section.section_type);
    let mut missing = |what: String, field: StyleField| {
        warnings.push(format!(
            "Section '{}': brandkit '{}' has no {what}; {field} not applied",
            section.id, brandkit.name
        ));
    };
    let mut derived = DerivedStyle::default();

    if options.apply_colors {
        match brandkit.color(theme.text) {
            Some(hex) => derived.text_color = Some(hex.to_string()),
            None => missing(format!("color token {}", theme.text), StyleField::TextColor),
        }
        match brandkit.color(theme.background) {
            Some(hex) => derived.background = Some(Background::color(hex)),
            None => missing(
                format!("color token {}", theme.background),
                StyleField::Background,
            ),
        }
    }

    if options.apply_typography {
        let mut typography = TypographySettings {
            heading_font: brandkit.font_family(FontRole::Heading).map(str::to_string),
            body_font: brandkit.font_family(FontRole::Body).map(str::to_string),
            ..Default::default()
        };
        if let Some(step) = brandkit.type_step(theme.type_step) {
            typography.font_size = Some(step.font_size.clone());
            typography.line_height = Some(step.line_height.clone());
            typography.font_weight = step.font_weight;
        }
        if typography.is_unset() {
            missing(
                format!("font families or type step '{}'", theme.type_step),
                StyleField::Typography,
            );
        } else {
            derived.typography = Some(typography);
        }
    }

    if options.apply_spacing {
        match brandkit.spacing_preset(theme.spacing_preset) {
            Some(preset) => {
                let spacing = SpacingSettings {
                    padding: preset.padding,
                    margin: preset.margin,
                };
                if spacing.is_unset() {
                    missing(
                        format!("values in spacing preset '{}'", theme.spacing_preset),
                        StyleField::Spacing,
                    );
                } else {
                    derived.spacing = Some(spacing);
                }
            }
            None => missing(
                format!("spacing preset '{}'", theme.spacing_preset),
                StyleField::Spacing,
            ),
        }
    }

    if options.apply_responsive {
        if brandkit.spacing.containers.is_empty() {
            missing("container widths".to_string(), StyleField::Responsive);
        } else {
            derived.responsive = Some(ResponsiveSettings {
                container_widths: brandkit.spacing.containers.clone(),
            });
        }
    }

    derived
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Changed,
    Skipped,
}

fn merge_scalar<T: Clone>(
    slot: &mut Option<T>,
    derived: &T,
    was_set: bool,
    policy: ConflictResolution,
) -> Outcome {
    if was_set && policy != ConflictResolution::Overwrite {
        return Outcome::Skipped;
    }
    *slot = Some(derived.clone());
    Outcome::Changed
}

fn merge_composite<T: Composite + Clone>(
    slot: &mut Option<T>,
    derived: &T,
    was_set: bool,
    policy: ConflictResolution,
) -> Outcome {
    match (policy, slot.as_mut()) {
        (ConflictResolution::Skip, _) if was_set => Outcome::Skipped,
        (ConflictResolution::Merge, Some(existing)) if was_set => {
            if existing.fill_from(derived) > 0 {
                Outcome::Changed
            } else {
                Outcome::Skipped
            }
        }
        _ => {
            *slot = Some(derived.clone());
            Outcome::Changed
        }
    }
}

struct SectionMerge<'a> {
    section_id: &'a str,
    options: &'a ApplicationOptions,
    style: &'a mut StyleSettings,
    change: SectionChange,
    warnings: &'a mut Vec<String>,
}

impl SectionMerge<'_> {
    fn apply(
        &mut self,
        field: StyleField,
        merge: impl FnOnce(&mut StyleSettings, bool, ConflictResolution) -> Outcome,
    ) {
        if self.options.preserve_customizations && self.style.is_customized(field) {
            self.change.skipped_fields.push(field);
            self.warnings.push(format!(
                "Section '{}': preserved customized field '{field}'",
                self.section_id
            ));
            return;
        }

        let policy = self.options.conflict_resolution;
        let was_set = self.style.is_set(field);
        match merge(self.style, was_set, policy) {
            Outcome::Changed => {
                // The author's value (or deliberate blank) is gone; the flag goes with it.
                if !was_set || policy == ConflictResolution::Overwrite {
                    self.style.clear_customized(field);
                }
                self.change.changed_fields.push(field);
            }
            Outcome::Skipped => self.change.skipped_fields.push(field),
        }
    }
}

fn merge_into_section(
    section: &mut Section,
    derived: &DerivedStyle,
    options: &ApplicationOptions,
    warnings: &mut Vec<String>,
) -> SectionChange {
    let mut m = SectionMerge {
        section_id: &section.id,
        options,
        style: &mut section.style_settings,
        change: SectionChange::new(&section.id),
        warnings,
    };

    if let Some(color) = &derived.text_color {
        m.apply(StyleField::TextColor, |s, set, p| {
            merge_scalar(&mut s.text_color, color, set, p)
        });
    }
    if let Some(background) = &derived.background {
        m.apply(StyleField::Background, |s, set, p| {
            merge_scalar(&mut s.background, background, set, p)
        });
    }
    if let Some(typography) = &derived.typography {
        m.apply(StyleField::Typography, |s, set, p| {
            merge_composite(&mut s.typography, typography, set, p)
        });
    }
    if let Some(spacing) = &derived.spacing {
        m.apply(StyleField::Spacing, |s, set, p| {
            merge_composite(&mut s.spacing, spacing, set, p)
        });
    }
    if let Some(responsive) = &derived.responsive {
        m.apply(StyleField::Responsive, |s, set, p| {
            merge_composite(&mut s.responsive, responsive, set, p)
        });
    }

    m.change
}

/// Apply `brandkit` to the in-scope `sections`.
///
/// Out-of-scope sections are returned unchanged and do not appear in the
/// result. The input slice is never modified.
pub fn apply_brandkit(
    sections: &[Section],
    brandkit: &Brandkit,
    options: &ApplicationOptions,
) -> Application {
    let mut warnings = Vec::new();
    let scope = options.scope();

    if !brandkit.is_active {
        warnings.push(format!("Brandkit '{}' is inactive", brandkit.name));
    }
    if !options.any_family_enabled() {
        warnings.push("No field families selected; nothing to apply".to_string());
    }
    if let Some(ids) = scope {
        for id in ids {
            if find_section(sections, id).is_none() {
                warnings.push(format!("Section '{id}' not found; skipped"));
            }
        }
    }

    let mut updated = sections.to_vec();
    let mut changed_sections = Vec::new();
    let mut in_scope = 0usize;

    for section in &mut updated {
        if scope.is_some_and(|ids| !ids.contains(&section.id)) {
            continue;
        }
        in_scope += 1;
        let derived = derive_section_style(section, brandkit, options, &mut warnings);
        let change = merge_into_section(section, &derived, options, &mut warnings);
        if !change.is_empty() {
            changed_sections.push(change);
        }
    }

    if in_scope == 0 {
        warnings.push("No sections in scope".to_string());
    }

    Application {
        sections: updated,
        result: ApplicationResult {
            success: in_scope > 0,
            changed_sections,
            warnings,
        },
    }
}

// ---------------------------------------------------------------------------
// Dry run
// ---------------------------------------------------------------------------

/// [`apply_brandkit`] with `dry_run` forced on, returning only the report.
pub fn preview_brandkit(
    sections: &[Section],
    brandkit: &Brandkit,
    options: &ApplicationOptions,
) -> ApplicationResult {
    let options = ApplicationOptions {
        dry_run: true,
        ..options.clone()
    };
    apply_brandkit(sections, brandkit, &options).result
}

/// A single field that an application would change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDiff {
    pub section_id: SectionId,
    pub field: StyleField,
    pub current_value: Value,
    pub brandkit_value: Value,
}

/// Full dry-run report: the result plus what exactly would change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewReport {
    pub result: ApplicationResult,
    pub diffs: Vec<StyleDiff>,
    /// `<sectionId>.<field>` for every customized field that would be lost.
    pub lost_customizations: Vec<String>,
}

pub fn preview_brandkit_report(
    sections: &[Section],
    brandkit: &Brandkit,
    options: &ApplicationOptions,
) -> PreviewReport {
    let options = ApplicationOptions {
        dry_run: true,
        ..options.clone()
    };
    let application = apply_brandkit(sections, brandkit, &options);

    let mut diffs = Vec::new();
    for (before, after, change) in changed_pairs(sections, &application) {
        for &field in &change.changed_fields {
            let current_value = before.style_settings.field_value(field);
            let brandkit_value = after.style_settings.field_value(field);
            if current_value != brandkit_value {
                diffs.push(StyleDiff {
                    section_id: change.section_id.clone(),
                    field,
                    current_value,
                    brandkit_value,
                });
            }
        }
    }

    let lost_customizations = lost_customizations(sections, &application)
        .into_iter()
        .map(|(id, field)| format!("{id}.{field}"))
        .collect();

    PreviewReport {
        result: application.result,
        diffs,
        lost_customizations,
    }
}

/// Pairs each reported section with its before/after state.
fn changed_pairs<'a>(
    before: &'a [Section],
    application: &'a Application,
) -> impl Iterator<Item = (&'a Section, &'a Section, &'a SectionChange)> {
    application
        .result
        .changed_sections
        .iter()
        .filter_map(move |change| {
            let b = find_section(before, &change.section_id)?;
            let a = find_section(&application.sections, &change.section_id)?;
            Some((b, a, change))
        })
}

/// Customized fields whose author value would not survive `application`.
///
/// A customized field is lost when a set value is replaced rather than
/// extended, or when a deliberately cleared field gets filled.
pub(crate) fn lost_customizations<'a>(
    before: &'a [Section],
    application: &'a Application,
) -> Vec<(&'a str, StyleField)> {
    let mut lost = Vec::new();
    for (b, a, change) in changed_pairs(before, application) {
        for &field in &change.changed_fields {
            if !b.style_settings.is_customized(field) {
                continue;
            }
            let old = b.style_settings.field_value(field);
            let new = a.style_settings.field_value(field);
            let is_lost = if old.is_null() {
                !new.is_null()
            } else {
                !json_contains(&new, &old)
            };
            if is_lost {
                lost.push((change.section_id.as_str(), field));
            }
        }
    }
    lost
}
