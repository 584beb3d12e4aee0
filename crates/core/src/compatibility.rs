//! Pre-commit compatibility check between a brandkit and a page.
//!
//! Runs brandkit application as a dry run and reports every customized
//! field the intended application would destroy, plus policies that would
//! avoid the loss.

use serde::{Deserialize, Serialize};

use crate::brandkit::Brandkit;
use crate::brandkit_apply::{apply_brandkit, lost_customizations, ApplicationOptions, ConflictResolution};
use crate::section::Section;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub compatible: bool,
    /// One `"<sectionId>.<field> would be overwritten"` entry per lost field.
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Check `brandkit` against `sections` assuming the most destructive intent:
/// every field family, `overwrite`, customizations not preserved.
pub fn validate_compatibility(sections: &[Section], brandkit: &Brandkit) -> CompatibilityReport {
    let intended = ApplicationOptions {
        preserve_customizations: false,
        conflict_resolution: ConflictResolution::Overwrite,
        ..Default::default()
    };
    validate_compatibility_for(sections, brandkit, &intended)
}

/// Check `brandkit` against `sections` under the caller's intended options.
pub fn validate_compatibility_for(
    sections: &[Section],
    brandkit: &Brandkit,
    intended: &ApplicationOptions,
) -> CompatibilityReport {
    let issues: Vec<String> = lost_fields(sections, brandkit, intended)
        .into_iter()
        .map(|field| format!("{field} would be overwritten"))
        .collect();

    let mut suggestions = Vec::new();
    if !issues.is_empty() {
        if intended.conflict_resolution == ConflictResolution::Overwrite {
            for policy in [ConflictResolution::Skip, ConflictResolution::Merge] {
                let alternative = intended.clone().with_policy(policy);
                if lost_fields(sections, brandkit, &alternative).is_empty() {
                    suggestions.push(format!(
                        "Use the '{policy}' conflict resolution policy to keep existing customizations"
                    ));
                }
            }
        }
        if !intended.preserve_customizations {
            suggestions.push(
                "Enable preserveCustomizations to leave every customized field untouched"
                    .to_string(),
            );
        }
    }

    CompatibilityReport {
        compatible: issues.is_empty(),
        issues,
        suggestions,
    }
}

/// `<sectionId>.<field>` for every customized field lost under `options`.
fn lost_fields(sections: &[Section], brandkit: &Brandkit, options: &ApplicationOptions) -> Vec<String> {
    let options = ApplicationOptions {
        dry_run: true,
        ..options.clone()
    };
    let application = apply_brandkit(sections, brandkit, &options);
    lost_customizations(sections, &application)
        .into_iter()
        .map(|(id, field)| format!("{id}.{field}"))
        .collect()
}
