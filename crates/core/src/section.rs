//! Page sections: the ordered style tree brandkits are applied to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::content_resolution::ContentMap;
use crate::content_value::ContentRecord;
use crate::style_settings::StyleSettings;
use crate::types::SectionId;

/// The kind of block a section renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Header,
    Hero,
    Features,
    Content,
    Testimonials,
    Pricing,
    Gallery,
    Cta,
    Contact,
    Footer,
    /// Any type this engine has no dedicated theme for.
    #[serde(other)]
    Custom,
}

impl SectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Hero => "hero",
            Self::Features => "features",
            Self::Content => "content",
            Self::Testimonials => "testimonials",
            Self::Pricing => "pricing",
            Self::Gallery => "gallery",
            Self::Cta => "cta",
            Self::Contact => "contact",
            Self::Footer => "footer",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    #[serde(rename = "type")]
    pub section_type: SectionType,
    pub order: i32,
    #[serde(default)]
    pub style_settings: StyleSettings,
    #[serde(default)]
    pub content: Vec<ContentRecord>,
}

impl Section {
    pub fn new(id: impl Into<SectionId>, section_type: SectionType, order: i32) -> Self {
        Self {
            id: id.into(),
            section_type,
            order,
            style_settings: StyleSettings::default(),
            content: Vec::new(),
        }
    }

    pub fn with_style(mut self, style_settings: StyleSettings) -> Self {
        self.style_settings = style_settings;
        self
    }

    /// Content bound to this section in `language_id`.
    pub fn content_map(&self, language_id: &str) -> ContentMap {
        ContentMap::from_records(&self.content, language_id)
    }
}

/// Sort sections by `order`.
///
/// The sort is stable, so sections sharing an order keep their incoming
/// (creation) order.
pub fn sort_sections(sections: &mut [Section]) {
    sections.sort_by_key(|s| s.order);
}

pub fn find_section<'a>(sections: &'a [Section], id: &str) -> Option<&'a Section> {
    sections.iter().find(|s| s.id == id)
}
