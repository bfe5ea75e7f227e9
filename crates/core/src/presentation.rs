//! The in-memory presentation: slides, masters and layouts, document
//! properties, and the package parts carried through unchanged.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::shape::{Frame, PlaceholderType, Shape, ShapeKind};
use crate::slide::{LayoutRef, Slide};
use crate::units::{DEFAULT_SLIDE_HEIGHT, DEFAULT_SLIDE_WIDTH};

/// First `p:sldId/@id` value PowerPoint allows.
pub const FIRST_SLIDE_ID: u32 = 256;

/// Dublin Core document properties from `docProps/core.xml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoreProperties {
    pub title: String,
    pub subject: String,
    pub author: String,
    pub keywords: String,
    pub comments: String,
    pub category: String,
    pub last_modified_by: String,
    pub revision: Option<u32>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

/// A placeholder defined by a layout, with its position resolved against the master.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderSpec {
    pub idx: u32,
    pub kind: PlaceholderType,
    pub name: String,
    pub frame: Frame,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSummary {
    pub index: usize,
    pub name: String,
    pub placeholder_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideLayout {
    pub name: String,
    /// Part name inside the package, e.g. `ppt/slideLayouts/slideLayout1.xml`.
    pub part_name: String,
    pub placeholders: Vec<PlaceholderSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideMaster {
    pub name: String,
    pub part_name: String,
    pub placeholders: Vec<PlaceholderSpec>,
    pub layouts: Vec<SlideLayout>,
}

/// A relationship of `presentation.xml` that is written back as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRel {
    pub rel_type: String,
    pub target: String,
}

/// A relationship owned by markup that is carried through unmodeled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRel {
    /// Id the markup refers to, as read.
    pub id: String,
    pub rel_type: String,
    /// Part name, or the URL of an external target.
    pub target: String,
    pub external: bool,
}

impl PartRel {
    /// Last segment of the relationship type, e.g. `image`.
    pub fn kind(&self) -> &str {
        self.rel_type.rsplit('/').next().unwrap_or_default()
    }
}

/// Markup kept as read: group shapes, SmartArt, OLE objects, charts the chart
/// model cannot represent, and speaker notes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawXml {
    /// The element serialized with the namespace declarations it needs.
    pub xml: String,
    /// Local name of the element, e.g. `grpSp`.
    pub element: String,
    /// Relationships the markup refers to.
    pub rels: Vec<PartRel>,
}

/// Package parts the editor does not model (theme, masters, layouts and
/// their media), kept byte-for-byte so templates survive a save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetainedPackage {
    /// Part name without leading slash, mapped to raw bytes.
    pub parts: BTreeMap<String, Vec<u8>>,
    /// Content type overrides for retained parts, keyed by part name.
    pub content_types: BTreeMap<String, String>,
    /// Content type defaults keyed by file extension.
    pub default_types: BTreeMap<String, String>,
    /// Relationships from `presentation.xml` other than masters and slides.
    pub presentation_rels: Vec<PackageRel>,
    /// Raw `p:defaultTextStyle` element of `presentation.xml`.
    pub default_text_style: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    /// Slide width in EMU.
    pub slide_width: i64,
    /// Slide height in EMU.
    pub slide_height: i64,
    pub core: CoreProperties,
    pub masters: Vec<SlideMaster>,
    pub slides: Vec<Slide>,
    pub package: RetainedPackage,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            slide_width: DEFAULT_SLIDE_WIDTH,
            slide_height: DEFAULT_SLIDE_HEIGHT,
            core: CoreProperties::default(),
            masters: Vec::new(),
            slides: Vec::new(),
            package: RetainedPackage::default(),
        }
    }
}

impl Presentation {
    /// Layouts of the first master, which is what slide creation indexes into.
    pub fn layouts(&self) -> &[SlideLayout] {
        self.masters
            .first()
            .map(|m| m.layouts.as_slice())
            .unwrap_or_default()
    }

    pub fn layout_summaries(&self) -> Vec<LayoutSummary> {
        self.layouts()
            .iter()
            .enumerate()
            .map(|(index, layout)| LayoutSummary {
                index,
                name: layout.name.clone(),
                placeholder_count: layout.placeholders.len(),
            })
            .collect()
    }

    pub fn layout(&self, index: i64) -> Result<&SlideLayout> {
        let layouts = self.layouts();
        if index < 0 || index as usize >= layouts.len() {
            return Err(Error::index("layout", index, layouts.len()));
        }
        Ok(&layouts[index as usize])
    }

    pub fn layout_of(&self, slide: &Slide) -> Option<&SlideLayout> {
        self.masters
            .get(slide.layout.master)
            .and_then(|m| m.layouts.get(slide.layout.layout))
    }

    pub fn master(&self, index: i64) -> Result<&SlideMaster> {
        if index < 0 || index as usize >= self.masters.len() {
            return Err(Error::index("master", index, self.masters.len()));
        }
        Ok(&self.masters[index as usize])
    }

    pub fn slide(&self, index: i64) -> Result<&Slide> {
        if index < 0 || index as usize >= self.slides.len() {
            return Err(Error::index("slide", index, self.slides.len()));
        }
        Ok(&self.slides[index as usize])
    }

    pub fn slide_mut(&mut self, index: i64) -> Result<&mut Slide> {
        if index < 0 || index as usize >= self.slides.len() {
            return Err(Error::index("slide", index, self.slides.len()));
        }
        Ok(&mut self.slides[index as usize])
    }

    fn next_slide_id(&self) -> u32 {
        self.slides
            .iter()
            .map(|s| s.slide_id + 1)
            .max()
            .unwrap_or(FIRST_SLIDE_ID)
            .max(FIRST_SLIDE_ID)
    }

    /// Append a slide based on layout `layout_index` of the first master.
    ///
    /// The layout's placeholders are copied onto the slide, except date,
    /// footer, and slide-number placeholders. Returns the new slide's index.
    pub fn add_slide(&mut self, layout_index: i64) -> Result<usize> {
        let layout = self.layout(layout_index)?;
        let placeholders: Vec<PlaceholderSpec> = layout
            .placeholders
            .iter()
            .filter(|p| !p.kind.is_footer_like())
            .cloned()
            .collect();

        let mut slide = Slide::new(
            self.next_slide_id(),
            LayoutRef {
                master: 0,
                layout: layout_index as usize,
            },
        );
        for spec in placeholders {
            let id = slide.next_shape_id();
            slide.shapes.push(Shape::new(
                id,
                spec.name.clone(),
                spec.frame,
                ShapeKind::Placeholder {
                    idx: spec.idx,
                    kind: spec.kind.clone(),
                },
            ));
        }
        self.slides.push(slide);
        log::debug!(
            "added slide {} from layout {}",
            self.slides.len() - 1,
            layout_index
        );
        Ok(self.slides.len() - 1)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    fn spec(idx: u32, kind: PlaceholderType, name: &str, frame: Frame) -> PlaceholderSpec {
        PlaceholderSpec {
            idx,
            kind,
            name: name.to_string(),
            frame,
        }
    }

    /// A presentation with title-slide and title-content layouts.
    pub fn sample_presentation() -> Presentation {
        let title = Frame::new(685_800, 2_130_425, 7_772_400, 1_470_025);
        let body = Frame::new(457_200, 1_600_200, 8_229_600, 4_525_963);
        let footer = Frame::new(3_124_200, 6_356_350, 2_895_600, 365_125);
        Presentation {
            masters: vec![SlideMaster {
                name: "Office Theme".to_string(),
                part_name: "ppt/slideMasters/slideMaster1.xml".to_string(),
                placeholders: Vec::new(),
                layouts: vec![
                    SlideLayout {
                        name: "Title Slide".to_string(),
                        part_name: "ppt/slideLayouts/slideLayout1.xml".to_string(),
                        placeholders: vec![
                            spec(0, PlaceholderType::CenterTitle, "Title 1", title),
                            spec(1, PlaceholderType::Subtitle, "Subtitle 2", body),
                            spec(11, PlaceholderType::Footer, "Footer Placeholder 4", footer),
                        ],
                    },
                    SlideLayout {
                        name: "Title and Content".to_string(),
                        part_name: "ppt/slideLayouts/slideLayout2.xml".to_string(),
                        placeholders: vec![
                            spec(0, PlaceholderType::Title, "Title 1", title),
                            spec(1, PlaceholderType::Object, "Content Placeholder 2", body),
                        ],
                    },
                ],
            }],
            ..Default::default()
        }
    }
}
