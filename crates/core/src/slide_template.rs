//! Slide templates: a JSON library of element layouts, and the engine that
//! draws them onto slides with a color scheme.
//!
//! Text elements can size their font to the container and wrap to its
//! width. Elements are built one at a time; an element that fails is
//! reported and the rest of the template still gets applied.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::chart::{Chart, ChartType, Series};
use crate::design::{gradient_angle, gradient_roles};
use crate::error::{Error, Result};
use crate::media::load_image_file;
use crate::presentation::Presentation;
use crate::shape::{auto_shape_preset, display_name, Fill, Frame, Glow, Line, Shadow, Shape, ShapeKind};
use crate::slide::Slide;
use crate::table::Table;
use crate::text::{Alignment, AutoSize, Font, TextEffect, TextFrame, VerticalAnchor};
use crate::text_fit::{dynamic_line_spacing, optimal_font_size, wrap_text};
use crate::units::{inches, points, RgbColor};

const BUILTIN_LIBRARY: &str = include_str!("../assets/slide_templates.json");

pub const DEFAULT_SCHEME: &str = "modern_blue";
const TYPOGRAPHY: &str = "modern_sans";
const FALLBACK_PRIMARY: RgbColor = RgbColor::new(0, 120, 215);
const DEFAULT_FONT_SIZE: u32 = 14;

/// Element position in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Position {
    fn frame(&self) -> Frame {
        Frame::new(
            inches(self.left),
            inches(self.top),
            inches(self.width),
            inches(self.height),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Shape,
    Image,
    Table,
    Chart,
}

/// A fixed size, or the string `dynamic`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SizeSetting {
    Fixed(f64),
    Named(String),
}

impl SizeSetting {
    fn is_dynamic(&self) -> bool {
        matches!(self, SizeSetting::Named(name) if name == "dynamic")
    }

    fn fixed(&self) -> Option<f64> {
        match self {
            SizeSetting::Fixed(value) => Some(*value),
            SizeSetting::Named(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GradientSpec {
    pub start_color_role: String,
    pub end_color_role: String,
    #[serde(default)]
    pub direction: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Styling {
    pub font_type: Option<String>,
    pub font_size: Option<SizeSetting>,
    pub color_role: Option<String>,
    pub color: Option<[u8; 3]>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub alignment: Option<String>,
    pub vertical_alignment: Option<String>,
    pub line_spacing: Option<SizeSetting>,
    pub auto_wrap: bool,
    pub auto_fit: bool,
    pub text_effects: Vec<String>,
    pub fill_color_role: Option<String>,
    pub fill_color: Option<[u8; 3]>,
    pub fill_gradient: Option<GradientSpec>,
    pub line_color_role: Option<String>,
    pub line_color: Option<[u8; 3]>,
    /// Outline width in points.
    pub line_width: Option<f64>,
    pub no_border: bool,
    pub shadow: bool,
    pub glow: bool,
    pub header_bg_color_role: Option<String>,
    pub header_text_color: Option<[u8; 3]>,
    pub body_bg_color_role: Option<String>,
    /// Name of an entry in the library's image effects.
    pub effects: Option<String>,
}

impl Styling {
    /// Names of the options this styling sets.
    pub fn option_names(&self) -> Vec<&'static str> {
        let flags = [
            ("font_type", self.font_type.is_some()),
            ("font_size", self.font_size.is_some()),
            ("color_role", self.color_role.is_some()),
            ("color", self.color.is_some()),
            ("bold", self.bold.is_some()),
            ("italic", self.italic.is_some()),
            ("underline", self.underline.is_some()),
            ("alignment", self.alignment.is_some()),
            ("vertical_alignment", self.vertical_alignment.is_some()),
            ("line_spacing", self.line_spacing.is_some()),
            ("auto_wrap", self.auto_wrap),
            ("auto_fit", self.auto_fit),
            ("text_effects", !self.text_effects.is_empty()),
            ("fill_color_role", self.fill_color_role.is_some()),
            ("fill_color", self.fill_color.is_some()),
            ("fill_gradient", self.fill_gradient.is_some()),
            ("line_color_role", self.line_color_role.is_some()),
            ("line_color", self.line_color.is_some()),
            ("line_width", self.line_width.is_some()),
            ("no_border", self.no_border),
            ("shadow", self.shadow),
            ("glow", self.glow),
            ("header_bg_color_role", self.header_bg_color_role.is_some()),
            ("header_text_color", self.header_text_color.is_some()),
            ("body_bg_color_role", self.body_bg_color_role.is_some()),
            ("effects", self.effects.is_some()),
        ];
        flags
            .into_iter()
            .filter(|(_, set)| *set)
            .map(|(name, _)| name)
            .collect()
    }
}

fn default_three() -> usize {
    3
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableConfig {
    #[serde(default = "default_three")]
    pub rows: usize,
    #[serde(default = "default_three")]
    pub cols: usize,
    #[serde(default = "default_true")]
    pub header_row: bool,
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 3,
            header_row: true,
            data: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeriesConfig {
    pub name: String,
    pub values: Vec<f64>,
}

fn default_chart_type() -> String {
    "column".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartConfig {
    #[serde(rename = "type", default = "default_chart_type")]
    pub chart_type: String,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub series: Option<Vec<SeriesConfig>>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            chart_type: default_chart_type(),
            categories: None,
            series: None,
            title: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemplateElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub role: String,
    pub position: Position,
    #[serde(default)]
    pub placeholder_text: String,
    #[serde(default)]
    pub styling: Styling,
    #[serde(default)]
    pub shape_type: Option<String>,
    #[serde(default)]
    pub table_config: Option<TableConfig>,
    #[serde(default)]
    pub chart_config: Option<ChartConfig>,
}

impl TemplateElement {
    /// Feature labels reported for this element.
    pub fn features(&self) -> Vec<&'static str> {
        let styling = &self.styling;
        let mut features = Vec::new();
        if styling.font_size.as_ref().is_some_and(SizeSetting::is_dynamic) {
            features.push("Dynamic text sizing");
        }
        if styling.auto_wrap {
            features.push("Automatic text wrapping");
        }
        if !styling.text_effects.is_empty() {
            features.push("Text visual effects");
        }
        if styling.auto_fit {
            features.push("Auto-fit content");
        }
        if styling.fill_gradient.is_some() {
            features.push("Gradient fills");
        }
        if styling.shadow || styling.glow || styling.effects.is_some() {
            features.push("Advanced visual effects");
        }
        features
    }
}

fn default_background_kind() -> String {
    "solid".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackgroundSpec {
    #[serde(rename = "type", default = "default_background_kind")]
    pub kind: String,
    #[serde(default)]
    pub color_role: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub start_color_role: Option<String>,
    #[serde(default)]
    pub end_color_role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SlideTemplate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub layout_type: Option<String>,
    #[serde(default)]
    pub background: Option<BackgroundSpec>,
    #[serde(default)]
    pub elements: Vec<TemplateElement>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TypographyEntry {
    pub name: String,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSizeRange {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

impl Default for FontSizeRange {
    fn default() -> Self {
        Self {
            min: 10,
            max: 18,
            default: DEFAULT_FONT_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AutoSizingRules {
    #[serde(default)]
    pub base_font_sizes: BTreeMap<String, FontSizeRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextEffectSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub color_role: Option<String>,
    pub color: Option<[u8; 3]>,
    pub blur: Option<f64>,
    pub distance: Option<f64>,
    pub direction: Option<f64>,
    pub alpha: Option<f64>,
    pub radius: Option<f64>,
    pub width: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShadowSpec {
    pub blur: Option<f64>,
    pub distance: Option<f64>,
    pub direction: Option<f64>,
    pub alpha: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BorderSpec {
    pub width: Option<f64>,
    pub color_role: Option<String>,
    pub color: Option<[u8; 3]>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageEffectSpec {
    pub shadow: Option<ShadowSpec>,
    pub border: Option<BorderSpec>,
    pub soft_edges: Option<f64>,
}

/// Listing entry for one template.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub layout_type: String,
    pub element_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ElementInfo {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub role: String,
    pub position: Position,
    pub placeholder_text: String,
    pub styling_options: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TemplateDetails {
    pub template_id: String,
    pub name: String,
    pub description: String,
    pub layout_type: Option<String>,
    pub elements: Vec<ElementInfo>,
    pub element_count: usize,
    pub has_background: bool,
    pub background_type: Option<String>,
    pub color_schemes: Vec<String>,
}

/// What happened to one template element.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ElementOutcome {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enhanced_features: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AppliedTemplate {
    pub template_id: String,
    pub template_name: String,
    pub color_scheme: String,
    pub elements_created: Vec<ElementOutcome>,
    pub total_elements: usize,
    pub enhanced_features_applied: Vec<&'static str>,
}

impl AppliedTemplate {
    pub fn failed_elements(&self) -> usize {
        self.elements_created
            .iter()
            .filter(|e| e.error.is_some())
            .count()
    }
}

/// One slide of a template sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceEntry {
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub content: BTreeMap<String, String>,
    #[serde(default)]
    pub images: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SequenceSlide {
    pub slide_index: usize,
    pub success: bool,
    #[serde(flatten)]
    pub applied: Option<AppliedTemplate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SequenceResult {
    pub success: bool,
    pub slides_created: Vec<SequenceSlide>,
    pub total_slides: usize,
    pub color_scheme: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateLibrary {
    pub templates: BTreeMap<String, SlideTemplate>,
    #[serde(default)]
    pub color_schemes: BTreeMap<String, BTreeMap<String, [u8; 3]>>,
    #[serde(default)]
    pub typography_styles: BTreeMap<String, BTreeMap<String, TypographyEntry>>,
    #[serde(default)]
    pub auto_sizing_rules: AutoSizingRules,
    #[serde(default)]
    pub text_effects: BTreeMap<String, TextEffectSpec>,
    #[serde(default)]
    pub image_effects: BTreeMap<String, ImageEffectSpec>,
}

impl TemplateLibrary {
    /// The library compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_LIBRARY)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::TemplateError(format!("Invalid JSON in template file: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "Template file not found: {}",
                path.display()
            )));
        }
        let json = std::fs::read_to_string(path)?;
        let library = Self::from_json(&json)?;
        log::debug!(
            "loaded {} slide templates from {}",
            library.templates.len(),
            path.display()
        );
        Ok(library)
    }

    pub fn template(&self, template_id: &str) -> Result<&SlideTemplate> {
        self.templates
            .get(template_id)
            .ok_or_else(|| Error::NotFound(format!("Template '{template_id}' not found")))
    }

    pub fn template_ids(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    pub fn summaries(&self) -> Vec<TemplateSummary> {
        self.templates
            .iter()
            .map(|(id, t)| TemplateSummary {
                id: id.clone(),
                name: t.name.clone().unwrap_or_else(|| id.clone()),
                description: t.description.clone(),
                layout_type: t.layout_type.clone().unwrap_or_else(|| "content".to_string()),
                element_count: t.elements.len(),
            })
            .collect()
    }

    pub fn details(&self, template_id: &str) -> Result<TemplateDetails> {
        let template = self.template(template_id)?;
        let elements: Vec<ElementInfo> = template
            .elements
            .iter()
            .map(|e| ElementInfo {
                kind: e.kind,
                role: e.role.clone(),
                position: e.position,
                placeholder_text: e.placeholder_text.clone(),
                styling_options: e.styling.option_names(),
            })
            .collect();
        Ok(TemplateDetails {
            template_id: template_id.to_string(),
            name: template.name.clone().unwrap_or_else(|| template_id.to_string()),
            description: template.description.clone(),
            layout_type: template.layout_type.clone(),
            element_count: elements.len(),
            elements,
            has_background: template.background.is_some(),
            background_type: template.background.as_ref().map(|b| b.kind.clone()),
            color_schemes: self.color_schemes.keys().cloned().collect(),
        })
    }

    /// Color for `role` in `scheme`.
    ///
    /// Unknown schemes fall back to `modern_blue` and unknown roles to the primary color.
    pub fn scheme_color(&self, scheme: &str, role: &str) -> RgbColor {
        let colors = self
            .color_schemes
            .get(scheme)
            .or_else(|| self.color_schemes.get(DEFAULT_SCHEME));
        colors
            .and_then(|c| c.get(role).or_else(|| c.get("primary")))
            .map(|[r, g, b]| RgbColor::new(*r, *g, *b))
            .unwrap_or(FALLBACK_PRIMARY)
    }

    fn resolve_color(&self, scheme: &str, role: Option<&str>, color: Option<[u8; 3]>) -> Option<RgbColor> {
        match (role, color) {
            (Some(role), _) => Some(self.scheme_color(scheme, role)),
            (None, Some([r, g, b])) => Some(RgbColor::new(r, g, b)),
            (None, None) => None,
        }
    }

    /// Series colors for charts drawn with `scheme`.
    pub fn chart_palette(&self, scheme: &str) -> [RgbColor; 4] {
        ["primary", "accent1", "accent2", "secondary"].map(|role| self.scheme_color(scheme, role))
    }

    pub fn size_range(&self, font_type: &str) -> FontSizeRange {
        self.auto_sizing_rules
            .base_font_sizes
            .get(font_type)
            .copied()
            .unwrap_or_default()
    }

    /// Font size for an element holding `content`.
    pub fn font_size_for(&self, element: &TemplateElement, content: &str) -> u32 {
        if content.is_empty() {
            return DEFAULT_FONT_SIZE;
        }
        let styling = &element.styling;
        let range = self.size_range(styling.font_type.as_deref().unwrap_or("body"));
        match &styling.font_size {
            Some(setting) if setting.is_dynamic() => optimal_font_size(
                content,
                element.position.width,
                element.position.height,
                range.min,
                range.max,
            ),
            Some(setting) => setting
                .fixed()
                .map(|size| size.round().max(1.0) as u32)
                .unwrap_or(range.default),
            None => range.default,
        }
    }

    /// Typeface, bold, and italic defaults for a font type.
    fn typography(&self, font_type: &str) -> (String, bool, bool) {
        self.typography_styles
            .get(TYPOGRAPHY)
            .and_then(|style| style.get(font_type))
            .map(|entry| {
                let bold = matches!(entry.weight.as_deref(), Some("bold" | "semibold"));
                let italic = entry.style.as_deref() == Some("italic");
                (entry.name.clone(), bold, italic)
            })
            .unwrap_or_else(|| ("Segoe UI".to_string(), false, false))
    }

    fn text_effects_for(&self, names: &[String], scheme: &str) -> Vec<TextEffect> {
        names
            .iter()
            .filter_map(|name| {
                let Some(spec) = self.text_effects.get(name) else {
                    log::debug!("unknown text effect '{name}'");
                    return None;
                };
                let color = self.resolve_color(scheme, spec.color_role.as_deref(), spec.color);
                match spec.kind.as_str() {
                    "shadow" => Some(TextEffect::Shadow {
                        color: color.unwrap_or(RgbColor::BLACK),
                        blur_pt: spec.blur.unwrap_or(3.0),
                        distance_pt: spec.distance.unwrap_or(2.0),
                        direction_deg: spec.direction.unwrap_or(315.0),
                        alpha: spec.alpha.unwrap_or(0.4),
                    }),
                    "glow" => Some(TextEffect::Glow {
                        color: color.unwrap_or_else(|| self.scheme_color(scheme, "accent1")),
                        radius_pt: spec.radius.unwrap_or(5.0),
                        alpha: spec.alpha.unwrap_or(0.6),
                    }),
                    "outline" => Some(TextEffect::Outline {
                        color: color.unwrap_or_else(|| self.scheme_color(scheme, "primary")),
                        width_pt: spec.width.unwrap_or(1.0),
                    }),
                    other => {
                        log::debug!("text effect '{name}' has unsupported type '{other}'");
                        None
                    }
                }
            })
            .collect()
    }

    fn text_font(&self, styling: &Styling, scheme: &str, size: u32) -> Font {
        let (name, bold, italic) = self.typography(styling.font_type.as_deref().unwrap_or("body"));
        Font {
            name: Some(name),
            size: Some(size as f64),
            bold: Some(styling.bold.unwrap_or(bold)),
            italic: Some(styling.italic.unwrap_or(italic)),
            underline: styling.underline,
            color: self.resolve_color(scheme, styling.color_role.as_deref(), styling.color),
            effects: self.text_effects_for(&styling.text_effects, scheme),
        }
    }

    fn apply_image_effect(&self, shape: &mut Shape, effect: &str, scheme: &str) {
        let Some(spec) = self.image_effects.get(effect) else {
            log::debug!("unknown image effect '{effect}'");
            return;
        };
        if let Some(shadow) = &spec.shadow {
            let defaults = Shadow::default();
            shape.effects.shadow = Some(Shadow {
                blur_pt: shadow.blur.unwrap_or(defaults.blur_pt),
                distance_pt: shadow.distance.unwrap_or(defaults.distance_pt),
                direction_deg: shadow.direction.unwrap_or(defaults.direction_deg),
                alpha: shadow.alpha.unwrap_or(defaults.alpha),
                color: RgbColor::BLACK,
            });
        }
        if let Some(border) = &spec.border {
            shape.line = Some(Line {
                color: self.resolve_color(scheme, border.color_role.as_deref(), border.color),
                width: border.width.map(points),
                hidden: false,
            });
        }
        if let Some(radius) = spec.soft_edges {
            shape.effects.soft_edges = Some(radius);
        }
    }

    fn background_fill(&self, background: &BackgroundSpec, scheme: &str) -> Option<Fill> {
        match background.kind.as_str() {
            "solid" => {
                let role = background.color_role.as_deref().unwrap_or("light");
                Some(Fill::Solid(self.scheme_color(scheme, role)))
            }
            kind if kind.ends_with("gradient") => {
                let (from, to) = match (&background.start_color_role, &background.end_color_role) {
                    (Some(from), Some(to)) => (from.as_str(), to.as_str()),
                    _ => gradient_roles(background.style.as_deref().unwrap_or("subtle")),
                };
                Some(Fill::linear(
                    self.scheme_color(scheme, from),
                    self.scheme_color(scheme, to),
                    gradient_angle(background.direction.as_deref().unwrap_or("diagonal")),
                ))
            }
            other => {
                log::debug!("unsupported background type '{other}'");
                None
            }
        }
    }

    /// Draw template `template_id` onto `slide`.
    ///
    /// `content` replaces placeholder text by element role and `images`
    /// supplies picture files by role.
    pub fn apply(
        &self,
        slide: &mut Slide,
        template_id: &str,
        scheme: &str,
        content: &BTreeMap<String, String>,
        images: &BTreeMap<String, String>,
    ) -> Result<AppliedTemplate> {
        let template = self.template(template_id)?;

        if let Some(background) = &template.background {
            if let Some(fill) = self.background_fill(background, scheme) {
                slide.background = Some(fill);
            }
        }

        let mut outcomes = Vec::with_capacity(template.elements.len());
        let mut features_applied: Vec<&'static str> = Vec::new();
        for element in &template.elements {
            let text = content
                .get(&element.role)
                .map(String::as_str)
                .unwrap_or(&element.placeholder_text);
            let created = match element.kind {
                ElementKind::Text => Ok(self.add_text(slide, element, scheme, text)),
                ElementKind::Shape => self.add_shape(slide, element, scheme, text),
                ElementKind::Image => Ok(self.add_image(
                    slide,
                    element,
                    scheme,
                    images.get(&element.role).map(String::as_str),
                )),
                ElementKind::Table => self.add_table(slide, element, scheme),
                ElementKind::Chart => Ok(self.add_chart(slide, element, scheme)),
            };
            let outcome = match created {
                Ok(index) => {
                    let features = element.features();
                    for &feature in &features {
                        if !features_applied.contains(&feature) {
                            features_applied.push(feature);
                        }
                    }
                    ElementOutcome {
                        kind: element.kind,
                        role: element.role.clone(),
                        index: Some(index),
                        enhanced_features: features,
                        error: None,
                    }
                }
                Err(err) => {
                    log::warn!(
                        "template '{template_id}' element '{}' failed: {err}",
                        element.role
                    );
                    ElementOutcome {
                        kind: element.kind,
                        role: element.role.clone(),
                        index: None,
                        enhanced_features: Vec::new(),
                        error: Some(err.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        Ok(AppliedTemplate {
            template_id: template_id.to_string(),
            template_name: template.name.clone().unwrap_or_else(|| template_id.to_string()),
            color_scheme: scheme.to_string(),
            total_elements: template.elements.len(),
            elements_created: outcomes,
            enhanced_features_applied: features_applied,
        })
    }

    fn add_text(&self, slide: &mut Slide, element: &TemplateElement, scheme: &str, content: &str) -> usize {
        let styling = &element.styling;
        let text = if styling.auto_wrap {
            let size = self.font_size_for(element, content);
            wrap_text(content, element.position.width, size as f64)
        } else {
            content.to_string()
        };
        let size = self.font_size_for(element, &text);

        let mut frame = TextFrame::from_text(&text);
        frame.word_wrap = Some(true);
        if styling.auto_fit {
            frame.auto_size = Some(AutoSize::ShapeToFitText);
        }
        frame.anchor = styling
            .vertical_alignment
            .as_deref()
            .and_then(VerticalAnchor::from_name);
        if let Some(alignment) = styling.alignment.as_deref().and_then(Alignment::from_name) {
            frame.set_alignment(alignment);
        }
        let spacing = match &styling.line_spacing {
            Some(setting) if setting.is_dynamic() => Some(dynamic_line_spacing(text.chars().count())),
            Some(setting) => setting.fixed(),
            None => None,
        };
        for para in &mut frame.paragraphs {
            para.line_spacing = spacing;
        }
        frame.apply_font(&self.text_font(styling, scheme, size));

        slide
            .add_shape("TextBox", element.position.frame(), ShapeKind::TextBox)
            .text = Some(frame);
        slide.shapes.len() - 1
    }

    fn add_shape(&self, slide: &mut Slide, element: &TemplateElement, scheme: &str, text: &str) -> Result<usize> {
        let styling = &element.styling;
        let shape_type = element.shape_type.as_deref().unwrap_or("rectangle");
        let preset = auto_shape_preset(shape_type)?;

        let fill = if let Some(gradient) = &styling.fill_gradient {
            Some(Fill::linear(
                self.scheme_color(scheme, &gradient.start_color_role),
                self.scheme_color(scheme, &gradient.end_color_role),
                gradient_angle(gradient.direction.as_deref().unwrap_or("vertical")),
            ))
        } else {
            self.resolve_color(scheme, styling.fill_color_role.as_deref(), styling.fill_color)
                .map(Fill::Solid)
        };
        let line = if styling.no_border {
            Some(Line {
                hidden: true,
                ..Default::default()
            })
        } else {
            let color = self.resolve_color(scheme, styling.line_color_role.as_deref(), styling.line_color);
            let width = styling.line_width.map(points);
            (color.is_some() || width.is_some()).then_some(Line {
                color,
                width,
                hidden: false,
            })
        };

        let shape = slide.add_shape(
            &display_name(shape_type),
            element.position.frame(),
            ShapeKind::AutoShape {
                preset: preset.to_string(),
            },
        );
        shape.fill = fill;
        shape.line = line;
        if styling.shadow {
            shape.effects.shadow = Some(Shadow::default());
        }
        if styling.glow {
            shape.effects.glow = Some(Glow {
                radius_pt: 5.0,
                color: self.scheme_color(scheme, "accent1"),
                alpha: 0.6,
            });
        }
        if !text.is_empty() {
            let mut frame = TextFrame::from_text(text);
            frame.set_alignment(Alignment::Center);
            frame.anchor = Some(VerticalAnchor::Middle);
            if styling.font_type.is_some() || styling.color_role.is_some() || styling.color.is_some() {
                frame.apply_font(&self.text_font(styling, scheme, self.font_size_for(element, text)));
            }
            shape.text = Some(frame);
        }
        Ok(slide.shapes.len() - 1)
    }

    fn add_image(&self, slide: &mut Slide, element: &TemplateElement, scheme: &str, path: Option<&str>) -> usize {
        let frame = element.position.frame();
        let effect = element.styling.effects.as_deref();

        if let Some(path) = path {
            match load_image_file(Path::new(path)) {
                Ok(loaded) => {
                    let shape = slide.add_shape("Picture", frame, ShapeKind::Picture(loaded.picture));
                    if let Some(effect) = effect {
                        self.apply_image_effect(shape, effect, scheme);
                    }
                    return slide.shapes.len() - 1;
                }
                Err(err) => log::warn!(
                    "image for role '{}' unavailable, drawing a placeholder: {err}",
                    element.role
                ),
            }
        }

        let label = if element.placeholder_text.is_empty() {
            "Image Placeholder"
        } else {
            element.placeholder_text.as_str()
        };
        let shape = slide.add_shape(
            "Rectangle",
            frame,
            ShapeKind::AutoShape {
                preset: "rect".to_string(),
            },
        );
        shape.fill = Some(Fill::Solid(self.scheme_color(scheme, "light")));
        let mut text = TextFrame::from_text(label);
        text.set_alignment(Alignment::Center);
        text.anchor = Some(VerticalAnchor::Middle);
        text.apply_font(&Font {
            color: Some(self.scheme_color(scheme, "text")),
            ..Default::default()
        });
        shape.text = Some(text);
        if let Some(effect) = effect {
            self.apply_image_effect(shape, effect, scheme);
        }
        slide.shapes.len() - 1
    }

    fn add_table(&self, slide: &mut Slide, element: &TemplateElement, scheme: &str) -> Result<usize> {
        let config = element.table_config.clone().unwrap_or_default();
        if config.rows == 0 || config.cols == 0 {
            return Err(Error::invalid(
                "Table must have at least one row and one column",
            ));
        }
        let styling = &element.styling;
        let frame = element.position.frame();
        let mut table = Table::new(config.rows, config.cols, frame.width, frame.height);
        table.first_row = config.header_row;

        for (row, values) in table.rows.iter_mut().zip(&config.data) {
            for (cell, value) in row.cells.iter_mut().zip(values) {
                cell.text.set_text(&value_text(value));
            }
        }

        let header_fill = styling
            .header_bg_color_role
            .as_deref()
            .map(|role| self.scheme_color(scheme, role));
        let body_fill = styling
            .body_bg_color_role
            .as_deref()
            .map(|role| self.scheme_color(scheme, role));
        let header_font = styling.header_text_color.map(|[r, g, b]| Font {
            color: Some(RgbColor::new(r, g, b)),
            bold: Some(true),
            ..Default::default()
        });
        for (r, row) in table.rows.iter_mut().enumerate() {
            let is_header = r == 0 && config.header_row;
            for cell in &mut row.cells {
                if is_header {
                    if header_fill.is_some() {
                        cell.fill = header_fill;
                    }
                    if let Some(font) = &header_font {
                        cell.text.apply_font(font);
                    }
                } else if body_fill.is_some() {
                    cell.fill = body_fill;
                }
            }
        }

        slide.add_shape("Table", frame, ShapeKind::Table(table));
        Ok(slide.shapes.len() - 1)
    }

    fn add_chart(&self, slide: &mut Slide, element: &TemplateElement, scheme: &str) -> usize {
        let config = element.chart_config.clone().unwrap_or_default();
        let frame = element.position.frame();
        let categories = config
            .categories
            .clone()
            .unwrap_or_else(|| vec!["A".into(), "B".into(), "C".into()]);
        let series: Vec<Series> = match &config.series {
            Some(series) => series
                .iter()
                .map(|s| Series::new(s.name.clone(), s.values.clone()))
                .collect(),
            None => vec![Series::new("Series 1", vec![1.0, 2.0, 3.0])],
        };

        let built = ChartType::parse(&config.chart_type)
            .and_then(|chart_type| Chart::new(chart_type, categories, series));
        match built {
            Ok(mut chart) => {
                chart.title = config.title.clone();
                chart.apply_palette(&self.chart_palette(scheme));
                slide.add_shape("Chart", frame, ShapeKind::Chart(Box::new(chart)));
            }
            Err(err) => {
                log::warn!("chart for role '{}' replaced by a text box: {err}", element.role);
                let label = format!(
                    "Chart: {}\n{}",
                    config.chart_type,
                    config.title.as_deref().unwrap_or("Chart Placeholder")
                );
                slide.add_shape("TextBox", frame, ShapeKind::TextBox).text =
                    Some(TextFrame::from_text(&label));
            }
        }
        slide.shapes.len() - 1
    }

    /// Append one slide per entry and apply its template.
    ///
    /// Slides use the second layout of the first master when there is one.
    pub fn build_sequence(&self, pres: &mut Presentation, entries: &[SequenceEntry], scheme: &str) -> SequenceResult {
        let layout = if pres.layouts().len() > 1 { 1 } else { 0 };
        let mut result = SequenceResult {
            success: true,
            slides_created: Vec::with_capacity(entries.len()),
            total_slides: entries.len(),
            color_scheme: scheme.to_string(),
        };

        for (i, entry) in entries.iter().enumerate() {
            let applied = match entry.template_id.as_deref() {
                None => Err("No template_id specified".to_string()),
                Some(template_id) => self
                    .template(template_id)
                    .and_then(|_| pres.add_slide(layout))
                    .and_then(|index| {
                        self.apply(
                            &mut pres.slides[index],
                            template_id,
                            scheme,
                            &entry.content,
                            &entry.images,
                        )
                    })
                    .map_err(|e| format!("Failed to create slide {i}: {e}")),
            };
            let slide = match applied {
                Ok(applied) => SequenceSlide {
                    slide_index: i,
                    success: true,
                    applied: Some(applied),
                    error: None,
                },
                Err(error) => {
                    result.success = false;
                    SequenceSlide {
                        slide_index: i,
                        success: false,
                        applied: None,
                        error: Some(error),
                    }
                }
            };
            result.slides_created.push(slide);
        }
        result
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Kind of deck produced by [`auto_sequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckKind {
    Business,
    Academic,
    Creative,
}

impl DeckKind {
    /// `business` or `academic`; anything else is creative.
    pub fn from_name(name: &str) -> Self {
        match name {
            "business" => DeckKind::Business,
            "academic" => DeckKind::Academic,
            _ => DeckKind::Creative,
        }
    }

    pub fn as_name(&self) -> &'static str {
        match self {
            DeckKind::Business => "business",
            DeckKind::Academic => "academic",
            DeckKind::Creative => "creative",
        }
    }
}

fn entry(template_id: &str, content: &[(&str, String)]) -> SequenceEntry {
    SequenceEntry {
        template_id: Some(template_id.to_string()),
        content: content
            .iter()
            .map(|(role, text)| (role.to_string(), text.clone()))
            .collect(),
        images: BTreeMap::new(),
    }
}

/// Template sequence for a generated deck of `slide_count` slides (3-20).
///
/// The base outline is cut to length, or padded with extra content slides
/// inserted before the closing slide.
pub fn auto_sequence(
    topic: &str,
    slide_count: i64,
    kind: DeckKind,
    include_charts: bool,
    include_images: bool,
) -> Result<Vec<SequenceEntry>> {
    if !(3..=20).contains(&slide_count) {
        return Err(Error::invalid("Slide count must be between 3 and 20"));
    }
    let s = |text: &str| text.to_string();

    let mut outline = match kind {
        DeckKind::Business => vec![
            entry(
                "title_slide",
                &[
                    ("title", s(topic)),
                    ("subtitle", s("Executive Presentation")),
                    ("author", s("Business Team")),
                ],
            ),
            entry(
                "agenda_slide",
                &[(
                    "agenda_items",
                    s("1. Executive Summary\n\n2. Current Situation\n\n3. Analysis & Insights\n\n4. Recommendations\n\n5. Next Steps"),
                )],
            ),
            entry("key_metrics_dashboard", &[("title", s("Key Performance Indicators"))]),
            entry(
                "text_with_image",
                &[
                    ("title", s("Current Situation")),
                    (
                        "content",
                        format!("Overview of {topic}:\n• Current status\n• Key challenges\n• Market position"),
                    ),
                ],
            ),
            entry(
                "two_column_text",
                &[
                    ("title", s("Analysis")),
                    ("content_left", s("Strengths:\n• Advantage 1\n• Advantage 2\n• Advantage 3")),
                    ("content_right", s("Opportunities:\n• Opportunity 1\n• Opportunity 2\n• Opportunity 3")),
                ],
            ),
        ],
        DeckKind::Academic => vec![
            entry(
                "title_slide",
                &[
                    ("title", format!("Research on {topic}")),
                    ("subtitle", s("Academic Study")),
                    ("author", s("Research Team")),
                ],
            ),
            entry(
                "agenda_slide",
                &[(
                    "agenda_items",
                    s("1. Introduction\n\n2. Literature Review\n\n3. Methodology\n\n4. Results\n\n5. Conclusions"),
                )],
            ),
            entry(
                "text_with_image",
                &[
                    ("title", s("Introduction")),
                    (
                        "content",
                        format!("Research focus on {topic}:\n• Background\n• Problem statement\n• Research questions"),
                    ),
                ],
            ),
            entry(
                "two_column_text",
                &[
                    ("title", s("Methodology")),
                    ("content_left", s("Approach:\n• Method 1\n• Method 2\n• Method 3")),
                    ("content_right", s("Data Sources:\n• Source 1\n• Source 2\n• Source 3")),
                ],
            ),
            entry("data_table_slide", &[("title", s("Results Summary"))]),
        ],
        DeckKind::Creative => vec![
            entry(
                "title_slide",
                &[
                    ("title", format!("Creative Vision: {topic}")),
                    ("subtitle", s("Innovative Concepts")),
                    ("author", s("Creative Team")),
                ],
            ),
            entry(
                "full_image_slide",
                &[
                    ("overlay_title", format!("Exploring {topic}")),
                    ("overlay_subtitle", s("Creative possibilities")),
                ],
            ),
            entry("three_column_layout", &[("title", s("Creative Concepts"))]),
            entry(
                "quote_testimonial",
                &[
                    (
                        "quote_text",
                        format!("Innovation in {topic} requires thinking beyond conventional boundaries"),
                    ),
                    ("attribution", s("— Creative Director")),
                ],
            ),
            entry("process_flow", &[("title", s("Creative Process"))]),
        ],
    };

    if include_charts {
        outline.push(match kind {
            DeckKind::Business => entry("chart_comparison", &[("title", s("Performance Comparison"))]),
            DeckKind::Academic => entry("chart_comparison", &[("title", s("Data Analysis"))]),
            DeckKind::Creative => entry("key_metrics_dashboard", &[("title", s("Impact Metrics"))]),
        });
    }
    let closing = match kind {
        DeckKind::Business => "Thank you for your attention\nQuestions & Discussion",
        DeckKind::Academic => "Questions & Discussion\nContact: research@university.edu",
        DeckKind::Creative => "Let's create something amazing together\ncreative@studio.com",
    };
    outline.push(entry("thank_you_slide", &[("contact", s(closing))]));

    let count = slide_count as usize;
    outline.truncate(count);
    while outline.len() < count {
        let filler = if include_images {
            entry(
                "text_with_image",
                &[
                    ("title", format!("{topic} - Additional Topic")),
                    ("content", s("• Key point\n• Supporting detail\n• Additional insight")),
                ],
            )
        } else {
            entry(
                "two_column_text",
                &[
                    ("title", format!("{topic} - Analysis")),
                    ("content_left", s("Key Points:\n• Point 1\n• Point 2")),
                    ("content_right", s("Details:\n• Detail 1\n• Detail 2")),
                ],
            )
        };
        let before_last = outline.len() - 1;
        outline.insert(before_last, filler);
    }
    Ok(outline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::fixtures::sample_presentation;
    use crate::slide::LayoutRef;

    fn library() -> TemplateLibrary {
        TemplateLibrary::builtin().unwrap()
    }

    fn blank_slide() -> Slide {
        Slide::new(256, LayoutRef::default())
    }

    fn ids(entries: &[SequenceEntry]) -> Vec<&str> {
        entries
            .iter()
            .map(|e| e.template_id.as_deref().unwrap_or(""))
            .collect()
    }

    #[test]
    fn test_builtin_library_loads() {
        let lib = library();
        assert_eq!(lib.templates.len(), 12);
        assert_eq!(lib.color_schemes.len(), 4);
        let summaries = lib.summaries();
        let title = summaries.iter().find(|s| s.id == "title_slide").unwrap();
        assert_eq!(title.name, "Title Slide");
        assert_eq!(title.element_count, 4);
    }

    #[test]
    fn test_scheme_color_fallbacks() {
        let lib = library();
        assert_eq!(lib.scheme_color("warm_red", "primary"), RgbColor::new(192, 80, 77));
        assert_eq!(lib.scheme_color("no_such_scheme", "accent2"), RgbColor::new(255, 192, 0));
        assert_eq!(lib.scheme_color("modern_blue", "nope"), RgbColor::new(0, 120, 215));
    }

    #[test]
    fn test_apply_title_slide_with_content() {
        let lib = library();
        let mut slide = blank_slide();
        let content = BTreeMap::from([("title".to_string(), "Quarterly Review".to_string())]);
        let applied = lib
            .apply(&mut slide, "title_slide", "modern_blue", &content, &BTreeMap::new())
            .unwrap();
        assert_eq!(applied.total_elements, 4);
        assert_eq!(applied.failed_elements(), 0);
        assert_eq!(slide.shapes.len(), 4);
        assert!(slide.shapes.iter().any(|s| s.text() == "Quarterly Review"));
        assert!(matches!(slide.background, Some(Fill::Gradient { .. })));
        assert!(applied.enhanced_features_applied.contains(&"Dynamic text sizing"));
    }

    #[test]
    fn test_missing_image_becomes_placeholder() {
        let lib = library();
        let mut slide = blank_slide();
        let images = BTreeMap::from([("supporting".to_string(), "/no/such/picture.png".to_string())]);
        lib.apply(&mut slide, "text_with_image", "modern_blue", &BTreeMap::new(), &images)
            .unwrap();
        let placeholder = slide.shapes.last().unwrap();
        assert!(matches!(placeholder.kind, ShapeKind::AutoShape { .. }));
        assert_eq!(placeholder.text(), "Supporting Image");
        assert!(placeholder.effects.shadow.is_some());
    }

    #[test]
    fn test_unknown_template() {
        let err = library()
            .apply(&mut blank_slide(), "nope", "modern_blue", &BTreeMap::new(), &BTreeMap::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "Template 'nope' not found");
    }

    #[test]
    fn test_failed_element_does_not_stop_the_rest() {
        let lib = TemplateLibrary::from_json(
            r#"{
                "templates": {
                    "broken": {
                        "elements": [
                            {"type": "shape", "role": "blob", "shape_type": "blob",
                             "position": {"left": 0, "top": 0, "width": 1, "height": 1}},
                            {"type": "text", "role": "title", "placeholder_text": "Still here",
                             "position": {"left": 0, "top": 1, "width": 4, "height": 1}}
                        ]
                    }
                }
            }"#,
        )
        .unwrap();
        let mut slide = blank_slide();
        let applied = lib
            .apply(&mut slide, "broken", "modern_blue", &BTreeMap::new(), &BTreeMap::new())
            .unwrap();
        assert_eq!(applied.failed_elements(), 1);
        assert!(applied.elements_created[0]
            .error
            .as_deref()
            .unwrap()
            .starts_with("Unsupported shape type"));
        assert_eq!(applied.elements_created[1].index, Some(0));
        assert_eq!(slide.shapes[0].text(), "Still here");
    }

    #[test]
    fn test_dynamic_font_size_shrinks_for_long_content() {
        let lib = library();
        let element = &lib.template("agenda_slide").unwrap().elements[2];
        let short = lib.font_size_for(element, "Intro");
        let long = lib.font_size_for(element, &"A much longer agenda line ".repeat(6));
        assert!(long < short);
        assert!(long >= lib.size_range("body").min);
        assert_eq!(lib.font_size_for(element, ""), DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_table_and_chart_elements() {
        let lib = library();
        let mut slide = blank_slide();
        lib.apply(&mut slide, "data_table_slide", "warm_red", &BTreeMap::new(), &BTreeMap::new())
            .unwrap();
        let table = slide.shapes[1].table().unwrap();
        assert_eq!(table.texts()[1][0], "Revenue");
        assert_eq!(table.rows[0].cells[0].fill, Some(RgbColor::new(192, 80, 77)));
        assert_eq!(table.rows[1].cells[0].fill, Some(RgbColor::new(253, 253, 253)));

        let mut slide = blank_slide();
        lib.apply(&mut slide, "chart_comparison", "modern_blue", &BTreeMap::new(), &BTreeMap::new())
            .unwrap();
        let chart = slide.shapes[1].chart().unwrap();
        assert_eq!(chart.categories.len(), 4);
        assert_eq!(chart.series[0].color, Some(RgbColor::new(0, 120, 215)));
    }

    #[test]
    fn test_template_details() {
        let details = library().details("data_table_slide").unwrap();
        assert_eq!(details.element_count, 3);
        assert!(!details.has_background);
        assert!(details.elements[1]
            .styling_options
            .contains(&"header_bg_color_role"));
        assert_eq!(details.color_schemes.len(), 4);
    }

    #[test]
    fn test_build_sequence_records_failures() {
        let lib = library();
        let mut pres = sample_presentation();
        let entries = vec![
            entry("title_slide", &[("title", "Deck".to_string())]),
            SequenceEntry::default(),
            entry("nope", &[]),
        ];
        let result = lib.build_sequence(&mut pres, &entries, "modern_blue");
        assert!(!result.success);
        assert_eq!(pres.slides.len(), 1);
        assert!(result.slides_created[0].success);
        assert_eq!(
            result.slides_created[1].error.as_deref(),
            Some("No template_id specified")
        );
        assert_eq!(
            result.slides_created[2].error.as_deref(),
            Some("Failed to create slide 2: Template 'nope' not found")
        );
    }

    #[test]
    fn test_auto_sequence_lengths() {
        let business = auto_sequence("Growth", 5, DeckKind::Business, true, false).unwrap();
        assert_eq!(
            ids(&business),
            vec!["title_slide", "agenda_slide", "key_metrics_dashboard", "text_with_image", "two_column_text"]
        );

        let padded = auto_sequence("Growth", 9, DeckKind::Creative, false, true).unwrap();
        assert_eq!(padded.len(), 9);
        assert_eq!(padded.last().unwrap().template_id.as_deref(), Some("thank_you_slide"));
        assert_eq!(padded[6].template_id.as_deref(), Some("text_with_image"));

        let err = auto_sequence("Growth", 2, DeckKind::Academic, true, false).unwrap_err();
        assert_eq!(err.to_string(), "Slide count must be between 3 and 20");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        std::fs::write(&path, BUILTIN_LIBRARY).unwrap();
        assert_eq!(TemplateLibrary::load(&path).unwrap().templates.len(), 12);

        let err = TemplateLibrary::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().starts_with("Template file not found"));

        std::fs::write(&path, "{ not json").unwrap();
        let err = TemplateLibrary::load(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON in template file"));
    }
}
