//! Text frames, paragraphs, runs, and character formatting.

use serde::{Deserialize, Serialize};

use crate::units::RgbColor;

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "left" => Some(Alignment::Left),
            "center" | "centre" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            "justify" | "justified" => Some(Alignment::Justify),
            _ => None,
        }
    }

    pub fn as_name(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }

    /// Value of `a:pPr/@algn`.
    pub fn as_ooxml(&self) -> &'static str {
        match self {
            Alignment::Left => "l",
            Alignment::Center => "ctr",
            Alignment::Right => "r",
            Alignment::Justify => "just",
        }
    }

    pub fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "l" => Some(Alignment::Left),
            "ctr" => Some(Alignment::Center),
            "r" => Some(Alignment::Right),
            "just" | "dist" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// Vertical anchoring of text inside its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    Top,
    Middle,
    Bottom,
}

impl VerticalAnchor {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "top" => Some(VerticalAnchor::Top),
            "middle" | "center" | "centre" => Some(VerticalAnchor::Middle),
            "bottom" => Some(VerticalAnchor::Bottom),
            _ => None,
        }
    }

    pub fn as_name(&self) -> &'static str {
        match self {
            VerticalAnchor::Top => "top",
            VerticalAnchor::Middle => "middle",
            VerticalAnchor::Bottom => "bottom",
        }
    }

    pub fn as_ooxml(&self) -> &'static str {
        match self {
            VerticalAnchor::Top => "t",
            VerticalAnchor::Middle => "ctr",
            VerticalAnchor::Bottom => "b",
        }
    }

    pub fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "t" => Some(VerticalAnchor::Top),
            "ctr" => Some(VerticalAnchor::Middle),
            "b" => Some(VerticalAnchor::Bottom),
            _ => None,
        }
    }
}

/// Autofit behavior of a text body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSize {
    None,
    ShapeToFitText,
    TextToFitShape,
}

/// Character-level effects beyond plain formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum TextEffect {
    Shadow {
        color: RgbColor,
        blur_pt: f64,
        distance_pt: f64,
        direction_deg: f64,
        alpha: f64,
    },
    Glow {
        color: RgbColor,
        radius_pt: f64,
        alpha: f64,
    },
    Outline {
        color: RgbColor,
        width_pt: f64,
    },
}

impl TextEffect {
    pub fn kind(&self) -> &'static str {
        match self {
            TextEffect::Shadow { .. } => "shadow",
            TextEffect::Glow { .. } => "glow",
            TextEffect::Outline { .. } => "outline",
        }
    }
}

/// Run formatting. `None` fields inherit from the layout and master.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Font {
    pub name: Option<String>,
    /// Size in points.
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub color: Option<RgbColor>,
    pub effects: Vec<TextEffect>,
}

impl Font {
    /// Overlay every field `other` sets onto `self`.
    pub fn merge(&mut self, other: &Font) {
        if other.name.is_some() {
            self.name.clone_from(&other.name);
        }
        if other.size.is_some() {
            self.size = other.size;
        }
        if other.bold.is_some() {
            self.bold = other.bold;
        }
        if other.italic.is_some() {
            self.italic = other.italic;
        }
        if other.underline.is_some() {
            self.underline = other.underline;
        }
        if other.color.is_some() {
            self.color = other.color;
        }
        for effect in &other.effects {
            self.effects.retain(|e| e.kind() != effect.kind());
            self.effects.push(effect.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Font::default()
    }
}

/// A run of uniformly formatted text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub text: String,
    pub font: Font,
    /// Target address of a click hyperlink.
    pub hyperlink: Option<String>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub alignment: Option<Alignment>,
    /// Outline level, 0-8.
    pub level: u32,
    /// Line spacing as a multiple of single spacing.
    pub line_spacing: Option<f64>,
}

impl Paragraph {
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let runs = if text.is_empty() {
            Vec::new()
        } else {
            vec![Run::new(text)]
        };
        Self {
            runs,
            ..Default::default()
        }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    pub fn apply_font(&mut self, font: &Font) {
        for run in &mut self.runs {
            run.font.merge(font);
        }
    }
}

/// The text body of a shape or table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFrame {
    pub paragraphs: Vec<Paragraph>,
    pub word_wrap: Option<bool>,
    pub auto_size: Option<AutoSize>,
    pub anchor: Option<VerticalAnchor>,
}

impl Default for TextFrame {
    fn default() -> Self {
        Self {
            paragraphs: vec![Paragraph::default()],
            word_wrap: None,
            auto_size: None,
            anchor: None,
        }
    }
}

impl TextFrame {
    /// One paragraph per line of `text`.
    pub fn from_text(text: &str) -> Self {
        let mut frame = Self::default();
        frame.set_text(text);
        frame
    }

    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace all text, splitting paragraphs on line breaks.
    ///
    /// The first run's formatting carries over to the new runs.
    pub fn set_text(&mut self, text: &str) {
        let carried = self
            .paragraphs
            .iter()
            .flat_map(|p| p.runs.first())
            .next()
            .map(|r| r.font.clone());
        let alignment = self.paragraphs.first().and_then(|p| p.alignment);

        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        self.paragraphs = normalized
            .split('\n')
            .map(|line| {
                let mut para = Paragraph::with_text(line);
                para.alignment = alignment;
                if let Some(font) = &carried {
                    para.apply_font(font);
                }
                para
            })
            .collect();
    }

    pub fn add_paragraph(&mut self, text: &str, level: u32) -> &mut Paragraph {
        if self.paragraphs.len() == 1 && self.paragraphs[0].runs.is_empty() {
            self.paragraphs.clear();
        }
        let mut para = Paragraph::with_text(text);
        para.level = level.min(8);
        self.paragraphs.push(para);
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    pub fn apply_font(&mut self, font: &Font) {
        for para in &mut self.paragraphs {
            para.apply_font(font);
        }
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        for para in &mut self.paragraphs {
            para.alignment = Some(alignment);
        }
    }

    pub fn is_blank(&self) -> bool {
        self.paragraphs.iter().all(Paragraph::is_blank)
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.paragraphs.iter().flat_map(|p| p.runs.iter())
    }

    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.paragraphs.iter_mut().flat_map(|p| p.runs.iter_mut())
    }

    /// Largest explicit run size, if any run sets one.
    pub fn max_font_size(&self) -> Option<f64> {
        self.runs()
            .filter_map(|r| r.font.size)
            .fold(None, |acc, s| Some(acc.map_or(s, |a: f64| a.max(s))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_splits_paragraphs() {
        let frame = TextFrame::from_text("One\nTwo\r\nThree");
        assert_eq!(frame.paragraphs.len(), 3);
        assert_eq!(frame.text(), "One\nTwo\nThree");
    }

    #[test]
    fn test_set_text_keeps_first_run_font() {
        let mut frame = TextFrame::from_text("Old");
        frame.apply_font(&Font {
            bold: Some(true),
            size: Some(24.0),
            ..Default::default()
        });
        frame.set_text("New\nLines");
        for run in frame.runs() {
            assert_eq!(run.font.bold, Some(true));
            assert_eq!(run.font.size, Some(24.0));
        }
    }

    #[test]
    fn test_add_paragraph_replaces_empty_placeholder_paragraph() {
        let mut frame = TextFrame::default();
        frame.add_paragraph("First", 0);
        frame.add_paragraph("Second", 12);
        assert_eq!(frame.paragraphs.len(), 2);
        assert_eq!(frame.paragraphs[1].level, 8);
    }

    #[test]
    fn test_font_merge_replaces_effects_of_same_kind() {
        let mut font = Font {
            effects: vec![TextEffect::Outline {
                color: RgbColor::BLACK,
                width_pt: 1.0,
            }],
            ..Default::default()
        };
        font.merge(&Font {
            italic: Some(true),
            effects: vec![TextEffect::Outline {
                color: RgbColor::WHITE,
                width_pt: 2.0,
            }],
            ..Default::default()
        });
        assert_eq!(font.italic, Some(true));
        assert_eq!(font.effects.len(), 1);
        assert_eq!(
            font.effects[0],
            TextEffect::Outline {
                color: RgbColor::WHITE,
                width_pt: 2.0
            }
        );
    }

    #[test]
    fn test_alignment_names() {
        assert_eq!(Alignment::from_name("Center"), Some(Alignment::Center));
        assert_eq!(Alignment::Center.as_ooxml(), "ctr");
        assert_eq!(Alignment::from_ooxml("just"), Some(Alignment::Justify));
        assert_eq!(Alignment::from_name("diagonal"), None);
    }

    #[test]
    fn test_max_font_size() {
        let mut frame = TextFrame::from_text("a\nb");
        assert_eq!(frame.max_font_size(), None);
        frame.paragraphs[1].runs[0].font.size = Some(18.0);
        assert_eq!(frame.max_font_size(), Some(18.0));
    }
}
