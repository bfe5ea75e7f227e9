//! Shapes on a slide: geometry, fill, outline, effects, and kind-specific payloads.

use crate::chart::Chart;
use crate::error::{Error, Result};
use crate::presentation::RawXml;
use crate::table::Table;
use crate::text::TextFrame;
use crate::units::{emu_to_inches, RgbColor};

/// Position and size in EMU, plus rotation in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
    pub rotation: f64,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl Frame {
    pub fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            ..Default::default()
        }
    }

    /// Bounding frame of a line from `(x1, y1)` to `(x2, y2)`.
    ///
    /// The flips record which way the line runs inside the box.
    pub fn from_endpoints(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self {
            left: x1.min(x2),
            top: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
            rotation: 0.0,
            flip_h: x2 < x1,
            flip_v: y2 < y1,
        }
    }

    pub fn right(&self) -> i64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i64 {
        self.top + self.height
    }

    pub fn overlaps(&self, other: &Frame) -> bool {
        !(self.right() <= other.left
            || other.right() <= self.left
            || self.bottom() <= other.top
            || other.bottom() <= self.top)
    }

    /// `(left, top, width, height)` in inches.
    pub fn in_inches(&self) -> (f64, f64, f64, f64) {
        (
            emu_to_inches(self.left),
            emu_to_inches(self.top),
            emu_to_inches(self.width),
            emu_to_inches(self.height),
        )
    }
}

/// Shape or background fill.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    NoFill,
    Solid(RgbColor),
    /// Linear gradient; stop positions are fractions in 0.0-1.0.
    Gradient {
        stops: Vec<(f64, RgbColor)>,
        angle: f64,
    },
}

impl Fill {
    pub fn linear(from: RgbColor, to: RgbColor, angle: f64) -> Self {
        Fill::Gradient {
            stops: vec![(0.0, from), (1.0, to)],
            angle,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Fill::NoFill => "none",
            Fill::Solid(_) => "solid",
            Fill::Gradient { .. } => "gradient",
        }
    }
}

/// Outline. `width` is in EMU.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Line {
    pub color: Option<RgbColor>,
    pub width: Option<i64>,
    /// Draw no outline at all.
    pub hidden: bool,
}

/// Shape names accepted by `add_shape`, with their preset geometry.
pub const AUTO_SHAPES: [(&str, &str); 27] = [
    ("rectangle", "rect"),
    ("rounded_rectangle", "roundRect"),
    ("oval", "ellipse"),
    ("diamond", "diamond"),
    ("triangle", "triangle"),
    ("isosceles_triangle", "triangle"),
    ("right_triangle", "rtTriangle"),
    ("pentagon", "homePlate"),
    ("hexagon", "hexagon"),
    ("heptagon", "heptagon"),
    ("octagon", "octagon"),
    ("star", "star5"),
    ("arrow", "rightArrow"),
    ("cloud", "cloud"),
    ("heart", "heart"),
    ("lightning_bolt", "lightningBolt"),
    ("sun", "sun"),
    ("moon", "moon"),
    ("smiley_face", "smileyFace"),
    ("no_symbol", "noSmoking"),
    ("flowchart_process", "flowChartProcess"),
    ("flowchart_decision", "flowChartDecision"),
    ("flowchart_data", "flowChartInputOutput"),
    ("flowchart_document", "flowChartDocument"),
    ("flowchart_predefined_process", "flowChartPredefinedProcess"),
    ("flowchart_internal_storage", "flowChartInternalStorage"),
    ("flowchart_connector", "flowChartConnector"),
];

/// Preset geometry for a shape name, case-insensitive.
pub fn auto_shape_preset(name: &str) -> Result<&'static str> {
    let lower = name.to_ascii_lowercase();
    AUTO_SHAPES
        .iter()
        .find(|(n, _)| *n == lower)
        .map(|(_, preset)| *preset)
        .ok_or_else(|| {
            let mut names: Vec<&str> = AUTO_SHAPES.iter().map(|(n, _)| *n).collect();
            names.sort_unstable();
            Error::Unsupported(format!(
                "Unsupported shape type: '{name}'. Available shape types: {}",
                names.join(", ")
            ))
        })
}

/// Display name for a shape name: `rounded_rectangle` becomes `Rounded Rectangle`.
pub fn display_name(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub blur_pt: f64,
    pub distance_pt: f64,
    pub direction_deg: f64,
    pub color: RgbColor,
    /// Opacity, 0.0-1.0.
    pub alpha: f64,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            blur_pt: 4.0,
            distance_pt: 3.0,
            direction_deg: 315.0,
            color: RgbColor::BLACK,
            alpha: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reflection {
    pub blur_pt: f64,
    pub distance_pt: f64,
    /// Opacity at the start of the reflection, 0.0-1.0.
    pub start_alpha: f64,
    /// Fraction of the shape that is reflected, 0.0-1.0.
    pub size: f64,
}

impl Default for Reflection {
    fn default() -> Self {
        Self {
            blur_pt: 0.5,
            distance_pt: 0.0,
            start_alpha: 0.5,
            size: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub radius_pt: f64,
    pub color: RgbColor,
    pub alpha: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bevel {
    pub width_pt: f64,
    pub height_pt: f64,
}

/// Visual effects applied to a shape's `a:spPr`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeEffects {
    pub shadow: Option<Shadow>,
    pub reflection: Option<Reflection>,
    pub glow: Option<Glow>,
    /// Soft edge radius in points.
    pub soft_edges: Option<f64>,
    pub bevel: Option<Bevel>,
}

impl ShapeEffects {
    pub fn is_empty(&self) -> bool {
        *self == ShapeEffects::default()
    }

    /// True when any effect lands in `a:effectLst`.
    pub fn has_effect_list(&self) -> bool {
        self.shadow.is_some()
            || self.reflection.is_some()
            || self.glow.is_some()
            || self.soft_edges.is_some()
    }
}

/// Placeholder role, from `p:ph/@type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderType {
    Title,
    CenterTitle,
    Subtitle,
    Body,
    Object,
    Chart,
    Table,
    ClipArt,
    Diagram,
    Media,
    Picture,
    Date,
    Footer,
    SlideNumber,
    Header,
    Other(String),
}

impl PlaceholderType {
    /// Parse `p:ph/@type`. An absent attribute means `obj`.
    pub fn from_ooxml(value: Option<&str>) -> Self {
        match value.unwrap_or("obj") {
            "title" => PlaceholderType::Title,
            "ctrTitle" => PlaceholderType::CenterTitle,
            "subTitle" => PlaceholderType::Subtitle,
            "body" => PlaceholderType::Body,
            "obj" => PlaceholderType::Object,
            "chart" => PlaceholderType::Chart,
            "tbl" => PlaceholderType::Table,
            "clipArt" => PlaceholderType::ClipArt,
            "dgm" => PlaceholderType::Diagram,
            "media" => PlaceholderType::Media,
            "pic" => PlaceholderType::Picture,
            "dt" => PlaceholderType::Date,
            "ftr" => PlaceholderType::Footer,
            "sldNum" => PlaceholderType::SlideNumber,
            "hdr" => PlaceholderType::Header,
            other => PlaceholderType::Other(other.to_string()),
        }
    }

    pub fn as_ooxml(&self) -> &str {
        match self {
            PlaceholderType::Title => "title",
            PlaceholderType::CenterTitle => "ctrTitle",
            PlaceholderType::Subtitle => "subTitle",
            PlaceholderType::Body => "body",
            PlaceholderType::Object => "obj",
            PlaceholderType::Chart => "chart",
            PlaceholderType::Table => "tbl",
            PlaceholderType::ClipArt => "clipArt",
            PlaceholderType::Diagram => "dgm",
            PlaceholderType::Media => "media",
            PlaceholderType::Picture => "pic",
            PlaceholderType::Date => "dt",
            PlaceholderType::Footer => "ftr",
            PlaceholderType::SlideNumber => "sldNum",
            PlaceholderType::Header => "hdr",
            PlaceholderType::Other(value) => value,
        }
    }

    /// Upper-case label such as `TITLE` or `CENTER_TITLE`.
    pub fn label(&self) -> String {
        let label = match self {
            PlaceholderType::Title => "TITLE",
            PlaceholderType::CenterTitle => "CENTER_TITLE",
            PlaceholderType::Subtitle => "SUBTITLE",
            PlaceholderType::Body => "BODY",
            PlaceholderType::Object => "OBJECT",
            PlaceholderType::Chart => "CHART",
            PlaceholderType::Table => "TABLE",
            PlaceholderType::ClipArt => "CLIP_ART",
            PlaceholderType::Diagram => "DIAGRAM",
            PlaceholderType::Media => "MEDIA_CLIP",
            PlaceholderType::Picture => "PICTURE",
            PlaceholderType::Date => "DATE",
            PlaceholderType::Footer => "FOOTER",
            PlaceholderType::SlideNumber => "SLIDE_NUMBER",
            PlaceholderType::Header => "HEADER",
            PlaceholderType::Other(value) => return value.to_uppercase(),
        };
        label.to_string()
    }

    pub fn is_title(&self) -> bool {
        matches!(self, PlaceholderType::Title | PlaceholderType::CenterTitle)
    }

    /// Date, footer, and slide-number placeholders are not copied onto new slides.
    pub fn is_footer_like(&self) -> bool {
        matches!(
            self,
            PlaceholderType::Date | PlaceholderType::Footer | PlaceholderType::SlideNumber
        )
    }
}

/// Raster format of an embedded picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" | "jpe" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "bmp" | "dib" => Some(ImageFormat::Bmp),
            "tif" | "tiff" => Some(ImageFormat::Tiff),
            _ => None,
        }
    }

    /// Detect the format from the file signature.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(b"GIF8") {
            Some(ImageFormat::Gif)
        } else if bytes.starts_with(b"BM") {
            Some(ImageFormat::Bmp)
        } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
            Some(ImageFormat::Tiff)
        } else {
            None
        }
    }
}

/// Color transform applied to a picture's blip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageFilter {
    Grayscale,
    /// Black and white at the given threshold, 0.0-1.0.
    BlackWhite(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub description: String,
    /// Opacity removed from the picture, 0.0-1.0.
    pub transparency: Option<f64>,
    pub filter: Option<ImageFilter>,
}

impl Picture {
    pub fn new(data: Vec<u8>, format: ImageFormat) -> Self {
        Self {
            data,
            format,
            description: String::new(),
            transparency: None,
            filter: None,
        }
    }
}

/// Connector routing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorKind {
    Straight,
    Elbow,
    Curved,
}

impl ConnectorKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "straight" => Some(ConnectorKind::Straight),
            "elbow" => Some(ConnectorKind::Elbow),
            "curved" => Some(ConnectorKind::Curved),
            _ => None,
        }
    }

    pub fn as_name(&self) -> &'static str {
        match self {
            ConnectorKind::Straight => "straight",
            ConnectorKind::Elbow => "elbow",
            ConnectorKind::Curved => "curved",
        }
    }

    /// Preset geometry of the connector.
    pub fn preset(&self) -> &'static str {
        match self {
            ConnectorKind::Straight => "straightConnector1",
            ConnectorKind::Elbow => "bentConnector3",
            ConnectorKind::Curved => "curvedConnector3",
        }
    }

    pub fn from_preset(preset: &str) -> Self {
        if preset.starts_with("bentConnector") {
            ConnectorKind::Elbow
        } else if preset.starts_with("curvedConnector") {
            ConnectorKind::Curved
        } else {
            ConnectorKind::Straight
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    /// Preset geometry such as `rect` or `ellipse`.
    AutoShape { preset: String },
    TextBox,
    Placeholder {
        idx: u32,
        kind: PlaceholderType,
    },
    Picture(Picture),
    Table(Table),
    Chart(Box<Chart>),
    Connector(ConnectorKind),
    /// Written back exactly as it was read.
    Opaque(RawXml),
}

impl ShapeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ShapeKind::AutoShape { .. } => "AUTO_SHAPE",
            ShapeKind::TextBox => "TEXT_BOX",
            ShapeKind::Placeholder { .. } => "PLACEHOLDER",
            ShapeKind::Picture(_) => "PICTURE",
            ShapeKind::Table(_) => "TABLE",
            ShapeKind::Chart(_) => "CHART",
            ShapeKind::Connector(_) => "CONNECTOR",
            ShapeKind::Opaque(raw) => match raw.element.as_str() {
                "grpSp" => "GROUP",
                "graphicFrame" => "GRAPHIC_FRAME",
                _ => "OTHER",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Unique within the slide; 1 belongs to the shape tree itself.
    pub id: u32,
    pub name: String,
    pub frame: Frame,
    pub kind: ShapeKind,
    pub fill: Option<Fill>,
    pub line: Option<Line>,
    pub text: Option<TextFrame>,
    pub effects: ShapeEffects,
}

impl Shape {
    pub fn new(id: u32, name: impl Into<String>, frame: Frame, kind: ShapeKind) -> Self {
        let text = match kind {
            ShapeKind::AutoShape { .. } | ShapeKind::TextBox | ShapeKind::Placeholder { .. } => {
                Some(TextFrame::default())
            }
            _ => None,
        };
        Self {
            id,
            name: name.into(),
            frame,
            kind,
            fill: None,
            line: None,
            text,
            effects: ShapeEffects::default(),
        }
    }

    pub fn has_text_frame(&self) -> bool {
        self.text.is_some()
    }

    /// Plain text, or an empty string for shapes without a text frame.
    pub fn text(&self) -> String {
        self.text.as_ref().map(TextFrame::text).unwrap_or_default()
    }

    pub fn placeholder_idx(&self) -> Option<u32> {
        match &self.kind {
            ShapeKind::Placeholder { idx, .. } => Some(*idx),
            _ => None,
        }
    }

    pub fn placeholder_type(&self) -> Option<&PlaceholderType> {
        match &self.kind {
            ShapeKind::Placeholder { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn is_title(&self) -> bool {
        self.placeholder_type().is_some_and(PlaceholderType::is_title)
    }

    pub fn table(&self) -> Option<&Table> {
        match &self.kind {
            ShapeKind::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn table_mut(&mut self) -> Option<&mut Table> {
        match &mut self.kind {
            ShapeKind::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn chart(&self) -> Option<&Chart> {
        match &self.kind {
            ShapeKind::Chart(chart) => Some(&**chart),
            _ => None,
        }
    }

    pub fn chart_mut(&mut self) -> Option<&mut Chart> {
        match &mut self.kind {
            ShapeKind::Chart(chart) => Some(&mut **chart),
            _ => None,
        }
    }

    /// Shapes kept as markup can be listed but not edited.
    pub fn is_opaque(&self) -> bool {
        matches!(self.kind, ShapeKind::Opaque(_))
    }

    pub fn picture_mut(&mut self) -> Option<&mut Picture> {
        match &mut self.kind {
            ShapeKind::Picture(picture) => Some(picture),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_from_endpoints_records_direction() {
        let frame = Frame::from_endpoints(100, 500, 50, 200);
        assert_eq!(frame.left, 50);
        assert_eq!(frame.top, 200);
        assert_eq!(frame.width, 50);
        assert_eq!(frame.height, 300);
        assert!(frame.flip_h);
        assert!(frame.flip_v);
    }

    #[test]
    fn test_frame_overlap() {
        let a = Frame::new(0, 0, 100, 100);
        let b = Frame::new(50, 50, 100, 100);
        let c = Frame::new(100, 0, 10, 10);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_placeholder_type_roundtrip_names() {
        assert_eq!(PlaceholderType::from_ooxml(None), PlaceholderType::Object);
        assert_eq!(
            PlaceholderType::from_ooxml(Some("ctrTitle")),
            PlaceholderType::CenterTitle
        );
        assert!(PlaceholderType::from_ooxml(Some("sldNum")).is_footer_like());
        assert_eq!(PlaceholderType::CenterTitle.label(), "CENTER_TITLE");
        assert_eq!(PlaceholderType::Body.label(), "BODY");
    }

    #[test]
    fn test_image_format_detection() {
        assert_eq!(
            ImageFormat::from_magic(&[0x89, b'P', b'N', b'G', 0x0D]),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_magic(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic(b"nope"), None);
    }

    #[test]
    fn test_auto_shape_names() {
        assert_eq!(auto_shape_preset("Oval").unwrap(), "ellipse");
        assert_eq!(auto_shape_preset("flowchart_decision").unwrap(), "flowChartDecision");
        let err = auto_shape_preset("blob").unwrap_err().to_string();
        assert!(err.starts_with("Unsupported shape type: 'blob'. Available shape types: arrow, cloud"));
        assert_eq!(display_name("rounded_rectangle"), "Rounded Rectangle");
    }

    #[test]
    fn test_new_shape_text_frames() {
        let text_box = Shape::new(2, "TextBox 1", Frame::default(), ShapeKind::TextBox);
        assert!(text_box.has_text_frame());
        let connector = Shape::new(
            3,
            "Connector 2",
            Frame::default(),
            ShapeKind::Connector(ConnectorKind::Elbow),
        );
        assert!(!connector.has_text_frame());
        assert_eq!(ConnectorKind::from_preset("bentConnector3"), ConnectorKind::Elbow);
    }
}
