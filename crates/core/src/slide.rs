//! Slides, their backgrounds, and slide transitions.

use crate::error::{Error, Result};
use crate::presentation::RawXml;
use crate::shape::{Fill, Frame, Shape, ShapeKind};

/// Transition speed as stored in `p:transition/@spd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionSpeed {
    Slow,
    Medium,
    Fast,
}

impl TransitionSpeed {
    pub fn duration_ms(&self) -> u32 {
        match self {
            TransitionSpeed::Slow => 1500,
            TransitionSpeed::Medium => 1000,
            TransitionSpeed::Fast => 500,
        }
    }

    /// Nearest speed for a duration.
    pub fn from_duration_ms(ms: u32) -> Self {
        if ms <= 700 {
            TransitionSpeed::Fast
        } else if ms <= 1200 {
            TransitionSpeed::Medium
        } else {
            TransitionSpeed::Slow
        }
    }

    pub fn as_ooxml(&self) -> &'static str {
        match self {
            TransitionSpeed::Slow => "slow",
            TransitionSpeed::Medium => "med",
            TransitionSpeed::Fast => "fast",
        }
    }

    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "slow" => TransitionSpeed::Slow,
            "med" => TransitionSpeed::Medium,
            _ => TransitionSpeed::Fast,
        }
    }
}

/// Effect played when a slide appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Cut,
    Fade,
    Push,
    Wipe,
    Split,
    Cover,
    Pull,
    Dissolve,
    Zoom,
    Circle,
    Diamond,
    Plus,
    Wedge,
    Random,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 14] = [
        TransitionKind::Cut,
        TransitionKind::Fade,
        TransitionKind::Push,
        TransitionKind::Wipe,
        TransitionKind::Split,
        TransitionKind::Cover,
        TransitionKind::Pull,
        TransitionKind::Dissolve,
        TransitionKind::Zoom,
        TransitionKind::Circle,
        TransitionKind::Diamond,
        TransitionKind::Plus,
        TransitionKind::Wedge,
        TransitionKind::Random,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "uncover" => Some(TransitionKind::Pull),
            _ => Self::ALL.into_iter().find(|k| k.as_name() == name),
        }
    }

    pub fn as_name(&self) -> &'static str {
        match self {
            TransitionKind::Cut => "cut",
            TransitionKind::Fade => "fade",
            TransitionKind::Push => "push",
            TransitionKind::Wipe => "wipe",
            TransitionKind::Split => "split",
            TransitionKind::Cover => "cover",
            TransitionKind::Pull => "pull",
            TransitionKind::Dissolve => "dissolve",
            TransitionKind::Zoom => "zoom",
            TransitionKind::Circle => "circle",
            TransitionKind::Diamond => "diamond",
            TransitionKind::Plus => "plus",
            TransitionKind::Wedge => "wedge",
            TransitionKind::Random => "random",
        }
    }

    /// Local name of the child element inside `p:transition`.
    pub fn element(&self) -> &'static str {
        self.as_name()
    }

    pub fn from_element(local_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.element() == local_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub speed: TransitionSpeed,
    pub advance_on_click: bool,
    /// Advance automatically after this many milliseconds.
    pub advance_after_ms: Option<u32>,
}

impl Transition {
    pub fn new(kind: TransitionKind, duration_ms: u32) -> Self {
        Self {
            kind,
            speed: TransitionSpeed::from_duration_ms(duration_ms),
            advance_on_click: true,
            advance_after_ms: None,
        }
    }

    pub fn duration_ms(&self) -> u32 {
        self.speed.duration_ms()
    }
}

/// Which layout a slide is based on, as indices into the presentation's masters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutRef {
    pub master: usize,
    pub layout: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    /// Value of `p:sldId/@id`, unique within the presentation.
    pub slide_id: u32,
    pub layout: LayoutRef,
    pub shapes: Vec<Shape>,
    pub background: Option<Fill>,
    pub transition: Option<Transition>,
    /// Speaker notes part.
    pub notes: Option<RawXml>,
}

impl Slide {
    pub fn new(slide_id: u32, layout: LayoutRef) -> Self {
        Self {
            slide_id,
            layout,
            shapes: Vec::new(),
            background: None,
            transition: None,
            notes: None,
        }
    }

    /// Next free shape id; id 1 is reserved for the shape tree.
    pub fn next_shape_id(&self) -> u32 {
        self.shapes.iter().map(|s| s.id).max().unwrap_or(1) + 1
    }

    /// Append a shape named `"{base} {n}"` and return it for further setup.
    pub fn add_shape(&mut self, base_name: &str, frame: Frame, kind: ShapeKind) -> &mut Shape {
        let id = self.next_shape_id();
        let name = format!("{base_name} {}", id - 1);
        self.shapes.push(Shape::new(id, name, frame, kind));
        let last = self.shapes.len() - 1;
        &mut self.shapes[last]
    }

    pub fn shape(&self, index: i64) -> Result<&Shape> {
        if index < 0 || index as usize >= self.shapes.len() {
            return Err(Error::index("shape", index, self.shapes.len()));
        }
        Ok(&self.shapes[index as usize])
    }

    /// A shape to edit. Shapes kept as markup are refused.
    pub fn shape_mut(&mut self, index: i64) -> Result<&mut Shape> {
        if index < 0 || index as usize >= self.shapes.len() {
            return Err(Error::index("shape", index, self.shapes.len()));
        }
        let shape = &mut self.shapes[index as usize];
        if shape.is_opaque() {
            return Err(Error::Unsupported(format!(
                "Shape {index} ({}) is kept as read and cannot be edited",
                shape.kind.type_name()
            )));
        }
        Ok(shape)
    }

    pub fn placeholder_mut(&mut self, idx: u32) -> Option<&mut Shape> {
        self.shapes
            .iter_mut()
            .find(|s| s.placeholder_idx() == Some(idx))
    }

    pub fn title(&self) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.is_title())
    }

    pub fn title_mut(&mut self) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.is_title())
    }

    /// Text of the title placeholder, if the slide has one.
    pub fn title_text(&self) -> Option<String> {
        self.title().map(Shape::text)
    }
}
