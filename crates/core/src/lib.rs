//! Presentation object model for the PowerPoint MCP server: slides, shapes,
//! text, tables and charts, plus the layout heuristics and slide templates
//! the tools build on.

pub mod chart;
pub mod design;
pub mod error;
pub mod extract;
pub mod media;
pub mod normalize;
pub mod presentation;
pub mod shape;
pub mod slide;
pub mod slide_template;
pub mod table;
pub mod text;
pub mod text_fit;
pub mod units;
pub mod validate;

pub use chart::{Chart, ChartType, LegendPosition, Series};
pub use design::ColorScheme;
pub use error::{Error, Result};
pub use normalize::TextNormalizer;
pub use presentation::{CoreProperties, Presentation, SlideLayout, SlideMaster};
pub use shape::{Fill, Frame, Line, Shape, ShapeKind};
pub use slide::{Slide, Transition, TransitionKind};
pub use slide_template::TemplateLibrary;
pub use table::Table;
pub use text::{Alignment, Font, Paragraph, Run, TextFrame};
pub use units::RgbColor;
