//! Professional color schemes, typography presets, and slide restyling.

use crate::shape::{Fill, Line, ShapeKind};
use crate::slide::Slide;
use crate::text::Font;
use crate::units::{points, RgbColor};

/// Six named colors used to restyle a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub name: &'static str,
    pub primary: RgbColor,
    pub secondary: RgbColor,
    pub accent1: RgbColor,
    pub accent2: RgbColor,
    pub light: RgbColor,
    pub text: RgbColor,
}

pub const COLOR_ROLES: [&str; 6] = ["primary", "secondary", "accent1", "accent2", "light", "text"];

pub const COLOR_SCHEMES: [ColorScheme; 4] = [
    ColorScheme {
        name: "modern_blue",
        primary: RgbColor::new(0, 120, 215),
        secondary: RgbColor::new(40, 40, 40),
        accent1: RgbColor::new(0, 176, 240),
        accent2: RgbColor::new(255, 192, 0),
        light: RgbColor::new(247, 247, 247),
        text: RgbColor::new(68, 68, 68),
    },
    ColorScheme {
        name: "corporate_gray",
        primary: RgbColor::new(68, 68, 68),
        secondary: RgbColor::new(0, 120, 215),
        accent1: RgbColor::new(89, 89, 89),
        accent2: RgbColor::new(217, 217, 217),
        light: RgbColor::new(242, 242, 242),
        text: RgbColor::new(51, 51, 51),
    },
    ColorScheme {
        name: "elegant_green",
        primary: RgbColor::new(70, 136, 71),
        secondary: RgbColor::new(255, 255, 255),
        accent1: RgbColor::new(146, 208, 80),
        accent2: RgbColor::new(112, 173, 71),
        light: RgbColor::new(238, 236, 225),
        text: RgbColor::new(89, 89, 89),
    },
    ColorScheme {
        name: "warm_red",
        primary: RgbColor::new(192, 80, 77),
        secondary: RgbColor::new(68, 68, 68),
        accent1: RgbColor::new(230, 126, 34),
        accent2: RgbColor::new(241, 196, 15),
        light: RgbColor::new(253, 253, 253),
        text: RgbColor::new(44, 62, 80),
    },
];

impl ColorScheme {
    pub fn find(name: &str) -> Option<&'static ColorScheme> {
        COLOR_SCHEMES.iter().find(|s| s.name == name)
    }

    /// Named scheme, falling back to `modern_blue`.
    pub fn named(name: &str) -> &'static ColorScheme {
        Self::find(name).unwrap_or(&COLOR_SCHEMES[0])
    }

    /// Color for a role name; unknown roles get the primary color.
    pub fn color(&self, role: &str) -> RgbColor {
        match role {
            "secondary" => self.secondary,
            "accent1" => self.accent1,
            "accent2" => self.accent2,
            "light" => self.light,
            "text" => self.text,
            _ => self.primary,
        }
    }

    pub fn roles(&self) -> [(&'static str, RgbColor); 6] {
        COLOR_ROLES.map(|role| (role, self.color(role)))
    }

    /// Series palette for charts.
    pub fn chart_palette(&self) -> [RgbColor; 4] {
        [self.primary, self.accent1, self.accent2, self.secondary]
    }

    /// Start and end colors of a gradient style (`subtle`, `bold`, `accent`).
    pub fn gradient(&self, style: &str) -> (RgbColor, RgbColor) {
        let (from, to) = gradient_roles(style);
        (self.color(from), self.color(to))
    }
}

/// Color roles at the two ends of a gradient style.
pub fn gradient_roles(style: &str) -> (&'static str, &'static str) {
    match style {
        "subtle" => ("light", "secondary"),
        "bold" => ("primary", "accent1"),
        _ => ("accent1", "accent2"),
    }
}

/// Gradient angle in degrees for a direction name.
pub fn gradient_angle(direction: &str) -> f64 {
    match direction {
        "vertical" => 90.0,
        "diagonal" => 45.0,
        _ => 0.0,
    }
}

/// Typeface, size, and weight for a text role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontPreset {
    pub name: &'static str,
    pub size: u32,
    pub bold: bool,
}

impl FontPreset {
    pub fn to_font(self, color: Option<RgbColor>) -> Font {
        Font {
            name: Some(self.name.to_string()),
            size: Some(self.size as f64),
            bold: Some(self.bold),
            color,
            ..Default::default()
        }
    }
}

/// Preset for `role` (`title`, `subtitle`, `body`, `caption`) at `size` (`large`, `medium`, `small`).
///
/// Unknown roles use `body`; unknown sizes use `medium`.
pub fn professional_font(role: &str, size: &str) -> FontPreset {
    let (name, sizes, bold) = match role {
        "title" => ("Segoe UI", [36, 28, 24], true),
        "subtitle" => ("Segoe UI Light", [20, 18, 16], false),
        "caption" => ("Segoe UI", [12, 10, 9], false),
        _ => ("Segoe UI", [16, 14, 12], false),
    };
    let size = match size {
        "large" => sizes[0],
        "small" => sizes[2],
        _ => sizes[1],
    };
    FontPreset { name, size, bold }
}

/// Which parts of a slide to restyle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnhanceOptions {
    pub title: bool,
    pub content: bool,
    pub shapes: bool,
    pub charts: bool,
}

impl Default for EnhanceOptions {
    fn default() -> Self {
        Self {
            title: true,
            content: true,
            shapes: true,
            charts: true,
        }
    }
}

/// Restyle a slide with a color scheme. Returns the areas that changed.
pub fn enhance_slide(slide: &mut Slide, scheme: &ColorScheme, options: EnhanceOptions) -> Vec<String> {
    let mut applied = Vec::new();
    let title_font = professional_font("title", "large").to_font(Some(scheme.primary));
    let body_font = professional_font("body", "medium").to_font(Some(scheme.text));

    if options.title {
        if let Some(frame) = slide.title_mut().and_then(|s| s.text.as_mut()) {
            frame.apply_font(&title_font);
            applied.push("title".to_string());
        }
    }

    if options.content {
        let mut touched = false;
        for shape in slide.shapes.iter_mut().filter(|s| !s.is_title()) {
            if let Some(frame) = shape.text.as_mut() {
                if !frame.is_blank() {
                    frame.apply_font(&Font {
                        size: None,
                        ..body_font.clone()
                    });
                    touched = true;
                }
            }
        }
        if touched {
            applied.push("content".to_string());
        }
    }

    if options.shapes {
        let mut touched = false;
        for shape in &mut slide.shapes {
            if matches!(shape.kind, ShapeKind::AutoShape { .. }) {
                shape.fill = Some(Fill::Solid(scheme.accent1));
                shape.line = Some(Line {
                    color: Some(scheme.primary),
                    width: Some(points(1.0)),
                    ..Default::default()
                });
                touched = true;
            }
        }
        if touched {
            applied.push("shapes".to_string());
        }
    }

    if options.charts {
        let palette = scheme.chart_palette();
        let mut touched = false;
        for chart in slide.shapes.iter_mut().filter_map(|s| s.chart_mut()) {
            chart.apply_palette(&palette);
            touched = true;
        }
        if touched {
            applied.push("charts".to_string());
        }
    }

    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Chart, ChartType, Series};
    use crate::shape::{Frame, PlaceholderType};
    use crate::slide::LayoutRef;
    use crate::text::TextFrame;

    #[test]
    fn test_scheme_lookup_and_fallback() {
        assert_eq!(ColorScheme::named("warm_red").primary, RgbColor::new(192, 80, 77));
        assert_eq!(ColorScheme::named("nope").name, "modern_blue");
        let scheme = ColorScheme::named("modern_blue");
        assert_eq!(scheme.color("accent2"), RgbColor::new(255, 192, 0));
        assert_eq!(scheme.color("unknown"), scheme.primary);
        assert_eq!(scheme.roles()[4].0, "light");
    }

    #[test]
    fn test_gradient_styles() {
        let scheme = ColorScheme::named("modern_blue");
        assert_eq!(scheme.gradient("subtle"), (scheme.light, scheme.secondary));
        assert_eq!(scheme.gradient("bold"), (scheme.primary, scheme.accent1));
        assert_eq!(scheme.gradient("accent"), (scheme.accent1, scheme.accent2));
        assert_eq!(gradient_angle("vertical"), 90.0);
        assert_eq!(gradient_angle("horizontal"), 0.0);
    }

    #[test]
    fn test_font_presets() {
        assert_eq!(
            professional_font("title", "large"),
            FontPreset {
                name: "Segoe UI",
                size: 36,
                bold: true
            }
        );
        assert_eq!(professional_font("subtitle", "small").size, 16);
        assert_eq!(professional_font("mystery", "huge").size, 14);
    }

    #[test]
    fn test_enhance_slide_styles_each_area() {
        let mut slide = Slide::new(256, LayoutRef::default());
        slide
            .add_shape(
                "Title",
                Frame::default(),
                ShapeKind::Placeholder {
                    idx: 0,
                    kind: PlaceholderType::Title,
                },
            )
            .text = Some(TextFrame::from_text("Title"));
        slide
            .add_shape("TextBox", Frame::default(), ShapeKind::TextBox)
            .text = Some(TextFrame::from_text("Body"));
        slide.add_shape(
            "Rectangle",
            Frame::default(),
            ShapeKind::AutoShape {
                preset: "rect".into(),
            },
        );
        let chart = Chart::new(
            ChartType::Column,
            vec!["A".into()],
            vec![Series::new("S", vec![1.0])],
        )
        .unwrap();
        slide.add_shape("Chart", Frame::default(), ShapeKind::Chart(Box::new(chart)));

        let scheme = ColorScheme::named("elegant_green");
        let applied = enhance_slide(&mut slide, scheme, EnhanceOptions::default());
        assert_eq!(applied, vec!["title", "content", "shapes", "charts"]);

        let title_run = &slide.shapes[0].text.as_ref().unwrap().paragraphs[0].runs[0];
        assert_eq!(title_run.font.size, Some(36.0));
        assert_eq!(title_run.font.color, Some(scheme.primary));
        assert_eq!(slide.shapes[2].fill, Some(Fill::Solid(scheme.accent1)));
        assert_eq!(
            slide.shapes[3].chart().unwrap().series[0].color,
            Some(scheme.primary)
        );
    }
}
