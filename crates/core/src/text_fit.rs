//! Character-width heuristics for sizing and wrapping text in a container.
//!
//! No font metrics are loaded. Widths are estimated from four character
//! classes, which is close enough to pick a size that will not overflow.

use serde::Serialize;

use crate::shape::Shape;
use crate::slide::Slide;
use crate::units::emu_to_points;

const NARROW: f64 = 0.6;
const NORMAL: f64 = 1.0;
const WIDE: f64 = 1.3;
const SPACE: f64 = 0.5;

/// Scale from summed character weights to points per point of font size.
const WIDTH_FACTOR: f64 = 0.6;
const HEIGHT_FACTOR: f64 = 1.3;
/// Share of the container text is allowed to fill.
const FILL_RATIO: f64 = 0.9;

pub const DEFAULT_LINE_SPACING: f64 = 1.2;
pub const DEFAULT_MIN_FONT_SIZE: u32 = 8;
pub const DEFAULT_MAX_FONT_SIZE: u32 = 36;

fn char_weight(c: char) -> f64 {
    match c {
        'i' | 'l' | 't' | 'j' => NARROW,
        'm' | 'w' | 'M' | 'W' => WIDE,
        ' ' => SPACE,
        _ => NORMAL,
    }
}

/// Estimated width of `text` on one line, in points.
pub fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    let weight: f64 = text.chars().map(char_weight).sum();
    weight * font_size * WIDTH_FACTOR
}

/// Estimated height of `text`, one line per `\n`-separated segment, in points.
pub fn estimate_text_height(text: &str, font_size: f64, line_spacing: f64) -> f64 {
    let lines = text.split('\n').count() as f64;
    lines * font_size * line_spacing * HEIGHT_FACTOR
}

fn widest_line(text: &str, font_size: f64) -> f64 {
    text.split('\n')
        .map(|line| estimate_text_width(line, font_size))
        .fold(0.0, f64::max)
}

/// Largest size in `min_size..=max_size` whose text fits the container.
///
/// Container dimensions are in inches. Falls back to `min_size`.
pub fn optimal_font_size(
    text: &str,
    width_in: f64,
    height_in: f64,
    min_size: u32,
    max_size: u32,
) -> u32 {
    let width_pt = width_in * 72.0 * FILL_RATIO;
    let height_pt = height_in * 72.0 * FILL_RATIO;
    (min_size..=max_size)
        .rev()
        .find(|&size| {
            let size = size as f64;
            widest_line(text, size) <= width_pt
                && estimate_text_height(text, size, DEFAULT_LINE_SPACING) <= height_pt
        })
        .unwrap_or(min_size)
}

/// Greedy word wrap to `max_width_in` inches.
///
/// Existing line breaks are kept; a word wider than the limit gets a line of its own.
pub fn wrap_text(text: &str, max_width_in: f64, font_size: f64) -> String {
    if text.is_empty() {
        return String::new();
    }
    let max_width_pt = max_width_in * 72.0;
    let mut wrapped = Vec::new();
    for source_line in text.split('\n') {
        let mut current: Vec<&str> = Vec::new();
        for word in source_line.split_whitespace() {
            current.push(word);
            if estimate_text_width(&current.join(" "), font_size) > max_width_pt
                && current.len() > 1
            {
                current.pop();
                wrapped.push(current.join(" "));
                current = vec![word];
            }
        }
        wrapped.push(current.join(" "));
    }
    wrapped.join("\n")
}

/// Line spacing that keeps longer text readable.
pub fn dynamic_line_spacing(char_count: usize) -> f64 {
    if char_count > 300 {
        1.4
    } else if char_count > 150 {
        1.3
    } else {
        1.2
    }
}

/// Coarse length bucket used in text analysis.
pub fn length_category(char_count: usize) -> &'static str {
    match char_count {
        0..=50 => "short",
        51..=150 => "medium",
        151..=300 => "long",
        _ => "very_long",
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SuggestedDimensions {
    pub width: f64,
    pub height: f64,
}

/// Outcome of checking whether text fits a shape.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TextFitReport {
    pub fits: bool,
    pub estimated_overflow: bool,
    pub suggested_font_size: u32,
    pub suggested_dimensions: Option<SuggestedDimensions>,
    pub warnings: Vec<String>,
    pub needs_optimization: bool,
}

/// Check `text` (or the shape's own text) against the shape width at `font_size`.
pub fn validate_text_fit(shape: &Shape, text: Option<&str>, font_size: u32) -> TextFitReport {
    let mut report = TextFitReport {
        fits: true,
        estimated_overflow: false,
        suggested_font_size: font_size,
        suggested_dimensions: None,
        warnings: Vec::new(),
        needs_optimization: false,
    };

    let owned;
    let text = match text {
        Some(text) => text,
        None => {
            owned = shape.text();
            owned.as_str()
        }
    };
    let char_count = text.chars().count();
    if char_count == 0 {
        return report;
    }

    let estimated_width = char_count as f64 * font_size as f64 * WIDTH_FACTOR;
    let width_pt = emu_to_points(shape.frame.width);
    let height_pt = emu_to_points(shape.frame.height);

    if estimated_width > width_pt {
        report.fits = false;
        report.estimated_overflow = true;
        report.needs_optimization = true;
        let suggested = ((width_pt / char_count as f64) * 0.8) as u32;
        report.suggested_font_size = suggested.max(DEFAULT_MIN_FONT_SIZE);
        let dims = SuggestedDimensions {
            width: estimated_width * 1.2,
            height: height_pt,
        };
        report.warnings.push(format!(
            "Text may overflow. Consider font size {} or increase width to {:.1} points",
            report.suggested_font_size, dims.width
        ));
        report.suggested_dimensions = Some(dims);
    }

    let longest_line = text.split('\n').map(|l| l.chars().count()).max().unwrap_or(0);
    if longest_line > 100 {
        report
            .warnings
            .push("Very long lines detected. Consider adding line breaks.".to_string());
        report.needs_optimization = true;
    }

    report
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct SlideFixReport {
    pub validation_passed: bool,
    pub issues_found: Vec<String>,
    pub fixes_applied: Vec<String>,
    pub warnings: Vec<String>,
    pub shapes_processed: usize,
    pub text_shapes_optimized: usize,
    pub summary: String,
}

/// Check every text shape at 12pt and optionally shrink fonts that overflow.
pub fn validate_and_fix_slide(
    slide: &mut Slide,
    auto_fix: bool,
    min_font_size: u32,
    max_font_size: u32,
) -> SlideFixReport {
    let mut report = SlideFixReport {
        validation_passed: true,
        shapes_processed: slide.shapes.len(),
        ..Default::default()
    };

    for (index, shape) in slide.shapes.iter_mut().enumerate() {
        let text = shape.text();
        if text.trim().is_empty() {
            continue;
        }
        let label = format!("Shape {index}");
        let fit = validate_text_fit(shape, Some(&text), 12);

        if !fit.fits || fit.needs_optimization {
            report
                .issues_found
                .push(format!("{label}: Text may not fit properly"));
            report.validation_passed = false;

            if auto_fix {
                let size = fit.suggested_font_size.clamp(min_font_size, max_font_size.max(min_font_size));
                if let Some(frame) = shape.text.as_mut() {
                    for run in frame.runs_mut() {
                        run.font.size = Some(size as f64);
                    }
                }
                report
                    .fixes_applied
                    .push(format!("{label}: Adjusted font size to {size}pt"));
                report.text_shapes_optimized += 1;
            }
        }

        if text.chars().count() > 500 {
            report
                .warnings
                .push(format!("{label}: Contains very long text (>500 chars)"));
        }

        let empty_paragraphs = shape
            .text
            .as_ref()
            .map(|f| f.paragraphs.iter().filter(|p| p.is_blank()).count())
            .unwrap_or(0);
        if empty_paragraphs > 2 {
            report
                .warnings
                .push(format!("{label}: Contains {empty_paragraphs} empty paragraphs"));
        }
    }

    if slide.shapes.len() > 20 {
        report
            .warnings
            .push("Slide contains many shapes (>20), may affect performance".to_string());
    }

    report.summary = if report.validation_passed {
        "Slide validation passed successfully".to_string()
    } else {
        let mut summary = format!("Found {} issues", report.issues_found.len());
        if auto_fix {
            summary.push_str(&format!(", applied {} fixes", report.fixes_applied.len()));
        }
        summary
    };
    report
}
