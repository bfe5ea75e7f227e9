//! Parameter checks shared by the tools, and slide layout diagnostics.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::slide::Slide;
use crate::units::{RgbColor, EMU_PER_INCH};

pub fn positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "Invalid parameter '{name}': must be positive (got {value})"
        )))
    }
}

pub fn non_negative(name: &str, value: f64) -> Result<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "Invalid parameter '{name}': must be non-negative (got {value})"
        )))
    }
}

pub fn in_range(name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "Invalid parameter '{name}': must be between {min} and {max} (got {value})"
        )))
    }
}

/// Parse an optional `[R, G, B]` argument.
pub fn rgb(name: &str, value: Option<&[i64]>) -> Result<Option<RgbColor>> {
    match value {
        None => Ok(None),
        Some(components) => RgbColor::from_components(components)
            .map(Some)
            .map_err(|_| {
                Error::invalid(format!(
                    "Invalid parameter '{name}': must be a valid RGB list [R, G, B] with values 0-255"
                ))
            }),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OverlapPair {
    pub shape1_index: usize,
    pub shape2_index: usize,
    pub shape1_name: String,
    pub shape2_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LayoutReport {
    pub layout_valid: bool,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    pub shape_count: usize,
    pub overlapping_shapes: Vec<OverlapPair>,
}

/// Look for overlapping shapes, shapes off the slide, and tight spacing.
pub fn validate_slide_layout(slide: &Slide, slide_width: i64, slide_height: i64) -> LayoutReport {
    let shapes = &slide.shapes;
    let mut report = LayoutReport {
        layout_valid: true,
        issues: Vec::new(),
        suggestions: Vec::new(),
        shape_count: shapes.len(),
        overlapping_shapes: Vec::new(),
    };

    for (i, a) in shapes.iter().enumerate() {
        for (j, b) in shapes.iter().enumerate().skip(i + 1) {
            if a.frame.overlaps(&b.frame) {
                report.overlapping_shapes.push(OverlapPair {
                    shape1_index: i,
                    shape2_index: j,
                    shape1_name: a.name.clone(),
                    shape2_name: b.name.clone(),
                });
            }
        }
    }
    if !report.overlapping_shapes.is_empty() {
        report.layout_valid = false;
        report.issues.push(format!(
            "Found {} overlapping shapes",
            report.overlapping_shapes.len()
        ));
        report
            .suggestions
            .push("Consider repositioning overlapping shapes".to_string());
    }

    let outside = shapes
        .iter()
        .filter(|s| {
            s.frame.left < 0
                || s.frame.top < 0
                || s.frame.right() > slide_width
                || s.frame.bottom() > slide_height
        })
        .count();
    if outside > 0 {
        report.layout_valid = false;
        report
            .issues
            .push(format!("Found {outside} shapes outside slide boundaries"));
        report
            .suggestions
            .push("Reposition shapes to fit within slide boundaries".to_string());
    }

    if shapes.len() > 1 && minimum_spacing(slide) < EMU_PER_INCH / 10 {
        report
            .suggestions
            .push("Consider increasing spacing between shapes".to_string());
    }

    report
}

/// Smallest edge gap between any two shapes, in EMU. Overlapping shapes count as 0.
fn minimum_spacing(slide: &Slide) -> i64 {
    let shapes = &slide.shapes;
    let mut min = i64::MAX;
    for (i, a) in shapes.iter().enumerate() {
        for b in shapes.iter().skip(i + 1) {
            let gap_x = (b.frame.left - a.frame.right()).max(a.frame.left - b.frame.right());
            let gap_y = (b.frame.top - a.frame.bottom()).max(a.frame.top - b.frame.bottom());
            let gap = gap_x.max(gap_y).max(0);
            min = min.min(gap);
        }
    }
    if min == i64::MAX {
        0
    } else {
        min
    }
}
