//! Slides, placeholders, free text and pictures.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ppt_core::design::{gradient_angle, ColorScheme};
use ppt_core::extract::extract_slide_text;
use ppt_core::media::{self, EnhanceFilter, Enhancement};
use ppt_core::text::AutoSize;
use ppt_core::text_fit::{validate_and_fix_slide, validate_text_fit};
use ppt_core::units::inches;
use ppt_core::{validate, Error, Fill, Font, Paragraph, Result, RgbColor, Run, ShapeKind, TextFrame};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::path::Path;

use super::{
    alignment, check_position, frame_in, parse, rgb, slide_mut, to_json, tool, vertical_anchor,
    with_field,
};
use crate::state::ServerState;

pub fn definitions() -> Vec<Value> {
    let pres_id = json!({"type": "string", "description": "Presentation id; defaults to the current presentation"});
    let rgb_schema = json!({"type": "array", "items": {"type": "integer"}, "minItems": 3, "maxItems": 3});
    vec![
        tool(
            "add_slide",
            "Add a new slide to the presentation with optional background styling.",
            json!({
                "layout_index": {"type": "integer", "default": 1},
                "title": {"type": "string"},
                "background_type": {"type": "string", "enum": ["solid", "gradient", "professional_gradient"]},
                "background_colors": {"type": "array", "items": rgb_schema},
                "gradient_direction": {"type": "string", "enum": ["horizontal", "vertical", "diagonal"], "default": "horizontal"},
                "color_scheme": {"type": "string", "default": "modern_blue"},
                "presentation_id": pres_id,
            }),
            &[],
        ),
        tool(
            "get_slide_info",
            "Get information about a specific slide.",
            json!({ "slide_index": {"type": "integer"}, "presentation_id": pres_id }),
            &["slide_index"],
        ),
        tool(
            "extract_slide_text",
            "Extract all text content from a specific slide.",
            json!({ "slide_index": {"type": "integer"}, "presentation_id": pres_id }),
            &["slide_index"],
        ),
        tool(
            "extract_presentation_text",
            "Extract all text content from all slides in the presentation.",
            json!({
                "include_slide_info": {"type": "boolean", "default": true},
                "presentation_id": pres_id,
            }),
            &[],
        ),
        tool(
            "populate_placeholder",
            "Populate a placeholder with text.",
            json!({
                "slide_index": {"type": "integer"},
                "placeholder_idx": {"type": "integer"},
                "text": {"type": "string"},
                "presentation_id": pres_id,
            }),
            &["slide_index", "placeholder_idx", "text"],
        ),
        tool(
            "add_bullet_points",
            "Add bullet points to a placeholder.",
            json!({
                "slide_index": {"type": "integer"},
                "placeholder_idx": {"type": "integer"},
                "bullet_points": {"type": "array", "items": {"type": "string"}},
                "presentation_id": pres_id,
            }),
            &["slide_index", "placeholder_idx", "bullet_points"],
        ),
        tool(
            "manage_text",
            "Add, format, validate or rebuild text: operations 'add', 'format', 'validate' and 'format_runs'.",
            json!({
                "slide_index": {"type": "integer"},
                "operation": {"type": "string", "enum": ["add", "format", "validate", "format_runs"]},
                "left": {"type": "number", "default": 1.0},
                "top": {"type": "number", "default": 1.0},
                "width": {"type": "number", "default": 4.0},
                "height": {"type": "number", "default": 2.0},
                "text": {"type": "string", "default": ""},
                "shape_index": {"type": "integer"},
                "text_runs": {"type": "array", "items": {"type": "object"}},
                "font_size": {"type": "number"},
                "font_name": {"type": "string"},
                "bold": {"type": "boolean"},
                "italic": {"type": "boolean"},
                "underline": {"type": "boolean"},
                "color": rgb_schema,
                "bg_color": rgb_schema,
                "alignment": {"type": "string", "enum": ["left", "center", "right", "justify"]},
                "vertical_alignment": {"type": "string", "enum": ["top", "middle", "bottom"]},
                "auto_fit": {"type": "boolean", "default": true},
                "validation_only": {"type": "boolean", "default": false},
                "min_font_size": {"type": "integer", "default": 8},
                "max_font_size": {"type": "integer", "default": 72},
                "presentation_id": pres_id,
            }),
            &["slide_index", "operation"],
        ),
        tool(
            "manage_image",
            "Add an image from a file or base64 data, or enhance an image file.",
            json!({
                "slide_index": {"type": "integer"},
                "operation": {"type": "string", "enum": ["add", "enhance"]},
                "image_source": {"type": "string", "description": "File path or base64 data"},
                "source_type": {"type": "string", "enum": ["file", "base64"], "default": "file"},
                "left": {"type": "number", "default": 1.0},
                "top": {"type": "number", "default": 1.0},
                "width": {"type": "number"},
                "height": {"type": "number"},
                "enhancement_style": {"type": "string", "enum": ["presentation", "bright", "soft", "custom"]},
                "brightness": {"type": "number", "default": 1.0},
                "contrast": {"type": "number", "default": 1.0},
                "saturation": {"type": "number", "default": 1.0},
                "sharpness": {"type": "number", "default": 1.0},
                "blur_radius": {"type": "number", "default": 0.0},
                "filter_type": {"type": "string", "enum": ["BLUR", "SHARPEN", "SMOOTH", "EDGE_ENHANCE"]},
                "output_path": {"type": "string"},
                "presentation_id": pres_id,
            }),
            &["slide_index", "operation", "image_source"],
        ),
    ]
}

pub fn call(state: &mut ServerState, name: &str, args: &Value) -> Option<Result<Value>> {
    Some(match name {
        "add_slide" => parse(args).and_then(|a| add_slide(state, a)),
        "get_slide_info" => parse(args).and_then(|a| get_slide_info(state, a)),
        "extract_slide_text" => parse(args).and_then(|a| extract_text(state, a)),
        "extract_presentation_text" => parse(args).and_then(|a| extract_presentation_text(state, a)),
        "populate_placeholder" => parse(args).and_then(|a| populate_placeholder(state, a)),
        "add_bullet_points" => parse(args).and_then(|a| add_bullet_points(state, a)),
        "manage_text" => parse(args).and_then(|a| manage_text(state, a)),
        "manage_image" => parse(args).and_then(|a| manage_image(state, a)),
        _ => return None,
    })
}

fn default_layout() -> i64 {
    1
}

fn default_direction() -> String {
    "horizontal".to_string()
}

fn default_scheme() -> String {
    "modern_blue".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct AddSlideArgs {
    #[serde(default = "default_layout")]
    layout_index: i64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    background_type: Option<String>,
    #[serde(default)]
    background_colors: Option<Vec<Vec<i64>>>,
    #[serde(default = "default_direction")]
    gradient_direction: String,
    #[serde(default = "default_scheme")]
    color_scheme: String,
    #[serde(default)]
    presentation_id: Option<String>,
}

#[derive(Deserialize)]
struct SlideArgs {
    slide_index: i64,
    #[serde(default)]
    presentation_id: Option<String>,
}

#[derive(Deserialize)]
struct PresentationTextArgs {
    #[serde(default = "default_true")]
    include_slide_info: bool,
    #[serde(default)]
    presentation_id: Option<String>,
}

#[derive(Deserialize)]
struct PlaceholderArgs {
    slide_index: i64,
    placeholder_idx: u32,
    text: String,
    #[serde(default)]
    presentation_id: Option<String>,
}

#[derive(Deserialize)]
struct BulletArgs {
    slide_index: i64,
    placeholder_idx: u32,
    bullet_points: Vec<String>,
    #[serde(default)]
    presentation_id: Option<String>,
}

fn background_fill(args: &AddSlideArgs) -> Result<Option<Fill>> {
    let Some(kind) = args.background_type.as_deref() else {
        return Ok(None);
    };
    let colors = args.background_colors.as_deref().unwrap_or_default();
    let color_at = |i: usize| -> Result<Option<RgbColor>> {
        validate::rgb("background_colors", colors.get(i).map(Vec::as_slice))
    };
    let fill = match kind {
        "solid" => {
            let color = color_at(0)?
                .ok_or_else(|| Error::invalid("A solid background needs one color in background_colors"))?;
            Fill::Solid(color)
        }
        "gradient" => match (color_at(0)?, color_at(1)?) {
            (Some(from), Some(to)) => Fill::linear(from, to, gradient_angle(&args.gradient_direction)),
            _ => {
                return Err(Error::invalid(
                    "A gradient background needs two colors in background_colors",
                ))
            }
        },
        "professional_gradient" => {
            let (from, to) = ColorScheme::named(&args.color_scheme).gradient("subtle");
            Fill::linear(from, to, gradient_angle(&args.gradient_direction))
        }
        other => {
            return Err(Error::invalid(format!(
                "Invalid background type: '{other}'. Must be 'solid', 'gradient', or 'professional_gradient'"
            )))
        }
    };
    Ok(Some(fill))
}

fn add_slide(state: &mut ServerState, args: AddSlideArgs) -> Result<Value> {
    let background = background_fill(&args)?;
    let (_, pres) = state.store.get_mut(args.presentation_id.as_deref())?;
    let index = pres.add_slide(args.layout_index)?;
    let layout_name = pres.layout(args.layout_index)?.name.clone();

    let slide = &mut pres.slides[index];
    slide.background = background;
    let mut result = json!({
        "message": format!("Added slide {index} with layout {}", args.layout_index),
        "slide_index": index,
        "layout_name": layout_name,
    });
    if let Some(title) = args.title.filter(|t| !t.is_empty()) {
        match slide.title_mut().and_then(|s| s.text.as_mut()) {
            Some(frame) => frame.set_text(&title),
            None => {
                result = with_field(
                    result,
                    "warning",
                    json!("The layout has no title placeholder; title not set"),
                )
            }
        }
    }
    Ok(result)
}

fn get_slide_info(state: &mut ServerState, args: SlideArgs) -> Result<Value> {
    let (_, pres) = state.store.get(args.presentation_id.as_deref())?;
    let slide = pres.slide(args.slide_index)?;
    let layout_name = pres.layout_of(slide).map(|l| l.name.clone()).unwrap_or_default();

    let placeholders: Vec<Value> = slide
        .shapes
        .iter()
        .filter_map(|shape| {
            let idx = shape.placeholder_idx()?;
            let kind = shape.placeholder_type()?.label();
            Some(json!({ "idx": idx, "type": kind, "name": shape.name }))
        })
        .collect();
    let shapes: Vec<Value> = slide
        .shapes
        .iter()
        .enumerate()
        .map(|(index, shape)| {
            json!({
                "index": index,
                "name": shape.name,
                "shape_type": shape.kind.type_name(),
                "left": shape.frame.left,
                "top": shape.frame.top,
                "width": shape.frame.width,
                "height": shape.frame.height,
            })
        })
        .collect();

    Ok(json!({
        "slide_index": args.slide_index,
        "layout_name": layout_name,
        "placeholder_count": placeholders.len(),
        "placeholders": placeholders,
        "shape_count": shapes.len(),
        "shapes": shapes,
    }))
}

fn extract_text(state: &mut ServerState, args: SlideArgs) -> Result<Value> {
    let (_, pres) = state.store.get(args.presentation_id.as_deref())?;
    let summary = extract_slide_text(pres.slide(args.slide_index)?);
    let result = with_field(to_json(&summary)?, "success", json!(true));
    Ok(with_field(result, "slide_index", json!(args.slide_index)))
}

fn extract_presentation_text(state: &mut ServerState, args: PresentationTextArgs) -> Result<Value> {
    let (id, pres) = state.store.get(args.presentation_id.as_deref())?;

    let mut slides_text = Vec::with_capacity(pres.slides.len());
    let mut combined = Vec::new();
    let (mut total_text_shapes, mut with_titles, mut with_tables) = (0, 0, 0);
    for (index, slide) in pres.slides.iter().enumerate() {
        let summary = extract_slide_text(slide);
        total_text_shapes += summary.total_text_shapes;
        with_titles += usize::from(summary.has_title);
        with_tables += usize::from(summary.has_tables);

        let all_text = &summary.text_content.all_text_combined;
        if !all_text.is_empty() {
            combined.push(format!("=== SLIDE {} ===", index + 1));
            combined.push(all_text.clone());
            combined.push(String::new());
        }

        let mut entry = json!({
            "slide_index": index,
            "text_content": to_json(&summary.text_content)?,
        });
        if args.include_slide_info {
            let layout_name = pres.layout_of(slide).map(|l| l.name.clone()).unwrap_or_default();
            entry = with_field(entry, "layout_name", json!(layout_name));
            entry = with_field(entry, "total_text_shapes", json!(summary.total_text_shapes));
            entry = with_field(entry, "has_title", json!(summary.has_title));
            entry = with_field(entry, "has_tables", json!(summary.has_tables));
        }
        slides_text.push(entry);
    }

    Ok(json!({
        "success": true,
        "presentation_id": id,
        "total_slides": pres.slides.len(),
        "slides_with_text": slides_text.len(),
        "total_text_shapes": total_text_shapes,
        "slides_with_titles": with_titles,
        "slides_with_tables": with_tables,
        "slides_text": slides_text,
        "all_presentation_text_combined": combined.join("\n"),
    }))
}

fn placeholder_text<'a>(
    state: &'a mut ServerState,
    presentation_id: Option<&str>,
    slide_index: i64,
    idx: u32,
) -> Result<&'a mut TextFrame> {
    let slide = slide_mut(state, presentation_id, slide_index)?;
    let shape = slide.placeholder_mut(idx).ok_or_else(|| {
        Error::NotFound(format!("Placeholder {idx} not found on slide {slide_index}"))
    })?;
    Ok(shape.text.get_or_insert_with(TextFrame::default))
}

fn populate_placeholder(state: &mut ServerState, args: PlaceholderArgs) -> Result<Value> {
    let frame = placeholder_text(
        state,
        args.presentation_id.as_deref(),
        args.slide_index,
        args.placeholder_idx,
    )?;
    frame.set_text(&args.text);
    Ok(json!({
        "message": format!(
            "Populated placeholder {} on slide {}",
            args.placeholder_idx, args.slide_index
        )
    }))
}

fn add_bullet_points(state: &mut ServerState, args: BulletArgs) -> Result<Value> {
    let frame = placeholder_text(
        state,
        args.presentation_id.as_deref(),
        args.slide_index,
        args.placeholder_idx,
    )?;
    frame.paragraphs = vec![Paragraph::default()];
    for point in &args.bullet_points {
        frame.add_paragraph(point, 0);
    }
    Ok(json!({
        "message": format!(
            "Added {} bullet points to placeholder {} on slide {}",
            args.bullet_points.len(),
            args.placeholder_idx,
            args.slide_index
        )
    }))
}

fn default_left_top() -> f64 {
    1.0
}

fn default_text_width() -> f64 {
    4.0
}

fn default_text_height() -> f64 {
    2.0
}

fn default_min_font() -> u32 {
    8
}

fn default_max_font() -> u32 {
    72
}

#[derive(Deserialize)]
struct ManageTextArgs {
    slide_index: i64,
    operation: String,
    #[serde(default = "default_left_top")]
    left: f64,
    #[serde(default = "default_left_top")]
    top: f64,
    #[serde(default = "default_text_width")]
    width: f64,
    #[serde(default = "default_text_height")]
    height: f64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    shape_index: Option<i64>,
    #[serde(default)]
    text_runs: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    font_size: Option<f64>,
    #[serde(default)]
    font_name: Option<String>,
    #[serde(default)]
    bold: Option<bool>,
    #[serde(default)]
    italic: Option<bool>,
    #[serde(default)]
    underline: Option<bool>,
    #[serde(default)]
    color: Option<Vec<i64>>,
    #[serde(default)]
    bg_color: Option<Vec<i64>>,
    #[serde(default)]
    alignment: Option<String>,
    #[serde(default)]
    vertical_alignment: Option<String>,
    #[serde(default = "default_true")]
    auto_fit: bool,
    #[serde(default)]
    validation_only: bool,
    #[serde(default = "default_min_font")]
    min_font_size: u32,
    #[serde(default = "default_max_font")]
    max_font_size: u32,
    #[serde(default)]
    presentation_id: Option<String>,
}

/// Formatting shared by the `add` and `format` operations, validated up front.
struct TextStyle {
    font: Font,
    fill: Option<RgbColor>,
    alignment: Option<ppt_core::Alignment>,
    anchor: Option<ppt_core::text::VerticalAnchor>,
}

impl TextStyle {
    fn from_args(args: &ManageTextArgs) -> Result<Self> {
        if let Some(size) = args.font_size {
            validate::positive("font_size", size)?;
        }
        Ok(Self {
            font: Font {
                name: args.font_name.clone(),
                size: args.font_size,
                bold: args.bold,
                italic: args.italic,
                underline: args.underline,
                color: rgb("color", &args.color)?,
                effects: Vec::new(),
            },
            fill: rgb("bg_color", &args.bg_color)?,
            alignment: alignment(args.alignment.as_deref())?,
            anchor: vertical_anchor(args.vertical_alignment.as_deref())?,
        })
    }

    fn apply(&self, shape: &mut ppt_core::Shape) -> Result<()> {
        let frame = shape
            .text
            .as_mut()
            .ok_or_else(|| Error::Unsupported("Shape does not contain text".to_string()))?;
        frame.apply_font(&self.font);
        if let Some(alignment) = self.alignment {
            frame.set_alignment(alignment);
        }
        if self.anchor.is_some() {
            frame.anchor = self.anchor;
        }
        if let Some(color) = self.fill {
            shape.fill = Some(Fill::Solid(color));
        }
        Ok(())
    }
}

fn required_shape(shape_index: Option<i64>, operation: &str) -> Result<i64> {
    shape_index
        .ok_or_else(|| Error::invalid(format!("shape_index is required for the {operation} operation")))
}

fn manage_text(state: &mut ServerState, args: ManageTextArgs) -> Result<Value> {
    let style = TextStyle::from_args(&args)?;
    let slide = slide_mut(state, args.presentation_id.as_deref(), args.slide_index)?;

    match args.operation.as_str() {
        "add" => {
            check_position(args.left, args.top, args.width, args.height)?;
            let frame = frame_in(args.left, args.top, args.width, args.height);
            let shape = slide.add_shape("TextBox", frame, ShapeKind::TextBox);
            if let Some(text) = shape.text.as_mut() {
                text.set_text(&args.text);
                if args.auto_fit {
                    text.auto_size = Some(AutoSize::ShapeToFitText);
                    text.word_wrap = Some(true);
                }
            }
            style.apply(shape)?;
            Ok(json!({
                "message": format!("Added text box to slide {}", args.slide_index),
                "shape_index": slide.shapes.len() - 1,
                "text": args.text,
            }))
        }
        "format" => {
            let index = required_shape(args.shape_index, "format")?;
            style.apply(slide.shape_mut(index)?)?;
            Ok(json!({
                "message": format!("Formatted text shape {index} on slide {}", args.slide_index)
            }))
        }
        "validate" => {
            let index = required_shape(args.shape_index, "validate")?;
            let font_size = args.font_size.map_or(12, |s| s.round() as u32);
            let text = (!args.text.is_empty()).then_some(args.text.as_str());
            let report = validate_text_fit(slide.shape(index)?, text, font_size);
            let needs_fix = report.needs_optimization;
            let mut result = to_json(&report)?;
            if !args.validation_only && needs_fix {
                let fixes = validate_and_fix_slide(slide, true, args.min_font_size, args.max_font_size);
                if let Value::Object(extra) = to_json(&fixes)? {
                    for (key, value) in extra {
                        result = with_field(result, &key, value);
                    }
                }
            }
            Ok(result)
        }
        "format_runs" => {
            let index = required_shape(args.shape_index, "format_runs")?;
            let runs = args
                .text_runs
                .filter(|r| !r.is_empty())
                .ok_or_else(|| Error::invalid("text_runs parameter is required for format_runs operation"))?;
            format_runs(slide.shape_mut(index)?, index, args.slide_index, runs)
        }
        other => Err(Error::invalid(format!(
            "Invalid operation: {other}. Must be 'add', 'format', 'validate', or 'format_runs'"
        ))),
    }
}

#[derive(Deserialize)]
struct RunSpec {
    text: String,
    #[serde(default)]
    bold: Option<bool>,
    #[serde(default)]
    italic: Option<bool>,
    #[serde(default)]
    underline: Option<bool>,
    #[serde(default)]
    font_size: Option<f64>,
    #[serde(default)]
    font_name: Option<String>,
    #[serde(default)]
    color: Option<Vec<i64>>,
    #[serde(default)]
    hyperlink: Option<String>,
}

/// Replace the shape's text with one paragraph built from `runs`.
///
/// Entries without a `text` key are skipped.
fn format_runs(
    shape: &mut ppt_core::Shape,
    shape_index: i64,
    slide_index: i64,
    runs: Vec<Map<String, Value>>,
) -> Result<Value> {
    let frame = shape
        .text
        .as_mut()
        .ok_or_else(|| Error::Unsupported("Shape does not contain text".to_string()))?;

    let mut paragraph = Paragraph::default();
    let mut formatted = Vec::new();
    for raw in runs.into_iter().filter(|r| r.contains_key("text")) {
        let spec: RunSpec = parse(&Value::Object(raw.clone()))?;
        let mut run = Run::new(spec.text.clone());
        run.font = Font {
            name: spec.font_name,
            size: spec.font_size,
            bold: spec.bold,
            italic: spec.italic,
            underline: spec.underline,
            color: rgb("color", &spec.color)?,
            effects: Vec::new(),
        };
        run.hyperlink = spec.hyperlink;
        paragraph.runs.push(run);

        let applied: Map<String, Value> = raw.into_iter().filter(|(k, _)| k != "text").collect();
        formatted.push(json!({ "text": spec.text, "formatting_applied": applied }));
    }
    frame.paragraphs = vec![paragraph];

    Ok(json!({
        "message": format!(
            "Applied formatting to {} text runs on shape {shape_index}",
            formatted.len()
        ),
        "slide_index": slide_index,
        "shape_index": shape_index,
        "formatted_runs": formatted,
    }))
}

fn default_source_type() -> String {
    "file".to_string()
}

fn default_factor() -> f32 {
    1.0
}

#[derive(Deserialize)]
struct ManageImageArgs {
    slide_index: i64,
    operation: String,
    image_source: String,
    #[serde(default = "default_source_type")]
    source_type: String,
    #[serde(default = "default_left_top")]
    left: f64,
    #[serde(default = "default_left_top")]
    top: f64,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    enhancement_style: Option<String>,
    #[serde(default = "default_factor")]
    brightness: f32,
    #[serde(default = "default_factor")]
    contrast: f32,
    #[serde(default = "default_factor")]
    saturation: f32,
    #[serde(default = "default_factor")]
    sharpness: f32,
    #[serde(default)]
    blur_radius: f32,
    #[serde(default)]
    filter_type: Option<String>,
    #[serde(default)]
    output_path: Option<String>,
    #[serde(default)]
    presentation_id: Option<String>,
}

fn manage_image(state: &mut ServerState, args: ManageImageArgs) -> Result<Value> {
    let slide = slide_mut(state, args.presentation_id.as_deref(), args.slide_index)?;
    let base64_source = match args.source_type.as_str() {
        "file" => false,
        "base64" => true,
        other => {
            return Err(Error::invalid(format!(
                "Invalid source_type: {other}. Must be 'file' or 'base64'"
            )))
        }
    };

    match args.operation.as_str() {
        "add" => {
            validate::non_negative("left", args.left)?;
            validate::non_negative("top", args.top)?;
            if let Some(width) = args.width {
                validate::positive("width", width)?;
            }
            if let Some(height) = args.height {
                validate::positive("height", height)?;
            }
            let loaded = if base64_source {
                let data = STANDARD
                    .decode(args.image_source.trim())
                    .map_err(|e| Error::invalid(format!("Failed to process base64 image: {e}")))?;
                media::load_image(data)?
            } else {
                media::load_image_file(Path::new(&args.image_source))?
            };
            let (width, height) = loaded.scaled_size(args.width.map(inches), args.height.map(inches));
            let frame = ppt_core::Frame::new(inches(args.left), inches(args.top), width, height);
            slide.add_shape("Picture", frame, ShapeKind::Picture(loaded.picture));
            let shape_index = slide.shapes.len() - 1;

            Ok(if base64_source {
                json!({
                    "message": format!("Added image from base64 to slide {}", args.slide_index),
                    "shape_index": shape_index,
                })
            } else {
                json!({
                    "message": format!("Added image to slide {}", args.slide_index),
                    "shape_index": shape_index,
                    "image_path": args.image_source,
                })
            })
        }
        "enhance" => {
            if base64_source {
                return Err(Error::invalid(
                    "Enhancement operation requires file path, not base64 data",
                ));
            }
            let enhancement = match args.enhancement_style.as_deref() {
                None | Some("custom") => Enhancement {
                    brightness: args.brightness,
                    contrast: args.contrast,
                    saturation: args.saturation,
                    sharpness: args.sharpness,
                    blur_radius: args.blur_radius,
                    filter: args
                        .filter_type
                        .as_deref()
                        .map(|f| {
                            EnhanceFilter::from_name(f).ok_or_else(|| {
                                Error::invalid(format!(
                                    "Invalid filter type: {f}. Must be 'BLUR', 'SHARPEN', 'SMOOTH', or 'EDGE_ENHANCE'"
                                ))
                            })
                        })
                        .transpose()?,
                },
                Some(style) => Enhancement::preset(style),
            };
            let output = args.output_path.as_deref().map(Path::new);
            let enhanced = media::enhance_image_file(Path::new(&args.image_source), &enhancement, output)?;
            Ok(json!({
                "message": format!("Enhanced image: {}", args.image_source),
                "enhanced_path": enhanced.display().to_string(),
            }))
        }
        other => Err(Error::invalid(format!(
            "Invalid operation: {other}. Must be 'add' or 'enhance'"
        ))),
    }
}
