//! Slide templates from the JSON library, generated decks, and the text
//! fitting tools that go with them.

use ppt_core::slide_template::{auto_sequence, DeckKind, SequenceEntry, DEFAULT_SCHEME};
use ppt_core::text_fit::{
    dynamic_line_spacing, estimate_text_width, length_category, optimal_font_size, wrap_text,
    DEFAULT_MAX_FONT_SIZE, DEFAULT_MIN_FONT_SIZE,
};
use ppt_core::units::emu_to_inches;
use ppt_core::{Error, Result, Shape};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::{parse, to_json, tool, with_field};
use crate::state::ServerState;

/// Font size assumed for runs without an explicit size.
const ASSUMED_FONT_SIZE: f64 = 14.0;

pub fn definitions() -> Vec<Value> {
    let scheme = json!({"type": "string", "default": DEFAULT_SCHEME, "description": "modern_blue, corporate_gray, elegant_green or warm_red"});
    let mapping = json!({"type": "object", "additionalProperties": {"type": "string"}});
    vec![
        tool(
            "list_slide_templates",
            "List all available slide layout templates.",
            json!({}),
            &[],
        ),
        tool(
            "apply_slide_template",
            "Apply a structured layout template to an existing slide.",
            json!({
                "slide_index": {"type": "integer"},
                "template_id": {"type": "string"},
                "color_scheme": scheme,
                "content_mapping": mapping,
                "image_paths": mapping,
                "presentation_id": {"type": "string"},
            }),
            &["slide_index", "template_id"],
        ),
        tool(
            "create_slide_from_template",
            "Create a new slide using a layout template.",
            json!({
                "template_id": {"type": "string"},
                "color_scheme": scheme,
                "content_mapping": mapping,
                "image_paths": mapping,
                "layout_index": {"type": "integer", "default": 1},
                "presentation_id": {"type": "string"},
            }),
            &["template_id"],
        ),
        tool(
            "create_presentation_from_templates",
            "Append one slide per entry of a template sequence.",
            json!({
                "template_sequence": {
                    "type": "array",
                    "description": "Objects with 'template_id', 'content' and 'images'",
                    "items": {"type": "object"},
                },
                "color_scheme": scheme,
                "presentation_title": {"type": "string"},
                "presentation_id": {"type": "string"},
            }),
            &["template_sequence"],
        ),
        tool(
            "get_template_info",
            "Get detailed information about a specific template.",
            json!({"template_id": {"type": "string"}}),
            &["template_id"],
        ),
        tool(
            "auto_generate_presentation",
            "Generate a 3-20 slide deck on a topic from the template library.",
            json!({
                "topic": {"type": "string"},
                "slide_count": {"type": "integer", "default": 5, "minimum": 3, "maximum": 20},
                "presentation_type": {"type": "string", "enum": ["business", "academic", "creative"], "default": "business"},
                "color_scheme": scheme,
                "include_charts": {"type": "boolean", "default": true},
                "include_images": {"type": "boolean", "default": false},
                "presentation_id": {"type": "string"},
            }),
            &["topic"],
        ),
        tool(
            "optimize_slide_text",
            "Resize, wrap and re-space the text shapes of a slide to fit their containers.",
            json!({
                "slide_index": {"type": "integer"},
                "auto_resize": {"type": "boolean", "default": true},
                "auto_wrap": {"type": "boolean", "default": true},
                "optimize_spacing": {"type": "boolean", "default": true},
                "min_font_size": {"type": "integer", "default": DEFAULT_MIN_FONT_SIZE},
                "max_font_size": {"type": "integer", "default": DEFAULT_MAX_FONT_SIZE},
                "presentation_id": {"type": "string"},
            }),
            &["slide_index"],
        ),
        tool(
            "analyze_text_content",
            "Report text metrics and sizing recommendations for each text shape on a slide.",
            json!({
                "slide_index": {"type": "integer"},
                "provide_recommendations": {"type": "boolean", "default": true},
                "presentation_id": {"type": "string"},
            }),
            &["slide_index"],
        ),
    ]
}

pub fn call(state: &mut ServerState, name: &str, args: &Value) -> Option<Result<Value>> {
    Some(match name {
        "list_slide_templates" => list_slide_templates(state),
        "apply_slide_template" => parse(args).and_then(|a| apply_slide_template(state, a)),
        "create_slide_from_template" => {
            parse(args).and_then(|a| create_slide_from_template(state, a))
        }
        "create_presentation_from_templates" => {
            parse(args).and_then(|a| create_presentation_from_templates(state, a))
        }
        "get_template_info" => parse(args).and_then(|a| get_template_info(state, a)),
        "auto_generate_presentation" => {
            parse(args).and_then(|a| auto_generate_presentation(state, a))
        }
        "optimize_slide_text" => parse(args).and_then(|a| optimize_slide_text(state, a)),
        "analyze_text_content" => parse(args).and_then(|a| analyze_text_content(state, a)),
        _ => return None,
    })
}

fn default_scheme() -> String {
    DEFAULT_SCHEME.to_string()
}

fn default_true() -> bool {
    true
}

fn usage_examples() -> Value {
    json!({
        "single_slide_example": {
            "description": "Apply a single template to a slide",
            "code": {
                "template_id": "text_with_image",
                "color_scheme": "modern_blue",
                "content_mapping": {
                    "title": "Our Solution",
                    "content": "• Increased efficiency by 40%\n• Reduced costs significantly\n• Improved user satisfaction",
                },
                "image_paths": {"supporting": "/path/to/solution_image.jpg"},
            },
        },
        "presentation_sequence_example": {
            "description": "Create a complete presentation from templates",
            "code": [
                {
                    "template_id": "title_slide",
                    "content": {
                        "title": "2024 Business Review",
                        "subtitle": "Annual Performance Report",
                        "author": "John Smith, CEO",
                    },
                },
                {
                    "template_id": "agenda_slide",
                    "content": {
                        "agenda_items": "1. Executive Summary\n\n2. Financial Performance\n\n3. Market Analysis\n\n4. Future Strategy",
                    },
                },
                {"template_id": "key_metrics_dashboard", "content": {"title": "Key Metrics"}},
                {"template_id": "thank_you_slide", "content": {"contact": "Questions?\ncontact@company.com"}},
            ],
        },
    })
}

fn list_slide_templates(state: &mut ServerState) -> Result<Value> {
    let templates = state.library.summaries();
    Ok(json!({
        "total_templates": templates.len(),
        "available_templates": to_json(&templates)?,
        "usage_examples": usage_examples(),
        "message": "Use apply_slide_template to apply templates to slides",
    }))
}

#[derive(Deserialize)]
struct ApplyTemplateArgs {
    slide_index: i64,
    template_id: String,
    #[serde(default = "default_scheme")]
    color_scheme: String,
    #[serde(default)]
    content_mapping: Option<BTreeMap<String, String>>,
    #[serde(default)]
    image_paths: Option<BTreeMap<String, String>>,
    #[serde(default)]
    presentation_id: Option<String>,
}

fn apply_slide_template(state: &mut ServerState, args: ApplyTemplateArgs) -> Result<Value> {
    let ServerState { store, library, .. } = state;
    let (_, pres) = store.get_mut(args.presentation_id.as_deref())?;
    let slide = pres.slide_mut(args.slide_index)?;
    let applied = library.apply(
        slide,
        &args.template_id,
        &args.color_scheme,
        &args.content_mapping.unwrap_or_default(),
        &args.image_paths.unwrap_or_default(),
    )?;
    Ok(json!({
        "message": format!(
            "Applied template '{}' to slide {}",
            args.template_id, args.slide_index
        ),
        "slide_index": args.slide_index,
        "template_applied": to_json(&applied)?,
    }))
}

fn default_template_layout() -> i64 {
    1
}

#[derive(Deserialize)]
struct CreateFromTemplateArgs {
    template_id: String,
    #[serde(default = "default_scheme")]
    color_scheme: String,
    #[serde(default)]
    content_mapping: Option<BTreeMap<String, String>>,
    #[serde(default)]
    image_paths: Option<BTreeMap<String, String>>,
    #[serde(default = "default_template_layout")]
    layout_index: i64,
    #[serde(default)]
    presentation_id: Option<String>,
}

fn create_slide_from_template(state: &mut ServerState, args: CreateFromTemplateArgs) -> Result<Value> {
    let ServerState { store, library, .. } = state;
    let (_, pres) = store.get_mut(args.presentation_id.as_deref())?;
    // Reject an unknown template before a slide is added.
    library.template(&args.template_id)?;
    let slide_index = pres.add_slide(args.layout_index)?;
    let applied = library.apply(
        &mut pres.slides[slide_index],
        &args.template_id,
        &args.color_scheme,
        &args.content_mapping.unwrap_or_default(),
        &args.image_paths.unwrap_or_default(),
    )?;
    Ok(json!({
        "message": format!("Created slide {slide_index} using template '{}'", args.template_id),
        "slide_index": slide_index,
        "template_applied": to_json(&applied)?,
    }))
}

#[derive(Deserialize)]
struct SequenceArgs {
    template_sequence: Vec<SequenceEntry>,
    #[serde(default = "default_scheme")]
    color_scheme: String,
    #[serde(default)]
    presentation_title: Option<String>,
    #[serde(default)]
    presentation_id: Option<String>,
}

fn create_presentation_from_templates(state: &mut ServerState, args: SequenceArgs) -> Result<Value> {
    let ServerState { store, library, .. } = state;
    let (id, pres) = store.get_mut(args.presentation_id.as_deref())?;
    if args.template_sequence.is_empty() {
        return Err(Error::invalid("Template sequence cannot be empty"));
    }
    if let Some(title) = args.presentation_title.filter(|t| !t.is_empty()) {
        pres.core.title = title;
    }

    let result = library.build_sequence(pres, &args.template_sequence, &args.color_scheme);
    let mut response = json!({
        "presentation_id": id,
        "creation_result": to_json(&result)?,
        "total_slides": pres.slides.len(),
    });
    if result.success {
        response = with_field(
            response,
            "message",
            json!(format!("Created presentation with {} slides", result.total_slides)),
        );
    } else {
        response = with_field(response, "warning", json!("Presentation created with some errors"));
    }
    Ok(response)
}

#[derive(Deserialize)]
struct TemplateInfoArgs {
    template_id: String,
}

fn get_template_info(state: &mut ServerState, args: TemplateInfoArgs) -> Result<Value> {
    let details = match state.library.details(&args.template_id) {
        Ok(details) => details,
        Err(Error::NotFound(message)) => {
            return Ok(json!({
                "error": message,
                "available_templates": state.library.template_ids(),
            }));
        }
        Err(e) => return Err(e),
    };
    let usage_tip = format!(
        "Use create_slide_from_template with template_id='{}' to create a slide with this layout",
        args.template_id
    );
    Ok(with_field(to_json(&details)?, "usage_tip", json!(usage_tip)))
}

fn default_slide_count() -> i64 {
    5
}

fn default_deck_kind() -> String {
    "business".to_string()
}

#[derive(Deserialize)]
struct AutoGenerateArgs {
    topic: String,
    #[serde(default = "default_slide_count")]
    slide_count: i64,
    #[serde(default = "default_deck_kind")]
    presentation_type: String,
    #[serde(default = "default_scheme")]
    color_scheme: String,
    #[serde(default = "default_true")]
    include_charts: bool,
    #[serde(default)]
    include_images: bool,
    #[serde(default)]
    presentation_id: Option<String>,
}

fn auto_generate_presentation(state: &mut ServerState, args: AutoGenerateArgs) -> Result<Value> {
    let ServerState { store, library, .. } = state;
    let (_, pres) = store.get_mut(args.presentation_id.as_deref())?;
    let kind = DeckKind::from_name(&args.presentation_type);
    let sequence = auto_sequence(
        &args.topic,
        args.slide_count,
        kind,
        args.include_charts,
        args.include_images,
    )?;
    let templates_used: Vec<&str> = sequence
        .iter()
        .filter_map(|entry| entry.template_id.as_deref())
        .collect();

    let result = library.build_sequence(pres, &sequence, &args.color_scheme);
    log::debug!(
        "generated {} deck on '{}' with {} slides",
        kind.as_name(),
        args.topic,
        sequence.len()
    );
    Ok(json!({
        "message": format!(
            "Auto-generated {}-slide presentation on '{}'",
            args.slide_count, args.topic
        ),
        "topic": args.topic,
        "presentation_type": args.presentation_type,
        "color_scheme": args.color_scheme,
        "slide_count": args.slide_count,
        "generation_result": to_json(&result)?,
        "templates_used": templates_used,
    }))
}

fn default_min_font() -> u32 {
    DEFAULT_MIN_FONT_SIZE
}

fn default_max_font() -> u32 {
    DEFAULT_MAX_FONT_SIZE
}

#[derive(Deserialize)]
struct OptimizeTextArgs {
    slide_index: i64,
    #[serde(default = "default_true")]
    auto_resize: bool,
    #[serde(default = "default_true")]
    auto_wrap: bool,
    #[serde(default = "default_true")]
    optimize_spacing: bool,
    #[serde(default = "default_min_font")]
    min_font_size: u32,
    #[serde(default = "default_max_font")]
    max_font_size: u32,
    #[serde(default)]
    presentation_id: Option<String>,
}

/// Size of the first run, the one a reader sees first.
fn leading_font_size(shape: &Shape) -> f64 {
    shape
        .text
        .as_ref()
        .and_then(|frame| frame.paragraphs.first())
        .and_then(|p| p.runs.first())
        .and_then(|r| r.font.size)
        .unwrap_or(ASSUMED_FONT_SIZE)
}

fn container_inches(shape: &Shape) -> (f64, f64) {
    (
        emu_to_inches(shape.frame.width),
        emu_to_inches(shape.frame.height),
    )
}

fn optimize_slide_text(state: &mut ServerState, args: OptimizeTextArgs) -> Result<Value> {
    if args.min_font_size == 0 || args.min_font_size > args.max_font_size {
        return Err(Error::invalid(format!(
            "Invalid font size range: {}-{}pt",
            args.min_font_size, args.max_font_size
        )));
    }
    let slide = super::slide_mut(state, args.presentation_id.as_deref(), args.slide_index)?;

    let mut optimized = Vec::new();
    for (index, shape) in slide.shapes.iter_mut().enumerate() {
        let text = shape.text();
        if text.is_empty() {
            continue;
        }
        let (width, height) = container_inches(shape);
        let mut applied: Vec<String> = Vec::new();

        if args.auto_resize {
            let size = optimal_font_size(&text, width, height, DEFAULT_MIN_FONT_SIZE, DEFAULT_MAX_FONT_SIZE)
                .clamp(args.min_font_size, args.max_font_size);
            if let Some(frame) = shape.text.as_mut() {
                for run in frame.runs_mut() {
                    run.font.size = Some(size as f64);
                }
            }
            applied.push(format!("Font resized to {size}pt"));
        }

        if args.auto_wrap {
            let size = leading_font_size(shape);
            let wrapped = wrap_text(&text, width, size);
            if wrapped != text {
                if let Some(frame) = shape.text.as_mut() {
                    frame.set_text(&wrapped);
                }
                applied.push("Text wrapped automatically".to_string());
            }
        }

        if args.optimize_spacing {
            let spacing = dynamic_line_spacing(text.chars().count());
            if let Some(frame) = shape.text.as_mut() {
                for paragraph in &mut frame.paragraphs {
                    paragraph.line_spacing = Some(spacing);
                }
            }
            applied.push(format!("Line spacing set to {spacing}"));
        }

        if !applied.is_empty() {
            optimized.push(json!({ "shape_index": index, "optimizations": applied }));
        }
    }

    Ok(json!({
        "message": format!(
            "Optimized {} text elements on slide {}",
            optimized.len(),
            args.slide_index
        ),
        "slide_index": args.slide_index,
        "optimizations_applied": optimized,
        "settings": {
            "auto_resize": args.auto_resize,
            "auto_wrap": args.auto_wrap,
            "optimize_spacing": args.optimize_spacing,
            "font_size_range": format!("{}-{}pt", args.min_font_size, args.max_font_size),
        },
    }))
}

#[derive(Deserialize)]
struct AnalyzeTextArgs {
    slide_index: i64,
    #[serde(default = "default_true")]
    provide_recommendations: bool,
    #[serde(default)]
    presentation_id: Option<String>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn analyze_text_content(state: &mut ServerState, args: AnalyzeTextArgs) -> Result<Value> {
    let (_, pres) = state.store.get(args.presentation_id.as_deref())?;
    let slide = pres.slide(args.slide_index)?;

    let mut analysis = Vec::new();
    for (index, shape) in slide.shapes.iter().enumerate() {
        let text = shape.text();
        if text.is_empty() {
            continue;
        }
        let char_count = text.chars().count();
        let word_count = text.split_whitespace().count();
        let line_count = text.split('\n').count();
        let category = length_category(char_count);
        let (width, height) = container_inches(shape);
        let current = leading_font_size(shape);
        let optimal = optimal_font_size(&text, width, height, DEFAULT_MIN_FONT_SIZE, DEFAULT_MAX_FONT_SIZE) as f64;

        let mut recommendations = Vec::new();
        if args.provide_recommendations {
            if (current - optimal).abs() > 2.0 {
                recommendations.push(format!(
                    "Consider changing font size from {current}pt to {optimal}pt"
                ));
            }
            if estimate_text_width(&text, current) > width * 72.0 * 0.9 {
                recommendations.push("Text may benefit from automatic wrapping".to_string());
            }
            if char_count > 500 {
                recommendations.push("Consider breaking content into multiple slides".to_string());
            } else if word_count > 100 {
                recommendations
                    .push("Consider using bullet points for better readability".to_string());
            }
            if line_count > 3 && category == "long" {
                recommendations.push("Increase line spacing for better readability".to_string());
            }
        }

        analysis.push(json!({
            "shape_index": index,
            "metrics": {
                "character_count": char_count,
                "word_count": word_count,
                "line_count": line_count,
                "length_category": category,
            },
            "container": {
                "width_inches": round2(width),
                "height_inches": round2(height),
            },
            "font_analysis": {
                "current_size": current,
                "optimal_size": optimal,
                "size_difference": optimal - current,
            },
            "recommendations": recommendations,
        }));
    }

    let overall: Vec<&str> = if args.provide_recommendations {
        vec![
            "Use dynamic text sizing for optimal readability",
            "Enable auto-wrapping for content that exceeds container width",
            "Consider visual hierarchy with varied font sizes",
            "Break long content into multiple slides or bullet points",
        ]
    } else {
        Vec::new()
    };
    Ok(json!({
        "slide_index": args.slide_index,
        "text_elements_analyzed": analysis.len(),
        "analysis_results": analysis,
        "overall_recommendations": overall,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{call, error_of, slide, state, state_with_slides};
    use super::super::is_error;
    use super::*;

    #[test]
    fn test_list_and_info() {
        let mut state = state();
        let result = call(&mut state, "list_slide_templates", json!({}));
        assert_eq!(result["total_templates"], 12);
        assert!(result["available_templates"]
            .as_array()
            .unwrap()
            .iter()
            .any(|t| t["id"] == "title_slide"));

        let result = call(&mut state, "get_template_info", json!({"template_id": "title_slide"}));
        assert_eq!(result["template_id"], "title_slide");
        assert_eq!(result["element_count"], 4);
        assert_eq!(result["elements"][1]["role"], "title");
        assert!(result["usage_tip"].as_str().unwrap().contains("template_id='title_slide'"));

        let result = call(&mut state, "get_template_info", json!({"template_id": "nope"}));
        assert_eq!(error_of(&result), "Template 'nope' not found");
        assert_eq!(result["available_templates"].as_array().unwrap().len(), 12);
    }

    #[test]
    fn test_apply_and_create_from_template() {
        let mut state = state_with_slides(1);
        let result = call(
            &mut state,
            "apply_slide_template",
            json!({"slide_index": 0, "template_id": "title_slide", "content_mapping": {"title": "Quarterly Review"}}),
        );
        assert_eq!(result["message"], "Applied template 'title_slide' to slide 0");
        assert_eq!(result["template_applied"]["total_elements"], 4);
        assert!(slide(&state, 0).shapes.iter().any(|s| s.text().contains("Quarterly")));

        let result = call(
            &mut state,
            "create_slide_from_template",
            json!({"template_id": "thank_you_slide", "color_scheme": "warm_red"}),
        );
        assert_eq!(result["slide_index"], 1);
        assert_eq!(result["template_applied"]["color_scheme"], "warm_red");

        let result = call(&mut state, "create_slide_from_template", json!({"template_id": "missing"}));
        assert_eq!(error_of(&result), "Template 'missing' not found");
        assert_eq!(state.store.get(None).unwrap().1.slides.len(), 2);
    }

    #[test]
    fn test_sequence_reports_partial_failure() {
        let mut state = state_with_slides(0);
        let result = call(
            &mut state,
            "create_presentation_from_templates",
            json!({
                "template_sequence": [
                    {"template_id": "title_slide", "content": {"title": "Plan"}},
                    {"content": {"title": "orphan"}},
                ],
                "presentation_title": "Roadmap",
            }),
        );
        assert_eq!(result["warning"], "Presentation created with some errors");
        assert_eq!(result["total_slides"], 1);
        assert_eq!(result["creation_result"]["slides_created"][1]["error"], "No template_id specified");
        assert_eq!(state.store.get(None).unwrap().1.core.title, "Roadmap");

        let result = call(&mut state, "create_presentation_from_templates", json!({"template_sequence": []}));
        assert_eq!(error_of(&result), "Template sequence cannot be empty");
    }

    #[test]
    fn test_auto_generate() {
        let mut state = state_with_slides(0);
        let result = call(
            &mut state,
            "auto_generate_presentation",
            json!({"topic": "Solar", "slide_count": 8, "presentation_type": "academic"}),
        );
        assert_eq!(result["message"], "Auto-generated 8-slide presentation on 'Solar'");
        let used = result["templates_used"].as_array().unwrap();
        assert_eq!(used.len(), 8);
        assert_eq!(used[0], "title_slide");
        assert_eq!(used[7], "thank_you_slide");
        assert_eq!(state.store.get(None).unwrap().1.slides.len(), 8);

        let result = call(&mut state, "auto_generate_presentation", json!({"topic": "x", "slide_count": 2}));
        assert_eq!(error_of(&result), "Slide count must be between 3 and 20");
    }

    #[test]
    fn test_optimize_slide_text() {
        let mut state = state_with_slides(1);
        call(
            &mut state,
            "populate_placeholder",
            json!({"slide_index": 0, "placeholder_idx": 0, "text": "Short title"}),
        );
        let result = call(
            &mut state,
            "optimize_slide_text",
            json!({"slide_index": 0, "auto_wrap": false, "max_font_size": 20}),
        );
        assert_eq!(result["message"], "Optimized 1 text elements on slide 0");
        assert_eq!(result["settings"]["font_size_range"], "8-20pt");
        let ops = &result["optimizations_applied"][0]["optimizations"];
        assert_eq!(ops[0], "Font resized to 20pt");
        assert_eq!(ops[1], "Line spacing set to 1.2");

        let frame = slide(&state, 0).shapes[0].text.clone().unwrap();
        assert!(frame.runs().all(|r| r.font.size == Some(20.0)));
        assert_eq!(frame.paragraphs[0].line_spacing, Some(1.2));

        let result = call(
            &mut state,
            "optimize_slide_text",
            json!({"slide_index": 0, "min_font_size": 30, "max_font_size": 10}),
        );
        assert!(is_error(&result));
    }

    #[test]
    fn test_analyze_text_content() {
        let mut state = state_with_slides(1);
        call(
            &mut state,
            "populate_placeholder",
            json!({"slide_index": 0, "placeholder_idx": 0, "text": "Hello world"}),
        );
        let result = call(&mut state, "analyze_text_content", json!({"slide_index": 0}));
        assert_eq!(result["text_elements_analyzed"], 1);
        let entry = &result["analysis_results"][0];
        assert_eq!(entry["metrics"]["word_count"], 2);
        assert_eq!(entry["metrics"]["length_category"], "short");
        assert_eq!(entry["font_analysis"]["current_size"], 14.0);
        assert_eq!(result["overall_recommendations"].as_array().unwrap().len(), 4);

        let result = call(
            &mut state,
            "analyze_text_content",
            json!({"slide_index": 0, "provide_recommendations": false}),
        );
        assert!(result["analysis_results"][0]["recommendations"].as_array().unwrap().is_empty());
        assert!(result["overall_recommendations"].as_array().unwrap().is_empty());
    }
}
