//! Color-scheme restyling and shape effects.

use ppt_core::design::{enhance_slide, EnhanceOptions, COLOR_ROLES, COLOR_SCHEMES};
use ppt_core::shape::{Bevel, Glow, ImageFilter, Reflection, Shadow};
use ppt_core::text::TextFrame;
use ppt_core::{validate, ColorScheme, Error, Result, RgbColor, Shape};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{parse, slide_mut, tool};
use crate::state::ServerState;

pub fn definitions() -> Vec<Value> {
    vec![
        tool(
            "apply_professional_design",
            "Professional color schemes: list them, add a styled slide, restyle every slide, or restyle one slide.",
            json!({
                "operation": {"type": "string", "enum": ["get_schemes", "professional_slide", "theme", "enhance"]},
                "slide_index": {"type": "integer"},
                "slide_type": {"type": "string", "enum": ["title", "title_content", "content", "blank"], "default": "title_content"},
                "color_scheme": {"type": "string", "default": "modern_blue"},
                "title": {"type": "string"},
                "content": {"type": "array", "items": {"type": "string"}},
                "apply_to_existing": {"type": "boolean", "default": true},
                "enhance_title": {"type": "boolean", "default": true},
                "enhance_content": {"type": "boolean", "default": true},
                "enhance_shapes": {"type": "boolean", "default": true},
                "enhance_charts": {"type": "boolean", "default": true},
                "presentation_id": {"type": "string"},
            }),
            &["operation"],
        ),
        tool(
            "apply_picture_effects",
            "Apply shadow, reflection, glow, soft_edges, rotation, transparency, bevel and filter effects to a shape.",
            json!({
                "slide_index": {"type": "integer"},
                "shape_index": {"type": "integer"},
                "effects": {
                    "type": "object",
                    "description": "Effect name mapped to its parameters, e.g. {\"shadow\": {\"blur_radius\": 4.0}}",
                },
                "presentation_id": {"type": "string"},
            }),
            &["slide_index", "shape_index", "effects"],
        ),
    ]
}

pub fn call(state: &mut ServerState, name: &str, args: &Value) -> Option<Result<Value>> {
    Some(match name {
        "apply_professional_design" => parse(args).and_then(|a| apply_professional_design(state, a)),
        "apply_picture_effects" => parse(args).and_then(|a| apply_picture_effects(state, a)),
        _ => return None,
    })
}

fn default_true() -> bool {
    true
}

fn default_slide_type() -> String {
    "title_content".to_string()
}

fn default_scheme() -> String {
    "modern_blue".to_string()
}

#[derive(Deserialize)]
struct DesignArgs {
    operation: String,
    #[serde(default)]
    slide_index: Option<i64>,
    #[serde(default = "default_slide_type")]
    slide_type: String,
    #[serde(default = "default_scheme")]
    color_scheme: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<Vec<String>>,
    #[serde(default = "default_true")]
    apply_to_existing: bool,
    #[serde(default = "default_true")]
    enhance_title: bool,
    #[serde(default = "default_true")]
    enhance_content: bool,
    #[serde(default = "default_true")]
    enhance_shapes: bool,
    #[serde(default = "default_true")]
    enhance_charts: bool,
    #[serde(default)]
    presentation_id: Option<String>,
}

fn scheme(name: &str) -> Result<&'static ColorScheme> {
    ColorScheme::find(name).ok_or_else(|| {
        let names: Vec<&str> = COLOR_SCHEMES.iter().map(|s| s.name).collect();
        Error::invalid(format!(
            "Invalid color scheme: '{name}'. Available schemes: {}",
            names.join(", ")
        ))
    })
}

fn color_schemes() -> Value {
    let schemes: Map<String, Value> = COLOR_SCHEMES
        .iter()
        .map(|s| {
            let roles: Map<String, Value> = s
                .roles()
                .iter()
                .map(|(role, color)| (role.to_string(), json!(color.to_array())))
                .collect();
            (s.name.to_string(), Value::Object(roles))
        })
        .collect();
    json!({
        "available_schemes": COLOR_SCHEMES.iter().map(|s| s.name).collect::<Vec<_>>(),
        "schemes": schemes,
        "color_types": COLOR_ROLES,
        "description": "Professional color schemes optimized for business presentations",
    })
}

/// Layout used for each professional slide type.
fn slide_type_layout(slide_type: &str) -> i64 {
    match slide_type {
        "title" => 0,
        "content" | "blank" => 6,
        _ => 1,
    }
}

fn apply_professional_design(state: &mut ServerState, args: DesignArgs) -> Result<Value> {
    if args.operation == "get_schemes" {
        return Ok(color_schemes());
    }
    let (_, pres) = state.store.get_mut(args.presentation_id.as_deref())?;
    let scheme = scheme(&args.color_scheme)?;
    let options = EnhanceOptions {
        title: args.enhance_title,
        content: args.enhance_content,
        shapes: args.enhance_shapes,
        charts: args.enhance_charts,
    };

    match args.operation.as_str() {
        "professional_slide" => {
            let index = pres.add_slide(slide_type_layout(&args.slide_type))?;
            let slide = &mut pres.slides[index];
            if let Some(title) = args.title.filter(|t| !t.is_empty()) {
                if let Some(shape) = slide.title_mut() {
                    shape.text.get_or_insert_with(TextFrame::default).set_text(&title);
                }
            }
            if let Some(items) = args.content.filter(|c| !c.is_empty()) {
                if let Some(shape) = slide.placeholder_mut(1) {
                    let text = items
                        .iter()
                        .map(|item| format!("• {item}"))
                        .collect::<Vec<_>>()
                        .join("\n");
                    shape.text.get_or_insert_with(TextFrame::default).set_text(&text);
                }
            }
            enhance_slide(slide, scheme, EnhanceOptions::default());
            Ok(json!({
                "message": format!("Added professional {} slide", args.slide_type),
                "slide_index": index,
                "color_scheme": scheme.name,
                "slide_type": args.slide_type,
            }))
        }
        "theme" => {
            let mut slides_affected = 0;
            if args.apply_to_existing {
                for slide in &mut pres.slides {
                    if !enhance_slide(slide, scheme, options).is_empty() {
                        slides_affected += 1;
                    }
                }
            }
            log::debug!("applied {} theme to {slides_affected} slides", scheme.name);
            Ok(json!({
                "message": format!("Applied {} theme to presentation", scheme.name),
                "color_scheme": scheme.name,
                "applied_to_existing": args.apply_to_existing,
                "slides_affected": slides_affected,
            }))
        }
        "enhance" => {
            let index = args
                .slide_index
                .ok_or_else(|| Error::invalid("slide_index is required for enhance operation"))?;
            let applied = enhance_slide(pres.slide_mut(index)?, scheme, options);
            Ok(json!({
                "message": format!("Enhanced slide {index} with {} scheme", scheme.name),
                "slide_index": index,
                "color_scheme": scheme.name,
                "enhancements_applied": applied,
            }))
        }
        other => Err(Error::invalid(format!(
            "Invalid operation: {other}. Must be 'professional_slide', 'theme', 'enhance', or 'get_schemes'"
        ))),
    }
}

#[derive(Deserialize)]
struct PictureEffectsArgs {
    slide_index: i64,
    shape_index: i64,
    effects: Map<String, Value>,
    #[serde(default)]
    presentation_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(default)]
struct ShadowParams {
    shadow_type: String,
    blur_radius: f64,
    distance: f64,
    direction: f64,
    color: Vec<i64>,
    transparency: f64,
}

impl Default for ShadowParams {
    fn default() -> Self {
        Self {
            shadow_type: "outer".to_string(),
            blur_radius: 4.0,
            distance: 3.0,
            direction: 315.0,
            color: vec![0, 0, 0],
            transparency: 0.6,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct ReflectionParams {
    size: f64,
    transparency: f64,
    distance: f64,
    blur: f64,
}

impl Default for ReflectionParams {
    fn default() -> Self {
        Self {
            size: 0.5,
            transparency: 0.5,
            distance: 0.0,
            blur: 4.0,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct GlowParams {
    size: f64,
    color: Vec<i64>,
    transparency: f64,
}

impl Default for GlowParams {
    fn default() -> Self {
        Self {
            size: 5.0,
            color: vec![0, 176, 240],
            transparency: 0.4,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct SoftEdgeParams {
    radius: f64,
}

impl Default for SoftEdgeParams {
    fn default() -> Self {
        Self { radius: 2.5 }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RotationParams {
    rotation: f64,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TransparencyParams {
    transparency: f64,
}

#[derive(Deserialize)]
#[serde(default)]
struct BevelParams {
    bevel_type: String,
    width: f64,
    height: f64,
}

impl Default for BevelParams {
    fn default() -> Self {
        Self {
            bevel_type: "circle".to_string(),
            width: 6.0,
            height: 6.0,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct FilterParams {
    filter_type: String,
    intensity: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            filter_type: "none".to_string(),
            intensity: 0.5,
        }
    }
}

fn params<T: DeserializeOwned>(value: &Value) -> Result<T> {
    // `{}` and null both mean "all defaults".
    if value.is_null() {
        return parse(&json!({}));
    }
    parse(value)
}

fn opacity(name: &str, transparency: f64) -> Result<f64> {
    validate::in_range(name, transparency, 0.0, 1.0)?;
    Ok(1.0 - transparency)
}

/// Apply one named effect. `Ok(false)` means the effect name is unknown.
fn apply_effect(shape: &mut Shape, effect: &str, value: &Value) -> Result<bool> {
    match effect {
        "shadow" => {
            let p: ShadowParams = params(value)?;
            if p.shadow_type != "outer" {
                return Err(Error::Unsupported(format!(
                    "Unsupported shadow type: '{}'. Only 'outer' is supported",
                    p.shadow_type
                )));
            }
            validate::non_negative("blur_radius", p.blur_radius)?;
            shape.effects.shadow = Some(Shadow {
                blur_pt: p.blur_radius,
                distance_pt: p.distance,
                direction_deg: p.direction.rem_euclid(360.0),
                color: RgbColor::from_components(&p.color)?,
                alpha: opacity("transparency", p.transparency)?,
            });
        }
        "reflection" => {
            let p: ReflectionParams = params(value)?;
            validate::in_range("size", p.size, 0.0, 1.0)?;
            shape.effects.reflection = Some(Reflection {
                blur_pt: p.blur,
                distance_pt: p.distance,
                start_alpha: opacity("transparency", p.transparency)?,
                size: p.size,
            });
        }
        "glow" => {
            let p: GlowParams = params(value)?;
            validate::positive("size", p.size)?;
            shape.effects.glow = Some(Glow {
                radius_pt: p.size,
                color: RgbColor::from_components(&p.color)?,
                alpha: opacity("transparency", p.transparency)?,
            });
        }
        "soft_edges" => {
            let p: SoftEdgeParams = params(value)?;
            validate::positive("radius", p.radius)?;
            shape.effects.soft_edges = Some(p.radius);
        }
        "rotation" => {
            let p: RotationParams = params(value)?;
            shape.frame.rotation = p.rotation.rem_euclid(360.0);
        }
        "transparency" => {
            let p: TransparencyParams = params(value)?;
            validate::in_range("transparency", p.transparency, 0.0, 1.0)?;
            let picture = shape
                .picture_mut()
                .ok_or_else(|| Error::Unsupported("Transparency requires a picture".to_string()))?;
            picture.transparency = (p.transparency > 0.0).then_some(p.transparency);
        }
        "bevel" => {
            let p: BevelParams = params(value)?;
            if p.bevel_type != "circle" {
                return Err(Error::Unsupported(format!(
                    "Unsupported bevel type: '{}'. Only 'circle' is supported",
                    p.bevel_type
                )));
            }
            validate::positive("width", p.width)?;
            validate::positive("height", p.height)?;
            shape.effects.bevel = Some(Bevel {
                width_pt: p.width,
                height_pt: p.height,
            });
        }
        "filter" => {
            let p: FilterParams = params(value)?;
            let filter = match p.filter_type.as_str() {
                "none" => None,
                "grayscale" | "greyscale" => Some(ImageFilter::Grayscale),
                "black_white" | "black_and_white" | "bw" => {
                    validate::in_range("intensity", p.intensity, 0.0, 1.0)?;
                    Some(ImageFilter::BlackWhite(p.intensity))
                }
                other => {
                    return Err(Error::Unsupported(format!(
                        "Unsupported filter type: '{other}'. Use 'none', 'grayscale', or 'black_white'"
                    )))
                }
            };
            let picture = shape
                .picture_mut()
                .ok_or_else(|| Error::Unsupported("Filters require a picture".to_string()))?;
            picture.filter = filter;
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn apply_picture_effects(state: &mut ServerState, args: PictureEffectsArgs) -> Result<Value> {
    let slide = slide_mut(state, args.presentation_id.as_deref(), args.slide_index)?;
    let shape = slide.shape_mut(args.shape_index)?;

    let mut applied: Vec<&str> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();
    for (effect, value) in &args.effects {
        match apply_effect(shape, effect, value) {
            Ok(true) => applied.push(effect.as_str()),
            Ok(false) => warnings.push(format!("Unknown effect type: {effect}")),
            Err(e) => warnings.push(format!("Failed to apply {effect} effect: {e}")),
        }
    }

    let mut result = json!({
        "message": format!(
            "Applied {} effects to shape {} on slide {}",
            applied.len(),
            args.shape_index,
            args.slide_index
        ),
        "applied_effects": applied,
    });
    if !warnings.is_empty() {
        result["warnings"] = json!(warnings);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{call, error_of, slide, state, state_with_slides};
    use super::*;
    use ppt_core::shape::{ImageFormat, Picture};
    use ppt_core::{Fill, Frame, ShapeKind};

    #[test]
    fn test_get_schemes_needs_no_presentation() {
        let mut state = state();
        let result = call(&mut state, "apply_professional_design", json!({"operation": "get_schemes"}));
        assert_eq!(result["available_schemes"].as_array().unwrap().len(), 4);
        assert_eq!(result["schemes"]["warm_red"]["primary"], json!([192, 80, 77]));
        assert_eq!(result["color_types"][5], "text");
    }

    #[test]
    fn test_professional_slide() {
        let mut state = state_with_slides(0);
        let result = call(
            &mut state,
            "apply_professional_design",
            json!({
                "operation": "professional_slide",
                "color_scheme": "elegant_green",
                "title": "Results",
                "content": ["Revenue up", "Costs down"],
            }),
        );
        assert_eq!(result["message"], "Added professional title_content slide");
        assert_eq!(result["slide_index"], 0);

        let slide = slide(&state, 0);
        let title = slide.title().unwrap();
        assert_eq!(title.text(), "Results");
        let font = &title.text.as_ref().unwrap().paragraphs[0].runs[0].font;
        assert_eq!(font.color, Some(RgbColor::new(70, 136, 71)));
        assert_eq!(slide.shapes[1].text(), "• Revenue up\n• Costs down");
    }

    #[test]
    fn test_theme_and_enhance() {
        let mut state = state_with_slides(2);
        {
            let slide = &mut state.store.get_mut(None).unwrap().1.slides[1];
            slide.add_shape("Rectangle", Frame::new(0, 0, 100, 100), ShapeKind::AutoShape {
                preset: "rect".to_string(),
            });
        }
        let result = call(
            &mut state,
            "apply_professional_design",
            json!({"operation": "enhance", "slide_index": 1, "color_scheme": "warm_red", "enhance_title": false}),
        );
        assert_eq!(result["enhancements_applied"], json!(["shapes"]));
        let accent = ColorScheme::named("warm_red").accent1;
        assert_eq!(slide(&state, 1).shapes[2].fill, Some(Fill::Solid(accent)));

        let result = call(&mut state, "apply_professional_design", json!({"operation": "theme", "apply_to_existing": false}));
        assert_eq!(result["slides_affected"], 0);

        let result = call(&mut state, "apply_professional_design", json!({"operation": "enhance"}));
        assert_eq!(error_of(&result), "slide_index is required for enhance operation");
        let result = call(
            &mut state,
            "apply_professional_design",
            json!({"operation": "theme", "color_scheme": "neon"}),
        );
        assert!(error_of(&result).starts_with("Invalid color scheme: 'neon'"));
    }

    #[test]
    fn test_picture_effects_collect_warnings() {
        let mut state = state_with_slides(1);
        {
            let slide = &mut state.store.get_mut(None).unwrap().1.slides[0];
            slide.add_shape(
                "Picture",
                Frame::new(0, 0, 100, 100),
                ShapeKind::Picture(Picture::new(Vec::new(), ImageFormat::Png)),
            );
        }
        let result = call(
            &mut state,
            "apply_picture_effects",
            json!({
                "slide_index": 0, "shape_index": 2,
                "effects": {
                    "shadow": {"blur_radius": 6.0},
                    "glow": {},
                    "rotation": {"rotation": 450.0},
                    "filter": {"filter_type": "grayscale"},
                    "sparkle": {},
                    "transparency": {"transparency": 2.0},
                },
            }),
        );
        assert_eq!(result["message"], "Applied 4 effects to shape 2 on slide 0");
        let warnings = result["warnings"].as_array().unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w == "Unknown effect type: sparkle"));

        let shape = &slide(&state, 0).shapes[2];
        let shadow = shape.effects.shadow.unwrap();
        assert_eq!(shadow.blur_pt, 6.0);
        assert!((shadow.alpha - 0.4).abs() < 1e-9);
        assert_eq!(shape.effects.glow.unwrap().color, RgbColor::new(0, 176, 240));
        assert_eq!(shape.frame.rotation, 90.0);
        match &shape.kind {
            ShapeKind::Picture(picture) => assert_eq!(picture.filter, Some(ImageFilter::Grayscale)),
            other => panic!("expected a picture, got {other:?}"),
        }
    }

    #[test]
    fn test_picture_only_effects_on_text_shape() {
        let mut state = state_with_slides(1);
        let result = call(
            &mut state,
            "apply_picture_effects",
            json!({"slide_index": 0, "shape_index": 0, "effects": {"transparency": {"transparency": 0.3}, "soft_edges": {}}}),
        );
        assert_eq!(result["applied_effects"], json!(["soft_edges"]));
        assert_eq!(
            result["warnings"][0],
            "Failed to apply transparency effect: Transparency requires a picture"
        );
    }
}
