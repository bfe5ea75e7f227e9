use ppt_core::shape::ConnectorKind;
use ppt_core::units::{inches, points};
use ppt_core::{validate, Error, Frame, Line, Result, ShapeKind};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse, rgb, slide_mut, tool};
use crate::state::ServerState;

pub fn definitions() -> Vec<Value> {
    let inches = json!({"type": "number", "description": "Inches"});
    vec![tool(
        "add_connector",
        "Add a connector line between two points on a slide.",
        json!({
            "slide_index": {"type": "integer"},
            "connector_type": {"type": "string", "enum": ["straight", "elbow", "curved"]},
            "start_x": inches, "start_y": inches, "end_x": inches, "end_y": inches,
            "line_width": {"type": "number", "default": 1.0, "description": "Points"},
            "color": {"type": "array", "items": {"type": "integer"}, "minItems": 3, "maxItems": 3},
            "presentation_id": {"type": "string"},
        }),
        &["slide_index", "connector_type", "start_x", "start_y", "end_x", "end_y"],
    )]
}

pub fn call(state: &mut ServerState, name: &str, args: &Value) -> Option<Result<Value>> {
    Some(match name {
        "add_connector" => parse(args).and_then(|a| add_connector(state, a)),
        _ => return None,
    })
}

fn default_line_width() -> f64 {
    1.0
}

#[derive(Deserialize)]
struct ConnectorArgs {
    slide_index: i64,
    connector_type: String,
    start_x: f64,
    start_y: f64,
    end_x: f64,
    end_y: f64,
    #[serde(default = "default_line_width")]
    line_width: f64,
    #[serde(default)]
    color: Option<Vec<i64>>,
    #[serde(default)]
    presentation_id: Option<String>,
}

fn add_connector(state: &mut ServerState, args: ConnectorArgs) -> Result<Value> {
    let kind = ConnectorKind::from_name(&args.connector_type).ok_or_else(|| {
        Error::invalid(format!(
            "Invalid connector type: '{}'. Use 'straight', 'elbow', or 'curved'",
            args.connector_type
        ))
    })?;
    for (name, value) in [
        ("start_x", args.start_x),
        ("start_y", args.start_y),
        ("end_x", args.end_x),
        ("end_y", args.end_y),
    ] {
        validate::non_negative(name, value)?;
    }
    validate::positive("line_width", args.line_width)?;
    let color = rgb("color", &args.color)?;

    let slide = slide_mut(state, args.presentation_id.as_deref(), args.slide_index)?;
    let frame = Frame::from_endpoints(
        inches(args.start_x),
        inches(args.start_y),
        inches(args.end_x),
        inches(args.end_y),
    );
    let shape = slide.add_shape("Connector", frame, ShapeKind::Connector(kind));
    shape.line = Some(Line {
        color,
        width: Some(points(args.line_width)),
        hidden: false,
    });

    Ok(json!({
        "message": format!("Added {} connector to slide {}", kind.as_name(), args.slide_index),
        "connector_type": kind.as_name(),
        "start_point": [args.start_x, args.start_y],
        "end_point": [args.end_x, args.end_y],
        "shape_index": slide.shapes.len() - 1,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{call, error_of, slide, state_with_slides};
    use super::super::is_error;
    use super::*;
    use ppt_core::RgbColor;

    #[test]
    fn test_connector_runs_right_to_left() {
        let mut state = state_with_slides(1);
        let result = call(
            &mut state,
            "add_connector",
            json!({
                "slide_index": 0, "connector_type": "Elbow",
                "start_x": 4.0, "start_y": 1.0, "end_x": 1.0, "end_y": 3.0,
                "line_width": 2.5, "color": [255, 0, 0],
            }),
        );
        assert_eq!(result["message"], "Added elbow connector to slide 0");
        assert_eq!(result["start_point"], json!([4.0, 1.0]));
        assert_eq!(result["shape_index"], 2);

        let shape = &slide(&state, 0).shapes[2];
        assert_eq!(shape.kind, ShapeKind::Connector(ConnectorKind::Elbow));
        assert_eq!(shape.frame.left, inches(1.0));
        assert_eq!(shape.frame.width, inches(3.0));
        assert!(shape.frame.flip_h);
        assert!(!shape.frame.flip_v);
        let line = shape.line.unwrap_or_default();
        assert_eq!(line.color, Some(RgbColor::new(255, 0, 0)));
        assert_eq!(line.width, Some(points(2.5)));
    }

    #[test]
    fn test_connector_validation() {
        let mut state = state_with_slides(1);
        let base = json!({"slide_index": 0, "start_x": 0.0, "start_y": 0.0, "end_x": 1.0, "end_y": 1.0});
        let mut args = base.clone();
        args["connector_type"] = json!("zigzag");
        assert!(error_of(&call(&mut state, "add_connector", args)).starts_with("Invalid connector type"));

        let mut args = base;
        args["connector_type"] = json!("straight");
        args["color"] = json!([0, 0]);
        assert!(is_error(&call(&mut state, "add_connector", args)));
        assert_eq!(slide(&state, 0).shapes.len(), 2);
    }
}
