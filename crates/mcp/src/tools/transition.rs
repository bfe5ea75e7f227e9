//! Slide transitions, stored on the slide and written as `p:transition`.

use ppt_core::slide::TransitionKind;
use ppt_core::{validate, Error, Result, Transition};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse, slide_mut, tool};
use crate::state::ServerState;

pub fn definitions() -> Vec<Value> {
    let kinds: Vec<&str> = TransitionKind::ALL.iter().map(TransitionKind::as_name).collect();
    vec![tool(
        "manage_slide_transitions",
        "Get, set or remove the transition of a slide.",
        json!({
            "slide_index": {"type": "integer"},
            "operation": {"type": "string", "enum": ["get", "set", "remove"]},
            "transition_type": {"type": "string", "enum": kinds},
            "duration": {"type": "number", "default": 1.0, "description": "Seconds; mapped to fast, medium or slow"},
            "presentation_id": {"type": "string"},
        }),
        &["slide_index", "operation"],
    )]
}

pub fn call(state: &mut ServerState, name: &str, args: &Value) -> Option<Result<Value>> {
    Some(match name {
        "manage_slide_transitions" => parse(args).and_then(|a| manage_slide_transitions(state, a)),
        _ => return None,
    })
}

fn default_duration() -> f64 {
    1.0
}

#[derive(Deserialize)]
struct TransitionArgs {
    slide_index: i64,
    operation: String,
    #[serde(default)]
    transition_type: Option<String>,
    #[serde(default = "default_duration")]
    duration: f64,
    #[serde(default)]
    presentation_id: Option<String>,
}

fn describe(transition: &Transition) -> Value {
    json!({
        "transition_type": transition.kind.as_name(),
        "speed": transition.speed.as_ooxml(),
        "duration": transition.duration_ms() as f64 / 1000.0,
    })
}

fn manage_slide_transitions(state: &mut ServerState, args: TransitionArgs) -> Result<Value> {
    let slide = slide_mut(state, args.presentation_id.as_deref(), args.slide_index)?;
    let index = args.slide_index;

    match args.operation.as_str() {
        "get" => Ok(json!({
            "message": format!("Transition info for slide {index}"),
            "slide_index": index,
            "has_transition": slide.transition.is_some(),
            "transition": slide.transition.as_ref().map(describe),
        })),
        "set" => {
            let name = args
                .transition_type
                .as_deref()
                .ok_or_else(|| Error::invalid("transition_type is required for the set operation"))?;
            let kind = TransitionKind::from_name(name).ok_or_else(|| {
                let valid: Vec<&str> = TransitionKind::ALL.iter().map(TransitionKind::as_name).collect();
                Error::invalid(format!(
                    "Invalid transition type: '{name}'. Valid types are: {}",
                    valid.join(", ")
                ))
            })?;
            validate::positive("duration", args.duration)?;
            let transition = Transition::new(kind, (args.duration * 1000.0).round() as u32);
            slide.transition = Some(transition);
            log::debug!("slide {index}: transition {}", kind.as_name());
            Ok(json!({
                "message": format!("Set {} transition on slide {index}", kind.as_name()),
                "slide_index": index,
                "transition": describe(&transition),
            }))
        }
        "remove" => {
            let removed = slide.transition.take();
            Ok(json!({
                "message": if removed.is_some() {
                    format!("Removed transition from slide {index}")
                } else {
                    format!("Slide {index} has no transition")
                },
                "slide_index": index,
                "removed": removed.as_ref().map(describe),
            }))
        }
        other => Err(Error::invalid(format!(
            "Unsupported operation: {other}. Use 'set', 'remove', or 'get'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{call, error_of, slide, state_with_slides};
    use super::*;
    use ppt_core::slide::TransitionSpeed;

    #[test]
    fn test_set_get_remove() {
        let mut state = state_with_slides(2);
        let result = call(
            &mut state,
            "manage_slide_transitions",
            json!({"slide_index": 1, "operation": "set", "transition_type": "Fade", "duration": 0.5}),
        );
        assert_eq!(result["transition"]["speed"], "fast");
        let stored = slide(&state, 1).transition.unwrap();
        assert_eq!(stored.kind, TransitionKind::Fade);
        assert_eq!(stored.speed, TransitionSpeed::Fast);

        let result = call(&mut state, "manage_slide_transitions", json!({"slide_index": 1, "operation": "get"}));
        assert_eq!(result["has_transition"], true);
        assert_eq!(result["transition"]["transition_type"], "fade");
        assert_eq!(result["transition"]["duration"], 0.5);

        let result = call(&mut state, "manage_slide_transitions", json!({"slide_index": 1, "operation": "remove"}));
        assert_eq!(result["removed"]["transition_type"], "fade");
        assert!(slide(&state, 1).transition.is_none());
        let result = call(&mut state, "manage_slide_transitions", json!({"slide_index": 1, "operation": "get"}));
        assert_eq!(result["has_transition"], false);
    }

    #[test]
    fn test_duration_maps_to_speed() {
        let mut state = state_with_slides(1);
        for (duration, speed) in [(0.7, "fast"), (1.2, "med"), (2.0, "slow")] {
            let result = call(
                &mut state,
                "manage_slide_transitions",
                json!({"slide_index": 0, "operation": "set", "transition_type": "push", "duration": duration}),
            );
            assert_eq!(result["transition"]["speed"], speed, "{duration}");
        }
    }

    #[test]
    fn test_invalid_transition() {
        let mut state = state_with_slides(1);
        let result = call(
            &mut state,
            "manage_slide_transitions",
            json!({"slide_index": 0, "operation": "set", "transition_type": "spin"}),
        );
        assert!(error_of(&result).starts_with("Invalid transition type: 'spin'"));
        let result = call(&mut state, "manage_slide_transitions", json!({"slide_index": 0, "operation": "fly"}));
        assert!(error_of(&result).starts_with("Unsupported operation: fly"));
    }
}
