//! MCP tool modules and the registry that dispatches to them.
//!
//! Each module exposes `definitions()` for `tools/list` and `call()`, which
//! returns `None` for names it does not own. A handler error becomes an
//! `{"error": ...}` result rather than a protocol failure.

pub mod chart;
pub mod connector;
pub mod content;
pub mod hyperlink;
pub mod master;
pub mod presentation;
pub mod professional;
pub mod structural;
pub mod template;
pub mod transition;

use ppt_core::shape::Frame;
use ppt_core::text::VerticalAnchor;
use ppt_core::units::inches;
use ppt_core::{validate, Alignment, Error, Result, RgbColor, Slide};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::state::ServerState;

type Handler = fn(&mut ServerState, &str, &Value) -> Option<Result<Value>>;

const HANDLERS: [Handler; 10] = [
    presentation::call,
    content::call,
    structural::call,
    chart::call,
    hyperlink::call,
    connector::call,
    master::call,
    transition::call,
    template::call,
    professional::call,
];

/// Every tool, as advertised by `tools/list`.
pub fn definitions() -> Vec<Value> {
    [
        presentation::definitions(),
        content::definitions(),
        structural::definitions(),
        chart::definitions(),
        hyperlink::definitions(),
        connector::definitions(),
        master::definitions(),
        transition::definitions(),
        template::definitions(),
        professional::definitions(),
    ]
    .concat()
}

/// Run tool `name`. Returns `None` when no tool has that name.
pub fn call_tool(state: &mut ServerState, name: &str, args: &Value) -> Option<Value> {
    let result = HANDLERS
        .iter()
        .find_map(|handler| handler(state, name, args))?;
    Some(match result {
        Ok(value) => value,
        Err(e) => {
            log::debug!("tool {name} failed: {e}");
            json!({ "error": e.to_string() })
        }
    })
}

/// True when a tool result reports a failure.
pub fn is_error(result: &Value) -> bool {
    result.get("error").is_some()
}

pub(crate) fn tool(name: &str, description: &str, properties: Value, required: &[&str]) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": {
            "type": "object",
            "properties": properties,
            "required": required,
        }
    })
}

/// Deserialize tool arguments; a missing argument object counts as empty.
pub(crate) fn parse<T: DeserializeOwned>(args: &Value) -> Result<T> {
    let args = if args.is_null() {
        Value::Object(Map::new())
    } else {
        args.clone()
    };
    serde_json::from_value(args).map_err(|e| Error::invalid(format!("Invalid arguments: {e}")))
}

/// Slide `index` of the presentation `presentation_id`, or of the current one.
pub(crate) fn slide_mut<'a>(
    state: &'a mut ServerState,
    presentation_id: Option<&str>,
    index: i64,
) -> Result<&'a mut Slide> {
    let (_, pres) = state.store.get_mut(presentation_id)?;
    pres.slide_mut(index)
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Add `key: value` to a JSON object result.
pub(crate) fn with_field(mut value: Value, key: &str, field: Value) -> Value {
    if let Value::Object(map) = &mut value {
        map.insert(key.to_string(), field);
    }
    value
}

pub(crate) fn rgb(name: &str, value: &Option<Vec<i64>>) -> Result<Option<RgbColor>> {
    validate::rgb(name, value.as_deref())
}

pub(crate) fn alignment(name: Option<&str>) -> Result<Option<Alignment>> {
    name.map(|n| {
        Alignment::from_name(n).ok_or_else(|| {
            Error::invalid(format!(
                "Invalid alignment: '{n}'. Must be 'left', 'center', 'right', or 'justify'"
            ))
        })
    })
    .transpose()
}

pub(crate) fn vertical_anchor(name: Option<&str>) -> Result<Option<VerticalAnchor>> {
    name.map(|n| {
        VerticalAnchor::from_name(n).ok_or_else(|| {
            Error::invalid(format!(
                "Invalid vertical alignment: '{n}'. Must be 'top', 'middle', or 'bottom'"
            ))
        })
    })
    .transpose()
}

/// Frame from a position and size in inches.
pub(crate) fn frame_in(left: f64, top: f64, width: f64, height: f64) -> Frame {
    Frame::new(inches(left), inches(top), inches(width), inches(height))
}

pub(crate) fn check_position(left: f64, top: f64, width: f64, height: f64) -> Result<()> {
    validate::non_negative("left", left)?;
    validate::non_negative("top", top)?;
    validate::positive("width", width)?;
    validate::positive("height", height)
}
