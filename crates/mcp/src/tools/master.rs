//! Read-only views of slide masters and their layouts.

use ppt_core::{Error, Result};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse, tool};
use crate::state::ServerState;

pub fn definitions() -> Vec<Value> {
    vec![tool(
        "manage_slide_masters",
        "Inspect slide masters and their layouts: operations 'list', 'get_layouts' and 'get_info'.",
        json!({
            "operation": {"type": "string", "enum": ["list", "get_layouts", "get_info"]},
            "master_index": {"type": "integer", "default": 0},
            "layout_index": {"type": "integer", "description": "For 'get_info': describe this layout instead of the master"},
            "presentation_id": {"type": "string"},
        }),
        &["operation"],
    )]
}

pub fn call(state: &mut ServerState, name: &str, args: &Value) -> Option<Result<Value>> {
    Some(match name {
        "manage_slide_masters" => parse(args).and_then(|a| manage_slide_masters(state, a)),
        _ => return None,
    })
}

#[derive(Deserialize)]
struct MasterArgs {
    operation: String,
    #[serde(default)]
    master_index: i64,
    #[serde(default)]
    layout_index: Option<i64>,
    #[serde(default)]
    presentation_id: Option<String>,
}

fn manage_slide_masters(state: &mut ServerState, args: MasterArgs) -> Result<Value> {
    let (_, pres) = state.store.get(args.presentation_id.as_deref())?;

    if args.operation == "list" {
        let masters: Vec<Value> = pres
            .masters
            .iter()
            .enumerate()
            .map(|(index, master)| {
                json!({ "index": index, "layout_count": master.layouts.len(), "name": master.name })
            })
            .collect();
        return Ok(json!({
            "message": format!("Found {} slide masters", masters.len()),
            "total_masters": masters.len(),
            "masters": masters,
        }));
    }

    let master = pres.master(args.master_index)?;
    match (args.operation.as_str(), args.layout_index) {
        ("get_layouts", _) => {
            let layouts: Vec<Value> = master
                .layouts
                .iter()
                .enumerate()
                .map(|(index, layout)| {
                    json!({
                        "index": index,
                        "name": layout.name,
                        "placeholder_count": layout.placeholders.len(),
                    })
                })
                .collect();
            Ok(json!({
                "message": format!("Master {} has {} layouts", args.master_index, layouts.len()),
                "master_index": args.master_index,
                "layouts": layouts,
            }))
        }
        ("get_info", Some(layout_index)) => {
            let layout = usize::try_from(layout_index)
                .ok()
                .and_then(|i| master.layouts.get(i))
                .ok_or_else(|| Error::index("layout", layout_index, master.layouts.len()))?;
            let placeholders: Vec<Value> = layout
                .placeholders
                .iter()
                .map(|p| json!({ "idx": p.idx, "type": p.kind.label(), "name": p.name }))
                .collect();
            Ok(json!({
                "message": format!(
                    "Layout info for master {}, layout {layout_index}",
                    args.master_index
                ),
                "master_index": args.master_index,
                "layout_index": layout_index,
                "layout_name": layout.name,
                "placeholders": placeholders,
            }))
        }
        ("get_info", None) => Ok(json!({
            "message": format!("Master {} information", args.master_index),
            "master_index": args.master_index,
            "layout_count": master.layouts.len(),
            "name": master.name,
            "placeholder_count": master.placeholders.len(),
        })),
        (other, _) => Err(Error::invalid(format!(
            "Unsupported operation: {other}. Use 'list', 'get_layouts', or 'get_info'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{call, error_of, state_with_slides};
    use super::*;

    #[test]
    fn test_list_and_layouts() {
        let mut state = state_with_slides(0);
        let result = call(&mut state, "manage_slide_masters", json!({"operation": "list"}));
        assert_eq!(result["total_masters"], 1);
        assert_eq!(result["masters"][0]["name"], "Office Theme");
        assert_eq!(result["masters"][0]["layout_count"], 11);

        let result = call(&mut state, "manage_slide_masters", json!({"operation": "get_layouts"}));
        assert_eq!(result["message"], "Master 0 has 11 layouts");
        assert_eq!(result["layouts"][6]["name"], "Blank");
        // date, footer and slide number
        assert_eq!(result["layouts"][6]["placeholder_count"], 3);
    }

    #[test]
    fn test_layout_info() {
        let mut state = state_with_slides(0);
        let result = call(
            &mut state,
            "manage_slide_masters",
            json!({"operation": "get_info", "layout_index": 0}),
        );
        assert_eq!(result["layout_name"], "Title Slide");
        assert_eq!(result["placeholders"][0]["type"], "CENTER_TITLE");
        assert_eq!(result["placeholders"][1]["type"], "SUBTITLE");

        let result = call(&mut state, "manage_slide_masters", json!({"operation": "get_info"}));
        assert_eq!(result["layout_count"], 11);
    }

    #[test]
    fn test_index_errors() {
        let mut state = state_with_slides(0);
        let result = call(
            &mut state,
            "manage_slide_masters",
            json!({"operation": "get_layouts", "master_index": 3}),
        );
        assert_eq!(error_of(&result), "Invalid master index: 3. Available masters: 0-0");
        let result = call(
            &mut state,
            "manage_slide_masters",
            json!({"operation": "get_info", "layout_index": 11}),
        );
        assert_eq!(error_of(&result), "Invalid layout index: 11. Available layouts: 0-10");
    }
}
