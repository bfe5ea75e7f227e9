//! Click hyperlinks on text runs.

use ppt_core::{Error, Result, Run};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse, slide_mut, tool};
use crate::state::ServerState;

pub fn definitions() -> Vec<Value> {
    vec![tool(
        "manage_hyperlinks",
        "List, add, update or remove hyperlinks on text runs.",
        json!({
            "operation": {"type": "string", "enum": ["list", "add", "update", "remove"]},
            "slide_index": {"type": "integer"},
            "shape_index": {"type": "integer"},
            "text": {"type": "string", "description": "Link text for 'add'"},
            "url": {"type": "string"},
            "run_index": {"type": "integer", "default": 0, "description": "Run within the first paragraph"},
            "presentation_id": {"type": "string"},
        }),
        &["operation", "slide_index"],
    )]
}

pub fn call(state: &mut ServerState, name: &str, args: &Value) -> Option<Result<Value>> {
    Some(match name {
        "manage_hyperlinks" => parse(args).and_then(|a| manage_hyperlinks(state, a)),
        _ => return None,
    })
}

#[derive(Deserialize)]
struct HyperlinkArgs {
    operation: String,
    slide_index: i64,
    #[serde(default)]
    shape_index: Option<i64>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    run_index: usize,
    #[serde(default)]
    presentation_id: Option<String>,
}

fn manage_hyperlinks(state: &mut ServerState, args: HyperlinkArgs) -> Result<Value> {
    let slide = slide_mut(state, args.presentation_id.as_deref(), args.slide_index)?;

    if args.operation == "list" {
        let mut links = Vec::new();
        for (shape_index, shape) in slide.shapes.iter().enumerate() {
            let Some(frame) = &shape.text else { continue };
            for (paragraph_index, paragraph) in frame.paragraphs.iter().enumerate() {
                for (run_index, run) in paragraph.runs.iter().enumerate() {
                    if let Some(url) = &run.hyperlink {
                        links.push(json!({
                            "shape_index": shape_index,
                            "paragraph_index": paragraph_index,
                            "run_index": run_index,
                            "text": run.text,
                            "url": url,
                        }));
                    }
                }
            }
        }
        return Ok(json!({
            "message": format!("Found {} hyperlinks on slide {}", links.len(), args.slide_index),
            "hyperlinks": links,
        }));
    }

    let shape_index = args
        .shape_index
        .ok_or_else(|| Error::invalid(format!("shape_index is required for the {} operation", args.operation)))?;
    let frame = slide
        .shape_mut(shape_index)?
        .text
        .as_mut()
        .ok_or_else(|| Error::Unsupported("Shape does not contain text".to_string()))?;

    match args.operation.as_str() {
        "add" => {
            let (Some(text), Some(url)) = (
                args.text.filter(|t| !t.is_empty()),
                args.url.filter(|u| !u.is_empty()),
            ) else {
                return Err(Error::invalid(
                    "Both 'text' and 'url' are required for adding hyperlinks",
                ));
            };
            if frame.paragraphs.is_empty() {
                frame.paragraphs.push(Default::default());
            }
            let mut run = Run::new(text.clone());
            run.hyperlink = Some(url.clone());
            frame.paragraphs[0].runs.push(run);
            Ok(json!({
                "message": format!("Added hyperlink '{text}' -> '{url}' to shape {shape_index}"),
                "text": text,
                "url": url,
            }))
        }
        "update" => {
            let url = args
                .url
                .filter(|u| !u.is_empty())
                .ok_or_else(|| Error::invalid("URL is required for updating hyperlinks"))?;
            let run = first_paragraph_run(frame, args.run_index)?;
            let old_url = run.hyperlink.replace(url.clone());
            Ok(json!({
                "message": format!(
                    "Updated hyperlink from '{}' to '{url}'",
                    old_url.as_deref().unwrap_or_default()
                ),
                "old_url": old_url,
                "new_url": url,
                "text": run.text,
            }))
        }
        "remove" => {
            let run = first_paragraph_run(frame, args.run_index)?;
            let old_url = run.hyperlink.take();
            Ok(json!({
                "message": format!(
                    "Removed hyperlink '{}' from text '{}'",
                    old_url.as_deref().unwrap_or_default(),
                    run.text
                ),
                "removed_url": old_url,
                "text": run.text,
            }))
        }
        other => Err(Error::invalid(format!(
            "Unsupported operation: {other}. Use 'add', 'remove', 'list', or 'update'"
        ))),
    }
}

fn first_paragraph_run(frame: &mut ppt_core::TextFrame, run_index: usize) -> Result<&mut Run> {
    frame
        .paragraphs
        .first_mut()
        .and_then(|p| p.runs.get_mut(run_index))
        .ok_or_else(|| Error::NotFound(format!("Run index {run_index} out of range")))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{call, error_of, slide, state_with_slides};
    use super::*;

    fn state_with_link() -> ServerState {
        let mut state = state_with_slides(1);
        call(
            &mut state,
            "populate_placeholder",
            json!({"slide_index": 0, "placeholder_idx": 1, "text": "See "}),
        );
        let result = call(
            &mut state,
            "manage_hyperlinks",
            json!({"operation": "add", "slide_index": 0, "shape_index": 1, "text": "docs", "url": "https://example.com"}),
        );
        assert_eq!(result["message"], "Added hyperlink 'docs' -> 'https://example.com' to shape 1");
        state
    }

    #[test]
    fn test_add_and_list() {
        let mut state = state_with_link();
        let result = call(&mut state, "manage_hyperlinks", json!({"operation": "list", "slide_index": 0}));
        assert_eq!(result["message"], "Found 1 hyperlinks on slide 0");
        let link = &result["hyperlinks"][0];
        assert_eq!(link["shape_index"], 1);
        assert_eq!(link["run_index"], 1);
        assert_eq!(link["text"], "docs");
        assert_eq!(slide(&state, 0).shapes[1].text(), "See docs");
    }

    #[test]
    fn test_update_and_remove() {
        let mut state = state_with_link();
        let result = call(
            &mut state,
            "manage_hyperlinks",
            json!({"operation": "update", "slide_index": 0, "shape_index": 1, "run_index": 1, "url": "https://example.org"}),
        );
        assert_eq!(result["old_url"], "https://example.com");
        assert_eq!(result["new_url"], "https://example.org");

        let result = call(
            &mut state,
            "manage_hyperlinks",
            json!({"operation": "remove", "slide_index": 0, "shape_index": 1, "run_index": 1}),
        );
        assert_eq!(result["message"], "Removed hyperlink 'https://example.org' from text 'docs'");
        let runs = &slide(&state, 0).shapes[1].text.as_ref().unwrap().paragraphs[0].runs;
        assert!(runs.iter().all(|r| r.hyperlink.is_none()));
    }

    #[test]
    fn test_errors() {
        let mut state = state_with_link();
        let result = call(
            &mut state,
            "manage_hyperlinks",
            json!({"operation": "remove", "slide_index": 0, "shape_index": 1, "run_index": 7}),
        );
        assert_eq!(error_of(&result), "Run index 7 out of range");
        let result = call(
            &mut state,
            "manage_hyperlinks",
            json!({"operation": "add", "slide_index": 0, "shape_index": 1, "text": "x"}),
        );
        assert_eq!(
            error_of(&result),
            "Both 'text' and 'url' are required for adding hyperlinks"
        );
        let result = call(&mut state, "manage_hyperlinks", json!({"operation": "jump", "slide_index": 0, "shape_index": 1}));
        assert!(error_of(&result).starts_with("Unsupported operation: jump"));
    }
}
