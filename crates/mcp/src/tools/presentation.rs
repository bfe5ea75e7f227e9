//! Creating, opening, saving and describing presentations.

use chrono::Utc;
use ppt_core::{Error, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use super::{parse, to_json, tool};
use crate::state::ServerState;

pub fn definitions() -> Vec<Value> {
    let id = json!({"type": "string", "description": "Presentation id; generated when omitted"});
    let pres_id = json!({"type": "string", "description": "Presentation id; defaults to the current presentation"});
    vec![
        tool(
            "create_presentation",
            "Create a new PowerPoint presentation.",
            json!({ "id": id }),
            &[],
        ),
        tool(
            "create_presentation_from_template",
            "Create a new PowerPoint presentation from a .pptx or .potx template file.",
            json!({
                "template_path": {"type": "string", "description": "Template path, or a file name to look up in the template directories"},
                "id": id,
            }),
            &["template_path"],
        ),
        tool(
            "open_presentation",
            "Open an existing PowerPoint presentation from a file.",
            json!({ "file_path": {"type": "string"}, "id": id }),
            &["file_path"],
        ),
        tool(
            "save_presentation",
            "Save a presentation to a file.",
            json!({ "file_path": {"type": "string"}, "presentation_id": pres_id }),
            &["file_path"],
        ),
        tool(
            "get_presentation_info",
            "Get information about a presentation.",
            json!({ "presentation_id": pres_id }),
            &[],
        ),
        tool(
            "get_template_file_info",
            "Get information about a template file including layouts and properties.",
            json!({ "template_path": {"type": "string"} }),
            &["template_path"],
        ),
        tool(
            "set_core_properties",
            "Set core document properties.",
            json!({
                "title": {"type": "string"},
                "subject": {"type": "string"},
                "author": {"type": "string"},
                "keywords": {"type": "string"},
                "comments": {"type": "string"},
                "presentation_id": pres_id,
            }),
            &[],
        ),
    ]
}

pub fn call(state: &mut ServerState, name: &str, args: &Value) -> Option<Result<Value>> {
    Some(match name {
        "create_presentation" => parse(args).and_then(|a| create_presentation(state, a)),
        "create_presentation_from_template" => {
            parse(args).and_then(|a| create_presentation_from_template(state, a))
        }
        "open_presentation" => parse(args).and_then(|a| open_presentation(state, a)),
        "save_presentation" => parse(args).and_then(|a| save_presentation(state, a)),
        "get_presentation_info" => parse(args).and_then(|a| get_presentation_info(state, a)),
        "get_template_file_info" => parse(args).and_then(|a| get_template_file_info(state, a)),
        "set_core_properties" => parse(args).and_then(|a| set_core_properties(state, a)),
        _ => return None,
    })
}

#[derive(Deserialize)]
struct CreateArgs {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Deserialize)]
struct TemplateArgs {
    template_path: String,
    #[serde(default)]
    id: Option<String>,
}

#[derive(Deserialize)]
struct OpenArgs {
    file_path: String,
    #[serde(default)]
    id: Option<String>,
}

#[derive(Deserialize)]
struct SaveArgs {
    file_path: String,
    #[serde(default)]
    presentation_id: Option<String>,
}

#[derive(Deserialize)]
struct InfoArgs {
    #[serde(default)]
    presentation_id: Option<String>,
}

#[derive(Deserialize)]
struct TemplateFileArgs {
    template_path: String,
}

#[derive(Deserialize)]
struct CorePropertiesArgs {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    keywords: Option<String>,
    #[serde(default)]
    comments: Option<String>,
    #[serde(default)]
    presentation_id: Option<String>,
}

fn create_presentation(state: &mut ServerState, args: CreateArgs) -> Result<Value> {
    let pres = ppt_pptx::new_presentation()?;
    let slide_count = pres.slides.len();
    let id = state.store.insert(args.id, pres);
    Ok(json!({
        "presentation_id": id,
        "message": format!("Created new presentation with ID: {id}"),
        "slide_count": slide_count,
    }))
}

/// Locate a template file, searching the configured directories by name.
fn locate_template(state: &ServerState, template_path: &str) -> Result<PathBuf> {
    state
        .config
        .find_template(Path::new(template_path))
        .ok_or_else(|| {
            Error::NotFound(format!(
                "Template file not found: {template_path}. Searched in {}",
                state.config.search_list()
            ))
        })
}

fn create_presentation_from_template(state: &mut ServerState, args: TemplateArgs) -> Result<Value> {
    let path = locate_template(state, &args.template_path)?;
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if extension != "pptx" && extension != "potx" {
        return Err(Error::invalid("Template file must be a .pptx or .potx file"));
    }
    let pres = ppt_pptx::open(&path).map_err(|e| {
        Error::TemplateError(format!(
            "Failed to load template file '{}': {e}",
            path.display()
        ))
    })?;
    let slide_count = pres.slides.len();
    let layout_count = pres.layouts().len();
    let id = state.store.insert(args.id, pres);
    Ok(json!({
        "presentation_id": id,
        "message": format!(
            "Created new presentation from template '{}' with ID: {id}",
            path.display()
        ),
        "template_path": path.display().to_string(),
        "slide_count": slide_count,
        "layout_count": layout_count,
    }))
}

fn open_presentation(state: &mut ServerState, args: OpenArgs) -> Result<Value> {
    let path = Path::new(&args.file_path);
    if !path.exists() {
        return Err(Error::NotFound(format!("File not found: {}", args.file_path)));
    }
    let pres = ppt_pptx::open(path)?;
    let slide_count = pres.slides.len();
    let id = state.store.insert(args.id, pres);
    Ok(json!({
        "presentation_id": id,
        "message": format!("Opened presentation from {} with ID: {id}", args.file_path),
        "slide_count": slide_count,
    }))
}

fn save_presentation(state: &mut ServerState, args: SaveArgs) -> Result<Value> {
    let (_, pres) = state.store.get_mut(args.presentation_id.as_deref())?;
    pres.core.modified = Some(Utc::now());
    ppt_pptx::save(pres, Path::new(&args.file_path))?;
    Ok(json!({
        "message": format!("Presentation saved to {}", args.file_path),
        "file_path": args.file_path,
    }))
}

fn get_presentation_info(state: &mut ServerState, args: InfoArgs) -> Result<Value> {
    let (id, pres) = state.store.get(args.presentation_id.as_deref())?;
    let layouts = pres.layout_summaries();
    Ok(json!({
        "presentation_id": id,
        "slide_count": pres.slides.len(),
        "layout_count": layouts.len(),
        "slide_layouts": to_json(&layouts)?,
        "core_properties": to_json(&pres.core)?,
        "slide_width": pres.slide_width,
        "slide_height": pres.slide_height,
    }))
}

fn get_template_file_info(state: &mut ServerState, args: TemplateFileArgs) -> Result<Value> {
    let path = locate_template(state, &args.template_path)?;
    to_json(&ppt_pptx::template_info(&path)?)
}

fn set_core_properties(state: &mut ServerState, args: CorePropertiesArgs) -> Result<Value> {
    let (_, pres) = state.store.get_mut(args.presentation_id.as_deref())?;
    let core = &mut pres.core;
    let updates = [
        (&mut core.title, args.title),
        (&mut core.subject, args.subject),
        (&mut core.author, args.author),
        (&mut core.keywords, args.keywords),
        (&mut core.comments, args.comments),
    ];
    for (field, value) in updates {
        if let Some(value) = value {
            *field = value;
        }
    }
    Ok(json!({ "message": "Core properties updated successfully" }))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{call, error_of, state, state_with_slides};
    use super::super::is_error;
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_create_assigns_ids_and_sets_current() {
        let mut state = state();
        let first = call(&mut state, "create_presentation", json!({}));
        assert_eq!(first["presentation_id"], "presentation_1");
        assert_eq!(first["slide_count"], 0);

        let second = call(&mut state, "create_presentation", json!({"id": "deck"}));
        assert_eq!(second["presentation_id"], "deck");
        assert_eq!(state.store.current_id(), Some("deck"));

        let third = call(&mut state, "create_presentation", json!({}));
        assert_eq!(third["presentation_id"], "presentation_3");
    }

    #[test]
    fn test_info_lists_layouts_and_properties() {
        let mut state = state_with_slides(2);
        call(&mut state, "set_core_properties", json!({"title": "Quarterly", "author": "Finance"}));
        let info = call(&mut state, "get_presentation_info", json!({}));
        assert_eq!(info["slide_count"], 2);
        assert_eq!(info["layout_count"], 11);
        assert_eq!(info["slide_layouts"][1]["name"], "Title and Content");
        assert_eq!(info["core_properties"]["title"], "Quarterly");
        assert_eq!(info["core_properties"]["author"], "Finance");
        assert_eq!(info["slide_width"], 9_144_000);
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pptx");
        let mut state = state_with_slides(3);
        let saved = call(
            &mut state,
            "save_presentation",
            json!({"file_path": path.to_str().unwrap()}),
        );
        assert!(!is_error(&saved), "{saved}");

        let opened = call(
            &mut state,
            "open_presentation",
            json!({"file_path": path.to_str().unwrap(), "id": "reopened"}),
        );
        assert_eq!(opened["slide_count"], 3);
        assert_eq!(state.store.current_id(), Some("reopened"));
    }

    #[test]
    fn test_open_missing_file() {
        let mut state = state();
        let result = call(&mut state, "open_presentation", json!({"file_path": "/no/such.pptx"}));
        assert_eq!(error_of(&result), "File not found: /no/such.pptx");
    }

    #[test]
    fn test_template_found_in_search_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut template = ppt_pptx::new_presentation().unwrap();
        template.add_slide(0).unwrap();
        ppt_pptx::save(&template, &dir.path().join("brand.potx")).unwrap();

        let mut state = state();
        state.config = Config::from_parts(vec![dir.path().to_path_buf()], None, None, None);
        let result = call(
            &mut state,
            "create_presentation_from_template",
            json!({"template_path": "brand.potx"}),
        );
        assert!(!is_error(&result), "{result}");
        assert_eq!(result["slide_count"], 1);
        assert_eq!(result["layout_count"], 11);

        let info = call(&mut state, "get_template_file_info", json!({"template_path": "brand.potx"}));
        assert_eq!(info["slide_count"], 1);
        assert_eq!(info["layout_count"], 11);
    }

    #[test]
    fn test_missing_template_lists_search_directories() {
        let mut state = state();
        state.config = Config::from_parts(vec![PathBuf::from("/tpl")], None, None, None);
        let result = call(
            &mut state,
            "create_presentation_from_template",
            json!({"template_path": "absent.pptx"}),
        );
        let error = error_of(&result);
        assert!(error.starts_with("Template file not found: absent.pptx. Searched in /tpl"));
    }

    #[test]
    fn test_template_extension_is_checked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();
        let mut state = state();
        let result = call(
            &mut state,
            "create_presentation_from_template",
            json!({"template_path": path.to_str().unwrap()}),
        );
        assert_eq!(error_of(&result), "Template file must be a .pptx or .potx file");
    }

    #[test]
    fn test_operations_need_a_presentation() {
        let mut state = state();
        let result = call(&mut state, "get_presentation_info", json!({}));
        assert_eq!(
            error_of(&result),
            "No presentation is currently loaded or the specified ID is invalid"
        );
    }
}
