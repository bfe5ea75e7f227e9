//! Summary of a template file, read without keeping it open.

use ppt_core::presentation::LayoutSummary;
use ppt_core::{CoreProperties, Error, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct TemplateInfo {
    pub template_path: String,
    pub file_size_bytes: u64,
    pub slide_count: usize,
    pub layout_count: usize,
    pub slide_layouts: Vec<LayoutSummary>,
    pub core_properties: CoreProperties,
}

pub fn template_info(path: &Path) -> Result<TemplateInfo> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "Template file not found: {}",
            path.display()
        )));
    }
    let file_size_bytes = std::fs::metadata(path)?.len();
    let presentation = crate::open(path).map_err(|e| {
        Error::TemplateError(format!(
            "Failed to read template info from '{}': {e}",
            path.display()
        ))
    })?;
    let slide_layouts = presentation.layout_summaries();
    Ok(TemplateInfo {
        template_path: path.display().to_string(),
        file_size_bytes,
        slide_count: presentation.slides.len(),
        layout_count: slide_layouts.len(),
        slide_layouts,
        core_properties: presentation.core,
    })
}
