//! Text extraction from slides in reading order.

use serde::Serialize;
use std::cmp::Ordering;

use crate::normalize::TextNormalizer;
use crate::shape::{Shape, ShapeKind};
use crate::slide::Slide;

/// Text of one shape.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShapeText {
    pub shape_index: usize,
    pub shape_name: String,
    pub shape_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_type: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TableText {
    pub shape_index: usize,
    pub shape_name: String,
    pub rows: usize,
    pub columns: usize,
    pub data: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlideTextContent {
    pub slide_title: Option<String>,
    pub placeholders: Vec<ShapeText>,
    pub text_shapes: Vec<ShapeText>,
    pub tables: Vec<TableText>,
    /// Everything above, top to bottom and left to right.
    pub all_text_combined: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlideTextSummary {
    pub text_content: SlideTextContent,
    pub total_text_shapes: usize,
    pub has_title: bool,
    pub has_tables: bool,
}

/// A fragment of text and where it sits on the slide.
struct Positioned {
    text: String,
    y: i64,
    x: i64,
}

fn sort_by_position(items: &mut [Positioned]) {
    items.sort_by(|a, b| match a.y.cmp(&b.y) {
        Ordering::Equal => a.x.cmp(&b.x),
        other => other,
    });
}

fn shape_entry(index: usize, shape: &Shape, text: String) -> ShapeText {
    ShapeText {
        shape_index: index,
        shape_name: shape.name.clone(),
        shape_type: shape.kind.type_name().to_string(),
        placeholder_type: shape.placeholder_type().map(|t| t.label()),
        text,
    }
}

/// Collect the text of every shape and table on `slide`.
pub fn extract_slide_text(slide: &Slide) -> SlideTextSummary {
    let normalizer = TextNormalizer::new();
    // Cells are flattened onto one line, so blank lines inside them are dropped.
    let cell_normalizer = TextNormalizer::new().with_keep_empty_lines(false);
    let mut placeholders = Vec::new();
    let mut text_shapes = Vec::new();
    let mut tables = Vec::new();
    let mut positioned = Vec::new();

    for (index, shape) in slide.shapes.iter().enumerate() {
        match &shape.kind {
            ShapeKind::Table(table) => {
                let data: Vec<Vec<String>> = table
                    .texts()
                    .into_iter()
                    .map(|row| row.iter().map(|c| cell_normalizer.normalize(c)).collect())
                    .collect();
                let flattened: Vec<String> = data
                    .iter()
                    .map(|row| row.join(" | "))
                    .filter(|r| !r.trim_matches(|c| c == ' ' || c == '|').is_empty())
                    .collect();
                if !flattened.is_empty() {
                    positioned.push(Positioned {
                        text: flattened.join("\n"),
                        y: shape.frame.top,
                        x: shape.frame.left,
                    });
                }
                tables.push(TableText {
                    shape_index: index,
                    shape_name: shape.name.clone(),
                    rows: table.row_count(),
                    columns: table.column_count(),
                    data,
                });
            }
            _ if shape.has_text_frame() => {
                let text = normalizer.normalize(&shape.text());
                if text.is_empty() {
                    continue;
                }
                positioned.push(Positioned {
                    text: text.clone(),
                    y: shape.frame.top,
                    x: shape.frame.left,
                });
                let entry = shape_entry(index, shape, text);
                if shape.placeholder_idx().is_some() {
                    placeholders.push(entry);
                } else {
                    text_shapes.push(entry);
                }
            }
            _ => {}
        }
    }

    let slide_title = slide
        .title_text()
        .map(|t| normalizer.normalize(&t))
        .filter(|t| !t.is_empty());

    sort_by_position(&mut positioned);
    if let Some(title) = &slide_title {
        // Title leads regardless of where it is drawn.
        if let Some(pos) = positioned.iter().position(|p| &p.text == title) {
            let entry = positioned.remove(pos);
            positioned.insert(0, entry);
        }
    }
    let all_text_combined = positioned
        .into_iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("\n");

    let total_text_shapes = placeholders.len() + text_shapes.len();
    let has_tables = !tables.is_empty();
    SlideTextSummary {
        has_title: slide_title.is_some(),
        text_content: SlideTextContent {
            slide_title,
            placeholders,
            text_shapes,
            tables,
            all_text_combined,
        },
        total_text_shapes,
        has_tables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Frame, PlaceholderType};
    use crate::slide::LayoutRef;
    use crate::table::Table;
    use crate::text::TextFrame;

    fn slide_with_shapes() -> Slide {
        let mut slide = Slide::new(256, LayoutRef::default());
        slide
            .add_shape("TextBox", Frame::new(500, 3000, 100, 100), ShapeKind::TextBox)
            .text = Some(TextFrame::from_text("Right   bottom"));
        slide
            .add_shape("TextBox", Frame::new(0, 3000, 100, 100), ShapeKind::TextBox)
            .text = Some(TextFrame::from_text("Left bottom"));
        slide
            .add_shape(
                "Title",
                Frame::new(0, 5000, 100, 100),
                ShapeKind::Placeholder {
                    idx: 0,
                    kind: PlaceholderType::Title,
                },
            )
            .text = Some(TextFrame::from_text("Heading"));
        let mut table = Table::new(1, 2, 100, 100);
        table.cell_mut(0, 0).unwrap().text.set_text("A");
        table.cell_mut(0, 1).unwrap().text.set_text("B");
        slide.add_shape("Table", Frame::new(0, 4000, 100, 100), ShapeKind::Table(table));
        slide
    }

    #[test]
    fn test_reading_order_with_title_first() {
        let summary = extract_slide_text(&slide_with_shapes());
        assert_eq!(
            summary.text_content.all_text_combined,
            "Heading\nLeft bottom\nRight bottom\nA | B"
        );
    }

    #[test]
    fn test_summary_counts() {
        let summary = extract_slide_text(&slide_with_shapes());
        assert!(summary.has_title);
        assert!(summary.has_tables);
        assert_eq!(summary.total_text_shapes, 3);
        assert_eq!(summary.text_content.placeholders.len(), 1);
        assert_eq!(
            summary.text_content.placeholders[0].placeholder_type.as_deref(),
            Some("TITLE")
        );
        assert_eq!(summary.text_content.tables[0].data, vec![vec!["A", "B"]]);
    }

    #[test]
    fn test_table_cells_drop_blank_lines() {
        let mut slide = Slide::new(256, LayoutRef::default());
        let mut table = Table::new(1, 1, 100, 100);
        table.cell_mut(0, 0).unwrap().text.set_text("Top\n\nBottom");
        slide.add_shape("Table", Frame::new(0, 0, 100, 100), ShapeKind::Table(table));
        let summary = extract_slide_text(&slide);
        assert_eq!(summary.text_content.tables[0].data, vec![vec!["Top\nBottom"]]);
    }

    #[test]
    fn test_empty_slide() {
        let summary = extract_slide_text(&Slide::new(256, LayoutRef::default()));
        assert!(!summary.has_title);
        assert_eq!(summary.text_content.all_text_combined, "");
    }
}
