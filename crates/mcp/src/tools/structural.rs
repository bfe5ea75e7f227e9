//! Tables, auto shapes and charts.

use ppt_core::chart::validate_series_shape;
use ppt_core::shape::{auto_shape_preset, display_name};
use ppt_core::table::TableCell;
use ppt_core::units::points;
use ppt_core::{
    validate, Chart, ChartType, ColorScheme, Error, Fill, Font, LegendPosition, Line, Result,
    RgbColor, Series, ShapeKind, Table,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{alignment, check_position, frame_in, parse, rgb, slide_mut, tool, vertical_anchor};
use crate::state::ServerState;

/// Upper bound on table rows and columns.
const MAX_TABLE_DIMENSION: f64 = 1000.0;

pub fn definitions() -> Vec<Value> {
    let pres_id = json!({"type": "string", "description": "Presentation id; defaults to the current presentation"});
    let rgb_schema = json!({"type": "array", "items": {"type": "integer"}, "minItems": 3, "maxItems": 3});
    let inches = json!({"type": "number", "description": "Inches"});
    let shape_names: Vec<&str> = ppt_core::shape::AUTO_SHAPES.iter().map(|(n, _)| *n).collect();
    let chart_names: Vec<&str> = ChartType::ALL.iter().map(ChartType::as_name).collect();
    vec![
        tool(
            "add_table",
            "Add a table to a slide with header and body formatting.",
            json!({
                "slide_index": {"type": "integer"},
                "rows": {"type": "integer"},
                "cols": {"type": "integer"},
                "left": inches, "top": inches, "width": inches, "height": inches,
                "data": {"type": "array", "items": {"type": "array", "items": {"type": "string"}}},
                "header_row": {"type": "boolean", "default": true},
                "header_font_size": {"type": "number", "default": 12},
                "body_font_size": {"type": "number", "default": 10},
                "header_bg_color": rgb_schema,
                "body_bg_color": rgb_schema,
                "border_color": rgb_schema,
                "presentation_id": pres_id,
            }),
            &["slide_index", "rows", "cols", "left", "top", "width", "height"],
        ),
        tool(
            "format_table_cell",
            "Format a specific table cell.",
            json!({
                "slide_index": {"type": "integer"},
                "shape_index": {"type": "integer"},
                "row": {"type": "integer"},
                "col": {"type": "integer"},
                "font_size": {"type": "number"},
                "font_name": {"type": "string"},
                "bold": {"type": "boolean"},
                "italic": {"type": "boolean"},
                "color": rgb_schema,
                "bg_color": rgb_schema,
                "alignment": {"type": "string", "enum": ["left", "center", "right", "justify"]},
                "vertical_alignment": {"type": "string", "enum": ["top", "middle", "bottom"]},
                "presentation_id": pres_id,
            }),
            &["slide_index", "shape_index", "row", "col"],
        ),
        tool(
            "add_shape",
            "Add an auto shape to a slide with optional fill, outline and text.",
            json!({
                "slide_index": {"type": "integer"},
                "shape_type": {"type": "string", "enum": shape_names},
                "left": inches, "top": inches, "width": inches, "height": inches,
                "fill_color": rgb_schema,
                "line_color": rgb_schema,
                "line_width": {"type": "number", "description": "Points"},
                "text": {"type": "string"},
                "font_size": {"type": "number"},
                "font_color": rgb_schema,
                "presentation_id": pres_id,
            }),
            &["slide_index", "shape_type", "left", "top", "width", "height"],
        ),
        tool(
            "add_chart",
            "Add a chart to a slide with legend, label, title and color options.",
            json!({
                "slide_index": {"type": "integer"},
                "chart_type": {"type": "string", "enum": chart_names},
                "left": inches, "top": inches, "width": inches, "height": inches,
                "categories": {"type": "array", "items": {"type": "string"}},
                "series_names": {"type": "array", "items": {"type": "string"}},
                "series_values": {"type": "array", "items": {"type": "array", "items": {"type": "number"}}},
                "has_legend": {"type": "boolean", "default": true},
                "legend_position": {"type": "string", "enum": ["right", "left", "top", "bottom"], "default": "right"},
                "has_data_labels": {"type": "boolean", "default": false},
                "title": {"type": "string"},
                "x_axis_title": {"type": "string"},
                "y_axis_title": {"type": "string"},
                "color_scheme": {"type": "string"},
                "presentation_id": pres_id,
            }),
            &[
                "slide_index", "chart_type", "left", "top", "width", "height",
                "categories", "series_names", "series_values",
            ],
        ),
    ]
}

pub fn call(state: &mut ServerState, name: &str, args: &Value) -> Option<Result<Value>> {
    Some(match name {
        "add_table" => parse(args).and_then(|a| add_table(state, a)),
        "format_table_cell" => parse(args).and_then(|a| format_table_cell(state, a)),
        "add_shape" => parse(args).and_then(|a| add_shape(state, a)),
        "add_chart" => parse(args).and_then(|a| add_chart(state, a)),
        _ => return None,
    })
}

fn default_true() -> bool {
    true
}

fn default_header_size() -> f64 {
    12.0
}

fn default_body_size() -> f64 {
    10.0
}

#[derive(Deserialize)]
struct AddTableArgs {
    slide_index: i64,
    rows: i64,
    cols: i64,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    #[serde(default)]
    data: Option<Vec<Vec<String>>>,
    #[serde(default = "default_true")]
    header_row: bool,
    #[serde(default = "default_header_size")]
    header_font_size: f64,
    #[serde(default = "default_body_size")]
    body_font_size: f64,
    #[serde(default)]
    header_bg_color: Option<Vec<i64>>,
    #[serde(default)]
    body_bg_color: Option<Vec<i64>>,
    #[serde(default)]
    border_color: Option<Vec<i64>>,
    #[serde(default)]
    presentation_id: Option<String>,
}

/// Set a cell's fill and merge `font` into its runs.
fn style_cell(cell: &mut TableCell, fill: Option<RgbColor>, font: &Font) {
    if fill.is_some() {
        cell.fill = fill;
    }
    cell.text.apply_font(font);
}

fn add_table(state: &mut ServerState, args: AddTableArgs) -> Result<Value> {
    validate::positive("rows", args.rows as f64)?;
    validate::positive("cols", args.cols as f64)?;
    validate::in_range("rows", args.rows as f64, 1.0, MAX_TABLE_DIMENSION)?;
    validate::in_range("cols", args.cols as f64, 1.0, MAX_TABLE_DIMENSION)?;
    check_position(args.left, args.top, args.width, args.height)?;
    validate::positive("header_font_size", args.header_font_size)?;
    validate::positive("body_font_size", args.body_font_size)?;
    let header_fill = rgb("header_bg_color", &args.header_bg_color)?;
    let body_fill = rgb("body_bg_color", &args.body_bg_color)?;
    // Checked for the caller's benefit; table borders keep the table style.
    rgb("border_color", &args.border_color)?;

    let (rows, cols) = (args.rows as usize, args.cols as usize);
    if let Some(data) = &args.data {
        if data.len() != rows {
            return Err(Error::invalid(format!(
                "Data has {} rows but table should have {rows} rows",
                data.len()
            )));
        }
        if let Some((i, row)) = data.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(Error::invalid(format!(
                "Row {i} has {} columns but table should have {cols} columns",
                row.len()
            )));
        }
    }

    let frame = frame_in(args.left, args.top, args.width, args.height);
    let mut table = Table::new(rows, cols, frame.width, frame.height);
    table.first_row = args.header_row;
    let header_font = Font {
        size: Some(args.header_font_size),
        bold: Some(true),
        ..Default::default()
    };
    let body_font = Font {
        size: Some(args.body_font_size),
        ..Default::default()
    };
    for (r, row) in table.rows.iter_mut().enumerate() {
        for (c, cell) in row.cells.iter_mut().enumerate() {
            if let Some(text) = args.data.as_ref().and_then(|d| d.get(r)).and_then(|row| row.get(c)) {
                cell.text.set_text(text);
            }
            if r == 0 && args.header_row {
                style_cell(cell, header_fill, &header_font);
            } else {
                style_cell(cell, body_fill, &body_font);
            }
        }
    }

    let slide = slide_mut(state, args.presentation_id.as_deref(), args.slide_index)?;
    slide.add_shape("Table", frame, ShapeKind::Table(table));
    Ok(json!({
        "message": format!("Added {rows}x{cols} table to slide {}", args.slide_index),
        "shape_index": slide.shapes.len() - 1,
        "rows": rows,
        "cols": cols,
    }))
}

#[derive(Deserialize)]
struct FormatCellArgs {
    slide_index: i64,
    shape_index: i64,
    row: i64,
    col: i64,
    #[serde(default)]
    font_size: Option<f64>,
    #[serde(default)]
    font_name: Option<String>,
    #[serde(default)]
    bold: Option<bool>,
    #[serde(default)]
    italic: Option<bool>,
    #[serde(default)]
    color: Option<Vec<i64>>,
    #[serde(default)]
    bg_color: Option<Vec<i64>>,
    #[serde(default)]
    alignment: Option<String>,
    #[serde(default)]
    vertical_alignment: Option<String>,
    #[serde(default)]
    presentation_id: Option<String>,
}

fn format_table_cell(state: &mut ServerState, args: FormatCellArgs) -> Result<Value> {
    if let Some(size) = args.font_size {
        validate::positive("font_size", size)?;
    }
    let font = Font {
        name: args.font_name.clone(),
        size: args.font_size,
        bold: args.bold,
        italic: args.italic,
        color: rgb("color", &args.color)?,
        ..Default::default()
    };
    let fill = rgb("bg_color", &args.bg_color)?;
    let align = alignment(args.alignment.as_deref())?;
    let anchor = vertical_anchor(args.vertical_alignment.as_deref())?;

    let slide = slide_mut(state, args.presentation_id.as_deref(), args.slide_index)?;
    let table = slide
        .shape_mut(args.shape_index)?
        .table_mut()
        .ok_or_else(|| Error::Unsupported(format!("Shape at index {} is not a table", args.shape_index)))?;
    let cell = table.cell_mut(args.row, args.col)?;
    style_cell(cell, fill, &font);
    if let Some(align) = align {
        cell.text.set_alignment(align);
    }
    if anchor.is_some() {
        cell.anchor = anchor;
    }
    Ok(json!({
        "message": format!(
            "Formatted cell at row {}, column {} in table at shape index {} on slide {}",
            args.row, args.col, args.shape_index, args.slide_index
        )
    }))
}

#[derive(Deserialize)]
struct AddShapeArgs {
    slide_index: i64,
    shape_type: String,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    #[serde(default)]
    fill_color: Option<Vec<i64>>,
    #[serde(default)]
    line_color: Option<Vec<i64>>,
    #[serde(default)]
    line_width: Option<f64>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    font_size: Option<f64>,
    #[serde(default)]
    font_color: Option<Vec<i64>>,
    #[serde(default)]
    presentation_id: Option<String>,
}

fn add_shape(state: &mut ServerState, args: AddShapeArgs) -> Result<Value> {
    let preset = auto_shape_preset(&args.shape_type)?;
    check_position(args.left, args.top, args.width, args.height)?;
    let fill = rgb("fill_color", &args.fill_color)?;
    let line_color = rgb("line_color", &args.line_color)?;
    if let Some(width) = args.line_width {
        validate::positive("line_width", width)?;
    }
    if let Some(size) = args.font_size {
        validate::positive("font_size", size)?;
    }
    let font = Font {
        size: args.font_size,
        color: rgb("font_color", &args.font_color)?,
        ..Default::default()
    };

    let slide = slide_mut(state, args.presentation_id.as_deref(), args.slide_index)?;
    let shape = slide.add_shape(
        &display_name(&args.shape_type.to_ascii_lowercase()),
        frame_in(args.left, args.top, args.width, args.height),
        ShapeKind::AutoShape {
            preset: preset.to_string(),
        },
    );
    if let Some(color) = fill {
        shape.fill = Some(Fill::Solid(color));
    }
    if line_color.is_some() || args.line_width.is_some() {
        shape.line = Some(Line {
            color: line_color,
            width: args.line_width.map(points),
            hidden: false,
        });
    }
    if let (Some(text), Some(frame)) = (args.text.filter(|t| !t.is_empty()), shape.text.as_mut()) {
        frame.set_text(&text);
        frame.apply_font(&font);
    }
    Ok(json!({
        "message": format!("Added {} shape to slide {}", args.shape_type, args.slide_index),
        "shape_index": slide.shapes.len() - 1,
    }))
}

fn default_legend() -> String {
    "right".to_string()
}

#[derive(Deserialize)]
struct AddChartArgs {
    slide_index: i64,
    chart_type: String,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    categories: Vec<String>,
    series_names: Vec<String>,
    series_values: Vec<Vec<f64>>,
    #[serde(default = "default_true")]
    has_legend: bool,
    #[serde(default = "default_legend")]
    legend_position: String,
    #[serde(default)]
    has_data_labels: bool,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    x_axis_title: Option<String>,
    #[serde(default)]
    y_axis_title: Option<String>,
    #[serde(default)]
    color_scheme: Option<String>,
    #[serde(default)]
    presentation_id: Option<String>,
}

fn add_chart(state: &mut ServerState, args: AddChartArgs) -> Result<Value> {
    let chart_type = ChartType::parse(&args.chart_type)?;
    check_position(args.left, args.top, args.width, args.height)?;
    validate_series_shape(&args.series_names, &args.series_values)?;

    let series_count = args.series_names.len();
    let categories_count = args.categories.len();
    let series = args
        .series_names
        .into_iter()
        .zip(args.series_values)
        .map(|(name, values)| Series::new(name, values))
        .collect();
    let mut chart = Chart::new(chart_type, args.categories, series)?;
    chart.has_legend = args.has_legend;
    chart.legend_position = LegendPosition::from_name(&args.legend_position);
    chart.data_labels = args.has_data_labels;
    chart.title = args.title.filter(|t| !t.is_empty());
    chart.x_axis_title = args.x_axis_title.filter(|t| !t.is_empty());
    chart.y_axis_title = args.y_axis_title.filter(|t| !t.is_empty());
    if let Some(scheme) = &args.color_scheme {
        chart.apply_palette(&ColorScheme::named(scheme).chart_palette());
    }

    let slide = slide_mut(state, args.presentation_id.as_deref(), args.slide_index)?;
    slide.add_shape(
        "Chart",
        frame_in(args.left, args.top, args.width, args.height),
        ShapeKind::Chart(Box::new(chart)),
    );
    Ok(json!({
        "message": format!("Added {} chart to slide {}", args.chart_type, args.slide_index),
        "shape_index": slide.shapes.len() - 1,
        "chart_type": chart_type.as_name(),
        "series_count": series_count,
        "categories_count": categories_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{call, error_of, slide, state_with_slides};
    use super::super::is_error;
    use super::*;
    use ppt_core::text::VerticalAnchor;

    fn table_args(data: Value) -> Value {
        json!({
            "slide_index": 0, "rows": 2, "cols": 2,
            "left": 1.0, "top": 1.0, "width": 4.0, "height": 1.0,
            "data": data, "header_bg_color": [0, 0, 128],
        })
    }

    #[test]
    fn test_add_table_with_header_styling() {
        let mut state = state_with_slides(1);
        let result = call(&mut state, "add_table", table_args(json!([["Region", "Sales"], ["North", "42"]])));
        assert_eq!(result["message"], "Added 2x2 table to slide 0");
        assert_eq!(result["shape_index"], 2);

        let table = slide(&state, 0).shapes[2].table().unwrap().clone();
        assert_eq!(table.texts(), vec![vec!["Region", "Sales"], vec!["North", "42"]]);
        let header = &table.rows[0].cells[0];
        assert_eq!(header.fill, Some(RgbColor::new(0, 0, 128)));
        let run = header.text.runs().next().unwrap();
        assert_eq!(run.font.bold, Some(true));
        assert_eq!(run.font.size, Some(12.0));
        let body_run = table.rows[1].cells[1].text.runs().next().unwrap();
        assert_eq!(body_run.font.size, Some(10.0));
        assert_eq!(table.rows[1].cells[1].fill, None);
    }

    #[test]
    fn test_add_table_checks_data_shape() {
        let mut state = state_with_slides(1);
        let result = call(&mut state, "add_table", table_args(json!([["a", "b"]])));
        assert_eq!(error_of(&result), "Data has 1 rows but table should have 2 rows");
        let result = call(&mut state, "add_table", table_args(json!([["a", "b"], ["c"]])));
        assert_eq!(
            error_of(&result),
            "Row 1 has 1 columns but table should have 2 columns"
        );
        assert_eq!(slide(&state, 0).shapes.len(), 2);
    }

    #[test]
    fn test_add_table_rejects_huge_dimensions() {
        let mut state = state_with_slides(1);
        let mut args = table_args(Value::Null);
        args["rows"] = json!(100_000_000);
        let result = call(&mut state, "add_table", args);
        assert_eq!(
            error_of(&result),
            "Invalid parameter 'rows': must be between 1 and 1000 (got 100000000)"
        );
        assert_eq!(slide(&state, 0).shapes.len(), 2);
    }

    #[test]
    fn test_format_table_cell() {
        let mut state = state_with_slides(1);
        call(&mut state, "add_table", table_args(json!([["a", "b"], ["c", "d"]])));
        let result = call(
            &mut state,
            "format_table_cell",
            json!({
                "slide_index": 0, "shape_index": 2, "row": 1, "col": 0,
                "italic": true, "bg_color": [255, 255, 0], "alignment": "right", "vertical_alignment": "middle",
            }),
        );
        assert!(!is_error(&result), "{result}");
        let table = slide(&state, 0).shapes[2].table().unwrap().clone();
        let cell = &table.rows[1].cells[0];
        assert_eq!(cell.fill, Some(RgbColor::new(255, 255, 0)));
        assert_eq!(cell.anchor, Some(VerticalAnchor::Middle));
        assert_eq!(cell.text.paragraphs[0].alignment, Some(ppt_core::Alignment::Right));
        assert_eq!(cell.text.runs().next().unwrap().font.italic, Some(true));

        let result = call(
            &mut state,
            "format_table_cell",
            json!({"slide_index": 0, "shape_index": 2, "row": 5, "col": 0}),
        );
        assert_eq!(error_of(&result), "Invalid row index: 5. Available rows: 0-1");
        let result = call(
            &mut state,
            "format_table_cell",
            json!({"slide_index": 0, "shape_index": 0, "row": 0, "col": 0}),
        );
        assert_eq!(error_of(&result), "Shape at index 0 is not a table");
    }

    #[test]
    fn test_add_shape_with_style_and_text() {
        let mut state = state_with_slides(1);
        let result = call(
            &mut state,
            "add_shape",
            json!({
                "slide_index": 0, "shape_type": "rounded_rectangle",
                "left": 1.0, "top": 1.0, "width": 2.0, "height": 1.0,
                "fill_color": [0, 120, 215], "line_width": 2.0, "text": "Go", "font_size": 18,
            }),
        );
        assert_eq!(result["message"], "Added rounded_rectangle shape to slide 0");
        let shape = &slide(&state, 0).shapes[2];
        assert_eq!(shape.name, "Rounded Rectangle 3");
        assert_eq!(shape.kind, ShapeKind::AutoShape { preset: "roundRect".into() });
        assert_eq!(shape.fill, Some(Fill::Solid(RgbColor::new(0, 120, 215))));
        assert_eq!(shape.line.unwrap().width, Some(points(2.0)));
        assert_eq!(shape.text(), "Go");
        assert_eq!(shape.text.as_ref().unwrap().max_font_size(), Some(18.0));
    }

    #[test]
    fn test_add_shape_count_grows_and_unknown_type_fails() {
        let mut state = state_with_slides(1);
        for name in ["oval", "star", "flowchart_decision"] {
            call(
                &mut state,
                "add_shape",
                json!({"slide_index": 0, "shape_type": name, "left": 0.0, "top": 0.0, "width": 1.0, "height": 1.0}),
            );
        }
        assert_eq!(slide(&state, 0).shapes.len(), 5);
        let result = call(
            &mut state,
            "add_shape",
            json!({"slide_index": 0, "shape_type": "blob", "left": 0.0, "top": 0.0, "width": 1.0, "height": 1.0}),
        );
        assert!(error_of(&result).starts_with("Unsupported shape type: 'blob'"));
    }

    fn chart_args(values: Value) -> Value {
        json!({
            "slide_index": 0, "chart_type": "Column",
            "left": 1.0, "top": 1.0, "width": 6.0, "height": 4.0,
            "categories": ["Q1", "Q2", "Q3"],
            "series_names": ["Revenue", "Cost"],
            "series_values": values,
            "title": "Quarterly", "legend_position": "bottom", "color_scheme": "warm_red",
        })
    }

    #[test]
    fn test_add_chart() {
        let mut state = state_with_slides(1);
        let result = call(&mut state, "add_chart", chart_args(json!([[1, 2, 3], [0.5, 1, 1.5]])));
        assert_eq!(result["chart_type"], "column");
        assert_eq!(result["series_count"], 2);
        assert_eq!(result["categories_count"], 3);

        let chart = slide(&state, 0).shapes[2].chart().unwrap().clone();
        assert_eq!(chart.title.as_deref(), Some("Quarterly"));
        assert_eq!(chart.legend_position, LegendPosition::Bottom);
        let palette = ColorScheme::named("warm_red").chart_palette();
        assert_eq!(chart.series[1].color, Some(palette[1]));
    }

    #[test]
    fn test_add_chart_validation() {
        let mut state = state_with_slides(1);
        let result = call(&mut state, "add_chart", chart_args(json!([[1, 2, 3]])));
        assert_eq!(
            error_of(&result),
            "Number of series names (2) must match number of series values (1)"
        );
        let result = call(&mut state, "add_chart", chart_args(json!([[1, 2, 3], [1, 2]])));
        assert_eq!(
            error_of(&result),
            "Series 'Cost' has 2 values but there are 3 categories"
        );
        let mut args = chart_args(json!([[1, 2, 3], [1, 2, 3]]));
        args["chart_type"] = json!("bubble");
        let result = call(&mut state, "add_chart", args);
        assert!(error_of(&result).starts_with("Invalid chart type: 'bubble'"));
    }
}
