//! Replacing the data behind an existing chart.

use ppt_core::{Error, Result, Series};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{parse, slide_mut, tool};
use crate::state::ServerState;

pub fn definitions() -> Vec<Value> {
    vec![tool(
        "update_chart_data",
        "Replace existing chart data with new categories and series.",
        json!({
            "slide_index": {"type": "integer"},
            "shape_index": {"type": "integer"},
            "categories": {"type": "array", "items": {"type": "string"}},
            "series_data": {
                "type": "array",
                "description": "Series objects with 'name' and 'values' keys",
                "items": {"type": "object"},
            },
            "presentation_id": {"type": "string"},
        }),
        &["slide_index", "shape_index", "categories", "series_data"],
    )]
}

pub fn call(state: &mut ServerState, name: &str, args: &Value) -> Option<Result<Value>> {
    Some(match name {
        "update_chart_data" => parse(args).and_then(|a| update_chart_data(state, a)),
        _ => return None,
    })
}

#[derive(Deserialize)]
struct UpdateChartArgs {
    slide_index: i64,
    shape_index: i64,
    categories: Vec<String>,
    series_data: Vec<Map<String, Value>>,
    #[serde(default)]
    presentation_id: Option<String>,
}

#[derive(Deserialize)]
struct SeriesSpec {
    name: String,
    values: Vec<f64>,
}

fn update_chart_data(state: &mut ServerState, args: UpdateChartArgs) -> Result<Value> {
    let mut series = Vec::with_capacity(args.series_data.len());
    for raw in args.series_data {
        if !raw.contains_key("name") || !raw.contains_key("values") {
            return Err(Error::invalid("Each series must have 'name' and 'values' keys"));
        }
        let spec: SeriesSpec = parse(&Value::Object(raw))?;
        series.push(Series::new(spec.name, spec.values));
    }
    let series_names: Vec<String> = series.iter().map(|s| s.name.clone()).collect();

    let slide = slide_mut(state, args.presentation_id.as_deref(), args.slide_index)?;
    let chart = slide
        .shape_mut(args.shape_index)?
        .chart_mut()
        .ok_or_else(|| Error::Unsupported("Shape is not a chart".to_string()))?;
    chart.replace_data(args.categories.clone(), series)?;
    log::debug!(
        "replaced chart data on slide {} shape {}",
        args.slide_index,
        args.shape_index
    );

    Ok(json!({
        "message": format!(
            "Updated chart data on slide {}, shape {}",
            args.slide_index, args.shape_index
        ),
        "categories": args.categories,
        "series_count": series_names.len(),
        "series_names": series_names,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{call, error_of, slide, state_with_slides};
    use super::super::is_error;
    use super::*;
    use ppt_core::RgbColor;

    fn state_with_chart() -> ServerState {
        let mut state = state_with_slides(1);
        let result = call(
            &mut state,
            "add_chart",
            json!({
                "slide_index": 0, "chart_type": "line",
                "left": 1.0, "top": 1.0, "width": 5.0, "height": 3.0,
                "categories": ["Jan", "Feb"],
                "series_names": ["Visits"],
                "series_values": [[10, 20]],
                "color_scheme": "elegant_green",
            }),
        );
        assert!(!is_error(&result), "{result}");
        state
    }

    #[test]
    fn test_update_replaces_data_and_keeps_colors() {
        let mut state = state_with_chart();
        let result = call(
            &mut state,
            "update_chart_data",
            json!({
                "slide_index": 0, "shape_index": 2,
                "categories": ["Jan", "Feb", "Mar"],
                "series_data": [
                    {"name": "Visits", "values": [1, 2, 3]},
                    {"name": "Signups", "values": [0, 1, 1]},
                ],
            }),
        );
        assert_eq!(result["series_count"], 2);
        assert_eq!(result["series_names"], json!(["Visits", "Signups"]));

        let chart = slide(&state, 0).shapes[2].chart().unwrap().clone();
        assert_eq!(chart.categories, vec!["Jan", "Feb", "Mar"]);
        assert_eq!(chart.series[1].values, vec![0.0, 1.0, 1.0]);
        assert_eq!(chart.series[0].color, Some(RgbColor::new(70, 136, 71)));
    }

    #[test]
    fn test_update_errors() {
        let mut state = state_with_chart();
        let result = call(
            &mut state,
            "update_chart_data",
            json!({"slide_index": 0, "shape_index": 2, "categories": ["a"], "series_data": [{"values": [1]}]}),
        );
        assert_eq!(error_of(&result), "Each series must have 'name' and 'values' keys");

        let result = call(
            &mut state,
            "update_chart_data",
            json!({"slide_index": 0, "shape_index": 0, "categories": ["a"], "series_data": [{"name": "s", "values": [1]}]}),
        );
        assert_eq!(error_of(&result), "Shape is not a chart");

        let result = call(
            &mut state,
            "update_chart_data",
            json!({"slide_index": 0, "shape_index": 2, "categories": ["a", "b"], "series_data": [{"name": "s", "values": [1]}]}),
        );
        assert_eq!(
            error_of(&result),
            "Series 's' has 1 values but there are 2 categories"
        );
    }
}
