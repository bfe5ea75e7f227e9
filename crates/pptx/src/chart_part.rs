//! Chart parts (`ppt/charts/chartN.xml`).
//!
//! Data is written as literal caches (`c:strLit`, `c:numLit`) with no
//! embedded workbook, so a chart renders from the part alone.

use ppt_core::chart::{Chart, ChartType, LegendPosition, Series};
use ppt_core::{Error, Result};

use crate::drawingml::{read_color, write_solid_fill};
use crate::xml::{Element, XmlBuilder};

const NS_CHART: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CAT_AXIS_ID: &str = "500000001";
const VAL_AXIS_ID: &str = "500000002";

fn rich_text(el: &Element) -> Option<String> {
    let mut runs = Vec::new();
    el.descendants("t", &mut runs);
    let text: String = runs.iter().map(|t| t.text()).collect();
    (!text.is_empty()).then_some(text)
}

/// Upper bound on points per category or value list.
const MAX_CHART_POINTS: usize = 65_536;

/// Point values of a `c:cat`/`c:val` style element, indexed by `c:pt/@idx`.
///
/// The length is `c:ptCount`, or one past the highest index when the count
/// is missing. Points indexed past that length are skipped.
fn points_of(el: &Element) -> Result<Vec<String>> {
    let mut pts = Vec::new();
    el.descendants("pt", &mut pts);
    let declared = el.descendant("ptCount").and_then(|c| c.attr_i64("val"));
    let len = match declared {
        Some(n) => n.max(0) as u64,
        None => pts
            .iter()
            .filter_map(|p| p.attr_i64("idx"))
            .map(|i| i.max(0) as u64 + 1)
            .max()
            .unwrap_or(0),
    };
    if len > MAX_CHART_POINTS as u64 {
        return Err(Error::PptxParseError(format!(
            "Chart data has {len} points (limit {MAX_CHART_POINTS})"
        )));
    }
    let mut out = vec![String::new(); len as usize];
    for pt in pts {
        let idx = pt.attr_i64("idx").unwrap_or(0).max(0) as u64;
        match (out.get_mut(idx as usize), pt.child("v")) {
            (Some(slot), Some(v)) => *slot = v.text(),
            (None, _) => log::warn!("skipping chart point {idx} beyond count {len}"),
            _ => {}
        }
    }
    Ok(out)
}

fn series_color(ser: &Element) -> Option<ppt_core::RgbColor> {
    let sp_pr = ser.child("spPr")?;
    sp_pr
        .child("solidFill")
        .and_then(read_color)
        .or_else(|| sp_pr.path(&["ln", "solidFill"]).and_then(read_color))
}

fn detect_type(plot: &Element) -> Result<(ChartType, &Element)> {
    let group = plot
        .elements()
        .find(|e| e.local().ends_with("Chart"))
        .ok_or_else(|| Error::PptxParseError("Chart has no plot".to_string()))?;
    let grouping = group.child("grouping").and_then(|g| g.attr("val"));
    let stacked = matches!(grouping, Some("stacked" | "percentStacked"));
    let chart_type = match group.local() {
        "barChart" => {
            let bar = group.child("barDir").and_then(|d| d.attr("val")) == Some("bar");
            match (bar, stacked) {
                (false, false) => ChartType::Column,
                (false, true) => ChartType::StackedColumn,
                (true, false) => ChartType::Bar,
                (true, true) => ChartType::StackedBar,
            }
        }
        "lineChart" => {
            let no_markers = group.children_named("ser").any(|s| {
                s.path(&["marker", "symbol"]).and_then(|m| m.attr("val")) == Some("none")
            });
            if no_markers {
                ChartType::Line
            } else {
                ChartType::LineMarkers
            }
        }
        "pieChart" => ChartType::Pie,
        "doughnutChart" => ChartType::Doughnut,
        "areaChart" if stacked => ChartType::StackedArea,
        "areaChart" => ChartType::Area,
        "scatterChart" => ChartType::Scatter,
        "radarChart" => {
            if group.child("radarStyle").and_then(|s| s.attr("val")) == Some("marker") {
                ChartType::RadarMarkers
            } else {
                ChartType::Radar
            }
        }
        other => {
            return Err(Error::Unsupported(format!("Unsupported chart kind '{other}'")));
        }
    };
    Ok((chart_type, group))
}

/// Parse a `c:chartSpace` document.
pub fn read_chart(root: &Element) -> Result<Chart> {
    let chart_el = root
        .child("chart")
        .ok_or_else(|| Error::PptxParseError("Chart part has no c:chart".to_string()))?;
    let plot = chart_el
        .child("plotArea")
        .ok_or_else(|| Error::PptxParseError("Chart has no plot area".to_string()))?;
    let (chart_type, group) = detect_type(plot)?;

    let (cat_name, val_name) = if chart_type == ChartType::Scatter {
        ("xVal", "yVal")
    } else {
        ("cat", "val")
    };
    let mut categories: Vec<String> = Vec::new();
    let mut series = Vec::new();
    for (i, ser) in group.children_named("ser").enumerate() {
        if categories.is_empty() {
            if let Some(cat) = ser.child(cat_name) {
                categories = points_of(cat)?;
            }
        }
        let values: Vec<f64> = ser
            .child(val_name)
            .map(points_of)
            .transpose()?
            .unwrap_or_default()
            .iter()
            .map(|v| v.trim().parse().unwrap_or(0.0))
            .collect();
        let name = ser
            .child("tx")
            .and_then(|tx| tx.descendant("v"))
            .map(Element::text)
            .unwrap_or_else(|| format!("Series {}", i + 1));
        let mut s = Series::new(name, values);
        s.color = series_color(ser);
        series.push(s);
    }
    if categories.is_empty() {
        let len = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
        categories = (1..=len).map(|i| i.to_string()).collect();
    }
    for s in &mut series {
        s.values.resize(categories.len(), 0.0);
    }

    let mut chart = Chart::new(chart_type, categories, series)?;
    chart.title = chart_el
        .child("title")
        .and_then(|t| t.child("tx"))
        .and_then(rich_text);
    if let Some(legend) = chart_el.child("legend") {
        chart.has_legend = true;
        chart.legend_position = legend
            .child("legendPos")
            .and_then(|p| p.attr("val"))
            .map(LegendPosition::from_ooxml)
            .unwrap_or(LegendPosition::Right);
    } else {
        chart.has_legend = false;
    }
    let show_val = |el: &Element| {
        el.path(&["dLbls", "showVal"]).and_then(|v| v.attr_bool("val")) == Some(true)
    };
    chart.data_labels = show_val(group) || group.children_named("ser").any(|s| show_val(s));

    let axis_title = |ax: &Element| ax.child("title").and_then(|t| t.child("tx")).and_then(rich_text);
    if chart_type == ChartType::Scatter {
        for ax in plot.children_named("valAx") {
            let horizontal = ax.child("axPos").and_then(|p| p.attr("val")) == Some("b");
            if horizontal {
                chart.x_axis_title = axis_title(ax);
            } else {
                chart.y_axis_title = axis_title(ax);
            }
        }
    } else {
        chart.x_axis_title = plot.child("catAx").and_then(axis_title);
        chart.y_axis_title = plot.child("valAx").and_then(axis_title);
    }
    Ok(chart)
}

fn write_rich_title(xml: &mut XmlBuilder, text: &str) {
    xml.open("c:title", &[]).open("c:tx", &[]).open("c:rich", &[]);
    xml.empty("a:bodyPr", &[]).empty("a:lstStyle", &[]);
    xml.open("a:p", &[]).open("a:r", &[]);
    xml.empty("a:rPr", &[("lang", "en-US")]);
    xml.leaf("a:t", &[], text);
    xml.close("a:r").close("a:p");
    xml.close("c:rich").close("c:tx");
    xml.empty("c:overlay", &[("val", "0")]);
    xml.close("c:title");
}

fn val(xml: &mut XmlBuilder, tag: &str, value: &str) {
    xml.empty(tag, &[("val", value)]);
}

fn write_str_lit(xml: &mut XmlBuilder, tag: &str, values: &[String]) {
    xml.open(tag, &[]).open("c:strLit", &[]);
    val(xml, "c:ptCount", &values.len().to_string());
    for (i, v) in values.iter().enumerate() {
        xml.open("c:pt", &[("idx", &i.to_string())]);
        xml.leaf("c:v", &[], v);
        xml.close("c:pt");
    }
    xml.close("c:strLit").close(tag);
}

fn write_num_lit(xml: &mut XmlBuilder, tag: &str, values: &[f64]) {
    xml.open(tag, &[]).open("c:numLit", &[]);
    xml.leaf("c:formatCode", &[], "General");
    val(xml, "c:ptCount", &values.len().to_string());
    for (i, v) in values.iter().enumerate() {
        xml.open("c:pt", &[("idx", &i.to_string())]);
        xml.leaf("c:v", &[], &v.to_string());
        xml.close("c:pt");
    }
    xml.close("c:numLit").close(tag);
}

fn write_data_labels(xml: &mut XmlBuilder) {
    xml.open("c:dLbls", &[]);
    for (tag, on) in [
        ("c:showLegendKey", "0"),
        ("c:showVal", "1"),
        ("c:showCatName", "0"),
        ("c:showSerName", "0"),
        ("c:showPercent", "0"),
        ("c:showBubbleSize", "0"),
    ] {
        val(xml, tag, on);
    }
    xml.close("c:dLbls");
}

fn is_line_like(chart_type: ChartType) -> bool {
    matches!(
        chart_type,
        ChartType::Line | ChartType::LineMarkers | ChartType::Scatter | ChartType::Radar | ChartType::RadarMarkers
    )
}

fn write_series(xml: &mut XmlBuilder, chart: &Chart, index: usize, series: &Series) {
    let chart_type = chart.chart_type;
    xml.open("c:ser", &[]);
    val(xml, "c:idx", &index.to_string());
    val(xml, "c:order", &index.to_string());
    xml.open("c:tx", &[]).leaf("c:v", &[], &series.name).close("c:tx");
    if let Some(color) = series.color {
        xml.open("c:spPr", &[]);
        if is_line_like(chart_type) {
            xml.open("a:ln", &[("w", "28575")]);
            write_solid_fill(xml, color);
            xml.close("a:ln");
        } else {
            write_solid_fill(xml, color);
        }
        xml.close("c:spPr");
    }
    match chart_type {
        ChartType::Column | ChartType::StackedColumn | ChartType::Bar | ChartType::StackedBar => {
            val(xml, "c:invertIfNegative", "0");
        }
        ChartType::Line | ChartType::Radar => {
            xml.open("c:marker", &[]);
            val(xml, "c:symbol", "none");
            xml.close("c:marker");
        }
        _ => {}
    }
    if chart_type == ChartType::Scatter {
        let xs: Vec<f64> = chart
            .categories
            .iter()
            .enumerate()
            .map(|(i, c)| c.trim().parse().unwrap_or((i + 1) as f64))
            .collect();
        write_num_lit(xml, "c:xVal", &xs);
        write_num_lit(xml, "c:yVal", &series.values);
        val(xml, "c:smooth", "0");
    } else {
        write_str_lit(xml, "c:cat", &chart.categories);
        write_num_lit(xml, "c:val", &series.values);
        if matches!(chart_type, ChartType::Line | ChartType::LineMarkers) {
            val(xml, "c:smooth", "0");
        }
    }
    xml.close("c:ser");
}

fn write_axes(xml: &mut XmlBuilder, chart: &Chart) {
    let horizontal_bars = matches!(chart.chart_type, ChartType::Bar | ChartType::StackedBar);
    let (cat_pos, val_pos) = if horizontal_bars { ("l", "b") } else { ("b", "l") };

    if chart.chart_type == ChartType::Scatter {
        write_val_axis(xml, CAT_AXIS_ID, VAL_AXIS_ID, "b", chart.x_axis_title.as_deref());
        write_val_axis(xml, VAL_AXIS_ID, CAT_AXIS_ID, "l", chart.y_axis_title.as_deref());
        return;
    }

    xml.open("c:catAx", &[]);
    val(xml, "c:axId", CAT_AXIS_ID);
    xml.open("c:scaling", &[]);
    val(xml, "c:orientation", "minMax");
    xml.close("c:scaling");
    val(xml, "c:delete", "0");
    val(xml, "c:axPos", cat_pos);
    if let Some(title) = &chart.x_axis_title {
        write_rich_title(xml, title);
    }
    xml.empty("c:numFmt", &[("formatCode", "General"), ("sourceLinked", "0")]);
    val(xml, "c:majorTickMark", "out");
    val(xml, "c:minorTickMark", "none");
    val(xml, "c:tickLblPos", "nextTo");
    val(xml, "c:crossAx", VAL_AXIS_ID);
    val(xml, "c:crosses", "autoZero");
    val(xml, "c:auto", "1");
    val(xml, "c:lblAlgn", "ctr");
    val(xml, "c:lblOffset", "100");
    xml.close("c:catAx");

    write_val_axis(xml, VAL_AXIS_ID, CAT_AXIS_ID, val_pos, chart.y_axis_title.as_deref());
}

fn write_val_axis(xml: &mut XmlBuilder, id: &str, cross: &str, pos: &str, title: Option<&str>) {
    xml.open("c:valAx", &[]);
    val(xml, "c:axId", id);
    xml.open("c:scaling", &[]);
    val(xml, "c:orientation", "minMax");
    xml.close("c:scaling");
    val(xml, "c:delete", "0");
    val(xml, "c:axPos", pos);
    xml.empty("c:majorGridlines", &[]);
    if let Some(title) = title {
        write_rich_title(xml, title);
    }
    xml.empty("c:numFmt", &[("formatCode", "General"), ("sourceLinked", "0")]);
    val(xml, "c:majorTickMark", "out");
    val(xml, "c:minorTickMark", "none");
    val(xml, "c:tickLblPos", "nextTo");
    val(xml, "c:crossAx", cross);
    val(xml, "c:crosses", "autoZero");
    val(xml, "c:crossBetween", "between");
    xml.close("c:valAx");
}

/// Serialize a chart part.
pub fn write_chart(chart: &Chart) -> String {
    let chart_type = chart.chart_type;
    let mut xml = XmlBuilder::new();
    xml.open(
        "c:chartSpace",
        &[("xmlns:c", NS_CHART), ("xmlns:a", NS_A), ("xmlns:r", NS_R)],
    );
    val(&mut xml, "c:date1904", "0");
    val(&mut xml, "c:roundedCorners", "0");
    xml.open("c:chart", &[]);
    match &chart.title {
        Some(title) => {
            write_rich_title(&mut xml, title);
            val(&mut xml, "c:autoTitleDeleted", "0");
        }
        None => val(&mut xml, "c:autoTitleDeleted", "1"),
    }
    xml.open("c:plotArea", &[]).empty("c:layout", &[]);

    let (group, vary_colors) = match chart_type {
        ChartType::Column | ChartType::StackedColumn | ChartType::Bar | ChartType::StackedBar => {
            ("c:barChart", "0")
        }
        ChartType::Line | ChartType::LineMarkers => ("c:lineChart", "0"),
        ChartType::Pie => ("c:pieChart", "1"),
        ChartType::Doughnut => ("c:doughnutChart", "1"),
        ChartType::Area | ChartType::StackedArea => ("c:areaChart", "0"),
        ChartType::Scatter => ("c:scatterChart", "0"),
        ChartType::Radar | ChartType::RadarMarkers => ("c:radarChart", "0"),
    };
    xml.open(group, &[]);
    match chart_type {
        ChartType::Column | ChartType::StackedColumn | ChartType::Bar | ChartType::StackedBar => {
            let dir = if matches!(chart_type, ChartType::Bar | ChartType::StackedBar) { "bar" } else { "col" };
            val(&mut xml, "c:barDir", dir);
            val(&mut xml, "c:grouping", if chart_type.is_stacked() { "stacked" } else { "clustered" });
        }
        ChartType::Line | ChartType::LineMarkers => val(&mut xml, "c:grouping", "standard"),
        ChartType::Area | ChartType::StackedArea => {
            val(&mut xml, "c:grouping", if chart_type.is_stacked() { "stacked" } else { "standard" });
        }
        ChartType::Scatter => val(&mut xml, "c:scatterStyle", "lineMarker"),
        ChartType::Radar => val(&mut xml, "c:radarStyle", "standard"),
        ChartType::RadarMarkers => val(&mut xml, "c:radarStyle", "marker"),
        ChartType::Pie | ChartType::Doughnut => {}
    }
    val(&mut xml, "c:varyColors", vary_colors);
    for (i, series) in chart.series.iter().enumerate() {
        write_series(&mut xml, chart, i, series);
    }
    if chart.data_labels {
        write_data_labels(&mut xml);
    }
    match chart_type {
        ChartType::Column | ChartType::Bar => val(&mut xml, "c:gapWidth", "150"),
        ChartType::StackedColumn | ChartType::StackedBar => {
            val(&mut xml, "c:gapWidth", "150");
            val(&mut xml, "c:overlap", "100");
        }
        ChartType::Line | ChartType::LineMarkers => val(&mut xml, "c:marker", "1"),
        ChartType::Pie => val(&mut xml, "c:firstSliceAng", "0"),
        ChartType::Doughnut => {
            val(&mut xml, "c:firstSliceAng", "0");
            val(&mut xml, "c:holeSize", "50");
        }
        _ => {}
    }
    if chart_type.has_axes() {
        val(&mut xml, "c:axId", CAT_AXIS_ID);
        val(&mut xml, "c:axId", VAL_AXIS_ID);
    }
    xml.close(group);
    if chart_type.has_axes() {
        write_axes(&mut xml, chart);
    }
    xml.close("c:plotArea");

    if chart.has_legend {
        xml.open("c:legend", &[]);
        val(&mut xml, "c:legendPos", chart.legend_position.as_ooxml());
        val(&mut xml, "c:overlay", "0");
        xml.close("c:legend");
    }
    val(&mut xml, "c:plotVisOnly", "1");
    val(&mut xml, "c:dispBlanksAs", "gap");
    xml.close("c:chart");
    xml.close("c:chartSpace");
    xml.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;
    use ppt_core::RgbColor;

    fn sample(chart_type: ChartType) -> Chart {
        Chart::new(
            chart_type,
            vec!["Q1".into(), "Q2".into(), "Q3".into()],
            vec![
                Series::new("North", vec![1.5, 2.0, 3.25]),
                Series::new("South", vec![4.0, 5.0, 6.0]),
            ],
        )
        .unwrap()
    }

    fn round_trip(chart: &Chart) -> Chart {
        read_chart(&parse(&write_chart(chart)).unwrap()).unwrap()
    }

    #[test]
    fn test_every_chart_type_survives() {
        for chart_type in ChartType::ALL {
            let chart = sample(chart_type);
            let back = round_trip(&chart);
            assert_eq!(back.chart_type, chart_type, "{}", chart_type.as_name());
            assert_eq!(back.series[1].values, vec![4.0, 5.0, 6.0]);
        }
    }

    #[test]
    fn test_options_survive() {
        let mut chart = sample(ChartType::StackedBar);
        chart.title = Some("Revenue & Costs".into());
        chart.legend_position = LegendPosition::Bottom;
        chart.data_labels = true;
        chart.x_axis_title = Some("Quarter".into());
        chart.y_axis_title = Some("USD".into());
        chart.apply_palette(&[RgbColor::new(0, 120, 215), RgbColor::new(255, 192, 0)]);
        assert_eq!(round_trip(&chart), chart);
    }

    #[test]
    fn test_chart_without_legend() {
        let mut chart = sample(ChartType::Pie);
        chart.has_legend = false;
        let back = round_trip(&chart);
        assert!(!back.has_legend);
        assert_eq!(back.categories, vec!["Q1", "Q2", "Q3"]);
    }

    #[test]
    fn test_unknown_plot_is_unsupported() {
        let root = parse(
            r#"<c:chartSpace><c:chart><c:plotArea><c:layout/><c:surfaceChart/></c:plotArea></c:chart></c:chartSpace>"#,
        )
        .unwrap();
        assert!(read_chart(&root).is_err());
    }

    #[test]
    fn test_oversized_point_count_is_an_error() {
        let xml = write_chart(&sample(ChartType::Column)).replacen(
            "<c:ptCount val=\"3\"/>",
            "<c:ptCount val=\"4000000000000000000\"/>",
            1,
        );
        assert!(xml.contains("4000000000000000000"));
        let err = read_chart(&parse(&xml).unwrap()).unwrap_err();
        assert!(matches!(err, Error::PptxParseError(_)), "{err}");
    }

    #[test]
    fn test_points_past_count_are_skipped() {
        let root = parse(
            r#"<c:val><c:numLit><c:ptCount val="2"/><c:pt idx="0"><c:v>1</c:v></c:pt><c:pt idx="9000000000"><c:v>5</c:v></c:pt></c:numLit></c:val>"#,
        )
        .unwrap();
        assert_eq!(points_of(&root).unwrap(), vec!["1", ""]);
    }
}
