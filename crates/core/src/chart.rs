//! Charts: type, category data, series, and presentation options.

use crate::error::{Error, Result};
use crate::units::RgbColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartType {
    Column,
    StackedColumn,
    Bar,
    StackedBar,
    Line,
    LineMarkers,
    Pie,
    Doughnut,
    Area,
    StackedArea,
    Scatter,
    Radar,
    RadarMarkers,
}

impl ChartType {
    pub const ALL: [ChartType; 13] = [
        ChartType::Column,
        ChartType::StackedColumn,
        ChartType::Bar,
        ChartType::StackedBar,
        ChartType::Line,
        ChartType::LineMarkers,
        ChartType::Pie,
        ChartType::Doughnut,
        ChartType::Area,
        ChartType::StackedArea,
        ChartType::Scatter,
        ChartType::Radar,
        ChartType::RadarMarkers,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.as_name() == name)
    }

    /// Parse a name, reporting the accepted names on failure.
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_name(name).ok_or_else(|| {
            let valid: Vec<&str> = Self::ALL.iter().map(ChartType::as_name).collect();
            Error::invalid(format!(
                "Invalid chart type: '{name}'. Valid types are: {}",
                valid.join(", ")
            ))
        })
    }

    pub fn as_name(&self) -> &'static str {
        match self {
            ChartType::Column => "column",
            ChartType::StackedColumn => "stacked_column",
            ChartType::Bar => "bar",
            ChartType::StackedBar => "stacked_bar",
            ChartType::Line => "line",
            ChartType::LineMarkers => "line_markers",
            ChartType::Pie => "pie",
            ChartType::Doughnut => "doughnut",
            ChartType::Area => "area",
            ChartType::StackedArea => "stacked_area",
            ChartType::Scatter => "scatter",
            ChartType::Radar => "radar",
            ChartType::RadarMarkers => "radar_markers",
        }
    }

    /// Pie and doughnut charts have no axes.
    pub fn has_axes(&self) -> bool {
        !matches!(self, ChartType::Pie | ChartType::Doughnut)
    }

    pub fn is_stacked(&self) -> bool {
        matches!(
            self,
            ChartType::StackedColumn | ChartType::StackedBar | ChartType::StackedArea
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    Right,
    Left,
    Top,
    Bottom,
}

impl LegendPosition {
    /// Unknown names fall back to the right-hand side.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "left" => LegendPosition::Left,
            "top" => LegendPosition::Top,
            "bottom" => LegendPosition::Bottom,
            _ => LegendPosition::Right,
        }
    }

    pub fn as_name(&self) -> &'static str {
        match self {
            LegendPosition::Right => "right",
            LegendPosition::Left => "left",
            LegendPosition::Top => "top",
            LegendPosition::Bottom => "bottom",
        }
    }

    pub fn as_ooxml(&self) -> &'static str {
        match self {
            LegendPosition::Right => "r",
            LegendPosition::Left => "l",
            LegendPosition::Top => "t",
            LegendPosition::Bottom => "b",
        }
    }

    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "l" => LegendPosition::Left,
            "t" => LegendPosition::Top,
            "b" => LegendPosition::Bottom,
            _ => LegendPosition::Right,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
    pub color: Option<RgbColor>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub chart_type: ChartType,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    pub title: Option<String>,
    pub has_legend: bool,
    pub legend_position: LegendPosition,
    pub data_labels: bool,
    pub x_axis_title: Option<String>,
    pub y_axis_title: Option<String>,
}

impl Chart {
    /// Build a chart after checking that every series covers every category.
    pub fn new(chart_type: ChartType, categories: Vec<String>, series: Vec<Series>) -> Result<Self> {
        validate_data(&categories, &series)?;
        Ok(Self {
            chart_type,
            categories,
            series,
            title: None,
            has_legend: true,
            legend_position: LegendPosition::Right,
            data_labels: false,
            x_axis_title: None,
            y_axis_title: None,
        })
    }

    /// Swap in new data, keeping formatting. Series colors carry over by position.
    pub fn replace_data(&mut self, categories: Vec<String>, mut series: Vec<Series>) -> Result<()> {
        validate_data(&categories, &series)?;
        for (new, old) in series.iter_mut().zip(&self.series) {
            if new.color.is_none() {
                new.color = old.color;
            }
        }
        self.categories = categories;
        self.series = series;
        Ok(())
    }

    /// Color series in order, cycling through `palette`.
    pub fn apply_palette(&mut self, palette: &[RgbColor]) {
        if palette.is_empty() {
            return;
        }
        for (i, series) in self.series.iter_mut().enumerate() {
            series.color = Some(palette[i % palette.len()]);
        }
    }
}

/// Check series names, values, and categories against each other.
pub fn validate_series_shape(names: &[String], values: &[Vec<f64>]) -> Result<()> {
    if names.len() != values.len() {
        return Err(Error::invalid(format!(
            "Number of series names ({}) must match number of series values ({})",
            names.len(),
            values.len()
        )));
    }
    Ok(())
}

fn validate_data(categories: &[String], series: &[Series]) -> Result<()> {
    if categories.is_empty() {
        return Err(Error::invalid("Categories list cannot be empty"));
    }
    if series.is_empty() {
        return Err(Error::invalid("At least one series is required"));
    }
    for s in series {
        if s.values.len() != categories.len() {
            return Err(Error::invalid(format!(
                "Series '{}' has {} values but there are {} categories",
                s.name,
                s.values.len(),
                categories.len()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Q{i}")).collect()
    }

    #[test]
    fn test_chart_type_names() {
        assert_eq!(ChartType::from_name("Stacked_Bar"), Some(ChartType::StackedBar));
        assert_eq!(ChartType::ALL.len(), 13);
        let err = ChartType::parse("funnel").unwrap_err().to_string();
        assert!(err.starts_with("Invalid chart type: 'funnel'. Valid types are: column, "));
        assert!(!ChartType::Pie.has_axes());
    }

    #[test]
    fn test_series_length_must_match_categories() {
        let err = Chart::new(
            ChartType::Column,
            cats(3),
            vec![Series::new("Sales", vec![1.0, 2.0])],
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Series 'Sales' has 2 values but there are 3 categories"
        );
    }

    #[test]
    fn test_empty_categories_rejected() {
        let err = Chart::new(ChartType::Line, vec![], vec![]).unwrap_err();
        assert_eq!(err.to_string(), "Categories list cannot be empty");
    }

    #[test]
    fn test_series_shape_validation() {
        let names = vec!["A".to_string()];
        assert!(validate_series_shape(&names, &[vec![1.0]]).is_ok());
        assert!(validate_series_shape(&names, &[vec![1.0], vec![2.0]]).is_err());
    }

    #[test]
    fn test_replace_data_keeps_colors() {
        let mut chart = Chart::new(
            ChartType::Bar,
            cats(2),
            vec![Series::new("A", vec![1.0, 2.0])],
        )
        .unwrap();
        chart.apply_palette(&[RgbColor::new(1, 2, 3)]);
        chart
            .replace_data(cats(3), vec![Series::new("B", vec![3.0, 4.0, 5.0])])
            .unwrap();
        assert_eq!(chart.series[0].color, Some(RgbColor::new(1, 2, 3)));
        assert_eq!(chart.categories.len(), 3);
    }

    #[test]
    fn test_legend_position_fallback() {
        assert_eq!(LegendPosition::from_name("BOTTOM"), LegendPosition::Bottom);
        assert_eq!(LegendPosition::from_name("nowhere"), LegendPosition::Right);
    }
}
