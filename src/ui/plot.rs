use std::collections::HashMap;

use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::data::model::CellValue;
use crate::data::reshape::Series;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Axis scale: numeric or categorical
// ---------------------------------------------------------------------------

/// Maps cell values onto a plot axis.
///
/// Columns holding only numbers (and blanks) are plotted as-is; any text
/// turns the axis categorical, placing each label at its order of first
/// appearance.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisScale {
    Numeric,
    Categorical {
        labels: Vec<String>,
        positions: HashMap<String, usize>,
    },
}

impl AxisScale {
    pub fn from_values<'a>(values: impl Iterator<Item = &'a CellValue>) -> Self {
        let mut labels: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut numeric = true;

        for value in values {
            if value.is_null() {
                continue;
            }
            if value.as_f64().is_none() {
                numeric = false;
            }
            let label = value.to_string();
            if !positions.contains_key(&label) {
                positions.insert(label.clone(), labels.len());
                labels.push(label);
            }
        }

        if numeric {
            AxisScale::Numeric
        } else {
            AxisScale::Categorical { labels, positions }
        }
    }

    /// Plot coordinate of `value`; blanks are not plotted.
    pub fn position(&self, value: &CellValue) -> Option<f64> {
        if value.is_null() {
            return None;
        }
        match self {
            AxisScale::Numeric => value.as_f64(),
            AxisScale::Categorical { positions, .. } => {
                positions.get(&value.to_string()).map(|&p| p as f64)
            }
        }
    }

    /// Tick labels for categorical axes.
    fn labels(&self) -> Option<Vec<String>> {
        match self {
            AxisScale::Numeric => None,
            AxisScale::Categorical { labels, .. } => Some(labels.clone()),
        }
    }
}

fn tick_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

/// Plot coordinates of a series; points with a blank or unplaceable cell
/// are skipped.
fn plot_points(series: &Series, x_scale: &AxisScale, y_scale: &AxisScale) -> Vec<[f64; 2]> {
    series
        .points
        .iter()
        .filter_map(|(x, y)| Some([x_scale.position(x)?, y_scale.position(y)?]))
        .collect()
}

// ---------------------------------------------------------------------------
// Scatter/line plot (central panel)
// ---------------------------------------------------------------------------

/// Render the chart in the central panel.
pub fn series_plot(ui: &mut Ui, state: &AppState) {
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Select a dataset and press \"Load Data\"");
        });
        return;
    }

    let x_title = state.axes.x.clone().unwrap_or_default();
    let y_title = state.axes.y.clone().unwrap_or_default();
    let mode = state.grouping.mode;

    let x_scale = AxisScale::from_values(state.series.iter().flat_map(|s| s.points.iter().map(|p| &p.0)));
    let y_scale = AxisScale::from_values(state.series.iter().flat_map(|s| s.points.iter().map(|p| &p.1)));

    let mut plot = Plot::new("series_plot")
        .legend(Legend::default())
        .x_axis_label(x_title)
        .y_axis_label(y_title)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if let Some(labels) = x_scale.labels() {
        plot = plot.x_axis_formatter(move |mark, _range| tick_label(&labels, mark.value));
    }
    if let Some(labels) = y_scale.labels() {
        plot = plot.y_axis_formatter(move |mark, _range| tick_label(&labels, mark.value));
    }

    plot.show(ui, |plot_ui| {
        for series in &state.series {
            let color = state
                .color_map
                .as_ref()
                .map(|cm| cm.color_for(series.group.as_ref()))
                .unwrap_or(eframe::egui::Color32::LIGHT_BLUE);
            let coords = plot_points(series, &x_scale, &y_scale);

            if mode.shows_lines() {
                let line = Line::new(PlotPoints::new(coords.clone()))
                    .name(&series.name)
                    .color(color)
                    .width(1.5);
                plot_ui.line(line);
            }
            if mode.shows_markers() {
                let points = Points::new(PlotPoints::new(coords))
                    .name(&series.name)
                    .color(color)
                    .radius(3.0);
                plot_ui.points(points);
            }
        }
    });
}
