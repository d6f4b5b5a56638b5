use std::collections::BTreeSet;

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Selection types
// ---------------------------------------------------------------------------

/// How every series is drawn. Does not affect which rows are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    Markers,
    Lines,
    MarkersAndLines,
}

impl DrawMode {
    pub const ALL: [DrawMode; 3] = [DrawMode::Markers, DrawMode::Lines, DrawMode::MarkersAndLines];

    pub fn label(self) -> &'static str {
        match self {
            DrawMode::Markers => "markers",
            DrawMode::Lines => "lines",
            DrawMode::MarkersAndLines => "markers+lines",
        }
    }

    pub fn shows_markers(self) -> bool {
        matches!(self, DrawMode::Markers | DrawMode::MarkersAndLines)
    }

    pub fn shows_lines(self) -> bool {
        matches!(self, DrawMode::Lines | DrawMode::MarkersAndLines)
    }
}

/// The group-candidate column, cached by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupColumn {
    pub name: String,
    pub index: usize,
}

/// Which columns feed X, Y and the grouping dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisSelection {
    pub x: Option<String>,
    pub y: Option<String>,
    pub group: Option<GroupColumn>,
}

impl AxisSelection {
    /// First and second headers for X and Y, group column derived from them.
    pub fn defaults(table: &Table) -> Self {
        let headers = table.headers();
        let x = headers.first().cloned();
        let y = headers.get(1).cloned();
        let group = group_candidate(table, x.as_deref(), y.as_deref());
        Self { x, y, group }
    }
}

/// Grouping toggle, observed group values, chosen value and draw mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupingState {
    pub enabled: bool,
    pub distinct: BTreeSet<CellValue>,
    pub value: Option<CellValue>,
    pub mode: DrawMode,
}

/// One plotted trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    /// Group value the rows were filtered on, if any.
    pub group: Option<CellValue>,
    pub points: Vec<(CellValue, CellValue)>,
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

/// The first header that is neither the X nor the Y selection.
///
/// Grouping needs at least three columns; narrower tables have no candidate.
pub fn group_candidate(table: &Table, x: Option<&str>, y: Option<&str>) -> Option<GroupColumn> {
    if table.width() <= 2 {
        return None;
    }
    table
        .headers()
        .iter()
        .enumerate()
        .find(|(_, h)| Some(h.as_str()) != x && Some(h.as_str()) != y)
        .map(|(index, name)| GroupColumn {
            name: name.clone(),
            index,
        })
}

/// The cached group column, if it still describes `table`.
fn valid_group<'a>(table: &Table, group: Option<&'a GroupColumn>) -> Option<&'a GroupColumn> {
    group.filter(|g| {
        table.width() > 2 && table.headers().get(g.index).is_some_and(|h| *h == g.name)
    })
}

/// Turn the table and current selections into plot series.
///
/// * Fewer than two columns, or X/Y not found → no series.
/// * No usable group column → a single series over every row.
/// * Grouping enabled → one series holding the rows of the chosen group value.
/// * Grouping disabled → one series per distinct group value.
pub fn build_series(table: &Table, axes: &AxisSelection, grouping: &GroupingState) -> Vec<Series> {
    if table.width() < 2 {
        return Vec::new();
    }
    let (Some(x_name), Some(y_name)) = (axes.x.as_deref(), axes.y.as_deref()) else {
        return Vec::new();
    };
    let (Some(x), Some(y)) = (table.column(x_name), table.column(y_name)) else {
        return Vec::new();
    };

    let Some(group) = valid_group(table, axes.group.as_ref()) else {
        return vec![Series {
            name: format!("{y_name} vs {x_name}"),
            group: None,
            points: table.rows().iter().map(|row| point(row, x, y)).collect(),
        }];
    };

    if grouping.enabled {
        match &grouping.value {
            Some(value) => vec![series_for_value(table, x, y, group.index, value)],
            None => Vec::new(),
        }
    } else {
        table
            .distinct_values(group.index)
            .iter()
            .map(|value| series_for_value(table, x, y, group.index, value))
            .collect()
    }
}

fn series_for_value(table: &Table, x: usize, y: usize, group: usize, value: &CellValue) -> Series {
    let points = table
        .rows()
        .iter()
        .filter(|row| row.get(group) == Some(value))
        .map(|row| point(row, x, y))
        .collect();

    Series {
        name: value.to_string(),
        group: Some(value.clone()),
        points,
    }
}

fn point(row: &[CellValue], x: usize, y: usize) -> (CellValue, CellValue) {
    let cell = |i: usize| row.get(i).cloned().unwrap_or(CellValue::Null);
    (cell(x), cell(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn i(v: i64) -> CellValue {
        CellValue::Integer(v)
    }

    fn revenue_table() -> Table {
        Table::new(
            vec!["Year".into(), "Revenue".into(), "Region".into()],
            vec![
                vec![i(2020), i(100), s("A")],
                vec![i(2021), i(150), s("B")],
                vec![i(2022), i(120), s("A")],
            ],
        )
    }

    fn grouping(enabled: bool, value: Option<CellValue>) -> GroupingState {
        GroupingState {
            enabled,
            value,
            ..Default::default()
        }
    }

    #[test]
    fn defaults_pick_first_second_and_third_headers() {
        let axes = AxisSelection::defaults(&revenue_table());
        assert_eq!(axes.x.as_deref(), Some("Year"));
        assert_eq!(axes.y.as_deref(), Some("Revenue"));
        assert_eq!(
            axes.group,
            Some(GroupColumn {
                name: "Region".into(),
                index: 2
            })
        );
    }

    #[test]
    fn group_candidate_skips_x_and_y() {
        let table = revenue_table();
        let group = group_candidate(&table, Some("Region"), Some("Revenue")).unwrap();
        assert_eq!(group.name, "Year");
        assert_eq!(group.index, 0);
    }

    #[test]
    fn group_candidate_needs_three_columns() {
        let table = Table::new(vec!["a".into(), "b".into()], vec![]);
        assert_eq!(group_candidate(&table, Some("a"), None), None);
    }

    #[test]
    fn disabled_grouping_gives_one_series_per_value() {
        let table = revenue_table();
        let axes = AxisSelection::defaults(&table);
        let series = build_series(&table, &axes, &grouping(false, None));

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "A");
        assert_eq!(series[0].points, vec![(i(2020), i(100)), (i(2022), i(120))]);
        assert_eq!(series[1].name, "B");
        assert_eq!(series[1].points, vec![(i(2021), i(150))]);
    }

    #[test]
    fn enabled_grouping_keeps_only_the_chosen_value() {
        let table = revenue_table();
        let axes = AxisSelection::defaults(&table);
        let series = build_series(&table, &axes, &grouping(true, Some(s("A"))));

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, "A");
        assert_eq!(series[0].points, vec![(i(2020), i(100)), (i(2022), i(120))]);
    }

    #[test]
    fn enabled_grouping_without_a_value_draws_nothing() {
        let table = revenue_table();
        let axes = AxisSelection::defaults(&table);
        assert!(build_series(&table, &axes, &grouping(true, None)).is_empty());
    }

    #[test]
    fn two_columns_give_one_series_regardless_of_toggle() {
        let table = Table::new(
            vec!["Year".into(), "Revenue".into()],
            vec![vec![i(2020), i(100)], vec![i(2021), i(150)]],
        );
        let axes = AxisSelection::defaults(&table);
        assert_eq!(axes.group, None);

        for enabled in [false, true] {
            let series = build_series(&table, &axes, &grouping(enabled, Some(s("A"))));
            assert_eq!(series.len(), 1);
            assert_eq!(series[0].name, "Revenue vs Year");
            assert_eq!(series[0].points.len(), table.len());
        }
    }

    #[test]
    fn narrow_or_empty_tables_give_no_series() {
        for headers in [vec![], vec!["only".to_string()]] {
            let table = Table::new(headers, vec![]);
            let axes = AxisSelection::defaults(&table);
            assert!(build_series(&table, &axes, &GroupingState::default()).is_empty());
        }
    }

    #[test]
    fn empty_rows_give_empty_or_no_series() {
        let table = Table::new(vec!["a".into(), "b".into(), "c".into()], vec![]);
        let axes = AxisSelection::defaults(&table);
        assert!(build_series(&table, &axes, &grouping(false, None)).is_empty());

        let table = Table::new(vec!["a".into(), "b".into()], vec![]);
        let axes = AxisSelection::defaults(&table);
        let series = build_series(&table, &axes, &grouping(false, None));
        assert_eq!(series.len(), 1);
        assert!(series[0].points.is_empty());
    }

    #[test]
    fn unset_axes_do_not_panic() {
        let table = revenue_table();
        let axes = AxisSelection::default();
        assert!(build_series(&table, &axes, &GroupingState::default()).is_empty());

        let axes = AxisSelection {
            x: Some("Year".into()),
            y: Some("Missing".into()),
            group: None,
        };
        assert!(build_series(&table, &axes, &GroupingState::default()).is_empty());
    }

    #[test]
    fn stale_group_index_falls_back_to_single_series() {
        let table = revenue_table();
        let mut axes = AxisSelection::defaults(&table);
        axes.group = Some(GroupColumn {
            name: "Region".into(),
            index: 9,
        });
        let series = build_series(&table, &axes, &grouping(false, None));
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points.len(), 3);

        axes.group = Some(GroupColumn {
            name: "Other".into(),
            index: 2,
        });
        assert_eq!(build_series(&table, &axes, &grouping(false, None)).len(), 1);
    }

    #[test]
    fn ungrouped_series_covers_every_row_for_any_axis_pair() {
        let table = Table::new(
            vec!["a".into(), "b".into()],
            (0..25).map(|n| vec![i(n), i(n * n)]).collect(),
        );
        for (x, y) in [("a", "b"), ("b", "a")] {
            let axes = AxisSelection {
                x: Some(x.into()),
                y: Some(y.into()),
                group: None,
            };
            let series = build_series(&table, &axes, &GroupingState::default());
            assert_eq!(series[0].points.len(), table.len());
        }
    }

    #[test]
    fn per_value_series_partition_the_rows() {
        let regions = ["N", "S", "E", "W"];
        let table = Table::new(
            vec!["t".into(), "v".into(), "region".into(), "flag".into()],
            (0..40)
                .map(|n| {
                    let region = if n % 7 == 0 {
                        CellValue::Null
                    } else {
                        s(regions[(n as usize * 3) % 4])
                    };
                    vec![i(n), i(n % 5), region, CellValue::Bool(n % 2 == 0)]
                })
                .collect(),
        );

        for (x, y) in [("t", "v"), ("t", "region"), ("flag", "v")] {
            let axes = AxisSelection {
                x: Some(x.into()),
                y: Some(y.into()),
                group: group_candidate(&table, Some(x), Some(y)),
            };
            let series = build_series(&table, &axes, &grouping(false, None));
            let total: usize = series.iter().map(|s| s.points.len()).sum();
            assert_eq!(total, table.len(), "x={x} y={y}");
        }
    }

    #[test]
    fn nan_group_values_keep_their_rows() {
        let csv = b"t,v,g\n1,2,NaN\n3,4,NaN\n5,6,A\n";
        let table = crate::data::loader::parse_bytes(csv, crate::data::loader::SheetFormat::Csv)
            .unwrap();
        let axes = AxisSelection::defaults(&table);

        let series = build_series(&table, &axes, &grouping(false, None));
        let counts: Vec<_> = series
            .iter()
            .map(|s| (s.name.clone(), s.points.len()))
            .collect();
        assert_eq!(counts, vec![("NaN".to_string(), 2), ("A".to_string(), 1)]);

        let nan = CellValue::Float(f64::NAN);
        let single = build_series(&table, &axes, &grouping(true, Some(nan)));
        assert_eq!(single[0].points.len(), 2);
    }

    #[test]
    fn build_series_is_idempotent() {
        let table = revenue_table();
        let axes = AxisSelection::defaults(&table);
        for state in [grouping(false, None), grouping(true, Some(s("B")))] {
            assert_eq!(
                build_series(&table, &axes, &state),
                build_series(&table, &axes, &state)
            );
        }
    }

    #[test]
    fn draw_mode_flags() {
        assert!(DrawMode::Markers.shows_markers() && !DrawMode::Markers.shows_lines());
        assert!(!DrawMode::Lines.shows_markers() && DrawMode::Lines.shows_lines());
        assert!(DrawMode::MarkersAndLines.shows_markers() && DrawMode::MarkersAndLines.shows_lines());
    }
}
