// Line plot geometry: coordinate normalization onto a fixed drawing surface,
// axis label picking and nearest-point tooltip lookup.
use serde::{Deserialize, Serialize};

use crate::domain::colour::Colour;
use crate::domain::number::{format_axis_value, format_tooltip_value};
use crate::domain::series::Series;

/// Number of labels aimed for on each axis.
pub const DEFAULT_LABEL_COUNT: usize = 6;
/// Tooltip values keep at most this many fractional digits.
pub const MAX_TOOLTIP_DIGITS: usize = 8;

/// Measurements of the drawing surface, in pixels. The origin is the top
/// left corner, so y grows downwards and the x-axis sits at
/// `y_length - offset_bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotArea {
    pub x_length: f64,
    pub y_length: f64,
    pub offset_left: f64,
    pub offset_bottom: f64,
}

impl Default for PlotArea {
    fn default() -> Self {
        Self {
            x_length: 740.0,
            y_length: 500.0,
            offset_left: 60.0,
            offset_bottom: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    /// Extent of the values on one axis. A single distinct value is given a
    /// symmetric range around itself so it renders centered instead of
    /// collapsing the axis.
    fn of(values: impl Iterator<Item = f64>) -> Option<Range> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values {
            min = min.min(value);
            max = max.max(value);
        }
        if !min.is_finite() || !max.is_finite() {
            return None;
        }
        if min == max {
            let spread = if min == 0.0 { 1.0 } else { min.abs() };
            return Some(Range {
                min: min - spread,
                max: max + spread,
            });
        }
        Some(Range { min, max })
    }

    fn span(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacedPoint {
    pub x: f64,
    pub y: f64,
}

/// A single placed point renders as a marker, two or more as a polyline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum SeriesShape {
    Marker { at: PlacedPoint },
    Line { points: Vec<PlacedPoint> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedSeries {
    pub name: String,
    pub colour: Colour,
    #[serde(flatten)]
    pub shape: SeriesShape,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLabel {
    pub value: f64,
    pub text: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct PlotGeometry {
    pub series: Vec<PlacedSeries>,
    pub x_labels: Vec<AxisLabel>,
    pub y_labels: Vec<AxisLabel>,
    pub x_range: Option<Range>,
    pub y_range: Option<Range>,
}

impl PlotGeometry {
    /// Maps a pointer position back into the data domain and returns the
    /// nearest tooltip column. Left of the y-axis or below the x-axis there
    /// is no tooltip.
    pub fn tooltip_at<'a>(
        &self,
        index: &'a TooltipIndex,
        area: &PlotArea,
        pointer_x: f64,
        pointer_y: f64,
    ) -> Option<&'a TooltipColumn> {
        let x_range = self.x_range?;
        if pointer_x < area.offset_left || pointer_y > area.y_length - area.offset_bottom {
            return None;
        }
        let x = x_range.min + (pointer_x - area.offset_left) / area.x_length * x_range.span();
        index.nearest(x)
    }
}

fn scale_x(value: f64, range: &Range, area: &PlotArea) -> f64 {
    area.offset_left + (value - range.min) / range.span() * area.x_length
}

fn scale_y(value: f64, range: &Range, area: &PlotArea) -> f64 {
    let bottom = area.y_length - area.offset_bottom;
    bottom - (value - range.min) / range.span() * bottom
}

/// Computes the full geometry for a set of series: placed markers and
/// polylines plus axis labels. Empty input degrades to empty geometry.
pub fn layout(series: &[Series], area: &PlotArea) -> PlotGeometry {
    let x_range = Range::of(series.iter().flat_map(|s| s.points.iter().map(|p| p.x)));
    let y_range = Range::of(series.iter().flat_map(|s| s.points.iter().filter_map(|p| p.y)));
    let (Some(x_range), Some(y_range)) = (x_range, y_range) else {
        return PlotGeometry::default();
    };

    let placed = series
        .iter()
        .filter_map(|s| {
            let points: Vec<PlacedPoint> = s
                .points
                .iter()
                .filter_map(|p| {
                    p.y.map(|y| PlacedPoint {
                        x: scale_x(p.x, &x_range, area),
                        y: scale_y(y, &y_range, area),
                    })
                })
                .collect();
            let shape = match points.len() {
                0 => return None,
                1 => SeriesShape::Marker { at: points[0] },
                _ => SeriesShape::Line { points },
            };
            Some(PlacedSeries {
                name: s.name.clone(),
                colour: s.colour,
                shape,
            })
        })
        .collect();

    let xs = unique_sorted(series.iter().flat_map(|s| s.points.iter().map(|p| p.x)));
    let ys = unique_sorted(series.iter().flat_map(|s| s.points.iter().filter_map(|p| p.y)));
    let x_labels = pick_labels(&xs, DEFAULT_LABEL_COUNT, false)
        .into_iter()
        .map(|value| AxisLabel {
            value,
            text: format_axis_value(value),
            x: scale_x(value, &x_range, area),
            y: area.y_length - area.offset_bottom,
        })
        .collect();
    let y_labels = pick_labels(&ys, DEFAULT_LABEL_COUNT, true)
        .into_iter()
        .map(|value| AxisLabel {
            value,
            text: format_axis_value(value),
            x: area.offset_left,
            y: scale_y(value, &y_range, area),
        })
        .collect();

    PlotGeometry {
        series: placed,
        x_labels,
        y_labels,
        x_range: Some(x_range),
        y_range: Some(y_range),
    }
}

fn unique_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut values: Vec<f64> = values.collect();
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

/// Picks up to `count` axis labels from the sorted unique values of an axis.
///
/// When every value is an integer (and continuous mode is not forced), the
/// labels are actual data values: all of them if few enough, otherwise the
/// minimum and maximum plus uniformly strided interior values, which keeps
/// the ends visible and avoids clustering. Otherwise `count` evenly spaced
/// values between the extremes are generated.
pub fn pick_labels(values: &[f64], count: usize, continuous: bool) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let all_integers = values.iter().all(|v| v.fract() == 0.0);
    if !continuous && all_integers && count >= 3 {
        if values.len() <= count {
            return values.to_vec();
        }
        let interior = &values[1..values.len() - 1];
        let slots = count - 2;
        let stride = interior.len() / slots;
        let offset = interior.len() / (2 * slots);
        let mut labels = Vec::with_capacity(count);
        labels.push(values[0]);
        for i in 0..slots {
            labels.push(interior[offset + i * stride]);
        }
        labels.push(*values.last().unwrap());
        return labels;
    }
    let min = values[0];
    let max = *values.last().unwrap();
    if min == max {
        return vec![min];
    }
    let step = (max - min) / (count - 1) as f64;
    (0..count).map(|i| min + i as f64 * step).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipEntry {
    pub name: String,
    pub colour: Colour,
    pub value: Option<f64>,
    pub display: String,
}

/// All series values present at one distinct x-coordinate, sorted descending
/// by value with gaps first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipColumn {
    pub x: f64,
    pub entries: Vec<TooltipEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct TooltipIndex {
    pub columns: Vec<TooltipColumn>,
}

impl TooltipIndex {
    pub fn build(series: &[Series]) -> Self {
        let mut flat: Vec<(f64, TooltipEntry)> = Vec::new();
        for s in series {
            for point in &s.points {
                flat.push((
                    point.x,
                    TooltipEntry {
                        name: s.name.clone(),
                        colour: s.colour,
                        value: point.y,
                        display: format_tooltip_value(point.y, MAX_TOOLTIP_DIGITS),
                    },
                ));
            }
        }
        flat.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut columns: Vec<TooltipColumn> = Vec::new();
        for (x, entry) in flat {
            match columns.last_mut() {
                Some(column) if column.x == x => column.entries.push(entry),
                _ => columns.push(TooltipColumn {
                    x,
                    entries: vec![entry],
                }),
            }
        }
        for column in &mut columns {
            column.entries.sort_by(|a, b| match (a.value, b.value) {
                (None, None) => std::cmp::Ordering::Equal,
                (None, Some(_)) => std::cmp::Ordering::Less,
                (Some(_), None) => std::cmp::Ordering::Greater,
                (Some(x), Some(y)) => y.total_cmp(&x),
            });
        }
        Self { columns }
    }

    /// Nearest column to a logical x-coordinate. The columns are sorted, so
    /// the distance is unimodal and the scan stops as soon as it starts
    /// growing again.
    pub fn nearest(&self, x: f64) -> Option<&TooltipColumn> {
        let mut best: Option<(&TooltipColumn, f64)> = None;
        for column in &self.columns {
            let distance = (column.x - x).abs();
            match best {
                Some((_, best_distance)) if distance > best_distance => break,
                _ => best = Some((column, distance)),
            }
        }
        best.map(|(column, _)| column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::colour::distinct_colour;
    use crate::domain::series::{pad_to_domain, Point};

    fn series(name: &str, points: &[(f64, f64)]) -> Series {
        Series::new(
            name.to_string(),
            distinct_colour(0),
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        )
    }

    #[test]
    fn test_pick_labels_strided_integers() {
        let values: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let labels = pick_labels(&values, 6, false);
        assert_eq!(labels, vec![1.0, 3.0, 5.0, 7.0, 9.0, 10.0]);
        assert!(labels.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_pick_labels_few_integers_keeps_all() {
        let values = vec![2.0, 4.0, 8.0];
        assert_eq!(pick_labels(&values, 6, false), values);
    }

    #[test]
    fn test_pick_labels_single_value() {
        assert_eq!(pick_labels(&[5.0], 6, true), vec![5.0]);
        assert_eq!(pick_labels(&[5.0], 6, false), vec![5.0]);
    }

    #[test]
    fn test_pick_labels_continuous_interpolates() {
        let labels = pick_labels(&[0.0, 7.3, 10.0], 6, true);
        assert_eq!(labels.len(), 6);
        assert_eq!(labels[0], 0.0);
        assert_eq!(*labels.last().unwrap(), 10.0);
        assert_eq!(labels[1], 2.0);
    }

    #[test]
    fn test_pick_labels_non_integers_fall_back_to_continuous() {
        let values = vec![0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0];
        let labels = pick_labels(&values, 6, false);
        assert_eq!(labels.len(), 6);
        assert_eq!(labels[0], 0.5);
        assert_eq!(*labels.last().unwrap(), 4.0);
    }

    #[test]
    fn test_layout_empty_input() {
        let geometry = layout(&[], &PlotArea::default());
        assert!(geometry.series.is_empty());
        assert!(geometry.x_labels.is_empty());
        assert!(geometry.y_labels.is_empty());
    }

    #[test]
    fn test_layout_single_point_renders_centered_marker() {
        let area = PlotArea::default();
        let geometry = layout(&[series("one", &[(4.0, 10.0)])], &area);
        assert_eq!(geometry.series.len(), 1);
        let SeriesShape::Marker { at } = &geometry.series[0].shape else {
            panic!("single point must place a marker, not a line");
        };
        // The symmetric range fallback puts the lone value mid-axis.
        assert_eq!(at.x, area.offset_left + area.x_length / 2.0);
        assert_eq!(at.y, (area.y_length - area.offset_bottom) / 2.0);
    }

    #[test]
    fn test_layout_polyline_spans_the_surface() {
        let area = PlotArea::default();
        let geometry = layout(&[series("line", &[(0.0, 0.0), (1.0, 1.0), (2.0, 4.0)])], &area);
        let SeriesShape::Line { points } = &geometry.series[0].shape else {
            panic!("two or more points must place a polyline");
        };
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].x, area.offset_left);
        assert_eq!(points[0].y, area.y_length - area.offset_bottom);
        assert_eq!(points[2].x, area.offset_left + area.x_length);
        assert_eq!(points[2].y, 0.0);
    }

    #[test]
    fn test_layout_skips_gap_points_when_drawing() {
        let area = PlotArea::default();
        let with_gap = Series::new(
            "gappy".to_string(),
            distinct_colour(0),
            vec![Point::gap(0.0), Point::new(1.0, 2.0), Point::new(2.0, 3.0)],
        );
        let geometry = layout(&[with_gap], &area);
        let SeriesShape::Line { points } = &geometry.series[0].shape else {
            panic!("expected a polyline");
        };
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_tooltip_entries_sorted_descending_with_gaps_first() {
        let mut all = vec![
            series("low", &[(0.0, 1.0)]),
            series("high", &[(0.0, 5.0)]),
        ];
        all.push(Series::new(
            "gap".to_string(),
            distinct_colour(2),
            vec![Point::gap(0.0)],
        ));
        let index = TooltipIndex::build(&all);
        let column = index.nearest(0.0).unwrap();
        let order: Vec<&str> = column.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(order, vec!["gap", "high", "low"]);
        assert_eq!(column.entries[0].display, "-");
    }

    #[test]
    fn test_tooltip_lookup_with_disjoint_padded_series() {
        let mut all = vec![
            series("low", &[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]),
            series("high", &[(5.0, 1.0), (6.0, 2.0), (7.0, 3.0)]),
        ];
        pad_to_domain(&mut all);
        let index = TooltipIndex::build(&all);
        let column = index.nearest(3.0).unwrap();
        assert_eq!(column.x, 2.0);
        // Only the series that actually has a point at that x shows up.
        assert_eq!(column.entries.len(), 1);
        assert_eq!(column.entries[0].name, "low");
        // At the domain edges the padded gap is present for the other series.
        let edge = index.nearest(0.0).unwrap();
        assert_eq!(edge.entries.len(), 2);
        assert_eq!(edge.entries[0].name, "high");
        assert_eq!(edge.entries[0].value, None);
    }

    #[test]
    fn test_tooltip_at_respects_plot_bounds() {
        let area = PlotArea::default();
        let all = vec![series("s", &[(0.0, 0.0), (10.0, 5.0)])];
        let geometry = layout(&all, &area);
        let index = TooltipIndex::build(&all);
        assert!(geometry
            .tooltip_at(&index, &area, area.offset_left - 1.0, 10.0)
            .is_none());
        assert!(geometry
            .tooltip_at(&index, &area, 100.0, area.y_length - area.offset_bottom + 1.0)
            .is_none());
        let column = geometry
            .tooltip_at(&index, &area, area.offset_left + 1.0, 10.0)
            .unwrap();
        assert_eq!(column.x, 0.0);
    }

    #[test]
    fn test_nearest_early_exit_matches_full_scan() {
        let all = vec![series("s", &[(0.0, 0.0), (2.0, 1.0), (9.0, 2.0), (10.0, 3.0)])];
        let index = TooltipIndex::build(&all);
        for (query, expected) in [(-5.0, 0.0), (1.1, 2.0), (5.4, 2.0), (5.6, 9.0), (50.0, 10.0)] {
            assert_eq!(index.nearest(query).unwrap().x, expected, "query {query}");
        }
    }
}
