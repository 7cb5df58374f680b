// Chart service - Use case for building line charts from scalar categories
use serde::Serialize;

use crate::domain::colour::{assign_colours, ColourMap, DEFAULT_COLOUR};
use crate::domain::plot::{layout, PlotArea, PlotGeometry, TooltipIndex};
use crate::domain::series::{pad_to_domain, Point, Series};
use crate::domain::snapshot::{Item, Kind, Snapshot};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryChart {
    pub category: String,
    pub geometry: PlotGeometry,
    pub tooltip: TooltipIndex,
}

#[derive(Debug, Clone)]
pub struct ChartService {
    area: PlotArea,
}

impl ChartService {
    pub fn new(area: PlotArea) -> Self {
        Self { area }
    }

    pub fn area(&self) -> &PlotArea {
        &self.area
    }

    /// One chart per scalar category present in the snapshot. Colours are
    /// assigned from the run listing order, so a run keeps its colour across
    /// every chart. Categories without any plottable values get no chart.
    pub fn build_charts(&self, snapshot: &Snapshot) -> Vec<CategoryChart> {
        let names: Vec<String> = snapshot.run_names().map(str::to_string).collect();
        let colours = assign_colours(&names);
        snapshot
            .categories(Kind::Scalars)
            .into_iter()
            .filter_map(|category| self.chart_for(snapshot, &names, &colours, category))
            .collect()
    }

    /// The chart of a single category, for pointer-driven tooltip queries.
    pub fn build_chart(&self, snapshot: &Snapshot, category: &str) -> Option<CategoryChart> {
        let names: Vec<String> = snapshot.run_names().map(str::to_string).collect();
        let colours = assign_colours(&names);
        self.chart_for(snapshot, &names, &colours, category.to_string())
    }

    fn chart_for(
        &self,
        snapshot: &Snapshot,
        names: &[String],
        colours: &ColourMap,
        category: String,
    ) -> Option<CategoryChart> {
        let series = collect_series(snapshot, names, colours, &category);
        if series.is_empty() {
            return None;
        }
        let geometry = layout(&series, &self.area);
        let tooltip = TooltipIndex::build(&series);
        Some(CategoryChart {
            category,
            geometry,
            tooltip,
        })
    }
}

fn collect_series(
    snapshot: &Snapshot,
    names: &[String],
    colours: &ColourMap,
    category: &str,
) -> Vec<Series> {
    let mut all = Vec::new();
    for name in names {
        let Some(data) = snapshot.category_data(Kind::Scalars, name, category) else {
            continue;
        };
        let mut points = Vec::new();
        for (step, stored) in &data.steps {
            if let Item::Scalar(scalar) = &stored.item {
                if let Some(value) = scalar.value {
                    points.push(Point::new(*step as f64, value));
                }
            }
        }
        if points.is_empty() {
            continue;
        }
        let colour = colours.get(name).copied().unwrap_or(DEFAULT_COLOUR);
        all.push(Series::new(name.clone(), colour, points));
    }
    pad_to_domain(&mut all);
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snapshot::{ScalarEntry, StepKey};

    fn set_scalar(snapshot: &mut Snapshot, name: &str, category: &str, step: u64, value: f64) {
        snapshot.set(
            Kind::Scalars,
            name,
            StepKey::Step(step),
            category,
            Item::Scalar(ScalarEntry { value: Some(value) }),
            false,
        );
    }

    #[test]
    fn test_builds_one_chart_per_category() {
        let mut snapshot = Snapshot::new();
        set_scalar(&mut snapshot, "run-a", "loss", 0, 1.0);
        set_scalar(&mut snapshot, "run-a", "loss", 1, 0.5);
        set_scalar(&mut snapshot, "run-b", "loss", 0, 1.2);
        set_scalar(&mut snapshot, "run-b", "accuracy", 0, 0.7);

        let charts = ChartService::new(PlotArea::default()).build_charts(&snapshot);
        let categories: Vec<&str> = charts.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(categories, vec!["accuracy", "loss"]);

        let loss = &charts[1];
        assert_eq!(loss.geometry.series.len(), 2);
        assert!(!loss.tooltip.columns.is_empty());
    }

    #[test]
    fn test_runs_keep_their_colour_across_charts() {
        let mut snapshot = Snapshot::new();
        set_scalar(&mut snapshot, "run-a", "loss", 0, 1.0);
        set_scalar(&mut snapshot, "run-a", "loss", 1, 0.9);
        set_scalar(&mut snapshot, "run-a", "accuracy", 0, 0.1);
        set_scalar(&mut snapshot, "run-a", "accuracy", 1, 0.2);
        set_scalar(&mut snapshot, "run-b", "loss", 0, 2.0);
        set_scalar(&mut snapshot, "run-b", "loss", 1, 1.5);

        let charts = ChartService::new(PlotArea::default()).build_charts(&snapshot);
        let colour_in = |category: &str, name: &str| {
            charts
                .iter()
                .find(|c| c.category == category)
                .unwrap()
                .geometry
                .series
                .iter()
                .find(|s| s.name == name)
                .unwrap()
                .colour
        };
        assert_eq!(colour_in("loss", "run-a"), colour_in("accuracy", "run-a"));
        assert_ne!(colour_in("loss", "run-a"), colour_in("loss", "run-b"));
    }

    #[test]
    fn test_empty_snapshot_yields_no_charts() {
        let snapshot = Snapshot::new();
        assert!(ChartService::new(PlotArea::default())
            .build_charts(&snapshot)
            .is_empty());
    }

    #[test]
    fn test_missing_values_become_gaps_not_points() {
        let mut snapshot = Snapshot::new();
        set_scalar(&mut snapshot, "run-a", "loss", 0, 1.0);
        snapshot.set(
            Kind::Scalars,
            "run-a",
            StepKey::Step(1),
            "loss",
            Item::Scalar(ScalarEntry { value: None }),
            false,
        );
        set_scalar(&mut snapshot, "run-a", "loss", 2, 0.5);

        let service = ChartService::new(PlotArea::default());
        let chart = service.build_chart(&snapshot, "loss").unwrap();
        // The valueless step contributes neither a drawn point nor a column.
        let xs: Vec<f64> = chart.tooltip.columns.iter().map(|c| c.x).collect();
        assert_eq!(xs, vec![0.0, 2.0]);
    }
}
