// Data series: named sequences of (x, y) points sharing one coordinate system
use serde::{Deserialize, Serialize};

use crate::domain::colour::Colour;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    /// A missing value marks a gap: it takes part in tooltip lookup but is
    /// never drawn.
    pub y: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y: Some(y) }
    }

    pub fn gap(x: f64) -> Self {
        Self { x, y: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub colour: Colour,
    pub points: Vec<Point>,
}

impl Series {
    /// Points are kept sorted by x, so connecting them always yields a path
    /// that is monotonic in x.
    pub fn new(name: String, colour: Colour, mut points: Vec<Point>) -> Self {
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        Self {
            name,
            colour,
            points,
        }
    }
}

/// Pads every series with explicit gap points at the start and end of the
/// shared x-domain. Without this, a nearest-x tooltip lookup over series
/// covering different ranges would attribute far-away values to series that
/// have no data there.
pub fn pad_to_domain(series: &mut [Series]) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for s in series.iter() {
        for point in &s.points {
            min = min.min(point.x);
            max = max.max(point.x);
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return;
    }
    for s in series.iter_mut() {
        let Some((first, last)) = s.points.first().zip(s.points.last()) else {
            continue;
        };
        let (first_x, last_x) = (first.x, last.x);
        if first_x > min {
            s.points.insert(0, Point::gap(min));
        }
        if last_x < max {
            s.points.push(Point::gap(max));
        }
    }
}
