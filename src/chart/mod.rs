//! Yield-curve chart: the plotted model and its terminal renderer.

use ratatui::style::Color;

use crate::process::{CurveSet, MATURITY_COUNT};

pub mod tui;

pub use tui::show;

pub const TITLE: &str = "U.S. Treasury Yield Curve";
pub const X_TITLE: &str = "Maturity";
pub const Y_TITLE: &str = "Yield (%)";
pub const LEGEND_TITLE: &str = "Date";

/// Spacing between y-axis ticks, in percentage points.
pub const TICK_STEP: f64 = 0.5;

const PALETTE: [Color; 8] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Red,
    Color::Blue,
    Color::LightCyan,
    Color::LightYellow,
];

/// One dated curve, x = maturity index, y = yield.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CurveChart {
    pub series: Vec<Series>,
    pub y_bounds: [f64; 2],
    pub y_ticks: Vec<f64>,
}

impl CurveChart {
    /// Build one series per distinct date; `None` when there is nothing to plot.
    ///
    /// Null yields are dropped from their series.
    pub fn from_curves(curves: &CurveSet) -> Option<Self> {
        if curves.is_empty() {
            return None;
        }

        let series: Vec<Series> = curves
            .by_date()
            .into_iter()
            .enumerate()
            .map(|(i, row)| Series {
                label: row.label(),
                points: row.points().map(|(m, y)| (m as f64, y)).collect(),
                color: PALETTE[i % PALETTE.len()],
            })
            .collect();

        let (min, max) = series
            .iter()
            .flat_map(|s| s.points.iter().map(|&(_, y)| y))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
                (lo.min(y), hi.max(y))
            });
        let (lo, hi) = if min.is_finite() {
            (min.floor(), max.ceil())
        } else {
            (0.0, 1.0)
        };
        // flat data at a whole number would give an empty range
        let hi = if hi > lo { hi } else { lo + TICK_STEP };

        Some(Self {
            series,
            y_bounds: [lo, hi],
            y_ticks: ticks_between(lo, hi),
        })
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        [0.0, (MATURITY_COUNT - 1) as f64]
    }
}

/// Ticks every [`TICK_STEP`] from `floor(min)` through `ceil(max)`.
pub fn y_ticks(min: f64, max: f64) -> Vec<f64> {
    ticks_between(min.floor(), max.ceil())
}

/// Ticks every [`TICK_STEP`] across already-settled bounds.
fn ticks_between(lo: f64, hi: f64) -> Vec<f64> {
    let steps = ((hi - lo) / TICK_STEP).round().max(0.0) as usize;
    (0..=steps).map(|i| lo + i as f64 * TICK_STEP).collect()
}
