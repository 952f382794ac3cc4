//! Chart rendering: PNG line and bar charts drawn with plotters.

pub mod bar;
pub mod line;

pub use bar::{render_actor_bars, render_actor_comparison};
pub use line::render_genre_lines;

use crate::model::{AggregateRow, ChartError, Genre};
use plotters::style::RGBColor;
use std::fmt::Display;
use std::fs;
use std::path::Path;

pub const FONT: &str = "sans-serif";

/// The per-row value plotted on the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    AverageRating,
    Mentions,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Metric::AverageRating => "Average rating",
            Metric::Mentions => "NYT mentions",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Metric::AverageRating => "ratings",
            Metric::Mentions => "mentions",
        }
    }

    pub fn value(self, row: &AggregateRow) -> Option<f64> {
        match self {
            Metric::AverageRating => row.average_rating,
            Metric::Mentions => row.total_mentions.map(|m| m as f64),
        }
    }

    /// Upper bound of the y axis for the plotted values.
    fn y_max(self, values: impl Iterator<Item = f64>) -> f64 {
        match self {
            Metric::AverageRating => 10.0,
            Metric::Mentions => padded_max(values),
        }
    }
}

/// Pixel size of every chart written in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl ChartSize {
    pub fn dims(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

pub fn genre_color(genre: Genre) -> RGBColor {
    match genre {
        Genre::Action => RGBColor(214, 39, 40),
        Genre::Drama => RGBColor(31, 119, 180),
        Genre::Comedy => RGBColor(44, 160, 44),
    }
}

/// 10% headroom above the largest value; at least 1.
pub fn padded_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, f64::max);
    (max * 1.1).max(1.0)
}

fn prepare_output(path: &Path) -> Result<(), ChartError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn drawing_error<E: Display>(e: E) -> ChartError {
    ChartError::Drawing(e.to_string())
}
