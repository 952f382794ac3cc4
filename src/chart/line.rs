use super::{drawing_error, genre_color, prepare_output, ChartSize, Metric, FONT};
use crate::analyzer::indicators::linear_trend;
use crate::model::{AggregateRow, ChartError, Genre, GroupKey};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Per-genre (year, value) points in year order, skipping rows without a value.
pub fn genre_series(rows: &[AggregateRow], metric: Metric) -> BTreeMap<Genre, Vec<(i32, f64)>> {
    let mut series: BTreeMap<Genre, Vec<(i32, f64)>> = BTreeMap::new();
    for row in rows {
        let GroupKey::Genre(genre) = row.key else {
            continue;
        };
        if let Some(value) = metric.value(row) {
            series.entry(genre).or_default().push((row.year, value));
        }
    }
    for points in series.values_mut() {
        points.sort_by_key(|&(year, _)| year);
    }
    series
}

/// Draws one line per genre over the years, each with a dashed least-squares trend.
pub fn render_genre_lines(
    rows: &[AggregateRow],
    metric: Metric,
    path: &Path,
    size: ChartSize,
) -> Result<(), ChartError> {
    let series = genre_series(rows, metric);
    if series.is_empty() {
        return Err(ChartError::NoData(format!("genre {}", metric.slug())));
    }

    let years = series.values().flatten().map(|&(year, _)| year);
    let (first, last) = years.fold((i32::MAX, i32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
    let x_range = if first == last { first - 1..last + 1 } else { first..last };
    let y_max = metric.y_max(series.values().flatten().map(|&(_, v)| v));

    prepare_output(path)?;
    let root = BitMapBackend::new(path, size.dims()).into_drawing_area();
    root.fill(&WHITE).map_err(drawing_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} by genre", metric.label()), (FONT, 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), 0.0..y_max)
        .map_err(drawing_error)?;

    chart
        .configure_mesh()
        .x_labels((x_range.end - x_range.start + 1) as usize)
        .x_label_formatter(&|year| year.to_string())
        .x_desc("Year")
        .y_desc(metric.label())
        .draw()
        .map_err(drawing_error)?;

    for (genre, points) in &series {
        let color = genre_color(*genre);
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(drawing_error)?
            .label(genre.name())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart
            .draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))
            .map_err(drawing_error)?;

        let as_f64: Vec<(f64, f64)> = points.iter().map(|&(x, y)| (x as f64, y)).collect();
        if let Some(trend) = linear_trend(&as_f64) {
            let (start, end) = (points[0].0, points[points.len() - 1].0);
            let endpoints = [start, end].map(|x| (x, trend.at(x as f64).clamp(0.0, y_max)));
            chart
                .draw_series(DashedLineSeries::new(endpoints, 8, 6, color.stroke_width(1)))
                .map_err(drawing_error)?;
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(drawing_error)?;

    root.present().map_err(drawing_error)?;
    info!("Wrote {}", path.display());
    Ok(())
}
