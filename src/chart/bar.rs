use super::{drawing_error, padded_max, prepare_output, ChartSize, Metric, FONT};
use crate::model::{ActorSummary, AggregateRow, ChartError, GroupKey};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::TextStyle;
use std::path::Path;
use tracing::info;

const BAR_WIDTH: f64 = 0.25;
const COMPARISON_COLORS: [RGBColor; 3] = [
    RGBColor(135, 206, 235), // skyblue
    RGBColor(144, 238, 144), // lightgreen
    RGBColor(250, 128, 114), // salmon
];

/// (year, value) bars for one actor.
pub fn actor_bars(rows: &[AggregateRow], actor: &str, metric: Metric) -> Vec<(i32, f64)> {
    rows.iter()
        .filter(|row| matches!(&row.key, GroupKey::Actor(name) if name == actor))
        .filter_map(|row| metric.value(row).map(|v| (row.year, v)))
        .collect()
}

/// Bar chart of one actor's yearly values.
pub fn render_actor_bars(
    rows: &[AggregateRow],
    actor: &str,
    metric: Metric,
    path: &Path,
    size: ChartSize,
) -> Result<(), ChartError> {
    let bars = actor_bars(rows, actor, metric);
    if bars.is_empty() {
        return Err(ChartError::NoData(format!("{} {}", actor, metric.slug())));
    }

    let first = bars.iter().map(|&(y, _)| y).min().unwrap_or_default();
    let last = bars.iter().map(|&(y, _)| y).max().unwrap_or_default();
    let y_max = metric.y_max(bars.iter().map(|&(_, v)| v));

    prepare_output(path)?;
    let root = BitMapBackend::new(path, size.dims()).into_drawing_area();
    root.fill(&WHITE).map_err(drawing_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{}: {}", actor, metric.label()), (FONT, 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(first as f64 - 0.5..last as f64 + 0.5, 0.0..y_max)
        .map_err(drawing_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels((last - first + 2) as usize)
        .x_label_formatter(&whole_numbers)
        .x_desc("Year")
        .y_desc(metric.label())
        .draw()
        .map_err(drawing_error)?;

    let color = COMPARISON_COLORS[match metric {
        Metric::AverageRating => 1,
        Metric::Mentions => 2,
    }];
    chart
        .draw_series(bars.iter().map(|&(year, value)| {
            let x = year as f64;
            Rectangle::new([(x - 0.3, 0.0), (x + 0.3, value)], color.filled())
        }))
        .map_err(drawing_error)?;
    chart
        .draw_series(bars.iter().map(|&(year, value)| value_label((year as f64, value), value)))
        .map_err(drawing_error)?;

    root.present().map_err(drawing_error)?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// Grouped bars per actor: movie count, average rating and mentions.
pub fn render_actor_comparison(
    summaries: &[ActorSummary],
    title: &str,
    path: &Path,
    size: ChartSize,
) -> Result<(), ChartError> {
    if summaries.is_empty() {
        return Err(ChartError::NoData("actor comparison".to_string()));
    }

    // a missing rating or mention total leaves its slot empty
    let groups: Vec<[Option<f64>; 3]> = summaries
        .iter()
        .map(|s| {
            [
                Some(s.movies as f64),
                s.average_rating,
                s.total_mentions.map(|m| m as f64),
            ]
        })
        .collect();
    let y_max = padded_max(groups.iter().flatten().flatten().copied()).max(10.0);
    let names: Vec<&str> = summaries.iter().map(|s| s.actor.as_str()).collect();
    let actor_label = |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        names.get(idx as usize).map(|n| n.to_string()).unwrap_or_default()
    };

    prepare_output(path)?;
    let root = BitMapBackend::new(path, size.dims()).into_drawing_area();
    root.fill(&WHITE).map_err(drawing_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..summaries.len() as f64 - 0.5, 0.0..y_max)
        .map_err(drawing_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(summaries.len() + 1)
        .x_label_formatter(&actor_label)
        .x_desc("Actors")
        .y_desc("Values")
        .draw()
        .map_err(drawing_error)?;

    let legends = ["Number of movies", "Average rating", "NYT mentions"];
    for (slot, (legend, color)) in legends.iter().zip(COMPARISON_COLORS).enumerate() {
        let offset = (slot as f64 - 1.0) * BAR_WIDTH;
        let bars: Vec<(f64, f64)> = groups
            .iter()
            .enumerate()
            .filter_map(|(i, values)| values[slot].map(|v| (i as f64 + offset, v)))
            .collect();

        chart
            .draw_series(bars.iter().map(|&(x, v)| {
                Rectangle::new([(x - BAR_WIDTH / 2.0, 0.0), (x + BAR_WIDTH / 2.0, v)], color.filled())
            }))
            .map_err(drawing_error)?
            .label(*legend)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        chart
            .draw_series(bars.iter().map(|&(x, v)| value_label((x, v), v)))
            .map_err(drawing_error)?;
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

fn whole_numbers(x: &f64) -> String {
    if x.fract().abs() < 1e-6 {
        format!("{:.0}", x)
    } else {
        String::new()
    }
}

fn value_label(at: (f64, f64), value: f64) -> Text<'static, (f64, f64), String> {
    let text = if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    };
    Text::new(
        text,
        at,
        TextStyle::from((FONT, 14).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Genre;

    fn row(key: GroupKey, year: i32, avg: Option<f64>, mentions: Option<u64>) -> AggregateRow {
        AggregateRow {
            key,
            year,
            average_rating: avg,
            rated_movies: usize::from(avg.is_some()),
            movies: 1,
            total_mentions: mentions,
        }
    }

    #[test]
    fn bars_belong_to_the_requested_actor() {
        let rows = vec![
            row(GroupKey::Actor("Will Smith".into()), 2020, Some(7.1), Some(12)),
            row(GroupKey::Actor("Will Smith".into()), 2022, None, Some(3)),
            row(GroupKey::Actor("Will Smith".into()), 2023, Some(5.0), None),
            row(GroupKey::Actor("Adam Sandler".into()), 2020, Some(6.0), Some(4)),
            row(GroupKey::Genre(Genre::Action), 2020, Some(6.8), Some(40)),
        ];

        assert_eq!(
            actor_bars(&rows, "Will Smith", Metric::AverageRating),
            vec![(2020, 7.1), (2023, 5.0)]
        );
        assert_eq!(
            actor_bars(&rows, "Will Smith", Metric::Mentions),
            vec![(2020, 12.0), (2022, 3.0)]
        );
    }

    #[test]
    fn actor_without_rows_reports_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let size = ChartSize { width: 400, height: 300 };

        let result = render_actor_bars(&[], "Will Smith", Metric::Mentions, &dir.path().join("a.png"), size);
        assert!(matches!(result, Err(ChartError::NoData(_))));
    }

    #[test]
    fn empty_comparison_reports_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let size = ChartSize { width: 400, height: 300 };

        let result = render_actor_comparison(&[], "Actors", &dir.path().join("c.png"), size);
        assert!(matches!(result, Err(ChartError::NoData(_))));
    }

    #[test]
    fn axis_labels_only_on_whole_numbers() {
        assert_eq!(whole_numbers(&2021.0), "2021");
        assert_eq!(whole_numbers(&2021.5), "");
    }

    #[test]
    fn actor_bars_are_drawn_to_a_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actor_will-smith_mentions.png");
        let rows = vec![
            row(GroupKey::Actor("Will Smith".into()), 2020, Some(7.1), Some(12)),
            row(GroupKey::Actor("Will Smith".into()), 2022, Some(6.4), Some(3)),
        ];
        let size = ChartSize { width: 640, height: 480 };

        render_actor_bars(&rows, "Will Smith", Metric::Mentions, &path, size).unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn comparison_is_drawn_even_with_missing_totals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actor_comparison.png");
        let summaries = vec![
            ActorSummary {
                actor: "Adam Sandler".into(),
                movies: 4,
                average_rating: Some(6.1),
                total_mentions: None,
            },
            ActorSummary {
                actor: "Will Smith".into(),
                movies: 3,
                average_rating: None,
                total_mentions: Some(25),
            },
        ];
        let size = ChartSize { width: 640, height: 480 };

        render_actor_comparison(&summaries, "Actors", &path, size).unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
