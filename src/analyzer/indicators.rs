use crate::model::AggregateRow;

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    pub slope: f64,
    pub intercept: f64,
}

impl Trend {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fits a trend line; needs at least two points with distinct x.
pub fn linear_trend(points: &[(f64, f64)]) -> Option<Trend> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
    let sxx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = points.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
    let slope = sxy / sxx;
    Some(Trend {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Pearson's r over paired samples. `None` for mismatched or empty input,
/// or when either side is constant.
pub fn correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.is_empty() {
        return None;
    }
    let n = x.len() as f64;
    let (sum_x, sum_y) = x.iter().zip(y).fold((0.0, 0.0), |(sx, sy), (a, b)| (sx + a, sy + b));
    let (mx, my) = (sum_x / n, sum_y / n);

    let (cov, var_x, var_y) = x.iter().zip(y).fold((0.0, 0.0, 0.0), |(c, vx, vy), (a, b)| {
        let (dx, dy) = (a - mx, b - my);
        (c + dx * dy, vx + dx * dx, vy + dy * dy)
    });
    let spread = (var_x * var_y).sqrt();
    (spread > 0.0).then(|| cov / spread)
}

/// Correlation between average rating and mentions over rows that have both.
pub fn rating_mention_correlation(rows: &[AggregateRow]) -> Option<f64> {
    let (ratings, mentions): (Vec<f64>, Vec<f64>) = rows
        .iter()
        .filter_map(|r| Some((r.average_rating?, r.total_mentions? as f64)))
        .unzip();
    correlation(&ratings, &mentions)
}
