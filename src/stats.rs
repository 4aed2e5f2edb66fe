// Small statistics helpers shared by the feature extractor and lap statistics.
// Degenerate inputs resolve to 0 instead of NaN/Infinity.

/// Denominators below this are treated as zero
const EPSILON: f64 = 1e-12;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

/// Ordinary least-squares fit `y = slope * x + intercept`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn residuals(&self, xs: &[f64], ys: &[f64]) -> Vec<f64> {
        xs.iter()
            .zip(ys)
            .map(|(x, y)| y - self.predict(*x))
            .collect()
    }
}

/// Fits `ys` against `xs`. With no spread in `xs` the slope is 0 and the fit is the mean of `ys`.
pub fn linear_regression(xs: &[f64], ys: &[f64]) -> LinearFit {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return LinearFit {
            slope: 0.0,
            intercept: 0.0,
        };
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mean_x = mean(xs);
    let mean_y = mean(ys);
    let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    let sxy: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    let slope = if sxx > EPSILON { sxy / sxx } else { 0.0 };
    let slope = if slope.is_finite() { slope } else { 0.0 };
    LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    }
}

/// Pearson correlation; 0 when either series has no variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mean_x = mean(xs);
    let mean_y = mean(ys);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= EPSILON || syy <= EPSILON {
        return 0.0;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 }
}
