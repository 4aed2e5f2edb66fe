// Finite-difference path geometry: derivatives, curvature, arc length and offset curves

use super::PlanarPoint;

/// Curvature denominators are floored at this value
const MIN_CURVATURE_DENOMINATOR: f64 = 1e-10;

/// Per-index derivative: central differences inside, one-sided at both ends.
pub fn gradient(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n)
            .map(|i| {
                if i == 0 {
                    values[1] - values[0]
                } else if i == n - 1 {
                    values[n - 1] - values[n - 2]
                } else {
                    (values[i + 1] - values[i - 1]) / 2.0
                }
            })
            .collect(),
    }
}

fn split(points: &[PlanarPoint]) -> (Vec<f64>, Vec<f64>) {
    points.iter().map(|p| (p.x, p.y)).unzip()
}

/// Unsigned curvature |x'y'' - y'x''| / (x'^2 + y'^2)^1.5 at every point, 1/m.
pub fn curvature(points: &[PlanarPoint]) -> Vec<f64> {
    signed_curvature(points).into_iter().map(f64::abs).collect()
}

/// Curvature with sign: positive while turning left (counter-clockwise).
pub fn signed_curvature(points: &[PlanarPoint]) -> Vec<f64> {
    let (x, y) = split(points);
    let dx = gradient(&x);
    let dy = gradient(&y);
    let ddx = gradient(&dx);
    let ddy = gradient(&dy);

    (0..points.len())
        .map(|i| {
            let numerator = dx[i] * ddy[i] - dy[i] * ddx[i];
            let denominator = (dx[i].powi(2) + dy[i].powi(2))
                .powf(1.5)
                .max(MIN_CURVATURE_DENOMINATOR);
            numerator / denominator
        })
        .collect()
}

/// Euclidean length of every segment between consecutive points.
pub fn segment_lengths(points: &[PlanarPoint]) -> Vec<f64> {
    points
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .collect()
}

/// Running path distance; the first point is at 0.
pub fn cumulative_arc_length(points: &[PlanarPoint]) -> Vec<f64> {
    let mut total = 0.0;
    let mut cumulative = Vec::with_capacity(points.len());
    if points.is_empty() {
        return cumulative;
    }
    cumulative.push(0.0);
    for length in segment_lengths(points) {
        total += length;
        cumulative.push(total);
    }
    cumulative
}

/// Left and right curves offset `half_width` along the local unit normal.
pub fn offset_boundaries(
    points: &[PlanarPoint],
    half_width: f64,
) -> (Vec<PlanarPoint>, Vec<PlanarPoint>) {
    let (x, y) = split(points);
    let dx = gradient(&x);
    let dy = gradient(&y);

    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let norm = (dx[i].powi(2) + dy[i].powi(2)).sqrt();
            let norm = if norm == 0.0 { 1.0 } else { norm };
            // tangent rotated +90 degrees
            let nx = -dy[i] / norm;
            let ny = dx[i] / norm;
            (
                PlanarPoint::new(p.x + nx * half_width, p.y + ny * half_width),
                PlanarPoint::new(p.x - nx * half_width, p.y - ny * half_width),
            )
        })
        .unzip()
}
