// Series smoothing strategies for the centerline builder

use log::warn;
use nalgebra::DMatrix;

/// A smoother maps a raw series to a smoothed series of the same length.
pub trait Smoother {
    fn smooth(&self, series: &[f64], window: usize, order: usize) -> Vec<f64>;
}

/// Savitzky-Golay filter: a polynomial of `order` is least-squares fitted inside a
/// sliding window and evaluated at the window center. The first and last half-windows
/// are evaluated on the fit of the first and last full window.
///
/// Series shorter than the window are returned unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct SavitzkyGolay;

impl SavitzkyGolay {
    /// Projection ("hat") matrix of the windowed polynomial fit: row `i` holds the
    /// weights that produce the fitted value at window position `i`.
    fn hat_matrix(window: usize, order: usize) -> Option<DMatrix<f64>> {
        let half = (window / 2) as f64;
        let vandermonde =
            DMatrix::<f64>::from_fn(window, order + 1, |i, j| (i as f64 - half).powi(j as i32));
        let gram = vandermonde.transpose() * &vandermonde;
        let gram_inv = gram.try_inverse()?;
        Some(&vandermonde * gram_inv * vandermonde.transpose())
    }
}

impl Smoother for SavitzkyGolay {
    fn smooth(&self, series: &[f64], window: usize, order: usize) -> Vec<f64> {
        let n = series.len();
        if window == 0 || n < window || window <= order {
            return series.to_vec();
        }
        let Some(hat) = Self::hat_matrix(window, order) else {
            warn!(
                "Smoothing fit is singular for window {} order {}, using raw series",
                window, order
            );
            return series.to_vec();
        };

        let half = window / 2;
        let fitted_at = |row: usize, start: usize| -> f64 {
            (0..window)
                .map(|k| hat[(row, k)] * series[start + k])
                .sum()
        };

        (0..n)
            .map(|i| {
                if i < half {
                    fitted_at(i, 0)
                } else if i + half >= n {
                    fitted_at(i - (n - window), n - window)
                } else {
                    fitted_at(half, i - half)
                }
            })
            .collect()
    }
}

/// Leaves the series as recorded. Builds a baseline from raw projected positions.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Smoother for Identity {
    fn smooth(&self, series: &[f64], _window: usize, _order: usize) -> Vec<f64> {
        series.to_vec()
    }
}
