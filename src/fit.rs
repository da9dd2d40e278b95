use std::cmp::Ordering;

use itertools::{Itertools, MinMaxResult};
use log::debug;
use ndarray::{arr1, Array1, LinalgScalar, ScalarOperand};
use num_traits::Float;
use serde::Serialize;

use crate::math::{mean, vandermonde};
use crate::{AssayError, Result};

/// A standard's blank-corrected absorbance paired with its known concentration
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CalibrationPoint<E> {
    pub absorbance: E,
    pub concentration: E,
}

/// Goodness-of-fit statistics for a calibration line
///
/// These are reported alongside the model but never used to resolve concentrations. Quantities
/// that need a residual degree of freedom are `None` for a two-point fit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostics<E> {
    pub observations: usize,
    pub residual_df: usize,
    /// Residual sum of squares
    pub rss: E,
    pub r_squared: E,
    pub adjusted_r_squared: Option<E>,
    pub residual_standard_error: Option<E>,
    pub slope_standard_error: Option<E>,
    pub intercept_standard_error: Option<E>,
    pub slope_t: Option<E>,
    pub intercept_t: Option<E>,
}

/// The fitted line `concentration = slope * absorbance + intercept`
///
/// A model can only be obtained from [`fit`], so every instance describes a successful fit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CalibrationModel<E> {
    slope: E,
    intercept: E,
    diagnostics: Diagnostics<E>,
    /// Bracketing known concentrations of the standards
    range: (E, E),
    fitted: Vec<E>,
}

impl<E: Float> CalibrationModel<E> {
    pub const fn slope(&self) -> E {
        self.slope
    }

    pub const fn intercept(&self) -> E {
        self.intercept
    }

    pub const fn diagnostics(&self) -> &Diagnostics<E> {
        &self.diagnostics
    }

    /// Smallest and largest known concentration the line was fitted over
    pub const fn concentration_range(&self) -> (E, E) {
        self.range
    }

    /// The line evaluated at each calibration point's absorbance, in point order
    pub fn fitted_values(&self) -> &[E] {
        &self.fitted
    }

    /// Evaluate the line at a corrected absorbance
    pub fn concentration_at(&self, absorbance: E) -> E {
        self.slope * absorbance + self.intercept
    }

    /// Whether `concentration` lies inside the calibrated range, bounds included
    ///
    /// The bounds are widened by a relative `1e-9` so a standard's own absorbance, which rounding
    /// may resolve a few ulps past its known concentration, still counts as inside.
    pub fn brackets(&self, concentration: E) -> bool {
        let (min, max) = self.range;
        let tolerance = E::from(1e-9).unwrap_or_else(E::epsilon);
        concentration >= min - tolerance * min.abs()
            && concentration <= max + tolerance * max.abs()
    }
}

fn total_order<E: PartialOrd>(a: &E, b: &E) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Fit a calibration line through `points` by ordinary least squares
///
/// Known concentration is regressed on corrected absorbance with an intercept. The design matrix
/// has a column of ones and a column of absorbances, and the normal equations are solved in closed
/// form using centred sums, so the result is exact up to rounding and fully deterministic.
///
/// # Errors
/// - [`AssayError::DegenerateFit`] if fewer than two distinct absorbance values are present, in
///   which case the normal equations are singular
/// - [`AssayError::NonFiniteFit`] if the sums overflow, so the line cannot be represented
pub fn fit<E: Float + LinalgScalar + ScalarOperand>(
    points: &[CalibrationPoint<E>],
) -> Result<CalibrationModel<E>> {
    let distinct = points
        .iter()
        .map(|point| point.absorbance)
        .sorted_by(total_order)
        .dedup()
        .count();
    if distinct < 2 {
        return Err(AssayError::DegenerateFit {
            distinct,
            points: points.len(),
        });
    }

    let x: Array1<E> = points.iter().map(|point| point.absorbance).collect();
    let y: Array1<E> = points.iter().map(|point| point.concentration).collect();
    let n = points.len();

    let degenerate = || AssayError::DegenerateFit {
        distinct,
        points: n,
    };
    let x_mean = mean(&x).ok_or_else(degenerate)?;
    let y_mean = mean(&y).ok_or_else(degenerate)?;

    let dx = &x - x_mean;
    let dy = &y - y_mean;
    let sxx = dx.dot(&dx);
    if !(sxx > E::zero()) {
        return Err(degenerate());
    }
    let sxy = dx.dot(&dy);

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    if ![x_mean, sxx, sxy, slope, intercept]
        .iter()
        .all(|value| value.is_finite())
    {
        return Err(AssayError::NonFiniteFit { points: n });
    }

    let design = vandermonde(x.as_slice().unwrap_or(&[]), 1);
    let fitted = design.dot(&arr1(&[intercept, slope]));
    let residuals = &y - &fitted;
    let rss = residuals.dot(&residuals);
    let tss = dy.dot(&dy);
    let diagnostics = diagnostics(n, rss, tss, sxx, x_mean, slope, intercept);

    let range = match points
        .iter()
        .map(|point| point.concentration)
        .minmax_by(total_order)
    {
        MinMaxResult::NoElements => return Err(degenerate()),
        MinMaxResult::OneElement(c) => (c, c),
        MinMaxResult::MinMax(min, max) => (min, max),
    };

    debug!(
        "fitted calibration over {n} points: slope {:?}, intercept {:?}, r^2 {:?}",
        slope.to_f64(),
        intercept.to_f64(),
        diagnostics.r_squared.to_f64()
    );

    Ok(CalibrationModel {
        slope,
        intercept,
        diagnostics,
        range,
        fitted: fitted.to_vec(),
    })
}

/// Summary statistics of the straight-line fit
///
/// With `s^2 = rss / (n - 2)` the coefficient covariance is `s^2 (X^T X)^-1`, giving
/// `se(slope) = s / sqrt(Sxx)` and `se(intercept) = s * sqrt(1 / n + mean(x)^2 / Sxx)`.
fn diagnostics<E: Float>(
    n: usize,
    rss: E,
    tss: E,
    sxx: E,
    x_mean: E,
    slope: E,
    intercept: E,
) -> Diagnostics<E> {
    let residual_df = n.saturating_sub(2);
    let r_squared = if tss > E::zero() {
        E::one() - rss / tss
    } else {
        E::one()
    };

    let observations = E::from(n);
    let df = E::from(residual_df).filter(|df| !df.is_zero());

    let adjusted_r_squared = observations
        .zip(df)
        .map(|(n, df)| E::one() - (E::one() - r_squared) * (n - E::one()) / df);
    let residual_standard_error = df.map(|df| (rss / df).sqrt());
    let slope_standard_error = residual_standard_error.map(|s| s / sxx.sqrt());
    let intercept_standard_error = residual_standard_error
        .zip(observations)
        .map(|(s, n)| s * (E::one() / n + x_mean * x_mean / sxx).sqrt());

    Diagnostics {
        observations: n,
        residual_df,
        rss,
        r_squared,
        adjusted_r_squared,
        residual_standard_error,
        slope_standard_error,
        intercept_standard_error,
        slope_t: slope_standard_error.map(|se| slope / se),
        intercept_t: intercept_standard_error.map(|se| intercept / se),
    }
}
