use std::fmt::Display;

use log::info;
use ndarray::{LinalgScalar, ScalarOperand};
use num_traits::Float;
use serde::Serialize;

use crate::aggregate::{aggregate, AggregatedChannel};
use crate::blank::{correct, CorrectedValue};
use crate::channel::{classify, Plate, Table};
use crate::fit::{fit, CalibrationModel, CalibrationPoint};
use crate::resolve::{resolve, SampleResult};
use crate::{Config, ExtrapolationPolicy, Result};

/// The assay before a calibration line exists
pub struct Unfitted;

/// The assay once its calibration line has been fitted
pub struct Fitted<E> {
    model: CalibrationModel<E>,
}

/// Blank-corrected readings of one plate, moving from [`Unfitted`] to [`Fitted`]
///
/// Samples can only be resolved once the assay is [`Fitted`], so an unfitted model can never be
/// applied.
pub struct Assay<E, S> {
    blank: AggregatedChannel<E>,
    points: Vec<CalibrationPoint<E>>,
    samples: Vec<CorrectedValue<E>>,
    policy: ExtrapolationPolicy,
    state: S,
}

/// Everything a run produces, ready for serialisation or a logbook
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report<E> {
    pub blank: AggregatedChannel<E>,
    /// Calibration points in the configured standard order
    pub points: Vec<CalibrationPoint<E>>,
    pub model: CalibrationModel<E>,
    /// Sample results in table order
    pub samples: Vec<SampleResult<E>>,
}

impl<E: Float> Assay<E, Unfitted> {
    /// Aggregate every channel of `plate` and subtract the blank from standards and samples
    ///
    /// # Errors
    /// Returns [`crate::AssayError::EmptyChannel`] if any channel has no valid readings.
    pub fn new(plate: &Plate<E>, policy: ExtrapolationPolicy) -> Result<Self> {
        let blank = aggregate(&plate.blank)?;

        let points = plate
            .standards
            .iter()
            .map(|(channel, concentration)| -> Result<CalibrationPoint<E>> {
                let corrected = correct(&blank, &aggregate(channel)?);
                Ok(CalibrationPoint {
                    absorbance: corrected.absorbance,
                    concentration: *concentration,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let samples = plate
            .samples
            .iter()
            .map(|channel| -> Result<CorrectedValue<E>> {
                Ok(correct(&blank, &aggregate(channel)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            blank,
            points,
            samples,
            policy,
            state: Unfitted,
        })
    }

    pub fn points(&self) -> &[CalibrationPoint<E>] {
        &self.points
    }
}

impl<E: Float + LinalgScalar + ScalarOperand> Assay<E, Unfitted> {
    /// Fit the calibration line through the standards
    ///
    /// # Errors
    /// Returns [`crate::AssayError::DegenerateFit`] if the standards share one absorbance.
    pub fn fit(self) -> Result<Assay<E, Fitted<E>>> {
        let model = fit(&self.points)?;
        Ok(Assay {
            blank: self.blank,
            points: self.points,
            samples: self.samples,
            policy: self.policy,
            state: Fitted { model },
        })
    }
}

impl<E: Float + Display> Assay<E, Fitted<E>> {
    pub const fn model(&self) -> &CalibrationModel<E> {
        &self.state.model
    }

    /// Resolve every sample against the fitted line, preserving sample order
    ///
    /// # Errors
    /// Returns [`crate::AssayError::Extrapolation`] if the policy rejects an out-of-range sample.
    pub fn resolve(self) -> Result<Report<E>> {
        let samples = self
            .samples
            .iter()
            .map(|sample| resolve(&self.state.model, sample, self.policy))
            .collect::<Result<Vec<_>>>()?;

        let extrapolated = samples.iter().filter(|s| s.extrapolated).count();
        info!(
            "resolved {} samples, {extrapolated} outside the calibrated range",
            samples.len()
        );

        Ok(Report {
            blank: self.blank,
            points: self.points,
            model: self.state.model,
            samples,
        })
    }
}

/// Run the full quantification of `table` under `config`
///
/// # Errors
/// Fails on the first invalid input: configuration, missing channels, empty channels, a
/// degenerate calibration, or a rejected extrapolation.
pub fn quantify<E: Float + Display + LinalgScalar + ScalarOperand>(
    table: &Table<E>,
    config: &Config<E>,
) -> Result<Report<E>> {
    info!("quantifying {} channels", table.len());
    let plate = classify(table, config)?;
    Assay::new(&plate, config.extrapolation)?.fit()?.resolve()
}
