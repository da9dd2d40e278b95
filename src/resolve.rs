use std::fmt::Display;

use log::warn;
use num_traits::Float;
use serde::Serialize;

use crate::blank::CorrectedValue;
use crate::fit::CalibrationModel;
use crate::{AssayError, ExtrapolationPolicy, Result};

/// The estimated concentration of a single sample
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleResult<E> {
    pub name: String,
    pub absorbance: E,
    pub concentration: E,
    /// The estimate lies outside the range of the standards
    pub extrapolated: bool,
}

/// Read a sample's concentration off the calibration line
///
/// Estimates outside the calibrated range are always computed; `policy` decides whether they are
/// returned silently, returned with a logged warning, or rejected.
///
/// # Errors
/// - [`AssayError::Extrapolation`] for an out-of-range estimate under
///   [`ExtrapolationPolicy::Reject`]
/// - [`AssayError::NonFinite`] if the estimate overflows
pub fn resolve<E: Float + Display>(
    model: &CalibrationModel<E>,
    sample: &CorrectedValue<E>,
    policy: ExtrapolationPolicy,
) -> Result<SampleResult<E>> {
    let concentration = model.concentration_at(sample.absorbance);
    if !concentration.is_finite() {
        return Err(AssayError::NonFinite {
            channel: sample.name.clone(),
        });
    }
    let extrapolated = !model.brackets(concentration);

    if extrapolated {
        let (min, max) = model.concentration_range();
        match policy {
            ExtrapolationPolicy::Allow => {}
            ExtrapolationPolicy::Warn => warn!(
                "sample '{}' resolves to {concentration}, outside the calibrated range [{min}, {max}]",
                sample.name
            ),
            ExtrapolationPolicy::Reject => {
                return Err(AssayError::Extrapolation {
                    sample: sample.name.clone(),
                    concentration: concentration.to_string(),
                    min: min.to_string(),
                    max: max.to_string(),
                })
            }
        }
    }

    Ok(SampleResult {
        name: sample.name.clone(),
        absorbance: sample.absorbance,
        concentration,
        extrapolated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Mutex, Once};

    use log::{Level, LevelFilter, Log, Metadata, Record};

    use crate::fit::{fit, CalibrationPoint};

    static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());
    static INIT: Once = Once::new();

    struct CapturingLogger;

    impl Log for CapturingLogger {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            if let Ok(mut records) = RECORDS.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CapturingLogger = CapturingLogger;

    fn capture_logs() {
        INIT.call_once(|| {
            log::set_logger(&LOGGER).expect("no other logger is installed in unit tests");
            log::set_max_level(LevelFilter::Trace);
        });
    }

    fn warnings_about(sample: &str) -> usize {
        RECORDS
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, message)| *level == Level::Warn && message.contains(sample))
            .count()
    }

    fn model() -> CalibrationModel<f64> {
        let points = [(0.10, 0.05), (0.20, 0.1), (0.40, 0.2), (0.80, 0.4)]
            .into_iter()
            .map(|(absorbance, concentration)| CalibrationPoint {
                absorbance,
                concentration,
            })
            .collect::<Vec<_>>();
        fit(&points).unwrap()
    }

    fn sample(name: &str, absorbance: f64) -> CorrectedValue<f64> {
        CorrectedValue {
            name: name.to_owned(),
            absorbance,
        }
    }

    #[test]
    fn sample_inside_the_range_is_resolved() {
        let result =
            resolve(&model(), &sample("Sample 1", 0.6), ExtrapolationPolicy::Reject).unwrap();
        assert_eq!(result.name, "Sample 1");
        approx::assert_abs_diff_eq!(result.absorbance, 0.6);
        approx::assert_abs_diff_eq!(result.concentration, 0.3, epsilon = 1e-9);
        assert!(!result.extrapolated);
    }

    #[test]
    fn out_of_range_sample_is_returned_and_flagged_when_allowed() {
        for policy in [ExtrapolationPolicy::Allow, ExtrapolationPolicy::Warn] {
            let result = resolve(&model(), &sample("Sample 2", 1.6), policy).unwrap();
            approx::assert_abs_diff_eq!(result.concentration, 0.8, epsilon = 1e-9);
            assert!(result.extrapolated);
        }
    }

    #[test]
    fn warn_policy_logs_out_of_range_samples_and_allow_does_not() {
        capture_logs();

        let warned =
            resolve(&model(), &sample("Sample W", 1.6), ExtrapolationPolicy::Warn).unwrap();
        assert!(warned.extrapolated);
        assert_eq!(warnings_about("'Sample W'"), 1);

        let inside =
            resolve(&model(), &sample("Sample V", 0.6), ExtrapolationPolicy::Warn).unwrap();
        assert!(!inside.extrapolated);
        assert_eq!(warnings_about("'Sample V'"), 0);

        let allowed =
            resolve(&model(), &sample("Sample X", 1.6), ExtrapolationPolicy::Allow).unwrap();
        assert!(allowed.extrapolated);
        assert_eq!(warnings_about("'Sample X'"), 0);
    }

    #[test]
    fn every_standard_resolves_under_reject_policy() {
        let gain = 0.4 / 0.7;
        let points = (1..=20)
            .map(|ii| {
                let concentration = 0.05 * f64::from(ii);
                CalibrationPoint {
                    absorbance: concentration / gain,
                    concentration,
                }
            })
            .collect::<Vec<_>>();
        let model = fit(&points).unwrap();

        for point in &points {
            let result = resolve(
                &model,
                &sample("standard", point.absorbance),
                ExtrapolationPolicy::Reject,
            )
            .unwrap();
            approx::assert_abs_diff_eq!(result.concentration, point.concentration, epsilon = 1e-9);
            assert!(!result.extrapolated);
        }
    }

    #[test]
    fn non_finite_estimate_is_an_error() {
        let result = resolve(
            &model(),
            &sample("Sample 5", f64::INFINITY),
            ExtrapolationPolicy::Allow,
        );
        assert!(matches!(result, Err(AssayError::NonFinite { channel }) if channel == "Sample 5"));
    }

    #[test]
    fn negative_absorbance_resolves_below_the_range() {
        let result =
            resolve(&model(), &sample("Sample 3", -0.02), ExtrapolationPolicy::Allow).unwrap();
        approx::assert_abs_diff_eq!(result.concentration, -0.01, epsilon = 1e-9);
        assert!(result.extrapolated);
    }

    #[test]
    fn out_of_range_sample_is_rejected_under_reject_policy() {
        let result = resolve(&model(), &sample("Sample 4", 2.0), ExtrapolationPolicy::Reject);
        assert!(
            matches!(result, Err(AssayError::Extrapolation { sample, .. }) if sample == "Sample 4")
        );
    }
}
