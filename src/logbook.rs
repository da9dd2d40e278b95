use std::fmt::Display;
use std::io::Write;

use num_traits::Float;
use serde::Serialize;

use crate::{Report, Result};

fn optional<E: Display>(value: Option<E>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |value| value.to_string())
}

/// Write a plain-text logbook of a run
///
/// The logbook lists the calibration points, the fitted line and its statistics, and then the
/// estimated concentration of every sample in table order.
///
/// # Errors
/// Returns an error if `writer` fails.
pub fn write_logbook<E: Float + Display, W: Write>(
    report: &Report<E>,
    mut writer: W,
) -> Result<()> {
    writeln!(writer, "Abs Conc")?;
    for (ii, point) in report.points.iter().enumerate() {
        writeln!(
            writer,
            "{} {:.8} {}",
            ii + 1,
            point.absorbance,
            point.concentration
        )?;
    }

    let model = &report.model;
    let diagnostics = model.diagnostics();
    writeln!(writer)?;
    writeln!(writer, "Model: Conc ~ Abs (ordinary least squares)")?;
    writeln!(writer, "Blank: {} ({} replicates)", report.blank.mean, report.blank.replicates)?;
    writeln!(writer, "Coefficients:")?;
    writeln!(
        writer,
        "  intercept {}  std err {}  t {}",
        model.intercept(),
        optional(diagnostics.intercept_standard_error),
        optional(diagnostics.intercept_t)
    )?;
    writeln!(
        writer,
        "  slope     {}  std err {}  t {}",
        model.slope(),
        optional(diagnostics.slope_standard_error),
        optional(diagnostics.slope_t)
    )?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Observations: {}  Residual df: {}",
        diagnostics.observations, diagnostics.residual_df
    )?;
    writeln!(
        writer,
        "R-squared: {}  Adj. R-squared: {}",
        diagnostics.r_squared,
        optional(diagnostics.adjusted_r_squared)
    )?;
    writeln!(
        writer,
        "Residual sum of squares: {}  Residual std err: {}",
        diagnostics.rss,
        optional(diagnostics.residual_standard_error)
    )?;

    let (min, max) = model.concentration_range();
    writeln!(writer, "Calibrated range: [{min}, {max}]")?;

    for sample in &report.samples {
        writeln!(writer)?;
        if sample.extrapolated {
            writeln!(
                writer,
                "{}: {} (outside calibrated range)",
                sample.name, sample.concentration
            )?;
        } else {
            writeln!(writer, "{}: {}", sample.name, sample.concentration)?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct PointRow<E> {
    index: usize,
    absorbance: E,
    concentration: E,
    fitted: E,
}

/// Write the calibration points and the fitted line at each point as CSV
///
/// # Errors
/// Returns an error if `writer` fails.
pub fn write_points_csv<E: Float + Serialize, W: Write>(
    report: &Report<E>,
    writer: W,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (ii, (point, fitted)) in report
        .points
        .iter()
        .zip(report.model.fitted_values())
        .enumerate()
    {
        wtr.serialize(PointRow {
            index: ii + 1,
            absorbance: point.absorbance,
            concentration: point.concentration,
            fitted: *fitted,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::channel::{Channel, Table};
    use crate::{quantify, Config};

    fn report() -> Report<f64> {
        let channel = |name: &str, value: f64| Channel::new(name, vec![Some(value)]);
        let table = Table::new(vec![
            channel("Blank", 0.1),
            channel("0.05g/l", 0.2),
            channel("0.1g/l", 0.3),
            channel("0.2g/l", 0.5),
            channel("0.4g/l", 0.9),
            channel("Sample 1", 0.7),
            channel("Sample 2", 1.7),
        ])
        .unwrap();
        quantify(&table, &Config::default()).unwrap()
    }

    #[test]
    fn logbook_lists_points_model_and_samples() {
        let mut buffer = vec![];
        write_logbook(&report(), &mut buffer).unwrap();
        let logbook = String::from_utf8(buffer).unwrap();
        let lines = logbook.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "Abs Conc");
        assert_eq!(lines[1], "1 0.10000000 0.05");
        assert_eq!(lines[4], "4 0.80000000 0.4");
        assert!(logbook.contains("Coefficients:"));
        assert!(logbook.contains("Observations: 4  Residual df: 2"));
        assert!(logbook.contains("Calibrated range: [0.05, 0.4]"));
        assert!(lines.iter().any(|l| l.starts_with("Sample 1: ") && !l.ends_with("range)")));
        assert!(lines
            .iter()
            .any(|l| l.starts_with("Sample 2: ") && l.ends_with("(outside calibrated range)")));
    }

    #[test]
    fn points_csv_has_one_row_per_standard() {
        let mut buffer = vec![];
        write_points_csv(&report(), &mut buffer).unwrap();
        let mut rdr = csv::Reader::from_reader(&buffer[..]);

        assert_eq!(
            rdr.headers().unwrap().iter().collect::<Vec<_>>(),
            vec!["index", "absorbance", "concentration", "fitted"]
        );
        let rows = rdr.records().collect::<std::result::Result<Vec<_>, _>>().unwrap();
        assert_eq!(rows.len(), 4);
        let fitted: f64 = rows[3][3].parse().unwrap();
        approx::assert_abs_diff_eq!(fitted, 0.4, epsilon = 1e-9);
    }
}
