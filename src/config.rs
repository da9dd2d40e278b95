use std::fmt::Display;
use std::fs;
use std::path::Path;

use itertools::Itertools;
use log::debug;
use num_traits::Float;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{AssayError, Result};

/// A reference channel and the analyte concentration it was prepared at
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Standard<E> {
    pub name: String,
    pub concentration: E,
}

impl<E> Standard<E> {
    pub fn new(name: impl Into<String>, concentration: E) -> Self {
        Self {
            name: name.into(),
            concentration,
        }
    }
}

/// What to do with a sample whose estimate falls outside the calibrated concentration range
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtrapolationPolicy {
    /// Return the estimate without comment
    #[default]
    Allow,
    /// Return the estimate and log a warning
    Warn,
    /// Abort the run
    Reject,
}

/// Plate layout and resolution policy for a single quantification run
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(
    default,
    deny_unknown_fields,
    bound(deserialize = "E: Float + Deserialize<'de>")
)]
pub struct Config<E> {
    /// Name of the zero-analyte control channel
    pub blank: String,
    /// Standard channels, in the order their calibration points are reported
    pub standards: Vec<Standard<E>>,
    /// Channels whose name starts with this prefix are treated as samples
    pub sample_prefix: String,
    pub extrapolation: ExtrapolationPolicy,
}

impl<E: Float> Default for Config<E> {
    /// The BSA series of the standard BCA protocol, in g/l
    fn default() -> Self {
        let standard = |name: &str, concentration: f64| {
            Standard::new(name, E::from(concentration).unwrap_or_else(E::nan))
        };
        Self {
            blank: "Blank".to_owned(),
            standards: vec![
                standard("0.05g/l", 0.05),
                standard("0.1g/l", 0.1),
                standard("0.2g/l", 0.2),
                standard("0.4g/l", 0.4),
            ],
            sample_prefix: "Sample".to_owned(),
            extrapolation: ExtrapolationPolicy::Allow,
        }
    }
}

impl<E: Float + Display + DeserializeOwned> Config<E> {
    /// Read a configuration from a TOML file
    ///
    /// Keys absent from the file keep their default values. The result is validated before it is
    /// returned.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it fails [`Config::validate`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        debug!("read configuration from {path:?}");
        config.validate()?;
        Ok(config)
    }
}

impl<E: Float + Display> Config<E> {
    /// Check the standard series can support a calibration fit
    ///
    /// # Errors
    /// - [`AssayError::InsufficientStandards`] if fewer than two standards are configured
    /// - [`AssayError::BlankIsStandard`] if the blank is also named as a standard
    /// - [`AssayError::DuplicateChannel`] if two standards share a name
    /// - [`AssayError::InvalidConcentration`] if a concentration is not finite and positive
    /// - [`AssayError::DuplicateConcentration`] if two standards share a concentration
    pub fn validate(&self) -> Result<()> {
        if self.standards.len() < 2 {
            return Err(AssayError::InsufficientStandards {
                count: self.standards.len(),
            });
        }

        if self.standards.iter().any(|standard| standard.name == self.blank) {
            return Err(AssayError::BlankIsStandard {
                channel: self.blank.clone(),
            });
        }

        if let Some((_, repeated)) = self
            .standards
            .iter()
            .tuple_combinations()
            .find(|(a, b)| a.name == b.name)
        {
            return Err(AssayError::DuplicateChannel {
                channel: repeated.name.clone(),
            });
        }

        if let Some(standard) = self
            .standards
            .iter()
            .find(|standard| {
                !standard.concentration.is_finite() || standard.concentration <= E::zero()
            })
        {
            return Err(AssayError::InvalidConcentration {
                channel: standard.name.clone(),
                concentration: standard.concentration.to_string(),
            });
        }

        if let Some((first, second)) = self
            .standards
            .iter()
            .tuple_combinations()
            .find(|(a, b)| a.concentration == b.concentration)
        {
            return Err(AssayError::DuplicateConcentration {
                first: first.name.clone(),
                second: second.name.clone(),
            });
        }

        Ok(())
    }

    pub(crate) fn is_sample(&self, name: &str) -> bool {
        name.starts_with(&self.sample_prefix)
    }
}
