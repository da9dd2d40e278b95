use std::collections::HashSet;
use std::fmt::Display;

use log::debug;
use num_traits::Float;

use crate::{AssayError, Config, Result};

/// A named column of replicate readings
///
/// Missing cells are `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel<E> {
    pub name: String,
    pub readings: Vec<Option<E>>,
}

impl<E> Channel<E> {
    pub fn new(name: impl Into<String>, readings: Vec<Option<E>>) -> Self {
        Self {
            name: name.into(),
            readings,
        }
    }
}

/// Every channel of an assay plate, in the column order of the source table
#[derive(Clone, Debug, Default)]
pub struct Table<E> {
    channels: Vec<Channel<E>>,
}

impl<E> Table<E> {
    /// Build a table from an ordered list of channels
    ///
    /// # Errors
    /// Returns [`AssayError::DuplicateChannel`] if two channels share a name.
    pub fn new(channels: Vec<Channel<E>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for channel in &channels {
            if !seen.insert(channel.name.as_str()) {
                return Err(AssayError::DuplicateChannel {
                    channel: channel.name.clone(),
                });
            }
        }
        Ok(Self { channels })
    }

    pub fn channels(&self) -> &[Channel<E>] {
        &self.channels
    }

    pub fn get(&self, name: &str) -> Option<&Channel<E>> {
        self.channels.iter().find(|channel| channel.name == name)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// The role a channel plays in the assay
#[derive(Clone, Debug, PartialEq)]
pub enum ClassifiedChannel<E> {
    Blank(Channel<E>),
    Standard { channel: Channel<E>, concentration: E },
    Sample(Channel<E>),
}

impl<E> ClassifiedChannel<E> {
    pub const fn channel(&self) -> &Channel<E> {
        match self {
            Self::Blank(channel) | Self::Sample(channel) | Self::Standard { channel, .. } => {
                channel
            }
        }
    }
}

/// A validated plate layout
///
/// There is exactly one blank, one standard per configured standard (in configuration order) and
/// any number of samples (in table order).
#[derive(Clone, Debug)]
pub struct Plate<E> {
    pub(crate) blank: Channel<E>,
    pub(crate) standards: Vec<(Channel<E>, E)>,
    pub(crate) samples: Vec<Channel<E>>,
}

impl<E: Copy> Plate<E> {
    /// All channels tagged with their role, blank first
    pub fn classified(&self) -> Vec<ClassifiedChannel<E>> {
        std::iter::once(ClassifiedChannel::Blank(self.blank.clone()))
            .chain(self.standards.iter().map(|(channel, concentration)| {
                ClassifiedChannel::Standard {
                    channel: channel.clone(),
                    concentration: *concentration,
                }
            }))
            .chain(self.samples.iter().cloned().map(ClassifiedChannel::Sample))
            .collect()
    }

    pub fn samples(&self) -> &[Channel<E>] {
        &self.samples
    }
}

/// Assign every channel of `table` its role under `config`
///
/// Channels which are neither the blank, a configured standard nor prefixed as a sample are
/// ignored.
///
/// # Errors
/// - Any error from [`Config::validate`]
/// - [`AssayError::MissingBlank`] if the blank channel is absent
/// - [`AssayError::MissingStandard`] if a configured standard is absent
pub fn classify<E: Float + Display>(table: &Table<E>, config: &Config<E>) -> Result<Plate<E>> {
    config.validate()?;

    let blank = table
        .get(&config.blank)
        .cloned()
        .ok_or_else(|| AssayError::MissingBlank {
            channel: config.blank.clone(),
        })?;

    let standards = config
        .standards
        .iter()
        .map(|standard| {
            table
                .get(&standard.name)
                .map(|channel| (channel.clone(), standard.concentration))
                .ok_or_else(|| AssayError::MissingStandard {
                    channel: standard.name.clone(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut samples = vec![];
    for channel in table.channels() {
        let is_reserved = channel.name == config.blank
            || config.standards.iter().any(|s| s.name == channel.name);
        if is_reserved {
            continue;
        }
        if config.is_sample(&channel.name) {
            samples.push(channel.clone());
        } else {
            debug!("ignoring unrecognised channel '{}'", channel.name);
        }
    }

    debug!(
        "classified plate: 1 blank, {} standards, {} samples",
        standards.len(),
        samples.len()
    );

    Ok(Plate {
        blank,
        standards,
        samples,
    })
}
