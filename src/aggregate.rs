use log::debug;
use num_traits::Float;
use serde::Serialize;

use crate::channel::Channel;
use crate::{AssayError, Result};

/// A channel reduced to the mean of its valid replicates
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregatedChannel<E> {
    pub name: String,
    pub mean: E,
    /// Number of replicates contributing to `mean`
    pub replicates: usize,
}

/// Average the valid readings of `channel`
///
/// A reading is valid if it is present and finite, so empty cells and `NaN` entries are skipped.
///
/// # Errors
/// - [`AssayError::EmptyChannel`] if the channel has no valid readings
/// - [`AssayError::NonFinite`] if the mean of finite readings still overflows
pub fn aggregate<E: Float>(channel: &Channel<E>) -> Result<AggregatedChannel<E>> {
    let mut mean = E::zero();
    let mut count = 0usize;
    for &reading in channel.readings.iter().flatten() {
        if !reading.is_finite() {
            continue;
        }
        count += 1;
        let weight = E::from(count).ok_or_else(|| AssayError::NonFinite {
            channel: channel.name.clone(),
        })?;
        // running mean, so replicates near the float maximum cannot overflow a sum
        mean = mean + (reading - mean) / weight;
    }

    if count == 0 {
        return Err(AssayError::EmptyChannel {
            channel: channel.name.clone(),
        });
    }
    if !mean.is_finite() {
        return Err(AssayError::NonFinite {
            channel: channel.name.clone(),
        });
    }

    debug!(
        "aggregated '{}' over {count} of {} readings",
        channel.name,
        channel.readings.len()
    );

    Ok(AggregatedChannel {
        name: channel.name.clone(),
        mean,
        replicates: count,
    })
}
